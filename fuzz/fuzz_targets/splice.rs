#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pbxsync_edit::{Insertion, splice};

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    insertions: Vec<(u16, String)>,
}

fn floor_char_boundary(s: &str, mut at: usize) -> usize {
    at = at.min(s.len());
    while !s.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fuzz_target!(|input: Input| {
    let insertions: Vec<Insertion> = input
        .insertions
        .into_iter()
        .map(|(offset, text)| Insertion {
            offset: floor_char_boundary(&input.text, offset as usize),
            text,
        })
        .collect();
    let out = splice(&input.text, &insertions);

    let added: usize = insertions.iter().map(|i| i.text.len()).sum();
    assert_eq!(out.len(), input.text.len() + added);
    if insertions.is_empty() {
        assert_eq!(out, input.text);
    }
});
