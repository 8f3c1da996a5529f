#![no_main]

//! Fuzz target for manifest parsing.
//!
//! Arbitrary text must either fail with a `ParseError` or parse into a
//! project that hands back the input byte-for-byte.

use libfuzzer_sys::fuzz_target;
use pbxsync_pbxproj::{FileRefIndex, Project};
use pbxsync_types::source::MatchMode;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(project) = Project::parse(s) else {
        return;
    };
    assert_eq!(project.text(), s);

    // Walk the derived views; none of them may panic.
    let _ = project.main_group();
    for group in project.groups() {
        let _ = project.resolved_path(&group.id);
        let _ = group.display_name();
    }
    let _ = FileRefIndex::build(&project, MatchMode::FileName);
    let _ = FileRefIndex::build(&project, MatchMode::RelativePath);
});
