#![no_main]

//! Fuzz target for the batch patcher.
//!
//! Whatever the manifest looks like, a batch either aborts with an error or
//! yields a result per file, and skipped batches leave the text untouched.

use libfuzzer_sys::fuzz_target;
use pbxsync_edit::{PatchOptions, PendingFile, TargetPhases, patch_manifest};
use pbxsync_pbxproj::SequentialIds;
use pbxsync_types::source::{Classification, GroupQuery, SourceFile};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Some(file) = SourceFile::new("Plena/Views/Fuzz.swift") else {
        return;
    };
    let pending = vec![PendingFile {
        file,
        classification: Classification {
            group: GroupQuery::with_hint("Views", "Plena/Views"),
            targets: vec!["iOS".to_string()],
        },
    }];
    let phases: TargetPhases = [("iOS".to_string(), "A10000010000000000000039".to_string())]
        .into_iter()
        .collect();

    for dry_run in [true, false] {
        let mut ids = SequentialIds::default();
        let Ok(outcome) = patch_manifest(s, &pending, &phases, &mut ids, &PatchOptions { dry_run })
        else {
            continue;
        };
        assert_eq!(outcome.results.len(), pending.len());
        if dry_run || outcome.summary.patched == 0 {
            assert_eq!(outcome.after, s);
        }
    }
});
