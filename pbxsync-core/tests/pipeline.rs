use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pbxsync_core::adapters::FsWritePort;
use pbxsync_core::pipeline::{ToolError, run_sync, write_report_artifacts};
use pbxsync_core::ports::WritePort;
use pbxsync_core::settings::SyncSettings;
use pbxsync_core::{FsRepoView, SequentialIds};
use pbxsync_domain::GroupRule;
use pbxsync_types::report::{PatchStatus, SyncReport, ToolInfo};
use pbxsync_types::source::MatchMode;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

const MANIFEST: &str = "Plena.xcodeproj/project.pbxproj";

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy of the shared fixture repository in a fresh temp dir.
fn fixture_repo() -> (TempDir, Utf8PathBuf) {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let src = manifest_dir
        .parent()
        .expect("workspace root")
        .join("tests/fixtures/plena/repo");
    let tmp = TempDir::new().expect("create temp dir");
    copy_dir_all(&src, tmp.path()).expect("copy fixture");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
    (tmp, root)
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "pbxsync".into(),
        version: Some("0.0.0-test".into()),
    }
}

fn settings(root: &Utf8Path, dry_run: bool) -> SyncSettings {
    SyncSettings {
        repo_root: root.to_path_buf(),
        dry_run,
        ..SyncSettings::default()
    }
}

fn run(root: &Utf8Path, dry_run: bool) -> SyncReport {
    run_with(&settings(root, dry_run))
}

fn run_with(settings: &SyncSettings) -> SyncReport {
    let repo = FsRepoView::new(settings.repo_root.clone());
    let mut ids = SequentialIds::default();
    run_sync(settings, &repo, &FsWritePort, &mut ids, tool())
        .unwrap()
        .report
}

#[test]
fn sync_adds_missing_files_and_writes_backup() {
    let (_tmp, root) = fixture_repo();
    let original = fs::read_to_string(root.join(MANIFEST)).unwrap();

    let report = run(&root, false);
    let missing: Vec<&str> = report.missing.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        missing,
        vec![
            "Plena/Views/Components/Card.swift",
            "Plena Watch App/Views/RingView.swift",
            "PlenaShared/Models/Reading.swift",
        ]
    );
    assert_eq!(report.summary.patched, 3);
    assert!(report.results.iter().all(|r| r.status == PatchStatus::Patched));
    assert_eq!(
        report.backup_path.as_deref(),
        Some("Plena.xcodeproj/project.pbxproj.backup")
    );

    let backup = fs::read_to_string(root.join("Plena.xcodeproj/project.pbxproj.backup")).unwrap();
    assert_eq!(backup, original);
    let patched = fs::read_to_string(root.join(MANIFEST)).unwrap();
    assert_ne!(patched, original);
    let change = report.manifest_change.unwrap();
    assert_eq!(change.bytes_after, patched.len() as u64);
}

#[test]
fn second_run_finds_nothing_missing() {
    let (_tmp, root) = fixture_repo();
    run(&root, false);
    let once = fs::read_to_string(root.join(MANIFEST)).unwrap();

    let report = run(&root, false);
    assert!(report.missing.is_empty());
    assert!(report.backup_path.is_none());
    assert_eq!(fs::read_to_string(root.join(MANIFEST)).unwrap(), once);
}

#[test]
fn dry_run_leaves_manifest_untouched() {
    let (_tmp, root) = fixture_repo();
    fs::remove_file(root.join("Plena Watch App/Views/RingView.swift")).unwrap();
    let original = fs::read_to_string(root.join(MANIFEST)).unwrap();

    let report = run(&root, true);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.summary.planned, 2);
    assert_eq!(fs::read_to_string(root.join(MANIFEST)).unwrap(), original);
    assert!(!root.join("Plena.xcodeproj/project.pbxproj.backup").exists());
}

#[test]
fn ignored_names_are_not_missing() {
    let (_tmp, root) = fixture_repo();
    fs::write(root.join("Plena/BackgroundSessionManager.swift"), "// dup\n").unwrap();
    let report = run(&root, true);
    assert!(
        report
            .missing
            .iter()
            .all(|f| f.file_name != "BackgroundSessionManager.swift")
    );
}

#[test]
fn missing_manifest_is_fatal() {
    let (_tmp, root) = fixture_repo();
    fs::remove_file(root.join(MANIFEST)).unwrap();
    let repo = FsRepoView::new(root.clone());
    let mut ids = SequentialIds::default();
    let err = run_sync(&settings(&root, false), &repo, &FsWritePort, &mut ids, tool()).unwrap_err();
    assert!(matches!(err, ToolError::ManifestMissing { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[derive(Default)]
struct MemWritePort {
    writes: Mutex<Vec<(String, Vec<u8>)>>,
}

impl WritePort for MemWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.writes
            .lock()
            .expect("lock writes")
            .push((path.to_string(), contents.to_vec()));
        Ok(())
    }

    fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn backup_goes_through_the_writer_first() {
    let (_tmp, root) = fixture_repo();
    let repo = FsRepoView::new(root.clone());
    let writer = MemWritePort::default();
    let mut ids = SequentialIds::default();
    run_sync(&settings(&root, false), &repo, &writer, &mut ids, tool()).unwrap();

    let writes = writer.writes.lock().unwrap();
    let paths: Vec<&str> = writes.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].ends_with("project.pbxproj.backup"));
    assert!(paths[1].ends_with("project.pbxproj"));
    // Nothing hit the disk.
    assert!(!root.join("Plena.xcodeproj/project.pbxproj.backup").exists());
}

#[test]
fn report_artifacts_are_written() {
    let (_tmp, root) = fixture_repo();
    let repo = FsRepoView::new(root.clone());
    let mut ids = SequentialIds::default();
    let outcome = run_sync(&settings(&root, true), &repo, &FsWritePort, &mut ids, tool()).unwrap();

    let out_dir = root.join("artifacts/pbxsync");
    write_report_artifacts(&outcome, &out_dir, &FsWritePort).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(json["schema"], "pbxsync.report.v1");
    assert_eq!(json["dry_run"], true);
    assert!(fs::read_to_string(out_dir.join("report.md")).unwrap().starts_with("# pbxsync report"));
    assert!(out_dir.join("patch.diff").exists());
}

#[test]
fn relative_path_mode_is_idempotent_for_nested_files() {
    let (_tmp, root) = fixture_repo();
    fs::create_dir_all(root.join("Tests/Unit")).unwrap();
    fs::write(root.join("Tests/Unit/FooTests.swift"), "// test\n").unwrap();
    let by_path = SyncSettings {
        match_mode: MatchMode::RelativePath,
        ..settings(&root, false)
    };

    let first = run_with(&by_path);
    let nested = first
        .results
        .iter()
        .find(|r| r.path == "Tests/Unit/FooTests.swift")
        .unwrap();
    assert_eq!(nested.status, PatchStatus::Patched);
    assert_eq!(first.summary.patched, 4);
    let patched = fs::read_to_string(root.join(MANIFEST)).unwrap();
    assert!(patched.contains("path = Unit/FooTests.swift;"));

    let second = run_with(&by_path);
    assert!(second.missing.is_empty(), "still missing: {:?}", second.missing);
    assert_eq!(fs::read_to_string(root.join(MANIFEST)).unwrap(), patched);
}

#[test]
fn hint_matching_several_groups_skips_the_file() {
    let (_tmp, root) = fixture_repo();
    fs::write(root.join("Plena/Views/Foo.swift"), "// view\n").unwrap();

    // Both Views groups end in "Views".
    let mut loose = settings(&root, true);
    loose.rules.groups.insert(
        0,
        GroupRule {
            when: vec!["Plena".into(), "Views".into()],
            unless: vec!["Components".into()],
            group: "Views".into(),
            path: Some("Views".into()),
        },
    );
    let report = run_with(&loose);
    let foo = report
        .results
        .iter()
        .find(|r| r.path == "Plena/Views/Foo.swift")
        .unwrap();
    assert_eq!(foo.status, PatchStatus::Skipped);
    assert_eq!(foo.group_id, None);

    let report = run(&root, true);
    let foo = report
        .results
        .iter()
        .find(|r| r.path == "Plena/Views/Foo.swift")
        .unwrap();
    assert_eq!(foo.status, PatchStatus::Planned);
    assert_eq!(foo.group_id.as_deref(), Some("A10000010000000000000306"));
}
