#![allow(deprecated)]

use assert_cmd::Command;
use camino::Utf8PathBuf;
use cucumber::{World, given, then, when};
use fs_err as fs;
use image::{DynamicImage, Rgba, RgbaImage};
use pbxsync_bdd::{copy_tree, fixture_repo_dir};
use pbxsync_pbxproj::{ISA_FILE_REFERENCE, Project};
use tempfile::TempDir;

const MANIFEST: &str = "Plena.xcodeproj/project.pbxproj";
const BACKUP: &str = "Plena.xcodeproj/project.pbxproj.backup";

#[derive(Debug, Default, World)]
pub struct PbxsyncWorld {
    temp: Option<TempDir>,
    repo_root: Option<Utf8PathBuf>,
    icon_set: Option<Utf8PathBuf>,
    original_manifest: Option<String>,
    stdout: String,
    exit_code: Option<i32>,
}

fn repo_root(world: &PbxsyncWorld) -> &Utf8PathBuf {
    world.repo_root.as_ref().expect("repo_root set")
}

fn icon_set(world: &PbxsyncWorld) -> &Utf8PathBuf {
    world.icon_set.as_ref().expect("icon set created")
}

fn manifest(world: &PbxsyncWorld) -> Project {
    let text = fs::read_to_string(repo_root(world).join(MANIFEST)).unwrap();
    Project::parse(text).expect("manifest parses")
}

fn file_ref_ids(project: &Project, name: &str) -> Vec<String> {
    project
        .by_isa(ISA_FILE_REFERENCE)
        .filter(|o| o.display_name() == Some(name))
        .map(|o| o.id.clone())
        .collect()
}

fn built_by(project: &Project, name: &str, target: &str) -> bool {
    let refs = file_ref_ids(project, name);
    let phase = project
        .sources_phase_for_target(target)
        .unwrap_or_else(|| panic!("no Sources phase for {target}"));
    phase
        .id_list("files")
        .into_iter()
        .filter_map(|id| project.object(id))
        .any(|bf| {
            bf.get_str("fileRef")
                .is_some_and(|r| refs.iter().any(|id| id == r))
        })
}

fn run(world: &mut PbxsyncWorld, args: &[&str]) {
    let root = repo_root(world).clone();
    let output = Command::cargo_bin("pbxsync")
        .expect("pbxsync binary")
        .current_dir(root.as_str())
        .args(args)
        .output()
        .expect("run pbxsync");
    world.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    world.exit_code = output.status.code();
}

fn write_png(path: &camino::Utf8Path, size: u32, px: [u8; 4]) {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, Rgba(px)));
    img.save(path).unwrap();
}

// ============================================================================
// Sync scenarios
// ============================================================================

#[given("the Plena fixture repository")]
async fn plena_fixture(world: &mut PbxsyncWorld) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    copy_tree(&fixture_repo_dir(), &root).expect("copy fixture");

    world.original_manifest = Some(fs::read_to_string(root.join(MANIFEST)).unwrap());
    world.temp = Some(td);
    world.repo_root = Some(root);
}

#[given(expr = "a source file {string}")]
async fn add_source_file(world: &mut PbxsyncWorld, rel: String) {
    let path = repo_root(world).join(&rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "import SwiftUI\n").unwrap();
}

#[given(expr = "the source file {string} is removed")]
async fn remove_source_file(world: &mut PbxsyncWorld, rel: String) {
    fs::remove_file(repo_root(world).join(&rel)).unwrap();
}

#[when("I run pbxsync")]
async fn run_sync(world: &mut PbxsyncWorld) {
    run(world, &[]);
}

#[when(expr = "I run pbxsync with {string}")]
async fn run_sync_with(world: &mut PbxsyncWorld, args: String) {
    let args: Vec<&str> = args.split_whitespace().collect();
    run(world, &args);
}

#[then("the run succeeds")]
async fn run_succeeds(world: &mut PbxsyncWorld) {
    assert_eq!(world.exit_code, Some(0), "stdout:\n{}", world.stdout);
}

#[then(expr = "the run exits with code {int}")]
async fn run_exits_with(world: &mut PbxsyncWorld, code: i32) {
    assert_eq!(world.exit_code, Some(code));
}

#[then(expr = "the manifest has exactly one file reference for {string}")]
async fn exactly_one_file_ref(world: &mut PbxsyncWorld, name: String) {
    let project = manifest(world);
    assert_eq!(file_ref_ids(&project, &name).len(), 1);
}

#[then(expr = "{string} is a child of group {string}")]
async fn child_of_group(world: &mut PbxsyncWorld, name: String, group: String) {
    let project = manifest(world);
    let refs = file_ref_ids(&project, &name);
    assert_eq!(refs.len(), 1, "expected one file reference for {name}");
    let parent = project.parent_of(&refs[0]).expect("file has a parent group");
    assert_eq!(parent.display_name(), Some(group.as_str()));
}

#[then(expr = "{string} is built by target {string}")]
async fn is_built_by(world: &mut PbxsyncWorld, name: String, target: String) {
    assert!(built_by(&manifest(world), &name, &target));
}

#[then(expr = "{string} is not built by target {string}")]
async fn is_not_built_by(world: &mut PbxsyncWorld, name: String, target: String) {
    assert!(!built_by(&manifest(world), &name, &target));
}

#[then("the backup holds the original manifest")]
async fn backup_holds_original(world: &mut PbxsyncWorld) {
    let backup = fs::read_to_string(repo_root(world).join(BACKUP)).unwrap();
    assert_eq!(Some(&backup), world.original_manifest.as_ref());
}

#[then("no backup was written")]
async fn no_backup(world: &mut PbxsyncWorld) {
    assert!(!repo_root(world).join(BACKUP).exists());
}

#[then("the manifest is unchanged")]
async fn manifest_unchanged(world: &mut PbxsyncWorld) {
    let now = fs::read_to_string(repo_root(world).join(MANIFEST)).unwrap();
    assert_eq!(Some(&now), world.original_manifest.as_ref());
}

#[then(expr = "the output lists {int} missing files")]
async fn output_lists_missing(world: &mut PbxsyncWorld, count: usize) {
    let header = format!("Found {count} missing file(s):");
    assert!(world.stdout.contains(&header), "stdout:\n{}", world.stdout);
    let listed = world
        .stdout
        .lines()
        .filter(|l| l.starts_with("  - "))
        .count();
    assert_eq!(listed, count);
}

#[then("the output says every source file is in the project")]
async fn output_all_present(world: &mut PbxsyncWorld) {
    assert!(
        world.stdout.contains("source files are in the project."),
        "stdout:\n{}",
        world.stdout
    );
}

// ============================================================================
// Icon scenarios
// ============================================================================

#[given(expr = "an icon set with a transparent {int} pixel icon")]
async fn transparent_icon_set(world: &mut PbxsyncWorld, size: u32) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    let dir = root.join("AppIcon.appiconset");
    fs::create_dir_all(&dir).unwrap();
    write_png(&dir.join("icon.png"), size, [40, 80, 160, 0]);
    let contents = serde_json::json!({
        "images": [
            { "filename": "icon.png", "idiom": "watch-marketing", "scale": "1x", "size": "1024x1024" }
        ],
        "info": { "author": "xcode", "version": 1 }
    });
    fs::write(
        dir.join("Contents.json"),
        serde_json::to_string_pretty(&contents).unwrap(),
    )
    .unwrap();

    world.temp = Some(td);
    world.repo_root = Some(root);
    world.icon_set = Some(dir);
}

#[given(expr = "the icon set lists a {word} @{int}x slot without a file")]
async fn empty_slot(world: &mut PbxsyncWorld, size: String, scale: u32) {
    let path = icon_set(world).join("Contents.json");
    let mut contents: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    contents["images"]
        .as_array_mut()
        .expect("images array")
        .push(serde_json::json!({
            "idiom": "watch",
            "role": "quickLook",
            "scale": format!("{scale}x"),
            "size": size,
            "subtype": "44mm"
        }));
    fs::write(&path, serde_json::to_string_pretty(&contents).unwrap()).unwrap();
}

#[when("I run pbxsync icons fix")]
async fn run_icons_fix(world: &mut PbxsyncWorld) {
    let dir = icon_set(world).to_string();
    run(world, &["icons", "fix", &dir]);
}

#[when(expr = "I run pbxsync icons fix with {string}")]
async fn run_icons_fix_with(world: &mut PbxsyncWorld, extra: String) {
    let dir = icon_set(world).to_string();
    let mut args = vec!["icons", "fix", dir.as_str()];
    args.extend(extra.split_whitespace());
    run(world, &args);
}

#[then("every icon in the set is opaque")]
async fn icons_opaque(world: &mut PbxsyncWorld) {
    for entry in fs::read_dir(icon_set(world)).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|e| e == "png") {
            let img = image::open(&path).unwrap();
            assert!(!img.color().has_alpha(), "{} still has alpha", path.display());
        }
    }
}

#[then(expr = "the icon set contains {string} of {int} pixels")]
async fn icon_of_size(world: &mut PbxsyncWorld, name: String, size: u32) {
    let img = image::open(icon_set(world).join(&name)).unwrap();
    assert_eq!((img.width(), img.height()), (size, size));
}

#[then(expr = "Contents.json names {string}")]
async fn contents_names(world: &mut PbxsyncWorld, name: String) {
    let text = fs::read_to_string(icon_set(world).join("Contents.json")).unwrap();
    let contents: serde_json::Value = serde_json::from_str(&text).unwrap();
    let named = contents["images"]
        .as_array()
        .expect("images array")
        .iter()
        .any(|e| e["filename"] == name.as_str());
    assert!(named, "Contents.json:\n{text}");
}

#[tokio::main]
async fn main() {
    let features_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    PbxsyncWorld::cucumber().run(features_path).await;
}
