use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

const SCRIPT: &str = "##>frame_rate=24\nFFVideoSource(\"ep01.mkv\")\nTrim(0, 2160) ++ Trim(4320, 24000)\n";

fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Binary run from `dir` so no stray config file is picked up
fn trimchap(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("trimchap").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("TRIMCHAP_MEDIAINFO", dir.join("no-mediainfo"));
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_chapters_writes_file() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", SCRIPT);

    let output = trimchap(dir.path()).arg("chapters").arg(&script).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let chapter_file = dir.path().join("ep01_chapter.xml");
    assert!(stdout(&output).contains("ep01_chapter.xml"));

    let xml = std::fs::read_to_string(chapter_file).unwrap();
    let parsed = roxmltree::Document::parse(&xml).unwrap();
    let names: Vec<&str> = parsed
        .descendants()
        .filter(|n| n.has_tag_name("ChapterString"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(names, vec!["Intro", "Episode"]);
}

#[test]
fn test_chapters_dry_run_prints_xml() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", SCRIPT);

    let output = trimchap(dir.path())
        .args(["chapters", "--dry-run", "--fps", "25"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("<ChapterString>Intro</ChapterString>"));
    assert!(text.contains("<ChapterTimeEnd>0:01:26.400</ChapterTimeEnd>"));
    assert!(!dir.path().join("ep01_chapter.xml").exists());
}

#[test]
fn test_chapters_with_names_config() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", SCRIPT);
    let names = write_script(dir.path(), "names.json", r#"{ "ep01.avs": { "names": ["cold open", "main"] } }"#);

    let output = trimchap(dir.path())
        .args(["chapters", "--dry-run", "--names-config"])
        .arg(&names)
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("<ChapterString>Cold open</ChapterString>"));
    assert!(text.contains("<ChapterString>Main</ChapterString>"));
}

#[test]
fn test_chapters_unsupported_layout_fails() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "ep01.avs",
        "##>frame_rate=24\nTrim(0,100) ++ Trim(2000,3000) ++ Trim(5000,6000) ++ Trim(8000,9000)\n",
    );

    trimchap(dir.path()).arg("chapters").arg(&script).assert().failure();
    assert!(!dir.path().join("ep01_chapter.xml").exists());
}

#[test]
fn test_chapters_directory_reports_failures() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "ep01.avs", SCRIPT);
    write_script(dir.path(), "ep02.avs", "##>frame_rate=24\nFFVideoSource(missing)\n");

    trimchap(dir.path()).arg("chapters").arg(dir.path()).assert().failure();
    assert!(dir.path().join("ep01_chapter.xml").is_file());
    assert!(!dir.path().join("ep02_chapter.xml").exists());
}

#[test]
fn test_trims_json() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", SCRIPT);

    let output = trimchap(dir.path()).args(["trims", "--json"]).arg(&script).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["frame_rate"], 24.0);
    assert_eq!(report["frames"][1]["start"], 4320);
    assert_eq!(report["times"][1]["end"], 1000.0);
}

#[test]
fn test_trims_without_frame_rate_needs_probe() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", "FFVideoSource(\"ep01.mkv\")\nTrim(0, 100)\n");

    trimchap(dir.path()).arg("trims").arg(&script).assert().failure();
}

#[test]
fn test_source_command() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", "src = \"ep01\"\nFFVideoSource(src + \".mkv\")\n");

    let output = trimchap(dir.path()).arg("source").arg(&script).output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("Source: ep01.mkv"));
    assert!(stdout(&output).contains("src = \"ep01\""));
}

#[test]
fn test_source_json_lists_variables() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "ep01.avs",
        "##>frame_rate=24\nsrc = \"ep01\"\nFFVideoSource(src + \".mkv\")\n",
    );

    let output = trimchap(dir.path()).args(["source", "--json"]).arg(&script).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["source"], "ep01.mkv");
    assert_eq!(report["variables"]["src"], "\"ep01\"");
    assert!(report["variables"].get("##>frame_rate").is_none());
    assert_eq!(report["commands"]["frame_rate"], "24");
}

#[test]
fn test_stamp_fps() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", "FFVideoSource(\"ep01.mkv\")\n");

    trimchap(dir.path())
        .args(["stamp-fps", "--fps", "23.976"])
        .arg(&script)
        .assert()
        .success();

    let content = std::fs::read_to_string(&script).unwrap();
    assert!(content.ends_with("##>frame_rate=23.976\n"));
}

#[test]
fn test_config_file_suffix() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ep01.avs", SCRIPT);
    write_script(dir.path(), "trimchap.toml", "[document]\noutput_suffix = \".chapters.xml\"\n");

    trimchap(dir.path()).arg("chapters").arg(&script).assert().success();
    assert!(dir.path().join("ep01.chapters.xml").is_file());
}
