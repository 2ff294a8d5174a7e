//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Write a miniature reference lexicon into `dir`.
fn write_lexicon(dir: &Path) -> PathBuf {
    let path = dir.join("lexicon.tsv");
    fs::write(
        &path,
        "ortho\tlemme\tcgram\tfreq\tis_lem\tcgramortho\tcategorie\tnotes\n\
         le\tle\tART:def\t38000.0\t1\t\t\t\n\
         chat\tchat\tNOM\t26.0\t1\t\t\t\n\
         chats\tchat\tNOM\t26.0\t0\t\t\t\n\
         dort\tdormir\tVER\t249.0\t0\t\t\t\n\
         dormir\tdormir\tVER\t249.0\t1\t\t\t\n\
         ronronne\tronronner\tVER\t2.0\t0\t\t\t\n\
         ronronner\tronronner\tVER\t2.0\t1\t\t\t\n\
         rêve\trêver\tVER\t96.0\t0\t\t\t\n\
         rêver\trêver\tVER\t96.0\t1\t\t\t\n\
         est\têtre\tVER\t15085.47\t0\t\t\t\n\
         est\test\tNOM\t42.0\t1\t\t\t\n\
         être\têtre\tAUX\t15085.47\t1\t\t\t\n",
    )
    .unwrap();
    path
}

/// Write the three-cats sample text into `dir`.
fn write_text(dir: &Path) -> PathBuf {
    let path = dir.join("essai.txt");
    fs::write(&path, "Le chat dort. Le chat ronronne. Le chat rêve.").unwrap();
    path
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_outputs_valid_json() {
    let output = cmd().arg("info").arg("--json").assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("info --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn quiet_flag_accepted() {
    cmd().args(["--quiet", "info"]).assert().success();
}

#[test]
fn verbose_flags_accepted() {
    cmd().args(["-vv", "info"]).assert().success();
}

#[test]
fn color_never_accepted() {
    cmd().args(["--color", "never", "info"]).assert().success();
}

// =============================================================================
// Analyze Command
// =============================================================================

#[test]
fn analyze_reports_the_chat_cluster() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = write_text(tmp.path());

    cmd()
        .arg("analyze")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("Clusters:"));
}

#[test]
fn analyze_json_contains_cluster_stats() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = write_text(tmp.path());

    let output = cmd()
        .arg("analyze")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("analyze --json should output valid JSON");

    assert_eq!(json["stats"]["total_clusters"], 1);
    assert_eq!(json["stats"]["total_words"], 9);
}

#[test]
fn analyze_rejects_invalid_max_distance() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = write_text(tmp.path());

    cmd()
        .arg("analyze")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--max-distance")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid max_distance"));
}

#[test]
fn analyze_missing_input_fails() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());

    cmd()
        .arg("analyze")
        .arg(tmp.path().join("absent.txt"))
        .arg("--lexicon")
        .arg(&lexicon)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn analyze_missing_lexicon_fails() {
    let tmp = TempDir::new().unwrap();
    let text = write_text(tmp.path());

    cmd()
        .arg("analyze")
        .arg(&text)
        .arg("--lexicon")
        .arg(tmp.path().join("absent.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load lexicon"));
}

// =============================================================================
// Report Command
// =============================================================================

#[test]
fn report_writes_html_and_override_lexicon() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = write_text(tmp.path());

    cmd()
        .arg("report")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .assert()
        .success()
        .stdout(predicate::str::contains("essai_report.html"));

    let html = fs::read_to_string(tmp.path().join("essai_report.html")).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains(r#"<span class="highlight">chat</span>"#));

    // "Le"/"ronronne"/"rêve" are covered by the mini lexicon; nothing in the
    // sample text is unknown, so the export stays header-only but exists.
    assert!(tmp.path().join("essai_custom_lexicon.tsv").is_file());
}

#[test]
fn report_respects_output_flag_and_no_export() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = write_text(tmp.path());
    let output = tmp.path().join("out.html");

    cmd()
        .arg("report")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--output")
        .arg(&output)
        .arg("--no-export")
        .assert()
        .success();

    assert!(output.is_file());
    assert!(!tmp.path().join("essai_custom_lexicon.tsv").exists());
}

#[test]
fn report_json_mentions_output_path() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = write_text(tmp.path());

    let output = cmd()
        .arg("report")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert!(
        json["output"]
            .as_str()
            .unwrap()
            .ends_with("essai_report.html")
    );
}

#[test]
fn report_picks_up_override_lexicon() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = tmp.path().join("essai.txt");
    fs::write(&text, "Le chat et le trail. Le chat et le trail.").unwrap();

    // Override recategorizes "trail" as a foreign word.
    fs::write(
        tmp.path().join("essai_custom_lexicon.tsv"),
        "ortho\tlemme\tcgram\tfreq\tis_lem\ntrail\ttrail\tETRANGER\t2\t1\n",
    )
    .unwrap();

    let output = cmd()
        .arg("report")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert!(json["stats"]["total_clusters"].as_u64().unwrap() >= 1);

    let html = fs::read_to_string(tmp.path().join("essai_report.html")).unwrap();
    assert!(html.contains("Mots étrangers"));
}

// =============================================================================
// Classify Command
// =============================================================================

#[test]
fn classify_shows_ambiguity_resolution() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = tmp.path().join("essai.txt");
    fs::write(&text, "Le chat est beau. Le chat est là.").unwrap();

    cmd()
        .arg("classify")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .assert()
        .success()
        .stdout(predicate::str::contains("est"))
        .stdout(predicate::str::contains("AUX"));
}

#[test]
fn classify_json_lists_readings_by_frequency() {
    let tmp = TempDir::new().unwrap();
    let lexicon = write_lexicon(tmp.path());
    let text = tmp.path().join("essai.txt");
    fs::write(&text, "Le chat est beau.").unwrap();

    let output = cmd()
        .arg("classify")
        .arg(&text)
        .arg("--lexicon")
        .arg(&lexicon)
        .arg("--json")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");

    let est = json["ambiguous_words"]
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["word"] == "est")
        .expect("est should be ambiguous");
    assert_eq!(est["chosen"], "AUX");
    let readings = est["readings"].as_array().unwrap();
    assert_eq!(readings[0]["cgram"], "AUX");
    assert!(readings[0]["freq"].as_f64().unwrap() > readings[1]["freq"].as_f64().unwrap());
}
