//! Basic CLI E2E tests.
//!
//! Tests invoke the CLI binary and verify outputs. Each test gets its own
//! HOME so the config file never touches the real one.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_studypace-cli"))
        .args(args)
        .env("HOME", home)
        .env("STUDYPACE_ENV", "dev")
        .env_remove("GEMINI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Write a PDF with `pages` one-line pages.
fn write_pdf(path: &Path, pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut kids: Vec<Object> = Vec::new();
    for i in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Slide {}", i + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn json_events(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[test]
fn test_help() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["--help"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("study"));
    assert!(stdout.contains("inspect"));
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "pacing.review_every"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "boredom.timeout_secs", "90"], "");
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "boredom.timeout_secs"], "");
    assert_eq!(stdout.trim(), "90");

    let (stdout, _, code) = run_cli(home.path(), &["config", "path"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("studypace-dev"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "pacing.nope", "1"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_inspect_counts_pages() {
    let home = tempfile::tempdir().unwrap();
    let pdf = home.path().join("deck.pdf");
    write_pdf(&pdf, 4);
    let (stdout, _, code) = run_cli(home.path(), &["inspect", pdf.to_str().unwrap()], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("4 slides"));

    let (stdout, _, code) = run_cli(
        home.path(),
        &["inspect", pdf.to_str().unwrap(), "--page", "2"],
        "",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Page 2 of 4"));
}

#[test]
fn test_powerpoint_upload_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let deck = home.path().join("lecture.pptx");
    std::fs::write(&deck, b"PK\x03\x04").unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["inspect", deck.to_str().unwrap()], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("converted to PDF first"));
}

#[test]
fn test_study_session_events() {
    let home = tempfile::tempdir().unwrap();
    let pdf = home.path().join("deck.pdf");
    write_pdf(&pdf, 3);
    let (stdout, _, code) = run_cli(
        home.path(),
        &["study", pdf.to_str().unwrap(), "--events", "--no-summary", "--goal", "Renal"],
        "hard\nr\nq\n",
    );
    assert_eq!(code, 0);

    let events = json_events(&stdout);
    let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(types.first(), Some(&"session_started"));
    assert_eq!(events[0]["goal"], "Renal");
    assert_eq!(events[0]["slides_total"], 3);
    assert!(events
        .iter()
        .any(|e| e["type"] == "slide_time_allocated" && e["allocated_secs"] == 240));
    assert!(types.contains(&"slide_marked_for_review"));
    assert_eq!(types.last(), Some(&"session_exited"));
}

#[test]
fn test_study_runs_to_summary_with_manual_next() {
    let home = tempfile::tempdir().unwrap();
    let pdf = home.path().join("deck.pdf");
    write_pdf(&pdf, 2);
    let (stdout, _, code) = run_cli(
        home.path(),
        &["study", pdf.to_str().unwrap(), "--no-summary"],
        "30\nn\n45\nn\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Session complete"));
    assert!(stdout.contains("Slides completed:  2/2"));
}

#[test]
fn test_ask_without_key_prints_notice() {
    let home = tempfile::tempdir().unwrap();
    let pdf = home.path().join("deck.pdf");
    write_pdf(&pdf, 1);
    let (_, stderr, code) = run_cli(
        home.path(),
        &["ask", pdf.to_str().unwrap(), "--page", "1", "--quick", "explain"],
        "",
    );
    assert_eq!(code, 0);
    assert!(stderr.contains("GEMINI_API_KEY"));
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("studypace-cli"));
}
