mod common;

use assert_cmd::Command;
use common::{reply, Server};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn uploader_cmd(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("paperless-uploader").unwrap();
    cmd.env("PAPERLESS_UPLOADER_CONFIG", config.as_os_str())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_files_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    // Unreachable server: any network call would show up as a request error.
    let config = temp.path().join("paperless-uploader.ini");
    fs::write(&config, "[server]\nurl = http://127.0.0.1:9\nusername = a\npassword = b\n").unwrap();

    uploader_cmd(&config)
        .args(["--tag", "Invoices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no files given"))
        .stdout(predicate::str::contains("Found/Made Tag").not());
}

#[test]
fn test_missing_config_points_to_login() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("missing.ini");

    uploader_cmd(&config)
        .arg("invoice.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--login"));
}

#[test]
fn test_empty_server_url_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperless-uploader.ini");
    fs::write(&config, "[server]\nusername = a\n").unwrap();

    uploader_cmd(&config)
        .arg("invoice.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("server URL is empty"));
}

#[test]
fn test_login_requires_a_terminal() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperless-uploader.ini");

    uploader_cmd(&config)
        .arg("--login")
        .write_stdin("http://h\na\nb\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a terminal"));
    assert!(!config.exists());
}

#[test]
fn test_missing_file_is_reported_and_batch_continues() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("paperless-uploader.ini");
    fs::write(&config, "[server]\nurl = http://127.0.0.1:9\nusername = a\npassword = b\n").unwrap();
    let missing_a = temp.path().join("a.pdf");
    let missing_b = temp.path().join("b.pdf");

    // Without a tag nothing is resolved, so both files fail locally.
    uploader_cmd(&config)
        .arg(&missing_a)
        .arg(&missing_b)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.pdf").and(predicate::str::contains("b.pdf")))
        .stdout(predicate::str::contains("cannot read"));
}

#[test]
fn test_failed_tag_creation_shows_server_response() {
    let temp = TempDir::new().unwrap();
    let document = temp.path().join("a.pdf");
    fs::write(&document, "%PDF-1.4").unwrap();

    let server = Server::start(vec![
        reply(200, r#"{"next":null,"results":[]}"#),
        reply(400, r#"{"name":["Tag with this name already exists."]}"#),
    ]);
    let config = temp.path().join("paperless-uploader.ini");
    fs::write(
        &config,
        format!("[server]\nurl = {}\nusername = a\npassword = b\n", server.url),
    )
    .unwrap();

    uploader_cmd(&config)
        .args(["--tag", "Invoices"])
        .arg(&document)
        .assert()
        .failure()
        .stderr(predicate::str::contains("400 Bad Request"))
        .stderr(predicate::str::contains("Tag with this name already exists."));

    let received = server.received();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].request_line(), "POST /api/tags/ HTTP/1.1");
}
