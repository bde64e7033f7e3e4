//! Integration tests for the `tp` CLI.
//!
//! Each test points `tp` at a fresh temp data directory with `-C`, runs it as
//! a subprocess, and checks stdout and/or the stored files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tp` binary.
fn tp_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tp");
    path
}

/// Run `tp -C <dir> <args>`, returning (stdout, stderr, success).
fn run_tp(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tp_bin())
        .arg("-C")
        .arg(dir)
        .args(args)
        .current_dir(dir)
        .env_remove("TASKPAD_LOG")
        .output()
        .expect("failed to run tp");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tp` expecting success, return stdout.
fn run_tp_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tp(dir, args);
    if !success {
        panic!(
            "tp {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `tp` expecting failure, return stderr.
fn run_tp_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tp(dir, args);
    if success {
        panic!("tp {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

/// Add a task and return its id as printed by `tp add`.
fn add(dir: &Path, text: &str) -> String {
    run_tp_ok(dir, &["add", text]).trim().to_string()
}

fn list_json(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&run_tp_ok(dir, &["list", "--json"])).unwrap()
}

fn texts(section: &serde_json::Value) -> Vec<String> {
    section
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Buy milk");
    assert!(id.parse::<u64>().is_ok());

    let out = run_tp_ok(tmp.path(), &["list"]);
    assert!(out.contains("To-do"));
    assert!(out.contains("Buy milk"));
    assert!(out.contains(&id));
    assert!(!out.contains("Finished Tasks"));
}

#[test]
fn test_list_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tp_ok(tmp.path(), &["list"]);
    assert_eq!(out.trim(), "No tasks.");
}

#[test]
fn test_add_blank_text_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_tp_err(tmp.path(), &["add", "   "]);
    assert!(err.contains("task text is empty"));
    assert!(!tmp.path().join("todos.json").exists());
}

#[test]
fn test_add_too_long_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    let long = "x".repeat(51);
    let err = run_tp_err(tmp.path(), &["add", &long]);
    assert!(err.contains("max 50"));
}

#[test]
fn test_stored_layout() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Buy milk");
    let raw = fs::read_to_string(tmp.path().join("todos.json")).unwrap();
    let todos: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let task = &todos[0];
    assert_eq!(task["text"], "Buy milk");
    assert_eq!(task["completed"], false);
    assert_eq!(task["notes"], "");
    assert_eq!(task["comments"], serde_json::json!([]));
    assert_eq!(task["tags"], serde_json::json!([]));
}

#[test]
fn test_toggle_moves_task_to_finished() {
    let tmp = tempfile::TempDir::new().unwrap();
    let first = add(tmp.path(), "First");
    add(tmp.path(), "Second");
    add(tmp.path(), "Third");

    let out = run_tp_ok(tmp.path(), &["toggle", &first]);
    assert!(out.contains("completed"));

    let view = list_json(tmp.path());
    assert_eq!(texts(&view["incomplete"]), vec!["Second", "Third"]);
    assert_eq!(texts(&view["complete"]), vec!["First"]);

    // stored order is kept partitioned too
    let raw = fs::read_to_string(tmp.path().join("todos.json")).unwrap();
    let todos: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(texts(&todos), vec!["Second", "Third", "First"]);

    let out = run_tp_ok(tmp.path(), &["toggle", &first]);
    assert!(out.contains("reopened"));
    let view = list_json(tmp.path());
    assert!(view["complete"].as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_id_fails_without_changes() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Only");
    let before = fs::read_to_string(tmp.path().join("todos.json")).unwrap();

    let err = run_tp_err(tmp.path(), &["toggle", "42"]);
    assert!(err.contains("task not found: 42"));
    let err = run_tp_err(tmp.path(), &["rm", "42"]);
    assert!(err.contains("task not found"));

    let after = fs::read_to_string(tmp.path().join("todos.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_notes_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Write report");
    run_tp_ok(tmp.path(), &["note", &id, "outline first\nthen draft"]);

    let out = run_tp_ok(tmp.path(), &["show", &id]);
    assert!(out.contains("Write report"));
    assert!(out.contains("notes:"));
    assert!(out.contains("  outline first"));
    assert!(out.contains("  then draft"));

    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    assert_eq!(json["notes"], "outline first\nthen draft");
}

#[test]
fn test_comments_lifecycle() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Plan trip");

    let c1 = run_tp_ok(tmp.path(), &["comment", "add", &id, "book flights"])
        .trim()
        .to_string();
    let c2 = run_tp_ok(tmp.path(), &["comment", "add", &id, "hotel?"])
        .trim()
        .to_string();
    run_tp_ok(tmp.path(), &["comment", "edit", &id, &c2, "hotel booked"]);
    run_tp_ok(tmp.path(), &["comment", "rm", &id, &c1]);

    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    let comments = json["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "hotel booked");
    assert_eq!(comments[0]["id"].as_u64().unwrap().to_string(), c2);

    let err = run_tp_err(tmp.path(), &["comment", "edit", &id, &c1, "gone"]);
    assert!(err.contains("comment"));
}

#[test]
fn test_delete_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = add(tmp.path(), "Keep");
    let b = add(tmp.path(), "Drop");
    let out = run_tp_ok(tmp.path(), &["rm", &b]);
    assert!(out.contains("deleted"));
    let view = list_json(tmp.path());
    assert_eq!(texts(&view["incomplete"]), vec!["Keep"]);
    assert!(run_tp_ok(tmp.path(), &["show", &a]).contains("Keep"));
}

#[test]
fn test_delete_task_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Drop me");
    let out: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["rm", &id, "--json"])).unwrap();
    assert_eq!(out["id"].as_u64().unwrap().to_string(), id);
    assert_eq!(out["text"], "Drop me");
}

// ---------------------------------------------------------------------------
// Persistence policy
// ---------------------------------------------------------------------------

#[test]
fn test_deleting_last_task_stays_deleted() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Gone for good");
    run_tp_ok(tmp.path(), &["rm", &id]);
    assert_eq!(run_tp_ok(tmp.path(), &["list"]).trim(), "No tasks.");
    assert!(!tmp.path().join("todos.json").exists());
}

#[test]
fn test_empty_board_is_not_written_by_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tp_ok(tmp.path(), &["theme"]);
    assert!(!tmp.path().join("todos.json").exists());
    assert!(!tmp.path().join("tags.json").exists());
}

#[test]
fn test_save_empty_config_clears_snapshot() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[storage]\nsave_empty = true\n",
    )
    .unwrap();
    let id = add(tmp.path(), "Gone");
    run_tp_ok(tmp.path(), &["rm", &id]);
    let out = run_tp_ok(tmp.path(), &["list"]);
    assert_eq!(out.trim(), "No tasks.");
    assert_eq!(
        fs::read_to_string(tmp.path().join("todos.json")).unwrap(),
        "[]"
    );
}

#[test]
fn test_malformed_store_loads_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("todos.json"), "{{ not json").unwrap();
    fs::write(tmp.path().join("tags.json"), r#"["home"]"#).unwrap();
    let out = run_tp_ok(tmp.path(), &["list"]);
    assert_eq!(out.trim(), "No tasks.");
    let tags = run_tp_ok(tmp.path(), &["tag", "list"]);
    assert!(tags.contains("home"));
}

#[test]
fn test_malformed_config_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[storage\n").unwrap();
    let err = run_tp_err(tmp.path(), &["list"]);
    assert!(err.contains("config.toml"));
}

// ---------------------------------------------------------------------------
// Tags and filter
// ---------------------------------------------------------------------------

#[test]
fn test_tag_scenario() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Buy milk");
    run_tp_ok(tmp.path(), &["tag", "create", "urgent"]);
    run_tp_ok(tmp.path(), &["tag", "attach", &id, "urgent"]);

    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    assert_eq!(json["tags"], serde_json::json!(["urgent"]));

    run_tp_ok(tmp.path(), &["tag", "delete", "urgent"]);
    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    assert_eq!(json["tags"], serde_json::json!([]));
    let tags: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["tag", "list", "--json"])).unwrap();
    assert_eq!(tags, serde_json::json!([]));

    let view: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["list", "--tag", "urgent", "--json"]))
            .unwrap();
    assert!(view["incomplete"].as_array().unwrap().is_empty());
}

#[test]
fn test_tag_delete_with_remaining_tags() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Task");
    run_tp_ok(tmp.path(), &["tag", "create", "a"]);
    run_tp_ok(tmp.path(), &["tag", "create", "b"]);
    run_tp_ok(tmp.path(), &["tag", "set", &id, "a", "b"]);
    run_tp_ok(tmp.path(), &["tag", "delete", "a"]);

    let tags: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["tag", "list", "--json"])).unwrap();
    assert_eq!(tags, serde_json::json!(["b"]));
    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    assert_eq!(json["tags"], serde_json::json!(["b"]));
}

#[test]
fn test_tag_validation() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tp_ok(tmp.path(), &["tag", "create", "home"]);
    let err = run_tp_err(tmp.path(), &["tag", "create", "home"]);
    assert!(err.contains("already exists"));
    let err = run_tp_err(tmp.path(), &["tag", "create", &"t".repeat(21)]);
    assert!(err.contains("too long"));

    let id = add(tmp.path(), "Task");
    let err = run_tp_err(tmp.path(), &["tag", "attach", &id, "unknown"]);
    assert!(err.contains("does not exist"));
}

#[test]
fn test_tag_detach_and_set_clear() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), "Task");
    run_tp_ok(tmp.path(), &["tag", "create", "a"]);
    run_tp_ok(tmp.path(), &["tag", "create", "b"]);
    run_tp_ok(tmp.path(), &["tag", "set", &id, "b", "a", "b"]);
    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    assert_eq!(json["tags"], serde_json::json!(["b", "a"]));

    run_tp_ok(tmp.path(), &["tag", "detach", &id, "b"]);
    run_tp_ok(tmp.path(), &["tag", "set", &id]);
    let json: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["show", &id, "--json"])).unwrap();
    assert_eq!(json["tags"], serde_json::json!([]));
}

#[test]
fn test_filter_and_cascade_clears_it() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = add(tmp.path(), "Tagged");
    add(tmp.path(), "Plain");
    run_tp_ok(tmp.path(), &["tag", "create", "work"]);
    run_tp_ok(tmp.path(), &["tag", "create", "keep"]);
    run_tp_ok(tmp.path(), &["tag", "attach", &a, "work"]);

    run_tp_ok(tmp.path(), &["filter", "work"]);
    let out = run_tp_ok(tmp.path(), &["list"]);
    assert!(out.contains("filter: #work"));
    assert!(out.contains("Tagged"));
    assert!(!out.contains("Plain"));

    let all = run_tp_ok(tmp.path(), &["list", "--all"]);
    assert!(all.contains("Plain"));

    let marked = run_tp_ok(tmp.path(), &["tag", "list"]);
    assert!(marked.contains("* work"));

    run_tp_ok(tmp.path(), &["tag", "delete", "work"]);
    let out = run_tp_ok(tmp.path(), &["list"]);
    assert!(!out.contains("filter:"));
    assert!(out.contains("Plain"));

    let empty = run_tp_ok(tmp.path(), &["list", "--tag", "work", "--json"]);
    let view: serde_json::Value = serde_json::from_str(&empty).unwrap();
    assert!(view["incomplete"].as_array().unwrap().is_empty());
    assert!(view["complete"].as_array().unwrap().is_empty());
}

#[test]
fn test_filter_requires_registered_tag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_tp_err(tmp.path(), &["filter", "nope"]);
    assert!(err.contains("tag not found"));
    run_tp_ok(tmp.path(), &["filter", "--clear"]);
}

// ---------------------------------------------------------------------------
// Display mode
// ---------------------------------------------------------------------------

#[test]
fn test_theme_toggle_and_set() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(run_tp_ok(tmp.path(), &["theme"]).trim(), "dark");
    assert_eq!(run_tp_ok(tmp.path(), &["theme"]).trim(), "light");
    assert_eq!(run_tp_ok(tmp.path(), &["theme", "dark"]).trim(), "dark");

    let state = fs::read_to_string(tmp.path().join(".state.json")).unwrap();
    assert!(state.contains("\"dark\""));
}

#[test]
fn test_theme_default_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[ui]\ndisplay_mode = \"dark\"\n",
    )
    .unwrap();
    assert_eq!(run_tp_ok(tmp.path(), &["theme"]).trim(), "light");
}

#[test]
fn test_piped_output_has_no_escapes() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Plain text");
    let out = run_tp_ok(tmp.path(), &["list"]);
    assert!(!out.contains('\u{1b}'));
}

// ---------------------------------------------------------------------------
// Search and check
// ---------------------------------------------------------------------------

#[test]
fn test_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = add(tmp.path(), "Buy milk");
    let b = add(tmp.path(), "Call mom");
    run_tp_ok(tmp.path(), &["comment", "add", &b, "ask about the milk recipe"]);

    let out = run_tp_ok(tmp.path(), &["search", "milk"]);
    assert!(out.contains(&format!("{} text: Buy milk", a)));
    assert!(out.contains("ask about the milk recipe"));

    let out = run_tp_ok(tmp.path(), &["search", "zebra"]);
    assert_eq!(out.trim(), "No matches.");

    let err = run_tp_err(tmp.path(), &["search", "("]);
    assert!(err.contains("invalid regex"));
}

#[test]
fn test_check_reports_import_problems() {
    let tmp = tempfile::TempDir::new().unwrap();
    let doc = tmp.path().join("bad.json");
    fs::write(
        &doc,
        r#"{"tasks":[{"id":1,"text":"a","tags":["ghost"]},{"id":1,"text":"b"}],"tags":[]}"#,
    )
    .unwrap();
    run_tp_ok(tmp.path(), &["import", doc.to_str().unwrap()]);

    let result: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["check", "--json"])).unwrap();
    assert_eq!(result["valid"], false);
    let types: Vec<&str> = result["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"duplicate_task_id"));
    assert!(types.contains(&"unregistered_tag"));
}

#[test]
fn test_check_clean() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Fine");
    assert_eq!(run_tp_ok(tmp.path(), &["check"]).trim(), "ok");
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

#[test]
fn test_export_import_round_trip() {
    let src = tempfile::TempDir::new().unwrap();
    let id = add(src.path(), "Buy milk");
    add(src.path(), "Done thing");
    run_tp_ok(src.path(), &["tag", "create", "errand"]);
    run_tp_ok(src.path(), &["tag", "attach", &id, "errand"]);
    run_tp_ok(src.path(), &["comment", "add", &id, "oat?"]);
    run_tp_ok(src.path(), &["note", &id, "2 litres"]);

    run_tp_ok(src.path(), &["export"]);
    let export_path = src.path().join("tasks.json");
    assert!(export_path.exists());
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
    assert!(doc["tasks"].is_array());
    assert_eq!(doc["tags"], serde_json::json!(["errand"]));

    let dst = tempfile::TempDir::new().unwrap();
    run_tp_ok(dst.path(), &["import", export_path.to_str().unwrap()]);

    let before: serde_json::Value =
        serde_json::from_str(&run_tp_ok(src.path(), &["export", "-o", "-"])).unwrap();
    let after: serde_json::Value =
        serde_json::from_str(&run_tp_ok(dst.path(), &["export", "-o", "-"])).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_import_replaces_everything() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Old task");
    run_tp_ok(tmp.path(), &["tag", "create", "old"]);
    run_tp_ok(tmp.path(), &["filter", "old"]);

    let doc = tmp.path().join("new.json");
    fs::write(
        &doc,
        r#"{"tasks":[{"id":5,"text":"New task","completed":false,"notes":"","comments":[],"tags":["fresh"]}],"tags":["fresh"]}"#,
    )
    .unwrap();
    run_tp_ok(tmp.path(), &["import", doc.to_str().unwrap()]);

    let out = run_tp_ok(tmp.path(), &["list"]);
    assert!(out.contains("New task"));
    assert!(!out.contains("Old task"));
    // filter on a label the new registry lacks is dropped
    assert!(!out.contains("filter:"));
    let tags: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["tag", "list", "--json"])).unwrap();
    assert_eq!(tags, serde_json::json!(["fresh"]));
}

#[test]
fn test_import_malformed_is_surfaced() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Survivor");
    let before = fs::read_to_string(tmp.path().join("todos.json")).unwrap();

    let doc = tmp.path().join("broken.json");
    fs::write(&doc, "{ \"tasks\": [").unwrap();
    let err = run_tp_err(tmp.path(), &["import", doc.to_str().unwrap()]);
    assert!(err.contains("could not parse snapshot"));

    let after = fs::read_to_string(tmp.path().join("todos.json")).unwrap();
    assert_eq!(before, after);
    assert!(run_tp_ok(tmp.path(), &["list"]).contains("Survivor"));
}

#[test]
fn test_import_missing_fields_default_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let doc = tmp.path().join("tags_only.json");
    fs::write(&doc, r#"{"tags":["a","b"]}"#).unwrap();
    run_tp_ok(tmp.path(), &["import", doc.to_str().unwrap()]);
    let tags: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["tag", "list", "--json"])).unwrap();
    assert_eq!(tags, serde_json::json!(["a", "b"]));
    assert_eq!(run_tp_ok(tmp.path(), &["list"]).trim(), "No tasks.");
}

#[test]
fn test_import_tags_only_onto_existing_board() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), "Old task");
    run_tp_ok(tmp.path(), &["tag", "create", "old"]);

    let doc = tmp.path().join("tags_only.json");
    fs::write(&doc, r#"{"tags":["a"]}"#).unwrap();
    run_tp_ok(tmp.path(), &["import", doc.to_str().unwrap()]);

    let out = run_tp_ok(tmp.path(), &["list"]);
    assert!(!out.contains("Old task"));
    assert_eq!(out.trim(), "No tasks.");
    let tags: serde_json::Value =
        serde_json::from_str(&run_tp_ok(tmp.path(), &["tag", "list", "--json"])).unwrap();
    assert_eq!(tags, serde_json::json!(["a"]));
}

#[test]
fn test_add_after_importing_max_id() {
    let tmp = tempfile::TempDir::new().unwrap();
    let doc = tmp.path().join("max.json");
    fs::write(&doc, r#"{"tasks":[{"id":18446744073709551615,"text":"x"}]}"#).unwrap();
    run_tp_ok(tmp.path(), &["import", doc.to_str().unwrap()]);

    let err = run_tp_err(tmp.path(), &["add", "y"]);
    assert!(err.contains("no task ids left"));
    assert!(!err.contains("panicked"));
    let view = list_json(tmp.path());
    assert_eq!(texts(&view["incomplete"]), vec!["x"]);
}
