mod support;

use predicates::prelude::*;
use serde_json::json;

use support::{
    command_in, new_command_with_temp_home, read_session, run_ok, session_file, write_config,
    write_valid_config,
};

#[test]
fn root_help_runs_without_config() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mide"))
        .stdout(predicate::str::contains("--location"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("leave"));
}

#[test]
fn doctor_runs_without_config() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("config file exists"))
        .stdout(predicate::str::contains(".config/mide/config.toml"))
        .stdout(predicate::str::contains("0 passed, 3 failed"));
}

#[test]
fn doctor_passes_with_valid_config() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_valid_config(temp_home.path());

    command
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 passed, 0 failed"));
}

#[test]
fn form_commands_are_gated_without_config() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing config at"))
        .stderr(predicate::str::contains(".config/mide/config.toml"));
}

#[test]
fn invalid_config_is_reported() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_config(temp_home.path(), "version = 2\n");

    command
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config at"));
}

#[test]
fn out_of_range_step_is_rejected_by_the_parser() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_valid_config(temp_home.path());

    command
        .args(["goto", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step must be a number from 1 to 3"));
}

#[test]
fn school_journey_is_gated_by_required_fields() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    assert!(run_ok(home, &["attendee", "school"]).contains("Attendee type: school"));
    run_ok(home, &["edit", "1", "contact_name=Lucía"]);

    command_in(home)
        .arg("next")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cannot leave step 1: required fields are missing",
        ));

    run_ok(home, &["edit", "1", "center_name=IES Murcia", "pupils=24"]);
    let moved = run_ok(home, &["next"]);
    assert!(moved.contains("Moved from step 1 to step 2 (?step=2)"));

    let shown = run_ok(home, &["show"]);
    assert!(shown.contains("Attendee type: school"));
    assert!(shown.contains("Current step: 2"));
    assert!(shown.contains("Status: unsaved changes"));
    assert!(shown.contains("center_name, contact_name, pupils"));

    let session = read_session(home);
    assert_eq!(session["current_step"], 2);
    assert_eq!(session["step_data"]["1"]["pupils"], 24);
    assert_eq!(session["unsaved_steps"], json!([1]));
}

#[test]
fn skipping_ahead_requires_earlier_steps() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "general"]);
    run_ok(home, &["edit", "1", "visit_date=2026-11-03"]);

    command_in(home)
        .args(["goto", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cannot open step 3: fill in step(s) 2 first",
        ));
    assert!(run_ok(home, &["back"]).contains("Staying on step 1"));
}

#[test]
fn landing_location_selects_the_step() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["edit", "1", "a=1"]);
    run_ok(home, &["edit", "2", "b=2"]);

    let shown = run_ok(home, &["--location", "?step=3&lang=es", "show"]);
    assert!(shown.contains("Current step: 3"));
    assert_eq!(read_session(home)["current_step"], 3);

    let malformed = run_ok(home, &["--location", "step=nine", "show"]);
    assert!(malformed.contains("Current step: 3"));
}

#[test]
fn landing_location_past_the_filled_steps_stops_at_the_first_gap() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    let fresh = run_ok(home, &["--location", "?step=3", "show"]);
    assert!(fresh.contains("Current step: 1"));

    run_ok(home, &["edit", "1", "a=1"]);
    let partial = run_ok(home, &["--location", "?step=3", "show"]);
    assert!(partial.contains("Current step: 2"));
    assert_eq!(read_session(home)["current_step"], 2);
}

#[test]
fn saving_one_step_keeps_other_edits_guarded() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "general"]);
    run_ok(home, &["edit", "1", "a=1"]);
    run_ok(home, &["edit", "2", "b=2"]);
    run_ok(home, &["save", "2"]);
    assert_eq!(read_session(home)["unsaved_steps"], json!([1]));

    let output = run_ok(home, &["leave", "--resolve", "continue"]);
    assert!(output.contains("Staying on step 1 with unsaved changes"));

    let output = run_ok(home, &["leave", "--resolve", "save"]);
    assert!(output.contains("Saved every edited step and left the form"));
    assert_eq!(read_session(home)["unsaved_steps"], json!([]));
}

#[test]
fn attendee_type_is_locked_once_chosen() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "company"]);
    run_ok(home, &["attendee", "company"]);
    command_in(home)
        .args(["attendee", "school"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to select attendee type"));
}

#[test]
fn save_then_load_round_trips_through_drafts() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "company"]);
    run_ok(home, &["edit", "1", "company=Acme"]);
    let saved = run_ok(home, &["save"]);
    assert!(saved.contains("Saved step 1 as reservation local-"));

    let session = read_session(home);
    assert_eq!(session["unsaved_steps"], json!([]));
    let id = session["session_id"].as_str().expect("session id").to_string();
    assert!(
        home.join(".config")
            .join("mide")
            .join("drafts")
            .join(&id)
            .join("step-1.json")
            .exists()
    );

    let loaded = run_ok(home, &["load", "1"]);
    assert!(loaded.contains("Loaded step 1"));
    assert!(loaded.contains("\"company\": \"Acme\""));
}

#[test]
fn load_before_any_save_fails() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    command_in(home)
        .args(["load", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no reservation has been saved yet"));
}

#[test]
fn leaving_without_edits_is_allowed() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    assert!(run_ok(home, &["leave"]).contains("No unsaved changes, leaving the form"));
}

#[test]
fn leave_with_discard_clears_the_session() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["edit", "1", "a=1"]);
    assert!(session_file(home).exists());

    let output = run_ok(home, &["leave", "--via", "back", "--resolve", "discard"]);
    assert!(output.contains("Discarded changes and left the form"));
    assert!(!session_file(home).exists());
}

#[test]
fn leave_with_continue_keeps_the_edits() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["edit", "1", "a=1"]);
    let output = run_ok(home, &["leave", "--resolve", "continue"]);
    assert!(output.contains("Staying on step 1 with unsaved changes"));
    assert_eq!(read_session(home)["unsaved_steps"], json!([1]));
}

#[test]
fn leave_with_save_pushes_the_current_step() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "general"]);
    run_ok(home, &["edit", "1", "a=1"]);
    let output = run_ok(home, &["leave", "--resolve", "save"]);
    assert!(output.contains("Saved every edited step and left the form"));

    let session = read_session(home);
    assert_eq!(session["unsaved_steps"], json!([]));
    assert!(session["session_id"].is_string());
}

#[test]
fn closing_with_unsaved_edits_defers_to_the_host_prompt() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["edit", "1", "a=1"]);
    let output = run_ok(home, &["leave", "--via", "close"]);
    assert!(output.contains("Close blocked"));
    assert!(session_file(home).exists());
}

#[test]
fn complete_requires_every_step_saved() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "general"]);
    run_ok(home, &["edit", "1", "a=1"]);
    command_in(home)
        .arg("complete")
        .assert()
        .failure()
        .stderr(predicate::str::contains("incomplete steps 2, 3"));

    run_ok(home, &["edit", "2", "b=2"]);
    run_ok(home, &["edit", "3", "c=3"]);
    command_in(home)
        .arg("complete")
        .assert()
        .failure()
        .stderr(predicate::str::contains("while edits are unsaved"));

    run_ok(home, &["save", "1"]);
    run_ok(home, &["save", "2"]);
    run_ok(home, &["save", "3"]);
    let output = run_ok(home, &["complete"]);
    assert!(output.contains("Reservation local-"));
    assert!(output.contains("completed"));
    assert!(!session_file(home).exists());
}

#[test]
fn reset_with_yes_discards_the_session() {
    let temp_home = tempfile::tempdir().expect("temp home");
    let home = temp_home.path();
    write_valid_config(home);

    run_ok(home, &["attendee", "school"]);
    run_ok(home, &["edit", "1", "center_name=IES"]);
    assert!(run_ok(home, &["reset", "--yes"]).contains("Reservation reset"));
    assert!(!session_file(home).exists());

    let shown = run_ok(home, &["show"]);
    assert!(shown.contains("Attendee type: not chosen"));
    assert!(shown.contains("Current step: 1"));
}
