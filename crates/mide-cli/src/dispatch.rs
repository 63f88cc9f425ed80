use anyhow::{Result, bail};
use comfy_table::{Cell, ContentArrangement, Table};
use mide_app::{App, FormFlow};
use mide_core::doctor::{CheckState, DoctorReport};
use mide_core::guard::{ExitAttempt, ExitOutcome, GuardState};
use mide_core::navigation::{Navigation, NavigationBlock, QueryLocation};
use mide_core::session::StepPayload;
use mide_core::step::Step;
use mide_core::storage::FileSessionStorage;
use mide_core::validator::RequiredFieldsValidator;
use serde_json::Value;

use crate::cli::{Cli, Command, EditArgs, LeaveArgs};
use crate::drafts::DraftDirectoryService;
use crate::host::TerminalHost;
use crate::logging::init_logging;
use crate::prompt::PromptDriver;

type CliFlow<'a> = FormFlow<'a, QueryLocation, TerminalHost>;

pub fn run_with_deps(cli: Cli, prompt: &mut dyn PromptDriver) -> Result<()> {
    match cli.command {
        Command::Doctor => run_doctor_command(),
        command => run_form_command(command, cli.location, cli.verbose, prompt),
    }
}

fn run_doctor_command() -> Result<()> {
    let report = mide_app::doctor()?;
    print_doctor_report(&report);
    Ok(())
}

fn run_form_command(
    command: Command,
    location: Option<String>,
    verbose: bool,
    prompt: &mut dyn PromptDriver,
) -> Result<()> {
    let ready = mide_app::ensure_config_ready()?;
    init_logging(&ready.config.logging.level, verbose)?;

    let storage = FileSessionStorage::new(ready.session_path());
    let validator = RequiredFieldsValidator::from_rules(&ready.config.validation.rules);
    let drafts = DraftDirectoryService::new(ready.drafts_path());
    let app = App::new(&drafts, &validator, &storage);

    let location = QueryLocation::parse(location.as_deref().unwrap_or_default());
    let mut flow = app.open_flow(location, TerminalHost::new())?;

    execute(&mut flow, command, prompt)
}

fn execute(flow: &mut CliFlow<'_>, command: Command, prompt: &mut dyn PromptDriver) -> Result<()> {
    match command {
        Command::Doctor => run_doctor_command(),
        Command::Show => {
            print_session(flow);
            Ok(())
        }
        Command::Attendee { attendee_type } => {
            flow.select_attendee_type(attendee_type)?;
            println!("Attendee type: {attendee_type}");
            Ok(())
        }
        Command::Edit(args) => run_edit(flow, args),
        Command::Goto { step } => {
            let outcome = flow.go_to_step(step)?;
            report_navigation(flow, outcome)
        }
        Command::Next => {
            let outcome = flow.next_step()?;
            report_navigation(flow, outcome)
        }
        Command::Back => {
            let outcome = flow.previous_step()?;
            report_navigation(flow, outcome)
        }
        Command::Save { step } => {
            let step = step.unwrap_or(flow.session().current_step());
            let receipt = flow.save_step(step)?;
            match receipt.session_id {
                Some(id) => println!("Saved step {} as reservation {id}", receipt.step),
                None => println!("Saved step {}", receipt.step),
            }
            Ok(())
        }
        Command::Load { step } => {
            let payload = flow.load_step(step)?;
            println!("Loaded step {step}");
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Command::Leave(args) => run_leave(flow, args, prompt),
        Command::Complete => {
            match flow.complete()? {
                Some(id) => println!("Reservation {id} completed"),
                None => println!("Reservation completed"),
            }
            Ok(())
        }
        Command::Reset { yes } => {
            if !yes && !prompt.confirm_reset()? {
                println!("Reset cancelled");
                return Ok(());
            }
            flow.reset()?;
            println!("Reservation reset");
            Ok(())
        }
    }
}

fn run_edit(flow: &mut CliFlow<'_>, args: EditArgs) -> Result<()> {
    let count = args.fields.len();
    let payload = args
        .fields
        .into_iter()
        .map(|(key, raw)| (key, field_value(&raw)))
        .collect::<StepPayload>();

    flow.edit_step(args.step, payload)?;
    println!("Updated {count} field(s) in step {}", args.step);
    Ok(())
}

fn field_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn run_leave(flow: &mut CliFlow<'_>, args: LeaveArgs, prompt: &mut dyn PromptDriver) -> Result<()> {
    match flow.request_exit(args.via.into()) {
        ExitAttempt::Allowed => {
            println!("No unsaved changes, leaving the form");
            Ok(())
        }
        ExitAttempt::NativePrompt => {
            println!("Close blocked: unsaved changes need the host's own confirmation");
            Ok(())
        }
        ExitAttempt::Intercepted => {
            let resolution = match args.resolve {
                Some(choice) => choice.into(),
                None => prompt.choose_exit(&flow.session().unsaved_steps())?,
            };

            match flow.resolve_exit(resolution)? {
                ExitOutcome::Stayed => println!(
                    "Staying on step {} with unsaved changes",
                    flow.session().current_step()
                ),
                ExitOutcome::Saved => println!("Saved every edited step and left the form"),
                ExitOutcome::Discarded => println!("Discarded changes and left the form"),
            }
            Ok(())
        }
    }
}

fn report_navigation(flow: &CliFlow<'_>, outcome: Navigation) -> Result<()> {
    match outcome {
        Navigation::Moved { from, to } => {
            println!(
                "Moved from step {from} to step {to} ({})",
                flow.location().to_query_string()
            );
            Ok(())
        }
        Navigation::Unchanged => {
            println!("Staying on step {}", flow.session().current_step());
            Ok(())
        }
        Navigation::Blocked(NavigationBlock::MissingPrerequisites { target, missing }) => {
            bail!(
                "cannot open step {target}: fill in step(s) {} first",
                Step::join(&missing)
            )
        }
        Navigation::Blocked(NavigationBlock::CurrentStepIncomplete { step }) => {
            bail!("cannot leave step {step}: required fields are missing")
        }
    }
}

fn print_session(flow: &CliFlow<'_>) {
    let session = flow.session();

    println!(
        "Attendee type: {}",
        session
            .attendee_type()
            .map(|value| value.to_string())
            .unwrap_or_else(|| "not chosen".to_string())
    );
    println!(
        "Reservation: {}",
        session.session_id().unwrap_or("not saved yet")
    );
    println!("Current step: {}", session.current_step());
    println!("Status: {}", guard_label(flow.guard_state()));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Step", "Current", "Reachable", "Complete", "Fields"]);

    for step in Step::all() {
        let fields = session
            .get_step_data(step)
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(step.to_string()),
            Cell::new(yes_no(step == session.current_step())),
            Cell::new(yes_no(session.can_go_to_step(step))),
            Cell::new(yes_no(flow.is_step_valid(step))),
            Cell::new(fields),
        ]);
    }

    println!("{table}");
}

fn guard_label(state: GuardState) -> &'static str {
    match state {
        GuardState::Clean => "all changes saved",
        GuardState::Dirty => "unsaved changes",
        GuardState::ConfirmPending { .. } => "waiting for exit confirmation",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        let status = match check.state {
            CheckState::Pass => "PASS",
            CheckState::Fail => "FAIL",
        };

        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(status),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
