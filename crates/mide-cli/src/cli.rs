use clap::{Args, Parser, Subcommand, ValueEnum};
use mide_core::guard::{ExitPathway, ExitResolution};
use mide_core::step::{AttendeeType, Step};

#[derive(Debug, Parser)]
#[command(name = "mide")]
#[command(bin_name = "mide")]
#[command(version)]
#[command(about = "Multi-step reservation form wizard")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Query string of the page the user landed on, e.g. `step=2`.
    #[arg(long, global = true, value_name = "QUERY")]
    pub location: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run environment and configuration checks")]
    Doctor,
    #[command(about = "Show the reservation in progress")]
    Show,
    #[command(about = "Choose the attendee type for this reservation")]
    Attendee {
        #[arg(value_name = "TYPE")]
        attendee_type: AttendeeType,
    },
    #[command(about = "Merge key=value fields into a step")]
    Edit(EditArgs),
    #[command(about = "Jump to a step if its prerequisites are filled in")]
    Goto {
        #[arg(value_parser = parse_step)]
        step: Step,
    },
    #[command(about = "Advance to the next step")]
    Next,
    #[command(about = "Return to the previous step")]
    Back,
    #[command(about = "Send a step to the reservation service")]
    Save {
        /// Defaults to the current step.
        #[arg(value_parser = parse_step)]
        step: Option<Step>,
    },
    #[command(about = "Fetch a saved step from the reservation service")]
    Load {
        #[arg(value_parser = parse_step)]
        step: Step,
    },
    #[command(about = "Leave the form, confirming if edits are unsaved")]
    Leave(LeaveArgs),
    #[command(about = "Finish the reservation and clear the session")]
    Complete,
    #[command(about = "Discard the reservation in progress")]
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(value_parser = parse_step)]
    pub step: Step,

    /// Values parse as JSON when they can, otherwise as plain text.
    #[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct LeaveArgs {
    #[arg(long, value_enum, default_value_t = ExitVia::Leave)]
    pub via: ExitVia,

    /// Answer the unsaved-changes dialog without prompting.
    #[arg(long, value_enum)]
    pub resolve: Option<ResolveChoice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExitVia {
    Close,
    Back,
    Leave,
}

impl From<ExitVia> for ExitPathway {
    fn from(value: ExitVia) -> Self {
        match value {
            ExitVia::Close => Self::TabClose,
            ExitVia::Back => Self::BackNavigation,
            ExitVia::Leave => Self::LeaveFlow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveChoice {
    Continue,
    Save,
    Discard,
}

impl From<ResolveChoice> for ExitResolution {
    fn from(value: ResolveChoice) -> Self {
        match value {
            ResolveChoice::Continue => Self::Continue,
            ResolveChoice::Save => Self::Save,
            ResolveChoice::Discard => Self::Discard,
        }
    }
}

pub fn parse_step(raw: &str) -> Result<Step, String> {
    Step::parse_param(raw).ok_or_else(|| {
        format!(
            "step must be a number from {} to {}",
            Step::FIRST,
            Step::LAST
        )
    })
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("field name is empty in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_step_accepts_only_known_steps() {
        assert_eq!(parse_step("2"), Ok(Step::SECOND));
        assert!(parse_step("0").is_err());
        assert!(parse_step("4").is_err());
        assert!(parse_step("two").is_err());
    }

    #[test]
    fn parse_field_splits_on_first_equals() {
        assert_eq!(
            parse_field("note=a=b"),
            Ok(("note".to_string(), "a=b".to_string()))
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=value").is_err());
    }

    #[test]
    fn edit_collects_fields_and_global_location() {
        let cli = Cli::try_parse_from([
            "mide",
            "edit",
            "1",
            "center=IES",
            "pupils=24",
            "--location",
            "step=1",
        ])
        .expect("parse");

        assert_eq!(cli.location.as_deref(), Some("step=1"));
        match cli.command {
            Command::Edit(args) => {
                assert_eq!(args.step, Step::FIRST);
                assert_eq!(args.fields.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn attendee_type_parses_through_from_str() {
        let cli = Cli::try_parse_from(["mide", "attendee", "summer-course"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Attendee {
                attendee_type: AttendeeType::SummerCourse
            }
        ));
    }
}
