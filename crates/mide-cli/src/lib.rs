pub mod cli;
pub mod dispatch;
pub mod drafts;
pub mod host;
pub mod logging;
pub mod prompt;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::prompt::InquirePromptDriver;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut prompt = InquirePromptDriver::new();

    dispatch::run_with_deps(cli, &mut prompt)
}
