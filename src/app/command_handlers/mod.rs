use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::CliError;

pub mod chat;
pub mod report;
pub mod settings;

pub fn run_cli(args: Vec<String>) -> Result<String, CliError> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Chat => chat::cmd_chat(&args[1..]),
        CliVerb::Report => report::cmd_report(&args[1..]),
        CliVerb::Settings => settings::cmd_settings(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(CliError::Usage(format!(
            "unknown command `{}`\n\n{}",
            args[0],
            help_text()
        ))),
    }
}
