use quarto_assistant::app::{run_cli, CliError};

fn output_header() -> &'static str {
    "Quarto Assistant\nAnswers data science questions with rendered Quarto documents."
}

fn run() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "help" {
        println!("{}\n", output_header());
    }
    let output = run_cli(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}
