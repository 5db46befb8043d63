use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
	let cli = rsassc_cli::Cli::parse();
	match rsassc_cli::run(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			rsassc_cli::report_error(&err);
			ExitCode::from(err.exit_code())
		}
	}
}
