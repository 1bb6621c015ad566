//! sitepeek - inspect and bundle a web page's assets

use std::process::ExitCode;

use colored::Colorize;
use sitepeek_cli::error::exit_code_from_error;

#[tokio::main]
async fn main() -> ExitCode {
    match sitepeek_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
