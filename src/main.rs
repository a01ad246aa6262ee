//! Binary entry point for pdf-chat.
//!
//! pdf-chat: ask questions about large PDF documents.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use pdf_chat::cli::output::{OutputFormat, format_error};
use pdf_chat::cli::{Cli, execute};
use pdf_chat::{config, logging};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    // .env must be loaded before clap reads env-backed flags
    config::load_dotenv(None);
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let format = OutputFormat::parse(&cli.format);

    match execute(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                // Handle broken pipe gracefully (e.g., when piped to `head` or `jq`)
                if let Err(e) = write!(io::stdout(), "{output}")
                    && e.kind() != io::ErrorKind::BrokenPipe
                {
                    eprintln!("Error writing to stdout: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let error_output = format_error(&e, format);
            match format {
                OutputFormat::Json => {
                    // JSON errors go to stdout for programmatic parsing
                    println!("{error_output}");
                }
                OutputFormat::Text => {
                    eprintln!("Error: {error_output}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
