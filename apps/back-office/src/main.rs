//! # Silverline CLI Entry Point
//!
//! ```text
//! main.rs ────► init tracing, run one command, print JSON
//! lib.rs ─────► argument parsing, config, state, dispatch
//! ```
//!
//! Exit status is 0 on success and 1 when the command fails.

use std::process::ExitCode;

use silverline_back_office::{init_tracing, run, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args).await {
        Ok(serde_json::Value::String(text)) if text == USAGE => {
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
