// src/main.rs

use leitner_lib::commands;
use leitner_lib::constants::DEFAULT_LOG_FILTER;
use log::{error, info};
use std::io::{self, BufRead, Write};

fn run() -> leitner_lib::Result<()> {
    let state = leitner_lib::open_state()?;
    info!("Store ready. Reading commands from stdin, one JSON object per line.");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(stdout, "{}", commands::handle_line(&state, &line))?;
        stdout.flush()?;
    }

    info!("Input closed. Shutting down.");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    info!("Starting Leitner Trainer...");
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
