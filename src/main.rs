use std::io::{self, BufRead, Write};

use llm_score_adapter::{logging, Host};

/// Drives the host contract over stdin and stdout.
///
/// `init` runs once before anything is read. Every non-empty input line is one raw
/// request body, answered by one JSON line.
fn main() -> anyhow::Result<()> {
    let _guard = logging::init(&logging::LogConfig::from_env())?;

    let host = Host::new();
    if let Err(error) = host.init() {
        tracing::error!("Initialization failed: {error}");
        return Err(error.into());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = host.run(&line);
        writeln!(stdout, "{}", response.to_json())?;
        stdout.flush()?;
    }

    tracing::info!("Input closed, shutting down");

    Ok(())
}
