//! gdlui - command-line front-end for the gallery-dl downloader.
//!
//! Resolves (or offers to download) the gallery-dl executable, assembles a
//! command line from the parsed options, runs it, and streams the tool's
//! merged output to stdout line by line.

mod args;

use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use gdlui_core::runner::{self, RunEvent};
use gdlui_core::tool::ToolManager;
use gdlui_core::{assemble, CommandLine};

use args::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gdlui=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    info!("gdlui v{}", gdlui_core::VERSION);

    let opts = cli.to_options()?;

    let mut manager = ToolManager::new();
    let program = match manager.command() {
        Some(command) => command.to_string(),
        None if cli.print_only => {
            // Assembly needs no binary; show the command with the bare name.
            gdlui_core::tool::CANDIDATE_NAMES[0].to_string()
        }
        None => {
            offer_fetch(&mut manager, cli.yes).await?;
            match manager.verify().await {
                Ok(version) => info!("gallery-dl is ready: {}", version),
                Err(e) => warn!("gallery-dl verification failed: {:#}", e),
            }
            manager
                .command()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("gallery-dl is still unavailable"))?
        }
    };

    let command = assemble(program, &opts, &cli.urls);

    if cli.print_only {
        for token in command.argv() {
            println!("{}", token);
        }
        return Ok(0);
    }

    Ok(execute(command).await)
}

/// Asks for (or assumes) consent, then downloads gallery-dl.
async fn offer_fetch(manager: &mut ToolManager, assume_yes: bool) -> Result<()> {
    let asset = manager.planned_asset();
    eprintln!("gallery-dl was not found on this system.");
    eprintln!("It can be downloaded from {}", asset.url);

    if !assume_yes && !confirm("Download it now? [y/N] ")? {
        anyhow::bail!("gallery-dl is required; download declined");
    }

    // Log each whole percent once rather than every chunk.
    let last_percent = AtomicU32::new(u32::MAX);
    manager
        .fetch(|progress| {
            if let Some(percent) = progress.percent {
                let whole = percent as u32;
                if last_percent.swap(whole, Ordering::Relaxed) != whole {
                    info!("Download progress: {:.1}%", percent);
                }
            }
        })
        .await?;

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Runs the assembled command, printing output lines as they arrive.
///
/// Returns the child's exit code (1 for launch failures or signal deaths)
/// so the shell sees the same status the tool reported.
async fn execute(command: CommandLine) -> i32 {
    let (sender, mut receiver) = runner::event_channel();
    let handle = runner::spawn(command, sender);

    let mut exit_code = 1;
    while let Some(event) = receiver.recv().await {
        match event {
            RunEvent::Started { command } => info!("Running command: {}", command),
            RunEvent::Line(line) => println!("{}", line),
            RunEvent::SpawnFailed(message) => {
                error!("{}", message);
                exit_code = 1;
            }
            RunEvent::Exited { code } => {
                match code {
                    Some(code) => info!("Process completed with return code {}", code),
                    None => warn!("Process terminated by signal"),
                }
                exit_code = code.unwrap_or(1);
            }
        }
    }

    if let Err(e) = handle.await {
        error!("Runner task failed: {}", e);
    }
    exit_code
}
