// ABOUTME: Entry point for the lamdeploy CLI application.
// ABOUTME: Parses arguments, runs preflight checks and dispatches to command handlers.

mod cli;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;
use lamdeploy::cloud::{AWS_PROGRAM, AwsCli};
use lamdeploy::commands::{self, CommandMode, Invocation, connect_engine, require_tool};
use lamdeploy::config::EnvSnapshot;
use lamdeploy::confirm::TerminalConfirm;
use lamdeploy::diagnostics::Diagnostics;
use lamdeploy::error::Result;
use lamdeploy::output::Output;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // RUST_LOG wins unless --verbose asks for everything
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    let mut diagnostics = Diagnostics::default();

    let result = run(&cli, &mut output, &mut diagnostics).await;

    for warning in diagnostics.warnings() {
        output.warning(&warning.message);
    }

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

fn load(cli: &Cli, diagnostics: &mut Diagnostics) -> Result<Invocation> {
    let cwd = env::current_dir()?;
    Invocation::load(&cwd, EnvSnapshot::from_process(), cli.overrides(), diagnostics)
}

fn cloud_client(aws: PathBuf, invocation: &Invocation) -> Result<AwsCli> {
    let target = invocation.target()?;
    Ok(AwsCli::with_program(aws, target.region))
}

async fn run(cli: &Cli, output: &mut Output, diagnostics: &mut Diagnostics) -> Result<()> {
    let mode = cli.mode();
    tracing::debug!(%mode, "starting");
    output.start_timer();

    match mode {
        CommandMode::Cleanup => {
            let engine = connect_engine().await?;
            let invocation = load(cli, diagnostics)?;
            commands::cleanup(&invocation, &engine, output, diagnostics).await?;
        }
        CommandMode::DeleteStack => {
            let aws = require_tool(AWS_PROGRAM)?;
            let invocation = load(cli, diagnostics)?;
            let cloud = cloud_client(aws, &invocation)?;
            commands::delete_stack(&invocation, &cloud, &TerminalConfirm, output, diagnostics)
                .await?;
        }
        CommandMode::Deploy | CommandMode::UpdateCode | CommandMode::BuildOnly => {
            let aws = require_tool(AWS_PROGRAM)?;
            let engine = connect_engine().await?;
            let invocation = load(cli, diagnostics)?;
            let cloud = cloud_client(aws, &invocation)?;

            match mode {
                CommandMode::Deploy => {
                    commands::deploy(&invocation, &cloud, &engine, output, diagnostics).await?;
                }
                CommandMode::UpdateCode => {
                    commands::update_code(&invocation, &cloud, &engine, output, diagnostics)
                        .await?;
                }
                _ => {
                    commands::build_only(&invocation, &cloud, &engine, output, diagnostics)
                        .await?;
                }
            }
        }
    }

    Ok(())
}
