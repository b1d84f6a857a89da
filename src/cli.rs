// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the command modes and the flags shared by all of them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lamdeploy::commands::CommandMode;
use lamdeploy::config::Overrides;
use lamdeploy::output::OutputMode;

#[derive(Parser)]
#[command(name = "lamdeploy")]
#[command(about = "Build, publish and roll out a container-packaged Lambda function")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Stack to deploy (overrides STACK_NAME)
    #[arg(long, global = true)]
    pub stack_name: Option<String>,

    /// AWS region (overrides AWS_REGION)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Environment tag (overrides ENVIRONMENT)
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Image tag to build and deploy (overrides IMAGE_TAG, default: timestamp)
    #[arg(long, global = true)]
    pub image_tag: Option<String>,

    /// Env file with secrets (default: .env)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Commands {
    /// Build, push and apply the full stack (default)
    Deploy,

    /// Build, push and update the function code only
    UpdateCode,

    /// Build and push the image only
    BuildOnly,

    /// Remove local images of the repository
    Cleanup,

    /// Delete all repository images and the stack (asks first)
    DeleteStack,
}

impl Cli {
    pub fn mode(&self) -> CommandMode {
        match self.command.unwrap_or(Commands::Deploy) {
            Commands::Deploy => CommandMode::Deploy,
            Commands::UpdateCode => CommandMode::UpdateCode,
            Commands::BuildOnly => CommandMode::BuildOnly,
            Commands::Cleanup => CommandMode::Cleanup,
            Commands::DeleteStack => CommandMode::DeleteStack,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            stack_name: self.stack_name.clone(),
            region: self.region.clone(),
            environment: self.environment.clone(),
            image_tag: self.image_tag.clone(),
            env_file: self.env_file.clone(),
        }
    }
}
