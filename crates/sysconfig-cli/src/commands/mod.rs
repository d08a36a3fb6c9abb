//! CLI commands and argument parsing.

pub mod render;

use clap::{Parser, Subcommand};

/// Sysconfig - container runtime registry configuration from cluster policy
#[derive(Parser)]
#[command(name = "sysconfig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Render registries.conf, policy.json and certs.d from a desired-state file
    Render(render::RenderArgs),

    /// Print version information
    Version,
}
