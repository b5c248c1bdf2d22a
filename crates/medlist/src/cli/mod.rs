//! Command-line interface for medlist.
//!
//! This module provides the CLI structure for the `medlist` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, EditCommand, ExportCommand, ListCommand, OutputFormat,
    RegisterCommand, ResetCommand, SearchCommand,
};

/// medlist - Find a doctor
///
/// A searchable directory of medical professionals. Anyone can register a
/// doctor; editing and deleting require the editor PIN.
#[derive(Debug, Parser)]
#[command(name = "medlist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every doctor
    List(ListCommand),

    /// Search doctors by name or specialty
    Search(SearchCommand),

    /// Register a new doctor
    Register(RegisterCommand),

    /// Edit a doctor (editor mode)
    Edit(EditCommand),

    /// Delete a doctor (editor mode)
    Delete(DeleteCommand),

    /// Export a JSON backup of the directory
    Export(ExportCommand),

    /// Remove every user-added doctor (editor mode)
    Reset(ResetCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
