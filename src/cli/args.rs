//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    claim::ClaimCommands,
    completions::CompletionsArgs,
    cred::CredCommands,
    import::ImportArgs,
    init::InitArgs,
    invoice::InvoiceCommands,
    note::NoteCommands,
    patient::PatientCommands,
    register::RegisterArgs,
    staff::StaffCommands,
    status::StatusArgs,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "hsp")]
#[command(author, version, about = "Hospital Staff Portal")]
#[command(
    long_about = "A Unix-style toolkit for managing hospital records - patients, staff, credentials, billing, and clinical notes - as plain text files under git version control."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Portal root (default: auto-detect by finding .hsp/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new portal data directory
    Init(InitArgs),

    /// Register a hospital through the three-step wizard
    Register(RegisterArgs),

    /// Patient record management
    #[command(subcommand)]
    Patient(PatientCommands),

    /// Staff directory management
    #[command(subcommand)]
    Staff(StaffCommands),

    /// Staff credential management (licenses, certifications)
    #[command(subcommand)]
    Cred(CredCommands),

    /// Insurance claim management
    #[command(subcommand)]
    Claim(ClaimCommands),

    /// Patient invoice management
    #[command(subcommand)]
    Invoice(InvoiceCommands),

    /// Clinical note management
    #[command(subcommand)]
    Note(NoteCommands),

    /// Validate portal files against schemas
    Validate(ValidateArgs),

    /// Show the portal census dashboard
    Status(StatusArgs),

    /// Bulk import records from CSV
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
