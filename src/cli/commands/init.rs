//! `hsp init` command - Initialize a new portal data directory

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .hsp/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized portal at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created portal structure:");
            for dir in [
                "hospital/",
                "patients/",
                "staff/directory/",
                "staff/credentials/",
                "billing/claims/",
                "billing/invoices/",
                "records/notes/",
            ] {
                println!("  {}", style(dir).dim());
            }
            println!();
            println!("Next steps:");
            println!(
                "  {} Register your hospital",
                style("hsp register --interactive").yellow()
            );
            println!(
                "  {} Add your first patient",
                style("hsp patient new").yellow()
            );
            println!("  {} Validate portal files", style("hsp validate").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Portal already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("hsp init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
