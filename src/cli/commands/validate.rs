//! `hsp validate` command - Validate portal files against schemas

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::AppContext;
use crate::schema::{SchemaRegistry, Validator};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Validate only these files (default: every entity file in the portal)
    pub paths: Vec<std::path::PathBuf>,

    /// Stop at the first file with errors
    #[arg(long)]
    pub fail_fast: bool,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);

    let paths: Vec<std::path::PathBuf> = if args.paths.is_empty() {
        ctx.project.iter_all_entity_files().collect()
    } else {
        args.paths
    };

    let mut checked = 0usize;
    let mut failed = 0usize;

    for path in &paths {
        checked += 1;
        match validator.validate_file(path) {
            Ok(()) => {
                if global.verbose {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", style("✗").red(), path.display());
                // Render the full miette report for the file
                eprintln!("{:?}", miette::Report::new(e));
                if args.fail_fast {
                    break;
                }
            }
        }
    }

    println!();
    if failed == 0 {
        println!(
            "{} {} file(s) validated, no errors",
            style("✓").green(),
            checked
        );
        Ok(())
    } else {
        Err(miette::miette!(
            "{} of {} file(s) failed validation",
            failed,
            checked
        ))
    }
}
