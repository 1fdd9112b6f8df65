//! `hsp patient` command - Patient record management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{escape_csv, find_entity, format_short_id, load_entities, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::AppContext;
use crate::entities::patient::{Patient, PatientStatus};
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Subcommand, Debug)]
pub enum PatientCommands {
    /// List patients with filtering
    List(ListArgs),

    /// Create a new patient record
    New(NewArgs),

    /// Show a patient's details
    Show(ShowArgs),

    /// Edit a patient record in your editor
    Edit(EditArgs),
}

/// Status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Admitted,
    Outpatient,
    Discharged,
    Transferred,
    Deceased,
    /// Admitted and outpatient
    Active,
    /// All statuses
    All,
}

impl StatusFilter {
    fn matches(&self, status: PatientStatus) -> bool {
        match self {
            StatusFilter::Admitted => status == PatientStatus::Admitted,
            StatusFilter::Outpatient => status == PatientStatus::Outpatient,
            StatusFilter::Discharged => status == PatientStatus::Discharged,
            StatusFilter::Transferred => status == PatientStatus::Transferred,
            StatusFilter::Deceased => status == PatientStatus::Deceased,
            StatusFilter::Active => {
                matches!(status, PatientStatus::Admitted | PatientStatus::Outpatient)
            }
            StatusFilter::All => true,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Search in name and MRN (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Show patients created in the last N days
    #[arg(long, value_name = "DAYS")]
    pub recent: Option<u32>,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Medical record number
    #[arg(long)]
    pub mrn: Option<String>,

    /// Given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<String>,

    /// Initial status (admitted/outpatient/discharged/transferred/deceased)
    #[arg(long, short = 's', default_value = "outpatient")]
    pub status: String,

    /// Use interactive prompts to fill in fields
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Patient ID or fuzzy name search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Patient ID or fuzzy name search term
    pub id: String,
}

pub fn run(cmd: PatientCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PatientCommands::List(args) => run_list(args, global),
        PatientCommands::New(args) => run_new(args, global),
        PatientCommands::Show(args) => run_show(args, global),
        PatientCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let mut patients: Vec<Patient> = load_entities::<Patient>(&ctx.project, EntityPrefix::Pat)
        .into_iter()
        .map(|(patient, _path)| patient)
        .filter(|p| args.status.matches(p.status))
        .collect();

    if let Some(ref term) = args.search {
        let term = term.to_lowercase();
        patients.retain(|p| {
            p.display_name().to_lowercase().contains(&term) || p.mrn.to_lowercase().contains(&term)
        });
    }

    if let Some(days) = args.recent {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(days as i64);
        patients.retain(|p| p.created >= cutoff);
    }

    patients.sort_by(|a, b| a.created.cmp(&b.created));

    if let Some(limit) = args.limit {
        patients.truncate(limit);
    }

    if args.count {
        println!("{}", patients.len());
        return Ok(());
    }

    if patients.is_empty() {
        match global.format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No patients found.");
                println!();
                println!("Create one with: {}", style("hsp patient new").yellow());
            }
        }
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv, // Default to TSV for list
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&patients).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&patients).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,mrn,name,date_of_birth,status,author,created");
            for p in &patients {
                println!(
                    "{},{},{},{},{},{},{}",
                    p.id,
                    escape_csv(&p.mrn),
                    escape_csv(p.display_name()),
                    p.date_of_birth,
                    p.status,
                    escape_csv(&p.author),
                    p.created.format("%Y-%m-%dT%H:%M:%SZ")
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<16} {:<12} {:<30} {:<12} {:<12}",
                style("ID").bold(),
                style("MRN").bold(),
                style("NAME").bold(),
                style("DOB").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(86));

            for p in &patients {
                println!(
                    "{:<16} {:<12} {:<30} {:<12} {:<12}",
                    format_short_id(&p.id),
                    truncate_str(&p.mrn, 12),
                    truncate_str(p.display_name(), 28),
                    p.date_of_birth,
                    p.status
                );
            }

            println!();
            println!("{} patient(s) found", style(patients.len()).cyan());
        }
        OutputFormat::Id => {
            for p in &patients {
                println!("{}", p.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | MRN | Name | DOB | Status |");
            println!("|---|---|---|---|---|");
            for p in &patients {
                println!(
                    "| {} | {} | {} | {} | {} |",
                    format_short_id(&p.id),
                    p.mrn,
                    p.display_name(),
                    p.date_of_birth,
                    p.status
                );
            }
        }
        OutputFormat::Auto => unreachable!(), // Already handled above
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let (mrn, first_name, last_name, dob) = if args.interactive {
        let theme = ColorfulTheme::default();
        let mrn: String = Input::with_theme(&theme)
            .with_prompt("Medical record number")
            .interact_text()
            .into_diagnostic()?;
        let first_name: String = Input::with_theme(&theme)
            .with_prompt("First name")
            .interact_text()
            .into_diagnostic()?;
        let last_name: String = Input::with_theme(&theme)
            .with_prompt("Last name")
            .interact_text()
            .into_diagnostic()?;
        let dob: String = Input::with_theme(&theme)
            .with_prompt("Date of birth (YYYY-MM-DD)")
            .validate_with(|input: &String| {
                input
                    .parse::<NaiveDate>()
                    .map(|_| ())
                    .map_err(|_| "expected YYYY-MM-DD")
            })
            .interact_text()
            .into_diagnostic()?;
        (mrn, first_name, last_name, dob)
    } else {
        let missing: Vec<&str> = [
            ("--mrn", args.mrn.is_none()),
            ("--first-name", args.first_name.is_none()),
            ("--last-name", args.last_name.is_none()),
            ("--dob", args.dob.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(flag, _)| *flag)
        .collect();
        if !missing.is_empty() {
            return Err(miette::miette!(
                "Missing required flags: {} (or use --interactive)",
                missing.join(", ")
            ));
        }
        (
            args.mrn.unwrap(),
            args.first_name.unwrap(),
            args.last_name.unwrap(),
            args.dob.unwrap(),
        )
    };

    // Reject bad dates and statuses before writing anything
    dob.parse::<NaiveDate>()
        .map_err(|_| miette::miette!("Invalid date of birth '{}'. Use YYYY-MM-DD", dob))?;
    let status: PatientStatus = args
        .status
        .parse()
        .map_err(|e| miette::miette!("{}", e))?;

    let id = EntityId::new(EntityPrefix::Pat);
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_mrn(&mrn)
        .with_person(&first_name, &last_name, &dob)
        .with_status(status.to_string());

    let yaml_content = generator
        .generate_patient(&template_ctx)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = ctx.project.entity_path(EntityPrefix::Pat, &id);
    fs::write(&file_path, &yaml_content).into_diagnostic()?;

    println!(
        "{} Created patient {}",
        style("✓").green(),
        style(format_short_id(&id)).cyan()
    );
    println!("   {}", style(file_path.display()).dim());

    if args.edit {
        ctx.config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (patient, _path) = find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, &args.id)?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml, // Default to YAML for show
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&patient).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => {
            println!("{}", patient.id);
        }
        _ => {
            let yaml = serde_yml::to_string(&patient).into_diagnostic()?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (patient, path) = find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, &args.id)?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&patient.id)).cyan(),
        style(ctx.config.editor()).yellow()
    );
    ctx.config.run_editor(&path).into_diagnostic()?;

    Ok(())
}
