//! `hsp import` command - Bulk CSV import for patient and staff rosters

use chrono::NaiveDate;
use clap::ValueEnum;
use console::style;
use csv::StringRecord;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::format_short_id;
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::team::Role;
use crate::core::AppContext;
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportKind {
    Patients,
    Staff,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// What kind of records the CSV holds
    #[arg(value_enum)]
    pub kind: ImportKind,

    /// CSV file to import
    #[arg(long)]
    pub csv: PathBuf,

    /// Parse and report without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Keep going past rows that fail to parse
    #[arg(long)]
    pub skip_errors: bool,
}

/// Import statistics
#[derive(Default)]
struct ImportStats {
    rows_processed: usize,
    records_created: usize,
    errors: usize,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let mut reader = csv::Reader::from_path(&args.csv).into_diagnostic()?;
    let headers = reader.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let mut stats = ImportStats::default();

    for (row_number, record) in reader.records().enumerate() {
        let record = record.into_diagnostic()?;
        stats.rows_processed += 1;

        let outcome = match args.kind {
            ImportKind::Patients => import_patient(&ctx, &generator, &header_map, &record, &args),
            ImportKind::Staff => import_staff(&ctx, &generator, &header_map, &record, &args),
        };

        if let Err(message) = outcome {
            stats.errors += 1;
            eprintln!(
                "{} row {}: {}",
                style("!").yellow(),
                row_number + 2, // 1-based, plus the header row
                message
            );
            if !args.skip_errors {
                return Err(miette::miette!(
                    "Import aborted at row {} (use --skip-errors to continue past bad rows)",
                    row_number + 2
                ));
            }
        } else {
            stats.records_created += 1;
        }
    }

    println!();
    if args.dry_run {
        println!(
            "{} Dry run: {} row(s) parsed, {} would be created, {} error(s)",
            style("→").blue(),
            stats.rows_processed,
            stats.records_created,
            stats.errors
        );
    } else {
        println!(
            "{} Imported {} of {} row(s), {} error(s)",
            style("✓").green(),
            stats.records_created,
            stats.rows_processed,
            stats.errors
        );
    }

    Ok(())
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a field value from a CSV record
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn import_patient(
    ctx: &AppContext,
    generator: &TemplateGenerator,
    header_map: &HashMap<String, usize>,
    record: &StringRecord,
    args: &ImportArgs,
) -> std::result::Result<(), String> {
    let mrn = get_field(record, header_map, "mrn").ok_or("missing 'mrn'")?;
    let first_name = get_field(record, header_map, "first_name").ok_or("missing 'first_name'")?;
    let last_name = get_field(record, header_map, "last_name").ok_or("missing 'last_name'")?;
    let dob = get_field(record, header_map, "date_of_birth").ok_or("missing 'date_of_birth'")?;
    dob.parse::<NaiveDate>()
        .map_err(|_| format!("bad date_of_birth '{}'", dob))?;
    let status = get_field(record, header_map, "status").unwrap_or_else(|| "outpatient".into());

    if args.dry_run {
        return Ok(());
    }

    let id = EntityId::new(EntityPrefix::Pat);
    let template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_mrn(mrn)
        .with_person(first_name, last_name, dob)
        .with_status(status);
    let yaml = generator
        .generate_patient(&template_ctx)
        .map_err(|e| e.to_string())?;

    let path = ctx.project.entity_path(EntityPrefix::Pat, &id);
    fs::write(&path, yaml).map_err(|e| e.to_string())?;
    println!("{} {}", style("✓").green(), format_short_id(&id));
    Ok(())
}

fn import_staff(
    ctx: &AppContext,
    generator: &TemplateGenerator,
    header_map: &HashMap<String, usize>,
    record: &StringRecord,
    args: &ImportArgs,
) -> std::result::Result<(), String> {
    let name = get_field(record, header_map, "name").ok_or("missing 'name'")?;
    let role = get_field(record, header_map, "role").ok_or("missing 'role'")?;
    role.parse::<Role>()?;
    let email = get_field(record, header_map, "email").ok_or("missing 'email'")?;
    let department = get_field(record, header_map, "department");

    if args.dry_run {
        return Ok(());
    }

    let id = EntityId::new(EntityPrefix::Stf);
    let mut template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_name(name)
        .with_role(role)
        .with_email(email)
        .with_status("active");
    if let Some(department) = department {
        template_ctx = template_ctx.with_department(department);
    }
    let yaml = generator
        .generate_staff(&template_ctx)
        .map_err(|e| e.to_string())?;

    let path = ctx.project.entity_path(EntityPrefix::Stf, &id);
    fs::write(&path, yaml).map_err(|e| e.to_string())?;
    println!("{} {}", style("✓").green(), format_short_id(&id));
    Ok(())
}
