//! `hsp staff` command - Staff directory management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{escape_csv, find_entity, format_short_id, load_entities, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::team::Role;
use crate::core::AppContext;
use crate::entities::staff::{Staff, StaffStatus};
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Subcommand, Debug)]
pub enum StaffCommands {
    /// List staff members with filtering
    List(ListArgs),

    /// Add a staff member to the directory
    New(NewArgs),

    /// Show a staff member's details
    Show(ShowArgs),

    /// Edit a staff record in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by role
    #[arg(long, short = 'r')]
    pub role: Option<Role>,

    /// Filter by status (active/on-leave/suspended/departed)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Filter by department (exact match)
    #[arg(long, short = 'd')]
    pub department: Option<String>,

    /// Search in name and email (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Portal role
    #[arg(long, short = 'r', value_enum)]
    pub role: Option<Role>,

    /// Work email
    #[arg(long)]
    pub email: Option<String>,

    /// Department or unit
    #[arg(long, short = 'd')]
    pub department: Option<String>,

    /// Work phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Staff ID or fuzzy name search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Staff ID or fuzzy name search term
    pub id: String,
}

pub fn run(cmd: StaffCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StaffCommands::List(args) => run_list(args, global),
        StaffCommands::New(args) => run_new(args, global),
        StaffCommands::Show(args) => run_show(args, global),
        StaffCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let mut members: Vec<Staff> = load_entities(&ctx.project, EntityPrefix::Stf)
        .into_iter()
        .map(|(staff, _path)| staff)
        .collect();

    if let Some(role) = args.role {
        members.retain(|s| s.role == role);
    }
    if let Some(ref status) = args.status {
        let status: StaffStatus = status.parse().map_err(|e| miette::miette!("{}", e))?;
        members.retain(|s| s.status == status);
    }
    if let Some(ref department) = args.department {
        members.retain(|s| s.department.eq_ignore_ascii_case(department));
    }
    if let Some(ref term) = args.search {
        let term = term.to_lowercase();
        members.retain(|s| {
            s.name.to_lowercase().contains(&term) || s.email.to_lowercase().contains(&term)
        });
    }

    members.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", members.len());
        return Ok(());
    }

    if members.is_empty() {
        println!("No staff members found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&members).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&members).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("id,name,role,department,email,status");
            for s in &members {
                println!(
                    "{},{},{},{},{},{}",
                    s.id,
                    escape_csv(&s.name),
                    s.role,
                    escape_csv(&s.department),
                    s.email,
                    s.status
                );
            }
        }
        OutputFormat::Id => {
            for s in &members {
                println!("{}", s.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | Name | Role | Department | Status |");
            println!("|---|---|---|---|---|");
            for s in &members {
                println!(
                    "| {} | {} | {} | {} | {} |",
                    format_short_id(&s.id),
                    s.name,
                    s.role,
                    s.department,
                    s.status
                );
            }
        }
        _ => {
            println!(
                "{:<16} {:<26} {:<10} {:<16} {:<10}",
                style("ID").bold(),
                style("NAME").bold(),
                style("ROLE").bold(),
                style("DEPARTMENT").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(82));
            for s in &members {
                println!(
                    "{:<16} {:<26} {:<10} {:<16} {:<10}",
                    format_short_id(&s.id),
                    truncate_str(&s.name, 24),
                    s.role,
                    truncate_str(&s.department, 14),
                    s.status
                );
            }
            println!();
            println!("{} staff member(s) found", style(members.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let (Some(name), Some(role), Some(email)) = (args.name, args.role, args.email) else {
        return Err(miette::miette!(
            "Missing required flags: --name, --role, and --email"
        ));
    };

    let id = EntityId::new(EntityPrefix::Stf);
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let mut template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_name(&name)
        .with_role(role.to_string())
        .with_email(&email)
        .with_status("active");
    if let Some(department) = args.department {
        template_ctx = template_ctx.with_department(department);
    }
    if let Some(phone) = args.phone {
        template_ctx = template_ctx.with_phone(phone);
    }

    let yaml_content = generator
        .generate_staff(&template_ctx)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = ctx.project.entity_path(EntityPrefix::Stf, &id);
    fs::write(&file_path, &yaml_content).into_diagnostic()?;

    println!(
        "{} Added staff member {}",
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
    let (staff, _path) = find_entity::<Staff>(&ctx.project, EntityPrefix::Stf, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&staff).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", staff.id),
        _ => print!("{}", serde_yml::to_string(&staff).into_diagnostic()?),
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (staff, path) = find_entity::<Staff>(&ctx.project, EntityPrefix::Stf, &args.id)?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&staff.id)).cyan(),
        style(ctx.config.editor()).yellow()
    );
    ctx.config.run_editor(&path).into_diagnostic()?;

    Ok(())
}
