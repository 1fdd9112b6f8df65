//! `hsp cred` command - Staff credential management
//!
//! The valid/expiring/expired state shown in listings is derived from the
//! expiry date at display time; nothing is stored.

use chrono::{NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{find_entity, format_short_id, load_entities, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::AppContext;
use crate::entities::credential::{Credential, CredentialKind, ExpiryState};
use crate::entities::staff::Staff;
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Subcommand, Debug)]
pub enum CredCommands {
    /// List credentials with their derived state
    List(ListArgs),

    /// Record a new credential for a staff member
    New(NewArgs),

    /// Show a credential's details
    Show(ShowArgs),

    /// Edit a credential in your editor
    Edit(EditArgs),
}

/// Derived-state filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateFilter {
    Valid,
    Expiring,
    Expired,
    All,
}

impl StateFilter {
    fn matches(&self, state: ExpiryState) -> bool {
        match self {
            StateFilter::Valid => state == ExpiryState::Valid,
            StateFilter::Expiring => state == ExpiryState::Expiring,
            StateFilter::Expired => state == ExpiryState::Expired,
            StateFilter::All => true,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by derived state
    #[arg(long, short = 's', default_value = "all")]
    pub state: StateFilter,

    /// Filter by holder (staff ID or fuzzy name)
    #[arg(long)]
    pub staff: Option<String>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Holder (staff ID or fuzzy name)
    #[arg(long)]
    pub staff: Option<String>,

    /// Credential kind
    #[arg(long, short = 'k', value_enum, default_value = "license")]
    pub kind: CredKindArg,

    /// Credential name (e.g. "State Medical License")
    #[arg(long)]
    pub name: Option<String>,

    /// Issuing body
    #[arg(long)]
    pub issuer: Option<String>,

    /// Issue date (YYYY-MM-DD)
    #[arg(long)]
    pub issued: Option<String>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expires: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CredKindArg {
    License,
    BoardCertification,
    DeaRegistration,
    CprCertification,
    Other,
}

impl From<CredKindArg> for CredentialKind {
    fn from(value: CredKindArg) -> Self {
        match value {
            CredKindArg::License => CredentialKind::License,
            CredKindArg::BoardCertification => CredentialKind::BoardCertification,
            CredKindArg::DeaRegistration => CredentialKind::DeaRegistration,
            CredKindArg::CprCertification => CredentialKind::CprCertification,
            CredKindArg::Other => CredentialKind::Other,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Credential ID or fuzzy name search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Credential ID or fuzzy name search term
    pub id: String,
}

pub fn run(cmd: CredCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CredCommands::List(args) => run_list(args, global),
        CredCommands::New(args) => run_new(args, global),
        CredCommands::Show(args) => run_show(args, global),
        CredCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let today = Utc::now().date_naive();

    let mut credentials: Vec<Credential> = load_entities::<Credential>(&ctx.project, EntityPrefix::Cred)
        .into_iter()
        .map(|(credential, _path)| credential)
        .filter(|c| args.state.matches(c.expiry_state(today)))
        .collect();

    if let Some(ref staff_query) = args.staff {
        let (staff, _path) = find_entity::<Staff>(&ctx.project, EntityPrefix::Stf, staff_query)?;
        credentials.retain(|c| c.staff_id == staff.id);
    }

    // Soonest-expiring first: that is what the renewals desk needs
    credentials.sort_by(|a, b| a.expires.cmp(&b.expires));

    if args.count {
        println!("{}", credentials.len());
        return Ok(());
    }

    if credentials.is_empty() {
        println!("No credentials found.");
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
                serde_json::to_string_pretty(&credentials).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&credentials).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for c in &credentials {
                println!("{}", c.id);
            }
        }
        _ => {
            println!(
                "{:<16} {:<28} {:<20} {:<12} {:<10}",
                style("ID").bold(),
                style("NAME").bold(),
                style("KIND").bold(),
                style("EXPIRES").bold(),
                style("STATE").bold()
            );
            println!("{}", "-".repeat(90));
            for c in &credentials {
                let state = c.expiry_state(today);
                let state_label = match state {
                    ExpiryState::Valid => style(state.as_str()).green(),
                    ExpiryState::Expiring => style(state.as_str()).yellow(),
                    ExpiryState::Expired => style(state.as_str()).red(),
                };
                println!(
                    "{:<16} {:<28} {:<20} {:<12} {:<10}",
                    format_short_id(&c.id),
                    truncate_str(&c.name, 26),
                    c.kind,
                    c.expires,
                    state_label
                );
            }
            println!();
            println!("{} credential(s) found", style(credentials.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let (Some(staff_query), Some(name), Some(issued), Some(expires)) =
        (args.staff, args.name, args.issued, args.expires)
    else {
        return Err(miette::miette!(
            "Missing required flags: --staff, --name, --issued, and --expires"
        ));
    };

    issued
        .parse::<NaiveDate>()
        .map_err(|_| miette::miette!("Invalid issue date '{}'. Use YYYY-MM-DD", issued))?;
    expires
        .parse::<NaiveDate>()
        .map_err(|_| miette::miette!("Invalid expiry date '{}'. Use YYYY-MM-DD", expires))?;

    let (staff, _path) = find_entity::<Staff>(&ctx.project, EntityPrefix::Stf, &staff_query)?;

    let id = EntityId::new(EntityPrefix::Cred);
    let kind: CredentialKind = args.kind.into();
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let mut template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_staff_id(staff.id.to_string())
        .with_kind(kind.to_string())
        .with_name(&name)
        .with_validity(&issued, &expires);
    if let Some(issuer) = args.issuer {
        template_ctx = template_ctx.with_issuer(issuer);
    }

    let yaml_content = generator
        .generate_credential(&template_ctx)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = ctx.project.entity_path(EntityPrefix::Cred, &id);
    fs::write(&file_path, &yaml_content).into_diagnostic()?;

    println!(
        "{} Recorded credential {} for {}",
        style("✓").green(),
        style(format_short_id(&id)).cyan(),
        style(&staff.name).yellow()
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
    let (credential, _path) = find_entity::<Credential>(&ctx.project, EntityPrefix::Cred, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&credential).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", credential.id),
        _ => {
            print!("{}", serde_yml::to_string(&credential).into_diagnostic()?);
            let today = Utc::now().date_naive();
            println!("# state: {}", credential.expiry_state(today));
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (credential, path) = find_entity::<Credential>(&ctx.project, EntityPrefix::Cred, &args.id)?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&credential.id)).cyan(),
        style(ctx.config.editor()).yellow()
    );
    ctx.config.run_editor(&path).into_diagnostic()?;

    Ok(())
}
