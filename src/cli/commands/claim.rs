//! `hsp claim` command - Insurance claim management
//!
//! Pipeline transitions (submit, review, approve, deny, pay) are guarded by
//! the billing role when a team roster is configured.

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::Path;

use crate::cli::helpers::{escape_csv, find_entity, format_short_id, load_entities, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::AppContext;
use crate::entities::claim::{Claim, ClaimStatus};
use crate::entities::patient::Patient;
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Subcommand, Debug)]
pub enum ClaimCommands {
    /// List claims with filtering
    List(ListArgs),

    /// Create a new draft claim
    New(NewArgs),

    /// Show a claim's details
    Show(ShowArgs),

    /// Edit a claim in your editor
    Edit(EditArgs),

    /// Submit a draft claim to the payer
    Submit(TransitionArgs),

    /// Take a submitted claim into review (billing role)
    Review(TransitionArgs),

    /// Approve a claim in review (billing role)
    Approve(TransitionArgs),

    /// Deny a claim in review (billing role)
    Deny(DenyArgs),

    /// Mark an approved claim as paid (billing role)
    Pay(TransitionArgs),
}

/// Status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Draft,
    Submitted,
    InReview,
    Approved,
    Denied,
    Paid,
    /// Everything not yet decided
    Open,
    /// All statuses
    All,
}

impl StatusFilter {
    fn matches(&self, status: ClaimStatus) -> bool {
        match self {
            StatusFilter::Draft => status == ClaimStatus::Draft,
            StatusFilter::Submitted => status == ClaimStatus::Submitted,
            StatusFilter::InReview => status == ClaimStatus::InReview,
            StatusFilter::Approved => status == ClaimStatus::Approved,
            StatusFilter::Denied => status == ClaimStatus::Denied,
            StatusFilter::Paid => status == ClaimStatus::Paid,
            StatusFilter::Open => matches!(
                status,
                ClaimStatus::Draft | ClaimStatus::Submitted | ClaimStatus::InReview
            ),
            StatusFilter::All => true,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by payer (case-insensitive substring)
    #[arg(long)]
    pub payer: Option<String>,

    /// Filter by patient (ID or fuzzy name)
    #[arg(long)]
    pub patient: Option<String>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Patient (ID or fuzzy name)
    #[arg(long)]
    pub patient: Option<String>,

    /// Insurer name
    #[arg(long)]
    pub payer: Option<String>,

    /// Claimed amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// Date of service (YYYY-MM-DD)
    #[arg(long)]
    pub service_date: Option<String>,

    /// Policy number with the insurer
    #[arg(long)]
    pub policy_number: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Claim ID or fuzzy payer search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Claim ID or fuzzy payer search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct TransitionArgs {
    /// Claim ID or fuzzy payer search term
    pub id: String,

    /// Note to record with the transition
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DenyArgs {
    /// Claim ID or fuzzy payer search term
    pub id: String,

    /// Denial reason (recorded on the claim)
    #[arg(long)]
    pub reason: String,
}

pub fn run(cmd: ClaimCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ClaimCommands::List(args) => run_list(args, global),
        ClaimCommands::New(args) => run_new(args, global),
        ClaimCommands::Show(args) => run_show(args, global),
        ClaimCommands::Edit(args) => run_edit(args, global),
        ClaimCommands::Submit(args) => run_transition(args, ClaimStatus::Submitted, global),
        ClaimCommands::Review(args) => run_transition(args, ClaimStatus::InReview, global),
        ClaimCommands::Approve(args) => run_transition(args, ClaimStatus::Approved, global),
        ClaimCommands::Deny(args) => run_transition(
            TransitionArgs {
                id: args.id,
                note: Some(args.reason),
            },
            ClaimStatus::Denied,
            global,
        ),
        ClaimCommands::Pay(args) => run_transition(args, ClaimStatus::Paid, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let mut claims: Vec<Claim> = load_entities::<Claim>(&ctx.project, EntityPrefix::Clm)
        .into_iter()
        .map(|(claim, _path)| claim)
        .filter(|c| args.status.matches(c.status))
        .collect();

    if let Some(ref payer) = args.payer {
        let payer = payer.to_lowercase();
        claims.retain(|c| c.payer.to_lowercase().contains(&payer));
    }
    if let Some(ref patient_query) = args.patient {
        let (patient, _path) =
            find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, patient_query)?;
        claims.retain(|c| c.patient_id == patient.id);
    }

    claims.sort_by(|a, b| a.service_date.cmp(&b.service_date));

    if args.count {
        println!("{}", claims.len());
        return Ok(());
    }

    if claims.is_empty() {
        println!("No claims found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&claims).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&claims).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("id,patient_id,payer,amount,service_date,status");
            for c in &claims {
                println!(
                    "{},{},{},{:.2},{},{}",
                    c.id,
                    c.patient_id,
                    escape_csv(&c.payer),
                    c.amount,
                    c.service_date,
                    c.status
                );
            }
        }
        OutputFormat::Id => {
            for c in &claims {
                println!("{}", c.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | Payer | Amount | Service date | Status |");
            println!("|---|---|---|---|---|");
            for c in &claims {
                println!(
                    "| {} | {} | {:.2} | {} | {} |",
                    format_short_id(&c.id),
                    c.payer,
                    c.amount,
                    c.service_date,
                    c.status
                );
            }
        }
        _ => {
            println!(
                "{:<16} {:<24} {:>10} {:<12} {:<10}",
                style("ID").bold(),
                style("PAYER").bold(),
                style("AMOUNT").bold(),
                style("SERVICE").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(78));
            for c in &claims {
                println!(
                    "{:<16} {:<24} {:>10.2} {:<12} {:<10}",
                    format_short_id(&c.id),
                    truncate_str(&c.payer, 22),
                    c.amount,
                    c.service_date,
                    c.status
                );
            }
            println!();
            println!("{} claim(s) found", style(claims.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let (Some(patient_query), Some(payer), Some(amount), Some(service_date)) =
        (args.patient, args.payer, args.amount, args.service_date)
    else {
        return Err(miette::miette!(
            "Missing required flags: --patient, --payer, --amount, and --service-date"
        ));
    };

    service_date.parse::<NaiveDate>().map_err(|_| {
        miette::miette!("Invalid service date '{}'. Use YYYY-MM-DD", service_date)
    })?;
    if amount < 0.0 {
        return Err(miette::miette!("Claim amount cannot be negative"));
    }

    let (patient, _path) = find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, &patient_query)?;

    let id = EntityId::new(EntityPrefix::Clm);
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let mut template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_patient_id(patient.id.to_string())
        .with_payer(&payer)
        .with_amount(amount)
        .with_service_date(&service_date)
        .with_status("draft");
    if let Some(policy_number) = args.policy_number {
        template_ctx = template_ctx.with_policy_number(policy_number);
    }

    let yaml_content = generator
        .generate_claim(&template_ctx)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = ctx.project.entity_path(EntityPrefix::Clm, &id);
    fs::write(&file_path, &yaml_content).into_diagnostic()?;

    println!(
        "{} Created draft claim {} for {}",
        style("✓").green(),
        style(format_short_id(&id)).cyan(),
        style(patient.display_name()).yellow()
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
    let (claim, _path) = find_entity::<Claim>(&ctx.project, EntityPrefix::Clm, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&claim).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", claim.id),
        _ => print!("{}", serde_yml::to_string(&claim).into_diagnostic()?),
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (claim, path) = find_entity::<Claim>(&ctx.project, EntityPrefix::Clm, &args.id)?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&claim.id)).cyan(),
        style(ctx.config.editor()).yellow()
    );
    ctx.config.run_editor(&path).into_diagnostic()?;

    Ok(())
}

fn run_transition(args: TransitionArgs, to: ClaimStatus, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (mut claim, path) = find_entity::<Claim>(&ctx.project, EntityPrefix::Clm, &args.id)?;

    // Resolve the acting roster member, when a roster exists
    let actor = ctx.config.author();
    let roster = ctx.roster();
    let member = roster.as_ref().and_then(|r| r.find(&actor));

    if roster.is_some() && member.is_none() {
        return Err(miette::miette!(
            "'{}' is not on the team roster (.hsp/team.yaml)",
            actor
        ));
    }

    claim
        .transition(to, member, &actor, args.note)
        .map_err(|e| miette::miette!("{}", e))?;
    claim.revision += 1;

    write_claim(&claim, &path)?;

    println!(
        "{} Claim {} is now {}",
        style("✓").green(),
        style(format_short_id(&claim.id)).cyan(),
        style(to).yellow()
    );

    Ok(())
}

fn write_claim(claim: &Claim, path: &Path) -> Result<()> {
    let yaml = serde_yml::to_string(claim).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()?;
    Ok(())
}
