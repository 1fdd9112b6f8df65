//! `hsp invoice` command - Patient invoice management

use chrono::Utc;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{find_entity, format_short_id, load_entities};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::AppContext;
use crate::entities::invoice::{Invoice, InvoiceStatus};
use crate::entities::patient::Patient;
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Subcommand, Debug)]
pub enum InvoiceCommands {
    /// List invoices with filtering
    List(ListArgs),

    /// Create a new draft invoice
    New(NewArgs),

    /// Show an invoice's details
    Show(ShowArgs),

    /// Edit an invoice in your editor
    Edit(EditArgs),

    /// Record a payment against an invoice
    Pay(PayArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (draft/issued/partially-paid/paid/void)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Show only overdue invoices
    #[arg(long)]
    pub overdue: bool,

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

    /// Total billed amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Invoice ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Invoice ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct PayArgs {
    /// Invoice ID
    pub id: String,

    /// Amount received
    #[arg(long)]
    pub amount: f64,
}

pub fn run(cmd: InvoiceCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InvoiceCommands::List(args) => run_list(args, global),
        InvoiceCommands::New(args) => run_new(args, global),
        InvoiceCommands::Show(args) => run_show(args, global),
        InvoiceCommands::Edit(args) => run_edit(args, global),
        InvoiceCommands::Pay(args) => run_pay(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let today = Utc::now().date_naive();

    let mut invoices: Vec<Invoice> = load_entities(&ctx.project, EntityPrefix::Inv)
        .into_iter()
        .map(|(invoice, _path)| invoice)
        .collect();

    if let Some(ref status) = args.status {
        let status: InvoiceStatus = status.parse().map_err(|e| miette::miette!("{}", e))?;
        invoices.retain(|i| i.status == status);
    }
    if args.overdue {
        invoices.retain(|i| i.is_overdue(today));
    }
    if let Some(ref patient_query) = args.patient {
        let (patient, _path) =
            find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, patient_query)?;
        invoices.retain(|i| i.patient_id == patient.id);
    }

    invoices.sort_by(|a, b| a.created.cmp(&b.created));

    if args.count {
        println!("{}", invoices.len());
        return Ok(());
    }

    if invoices.is_empty() {
        println!("No invoices found.");
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
                serde_json::to_string_pretty(&invoices).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&invoices).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for i in &invoices {
                println!("{}", i.id);
            }
        }
        _ => {
            println!(
                "{:<16} {:<16} {:>10} {:>10} {:<16} {:<8}",
                style("ID").bold(),
                style("PATIENT").bold(),
                style("AMOUNT").bold(),
                style("BALANCE").bold(),
                style("STATUS").bold(),
                style("DUE").bold()
            );
            println!("{}", "-".repeat(84));
            for i in &invoices {
                let status_label = if i.is_overdue(today) {
                    style(format!("{} (overdue)", i.status)).red()
                } else {
                    style(i.status.to_string()).dim()
                };
                println!(
                    "{:<16} {:<16} {:>10.2} {:>10.2} {:<16} {:<8}",
                    format_short_id(&i.id),
                    format_short_id(&i.patient_id),
                    i.amount,
                    i.balance(),
                    status_label,
                    i.due.map(|d| d.to_string()).unwrap_or_default()
                );
            }
            println!();
            println!("{} invoice(s) found", style(invoices.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let (Some(patient_query), Some(amount)) = (args.patient, args.amount) else {
        return Err(miette::miette!(
            "Missing required flags: --patient and --amount"
        ));
    };
    if amount < 0.0 {
        return Err(miette::miette!("Invoice amount cannot be negative"));
    }

    let (patient, _path) = find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, &patient_query)?;

    let id = EntityId::new(EntityPrefix::Inv);
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_patient_id(patient.id.to_string())
        .with_amount(amount)
        .with_status("draft");

    let yaml_content = generator
        .generate_invoice(&template_ctx)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = ctx.project.entity_path(EntityPrefix::Inv, &id);
    fs::write(&file_path, &yaml_content).into_diagnostic()?;

    println!(
        "{} Created draft invoice {} for {}",
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
    let (invoice, _path) = find_entity::<Invoice>(&ctx.project, EntityPrefix::Inv, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&invoice).into_diagnostic()?
            );
        }
        OutputFormat::Id => println!("{}", invoice.id),
        _ => print!("{}", serde_yml::to_string(&invoice).into_diagnostic()?),
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (invoice, path) = find_entity::<Invoice>(&ctx.project, EntityPrefix::Inv, &args.id)?;

    println!(
        "Opening {} in {}...",
        style(format_short_id(&invoice.id)).cyan(),
        style(ctx.config.editor()).yellow()
    );
    ctx.config.run_editor(&path).into_diagnostic()?;

    Ok(())
}

fn run_pay(args: PayArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (mut invoice, path) = find_entity::<Invoice>(&ctx.project, EntityPrefix::Inv, &args.id)?;

    if args.amount <= 0.0 {
        return Err(miette::miette!("Payment amount must be positive"));
    }
    if invoice.status == InvoiceStatus::Void {
        return Err(miette::miette!("Cannot record a payment on a void invoice"));
    }

    invoice.record_payment(args.amount);
    invoice.revision += 1;

    let yaml = serde_yml::to_string(&invoice).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Recorded {:.2}; invoice {} is now {} (balance {:.2})",
        style("✓").green(),
        args.amount,
        style(format_short_id(&invoice.id)).cyan(),
        style(invoice.status).yellow(),
        invoice.balance()
    );

    Ok(())
}
