//! `hsp status` command - Portal census dashboard

use chrono::Utc;
use console::style;
use miette::Result;
use std::collections::BTreeMap;

use crate::cli::helpers::load_entities;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::AppContext;
use crate::entities::claim::{Claim, ClaimStatus};
use crate::entities::credential::{Credential, ExpiryState};
use crate::entities::invoice::Invoice;
use crate::entities::note::{Note, NoteStatus};
use crate::entities::patient::Patient;
use crate::entities::staff::{Staff, StaffStatus};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show only one section (patients, staff, credentials, billing, notes)
    #[arg(long)]
    pub section: Option<String>,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let today = Utc::now().date_naive();

    let patients: Vec<Patient> = load_entities(&ctx.project, EntityPrefix::Pat)
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    let staff: Vec<Staff> = load_entities(&ctx.project, EntityPrefix::Stf)
        .into_iter()
        .map(|(s, _)| s)
        .collect();
    let credentials: Vec<Credential> = load_entities(&ctx.project, EntityPrefix::Cred)
        .into_iter()
        .map(|(c, _)| c)
        .collect();
    let claims: Vec<Claim> = load_entities(&ctx.project, EntityPrefix::Clm)
        .into_iter()
        .map(|(c, _)| c)
        .collect();
    let invoices: Vec<Invoice> = load_entities(&ctx.project, EntityPrefix::Inv)
        .into_iter()
        .map(|(i, _)| i)
        .collect();
    let notes: Vec<Note> = load_entities(&ctx.project, EntityPrefix::Note)
        .into_iter()
        .map(|(n, _)| n)
        .collect();

    // Single-pass tallies per section
    let mut patient_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for p in &patients {
        *patient_counts.entry(p.status.as_str()).or_default() += 1;
    }

    let active_staff = staff
        .iter()
        .filter(|s| s.status == StaffStatus::Active)
        .count();

    let mut cred_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for c in &credentials {
        *cred_counts.entry(c.expiry_state(today).as_str()).or_default() += 1;
    }

    let mut claim_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for c in &claims {
        *claim_counts.entry(c.status.as_str()).or_default() += 1;
    }

    let overdue_invoices = invoices.iter().filter(|i| i.is_overdue(today)).count();
    let outstanding: f64 = invoices.iter().map(|i| i.balance()).sum();

    let unsigned_notes = notes
        .iter()
        .filter(|n| n.status == NoteStatus::Draft)
        .count();

    if global.format == OutputFormat::Json {
        let status = serde_json::json!({
            "patients": { "total": patients.len(), "by_status": patient_counts },
            "staff": { "total": staff.len(), "active": active_staff },
            "credentials": { "total": credentials.len(), "by_state": cred_counts },
            "claims": { "total": claims.len(), "by_status": claim_counts },
            "invoices": {
                "total": invoices.len(),
                "overdue": overdue_invoices,
                "outstanding": outstanding,
            },
            "notes": { "total": notes.len(), "unsigned": unsigned_notes },
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_default()
        );
        return Ok(());
    }

    let width = 60;
    let section = args.section.as_deref();
    let show = |name: &str| section.is_none() || section == Some(name);

    println!("{}", style("Portal Status").bold().underlined());
    println!("{}", "═".repeat(width));

    if show("patients") {
        println!();
        println!("{} ({} total)", style("Patients").bold(), patients.len());
        for (status, count) in &patient_counts {
            println!("  {:<14} {}", status, count);
        }
    }

    if show("staff") {
        println!();
        println!("{} ({} total)", style("Staff").bold(), staff.len());
        println!("  {:<14} {}", "active", active_staff);
        println!("  {:<14} {}", "other", staff.len() - active_staff);
    }

    if show("credentials") {
        println!();
        println!(
            "{} ({} total)",
            style("Credentials").bold(),
            credentials.len()
        );
        for state in [ExpiryState::Valid, ExpiryState::Expiring, ExpiryState::Expired] {
            let count = cred_counts.get(state.as_str()).copied().unwrap_or(0);
            let label = match state {
                ExpiryState::Valid => style(format!("{:<14} {}", "valid", count)).green(),
                ExpiryState::Expiring => style(format!("{:<14} {}", "expiring", count)).yellow(),
                ExpiryState::Expired => style(format!("{:<14} {}", "expired", count)).red(),
            };
            println!("  {}", label);
        }
    }

    if show("billing") {
        println!();
        println!("{} ({} claims)", style("Billing").bold(), claims.len());
        for status in ClaimStatus::all() {
            let count = claim_counts.get(status.as_str()).copied().unwrap_or(0);
            if count > 0 {
                println!("  {:<14} {}", status.as_str(), count);
            }
        }
        println!(
            "  {:<14} {} ({} overdue, {:.2} outstanding)",
            "invoices",
            invoices.len(),
            overdue_invoices,
            outstanding
        );
    }

    if show("notes") {
        println!();
        println!("{} ({} total)", style("Clinical notes").bold(), notes.len());
        println!("  {:<14} {}", "unsigned", unsigned_notes);
    }

    println!();
    Ok(())
}
