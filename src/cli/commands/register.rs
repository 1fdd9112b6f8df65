//! `hsp register` command - the three-step hospital registration wizard
//!
//! Interactive mode prompts step by step with live validation; flag mode
//! feeds every field at once and reports per-field errors on failure.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::AppContext;
use crate::registration::record::{FieldKind, RegStep};
use crate::registration::{FileGateway, Wizard, WizardError};

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Run the interactive step-by-step wizard
    #[arg(long, short = 'i')]
    pub interactive: bool,

    // ========== HOSPITAL INFORMATION ==========
    /// Hospital name
    #[arg(long)]
    pub name: Option<String>,

    /// Hospital type (general/clinic/specialty/teaching)
    #[arg(long = "type", short = 't')]
    pub hospital_type: Option<String>,

    /// Hospital contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Hospital contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Public website
    #[arg(long)]
    pub website: Option<String>,

    // ========== ADDRESS & BUSINESS ==========
    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State or province
    #[arg(long)]
    pub state: Option<String>,

    /// Postal code
    #[arg(long)]
    pub postal_code: Option<String>,

    /// Country
    #[arg(long)]
    pub country: Option<String>,

    /// Operating license number
    #[arg(long)]
    pub license_number: Option<String>,

    /// Tax identifier
    #[arg(long)]
    pub tax_id: Option<String>,

    // ========== ADMINISTRATOR ACCOUNT ==========
    /// Administrator full name
    #[arg(long)]
    pub admin_name: Option<String>,

    /// Administrator email (used to sign in afterwards)
    #[arg(long)]
    pub admin_email: Option<String>,

    /// Administrator password
    #[arg(long)]
    pub admin_password: Option<String>,

    /// Administrator password, repeated
    #[arg(long)]
    pub admin_confirm_password: Option<String>,
}

pub fn run(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    if args.interactive {
        run_interactive(&ctx)
    } else {
        run_flags(&ctx, args)
    }
}

/// Flag mode: feed every field, walking the wizard forward step by step
fn run_flags(ctx: &AppContext, args: RegisterArgs) -> Result<()> {
    let mut wizard = Wizard::new(ctx.config.timezone());

    apply(&mut wizard, "hospital_name", &args.name);
    apply(&mut wizard, "hospital_type", &args.hospital_type);
    apply(&mut wizard, "hospital_email", &args.email);
    apply(&mut wizard, "hospital_phone", &args.phone);
    apply(&mut wizard, "website", &args.website);
    advance(&mut wizard)?;

    apply(&mut wizard, "address_line1", &args.address);
    apply(&mut wizard, "city", &args.city);
    apply(&mut wizard, "state", &args.state);
    apply(&mut wizard, "postal_code", &args.postal_code);
    apply(&mut wizard, "country", &args.country);
    apply(&mut wizard, "license_number", &args.license_number);
    apply(&mut wizard, "tax_id", &args.tax_id);
    advance(&mut wizard)?;

    apply(&mut wizard, "admin_name", &args.admin_name);
    apply(&mut wizard, "admin_email", &args.admin_email);
    apply(&mut wizard, "admin_password", &args.admin_password);
    apply(&mut wizard, "admin_confirm_password", &args.admin_confirm_password);

    let gateway = FileGateway::new(&ctx.project, ctx.config.author());
    match wizard.submit(&gateway) {
        Ok(id) => {
            print_success(ctx, &wizard, &id);
            Ok(())
        }
        Err(WizardError::StepIncomplete { step, errors }) => {
            print_field_errors(&errors);
            Err(miette::miette!("step '{}' is incomplete", step))
        }
        Err(WizardError::Gateway(err)) => {
            print_gateway_failure(&err.to_string());
            Err(miette::miette!("registration was not accepted"))
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn apply(wizard: &mut Wizard, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        wizard.set_field(name, value.clone());
    }
}

fn advance(wizard: &mut Wizard) -> Result<()> {
    wizard.next().map_err(|e| match e {
        WizardError::StepIncomplete { step, errors } => {
            print_field_errors(&errors);
            miette::miette!("step '{}' is incomplete", step)
        }
        other => miette::miette!("{}", other),
    })
}

/// Interactive mode: prompt each step's fields, then let the user continue,
/// go back, or submit
fn run_interactive(ctx: &AppContext) -> Result<()> {
    let theme = ColorfulTheme::default();
    let gateway = FileGateway::new(&ctx.project, ctx.config.author());
    let mut wizard = Wizard::new(ctx.config.timezone());

    // Set after a gateway failure so the retry menu shows without
    // re-prompting fields the wizard still holds
    let mut skip_prompts = false;

    loop {
        let step = wizard.active();

        if !skip_prompts {
            print_step_header(&wizard, step);
            for spec in step.fields() {
                prompt_field(&theme, &mut wizard, spec)?;
            }
            if !wizard.errors().is_empty() {
                println!();
                print_field_errors(wizard.errors());
            }
        }
        skip_prompts = false;

        let is_final = step.next().is_none();
        let forward = if is_final { "Submit registration" } else { "Continue" };
        let mut actions = vec![forward, "Edit this step again"];
        if step.prev().is_some() {
            actions.push("Back");
        }
        actions.push("Cancel");

        println!();
        let choice = Select::with_theme(&theme)
            .with_prompt("Next")
            .items(&actions)
            .default(0)
            .interact()
            .into_diagnostic()?;

        match actions[choice] {
            "Continue" => {
                if let Err(WizardError::StepIncomplete { errors, .. }) = wizard.next() {
                    print_field_errors(&errors);
                }
            }
            "Submit registration" => match wizard.submit(&gateway) {
                Ok(id) => {
                    print_success(ctx, &wizard, &id);
                    return Ok(());
                }
                Err(WizardError::StepIncomplete { errors, .. }) => {
                    print_field_errors(&errors);
                }
                Err(WizardError::Gateway(err)) => {
                    print_gateway_failure(&err.to_string());
                    skip_prompts = true;
                }
                Err(e) => return Err(miette::miette!("{}", e)),
            },
            "Edit this step again" => {}
            "Back" => {
                // Back is never blocked; entered values are snapshotted
                let _ = wizard.back();
            }
            "Cancel" => {
                println!("Registration cancelled. Nothing was saved.");
                return Ok(());
            }
            _ => unreachable!(),
        }
    }
}

fn prompt_field(
    theme: &ColorfulTheme,
    wizard: &mut Wizard,
    spec: &crate::registration::FieldSpec,
) -> Result<()> {
    match spec.kind {
        FieldKind::Select(options) => {
            let default_idx = wizard
                .field(spec.name)
                .and_then(|current| options.iter().position(|o| *o == current))
                .unwrap_or(0);
            let selection = Select::with_theme(theme)
                .with_prompt(spec.label)
                .items(options)
                .default(default_idx)
                .interact()
                .into_diagnostic()?;
            wizard.set_field(spec.name, options[selection]);
        }
        FieldKind::Password | FieldKind::PasswordConfirm => {
            let value = Password::with_theme(theme)
                .with_prompt(spec.label)
                .interact()
                .into_diagnostic()?;
            wizard.set_field(spec.name, value);
        }
        _ => {
            let current = wizard.field(spec.name).unwrap_or("").to_string();
            let value: String = if current.is_empty() {
                Input::with_theme(theme)
                    .with_prompt(spec.label)
                    .allow_empty(!spec.required)
                    .interact_text()
                    .into_diagnostic()?
            } else {
                Input::with_theme(theme)
                    .with_prompt(spec.label)
                    .default(current)
                    .allow_empty(!spec.required)
                    .interact_text()
                    .into_diagnostic()?
            };
            wizard.set_field(spec.name, value);
        }
    }
    Ok(())
}

/// Step heading plus completion badges for the other steps
fn print_step_header(wizard: &Wizard, step: RegStep) {
    println!();
    println!(
        "{} Step {} of {}: {}",
        style("◆").cyan(),
        step.index() + 1,
        RegStep::COUNT,
        style(step.title()).bold()
    );
    for other in RegStep::all() {
        if *other == step {
            continue;
        }
        let badge = if wizard.is_complete(*other) {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("  {} {}", badge, style(other.title()).dim());
    }
    println!("{}", style("─".repeat(50)).dim());
}

fn print_field_errors(errors: &BTreeMap<String, String>) {
    for (field, message) in errors {
        println!("  {} {}: {}", style("✗").red(), style(field).bold(), message);
    }
}

fn print_gateway_failure(message: &str) {
    println!();
    println!(
        "{} {}",
        style("✗ Registration failed:").red().bold(),
        message
    );
    println!("  Your entries were kept. Fix the problem and submit again.");
}

fn print_success(ctx: &AppContext, wizard: &Wizard, id: &EntityId) {
    let name = wizard
        .saved_field(RegStep::HospitalInfo, "hospital_name")
        .unwrap_or("hospital");
    let admin_email = wizard
        .saved_field(RegStep::AdminAccount, "admin_email")
        .unwrap_or("the administrator email");

    println!();
    println!(
        "{} Registered {} ({})",
        style("✓").green(),
        style(name).cyan(),
        id
    );
    println!(
        "   {}",
        style(ctx.project.entity_path(EntityPrefix::Hosp, id).display()).dim()
    );
    println!();
    println!(
        "Sign in to the staff portal as {} to finish setup.",
        style(admin_email).yellow()
    );
}
