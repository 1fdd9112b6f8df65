//! `hsp note` command - Clinical note management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::{find_entity, format_short_id, load_entities, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::AppContext;
use crate::entities::note::{Note, NoteStatus, NoteType};
use crate::entities::patient::Patient;
use crate::schema::{TemplateContext, TemplateGenerator};

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// List clinical notes with filtering
    List(ListArgs),

    /// Write a new draft note
    New(NewArgs),

    /// Show a note's details
    Show(ShowArgs),

    /// Edit a draft note in your editor
    Edit(EditArgs),

    /// Sign a draft note, locking its content
    Sign(SignArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeFilter {
    Progress,
    Admission,
    Discharge,
    Consult,
    Procedure,
    All,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by note type
    #[arg(long, short = 't', default_value = "all")]
    pub r#type: TypeFilter,

    /// Show only unsigned (draft) notes
    #[arg(long)]
    pub unsigned: bool,

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

    /// Note type
    #[arg(long, short = 't', default_value = "progress")]
    pub r#type: String,

    /// Short subject line
    #[arg(long)]
    pub title: Option<String>,

    /// Note body
    #[arg(long)]
    pub text: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Note ID or fuzzy title search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Note ID or fuzzy title search term
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SignArgs {
    /// Note ID or fuzzy title search term
    pub id: String,
}

pub fn run(cmd: NoteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        NoteCommands::List(args) => run_list(args, global),
        NoteCommands::New(args) => run_new(args, global),
        NoteCommands::Show(args) => run_show(args, global),
        NoteCommands::Edit(args) => run_edit(args, global),
        NoteCommands::Sign(args) => run_sign(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let mut notes: Vec<Note> = load_entities(&ctx.project, EntityPrefix::Note)
        .into_iter()
        .map(|(note, _path)| note)
        .collect();

    if !matches!(args.r#type, TypeFilter::All) {
        let wanted = match args.r#type {
            TypeFilter::Progress => NoteType::Progress,
            TypeFilter::Admission => NoteType::Admission,
            TypeFilter::Discharge => NoteType::Discharge,
            TypeFilter::Consult => NoteType::Consult,
            TypeFilter::Procedure => NoteType::Procedure,
            TypeFilter::All => unreachable!(),
        };
        notes.retain(|n| n.note_type == wanted);
    }
    if args.unsigned {
        notes.retain(|n| n.status == NoteStatus::Draft);
    }
    if let Some(ref patient_query) = args.patient {
        let (patient, _path) =
            find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, patient_query)?;
        notes.retain(|n| n.patient_id == patient.id);
    }

    notes.sort_by(|a, b| a.created.cmp(&b.created));

    if args.count {
        println!("{}", notes.len());
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&notes).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&notes).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for n in &notes {
                println!("{}", n.id);
            }
        }
        _ => {
            println!(
                "{:<16} {:<12} {:<34} {:<10}",
                style("ID").bold(),
                style("TYPE").bold(),
                style("TITLE").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(74));
            for n in &notes {
                println!(
                    "{:<16} {:<12} {:<34} {:<10}",
                    format_short_id(&n.id),
                    n.note_type,
                    truncate_str(&n.title, 32),
                    n.status
                );
            }
            println!();
            println!("{} note(s) found", style(notes.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let (Some(patient_query), Some(title), Some(text)) = (args.patient, args.title, args.text)
    else {
        return Err(miette::miette!(
            "Missing required flags: --patient, --title, and --text"
        ));
    };
    let note_type: NoteType = args.r#type.parse().map_err(|e| miette::miette!("{}", e))?;

    let (patient, _path) = find_entity::<Patient>(&ctx.project, EntityPrefix::Pat, &patient_query)?;

    let id = EntityId::new(EntityPrefix::Note);
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let template_ctx = TemplateContext::new(id.clone(), ctx.config.author())
        .with_patient_id(patient.id.to_string())
        .with_note_type(note_type.to_string())
        .with_title(&title)
        .with_text(&text)
        .with_status("draft");

    let yaml_content = generator
        .generate_note(&template_ctx)
        .map_err(|e| miette::miette!("{}", e))?;

    let file_path = ctx.project.entity_path(EntityPrefix::Note, &id);
    fs::write(&file_path, &yaml_content).into_diagnostic()?;

    println!(
        "{} Created draft note {} for {}",
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
    let (note, _path) = find_entity::<Note>(&ctx.project, EntityPrefix::Note, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&note).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", note.id),
        _ => print!("{}", serde_yml::to_string(&note).into_diagnostic()?),
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (note, path) = find_entity::<Note>(&ctx.project, EntityPrefix::Note, &args.id)?;

    if note.status != NoteStatus::Draft {
        println!(
            "{} Note {} is {}; edits after signing belong in an amendment",
            style("!").yellow(),
            format_short_id(&note.id),
            note.status
        );
    }

    ctx.config.run_editor(&path).into_diagnostic()?;
    Ok(())
}

fn run_sign(args: SignArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::discover_at(global.project.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;
    let (mut note, path) = find_entity::<Note>(&ctx.project, EntityPrefix::Note, &args.id)?;

    let signer = ctx.config.author();
    note.sign(&signer).map_err(|e| miette::miette!("{}", e))?;
    note.revision += 1;

    let yaml = serde_yml::to_string(&note).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Note {} signed by {}",
        style("✓").green(),
        style(format_short_id(&note.id)).cyan(),
        style(&signer).yellow()
    );

    Ok(())
}
