use clap::Parser;
use miette::Result;

use hsp::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    // Install miette's fancy error handler for readable diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => hsp::cli::commands::init::run(args),
        Commands::Register(args) => hsp::cli::commands::register::run(args, &global),
        Commands::Patient(cmd) => hsp::cli::commands::patient::run(cmd, &global),
        Commands::Staff(cmd) => hsp::cli::commands::staff::run(cmd, &global),
        Commands::Cred(cmd) => hsp::cli::commands::cred::run(cmd, &global),
        Commands::Claim(cmd) => hsp::cli::commands::claim::run(cmd, &global),
        Commands::Invoice(cmd) => hsp::cli::commands::invoice::run(cmd, &global),
        Commands::Note(cmd) => hsp::cli::commands::note::run(cmd, &global),
        Commands::Validate(args) => hsp::cli::commands::validate::run(args, &global),
        Commands::Status(args) => hsp::cli::commands::status::run(args, &global),
        Commands::Import(args) => hsp::cli::commands::import::run(args, &global),
        Commands::Completions(args) => hsp::cli::commands::completions::run(args),
    }
}
