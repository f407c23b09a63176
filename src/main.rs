use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use filecoll::cli::{Cli, Commands};
use filecoll::output::{self, Verbosity};
use filecoll::{CollectionContext, LOG_ENV, commands};
use std::io;
use std::process;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    output::set_verbosity(verbosity);
    init_logging(cli.verbose);

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = CollectionContext::new(cli.collection)?;
    let cancel = ctx.cancel.clone();
    ctrlc::set_handler(move || {
        cancel.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Execute command
    match cli.command {
        Commands::Init { force } => commands::init::execute(&ctx, force)?,
        Commands::Check { path } => commands::check::execute(&ctx, path.as_deref())?,
        Commands::Add { path } => commands::add::execute(&ctx, path.as_deref())?,
        Commands::Prune { path } => commands::prune::execute(&ctx, path.as_deref())?,
        Commands::RenameMissing { path, yes } => {
            commands::rename_missing::execute(&ctx, path.as_deref(), yes)?;
        }
        Commands::Checksum {
            path,
            algorithm,
            all,
        } => {
            commands::checksum::execute(&ctx, path.as_deref(), algorithm.as_deref(), all)?;
        }
        Commands::Verify { path } => commands::verify::execute(&ctx, path.as_deref())?,
        Commands::Deps { path } => commands::deps::execute(&ctx, path.as_deref())?,
        Commands::Export { path, output } => {
            commands::export::execute(&ctx, path.as_deref(), &output)?;
        }
        Commands::Mark { path, dirty, .. } => {
            commands::mark::execute(&ctx, path.as_deref(), dirty)?;
        }
        Commands::Ls {
            path,
            recursive,
            long,
        } => commands::ls::execute(&ctx, path.as_deref(), recursive, long)?,
        Commands::Find {
            desc,
            all,
            glob,
            ignore_case,
            under,
        } => {
            let query = match glob.as_deref() {
                Some(pattern) => commands::find::Query::Path {
                    pattern,
                    case_sensitive: !ignore_case,
                },
                None => commands::find::Query::Description {
                    terms: &desc,
                    match_all: all,
                },
            };
            commands::find::execute(&ctx, &query, under.as_deref())?;
        }
        Commands::Describe { path, text } => commands::describe::execute(&ctx, &path, &text)?,
        Commands::Provide {
            path,
            name,
            version,
            remove,
        } => commands::provide::execute(&ctx, &path, &name, version.as_deref(), remove)?,
        Commands::Require {
            path,
            name,
            min,
            max,
            remove,
        } => commands::require::execute(
            &ctx,
            &path,
            &name,
            min.as_deref(),
            max.as_deref(),
            remove,
        )?,
        Commands::Mv { source, target } => commands::mv::execute(&ctx, &source, &target)?,
        Commands::Rm { path } => commands::rm::execute(&ctx, &path)?,
        Commands::Rename { path, name } => commands::rename::execute(&ctx, &path, &name)?,
        Commands::Config { key, value, list } => {
            commands::config::execute(&mut ctx, key.as_deref(), value.as_deref(), list)?;
        }
        Commands::Completion { shell } => print_completions(shell, &mut Cli::command()),
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `FCOLL_LOG` (default `warn`,
/// `debug` for this crate with `--verbose`).
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,filecoll=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
