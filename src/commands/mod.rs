pub mod add;
pub mod check;
pub mod checksum;
pub mod config;
pub mod deps;
pub mod describe;
pub mod export;
pub mod find;
pub mod init;
pub mod ls;
pub mod mark;
pub mod mv;
pub mod provide;
pub mod prune;
pub mod rename;
pub mod rename_missing;
pub mod require;
pub mod rm;
pub mod verify;

use crate::CollectionContext;
use crate::output::{self, ConsoleCallback};
use crate::reconcile::{ActionCallback, Outcome};
use crate::tree::Collection;
use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Runs a reconciliation operation with a console sink.
///
/// The collection is saved afterwards when it changed, even if the
/// operation was cancelled part way. Returns the number of problems
/// (important messages) reported.
///
/// # Errors
///
/// Returns an error if the operation halted or saving failed.
pub fn run_operation<F>(
    ctx: &CollectionContext,
    collection: &mut Collection,
    title: &str,
    operation: F,
) -> Result<usize>
where
    F: FnOnce(&mut Collection, &mut ConsoleCallback) -> Outcome,
{
    let sink = ConsoleCallback::new(title, Arc::clone(&ctx.cancel));
    run_with_sink(ctx, collection, sink, operation)
}

/// [`run_operation`] for operations that poll exactly once per item, so
/// progress can be shown as a percentage of `total`.
///
/// # Errors
///
/// Returns an error if the operation halted or saving failed.
pub fn run_counted<F>(
    ctx: &CollectionContext,
    collection: &mut Collection,
    title: &str,
    total: usize,
    operation: F,
) -> Result<usize>
where
    F: FnOnce(&mut Collection, &mut ConsoleCallback) -> Outcome,
{
    let sink = ConsoleCallback::with_total(title, total, Arc::clone(&ctx.cancel));
    run_with_sink(ctx, collection, sink, operation)
}

fn run_with_sink<F>(
    ctx: &CollectionContext,
    collection: &mut Collection,
    mut sink: ConsoleCallback,
    operation: F,
) -> Result<usize>
where
    F: FnOnce(&mut Collection, &mut ConsoleCallback) -> Outcome,
{
    sink.set_progress_skip(ctx.config.output.progress_skip);

    let outcome = operation(collection, &mut sink);
    let problems = sink.problems();
    sink.finish();

    if ctx.save_if_dirty(collection)? {
        output::verbose(&format!(
            "Saved {}",
            collection.filename().display()
        ));
    }

    outcome?;
    Ok(problems)
}

/// Turns a problem count of a read-only check into the exit status.
///
/// # Errors
///
/// Returns an error when `problems` is non-zero.
pub fn report_problems(problems: usize, clean_message: &str) -> Result<()> {
    match problems {
        0 => {
            print_success(clean_message);
            Ok(())
        }
        1 => Err(anyhow::anyhow!("1 problem found")),
        n => Err(anyhow::anyhow!("{n} problems found")),
    }
}
