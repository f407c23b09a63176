use crate::CollectionContext;
use crate::output;
use crate::reconcile::{RenameCandidate, RenamePicker, rename_missing_items};
use crate::tree::{Collection, NodeId};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Match missing items to renamed entries on disk
///
/// Each missing item with candidates is offered on the terminal. With
/// `yes` (or in non-interactive mode) items with exactly one candidate are
/// renamed without asking and ambiguous ones are skipped.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, or the
/// scan was cancelled.
pub fn execute(ctx: &CollectionContext, path: Option<&str>, yes: bool) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, path)?;

    let mut picker: Box<dyn RenamePicker> = if yes || ctx.non_interactive {
        Box::new(Unambiguous)
    } else {
        Box::new(Prompt::new(io::stdin().lock(), io::stderr()))
    };

    let problems = super::run_operation(ctx, &mut collection, "Matching", |coll, sink| {
        rename_missing_items(coll, dir, sink, picker.as_mut())
    })?;

    if problems == 0 {
        super::print_success("Rename matching finished");
    }
    Ok(())
}

/// Candidates grouped by missing node, in first-seen order.
fn group(candidates: &[RenameCandidate]) -> Vec<(NodeId, Vec<&RenameCandidate>)> {
    let mut groups: Vec<(NodeId, Vec<&RenameCandidate>)> = Vec::new();
    for candidate in candidates {
        match groups.iter_mut().find(|(node, _)| *node == candidate.node) {
            Some((_, list)) => list.push(candidate),
            None => groups.push((candidate.node, vec![candidate])),
        }
    }
    groups
}

/// Accepts every node that has a single candidate.
struct Unambiguous;

impl RenamePicker for Unambiguous {
    fn pick(
        &mut self,
        collection: &Collection,
        candidates: &[RenameCandidate],
    ) -> Vec<RenameCandidate> {
        let mut picked = Vec::new();
        for (node, options) in group(candidates) {
            if let [only] = options.as_slice() {
                picked.push((*only).clone());
            } else {
                output::warning(&format!(
                    "Ambiguous: {} ({} candidates), skipped",
                    collection[node].full_name(),
                    options.len()
                ));
            }
        }
        picked
    }
}

/// Asks for each missing node which candidate (if any) to use.
struct Prompt<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    const fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Reads one answer; `None` on end of input or a read error.
    fn ask(&mut self, question: &str) -> Option<String> {
        write!(self.out, "{question} ").ok()?;
        self.out.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead, W: Write> RenamePicker for Prompt<R, W> {
    fn pick(
        &mut self,
        collection: &Collection,
        candidates: &[RenameCandidate],
    ) -> Vec<RenameCandidate> {
        let mut picked = Vec::new();

        for (node, options) in group(candidates) {
            let old = collection[node].full_name().to_string();

            if let [only] = options.as_slice() {
                let new = collection.full_name_under(node, None, Some(&only.new_name));
                let Some(answer) = self.ask(&format!("Rename {old} >>> {new}? [y/N]")) else {
                    break;
                };
                if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
                    picked.push((*only).clone());
                }
                continue;
            }

            let _ = writeln!(self.out, "{} {old}", "Missing:".yellow().bold());
            for (i, option) in options.iter().enumerate() {
                let _ = writeln!(self.out, "  {}) {}", i + 1, option.new_name);
            }
            let Some(answer) = self.ask("Pick a number (empty to skip):") else {
                break;
            };
            if let Some(choice) = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i))
            {
                picked.push((*choice).clone());
            }
        }

        picked
    }
}
