use chrono::{DateTime, Datelike};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelf_lib::{LibraryEntry, StorePlatform, SyncError};
use shelf_remote::KeySource;

use crate::{CliError, Context};

/// Show library totals, where the library lives and where keys come from.
pub(crate) fn run_status(ctx: &Context, list_entries: bool) -> Result<(), CliError> {
    let library = ctx.load_library()?;
    let state = library.state();
    let path = ctx.store().path_for(&ctx.user).map_err(SyncError::Store)?;

    println!(
        "{} '{}'",
        "Library".if_supports_color(Stdout, |t| t.bold()),
        ctx.user,
    );
    println!(
        "  State file:   {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        if path.exists() { "" } else { "(not created yet)" },
    );
    println!("  Games:        {}", state.entries.len());
    for platform in StorePlatform::all() {
        let linked = state
            .entries
            .iter()
            .filter(|e| e.ownership_links.iter().any(|l| l.platform == *platform))
            .count();
        let pending = state.unreconciled_on(*platform).count();
        if linked + pending > 0 {
            println!(
                "  {:<13} {} matched, {} unmatched",
                format!("{}:", platform.display_name()),
                linked,
                pending,
            );
        }
    }
    println!();

    println!("{}", "Settings".if_supports_color(Stdout, |t| t.bold()));
    println!("  Catalog QPS:  {}", ctx.settings.qps);
    println!("  Workers:      {}", ctx.settings.max_workers);
    println!();

    println!(
        "{} ({})",
        "Keys".if_supports_color(Stdout, |t| t.bold()),
        shelf_remote::keys_path().display(),
    );
    for (var, source) in shelf_remote::key_sources() {
        let source = match source {
            KeySource::Missing => source
                .to_string()
                .if_supports_color(Stdout, |t| t.red())
                .to_string(),
            other => other.to_string(),
        };
        println!("  {:<20} {}", var, source);
    }

    if list_entries && !state.entries.is_empty() {
        println!();
        let mut entries: Vec<&LibraryEntry> = state.entries.iter().collect();
        entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        for entry in entries {
            print_entry(entry);
        }
    }
    Ok(())
}

/// List owned games still waiting for a catalog match.
pub(crate) fn run_unreconciled(ctx: &Context) -> Result<(), CliError> {
    let library = ctx.load_library()?;
    let pending = &library.state().unreconciled;
    if pending.is_empty() {
        println!(
            "{} Every owned game is matched",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
        return Ok(());
    }

    for record in pending {
        println!(
            "  {:<6} {:>10}  {}",
            record.platform.short_name(),
            record.source_id,
            record.title,
        );
    }
    println!();
    println!(
        "{} unmatched. Link one with 'shelf match <source-id> <igdb-id>'.",
        pending.len()
    );
    Ok(())
}

fn print_entry(entry: &LibraryEntry) {
    let year = entry
        .release_date
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|d| format!(" ({})", d.year()))
        .unwrap_or_default();
    let links: Vec<String> = entry
        .ownership_links
        .iter()
        .map(|l| format!("{}:{}", l.platform.short_name(), l.source_id))
        .collect();

    println!(
        "  {}{} {}",
        entry.title.if_supports_color(Stdout, |t| t.bold()),
        year.if_supports_color(Stdout, |t| t.dimmed()),
        format!("[{}]", links.join(", ")).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if let Some(ref collection) = entry.collection {
        println!("      series: {}", collection.name);
    }
}
