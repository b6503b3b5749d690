use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelf_lib::{StorePlatform, SyncError, SyncReport};
use shelf_remote::{IgdbClient, IgdbKeys, SteamClient, SteamKeys};

use crate::progress;
use crate::{CliError, Context, ctrl_c_token, runtime};

/// Sync one store's ownership list into the library.
pub(crate) fn run_sync(ctx: &Context, platform: StorePlatform, retry: bool) -> Result<(), CliError> {
    if platform != StorePlatform::Steam {
        return Err(CliError::unsupported(platform.display_name()));
    }

    let steam_keys = SteamKeys::load()?;
    let igdb_keys = IgdbKeys::load()?;
    let mut library = ctx.load_library()?;
    let source = SteamClient::new(steam_keys)?;

    runtime()?.block_on(async {
        let reconciler = ctx.reconciler(connect_catalog(&igdb_keys).await?);
        let cancel = ctrl_c_token();

        let report = library
            .sync(&source, &reconciler, &cancel, &*progress::reporter())
            .await?;
        print_report(&report);

        if retry {
            let report = library
                .retry_unreconciled(platform, &reconciler, &cancel, &*progress::reporter())
                .await?;
            if report.delta > 0 {
                println!(
                    "{} Retried {} unmatched: {} now matched",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    report.delta,
                    report.resolved,
                );
            }
        }

        let pending = library.state().unreconciled_on(platform).count();
        if pending > 0 {
            println!(
                "  {} {} games without a match, see 'shelf unreconciled'",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                pending,
            );
        }
        Ok::<_, CliError>(())
    })
}

/// Link an unreconciled game to an explicit catalog id.
pub(crate) fn run_match(
    ctx: &Context,
    platform: StorePlatform,
    source_id: i64,
    catalog_id: u64,
) -> Result<(), CliError> {
    let mut library = ctx.load_library()?;
    if !library
        .state()
        .unreconciled_on(platform)
        .any(|r| r.source_id == source_id)
    {
        return Err(SyncError::UnknownRecord {
            platform,
            source_id,
        }
        .into());
    }
    let igdb_keys = IgdbKeys::load()?;

    runtime()?.block_on(async {
        let reconciler = ctx.reconciler(connect_catalog(&igdb_keys).await?);
        let cancel = ctrl_c_token();
        library
            .manual_match(platform, source_id, catalog_id, &reconciler, &cancel)
            .await?;
        Ok::<_, CliError>(())
    })?;

    if let Some(entry) = library.state().entry(catalog_id) {
        println!(
            "{} Linked {} {} to '{}' ({})",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            platform,
            source_id,
            entry.title.if_supports_color(Stdout, |t| t.bold()),
            catalog_id,
        );
    }
    Ok(())
}

async fn connect_catalog(keys: &IgdbKeys) -> Result<IgdbClient, CliError> {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("/-\\|"));
    }
    pb.set_message("Connecting to IGDB...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = IgdbClient::connect(keys).await;
    pb.finish_and_clear();
    let client = result?;
    log::info!(
        "Connected to IGDB (session valid until {})",
        client.session().expires_at().format("%Y-%m-%d %H:%M")
    );
    Ok(client)
}

fn print_report(report: &SyncReport) {
    if report.delta == 0 {
        println!(
            "{} {}: library up to date ({} owned)",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            report.platform.display_name(),
            report.owned,
        );
        return;
    }
    println!(
        "{} {}: {} owned, {} new, {} matched, {} unmatched",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.platform.display_name(),
        report.owned,
        report.delta,
        report.resolved.if_supports_color(Stdout, |t| t.green()),
        report.unresolved.if_supports_color(Stdout, |t| t.yellow()),
    );
}
