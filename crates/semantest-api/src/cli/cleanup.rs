//! Age-based pattern cleanup command.

use anyhow::Result;
use chrono::Utc;
use console::style;

use crate::state::AppState;

/// Delete patterns learned more than `max_age_days` ago, unless their usage
/// keeps them alive. `--dry-run` counts what would go without deleting.
pub async fn cleanup(state: &AppState, max_age_days: u32, dry_run: bool, json: bool) -> Result<()> {
    if dry_run {
        let cutoff = Utc::now() - chrono::Duration::days(max_age_days as i64);
        let floor = state.config.cleanup.low_use_floor;
        let patterns = state.automation_service.export_patterns().await?;
        let would_remove = patterns
            .iter()
            .filter(|p| p.learned_at < cutoff && p.usage_count < floor)
            .count();

        if json {
            println!(
                "{}",
                serde_json::json!({"dry_run": true, "would_remove": would_remove})
            );
            return Ok(());
        }

        println!();
        println!(
            "  {} {} pattern{} would be removed (learned over {} days ago, fewer than {} executions).",
            style("i").blue().bold(),
            style(would_remove).bold(),
            if would_remove == 1 { "" } else { "s" },
            max_age_days,
            floor
        );
        println!();
        return Ok(());
    }

    let removed = state
        .automation_service
        .cleanup_patterns(max_age_days)
        .await?;

    if json {
        println!("{}", serde_json::json!({"removed": removed}));
        return Ok(());
    }

    println!();
    println!(
        "  {} Removed {} pattern{}.",
        style("✓").green().bold(),
        style(removed).bold(),
        if removed == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
