//! Pattern store statistics command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Display pattern store statistics.
///
/// Shows pattern counts by website, average confidence, and the overall
/// replay success rate.
pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.automation_service.pattern_statistics().await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "total_patterns": stats.total_patterns,
            "patterns_by_website": stats.patterns_by_website,
            "average_confidence": stats.average_confidence,
            "success_rate": stats.success_rate,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Semantest v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Patterns ──").dim());
    println!(
        "  Total:              {}",
        style(stats.total_patterns).bold()
    );
    println!(
        "  Average confidence: {}",
        format_confidence(stats.average_confidence)
    );
    println!(
        "  Success rate:       {:.0}%",
        stats.success_rate * 100.0
    );
    println!();

    if !stats.patterns_by_website.is_empty() {
        println!("  {}", style("── By website ──").dim());
        for (website, count) in &stats.patterns_by_website {
            println!("  {:<28} {}", website, style(count).bold());
        }
        println!();
    }

    println!("  {}", style("── Storage ──").dim());
    println!(
        "  Data dir: {}",
        style(state.data_dir.display()).dim()
    );
    println!();

    Ok(())
}

fn format_confidence(confidence: f64) -> String {
    let value = format!("{confidence:.2}");
    if confidence >= 0.8 {
        format!("{}", style(value).green())
    } else if confidence >= 0.5 {
        format!("{}", style(value).yellow())
    } else {
        format!("{}", style(value).red())
    }
}
