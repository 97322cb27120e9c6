//! Pattern export and import commands.
//!
//! The file format is a plain JSON array of patterns, the same shape the
//! engine serializes everywhere else, so exports from one machine import
//! cleanly on another.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use semantest_types::pattern::AutomationPattern;

use crate::state::AppState;

/// Write every stored pattern to a JSON file.
pub async fn export_patterns(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let patterns = state.automation_service.export_patterns().await?;
    let content = serde_json::to_string_pretty(&patterns)?;

    tokio::fs::write(file, content)
        .await
        .with_context(|| format!("failed to write {}", file.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({"exported": patterns.len(), "file": file.display().to_string()})
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Exported {} pattern{} to {}",
        style("✓").green().bold(),
        style(patterns.len()).bold(),
        if patterns.len() == 1 { "" } else { "s" },
        style(file.display()).cyan()
    );
    println!();

    Ok(())
}

/// Load patterns from a JSON file into the store, replacing any that share
/// an id with an incoming pattern.
pub async fn import_patterns(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let patterns: Vec<AutomationPattern> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid pattern export", file.display()))?;

    let written = state.automation_service.import_patterns(&patterns).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"imported": written, "file": file.display().to_string()})
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Imported {} pattern{} from {}",
        style("✓").green().bold(),
        style(written).bold(),
        if written == 1 { "" } else { "s" },
        style(file.display()).cyan()
    );
    println!();

    Ok(())
}
