//! Pattern inspection and removal commands.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use semantest_types::pattern::PatternId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum PatternsCommand {
    /// List learned patterns.
    #[command(alias = "ls")]
    List {
        /// Only show patterns learned on this website.
        #[arg(long)]
        website: Option<String>,
    },

    /// Delete one pattern by id.
    #[command(alias = "rm")]
    Delete {
        /// Pattern id (UUID).
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

/// List learned patterns in a table, optionally filtered by website.
pub async fn list_patterns(state: &AppState, website: Option<&str>, json: bool) -> Result<()> {
    let mut patterns = state.automation_service.export_patterns().await?;
    if let Some(website) = website {
        patterns.retain(|p| p.hostname() == website);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    if patterns.is_empty() {
        println!();
        println!(
            "  {} No patterns found. Patterns are learned from element selections during training.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Website").fg(Color::White),
        Cell::new("Action").fg(Color::White),
        Cell::new("Selector").fg(Color::White),
        Cell::new("Confidence").fg(Color::White),
        Cell::new("Used").fg(Color::White),
        Cell::new("Learned").fg(Color::White),
    ]);

    for pattern in &patterns {
        table.add_row(vec![
            Cell::new(short_id(&pattern.id)).fg(Color::DarkGrey),
            Cell::new(pattern.hostname()).fg(Color::Cyan),
            Cell::new(pattern.message_type().to_string()),
            Cell::new(truncate(&pattern.selector, 40)),
            confidence_cell(pattern.confidence),
            Cell::new(pattern.usage_count.to_string()),
            Cell::new(format_relative_time(&pattern.learned_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} pattern{}",
        style(patterns.len()).bold(),
        if patterns.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Delete one pattern after confirmation.
pub async fn delete_pattern(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let pattern_id = id
        .parse::<PatternId>()
        .map_err(|e| anyhow::anyhow!("invalid pattern id '{id}': {e}"))?;

    let pattern = state
        .automation_service
        .get_pattern(&pattern_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no pattern with id '{id}'"))?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete pattern {} ({} on {})?",
                style(short_id(&pattern.id)).red().bold(),
                pattern.message_type(),
                pattern.hostname(),
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.automation_service.delete_pattern(&pattern_id).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": id}));
    } else {
        println!();
        println!("  {} Pattern deleted.", style("✓").green().bold());
        println!();
    }

    Ok(())
}

fn short_id(id: &PatternId) -> String {
    let full = id.to_string();
    full[..8].to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...", &s[..max.saturating_sub(3)])
    } else {
        s.to_string()
    }
}

fn confidence_cell(confidence: f64) -> Cell {
    let value = format!("{confidence:.2}");
    if confidence >= 0.8 {
        Cell::new(value).fg(Color::Green)
    } else if confidence >= 0.5 {
        Cell::new(value).fg(Color::Yellow)
    } else {
        Cell::new(value).fg(Color::Red)
    }
}

fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
