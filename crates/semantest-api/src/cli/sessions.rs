//! Training session history command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Show recent training sessions, newest first.
pub async fn sessions(state: &AppState, limit: i64, json: bool) -> Result<()> {
    let sessions = state.automation_service.recent_sessions(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No training sessions recorded yet.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Website").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Ended").fg(Color::White),
        Cell::new("Reason").fg(Color::White),
        Cell::new("Learned").fg(Color::White),
    ]);

    for session in &sessions {
        let ended_cell = match &session.ended_at {
            Some(dt) => Cell::new(format_relative_time(dt)).fg(Color::DarkGrey),
            None => Cell::new("active").fg(Color::Green),
        };
        let reason = match &session.end_reason {
            Some(r) => r.to_string(),
            None => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(&session.website).fg(Color::Cyan),
            Cell::new(format_relative_time(&session.started_at)).fg(Color::DarkGrey),
            ended_cell,
            Cell::new(reason),
            Cell::new(session.patterns_learned.to_string()),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
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
