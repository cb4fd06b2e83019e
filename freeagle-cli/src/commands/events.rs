use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &App, category: Option<&str>) -> Result<()> {
    let mut events = app
        .gateway
        .list_events()
        .await
        .context("Failed to fetch events")?;

    if let Some(category) = category {
        events.retain(|e| e.category.eq_ignore_ascii_case(category));
    }
    events.sort_by(|a, b| a.start_local.cmp(&b.start_local));

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for event in &events {
        let star = if app.favorites.is_favorite(&event.id) {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {} {}", star, event.render(), event.id.dimmed());
    }

    Ok(())
}
