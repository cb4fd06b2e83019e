use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize};

pub fn run(app: &App) -> Result<()> {
    let events = app.engine.joined_events();

    if events.is_empty() {
        println!("{}", "You haven't joined any events yet".dimmed());
        return Ok(());
    }

    println!("{}", heading(events.len()).bold());
    for event in &events {
        let code = event
            .invite_code
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();
        println!("  {} {}", event.render(), code.dimmed());
    }

    Ok(())
}

fn heading(count: usize) -> String {
    format!("{} joined {}", count, pluralize("event", count))
}
