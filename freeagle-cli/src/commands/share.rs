use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::app::App;

pub async fn run(app: &App, event_id: &str) -> Result<()> {
    let username = app.username()?;

    let event = app
        .gateway
        .list_events()
        .await
        .context("Failed to fetch events")?
        .into_iter()
        .find(|e| e.id == event_id)
        .ok_or_else(|| anyhow::anyhow!("Event '{}' not found", event_id))?;

    let outcome = app.engine.share(&event, &username).await?;

    if outcome.already_shared {
        println!("Already shared {} as {}", event.title, outcome.code.bold());
        return Ok(());
    }

    println!("Invite code for {}: {}", event.title, outcome.code.bold());

    if let Some(warning) = &outcome.persist_warning {
        eprintln!("{}", format!("Warning: not saved yet ({})", warning).yellow());
    }

    // The process would exit before a background publish finishes, so wait here
    if let Some(publish) = outcome.publish {
        match publish.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!(
                "{}",
                format!("Warning: invite kept locally but not published: {}", e).yellow()
            ),
            Err(e) => eprintln!("{}", format!("Warning: publish task failed: {}", e).yellow()),
        }
    }

    Ok(())
}
