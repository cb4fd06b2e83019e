//! Answering invites: open, accept, decline, leave.

use anyhow::Result;
use freeagle_core::InviteCode;
use freeagle_core::reconcile::Reconciliation;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, render_details};

pub async fn open(app: &App, code: &InviteCode) -> Result<()> {
    let invite = app.engine.open(code).await?;

    println!("{} invited you to:", invite.inviter.bold());
    for line in render_details(&invite.event) {
        println!("{}", line);
    }
    println!();
    println!("Status: {}", app.engine.status(code).render());

    Ok(())
}

pub async fn respond(app: &App, code: &InviteCode, accept: bool) -> Result<()> {
    let username = app.username()?;
    let invite = app.engine.open(code).await?;

    let result = app
        .engine
        .respond(code, &username, accept, &invite.event)
        .await?;

    report(&invite.event.title, &result);
    Ok(())
}

/// Decline an invite that was accepted before, using the locally stored event.
pub async fn leave(app: &App, code: &InviteCode) -> Result<()> {
    let username = app.username()?;

    let Some(event) = app.engine.memberships().get(code) else {
        anyhow::bail!("You haven't joined '{}'", code);
    };

    let result = app.engine.respond(code, &username, false, &event).await?;
    report(&event.title, &result);
    Ok(())
}

fn report(title: &str, result: &Reconciliation) {
    let verb = if result.changed { "Now" } else { "Already" };
    println!("{} {}: {}", verb, result.state.render(), title);

    if let Some(warning) = &result.persist_warning {
        eprintln!(
            "{}",
            format!("Warning: change not saved yet ({})", warning).yellow()
        );
    }
}
