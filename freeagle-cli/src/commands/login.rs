use anyhow::Result;
use freeagle_core::identity::ClaimOutcome;
use owo_colors::OwoColorize;

use crate::app::App;

pub async fn run(app: &App, username: &str) -> Result<()> {
    match app.identity.claim(app.gateway.as_ref(), username).await? {
        ClaimOutcome::Claimed => {
            println!("{}", format!("Logged in as {}", username.trim()).green());
        }
        ClaimOutcome::AlreadyTaken => {
            anyhow::bail!("Username '{}' is already taken", username.trim());
        }
    }
    Ok(())
}
