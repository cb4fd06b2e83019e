use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::pluralize;

pub fn toggle(app: &App, event_id: &str) -> Result<()> {
    if app.favorites.toggle(event_id)? {
        println!("{} {}", "★".yellow(), event_id);
    } else {
        println!("Removed {} from favorites", event_id);
    }
    Ok(())
}

pub fn list(app: &App, clear: bool) -> Result<()> {
    if clear {
        let count = app.favorites.count();
        app.favorites.clear()?;
        println!("Cleared {} {}", count, pluralize("favorite", count));
        return Ok(());
    }

    let favorites = app.favorites.all();
    if favorites.is_empty() {
        println!("{}", "No favorites yet".dimmed());
        return Ok(());
    }

    for id in favorites {
        println!("{} {}", "★".yellow(), id);
    }
    Ok(())
}
