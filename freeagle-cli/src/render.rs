//! Terminal rendering for core types.

use freeagle_core::Event;
use freeagle_core::reconcile::InviteState;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for InviteState {
    fn render(&self) -> String {
        match self {
            InviteState::Pending => "pending".yellow().to_string(),
            InviteState::Accepted => "joined".green().to_string(),
            InviteState::Declined => "declined".red().to_string(),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let when = self.start_local.format("%a %b %-d, %H:%M").to_string();
        let tag = format!("[{}]", self.category);
        format!("{} {} {}", when.bold(), self.title, tag.dimmed())
    }
}

/// Multi-line detail view of a single event.
pub fn render_details(event: &Event) -> Vec<String> {
    let mut lines = vec![event.render()];

    let address = event.address().to_string();
    if !address.is_empty() {
        lines.push(format!("  {}", address));
    }
    lines.push(format!(
        "  {}",
        format!(
            "until {} · {:.5}, {:.5}",
            event.end_local.format("%a %b %-d, %H:%M"),
            event.location.latitude,
            event.location.longitude
        )
        .dimmed()
    ));
    if !event.description.is_empty() {
        lines.push(format!("  {}", event.description));
    }
    if let Some(users) = &event.users {
        let going: Vec<&str> = users
            .iter()
            .filter(|u| u.participate)
            .map(|u| u.username.as_str())
            .collect();
        if !going.is_empty() {
            lines.push(format!("  Going: {}", going.join(", ")));
        }
    }

    lines
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
