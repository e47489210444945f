use chrono::{DateTime, Local, Utc};
use common::lookup::{Notice, Severity};
use console::style;

/// Fees-pending is amber; genuine failures are red.
pub fn notice(notice: &Notice) {
    match notice.severity {
        Severity::Warning => eprintln!("{}", style(&notice.message).yellow().bold()),
        Severity::Error => eprintln!("{}", style(&notice.message).red().bold()),
    }
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn heading(text: &str) {
    println!("{}", style(text).bold().underlined());
}

pub fn dim(text: &str) -> String {
    style(text).dim().to_string()
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Cut `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
