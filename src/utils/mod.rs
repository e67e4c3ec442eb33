//! Utility functions.
//!
//! Text escaping, placeholder substitution and duration formatting
//! shared by the pipeline stages and command handlers.

use chrono::{DateTime, Local};

use crate::telegram::message::Sender;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Apply auto-reply fillings to a selected response.
///
/// Fillings:
/// - `{name}` - Sender first name
/// - `{username}` - `@username`, falling back to the first name
/// - `{time}` / `{date}` - Current local time/date
///
/// Sender-supplied values are HTML-escaped before substitution so a
/// crafted first name cannot inject formatting into the reply.
pub fn apply_reply_fillings(template: &str, sender: &Sender, now: DateTime<Local>) -> String {
    let name = html_escape(&sender.first_name);
    let username = sender
        .username
        .as_deref()
        .map(|u| format!("@{}", html_escape(u)))
        .unwrap_or_else(|| name.clone());

    template
        .replace("{name}", &name)
        .replace("{username}", &username)
        .replace("{time}", &now.format("%H:%M:%S").to_string())
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
}

/// Apply welcome/goodbye fillings to a membership template.
///
/// Fillings: `{name}`, `{username}`, `{group}`, `{id}`.
pub fn apply_member_fillings(template: &str, member: &Sender, chat_title: &str) -> String {
    let name = html_escape(&member.first_name);
    let username = member
        .username
        .as_deref()
        .map(|u| format!("@{}", html_escape(u)))
        .unwrap_or_else(|| name.clone());

    template
        .replace("{name}", &name)
        .replace("{username}", &username)
        .replace("{group}", &html_escape(chat_title))
        .replace("{id}", &member.id.to_string())
}

/// Parse a human duration argument like `30s`, `10m`, `2h` or `1d`.
/// A bare number is taken as minutes.
pub fn parse_duration(s: &str) -> Option<std::time::Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (value, unit) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - 1], c.to_ascii_lowercase()),
        _ => (s, 'm'),
    };

    let n: u64 = value.parse().ok()?;
    let secs = match unit {
        's' => n,
        'm' => n * 60,
        'h' => n * 3600,
        'd' => n * 86400,
        _ => return None,
    };
    if secs == 0 {
        return None;
    }
    Some(std::time::Duration::from_secs(secs))
}

/// Format a duration in whole units for user-facing messages.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{} seconds", secs)
    } else if secs < 3600 {
        let mins = secs / 60;
        format!("{} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if secs < 86400 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
        }
    } else {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{} day{}", days, if days == 1 { "" } else { "s" })
        }
    }
}
