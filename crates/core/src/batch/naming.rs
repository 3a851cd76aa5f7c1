//! Archive entry naming.
//!
//! Names are derived once, before any wave runs, so they are stable no
//! matter in which order tickets finish.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashSet;

use crate::render::TicketDescriptor;

/// Longest sanitized display name, in characters.
pub const MAX_NAME_CHARS: usize = 30;

// Keeps ASCII word characters and Latin letters with diacritics.
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\x{00C0}-\x{024F}\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Makes a display name safe for use as a file name.
pub fn sanitize_display_name(name: &str) -> String {
    let replaced = DISALLOWED.replace_all(name.trim(), "_");
    let collapsed = WHITESPACE.replace_all(&replaced, "_");
    collapsed.chars().take(MAX_NAME_CHARS).collect()
}

/// Name of the error record written for a failed ticket.
pub fn error_entry_name(sequence_number: u64) -> String {
    format!("error_{}.txt", sequence_number)
}

/// Body of the error record written for a failed ticket.
pub fn error_record(sequence_number: u64, payload: &str, error: &str) -> String {
    format!(
        "Ticket {} failed:\nQR: {}\nError: {}",
        sequence_number, payload, error
    )
}

fn stem(ticket: &TicketDescriptor) -> String {
    let seq = ticket.sequence_number;
    let non_empty = |s: String| (!s.is_empty()).then_some(s);

    if let Some(name) = ticket
        .display_name
        .as_deref()
        .map(sanitize_display_name)
        .and_then(non_empty)
    {
        return format!("{}_{}", name, seq);
    }

    match ticket
        .zone
        .as_deref()
        .map(sanitize_display_name)
        .and_then(non_empty)
    {
        Some(zone) => format!("ticket_{}_{}", zone, seq),
        None => format!("ticket_{}", seq),
    }
}

/// Unique image and error-record names for every ticket of a batch.
#[derive(Debug, Clone)]
pub struct EntryNames {
    images: Vec<String>,
    errors: Vec<String>,
}

impl EntryNames {
    /// Assigns names in input order. A name already taken gets a `_2`, `_3`,
    /// ... suffix before its extension.
    pub fn assign(tickets: &[TicketDescriptor], extension: &str) -> Self {
        let mut used = HashSet::with_capacity(tickets.len() * 2);
        let mut images = Vec::with_capacity(tickets.len());
        let mut errors = Vec::with_capacity(tickets.len());

        for ticket in tickets {
            images.push(reserve(&mut used, &stem(ticket), extension));
            errors.push(reserve(
                &mut used,
                &format!("error_{}", ticket.sequence_number),
                "txt",
            ));
        }

        Self { images, errors }
    }

    pub fn image(&self, index: usize) -> &str {
        &self.images[index]
    }

    pub fn error(&self, index: usize) -> &str {
        &self.errors[index]
    }
}

fn reserve(used: &mut HashSet<String>, stem: &str, extension: &str) -> String {
    let mut name = format!("{}.{}", stem, extension);
    let mut suffix = 2;
    while used.contains(&name) {
        name = format!("{}_{}.{}", stem, suffix, extension);
        suffix += 1;
    }
    used.insert(name.clone());
    name
}

/// Truncates to `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
