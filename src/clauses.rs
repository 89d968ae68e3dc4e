// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Renderers for clauses whose shape does not fit plain conditionals and
//! loops: bequest lists, residue and wipeout distributions, appointment
//! chains, trust schedules and pet provisions.
//!
//! Each renderer reads typed record data, resolves every person reference
//! through the resolver and returns finished markup. None of them fail: a
//! reference that resolves nowhere renders as the unknown placeholder.
//! Record text is passed through [`escape_text`] before it is spliced in.

mod appointments;
mod bequests;
mod distribution;
mod provisions;

#[cfg(test)]
mod tests;

pub use appointments::render_appointments;
pub use bequests::render_bequests;
pub use distribution::render_distribution;
pub use provisions::{render_pets, render_trust_schedule};

// Trims an optional free-text field, treating blank as absent.
fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

/// Escapes record text for the document: markup-significant characters
/// become entities and a `${{` opener loses its `$`.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '$' if text[index + 1..].starts_with("{{") => escaped.push_str("&#36;"),
            c => escaped.push(c),
        }
    }
    escaped
}
