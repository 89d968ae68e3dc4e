// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    config::EngineConfig,
    record::{BeneficiaryKind, Bequest, CanonicalDataRecord},
    resolver::resolve,
};

use super::{escape_text, non_blank};

/// One `<li>` fragment per bequest, in declared order.
pub fn render_bequests(bequests: &[Bequest], record: &CanonicalDataRecord, config: &EngineConfig) -> Vec<String> {
    bequests
        .iter()
        .map(|bequest| render_bequest(bequest, record, config))
        .collect()
}

fn render_bequest(bequest: &Bequest, record: &CanonicalDataRecord, config: &EngineConfig) -> String {
    let gift = gift_phrase(&bequest.share, &bequest.item);

    let mut text = match bequest.kind {
        BeneficiaryKind::Person => {
            let beneficiary = resolve(&bequest.beneficiary, record, config);
            let mut text = format!("<li>I give {} to {}", gift, escape_text(&beneficiary.describe()));
            if let Some(backup) = config.backup(bequest.backup.as_deref()) {
                text.push_str(&format!(
                    ", but if {} does not survive me, I give this gift to {}",
                    escape_text(beneficiary.display_name()),
                    describe_backup(backup, bequest, record, config)
                ));
            }
            text
        }
        BeneficiaryKind::Organization => {
            let organization = escape_text(bequest.beneficiary.trim());
            let mut text = format!("<li>Organization: I give {} to {}", gift, organization);
            if let Some(backup) = config.backup(bequest.backup.as_deref()) {
                text.push_str(&format!(
                    ", but if {} is not in existence at my death, I give this gift to {}",
                    organization,
                    describe_backup(backup, bequest, record, config)
                ));
            }
            text
        }
    };

    if let Some(conditions) = non_blank(bequest.conditions.as_deref()) {
        text.push_str(", subject to the following condition: ");
        text.push_str(&escape_text(conditions));
    }
    text.push_str(".</li>");
    text
}

// Organizations are not in any person pool, so an organization backup is named verbatim.
fn describe_backup(backup: &str, bequest: &Bequest, record: &CanonicalDataRecord, config: &EngineConfig) -> String {
    match non_blank(bequest.backup_relationship.as_deref()) {
        Some(qualifier) if qualifier.eq_ignore_ascii_case("organization") => escape_text(backup.trim()),
        Some(qualifier) => escape_text(&format!("{}, my {}", resolve(backup, record, config).describe(), qualifier)),
        None => escape_text(&resolve(backup, record, config).describe()),
    }
}

fn gift_phrase(share: &str, item: &str) -> String {
    match (share.trim(), item.trim()) {
        ("", "") => "the gift set out in my instructions".to_string(),
        (share, "") => escape_text(share),
        ("", item) => escape_text(item),
        (share, item) => format!("{} of {}", escape_text(share), escape_text(item)),
    }
}
