// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    config::EngineConfig,
    record::{CanonicalDataRecord, Distribution, DistributionPattern, ShareEntry},
    resolver::{format_address, resolve},
};

use super::escape_text;

/// Residue or wipeout wording, starting with "to ..." so templates can
/// write "I give the residue of my estate ${{ distribution(.residue_info) }}."
pub fn render_distribution(distribution: &Distribution, record: &CanonicalDataRecord, config: &EngineConfig) -> String {
    match distribution {
        Distribution::Beneficiaries(entries) if entries.is_empty() => heirs_at_law(record),
        Distribution::Beneficiaries(entries) => render_beneficiaries(entries, record, config),
        Distribution::Pattern(pattern) => render_pattern(*pattern, record),
        Distribution::Custom(text) => match text.trim() {
            "" => heirs_at_law(record),
            text => escape_text(text),
        },
    }
}

fn render_beneficiaries(entries: &[ShareEntry], record: &CanonicalDataRecord, config: &EngineConfig) -> String {
    let mut text = String::from("to the following beneficiaries in the following shares:<ul>");
    for entry in entries {
        let beneficiary = resolve(&entry.who, record, config);
        let share = match entry.share.trim() {
            "" => "an equal share".to_string(),
            share => escape_text(share),
        };
        text.push_str(&format!("<li>{} to {}", share, escape_text(&beneficiary.describe())));
        if let Some(backup) = config.backup(entry.backup.as_deref()) {
            text.push_str(&format!(
                ", or if {} does not survive me, to {}",
                escape_text(beneficiary.display_name()),
                escape_text(&resolve(backup, record, config).describe())
            ));
        }
        text.push_str("</li>");
    }
    text.push_str("</ul>");
    text
}

fn render_pattern(pattern: DistributionPattern, record: &CanonicalDataRecord) -> String {
    match pattern {
        DistributionPattern::ChildrenPerStirpes => "to my children who survive me in equal shares, provided that if a child of mine dies before me leaving issue alive at my death, that issue shall take per stirpes the share their parent would have taken".to_string(),
        DistributionPattern::ChildrenPerCapita => "to my children who survive me in equal shares per capita".to_string(),
        DistributionPattern::SpouseThenChildren => match spouse(record) {
            Some(spouse) => format!(
                "to my spouse, {}, if my spouse survives me, and if my spouse does not survive me, to my children who survive me in equal shares per stirpes",
                spouse
            ),
            None => "to my children who survive me in equal shares per stirpes".to_string(),
        },
        DistributionPattern::HeirsAtLaw => heirs_at_law(record),
        DistributionPattern::SplitBetweenFamilies => match spouse(record) {
            Some(spouse) => format!(
                "as to one half to my heirs at law and as to one half to the heirs at law of my spouse, {}",
                spouse
            ),
            None => "as to one half to my heirs at law and as to one half to the heirs at law of my spouse".to_string(),
        },
    }
}

fn spouse(record: &CanonicalDataRecord) -> Option<String> {
    let spouse = record.spouse_info.as_ref()?;
    let name = spouse.full_name();
    if name.is_empty() {
        return None;
    }
    match format_address(&spouse.address) {
        address if address.is_empty() => Some(escape_text(&name)),
        address => Some(escape_text(&format!("{}, of {}", name, address))),
    }
}

fn heirs_at_law(record: &CanonicalDataRecord) -> String {
    match record.personal.address.province.trim() {
        "" => "to my heirs at law as determined under the laws of the jurisdiction in which I reside".to_string(),
        province => format!(
            "to my heirs at law as determined under the laws of the Province of {}",
            escape_text(province)
        ),
    }
}
