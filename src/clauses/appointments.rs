// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    config::EngineConfig,
    grouping::{group_by_rank, Cohort},
    record::{CanonicalDataRecord, RoleEntry},
    resolver::{join_prose, resolve, Resolution},
};

use super::escape_text;

/// The primary appointment followed by one alternate clause per later cohort.
///
/// Each alternate clause names the previous cohort again, resolved afresh, so
/// institutional and unknown placeholders read the same wherever they appear.
pub fn render_appointments(
    entries: &[RoleEntry],
    role: &str,
    record: &CanonicalDataRecord,
    config: &EngineConfig,
) -> String {
    let cohorts = group_by_rank(entries, config);
    let mut text = String::new();
    let mut previous: Option<&Cohort> = None;

    for cohort in &cohorts {
        let appointees = resolve_cohort(cohort, record, config);
        let described: Vec<String> = appointees
            .iter()
            .map(|appointee| escape_text(&appointee.describe()))
            .collect();
        let described = join_prose(&described, "and");

        let clause = match previous {
            None if appointees.len() == 1 => format!("<p>I appoint {} as my {}.</p>", described, role),
            None => format!("<p>I appoint {} as the JOINT {}(s).</p>", described, role),
            Some(previous) => {
                let names: Vec<String> = resolve_cohort(previous, record, config)
                    .iter()
                    .map(|resolution| escape_text(resolution.display_name()))
                    .collect();
                format!(
                    "<p>If {} cannot act, then I appoint {} to be the alternate {}(s).</p>",
                    join_prose(&names, "and"),
                    described,
                    role
                )
            }
        };
        text.push_str(&clause);
        previous = Some(cohort);
    }
    text
}

fn resolve_cohort(cohort: &Cohort, record: &CanonicalDataRecord, config: &EngineConfig) -> Vec<Resolution> {
    cohort
        .references()
        .map(|reference| resolve(reference, record, config))
        .collect()
}
