// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Groups ranked role-holders (executors, guardians, attorneys) into cohorts:
//! the primary appointment first, then each tier of alternates.


use std::collections::BTreeMap;

use crate::{config::EngineConfig, record::RoleEntry};

/// Role-holders sharing one appointment rank, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cohort {
    pub rank: u32,
    pub members: Vec<RoleEntry>,
}

impl Cohort {
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|member| member.who.as_str())
    }
}

/// Cohorts in strictly ascending rank order. An empty list yields a single
/// cohort appointing the institutional placeholder, so a document never
/// lacks an appointee.
pub fn group_by_rank(entries: &[RoleEntry], config: &EngineConfig) -> Vec<Cohort> {
    if entries.is_empty() {
        return vec![Cohort {
            rank: 1,
            members: vec![RoleEntry {
                who: config.institutional_sentinel.clone(),
                rank: 1,
            }],
        }];
    }

    let mut by_rank: BTreeMap<u32, Vec<RoleEntry>> = BTreeMap::new();
    for entry in entries {
        by_rank.entry(entry.rank).or_default().push(entry.clone());
    }

    by_rank
        .into_iter()
        .map(|(rank, members)| Cohort { rank, members })
        .collect()
}
