// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! The canonical data record: the only data the rendering core reads.
//!
//! People live in three pools (`spouse_info`, `kids`, `relatives`). Every
//! other part of the record refers to them by key, never by value, so role
//! lists and bequests cannot form cycles with the pools.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalDataRecord {
    pub personal: Personal,
    pub spouse_info: Option<Person>,
    pub kids: Vec<Person>,
    pub relatives: Vec<Person>,
    pub role_lists: BTreeMap<String, Vec<RoleEntry>>,
    pub bequests: Vec<Bequest>,
    pub residue_info: Option<Distribution>,
    pub wipeout_info: Option<Distribution>,
    /// Staged distribution to minors. `None` means full distribution at the age of majority.
    pub trusting: Option<Vec<TrustStage>>,
    pub restrictions: Option<String>,
    pub activation_type: Option<ActivationType>,
    pub health_directives: Option<HealthDirectives>,
    pub pets: Vec<PetProvision>,
}

impl CanonicalDataRecord {
    pub fn role_list(&self, name: &str) -> &[RoleEntry] {
        self.role_lists.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub city: String,
    pub province: String,
    pub country: String,
}

/// The person the document is written for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personal {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(flatten)]
    pub address: Address,
}

impl Personal {
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.middle_name, &self.last_name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    /// Lookup key. Falls back to the full name when blank.
    pub id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub relationship: String,
    #[serde(flatten)]
    pub address: Address,
}

impl Person {
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.middle_name, &self.last_name)
    }

    pub fn matches(&self, reference: &str) -> bool {
        let reference = reference.trim();
        if reference.is_empty() {
            return false;
        }
        (!self.id.is_empty() && self.id == reference) || self.full_name() == reference
    }
}

fn join_name(first: &str, middle: &str, last: &str) -> String {
    [first, middle, last]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One appointment in a role list. Lower ranks are appointed first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub who: String,
    pub rank: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryKind {
    #[default]
    Person,
    Organization,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bequest {
    pub beneficiary: String,
    pub kind: BeneficiaryKind,
    pub share: String,
    pub item: String,
    pub backup: Option<String>,
    pub backup_relationship: Option<String>,
    pub conditions: Option<String>,
}

/// How the residue (or the wipeout, if everyone named fails) is distributed.
/// Exactly one selection mode applies.
///
/// On the wire this is a map with exactly one of `beneficiaries`, `pattern`
/// or `custom`, which reads the same from YAML and JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DistributionFields", into = "DistributionFields")]
pub enum Distribution {
    Beneficiaries(Vec<ShareEntry>),
    Pattern(DistributionPattern),
    Custom(String),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    beneficiaries: Option<Vec<ShareEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<DistributionPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom: Option<String>,
}

#[derive(Debug, Error)]
#[error("a distribution needs exactly one of `beneficiaries`, `pattern` or `custom`, found {found}")]
pub struct DistributionModeError {
    found: usize,
}

impl TryFrom<DistributionFields> for Distribution {
    type Error = DistributionModeError;

    fn try_from(fields: DistributionFields) -> Result<Self, Self::Error> {
        match fields {
            DistributionFields {
                beneficiaries: Some(entries),
                pattern: None,
                custom: None,
            } => Ok(Distribution::Beneficiaries(entries)),
            DistributionFields {
                beneficiaries: None,
                pattern: Some(pattern),
                custom: None,
            } => Ok(Distribution::Pattern(pattern)),
            DistributionFields {
                beneficiaries: None,
                pattern: None,
                custom: Some(text),
            } => Ok(Distribution::Custom(text)),
            fields => Err(DistributionModeError {
                found: usize::from(fields.beneficiaries.is_some())
                    + usize::from(fields.pattern.is_some())
                    + usize::from(fields.custom.is_some()),
            }),
        }
    }
}

impl From<Distribution> for DistributionFields {
    fn from(distribution: Distribution) -> Self {
        match distribution {
            Distribution::Beneficiaries(entries) => DistributionFields {
                beneficiaries: Some(entries),
                ..Default::default()
            },
            Distribution::Pattern(pattern) => DistributionFields {
                pattern: Some(pattern),
                ..Default::default()
            },
            Distribution::Custom(text) => DistributionFields {
                custom: Some(text),
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareEntry {
    pub who: String,
    pub share: String,
    pub backup: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionPattern {
    ChildrenPerStirpes,
    ChildrenPerCapita,
    SpouseThenChildren,
    HeirsAtLaw,
    SplitBetweenFamilies,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustStage {
    pub age: u32,
    pub share_percent: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    Immediate,
    OnIncapacity,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthDirectives {
    pub life_support: Option<String>,
    pub pain_management: Option<String>,
    pub organ_donation: Option<bool>,
    pub other_instructions: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetProvision {
    pub pet_name: String,
    pub caretaker: String,
    pub backup: Option<String>,
    pub fund_amount: Option<String>,
}
