// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Builds the canonical record from a stored will or power-of-attorney record
//! and the client's list of people.
//!
//! People are sorted into the spouse, kids and relatives pools by their
//! relationship. Ranks arrive as numbers or numeric strings, backups use a
//! handful of "none" spellings, and each document type keeps only the fields
//! it uses. References that match nobody are logged and left in place; the
//! resolver renders them as the unknown placeholder.


use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    config::EngineConfig,
    record::{
        ActivationType, BeneficiaryKind, Bequest, CanonicalDataRecord, Distribution, HealthDirectives, Person,
        Personal, PetProvision, RoleEntry, ShareEntry, TrustStage,
    },
    resolver::find_person,
    template::DocumentType,
};

/// Stored people already carry the canonical person shape.
pub type RawPerson = Person;

/// A will or power-of-attorney record as the storage layer holds it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawWillRecord {
    pub personal: Personal,
    /// Role name (executors, guardians, attorneys, ...) to ranked appointees.
    pub roles: BTreeMap<String, Vec<RawRoleEntry>>,
    pub bequests: Vec<Bequest>,
    pub residue: Option<Distribution>,
    pub wipeout: Option<Distribution>,
    pub trusting: Option<Vec<TrustStage>>,
    pub pets: Vec<PetProvision>,
    pub restrictions: Option<String>,
    pub activation_type: Option<ActivationType>,
    pub health_directives: Option<HealthDirectives>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawRoleEntry {
    pub who: String,
    pub rank: RawRank,
}

/// Ranks are stored as numbers by some writers and as strings by others.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRank {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl RawRank {
    fn parse(&self) -> Option<u32> {
        match self {
            RawRank::Integer(rank) => u32::try_from(*rank).ok(),
            RawRank::Real(rank) if rank.fract() == 0.0 && *rank >= 0.0 && *rank <= f64::from(u32::MAX) => {
                Some(*rank as u32)
            }
            RawRank::Real(_) => None,
            RawRank::Text(rank) => rank.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for RawRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawRank::Integer(rank) => write!(f, "{}", rank),
            RawRank::Real(rank) => write!(f, "{}", rank),
            RawRank::Text(rank) => write!(f, "{:?}", rank),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("{role} entry for '{who}' has invalid rank {rank}")]
    InvalidRank { role: String, who: String, rank: String },
}

// Roles that only appear in one family of documents.
const WILL_ROLES: [&str; 4] = ["executors", "guardians", "trustees", "pet_guardians"];
const POA_ROLES: [&str; 3] = ["attorneys", "substitute_attorneys", "health_attorneys"];

pub fn map_to_canonical_record(
    raw: &RawWillRecord,
    people: &[RawPerson],
    document_type: DocumentType,
) -> Result<CanonicalDataRecord, MapError> {
    map_to_canonical_record_with(raw, people, document_type, &EngineConfig::default())
}

pub fn map_to_canonical_record_with(
    raw: &RawWillRecord,
    people: &[RawPerson],
    document_type: DocumentType,
    config: &EngineConfig,
) -> Result<CanonicalDataRecord, MapError> {
    let mut record = CanonicalDataRecord {
        personal: raw.personal.clone(),
        ..CanonicalDataRecord::default()
    };
    partition_people(people, &mut record);

    for (role, entries) in &raw.roles {
        let keep = if document_type.is_will() {
            !POA_ROLES.contains(&role.as_str())
        } else {
            !WILL_ROLES.contains(&role.as_str())
        };
        if !keep {
            continue;
        }
        record.role_lists.insert(role.clone(), map_role_entries(role, entries)?);
    }

    if document_type.is_will() {
        record.bequests = raw
            .bequests
            .iter()
            .map(|bequest| normalize_bequest(bequest, config))
            .collect();
        record.residue_info = raw.residue.as_ref().map(|distribution| normalize_distribution(distribution, config));
        record.wipeout_info = raw.wipeout.as_ref().map(|distribution| normalize_distribution(distribution, config));
        record.trusting = raw.trusting.clone();
        record.pets = raw.pets.iter().map(|pet| normalize_pet(pet, config)).collect();
    } else {
        record.restrictions = non_blank(raw.restrictions.as_ref(), config);
        record.activation_type = raw.activation_type;
        if document_type == DocumentType::PoaHealth {
            record.health_directives = raw.health_directives.clone();
        }
    }

    warn_unresolved(&record, config);
    Ok(record)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Relationship {
    Spouse,
    Child,
    Other,
}

fn classify(relationship: &str) -> Relationship {
    let relationship = relationship.trim().to_lowercase().replace([' ', '_'], "-");
    match relationship.as_str() {
        "spouse" | "partner" | "common-law" | "common-law-partner" => Relationship::Spouse,
        "child" | "son" | "daughter" | "stepchild" | "step-child" | "stepson" | "stepdaughter" => Relationship::Child,
        _ => Relationship::Other,
    }
}

fn partition_people(people: &[RawPerson], record: &mut CanonicalDataRecord) {
    for person in people {
        match classify(&person.relationship) {
            Relationship::Spouse if record.spouse_info.is_none() => record.spouse_info = Some(person.clone()),
            Relationship::Spouse => {
                tracing::warn!(person = %person.full_name(), "more than one spouse; extra spouse kept as a relative");
                record.relatives.push(person.clone());
            }
            Relationship::Child => record.kids.push(person.clone()),
            Relationship::Other => record.relatives.push(person.clone()),
        }
    }
}

fn map_role_entries(role: &str, entries: &[RawRoleEntry]) -> Result<Vec<RoleEntry>, MapError> {
    entries
        .iter()
        .map(|entry| {
            let rank = entry.rank.parse().ok_or_else(|| MapError::InvalidRank {
                role: role.to_string(),
                who: entry.who.clone(),
                rank: entry.rank.to_string(),
            })?;
            Ok(RoleEntry {
                who: entry.who.trim().to_string(),
                rank,
            })
        })
        .collect()
}

// Blank and "none"-style values become None.
fn non_blank(value: Option<&String>, config: &EngineConfig) -> Option<String> {
    value
        .filter(|value| !config.is_none_token(value))
        .map(|value| value.trim().to_string())
}

fn normalize_bequest(bequest: &Bequest, config: &EngineConfig) -> Bequest {
    Bequest {
        backup: non_blank(bequest.backup.as_ref(), config),
        backup_relationship: non_blank(bequest.backup_relationship.as_ref(), config),
        conditions: non_blank(bequest.conditions.as_ref(), config),
        ..bequest.clone()
    }
}

fn normalize_distribution(distribution: &Distribution, config: &EngineConfig) -> Distribution {
    match distribution {
        Distribution::Beneficiaries(entries) => Distribution::Beneficiaries(
            entries
                .iter()
                .map(|entry| ShareEntry {
                    backup: non_blank(entry.backup.as_ref(), config),
                    ..entry.clone()
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn normalize_pet(pet: &PetProvision, config: &EngineConfig) -> PetProvision {
    PetProvision {
        backup: non_blank(pet.backup.as_ref(), config),
        fund_amount: non_blank(pet.fund_amount.as_ref(), config),
        ..pet.clone()
    }
}

fn warn_unresolved(record: &CanonicalDataRecord, config: &EngineConfig) {
    let mut references: Vec<(&str, &str)> = Vec::new();
    for (role, entries) in &record.role_lists {
        references.extend(entries.iter().map(|entry| (role.as_str(), entry.who.as_str())));
    }
    for bequest in &record.bequests {
        if bequest.kind == BeneficiaryKind::Person {
            references.push(("bequest", bequest.beneficiary.as_str()));
        }
        if let Some(backup) = &bequest.backup {
            let is_organization = bequest
                .backup_relationship
                .as_deref()
                .is_some_and(|qualifier| qualifier.eq_ignore_ascii_case("organization"));
            if !is_organization {
                references.push(("bequest backup", backup.as_str()));
            }
        }
    }
    for distribution in [&record.residue_info, &record.wipeout_info].into_iter().flatten() {
        if let Distribution::Beneficiaries(entries) = distribution {
            for entry in entries {
                references.push(("distribution", entry.who.as_str()));
                references.extend(entry.backup.as_deref().map(|backup| ("distribution backup", backup)));
            }
        }
    }
    for pet in &record.pets {
        references.push(("pet caretaker", pet.caretaker.as_str()));
        references.extend(pet.backup.as_deref().map(|backup| ("pet backup", backup)));
    }

    for (context, reference) in references {
        if !config.is_sentinel(reference) && find_person(reference, record).is_none() {
            tracing::warn!(context, reference, "reference does not match any person");
        }
    }
}
