// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Person resolution against the record's people pools.
//!
//! The pools are tried in a fixed order (spouse, then kids, then other
//! relatives) so that a name shared by two people always resolves to the
//! closer relationship.


use crate::{
    config::EngineConfig,
    record::{Address, CanonicalDataRecord, Person},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pool {
    Spouse,
    Kids,
    Relatives,
}

type PoolLookup = for<'r> fn(&'r CanonicalDataRecord, &str) -> Option<&'r Person>;

const POOLS: [(Pool, PoolLookup); 3] = [
    (Pool::Spouse, lookup_spouse),
    (Pool::Kids, lookup_kids),
    (Pool::Relatives, lookup_relatives),
];

fn lookup_spouse<'r>(record: &'r CanonicalDataRecord, reference: &str) -> Option<&'r Person> {
    record.spouse_info.as_ref().filter(|spouse| spouse.matches(reference))
}

fn lookup_kids<'r>(record: &'r CanonicalDataRecord, reference: &str) -> Option<&'r Person> {
    record.kids.iter().find(|kid| kid.matches(reference))
}

fn lookup_relatives<'r>(record: &'r CanonicalDataRecord, reference: &str) -> Option<&'r Person> {
    record.relatives.iter().find(|relative| relative.matches(reference))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPerson {
    pub pool: Pool,
    pub name: String,
    pub relationship: String,
    pub address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Person(ResolvedPerson),
    Institutional { label: String },
    Unknown { reference: String, label: String },
}

impl Resolution {
    pub fn display_name(&self) -> &str {
        match self {
            Resolution::Person(person) => &person.name,
            Resolution::Institutional { label } => label,
            Resolution::Unknown { label, .. } => label,
        }
    }

    /// Name followed by the address, e.g. "Jane Doe, of Toronto, Ontario, Canada".
    pub fn describe(&self) -> String {
        match self {
            Resolution::Person(person) => {
                let address = format_address(&person.address);
                if address.is_empty() {
                    person.name.clone()
                } else {
                    format!("{}, of {}", person.name, address)
                }
            }
            Resolution::Institutional { label } => label.clone(),
            Resolution::Unknown { label, .. } => label.clone(),
        }
    }

    pub fn relationship(&self) -> &str {
        match self {
            Resolution::Person(person) => &person.relationship,
            Resolution::Institutional { .. } | Resolution::Unknown { .. } => "",
        }
    }

    pub fn address(&self) -> String {
        match self {
            Resolution::Person(person) => format_address(&person.address),
            Resolution::Institutional { .. } | Resolution::Unknown { .. } => String::new(),
        }
    }

    pub fn is_institutional(&self) -> bool {
        matches!(self, Resolution::Institutional { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown { .. })
    }
}

pub fn institutional_label(config: &EngineConfig) -> String {
    format!("the managing professional of {}", config.institution_name)
}

/// The first pool entry matching `reference`, trying the pools in priority order.
pub fn find_person<'r>(reference: &str, record: &'r CanonicalDataRecord) -> Option<(Pool, &'r Person)> {
    POOLS
        .iter()
        .find_map(|(pool, lookup)| lookup(record, reference.trim()).map(|person| (*pool, person)))
}

pub fn resolve(reference: &str, record: &CanonicalDataRecord, config: &EngineConfig) -> Resolution {
    if config.is_sentinel(reference) {
        return Resolution::Institutional {
            label: institutional_label(config),
        };
    }

    match find_person(reference, record) {
        Some((pool, person)) => Resolution::Person(ResolvedPerson {
            pool,
            name: person.full_name(),
            relationship: person.relationship.clone(),
            address: person.address.clone(),
        }),
        None => {
            tracing::warn!(reference, "person reference matches no pool");
            Resolution::Unknown {
                reference: reference.to_string(),
                label: config.unknown_label.clone(),
            }
        }
    }
}

/// Joins the non-empty parts of an address with ", ".
pub fn format_address(address: &Address) -> String {
    join_address_parts([address.city.as_str(), address.province.as_str(), address.country.as_str()])
}

pub fn join_address_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Joins names as prose: "A", "A and B", "A, B and C".
pub fn join_prose(names: &[String], conjunction: &str) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), conjunction, last),
    }
}
