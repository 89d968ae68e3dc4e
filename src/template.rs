// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A unit of document structure. Children render after the node's own text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateNode {
    pub id: String,
    pub order: i64,
    pub title_template: Option<String>,
    pub body_template: Option<String>,
    pub fallback_text: String,
    /// Record paths the templates read. Checked by lint, ignored by rendering.
    pub depends_on: Vec<String>,
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn count(nodes: &[TemplateNode]) -> usize {
        nodes.iter().map(|node| 1 + TemplateNode::count(&node.children)).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum DocumentType {
    PrimaryWill,
    SecondaryWill,
    PoaProperty,
    PoaHealth,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::PrimaryWill,
        DocumentType::SecondaryWill,
        DocumentType::PoaProperty,
        DocumentType::PoaHealth,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            DocumentType::PrimaryWill => "primary_will",
            DocumentType::SecondaryWill => "secondary_will",
            DocumentType::PoaProperty => "poa_property",
            DocumentType::PoaHealth => "poa_health",
        }
    }

    pub fn is_will(&self) -> bool {
        matches!(self, DocumentType::PrimaryWill | DocumentType::SecondaryWill)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document type '{0}'")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        DocumentType::ALL
            .into_iter()
            .find(|document_type| document_type.tag() == tag)
            .ok_or_else(|| UnknownDocumentType(s.to_string()))
    }
}
