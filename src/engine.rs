// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! The entry point hosts call: pick the template tree for a jurisdiction and
//! document type, then render a record through it.


use std::path::PathBuf;

use thiserror::Error;

use crate::{
    composer::{lint, render_with_report, LintIssue, RenderedDocument},
    config::EngineConfig,
    library::{DirectorySource, LoadError, TemplateLibrary, TemplateSource},
    mapper::{map_to_canonical_record_with, MapError, RawPerson, RawWillRecord},
    record::CanonicalDataRecord,
    template::DocumentType,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no {document_type} template is available for jurisdiction '{jurisdiction}'")]
    NoTemplate {
        jurisdiction: String,
        document_type: DocumentType,
    },
    #[error(transparent)]
    Map(#[from] MapError),
}

pub struct DocumentEngine {
    library: TemplateLibrary,
    config: EngineConfig,
}

impl DocumentEngine {
    pub fn new(source: impl TemplateSource + 'static, config: EngineConfig) -> DocumentEngine {
        DocumentEngine {
            library: TemplateLibrary::new(source, &config.default_jurisdiction),
            config,
        }
    }

    /// Engine over a `<root>/<slug>/<document_type>.yaml` template tree.
    pub fn from_directory(root: impl Into<PathBuf>, config: EngineConfig) -> DocumentEngine {
        DocumentEngine::new(DirectorySource::new(root), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn render(
        &self,
        jurisdiction: &str,
        document_type: DocumentType,
        record: &CanonicalDataRecord,
    ) -> Result<RenderedDocument, EngineError> {
        let selection = self.library.resolve(jurisdiction, document_type);
        if !selection.is_available() {
            return Err(EngineError::NoTemplate {
                jurisdiction: jurisdiction.to_string(),
                document_type,
            });
        }
        Ok(render_with_report(&selection.nodes, record, &self.config))
    }

    /// Maps a stored record and its people first, then renders.
    pub fn render_raw(
        &self,
        jurisdiction: &str,
        document_type: DocumentType,
        raw: &RawWillRecord,
        people: &[RawPerson],
    ) -> Result<RenderedDocument, EngineError> {
        let record = map_to_canonical_record_with(raw, people, document_type, &self.config)?;
        self.render(jurisdiction, document_type, &record)
    }
}

/// Lints every module under a template directory.
pub fn lint_directory(root: impl Into<PathBuf>) -> Result<Vec<(String, DocumentType, Vec<LintIssue>)>, LoadError> {
    let source = DirectorySource::new(root);
    let mut reports = Vec::new();
    for (slug, document_type) in source.modules()? {
        let nodes = source.load(&slug, document_type)?.unwrap_or_default();
        reports.push((slug, document_type, lint(&nodes)));
    }
    Ok(reports)
}
