// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Jurisdiction-aware assembly of wills and powers of attorney.
//!
//! A [`DocumentEngine`] picks the template tree for a jurisdiction and
//! document type, then renders a [`CanonicalDataRecord`] through it. Template
//! strings mix prose with `${{ ... }}` directives; see [`parser`] and
//! [`interpreter`].

pub mod ast;
pub mod clauses;
pub mod composer;
pub mod config;
pub mod engine;
pub mod grouping;
pub mod interpreter;
pub mod library;
pub mod mapper;
pub mod parser;
pub mod record;
pub mod resolver;
pub mod template;
pub mod value;

pub use composer::{lint, render, render_with_report, LintIssue, NodeOutcome, NodeVisit, RenderedDocument};
pub use config::EngineConfig;
pub use engine::{lint_directory, DocumentEngine, EngineError};
pub use library::{DirectorySource, MemorySource, TemplateLibrary, TemplateSelection, TemplateSource};
pub use mapper::{map_to_canonical_record, MapError, RawPerson, RawWillRecord};
pub use record::CanonicalDataRecord;
pub use template::{DocumentType, TemplateNode};
