// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Selects the template tree for a (jurisdiction, document type) pair.
//!
//! Lookup tries the requested jurisdiction, then the default jurisdiction,
//! then gives up with an empty tree that callers must treat as "no template".
//! Loaded trees are cached per key and shared between renders.


use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use thiserror::Error;

use crate::template::{DocumentType, TemplateNode};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("malformed template file {path}: {source}")]
    Yaml { path: String, source: serde_yaml::Error },
}

/// Somewhere template trees can be loaded from, keyed by normalized jurisdiction slug.
pub trait TemplateSource: Send + Sync {
    /// `Ok(None)` when no module exists for the key.
    fn load(&self, slug: &str, document_type: DocumentType) -> Result<Option<Vec<TemplateNode>>, LoadError>;
}

/// Lowercases and joins words with '-': "British Columbia" and "british_columbia"
/// both become "british-columbia".
pub fn normalize_slug(jurisdiction: &str) -> String {
    let lower = jurisdiction.to_lowercase();
    let cleaned: String = lower
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Template files laid out as `<root>/<slug>/<document_type>.yaml`, each holding
/// a YAML list of nodes.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> DirectorySource {
        DirectorySource { root: root.into() }
    }

    pub fn path_for(&self, slug: &str, document_type: DocumentType) -> PathBuf {
        self.root.join(slug).join(format!("{}.yaml", document_type.tag()))
    }

    /// Every (slug, document type) pair with a template file, sorted.
    pub fn modules(&self) -> Result<Vec<(String, DocumentType)>, LoadError> {
        let mut modules = Vec::new();
        for dir in read_dir(&self.root)? {
            if !dir.is_dir() {
                continue;
            }
            let Some(slug) = dir.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            for file in read_dir(&dir)? {
                if file.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
                    continue;
                }
                let document_type = file
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse::<DocumentType>().ok());
                if let Some(document_type) = document_type {
                    modules.push((slug.to_string(), document_type));
                }
            }
        }
        modules.sort();
        Ok(modules)
    }
}

fn read_dir(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error)? {
        paths.push(entry.map_err(io_error)?.path());
    }
    Ok(paths)
}

impl TemplateSource for DirectorySource {
    fn load(&self, slug: &str, document_type: DocumentType) -> Result<Option<Vec<TemplateNode>>, LoadError> {
        let path = self.path_for(slug, document_type);
        let input = match fs::read_to_string(&path) {
            Ok(input) => input,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let nodes = serde_yaml::from_str(&input).map_err(|source| LoadError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(nodes))
    }
}

/// Template trees held in memory, for embedding hosts and tests.
#[derive(Default)]
pub struct MemorySource {
    modules: HashMap<(String, DocumentType), Vec<TemplateNode>>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn insert(&mut self, jurisdiction: &str, document_type: DocumentType, nodes: Vec<TemplateNode>) {
        self.modules.insert((normalize_slug(jurisdiction), document_type), nodes);
    }

    pub fn with(mut self, jurisdiction: &str, document_type: DocumentType, nodes: Vec<TemplateNode>) -> MemorySource {
        self.insert(jurisdiction, document_type, nodes);
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, slug: &str, document_type: DocumentType) -> Result<Option<Vec<TemplateNode>>, LoadError> {
        Ok(self.modules.get(&(slug.to_string(), document_type)).cloned())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSource {
    Requested,
    /// The default jurisdiction's module stood in for the requested one.
    Fallback,
    Unavailable,
}

#[derive(Clone, Debug)]
pub struct TemplateSelection {
    pub nodes: Arc<Vec<TemplateNode>>,
    pub source: SelectionSource,
}

impl TemplateSelection {
    pub fn is_available(&self) -> bool {
        self.source != SelectionSource::Unavailable
    }
}

type CacheKey = (String, DocumentType);

pub struct TemplateLibrary {
    source: Box<dyn TemplateSource>,
    default_slug: String,
    // An empty tree records a miss, so every key is loaded at most once.
    cache: RwLock<HashMap<CacheKey, Arc<Vec<TemplateNode>>>>,
}

impl TemplateLibrary {
    pub fn new(source: impl TemplateSource + 'static, default_jurisdiction: &str) -> TemplateLibrary {
        TemplateLibrary {
            source: Box::new(source),
            default_slug: normalize_slug(default_jurisdiction),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_slug(&self) -> &str {
        &self.default_slug
    }

    /// The template tree to render. Empty means no template is available.
    pub fn load_template(&self, jurisdiction: &str, document_type: DocumentType) -> Arc<Vec<TemplateNode>> {
        self.resolve(jurisdiction, document_type).nodes
    }

    pub fn resolve(&self, jurisdiction: &str, document_type: DocumentType) -> TemplateSelection {
        let slug = normalize_slug(jurisdiction);

        let nodes = self.module(&slug, document_type);
        if !nodes.is_empty() {
            return TemplateSelection {
                nodes,
                source: SelectionSource::Requested,
            };
        }

        if slug != self.default_slug {
            let nodes = self.module(&self.default_slug, document_type);
            if !nodes.is_empty() {
                tracing::info!(
                    jurisdiction,
                    fallback = %self.default_slug,
                    %document_type,
                    "no jurisdiction-specific template, using default jurisdiction"
                );
                return TemplateSelection {
                    nodes,
                    source: SelectionSource::Fallback,
                };
            }
        }

        tracing::warn!(jurisdiction, %document_type, "no template available");
        TemplateSelection {
            nodes: Arc::new(Vec::new()),
            source: SelectionSource::Unavailable,
        }
    }

    fn module(&self, slug: &str, document_type: DocumentType) -> Arc<Vec<TemplateNode>> {
        let key = (slug.to_string(), document_type);
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(nodes) = cache.get(&key) {
                return nodes.clone();
            }
        }

        let nodes = match self.source.load(slug, document_type) {
            Ok(nodes) => nodes.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(slug, %document_type, error = %err, "cannot load template module");
                Vec::new()
            }
        };

        // Another reader may have loaded the key meanwhile; the first write wins.
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(key).or_insert_with(|| Arc::new(nodes)).clone()
    }
}
