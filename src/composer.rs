// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Walks a template tree and concatenates the rendered nodes into one document body.
//!
//! Siblings render in ascending `order` (ties keep declaration order). Each
//! node contributes its title and body, or its fallback text when the body is
//! missing, does not parse, or renders blank because of missing data. A
//! node's children always follow its own text.

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::{
    clauses::escape_text,
    config::EngineConfig,
    interpreter::{evaluate, RenderContext},
    parser::{ParseError, TemplateParser},
    record::CanonicalDataRecord,
    template::TemplateNode,
    value::Value,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeOutcome {
    Rendered,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeVisit {
    pub id: String,
    pub outcome: NodeOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    pub body: String,
    /// One entry per node, in document order.
    pub visits: Vec<NodeVisit>,
}

impl RenderedDocument {
    pub fn fallback_ids(&self) -> impl Iterator<Item = &str> {
        self.visits
            .iter()
            .filter(|visit| visit.outcome == NodeOutcome::Fallback)
            .map(|visit| visit.id.as_str())
    }
}

pub fn render(nodes: &[TemplateNode], record: &CanonicalDataRecord, config: &EngineConfig) -> String {
    render_with_report(nodes, record, config).body
}

pub fn render_with_report(nodes: &[TemplateNode], record: &CanonicalDataRecord, config: &EngineConfig) -> RenderedDocument {
    let ctx = match RenderContext::new(record, config) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!(error = %err, "record cannot be read by templates; every node renders its fallback");
            RenderContext {
                record,
                config,
                root: Value::Null,
            }
        }
    };

    let mut run = ComposerRun {
        parser: TemplateParser::new(),
        ctx,
        document: RenderedDocument::default(),
    };
    run.render_nodes(nodes);
    run.document
}

struct ComposerRun<'a> {
    parser: TemplateParser,
    ctx: RenderContext<'a>,
    document: RenderedDocument,
}

impl ComposerRun<'_> {
    fn render_nodes(&mut self, nodes: &[TemplateNode]) {
        for node in sorted(nodes) {
            self.render_node(node);
        }
    }

    fn render_node(&mut self, node: &TemplateNode) {
        if let Some(title) = &node.title_template {
            match self.parser.parse(title) {
                Ok(template) => {
                    let title = evaluate(&template, &self.ctx);
                    self.document.body.push_str(&title.text);
                }
                Err(err) => tracing::warn!(node = %node.id, error = %err, "title template does not parse"),
            }
        }

        let outcome = match self.render_body(node) {
            Some(body) => {
                self.document.body.push_str(&body);
                NodeOutcome::Rendered
            }
            None => {
                self.push_fallback(node);
                NodeOutcome::Fallback
            }
        };
        tracing::debug!(node = %node.id, ?outcome, "rendered node");
        self.document.visits.push(NodeVisit {
            id: node.id.clone(),
            outcome,
        });

        self.render_nodes(&node.children);
    }

    // A node whose body failed is never dropped without a trace, even if it has no fallback text.
    fn push_fallback(&mut self, node: &TemplateNode) {
        if !node.fallback_text.trim().is_empty() || node.body_template.is_none() {
            self.document.body.push_str(&node.fallback_text);
            return;
        }
        tracing::warn!(node = %node.id, "clause failed and has no fallback text");
        self.document.body.push_str("<p>");
        self.document.body.push_str(&escape_text(&self.ctx.config.omitted_clause_label));
        self.document.body.push_str("</p>");
    }

    // None means the node needs its fallback text.
    fn render_body(&self, node: &TemplateNode) -> Option<String> {
        let body = node.body_template.as_deref()?;
        let template = match self.parser.parse(body) {
            Ok(template) => template,
            Err(err) => {
                tracing::warn!(node = %node.id, error = %err, "body template does not parse");
                return None;
            }
        };

        let evaluation = evaluate(&template, &self.ctx);
        if evaluation.is_failed() {
            tracing::debug!(node = %node.id, degraded = evaluation.degraded, "body rendered blank");
            return None;
        }
        Some(evaluation.text)
    }
}

// `sort_by_key` is stable, so equal orders keep declaration order.
fn sorted(nodes: &[TemplateNode]) -> Vec<&TemplateNode> {
    let mut sorted: Vec<&TemplateNode> = nodes.iter().collect();
    sorted.sort_by_key(|node| node.order);
    sorted
}

/// Authoring defects in a template tree. Rendering tolerates all of them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LintIssue {
    #[error("node id '{id}' is used more than once")]
    DuplicateId { id: String },
    #[error("order {order} is shared by siblings '{first}' and '{second}'")]
    DuplicateOrder { order: i64, first: String, second: String },
    #[error("{field} of node '{id}' does not parse: {error}")]
    Unparsable {
        id: String,
        field: &'static str,
        error: ParseError,
    },
    #[error("node '{id}' reads '.{field}' without declaring it in depends_on")]
    UndeclaredDependency { id: String, field: String },
}

pub fn lint(nodes: &[TemplateNode]) -> Vec<LintIssue> {
    let mut linter = Linter {
        parser: TemplateParser::new(),
        seen_ids: HashMap::new(),
        issues: Vec::new(),
    };
    linter.lint_siblings(nodes);
    linter.issues
}

struct Linter {
    parser: TemplateParser,
    seen_ids: HashMap<String, usize>,
    issues: Vec<LintIssue>,
}

impl Linter {
    fn lint_siblings(&mut self, nodes: &[TemplateNode]) {
        let mut orders: HashMap<i64, &str> = HashMap::new();
        for node in nodes {
            match orders.get(&node.order) {
                Some(first) => self.issues.push(LintIssue::DuplicateOrder {
                    order: node.order,
                    first: first.to_string(),
                    second: node.id.clone(),
                }),
                None => {
                    orders.insert(node.order, &node.id);
                }
            }
            self.lint_node(node);
        }
    }

    fn lint_node(&mut self, node: &TemplateNode) {
        let count = self.seen_ids.entry(node.id.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            self.issues.push(LintIssue::DuplicateId { id: node.id.clone() });
        }

        let declared: BTreeSet<&str> = node.depends_on.iter().map(|path| root_segment(path)).collect();
        let fields = [("title_template", &node.title_template), ("body_template", &node.body_template)];
        for (field, source) in fields {
            let Some(source) = source else {
                continue;
            };
            match self.parser.parse(source) {
                Ok(template) => {
                    for root in template.root_fields() {
                        if !declared.contains(root.as_str()) {
                            self.issues.push(LintIssue::UndeclaredDependency {
                                id: node.id.clone(),
                                field: root,
                            });
                        }
                    }
                }
                Err(error) => self.issues.push(LintIssue::Unparsable {
                    id: node.id.clone(),
                    field,
                    error,
                }),
            }
        }

        self.lint_siblings(&node.children);
    }
}

// "role_lists.executors" and ".kids[0]" declare "role_lists" and "kids".
fn root_segment(path: &str) -> &str {
    let path = path.trim().trim_start_matches('.');
    let end = path.find(['.', '[']).unwrap_or(path.len());
    &path[..end]
}
