// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Evaluates parsed templates against a record.
//!
//! Evaluation never fails as a whole. A directive that hits missing data or a
//! helper error renders as an empty string and is counted in
//! [`Evaluation::degraded`]; the composer decides whether a node needs its
//! fallback text.

mod helpers;
mod interpreter_run;


use thiserror::Error;

use crate::{ast::Template, config::EngineConfig, record::CanonicalDataRecord, value::Value};

use interpreter_run::InterpreterRun;

/// Everything a render reads besides the template itself.
pub struct RenderContext<'a> {
    pub record: &'a CanonicalDataRecord,
    pub config: &'a EngineConfig,
    /// The record as a value tree; `.` in a template refers to this.
    pub root: Value,
}

impl<'a> RenderContext<'a> {
    pub fn new(record: &'a CanonicalDataRecord, config: &'a EngineConfig) -> Result<RenderContext<'a>, EvalError> {
        let root = Value::from_serialize(record).map_err(|source| EvalError::Data {
            context: "record",
            source,
        })?;
        Ok(RenderContext { record, config, root })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub text: String,
    /// Number of directives that degraded to empty text.
    pub degraded: usize,
}

impl Evaluation {
    /// Blank output caused by missing data, as opposed to conditionals that chose nothing.
    pub fn is_failed(&self) -> bool {
        self.degraded > 0 && self.text.trim().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("cannot find variable '${0}'")]
    UnknownVariable(String),
    #[error("field {0:?} not found")]
    MissingField(String),
    #[error("cannot get index {index} of null")]
    NullIndex { index: String },
    #[error("index {0} is out of bounds")]
    IndexOutOfBounds(i64),
    #[error("cannot get index {index}: value type {type_name} is not indexable")]
    NotIndexable { index: String, type_name: &'static str },
    #[error("value of type {index_type} cannot be used to index into a {container}")]
    BadIndex {
        index_type: &'static str,
        container: &'static str,
    },
    #[error("value type {0} is not iterable")]
    NotIterable(&'static str),
    #[error("value of type {0} cannot be rendered as text")]
    NotText(&'static str),
    #[error("value is null")]
    NullValue,
    #[error("cannot compare {left} with {right}")]
    NotComparable { left: String, right: String },
    #[error("{helper}() expects {expected} argument(s), found {found}")]
    Arity {
        helper: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("{helper}(): {message}")]
    BadArgument { helper: &'static str, message: String },
    #[error("invalid {context} data: {source}")]
    Data {
        context: &'static str,
        source: serde_json::Error,
    },
}

impl EvalError {
    /// Errors caused by absent data rather than by template authoring.
    pub fn is_data_gap(&self) -> bool {
        matches!(
            self,
            EvalError::MissingField(_) | EvalError::NullIndex { .. } | EvalError::IndexOutOfBounds(_) | EvalError::NullValue
        )
    }
}

pub fn evaluate(template: &Template, ctx: &RenderContext) -> Evaluation {
    let mut run = InterpreterRun::new(ctx);
    run.interpret_template(template)
}
