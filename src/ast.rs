// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::collections::BTreeSet;

/// A parsed template string: prose interleaved with directives.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Template {
    pub directives: Vec<Directive>,
}

impl Template {
    /// Record fields read directly from the root (`.kids`, `.role_lists.executors`, ...).
    pub fn root_fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        collect_directives(&self.directives, &mut fields);
        fields
    }
}

fn collect_directives(directives: &[Directive], fields: &mut BTreeSet<String>) {
    for directive in directives {
        match directive {
            Directive::Literal(_) => {}
            Directive::Invocation(expr) => collect_expr(expr, fields),
            Directive::Conditional(conditional) => {
                for branch in &conditional.branches {
                    collect_expr(&branch.condition, fields);
                    collect_directives(&branch.body, fields);
                }
                collect_directives(&conditional.otherwise, fields);
            }
            Directive::Iteration(iteration) | Directive::GroupedIteration(iteration) => {
                collect_expr(&iteration.iterable, fields);
                collect_directives(&iteration.body, fields);
            }
        }
    }
}

fn collect_expr(expr: &Expr, fields: &mut BTreeSet<String>) {
    match expr {
        Expr::Query(query) => collect_query(query, fields),
        Expr::Call(call) => call.args.iter().for_each(|arg| collect_expr(arg, fields)),
        Expr::Eq(op) | Expr::Ne(op) | Expr::Gt(op) | Expr::And(op) | Expr::Or(op) => {
            collect_expr(&op.left, fields);
            collect_expr(&op.right, fields);
        }
        Expr::Not(operand) => collect_expr(operand, fields),
        Expr::String(_) | Expr::Integer(_) | Expr::Real(_) | Expr::True | Expr::False | Expr::Null => {}
    }
}

fn collect_query(query: &ExprQuery, fields: &mut BTreeSet<String>) {
    if let Some(Expr::String(field)) = query.root_field() {
        fields.insert(field.clone());
    }
    // Index expressions can hold queries of their own.
    let mut query = query;
    while let ExprQuery::Index(ExprIndex { object, index }) = query {
        collect_expr(index, fields);
        query = &**object;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    Literal(String),
    Conditional(Conditional),
    Iteration(Iteration),
    GroupedIteration(Iteration),
    Invocation(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conditional {
    pub branches: Vec<Branch>,
    pub otherwise: Vec<Directive>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub condition: Expr,
    pub body: Vec<Directive>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Iteration {
    pub iterable: Expr,
    pub binding: String,
    pub body: Vec<Directive>,
}

/// The contents of a single `${{ ... }}` tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    Expr(Expr),
    If(Expr),
    ElseIf(Expr),
    Else,
    End,
    Each(TagEach),
    EachGroup(TagEach),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TagEach {
    pub iterable: Expr,
    pub binding: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    String(String),
    Integer(i64),
    Real(String),
    True,
    False,
    Null,
    Query(ExprQuery),
    Call(ExprCall),
    Eq(ExprOpBinary),
    Ne(ExprOpBinary),
    Gt(ExprOpBinary),
    And(ExprOpBinary),
    Or(ExprOpBinary),
    Not(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprQuery {
    Root,
    Var(String),
    Index(ExprIndex),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprIndex {
    pub object: Box<ExprQuery>,
    pub index: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprOpBinary {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprCall {
    pub helper: Helper,
    pub args: Vec<Expr>,
}

/// The closed set of helpers a template can invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Helper {
    Name,
    Describe,
    Relationship,
    IsInstitution,
    IsUnknown,
    Address,
    Concat,
    Names,
    People,
    Count,
    Bequests,
    Distribution,
    Appointments,
    TrustSchedule,
    Pets,
}

impl Helper {
    pub const ALL: [Helper; 15] = [
        Helper::Name,
        Helper::Describe,
        Helper::Relationship,
        Helper::IsInstitution,
        Helper::IsUnknown,
        Helper::Address,
        Helper::Concat,
        Helper::Names,
        Helper::People,
        Helper::Count,
        Helper::Bequests,
        Helper::Distribution,
        Helper::Appointments,
        Helper::TrustSchedule,
        Helper::Pets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Helper::Name => "name",
            Helper::Describe => "describe",
            Helper::Relationship => "relationship",
            Helper::IsInstitution => "is_institution",
            Helper::IsUnknown => "is_unknown",
            Helper::Address => "address",
            Helper::Concat => "concat",
            Helper::Names => "names",
            Helper::People => "people",
            Helper::Count => "count",
            Helper::Bequests => "bequests",
            Helper::Distribution => "distribution",
            Helper::Appointments => "appointments",
            Helper::TrustSchedule => "trust_schedule",
            Helper::Pets => "pets",
        }
    }

    pub fn from_name(name: &str) -> Option<Helper> {
        Helper::ALL.into_iter().find(|helper| helper.name() == name)
    }
}

impl ExprQuery {
    /// The first field read from the record root, e.g. `kids` for `.kids[0].first_name`.
    pub fn root_field(&self) -> Option<&Expr> {
        match self {
            ExprQuery::Root | ExprQuery::Var(_) => None,
            ExprQuery::Index(ExprIndex { object, index }) => match object.as_ref() {
                ExprQuery::Root => Some(index),
                _ => object.root_field(),
            },
        }
    }
}
