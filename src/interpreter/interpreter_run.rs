// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::collections::HashMap;

use crate::{
    ast::{
        Conditional, Directive, Expr, ExprCall, ExprIndex, ExprOpBinary, ExprQuery, Helper, Iteration, Template,
    },
    clauses::escape_text,
    grouping::group_by_rank,
    record::RoleEntry,
    value::Value,
};

use super::{helpers, EvalError, Evaluation, RenderContext};

pub struct InterpreterRun<'a, 'r> {
    ctx: &'a RenderContext<'r>,
    scopes: Vec<Scope>,
    degraded: usize,
}

struct Scope {
    pub variables: HashMap<String, Value>,
}

impl<'a, 'r> InterpreterRun<'a, 'r> {
    pub fn new(ctx: &'a RenderContext<'r>) -> InterpreterRun<'a, 'r> {
        InterpreterRun {
            ctx,
            scopes: vec![Scope {
                variables: HashMap::new(),
            }],
            degraded: 0,
        }
    }

    pub fn interpret_template(&mut self, template: &Template) -> Evaluation {
        let mut text = String::new();
        self.interpret_directives(&template.directives, &mut text);
        Evaluation {
            text,
            degraded: self.degraded,
        }
    }

    fn interpret_directives(&mut self, directives: &[Directive], out: &mut String) {
        for directive in directives {
            self.interpret_directive(directive, out);
        }
    }

    fn interpret_directive(&mut self, directive: &Directive, out: &mut String) {
        let res = match directive {
            Directive::Literal(text) => {
                out.push_str(text);
                Ok(())
            }
            Directive::Invocation(expr) => self.interpret_invocation(expr, out),
            Directive::Conditional(conditional) => self.interpret_conditional(conditional, out),
            Directive::Iteration(iteration) => self.interpret_each(iteration, out),
            Directive::GroupedIteration(iteration) => self.interpret_each_group(iteration, out),
        };

        if let Err(err) = res {
            self.degrade(err);
        }
    }

    fn degrade(&mut self, err: EvalError) {
        tracing::debug!(error = %err, "directive degraded to empty text");
        self.degraded += 1;
    }

    fn interpret_invocation(&mut self, expr: &Expr, out: &mut String) -> Result<(), EvalError> {
        let value = self.interpret_expr(expr)?;
        match value {
            Value::Null => return Err(EvalError::NullValue),
            Value::Markup(markup) => out.push_str(&markup),
            value => {
                let text = value.to_text().ok_or(EvalError::NotText(value.type_name()))?;
                out.push_str(&escape_text(&text));
            }
        }
        Ok(())
    }

    fn interpret_conditional(&mut self, conditional: &Conditional, out: &mut String) -> Result<(), EvalError> {
        // Pick the branch before rendering anything, so a failing condition drops the whole directive.
        let mut selected = None;
        for branch in &conditional.branches {
            if self.interpret_condition(&branch.condition)? {
                selected = Some(&branch.body);
                break;
            }
        }

        let body = selected.unwrap_or(&conditional.otherwise);
        self.interpret_directives(body, out);
        Ok(())
    }

    fn interpret_each(&mut self, iteration: &Iteration, out: &mut String) -> Result<(), EvalError> {
        let iterable = self.interpret_operand(&iteration.iterable)?;
        let items = Self::expect_list(iterable)?;

        for item in items.iter() {
            self.push_scope();
            self.add_binding(&iteration.binding, item.clone());
            self.interpret_directives(&iteration.body, out);
            self.pop_scope();
        }
        Ok(())
    }

    fn interpret_each_group(&mut self, iteration: &Iteration, out: &mut String) -> Result<(), EvalError> {
        let iterable = self.interpret_operand(&iteration.iterable)?;
        let entries: Vec<RoleEntry> = match iterable {
            Value::Null => Vec::new(),
            iterable @ Value::List(_) => {
                serde_json::from_value(iterable.to_json()).map_err(|source| EvalError::Data {
                    context: "role list",
                    source,
                })?
            }
            other => return Err(EvalError::NotIterable(other.type_name())),
        };

        let cohorts = group_by_rank(&entries, self.ctx.config);
        let cohort_values: Vec<Value> = cohorts
            .iter()
            .map(|cohort| {
                let members = cohort
                    .members
                    .iter()
                    .map(|member| {
                        Value::map([
                            ("who", Value::from(member.who.as_str())),
                            ("rank", Value::from(i64::from(member.rank))),
                        ])
                    })
                    .collect();
                Value::list(members)
            })
            .collect();

        for (index, cohort) in cohorts.iter().enumerate() {
            let previous = match index {
                0 => Value::Null,
                _ => cohort_values[index - 1].clone(),
            };
            let binding = Value::map([
                ("members", cohort_values[index].clone()),
                ("rank", Value::from(i64::from(cohort.rank))),
                ("index", Value::from(index as i64)),
                ("number", Value::from(index as i64 + 1)),
                ("first", Value::from(index == 0)),
                ("last", Value::from(index + 1 == cohorts.len())),
                ("previous", previous),
            ]);

            self.push_scope();
            self.add_binding(&iteration.binding, binding);
            self.interpret_directives(&iteration.body, out);
            self.pop_scope();
        }
        Ok(())
    }

    fn interpret_condition(&mut self, condition: &Expr) -> Result<bool, EvalError> {
        let value = self.interpret_operand(condition)?;
        Ok(value.is_truthy())
    }

    // Like interpret_expr(), but missing data reads as null so presence tests work.
    fn interpret_operand(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match self.interpret_expr(expr) {
            Err(err) if err.is_data_gap() => Ok(Value::Null),
            res => res,
        }
    }

    fn interpret_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::String(value) => Ok(Value::from(value.as_str())),
            Expr::Integer(value) => Ok(Value::from(*value)),
            Expr::Real(value) => Ok(Value::Real(value.clone().into())),
            Expr::True => Ok(Value::from(true)),
            Expr::False => Ok(Value::from(false)),
            Expr::Null => Ok(Value::Null),
            Expr::Query(query) => self.query(query),
            Expr::Call(call) => self.interpret_call(call),
            Expr::Eq(op) => self.interpret_eq(op),
            Expr::Ne(op) => self.interpret_eq(op).map(|res| Value::from(!res.is_truthy())),
            Expr::Gt(op) => self.interpret_gt(op),
            Expr::And(op) => self.interpret_and(op),
            Expr::Or(op) => self.interpret_or(op),
            Expr::Not(operand) => {
                let value = self.interpret_operand(operand)?;
                Ok(Value::from(!value.is_truthy()))
            }
        }
    }

    fn interpret_call(&mut self, call: &ExprCall) -> Result<Value, EvalError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let value = match arg {
                // String literals inside concat() are template prose, not record data.
                Expr::String(text) if call.helper == Helper::Concat => Value::markup(text.clone()),
                arg => self.interpret_operand(arg)?,
            };
            args.push(value);
        }
        helpers::invoke(call.helper, &args, self.ctx)
    }

    fn interpret_eq(&mut self, op: &ExprOpBinary) -> Result<Value, EvalError> {
        let left = self.interpret_operand(&op.left)?;
        let right = self.interpret_operand(&op.right)?;
        Ok(Value::from(Self::loose_eq(&left, &right)))
    }

    fn interpret_gt(&mut self, op: &ExprOpBinary) -> Result<Value, EvalError> {
        let left = self.interpret_operand(&op.left)?;
        let right = self.interpret_operand(&op.right)?;
        match (Self::as_number(&left), Self::as_number(&right)) {
            (Some(l), Some(r)) => Ok(Value::from(l > r)),
            _ => match (&left, &right) {
                (Value::String(l), Value::String(r)) => Ok(Value::from(l > r)),
                _ => Err(EvalError::NotComparable {
                    left: left.debug_string(),
                    right: right.debug_string(),
                }),
            },
        }
    }

    fn interpret_and(&mut self, op: &ExprOpBinary) -> Result<Value, EvalError> {
        if !self.interpret_operand(&op.left)?.is_truthy() {
            return Ok(Value::from(false));
        }
        let right = self.interpret_operand(&op.right)?;
        Ok(Value::from(right.is_truthy()))
    }

    fn interpret_or(&mut self, op: &ExprOpBinary) -> Result<Value, EvalError> {
        if self.interpret_operand(&op.left)?.is_truthy() {
            return Ok(Value::from(true));
        }
        let right = self.interpret_operand(&op.right)?;
        Ok(Value::from(right.is_truthy()))
    }

    fn query(&mut self, query: &ExprQuery) -> Result<Value, EvalError> {
        match query {
            ExprQuery::Root => Ok(self.ctx.root.clone()),
            ExprQuery::Var(name) => self.query_var(name),
            ExprQuery::Index(objectindex) => self.query_index(objectindex),
        }
    }

    fn query_var(&mut self, name: &str) -> Result<Value, EvalError> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.variables.get(name) {
                return Ok(value.clone());
            }
        }

        Err(EvalError::UnknownVariable(name.to_string()))
    }

    fn query_index(&mut self, objectindex: &ExprIndex) -> Result<Value, EvalError> {
        let index = self.interpret_expr(&objectindex.index)?;
        let object = self.query(&objectindex.object)?;
        match object {
            Value::Map(object) => {
                let Value::String(key) = &index else {
                    return Err(EvalError::BadIndex {
                        index_type: index.type_name(),
                        container: "map",
                    });
                };
                match object.get(key.as_str()) {
                    Some(subvalue) => Ok(subvalue.clone()),
                    None => Err(EvalError::MissingField(key.as_ref().clone())),
                }
            }
            Value::List(list) => {
                let Value::Integer(index) = index else {
                    return Err(EvalError::BadIndex {
                        index_type: index.type_name(),
                        container: "list",
                    });
                };
                usize::try_from(index)
                    .ok()
                    .and_then(|i| list.get(i))
                    .cloned()
                    .ok_or(EvalError::IndexOutOfBounds(index))
            }
            Value::Null => Err(EvalError::NullIndex {
                index: index.debug_string(),
            }),
            _ => Err(EvalError::NotIndexable {
                index: index.debug_string(),
                type_name: object.type_name(),
            }),
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope {
            variables: HashMap::new(),
        });
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn add_binding(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.variables.insert(name.to_string(), value);
        }
    }

    fn expect_list(value: Value) -> Result<std::rc::Rc<Vec<Value>>, EvalError> {
        match value {
            Value::List(items) => Ok(items),
            // An absent list iterates zero times.
            Value::Null => Ok(Default::default()),
            other => Err(EvalError::NotIterable(other.type_name())),
        }
    }

    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Integer(value) => Some(*value as f64),
            Value::Real(value) => value.parse().ok(),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    // Numbers compare by value ("25" == 25), everything else structurally.
    fn loose_eq(left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::String(_), Value::String(_)) => left == right,
            _ => match (Self::as_number(left), Self::as_number(right)) {
                (Some(l), Some(r)) => l == r,
                _ => left == right,
            },
        }
    }
}
