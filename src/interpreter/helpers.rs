// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use serde::de::DeserializeOwned;

use crate::{
    ast::Helper,
    clauses::{self, escape_text},
    record::{Bequest, Distribution, PetProvision, RoleEntry, TrustStage},
    resolver::{join_address_parts, join_prose, resolve, Resolution},
    value::Value,
};

use super::{EvalError, RenderContext};

pub fn invoke(helper: Helper, args: &[Value], ctx: &RenderContext) -> Result<Value, EvalError> {
    match helper {
        Helper::Name => {
            let resolution = resolve_arg(helper, single(helper, args)?, ctx)?;
            Ok(Value::from(resolution.display_name()))
        }
        Helper::Describe => {
            let resolution = resolve_arg(helper, single(helper, args)?, ctx)?;
            Ok(Value::from(resolution.describe()))
        }
        Helper::Relationship => {
            let resolution = resolve_arg(helper, single(helper, args)?, ctx)?;
            Ok(Value::from(resolution.relationship()))
        }
        Helper::IsInstitution => {
            let resolution = resolve_arg(helper, single(helper, args)?, ctx)?;
            Ok(Value::from(resolution.is_institutional()))
        }
        Helper::IsUnknown => {
            let resolution = resolve_arg(helper, single(helper, args)?, ctx)?;
            Ok(Value::from(resolution.is_unknown()))
        }
        Helper::Address => address(helper, args, ctx),
        Helper::Concat => {
            let mut text = String::new();
            for arg in args {
                match arg {
                    Value::Null => return Err(EvalError::NullValue),
                    Value::Markup(markup) => text.push_str(markup),
                    arg => {
                        let part = arg.to_text().ok_or(EvalError::NotText(arg.type_name()))?;
                        text.push_str(&escape_text(&part));
                    }
                }
            }
            Ok(Value::markup(text))
        }
        Helper::Names => join_people(helper, args, ctx, |resolution| resolution.display_name().to_string()),
        Helper::People => join_people(helper, args, ctx, Resolution::describe),
        Helper::Count => match single(helper, args)? {
            Value::Null => Ok(Value::from(0_i64)),
            Value::List(items) => Ok(Value::from(items.len() as i64)),
            Value::Map(entries) => Ok(Value::from(entries.len() as i64)),
            other => Err(bad_argument(helper, format!("cannot count a {}", other.type_name()))),
        },
        Helper::Bequests => {
            let bequests: Vec<Bequest> = typed(helper, single(helper, args)?)?;
            let items = clauses::render_bequests(&bequests, ctx.record, ctx.config);
            Ok(Value::markup(items.concat()))
        }
        Helper::Distribution => {
            let value = single(helper, args)?;
            if let Value::Null = value {
                return Err(EvalError::NullValue);
            }
            let distribution: Distribution = typed(helper, value)?;
            Ok(Value::markup(clauses::render_distribution(&distribution, ctx.record, ctx.config)))
        }
        Helper::Appointments => {
            let [entries, role] = args else {
                return Err(arity(helper, "2", args));
            };
            let entries: Vec<RoleEntry> = typed(helper, entries)?;
            let role = role
                .to_text()
                .filter(|role| !role.trim().is_empty())
                .ok_or_else(|| bad_argument(helper, "role label must be a non-empty string".to_string()))?;
            Ok(Value::markup(clauses::render_appointments(
                &entries,
                &escape_text(&role),
                ctx.record,
                ctx.config,
            )))
        }
        Helper::TrustSchedule => {
            let stages: Option<Vec<TrustStage>> = typed(helper, single(helper, args)?)?;
            Ok(Value::markup(clauses::render_trust_schedule(stages.as_deref())))
        }
        Helper::Pets => {
            let pets: Vec<PetProvision> = typed(helper, single(helper, args)?)?;
            Ok(Value::markup(clauses::render_pets(&pets, ctx.record, ctx.config).concat()))
        }
    }
}

fn single<'v>(helper: Helper, args: &'v [Value]) -> Result<&'v Value, EvalError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(arity(helper, "1", args)),
    }
}

fn arity(helper: Helper, expected: &'static str, args: &[Value]) -> EvalError {
    EvalError::Arity {
        helper: helper.name(),
        expected,
        found: args.len(),
    }
}

fn bad_argument(helper: Helper, message: String) -> EvalError {
    EvalError::BadArgument {
        helper: helper.name(),
        message,
    }
}

fn typed<T: DeserializeOwned>(helper: Helper, value: &Value) -> Result<T, EvalError> {
    let res = match serde_json::from_value(value.to_json()) {
        // Absent lists behave as empty ones.
        Err(_) if matches!(value, Value::Null) => serde_json::from_value(serde_json::Value::Array(Vec::new())),
        res => res,
    };
    res.map_err(|source| EvalError::Data {
        context: helper.name(),
        source,
    })
}

// A person reference is either a string or a map carrying one under "who".
fn reference(helper: Helper, value: &Value) -> Result<String, EvalError> {
    match value {
        Value::String(reference) => Ok(reference.as_ref().clone()),
        Value::Map(_) => match value.get("who") {
            Some(Value::String(reference)) => Ok(reference.as_ref().clone()),
            _ => Err(bad_argument(helper, "map argument has no \"who\" reference".to_string())),
        },
        Value::Null => Err(EvalError::NullValue),
        other => Err(bad_argument(helper, format!("a {} is not a person reference", other.type_name()))),
    }
}

fn resolve_arg(helper: Helper, value: &Value, ctx: &RenderContext) -> Result<Resolution, EvalError> {
    let reference = reference(helper, value)?;
    Ok(resolve(&reference, ctx.record, ctx.config))
}

fn join_people(
    helper: Helper,
    args: &[Value],
    ctx: &RenderContext,
    render: impl Fn(&Resolution) -> String,
) -> Result<Value, EvalError> {
    let (list, conjunction) = match args {
        [list] => (list, "and".to_string()),
        [list, conjunction] => (
            list,
            conjunction.to_text().ok_or(EvalError::NotText(conjunction.type_name()))?,
        ),
        _ => return Err(arity(helper, "1 or 2", args)),
    };

    let items: &[Value] = match list {
        Value::Null => &[],
        Value::List(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        names.push(render(&resolve_arg(helper, item, ctx)?));
    }
    Ok(Value::from(join_prose(&names, &conjunction)))
}

// address($person), address("ref") or address(city, province, country).
fn address(helper: Helper, args: &[Value], ctx: &RenderContext) -> Result<Value, EvalError> {
    match args {
        [] => Err(arity(helper, "at least 1", args)),
        [Value::Map(_)] => {
            let field = |name: &str| args[0].get(name).and_then(Value::to_text).unwrap_or_default();
            let parts = [field("city"), field("province"), field("country")];
            Ok(Value::from(join_address_parts(parts.iter().map(String::as_str))))
        }
        [Value::String(reference)] => Ok(Value::from(resolve(reference, ctx.record, ctx.config).address())),
        parts => {
            let mut texts = Vec::with_capacity(parts.len());
            for part in parts {
                texts.push(part.to_text().ok_or(EvalError::NotText(part.type_name()))?);
            }
            Ok(Value::from(join_address_parts(texts.iter().map(String::as_str))))
        }
    }
}
