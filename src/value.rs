// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Provides the copy-on-write data tree that directives are evaluated against.


use std::rc::Rc;

use hashlink::LinkedHashMap;
use serde::Serialize;

#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    // Numbers that don't fit in an i64 (e.g. floating point).
    Real(Rc<String>),
    String(Rc<String>),
    // Document text that is already escaped, such as a rendered clause.
    Markup(Rc<String>),
    List(Rc<Vec<Value>>),
    Map(Rc<LinkedHashMap<String, Value>>),
}

impl Value {
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Value, serde_json::Error> {
        let json = serde_json::to_value(data)?;
        Ok(Value::from_json(&json))
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Boolean(*value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Integer(value),
                None => Value::Real(Rc::new(number.to_string())),
            },
            serde_json::Value::String(value) => Value::String(Rc::new(value.clone())),
            serde_json::Value::Array(items) => Value::List(Rc::new(items.iter().map(Value::from_json).collect())),
            serde_json::Value::Object(entries) => {
                let mut map = LinkedHashMap::new();
                for (key, value) in entries {
                    map.insert(key.clone(), Value::from_json(value));
                }
                Value::Map(Rc::new(map))
            }
        }
    }

    // Used to hand a sub-tree back to the typed clause renderers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(value) => serde_json::Value::Bool(*value),
            Value::Integer(value) => serde_json::Value::from(*value),
            Value::Real(value) => match value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(number) => serde_json::Value::Number(number),
                None => serde_json::Value::String(value.as_ref().clone()),
            },
            Value::String(value) | Value::Markup(value) => serde_json::Value::String(value.as_ref().clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => {
                let mut object = serde_json::Map::new();
                for (key, value) in entries.iter() {
                    object.insert(key.clone(), value.to_json());
                }
                serde_json::Value::Object(object)
            }
        }
    }

    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
        let mut map = LinkedHashMap::new();
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        Value::Map(Rc::new(map))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn markup(text: String) -> Value {
        Value::Markup(Rc::new(text))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    // Null, false, blank strings and empty lists are false. Everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Boolean(false) => false,
            Value::String(value) | Value::Markup(value) => !value.trim().is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    // Text form used when a value is interpolated into a document.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Boolean(value) => Some(value.to_string()),
            Value::Integer(value) => Some(value.to_string()),
            Value::Real(value) | Value::String(value) | Value::Markup(value) => Some(value.as_ref().clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn debug_string(&self) -> String {
        match self {
            Value::Real(value) => value.as_ref().clone(),
            Value::Integer(value) => value.to_string(),
            Value::String(value) | Value::Markup(value) => format!("{:?}", value),
            Value::Boolean(value) => value.to_string(),
            Value::List(_) => "<list>".to_string(),
            Value::Map(_) => "<map>".to_string(),
            Value::Null => "<null>".to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Real(_) => "number",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Markup(_) => "markup",
            Value::Boolean(_) => "bool",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Null => "null",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Rc::new(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::new(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}
