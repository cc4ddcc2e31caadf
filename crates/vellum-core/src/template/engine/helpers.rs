//! Helper functions for template execution

use crate::template::error::TemplateError;
use crate::template::Bindings;
use toml::Value;

/// Resolve a dotted path (`user.name`, `items.0`) against the bindings.
///
/// A leading `$` is optional. Numeric segments index into arrays.
pub(crate) fn resolve_path<'a>(bindings: &'a Bindings, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let mut parts = path.split('.');
    let mut current = bindings.get(parts.next()?)?;

    for part in parts {
        current = match current {
            Value::Table(table) => table.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Stringify a TOML value for echo output
pub(crate) fn stringify_value(value: &Value, expr: &str, line: usize) -> Result<String, TemplateError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        Value::Array(_) => Err(TemplateError::NotPrintable {
            expr: expr.to_string(),
            kind: "array",
            line,
        }),
        Value::Table(_) => Err(TemplateError::NotPrintable {
            expr: expr.to_string(),
            kind: "table",
            line,
        }),
    }
}

/// Truthiness of an expression result; an undefined value is false
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None => false,
        Some(Value::Boolean(b)) => *b,
        Some(Value::Integer(i)) => *i != 0,
        Some(Value::Float(f)) => *f != 0.0,
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Table(table)) => !table.is_empty(),
        Some(Value::Datetime(_)) => true,
    }
}

/// Bindings for one loop iteration: the enclosing bindings plus the loop
/// variables, which shadow outer names of the same spelling
pub(crate) fn loop_bindings(
    base: &Bindings,
    key_name: Option<&str>,
    key: Value,
    value_name: &str,
    value: Value,
) -> Bindings {
    let mut table = base.clone();
    if let Some(key_name) = key_name {
        table.insert(key_name.to_string(), key);
    }
    table.insert(value_name.to_string(), value);
    table
}
