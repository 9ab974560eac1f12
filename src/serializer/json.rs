use std::collections::BTreeMap;

use crate::{
    error::{DecodeError, Result},
    value::Value,
};

pub(super) fn from_slice(bytes: &[u8]) -> Result<Value> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::Deserialize(err.to_string()))?;
    Ok(convert(json))
}

fn convert(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        // JavaScript semantics: every number is a double.
        serde_json::Value::Number(n) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Sequence(items.into_iter().map(convert).collect()),
        serde_json::Value::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, convert(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}
