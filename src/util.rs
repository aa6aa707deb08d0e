//! Small string helpers.

use serde_json::{Map, Value};

/// Replace `{key}` placeholders with values from `values`.
///
/// Strings are inserted as-is, other scalars through their JSON form.
/// Placeholders without a value are left untouched.
pub fn interpolate(template: &str, values: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('}') {
            Some(end) => {
                let key = after[..end].trim();
                match values.get(key) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(Value::Null) => {}
                    Some(other) => out.push_str(&other.to_string()),
                    None => out.push_str(&rest[start..start + end + 2]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
