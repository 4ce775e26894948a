//! Secret preservation
//!
//! Remote APIs accept secrets in plaintext but answer with a redacted or
//! encrypted placeholder. Persisting the echo would make every later plan
//! see a change, so after each lifecycle call the freshly decoded record
//! gets the plaintext copied back in from the record the caller supplied.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Copy secret values from `source` into `state`.
///
/// `paths` are JSON pointers of the secret attributes for the branch that is
/// active in `state`. A path is only written when `source` holds a non-null
/// value there and its parent object exists in `state`; a null or missing
/// source value leaves the remote echo in place.
pub fn preserve<S: AsRef<str>>(state: &mut Value, source: &Value, paths: &[S]) {
    for path in paths {
        let path = path.as_ref();
        let Some(plain) = source.pointer(path).filter(|v| !v.is_null()) else {
            continue;
        };
        let Some((parent, field)) = split_pointer(path) else {
            continue;
        };
        if let Some(Value::Object(target)) = state.pointer_mut(parent) {
            target.insert(field.to_string(), plain.clone());
        }
    }
}

/// Typed wrapper around [`preserve`].
pub fn preserve_typed<M, S>(state: M, source: &M, paths: &[S]) -> Result<M>
where
    M: Serialize + DeserializeOwned,
    S: AsRef<str>,
{
    if paths.is_empty() {
        return Ok(state);
    }
    let mut state_value = serde_json::to_value(state)?;
    let source_value = serde_json::to_value(source)?;
    preserve(&mut state_value, &source_value, paths);
    Ok(serde_json::from_value(state_value)?)
}

/// Replace every non-null secret with a fixed marker, for display.
pub fn redact<S: AsRef<str>>(value: &mut Value, paths: &[S]) {
    for path in paths {
        if let Some(slot) = value.pointer_mut(path.as_ref())
            && !slot.is_null()
        {
            *slot = Value::String("(sensitive)".to_string());
        }
    }
}

fn split_pointer(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind('/')?;
    Some((&path[..idx], &path[idx + 1..]))
}
