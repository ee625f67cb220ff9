use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A named request from the host framework: a method name plus positional
/// arguments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: Vec<JsonValue>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Vec<JsonValue>) -> Self {
        Self { method: method.into(), args }
    }

    pub fn args(&self) -> Args<'_> {
        Args(&self.args)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
}

/// Outcome of one bridge operation: a success payload or a structured error.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MethodResponse {
    pub result: Option<JsonValue>,
    pub error: Option<ResponseError>,
}

impl MethodResponse {
    pub fn success(value: impl Into<JsonValue>) -> Self {
        Self { result: Some(value.into()), error: None }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(ResponseError { code: code.into(), message: message.into() }),
        }
    }

    pub fn not_implemented(method: &str) -> Self {
        Self::error(crate::error::NOT_IMPLEMENTED, format!("method {method} is not implemented"))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Typed view over a positional argument list.
///
/// Required accessors surface argument errors; `*_or` accessors carry the
/// defaults the channel contract allows for trailing optional arguments.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a>(pub(crate) &'a [JsonValue]);

impl<'a> Args<'a> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn str_at(&self, index: usize) -> Result<&'a str, BridgeError> {
        match self.0.get(index) {
            None => Err(BridgeError::missing_arg(index, "string")),
            Some(JsonValue::String(value)) => Ok(value),
            Some(_) => Err(BridgeError::invalid_arg(index, "string")),
        }
    }

    pub fn i64_at(&self, index: usize) -> Result<i64, BridgeError> {
        match self.0.get(index) {
            None => Err(BridgeError::missing_arg(index, "integer")),
            Some(value) => value
                .as_i64()
                // Inbox template ids may arrive as numeric strings.
                .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()))
                .ok_or_else(|| BridgeError::invalid_arg(index, "integer")),
        }
    }

    pub fn i64_at_or(&self, index: usize, default: i64) -> i64 {
        self.i64_at(index).unwrap_or(default)
    }

    /// Missing or non-boolean trailing flags default to `false`.
    pub fn bool_at_or_false(&self, index: usize) -> bool {
        self.0.get(index).and_then(JsonValue::as_bool).unwrap_or(false)
    }

    pub fn map_at(&self, index: usize) -> Result<BTreeMap<String, JsonValue>, BridgeError> {
        match self.0.get(index) {
            None => Err(BridgeError::missing_arg(index, "map")),
            Some(JsonValue::Object(entries)) => {
                Ok(entries.iter().map(|(key, value)| (key.clone(), value.clone())).collect())
            }
            Some(_) => Err(BridgeError::invalid_arg(index, "map")),
        }
    }

    pub fn string_list_at(&self, index: usize) -> Result<Vec<String>, BridgeError> {
        match self.0.get(index) {
            None => Err(BridgeError::missing_arg(index, "list of strings")),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(ToOwned::to_owned)
                        .ok_or_else(|| BridgeError::invalid_arg(index, "list of strings"))
                })
                .collect(),
            Some(_) => Err(BridgeError::invalid_arg(index, "list of strings")),
        }
    }
}

/// One-shot response sink correlated to a single outstanding method call.
///
/// The sink must be resolved exactly once. A second resolution is a defect
/// in the caller: the late response is logged and dropped, never delivered.
pub struct ResultSink {
    inner: Mutex<Option<Box<dyn FnOnce(MethodResponse) + Send>>>,
}

impl ResultSink {
    pub fn new(deliver: impl FnOnce(MethodResponse) + Send + 'static) -> Self {
        Self { inner: Mutex::new(Some(Box::new(deliver))) }
    }

    pub fn resolve(&self, response: MethodResponse) {
        let deliver = match self.inner.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match deliver {
            Some(deliver) => deliver(response),
            None => log::error!("result sink resolved more than once; dropping late response"),
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self.inner.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink").field("resolved", &self.is_resolved()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn typed_accessors_enforce_shape() {
        let args = [json!("alias"), json!(true), json!(7), json!({"k": "v"})];
        let args = Args(&args);
        assert_eq!(args.str_at(0).expect("string"), "alias");
        assert!(args.bool_at_or_false(1));
        assert_eq!(args.i64_at(2).expect("integer"), 7);
        assert_eq!(args.map_at(3).expect("map").get("k"), Some(&json!("v")));

        assert!(args.str_at(2).is_err());
        assert!(args.i64_at(0).is_err());
        assert!(args.str_at(9).is_err());
    }

    #[test]
    fn numeric_strings_parse_as_integers() {
        let args = [json!("42")];
        assert_eq!(Args(&args).i64_at(0).expect("parsed"), 42);
    }

    #[test]
    fn missing_trailing_flags_default_to_false() {
        let args = [json!("alias")];
        assert!(!Args(&args).bool_at_or_false(1));
        assert!(!Args(&args).bool_at_or_false(0));
    }

    #[test]
    fn sink_delivers_only_the_first_resolution() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&delivered);
        let sink = ResultSink::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!sink.is_resolved());
        sink.resolve(MethodResponse::success(true));
        sink.resolve(MethodResponse::success(false));
        assert!(sink.is_resolved());
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn method_call_round_trips_through_json() {
        let call = MethodCall::new("setDeviceAlias", vec![json!("alias"), json!(false)]);
        let raw = serde_json::to_string(&call).expect("serialize");
        let back: MethodCall = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, call);
    }
}
