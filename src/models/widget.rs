use serde::Serialize;
use serde_json::Value;

/// The serialized shape every widget processor returns, and the shape the
/// dashboard response's `widgets` map is built out of.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetResult {
    pub widget_id: i64,
    pub widget_name: String,
    pub widget_type: String,
    pub data: Option<Value>,
    pub metadata: Value,
}

impl WidgetResult {
    /// A populated result with arbitrary metadata fields merged in.
    pub fn new(
        widget_id: i64,
        widget_name: impl Into<String>,
        widget_type: impl Into<String>,
        data: Value,
        mut metadata: serde_json::Map<String, Value>,
    ) -> Self {
        metadata.entry("empty").or_insert(Value::Bool(false));
        Self {
            widget_id,
            widget_name: widget_name.into(),
            widget_type: widget_type.into(),
            data: Some(data),
            metadata: Value::Object(metadata),
        }
    }

    /// The widget ran but had nothing to compute on (empty input).
    pub fn empty(widget_id: i64, widget_name: impl Into<String>, widget_type: impl Into<String>) -> Self {
        Self {
            widget_id,
            widget_name: widget_name.into(),
            widget_type: widget_type.into(),
            data: None,
            metadata: serde_json::json!({ "empty": true }),
        }
    }

    /// A processing-stage failure (§7's `Processing`/`Invariant` categories).
    pub fn error(widget_id: i64, widget_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            widget_id,
            widget_name: widget_name.into(),
            widget_type: "error".to_string(),
            data: None,
            metadata: serde_json::json!({ "empty": true, "error": message.into() }),
        }
    }
}
