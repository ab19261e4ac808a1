//! JSON bodies of the gateway's HTTP routes.
//!
//! The invoke shape is the generic runnable-invocation envelope:
//!
//! ```text
//! POST /chain/invoke  { "input": { "text": "..." }, "config": {}, "kwargs": {} }
//! 200                 { "output": "..." }
//! 502                 { "detail": "..." }
//! ```
//!
//! `config` and `kwargs` are accepted and ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// The `input` object of an invoke request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeInput {
    pub text: String,
}

/// `POST /chain/invoke` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub input: InvokeInput,
    #[serde(default = "empty_object")]
    pub config: Value,
    #[serde(default = "empty_object")]
    pub kwargs: Value,
}

impl InvokeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            input: InvokeInput { text: text.into() },
            config: empty_object(),
            kwargs: empty_object(),
        }
    }
}

/// `POST /chain/invoke` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub output: String,
}

/// `POST /chain/batch` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub inputs: Vec<InvokeInput>,
    #[serde(default = "empty_object")]
    pub config: Value,
    #[serde(default = "empty_object")]
    pub kwargs: Value,
}

/// `POST /chain/batch` success body; outputs are in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub output: Vec<String>,
}

/// Failure body for any route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// JSON schema served at `GET /chain/input_schema`.
pub fn input_schema() -> Value {
    serde_json::json!({
        "title": "ChainInput",
        "type": "object",
        "properties": {
            "text": { "title": "Text", "type": "string" }
        },
        "required": ["text"]
    })
}

/// JSON schema served at `GET /chain/output_schema`.
pub fn output_schema() -> Value {
    serde_json::json!({
        "title": "ChainOutput",
        "type": "string"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_has_empty_config_and_kwargs() {
        let json = serde_json::to_value(InvokeRequest::new("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "input": { "text": "hi" }, "config": {}, "kwargs": {} })
        );
    }

    #[test]
    fn config_and_kwargs_are_optional() {
        let req: InvokeRequest =
            serde_json::from_str(r#"{ "input": { "text": "hi" } }"#).unwrap();
        assert_eq!(req.input.text, "hi");
        assert!(req.config.as_object().is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn missing_text_is_rejected() {
        let res: Result<InvokeRequest, _> = serde_json::from_str(r#"{ "input": {} }"#);
        assert!(res.is_err());
    }

    #[test]
    fn input_schema_requires_text() {
        assert_eq!(input_schema()["required"][0], "text");
    }
}
