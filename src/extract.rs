//! Scalar field extraction from service responses.
//!
//! The service's version and event responses are small flat JSON objects,
//! and only two string fields are ever read from them. [`TextFieldExtractor`]
//! does that with a plain substring search. [`JsonFieldExtractor`] is the
//! drop-in for when responses grow nested fields.

use serde_json::Value;

/// Pulls a single string-valued field out of a response body.
pub trait FieldExtractor: Send + Sync {
    /// Returns the value of `key`, or `None` if it is absent.
    fn extract(&self, body: &str, key: &str) -> Option<String>;
}

/// Substring-based extractor.
///
/// Looks for the literal `"<key>":"` and returns everything up to the next
/// `"`. Only valid for flat objects with string values. An escaped quote
/// inside the value ends it early; values with escapes need
/// [`JsonFieldExtractor`].
///
/// # Example
///
/// ```
/// use xscan::extract::{FieldExtractor, TextFieldExtractor};
///
/// let body = r#"{"xsc_version":"1.8.0"}"#;
/// assert_eq!(TextFieldExtractor.extract(body, "xsc_version").as_deref(), Some("1.8.0"));
/// assert_eq!(TextFieldExtractor.extract("{}", "xsc_version"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFieldExtractor;

impl FieldExtractor for TextFieldExtractor {
    fn extract(&self, body: &str, key: &str) -> Option<String> {
        let needle = format!("\"{}\":\"", key);
        let start = body.find(&needle)? + needle.len();
        let len = body[start..].find('"')?;
        Some(body[start..start + len].to_string())
    }
}

/// Extractor backed by a real JSON parser.
///
/// Reads a top-level string field. Non-string values and invalid JSON
/// yield `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFieldExtractor;

impl FieldExtractor for JsonFieldExtractor {
    fn extract(&self, body: &str, key: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        value.get(key)?.as_str().map(str::to_string)
    }
}
