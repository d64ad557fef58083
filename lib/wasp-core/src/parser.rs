use std::fmt::Debug;

use crate::error::WaspError;

/// Body serialization capability.
///
/// The assembler hands every `Body` and `BodyMap` argument to the parser.
pub trait Parser: Debug + Send + Sync {
    /// Serializes a value into the request body.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be represented in the body format.
    fn to_json(&self, value: &serde_json::Value) -> Result<String, WaspError>;
}

/// [`Parser`] producing compact JSON with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn to_json(&self, value: &serde_json::Value) -> Result<String, WaspError> {
        let result = serde_json::to_string(value)?;
        Ok(result)
    }
}
