use serde::Serialize;

use crate::error::WaspError;

/// Positional argument values of one invocation.
///
/// Arguments are aligned with the declared parameters, the trailing callback excluded.
/// `serde_json::Value::Null` stands for an absent argument.
///
/// # Example
///
/// ```rust
/// use wasp_core::Arguments;
///
/// # fn main() -> Result<(), wasp_core::WaspError> {
/// let arguments = Arguments::new()
///     .arg("octocat")
///     .arg(1)
///     .try_arg(&["stars", "forks"])?;
///
/// assert_eq!(arguments.len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<serde_json::Value>,
}

impl Arguments {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value convertible to JSON.
    pub fn arg(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Appends any serializable value.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be represented as JSON.
    pub fn try_arg<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, WaspError> {
        self.values.push(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Appends an absent value.
    pub fn absent(mut self) -> Self {
        self.values.push(serde_json::Value::Null);
        self
    }

    /// The argument values, in order.
    pub fn values(&self) -> &[serde_json::Value] {
        &self.values
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there is no argument.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<serde_json::Value>> for Arguments {
    fn from(values: Vec<serde_json::Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<serde_json::Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = serde_json::Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
