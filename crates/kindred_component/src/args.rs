//! Constructor arguments carried by a component declaration.

use serde_json::{Map, Value};

/// Ordered positional and keyword arguments for a component constructor.
///
/// Values are stored as [`serde_json::Value`] so a declaration can hold the
/// arguments of any component type without being generic over it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentArgs {
    positional: Vec<Value>,
    keyword: Map<String, Value>,
}

impl ComponentArgs {
    /// Create an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument. A repeated name replaces the earlier value.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Positional arguments, in declaration order.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments.
    #[must_use]
    pub fn keyword(&self) -> &Map<String, Value> {
        &self.keyword
    }

    /// Returns `true` if there are no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Bind the arguments to a single value a component can deserialize from.
    ///
    /// `fields` are the constructor's parameter names in order. Positional
    /// arguments bind to them left to right, keyword arguments fill the rest.
    /// Without `fields`, positional arguments form a sequence and may not be
    /// mixed with keyword arguments.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch when the arguments cannot be
    /// bound.
    pub fn to_value(&self, fields: &[&str]) -> Result<Value, String> {
        if self.positional.is_empty() {
            return Ok(Value::Object(self.keyword.clone()));
        }

        if fields.is_empty() {
            if !self.keyword.is_empty() {
                return Err("keyword arguments need named fields when positional arguments are given"
                    .to_string());
            }
            return Ok(Value::Array(self.positional.clone()));
        }

        if self.positional.len() > fields.len() {
            return Err(format!(
                "takes {} positional arguments but {} were given",
                fields.len(),
                self.positional.len()
            ));
        }

        let mut bound: Map<String, Value> = fields
            .iter()
            .zip(&self.positional)
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();

        for (name, value) in &self.keyword {
            if bound.contains_key(name) {
                return Err(format!("got multiple values for argument '{name}'"));
            }
            bound.insert(name.clone(), value.clone());
        }

        Ok(Value::Object(bound))
    }
}
