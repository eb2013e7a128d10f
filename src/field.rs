use crate::handler::{Rejection, SharedHandler};
use crate::value::Value;

/// A named, typed, persisted unit of configuration data.
///
/// The value only changes through [`check`](Field::check)-validated input:
/// the handler's `load` followed by `is_valid`. A rejected input leaves the
/// field untouched.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: Value,
    default: Value,
    handler: SharedHandler,
    hint: Option<String>,
    overridden: bool,
}

impl Field {
    pub(crate) fn new(
        name: String,
        default: Value,
        handler: SharedHandler,
        hint: Option<String>,
        overridden: bool,
    ) -> Self {
        Self {
            name,
            value: default.clone(),
            default,
            handler,
            hint,
            overridden,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// The hint, or the field name when no hint was declared.
    pub fn label(&self) -> &str {
        self.hint.as_deref().unwrap_or(&self.name)
    }

    /// Whether the handler came from an explicit type override.
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn type_name(&self) -> &str {
        self.handler.name()
    }

    /// Run `input` through the handler without touching the field.
    pub fn check(&self, input: &Value) -> Result<Value, Rejection> {
        let loaded = self.handler.load(input)?;
        if !self.handler.is_valid(&loaded) {
            return Err(Rejection::new(format!(
                "{} is not a valid {}",
                loaded.literal(),
                self.handler.name()
            )));
        }
        Ok(loaded)
    }

    #[cfg(test)]
    pub(crate) fn assign(&mut self, input: &Value) -> Result<(), Rejection> {
        self.value = self.check(input)?;
        Ok(())
    }

    /// Install a value already produced by [`check`](Field::check).
    pub(crate) fn commit(&mut self, checked: Value) {
        self.value = checked;
    }

    pub(crate) fn restore_default(&mut self) {
        self.value = self.default.clone();
    }

    /// The stored form, as produced by the handler's `save`.
    pub fn saved(&self) -> Value {
        self.handler.save(&self.value)
    }

    /// Text shown to users as the current value.
    pub fn display_value(&self) -> String {
        self.handler.display(&self.value)
    }
}
