//! Registry configuration.

/// Behavioural switches for a [`ComponentRegistry`](crate::ComponentRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Skip entities the registry knows as inactive in every query.
    pub skip_inactive: bool,
    /// Run `Component::validate` before storing an instance.
    pub validate_components: bool,
}

impl RegistryConfig {
    /// Create a config with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            skip_inactive: true,
            validate_components: true,
        }
    }

    /// Override whether queries skip inactive entities.
    #[must_use]
    pub fn with_skip_inactive(mut self, skip: bool) -> Self {
        self.skip_inactive = skip;
        self
    }

    /// Override whether components are validated on insert.
    #[must_use]
    pub fn with_validate_components(mut self, validate: bool) -> Self {
        self.validate_components = validate;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
