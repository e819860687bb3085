//! Ambient configuration passed to every build.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Environment variable read by [`BuildContext::from_env`].
pub const ENV_VAR: &str = "HORIZON_LATTICE_ENV";

/// Ambient context for a collection build.
///
/// The context is handed to element descriptors and to node invalidation
/// predicates. Nothing here is global: callers decide the production mode and
/// diagnostic suppression explicitly, which keeps builds deterministic.
///
/// # Example
///
/// ```
/// use horizon_lattice_collections::BuildContext;
///
/// let context = BuildContext::new()
///     .with_suppress_text_value_warning(true)
///     .with_data(7_u32);
///
/// assert!(context.suppress_text_value_warning());
/// assert_eq!(context.data::<u32>(), Some(&7));
/// ```
#[derive(Clone, Default)]
pub struct BuildContext {
    suppress_text_value_warning: bool,
    production: bool,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl BuildContext {
    /// Creates a context with diagnostics enabled and production mode off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context whose production flag comes from [`ENV_VAR`].
    ///
    /// The flag is set when the variable equals `production`
    /// (case-insensitive).
    pub fn from_env() -> Self {
        let production = std::env::var(ENV_VAR)
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        Self::new().with_production(production)
    }

    /// Suppresses the missing text value diagnostic.
    ///
    /// Widgets without type-to-select (tabs, for example) set this.
    pub fn with_suppress_text_value_warning(mut self, suppress: bool) -> Self {
        self.suppress_text_value_warning = suppress;
        self
    }

    /// Marks the build as running in a production configuration.
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Attaches caller data, visible to invalidation predicates.
    pub fn with_data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Returns whether the text value diagnostic is suppressed.
    pub fn suppress_text_value_warning(&self) -> bool {
        self.suppress_text_value_warning
    }

    /// Returns whether production mode is on.
    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Returns the attached caller data if it has type `D`.
    pub fn data<D: Any>(&self) -> Option<&D> {
        self.data.as_deref().and_then(|data| data.downcast_ref::<D>())
    }

    /// Whether descriptors should emit diagnostics.
    pub(crate) fn diagnostics_enabled(&self) -> bool {
        !self.production && !self.suppress_text_value_warning
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field(
                "suppress_text_value_warning",
                &self.suppress_text_value_warning,
            )
            .field("production", &self.production)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let context = BuildContext::new();
        assert!(!context.suppress_text_value_warning());
        assert!(!context.is_production());
        assert!(context.diagnostics_enabled());
    }

    #[test]
    fn test_diagnostics_disabled() {
        assert!(!BuildContext::new().with_production(true).diagnostics_enabled());
        assert!(!BuildContext::new()
            .with_suppress_text_value_warning(true)
            .diagnostics_enabled());
    }

    #[test]
    fn test_data_downcast() {
        let context = BuildContext::new().with_data(String::from("checkboxes"));
        assert_eq!(context.data::<String>().map(String::as_str), Some("checkboxes"));
        assert_eq!(context.data::<u8>(), None);
    }
}
