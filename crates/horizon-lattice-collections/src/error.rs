//! Error types for collection building.

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Caller errors detected while building a collection.
///
/// Both variants describe authoring mistakes rather than runtime failures,
/// so there is nothing to retry: the offending input has to be fixed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// Children were given as a render function without a data collection.
    #[error("{location}.children was a render function but {location}.items is missing")]
    MissingItems {
        /// Where the render function was found (`props` or `section`).
        location: &'static str,
    },

    /// A node backed by a data value has no resolvable key.
    #[error("No key found for item {value}")]
    MissingKey {
        /// Debug description of the value that could not be keyed.
        value: String,
    },
}

impl CollectionError {
    /// Create a missing-items error for the given location.
    pub fn missing_items(location: &'static str) -> Self {
        Self::MissingItems { location }
    }

    /// Create a missing-key error describing the unresolved value.
    pub fn missing_key(value: impl Into<String>) -> Self {
        Self::MissingKey {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_items_message() {
        let err = CollectionError::missing_items("props");
        assert_eq!(
            err.to_string(),
            "props.children was a render function but props.items is missing"
        );
    }

    #[test]
    fn test_missing_key_message() {
        let err = CollectionError::missing_key("Fruit { name: \"Kiwi\" }");
        assert!(err.to_string().starts_with("No key found for item"));
        assert!(err.to_string().contains("Kiwi"));
    }
}
