//! Keys identifying nodes within a collection.

use std::fmt;
use std::sync::Arc;

/// A stable identifier for a node within one collection snapshot.
///
/// Keys are either integers or strings. Integer keys usually come from a
/// value's identifying field (a database id, for example); string keys come
/// from explicit element keys or are generated from a node's position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(Arc<str>),
}

impl Key {
    /// Creates a string key.
    pub fn string(value: impl AsRef<str>) -> Self {
        Self::Str(Arc::from(value.as_ref()))
    }

    /// Returns the string contents if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }

    /// Returns the integer value if this is an integer key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// Generates the positional key for an unkeyed element.
    ///
    /// Top-level nodes use `$` as their parent segment.
    pub(crate) fn positional(parent: Option<&Key>, index: usize) -> Key {
        match parent {
            Some(parent) => Key::string(format!("{parent}.{index}")),
            None => Key::string(format!("$.{index}")),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Self::string(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Key {
    fn eq(&self, other: &i64) -> bool {
        self.as_int() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from(42).to_string(), "42");
        assert_eq!(Key::from("apple").to_string(), "apple");
    }

    #[test]
    fn test_positional_keys() {
        assert_eq!(Key::positional(None, 2), "$.2");
        assert_eq!(Key::positional(Some(&Key::from("menu")), 0), "menu.0");
    }

    #[test]
    fn test_int_and_string_keys_differ() {
        assert_ne!(Key::from(1), Key::from("1"));
        assert_eq!(Key::from(1), 1i64);
    }
}
