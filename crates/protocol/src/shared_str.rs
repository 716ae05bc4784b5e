use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Immutable text shared between commands.
///
/// Stagger transitions, star styles and observer margins repeat the same
/// strings across many commands; a clone only bumps the refcount.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for SharedStr {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedStr {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for SharedStr {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for SharedStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// JSON strings with escapes cannot be borrowed from the input.
impl<'de> Deserialize<'de> for SharedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_compare_by_content() {
        let a = SharedStr::from("translateY(0)");
        let b = SharedStr::from(String::from("translateY(0)"));
        assert_eq!(a, b);
        assert_eq!(a.clone().as_str(), "translateY(0)");
    }

    #[test]
    fn escaped_json_deserializes() {
        let s: SharedStr =
            serde_json::from_str(r#""Thank you, \"Ada\"!""#).unwrap_or_else(|_| SharedStr::from(""));
        assert_eq!(s.as_str(), r#"Thank you, "Ada"!"#);
    }

    #[test]
    fn derefs_to_str() {
        let href = SharedStr::from("#about");
        assert!(href.starts_with('#'));
        assert_eq!(href.to_string(), "#about");
    }
}
