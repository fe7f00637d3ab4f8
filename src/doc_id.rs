use uuid::Uuid;

use crate::error::{Error, Result};

/// A random document identifier, assigned once at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its hyphenated (or simple) hex form.
    pub fn parse(value: &str) -> Result<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|_| {
            Error::NotFound {
                kind: "document",
                name: value.to_string(),
            }
        })
    }

    /// The short hex prefix used for human display (e.g. "a1b2c3d4").
    pub fn short(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[..8].to_string()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_differ() {
        let a = DocumentId::new();
        let b = DocumentId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_parses_back() {
        let id = DocumentId::new();
        let parsed = DocumentId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn short_id_is_eight_chars() {
        let id = DocumentId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = DocumentId::parse("not-a-uuid").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "document", .. }));
    }
}
