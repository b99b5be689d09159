//! ULID-based identifier generation with prefixes.
//!
//! Identifiers in reviz follow the pattern: `prefix_ulid`
//! For example: `cor_01HQXYZ...` for render correlation ids.
//!
//! Snapshot ids are deliberately NOT ULIDs: a timeline numbers its entries
//! with a sequence counter so they stay human-readable and strictly ordered.
//! This module covers everything else that needs a unique token.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    /// Correlation id linking a render request to its async response.
    Correlation,
    /// Request id for command-style entry points (restore, export).
    Request,
    /// Document key component for storage scoping.
    Document,
}

impl IdPrefix {
    /// Get the string prefix for this identifier type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Correlation => "cor",
            IdPrefix::Request => "req",
            IdPrefix::Document => "doc",
        }
    }

    /// Parse a prefix from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cor" => Some(IdPrefix::Correlation),
            "req" => Some(IdPrefix::Request),
            "doc" => Some(IdPrefix::Document),
            _ => None,
        }
    }
}

/// Identifier generation and parsing utilities.
pub struct Identifier;

impl Identifier {
    /// Generate a new ascending identifier (newer = larger).
    pub fn ascending(prefix: IdPrefix) -> String {
        let ulid = Ulid::new();
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Generate an identifier with a specific ULID (for testing or imports).
    pub fn with_ulid(prefix: IdPrefix, ulid: Ulid) -> String {
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Parse an identifier into its prefix and ULID parts.
    pub fn parse(id: &str) -> Option<(IdPrefix, Ulid)> {
        let parts: Vec<&str> = id.splitn(2, '_').collect();
        if parts.len() != 2 {
            return None;
        }

        let prefix = IdPrefix::parse(parts[0])?;
        let ulid = Ulid::from_string(parts[1]).ok()?;
        Some((prefix, ulid))
    }

    /// Check if an identifier has the expected prefix.
    pub fn has_prefix(id: &str, prefix: IdPrefix) -> bool {
        id.starts_with(prefix.as_str()) && id.chars().nth(prefix.as_str().len()) == Some('_')
    }

    /// Generate a correlation id for a render round trip.
    pub fn correlation() -> String {
        Self::ascending(IdPrefix::Correlation)
    }

    /// Generate a request id for a command entry point.
    pub fn request() -> String {
        Self::ascending(IdPrefix::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_id() {
        let id = Identifier::ascending(IdPrefix::Correlation);
        assert!(id.starts_with("cor_"));
        assert_eq!(id.len(), 30); // "cor_" (4) + ULID (26)
    }

    #[test]
    fn test_ascending_order() {
        let id1 = Identifier::ascending(IdPrefix::Correlation);
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = Identifier::ascending(IdPrefix::Correlation);
        assert!(id1 < id2, "Ascending IDs should increase over time");
    }

    #[test]
    fn test_parse_id() {
        let id = Identifier::correlation();
        let (prefix, _ulid) = Identifier::parse(&id).unwrap();
        assert_eq!(prefix, IdPrefix::Correlation);
    }

    #[test]
    fn test_has_prefix() {
        let id = Identifier::correlation();
        assert!(Identifier::has_prefix(&id, IdPrefix::Correlation));
        assert!(!Identifier::has_prefix(&id, IdPrefix::Request));
    }

    #[test]
    fn test_convenience_functions() {
        assert!(Identifier::correlation().starts_with("cor_"));
        assert!(Identifier::request().starts_with("req_"));
    }

    #[test]
    fn test_id_prefix_round_trip() {
        for prefix in [IdPrefix::Correlation, IdPrefix::Request, IdPrefix::Document] {
            assert_eq!(IdPrefix::parse(prefix.as_str()), Some(prefix));
        }
        assert_eq!(IdPrefix::parse("unknown"), None);
    }

    #[test]
    fn test_parse_invalid_format_no_underscore() {
        assert!(Identifier::parse("nounderscore").is_none());
    }

    #[test]
    fn test_parse_invalid_ulid() {
        assert!(Identifier::parse("cor_notaulid").is_none());
    }

    #[test]
    fn test_with_ulid() {
        let ulid = Ulid::new();
        let id = Identifier::with_ulid(IdPrefix::Request, ulid);
        assert!(id.starts_with("req_"));
        let (_, parsed_ulid) = Identifier::parse(&id).unwrap();
        assert_eq!(parsed_ulid, ulid);
    }

    #[test]
    fn test_has_prefix_without_underscore() {
        assert!(!Identifier::has_prefix("cor123", IdPrefix::Correlation));
    }
}
