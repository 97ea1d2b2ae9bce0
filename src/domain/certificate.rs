//! Certificate record as read from the contract

use serde::{Deserialize, Serialize};

/// A graduation certificate token
///
/// Immutable once loaded. The owner flag is computed by the loader against
/// the viewer identity of the connection that produced the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Token id, unique within a loaded set
    pub token_id: u64,
    /// Graduate name (search target)
    pub name: String,
    pub program: String,
    pub grade: String,
    pub year: u64,
    /// Issue timestamp, seconds since epoch
    pub issued_at: u64,
    /// Current holder address as returned by `ownerOf`
    pub owner: String,
    /// Metadata URI, passed through untouched
    pub token_uri: String,
    pub is_owner: bool,
}

impl Certificate {
    /// Whether `viewer` holds this token (case-insensitive hex compare)
    pub fn owned_by(&self, viewer: Option<&str>) -> bool {
        viewer.is_some_and(|viewer| same_address(&self.owner, viewer))
    }
}

/// Compare two hex addresses ignoring case and surrounding whitespace
pub fn same_address(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(owner: &str) -> Certificate {
        Certificate {
            token_id: 7,
            name: "Alice".into(),
            program: "CS".into(),
            grade: "A".into(),
            year: 2023,
            issued_at: 1_700_000_000,
            owner: owner.into(),
            token_uri: "ipfs://cert/7".into(),
            is_owner: false,
        }
    }

    #[test]
    fn test_owned_by_ignores_case() {
        let c = cert("0xAbCdEf0000000000000000000000000000000001");
        assert!(c.owned_by(Some("0xabcdef0000000000000000000000000000000001")));
        assert!(c.owned_by(Some("0XABCDEF0000000000000000000000000000000001")));
        assert!(!c.owned_by(Some("0x0000000000000000000000000000000000000002")));
    }

    #[test]
    fn test_no_viewer_owns_nothing() {
        let c = cert("0xabcdef0000000000000000000000000000000001");
        assert!(!c.owned_by(None));
        assert!(!same_address("", ""));
    }
}
