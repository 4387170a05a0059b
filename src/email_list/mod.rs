use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type EmailListId = TypedId<EmailList>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EmailList {
    #[serde(rename = "_id")]
    pub id: EmailListId,
    pub name: String,
    pub emails: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for EmailList {
    fn tag() -> &'static str {
        "LST"
    }
}

/// Mirrors the address rule the original intake form enforced: one `@`, no
/// whitespace, and a dotted domain with text on both sides of the dot.
pub fn is_valid_address(address: &str) -> bool {
    let mut parts = address.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.chars().any(char::is_whitespace) {
        return false;
    }

    match domain.find('.') {
        Some(index) => index > 0 && index + 1 < domain.len(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_address("amara@example.com"));
        assert!(is_valid_address("a.b+tag@sub.example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_address("no-at-sign"));
        assert!(!is_valid_address("two@@example.com"));
        assert!(!is_valid_address("spaced name@example.com"));
        assert!(!is_valid_address("@example.com"));
        assert!(!is_valid_address("user@nodot"));
        assert!(!is_valid_address("user@.com"));
        assert!(!is_valid_address("user@com."));
    }
}
