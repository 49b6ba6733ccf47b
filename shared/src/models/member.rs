//! Member (customer) model and payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Metadata for one uploaded document, stored as a JSONB list on the member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    /// Stored filename (unique within the member's upload directory)
    pub filename: String,
    /// Filename as supplied by the client
    pub original_name: String,
    /// Path relative to the upload root
    pub path: String,
    pub mimetype: String,
    pub size: u64,
}

/// Member entity (a customer who can appear on bookings).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub mobile_no: String,
    pub address: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub documents: Vec<DocumentMeta>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Member creation payload (multipart `data` field; documents arrive as files).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "mobile number is required"))]
    pub mobile_no: String,
    pub address: Option<String>,
}

/// Partial member update. `replace_documents` swaps the stored list for the
/// newly uploaded files instead of appending.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "mobile number must not be empty"))]
    pub mobile_no: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub replace_documents: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_meta_roundtrip() {
        let doc = DocumentMeta {
            filename: "a1b2-passport.pdf".into(),
            original_name: "passport.pdf".into(),
            path: "member/12/a1b2-passport.pdf".into(),
            mimetype: "application/pdf".into(),
            size: 52_100,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"originalName\":\"passport.pdf\""));
        let back: DocumentMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn update_defaults_to_append() {
        let upd: MemberUpdate = serde_json::from_str("{}").unwrap();
        assert!(!upd.replace_documents);
    }
}
