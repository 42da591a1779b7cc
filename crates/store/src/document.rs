//! Stored document envelope.

use honeydo_core::types::{DocId, Timestamp};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A single document as held by a [`DocumentStore`](crate::DocumentStore).
///
/// The store itself is schema-free: `fields` is an arbitrary JSON object and
/// interpretation is left to the caller, usually via [`Document::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned document id, unique within its collection.
    pub id: DocId,

    /// The document body. Always a JSON object.
    pub fields: serde_json::Value,

    /// When the document was first written (UTC).
    pub created_at: Timestamp,

    /// When the document was last patched (UTC).
    pub updated_at: Timestamp,
}

impl Document {
    /// Look up a single top-level field by name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Deserialize the document into a typed model.
    ///
    /// The store-assigned `id` is merged into the field object before
    /// deserialization, so model types carry their own `id` field even
    /// though it is not stored in the body.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut merged = self.fields.clone();
        if let serde_json::Value::Object(map) = &mut merged {
            map.insert(
                "id".to_string(),
                serde_json::Value::String(self.id.clone()),
            );
        }
        serde_json::from_value(merged)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Widget {
        id: String,
        label: String,
        weight: u32,
    }

    fn doc(id: &str, fields: serde_json::Value) -> Document {
        let now = Utc::now();
        Document {
            id: id.to_string(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn decode_merges_the_document_id() {
        let doc = doc("w-1", serde_json::json!({"label": "hammer", "weight": 3}));

        let widget: Widget = doc.decode().expect("should decode");
        assert_eq!(widget.id, "w-1");
        assert_eq!(widget.label, "hammer");
        assert_eq!(widget.weight, 3);
    }

    #[test]
    fn decode_fails_on_missing_fields() {
        let doc = doc("w-2", serde_json::json!({"label": "saw"}));

        let result: Result<Widget, _> = doc.decode();
        assert!(result.is_err());
    }

    #[test]
    fn field_reads_top_level_values_only() {
        let doc = doc("w-3", serde_json::json!({"label": "axe", "nested": {"a": 1}}));

        assert_eq!(doc.field("label"), Some(&serde_json::json!("axe")));
        assert_eq!(doc.field("nested"), Some(&serde_json::json!({"a": 1})));
        assert_eq!(doc.field("missing"), None);
    }
}
