//! LeadsDB entities and request/response shapes.
//!
//! Timestamps travel as Unix seconds; `null` or a missing field maps to `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A business lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lead {
    /// Server assigned identifier. Empty for leads not yet created.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Business name. Required on create.
    pub name: String,
    /// Where the lead came from. Required on create.
    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// Average customer rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Identifier of the lead in its source system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    /// Notes attached to the lead. Only populated by the server.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,

    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Creates a lead with the two fields the API requires.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Checks the fields the API requires before a create call.
    pub(crate) fn validate_for_create(&self) -> Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("name is required");
        }
        if self.source.is_empty() {
            return Err("source is required");
        }
        Ok(())
    }
}

/// Geographical coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north of the equator, negative for the southern hemisphere.
    pub latitude: f64,
    /// Degrees east of Greenwich, negative for the western hemisphere.
    pub longitude: f64,
}

/// Partial update of a lead. Only `Some` fields (and non-`None` lists) are sent.
///
/// `attributes`, when set, replaces every existing attribute of the lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateLead {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

/// Type tag of a dynamic attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Text,
    Number,
    Bool,
    List,
    Object,
}

/// A custom key/value attribute on a lead.
///
/// ```
/// use leadsdb::Attribute;
///
/// let attr = Attribute::number("employees", 500.0);
/// assert_eq!(
///     serde_json::to_string(&attr).unwrap(),
///     r#"{"name":"employees","type":"number","value":500.0}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute key, filterable as `attr:<name>`.
    pub name: String,
    /// How the server interprets `value`.
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub value: Value,
}

impl Attribute {
    /// A free-text attribute.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with(name, AttributeType::Text, Value::String(value.into()))
    }

    /// A numeric attribute, comparable with `gt`/`lt` filters.
    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self::with(name, AttributeType::Number, Value::from(value))
    }

    /// A boolean attribute.
    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::with(name, AttributeType::Bool, Value::Bool(value))
    }

    /// A list of strings, matched with the `array_*` filters.
    pub fn list<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(|v| Value::String(v.into())).collect();
        Self::with(name, AttributeType::List, Value::Array(values))
    }

    /// An arbitrary JSON object.
    pub fn object(name: impl Into<String>, value: serde_json::Map<String, Value>) -> Self {
        Self::with(name, AttributeType::Object, Value::Object(value))
    }

    fn with(name: impl Into<String>, kind: AttributeType, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }
}

/// A note attached to a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub id: String,
    pub lead_id: String,
    pub content: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub(crate) struct NoteContent<'a> {
    pub content: &'a str,
}

#[derive(Serialize)]
pub(crate) struct BulkCreateRequest<'a> {
    pub leads: &'a [Lead],
}

/// Result of one bulk create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkCreateResult {
    /// Leads submitted.
    pub total: usize,
    /// Leads created.
    pub success: usize,
    /// Leads rejected.
    pub failed: usize,
    /// Created leads, keyed by their position in the submitted batch.
    pub created: Vec<BulkLeadResult>,
    /// Rejected leads, keyed by their position in the submitted batch.
    pub errors: Vec<BulkLeadError>,
}

/// A lead created by a bulk call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkLeadResult {
    /// Position of the lead in its batch.
    pub index: usize,
    /// Identifier assigned to the new lead.
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A lead rejected by a bulk call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkLeadError {
    /// Position of the lead in its batch.
    pub index: usize,
    /// Why the server rejected it.
    pub message: String,
}

/// Format of a lead export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_lead_omits_empty_fields() {
        let lead = Lead::new("Acme", "website");
        let json = serde_json::to_value(&lead).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Acme",
                "source": "website",
                "created_at": null,
                "updated_at": null,
            })
        );
    }

    #[test]
    fn test_lead_decodes_unix_timestamps() {
        let lead: Lead = serde_json::from_str(
            r#"{
                "id": "lead_1",
                "name": "Acme",
                "source": "maps",
                "rating": 4.5,
                "tags": ["b2b"],
                "attributes": [{"name": "verified", "type": "bool", "value": true}],
                "created_at": 1700000000,
                "updated_at": null
            }"#,
        )
        .unwrap();

        assert_eq!(lead.id, "lead_1");
        assert_eq!(lead.rating, Some(4.5));
        assert_eq!(lead.attributes, vec![Attribute::bool("verified", true)]);
        assert_eq!(
            lead.created_at,
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
        assert_eq!(lead.updated_at, None);
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let update = UpdateLead {
            city: Some("New York".into()),
            tags: Some(vec!["updated".into()]),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"city":"New York","tags":["updated"]}"#
        );
    }

    #[test]
    fn test_validate_for_create() {
        assert!(Lead::new("Acme", "web").validate_for_create().is_ok());
        assert_eq!(
            Lead::new("", "web").validate_for_create(),
            Err("name is required")
        );
        assert_eq!(
            Lead::new("Acme", "").validate_for_create(),
            Err("source is required")
        );
    }
}
