//! Flexible resource references
//!
//! Depending on API version and detail level, fields that point at a
//! related resource (VPCs, subnets, gateways) arrive either as a bare ID
//! string or as a full `{"id": ..., "name": ...}` object. [`ResourceRef`]
//! decodes both shapes into one normalized struct and encodes back to the
//! minimal form that round-trips the input.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A reference to a related resource, by ID and optionally by name
///
/// `id` is always populated when the source value was non-null; `name` is
/// populated only when the API returned the object form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceRef {
    pub id: String,
    pub name: Option<String>,
}

impl ResourceRef {
    /// Reference by bare ID, as the API returns in non-detailed listings
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Reference with both ID and display name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Permissively decode a reference from an untyped JSON value.
    ///
    /// Returns `None` for values that are neither a string nor an object,
    /// letting callers drop malformed list elements instead of failing the
    /// whole record.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(Self::from_id(id.clone())),
            Value::Object(map) => {
                let mut reference = Self::default();
                if let Some(id) = map.get("id").and_then(Value::as_str) {
                    reference.id = id.to_string();
                }
                if let Some(name) = map.get("name").and_then(Value::as_str) {
                    reference.name = Some(name.to_string());
                }
                Some(reference)
            }
            _ => None,
        }
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Bare-ID inputs round-trip as bare strings
        if self.name.is_none() && !self.id.is_empty() {
            return serializer.serialize_str(&self.id);
        }

        let mut map = serializer.serialize_map(None)?;
        if !self.id.is_empty() {
            map.serialize_entry("id", &self.id)?;
        }
        if let Some(name) = &self.name {
            map.serialize_entry("name", name)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResourceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(id) => Ok(Self::from_id(id)),
            Value::Object(map) => {
                // Absent fields stay unset rather than failing the decode
                let mut reference = Self::default();
                if let Some(id) = map.get("id").and_then(Value::as_str) {
                    reference.id = id.to_string();
                }
                if let Some(name) = map.get("name").and_then(Value::as_str) {
                    reference.name = Some(name.to_string());
                }
                Ok(reference)
            }
            other => Err(D::Error::custom(format!(
                "resource reference must be a string or an object, got {other}"
            ))),
        }
    }
}

/// Project a reference list into its IDs
pub fn ref_ids(refs: &[ResourceRef]) -> Vec<String> {
    refs.iter().map(|r| r.id.clone()).collect()
}

/// Project a reference list into its names, skipping references that only
/// carried an ID
pub fn ref_names(refs: &[ResourceRef]) -> Vec<String> {
    refs.iter().filter_map(|r| r.name.clone()).collect()
}
