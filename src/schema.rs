//! Schema snapshot types
//!
//! The wire shapes of a data-model snapshot: views, their properties, and
//! the closed set of primitive types. Every property deserializes into
//! exactly one of three shapes (mapped-primitive, mapped-direct-relation,
//! single-hop connection); anything else lands in a catch-all variant that
//! classification rejects with a typed error instead of a crash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Globally unique identifier of a view within one schema snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId {
    pub space: String,
    pub external_id: String,
    pub version: String,
}

impl ViewId {
    pub fn new(
        space: impl Into<String>,
        external_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            space: space.into(),
            external_id: external_id.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.space, self.external_id, self.version)
    }
}

/// Reference to a storage container (space + external id, no version)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub space: String,
    pub external_id: String,
}

/// Relation-type identifier for edge-backed connections
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeTypeRef {
    pub space: String,
    pub external_id: String,
}

/// What a view is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsedFor {
    Node,
    Edge,
    All,
}

/// Direction of an edge-backed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outwards,
    Inwards,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Outwards
    }
}

/// Closed set of primitive property types.
///
/// The `Unsupported` arm catches any type string the generator does not
/// know; the classifier turns it into an `UnsupportedType` error rather
/// than silently coercing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Text,
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Date,
    Timestamp,
    Json,
    #[serde(rename = "timeseries")]
    TimeSeriesRef,
    #[serde(rename = "file")]
    FileRef,
    #[serde(rename = "sequence")]
    SequenceRef,
    #[serde(other)]
    Unsupported,
}

impl PrimitiveType {
    /// The three external-reference kinds spawn out-of-band resources in
    /// mock generation.
    pub fn is_external_reference(&self) -> bool {
        matches!(
            self,
            Self::TimeSeriesRef | Self::FileRef | Self::SequenceRef
        )
    }

    /// Kinds that may legally carry a list flag.
    pub fn is_listable(&self) -> bool {
        !matches!(self, Self::Json | Self::Unsupported)
    }

    /// Canonical name used in serialized fingerprints and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
            Self::TimeSeriesRef => "timeseries",
            Self::FileRef => "file",
            Self::SequenceRef => "sequence",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Declared type of a mapped property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyType {
    /// A concrete primitive, optionally list-valued
    Primitive {
        #[serde(rename = "type")]
        primitive: PrimitiveType,
        #[serde(default)]
        list: bool,
    },
    /// A one-to-one reference to another view's instance
    DirectRelation {
        /// The view the relation points at. Absent when the schema leaves
        /// the target untyped; such relations classify as bare strings.
        #[serde(default)]
        source: Option<ViewId>,
    },
}

/// A property backed by concrete storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedProperty {
    pub container: ContainerRef,
    pub container_property_identifier: String,
    /// Display name; falls back to the property key when absent
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
}

/// A single-hop, edge-backed one-to-many relation to another view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProperty {
    #[serde(default)]
    pub name: Option<String>,
    /// The view on the other side of the edge
    pub source: ViewId,
    #[serde(default)]
    pub direction: Direction,
    #[serde(rename = "type")]
    pub edge_type: EdgeTypeRef,
}

/// One property of a view: exactly one of the two recognized shapes,
/// or a catch-all the classifier rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Connection(ConnectionProperty),
    Mapped(MappedProperty),
    Unknown(serde_json::Value),
}

impl Property {
    /// Display name declared in the schema, if any
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Property::Mapped(p) => p.name.as_deref(),
            Property::Connection(p) => p.name.as_deref(),
            Property::Unknown(_) => None,
        }
    }
}

/// A named, versioned schema unit describing one generated class's shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    #[serde(flatten)]
    pub id: ViewId,
    /// Display name; external id is used when absent
    #[serde(default)]
    pub name: Option<String>,
    /// Properties keyed by name; BTreeMap keeps them ordered and unique
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    #[serde(default)]
    pub used_for: Option<UsedFor>,
    /// Parent views this view extends
    #[serde(default)]
    pub implements: Vec<ViewId>,
    /// Optional node-type filter, carried opaquely
    #[serde(default)]
    pub filter: Option<serde_json::Value>,
}

impl View {
    /// Display name with the external-id fallback
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id.external_id)
    }
}

/// A full data-model snapshot: an identified set of views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataModel {
    pub space: String,
    pub external_id: String,
    pub version: String,
    #[serde(default)]
    pub views: Vec<View>,
}

impl DataModel {
    pub fn identifier(&self) -> String {
        format!("{}:{}/{}", self.space, self.external_id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_type_parsing() {
        let ty: PrimitiveType = serde_json::from_str("\"int64\"").unwrap();
        assert_eq!(ty, PrimitiveType::Int64);

        let ty: PrimitiveType = serde_json::from_str("\"timeseries\"").unwrap();
        assert_eq!(ty, PrimitiveType::TimeSeriesRef);
        assert!(ty.is_external_reference());

        // Unknown strings land in the catch-all, never an error here
        let ty: PrimitiveType = serde_json::from_str("\"geometry\"").unwrap();
        assert_eq!(ty, PrimitiveType::Unsupported);
    }

    #[test]
    fn test_property_untagged_shapes() {
        let mapped: Property = serde_json::from_value(serde_json::json!({
            "container": {"space": "core", "external_id": "Person"},
            "container_property_identifier": "name",
            "type": {"kind": "primitive", "type": "text"},
            "nullable": false
        }))
        .unwrap();
        assert!(matches!(mapped, Property::Mapped(_)));

        let conn: Property = serde_json::from_value(serde_json::json!({
            "source": {"space": "core", "external_id": "Person", "version": "1"},
            "direction": "outwards",
            "type": {"space": "core", "external_id": "Role.person"}
        }))
        .unwrap();
        assert!(matches!(conn, Property::Connection(_)));

        let junk: Property =
            serde_json::from_value(serde_json::json!({"whatever": true})).unwrap();
        assert!(matches!(junk, Property::Unknown(_)));
    }

    #[test]
    fn test_view_display_name_fallback() {
        let view = View {
            id: ViewId::new("core", "WindTurbine", "1"),
            name: None,
            properties: BTreeMap::new(),
            used_for: None,
            implements: vec![],
            filter: None,
        };
        assert_eq!(view.display_name(), "WindTurbine");
    }
}
