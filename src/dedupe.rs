//! View deduplication
//!
//! Computes a structural fingerprint per view and collapses views that are
//! structurally identical, so a snapshot carrying several versions of the
//! same view generates one class instead of one per version. The version
//! number is deliberately excluded from the fingerprint; the retained
//! instance is whichever occurrence came first in the input sequence.

use std::collections::HashSet;
use std::fmt;

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::schema::{Property, PropertyType, View};

/// SHA256 digest of a view's normalized structural document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a view.
    ///
    /// The normalized document contains the display name, external id, and
    /// for every property (sorted by property name) its classification-
    /// relevant fields only. `version`, `implements`, and `used_for` are
    /// excluded on purpose: two versions of the same logical view collapse.
    pub fn of_view(view: &View) -> Self {
        // BTreeMap iteration already sorts by property name
        let properties: Vec<serde_json::Value> = view
            .properties
            .iter()
            .map(|(name, property)| normalize_property(name, property))
            .collect();

        let document = json!({
            "name": view.display_name(),
            "external_id": view.id.external_id,
            "properties": properties,
        });

        Self::from_bytes(document.to_string().as_bytes())
    }

    /// Compute a fingerprint from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The classification-relevant projection of one property.
///
/// Unknown shapes are carried verbatim: two views broken in the same way
/// still dedupe together, and the classifier rejects them later either way.
fn normalize_property(name: &str, property: &Property) -> serde_json::Value {
    match property {
        Property::Mapped(mapped) => json!({
            "name": name,
            "container": [mapped.container.space, mapped.container.external_id],
            "container_property": mapped.container_property_identifier,
            "default": mapped.default_value,
            "nullable": mapped.nullable,
            "type": serialize_type(&mapped.property_type),
        }),
        Property::Connection(conn) => json!({
            "name": name,
            "direction": conn.direction,
            "type": [conn.edge_type.space, conn.edge_type.external_id],
            "source": [conn.source.space, conn.source.external_id],
        }),
        Property::Unknown(raw) => json!({
            "name": name,
            "unknown": raw,
        }),
    }
}

fn serialize_type(property_type: &PropertyType) -> serde_json::Value {
    match property_type {
        PropertyType::Primitive { primitive, list } => {
            json!({ "primitive": primitive.as_str(), "list": list })
        }
        PropertyType::DirectRelation { source } => json!({
            "direct_relation": source
                .as_ref()
                .map(|s| format!("{}:{}", s.space, s.external_id)),
        }),
    }
}

/// Collapse structurally identical views, order-preserving.
///
/// First occurrence wins for every distinct fingerprint. Idempotent:
/// `dedupe(dedupe(v)) == dedupe(v)`.
pub fn dedupe(views: Vec<View>) -> Vec<View> {
    let mut seen: HashSet<Fingerprint> = HashSet::new();
    let mut kept = Vec::with_capacity(views.len());

    for view in views {
        let fingerprint = Fingerprint::of_view(&view);
        if seen.insert(fingerprint) {
            kept.push(view);
        } else {
            tracing::debug!(view = %view.id, "dropping structurally duplicate view");
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContainerRef, MappedProperty, PrimitiveType, ViewId};
    use std::collections::BTreeMap;

    fn movie_view(version: &str) -> View {
        let mut properties = BTreeMap::new();
        properties.insert(
            "title".to_string(),
            Property::Mapped(MappedProperty {
                container: ContainerRef {
                    space: "films".into(),
                    external_id: "Movie".into(),
                },
                container_property_identifier: "title".into(),
                name: None,
                property_type: PropertyType::Primitive {
                    primitive: PrimitiveType::Text,
                    list: false,
                },
                nullable: false,
                default_value: None,
            }),
        );
        View {
            id: ViewId::new("films", "Movie", version),
            name: Some("Movie".into()),
            properties,
            used_for: None,
            implements: vec![],
            filter: None,
        }
    }

    #[test]
    fn test_versions_collapse() {
        let kept = dedupe(vec![movie_view("1"), movie_view("2")]);
        assert_eq!(kept.len(), 1);
        // First occurrence wins
        assert_eq!(kept[0].id.version, "1");
    }

    #[test]
    fn test_different_properties_do_not_collapse() {
        let mut changed = movie_view("2");
        if let Some(Property::Mapped(p)) = changed.properties.get_mut("title") {
            p.nullable = true;
        }
        let kept = dedupe(vec![movie_view("1"), changed]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_dedupe_idempotent() {
        let views = vec![movie_view("1"), movie_view("2"), movie_view("3")];
        let once = dedupe(views);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fingerprint_ignores_implements() {
        let mut derived = movie_view("1");
        derived.implements = vec![ViewId::new("films", "Media", "1")];
        assert_eq!(
            Fingerprint::of_view(&movie_view("1")),
            Fingerprint::of_view(&derived)
        );
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Fingerprint::of_view(&movie_view("1"));
        let b = Fingerprint::of_view(&movie_view("1"));
        assert_eq!(a, b);
    }
}
