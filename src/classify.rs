//! Type Classification
//!
//! Maps each schema property to a [`Field`], the generator's internal
//! semantic unit. Classification is an exhaustive match over the closed
//! property sum type: mapped-primitive, mapped-direct-relation, or
//! single-hop connection. Everything else is a typed error, never a
//! silently degraded field.
//!
//! `is_edge` and `is_list` together pick exactly one of four shapes:
//! single value, list of values, single edge reference, list of edge
//! references. Downstream rendering rules key off that pairing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{GeneratorError, Result};
use crate::names::{pluralize, to_pascal_case, to_snake_case, ApiClass};
use crate::schema::{
    Direction, PrimitiveType, Property, PropertyType, View, ViewId,
};

// =============================================================================
// Field
// =============================================================================

/// Edge metadata present only on edge-kind fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeTarget {
    /// Target view's generated data-class name ("Person")
    pub class_name: String,
    /// Target view's write-class name ("PersonWrite")
    pub write_class: String,
    /// Target view's generated module stem ("person")
    pub file_name: String,
    /// Relation direction; only meaningful for one-to-many connections
    pub direction: Direction,
    /// Edge-API suffix, pluralized PascalCase of the property ("Persons").
    /// Present only on one-to-many connections.
    pub api_suffix: Option<String>,
    /// Edge-API attribute, pluralized snake_case of the property ("persons").
    /// Present only on one-to-many connections.
    pub api_attribute: Option<String>,
}

/// The classified form of one schema property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Generated variable name, snake_case
    pub name: String,
    /// The schema property name this field came from
    pub source_name: String,
    /// Read-side Python type
    pub read_type: String,
    /// Write-side Python type
    pub write_type: String,
    pub is_list: bool,
    pub is_nullable: bool,
    pub is_edge: bool,
    /// Default literal; `None` means required with no default
    pub default: Option<String>,
    /// Set if and only if `is_edge`
    pub edge: Option<EdgeTarget>,
    /// Underlying primitive kind for non-edge fields (mock generation keys
    /// off this); `None` for edge fields.
    pub primitive: Option<PrimitiveType>,
}

impl Field {
    /// One-to-one edge: a direct relation
    pub fn is_one_to_one_edge(&self) -> bool {
        self.is_edge && !self.is_list
    }

    /// One-to-many edge: a connection
    pub fn is_one_to_many_edge(&self) -> bool {
        self.is_edge && self.is_list
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Classifies properties against one schema snapshot.
///
/// The snapshot is needed only to resolve a direct relation or connection
/// target to its view's display name; edge class names are derived from
/// that name, falling back to the target's external id when the target
/// view is not part of the snapshot.
pub struct Classifier {
    view_names: BTreeMap<(String, String), String>,
}

impl Classifier {
    pub fn new(views: &[View]) -> Self {
        let view_names = views
            .iter()
            .map(|v| {
                (
                    (v.id.space.clone(), v.id.external_id.clone()),
                    v.display_name().to_string(),
                )
            })
            .collect();
        Self { view_names }
    }

    /// Classify one property into a [`Field`].
    ///
    /// A property without a declared display name resolves to its map key;
    /// `MissingName` fires only when both are empty.
    pub fn classify(&self, property_name: &str, property: &Property) -> Result<Field> {
        let name = property
            .display_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(property_name);
        if name.is_empty() {
            return Err(GeneratorError::MissingName(format!(
                "property key '{}'",
                property_name
            )));
        }

        match property {
            Property::Mapped(mapped) => match &mapped.property_type {
                PropertyType::Primitive { primitive, list } => self.classify_primitive(
                    name,
                    property_name,
                    *primitive,
                    *list,
                    mapped.nullable,
                    mapped.default_value.as_ref(),
                ),
                PropertyType::DirectRelation { source } => self.classify_direct_relation(
                    name,
                    property_name,
                    source.as_ref(),
                    mapped.nullable,
                ),
            },
            Property::Connection(conn) => self.classify_connection(name, property_name, conn),
            Property::Unknown(raw) => Err(GeneratorError::UnsupportedProperty {
                property: property_name.to_string(),
                reason: format!("unrecognized shape: {}", truncate_json(raw)),
            }),
        }
    }

    fn classify_primitive(
        &self,
        name: &str,
        property_name: &str,
        primitive: PrimitiveType,
        declared_list: bool,
        nullable: bool,
        default_value: Option<&serde_json::Value>,
    ) -> Result<Field> {
        let base = python_type(primitive).ok_or_else(|| GeneratorError::UnsupportedType {
            property: property_name.to_string(),
            type_name: primitive.as_str().to_string(),
        })?;

        let is_list = declared_list && primitive.is_listable();
        let read_type = decorate_type(base, is_list, nullable);

        let default = match default_value {
            Some(value) => Some(python_literal(value)),
            None if is_list => Some("[]".to_string()),
            None if nullable => Some("None".to_string()),
            None => None,
        };

        Ok(Field {
            name: to_snake_case(name),
            source_name: property_name.to_string(),
            write_type: read_type.clone(),
            read_type,
            is_list,
            is_nullable: nullable,
            is_edge: false,
            default,
            edge: None,
            primitive: Some(primitive),
        })
    }

    fn classify_direct_relation(
        &self,
        name: &str,
        property_name: &str,
        source: Option<&ViewId>,
        nullable: bool,
    ) -> Result<Field> {
        let Some(source) = source else {
            // An untyped direct relation is just an external-id reference
            return self.classify_primitive(
                name,
                property_name,
                PrimitiveType::Text,
                false,
                nullable,
                None,
            );
        };

        let target = self.target_api_class(source);
        // Readers get the identifier; writers may pass either a nested
        // write object or a bare identifier.
        let read_type = decorate_type("str", false, nullable);
        let write_type = decorate_type(
            &format!("Union[{}, str]", target.write_class()),
            false,
            nullable,
        );

        Ok(Field {
            name: to_snake_case(name),
            source_name: property_name.to_string(),
            read_type,
            write_type,
            is_list: false,
            is_nullable: nullable,
            is_edge: true,
            default: nullable.then(|| "None".to_string()),
            edge: Some(EdgeTarget {
                class_name: target.data_class.clone(),
                write_class: target.write_class(),
                file_name: target.file_name.clone(),
                direction: Direction::Outwards,
                api_suffix: None,
                api_attribute: None,
            }),
            primitive: None,
        })
    }

    fn classify_connection(
        &self,
        name: &str,
        property_name: &str,
        conn: &crate::schema::ConnectionProperty,
    ) -> Result<Field> {
        let target = self.target_api_class(&conn.source);
        let plural = pluralize(name);

        Ok(Field {
            name: to_snake_case(name),
            source_name: property_name.to_string(),
            read_type: "list[str]".to_string(),
            write_type: format!("list[Union[{}, str]]", target.write_class()),
            is_list: true,
            is_nullable: false,
            is_edge: true,
            default: Some("[]".to_string()),
            edge: Some(EdgeTarget {
                class_name: target.data_class.clone(),
                write_class: target.write_class(),
                file_name: target.file_name.clone(),
                direction: conn.direction,
                api_suffix: Some(to_pascal_case(&plural)),
                api_attribute: Some(to_snake_case(&plural)),
            }),
            primitive: None,
        })
    }

    fn target_api_class(&self, target: &ViewId) -> ApiClass {
        let name = self
            .view_names
            .get(&(target.space.clone(), target.external_id.clone()))
            .map(String::as_str)
            .unwrap_or(&target.external_id);
        ApiClass::from_name(name)
    }
}

// =============================================================================
// Fields of a View
// =============================================================================

/// The classified fields of one view, sorted by field name.
///
/// Immutable after construction; all projections are read-only views.
#[derive(Debug, Clone, Serialize)]
pub struct ViewFields {
    fields: Vec<Field>,
}

impl ViewFields {
    /// Classify every property of a view. Fails on the first property the
    /// classifier rejects; the caller decides whether that failure is
    /// per-view-recoverable.
    pub fn from_view(classifier: &Classifier, view: &View) -> Result<Self> {
        let mut fields = Vec::with_capacity(view.properties.len());
        for (prop_name, property) in &view.properties {
            fields.push(classifier.classify(prop_name, property)?);
        }
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { fields })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-edge fields
    pub fn primary(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_edge)
    }

    /// All edge-kind fields
    pub fn edges(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_edge)
    }

    /// Direct relations (single edge reference)
    pub fn one_to_one(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_one_to_one_edge())
    }

    /// Connections (list of edge references)
    pub fn one_to_many(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_one_to_many_edge())
    }

    /// Edge targets deduplicated by class name, first occurrence wins
    pub fn unique_dependencies(&self) -> Vec<&EdgeTarget> {
        let mut seen = std::collections::HashSet::new();
        self.fields
            .iter()
            .filter_map(|f| f.edge.as_ref())
            .filter(|e| seen.insert(e.class_name.clone()))
            .collect()
    }
}

// =============================================================================
// Type Mapping
// =============================================================================

/// The primitive mapping table. `None` marks a kind the generator does not
/// support; the classifier turns that into a fatal per-view error.
fn python_type(primitive: PrimitiveType) -> Option<&'static str> {
    match primitive {
        PrimitiveType::Int32 | PrimitiveType::Int64 => Some("int"),
        PrimitiveType::Boolean => Some("bool"),
        PrimitiveType::Float32 | PrimitiveType::Float64 => Some("float"),
        PrimitiveType::Date => Some("datetime.date"),
        PrimitiveType::Timestamp => Some("datetime.datetime"),
        PrimitiveType::Json => Some("dict"),
        PrimitiveType::Text
        | PrimitiveType::TimeSeriesRef
        | PrimitiveType::FileRef
        | PrimitiveType::SequenceRef => Some("str"),
        PrimitiveType::Unsupported => None,
    }
}

fn decorate_type(base: &str, is_list: bool, nullable: bool) -> String {
    let inner = if is_list {
        format!("list[{}]", base)
    } else {
        base.to_string()
    };
    if nullable && !is_list {
        format!("Optional[{}]", inner)
    } else {
        inner
    }
}

/// Render a JSON default as a Python literal
fn python_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => format!("{:?}", s),
        serde_json::Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", inner.join(", "))
        }
        serde_json::Value::Object(_) => value.to_string(),
    }
}

fn truncate_json(value: &serde_json::Value) -> String {
    let mut text = value.to_string();
    if text.len() > 120 {
        text.truncate(117);
        text.push_str("...");
    }
    text
}
