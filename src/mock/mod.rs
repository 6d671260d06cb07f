//! Mock-data generation
//!
//! Synthesizes a batch of fake instances for a set of views: nodes with
//! plausible property values, edges wiring related nodes together, and
//! out-of-band resources for external-reference values. The whole batch
//! is a pure function of the input views, the configuration, and the
//! seed; a rerun with the same three reproduces it byte for byte.
//!
//! Unlike SDK generation, mock generation has no per-view skip policy.
//! Any classification or value-generator failure aborts the batch, since
//! a partial batch with dangling relation targets is worse than none.

pub mod external_id;
pub mod values;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::classify::{Classifier, Field, ViewFields};
use crate::config::MockDefaults;
use crate::dedupe::dedupe;
use crate::error::Result;
use crate::graph::ViewGraph;
use crate::names::ApiClass;
use crate::schema::{Direction, EdgeTypeRef, PrimitiveType, Property, View, ViewId};

pub use external_id::{ExternalIdFactory, IdStrategy};
pub use values::ValueRegistry;

// =============================================================================
// Output types
// =============================================================================

/// Kind of out-of-band resource referenced by a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    TimeSeries,
    File,
    Sequence,
}

impl ResourceKind {
    fn of(primitive: PrimitiveType) -> Option<Self> {
        match primitive {
            PrimitiveType::TimeSeriesRef => Some(Self::TimeSeries),
            PrimitiveType::FileRef => Some(Self::File),
            PrimitiveType::SequenceRef => Some(Self::Sequence),
            _ => None,
        }
    }
}

/// A resource a node property points at, emitted alongside the nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockResource {
    pub kind: ResourceKind,
    pub external_id: String,
}

/// One synthesized instance of a view
#[derive(Debug, Clone, Serialize)]
pub struct MockNode {
    pub view: ViewId,
    pub external_id: String,
    /// Values keyed by schema property name. One-to-one relation targets
    /// appear here; one-to-many relations only appear as edges.
    pub properties: BTreeMap<String, Value>,
}

/// One synthesized edge between two nodes
#[derive(Debug, Clone, Serialize)]
pub struct MockEdge {
    pub external_id: String,
    pub edge_type: EdgeTypeRef,
    pub start_node: String,
    pub end_node: String,
}

/// A complete synthesized batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct MockData {
    pub nodes: Vec<MockNode>,
    pub edges: Vec<MockEdge>,
    pub resources: Vec<MockResource>,
}

impl MockData {
    /// Nodes belonging to the named view
    pub fn nodes_for<'a>(
        &'a self,
        view_external_id: &'a str,
    ) -> impl Iterator<Item = &'a MockNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.view.external_id == view_external_id)
    }
}

// =============================================================================
// MockGenerator
// =============================================================================

/// Seeded mock-instance synthesizer
pub struct MockGenerator {
    config: MockDefaults,
    registry: ValueRegistry,
    factory: ExternalIdFactory,
}

impl MockGenerator {
    pub fn new(config: MockDefaults) -> Self {
        Self {
            config,
            registry: ValueRegistry::with_defaults(),
            factory: ExternalIdFactory::default(),
        }
    }

    /// Swap in a custom value registry
    pub fn with_registry(mut self, registry: ValueRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Swap in a custom id factory
    pub fn with_factory(mut self, factory: ExternalIdFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Synthesize one batch for the given views.
    ///
    /// Views are deduplicated and sorted first, then partitioned into
    /// relation-connected components. Each component runs in two passes:
    /// all of its nodes are synthesized before any relation is wired, so
    /// every relation has a full target pool to draw from.
    pub fn generate(&mut self, views: &[View]) -> Result<MockData> {
        let views = {
            let mut v = dedupe(views.to_vec());
            v.sort_by(|a, b| {
                a.id.external_id
                    .cmp(&b.id.external_id)
                    .then_with(|| a.id.version.cmp(&b.id.version))
            });
            v
        };

        let classifier = Classifier::new(&views);
        let mut entries: BTreeMap<String, (ApiClass, ViewFields, View)> = BTreeMap::new();
        for view in &views {
            let api = ApiClass::from_name(view.display_name());
            let fields = ViewFields::from_view(&classifier, view)?;
            entries.insert(api.data_class.clone(), (api, fields, view.clone()));
        }

        let graph = ViewGraph::build(
            &entries
                .values()
                .map(|(api, fields, _)| (api.clone(), fields.clone()))
                .collect::<Vec<_>>(),
        );

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut data = MockData::default();

        for component in graph.connected_components() {
            self.generate_component(&component, &entries, &mut rng, &mut data)?;
        }

        debug!(
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            resources = data.resources.len(),
            "synthesized mock batch"
        );
        Ok(data)
    }

    fn generate_component(
        &mut self,
        component: &[String],
        entries: &BTreeMap<String, (ApiClass, ViewFields, View)>,
        rng: &mut StdRng,
        data: &mut MockData,
    ) -> Result<()> {
        let n = self.config.node_count;

        // Pass 1: nodes. Pool of external ids per class for the edge pass.
        let mut pools: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut first_index: BTreeMap<String, usize> = BTreeMap::new();

        for class_name in component {
            let (api, fields, view) = &entries[class_name];
            first_index.insert(class_name.clone(), data.nodes.len());

            let mut columns: BTreeMap<String, Vec<Value>> = BTreeMap::new();
            for field in fields.primary() {
                columns.insert(
                    field.source_name.clone(),
                    self.column(rng, field, n, data)?,
                );
            }

            let mut ids = Vec::with_capacity(n);
            for row in 0..n {
                let content = json!({
                    "view": view.id.to_string(),
                    "index": row,
                });
                let external_id = self.factory.make_id(rng, &api.file_name, &content);
                let properties = columns
                    .iter()
                    .map(|(name, col)| (name.clone(), col[row].clone()))
                    .collect();
                ids.push(external_id.clone());
                data.nodes.push(MockNode {
                    view: view.id.clone(),
                    external_id,
                    properties,
                });
            }
            pools.insert(class_name.clone(), ids);
        }

        // Pass 2: relations, now that every target pool is populated.
        for class_name in component {
            let (_, fields, view) = &entries[class_name];
            let start = first_index[class_name];

            for row in 0..n {
                let node_index = start + row;

                for field in fields.one_to_one() {
                    let target = self.pick_one(rng, field, &pools);
                    let node = &mut data.nodes[node_index];
                    node.properties.insert(field.source_name.clone(), target);
                }

                for field in fields.one_to_many() {
                    let Some((edge_type, direction)) = connection_of(view, field) else {
                        continue;
                    };
                    let Some(pool) = field
                        .edge
                        .as_ref()
                        .and_then(|e| pools.get(&e.class_name))
                    else {
                        debug!(field = %field.name, "relation target outside batch, skipping");
                        continue;
                    };
                    let node_id = data.nodes[node_index].external_id.clone();
                    let targets = self.pick_many(rng, pool);
                    for (k, target) in targets.into_iter().enumerate() {
                        let (start_node, end_node) = match direction {
                            Direction::Outwards => (node_id.clone(), target),
                            Direction::Inwards => (target, node_id.clone()),
                        };
                        data.edges.push(MockEdge {
                            external_id: format!("{}:{}:{}", node_id, field.name, k),
                            edge_type: edge_type.clone(),
                            start_node,
                            end_node,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Synthesize one column of `n` values for a primary field.
    ///
    /// Nulls replace exactly `round(n * null_fraction)` values of a
    /// nullable column, at shuffled positions. List-valued fields get an
    /// independently sized list of 0 to 5 elements per row.
    fn column(
        &mut self,
        rng: &mut StdRng,
        field: &Field,
        n: usize,
        data: &mut MockData,
    ) -> Result<Vec<Value>> {
        let primitive = field
            .primitive
            .unwrap_or(PrimitiveType::Text);

        let mut column = Vec::with_capacity(n);
        for _ in 0..n {
            let value = if field.is_list {
                let len = rng.gen_range(0..=5);
                let items = (0..len)
                    .map(|_| self.one_value(rng, field, primitive, data))
                    .collect::<Result<Vec<_>>>()?;
                Value::Array(items)
            } else {
                self.one_value(rng, field, primitive, data)?
            };
            column.push(value);
        }

        if field.is_nullable {
            let null_count =
                ((n as f64 * self.config.null_fraction).round() as usize).min(n);
            let mut positions: Vec<usize> = (0..n).collect();
            positions.shuffle(rng);
            for &pos in positions.iter().take(null_count) {
                column[pos] = Value::Null;
            }
        }

        Ok(column)
    }

    fn one_value(
        &mut self,
        rng: &mut StdRng,
        field: &Field,
        primitive: PrimitiveType,
        data: &mut MockData,
    ) -> Result<Value> {
        let value = self.registry.value(rng, &field.source_name, primitive)?;
        if let (Some(kind), Some(id)) = (ResourceKind::of(primitive), value.as_str()) {
            data.resources.push(MockResource {
                kind,
                external_id: id.to_string(),
            });
        }
        Ok(value)
    }

    /// One-to-one relation value: one target id, or null when the field
    /// is nullable and the null roll lands.
    fn pick_one(
        &mut self,
        rng: &mut StdRng,
        field: &Field,
        pools: &BTreeMap<String, Vec<String>>,
    ) -> Value {
        if field.is_nullable && rng.gen_bool(self.config.null_fraction.clamp(0.0, 1.0)) {
            return Value::Null;
        }
        let pool = field
            .edge
            .as_ref()
            .and_then(|e| pools.get(&e.class_name))
            .filter(|p| !p.is_empty());
        match pool {
            Some(pool) => {
                let idx = rng.gen_range(0..pool.len());
                json!(pool[idx])
            }
            None => Value::Null,
        }
    }

    /// One-to-many targets for a single node. Draws 0 to `max_edge_count`
    /// targets; without edge reuse the draw is a sample without
    /// replacement, capped by the pool size.
    fn pick_many(&mut self, rng: &mut StdRng, pool: &[String]) -> Vec<String> {
        if pool.is_empty() {
            return Vec::new();
        }
        let wanted = rng.gen_range(0..=self.config.max_edge_count);
        if self.config.allow_edge_reuse {
            (0..wanted)
                .map(|_| pool[rng.gen_range(0..pool.len())].clone())
                .collect()
        } else {
            let count = wanted.min(pool.len());
            let mut indices: Vec<usize> = (0..pool.len()).collect();
            indices.shuffle(rng);
            let mut chosen: Vec<String> =
                indices[..count].iter().map(|&i| pool[i].clone()).collect();
            chosen.sort();
            chosen
        }
    }
}

/// Look up the schema connection a one-to-many field came from, for its
/// edge type and direction.
fn connection_of<'a>(view: &'a View, field: &Field) -> Option<(&'a EdgeTypeRef, Direction)> {
    match view.properties.get(&field.source_name) {
        Some(Property::Connection(c)) => Some((&c.edge_type, c.direction)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContainerRef, MappedProperty, PropertyType};

    fn mapped(primitive: PrimitiveType, nullable: bool) -> Property {
        Property::Mapped(MappedProperty {
            container: ContainerRef {
                space: "core".to_string(),
                external_id: "Container".to_string(),
            },
            container_property_identifier: "p".to_string(),
            name: None,
            property_type: PropertyType::Primitive {
                primitive,
                list: false,
            },
            nullable,
            default_value: None,
        })
    }

    fn person_view() -> View {
        let mut properties = BTreeMap::new();
        properties.insert("name".to_string(), mapped(PrimitiveType::Text, false));
        properties.insert("birthYear".to_string(), mapped(PrimitiveType::Int32, true));
        View {
            id: ViewId::new("imdb", "Person", "1"),
            name: Some("Person".to_string()),
            properties,
            used_for: None,
            implements: vec![],
            filter: None,
        }
    }

    fn role_view() -> View {
        let mut properties = BTreeMap::new();
        properties.insert("wonOscar".to_string(), mapped(PrimitiveType::Boolean, true));
        properties.insert(
            "person".to_string(),
            Property::Mapped(MappedProperty {
                container: ContainerRef {
                    space: "core".to_string(),
                    external_id: "Role".to_string(),
                },
                container_property_identifier: "person".to_string(),
                name: None,
                property_type: PropertyType::DirectRelation {
                    source: Some(ViewId::new("imdb", "Person", "1")),
                },
                nullable: false,
                default_value: None,
            }),
        );
        View {
            id: ViewId::new("imdb", "Role", "1"),
            name: Some("Role".to_string()),
            properties,
            used_for: None,
            implements: vec![],
            filter: None,
        }
    }

    fn config(seed: u64) -> MockDefaults {
        MockDefaults {
            node_count: 5,
            max_edge_count: 3,
            null_fraction: 0.0,
            allow_edge_reuse: false,
            seed,
        }
    }

    #[test]
    fn test_node_count_per_view() {
        let views = vec![person_view(), role_view()];
        let data = MockGenerator::new(config(1)).generate(&views).unwrap();
        assert_eq!(data.nodes_for("Person").count(), 5);
        assert_eq!(data.nodes_for("Role").count(), 5);
    }

    #[test]
    fn test_zero_null_fraction_leaves_no_nulls() {
        let views = vec![person_view(), role_view()];
        let data = MockGenerator::new(config(3)).generate(&views).unwrap();
        for node in &data.nodes {
            for (name, value) in &node.properties {
                assert!(!value.is_null(), "{} of {} is null", name, node.external_id);
            }
        }
    }

    #[test]
    fn test_null_count_is_rounded_fraction() {
        let mut cfg = config(5);
        cfg.null_fraction = 0.4;
        let data = MockGenerator::new(cfg)
            .generate(&[person_view()])
            .unwrap();
        let nulls = data
            .nodes_for("Person")
            .filter(|n| n.properties["birthYear"].is_null())
            .count();
        // round(5 * 0.4) = 2
        assert_eq!(nulls, 2);
        // non-nullable column untouched
        assert!(data
            .nodes_for("Person")
            .all(|n| !n.properties["name"].is_null()));
    }

    #[test]
    fn test_direct_relation_points_at_existing_node() {
        let views = vec![person_view(), role_view()];
        let data = MockGenerator::new(config(7)).generate(&views).unwrap();
        let person_ids: Vec<&str> = data
            .nodes_for("Person")
            .map(|n| n.external_id.as_str())
            .collect();
        for role in data.nodes_for("Role") {
            let target = role.properties["person"].as_str().unwrap();
            assert!(person_ids.contains(&target));
        }
    }

    #[test]
    fn test_same_seed_reproduces_batch() {
        let views = vec![person_view(), role_view()];
        let a = MockGenerator::new(config(42)).generate(&views).unwrap();
        let b = MockGenerator::new(config(42)).generate(&views).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_external_reference_emits_resource() {
        let mut view = person_view();
        view.properties.insert(
            "headshot".to_string(),
            mapped(PrimitiveType::FileRef, false),
        );
        let data = MockGenerator::new(config(9)).generate(&[view]).unwrap();
        assert_eq!(data.resources.len(), 5);
        assert!(data
            .resources
            .iter()
            .all(|r| r.kind == ResourceKind::File));
        for node in data.nodes_for("Person") {
            let id = node.properties["headshot"].as_str().unwrap();
            assert!(data.resources.iter().any(|r| r.external_id == id));
        }
    }

    fn movie_view(direction: Direction) -> View {
        let mut properties = BTreeMap::new();
        properties.insert("title".to_string(), mapped(PrimitiveType::Text, false));
        properties.insert(
            "actors".to_string(),
            Property::Connection(crate::schema::ConnectionProperty {
                name: Some("actors".to_string()),
                source: ViewId::new("imdb", "Person", "1"),
                direction,
                edge_type: EdgeTypeRef {
                    space: "imdb".to_string(),
                    external_id: "Movie.actors".to_string(),
                },
            }),
        );
        View {
            id: ViewId::new("imdb", "Movie", "1"),
            name: Some("Movie".to_string()),
            properties,
            used_for: None,
            implements: vec![],
            filter: None,
        }
    }

    #[test]
    fn test_connection_synthesizes_edges() {
        let views = vec![person_view(), movie_view(Direction::Outwards)];
        let data = MockGenerator::new(config(13)).generate(&views).unwrap();

        let person_ids: Vec<&str> = data
            .nodes_for("Person")
            .map(|n| n.external_id.as_str())
            .collect();
        let movie_ids: Vec<&str> = data
            .nodes_for("Movie")
            .map(|n| n.external_id.as_str())
            .collect();

        for edge in &data.edges {
            assert_eq!(edge.edge_type.external_id, "Movie.actors");
            assert!(movie_ids.contains(&edge.start_node.as_str()));
            assert!(person_ids.contains(&edge.end_node.as_str()));
        }
        // at most max_edge_count edges per movie node
        for movie in &movie_ids {
            let count = data
                .edges
                .iter()
                .filter(|e| e.start_node == **movie)
                .count();
            assert!(count <= 3);
        }
    }

    #[test]
    fn test_inwards_connection_swaps_endpoints() {
        let mut cfg = config(13);
        cfg.node_count = 20;
        let views = vec![person_view(), movie_view(Direction::Inwards)];
        let data = MockGenerator::new(cfg).generate(&views).unwrap();
        let movie_ids: Vec<&str> = data
            .nodes_for("Movie")
            .map(|n| n.external_id.as_str())
            .collect();
        assert!(!data.edges.is_empty());
        for edge in &data.edges {
            assert!(movie_ids.contains(&edge.end_node.as_str()));
        }
    }

    #[test]
    fn test_edge_sampling_pool_equals_max() {
        // pool size == max_edge_count without reuse uses each candidate
        // at most once
        let mut cfg = config(17);
        cfg.node_count = 3;
        cfg.max_edge_count = 3;
        let views = vec![person_view(), movie_view(Direction::Outwards)];
        let data = MockGenerator::new(cfg).generate(&views).unwrap();

        let movie_ids: Vec<String> = data
            .nodes_for("Movie")
            .map(|n| n.external_id.clone())
            .collect();
        for movie in &movie_ids {
            let mut targets: Vec<&str> = data
                .edges
                .iter()
                .filter(|e| &e.start_node == movie)
                .map(|e| e.end_node.as_str())
                .collect();
            let before = targets.len();
            targets.sort();
            targets.dedup();
            assert_eq!(before, targets.len(), "duplicate target for {}", movie);
            assert!(before <= 3);
        }
    }

    #[test]
    fn test_missing_generator_aborts_batch() {
        let views = vec![person_view()];
        let err = MockGenerator::new(config(1))
            .with_registry(ValueRegistry::empty())
            .generate(&views)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::GeneratorError::MissingValueGenerator { .. }
        ));
    }
}
