//! View dependency graph
//!
//! Nodes are generated classes (one per deduplicated view); an edge A -> B
//! means class A has an edge-kind field pointing at class B's data class.
//! Cycles (self-references and mutual references) are legitimate schema
//! shapes: adjacency is plain name-based, traversal never recurses through
//! live references, and consumers needing a strict order get a topological
//! sort that degrades to a stable by-name order inside cycles.
//!
//! The same adjacency, viewed undirected, partitions views into connected
//! components for mock-data generation.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::classify::ViewFields;
use crate::names::ApiClass;

/// Dependency graph over generated classes, keyed by data-class name
pub struct ViewGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
    classes: BTreeMap<String, ApiClass>,
    /// class -> set of classes it references via edge fields.
    /// Only classes with at least one dependency get an entry.
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl ViewGraph {
    /// Build the graph from every kept view's classified fields.
    ///
    /// Dependency targets are resolved back to canonical [`ApiClass`]
    /// entries through the name index; a target that refers to a view not
    /// in the kept set is dropped (it cannot be imported or generated).
    pub fn build(entries: &[(ApiClass, ViewFields)]) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        let mut classes = BTreeMap::new();

        for (api, _) in entries {
            let idx = graph.add_node(api.data_class.clone());
            indices.insert(api.data_class.clone(), idx);
            classes.insert(api.data_class.clone(), api.clone());
        }

        let mut dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (api, fields) in entries {
            for target in fields.unique_dependencies() {
                if !indices.contains_key(&target.class_name) {
                    tracing::debug!(
                        from = %api.data_class,
                        to = %target.class_name,
                        "dropping dependency on a view outside the kept set"
                    );
                    continue;
                }
                let inserted = dependencies
                    .entry(api.data_class.clone())
                    .or_default()
                    .insert(target.class_name.clone());
                if inserted {
                    graph.add_edge(
                        indices[&api.data_class],
                        indices[&target.class_name],
                        (),
                    );
                }
            }
        }

        Self {
            graph,
            indices,
            classes,
            dependencies,
        }
    }

    /// class -> classes it references via edge fields
    pub fn dependency_map(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.dependencies
    }

    pub fn api_class(&self, name: &str) -> Option<&ApiClass> {
        self.classes.get(name)
    }

    /// All classes, ordered by name
    pub fn classes(&self) -> impl Iterator<Item = &ApiClass> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Remove a class whose view failed to generate, together with every
    /// dependency entry that references it, so later init-file generation
    /// cannot dangle-reference it.
    pub fn remove_class(&mut self, name: &str) {
        if let Some(idx) = self.indices.remove(name) {
            // petgraph swaps the last node into the removed slot; rebuild
            // the index for whichever node moved.
            self.graph.remove_node(idx);
            for moved in self.graph.node_indices() {
                self.indices.insert(self.graph[moved].clone(), moved);
            }
        }
        self.classes.remove(name);
        self.dependencies.remove(name);
        for targets in self.dependencies.values_mut() {
            targets.remove(name);
        }
        self.dependencies.retain(|_, targets| !targets.is_empty());
    }

    /// Deterministic topological order: dependencies before dependents.
    ///
    /// Kahn's algorithm with a sorted ready set. When no node is ready
    /// (every remaining node sits in a cycle), the lexicographically
    /// smallest remaining node is emitted anyway; nodes inside a cycle
    /// end up in a stable by-name order while acyclic edges stay honored.
    pub fn topo_order(&self) -> Vec<String> {
        // Remaining dependency count per class, self-loops excluded
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for name in self.classes.keys() {
            pending.insert(name.as_str(), 0);
        }
        for (from, targets) in &self.dependencies {
            for to in targets {
                if from == to {
                    continue;
                }
                *pending.get_mut(from.as_str()).expect("known class") += 1;
                dependents.entry(to.as_str()).or_default().push(from.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::with_capacity(self.classes.len());
        let mut placed: HashSet<&str> = HashSet::new();

        while order.len() < self.classes.len() {
            let next = match ready.iter().next().copied() {
                Some(name) => {
                    ready.remove(name);
                    name
                }
                // Cycle: stable fallback by name
                None => match pending
                    .iter()
                    .filter(|(name, _)| !placed.contains(*name))
                    .map(|(name, _)| *name)
                    .next()
                {
                    Some(name) => name,
                    None => break,
                },
            };
            if !placed.insert(next) {
                continue;
            }
            order.push(next.to_string());

            for dependent in dependents.get(next).into_iter().flatten() {
                if placed.contains(*dependent) {
                    continue;
                }
                let count = pending.get_mut(*dependent).expect("known class");
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }

        order
    }

    /// Connected components of the undirected view of the graph.
    ///
    /// Two classes that reference each other in either direction share a
    /// component. Members are sorted by name; components are ordered by
    /// their first member, so the partition is deterministic.
    pub fn connected_components(&self) -> Vec<Vec<String>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut components = Vec::new();

        // Iterate classes in name order for deterministic component order
        for name in self.classes.keys() {
            let Some(&start) = self.indices.get(name) else {
                continue;
            };
            if visited.contains(&start) {
                continue;
            }

            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            visited.insert(start);
            while let Some(idx) = queue.pop_front() {
                members.push(self.graph[idx].clone());
                for direction in [Direction::Outgoing, Direction::Incoming] {
                    for edge in self.graph.edges_directed(idx, direction) {
                        let next = match direction {
                            Direction::Outgoing => edge.target(),
                            Direction::Incoming => edge.source(),
                        };
                        if visited.insert(next) {
                            queue.push_back(next);
                        }
                    }
                }
            }
            members.sort();
            components.push(members);
        }

        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classifier, ViewFields};
    use crate::schema::{
        ContainerRef, MappedProperty, PrimitiveType, Property, PropertyType, View, ViewId,
    };
    use std::collections::BTreeMap;

    fn view(external_id: &str, relations: &[(&str, &str)]) -> View {
        let mut properties = BTreeMap::new();
        properties.insert(
            "name".to_string(),
            Property::Mapped(MappedProperty {
                container: ContainerRef {
                    space: "test".into(),
                    external_id: external_id.into(),
                },
                container_property_identifier: "name".into(),
                name: None,
                property_type: PropertyType::Primitive {
                    primitive: PrimitiveType::Text,
                    list: false,
                },
                nullable: false,
                default_value: None,
            }),
        );
        for (prop, target) in relations {
            properties.insert(
                prop.to_string(),
                Property::Mapped(MappedProperty {
                    container: ContainerRef {
                        space: "test".into(),
                        external_id: external_id.into(),
                    },
                    container_property_identifier: prop.to_string(),
                    name: None,
                    property_type: PropertyType::DirectRelation {
                        source: Some(ViewId::new("test", *target, "1")),
                    },
                    nullable: true,
                    default_value: None,
                }),
            );
        }
        View {
            id: ViewId::new("test", external_id, "1"),
            name: Some(external_id.to_string()),
            properties,
            used_for: None,
            implements: vec![],
            filter: None,
        }
    }

    fn build_graph(views: &[View]) -> ViewGraph {
        let classifier = Classifier::new(views);
        let entries: Vec<_> = views
            .iter()
            .map(|v| {
                (
                    ApiClass::from_name(v.display_name()),
                    ViewFields::from_view(&classifier, v).unwrap(),
                )
            })
            .collect();
        ViewGraph::build(&entries)
    }

    #[test]
    fn test_dependency_map() {
        let graph = build_graph(&[view("Person", &[]), view("Role", &[("person", "Person")])]);
        let deps = graph.dependency_map();
        assert_eq!(deps.len(), 1);
        assert!(deps["Role"].contains("Person"));
        assert!(!deps.contains_key("Person"));
    }

    #[test]
    fn test_topo_order_dependencies_first() {
        let graph = build_graph(&[
            view("Role", &[("person", "Person")]),
            view("Person", &[]),
            view("Assignment", &[("role", "Role")]),
        ]);
        let order = graph.topo_order();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(pos("Person") < pos("Role"));
        assert!(pos("Role") < pos("Assignment"));
    }

    #[test]
    fn test_self_reference_does_not_hang() {
        let graph = build_graph(&[view("Category", &[("parent", "Category")])]);
        let order = graph.topo_order();
        assert_eq!(order, vec!["Category".to_string()]);
    }

    #[test]
    fn test_cycle_falls_back_to_name_order() {
        let graph = build_graph(&[
            view("Zebra", &[("ally", "Aardvark")]),
            view("Aardvark", &[("rival", "Zebra")]),
        ]);
        let order = graph.topo_order();
        // Mutually cyclic: stable sort by class name
        assert_eq!(order, vec!["Aardvark".to_string(), "Zebra".to_string()]);
    }

    #[test]
    fn test_connected_components() {
        let graph = build_graph(&[
            view("Person", &[]),
            view("Role", &[("person", "Person")]),
            view("Island", &[]),
        ]);
        let components = graph.connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], vec!["Island".to_string()]);
        assert_eq!(
            components[1],
            vec!["Person".to_string(), "Role".to_string()]
        );
    }

    #[test]
    fn test_remove_class_scrubs_dependency_map() {
        let mut graph =
            build_graph(&[view("Person", &[]), view("Role", &[("person", "Person")])]);
        graph.remove_class("Person");
        assert!(graph.dependency_map().is_empty());
        assert!(graph.api_class("Person").is_none());
        assert_eq!(graph.len(), 1);
    }
}
