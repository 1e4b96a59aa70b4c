//! Test fixtures and helpers.
//!
//! Common setup code for registry tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use vres::{Registry, RegistryConfig};
use vres_core::ManualClock;
use vres_store::MemoryStore;

/// Start time for fixture clocks: 2025-01-01T00:00:00Z.
pub const FIXTURE_EPOCH_MS: i64 = 1_735_689_600_000;

/// A registry on a manual clock.
pub struct RegistryFixture {
    pub registry: Registry,
    pub clock: Arc<ManualClock>,
}

impl RegistryFixture {
    /// A fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// A fixture with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn with_config(config: RegistryConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_EPOCH_MS));
        let registry = Registry::new(MemoryStore::new(), config)
            .expect("fixture config must be valid")
            .with_clock(clock.clone());
        Self { registry, clock }
    }

    /// Move the fixture clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

impl Default for RegistryFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `{"type":"FeatureCollection","features":[]}`
pub fn empty_feature_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": []
    })
}

/// A feature collection with a single polygon spanning 100–110°W, 40–45°N.
pub fn embedded_polygon() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 1,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [-100.0, 40.0],
                        [-110.0, 40.0],
                        [-110.0, 45.0],
                        [-100.0, 45.0],
                        [-100.0, 40.0]
                    ]]
                },
                "properties": {
                    "prop0": "value0"
                }
            }
        ]
    })
}

/// A minimal KML document with one placemark.
pub fn sample_kml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Placemark>
    <name>Denver</name>
    <Point><coordinates>-104.991531,39.742043,0</coordinates></Point>
  </Placemark>
</kml>
"#
}

/// A node in a shared, possibly cyclic graph.
///
/// Serializes as `{"name": .., "children": [..]}` and fails with a
/// "circular reference" error when it reaches a node already on the current
/// path.
#[derive(Debug)]
pub struct GraphNode {
    pub name: String,
    pub children: RefCell<Vec<Rc<GraphNode>>>,
}

impl GraphNode {
    pub fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Add `child` under `parent`.
    pub fn link(parent: &Rc<Self>, child: &Rc<Self>) {
        parent.children.borrow_mut().push(Rc::clone(child));
    }

    /// Drop all outgoing edges so a cycle can be freed.
    pub fn unlink(&self) {
        self.children.borrow_mut().clear();
    }
}

impl Serialize for GraphNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let path = RefCell::new(Vec::new());
        NodeOnPath { node: self, path: &path }.serialize(serializer)
    }
}

struct NodeOnPath<'a> {
    node: &'a GraphNode,
    path: &'a RefCell<Vec<*const GraphNode>>,
}

impl Serialize for NodeOnPath<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ptr = self.node as *const GraphNode;
        if self.path.borrow().contains(&ptr) {
            return Err(S::Error::custom(format!(
                "circular reference at node {:?}",
                self.node.name
            )));
        }

        self.path.borrow_mut().push(ptr);
        let children = self.node.children.borrow();
        let result = (|| {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("name", &self.node.name)?;
            map.serialize_entry("children", &Children { nodes: &children, path: self.path })?;
            map.end()
        })();
        self.path.borrow_mut().pop();
        result
    }
}

struct Children<'a> {
    nodes: &'a [Rc<GraphNode>],
    path: &'a RefCell<Vec<*const GraphNode>>,
}

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.nodes.iter().map(|node| NodeOnPath {
            node,
            path: self.path,
        }))
    }
}

/// `a -> b -> a`. Call [`GraphNode::unlink`] on the result when done.
pub fn cyclic_graph() -> Rc<GraphNode> {
    let a = GraphNode::new("a");
    let b = GraphNode::new("b");
    GraphNode::link(&a, &b);
    GraphNode::link(&b, &a);
    a
}
