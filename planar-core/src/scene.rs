//! Host-side interfaces: transforms, fields, and contact notification.
//!
//! The simulation does not own positions. The host's scene graph holds the
//! authoritative transform of every body's owner node; the world reads
//! them at the start of each step and writes the integrated results back
//! at the end. Fields likewise live in the host's graph and are
//! re-enumerated every step.

use hashbrown::HashMap;
use nalgebra::Point2;
use planar_contact::Contact;
use planar_field::Field;
use planar_types::{NodeId, Transform2};

use crate::world::World;

/// The scene-graph surface the world consumes.
pub trait SceneHost {
    /// The current transform of a node, or `None` if the node has left
    /// the scene. Bodies whose node has no transform are inert for the
    /// step: skipped in integration and collision.
    fn transform(&self, node: NodeId) -> Option<Transform2>;

    /// Write a body's integrated transform back to its node.
    fn set_transform(&mut self, node: NodeId, transform: Transform2);

    /// Visit every force field in the scene with its world origin.
    ///
    /// Ordering is up to the host; it only decides which exclusive field
    /// wins among ties. Fields are visited mutably so the world can
    /// advance their animation clocks.
    fn visit_fields(&mut self, visit: &mut dyn FnMut(&mut Field, Point2<f64>));
}

/// Receives contact begin/end events synchronously during
/// [`World::simulate`](crate::World::simulate).
///
/// The world detaches the delegate while firing, so callbacks get shared
/// access to the world for queries.
pub trait ContactDelegate {
    /// A pair passing the notify mask started touching this step.
    fn did_begin(&mut self, world: &World, contact: &Contact) {
        let _ = (world, contact);
    }

    /// A previously touching pair separated this step.
    fn did_end(&mut self, world: &World, contact: &Contact) {
        let _ = (world, contact);
    }
}

/// A minimal in-memory [`SceneHost`].
///
/// Real hosts adapt their own scene graphs; this one backs tests, tools,
/// and headless embeddings with a flat table of nodes and a field list.
///
/// # Example
///
/// ```
/// use planar_core::SimpleScene;
/// use planar_types::Transform2;
/// use nalgebra::Point2;
///
/// let mut scene = SimpleScene::new();
/// let node = scene.add_node(Transform2::from_position(Point2::new(0.0, 50.0)));
/// assert!(scene.node_transform(node).is_some());
/// ```
#[derive(Default)]
pub struct SimpleScene {
    transforms: HashMap<NodeId, Transform2>,
    fields: Vec<(Field, Point2<f64>)>,
    next_node: u64,
}

impl SimpleScene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its identifier.
    pub fn add_node(&mut self, transform: Transform2) -> NodeId {
        self.next_node += 1;
        let id = NodeId::new(self.next_node);
        self.transforms.insert(id, transform);
        id
    }

    /// Remove a node; bodies attached to it become inert.
    pub fn remove_node(&mut self, node: NodeId) {
        self.transforms.remove(&node);
    }

    /// Read a node's transform.
    #[must_use]
    pub fn node_transform(&self, node: NodeId) -> Option<Transform2> {
        self.transforms.get(&node).copied()
    }

    /// Overwrite a node's transform.
    pub fn set_node_transform(&mut self, node: NodeId, transform: Transform2) {
        self.transforms.insert(node, transform);
    }

    /// Add a field at a world origin; returns its index.
    pub fn add_field(&mut self, field: Field, origin: Point2<f64>) -> usize {
        self.fields.push((field, origin));
        self.fields.len() - 1
    }

    /// Mutable access to a field added earlier.
    pub fn field_mut(&mut self, index: usize) -> Option<&mut Field> {
        self.fields.get_mut(index).map(|(field, _)| field)
    }
}

impl SceneHost for SimpleScene {
    fn transform(&self, node: NodeId) -> Option<Transform2> {
        self.transforms.get(&node).copied()
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform2) {
        self.transforms.insert(node, transform);
    }

    fn visit_fields(&mut self, visit: &mut dyn FnMut(&mut Field, Point2<f64>)) {
        for (field, origin) in &mut self.fields {
            visit(field, *origin);
        }
    }
}
