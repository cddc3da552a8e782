//! Minimal host scene
//!
//! An arena of nodes standing in for a game engine's object hierarchy. Each
//! node carries plain components and behaviours; behaviours are lifecycle
//! objects whose enable/disable transitions drive injection through a
//! [`LifecycleSwitch`].
//!
//! The node lock is never held while a behaviour is switched, so handlers and
//! factories triggered by the switch may query and mutate the scene.

use scenedi_domain::{
    ComponentLocator, DependencyKey, Error, Instance, LifecycleObject, ObjectRef, Result,
};
use scenedi_infrastructure::{EventBus, LifecycleSwitch};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Handle to a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<Instance>,
    behaviours: Vec<Arc<LifecycleSwitch>>,
    alive: bool,
}

/// Node hierarchy with components, bound to one event bus
pub struct Scene {
    bus: EventBus,
    nodes: RwLock<Vec<NodeData>>,
}

fn same_instance(a: &Instance, b: &Instance) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl Scene {
    /// Empty scene whose behaviours announce themselves on `bus`
    pub fn new(bus: &EventBus) -> Arc<Self> {
        Arc::new(Self {
            bus: bus.clone(),
            nodes: RwLock::new(Vec::new()),
        })
    }

    /// Bus behaviours are switched on
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Create an empty node, top-level when `parent` is `None`
    pub fn create_node<S: Into<String>>(&self, parent: Option<NodeId>, name: S) -> Result<NodeId> {
        let name = name.into();
        let mut nodes = self.write();
        if let Some(parent) = parent {
            Self::live_mut(&mut nodes, parent)?;
        }
        let id = NodeId(nodes.len());
        nodes.push(NodeData {
            name,
            parent,
            children: Vec::new(),
            components: Vec::new(),
            behaviours: Vec::new(),
            alive: true,
        });
        if let Some(parent) = parent {
            Self::live_mut(&mut nodes, parent)?.children.push(id);
        }
        trace!(node = %id, parent = ?parent, "Node created");
        Ok(id)
    }

    /// Create a node named after `T` holding a single component built by
    /// `build` from the new node's id
    pub fn create_scene_object<T, F>(
        &self,
        parent: Option<NodeId>,
        build: F,
    ) -> Result<(NodeId, Arc<T>)>
    where
        T: Send + Sync + 'static,
        F: FnOnce(NodeId) -> T,
    {
        let node = self.create_node(parent, DependencyKey::of::<T>().short_name())?;
        let component = Arc::new(build(node));
        self.add_component(node, Arc::clone(&component))?;
        Ok((node, component))
    }

    /// Attach a plain component
    pub fn add_component<T: Send + Sync + 'static>(
        &self,
        node: NodeId,
        component: Arc<T>,
    ) -> Result<()> {
        let mut nodes = self.write();
        Self::live_mut(&mut nodes, node)?
            .components
            .push(component as Instance);
        Ok(())
    }

    /// Attach a behaviour and enable it.
    ///
    /// Enabling emits the create event, so the behaviour is injected and
    /// filed into filters before this returns.
    pub fn add_behaviour<T: LifecycleObject>(
        &self,
        node: NodeId,
        behaviour: Arc<T>,
    ) -> Result<Arc<LifecycleSwitch>> {
        self.add_behaviour_with(node, behaviour, |switch| switch)
    }

    /// Like [`add_behaviour`](Self::add_behaviour), letting `configure`
    /// install enable/disable hooks first
    pub fn add_behaviour_with<T, F>(
        &self,
        node: NodeId,
        behaviour: Arc<T>,
        configure: F,
    ) -> Result<Arc<LifecycleSwitch>>
    where
        T: LifecycleObject,
        F: FnOnce(LifecycleSwitch) -> LifecycleSwitch,
    {
        let object: ObjectRef = behaviour.clone();
        let switch = Arc::new(configure(LifecycleSwitch::new(&self.bus, object)));
        {
            let mut nodes = self.write();
            let data = Self::live_mut(&mut nodes, node)?;
            data.components.push(behaviour as Instance);
            data.behaviours.push(Arc::clone(&switch));
        }
        switch.enable();
        Ok(switch)
    }

    /// Detach one component; a behaviour is disabled first.
    ///
    /// Returns whether the component was found on `node`.
    pub fn destroy_component(&self, node: NodeId, component: &Instance) -> bool {
        let switch = {
            let nodes = self.read();
            let Some(data) = nodes.get(node.0).filter(|data| data.alive) else {
                return false;
            };
            data.behaviours
                .iter()
                .find(|switch| same_instance(&switch.object().clone().into_any(), component))
                .cloned()
        };
        if let Some(switch) = &switch {
            switch.disable();
        }

        let mut nodes = self.write();
        let Some(data) = nodes.get_mut(node.0).filter(|data| data.alive) else {
            return false;
        };
        let before = data.components.len();
        data.components.retain(|existing| !same_instance(existing, component));
        if let Some(switch) = &switch {
            data.behaviours.retain(|existing| !Arc::ptr_eq(existing, switch));
        }
        let removed = data.components.len() != before;
        if removed {
            trace!(node = %node, "Component destroyed");
        }
        removed
    }

    /// Destroy `node` and its whole subtree.
    ///
    /// Every behaviour in the subtree is disabled before any node is
    /// removed. Returns the number of nodes destroyed.
    pub fn destroy_node(&self, node: NodeId) -> usize {
        let (subtree, switches) = {
            let nodes = self.read();
            if !nodes.get(node.0).is_some_and(|data| data.alive) {
                return 0;
            }
            let mut subtree = Vec::new();
            let mut pending = vec![node];
            while let Some(current) = pending.pop() {
                if let Some(data) = nodes.get(current.0).filter(|data| data.alive) {
                    subtree.push(current);
                    pending.extend(data.children.iter().rev().copied());
                }
            }
            let switches: Vec<Arc<LifecycleSwitch>> = subtree
                .iter()
                .flat_map(|id| nodes[id.0].behaviours.iter().cloned())
                .collect();
            (subtree, switches)
        };

        for switch in &switches {
            switch.disable();
        }

        let mut detached = Vec::new();
        let mut destroyed = 0;
        {
            let mut nodes = self.write();
            if let Some(parent) = nodes.get(node.0).and_then(|data| data.parent) {
                if let Some(parent) = nodes.get_mut(parent.0) {
                    parent.children.retain(|child| *child != node);
                }
            }
            for id in &subtree {
                if let Some(data) = nodes.get_mut(id.0).filter(|data| data.alive) {
                    data.alive = false;
                    data.children.clear();
                    detached.append(&mut data.components);
                    data.behaviours.clear();
                    destroyed += 1;
                }
            }
        }
        debug!(node = %node, destroyed, "Node destroyed");
        // Components may own resources that touch the scene when dropped.
        drop(detached);
        destroyed
    }

    /// Node carrying `object`, if it is attached as a behaviour
    pub fn node_of(&self, object: &ObjectRef) -> Option<NodeId> {
        self.node_of_component(&object.clone().into_any())
    }

    /// Node carrying `component`
    pub fn node_of_component(&self, component: &Instance) -> Option<NodeId> {
        self.read()
            .iter()
            .position(|data| {
                data.alive
                    && data
                        .components
                        .iter()
                        .any(|existing| same_instance(existing, component))
            })
            .map(NodeId)
    }

    /// First component of type `T` on `node` itself
    pub fn component<T: Send + Sync + 'static>(&self, node: NodeId) -> Option<Arc<T>> {
        self.read()
            .get(node.0)
            .filter(|data| data.alive)
            .and_then(Self::find_on::<T>)
    }

    /// Components attached to `node`, behaviours included
    pub fn component_count(&self, node: NodeId) -> usize {
        self.read()
            .get(node.0)
            .filter(|data| data.alive)
            .map_or(0, |data| data.components.len())
    }

    /// Whether `node` exists and was not destroyed
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.read().get(node.0).is_some_and(|data| data.alive)
    }

    /// Node name
    pub fn name(&self, node: NodeId) -> Option<String> {
        self.read()
            .get(node.0)
            .filter(|data| data.alive)
            .map(|data| data.name.clone())
    }

    /// Parent of `node`
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read()
            .get(node.0)
            .filter(|data| data.alive)
            .and_then(|data| data.parent)
    }

    /// Children of `node` in insertion order
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read()
            .get(node.0)
            .filter(|data| data.alive)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    /// Number of live nodes
    pub fn live_nodes(&self) -> usize {
        self.read().iter().filter(|data| data.alive).count()
    }

    fn find_on<T: Send + Sync + 'static>(data: &NodeData) -> Option<Arc<T>> {
        data.components
            .iter()
            .find_map(|component| Arc::clone(component).downcast::<T>().ok())
    }

    fn locate_from<T: Send + Sync + 'static>(
        nodes: &[NodeData],
        current: NodeId,
        predicate: Option<&dyn Fn(&NodeId) -> bool>,
    ) -> Option<Arc<T>> {
        let data = nodes.get(current.0).filter(|data| data.alive)?;
        if predicate.is_none_or(|accept| accept(&current)) {
            if let Some(found) = Self::find_on::<T>(data) {
                return Some(found);
            }
        }
        data.children
            .iter()
            .find_map(|child| Self::locate_from::<T>(nodes, *child, predicate))
    }

    fn live_mut(nodes: &mut [NodeData], node: NodeId) -> Result<&mut NodeData> {
        nodes
            .get_mut(node.0)
            .filter(|data| data.alive)
            .ok_or_else(|| Error::not_found(format!("scene node {node}")))
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<NodeData>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<NodeData>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ComponentLocator for Scene {
    type Node = NodeId;

    fn try_locate<T: Send + Sync + 'static>(
        &self,
        root: &NodeId,
        predicate: Option<&dyn Fn(&NodeId) -> bool>,
    ) -> Option<Arc<T>> {
        let nodes = self.read();
        Self::locate_from::<T>(&nodes, *root, predicate)
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("live_nodes", &self.live_nodes())
            .finish()
    }
}
