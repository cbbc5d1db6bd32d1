//! The graph-store boundary and an in-memory implementation of it.
//!
//! The tree projection only ever talks to a store through [`GraphStore`]:
//! ordered children of a node, ordered values of a (node, predicate) pair,
//! and a change feed.  [`MemoryGraph`] is an insertion-ordered triple table
//! that satisfies the trait for the terminal front-end and for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::error::StoreError;
use super::term::{vocab, Resource, Value};

/// Shared, single-threaded handle to a store.  The host keeps one clone to
/// mutate the graph; each projection keeps another to read it.
pub type SharedGraph<S> = Rc<RefCell<S>>;

/// Observer registered through [`GraphStore::notify_on_change`].  Returning
/// `false` unsubscribes it.
pub type ChangeCallback = Box<dyn FnMut(&GraphChange) -> bool>;

// ───────────────────────────────────────── triples ───────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Resource,
    pub predicate: Resource,
    pub object: Value,
}

impl Triple {
    pub fn new(subject: Resource, predicate: Resource, object: impl Into<Value>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

/// A mutation reported to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphChange {
    Asserted { triple: Triple, structural: bool },
    Retracted { triple: Triple, structural: bool },
    /// The store was torn down.
    Closed,
}

impl GraphChange {
    /// Whether the change can alter any node's children.
    pub fn affects_structure(&self) -> bool {
        match self {
            GraphChange::Asserted { structural, .. } | GraphChange::Retracted { structural, .. } => {
                *structural
            }
            GraphChange::Closed => true,
        }
    }
}

// ───────────────────────────────────────── trait ─────────────

/// Query interface consumed by the tree projection.
pub trait GraphStore {
    /// Ordered children of `resource` under the store's containment rules.
    fn children_of(&self, resource: &Resource) -> Result<Vec<Resource>, StoreError>;

    /// All objects of `(resource, predicate, ?)` in assertion order.
    fn values_of(&self, resource: &Resource, predicate: &Resource) -> Result<Vec<Value>, StoreError>;

    fn notify_on_change(&mut self, callback: ChangeCallback);

    /// Counter bumped on every mutation.
    fn generation(&self) -> u64;
}

// ───────────────────────────────────────── containment ───────

/// Which arcs make one node the child of another.
#[derive(Debug, Clone, Default)]
pub struct Containment {
    /// Predicates whose resource objects are children, in assertion order.
    pub predicates: Vec<Resource>,
    /// Treat RDF container membership (`rdf:_1`, `rdf:_2`, …) as
    /// containment, ordered by position.
    pub containers: bool,
}

impl Containment {
    pub fn new(predicates: Vec<Resource>) -> Self {
        Self {
            predicates,
            containers: false,
        }
    }

    pub fn with_containers(mut self, containers: bool) -> Self {
        self.containers = containers;
        self
    }

    pub fn is_structural(&self, predicate: &Resource) -> bool {
        self.predicates.contains(predicate) || self.member_position(predicate).is_some()
    }

    fn member_position(&self, predicate: &Resource) -> Option<u32> {
        if !self.containers {
            return None;
        }
        predicate.as_iri().and_then(vocab::membership_index)
    }
}

// ───────────────────────────────────────── memory store ──────

/// Insertion-ordered in-memory triple table.
///
/// Arcs are grouped by subject, so per-node queries never scan the whole
/// graph.  Asserting a triple that already exists is a no-op.
pub struct MemoryGraph {
    arcs: HashMap<Resource, Vec<(Resource, Value)>>,
    /// Subjects in first-assertion order.
    subjects: Vec<Resource>,
    containment: Containment,
    len: usize,
    generation: u64,
    closed: bool,
    observers: Vec<ChangeCallback>,
}

impl MemoryGraph {
    pub fn new(containment: Containment) -> Self {
        Self {
            arcs: HashMap::new(),
            subjects: Vec::new(),
            containment,
            len: 0,
            generation: 0,
            closed: false,
            observers: Vec::new(),
        }
    }

    /// Wrap the store for sharing with one or more projections.
    pub fn into_shared(self) -> SharedGraph<Self> {
        Rc::new(RefCell::new(self))
    }

    pub fn containment(&self) -> &Containment {
        &self.containment
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Subjects in the order they were first asserted.
    pub fn subjects(&self) -> &[Resource] {
        &self.subjects
    }

    /// Subjects that are nobody's child, in first-assertion order.
    pub fn roots(&self) -> Vec<Resource> {
        let mut contained = std::collections::HashSet::new();
        for subject in &self.subjects {
            if let Ok(children) = self.children_of(subject) {
                contained.extend(children);
            }
        }
        self.subjects
            .iter()
            .filter(|s| !contained.contains(*s))
            .cloned()
            .collect()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.arcs.get(&triple.subject).is_some_and(|arcs| {
            arcs.iter()
                .any(|(p, o)| *p == triple.predicate && *o == triple.object)
        })
    }

    /// Add a triple.  Returns `false` if it was already present or the
    /// store is closed.
    pub fn assert(&mut self, triple: Triple) -> bool {
        if self.closed || self.contains(&triple) {
            return false;
        }
        let arcs = self.arcs.entry(triple.subject.clone()).or_default();
        if arcs.is_empty() {
            self.subjects.push(triple.subject.clone());
        }
        arcs.push((triple.predicate.clone(), triple.object.clone()));
        self.len += 1;

        let structural = self.containment.is_structural(&triple.predicate);
        self.publish(GraphChange::Asserted { triple, structural });
        true
    }

    /// Remove a triple.  Returns `false` if it was not present.
    pub fn retract(&mut self, triple: &Triple) -> bool {
        if self.closed {
            return false;
        }
        let Some(arcs) = self.arcs.get_mut(&triple.subject) else {
            return false;
        };
        let Some(pos) = arcs
            .iter()
            .position(|(p, o)| *p == triple.predicate && *o == triple.object)
        else {
            return false;
        };
        arcs.remove(pos);
        if arcs.is_empty() {
            self.arcs.remove(&triple.subject);
            self.subjects.retain(|s| s != &triple.subject);
        }
        self.len -= 1;

        let structural = self.containment.is_structural(&triple.predicate);
        self.publish(GraphChange::Retracted {
            triple: triple.clone(),
            structural,
        });
        true
    }

    /// Tear the store down.  Observers hear about it once; every query
    /// afterwards fails with [`StoreError::Closed`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.publish(GraphChange::Closed);
        self.observers.clear();
    }

    fn publish(&mut self, change: GraphChange) {
        self.generation = self.generation.wrapping_add(1);
        tracing::trace!(generation = self.generation, ?change, "graph changed");
        self.observers.retain_mut(|cb| cb(&change));
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

impl GraphStore for MemoryGraph {
    fn children_of(&self, resource: &Resource) -> Result<Vec<Resource>, StoreError> {
        self.check_open()?;
        let Some(arcs) = self.arcs.get(resource) else {
            return Ok(Vec::new());
        };

        // Container members first, by position; then plain child arcs in
        // assertion order.
        let mut members: Vec<(u32, &Resource)> = Vec::new();
        let mut children = Vec::new();
        for (predicate, object) in arcs {
            let Some(child) = object.as_resource() else {
                continue;
            };
            if let Some(pos) = self.containment.member_position(predicate) {
                members.push((pos, child));
            } else if self.containment.predicates.contains(predicate) {
                children.push(child.clone());
            }
        }
        members.sort_by_key(|(pos, _)| *pos);

        let mut out: Vec<Resource> = members.into_iter().map(|(_, r)| r.clone()).collect();
        out.extend(children);
        Ok(out)
    }

    fn values_of(&self, resource: &Resource, predicate: &Resource) -> Result<Vec<Value>, StoreError> {
        self.check_open()?;
        Ok(self
            .arcs
            .get(resource)
            .map(|arcs| {
                arcs.iter()
                    .filter(|(p, _)| p == predicate)
                    .map(|(_, o)| o.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn notify_on_change(&mut self, callback: ChangeCallback) {
        if !self.closed {
            self.observers.push(callback);
        }
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
