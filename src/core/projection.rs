//! Tree projection – a flat, indexable list of visible rows over a graph.
//!
//! Rows are produced by a pre-order depth-first walk from the root.  A node
//! contributes one row; if it is expanded its children follow (in store
//! order) before its next sibling.  A node reachable along several paths
//! gets one row per path.  A child that is already an ancestor on the
//! current path is neither listed nor descended into, so cyclic graphs
//! still yield a finite list.
//!
//! The list is computed lazily and cached.  Expansion changes, filter and
//! root changes, and structural store changes (reported through the store's
//! change feed) drop the cache; the next read rebuilds it.  Every rebuild
//! that actually changes the list starts a new *epoch*, and row handles
//! from an older epoch (or from another projection) are rejected with
//! [`ProjectionError::InvalidReference`].  An enumeration during which a
//! child query failed is served once but not kept.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::columns::{Column, ColumnRegistry};
use super::error::{ProjectionError, Result, StoreError};
use super::format::CellFormat;
use super::graph::{GraphStore, SharedGraph};
use super::model::{RdfDataModel, TreeDataModel, TreeExpansion};
use super::term::Resource;

// ───────────────────────────────────────── row ───────────────

/// One visible row: a graph node at one position in the enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub resource: Resource,
    /// Indentation level; the first enumerated level is 0.
    pub depth: usize,
    pub expanded: bool,
    /// Whether expanding would reveal at least one row.
    pub has_children: bool,
    /// Position in the flat row index.
    pub index: usize,
    /// Flat index of the row this one was enumerated under.
    pub parent: Option<usize>,
    /// Projection that produced the handle.
    owner: u64,
    epoch: u64,
}

/// Cached row without the epoch stamp, so two enumerations can be compared.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    resource: Resource,
    depth: usize,
    expanded: bool,
    has_children: bool,
    parent: Option<usize>,
}

impl Row {
    fn stamp(&self, index: usize, owner: u64, epoch: u64) -> TreeItem {
        TreeItem {
            resource: self.resource.clone(),
            depth: self.depth,
            expanded: self.expanded,
            has_children: self.has_children,
            index,
            parent: self.parent,
            owner,
            epoch,
        }
    }
}

// ───────────────────────────────────────── policy ────────────

/// Whether the root occupies a row of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootPolicy {
    /// The root is row 0 at depth 0 and can be collapsed like any node.
    #[default]
    Shown,
    /// The root is an implicit container: its children are always listed,
    /// at depth 0, whatever the root's own expansion state.
    Hidden,
}

type RowFilter = Box<dyn Fn(&Resource) -> bool>;

static NEXT_PROJECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Fed by the store's change observer.
#[derive(Debug, Default)]
struct Invalidation {
    dirty: Cell<bool>,
    /// Store generation as far as the observer has heard.
    seen_generation: Cell<u64>,
}

// ───────────────────────────────────────── projection ────────

/// Tree-with-columns view of a graph, rooted at one resource.
pub struct TreeProjection<S> {
    base: RdfDataModel<S>,
    columns: ColumnRegistry,
    root: Resource,
    root_policy: RootPolicy,
    /// Initial state of the root after construction or re-rooting.
    root_expanded: bool,
    expanded: HashSet<Resource>,
    filter: Option<RowFilter>,
    rows: RefCell<Option<Vec<Row>>>,
    epoch: Cell<u64>,
    /// Set when a child query failed during the current enumeration.
    degraded: Cell<bool>,
    id: u64,
    invalidation: Rc<Invalidation>,
}

impl<S: GraphStore> TreeProjection<S> {
    /// Projection with the root shown and expanded and no columns.
    pub fn new(store: SharedGraph<S>, root: Resource) -> Self {
        let mut projection = Self {
            base: RdfDataModel::new(store, CellFormat::default()),
            columns: ColumnRegistry::new(),
            root: root.clone(),
            root_policy: RootPolicy::default(),
            root_expanded: true,
            expanded: HashSet::from([root]),
            filter: None,
            rows: RefCell::new(None),
            epoch: Cell::new(0),
            degraded: Cell::new(false),
            id: NEXT_PROJECTION_ID.fetch_add(1, Ordering::Relaxed),
            invalidation: Rc::new(Invalidation::default()),
        };
        projection.subscribe();
        projection
    }

    pub fn with_columns(mut self, columns: ColumnRegistry) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_root_policy(mut self, policy: RootPolicy) -> Self {
        self.set_root_policy(policy);
        self
    }

    /// Choose whether the root starts expanded.
    pub fn with_root_expanded(mut self, expanded: bool) -> Self {
        self.root_expanded = expanded;
        let root = self.root.clone();
        self.set_expanded(&root, expanded);
        self
    }

    pub fn with_format(mut self, format: CellFormat) -> Self {
        *self.base.format_mut() = format;
        self
    }

    fn subscribe(&mut self) {
        let weak = Rc::downgrade(&self.invalidation);
        let result = self.base.subscribe(Box::new(move |change| {
            let Some(inv) = weak.upgrade() else {
                return false;
            };
            inv.seen_generation
                .set(inv.seen_generation.get().wrapping_add(1));
            if change.affects_structure() {
                inv.dirty.set(true);
            }
            true
        }));
        match result {
            Ok(generation) => self.invalidation.seen_generation.set(generation),
            Err(e) => tracing::warn!(error = %e, "could not subscribe to graph changes"),
        }
    }

    // ── accessors ───────────────────────────────────────────────

    pub fn root(&self) -> &Resource {
        &self.root
    }

    pub fn root_policy(&self) -> RootPolicy {
        self.root_policy
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    /// Column edits never touch the row cache.
    pub fn columns_mut(&mut self) -> &mut ColumnRegistry {
        &mut self.columns
    }

    pub fn store(&self) -> &SharedGraph<S> {
        self.base.store()
    }

    pub fn format(&self) -> &CellFormat {
        self.base.format()
    }

    pub fn format_mut(&mut self) -> &mut CellFormat {
        self.base.format_mut()
    }

    pub fn is_expanded(&self, resource: &Resource) -> bool {
        self.expanded.contains(resource)
    }

    // ── mutation ────────────────────────────────────────────────

    /// Drop the cached rows; the next read re-enumerates.
    pub fn invalidate(&self) {
        self.invalidation.dirty.set(true);
    }

    pub fn set_root_policy(&mut self, policy: RootPolicy) {
        if self.root_policy != policy {
            self.root_policy = policy;
            self.invalidate();
        }
    }

    /// Re-root the projection.  Expansion state is reset.
    pub fn set_root(&mut self, root: Resource) {
        tracing::debug!(root = %root, "re-rooting tree projection");
        self.expanded.clear();
        if self.root_expanded {
            self.expanded.insert(root.clone());
        }
        self.root = root;
        self.invalidate();
    }

    /// Hide every node for which `keep` returns `false`, together with its
    /// subtree.
    pub fn set_filter(&mut self, keep: impl Fn(&Resource) -> bool + 'static) {
        self.filter = Some(Box::new(keep));
        self.invalidate();
    }

    pub fn clear_filter(&mut self) {
        if self.filter.take().is_some() {
            self.invalidate();
        }
    }

    /// Set a node's expansion state directly, by resource.
    pub fn set_expanded(&mut self, resource: &Resource, expanded: bool) {
        let changed = if expanded {
            self.expanded.insert(resource.clone())
        } else {
            self.expanded.remove(resource)
        };
        if changed {
            tracing::debug!(resource = %resource, expanded, "expansion changed");
            self.invalidate();
        }
    }

    /// Expand the root and every node with children above `max_depth`, so
    /// rows down to `max_depth` levels below the root become visible.
    pub fn expand_all(&mut self, max_depth: usize) {
        let mut found = Vec::new();
        let mut path = vec![self.root.clone()];
        self.collect_expandable(&self.root, 0, max_depth, &mut path, &mut found);
        let before = self.expanded.len();
        self.expanded.extend(found);
        self.expanded.insert(self.root.clone());
        if self.expanded.len() != before {
            self.invalidate();
        }
    }

    fn collect_expandable(
        &self,
        resource: &Resource,
        depth: usize,
        max_depth: usize,
        path: &mut Vec<Resource>,
        found: &mut Vec<Resource>,
    ) {
        // Children of `resource` sit at `depth + 1`; expanding them would
        // reveal `depth + 2`.
        if depth + 1 >= max_depth {
            return;
        }
        for child in self.visible_children(resource, path) {
            path.push(child.clone());
            if !self.visible_children(&child, path).is_empty() {
                found.push(child.clone());
                self.collect_expandable(&child, depth + 1, max_depth, path, found);
            }
            path.pop();
        }
    }

    /// Collapse everything except the root.
    pub fn collapse_all(&mut self) {
        let root_was_expanded = self.expanded.contains(&self.root);
        self.expanded.clear();
        if root_was_expanded {
            self.expanded.insert(self.root.clone());
        }
        self.invalidate();
    }

    // ── row queries ─────────────────────────────────────────────

    /// Snapshot of the whole visible-row index.
    pub fn rows(&self) -> Vec<TreeItem> {
        self.with_rows(|rows, epoch| {
            rows.iter()
                .enumerate()
                .map(|(i, row)| row.stamp(i, self.id, epoch))
                .collect()
        })
    }

    /// First row showing `resource`.
    pub fn row_index_of(&self, resource: &Resource) -> Option<usize> {
        self.with_rows(|rows, _| rows.iter().position(|r| r.resource == *resource))
    }

    /// Row the given row was enumerated under, if any.
    pub fn parent_row(&self, row: &TreeItem) -> Result<Option<TreeItem>> {
        self.check_row(row)?;
        match row.parent {
            Some(index) => self.nth_row(index).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`TreeDataModel::cell_text`], but store failures are reported
    /// instead of rendered as empty text.
    pub fn try_cell_text(&self, row: &TreeItem, column: &Column) -> Result<String> {
        self.check_row(row)?;
        if !self.columns.contains(column) {
            return Err(ProjectionError::InvalidReference);
        }
        Ok(self.base.text(&row.resource, &column.predicate)?)
    }

    fn check_row(&self, row: &TreeItem) -> Result<()> {
        self.with_rows(|rows, epoch| {
            let valid = row.owner == self.id
                && row.epoch == epoch
                && rows
                    .get(row.index)
                    .is_some_and(|r| r.resource == row.resource);
            if valid {
                Ok(())
            } else {
                Err(ProjectionError::InvalidReference)
            }
        })
    }

    // ── enumeration ─────────────────────────────────────────────

    fn with_rows<R>(&self, f: impl FnOnce(&[Row], u64) -> R) -> R {
        self.refresh();
        let rows = self.rows.borrow();
        f(rows.as_deref().unwrap_or(&[]), self.epoch.get())
    }

    fn refresh(&self) {
        let generation = self.base.generation();
        let missed_change =
            generation.is_some_and(|g| g != self.invalidation.seen_generation.get());
        let dirty = self.invalidation.dirty.get();
        if self.rows.borrow().is_some() && !dirty && !missed_change {
            return;
        }

        self.degraded.set(false);
        let rows = self.enumerate();
        // A failed child query only shapes this read; the next one retries.
        self.invalidation.dirty.set(self.degraded.get());
        if let Some(g) = generation {
            self.invalidation.seen_generation.set(g);
        }

        let mut cache = self.rows.borrow_mut();
        if cache.as_ref() != Some(&rows) {
            self.epoch.set(self.epoch.get().wrapping_add(1));
            tracing::debug!(rows = rows.len(), epoch = self.epoch.get(), "re-enumerated rows");
        }
        *cache = Some(rows);
    }

    fn enumerate(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        match self.root_policy {
            RootPolicy::Shown => {
                if self.keeps(&self.root) {
                    self.collect(&self.root, 0, None, &mut path, &mut rows);
                }
            }
            RootPolicy::Hidden => {
                path.push(self.root.clone());
                for child in self.visible_children(&self.root, &path) {
                    self.collect(&child, 0, None, &mut path, &mut rows);
                }
            }
        }
        rows
    }

    /// Pre-order: the node's row, then (if expanded) its children's rows.
    fn collect(
        &self,
        resource: &Resource,
        depth: usize,
        parent: Option<usize>,
        path: &mut Vec<Resource>,
        rows: &mut Vec<Row>,
    ) {
        path.push(resource.clone());
        let children = self.visible_children(resource, path);
        let expanded = self.expanded.contains(resource);
        let index = rows.len();
        rows.push(Row {
            resource: resource.clone(),
            depth,
            expanded,
            has_children: !children.is_empty(),
            parent,
        });
        if expanded {
            for child in &children {
                self.collect(child, depth + 1, Some(index), path, rows);
            }
        }
        path.pop();
    }

    /// Children that would get a row beneath the last node of `path`:
    /// filtered ones and ancestors (cycle back-edges) are dropped.
    fn visible_children(&self, resource: &Resource, path: &[Resource]) -> Vec<Resource> {
        let children = match self.base.children(resource) {
            Ok(children) => children,
            Err(e) => {
                log_store_error(&e, resource);
                self.degraded.set(true);
                return Vec::new();
            }
        };
        children
            .into_iter()
            .filter(|c| !path.contains(c) && self.keeps(c))
            .collect()
    }

    fn keeps(&self, resource: &Resource) -> bool {
        self.filter.as_ref().map_or(true, |keep| keep(resource))
    }
}

fn log_store_error(error: &StoreError, resource: &Resource) {
    tracing::warn!(error = %error, resource = %resource, "graph query failed");
}

impl<S: GraphStore> TreeDataModel for TreeProjection<S> {
    fn column_count(&self) -> usize {
        self.columns.column_count()
    }

    fn nth_column(&self, n: usize) -> Result<Column> {
        self.columns.nth_column(n).cloned()
    }

    fn visible_row_count(&self) -> usize {
        self.with_rows(|rows, _| rows.len())
    }

    fn first_visible_row_index(&self) -> Result<usize> {
        if self.visible_row_count() == 0 {
            Err(ProjectionError::Empty)
        } else {
            Ok(0)
        }
    }

    fn nth_row(&self, n: usize) -> Result<TreeItem> {
        self.with_rows(|rows, epoch| {
            rows.get(n)
                .map(|row| row.stamp(n, self.id, epoch))
                .ok_or(ProjectionError::OutOfRange {
                    index: n,
                    len: rows.len(),
                })
        })
    }

    fn cell_text(&self, row: &TreeItem, column: &Column) -> Result<String> {
        match self.try_cell_text(row, column) {
            Err(ProjectionError::StoreUnavailable(e)) => {
                log_store_error(&e, &row.resource);
                Ok(String::new())
            }
            other => other,
        }
    }
}

impl<S: GraphStore> TreeExpansion for TreeProjection<S> {
    fn expand(&mut self, row: &TreeItem) -> Result<()> {
        self.check_row(row)?;
        self.set_expanded(&row.resource, true);
        Ok(())
    }

    fn collapse(&mut self, row: &TreeItem) -> Result<()> {
        self.check_row(row)?;
        self.set_expanded(&row.resource, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::{Containment, MemoryGraph, Triple};
    use crate::core::term::{vocab, Literal};

    fn ex(s: &str) -> Resource {
        Resource::iri(format!("http://example.org/{s}"))
    }

    fn child() -> Resource {
        ex("child")
    }

    fn name() -> Resource {
        Resource::iri(vocab::RDFS_LABEL)
    }

    fn kind() -> Resource {
        Resource::iri(vocab::RDF_TYPE)
    }

    fn store() -> SharedGraph<MemoryGraph> {
        MemoryGraph::new(Containment::new(vec![child()])).into_shared()
    }

    fn link(g: &SharedGraph<MemoryGraph>, parent: &str, kid: &str) {
        g.borrow_mut()
            .assert(Triple::new(ex(parent), child(), ex(kid)));
    }

    fn label(g: &SharedGraph<MemoryGraph>, node: &str, text: &str) {
        g.borrow_mut()
            .assert(Triple::new(ex(node), name(), Literal::plain(text)));
    }

    fn columns() -> ColumnRegistry {
        let mut cols = ColumnRegistry::new();
        cols.add_column(name(), "Name", true);
        cols.add_column(kind(), "Type", true);
        cols
    }

    /// R → [C1 → [G1], C2]
    fn scenario() -> (SharedGraph<MemoryGraph>, TreeProjection<MemoryGraph>) {
        let g = store();
        link(&g, "R", "C1");
        link(&g, "R", "C2");
        link(&g, "C1", "G1");
        for n in ["R", "C1", "C2", "G1"] {
            label(&g, n, n);
        }
        g.borrow_mut()
            .assert(Triple::new(ex("C1"), kind(), ex("Folder")));
        let p = TreeProjection::new(g.clone(), ex("R")).with_columns(columns());
        (g, p)
    }

    fn resources(p: &TreeProjection<MemoryGraph>) -> Vec<Resource> {
        p.rows().into_iter().map(|r| r.resource).collect()
    }

    #[test]
    fn scenario_expand_child() {
        let (_g, mut p) = scenario();
        assert_eq!(p.visible_row_count(), 3);
        assert_eq!(resources(&p), vec![ex("R"), ex("C1"), ex("C2")]);

        let c1 = p.nth_row(1).unwrap();
        assert!(c1.has_children);
        assert!(!c1.expanded);
        p.expand(&c1).unwrap();

        assert_eq!(p.visible_row_count(), 4);
        let g1 = p.nth_row(2).unwrap();
        assert_eq!(g1.resource, ex("G1"));
        assert_eq!(g1.depth, 2);
        assert_eq!(g1.parent, Some(1));
    }

    #[test]
    fn childless_root_is_single_row() {
        let g = store();
        let p = TreeProjection::new(g, ex("lonely"));
        assert_eq!(p.visible_row_count(), 1);
        let root = p.nth_row(0).unwrap();
        assert!(root.expanded);
        assert!(!root.has_children);
        assert_eq!(p.first_visible_row_index(), Ok(0));
    }

    #[test]
    fn expanding_two_children_adds_two_rows_in_store_order() {
        let g = store();
        link(&g, "R", "A");
        link(&g, "A", "Y");
        link(&g, "A", "X");
        let mut p = TreeProjection::new(g, ex("R"));

        let a = p.nth_row(1).unwrap();
        let before = p.visible_row_count();
        p.expand(&a).unwrap();
        assert_eq!(p.visible_row_count(), before + 2);
        assert_eq!(p.nth_row(a.index + 1).unwrap().resource, ex("Y"));
        assert_eq!(p.nth_row(a.index + 2).unwrap().resource, ex("X"));
    }

    #[test]
    fn cycles_terminate_without_relisting_ancestor() {
        let g = store();
        link(&g, "A", "B");
        link(&g, "B", "A");
        let mut p = TreeProjection::new(g, ex("A")).with_root_expanded(false);

        let a = p.nth_row(0).unwrap();
        p.expand(&a).unwrap();
        let b = p.nth_row(1).unwrap();
        assert_eq!(b.resource, ex("B"));
        assert!(!b.has_children);
        p.expand(&b).unwrap();

        assert_eq!(resources(&p), vec![ex("A"), ex("B")]);
    }

    #[test]
    fn self_loop_is_not_a_child() {
        let g = store();
        link(&g, "A", "A");
        let p = TreeProjection::new(g, ex("A"));
        assert_eq!(p.visible_row_count(), 1);
        assert!(!p.nth_row(0).unwrap().has_children);
    }

    #[test]
    fn shared_nodes_appear_once_per_path() {
        let g = store();
        link(&g, "R", "P1");
        link(&g, "R", "P2");
        link(&g, "P1", "S");
        link(&g, "P2", "S");
        let mut p = TreeProjection::new(g, ex("R"));
        p.expand_all(4);
        assert_eq!(
            resources(&p),
            vec![ex("R"), ex("P1"), ex("S"), ex("P2"), ex("S")]
        );
    }

    #[test]
    fn enumeration_is_deterministic() {
        let (_g, p) = scenario();
        assert_eq!(p.rows(), p.rows());
        assert_eq!(p.nth_row(2).unwrap(), p.nth_row(2).unwrap());
    }

    #[test]
    fn out_of_range_and_empty() {
        let (_g, mut p) = scenario();
        assert_eq!(
            p.nth_row(3),
            Err(ProjectionError::OutOfRange { index: 3, len: 3 })
        );
        p.set_filter(|_| false);
        assert_eq!(p.visible_row_count(), 0);
        assert_eq!(p.first_visible_row_index(), Err(ProjectionError::Empty));
    }

    #[test]
    fn cell_text_joins_values_and_never_fails_on_missing() {
        let (g, p) = scenario();
        label(&g, "C2", "second name");
        let name_col = p.nth_column(0).unwrap();
        let type_col = p.nth_column(1).unwrap();

        let c1 = p.nth_row(1).unwrap();
        assert_eq!(p.cell_text(&c1, &name_col).unwrap(), "C1");
        assert_eq!(p.cell_text(&c1, &type_col).unwrap(), "http://example.org/Folder");

        let c2 = p.nth_row(2).unwrap();
        assert_eq!(p.cell_text(&c2, &name_col).unwrap(), "C2, second name");
        assert_eq!(p.cell_text(&c2, &type_col).unwrap(), "");
    }

    #[test]
    fn stale_rows_and_foreign_columns_are_rejected() {
        let (_g, mut p) = scenario();
        let name_col = p.nth_column(0).unwrap();
        let c1 = p.nth_row(1).unwrap();
        p.expand(&c1).unwrap();

        assert_eq!(
            p.cell_text(&c1, &name_col),
            Err(ProjectionError::InvalidReference)
        );
        assert_eq!(p.expand(&c1), Err(ProjectionError::InvalidReference));

        let mut other = ColumnRegistry::new();
        other.add_column(ex("elsewhere"), "Elsewhere", true);
        let foreign = other.nth_column(0).unwrap().clone();
        let fresh = p.nth_row(1).unwrap();
        assert_eq!(
            p.cell_text(&fresh, &foreign),
            Err(ProjectionError::InvalidReference)
        );
    }

    #[test]
    fn structural_change_invalidates_cache() {
        let (g, p) = scenario();
        let r = p.nth_row(0).unwrap();
        assert_eq!(p.visible_row_count(), 3);

        link(&g, "R", "C3");
        assert_eq!(p.visible_row_count(), 4);
        assert_eq!(p.nth_row(3).unwrap().resource, ex("C3"));
        assert_eq!(p.parent_row(&r), Err(ProjectionError::InvalidReference));
    }

    #[test]
    fn label_change_keeps_row_handles_valid() {
        let (g, p) = scenario();
        let name_col = p.nth_column(0).unwrap();
        let c2 = p.nth_row(2).unwrap();
        label(&g, "C2", "renamed");
        assert_eq!(p.cell_text(&c2, &name_col).unwrap(), "C2, renamed");
    }

    #[test]
    fn closed_store_degrades_gracefully() {
        let (g, p) = scenario();
        let name_col = p.nth_column(0).unwrap();
        let root = p.nth_row(0).unwrap();
        assert_eq!(p.cell_text(&root, &name_col).unwrap(), "R");

        g.borrow_mut().close();
        // Root row survives; its children can no longer be listed.
        assert_eq!(p.visible_row_count(), 1);
        let root = p.nth_row(0).unwrap();
        assert_eq!(p.cell_text(&root, &name_col).unwrap(), "");
        assert!(matches!(
            p.try_cell_text(&root, &name_col),
            Err(ProjectionError::StoreUnavailable(StoreError::Closed))
        ));
    }

    #[test]
    fn hidden_root_lists_children_at_depth_zero() {
        let (_g, p) = scenario();
        let mut p = p.with_root_policy(RootPolicy::Hidden);
        assert_eq!(resources(&p), vec![ex("C1"), ex("C2")]);
        assert_eq!(p.first_visible_row_index(), Ok(0));

        let c1 = p.nth_row(0).unwrap();
        assert_eq!(c1.depth, 0);
        assert_eq!(c1.parent, None);
        p.expand(&c1).unwrap();
        assert_eq!(p.nth_row(1).unwrap().resource, ex("G1"));
        assert_eq!(p.nth_row(1).unwrap().depth, 1);
    }

    #[test]
    fn hidden_root_with_no_children_is_empty() {
        let p = TreeProjection::new(store(), ex("lonely")).with_root_policy(RootPolicy::Hidden);
        assert_eq!(p.visible_row_count(), 0);
        assert_eq!(p.first_visible_row_index(), Err(ProjectionError::Empty));
    }

    #[test]
    fn collapsed_root_configuration() {
        let (g, _) = scenario();
        let mut p = TreeProjection::new(g, ex("R")).with_root_expanded(false);
        assert_eq!(p.visible_row_count(), 1);
        let root = p.nth_row(0).unwrap();
        assert!(p.toggle(&root).unwrap());
        assert_eq!(p.visible_row_count(), 3);
    }

    #[test]
    fn filter_skips_subtrees() {
        let (_g, mut p) = scenario();
        p.expand_all(8);
        assert_eq!(p.visible_row_count(), 4);
        p.set_filter(|r| *r != ex("C1"));
        assert_eq!(resources(&p), vec![ex("R"), ex("C2")]);
        p.clear_filter();
        assert_eq!(p.visible_row_count(), 4);
    }

    #[test]
    fn collapse_all_keeps_root_open() {
        let (_g, mut p) = scenario();
        p.expand_all(8);
        p.collapse_all();
        assert_eq!(resources(&p), vec![ex("R"), ex("C1"), ex("C2")]);
    }

    #[test]
    fn expand_all_respects_depth() {
        let (_g, mut p) = scenario();
        p.expand_all(1);
        assert_eq!(p.visible_row_count(), 3);
        p.expand_all(2);
        assert_eq!(p.visible_row_count(), 4);
    }

    #[test]
    fn set_root_resets_expansion() {
        let (_g, mut p) = scenario();
        p.expand_all(8);
        p.set_root(ex("C1"));
        assert_eq!(resources(&p), vec![ex("C1"), ex("G1")]);
        assert!(!p.is_expanded(&ex("R")));
    }

    #[test]
    fn parent_row_and_lookup() {
        let (_g, mut p) = scenario();
        p.expand_all(8);
        let g1 = p.nth_row(p.row_index_of(&ex("G1")).unwrap()).unwrap();
        let parent = p.parent_row(&g1).unwrap().unwrap();
        assert_eq!(parent.resource, ex("C1"));
        assert_eq!(p.parent_row(&p.nth_row(0).unwrap()), Ok(None));
    }

    #[test]
    fn hiding_column_does_not_touch_rows() {
        let (_g, mut p) = scenario();
        let row = p.nth_row(1).unwrap();
        p.columns_mut().set_visibility(0, false).unwrap();
        assert_eq!(p.column_count(), 1);
        assert_eq!(p.nth_column(0).unwrap().label, "Type");
        let type_col = p.nth_column(0).unwrap();
        assert!(p.cell_text(&row, &type_col).is_ok());
    }

    #[test]
    fn dropped_projection_unsubscribes() {
        let (g, p) = scenario();
        drop(p);
        link(&g, "R", "C9");
        let p = TreeProjection::new(g.clone(), ex("R"));
        assert_eq!(p.visible_row_count(), 4);
    }

    /// Memory graph whose first `failures` child queries fail.
    struct FlakyGraph {
        inner: MemoryGraph,
        failures: Cell<u32>,
    }

    impl GraphStore for FlakyGraph {
        fn children_of(&self, resource: &Resource) -> Result<Vec<Resource>, StoreError> {
            let left = self.failures.get();
            if left > 0 {
                self.failures.set(left - 1);
                return Err(StoreError::Query("backend timed out".into()));
            }
            self.inner.children_of(resource)
        }

        fn values_of(
            &self,
            resource: &Resource,
            predicate: &Resource,
        ) -> Result<Vec<crate::core::term::Value>, StoreError> {
            self.inner.values_of(resource, predicate)
        }

        fn notify_on_change(&mut self, callback: crate::core::graph::ChangeCallback) {
            self.inner.notify_on_change(callback);
        }

        fn generation(&self) -> u64 {
            self.inner.generation()
        }
    }

    #[test]
    fn failed_child_query_is_retried_on_next_read() {
        let mut inner = MemoryGraph::new(Containment::new(vec![child()]));
        inner.assert(Triple::new(ex("R"), child(), ex("A")));
        inner.assert(Triple::new(ex("R"), child(), ex("B")));
        let g = Rc::new(RefCell::new(FlakyGraph {
            inner,
            failures: Cell::new(1),
        }));
        let p = TreeProjection::new(g, ex("R"));

        assert_eq!(p.visible_row_count(), 1);
        assert_eq!(p.visible_row_count(), 3);
        assert_eq!(p.visible_row_count(), 3);
        assert_eq!(p.nth_row(2).unwrap().resource, ex("B"));
    }

    #[test]
    fn rows_from_another_projection_are_rejected() {
        let (g, p) = scenario();
        let other = TreeProjection::new(g, ex("R")).with_columns(columns());
        let borrowed = other.nth_row(1).unwrap();
        assert_eq!(p.nth_row(1).unwrap().resource, borrowed.resource);

        let name_col = p.nth_column(0).unwrap();
        assert_eq!(
            p.cell_text(&borrowed, &name_col),
            Err(ProjectionError::InvalidReference)
        );
        assert_eq!(p.parent_row(&borrowed), Err(ProjectionError::InvalidReference));
        assert!(other.cell_text(&borrowed, &other.nth_column(0).unwrap()).is_ok());
    }
}
