//! View-facing contracts and the generic RDF glue underneath them.
//!
//! A presentation layer only ever calls the two capability traits here:
//! [`TreeDataModel`] for reading columns, rows and cells, and
//! [`TreeExpansion`] for opening and closing rows.  The concrete tree model
//! ([`super::projection::TreeProjection`]) implements both and delegates all
//! store access to an [`RdfDataModel`].

use super::columns::Column;
use super::error::{Result, StoreError};
use super::format::CellFormat;
use super::graph::{ChangeCallback, GraphStore, SharedGraph};
use super::projection::TreeItem;
use super::term::Resource;

/// Read side of a tree-with-columns view.
pub trait TreeDataModel {
    /// Number of visible columns.
    fn column_count(&self) -> usize;

    /// `n`-th visible column, in display order.
    fn nth_column(&self, n: usize) -> Result<Column>;

    /// Number of rows in the current visible-row index.
    fn visible_row_count(&self) -> usize;

    /// Flat index of the first enumerated row; fails with `Empty` when
    /// nothing is visible.
    fn first_visible_row_index(&self) -> Result<usize>;

    fn nth_row(&self, n: usize) -> Result<TreeItem>;

    /// Display text of `column`'s predicate on `row`'s resource.  Missing
    /// values and store failures both yield `""`.
    fn cell_text(&self, row: &TreeItem, column: &Column) -> Result<String>;
}

/// Write side: expansion state of rows.
pub trait TreeExpansion {
    fn expand(&mut self, row: &TreeItem) -> Result<()>;

    fn collapse(&mut self, row: &TreeItem) -> Result<()>;

    /// Flip the row's state; returns whether it is now expanded.
    fn toggle(&mut self, row: &TreeItem) -> Result<bool> {
        if row.expanded {
            self.collapse(row)?;
            Ok(false)
        } else {
            self.expand(row)?;
            Ok(true)
        }
    }
}

/// Store access and value formatting shared by every RDF-backed view.
pub struct RdfDataModel<S> {
    store: SharedGraph<S>,
    format: CellFormat,
}

impl<S: GraphStore> RdfDataModel<S> {
    pub fn new(store: SharedGraph<S>, format: CellFormat) -> Self {
        Self { store, format }
    }

    pub fn store(&self) -> &SharedGraph<S> {
        &self.store
    }

    pub fn format(&self) -> &CellFormat {
        &self.format
    }

    pub fn format_mut(&mut self) -> &mut CellFormat {
        &mut self.format
    }

    /// Ordered children of `resource`.
    pub fn children(&self, resource: &Resource) -> Result<Vec<Resource>, StoreError> {
        let store = self.borrow()?;
        store.children_of(resource)
    }

    /// Formatted values of `(resource, predicate)`, joined in store order.
    pub fn text(&self, resource: &Resource, predicate: &Resource) -> Result<String, StoreError> {
        let store = self.borrow()?;
        let values = store.values_of(resource, predicate)?;
        Ok(self.format.join(&values))
    }

    /// Current store generation, if the store can be read right now.
    pub fn generation(&self) -> Option<u64> {
        self.store.try_borrow().ok().map(|s| s.generation())
    }

    /// Register a change observer.  Returns the store generation at the
    /// moment of subscription.
    pub fn subscribe(&self, callback: ChangeCallback) -> Result<u64, StoreError> {
        let mut store = self
            .store
            .try_borrow_mut()
            .map_err(|_| StoreError::Query("store is busy".into()))?;
        store.notify_on_change(callback);
        Ok(store.generation())
    }

    fn borrow(&self) -> Result<std::cell::Ref<'_, S>, StoreError> {
        // A failed borrow means the host is mid-mutation.
        self.store
            .try_borrow()
            .map_err(|_| StoreError::Query("store is busy".into()))
    }
}
