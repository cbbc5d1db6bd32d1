//! Column registry – which predicates are shown, under what labels, in
//! which order.
//!
//! Two index spaces exist side by side:
//!
//! * the *all-columns* space, used by the mutating operations
//!   ([`ColumnRegistry::set_visibility`], [`ColumnRegistry::move_column`], …)
//! * the *visible-columns* space, the only one the hosting view sees
//!   ([`ColumnRegistry::column_count`], [`ColumnRegistry::nth_column`]).
//!
//! Both list columns by ascending `order`; the visible space simply skips
//! hidden ones, so hiding a column never reshuffles the others.

use super::error::{ProjectionError, Result};
use super::term::Resource;

/// Stable identity of a column, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    /// Predicate whose values fill this column's cells.
    pub predicate: Resource,
    pub label: String,
    pub visible: bool,
    /// Display position; unique within a registry.
    pub order: u32,
    /// Preferred width in terminal cells.
    pub width: Option<u16>,
}

/// Ordered set of column descriptors.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    /// Always sorted by `order`.
    columns: Vec<Column>,
    next_id: u32,
    next_order: u32,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column after every existing one.
    pub fn add_column(
        &mut self,
        predicate: Resource,
        label: impl Into<String>,
        visible: bool,
    ) -> ColumnId {
        let id = ColumnId(self.next_id);
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        self.columns.push(Column {
            id,
            predicate,
            label: label.into(),
            visible,
            order,
            width: None,
        });
        id
    }

    /// Number of visible columns.
    pub fn column_count(&self) -> usize {
        self.columns.iter().filter(|c| c.visible).count()
    }

    /// `n`-th visible column in display order.
    pub fn nth_column(&self, n: usize) -> Result<&Column> {
        self.visible()
            .nth(n)
            .ok_or(ProjectionError::OutOfRange {
                index: n,
                len: self.column_count(),
            })
    }

    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible)
    }

    /// Every column, hidden ones included, in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// First column bound to `predicate`.
    pub fn find(&self, predicate: &Resource) -> Option<&Column> {
        self.columns.iter().find(|c| c.predicate == *predicate)
    }

    /// Whether `column` is a handle onto a column this registry still holds.
    pub fn contains(&self, column: &Column) -> bool {
        self.get(column.id)
            .is_some_and(|c| c.predicate == column.predicate)
    }

    /// Show or hide the column at `index` in the all-columns space.
    pub fn set_visibility(&mut self, index: usize, visible: bool) -> Result<()> {
        let column = self.slot(index)?;
        column.visible = visible;
        tracing::debug!(label = %column.label, visible, "column visibility changed");
        Ok(())
    }

    pub fn toggle_visibility(&mut self, index: usize) -> Result<bool> {
        let column = self.slot(index)?;
        column.visible = !column.visible;
        Ok(column.visible)
    }

    pub fn set_width(&mut self, index: usize, width: Option<u16>) -> Result<()> {
        self.slot(index)?.width = width;
        Ok(())
    }

    /// Move the column at `from` so it ends up at `to` (all-columns space).
    /// `order` is renumbered so it stays unique and ascending.
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.columns.len();
        for index in [from, to] {
            if index >= len {
                return Err(ProjectionError::OutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        for (order, column) in self.columns.iter_mut().enumerate() {
            column.order = order as u32;
        }
        self.next_order = len as u32;
        Ok(())
    }

    /// Show or hide every column `matches` selects; returns how many there were.
    pub fn set_visibility_where(
        &mut self,
        visible: bool,
        matches: impl Fn(&Column) -> bool,
    ) -> usize {
        let mut count = 0;
        for column in &mut self.columns {
            if matches(column) {
                column.visible = visible;
                count += 1;
            }
        }
        count
    }

    /// Put the columns bound to `predicates` first, in that order.  The
    /// others follow in their current order.
    pub fn arrange(&mut self, predicates: &[Resource]) {
        self.columns.sort_by_key(|c| {
            predicates
                .iter()
                .position(|p| *p == c.predicate)
                .unwrap_or(predicates.len())
        });
        for (order, column) in self.columns.iter_mut().enumerate() {
            column.order = order as u32;
        }
        self.next_order = self.columns.len() as u32;
    }

    fn slot(&mut self, index: usize) -> Result<&mut Column> {
        let len = self.columns.len();
        self.columns
            .get_mut(index)
            .ok_or(ProjectionError::OutOfRange { index, len })
    }
}
