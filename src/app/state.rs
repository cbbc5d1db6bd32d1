//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::path::PathBuf;
use std::time::Instant;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::graph::MemoryGraph;
use crate::core::model::TreeDataModel;
use crate::core::projection::{TreeItem, TreeProjection};
use crate::core::term::Resource;
use crate::ui::tree_widget::TreeWidgetState;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Tree,
    ColumnsMenu,
}

/// Top-level application state.
pub struct AppState {
    /// The tree-with-columns view of the loaded graph.
    pub projection: TreeProjection<MemoryGraph>,
    /// Widget-level state (selection, scroll).
    pub tree_state: TreeWidgetState,
    /// Where the graph came from, shown in the border title.
    pub source: String,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub active_view: ActiveView,
    pub config: AppConfig,
    /// Highlighted entry in the column chooser (all-columns index).
    pub columns_selected: usize,
    /// Last left-clicked row and click time, for double-click.
    pub last_left_click: Option<(Resource, Instant)>,
    /// Full terminal size as of the last draw; mouse hit-testing uses it.
    pub terminal_area: Rect,
    /// Roots left behind by re-rooting, most recent last.
    pub previous_roots: Vec<Resource>,
    /// Where column layout changes are written; `None` keeps them in memory.
    pub config_file: Option<PathBuf>,
}

impl AppState {
    pub fn new(projection: TreeProjection<MemoryGraph>, source: String, config: AppConfig) -> Self {
        Self {
            projection,
            tree_state: TreeWidgetState::default(),
            source,
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            config,
            columns_selected: 0,
            last_left_click: None,
            terminal_area: Rect::default(),
            previous_roots: Vec::new(),
            config_file: None,
        }
    }

    /// Row under the cursor, if any.
    pub fn selected_row(&self) -> Option<TreeItem> {
        self.projection.nth_row(self.tree_state.selected).ok()
    }

    /// Keep the cursor inside the current row range.
    pub fn clamp_selection(&mut self) {
        let count = self.projection.visible_row_count();
        if self.tree_state.selected >= count {
            self.tree_state.selected = count.saturating_sub(1);
        }
    }

    /// Move the cursor to the first row showing `resource`.
    pub fn select_resource(&mut self, resource: &Resource) {
        self.tree_state.selected = self.projection.row_index_of(resource).unwrap_or(0);
    }
}
