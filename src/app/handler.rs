//! Input handling: maps key/mouse events to state mutations.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::model::{TreeDataModel, TreeExpansion};
use crate::core::term::Resource;
use crate::ui::layout::{point_in_rect, AppLayout};

use super::state::{ActiveView, AppState};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Tree => handle_tree_key(state, key),
        ActiveView::ColumnsMenu => handle_columns_key(state, key),
    }
    state.clamp_selection();
}

// ── Tree view (configurable bindings) ───────────────────────────

fn handle_tree_key(state: &mut AppState, key: KeyEvent) {
    // Navigation keys that should always work in tree view.
    match key.code {
        KeyCode::Home => {
            state.tree_state.selected = state.projection.first_visible_row_index().unwrap_or(0);
            state.tree_state.offset = 0;
            return;
        }
        KeyCode::End => {
            state.tree_state.selected = state.projection.visible_row_count().saturating_sub(1);
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::OpenColumns => {
            state.active_view = ActiveView::ColumnsMenu;
            state.columns_selected = 0;
        }
        Action::MoveUp => {
            state.tree_state.select_prev();
        }
        Action::MoveDown => {
            let visible_count = state.projection.visible_row_count();
            state.tree_state.select_next(visible_count);
        }
        Action::Expand => handle_expand(state),
        Action::Collapse => handle_collapse(state),
        Action::JumpSiblingUp => jump_to_sibling(state, Direction::Up),
        Action::JumpSiblingDown => jump_to_sibling(state, Direction::Down),
        Action::ExpandAll => {
            let selected = state.selected_row().map(|r| r.resource);
            state.projection.expand_all(state.config.expand_depth);
            if let Some(resource) = selected {
                state.select_resource(&resource);
            }
        }
        Action::CollapseAll => {
            state.projection.collapse_all();
            state.tree_state.selected = 0;
            state.tree_state.offset = 0;
        }
        Action::Reroot => reroot_at_selection(state),
        Action::RerootBack => reroot_back(state),
    }
}

/// Expand a collapsed row; on an expanded one step into its first child.
fn handle_expand(state: &mut AppState) {
    let Some(row) = state.selected_row() else {
        return;
    };
    if !row.has_children {
        return;
    }
    if row.expanded {
        let count = state.projection.visible_row_count();
        state.tree_state.select_next(count);
    } else if let Err(e) = state.projection.expand(&row) {
        tracing::warn!(error = %e, "expand failed");
    }
}

/// Collapse an expanded row, otherwise move to its parent row.
fn handle_collapse(state: &mut AppState) {
    let Some(row) = state.selected_row() else {
        return;
    };

    if row.has_children && row.expanded {
        if let Err(e) = state.projection.collapse(&row) {
            tracing::warn!(error = %e, "collapse failed");
        }
    } else if let Ok(Some(parent)) = state.projection.parent_row(&row) {
        state.tree_state.selected = parent.index;
    }
}

enum Direction {
    Up,
    Down,
}

/// Jump to the next/previous row at the same depth, without leaving the
/// current parent.
fn jump_to_sibling(state: &mut AppState, direction: Direction) {
    let rows = state.projection.rows();
    let current = state.tree_state.selected;
    let Some(depth) = rows.get(current).map(|r| r.depth) else {
        return;
    };

    let candidates: Box<dyn Iterator<Item = usize>> = match direction {
        Direction::Down => Box::new((current + 1)..rows.len()),
        Direction::Up => Box::new((0..current).rev()),
    };
    for i in candidates {
        if rows[i].depth < depth {
            return;
        }
        if rows[i].depth == depth {
            state.tree_state.selected = i;
            return;
        }
    }
}

fn reroot_at_selection(state: &mut AppState) {
    let Some(row) = state.selected_row() else {
        return;
    };
    // Re-rooting at the current root climbs back to the previous one.
    if row.resource == *state.projection.root() {
        reroot_back(state);
        return;
    }
    state.previous_roots.push(state.projection.root().clone());
    apply_root(state, row.resource);
}

fn reroot_back(state: &mut AppState) {
    match state.previous_roots.pop() {
        Some(previous) => apply_root(state, previous),
        None => state.status_message = Some("already at the first root".into()),
    }
}

fn apply_root(state: &mut AppState, target: Resource) {
    let label = state.projection.format().resource(&target);
    tracing::info!(root = %target, "re-rooted");
    state.projection.set_root(target);
    state.tree_state.selected = 0;
    state.tree_state.offset = 0;
    state.status_message = Some(format!("root: {label}"));
}

// ── Columns menu (hardcoded keys) ───────────────────────────────

fn handle_columns_key(state: &mut AppState, key: KeyEvent) {
    let count = state.projection.columns().len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('c') => {
            state.active_view = ActiveView::Tree;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.columns_selected = state.columns_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.columns_selected + 1 < count {
                state.columns_selected += 1;
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => toggle_selected_column(state),
        KeyCode::Char('K') => move_selected_column(state, Direction::Up),
        KeyCode::Char('J') => move_selected_column(state, Direction::Down),
        _ => {}
    }
}

fn toggle_selected_column(state: &mut AppState) {
    let index = state.columns_selected;
    let visible = match state.projection.columns_mut().toggle_visibility(index) {
        Ok(visible) => visible,
        Err(e) => {
            tracing::debug!(error = %e, "no column to toggle");
            return;
        }
    };
    if let Some(column) = state.projection.columns().columns().get(index) {
        let predicate = column.predicate.as_iri().unwrap_or_default().to_string();
        state.config.set_column_hidden(&predicate, !visible);
        save_config(state);
    }
}

fn move_selected_column(state: &mut AppState, direction: Direction) {
    let from = state.columns_selected;
    let to = match direction {
        Direction::Up => match from.checked_sub(1) {
            Some(to) => to,
            None => return,
        },
        Direction::Down => from + 1,
    };
    if state.projection.columns_mut().move_column(from, to).is_ok() {
        state.columns_selected = to;
        state.config.column_order = state
            .projection
            .columns()
            .columns()
            .iter()
            .filter_map(|c| c.predicate.as_iri().map(str::to_string))
            .collect();
        save_config(state);
    }
}

fn save_config(state: &AppState) {
    let Some(path) = &state.config_file else {
        return;
    };
    if let Err(e) = state.config.save_to(path) {
        tracing::warn!(error = %e, path = %path.display(), "could not save config");
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Tree {
        return;
    }

    let layout = AppLayout::from_area(state.terminal_area);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if !point_in_rect(layout.tree_area, mouse.column, mouse.row) {
                return;
            }
            let Some(offset) = layout.row_at(mouse.row) else {
                return;
            };
            let Ok(row) = state.projection.nth_row(offset + state.tree_state.offset) else {
                state.last_left_click = None;
                return;
            };
            state.tree_state.selected = row.index;

            let now = Instant::now();
            let window = Duration::from_millis(state.config.double_click_ms);
            let is_repeat_click = state
                .last_left_click
                .as_ref()
                .is_some_and(|(last, at)| *last == row.resource && now.duration_since(*at) <= window);

            if is_repeat_click && row.has_children {
                if let Err(e) = state.projection.toggle(&row) {
                    tracing::warn!(error = %e, "toggle failed");
                }
                state.last_left_click = None;
            } else {
                state.last_left_click = Some((row.resource, now));
            }
        }
        MouseEventKind::ScrollUp => {
            state.tree_state.select_prev();
        }
        MouseEventKind::ScrollDown => {
            let visible_count = state.projection.visible_row_count();
            state.tree_state.select_next(visible_count);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::columns::ColumnRegistry;
    use crate::core::graph::{Containment, MemoryGraph, Triple};
    use crate::core::projection::{RootPolicy, TreeProjection};
    use crate::core::term::vocab;

    fn ex(s: &str) -> Resource {
        Resource::iri(format!("http://example.org/{s}"))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        state_with(RootPolicy::Shown)
    }

    /// r → (a → (a1, a2), b)
    fn state_with(policy: RootPolicy) -> AppState {
        let g = MemoryGraph::new(Containment::new(vec![ex("child")])).into_shared();
        {
            let mut g = g.borrow_mut();
            g.assert(Triple::new(ex("r"), ex("child"), ex("a")));
            g.assert(Triple::new(ex("r"), ex("child"), ex("b")));
            g.assert(Triple::new(ex("a"), ex("child"), ex("a1")));
            g.assert(Triple::new(ex("a"), ex("child"), ex("a2")));
        }
        let mut cols = ColumnRegistry::new();
        cols.add_column(Resource::iri(vocab::RDFS_LABEL), "Label", true);
        cols.add_column(Resource::iri(vocab::RDF_TYPE), "Type", true);
        let projection = TreeProjection::new(g, ex("r"))
            .with_columns(cols)
            .with_root_policy(policy);
        AppState::new(projection, "test".into(), AppConfig::default())
    }

    fn selected(state: &AppState) -> Resource {
        state.selected_row().map(|r| r.resource).unwrap()
    }

    #[test]
    fn right_expands_then_descends() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Down));
        assert_eq!(selected(&s), ex("a"));
        handle_key(&mut s, key(KeyCode::Right));
        assert_eq!(s.projection.visible_row_count(), 5);
        assert_eq!(selected(&s), ex("a"));
        handle_key(&mut s, key(KeyCode::Right));
        assert_eq!(selected(&s), ex("a1"));
    }

    #[test]
    fn left_collapses_or_climbs() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Down));
        handle_key(&mut s, key(KeyCode::Right));
        handle_key(&mut s, key(KeyCode::Down));
        assert_eq!(selected(&s), ex("a1"));

        handle_key(&mut s, key(KeyCode::Left));
        assert_eq!(selected(&s), ex("a"));
        handle_key(&mut s, key(KeyCode::Left));
        assert_eq!(s.projection.visible_row_count(), 3);
        handle_key(&mut s, key(KeyCode::Left));
        assert_eq!(selected(&s), ex("r"));
    }

    #[test]
    fn sibling_jump_stays_under_parent() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('e')));
        assert_eq!(s.projection.visible_row_count(), 5);
        handle_key(&mut s, key(KeyCode::Down));
        let alt_down = KeyEvent::new(KeyCode::Down, KeyModifiers::ALT);
        handle_key(&mut s, alt_down);
        assert_eq!(selected(&s), ex("b"));
        handle_key(&mut s, alt_down);
        assert_eq!(selected(&s), ex("b"));

        s.tree_state.selected = 3; // a2
        handle_key(&mut s, KeyEvent::new(KeyCode::Up, KeyModifiers::ALT));
        assert_eq!(selected(&s), ex("a1"));
        handle_key(&mut s, KeyEvent::new(KeyCode::Up, KeyModifiers::ALT));
        assert_eq!(selected(&s), ex("a1"));
    }

    #[test]
    fn collapse_all_resets_cursor() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('e')));
        handle_key(&mut s, key(KeyCode::End));
        assert_eq!(s.tree_state.selected, 4);
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT));
        assert_eq!(s.projection.visible_row_count(), 3);
        assert_eq!(s.tree_state.selected, 0);
    }

    #[test]
    fn reroot_and_back() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Down));
        handle_key(&mut s, key(KeyCode::Char('r')));
        assert_eq!(*s.projection.root(), ex("a"));
        assert_eq!(s.projection.visible_row_count(), 3);
        assert!(s.status_message.is_some());

        handle_key(&mut s, key(KeyCode::Char('r')));
        assert_eq!(*s.projection.root(), ex("r"));
    }

    #[test]
    fn columns_menu_moves_columns() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('c')));
        assert_eq!(s.active_view, ActiveView::ColumnsMenu);

        handle_key(&mut s, key(KeyCode::Char('j')));
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
        assert_eq!(s.columns_selected, 0);
        assert_eq!(s.projection.nth_column(0).unwrap().label, "Type");

        handle_key(&mut s, key(KeyCode::Esc));
        assert_eq!(s.active_view, ActiveView::Tree);
    }

    #[test]
    fn double_click_toggles() {
        let mut s = state();
        s.terminal_area = ratatui::layout::Rect::new(0, 0, 80, 20);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 3, // second row: `a`
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut s, click);
        assert_eq!(selected(&s), ex("a"));
        assert_eq!(s.projection.visible_row_count(), 3);
        handle_mouse(&mut s, click);
        assert_eq!(s.projection.visible_row_count(), 5);
    }

    #[test]
    fn back_action_works_with_hidden_root() {
        let mut s = state_with(RootPolicy::Hidden);
        assert_eq!(selected(&s), ex("a"));
        handle_key(&mut s, key(KeyCode::Char('r')));
        assert_eq!(*s.projection.root(), ex("a"));
        assert_eq!(selected(&s), ex("a1"));
        handle_key(&mut s, key(KeyCode::Char('r')));
        assert_eq!(s.projection.visible_row_count(), 0);

        handle_key(&mut s, key(KeyCode::Backspace));
        assert_eq!(*s.projection.root(), ex("a"));
        handle_key(&mut s, key(KeyCode::Backspace));
        assert_eq!(*s.projection.root(), ex("r"));
        handle_key(&mut s, key(KeyCode::Backspace));
        assert_eq!(*s.projection.root(), ex("r"));
        assert!(s.status_message.is_some());
    }

    #[test]
    fn moving_a_column_saves_the_order() {
        let dir = std::env::temp_dir().join(format!("rdf-tree-handler-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut s = state();
        s.config_file = Some(path.clone());

        handle_key(&mut s, key(KeyCode::Char('c')));
        handle_key(&mut s, key(KeyCode::Char('j')));
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
        assert_eq!(
            s.config.column_order,
            [vocab::RDF_TYPE.to_string(), vocab::RDFS_LABEL.to_string()]
        );

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains(&format!(
            "column_order = {}, {}",
            vocab::RDF_TYPE,
            vocab::RDFS_LABEL
        )));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
