//! Custom Ratatui widget that renders a [`TreeProjection`] as an indented,
//! collapsible tree with one column per visible predicate.
//!
//! The first visible column doubles as the tree column: it carries the
//! indentation and the fold marker in front of its cell text.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::graph::GraphStore;
use crate::core::model::TreeDataModel;
use crate::core::projection::{TreeItem, TreeProjection};

use super::theme::Theme;

/// Blank cells between two columns.
const COLUMN_GAP: u16 = 1;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the tree widget (selected index, scroll offset).
#[derive(Debug, Default)]
pub struct TreeWidgetState {
    /// Index into the flat visible-row list that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first rendered row).
    pub offset: usize,
}

impl TreeWidgetState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected row is visible within the viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

// ───────────────────────────────────────── cells ─────────────

/// Header labels of the visible columns.  With no visible column the
/// resource itself is shown under a synthetic heading.
pub fn header_labels<S: GraphStore>(projection: &TreeProjection<S>) -> Vec<String> {
    let labels: Vec<String> = (0..projection.column_count())
        .filter_map(|n| projection.nth_column(n).ok())
        .map(|c| c.label)
        .collect();
    if labels.is_empty() {
        vec!["Resource".to_string()]
    } else {
        labels
    }
}

/// Cell texts of `row`, one per visible column.  An empty tree-column cell
/// falls back to the resource name so every row stays identifiable.
pub fn row_cells<S: GraphStore>(projection: &TreeProjection<S>, row: &TreeItem) -> Vec<String> {
    let mut cells: Vec<String> = (0..projection.column_count())
        .filter_map(|n| projection.nth_column(n).ok())
        .map(|column| projection.cell_text(row, &column).unwrap_or_default())
        .collect();
    match cells.first_mut() {
        Some(first) if first.is_empty() => *first = projection.format().resource(&row.resource),
        Some(_) => {}
        None => cells.push(projection.format().resource(&row.resource)),
    }
    cells
}

/// `▼`/`▶` for rows with children, blank otherwise; preceded by two
/// spaces per depth level.
pub fn tree_prefix(row: &TreeItem) -> String {
    let marker = match (row.has_children, row.expanded) {
        (true, true) => "▼ ",
        (true, false) => "▶ ",
        (false, _) => "  ",
    };
    format!("{}{marker}", "  ".repeat(row.depth))
}

/// Split `total` cells among columns: hinted columns get their hint (as
/// far as space allows), the rest share what is left evenly, with any
/// remainder going to the first flexible column.
pub fn column_widths(hints: &[Option<u16>], total: u16) -> Vec<u16> {
    if hints.is_empty() {
        return Vec::new();
    }
    let gaps = (hints.len() as u16 - 1).saturating_mul(COLUMN_GAP);
    let mut remaining = total.saturating_sub(gaps);

    let mut widths: Vec<u16> = hints
        .iter()
        .map(|hint| {
            let w = hint.unwrap_or(0).min(remaining);
            remaining -= w;
            w
        })
        .collect();

    let flexible: Vec<usize> = hints
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_none())
        .map(|(i, _)| i)
        .collect();
    if let Some(&first) = flexible.first() {
        let share = remaining / flexible.len() as u16;
        for &i in &flexible {
            widths[i] = share;
        }
        widths[first] += remaining - share * flexible.len() as u16;
    }
    widths
}

/// Pad or cut `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        format!("{text:<width$}")
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

// ───────────────────────────────────────── widget ────────────

/// The tree widget itself, created fresh each frame.
pub struct TreeWidget<'a, S> {
    projection: &'a TreeProjection<S>,
    block: Option<Block<'a>>,
}

impl<'a, S: GraphStore> TreeWidget<'a, S> {
    pub fn new(projection: &'a TreeProjection<S>) -> Self {
        Self {
            projection,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn widths(&self, total: u16) -> Vec<u16> {
        let hints: Vec<Option<u16>> = (0..self.projection.column_count())
            .filter_map(|n| self.projection.nth_column(n).ok())
            .map(|c| c.width)
            .collect();
        if hints.is_empty() {
            vec![total]
        } else {
            column_widths(&hints, total)
        }
    }
}

fn cells_line(cells: Vec<(String, Style)>, widths: &[u16]) -> Line<'static> {
    let gap = " ".repeat(COLUMN_GAP as usize);
    let mut spans = Vec::with_capacity(cells.len() * 2);
    for (i, ((text, style), &width)) in cells.into_iter().zip(widths).enumerate() {
        if i > 0 {
            spans.push(Span::raw(gap.clone()));
        }
        spans.push(Span::styled(fit(&text, width as usize), style));
    }
    Line::from(spans)
}

impl<'a, S: GraphStore> StatefulWidget for TreeWidget<'a, S> {
    type State = TreeWidgetState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.height == 0 {
            return;
        }

        let widths = self.widths(inner.width);
        let header = header_labels(self.projection)
            .into_iter()
            .map(|label| (label, Theme::header_style()))
            .collect();
        buf.set_line(inner.x, inner.y, &cells_line(header, &widths), inner.width);

        let body_height = inner.height.saturating_sub(1) as usize;
        let rows = self.projection.rows();
        if rows.is_empty() {
            if body_height > 0 {
                let line = Line::from(Span::styled("(nothing to show)", Theme::empty_style()));
                buf.set_line(inner.x, inner.y + 1, &line, inner.width);
            }
            return;
        }
        state.clamp_scroll(body_height);

        for (i, row) in rows.iter().skip(state.offset).take(body_height).enumerate() {
            let y = inner.y + 1 + i as u16;
            let is_selected = row.index == state.selected;

            let tree_style = if is_selected {
                Theme::selected_style()
            } else if row.has_children {
                Theme::branch_style()
            } else {
                Theme::leaf_style()
            };
            let cell_style = if is_selected {
                Theme::selected_style()
            } else {
                Theme::cell_style()
            };

            let cells = row_cells(self.projection, row)
                .into_iter()
                .enumerate()
                .map(|(c, text)| {
                    if c == 0 {
                        (format!("{}{text}", tree_prefix(row)), tree_style)
                    } else {
                        (text, cell_style)
                    }
                })
                .collect();
            buf.set_line(inner.x, y, &cells_line(cells, &widths), inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::columns::ColumnRegistry;
    use crate::core::graph::{Containment, MemoryGraph, Triple};
    use crate::core::term::{vocab, Literal, Resource};

    fn ex(s: &str) -> Resource {
        Resource::iri(format!("http://example.org/{s}"))
    }

    #[test]
    fn widths_share_remaining_space() {
        assert_eq!(column_widths(&[None, Some(10), None], 41), vec![15, 10, 14]);
        assert_eq!(column_widths(&[Some(50), None], 20), vec![19, 0]);
        assert_eq!(column_widths(&[None], 7), vec![7]);
        assert!(column_widths(&[], 7).is_empty());
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn prefix_reflects_depth_and_state() {
        let g = MemoryGraph::new(Containment::new(vec![ex("child")])).into_shared();
        g.borrow_mut()
            .assert(Triple::new(ex("r"), ex("child"), ex("a")));
        let p = TreeProjection::new(g, ex("r"));
        let rows = p.rows();
        assert_eq!(tree_prefix(&rows[0]), "▼ ");
        assert_eq!(tree_prefix(&rows[1]), "    ");
    }

    #[test]
    fn row_cells_fall_back_to_resource_name() {
        let g = MemoryGraph::new(Containment::new(vec![ex("child")])).into_shared();
        let label = Resource::iri(vocab::RDFS_LABEL);
        g.borrow_mut()
            .assert(Triple::new(ex("r"), ex("child"), ex("a")));
        g.borrow_mut()
            .assert(Triple::new(ex("a"), label.clone(), Literal::plain("Alpha")));

        let bare = TreeProjection::new(g.clone(), ex("r"));
        let rows = bare.rows();
        assert_eq!(header_labels(&bare), ["Resource"]);
        assert_eq!(row_cells(&bare, &rows[0]), ["http://example.org/r"]);

        let mut cols = ColumnRegistry::new();
        cols.add_column(label, "Label", true);
        let p = TreeProjection::new(g, ex("r")).with_columns(cols);
        let rows = p.rows();
        assert_eq!(row_cells(&p, &rows[0]), ["http://example.org/r"]);
        assert_eq!(row_cells(&p, &rows[1]), ["Alpha"]);
    }
}
