//! Popup overlay for choosing and ordering the predicate columns.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::core::columns::ColumnRegistry;
use crate::core::format::CellFormat;

use super::theme::Theme;

// ───────────────────────────────────────── columns popup ─────

/// Every registered column with a visibility checkbox.
pub struct ColumnsPopup<'a> {
    pub columns: &'a ColumnRegistry,
    pub format: &'a CellFormat,
    /// Highlighted entry (all-columns index).
    pub selected: usize,
}

impl<'a> Widget for ColumnsPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // entries + blank + hint + blank + borders
        let height = (self.columns.len().max(1) as u16) + 5;
        let popup = centered_fixed(60, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Columns ")
            .title_style(Theme::popup_title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::hint_style());

        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        if self.columns.is_empty() {
            lines.push(Line::from(Span::styled("   no columns", Theme::empty_style())));
        }
        for (i, column) in self.columns.columns().iter().enumerate() {
            let is_selected = i == self.selected;
            let prefix = if is_selected { " ▸ " } else { "   " };
            let check = if column.visible { "[x]" } else { "[ ]" };
            let label = format!("{prefix}{check} {:<16}", column.label);
            let predicate_width = (inner.width as usize).saturating_sub(label.chars().count());
            let predicate = self.format.resource(&column.predicate);

            lines.push(Line::from(vec![
                Span::styled(label, Theme::popup_item_style(is_selected)),
                Span::styled(
                    format!("{predicate:>predicate_width$}"),
                    Theme::hint_style(),
                ),
            ]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Space: show/hide  J/K: move  Esc: close",
            Theme::hint_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
