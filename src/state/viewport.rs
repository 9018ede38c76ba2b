//! Virtual scrolling for the grid.
//!
//! Rows have an estimated fixed height; only rows intersecting the scroll
//! window (plus overscan) are rendered, with spacers standing in for the rest
//! so the scrollbar keeps its proportions. Columns have known widths and the
//! `#` column is pinned to the left edge.
//!
//! The header row sticks to the top of the scroll container. Row `r` starts
//! at `header_height + r * row_height` in content space, and the top
//! `header_height` pixels of the viewport never show a data row.

use std::ops::Range;

use crate::state::edit_session::CellPosition;

/// Rows to render and the spacer heights around them.
#[derive(Clone, Debug, PartialEq)]
pub struct RowWindow {
    pub rows: Range<usize>,
    pub pad_top: f64,
    pub pad_bottom: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VirtualWindow {
    row_height: f64,
    header_height: f64,
    overscan: usize,
    viewport_height: f64,
    scroll_top: f64,
    row_count: usize,
}

impl VirtualWindow {
    pub fn new(row_height: f64, overscan: usize) -> Self {
        Self {
            row_height: if row_height > 0.0 { row_height } else { 1.0 },
            header_height: 0.0,
            overscan,
            viewport_height: 0.0,
            scroll_top: 0.0,
            row_count: 0,
        }
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Height of all rows, excluding the header.
    pub fn total_height(&self) -> f64 {
        self.row_count as f64 * self.row_height
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.header_height + self.total_height() - self.viewport_height).max(0.0)
    }

    /// Viewport height left for data rows under the sticky header.
    fn rows_viewport_height(&self) -> f64 {
        (self.viewport_height - self.header_height).max(0.0)
    }

    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    pub fn set_header_height(&mut self, height: f64) {
        self.header_height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top.clamp(0.0, self.max_scroll_top());
    }

    /// Rows intersecting the viewport, widened by the overscan margin.
    pub fn window(&self) -> RowWindow {
        if self.row_count == 0 {
            return RowWindow {
                rows: 0..0,
                pad_top: 0.0,
                pad_bottom: 0.0,
            };
        }

        let first_visible = (self.scroll_top / self.row_height).floor() as usize;
        let end_visible = ((self.scroll_top + self.rows_viewport_height()) / self.row_height)
            .ceil() as usize;
        let first_visible = first_visible.min(self.row_count);
        let end_visible = end_visible.max(first_visible + 1).min(self.row_count);

        let start = first_visible.saturating_sub(self.overscan);
        let end = (end_visible + self.overscan).min(self.row_count);

        RowWindow {
            rows: start..end,
            pad_top: start as f64 * self.row_height,
            pad_bottom: (self.row_count - end) as f64 * self.row_height,
        }
    }

    /// Whether `row` is fully inside the part of the viewport below the header.
    pub fn is_row_visible(&self, row: usize) -> bool {
        let top = row as f64 * self.row_height;
        top >= self.scroll_top
            && top + self.row_height <= self.scroll_top + self.rows_viewport_height()
    }

    /// Smallest scroll that brings `row` fully into view, if any is needed.
    pub fn scroll_to_row(&mut self, row: usize) -> Option<f64> {
        if row >= self.row_count {
            return None;
        }
        // Offsets relative to the first row, which sits right under the header.
        let top = row as f64 * self.row_height;
        let bottom = top + self.row_height;

        let target = if top < self.scroll_top {
            top
        } else if bottom > self.scroll_top + self.rows_viewport_height() {
            bottom - self.rows_viewport_height()
        } else {
            return None;
        };

        let target = target.clamp(0.0, self.max_scroll_top());
        if target == self.scroll_top {
            return None;
        }
        self.scroll_top = target;
        Some(target)
    }

    /// Whether the rendered window reaches within `threshold` rows of the loaded end.
    pub fn near_end(&self, threshold: usize) -> bool {
        self.window().rows.end + threshold >= self.row_count
    }
}

/// A horizontal extent in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Minimal signed scroll change that puts `cell` inside `viewport`.
///
/// A cell wider than the viewport is aligned to the viewport's leading edge.
pub fn scroll_delta(cell: Span, viewport: Span) -> f64 {
    if cell.start < viewport.start || cell.width() > viewport.width() {
        cell.start - viewport.start
    } else if cell.end > viewport.end {
        cell.end - viewport.end
    } else {
        0.0
    }
}

/// Column widths in leaf order; leaf 0 is the pinned `#` column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLayout {
    widths: Vec<f64>,
}

impl ColumnLayout {
    pub fn uniform(index_width: f64, column_width: f64, data_columns: usize) -> Self {
        let mut widths = Vec::with_capacity(data_columns + 1);
        widths.push(index_width);
        widths.extend(std::iter::repeat(column_width).take(data_columns));
        Self { widths }
    }

    pub fn pinned_width(&self) -> f64 {
        self.widths.first().copied().unwrap_or(0.0)
    }

    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }

    /// Content-space extent of a leaf column.
    pub fn span(&self, col: usize) -> Option<Span> {
        let width = *self.widths.get(col)?;
        let start: f64 = self.widths.iter().take(col).sum();
        Some(Span::new(start, start + width))
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct HorizontalViewport {
    pub scroll_left: f64,
    pub width: f64,
}

impl HorizontalViewport {
    /// New `scroll_left` that reveals leaf column `col`, if it must change.
    ///
    /// The area under the pinned `#` column does not count as visible.
    pub fn reveal(&mut self, layout: &ColumnLayout, col: usize) -> Option<f64> {
        if col == 0 {
            return None;
        }
        let cell = layout.span(col)?;
        let visible = Span::new(
            self.scroll_left + layout.pinned_width(),
            self.scroll_left + self.width,
        );
        let delta = scroll_delta(cell, visible);
        if delta == 0.0 {
            return None;
        }
        let max_left = (layout.total_width() - self.width).max(0.0);
        let target = (self.scroll_left + delta).clamp(0.0, max_left);
        if target == self.scroll_left {
            return None;
        }
        self.scroll_left = target;
        Some(target)
    }
}

/// Scroll offsets to apply after the selection moved.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollTarget {
    pub top: Option<f64>,
    pub left: Option<f64>,
}

impl ScrollTarget {
    pub fn is_none(&self) -> bool {
        self.top.is_none() && self.left.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridViewport {
    pub rows: VirtualWindow,
    pub columns: HorizontalViewport,
}

impl GridViewport {
    pub fn new(row_height: f64, overscan: usize) -> Self {
        Self {
            rows: VirtualWindow::new(row_height, overscan),
            columns: HorizontalViewport::default(),
        }
    }

    pub fn reveal(&mut self, layout: &ColumnLayout, position: CellPosition) -> ScrollTarget {
        ScrollTarget {
            top: self.rows.scroll_to_row(position.row),
            left: self.columns.reveal(layout, position.col),
        }
    }
}
