use gridbase::state::edit_session::CellPosition;
use gridbase::state::viewport::{
    scroll_delta, ColumnLayout, GridViewport, HorizontalViewport, Span, VirtualWindow,
};

fn window(rows: usize) -> VirtualWindow {
    let mut window = VirtualWindow::new(20.0, 2);
    window.set_row_count(rows);
    window.set_viewport_height(100.0);
    window
}

#[test]
fn test_window_at_top() {
    let window = window(100).window();
    assert_eq!(window.rows, 0..7);
    assert_eq!(window.pad_top, 0.0);
    assert_eq!(window.pad_bottom, 93.0 * 20.0);
}

#[test]
fn test_window_in_middle_keeps_total_height() {
    let mut vw = window(100);
    vw.set_scroll_top(400.0);
    let window = vw.window();
    assert_eq!(window.rows, 18..27);
    assert_eq!(window.pad_top, 360.0);
    assert_eq!(window.pad_bottom, 1460.0);
    let rendered = window.rows.len() as f64 * vw.row_height();
    assert_eq!(window.pad_top + rendered + window.pad_bottom, vw.total_height());
}

#[test]
fn test_empty_and_short_tables() {
    let empty = window(0).window();
    assert_eq!(empty.rows, 0..0);
    assert_eq!(empty.pad_bottom, 0.0);

    let short = window(3).window();
    assert_eq!(short.rows, 0..3);
    assert_eq!(short.pad_bottom, 0.0);
}

#[test]
fn test_scroll_is_clamped() {
    let mut vw = window(100);
    vw.set_scroll_top(1_000_000.0);
    assert_eq!(vw.scroll_top(), 1900.0);
    vw.set_scroll_top(-50.0);
    assert_eq!(vw.scroll_top(), 0.0);

    vw.set_scroll_top(1900.0);
    vw.set_row_count(10);
    assert_eq!(vw.scroll_top(), 100.0);
}

#[test]
fn test_scroll_to_row_is_minimal() {
    let mut vw = window(100);
    vw.set_scroll_top(400.0);

    assert_eq!(vw.scroll_to_row(30), Some(520.0));
    assert!(vw.is_row_visible(30));
    assert_eq!(vw.scroll_to_row(10), Some(200.0));
    assert_eq!(vw.scroll_to_row(11), None);
    assert_eq!(vw.scroll_to_row(500), None);
    assert_eq!(vw.scroll_top(), 200.0);
}

#[test]
fn test_near_end() {
    let mut vw = window(100);
    assert!(!vw.near_end(5));
    vw.set_scroll_top(vw.max_scroll_top());
    assert!(vw.near_end(5));
}

#[test]
fn test_zero_row_height_is_replaced() {
    let vw = VirtualWindow::new(0.0, 0);
    assert_eq!(vw.row_height(), 1.0);
}

#[test]
fn test_scroll_delta() {
    let viewport = Span::new(100.0, 300.0);
    assert_eq!(scroll_delta(Span::new(150.0, 250.0), viewport), 0.0);
    assert_eq!(scroll_delta(Span::new(250.0, 350.0), viewport), 50.0);
    assert_eq!(scroll_delta(Span::new(50.0, 150.0), viewport), -50.0);
    assert_eq!(scroll_delta(Span::new(0.0, 500.0), viewport), -100.0);
}

#[test]
fn test_column_layout_spans() {
    let layout = ColumnLayout::uniform(50.0, 100.0, 5);
    assert_eq!(layout.pinned_width(), 50.0);
    assert_eq!(layout.total_width(), 550.0);
    assert_eq!(layout.span(0), Some(Span::new(0.0, 50.0)));
    assert_eq!(layout.span(3), Some(Span::new(250.0, 350.0)));
    assert_eq!(layout.span(6), None);
}

#[test]
fn test_horizontal_reveal_respects_pinned_column() {
    let layout = ColumnLayout::uniform(50.0, 100.0, 5);
    let mut hv = HorizontalViewport {
        scroll_left: 0.0,
        width: 300.0,
    };

    assert_eq!(hv.reveal(&layout, 2), None);
    assert_eq!(hv.reveal(&layout, 3), Some(50.0));
    // Column 1 now sits partly under the pinned index column.
    assert_eq!(hv.reveal(&layout, 1), Some(0.0));
    assert_eq!(hv.reveal(&layout, 0), None);
    assert_eq!(hv.reveal(&layout, 5), Some(250.0));
}

#[test]
fn test_grid_viewport_reveal() {
    let layout = ColumnLayout::uniform(50.0, 100.0, 5);
    let mut vp = GridViewport::new(20.0, 2);
    vp.rows.set_row_count(100);
    vp.rows.set_viewport_height(100.0);
    vp.columns.width = 300.0;

    let target = vp.reveal(&layout, CellPosition::new(30, 3));
    assert_eq!(target.top, Some(520.0));
    assert_eq!(target.left, Some(50.0));
    assert!(vp.reveal(&layout, CellPosition::new(30, 3)).is_none());
}

fn window_with_header(rows: usize, header: f64) -> VirtualWindow {
    let mut window = VirtualWindow::new(32.0, 2);
    window.set_row_count(rows);
    window.set_viewport_height(320.0);
    window.set_header_height(header);
    window
}

#[test]
fn test_scroll_down_clears_sticky_header() {
    let mut vw = window_with_header(100, 29.0);

    // Row 9 ends at 29 + 320 = 349px, past the 320px viewport.
    assert!(!vw.is_row_visible(9));
    assert!(vw.is_row_visible(8));

    let target = vw.scroll_to_row(10).unwrap();
    assert_eq!(target, 61.0);
    let row_bottom_in_viewport = 29.0 + 11.0 * 32.0 - target;
    assert!(row_bottom_in_viewport <= 320.0);
    assert!(vw.is_row_visible(10));
}

#[test]
fn test_scroll_up_puts_row_under_header() {
    let mut vw = window_with_header(100, 29.0);
    vw.set_scroll_top(1000.0);

    let target = vw.scroll_to_row(5).unwrap();
    assert_eq!(target, 160.0);
    let row_top_in_viewport = 29.0 + 5.0 * 32.0 - target;
    assert_eq!(row_top_in_viewport, 29.0);
    assert!(vw.is_row_visible(5));
}

#[test]
fn test_header_counts_towards_scroll_range() {
    let mut vw = window_with_header(100, 29.0);
    assert_eq!(vw.max_scroll_top(), 29.0 + 3200.0 - 320.0);

    vw.set_scroll_top(vw.max_scroll_top());
    assert!(vw.is_row_visible(99));
    assert_eq!(vw.window().rows.end, 100);
}

#[test]
fn test_window_excludes_header_area() {
    let vw = window_with_header(100, 64.0);
    // 256px left for rows: 8 visible rows plus 2 overscan.
    assert_eq!(vw.window().rows, 0..10);
}
