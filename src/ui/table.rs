use std::rc::Rc;

use dioxus::prelude::{Key, Modifiers, *};

use crate::io::commit_queue::CommitQueue;
use crate::state::data_model::{self, Column, ColumnType};
use crate::state::edit_session::CellPosition;
use crate::state::navigation::{self, GridKey, KeyEvent, KeyModifiers, KeyOutcome};
use crate::state::viewport::{ColumnLayout, GridViewport};
use crate::ui::actions;
use crate::ui::app::{AppContext, GridSignals};

const SCROLL_ID: &str = "grid-scroll";
const LOAD_MORE_THRESHOLD: usize = 5;

#[component]
pub fn Grid(signals: GridSignals) -> Element {
    let ctx = Rc::new(use_context::<AppContext>());
    let queue = Rc::new(use_context::<CommitQueue>());
    let settings = ctx.settings;
    let mut viewport = use_signal(|| {
        let mut viewport = GridViewport::new(settings.row_height, settings.overscan);
        // Replaced by the measured header once it mounts.
        viewport.rows.set_header_height(settings.row_height);
        viewport
    });
    let mut scroller = use_signal::<Option<Rc<MountedData>>>(|| None);

    use_effect(move || {
        let count = signals.grid.read().row_count();
        viewport.with_mut(|vp| vp.rows.set_row_count(count));
    });

    let grid = signals.grid.read();
    let session = signals.session.read();
    let columns: Vec<Column> = grid.columns().to_vec();
    let rendered = grid.rendered_rows(session.overlay());
    let row_count = grid.row_count();
    let total_rows = grid.total_rows();
    let has_table = grid.table().is_some();
    let selection = session.selection();
    let editing = session.editing().cloned();
    let inline_error = session.error().cloned();
    drop(session);
    drop(grid);

    let layout = Rc::new(ColumnLayout::uniform(
        settings.index_column_width,
        settings.column_width,
        columns.len(),
    ));
    let window = {
        let mut rows = viewport.read().rows.clone();
        rows.set_row_count(row_count);
        rows.window()
    };
    let row_height = settings.row_height;

    if !has_table {
        return rsx! {
            p { class: "empty-message", id: "empty-message", "Loading table\u{2026}" }
        };
    }

    rsx! {
        div {
            class: "grid-scroll",
            id: SCROLL_ID,
            tabindex: "0",
            onmounted: move |evt: MountedEvent| async move {
                let element = evt.data();
                if let Ok(rect) = element.get_client_rect().await {
                    viewport.with_mut(|vp| {
                        vp.rows.set_viewport_height(rect.size.height);
                        vp.columns.width = rect.size.width;
                    });
                }
                scroller.set(Some(element));
            },
            onscroll: {
                let ctx = ctx.clone();
                move |_| {
                    let ctx = ctx.clone();
                    async move {
                        let Some(element) = scroller.peek().clone() else {
                            return;
                        };
                        let offset = element.get_scroll_offset().await;
                        let rect = element.get_client_rect().await;
                        viewport.with_mut(|vp| {
                            if let Ok(rect) = rect {
                                vp.rows.set_viewport_height(rect.size.height);
                                vp.columns.width = rect.size.width;
                            }
                            if let Ok(offset) = offset {
                                vp.rows.set_scroll_top(offset.y);
                                vp.columns.scroll_left = offset.x;
                            }
                        });
                        let near_end = viewport.peek().rows.near_end(LOAD_MORE_THRESHOLD);
                        if near_end {
                            actions::load_more((*ctx).clone(), signals).await;
                        }
                    }
                }
            },
            onkeydown: {
                let ctx = ctx.clone();
                let queue = queue.clone();
                let layout = layout.clone();
                move |evt: KeyboardEvent| {
                    let event = translate_key(&evt);
                    if dispatch_key(&ctx, &queue, signals, viewport, &layout, event) {
                        evt.prevent_default();
                    }
                }
            },
            table { class: "grid", style: "width: {layout.total_width()}px",
                thead {
                    onmounted: move |evt: MountedEvent| async move {
                        if let Ok(rect) = evt.data().get_client_rect().await {
                            viewport.with_mut(|vp| vp.rows.set_header_height(rect.size.height));
                        }
                    },
                    tr {
                        th {
                            class: "row-number sticky-col",
                            style: "width: {settings.index_column_width}px",
                            "#"
                        }
                        for column in columns.iter() {
                            th {
                                key: "{column.id}",
                                class: header_class(column.column_type),
                                id: format!("col-{}", column.id),
                                style: "width: {settings.column_width}px",
                                title: "{column.column_type.as_str()}",
                                "{column.name}"
                            }
                        }
                    }
                }
                tbody {
                    tr { class: "spacer", style: "height: {window.pad_top}px" }
                    for (row_pos, row) in rendered
                        .iter()
                        .enumerate()
                        .skip(window.rows.start)
                        .take(window.rows.len())
                    {
                        tr {
                            key: "{row.row_id}",
                            class: stripe(row_pos),
                            style: "height: {row_height}px",
                            td { class: "row-number sticky-col", "{row_pos + 1}" }
                            for (idx, value) in row.values.iter().enumerate() {
                                {
                                    let position = CellPosition::new(row_pos, idx + 1);
                                    let is_selected = selection == Some(position);
                                    let edit = editing.as_ref().filter(|edit| edit.position == position);
                                    let failed = inline_error.as_ref().is_some_and(|err| {
                                        err.key.row_id == row.row_id
                                            && columns.get(idx).is_some_and(|c| c.id == err.key.column_id)
                                    });
                                    let pending = row.pending.get(idx).copied().unwrap_or(false);
                                    let class = cell_class(is_selected, pending, failed);
                                    if let Some(edit) = edit {
                                        let column_type = edit.column_type;
                                        let draft = edit.draft.clone();
                                        rsx! {
                                            td { class: "{class} editing-cell",
                                                input {
                                                    class: "cell-input",
                                                    id: "cell-editor",
                                                    value: "{draft}",
                                                    autofocus: true,
                                                    inputmode: input_mode(column_type),
                                                    oninput: move |evt: FormEvent| {
                                                        let value = evt.value();
                                                        let mut session = signals.session;
                                                        if !session.with_mut(|session| session.set_draft(&value)) {
                                                            let kept = session.peek().draft().unwrap_or_default().to_string();
                                                            restore_editor(&kept);
                                                        }
                                                    },
                                                    onkeydown: {
                                                        let ctx = ctx.clone();
                                                        let queue = queue.clone();
                                                        let layout = layout.clone();
                                                        move |evt: KeyboardEvent| {
                                                            let event = translate_key(&evt);
                                                            match event.key {
                                                                GridKey::Enter | GridKey::Escape | GridKey::Tab => {
                                                                    evt.stop_propagation();
                                                                    evt.prevent_default();
                                                                    dispatch_key(&ctx, &queue, signals, viewport, &layout, event);
                                                                    refocus(scroller);
                                                                }
                                                                GridKey::Char(ch) => {
                                                                    evt.stop_propagation();
                                                                    if !data_model::accepts_char(column_type, ch) {
                                                                        evt.prevent_default();
                                                                    }
                                                                }
                                                                _ => evt.stop_propagation(),
                                                            }
                                                        }
                                                    },
                                                    onblur: {
                                                        let ctx = ctx.clone();
                                                        let queue = queue.clone();
                                                        move |_| {
                                                            let mut session = signals.session;
                                                            let commit = session.with_mut(|session| session.commit());
                                                            actions::submit_commit(&queue, &ctx, signals, commit);
                                                        }
                                                    },
                                                }
                                            }
                                        }
                                    } else {
                                        let text = data_model::display_value(value);
                                        rsx! {
                                            td {
                                                class: "{class}",
                                                onclick: {
                                                    let ctx = ctx.clone();
                                                    let queue = queue.clone();
                                                    let layout = layout.clone();
                                                    move |_| {
                                                        let mut session = signals.session;
                                                        let commit = session.with_mut(|session| session.select(position));
                                                        actions::submit_commit(&queue, &ctx, signals, commit);
                                                        reveal(viewport, &layout, position);
                                                    }
                                                },
                                                ondoubleclick: {
                                                    let ctx = ctx.clone();
                                                    let queue = queue.clone();
                                                    move |_| {
                                                        let mut session = signals.session;
                                                        let grid = signals.grid.read();
                                                        let commit = session.with_mut(|session| session.double_click(&grid, position));
                                                        actions::submit_commit(&queue, &ctx, signals, commit);
                                                    }
                                                },
                                                "{text}"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    tr { class: "spacer", style: "height: {window.pad_bottom}px" }
                }
            }
            if total_rows > row_count {
                div { class: "grid-footer", id: "grid-footer",
                    "Showing {row_count} of {total_rows} rows"
                }
            }
        }
    }
}

fn header_class(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "col-header",
        ColumnType::Number => "col-header numeric",
    }
}

fn stripe(row_pos: usize) -> &'static str {
    if row_pos % 2 == 0 {
        "even"
    } else {
        "odd"
    }
}

fn input_mode(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "text",
        ColumnType::Number => "decimal",
    }
}

fn cell_class(selected: bool, pending: bool, failed: bool) -> String {
    let mut class = String::from("cell");
    if selected {
        class.push_str(" selected");
    }
    if pending {
        class.push_str(" pending");
    }
    if failed {
        class.push_str(" failed");
    }
    class
}

fn translate_key(evt: &KeyboardEvent) -> KeyEvent {
    let modifiers = evt.modifiers();
    let modifiers = KeyModifiers {
        ctrl: modifiers.contains(Modifiers::CONTROL),
        meta: modifiers.contains(Modifiers::META),
        alt: modifiers.contains(Modifiers::ALT),
        shift: modifiers.contains(Modifiers::SHIFT),
    };
    let key = match evt.key() {
        Key::ArrowUp => GridKey::ArrowUp,
        Key::ArrowDown => GridKey::ArrowDown,
        Key::ArrowLeft => GridKey::ArrowLeft,
        Key::ArrowRight => GridKey::ArrowRight,
        Key::Tab => GridKey::Tab,
        Key::Enter => GridKey::Enter,
        Key::Escape => GridKey::Escape,
        Key::Backspace => GridKey::Backspace,
        Key::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => GridKey::Char(ch),
                _ => GridKey::Other,
            }
        }
        _ => GridKey::Other,
    };
    KeyEvent { key, modifiers }
}

/// Feeds a key to the session, sends any resulting commit and keeps the
/// selection in view. Returns whether the key was consumed.
fn dispatch_key(
    ctx: &AppContext,
    queue: &CommitQueue,
    signals: GridSignals,
    viewport: Signal<GridViewport>,
    layout: &ColumnLayout,
    event: KeyEvent,
) -> bool {
    let mut session = signals.session;
    let before = session.peek().selection();
    let outcome = {
        let grid = signals.grid.read();
        session.with_mut(|session| navigation::handle_key(session, &grid, event))
    };

    let handled = outcome.is_handled();
    if let KeyOutcome::Commit(commit) = outcome {
        actions::submit_commit(queue, ctx, signals, Some(commit));
    }

    let after = session.peek().selection();
    if let Some(position) = after.filter(|position| Some(*position) != before) {
        reveal(viewport, layout, position);
    }
    handled
}

fn reveal(mut viewport: Signal<GridViewport>, layout: &ColumnLayout, position: CellPosition) {
    let target = viewport.with_mut(|vp| vp.reveal(layout, position));
    if target.is_none() {
        return;
    }
    let mut script = format!("const el = document.getElementById('{SCROLL_ID}'); if (el) {{");
    if let Some(top) = target.top {
        script.push_str(&format!(" el.scrollTop = {top};"));
    }
    if let Some(left) = target.left {
        script.push_str(&format!(" el.scrollLeft = {left};"));
    }
    script.push_str(" }");
    let _ = document::eval(&script);
}

/// Puts the editor text back to `draft` after the browser applied an edit the
/// session refused.
fn restore_editor(draft: &str) {
    let Ok(literal) = serde_json::to_string(draft) else {
        return;
    };
    let _ = document::eval(&format!(
        "const el = document.getElementById('cell-editor'); if (el) {{ el.value = {literal}; }}"
    ));
}

fn refocus(scroller: Signal<Option<Rc<MountedData>>>) {
    if let Some(element) = scroller.peek().clone() {
        spawn(async move {
            let _ = element.set_focus(true).await;
        });
    }
}
