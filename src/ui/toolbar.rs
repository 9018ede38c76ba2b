use dioxus::prelude::*;

use crate::state::data_model::{ColumnType, InsertPosition};
use crate::ui::actions;
use crate::ui::app::{AppContext, GridSignals};

#[component]
pub fn Toolbar(signals: GridSignals) -> Element {
    let ctx = use_context::<AppContext>();
    let mut column_name = use_signal(String::new);
    let mut column_type = use_signal(|| ColumnType::Text);

    let (row_count, total_rows, has_more) = {
        let grid = signals.grid.read();
        (grid.row_count(), grid.total_rows(), grid.has_more_rows())
    };
    let has_row = actions::selected_row(signals).is_some();
    let has_column = actions::selected_column(signals).is_some();
    let inline_error = signals.session.read().error().cloned();
    let mut error_message = signals.error_message;
    let loading = *signals.loading.read();

    rsx! {
        div { class: "toolbar",
            // Row group
            div { class: "toolbar-group",
                button {
                    class: "toolbar-btn",
                    id: "btn-add-row",
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::add_row(ctx, signals));
                        }
                    },
                    "\u{2795} Row"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-insert-row-above",
                    disabled: !has_row,
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::insert_row(ctx, signals, InsertPosition::Before));
                        }
                    },
                    "\u{2191} Insert above"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-insert-row-below",
                    disabled: !has_row,
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::insert_row(ctx, signals, InsertPosition::After));
                        }
                    },
                    "\u{2193} Insert below"
                }
                button {
                    class: "toolbar-btn toolbar-btn-danger",
                    id: "btn-delete-row",
                    disabled: !has_row,
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::delete_row(ctx, signals));
                        }
                    },
                    "\u{1F5D1} Row"
                }
            }
            div { class: "toolbar-separator" }

            // Column group
            div { class: "toolbar-group",
                input {
                    class: "toolbar-input",
                    id: "input-column-name",
                    placeholder: "Column name",
                    value: "{column_name.read()}",
                    oninput: move |evt| {
                        column_name.set(evt.value());
                    }
                }
                select {
                    class: "toolbar-select toolbar-select-sm",
                    id: "select-column-type",
                    value: "{column_type.read().as_str()}",
                    onchange: move |evt| {
                        if let Some(next) = ColumnType::from_code(&evt.value()) {
                            column_type.set(next);
                        }
                    },
                    for kind in ColumnType::all().iter().copied() {
                        option { value: "{kind.as_str()}", "{kind.as_str()}" }
                    }
                }
                for (id, label, position) in [
                    ("btn-add-column", "\u{2795} Column", None),
                    ("btn-insert-column-before", "\u{2190} Insert before", Some(InsertPosition::Before)),
                    ("btn-insert-column-after", "\u{2192} Insert after", Some(InsertPosition::After)),
                ] {
                    button {
                        class: "toolbar-btn",
                        id: "{id}",
                        disabled: position.is_some() && !has_column,
                        onclick: {
                            let ctx = ctx.clone();
                            move |_| {
                                let name = column_name.read().trim().to_string();
                                if name.is_empty() {
                                    error_message.set(Some("Enter a column name first".to_string()));
                                    return;
                                }
                                let kind = *column_type.read();
                                let ctx = ctx.clone();
                                spawn(async move {
                                    if actions::add_column(ctx, signals, name, kind, position).await {
                                        column_name.set(String::new());
                                    }
                                });
                            }
                        },
                        "{label}"
                    }
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-rename-column",
                    disabled: !has_column,
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let name = column_name.read().trim().to_string();
                            if name.is_empty() {
                                error_message.set(Some("Enter a column name first".to_string()));
                                return;
                            }
                            let ctx = ctx.clone();
                            spawn(async move {
                                if actions::rename_column(ctx, signals, name).await {
                                    column_name.set(String::new());
                                }
                            });
                        }
                    },
                    "\u{270E} Rename"
                }
                button {
                    class: "toolbar-btn toolbar-btn-danger",
                    id: "btn-delete-column",
                    disabled: !has_column,
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::delete_column(ctx, signals));
                        }
                    },
                    "\u{1F5D1} Column"
                }
            }
            div { class: "toolbar-separator" }

            // Data group
            div { class: "toolbar-group",
                button {
                    class: "toolbar-btn",
                    id: "btn-load-more",
                    disabled: !has_more || loading,
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::load_more(ctx, signals));
                        }
                    },
                    "\u{21E3} Load more"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-export",
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            spawn(actions::export_json(ctx, signals));
                        }
                    },
                    "\u{1F4BE} Export JSON"
                }
            }

            // Info area (right-aligned)
            div { class: "toolbar-info",
                span { class: "toolbar-label", id: "label-row-count", "{row_count} / {total_rows} rows" }
                if let Some(err) = inline_error {
                    span {
                        class: "error-message",
                        id: "cell-error",
                        onclick: move |_| {
                            let mut session = signals.session;
                            session.with_mut(|session| session.dismiss_error());
                        },
                        "{err.message} \u{2715}"
                    }
                }
                if let Some(err) = error_message.read().as_ref() {
                    span { class: "error-message", id: "error-message", "{err}" }
                }
            }
        }
    }
}
