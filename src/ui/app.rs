use dioxus::prelude::*;

use crate::config::GridSettings;
use crate::io::commit_queue;
use crate::io::window::SnapshotWindow;
use crate::io::GridService;
use crate::state::data_model::TableId;
use crate::state::edit_session::EditSession;
use crate::state::table_state::TableState;
use crate::ui::actions;
use crate::ui::table::Grid;
use crate::ui::toolbar::Toolbar;

const STYLES: Asset = asset!("/assets/styles.css");

/// Everything the window needs from startup: the caller's service, the table
/// to show, how many rows to fetch and the layout settings.
#[derive(Clone)]
pub struct AppContext {
    pub service: GridService,
    pub table_id: TableId,
    pub window: SnapshotWindow,
    pub settings: GridSettings,
}

/// Reactive state shared by the toolbar and the grid.
#[derive(Clone, Copy, PartialEq)]
pub struct GridSignals {
    pub grid: Signal<TableState>,
    pub session: Signal<EditSession>,
    pub error_message: Signal<Option<String>>,
    pub loading: Signal<bool>,
}

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = GridSignals {
        grid: use_signal(TableState::new),
        session: use_signal(EditSession::new),
        error_message: use_signal(|| None),
        loading: use_signal(|| false),
    };

    use_context_provider({
        let ctx = ctx.clone();
        move || {
            let (queue, worker) = commit_queue::channel(ctx.window.clone());
            let service = ctx.service.clone();
            spawn(async move {
                worker
                    .run(service, move |result| {
                        actions::apply_commit_result(signals, result);
                    })
                    .await;
            });
            queue
        }
    });

    use_hook({
        let ctx = ctx.clone();
        move || {
            spawn(async move {
                actions::reload(&ctx, signals).await;
            });
        }
    });

    let title = signals
        .grid
        .read()
        .table()
        .map(|table| table.name.clone())
        .unwrap_or_default();

    rsx! {
        document::Stylesheet { href: STYLES }
        div { class: "app",
            div { class: "title-bar", id: "table-title", "{title}" }
            Toolbar { signals }
            Grid { signals }
        }
    }
}
