pub mod cells;
pub mod columns;
pub mod commit_queue;
pub mod json_export;
pub mod rows;
pub mod schema;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod window;

mod siblings;

pub use service::GridService;
pub use store::{Store, TableTemplate};
