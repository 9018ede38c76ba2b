pub mod data_model;
pub mod edit_session;
pub mod navigation;
pub mod ordering;
pub mod overlay;
pub mod table_state;
pub mod viewport;
