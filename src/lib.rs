pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod prizes;
pub mod state;
pub mod storage;
pub mod ui;
pub mod widget;

pub use app::router;
pub use config::ServerConfig;
pub use state::AppState;
pub use storage::load_data;
