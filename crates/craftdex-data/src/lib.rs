pub mod config;
pub mod loader;
pub mod schema;

pub use config::{find_config, load_config};
pub use loader::{DataLoadError, load_snapshot, load_store, reload_store};
