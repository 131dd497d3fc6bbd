pub mod board;
pub mod config;
pub mod error;
pub mod schema;
pub mod store;

pub use board::Board;
pub use config::{CONFIG_FILE, Config, DATA_DIR_ENV, DB_FILE, DisplayConfig, resolve_base_dir};
pub use error::{Result, StoreError};
pub use store::{IdeaPage, MAX_PAGE_SIZE, Store, StoreSources};
