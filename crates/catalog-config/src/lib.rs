pub mod config;
pub mod paths;
pub mod session;

pub use config::{BackendConfig, CatalogConfig, Config};
pub use paths::PathManager;
pub use session::SessionStore;
