//! File-backed persistence.

mod config_repository;

pub use config_repository::{
    CONFIG_PATH_VAR, ConfigLoadError, ConfigRepository, RECORDS_URL_VAR, SERVER_URL_VAR,
    WATCH_VAR, apply_env_overrides,
};
