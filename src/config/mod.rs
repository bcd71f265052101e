//! Layered configuration for HolderWorld
//!
//! Sections are declared with `config_struct!` in `schemas`, loaded and
//! overridden from the environment in `utils`.

#[macro_use]
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    Config, LoggingConfig, RpcConfig, StoreBackend, StoreConfig, WebserverConfig, WorldConfig,
};
pub use utils::{
    apply_env_overrides, build_config, get_config_clone, init_config, load_config,
    load_config_from_path, with_config, CONFIG,
};
