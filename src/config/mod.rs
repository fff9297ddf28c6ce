//! Hierarchical configuration block (C3): key -> string store with
//! read-only locking and a typed `get_as<T>` view.

pub mod block;
pub mod loader;

pub use block::{ConfigBlock, FromConfigValue, BLOCK_SEP};
pub use loader::{load_config, load_config_from_string};
