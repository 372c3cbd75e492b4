//! Content loaders for reading game data from files.
//!
//! Each loader parses one RON/TOML file into core definitions or
//! [`templates`](crate::templates). [`ContentFactory`] loads a whole data
//! directory into a [`ContentLibrary`](crate::ContentLibrary).

pub mod abilities;
pub mod characters;
pub mod config;
pub mod effects;
pub mod factory;
pub mod items;

pub use abilities::AbilityLoader;
pub use characters::CharacterLoader;
pub use config::ConfigLoader;
pub use effects::EffectLoader;
pub use factory::ContentFactory;
pub use items::ItemLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
