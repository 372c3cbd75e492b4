//! Content factory for building a content library from data files.

use std::path::{Path, PathBuf};

use arpg_core::{EffectDefinition, GameConfig};

use crate::ContentLibrary;
use crate::loaders::{
    AbilityLoader, CharacterLoader, ConfigLoader, EffectLoader, ItemLoader, LoadResult,
};
use crate::templates::{AbilityTemplate, CharacterTemplate, ItemTemplate};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── effects.ron
/// ├── abilities.ron
/// ├── items.ron
/// └── characters.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load effect definitions from `effects.ron`.
    pub fn load_effects(&self) -> LoadResult<Vec<EffectDefinition>> {
        EffectLoader::load(&self.data_dir.join("effects.ron"))
    }

    /// Load ability templates from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<Vec<AbilityTemplate>> {
        AbilityLoader::load(&self.data_dir.join("abilities.ron"))
    }

    /// Load item templates from `items.ron`.
    pub fn load_items(&self) -> LoadResult<Vec<ItemTemplate>> {
        ItemLoader::load(&self.data_dir.join("items.ron"))
    }

    /// Load character templates from `characters.ron`.
    pub fn load_characters(&self) -> LoadResult<Vec<CharacterTemplate>> {
        CharacterLoader::load(&self.data_dir.join("characters.ron"))
    }

    /// Load and cross-link every content file.
    pub fn load_library(&self) -> LoadResult<ContentLibrary> {
        let mut library = ContentLibrary::new(self.load_config()?);
        library.add_effects(self.load_effects()?)?;
        library.add_abilities(self.load_abilities()?)?;
        library.add_items(self.load_items()?)?;
        library.add_characters(self.load_characters()?)?;
        library.validate()?;
        Ok(library)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_the_bundled_data_directory() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let library = factory.load_library().expect("library");
        assert!(!library.items().is_empty());
        assert!(library.character_template("Player").is_some());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let factory = ContentFactory::new("/nonexistent/arpg-data");
        assert!(factory.load_library().is_err());
    }
}
