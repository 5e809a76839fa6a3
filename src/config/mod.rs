use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;
use toml::value::Table;

/// Optional user config: a `[vendors]` table mapping exact merchant
/// descriptions to billing URLs, layered over the built-in vendor table.
#[derive(Deserialize, Debug)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) vendors: Table,
}

impl Config {
    pub(crate) fn empty() -> Config {
        Config { vendors: Table::new() }
    }

    pub(crate) fn load_from_file(file_path: &str) -> anyhow::Result<Config> {
        let path = Path::new(file_path);
        if path.exists() && path.is_file() {
            let config: Config = toml::from_str(&fs::read_to_string(path)?)?;
            info!("Loaded {} vendor URL overrides from {}", config.vendors.len(), file_path);
            Ok(config)
        } else {
            Ok(Config::empty())
        }
    }
}
