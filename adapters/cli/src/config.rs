use std::{
    fs,
    path::{Path, PathBuf},
};

use dread_maze_core::RunConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a run configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("could not read run configuration '{}'", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for a run configuration.
    #[error("could not parse run configuration '{}'", path.display())]
    Parse {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Top level of a configuration file. Run settings live under `[run]`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    run: RunConfig,
}

/// Parses TOML text into a run configuration; absent keys keep their defaults.
pub(crate) fn parse(text: &str) -> Result<RunConfig, toml::de::Error> {
    toml::from_str::<ConfigFile>(text).map(|file| file.run)
}

/// Reads and parses the configuration file at `path`.
pub(crate) fn load(path: &Path) -> Result<RunConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_maze_core::{Archetype, DifficultyTier};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty file parses");
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn partial_run_table_overrides_named_fields() {
        let config = parse(
            r#"
            [run]
            archetype = "Butcher"
            difficulty = "Hard"
            grid_width = 25
            levels = 5
            "#,
        )
        .expect("config parses");

        assert_eq!(config.archetype, Archetype::Butcher);
        assert_eq!(config.difficulty, DifficultyTier::Hard);
        assert_eq!(config.grid_width, 25);
        assert_eq!(config.grid_height, RunConfig::default().grid_height);
        assert_eq!(config.levels, 5);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(parse("[render]\nscale = 2\n").is_err());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = load(Path::new("definitely/not/here.toml")).expect_err("file is missing");
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("definitely/not/here.toml"));
    }
}
