pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;

use std::path::{Path, PathBuf};

/// Environment variable naming the settings file directly
pub const CONFIG_PATH_ENV: &str = "NETREP_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["netrep.local.yaml", "netrep.yaml"];

/// Location of the per-user settings file (`<config_dir>/netrep/netrep.yaml`)
pub fn global_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(config_dir.join("netrep").join("netrep.yaml"))
}

/// Find the settings file for the current directory
///
/// Search order:
/// 1. `NETREP_CONFIG_PATH` environment variable
/// 2. current directory: netrep.local.yaml, netrep.yaml
/// 3. `./.netrep/` directory: netrep.yaml
/// 4. `<config_dir>/netrep/netrep.yaml`
///
/// Returns `None` when nothing is found; callers fall back to defaults.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!(
            "{} points to {}, which does not exist",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let project_config = current_dir.join(".netrep").join("netrep.yaml");
    if project_config.exists() {
        return Ok(Some(project_config));
    }

    if let Ok(global_config) = global_config_path() {
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Read and validate a settings file
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings = Settings::from_yaml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `explicit` if given, otherwise from the discovered file
///
/// Returns the settings and the file they came from (`None` for defaults).
pub fn load(explicit: Option<&Path>) -> Result<(Settings, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    match path {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            let settings = load_from(&path)?;
            Ok((settings, Some(path)))
        }
        None => {
            tracing::debug!("No settings file found, using defaults");
            Ok((Settings::default(), None))
        }
    }
}
