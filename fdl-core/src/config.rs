use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TraceError};

/// Name of the project-local configuration file
pub const CONFIG_FILE_NAME: &str = "fdl.yaml";

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "FDL_CONFIG";

/// Directory roots and conventions used by every traceability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Root of the requirement documents (US/SYS/SW markdown)
    pub requirements_dir: PathBuf,
    /// Root of the test files
    pub tests_dir: PathBuf,
    /// Root of the code units named by `refined_in`
    pub code_dir: PathBuf,
    /// Extension of test files, without the dot
    pub test_extension: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            requirements_dir: PathBuf::from("requirements"),
            tests_dir: PathBuf::from("tests"),
            code_dir: PathBuf::from("src"),
            test_extension: "py".to_string(),
        }
    }
}

impl TraceConfig {
    /// Loads a configuration file.
    ///
    /// Relative roots are resolved against the directory holding the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TraceError::io(path, e))?;

        let config: TraceConfig = if content.trim().is_empty() {
            TraceConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| TraceError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.normalized(base))
    }

    /// Saves the configuration as YAML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;

        // Ensure parent directories exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TraceError::io(parent, e))?;
            }
        }

        fs::write(path, content).map_err(|e| TraceError::io(path, e))
    }

    /// Writes a default configuration file if none exists.
    /// Returns whether a file was created.
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<bool> {
        if path.as_ref().exists() {
            return Ok(false);
        }
        TraceConfig::default().save(path)?;
        Ok(true)
    }

    /// Overrides the three roots; `None` keeps the current value
    pub fn with_roots(
        mut self,
        requirements_dir: Option<PathBuf>,
        tests_dir: Option<PathBuf>,
        code_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = requirements_dir {
            self.requirements_dir = dir;
        }
        if let Some(dir) = tests_dir {
            self.tests_dir = dir;
        }
        if let Some(dir) = code_dir {
            self.code_dir = dir;
        }
        self
    }

    pub fn with_test_extension(mut self, extension: &str) -> Self {
        self.test_extension = normalize_extension(extension);
        self
    }

    fn normalized(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.requirements_dir,
            &mut self.tests_dir,
            &mut self.code_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self.test_extension = normalize_extension(&self.test_extension);
        self
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_string()
}

/// Gets the path of the per-user configuration file
pub fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fdl").join("config.yaml"))
}

/// Picks the configuration file to use, if any.
///
/// Priority: explicit path, `FDL_CONFIG`, `fdl.yaml` in `cwd`, then the
/// per-user configuration file. Only the explicit and environment paths are
/// returned without checking that they exist.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<String>,
    cwd: &Path,
    user_config: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(value));
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    user_config.filter(|path| path.is_file())
}

/// Locates the configuration file for this invocation from the process
/// environment and current directory
pub fn find_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let cwd = env::current_dir().map_err(|e| TraceError::io(".", e))?;
    Ok(resolve_config_path(
        explicit,
        env::var(CONFIG_ENV_VAR).ok(),
        &cwd,
        get_user_config_path(),
    ))
}

/// Determines the configuration for this invocation.
///
/// Falls back to the defaults (relative to the current directory) when no
/// configuration file is found.
pub fn determine_config(explicit: Option<&Path>) -> Result<TraceConfig> {
    match find_config_path(explicit)? {
        Some(path) => {
            tracing::info!("using configuration {}", path.display());
            TraceConfig::load(path)
        }
        None => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(TraceConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.requirements_dir, PathBuf::from("requirements"));
        assert_eq!(config.tests_dir, PathBuf::from("tests"));
        assert_eq!(config.code_dir, PathBuf::from("src"));
        assert_eq!(config.test_extension, "py");
    }

    #[test]
    fn test_load_resolves_relative_roots() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "requirements_dir: docs/reqs\ntests_dir: /abs/tests\ntest_extension: .rs\n",
        )
        .unwrap();

        let config = TraceConfig::load(&path).unwrap();
        assert_eq!(config.requirements_dir, dir.path().join("docs/reqs"));
        assert_eq!(config.tests_dir, PathBuf::from("/abs/tests"));
        // unspecified keys keep their defaults
        assert_eq!(config.code_dir, dir.path().join("src"));
        assert_eq!(config.test_extension, "rs");
    }

    #[test]
    fn test_load_empty_file_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "\n").unwrap();

        let config = TraceConfig::load(&path).unwrap();
        assert_eq!(config.tests_dir, dir.path().join("tests"));
    }

    #[test]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "tests_dir: [unclosed\n").unwrap();

        let err = TraceConfig::load(&path).unwrap_err();
        assert!(matches!(err, TraceError::Config { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = TraceConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, TraceError::Io { .. }));
    }

    #[test]
    fn test_create_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        assert!(TraceConfig::create_default(&path).unwrap());
        fs::write(&path, "tests_dir: custom\n").unwrap();
        assert!(!TraceConfig::create_default(&path).unwrap());

        let config = TraceConfig::load(&path).unwrap();
        assert_eq!(config.tests_dir, path.parent().unwrap().join("custom"));
    }

    #[test]
    fn test_with_roots_overrides_only_given() {
        let config = TraceConfig::default()
            .with_roots(Some(PathBuf::from("reqs")), None, None)
            .with_test_extension(".ts");
        assert_eq!(config.requirements_dir, PathBuf::from("reqs"));
        assert_eq!(config.tests_dir, PathBuf::from("tests"));
        assert_eq!(config.test_extension, "ts");
    }

    #[test]
    fn test_resolve_config_path_priority() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        fs::write(&user, "").unwrap();

        // nothing local: user config
        assert_eq!(
            resolve_config_path(None, None, dir.path(), Some(user.clone())),
            Some(user.clone())
        );

        // local file beats user config
        let local = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&local, "").unwrap();
        assert_eq!(
            resolve_config_path(None, None, dir.path(), Some(user.clone())),
            Some(local)
        );

        // environment beats local file
        assert_eq!(
            resolve_config_path(None, Some("env.yaml".to_string()), dir.path(), None),
            Some(PathBuf::from("env.yaml"))
        );

        // explicit beats everything
        assert_eq!(
            resolve_config_path(
                Some(Path::new("cli.yaml")),
                Some("env.yaml".to_string()),
                dir.path(),
                Some(user)
            ),
            Some(PathBuf::from("cli.yaml"))
        );
    }

    #[test]
    fn test_resolve_config_path_none_found() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("missing.yaml");
        assert_eq!(
            resolve_config_path(None, Some("  ".to_string()), dir.path(), Some(user)),
            None
        );
    }
}
