//! Configuration management for Porter.
//!
//! Parses `porter.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Directory settings support shell-style expansion before they are resolved
//! against the config file's directory:
//!
//! - `~` - the home directory
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `convert.source_dir`
//! - `convert.dest_dir`

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override essay source directory.
    pub source_dir: Option<PathBuf>,
    /// Override destination directory.
    pub dest_dir: Option<PathBuf>,
    /// Override the maximum number of documents to convert.
    pub max: Option<usize>,
    /// Override parallel conversion.
    pub parallel: Option<bool>,
    /// Override root link rewriting.
    pub rewrite_links: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "porter.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion configuration (paths are relative strings from TOML).
    convert: ConvertConfigRaw,
    /// Front matter configuration.
    pub front_matter: FrontMatterConfig,

    /// Resolved conversion configuration (set after loading).
    #[serde(skip)]
    pub convert_resolved: ConvertConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw conversion configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConvertConfigRaw {
    source_dir: Option<String>,
    dest_dir: Option<String>,
    body_filename: Option<String>,
    max: Option<usize>,
    parallel: Option<bool>,
    rewrite_links: Option<bool>,
}

/// Resolved conversion configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ConvertConfig {
    /// Directory tree holding one essay per leaf directory.
    pub source_dir: PathBuf,
    /// Directory converted posts are written to.
    pub dest_dir: PathBuf,
    /// Name of the body file inside each essay directory.
    pub body_filename: String,
    /// Stop after this many converted documents.
    pub max: Option<usize>,
    /// Convert documents in parallel.
    pub parallel: bool,
    /// Prefix root-relative links with `{{ site.baseurl }}`.
    pub rewrite_links: bool,
}

/// Front matter configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FrontMatterConfig {
    /// Prefix of the injected `media_subpath`, followed by the post name.
    pub media_subpath_prefix: String,
}

impl Default for FrontMatterConfig {
    fn default() -> Self {
        Self {
            media_subpath_prefix: "/assets/posts".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`convert.source_dir`").
        field: String,
        /// Error message from expansion.
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Expand `~` and environment variables in a config value.
fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `porter.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let convert = &mut self.convert_resolved;
        if let Some(source_dir) = &settings.source_dir {
            convert.source_dir.clone_from(source_dir);
        }
        if let Some(dest_dir) = &settings.dest_dir {
            convert.dest_dir.clone_from(dest_dir);
        }
        if let Some(max) = settings.max {
            convert.max = Some(max);
        }
        if let Some(parallel) = settings.parallel {
            convert.parallel = parallel;
        }
        if let Some(rewrite_links) = settings.rewrite_links {
            convert.rewrite_links = rewrite_links;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(current)
    }

    fn discover_config_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            convert: ConvertConfigRaw::default(),
            front_matter: FrontMatterConfig::default(),
            convert_resolved: ConvertConfig {
                source_dir: base.join("essays"),
                dest_dir: base.join("_posts"),
                body_filename: "index.md".to_owned(),
                max: None,
                parallel: false,
                rewrite_links: false,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let convert = &self.convert_resolved;
        require_non_empty(&convert.body_filename, "convert.body_filename")?;
        if convert.body_filename.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "convert.body_filename must be a file name, not a path".to_owned(),
            ));
        }
        if convert.max == Some(0) {
            return Err(ConfigError::Validation(
                "convert.max must be greater than 0".to_owned(),
            ));
        }
        if !self.front_matter.media_subpath_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "front_matter.media_subpath_prefix must start with /".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.convert.source_dir {
            self.convert.source_dir = Some(expand_env(dir, "convert.source_dir")?);
        }
        if let Some(ref dir) = self.convert.dest_dir {
            self.convert.dest_dir = Some(expand_env(dir, "convert.dest_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.convert_resolved = ConvertConfig {
            source_dir: resolve(self.convert.source_dir.as_deref(), "essays"),
            dest_dir: resolve(self.convert.dest_dir.as_deref(), "_posts"),
            body_filename: self
                .convert
                .body_filename
                .clone()
                .unwrap_or_else(|| "index.md".to_owned()),
            max: self.convert.max,
            parallel: self.convert.parallel.unwrap_or(false),
            rewrite_links: self.convert.rewrite_links.unwrap_or(false),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        let convert = &config.convert_resolved;
        assert_eq!(convert.source_dir, PathBuf::from("/test/essays"));
        assert_eq!(convert.dest_dir, PathBuf::from("/test/_posts"));
        assert_eq!(convert.body_filename, "index.md");
        assert_eq!(convert.max, None);
        assert!(!convert.parallel);
        assert!(!convert.rewrite_links);
        assert_eq!(config.front_matter.media_subpath_prefix, "/assets/posts");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.front_matter.media_subpath_prefix, "/assets/posts");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[convert]
source_dir = "_articles"
dest_dir = "site/_posts"
body_filename = "README.md"
max = 5
parallel = true
rewrite_links = true

[front_matter]
media_subpath_prefix = "/media"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        let convert = &config.convert_resolved;
        assert_eq!(convert.source_dir, PathBuf::from("/project/_articles"));
        assert_eq!(convert.dest_dir, PathBuf::from("/project/site/_posts"));
        assert_eq!(convert.body_filename, "README.md");
        assert_eq!(convert.max, Some(5));
        assert!(convert.parallel);
        assert!(convert.rewrite_links);
        assert_eq!(config.front_matter.media_subpath_prefix, "/media");
    }

    #[test]
    fn test_resolve_absolute_paths_unchanged() {
        let toml = r#"
[convert]
source_dir = "/data/essays"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.convert_resolved.source_dir,
            PathBuf::from("/data/essays")
        );
        assert_eq!(
            config.convert_resolved.dest_dir,
            PathBuf::from("/project/_posts")
        );
    }

    #[test]
    fn test_invalid_field_type_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[convert]\nmax = \"ten\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_cli_settings_dirs() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_dir: Some(PathBuf::from("/custom/essays")),
            dest_dir: Some(PathBuf::from("/custom/posts")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.convert_resolved.source_dir,
            PathBuf::from("/custom/essays")
        );
        assert_eq!(
            config.convert_resolved.dest_dir,
            PathBuf::from("/custom/posts")
        );
        assert_eq!(config.convert_resolved.body_filename, "index.md"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_flags() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            max: Some(3),
            parallel: Some(true),
            rewrite_links: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.convert_resolved.max, Some(3));
        assert!(config.convert_resolved.parallel);
        assert!(config.convert_resolved.rewrite_links);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(
            config.convert_resolved.source_dir,
            PathBuf::from("/test/essays")
        );
        assert_eq!(config.convert_resolved.max, None);
    }

    #[test]
    fn test_expand_env_vars_source_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PORTER_TEST_ESSAYS", "/srv/essays");
        }

        let toml = r#"
[convert]
source_dir = "${PORTER_TEST_ESSAYS}"
dest_dir = "${PORTER_TEST_POSTS_UNSET:-_posts}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.convert_resolved.source_dir,
            PathBuf::from("/srv/essays")
        );
        assert_eq!(
            config.convert_resolved.dest_dir,
            PathBuf::from("/project/_posts")
        );

        unsafe {
            std::env::remove_var("PORTER_TEST_ESSAYS");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_PORTER_TEST");
        }

        let toml = r#"
[convert]
dest_dir = "${MISSING_VAR_PORTER_TEST}/posts"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_PORTER_TEST"));
        assert!(err.to_string().contains("convert.dest_dir"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_body_filename_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.convert_resolved.body_filename = String::new();
        assert_validation_error(&config, &["convert.body_filename", "empty"]);
    }

    #[test]
    fn test_validate_body_filename_is_path() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.convert_resolved.body_filename = "docs/index.md".to_owned();
        assert_validation_error(&config, &["convert.body_filename"]);
    }

    #[test]
    fn test_validate_max_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.convert_resolved.max = Some(0);
        assert_validation_error(&config, &["convert.max"]);
    }

    #[test]
    fn test_validate_media_subpath_prefix() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.front_matter.media_subpath_prefix = "assets".to_owned();
        assert_validation_error(&config, &["media_subpath_prefix"]);
    }

    // Loading tests

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/porter.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[convert]\nsource_dir = \"_articles\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(
            config.convert_resolved.source_dir,
            dir.path().join("_articles")
        );
        assert_eq!(config.convert_resolved.dest_dir, dir.path().join("_posts"));
    }

    #[test]
    fn test_load_applies_cli_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[convert]\nmax = 10\n").unwrap();

        let settings = CliSettings {
            max: Some(2),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.convert_resolved.max, Some(2));
    }

    #[test]
    fn test_load_rejects_invalid_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            max: Some(0),
            ..Default::default()
        };
        let result = Config::load(Some(&path), Some(&settings));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[convert\n").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config_from(nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }
}
