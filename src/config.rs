// Configuration loading and parsing (config/statsheet.toml).

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sheet::DEFAULT_GAME;

pub const CONFIG_FILE: &str = "statsheet.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    pub pdf: PdfConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub db_path: String,
}

/// PDF import settings: the game id stamped on extracted rows and the team
/// headers that open each box-score table.
#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    pub default_game: String,
    pub teams: Vec<TeamMarkerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMarkerConfig {
    pub code: String,
    /// Case-insensitive regex matched against the normalized document text.
    pub marker: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            default_game: DEFAULT_GAME.to_string(),
            teams: vec![
                TeamMarkerConfig {
                    code: "ROU".into(),
                    marker: r"Ail de Rousset\s*\(ROU\)".into(),
                },
                TeamMarkerConfig {
                    code: "STV".into(),
                    marker: r"Saint Vallier Basket Drome\s*\d*\s*\(STV\)".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub template_file: String,
    pub export_file: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/statsheet.toml` relative to `base_dir`, without
/// copying defaults.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/statsheet.toml` from `defaults/` on first run. Returns the
/// written path, or `None` when a config file is already in place.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let default = base_dir.join("defaults").join(CONFIG_FILE);
    let content = std::fs::read(&default).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "no config/{CONFIG_FILE} and cannot read {}: {e}",
            default.display()
        ),
    })?;

    std::fs::create_dir_all(base_dir.join("config")).map_err(|e| {
        ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        }
    })?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        // Another process seeded it first.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let required: &[(&str, &str)] = &[
        ("session.db_path", config.session.db_path.as_str()),
        ("pdf.default_game", config.pdf.default_game.as_str()),
        ("export.template_file", config.export.template_file.as_str()),
        ("export.export_file", config.export.export_file.as_str()),
    ];
    for (name, val) in required {
        if val.trim().is_empty() {
            return Err(invalid(*name, "must not be empty"));
        }
    }

    if config.pdf.teams.is_empty() {
        return Err(invalid("pdf.teams", "at least one team marker is required"));
    }

    let mut seen = HashSet::new();
    for (i, team) in config.pdf.teams.iter().enumerate() {
        let code = team.code.trim();
        if code.is_empty() {
            return Err(invalid(format!("pdf.teams[{i}].code"), "must not be empty"));
        }
        if !seen.insert(code) {
            return Err(invalid(
                format!("pdf.teams[{i}].code"),
                format!("duplicate team code {code}"),
            ));
        }
        if let Err(e) = Regex::new(&team.marker) {
            return Err(invalid(
                format!("pdf.teams[{i}].marker"),
                format!("invalid regex: {e}"),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh `<tmp>/<name>/config/` holding `toml` as the config file.
    fn write_config(name: &str, toml: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), toml).unwrap();
        tmp
    }

    fn expect_invalid_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(tmp);
    }

    const VALID: &str = r#"
[session]
db_path = "test.db"

[pdf]
default_game = "G1"

[[pdf.teams]]
code = "ROU"
marker = 'Ail de Rousset\s*\(ROU\)'

[[pdf.teams]]
code = "STV"
marker = 'Saint Vallier Basket Drome\s*\d*\s*\(STV\)'

[export]
template_file = "template.csv"
export_file = "export.csv"
"#;

    #[test]
    fn load_valid_config_from_project_files() {
        let tmp = std::env::temp_dir().join("statsheet_config_project_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::copy(
            project_root().join("defaults").join(CONFIG_FILE),
            tmp.join("defaults").join(CONFIG_FILE),
        )
        .unwrap();

        ensure_config_file(&tmp).expect("should copy default config");
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.session.db_path, "statsheet.db");
        assert_eq!(config.pdf.default_game, "G1");
        let codes: Vec<&str> = config.pdf.teams.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["ROU", "STV"]);
        assert_eq!(config.export.template_file, "template_stats_basket.csv");
        assert_eq!(config.export.export_file, "stats_basket_export.csv");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn default_pdf_markers_match_shipped_config() {
        let text = fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        let defaults = PdfConfig::default();
        assert_eq!(config.pdf.default_game, defaults.default_game);
        for (file, builtin) in config.pdf.teams.iter().zip(&defaults.teams) {
            assert_eq!(file.code, builtin.code);
            assert_eq!(file.marker, builtin.marker);
        }
    }

    #[test]
    fn parse_error_names_the_file() {
        let tmp = write_config("statsheet_config_parse_error", "[session\n");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = std::env::temp_dir().join("statsheet_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_db_path() {
        let tmp = write_config(
            "statsheet_config_empty_db",
            &VALID.replace(r#"db_path = "test.db""#, r#"db_path = """#),
        );
        expect_invalid_field(&tmp, "session.db_path");
    }

    #[test]
    fn rejects_empty_default_game() {
        let tmp = write_config(
            "statsheet_config_empty_game",
            &VALID.replace(r#"default_game = "G1""#, r#"default_game = " ""#),
        );
        expect_invalid_field(&tmp, "pdf.default_game");
    }

    #[test]
    fn rejects_no_teams() {
        let toml = r#"
[session]
db_path = "test.db"

[pdf]
default_game = "G1"
teams = []

[export]
template_file = "template.csv"
export_file = "export.csv"
"#;
        let tmp = write_config("statsheet_config_no_teams", toml);
        expect_invalid_field(&tmp, "pdf.teams");
    }

    #[test]
    fn rejects_duplicate_team_code() {
        let tmp = write_config(
            "statsheet_config_dup_code",
            &VALID.replace(r#"code = "STV""#, r#"code = "ROU""#),
        );
        expect_invalid_field(&tmp, "pdf.teams[1].code");
    }

    #[test]
    fn rejects_bad_marker_regex() {
        let tmp = write_config(
            "statsheet_config_bad_marker",
            &VALID.replace(r"Ail de Rousset\s*\(ROU\)", r"Ail de Rousset\s*(ROU"),
        );
        expect_invalid_field(&tmp, "pdf.teams[0].marker");
    }

    #[test]
    fn ensure_config_file_seeds_from_defaults() {
        let tmp = std::env::temp_dir().join("statsheet_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), VALID).unwrap();

        let written = ensure_config_file(&tmp).expect("should succeed");
        let target = tmp.join("config").join(CONFIG_FILE);
        assert_eq!(written, Some(target.clone()));
        assert_eq!(fs::read_to_string(target).unwrap(), VALID);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_user_edits() {
        let tmp = std::env::temp_dir().join("statsheet_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), VALID).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), "# custom\n").unwrap();

        assert_eq!(ensure_config_file(&tmp).expect("should succeed"), None);
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_config_needs_no_defaults() {
        let tmp = write_config("statsheet_config_no_defaults", VALID);
        assert_eq!(ensure_config_file(&tmp).expect("should succeed"), None);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_errors_without_config_or_defaults() {
        let tmp = std::env::temp_dir().join("statsheet_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_file(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("no config/statsheet.toml"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}
