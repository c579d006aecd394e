//! Layered settings for the `rsyncer` binary.
//!
//! Values merge defaults, `rsyncer.toml` discovery, and `RSYNCER_*`
//! environment variables via `ortho-config`. The rsync options themselves
//! live in a JSON mapping file so they share the recognised keys accepted by
//! [`crate::apply_recognized_options`].

use std::ffi::OsString;

use camino::Utf8Path;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigLoadError;
use crate::rsync::RsyncConfig;

/// Settings for the binary loaded via `ortho-config`.
#[derive(Clone, Debug, Default, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "RSYNCER",
    discovery(
        app_name = "rsyncer",
        env_var = "RSYNCER_CONFIG_PATH",
        config_file_name = "rsyncer.toml",
        dotfile_name = ".rsyncer.toml",
        project_file_name = "rsyncer.toml"
    )
)]
pub struct RunnerSettings {
    /// JSON file holding an option mapping for the sync.
    pub options_file: Option<String>,
    /// Overrides the `rsync` executable named in the options file.
    pub executable: Option<String>,
}

impl RunnerSettings {
    /// Loads settings from defaults, configuration files, and environment
    /// variables without parsing CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::Parse`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigLoadError> {
        Self::load_from_iter([OsString::from("rsyncer")])
            .map_err(|err| ConfigLoadError::Parse(err.to_string()))
    }

    /// Resolves the rsync configuration these settings point at.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] when the options file cannot be read or
    /// parsed, or when the executable override fails validation.
    pub fn rsync_config(&self) -> Result<RsyncConfig, ConfigLoadError> {
        let mut config = match self.options_file {
            Some(ref path) => read_options_file(Utf8Path::new(path))?,
            None => RsyncConfig::default(),
        };
        if let Some(ref executable) = self.executable {
            config.set_executable(executable)?;
        }
        Ok(config)
    }
}

/// Reads a JSON option mapping from `path` and applies it over the defaults.
///
/// # Errors
///
/// Returns [`ConfigLoadError::Read`] when the file cannot be read,
/// [`ConfigLoadError::Parse`] when it is not JSON, and
/// [`ConfigLoadError::Invalid`] when a recognised option is rejected.
pub fn read_options_file(path: &Utf8Path) -> Result<RsyncConfig, ConfigLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|err| ConfigLoadError::Read {
        path: path.to_owned(),
        message: err.to_string(),
    })?;
    let mapping: Value = serde_json::from_str(&contents)
        .map_err(|err| ConfigLoadError::Parse(format!("{path}: {err}")))?;
    Ok(RsyncConfig::from_options(&mapping)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RsyncError;
    use crate::test_helpers::EnvGuard;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    fn write_options(dir: &TempDir, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("options.json"))
            .expect("utf8 temp path");
        std::fs::write(&path, contents).expect("write options file");
        path
    }

    #[rstest]
    fn read_options_file_applies_mapping() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_options(&dir, r#"{"times": true, "exclude": ["target/"]}"#);

        let config = read_options_file(&path).expect("options should load");

        assert!(config.times);
        assert_eq!(config.exclude, ["target/"]);
    }

    #[rstest]
    fn read_options_file_reports_missing_file() {
        let err = read_options_file(Utf8Path::new("/nonexistent/options.json"))
            .expect_err("missing file should fail");

        assert!(
            matches!(err, ConfigLoadError::Read { ref path, .. } if path == "/nonexistent/options.json"),
            "unexpected: {err:?}"
        );
    }

    #[rstest]
    fn read_options_file_reports_invalid_json() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_options(&dir, "{not json");

        let err = read_options_file(&path).expect_err("invalid json should fail");

        assert!(matches!(err, ConfigLoadError::Parse(_)), "unexpected: {err:?}");
    }

    #[rstest]
    fn rsync_config_defaults_without_options_file() {
        let config = RunnerSettings::default()
            .rsync_config()
            .expect("defaults should resolve");

        assert_eq!(config, RsyncConfig::default());
    }

    #[rstest]
    fn rsync_config_validates_executable_override() {
        let settings = RunnerSettings {
            options_file: None,
            executable: Some(String::from("/usr/not/exists/rsync!!")),
        };

        let err = settings
            .rsync_config()
            .expect_err("missing executable should fail");

        assert!(
            matches!(err, ConfigLoadError::Invalid(RsyncError::Validation { ref field, .. }) if field == "executable"),
            "unexpected: {err:?}"
        );
    }

    #[rstest]
    fn load_reads_options_file_from_environment() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_options(&dir, r#"{"stats": true}"#);
        let _guard = EnvGuard::set_var("RSYNCER_OPTIONS_FILE", path.as_str());

        let settings = RunnerSettings::load_without_cli_args().expect("settings should load");

        assert_eq!(settings.options_file.as_deref(), Some(path.as_str()));
        assert!(settings.rsync_config().expect("config").stats);
    }
}
