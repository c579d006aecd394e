//! Synchronisation configuration and option-mapping binding.
//!
//! [`RsyncConfig`] is a flat record of independent settings. Mappings keyed
//! by the recognised option names are applied with
//! [`apply_recognized_options`]; unknown keys are ignored.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RsyncError;
use crate::ssh::SshOptions;

/// Default location of the `rsync` executable.
pub const DEFAULT_RSYNC_EXECUTABLE: &str = "/usr/bin/rsync";

/// Extra single-letter flags, given either as a run of letters or a list.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionalParameters {
    /// Letters packed into one string, e.g. `"zp"`.
    Letters(String),
    /// One entry per flag, e.g. `["z", "p"]`.
    List(Vec<String>),
}

impl OptionalParameters {
    /// Returns each flag letter in the order given, skipping whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] for any character other than an
    /// ASCII letter or digit.
    pub fn flags(&self) -> Result<Vec<char>, RsyncError> {
        let letters: Vec<char> = match self {
            Self::Letters(letters) => letters.chars().collect(),
            Self::List(entries) => entries.iter().flat_map(|entry| entry.chars()).collect(),
        };
        letters
            .into_iter()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    Ok(ch)
                } else {
                    Err(RsyncError::validation(
                        "option_parameters",
                        format!("{ch:?} is not a flag letter"),
                    ))
                }
            })
            .collect()
    }
}

impl Default for OptionalParameters {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<&str> for OptionalParameters {
    fn from(value: &str) -> Self {
        Self::Letters(value.to_owned())
    }
}

impl<const N: usize> From<[&str; N]> for OptionalParameters {
    fn from(value: [&str; N]) -> Self {
        Self::List(value.iter().map(|entry| (*entry).to_owned()).collect())
    }
}

/// Every setting that influences the generated `rsync` command.
///
/// Field names double as option-mapping keys, except where a `serde` rename
/// preserves an established key.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each toggle maps to one independent rsync flag"
)]
pub struct RsyncConfig {
    /// Path to the `rsync` executable.
    pub executable: String,
    /// Emit `-a`.
    pub archive: bool,
    /// Emit `-u`, skipping files that are newer on the receiver.
    #[serde(rename = "update")]
    pub skip_newer_files: bool,
    /// Emit `-L`.
    pub follow_symlinks: bool,
    /// Emit `-n`.
    pub dry_run: bool,
    /// Additional flags appended to the option cluster.
    #[serde(rename = "option_parameters")]
    pub optional_parameters: OptionalParameters,
    /// Emit `-v`.
    pub verbose: bool,
    /// Emit `--delete`.
    pub delete_from_target: bool,
    /// Emit `--delete-excluded`.
    pub delete_excluded: bool,
    /// Patterns emitted as repeated `--exclude` arguments.
    pub exclude: Vec<String>,
    /// File emitted as `--exclude-from`.
    #[serde(rename = "excludeFrom", alias = "exclude_from")]
    pub exclude_from: Option<String>,
    /// Emit `-r` when archive mode is off.
    pub recursive: bool,
    /// Emit `--times`.
    pub times: bool,
    /// Emit `--stats`.
    pub stats: bool,
    /// Forward the child's output to the console while it runs.
    pub show_output: bool,
    /// Emit `-z`.
    pub compression: bool,
    /// Treat the origin, rather than the target, as the remote side.
    pub remote_origin: bool,
    /// Emit `--remove-source-files`.
    pub remove_source: bool,
    /// Value for `--info`.
    pub info: Option<String>,
    /// Value for `--compare-dest`.
    pub compare_dest: Option<String>,
    /// Emit `--prune-empty-dirs`.
    pub prune_empty_dirs: bool,
    /// Emit `--omit-dir-times`.
    pub omit_dir_times: bool,
    /// Emit `--devices`.
    pub devices: bool,
    /// Emit `--specials`.
    pub specials: bool,
    /// Emit `--links`.
    pub links: bool,
    /// Value for `--chmod`.
    pub chmod: Option<String>,
    /// Value for `--chown`.
    pub chown: Option<String>,
    /// Emit `--itemize-changes`.
    pub itemize_changes: bool,
    /// Remote transport settings; when present one operand becomes remote.
    pub ssh: Option<SshOptions>,
}

impl Default for RsyncConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_RSYNC_EXECUTABLE.to_owned(),
            archive: true,
            skip_newer_files: false,
            follow_symlinks: true,
            dry_run: false,
            optional_parameters: OptionalParameters::default(),
            verbose: false,
            delete_from_target: false,
            delete_excluded: false,
            exclude: Vec::new(),
            exclude_from: None,
            recursive: true,
            times: false,
            stats: false,
            show_output: true,
            compression: false,
            remote_origin: false,
            remove_source: false,
            info: None,
            compare_dest: None,
            prune_empty_dirs: false,
            omit_dir_times: false,
            devices: false,
            specials: false,
            links: false,
            chmod: None,
            chown: None,
            itemize_changes: false,
            ssh: None,
        }
    }
}

impl RsyncConfig {
    /// Builds a configuration from defaults overlaid with `mapping`.
    ///
    /// # Errors
    ///
    /// See [`apply_recognized_options`].
    pub fn from_options(mapping: &Value) -> Result<Self, RsyncError> {
        let mut config = Self::default();
        apply_recognized_options(&mut config, mapping)?;
        Ok(config)
    }

    /// Sets the executable after checking it names an executable file.
    ///
    /// # Errors
    ///
    /// Returns [`RsyncError::Validation`] when `path` is missing, is not a
    /// regular file, or lacks an execute permission bit.
    pub fn set_executable(&mut self, path: &str) -> Result<(), RsyncError> {
        validate_executable(Utf8Path::new(path))?;
        path.clone_into(&mut self.executable);
        Ok(())
    }
}

/// Overlays the recognised keys of `mapping` onto `config`.
///
/// Keys absent from `mapping` keep their current values and unknown keys are
/// ignored. A present `executable` key is validated as by
/// [`RsyncConfig::set_executable`]; on any error `config` is left untouched.
///
/// # Errors
///
/// Returns [`RsyncError::Validation`] when `mapping` is not an object, a
/// recognised key holds a value of the wrong type, `option_parameters`
/// holds a non-letter, or the executable is invalid.
pub fn apply_recognized_options(
    config: &mut RsyncConfig,
    mapping: &Value,
) -> Result<(), RsyncError> {
    let Value::Object(overrides) = mapping else {
        return Err(RsyncError::validation("options", "expected a mapping"));
    };

    let current = serde_json::to_value(&*config)
        .map_err(|err| RsyncError::validation("options", err.to_string()))?;
    let mut merged = match current {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    for (key, value) in overrides {
        merged.insert(canonical_key(key).to_owned(), value.clone());
    }

    let updated: RsyncConfig = serde_json::from_value(Value::Object(merged))
        .map_err(|err| RsyncError::validation("options", err.to_string()))?;
    updated.optional_parameters.flags()?;
    if overrides.contains_key("executable") {
        validate_executable(Utf8Path::new(&updated.executable))?;
    }

    *config = updated;
    Ok(())
}

fn canonical_key(key: &str) -> &str {
    match key {
        "exclude_from" => "excludeFrom",
        other => other,
    }
}

fn validate_executable(path: &Utf8Path) -> Result<(), RsyncError> {
    let metadata = path
        .metadata()
        .map_err(|err| RsyncError::validation("executable", format!("{path}: {err}")))?;
    if !metadata.is_file() {
        return Err(RsyncError::validation(
            "executable",
            format!("{path} is not a file"),
        ));
    }
    if !is_executable(&metadata) {
        return Err(RsyncError::validation(
            "executable",
            format!("{path} is not executable"),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
const fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}
