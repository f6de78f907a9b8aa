//! Option syntax shared by every component of one matcher.

use indexmap::IndexMap;

/// How options are spelled on the command line, plus the display metadata
/// used when rendering usage text.
///
/// Clustered-short handling is on exactly when the long prefix is `--`:
/// single-dash tokens are then read as getopt clusters of one character
/// names.
#[derive(Debug, Clone)]
pub(crate) struct Mode {
    prefix: String,
    assigner: String,
    clustered: bool,
    /// Help line per option name, looked up through aliases.
    pub(crate) options_help: IndexMap<String, String>,
    /// Display name for an option's value, looked up through aliases.
    pub(crate) var_names: IndexMap<String, String>,
}

impl Mode {
    pub(crate) fn new(prefix: impl Into<String>, assigner: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let clustered = prefix == "--";
        Mode {
            prefix,
            assigner: assigner.into(),
            clustered,
            options_help: IndexMap::new(),
            var_names: IndexMap::new(),
        }
    }

    pub(crate) fn clustered(&self) -> bool {
        self.clustered
    }

    pub(crate) fn long_prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn assigner(&self) -> &str {
        &self.assigner
    }

    /// Prefix to print before `name`: `-` for one character spellings in
    /// clustered mode, the long prefix otherwise.
    pub(crate) fn option_prefix_for(&self, name: &str) -> &str {
        if self.clustered && name.chars().count() == 1 {
            "-"
        } else {
            &self.prefix
        }
    }

    /// Delimiter printed between `name` and its value: a space for one
    /// character spellings in clustered mode, the assigner otherwise.
    pub(crate) fn delimiter_for(&self, name: &str) -> &str {
        if self.clustered && name.chars().count() == 1 {
            " "
        } else {
            &self.assigner
        }
    }
}
