use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{
    DEFAULT_DICDIR_COMMAND, DEFAULT_SUBDICTIONARY, ENV_CABOCHA_LIBRARY_PATH, ENV_MECAB_CHARSET,
    ENV_MECAB_DICDIR, ENV_MECAB_LIBRARY_PATH,
};

/// Settings for locating and bootstrapping the analysis engines.
///
/// [`AnalyzerConfig::default`] reads the `MOZUKU_*` environment variables.
/// The struct also deserializes from camelCase JSON so a language server can
/// forward its initialization options unchanged; omitted keys keep their
/// defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Explicit libmecab path. `None` searches the platform defaults.
    pub mecab_library_path: Option<PathBuf>,
    /// Explicit libcabocha path. `None` searches the platform defaults.
    pub cabocha_library_path: Option<PathBuf>,
    /// Dictionary directory passed straight to the tagger, skipping discovery.
    pub dictionary_path: Option<PathBuf>,
    /// Charset the engine is known to speak, overriding discovery.
    pub charset: Option<String>,
    /// Whether to construct the dependency chunk parser.
    pub enable_chunk_parser: bool,
    /// Sub-directory of the discovered dictionary root to use.
    pub subdictionary: String,
    /// Program and arguments printing the dictionary root on stdout.
    pub dicdir_command: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            mecab_library_path: env::var_os(ENV_MECAB_LIBRARY_PATH).map(PathBuf::from),
            cabocha_library_path: env::var_os(ENV_CABOCHA_LIBRARY_PATH).map(PathBuf::from),
            dictionary_path: env::var_os(ENV_MECAB_DICDIR).map(PathBuf::from),
            charset: env::var(ENV_MECAB_CHARSET).ok(),
            enable_chunk_parser: true,
            subdictionary: DEFAULT_SUBDICTIONARY.to_string(),
            dicdir_command: DEFAULT_DICDIR_COMMAND
                .iter()
                .map(|part| part.to_string())
                .collect(),
        }
    }
}

impl AnalyzerConfig {
    pub fn with_mecab_library_path(mut self, path: impl AsRef<Path>) -> Self {
        self.mecab_library_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_cabocha_library_path(mut self, path: impl AsRef<Path>) -> Self {
        self.cabocha_library_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_dictionary_path(mut self, path: impl AsRef<Path>) -> Self {
        self.dictionary_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_chunk_parser(mut self, enabled: bool) -> Self {
        self.enable_chunk_parser = enabled;
        self
    }

    pub fn with_subdictionary(mut self, subdictionary: impl Into<String>) -> Self {
        self.subdictionary = subdictionary.into();
        self
    }

    pub fn with_dicdir_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dicdir_command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Explicit dictionary path, ignoring empty values.
    pub(crate) fn explicit_dictionary_path(&self) -> Option<&Path> {
        self.dictionary_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Requested charset, ignoring empty or blank values.
    pub(crate) fn requested_charset(&self) -> Option<&str> {
        self.charset
            .as_deref()
            .map(str::trim)
            .filter(|charset| !charset.is_empty())
    }
}

#[cfg(test)]
mod types_tests {
    use super::AnalyzerConfig;
    use crate::test_support::with_env_vars;
    use std::path::{Path, PathBuf};

    fn cleared_env<T>(f: impl FnOnce() -> T) -> T {
        with_env_vars(
            &[
                ("MOZUKU_MECAB_LIBRARY_PATH", None),
                ("MOZUKU_CABOCHA_LIBRARY_PATH", None),
                ("MOZUKU_MECAB_DICDIR", None),
                ("MOZUKU_MECAB_CHARSET", None),
            ],
            f,
        )
    }

    #[test]
    fn default_reads_environment() {
        with_env_vars(
            &[
                ("MOZUKU_MECAB_LIBRARY_PATH", Some("/tmp/libmecab-test.so")),
                ("MOZUKU_MECAB_DICDIR", Some("/tmp/dic/ipadic")),
                ("MOZUKU_MECAB_CHARSET", Some("EUC-JP")),
                ("MOZUKU_CABOCHA_LIBRARY_PATH", None),
            ],
            || {
                let config = AnalyzerConfig::default();
                assert_eq!(
                    config.mecab_library_path,
                    Some(PathBuf::from("/tmp/libmecab-test.so"))
                );
                assert_eq!(config.dictionary_path, Some(PathBuf::from("/tmp/dic/ipadic")));
                assert_eq!(config.requested_charset(), Some("EUC-JP"));
                assert!(config.cabocha_library_path.is_none());
            },
        );
    }

    #[test]
    fn default_without_environment_has_discovery_settings() {
        cleared_env(|| {
            let config = AnalyzerConfig::default();
            assert!(config.mecab_library_path.is_none());
            assert!(config.explicit_dictionary_path().is_none());
            assert!(config.requested_charset().is_none());
            assert!(config.enable_chunk_parser);
            assert_eq!(config.subdictionary, "ipadic");
            assert_eq!(config.dicdir_command, vec!["mecab-config", "--dicdir"]);
        });
    }

    #[test]
    fn empty_values_count_as_absent() {
        cleared_env(|| {
            let config = AnalyzerConfig::default()
                .with_charset("  ")
                .with_dictionary_path("");
            assert!(config.requested_charset().is_none());
            assert!(config.explicit_dictionary_path().is_none());
        });
    }

    #[test]
    fn builder_methods_override_fields() {
        cleared_env(|| {
            let config = AnalyzerConfig::default()
                .with_dictionary_path("/opt/dic")
                .with_charset("Shift_JIS")
                .with_chunk_parser(false)
                .with_subdictionary("unidic")
                .with_dicdir_command(["my-config", "--dicdir"]);
            assert_eq!(config.explicit_dictionary_path(), Some(Path::new("/opt/dic")));
            assert_eq!(config.requested_charset(), Some("Shift_JIS"));
            assert!(!config.enable_chunk_parser);
            assert_eq!(config.subdictionary, "unidic");
            assert_eq!(config.dicdir_command[0], "my-config");
        });
    }

    #[test]
    fn deserializes_camel_case_options_with_defaults() {
        cleared_env(|| {
            let config: AnalyzerConfig = serde_json::from_str(
                r#"{"dictionaryPath":"/var/lib/mecab/dic/ipadic","charset":"UTF-8","enableChunkParser":false}"#,
            )
            .expect("valid config json");
            assert_eq!(
                config.dictionary_path,
                Some(PathBuf::from("/var/lib/mecab/dic/ipadic"))
            );
            assert_eq!(config.requested_charset(), Some("UTF-8"));
            assert!(!config.enable_chunk_parser);
            assert_eq!(config.subdictionary, "ipadic");
        });
    }
}
