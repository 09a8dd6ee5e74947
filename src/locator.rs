//! Discovery of the installed dictionary and its declared charset.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::constants::{DEFAULT_CHARSET, DEFAULT_CHUNK_PARSER_COMMAND, DEFAULT_DICDIR_COMMAND, DEFAULT_SUBDICTIONARY};
use crate::encoding::Charset;
use crate::engine::EngineBackend;
use crate::error::{MozukuError, Result};
use crate::probe::probe;
use crate::types::AnalyzerConfig;

/// Out-of-process configuration lookup, such as `mecab-config --dicdir`.
pub trait ConfigQuery {
    /// First line of the answer, or `None` when there is no usable answer.
    fn query(&self) -> Option<String>;
}

/// [`ConfigQuery`] backed by an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandQuery {
    program: String,
    args: Vec<String>,
}

impl CommandQuery {
    /// Builds a query from `[program, args...]`; `None` for an empty command.
    pub fn from_parts<S: AsRef<str>>(command: &[S]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        let program = program.as_ref().trim();
        if program.is_empty() {
            return None;
        }
        Some(Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.as_ref().to_string()).collect(),
        })
    }

    /// `mecab-config --dicdir`.
    pub fn dicdir() -> Self {
        Self::from_static(DEFAULT_DICDIR_COMMAND)
    }

    /// `cabocha-config --version`.
    pub fn chunk_parser_version() -> Self {
        Self::from_static(DEFAULT_CHUNK_PARSER_COMMAND)
    }

    fn from_static(command: &[&str]) -> Self {
        Self {
            program: command.first().copied().unwrap_or_default().to_string(),
            args: command.iter().skip(1).map(|arg| arg.to_string()).collect(),
        }
    }

    /// Runs the command and returns its first stdout line.
    pub fn run(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|error| {
                MozukuError::Unavailable(format!("failed to execute {}: {error}", self.program))
            })?;

        if !output.status.success() {
            return Err(MozukuError::Unavailable(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or_default().trim_end();
        if line.is_empty() {
            return Err(MozukuError::Unavailable(format!(
                "{} printed nothing",
                self.program
            )));
        }
        Ok(line.to_string())
    }
}

impl ConfigQuery for CommandQuery {
    fn query(&self) -> Option<String> {
        match self.run() {
            Ok(line) => Some(line),
            Err(error) => {
                debug!("config query failed: {error}");
                None
            }
        }
    }
}

/// What discovery learned about the installed engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineDescriptor {
    /// Whether a dictionary root was found.
    pub available: bool,
    /// Dictionary root reported by the configuration query.
    pub dictionary_path: Option<PathBuf>,
    /// Charset from `dicrc`, possibly corrected to UTF-8 by a probe.
    pub declared_charset: Option<String>,
}

/// Finds the dictionary root and the charset it declares.
pub struct EngineLocator {
    query: Box<dyn ConfigQuery>,
    subdictionary: String,
}

impl EngineLocator {
    pub fn new(query: Box<dyn ConfigQuery>) -> Self {
        Self {
            query,
            subdictionary: DEFAULT_SUBDICTIONARY.to_string(),
        }
    }

    /// Locator using the query command and subdictionary from `config`.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let query: Box<dyn ConfigQuery> = match CommandQuery::from_parts(config.dicdir_command.as_slice()) {
            Some(query) => Box::new(query),
            None => Box::new(NoQuery),
        };
        Self::new(query).with_subdictionary(config.subdictionary.clone())
    }

    pub fn with_subdictionary(mut self, subdictionary: impl Into<String>) -> Self {
        self.subdictionary = subdictionary.into();
        self
    }

    pub fn subdictionary(&self) -> &str {
        &self.subdictionary
    }

    /// Runs discovery. Never fails; an engine that cannot be found yields a
    /// descriptor with `available == false`.
    ///
    /// When `dicrc` declares a charset other than UTF-8, a throwaway tagger
    /// built with the default argument is probed, and a match overrides the
    /// declaration to UTF-8.
    pub fn locate(&self, backend: &dyn EngineBackend) -> EngineDescriptor {
        let Some(root) = self.query.query().filter(|line| !line.is_empty()) else {
            debug!("dictionary root not found");
            return EngineDescriptor::default();
        };
        let root = PathBuf::from(root);
        debug!("dictionary root: {}", root.display());

        let dicrc = root.join(&self.subdictionary).join("dicrc");
        let mut charset = read_declared_charset(&dicrc).unwrap_or_else(|| DEFAULT_CHARSET.to_string());
        debug!("declared charset: {charset}");

        if !Charset::new(&charset).is_utf8() {
            match backend.create_tagger("") {
                Ok(mut tagger) => {
                    if probe(tagger.as_mut()) {
                        debug!("default tagger answers in UTF-8 despite {charset}");
                        charset = DEFAULT_CHARSET.to_string();
                    }
                }
                Err(error) => debug!("probe tagger not constructed: {error}"),
            }
        }

        EngineDescriptor {
            available: true,
            dictionary_path: Some(root),
            declared_charset: Some(charset),
        }
    }
}

struct NoQuery;

impl ConfigQuery for NoQuery {
    fn query(&self) -> Option<String> {
        None
    }
}

fn config_charset_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"config-charset[^=]*=(.*)").ok())
        .as_ref()
}

/// Extracts the `config-charset` value from dicrc contents. Only the first
/// line mentioning the key counts; an empty value is `None`.
pub fn parse_config_charset(contents: &str) -> Option<String> {
    let pattern = config_charset_pattern()?;
    let captures = contents.lines().find_map(|line| pattern.captures(line))?;
    let value = captures
        .get(1)?
        .as_str()
        .trim_matches(|ch| matches!(ch, ' ' | '\t' | '\r'));
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads `config-charset` from a dicrc file; `None` when the file is missing
/// or declares nothing.
pub fn read_declared_charset(dicrc: &Path) -> Option<String> {
    let bytes = match fs::read(dicrc) {
        Ok(bytes) => bytes,
        Err(error) => {
            debug!("cannot read {}: {error}", dicrc.display());
            return None;
        }
    };
    parse_config_charset(&String::from_utf8_lossy(&bytes))
}

/// Version reported by `cabocha-config --version`, when installed.
pub fn locate_chunk_parser() -> Option<String> {
    let version = CommandQuery::chunk_parser_version().query();
    match version.as_deref() {
        Some(version) => debug!("chunk parser tooling found: {version}"),
        None => debug!("chunk parser tooling not found"),
    }
    version
}
