//! Constants mirrored from the MeCab C API and the analyzer's defaults.

/// Node status: ordinary dictionary word.
pub const MECAB_NOR_NODE: u8 = 0;
/// Node status: unknown word.
pub const MECAB_UNK_NODE: u8 = 1;
/// Node status: beginning-of-sentence sentinel.
pub const MECAB_BOS_NODE: u8 = 2;
/// Node status: end-of-sentence sentinel.
pub const MECAB_EOS_NODE: u8 = 3;
/// Node status: end of N-best enumeration.
pub const MECAB_EON_NODE: u8 = 4;

/// Charset label used when nothing else is known.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Two-character probe whose UTF-8 form is exactly six bytes.
pub const CHARSET_PROBE_TEXT: &str = "誤解";

/// Dictionary sub-directory appended to the discovered dictionary root.
pub const DEFAULT_SUBDICTIONARY: &str = "ipadic";

/// Command used to discover the default dictionary root.
pub const DEFAULT_DICDIR_COMMAND: &[&str] = &["mecab-config", "--dicdir"];

/// Command used to check for a chunk parser installation.
pub const DEFAULT_CHUNK_PARSER_COMMAND: &[&str] = &["cabocha-config", "--version"];

/// Environment variable: explicit libmecab path.
pub const ENV_MECAB_LIBRARY_PATH: &str = "MOZUKU_MECAB_LIBRARY_PATH";
/// Environment variable: explicit libcabocha path.
pub const ENV_CABOCHA_LIBRARY_PATH: &str = "MOZUKU_CABOCHA_LIBRARY_PATH";
/// Environment variable: explicit dictionary directory.
pub const ENV_MECAB_DICDIR: &str = "MOZUKU_MECAB_DICDIR";
/// Environment variable: requested engine charset.
pub const ENV_MECAB_CHARSET: &str = "MOZUKU_MECAB_CHARSET";
