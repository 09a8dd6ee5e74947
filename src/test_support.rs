use std::env;
use std::ffi::OsString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::encoding::{to_system, to_utf8, Charset};
use crate::engine::{ChunkParser, ChunkTree, EngineBackend, EngineNode, NodeStat, Tagger, TreeChunk};
use crate::error::{MozukuError, Result};
use crate::locator::ConfigQuery;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn set_env_var(key: &str, value: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        env::set_var(key, value);
    }
}

fn remove_env_var(key: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        env::remove_var(key);
    }
}

/// Runs a closure while holding a global environment lock and applying overrides.
pub(crate) fn with_env_vars<T>(overrides: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let _guard = env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let backups: Vec<(&str, Option<OsString>)> = overrides
        .iter()
        .map(|(key, _)| (*key, env::var_os(key)))
        .collect();

    for (key, value) in overrides {
        match value {
            Some(value) => set_env_var(key, value),
            None => remove_env_var(key),
        }
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in backups.into_iter().rev() {
        match value {
            Some(value) => {
                #[allow(unused_unsafe)]
                unsafe {
                    env::set_var(key, value);
                }
            }
            None => remove_env_var(key),
        }
    }

    match result {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

const UNKNOWN_FEATURE: &str = "名詞,一般,*,*,*,*,*";

/// Small IPADIC-flavoured vocabulary used by the fake engines.
pub(crate) fn sample_vocabulary() -> Vec<(String, String)> {
    [
        ("誤解", "名詞,サ変接続,*,*,*,*,誤解,ゴカイ,ゴカイ"),
        ("です", "助動詞,*,*,*,特殊・デス,基本形,です,デス,デス"),
        ("。", "記号,句点,*,*,*,*,。,。,。"),
        ("、", "記号,読点,*,*,*,*,、,、,、"),
        ("東京", "名詞,固有名詞,地域,一般,*,*,東京,トウキョウ,トーキョー"),
        ("に", "助詞,格助詞,一般,*,*,*,に,ニ,ニ"),
        ("は", "助詞,係助詞,*,*,*,*,は,ハ,ワ"),
        ("が", "助詞,格助詞,一般,*,*,*,が,ガ,ガ"),
        ("を", "助詞,格助詞,一般,*,*,*,を,ヲ,ヲ"),
        ("行く", "動詞,自立,*,*,五段・カ行促音便,基本形,行く,イク,イク"),
        ("行っ", "動詞,自立,*,*,五段・カ行促音便,連用タ接続,行く,イッ,イッ"),
        ("た", "助動詞,*,*,*,特殊・タ,基本形,た,タ,タ"),
        ("私", "名詞,代名詞,一般,*,*,*,私,ワタシ,ワタシ"),
        ("寿司", "名詞,一般,*,*,*,*,寿司,スシ,スシ"),
        ("猫", "名詞,一般,*,*,*,*,猫,ネコ,ネコ"),
        ("「", "記号,括弧開,*,*,*,*,「,「,「"),
        ("」", "記号,括弧閉,*,*,*,*,」,」,」"),
    ]
    .iter()
    .map(|(surface, feature)| (surface.to_string(), feature.to_string()))
    .collect()
}

/// Greedy longest-match split of `text`. Whitespace is skipped the way a real
/// tokenizer skips it; characters outside the vocabulary become single-character
/// unknown words.
fn split_words(text: &str, vocabulary: &[(String, String)]) -> Vec<(String, String, NodeStat)> {
    let mut words = Vec::new();
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if ch.is_whitespace() {
            rest = &rest[ch.len_utf8()..];
            continue;
        }
        let known = vocabulary
            .iter()
            .filter(|(surface, _)| rest.starts_with(surface.as_str()))
            .max_by_key(|(surface, _)| surface.len());
        match known {
            Some((surface, feature)) => {
                words.push((surface.clone(), feature.clone(), NodeStat::Normal));
                rest = &rest[surface.len()..];
            }
            None => {
                words.push((ch.to_string(), UNKNOWN_FEATURE.to_string(), NodeStat::Unknown));
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    words
}

/// How a fake tagger answers `parse`.
#[derive(Debug, Clone)]
pub(crate) enum FakeTaggerMode {
    /// Split input with the vocabulary in the engine's charset.
    Vocabulary,
    /// Return these nodes verbatim, framed by BOS/EOS.
    Scripted(Vec<EngineNode>),
    /// Fail every parse.
    Failing,
}

/// In-process stand-in for the tokenizer.
pub(crate) struct FakeTagger {
    charset: Charset,
    vocabulary: Vec<(String, String)>,
    mode: FakeTaggerMode,
    parse_calls: Arc<AtomicUsize>,
}

impl FakeTagger {
    pub(crate) fn new(charset: Charset) -> Self {
        Self {
            charset,
            vocabulary: sample_vocabulary(),
            mode: FakeTaggerMode::Vocabulary,
            parse_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn scripted(nodes: Vec<EngineNode>) -> Self {
        Self {
            mode: FakeTaggerMode::Scripted(nodes),
            ..Self::new(Charset::utf8())
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            mode: FakeTaggerMode::Failing,
            ..Self::new(Charset::utf8())
        }
    }

    pub(crate) fn parse_calls(&self) -> Arc<AtomicUsize> {
        self.parse_calls.clone()
    }
}

impl Tagger for FakeTagger {
    fn parse(&mut self, input: &[u8]) -> Result<Vec<EngineNode>> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        let mut nodes = vec![EngineNode::boundary(NodeStat::BeginOfSentence)];
        match &self.mode {
            FakeTaggerMode::Failing => {
                return Err(MozukuError::Engine("fake tagger failure".to_string()));
            }
            FakeTaggerMode::Scripted(scripted) => nodes.extend(scripted.iter().cloned()),
            FakeTaggerMode::Vocabulary => {
                let text = to_utf8(input, &self.charset);
                for (surface, feature, stat) in split_words(&text, &self.vocabulary) {
                    nodes.push(EngineNode {
                        surface: to_system(&surface, &self.charset),
                        feature: to_system(&feature, &self.charset),
                        stat,
                    });
                }
            }
        }
        nodes.push(EngineNode::boundary(NodeStat::EndOfSentence));
        Ok(nodes)
    }
}

/// In-process stand-in for the chunk parser. A chunk closes after every
/// particle, auxiliary or symbol; each chunk links to the next and the last
/// one has no head.
pub(crate) struct FakeChunkParser {
    charset: Charset,
    vocabulary: Vec<(String, String)>,
    produce_tree: bool,
}

impl FakeChunkParser {
    pub(crate) fn new(charset: Charset) -> Self {
        Self {
            charset,
            vocabulary: sample_vocabulary(),
            produce_tree: true,
        }
    }

    pub(crate) fn without_tree() -> Self {
        Self {
            produce_tree: false,
            ..Self::new(Charset::utf8())
        }
    }
}

impl ChunkParser for FakeChunkParser {
    fn parse_to_tree(&mut self, input: &[u8]) -> Result<Option<ChunkTree>> {
        if !self.produce_tree {
            return Ok(None);
        }
        let text = to_utf8(input, &self.charset);
        let words = split_words(&text, &self.vocabulary);

        let mut tree = ChunkTree::default();
        let mut chunk_start = 0;
        for (index, (surface, feature, _)) in words.iter().enumerate() {
            tree.tokens.push(Some(to_system(surface, &self.charset)));
            let closes = ["助詞", "助動詞", "記号"]
                .iter()
                .any(|pos| feature.split(',').next() == Some(*pos));
            if closes || index + 1 == words.len() {
                tree.chunks.push(TreeChunk {
                    link: 0,
                    score: 0.5,
                    token_pos: chunk_start,
                    token_size: index + 1 - chunk_start,
                });
                chunk_start = index + 1;
            }
        }
        let chunk_count = tree.chunks.len();
        for (index, chunk) in tree.chunks.iter_mut().enumerate() {
            chunk.link = if index + 1 == chunk_count {
                -1
            } else {
                (index + 1) as i32
            };
        }
        Ok(Some(tree))
    }
}

/// Engine backend handing out fakes, recording every construction argument.
#[derive(Clone)]
pub(crate) struct FakeBackend {
    /// Charset the fake engines speak.
    pub(crate) charset: Charset,
    /// Arguments for which tagger construction fails.
    pub(crate) failing_arguments: Vec<String>,
    /// Whether chunk parser construction succeeds.
    pub(crate) chunk_parser_available: bool,
    tagger_arguments: Arc<Mutex<Vec<String>>>,
    chunk_parser_arguments: Arc<Mutex<Vec<String>>>,
    parse_calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub(crate) fn new(charset: Charset) -> Self {
        Self {
            charset,
            failing_arguments: Vec::new(),
            chunk_parser_available: true,
            tagger_arguments: Arc::new(Mutex::new(Vec::new())),
            chunk_parser_arguments: Arc::new(Mutex::new(Vec::new())),
            parse_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing_on(mut self, argument: &str) -> Self {
        self.failing_arguments.push(argument.to_string());
        self
    }

    pub(crate) fn without_chunk_parser(mut self) -> Self {
        self.chunk_parser_available = false;
        self
    }

    pub(crate) fn tagger_arguments(&self) -> Vec<String> {
        self.tagger_arguments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn chunk_parser_arguments(&self) -> Vec<String> {
        self.chunk_parser_arguments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Total `parse` calls across every tagger this backend created.
    pub(crate) fn parse_calls(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }
}

impl EngineBackend for FakeBackend {
    fn create_tagger(&self, argument: &str) -> Result<Box<dyn Tagger>> {
        self.tagger_arguments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(argument.to_string());
        if self.failing_arguments.iter().any(|failing| failing == argument) {
            return Err(MozukuError::ConstructionFailed(format!(
                "no dictionary for {argument:?}"
            )));
        }
        let mut tagger = FakeTagger::new(self.charset.clone());
        tagger.parse_calls = self.parse_calls.clone();
        Ok(Box::new(tagger))
    }

    fn create_chunk_parser(&self, argument: &str) -> Result<Box<dyn ChunkParser>> {
        self.chunk_parser_arguments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(argument.to_string());
        if !self.chunk_parser_available {
            return Err(MozukuError::Unavailable("fake chunk parser disabled".to_string()));
        }
        Ok(Box::new(FakeChunkParser::new(self.charset.clone())))
    }
}

/// Configuration query returning a fixed answer.
pub(crate) struct FakeQuery(pub(crate) Option<String>);

impl ConfigQuery for FakeQuery {
    fn query(&self) -> Option<String> {
        self.0.clone()
    }
}
