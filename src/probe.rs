//! Detects whether a tagger actually speaks UTF-8.
//!
//! Dictionaries sometimes declare a legacy charset in `dicrc` while the
//! installed binary dictionary is UTF-8. Feeding the UTF-8 bytes of a known
//! word and getting the same bytes back as one surface settles it.

use tracing::debug;

use crate::constants::CHARSET_PROBE_TEXT;
use crate::engine::Tagger;

/// Returns true when `tagger` returns the probe word as one node with a
/// byte-identical surface. Parse failures count as no match.
pub fn probe(tagger: &mut dyn Tagger) -> bool {
    let expected = CHARSET_PROBE_TEXT.as_bytes();
    let nodes = match tagger.parse(expected) {
        Ok(nodes) => nodes,
        Err(error) => {
            debug!("charset probe parse failed: {error}");
            return false;
        }
    };

    let matched = nodes
        .iter()
        .filter(|node| !node.stat.is_boundary())
        .any(|node| node.surface == expected);
    debug!("charset probe {}", if matched { "matched UTF-8" } else { "did not match" });
    matched
}

#[cfg(test)]
mod probe_tests {
    use super::probe;
    use crate::encoding::Charset;
    use crate::engine::{EngineNode, NodeStat};
    use crate::test_support::FakeTagger;

    #[test]
    fn utf8_tagger_matches() {
        let mut tagger = FakeTagger::new(Charset::utf8());
        assert!(probe(&mut tagger));
    }

    #[test]
    fn legacy_tagger_does_not_match() {
        let mut tagger = FakeTagger::new(Charset::new("EUC-JP"));
        assert!(!probe(&mut tagger));
    }

    #[test]
    fn split_surfaces_do_not_match() {
        let mut tagger = FakeTagger::scripted(vec![
            EngineNode::content("誤", "名詞"),
            EngineNode::content("解", "名詞"),
        ]);
        assert!(!probe(&mut tagger));
    }

    #[test]
    fn boundary_nodes_are_ignored() {
        let mut boundary = EngineNode::boundary(NodeStat::EndOfSentence);
        boundary.surface = "誤解".as_bytes().to_vec();
        let mut tagger = FakeTagger::scripted(vec![boundary]);
        assert!(!probe(&mut tagger));
    }

    #[test]
    fn parse_failure_is_no_match() {
        let mut tagger = FakeTagger::failing();
        assert!(!probe(&mut tagger));
    }
}
