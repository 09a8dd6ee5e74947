//! Derivation of token attributes from MeCab feature strings.
//!
//! Feature strings follow the IPADIC layout:
//! `pos,sub1,sub2,sub3,conjugation type,conjugation form,base form,reading,pronunciation`.
//! Dictionaries that emit fewer columns simply leave the derived fields empty.

use serde::Serialize;

const FIELD_POS: usize = 0;
const FIELD_CONJUGATION_FORM: usize = 5;
const FIELD_BASE_FORM: usize = 6;
const FIELD_READING: usize = 7;
const FIELD_PRONUNCIATION: usize = 8;

const OPENING_BRACKETS: &[char] = &['「', '『', '（', '(', '“', '【', '〈', '《'];

/// Coarse token classification reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Particle,
    Auxiliary,
    Conjunction,
    Adnominal,
    Interjection,
    Prefix,
    Symbol,
    Unknown,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Noun => "noun",
            TokenType::Verb => "verb",
            TokenType::Adjective => "adjective",
            TokenType::Adverb => "adverb",
            TokenType::Particle => "particle",
            TokenType::Auxiliary => "auxiliary",
            TokenType::Conjunction => "conjunction",
            TokenType::Adnominal => "adnominal",
            TokenType::Interjection => "interjection",
            TokenType::Prefix => "prefix",
            TokenType::Symbol => "symbol",
            TokenType::Unknown => "unknown",
        }
    }
}

/// Extra attributes layered on a [`TokenType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenModifier {
    /// Proper noun (固有名詞).
    Proper,
    /// Numeral (数).
    Numeric,
    /// Non-independent word (非自立).
    Dependent,
    /// Conjugated away from its dictionary form.
    Inflected,
    /// Directly follows an opening bracket.
    Quoted,
}

/// Fields derived from one feature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDetails {
    pub base_form: String,
    pub reading: String,
    pub pronunciation: String,
    pub token_type: TokenType,
}

/// Parses `feature`; `surface` stands in for a missing base form.
pub fn parse_feature(feature: &str, surface: &str) -> FeatureDetails {
    let fields = split_fields(feature);
    FeatureDetails {
        base_form: field(&fields, FIELD_BASE_FORM)
            .unwrap_or(surface)
            .to_string(),
        reading: field(&fields, FIELD_READING).unwrap_or_default().to_string(),
        pronunciation: field(&fields, FIELD_PRONUNCIATION)
            .unwrap_or_default()
            .to_string(),
        token_type: map_pos_to_type(feature),
    }
}

/// Classifies a token by the top-level part of speech.
pub fn map_pos_to_type(feature: &str) -> TokenType {
    match split_fields(feature).get(FIELD_POS).copied().unwrap_or("") {
        "名詞" => TokenType::Noun,
        "動詞" => TokenType::Verb,
        "形容詞" | "形容動詞" | "形状詞" => TokenType::Adjective,
        "副詞" => TokenType::Adverb,
        "助詞" => TokenType::Particle,
        "助動詞" => TokenType::Auxiliary,
        "接続詞" => TokenType::Conjunction,
        "連体詞" => TokenType::Adnominal,
        "感動詞" => TokenType::Interjection,
        "接頭詞" | "接頭辞" => TokenType::Prefix,
        "記号" | "補助記号" => TokenType::Symbol,
        _ => TokenType::Unknown,
    }
}

/// Computes modifiers for the token occupying `text[offset..offset + len]`.
pub fn compute_modifiers(text: &str, offset: usize, len: usize, feature: &str) -> Vec<TokenModifier> {
    let fields = split_fields(feature);
    let subcategories = &fields[1.min(fields.len())..4.min(fields.len())];
    let mut modifiers = Vec::new();

    if subcategories.contains(&"固有名詞") {
        modifiers.push(TokenModifier::Proper);
    }
    if subcategories.contains(&"数") {
        modifiers.push(TokenModifier::Numeric);
    }
    if subcategories.contains(&"非自立") {
        modifiers.push(TokenModifier::Dependent);
    }
    if field(&fields, FIELD_CONJUGATION_FORM).is_some_and(|form| form != "基本形") {
        modifiers.push(TokenModifier::Inflected);
    }
    if len > 0 && follows_opening_bracket(text, offset) {
        modifiers.push(TokenModifier::Quoted);
    }

    modifiers
}

fn follows_opening_bracket(text: &str, offset: usize) -> bool {
    text.get(..offset.min(text.len()))
        .and_then(|before| before.chars().next_back())
        .is_some_and(|ch| OPENING_BRACKETS.contains(&ch))
}

fn split_fields(feature: &str) -> Vec<&str> {
    if feature.is_empty() {
        return Vec::new();
    }
    feature.split(',').collect()
}

fn field<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields
        .get(index)
        .copied()
        .filter(|value| !value.is_empty() && *value != "*")
}
