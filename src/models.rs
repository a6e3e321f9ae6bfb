use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseSelectorError, ValidationError};

pub const DIALOGUE_MIN_TURNS: usize = 4;
pub const DIALOGUE_MAX_TURNS: usize = 6;
pub const VOCABULARY_PER_TURN: usize = 2;
pub const VOCABULARY_LIST_LEN: usize = 8;

// 入门级问候语，单字练习中不允许出现
const ELEMENTARY_GREETINGS: &[&str] = &[
    "hello", "hi", "goodbye", "bye", "yes", "thank you", "thanks",
    "hola", "adiós", "adios", "sí", "gracias", "buenos días", "buenas noches",
    "こんにちは", "さようなら", "はい", "いいえ", "ありがとう", "おはよう", "こんばんは",
];

// 目标语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Ja,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Es, Language::Ja];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Ja => "ja",
        }
    }

    /// 提示词中使用的语言名称
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Ja => "Japanese",
        }
    }

    /// 对应的检定考试名称
    pub fn exam_name(self) -> &'static str {
        match self {
            Language::En => "IELTS/TOEIC",
            Language::Es => "DELE",
            Language::Ja => "JLPT",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "es" | "spanish" => Ok(Language::Es),
            "ja" | "japanese" => Ok(Language::Ja),
            _ => Err(ParseSelectorError {
                kind: "language",
                value: s.to_string(),
                expected: "en, es, ja",
            }),
        }
    }
}

// 模拟情境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Work,
    Tourism,
    Academic,
    Dining,
    Entertainment,
    Shopping,
    #[serde(rename = "Crisis_Management")]
    CrisisManagement,
    Negotiation,
    #[serde(rename = "Medical_Emergency")]
    MedicalEmergency,
}

impl Scenario {
    pub const ALL: [Scenario; 9] = [
        Scenario::Work,
        Scenario::Tourism,
        Scenario::Academic,
        Scenario::Dining,
        Scenario::Entertainment,
        Scenario::Shopping,
        Scenario::CrisisManagement,
        Scenario::Negotiation,
        Scenario::MedicalEmergency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Work => "Work",
            Scenario::Tourism => "Tourism",
            Scenario::Academic => "Academic",
            Scenario::Dining => "Dining",
            Scenario::Entertainment => "Entertainment",
            Scenario::Shopping => "Shopping",
            Scenario::CrisisManagement => "Crisis_Management",
            Scenario::Negotiation => "Negotiation",
            Scenario::MedicalEmergency => "Medical_Emergency",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ParseSelectorError;

    // 接受 "Crisis_Management"、"crisis-management"、"crisis management" 等写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ParseSelectorError {
                kind: "scenario",
                value: s.to_string(),
                expected: "Work, Tourism, Academic, Dining, Entertainment, Shopping, \
                           Crisis_Management, Negotiation, Medical_Emergency",
            })
    }
}

// 语音合成使用的语言代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioLangCode {
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "es-ES")]
    EsEs,
    #[serde(rename = "es-MX")]
    EsMx,
    #[serde(rename = "ja-JP")]
    JaJp,
}

impl AudioLangCode {
    pub const ALL: [AudioLangCode; 5] = [
        AudioLangCode::EnUs,
        AudioLangCode::EnGb,
        AudioLangCode::EsEs,
        AudioLangCode::EsMx,
        AudioLangCode::JaJp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AudioLangCode::EnUs => "en-US",
            AudioLangCode::EnGb => "en-GB",
            AudioLangCode::EsEs => "es-ES",
            AudioLangCode::EsMx => "es-MX",
            AudioLangCode::JaJp => "ja-JP",
        }
    }
}

impl fmt::Display for AudioLangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    B2,
    C1,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 2] = [DifficultyLevel::B2, DifficultyLevel::C1];

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::B2 => "B2",
            DifficultyLevel::C1 => "C1",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 数据结构定义，字段名与输出结构约定保持一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VocabularyItem {
    pub word: String,
    pub pos: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarAnalysis {
    pub point: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationPart {
    pub speaker: String,
    pub text_original: String,
    pub text_translation: String,
    pub audio_lang_code: AudioLangCode,
    pub grammar_analysis: GrammarAnalysis,
    pub vocabulary: Vec<VocabularyItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueResponse {
    pub scenario_title: String,
    pub difficulty_level: DifficultyLevel,
    pub context_description: String,
    pub conversation: Vec<ConversationPart>,
    pub cultural_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VocabularyPracticeItem {
    pub word: String,
    pub pos: String,
    pub translation: String,
    pub description: String,
    pub example_sentence: String,
    pub example_sentence_translation: String,
}

/// 自由对话的历史记录，由调用方持有
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FreestyleHistoryItem {
    User { text: String },
    Ai { part: ConversationPart },
}

/// 结构校验
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

impl Validate for VocabularyItem {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("vocabulary.word", &self.word)?;
        require_non_empty("vocabulary.pos", &self.pos)?;
        require_non_empty("vocabulary.translation", &self.translation)
    }
}

impl Validate for GrammarAnalysis {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("grammar_analysis.point", &self.point)?;
        require_non_empty("grammar_analysis.explanation", &self.explanation)
    }
}

impl Validate for ConversationPart {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("speaker", &self.speaker)?;
        require_non_empty("text_original", &self.text_original)?;
        require_non_empty("text_translation", &self.text_translation)?;
        self.grammar_analysis.validate()?;
        if self.vocabulary.len() != VOCABULARY_PER_TURN {
            return Err(ValidationError::Length {
                field: "vocabulary",
                expected: "2",
                actual: self.vocabulary.len(),
            });
        }
        self.vocabulary.iter().try_for_each(Validate::validate)
    }
}

impl Validate for DialogueResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("scenario_title", &self.scenario_title)?;
        require_non_empty("context_description", &self.context_description)?;
        require_non_empty("cultural_note", &self.cultural_note)?;
        let turns = self.conversation.len();
        if !(DIALOGUE_MIN_TURNS..=DIALOGUE_MAX_TURNS).contains(&turns) {
            return Err(ValidationError::Length {
                field: "conversation",
                expected: "4..=6",
                actual: turns,
            });
        }
        self.conversation.iter().try_for_each(Validate::validate)
    }
}

impl Validate for VocabularyPracticeItem {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("word", &self.word)?;
        require_non_empty("pos", &self.pos)?;
        require_non_empty("translation", &self.translation)?;
        require_non_empty("description", &self.description)?;
        require_non_empty("example_sentence", &self.example_sentence)?;
        require_non_empty("example_sentence_translation", &self.example_sentence_translation)?;
        if is_elementary_greeting(&self.word) {
            return Err(ValidationError::ElementaryGreeting(self.word.clone()));
        }
        Ok(())
    }
}

impl Validate for [VocabularyPracticeItem] {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.len() != VOCABULARY_LIST_LEN {
            return Err(ValidationError::Length {
                field: "vocabulary_list",
                expected: "8",
                actual: self.len(),
            });
        }
        self.iter().try_for_each(Validate::validate)
    }
}

/// 判断是否为入门级问候语（忽略大小写和首尾标点）
pub fn is_elementary_greeting(word: &str) -> bool {
    let normalized = word
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || "¡¿！？。、".contains(c))
        .to_lowercase();
    ELEMENTARY_GREETINGS.contains(&normalized.as_str())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn vocabulary_item(word: &str) -> VocabularyItem {
        VocabularyItem {
            word: word.to_string(),
            pos: "名詞".to_string(),
            translation: "翻譯".to_string(),
        }
    }

    pub fn conversation_part(text: &str) -> ConversationPart {
        ConversationPart {
            speaker: "Manager".to_string(),
            text_original: text.to_string(),
            text_translation: "中文翻譯".to_string(),
            audio_lang_code: AudioLangCode::EsEs,
            grammar_analysis: GrammarAnalysis {
                point: "Presente de subjuntivo".to_string(),
                explanation: "表達願望".to_string(),
            },
            vocabulary: vec![vocabulary_item("precio"), vocabulary_item("contrato")],
        }
    }

    pub fn dialogue(turns: usize) -> DialogueResponse {
        DialogueResponse {
            scenario_title: "Negociando un contrato".to_string(),
            difficulty_level: DifficultyLevel::C1,
            context_description: "與供應商談判合約".to_string(),
            conversation: (0..turns)
                .map(|i| conversation_part(&format!("Frase número {}", i + 1)))
                .collect(),
            cultural_note: "西班牙的商務午餐通常較晚".to_string(),
        }
    }

    pub fn practice_item(word: &str) -> VocabularyPracticeItem {
        VocabularyPracticeItem {
            word: word.to_string(),
            pos: "動詞".to_string(),
            translation: "翻譯".to_string(),
            description: "簡短介紹".to_string(),
            example_sentence: format!("Example with {}", word),
            example_sentence_translation: "例句翻譯".to_string(),
        }
    }

    pub fn practice_list() -> Vec<VocabularyPracticeItem> {
        ["negotiate", "reluctant", "thoroughly", "deadline", "allocate", "feasible", "hence", "venue"]
            .iter()
            .map(|w| practice_item(w))
            .collect()
    }
}
