//! 提示词构建
//!
//! 每个生成操作对应一个纯函数：输入参数 → (系统指令, 用户提示)，不涉及网络调用。

use crate::models::{
    DIALOGUE_MAX_TURNS, DIALOGUE_MIN_TURNS, DifficultyLevel, FreestyleHistoryItem, Language,
    Scenario, VOCABULARY_LIST_LEN, VOCABULARY_PER_TURN,
};

pub const DIALOGUE_TEMPERATURE: f32 = 0.9;
pub const FREESTYLE_TEMPERATURE: f32 = 0.8;
pub const VOCABULARY_TEMPERATURE: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system_instruction: String,
    pub user_text: String,
}

// 情境对话
pub fn dialogue_prompt(
    scenario: Scenario,
    language: Language,
    difficulty: DifficultyLevel,
) -> Prompt {
    let lang = language.display_name();
    let exam = language.exam_name();

    let system_instruction = format!(
        r#"You are a strict language examiner for {exam}. Generate a realistic, challenging dialogue for a Traditional Chinese speaker who is learning {lang}.
- The difficulty level of this dialogue MUST be {difficulty}. Set "difficulty_level" to "{difficulty}".
- Return a single valid JSON object that matches the provided schema. No markdown, no code fences, no commentary.
- Every "text_original" field MUST be written in {lang} only. Do not mix in any other language.
- Each turn MUST list exactly {per_turn} key vocabulary words taken from that turn. Vary grammar and vocabulary across turns.
- The dialogue MUST have between {min} and {max} turns. Keep every turn short and conversational; no monologues.
- Avoid greetings and overly simple phrases.
- All descriptive text for the learner MUST be in Traditional Chinese (繁體中文)."#,
        per_turn = VOCABULARY_PER_TURN,
        min = DIALOGUE_MIN_TURNS,
        max = DIALOGUE_MAX_TURNS,
    );

    let user_text = format!(
        "Generate a dialogue for the following scenario:\nScenario: {}\nLanguage: {}",
        scenario, lang
    );

    Prompt {
        system_instruction,
        user_text,
    }
}

/// 将对话历史渲染为线性文本，每个回合一行
pub fn render_transcript(history: &[FreestyleHistoryItem], language: Language) -> String {
    history
        .iter()
        .map(|item| match item {
            FreestyleHistoryItem::User { text } => format!("User (in Chinese): \"{}\"", text),
            FreestyleHistoryItem::Ai { part } => format!(
                "AI (in {}): \"{}\"",
                language.display_name(),
                part.text_original
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// 自由对话
pub fn freestyle_prompt(
    history: &[FreestyleHistoryItem],
    user_input: &str,
    language: Language,
) -> Prompt {
    let lang = language.display_name();

    let system_instruction = format!(
        r#"You are a friendly AI language tutor for a Traditional Chinese speaker. Hold a natural conversation in {lang} at a B2/C1 level.
- The user writes in Traditional Chinese. You MUST reply in {lang}.
- Vary sentence structure and vocabulary; introduce idioms or colloquial expressions where they fit.
- Return a single valid JSON object that matches the provided schema. No markdown, no code fences, no commentary.
- "speaker" MUST be "AI Assistant". Keep "text_original" brief and natural, ideally under 15 words.
- Give a concise grammar analysis and exactly {per_turn} key vocabulary words from your reply.
- All descriptive text MUST be in Traditional Chinese (繁體中文)."#,
        per_turn = VOCABULARY_PER_TURN,
    );

    let transcript = if history.is_empty() {
        "(no previous messages)".to_string()
    } else {
        render_transcript(history, language)
    };

    let user_text = format!(
        "Here is the conversation history:\n{}\n\nNow, the user says (in Chinese): \"{}\"\n\nPlease provide your response in {} as a valid JSON object.",
        transcript, user_input, lang
    );

    Prompt {
        system_instruction,
        user_text,
    }
}

// 单字练习列表
pub fn vocabulary_prompt(language: Language) -> Prompt {
    let lang = language.display_name();
    let exam = language.exam_name();

    let system_instruction = format!(
        r#"You are an expert language curriculum designer for Traditional Chinese speakers. Produce a list of exactly {count} essential vocabulary words for a learner of {lang}.
- The words MUST be practical and appear frequently in {exam} exams.
- Spread the difficulty across A1, A2, B1 and B2.
- Do NOT include elementary greetings or filler words such as 'hello', 'goodbye', 'yes', 'no', 'hola', 'adiós', 'こんにちは'.
- Mix nouns, verbs, adjectives and adverbs.
- Return a single valid JSON array that matches the provided schema. No markdown, no code fences, no commentary.
- All translations and descriptions MUST be in Traditional Chinese (繁體中文)."#,
        count = VOCABULARY_LIST_LEN,
    );

    let user_text = format!(
        "Generate {} essential, exam-relevant {} vocabulary words with varied difficulty.",
        VOCABULARY_LIST_LEN, lang
    );

    Prompt {
        system_instruction,
        user_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::conversation_part;

    #[test]
    fn test_dialogue_prompt_mentions_exam_and_difficulty() {
        let prompt = dialogue_prompt(Scenario::Negotiation, Language::Es, DifficultyLevel::C1);
        assert!(prompt.system_instruction.contains("examiner for DELE"));
        assert!(prompt.system_instruction.contains("MUST be C1"));
        assert!(prompt.system_instruction.contains("in Spanish only"));
        assert!(prompt.system_instruction.contains("between 4 and 6 turns"));
        assert!(prompt.system_instruction.contains("exactly 2 key vocabulary"));
        assert_eq!(
            prompt.user_text,
            "Generate a dialogue for the following scenario:\nScenario: Negotiation\nLanguage: Spanish"
        );
    }

    #[test]
    fn test_dialogue_prompt_uses_wire_scenario_name() {
        let prompt = dialogue_prompt(Scenario::MedicalEmergency, Language::Ja, DifficultyLevel::B2);
        assert!(prompt.user_text.contains("Scenario: Medical_Emergency"));
        assert!(prompt.system_instruction.contains("JLPT"));
    }

    #[test]
    fn test_render_transcript() {
        let mut part = conversation_part("Sounds great!");
        part.audio_lang_code = crate::models::AudioLangCode::EnUs;
        let history = vec![
            FreestyleHistoryItem::User {
                text: "你好，今天天氣如何？".to_string(),
            },
            FreestyleHistoryItem::Ai { part },
        ];
        assert_eq!(
            render_transcript(&history, Language::En),
            "User (in Chinese): \"你好，今天天氣如何？\"\nAI (in English): \"Sounds great!\""
        );
    }

    #[test]
    fn test_freestyle_prompt_appends_new_utterance() {
        let history = vec![FreestyleHistoryItem::User {
            text: "你好，今天天氣如何？".to_string(),
        }];
        let prompt = freestyle_prompt(&history, "我想練習對話", Language::En);
        assert!(prompt.user_text.starts_with(
            "Here is the conversation history:\nUser (in Chinese): \"你好，今天天氣如何？\"\n\n"
        ));
        assert!(prompt
            .user_text
            .contains("Now, the user says (in Chinese): \"我想練習對話\""));
        assert!(prompt.system_instruction.contains("MUST reply in English"));
    }

    #[test]
    fn test_freestyle_prompt_with_empty_history() {
        let prompt = freestyle_prompt(&[], "開始吧", Language::Ja);
        assert!(prompt.user_text.contains("(no previous messages)"));
        assert!(prompt.user_text.contains("response in Japanese"));
    }

    #[test]
    fn test_vocabulary_prompt() {
        let prompt = vocabulary_prompt(Language::Ja);
        assert!(prompt.system_instruction.contains("exactly 8 essential"));
        assert!(prompt.system_instruction.contains("JLPT"));
        assert!(prompt.system_instruction.contains("こんにちは"));
        assert_eq!(
            prompt.user_text,
            "Generate 8 essential, exam-relevant Japanese vocabulary words with varied difficulty."
        );
    }

    #[test]
    fn test_prompts_are_deterministic() {
        for language in Language::ALL {
            assert_eq!(vocabulary_prompt(language), vocabulary_prompt(language));
            assert_eq!(
                dialogue_prompt(Scenario::Work, language, DifficultyLevel::B2),
                dialogue_prompt(Scenario::Work, language, DifficultyLevel::B2)
            );
        }
    }
}
