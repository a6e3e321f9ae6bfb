//! 输出结构约定
//!
//! 以生成服务的 schema 方言（OBJECT / ARRAY / STRING）描述三种返回结构，
//! 随请求一并发送，要求模型只返回符合结构的 JSON。

use serde_json::{Value, json};

use crate::models::{
    AudioLangCode, DIALOGUE_MAX_TURNS, DIALOGUE_MIN_TURNS, DifficultyLevel, VOCABULARY_LIST_LEN,
    VOCABULARY_PER_TURN,
};

fn string_field(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn enum_field(values: &[&str], description: &str) -> Value {
    json!({ "type": "STRING", "enum": values, "description": description })
}

/// 单个对话回合
pub fn conversation_part_schema() -> Value {
    let audio_codes: Vec<&str> = AudioLangCode::ALL.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "speaker": string_field("說話者的角色名稱；自由對話時固定為 'AI Assistant'"),
            "text_original": string_field("以目標語言（英語、西班牙語或日語）寫成的原句"),
            "text_translation": string_field("原句的繁體中文翻譯"),
            "audio_lang_code": enum_field(&audio_codes, "語音合成使用的語言代碼"),
            "grammar_analysis": {
                "type": "OBJECT",
                "properties": {
                    "point": string_field("本句的文法重點，需明確指出使用的時態，例如 'Present Perfect Continuous'"),
                    "explanation": string_field("以繁體中文簡短說明此文法重點")
                },
                "required": ["point", "explanation"]
            },
            "vocabulary": {
                "type": "ARRAY",
                "description": "從 text_original 中挑出的兩個關鍵單字",
                "minItems": VOCABULARY_PER_TURN,
                "maxItems": VOCABULARY_PER_TURN,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": string_field("單字原形"),
                        "pos": string_field("詞性，例如「動詞」、「名詞」、「形容詞」"),
                        "translation": string_field("該單字在本句中的繁體中文意思")
                    },
                    "required": ["word", "pos", "translation"]
                }
            }
        },
        "required": [
            "speaker",
            "text_original",
            "text_translation",
            "audio_lang_code",
            "grammar_analysis",
            "vocabulary"
        ]
    })
}

/// 完整情境对话
pub fn dialogue_schema() -> Value {
    let levels: Vec<&str> = DifficultyLevel::ALL.iter().map(|l| l.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "scenario_title": string_field("情境標題，例如 'Negotiating a Supplier Contract'"),
            "difficulty_level": enum_field(&levels, "本段對話的難度等級"),
            "context_description": string_field("以繁體中文描述對話發生的情境"),
            "conversation": {
                "type": "ARRAY",
                "minItems": DIALOGUE_MIN_TURNS,
                "maxItems": DIALOGUE_MAX_TURNS,
                "items": conversation_part_schema()
            },
            "cultural_note": string_field("與情境相關的文化小提示（繁體中文）")
        },
        "required": [
            "scenario_title",
            "difficulty_level",
            "context_description",
            "conversation",
            "cultural_note"
        ]
    })
}

/// 单字练习列表
pub fn vocabulary_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "minItems": VOCABULARY_LIST_LEN,
        "maxItems": VOCABULARY_LIST_LEN,
        "items": {
            "type": "OBJECT",
            "properties": {
                "word": string_field("單字原形"),
                "pos": string_field("詞性，例如「動詞」、「名詞」"),
                "translation": string_field("單字的繁體中文意思"),
                "description": string_field("以繁體中文簡短介紹此單字的用法"),
                "example_sentence": string_field("使用此單字的目標語言例句"),
                "example_sentence_translation": string_field("例句的繁體中文翻譯")
            },
            "required": [
                "word",
                "pos",
                "translation",
                "description",
                "example_sentence",
                "example_sentence_translation"
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_conversation_part_schema_enumerates_audio_codes() {
        let schema = conversation_part_schema();
        assert_eq!(
            schema["properties"]["audio_lang_code"]["enum"],
            json!(["en-US", "en-GB", "es-ES", "es-MX", "ja-JP"])
        );
        assert_eq!(schema["properties"]["vocabulary"]["minItems"], json!(2));
        assert_eq!(schema["properties"]["vocabulary"]["maxItems"], json!(2));
        assert_eq!(required(&schema).len(), 6);
    }

    #[test]
    fn test_dialogue_schema_bounds_and_levels() {
        let schema = dialogue_schema();
        assert_eq!(
            schema["properties"]["difficulty_level"]["enum"],
            json!(["B2", "C1"])
        );
        let conversation = &schema["properties"]["conversation"];
        assert_eq!(conversation["minItems"], json!(4));
        assert_eq!(conversation["maxItems"], json!(6));
        assert_eq!(conversation["items"], conversation_part_schema());
        assert!(required(&schema).contains(&"cultural_note"));
    }

    #[test]
    fn test_vocabulary_list_schema_is_array_of_eight() {
        let schema = vocabulary_list_schema();
        assert_eq!(schema["type"], json!("ARRAY"));
        assert_eq!(schema["minItems"], json!(8));
        assert_eq!(schema["maxItems"], json!(8));
        assert_eq!(required(&schema["items"]).len(), 6);
    }
}
