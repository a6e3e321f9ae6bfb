use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::{DialogueResponse, VocabularyPracticeItem};

pub const VOCABULARY_TAG: &str = "單字";
pub const DIALOGUE_TAG: &str = "對話";

// Anki 导入格式：制表符分隔，字段为 正面 / 背面 / 标签
fn card_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

fn front(word: &str, pos: &str) -> String {
    format!(
        "<div style=\"font-size: 20px; font-weight: bold;\">{}</div><div style=\"font-size: 14px; color: #666;\">{}</div>",
        word, pos
    )
}

/// 写出单字练习卡片，返回写出的行数
pub fn write_vocabulary_cards<W: Write>(items: &[VocabularyPracticeItem], writer: W) -> Result<usize> {
    let mut wtr = card_writer(writer);
    for item in items {
        let back = format!(
            "<b>{}</b><br>{}<hr>{}<br>{}",
            item.translation, item.description, item.example_sentence, item.example_sentence_translation
        );
        wtr.write_record([front(&item.word, &item.pos).as_str(), back.as_str(), VOCABULARY_TAG])?;
    }
    wtr.flush()?;
    Ok(items.len())
}

/// 写出对话中每个回合的重点单字，背面附上原句和翻译
pub fn write_dialogue_cards<W: Write>(dialogue: &DialogueResponse, writer: W) -> Result<usize> {
    let mut wtr = card_writer(writer);
    let mut count = 0;
    for part in &dialogue.conversation {
        for vocab in &part.vocabulary {
            let back = format!(
                "<b>{}</b><hr>{}<br>{}<br><i>{}</i>",
                vocab.translation, part.text_original, part.text_translation, dialogue.scenario_title
            );
            wtr.write_record([front(&vocab.word, &vocab.pos).as_str(), back.as_str(), DIALOGUE_TAG])?;
            count += 1;
        }
    }
    wtr.flush()?;
    Ok(count)
}

pub fn export_vocabulary_cards(items: &[VocabularyPracticeItem], output_file: impl AsRef<Path>) -> Result<usize> {
    let path = output_file.as_ref();
    let file = create_output(path)?;
    let count = write_vocabulary_cards(items, file)?;
    tracing::info!(path = %path.display(), count, "vocabulary cards exported");
    Ok(count)
}

pub fn export_dialogue_cards(dialogue: &DialogueResponse, output_file: impl AsRef<Path>) -> Result<usize> {
    let path = output_file.as_ref();
    let file = create_output(path)?;
    let count = write_dialogue_cards(dialogue, file)?;
    tracing::info!(path = %path.display(), count, "dialogue cards exported");
    Ok(count)
}

fn create_output(path: &Path) -> Result<File> {
    // 确保目录存在
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("无法创建目录 {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("无法创建输出文件 {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;

    #[test]
    fn test_vocabulary_cards_are_tab_separated() {
        let mut buf = Vec::new();
        let count = write_vocabulary_cards(&practice_list(), &mut buf).unwrap();
        assert_eq!(count, 8);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields.len(), 3);
        assert!(fields[0].contains("negotiate"));
        assert!(fields[1].contains("Example with negotiate"));
        assert_eq!(fields[2], VOCABULARY_TAG);
    }

    #[test]
    fn test_dialogue_cards_cover_every_turn() {
        let mut buf = Vec::new();
        let count = write_dialogue_cards(&dialogue(5), &mut buf).unwrap();
        assert_eq!(count, 10);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(buf.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 10);
        assert!(records[0][1].contains("Frase número 1"));
        assert!(records[9][1].contains("Frase número 5"));
        assert_eq!(&records[3][2], DIALOGUE_TAG);
    }

    #[test]
    fn test_fields_with_quotes_are_escaped() {
        let mut item = practice_item("say");
        item.example_sentence = "He said \"no way\"\tthen left".to_string();
        let mut buf = Vec::new();
        write_vocabulary_cards(&[item], &mut buf).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(buf.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), 3);
        assert!(record[1].contains("He said \"no way\"\tthen left"));
    }

    #[test]
    fn test_export_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decks").join("vocab.txt");
        let count = export_vocabulary_cards(&practice_list(), &path).unwrap();
        assert_eq!(count, 8);
        assert!(std::fs::read_to_string(&path).unwrap().contains(VOCABULARY_TAG));
    }
}
