use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use linguaflow::export::{export_dialogue_cards, export_vocabulary_cards};
use linguaflow::{
    Config, ConversationPart, DialogueResponse, FreestyleHistoryItem, GatewayError,
    GenerationGateway, Language, Scenario, VocabularyPracticeItem,
};

const AI_ERROR: &str = "AI 模型生成失敗，請稍後再試。";

#[derive(Parser)]
#[command(name = "linguaflow", version, about = "沈浸式語言學習：情境對話、自由對話、單字練習")]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true, default_value = linguaflow::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 生成情境对话
    Dialogue {
        #[arg(long)]
        scenario: Scenario,
        #[arg(long, default_value = "en")]
        lang: Language,
        /// 导出重点单字为 Anki 卡片
        #[arg(long)]
        export: bool,
    },
    /// 自由对话（从标准输入逐行读取）
    Chat {
        #[arg(long, default_value = "en")]
        lang: Language,
    },
    /// 生成单字练习列表
    Vocab {
        #[arg(long, default_value = "en")]
        lang: Language,
        #[arg(long)]
        export: bool,
    },
    /// 列出所有情境
    Scenarios,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;
    let gateway = GenerationGateway::new(&config.api);

    match cli.command {
        Command::Dialogue {
            scenario,
            lang,
            export,
        } => {
            println!("🔄 正在生成情境，請稍候...");
            let dialogue = match gateway.generate_dialogue(scenario, lang).await {
                Ok(dialogue) => dialogue,
                Err(e) => return report_failure(e),
            };
            print_dialogue(&dialogue);
            if export {
                let count = export_dialogue_cards(&dialogue, &config.output.dialogue_file)?;
                println!("✅ 已匯出 {} 張卡片：{}", count, config.output.dialogue_file);
            }
        }
        Command::Chat { lang } => run_chat(&gateway, lang).await?,
        Command::Vocab { lang, export } => {
            println!("🔄 正在生成單字列表...");
            let items = match gateway.generate_vocabulary_list(lang).await {
                Ok(items) => items,
                Err(e) => return report_failure(e),
            };
            print_vocabulary(&items);
            if export {
                let count = export_vocabulary_cards(&items, &config.output.vocabulary_file)?;
                println!("✅ 已匯出 {} 張卡片：{}", count, config.output.vocabulary_file);
            }
        }
        Command::Scenarios => {
            for scenario in Scenario::ALL {
                println!("{}", scenario);
            }
        }
    }

    Ok(())
}

// 配置错误直接退出，生成错误提示用户重试
fn report_failure(err: GatewayError) -> Result<()> {
    match err {
        GatewayError::Configuration(_) => {
            eprintln!("⚠️  {}", err);
            std::process::exit(2);
        }
        GatewayError::Generation(_) => {
            eprintln!("❌ {}", AI_ERROR);
            std::process::exit(1);
        }
    }
}

async fn run_chat(gateway: &GenerationGateway, lang: Language) -> Result<()> {
    println!("💬 自由對話（{}）。輸入任何你想說的話，Ctrl+D 結束。", lang.display_name());

    // 历史记录由这里持有，只有成功回复后才追加
    let mut history: Vec<FreestyleHistoryItem> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match gateway.generate_freestyle_reply(&history, input, lang).await {
            Ok(part) => {
                print_part(&part);
                history.push(FreestyleHistoryItem::User {
                    text: input.to_string(),
                });
                history.push(FreestyleHistoryItem::Ai { part });
            }
            Err(e @ GatewayError::Configuration(_)) => return report_failure(e),
            Err(GatewayError::Generation(_)) => {
                println!("❌ {} 可重新輸入同一句話。", AI_ERROR);
            }
        }
    }

    println!("👋 共 {} 回合", history.len() / 2);
    Ok(())
}

fn print_part(part: &ConversationPart) {
    println!("\n🗣️  {} [{}]", part.speaker, part.audio_lang_code);
    println!("   {}", part.text_original);
    println!("   中文翻譯：{}", part.text_translation);
    println!(
        "   文法解析：{} ─ {}",
        part.grammar_analysis.point, part.grammar_analysis.explanation
    );
    for vocab in &part.vocabulary {
        println!("   📌 {} ({})：{}", vocab.word, vocab.pos, vocab.translation);
    }
}

fn print_dialogue(dialogue: &DialogueResponse) {
    println!("\n🎬 {} [{}]", dialogue.scenario_title, dialogue.difficulty_level);
    println!("{}", dialogue.context_description);
    for part in &dialogue.conversation {
        print_part(part);
    }
    println!("\n🌏 文化小提示：{}", dialogue.cultural_note);
}

fn print_vocabulary(items: &[VocabularyPracticeItem]) {
    for (i, item) in items.iter().enumerate() {
        println!("\n{}. {} ({})：{}", i + 1, item.word, item.pos, item.translation);
        println!("   {}", item.description);
        println!("   例句：{}", item.example_sentence);
        println!("         {}", item.example_sentence_translation);
    }
}
