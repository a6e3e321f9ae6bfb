//! Generation Gateway
//!
//! 将"生成情境对话 / 自由对话回复 / 单字列表"三个请求转换为对外部生成模型的调用，
//! 并把返回文本严格解析、校验为领域对象。任何失败都归并为 `GatewayError::Generation`，
//! 凭证缺失则为 `GatewayError::Configuration`。网关内部不做重试。

use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::api::{GeminiClient, GenerationRequest, GenerativeModel};
use crate::config::ApiConfig;
use crate::error::GatewayError;
use crate::models::*;
use crate::prompts::{self, Prompt};
use crate::schema;

/// 创建外部客户端的工厂，只会在首次成功初始化前被调用
pub type ClientFactory =
    Box<dyn Fn() -> Result<Arc<dyn GenerativeModel>, GatewayError> + Send + Sync>;

pub struct GenerationGateway {
    client: OnceCell<Arc<dyn GenerativeModel>>,
    factory: ClientFactory,
}

impl GenerationGateway {
    /// 使用 Gemini 客户端，凭证在第一次调用时从环境变量读取
    pub fn new(config: &ApiConfig) -> Self {
        let config = config.clone();
        GenerationGateway::with_factory(move || {
            let client = GeminiClient::from_env(&config)?;
            info!(model = client.model(), "Gemini client initialized");
            Ok(Arc::new(client) as Arc<dyn GenerativeModel>)
        })
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn GenerativeModel>, GatewayError> + Send + Sync + 'static,
    {
        GenerationGateway {
            client: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    // 首次使用时初始化；失败不缓存，并发的首次调用只会构造一个客户端
    async fn client(&self) -> Result<Arc<dyn GenerativeModel>, GatewayError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                (self.factory)().inspect_err(|e| error!("client initialization failed: {}", e))
            })
            .await?;
        Ok(Arc::clone(client))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        prompt: Prompt,
        response_schema: Value,
        temperature: f32,
    ) -> Result<T, GatewayError> {
        let client = self.client().await?;

        let request = GenerationRequest {
            system_instruction: prompt.system_instruction,
            user_text: prompt.user_text,
            response_schema,
            temperature,
        };

        info!(operation, temperature, "issuing generation request");
        let raw = client.generate(request).await.map_err(|e| {
            error!(operation, "generation request failed: {:#}", e);
            GatewayError::Generation(format!("{}: {:#}", operation, e))
        })?;

        parse_payload(operation, &raw)
    }

    /// 生成情境对话，难度在 B2/C1 中随机抽取
    pub async fn generate_dialogue(
        &self,
        scenario: Scenario,
        language: Language,
    ) -> Result<DialogueResponse, GatewayError> {
        let difficulty = random_difficulty();
        let prompt = prompts::dialogue_prompt(scenario, language, difficulty);

        let dialogue: DialogueResponse = self
            .request(
                "dialogue",
                prompt,
                schema::dialogue_schema(),
                prompts::DIALOGUE_TEMPERATURE,
            )
            .await?;
        check("dialogue", &dialogue)?;

        info!(
            %scenario,
            %language,
            requested = %difficulty,
            returned = %dialogue.difficulty_level,
            turns = dialogue.conversation.len(),
            "dialogue generated"
        );
        Ok(dialogue)
    }

    /// 生成自由对话的一次回复；历史记录只读，不会被保留
    pub async fn generate_freestyle_reply(
        &self,
        history: &[FreestyleHistoryItem],
        user_input: &str,
        language: Language,
    ) -> Result<ConversationPart, GatewayError> {
        // 先初始化客户端，凭证缺失时始终返回配置错误
        self.client().await?;
        if user_input.trim().is_empty() {
            return Err(GatewayError::Generation(
                "freestyle: user input is empty".to_string(),
            ));
        }

        let prompt = prompts::freestyle_prompt(history, user_input, language);
        let part: ConversationPart = self
            .request(
                "freestyle",
                prompt,
                schema::conversation_part_schema(),
                prompts::FREESTYLE_TEMPERATURE,
            )
            .await?;
        check("freestyle", &part)?;

        info!(%language, history = history.len(), "freestyle reply generated");
        Ok(part)
    }

    /// 生成 8 个单字练习项目
    pub async fn generate_vocabulary_list(
        &self,
        language: Language,
    ) -> Result<Vec<VocabularyPracticeItem>, GatewayError> {
        let prompt = prompts::vocabulary_prompt(language);
        let items: Vec<VocabularyPracticeItem> = self
            .request(
                "vocabulary",
                prompt,
                schema::vocabulary_list_schema(),
                prompts::VOCABULARY_TEMPERATURE,
            )
            .await?;
        check("vocabulary", items.as_slice())?;

        info!(%language, count = items.len(), "vocabulary list generated");
        Ok(items)
    }
}

fn random_difficulty() -> DifficultyLevel {
    if rand::rng().random_bool(0.5) {
        DifficultyLevel::B2
    } else {
        DifficultyLevel::C1
    }
}

fn parse_payload<T: DeserializeOwned>(operation: &str, raw: &str) -> Result<T, GatewayError> {
    serde_json::from_str(raw.trim()).map_err(|e| {
        warn!(operation, bytes = raw.len(), "model output is not valid JSON for the schema: {}", e);
        GatewayError::Generation(format!("{}: malformed model output: {}", operation, e))
    })
}

fn check<V: Validate + ?Sized>(operation: &str, value: &V) -> Result<(), GatewayError> {
    value.validate().map_err(|e| {
        warn!(operation, "model output rejected: {}", e);
        GatewayError::Generation(format!("{}: {}", operation, e))
    })
}
