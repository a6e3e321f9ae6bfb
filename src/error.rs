use thiserror::Error;

/// 网关对外暴露的错误，只有两种
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 缺少访问凭证等部署配置问题，不会自动恢复
    #[error("configuration error: {0}")]
    Configuration(String),
    /// 生成过程中的任何失败（网络、上游错误、解析、结构不符）
    #[error("generation failed: {0}")]
    Generation(String),
}

impl GatewayError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, GatewayError::Configuration(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, GatewayError::Generation(_))
    }
}

// 结构校验失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("`{field}` has {actual} entries, expected {expected}")]
    Length {
        field: &'static str,
        expected: &'static str,
        actual: usize,
    },
    #[error("`{0}` is an elementary greeting")]
    ElementaryGreeting(String),
}

// 命令行参数中的语言、情境解析失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseSelectorError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_kinds() {
        let config = GatewayError::Configuration("GEMINI_API_KEY is not set".to_string());
        assert!(config.is_configuration());
        assert!(!config.is_generation());
        assert_eq!(
            config.to_string(),
            "configuration error: GEMINI_API_KEY is not set"
        );

        let generation = GatewayError::Generation("timeout".to_string());
        assert!(generation.is_generation());
        assert_eq!(generation.to_string(), "generation failed: timeout");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Length {
            field: "conversation",
            expected: "4..=6",
            actual: 7,
        };
        assert_eq!(err.to_string(), "`conversation` has 7 entries, expected 4..=6");
    }
}
