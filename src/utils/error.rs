use axum::http::StatusCode;
use thiserror::Error;

/// 上游查詢（geo / address provider）的失敗類型
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("{message}")]
    Provider { message: String },
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Decode(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum CardError {
    #[error("IP-API lookup failed: {0}")]
    UpstreamGeo(#[source] LookupError),

    #[error("address lookup failed: {0}")]
    UpstreamAddress(#[source] LookupError),

    #[error("font load failed: {message}")]
    FontLoad { message: String },

    #[error("image generation failed")]
    Encode(#[from] image::ImageError),

    #[error("{message}")]
    BadRequest { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Rendering,
    Client,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 命令列程式的結束碼，隨嚴重程度遞增
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 3,
            ErrorSeverity::Critical => 4,
        }
    }
}

impl CardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CardError::UpstreamGeo(_) | CardError::UpstreamAddress(_) => ErrorCategory::Upstream,
            CardError::FontLoad { .. } | CardError::Encode(_) => ErrorCategory::Rendering,
            CardError::BadRequest { .. } => ErrorCategory::Client,
            CardError::Config { .. }
            | CardError::MissingConfig { .. }
            | CardError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            CardError::Io(_) | CardError::Join(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Low,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 只有缺少必要參數屬於客戶端錯誤，其餘一律 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            CardError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CardError::UpstreamGeo(_) => "無法取得 IP 地理資訊，請稍後再試".to_string(),
            CardError::UpstreamAddress(_) => "無法取得地址定位資訊，請稍後再試".to_string(),
            CardError::FontLoad { .. } => "字體載入失敗，無法產生圖片".to_string(),
            CardError::Encode(_) | CardError::Join(_) => "圖片產生失敗".to_string(),
            CardError::BadRequest { message } => message.clone(),
            CardError::MissingConfig { field } => format!("缺少必要設定: {}", field),
            CardError::InvalidConfigValue { field, reason, .. } => {
                format!("設定值 {} 無效: {}", field, reason)
            }
            CardError::Config { message } => format!("設定錯誤: {}", message),
            CardError::Io(e) => format!("檔案存取失敗: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CardError::UpstreamGeo(LookupError::Provider { .. }) => {
                "Check that the queried value is a public IP address"
            }
            CardError::UpstreamGeo(_) | CardError::UpstreamAddress(LookupError::Network(_)) => {
                "Check network connectivity to the geo providers or raise --timeout-secs"
            }
            CardError::UpstreamAddress(_) => {
                "Verify the address provider API key (BAIDU_API_KEY) and its quota"
            }
            CardError::FontLoad { .. } => "Make sure the font file exists at --font-path",
            CardError::Encode(_) | CardError::Join(_) => "Retry the request",
            CardError::BadRequest { .. } => "Provide the IP address via ?ip=",
            CardError::MissingConfig { .. } => {
                "Set the missing value via command line flag or environment variable"
            }
            CardError::InvalidConfigValue { .. } | CardError::Config { .. } => {
                "Fix the configuration value and restart"
            }
            CardError::Io(_) => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
