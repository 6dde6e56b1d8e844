use crate::adapters::openfoodfacts::DEFAULT_CATALOG_URL;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, TrinityError};
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_CONFIG_FILE: &str = "trinity.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrinityConfig {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
    pub session: SessionConfig,
    pub backfill: BackfillConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 未設定時使用 `SessionStore::default_path()`
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    pub delay_seconds: f64,
    pub limit: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 1.0,
            limit: 0,
        }
    }
}

impl TrinityConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrinityError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，缺少的段落使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrinityError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TRINITY_API_URL})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrinityError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn backfill_delay(&self) -> Result<Duration> {
        delay_from_secs("backfill.delay_seconds", self.backfill.delay_seconds)
    }
}

/// Seconds to a `Duration`, rejecting negative, non-finite and out-of-range values.
pub fn delay_from_secs(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| TrinityError::InvalidConfigValueError {
        field: field.to_string(),
        value: secs.to_string(),
        reason: format!("Delay must be a non-negative number of seconds ({})", e),
    })
}

impl Validate for TrinityConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_url("catalog.base_url", &self.catalog.base_url)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;
        validate_range("catalog.page_size", self.catalog.page_size, 1, 100)?;
        validate_path("output.path", &self.output.path)?;
        if let Some(session_path) = &self.session.path {
            validate_path("session.path", session_path)?;
        }
        self.backfill_delay()?;
        Ok(())
    }
}

impl ConfigProvider for TrinityConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn catalog_base_url(&self) -> &str {
        &self.catalog.base_url
    }

    fn catalog_page_size(&self) -> usize {
        self.catalog.page_size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}
