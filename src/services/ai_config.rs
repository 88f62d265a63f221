//! AI 配置服务
//! 从进程环境（以及可选的 .env 文件）读取 provider 凭据与服务配置
use std::collections::HashMap;
use std::env::VarError;
use std::net::SocketAddr;

use crate::error::{AppError, AppResult, ResultExt};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const ADDR_VAR: &str = "NOTE2ACTION_ADDR";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

const CONFIG_VARS: [&str; 4] = [API_KEY_VAR, BASE_URL_VAR, MODEL_VAR, ADDR_VAR];

/// 加载 .env 到进程环境；文件不存在不算错误
///
/// 需要在初始化 tracing 之前调用，这样 .env 里的 RUST_LOG 才会生效。
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Provider 配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// 为 None 时转换请求一律返回配置错误
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn api_key_len(&self) -> usize {
        self.api_key.as_deref().map(str::len).unwrap_or(0)
    }
}

/// 服务配置数据结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// 从进程环境构建配置，只读取本服务关心的变量
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let mut vars = HashMap::new();
        for key in CONFIG_VARS {
            match lookup(key) {
                Ok(value) => {
                    vars.insert(key.to_string(), value);
                }
                Err(VarError::NotPresent) => {}
                Err(err) => return Err(AppError::Config(format!("invalid {key}: {err}"))),
            }
        }
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> AppResult<Self> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let addr_raw = lookup(ADDR_VAR).unwrap_or(DEFAULT_ADDR);
        let addr: SocketAddr = addr_raw
            .parse()
            .config_err(&format!("invalid {ADDR_VAR} '{addr_raw}'"))?;

        let provider = ProviderConfig {
            api_key: lookup(API_KEY_VAR).map(str::to_string),
            base_url: build_base_url(lookup(BASE_URL_VAR)),
            model: lookup(MODEL_VAR).unwrap_or(DEFAULT_MODEL).to_string(),
        };

        Ok(Self { addr, provider })
    }
}

fn build_base_url(base_url: Option<&str>) -> String {
    let base = base_url
        .unwrap_or(DEFAULT_GEMINI_BASE_URL)
        .trim()
        .trim_end_matches('/');
    if base.is_empty() {
        DEFAULT_GEMINI_BASE_URL.to_string()
    } else {
        base.to_string()
    }
}
