use crate::error::{FreshScanError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 解析APIのベースURLを上書きする環境変数
pub const API_BASE_ENV: &str = "FRESHSCAN_API_BASE";

/// リクエストタイムアウトの既定値（ミリ秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 解析APIのベースURL（未設定ならモックモード）
    pub api_base: Option<String>,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FreshScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("freshscan").join("config.json"))
    }

    /// 有効なベースURL
    ///
    /// 環境変数を優先し、空文字・空白のみは未設定として扱う
    pub fn api_base(&self) -> Option<String> {
        let from_env = std::env::var(API_BASE_ENV).ok();
        Self::resolve_base(from_env.as_deref(), self.api_base.as_deref())
    }

    fn resolve_base(from_env: Option<&str>, from_file: Option<&str>) -> Option<String> {
        from_env
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| from_file.map(str::trim).filter(|s| !s.is_empty()))
            .map(str::to_string)
    }

    pub fn set_api_base(&mut self, base: Option<String>) {
        self.api_base = base.filter(|s| !s.trim().is_empty());
    }
}
