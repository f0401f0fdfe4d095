//! 解析クライアント
//!
//! ベースURLが設定されていれば解析APIへ送信し、未設定ならモック結果を返す。
//! 失敗はすべて `AnalyzeOutcome::Failure` として返し、リトライはしない。

mod http;

pub use http::{analyze_url, ABORTED_MESSAGE, NETWORK_ERROR_MESSAGE, TIMEOUT_MESSAGE};

use crate::config::{Config, DEFAULT_TIMEOUT_MS};
use crate::error::Result;
use crate::file::SelectedFile;
use freshscan_common::{
    mock_assessment, parse_assessment, AnalysisResult, AnalyzeOutcome, Error as CommonError,
    INVALID_ASSESSMENT_JSON, MISSING_QUALITY, MOCK_DELAY_MS,
};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 1回の解析のオプション
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// 外部からの中断
    pub cancel: Option<CancellationToken>,
    /// タイムアウト（省略時はクライアントの既定値）
    pub timeout: Option<Duration>,
}

impl AnalyzeOptions {
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    base: Option<String>,
    default_timeout: Duration,
    http: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base(config.api_base(), Duration::from_millis(config.timeout_ms))
    }

    /// ベースURLを直接指定（`None`・空文字ならモックモード）
    pub fn with_base(base: Option<String>, default_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let base = base.filter(|b| !b.trim().is_empty()).map(|b| b.trim().to_string());

        Ok(Self {
            base,
            default_timeout,
            http,
        })
    }

    /// モックモードのクライアント
    pub fn offline() -> Result<Self> {
        Self::with_base(None, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// ベースURLが未設定ならtrue
    pub fn is_mock_offline(&self) -> bool {
        self.base.is_none()
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// 画像を解析
    pub async fn analyze(&self, file: &SelectedFile, options: AnalyzeOptions) -> AnalyzeOutcome {
        let cancel = options.cancel.unwrap_or_default();
        let timeout = options.timeout.unwrap_or(self.default_timeout);

        match &self.base {
            Some(base) => http::post_analyze(&self.http, base, file, timeout, &cancel).await,
            None => mock_analyze(file, &cancel).await,
        }
    }

    /// 保存済みの評価ファイル（JSON）を読み込む
    pub async fn load_assessment_from_file(&self, file: &SelectedFile) -> AnalyzeOutcome {
        match parse_assessment(file.bytes()) {
            Ok(result) => AnalyzeOutcome::Success(result),
            Err(CommonError::MissingQuality) => {
                warn!("評価ファイルにqualityがありません: {}", file.name());
                AnalyzeOutcome::failure(MISSING_QUALITY)
            }
            Err(e) => {
                warn!("評価ファイルのパースに失敗: {} ({})", file.name(), e);
                AnalyzeOutcome::failure(INVALID_ASSESSMENT_JSON)
            }
        }
    }

    /// パス指定で評価ファイルを読み込む
    pub async fn load_assessment_from_path(&self, path: &Path) -> AnalyzeOutcome {
        match SelectedFile::from_path(path).await {
            Ok(file) => self.load_assessment_from_file(&file).await,
            Err(e) => AnalyzeOutcome::failure(e.to_string()),
        }
    }
}

/// 解析結果をJSONで保存（`load_assessment_from_path` で読み戻せる）
pub async fn save_assessment(path: &Path, result: &AnalysisResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn mock_analyze(file: &SelectedFile, cancel: &CancellationToken) -> AnalyzeOutcome {
    debug!("モック解析: {} ({} bytes)", file.name(), file.size());

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(MOCK_DELAY_MS)) => {
            AnalyzeOutcome::Success(mock_assessment(file.size()))
        }
        _ = cancel.cancelled() => AnalyzeOutcome::failure(ABORTED_MESSAGE),
    }
}
