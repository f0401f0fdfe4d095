//! 解析セッション
//!
//! 選択ファイル・プレビュー・読み込み中フラグ・エラー・結果を保持し、
//! 変更のたびに `watch` チャネルで購読者へ通知する。
//!
//! 操作は `&mut self` を取るため、1セッションで同時に走る操作は常に1つ。
//! 操作のfutureが途中でdropされても読み込み中フラグは必ず下ろす。

use crate::client::{AnalysisClient, AnalyzeOptions};
use crate::file::SelectedFile;
use crate::preview::{MemoryPreviewStore, PreviewHandle, PreviewStore};
use freshscan_common::{AnalysisResult, AnalyzeOutcome};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// アップロード上限（MB）
pub const MAX_FILE_SIZE_MB: f64 = 15.0;

/// アップロード可能な画像形式
pub const SUPPORTED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// 評価ファイルの形式
pub const ASSESSMENT_MIME_TYPES: &[&str] = &["application/json"];

const ANALYSIS_FAILED: &str = "Analysis failed";
const INVALID_ASSESSMENT_FILE: &str = "Invalid assessment file";

/// 購読者に公開する状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub preview_url: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
    /// 表示用のヒント（実際の送信先は設定で決まる）
    pub mock_mode: bool,
}

impl SessionState {
    /// ファイル選択済みかつ読み込み中でない
    pub fn can_analyze(&self) -> bool {
        self.file_name.is_some() && !self.loading
    }
}

/// アップロード前の検証
///
/// # Returns
/// * `Ok(())` - 受け付け可能
/// * `Err(String)` - 利用者向けのエラーメッセージ
pub fn validate_file(file: &SelectedFile) -> Result<(), String> {
    if !SUPPORTED_TYPES.contains(&file.mime_type()) {
        return Err("Unsupported file format. Please upload JPEG, PNG, WEBP, or HEIC/HEIF.".into());
    }

    let size_mb = file.size() as f64 / (1024.0 * 1024.0);
    if size_mb > MAX_FILE_SIZE_MB {
        // 小数第1位で四捨五入（ちょうど半分は大きい側）
        let shown = (size_mb * 10.0).round() / 10.0;
        return Err(format!(
            "File too large ({:.1} MB). Maximum allowed is {} MB.",
            shown, MAX_FILE_SIZE_MB
        ));
    }

    Ok(())
}

pub struct AnalyzerSession {
    client: AnalysisClient,
    previews: Arc<dyn PreviewStore>,
    file: Option<SelectedFile>,
    preview: Option<PreviewHandle>,
    state: watch::Sender<SessionState>,
}

impl AnalyzerSession {
    pub fn new(client: AnalysisClient) -> Self {
        Self::with_preview_store(client, Arc::new(MemoryPreviewStore::new()))
    }

    pub fn with_preview_store(client: AnalysisClient, previews: Arc<dyn PreviewStore>) -> Self {
        let initial = SessionState {
            mock_mode: client.is_mock_offline(),
            ..Default::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            client,
            previews,
            file: None,
            preview: None,
            state,
        }
    }

    /// 状態の購読
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// 現在の状態のスナップショット
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.state.borrow().result.clone()
    }

    pub fn mock_mode(&self) -> bool {
        self.state.borrow().mock_mode
    }

    pub fn can_analyze(&self) -> bool {
        self.state.borrow().can_analyze()
    }

    /// ファイルを選択
    ///
    /// 検証に失敗した場合はエラーを設定し、以前の選択はそのまま残す。
    /// 成功時は古いプレビューを失効させてから新しいプレビューを発行する。
    pub fn set_file(&mut self, candidate: SelectedFile) -> bool {
        if let Err(message) = validate_file(&candidate) {
            debug!("ファイルを拒否: {} ({})", candidate.name(), message);
            self.state.send_modify(|s| s.error = Some(message));
            return false;
        }

        drop(self.preview.take());
        let preview = PreviewHandle::create(self.previews.clone(), &candidate);

        let file_name = candidate.name().to_string();
        let file_size = candidate.size();
        let preview_url = preview.url().to_string();
        self.state.send_modify(|s| {
            s.error = None;
            s.file_name = Some(file_name);
            s.file_size = Some(file_size);
            s.preview_url = Some(preview_url);
        });

        self.file = Some(candidate);
        self.preview = Some(preview);
        true
    }

    /// 選択中のファイルを解析（未選択なら何もしない）
    pub async fn analyze(&mut self) {
        self.analyze_with(AnalyzeOptions::default()).await
    }

    /// キャンセル・タイムアウトを指定して解析
    pub async fn analyze_with(&mut self, options: AnalyzeOptions) {
        let Some(file) = self.file.clone() else {
            return;
        };

        let _loading = LoadingGuard::start(&self.state);
        self.state.send_modify(|s| {
            s.error = None;
            s.result = None;
        });

        info!("解析開始: {}", file.name());
        let outcome = self.client.analyze(&file, options).await;
        self.apply(outcome, ANALYSIS_FAILED);
    }

    /// 評価ファイルを読み込み、結果として設定
    pub async fn load_assessment(&mut self, file: &SelectedFile) {
        let _loading = LoadingGuard::start(&self.state);
        self.state.send_modify(|s| s.error = None);

        info!("評価ファイル読み込み: {}", file.name());
        let outcome = self.client.load_assessment_from_file(file).await;
        self.apply(outcome, INVALID_ASSESSMENT_FILE);
    }

    /// ファイル・結果・エラーを消去し、プレビューを失効させる
    pub fn reset(&mut self) {
        self.file = None;
        drop(self.preview.take());
        self.state.send_modify(|s| {
            s.file_name = None;
            s.file_size = None;
            s.preview_url = None;
            s.result = None;
            s.error = None;
        });
    }

    /// モックモード表示の切り替え
    ///
    /// 表示用のヒントのみ。送信先は設定のベースURLだけで決まる。
    pub fn toggle_mock_mode(&mut self, on: bool) {
        self.state.send_modify(|s| s.mock_mode = on);
    }

    fn apply(&self, outcome: AnalyzeOutcome, fallback: &str) {
        match outcome {
            AnalyzeOutcome::Success(result) => {
                info!("結果: {} ({:.2})", result.quality, result.confidence);
                self.state.send_modify(|s| s.result = Some(result));
            }
            AnalyzeOutcome::Failure { error, status } => {
                warn!("失敗: {} (status {:?})", error, status);
                let message = if error.is_empty() {
                    fallback.to_string()
                } else {
                    error
                };
                self.state.send_modify(|s| s.error = Some(message));
            }
        }
    }
}

/// 読み込み中フラグ。dropで必ず下ろす
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_modify(|s| s.loading = true);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}
