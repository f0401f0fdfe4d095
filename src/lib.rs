//! FreshScan
//!
//! 食品画像を解析APIへ送り、鮮度判定（Fresh/Stale/Spoiled）・信頼度・計測値を
//! 受け取るクライアントと、その状態を保持する解析セッション。
//! ベースURLが未設定ならファイルサイズから決まるモック結果を返す。

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod preview;
pub mod session;

pub use client::{save_assessment, AnalysisClient, AnalyzeOptions};
pub use config::Config;
pub use error::{FreshScanError, Result};
pub use file::SelectedFile;
pub use freshscan_common::{AnalysisResult, AnalyzeOutcome, Indicator, Quality};
pub use preview::{MemoryPreviewStore, PreviewHandle, PreviewStore};
pub use session::{AnalyzerSession, SessionState};
