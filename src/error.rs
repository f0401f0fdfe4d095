use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ファイルを受け付けられません: {0}")]
    InvalidFile(String),

    #[error("解析失敗: {0}")]
    Analysis(String),

    #[error("HTTPクライアントの初期化に失敗: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FreshScanError>;
