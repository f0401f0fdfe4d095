//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use freshscan::error::FreshScanError;
use freshscan::SelectedFile;
use std::path::Path;

/// 存在しないファイルを読み込んだ場合
#[tokio::test]
async fn test_missing_file() {
    let result = SelectedFile::from_path(Path::new("/nonexistent/path/12345.jpg")).await;
    assert!(matches!(result, Err(FreshScanError::FileNotFound(_))));
}

/// FreshScanErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        FreshScanError::Config("テスト設定エラー".to_string()),
        FreshScanError::FileNotFound("test.jpg".to_string()),
        FreshScanError::InvalidFile("Unsupported file format".to_string()),
        FreshScanError::Analysis("HTTP 500".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 解析失敗のメッセージはそのまま含まれる
#[test]
fn test_analysis_error_message() {
    let err = FreshScanError::Analysis("Request timed out".to_string());
    assert!(format!("{}", err).contains("Request timed out"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: FreshScanError = io_err.into();

    assert!(matches!(err, FreshScanError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: FreshScanError = json_err.into();

    assert!(matches!(err, FreshScanError::JsonParse(_)));
}

