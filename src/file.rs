//! 選択ファイル
//!
//! アップロード対象の画像や評価JSONを、名前・MIMEタイプ・中身の組で保持する。

use crate::error::{FreshScanError, Result};
use std::path::Path;
use std::sync::Arc;

/// 拡張子 → MIMEタイプ
const MIME_BY_EXTENSION: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("json", "application/json"),
];

#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    data: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: Arc::from(data.into()),
        }
    }

    /// ディスク上のファイルを読み込む（MIMEタイプは拡張子から推定）
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FreshScanError::FileNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = mime_from_path(path).unwrap_or("application/octet-stream");

        Ok(Self::new(name, mime_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// 拡張子からMIMEタイプを推定
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    MIME_BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}
