//! プレビューハンドル
//!
//! 選択ファイルのローカル表示用URLを発行・失効させる。
//! `PreviewHandle`をdropするとURLは一度だけ失効する。

use crate::file::SelectedFile;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub trait PreviewStore: Send + Sync {
    /// プレビューURLを発行
    fn create(&self, file: &SelectedFile) -> String;

    /// プレビューURLを失効
    fn revoke(&self, url: &str);
}

/// 発行済みプレビューURLの所有者
pub struct PreviewHandle {
    url: String,
    store: Arc<dyn PreviewStore>,
}

impl PreviewHandle {
    pub fn create(store: Arc<dyn PreviewStore>, file: &SelectedFile) -> Self {
        let url = store.create(file);
        Self { url, store }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

/// メモリ上に中身を保持するプレビューストア
///
/// `blob:freshscan/<n>` 形式のURLを発行する
#[derive(Default)]
pub struct MemoryPreviewStore {
    next_id: AtomicU64,
    entries: Mutex<HashMap<String, SelectedFile>>,
    revoked: AtomicU64,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLに対応するファイル
    pub fn get(&self, url: &str) -> Option<SelectedFile> {
        self.lock().get(url).cloned()
    }

    /// 有効なURLの数
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// 失効させたURLの累計
    pub fn revoked_count(&self) -> u64 {
        self.revoked.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SelectedFile>> {
        // 毒化していても中身はそのまま使う
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&self, file: &SelectedFile) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let url = format!("blob:freshscan/{}", id);
        self.lock().insert(url.clone(), file.clone());
        url
    }

    fn revoke(&self, url: &str) {
        if self.lock().remove(url).is_some() {
            self.revoked.fetch_add(1, Ordering::SeqCst);
        } else {
            tracing::warn!("未発行または失効済みのプレビューURL: {}", url);
        }
    }
}
