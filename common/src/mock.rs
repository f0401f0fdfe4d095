//! オフライン用モック解析
//!
//! バックエンド無しで開発するための決定的な結果を生成する。
//! 結果はファイルサイズだけで決まる。

use crate::types::{AnalysisResult, Indicator, Quality};

/// モック解析の擬似待ち時間（ミリ秒）
pub const MOCK_DELAY_MS: u64 = 650;

/// ファイルサイズからモック結果を生成
///
/// # Examples
/// ```
/// use freshscan_common::{mock_assessment, Quality};
///
/// let result = mock_assessment(1000);
/// assert_eq!(result.quality, Quality::Stale);
/// assert_eq!(result.confidence, 0.5);
/// ```
pub fn mock_assessment(size: u64) -> AnalysisResult {
    let quality = Quality::ALL[(size % 3) as usize];
    let confidence = (0.5 + ((size % 1000) as f64 / 1000.0) * 0.45).min(0.95);

    let indicators = vec![
        Indicator::new("Color Index", (size % 255) as f64, Some("CI")),
        Indicator::new("Surface Moisture", ((size % 100) as f64 / 1.2).round(), Some("%")),
        Indicator::new("Texture Score", ((size % 100) as f64 / 2.0).round(), Some("/100")),
    ];

    AnalysisResult {
        quality,
        confidence,
        indicators,
    }
}
