//! 解析レスポンスパーサー
//!
//! 解析APIのレスポンスや保存済みの評価ファイルをJSONとして読み込み、
//! AnalysisResultの形に寄せる（欠損値は既定値で補う）

use crate::error::{Error, Result};
use crate::types::{AnalysisResult, Indicator, Quality};
use serde_json::{Map, Value};

/// 2xxだが中身が使えないレスポンスのメッセージ
pub const INVALID_RESPONSE: &str = "Invalid JSON in response";

/// 評価ファイルがJSONとして読めない場合のメッセージ
pub const INVALID_ASSESSMENT_JSON: &str = "Invalid JSON in assessment file";

/// 評価ファイルにqualityがない場合のメッセージ
pub const MISSING_QUALITY: &str = "Assessment file is missing a valid quality";

/// 解析APIの成功レスポンス本文をパース
///
/// # Returns
/// * `Ok(AnalysisResult)` - パース成功
/// * `Err(Error::Json)` - JSONではない
/// * `Err(Error::Parse | Error::MissingQuality)` - 形が合わない
pub fn parse_analysis_response(body: &str) -> Result<AnalysisResult> {
    let value: Value = serde_json::from_str(body)?;
    coerce_result(&value)
}

/// 保存済み評価ファイルをパース
///
/// 結果オブジェクトそのものか、`{ "ok": true, "data": { ... } }` 形式の
/// 保存済みレスポンスのどちらも受け付ける
pub fn parse_assessment(bytes: &[u8]) -> Result<AnalysisResult> {
    let value: Value = serde_json::from_slice(bytes)?;

    let payload = match value.get("data") {
        Some(data) if data.is_object() && value.get("quality").is_none() => data,
        _ => &value,
    };

    coerce_result(payload)
}

/// JSON値をAnalysisResultに変換
///
/// - qualityが無い・空・未知の値 → `Error::MissingQuality`
/// - confidence欠損・非数値 → 0（数値文字列は解釈する）、0〜1に収める
/// - indicators欠損・配列以外 → 空
/// - 未知のフィールドは無視
pub fn coerce_result(value: &Value) -> Result<AnalysisResult> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::Parse("expected a JSON object".into()))?;

    let quality = obj
        .get("quality")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Quality>().ok())
        .ok_or(Error::MissingQuality)?;

    let confidence = obj
        .get("confidence")
        .map(coerce_number)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    let indicators = match obj.get("indicators") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(coerce_indicator)
            .collect(),
        _ => Vec::new(),
    };

    Ok(AnalysisResult {
        quality,
        confidence,
        indicators,
    })
}

fn coerce_indicator(obj: &Map<String, Value>) -> Indicator {
    let name = match obj.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let value = obj.get("value").map(coerce_number).unwrap_or(0.0);

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .map(str::to_string);

    Indicator { name, value, unit }
}

/// 数値に寄せる（変換できないものは0）
fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}
