//! 解析結果の型定義
//!
//! クライアントとセッションで共有される型:
//! - Quality: 鮮度判定
//! - Indicator: 判定に付随する計測値
//! - AnalysisResult: 解析APIまたは保存済みファイルの結果
//! - AnalyzeOutcome: 成功/失敗の判別共用体

use serde::{Deserialize, Serialize};
use std::fmt;

/// 鮮度判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Fresh,
    Stale,
    Spoiled,
}

impl Quality {
    /// モック生成で使う固定順
    pub const ALL: [Quality; 3] = [Quality::Fresh, Quality::Stale, Quality::Spoiled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Fresh => "Fresh",
            Quality::Stale => "Stale",
            Quality::Spoiled => "Spoiled",
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fresh" => Ok(Quality::Fresh),
            "Stale" => Ok(Quality::Stale),
            "Spoiled" => Ok(Quality::Spoiled),
            _ => Err(format!("Unknown quality: {}. Use Fresh, Stale, or Spoiled", s)),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 計測値（名前・値・単位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,

    pub value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Indicator {
    pub fn new(name: impl Into<String>, value: f64, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.map(str::to_string),
        }
    }
}

/// 解析結果
///
/// 構築後は変更しない。新しい解析のたびに丸ごと置き換える。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub quality: Quality,

    /// 0.0〜1.0
    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub indicators: Vec<Indicator>,
}

/// 解析の成否
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    Success(AnalysisResult),
    Failure {
        error: String,
        status: Option<u16>,
    },
}

impl AnalyzeOutcome {
    /// ステータスコードなしの失敗
    pub fn failure(error: impl Into<String>) -> Self {
        AnalyzeOutcome::Failure {
            error: error.into(),
            status: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalyzeOutcome::Success(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalyzeOutcome::Success(result) => Some(result),
            AnalyzeOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalyzeOutcome::Success(_) => None,
            AnalyzeOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AnalyzeOutcome::Success(_) => None,
            AnalyzeOutcome::Failure { status, .. } => *status,
        }
    }
}
