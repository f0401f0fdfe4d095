//! FreshScan Common Library
//!
//! クライアント・セッション・CLIで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod parser;
pub mod mock;

pub use types::{AnalysisResult, AnalyzeOutcome, Indicator, Quality};
pub use error::{Error, Result};
pub use parser::{
    coerce_result, parse_analysis_response, parse_assessment,
    INVALID_ASSESSMENT_JSON, INVALID_RESPONSE, MISSING_QUALITY,
};
pub use mock::{mock_assessment, MOCK_DELAY_MS};
