//! 解析APIとのHTTP通信
//!
//! `POST {base}/analyze` に画像を1件multipartで送り、レスポンスを
//! AnalyzeOutcomeに変換する。タイマー・外部キャンセルと競争させ、
//! 負けた側はdropで片付ける（リクエストは中断、タイマーは破棄）。

use crate::file::SelectedFile;
use freshscan_common::{parse_analysis_response, AnalyzeOutcome, INVALID_RESPONSE};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const TIMEOUT_MESSAGE: &str = "Request timed out";
pub const ABORTED_MESSAGE: &str = "Request aborted";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

/// `{base}/analyze`（末尾のスラッシュは除去）
pub fn analyze_url(base: &str) -> String {
    format!("{}/analyze", base.trim_end_matches('/'))
}

pub(super) async fn post_analyze(
    http: &reqwest::Client,
    base: &str,
    file: &SelectedFile,
    timeout: Duration,
    cancel: &CancellationToken,
) -> AnalyzeOutcome {
    let url = analyze_url(base);
    debug!("解析リクエスト送信: {} ({}, {} bytes)", url, file.name(), file.size());

    tokio::select! {
        outcome = send(http, &url, file) => outcome,
        _ = tokio::time::sleep(timeout) => {
            warn!("解析リクエストがタイムアウト: {:?}", timeout);
            AnalyzeOutcome::failure(TIMEOUT_MESSAGE)
        }
        _ = cancel.cancelled() => {
            debug!("解析リクエストを中断");
            AnalyzeOutcome::failure(ABORTED_MESSAGE)
        }
    }
}

async fn send(http: &reqwest::Client, url: &str, file: &SelectedFile) -> AnalyzeOutcome {
    let form = match build_form(file) {
        Ok(form) => form,
        Err(e) => return transport_failure(&e),
    };

    let response = match http.post(url).multipart(form).send().await {
        Ok(response) => response,
        Err(e) => return transport_failure(&e),
    };

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let error = if text.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            text
        };
        warn!("解析APIがエラーを返却: {}", status);
        return AnalyzeOutcome::Failure {
            error,
            status: Some(status.as_u16()),
        };
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("レスポンス本文の読み込みに失敗: {}", e);
            return AnalyzeOutcome::failure(INVALID_RESPONSE);
        }
    };

    match parse_analysis_response(&body) {
        Ok(result) => {
            debug!("解析結果: {} ({:.2})", result.quality, result.confidence);
            AnalyzeOutcome::Success(result)
        }
        Err(e) => {
            warn!("レスポンスのパースに失敗: {}", e);
            AnalyzeOutcome::failure(INVALID_RESPONSE)
        }
    }
}

fn build_form(file: &SelectedFile) -> reqwest::Result<Form> {
    let part = Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());
    let part = if file.mime_type().is_empty() {
        part
    } else {
        part.mime_str(file.mime_type())?
    };
    Ok(Form::new().part("file", part))
}

fn transport_failure(e: &reqwest::Error) -> AnalyzeOutcome {
    warn!("解析リクエスト失敗: {}", e);
    let text = e.to_string();
    if text.is_empty() {
        AnalyzeOutcome::failure(NETWORK_ERROR_MESSAGE)
    } else {
        AnalyzeOutcome::failure(text)
    }
}
