use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "freshscan")]
#[command(about = "食品画像の鮮度解析クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を解析して結果を表示
    Analyze {
        /// 画像ファイル（JPEG/PNG/WEBP/HEIC/HEIF、15MBまで）
        #[arg(required = true)]
        image: PathBuf,

        /// 結果を保存するJSONファイル
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// リクエストタイムアウト（ミリ秒、省略時は設定値）
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// 保存済みの評価JSONを読み込んで表示
    Load {
        /// 評価JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 解析APIのベースURLを設定
        #[arg(long)]
        set_api_base: Option<String>,

        /// ベースURLを削除（モックモードに戻す）
        #[arg(long, conflicts_with = "set_api_base")]
        clear_api_base: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
