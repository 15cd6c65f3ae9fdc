//! # 终端宿主
//!
//! 分支叙事播放引擎的参考宿主：从文件系统获取章节文档，
//! 在终端里完成文本揭示、切换提示与选项交互，存档落在本地目录。

mod app;
mod chapter_store;
mod persistence;
mod status;

use std::path::PathBuf;

use clap::Parser;

use app::{App, AppConfig};

/// 分支叙事播放引擎的终端宿主
#[derive(Parser, Debug)]
#[command(name = "host-cli", version, about)]
struct Args {
    /// 章节文档目录（`<目录>/<章节ID>.json`）
    #[arg(long, default_value = "chapters")]
    chapters_dir: PathBuf,

    /// 存档目录
    #[arg(long, default_value = "saves")]
    saves_dir: PathBuf,

    /// 资源根目录（路径约定前缀）
    #[arg(long, default_value = "assets")]
    assets_root: String,

    /// 启动章节
    #[arg(long, default_value = "chapter1")]
    chapter: String,

    /// 启动场景（默认用章节的起始场景）
    #[arg(long)]
    scene: Option<String>,

    /// 文本揭示速率（字符/秒）
    #[arg(long, default_value_t = 45.0)]
    rate: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut app = App::new(AppConfig {
        chapters_dir: args.chapters_dir,
        saves_dir: args.saves_dir,
        asset_root: args.assets_root,
        start_chapter: args.chapter,
        start_scene: args.scene,
        chars_per_sec: args.rate,
    });

    app.run()
}
