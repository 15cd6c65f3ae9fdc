//! # Chapter Store 模块
//!
//! 按章节 ID 获取并解析章节文档。
//!
//! ## 设计原则
//!
//! - 来源抽象为 [`ChapterSource`]，宿主可替换为 ZIP 包、HTTP 等实现
//! - 位置约定：`<chapters_dir>/<章节 ID>.json`
//! - 失败直接以 [`LoadError`] 上报引擎，**不自动重试**；
//!   重复加载同一 ID 允许重新获取（引擎持有当前唯一的已加载章节）

use std::io::ErrorKind;
use std::path::PathBuf;

use vn_playback::{Chapter, LoadError};

/// 章节来源 trait
///
/// 只负责按 ID 取回章节文档的字节内容，不负责解析。
pub trait ChapterSource {
    /// 获取章节文档内容
    fn fetch(&self, chapter_id: &str) -> Result<Vec<u8>, LoadError>;

    /// 章节 ID 按约定解析到的位置（用于日志/错误信息）
    fn location(&self, chapter_id: &str) -> String;
}

/// 文件系统章节来源
///
/// 从 `<base_dir>/<章节 ID>.json` 读取。
#[derive(Debug, Clone)]
pub struct FsChapterSource {
    /// 章节目录
    base_dir: PathBuf,
}

impl FsChapterSource {
    /// 创建文件系统章节来源
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, chapter_id: &str) -> PathBuf {
        self.base_dir.join(format!("{chapter_id}.json"))
    }
}

impl ChapterSource for FsChapterSource {
    fn fetch(&self, chapter_id: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(chapter_id);
        std::fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                LoadError::NotFound {
                    chapter_id: chapter_id.to_string(),
                    location: self.location(chapter_id),
                }
            } else {
                LoadError::Unreachable {
                    chapter_id: chapter_id.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn location(&self, chapter_id: &str) -> String {
        self.resolve(chapter_id).to_string_lossy().to_string()
    }
}

/// 章节存取器
///
/// 获取 + 解析。解析后的 [`Chapter`] 交给引擎持有，
/// 这里不保留副本。
pub struct ChapterStore {
    source: Box<dyn ChapterSource>,
}

impl ChapterStore {
    /// 创建章节存取器
    pub fn new(source: impl ChapterSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// 加载章节
    pub fn load(&self, chapter_id: &str) -> Result<Chapter, LoadError> {
        tracing::debug!(
            chapter_id,
            location = %self.source.location(chapter_id),
            "获取章节文档"
        );
        let bytes = self.source.fetch(chapter_id)?;
        Chapter::from_json(chapter_id, &bytes)
    }
}
