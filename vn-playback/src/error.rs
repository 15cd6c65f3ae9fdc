//! # Error 模块
//!
//! 定义 vn-playback 中使用的错误类型。
//!
//! 传播策略（与引擎状态的关系）：
//!
//! - [`LoadError`]：章节获取/解析失败。引擎进入 `Error` 状态并显示错误指示，
//!   PlaybackPointer 保持在最后一次成功的位置
//! - [`RuntimeError`]：渲染/路由阶段的不可恢复条件（如引用了不存在的场景），
//!   作为可诊断错误返回给调用方，引擎状态不被破坏
//! - 过渡超时不在此列：由协调器内部自动恢复，永远不作为硬错误对外暴露

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 章节加载错误
///
/// 由 Chapter Store（宿主侧）产生，经 `ChapterFailed` 输入传回引擎，
/// 因此随宿主协议一起可序列化。引擎不自动重试。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadError {
    /// 章节资源不存在
    #[error("章节 '{chapter_id}' 不存在: {location}")]
    NotFound { chapter_id: String, location: String },

    /// 章节资源无法读取
    #[error("章节 '{chapter_id}' 读取失败: {message}")]
    Unreachable { chapter_id: String, message: String },

    /// 章节文档解析失败
    #[error("章节 '{chapter_id}' 解析失败: {message}")]
    ParseFailed { chapter_id: String, message: String },
}

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// 引用的场景在当前章节中不存在
    #[error("章节 '{chapter_id}' 中找不到场景 '{scene_id}'")]
    SceneNotFound {
        chapter_id: String,
        scene_id: String,
    },

    /// 无效的选择索引
    #[error("无效的选择索引 {index}，有效范围是 0..{max}")]
    InvalidChoiceIndex { index: usize, max: usize },

    /// 尚未加载任何章节
    #[error("尚未加载任何章节")]
    NoChapterLoaded,
}

/// 存档写入错误
///
/// 只作为瞬时状态文本呈现，不影响引擎状态，也不阻断交互。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// 序列化失败
    #[error("存档序列化失败: {0}")]
    Serialization(String),

    /// 持久化存储写入失败
    #[error("存档写入失败: {0}")]
    Storage(String),
}

/// 存档读取错误
///
/// 与 [`SaveError`] 相同，只作为瞬时状态文本呈现。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    /// 存档不存在
    #[error("没有找到存档")]
    NotFound,

    /// 存档损坏（无法解析，或缺少必需字段）
    #[error("存档已损坏: {0}")]
    Corrupt(String),

    /// 持久化存储读取失败
    #[error("存档读取失败: {0}")]
    Storage(String),
}
