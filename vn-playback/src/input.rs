//! # Input 模块
//!
//! 定义宿主向引擎传递的输入事件。
//!
//! ## 设计说明
//!
//! - 引擎不直接处理鼠标/键盘/网络事件，只处理语义化的输入
//! - 每种输入只在匹配的状态下有意义，状态不匹配时被**丢弃而非排队**
//!   （对抗快速输入造成的竞态）
//! - 揭示 tick 没有专门的输入：宿主等待 `WaitForTick` 指定的时长后
//!   调用 `tick(None)`，引擎不需要知道真实时间流逝

use serde::{Deserialize, Serialize};

use crate::chapter::Chapter;
use crate::error::LoadError;

/// 宿主向引擎传递的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackInput {
    /// 用户跳过揭示（只在 `Revealing` 状态有效）
    Skip,

    /// 用户选择了某个选项（只在 `AwaitingChoice` 状态有效）
    ///
    /// `index` 是选项的索引（从 0 开始）
    ChoiceSelected { index: usize },

    /// 单个资源过渡完成（只在 `Transitioning` 状态有效）
    TransitionFinished,

    /// 过渡等待达到硬超时（只在 `Transitioning` 状态有效）
    ///
    /// 协调器据此强制完成所有未决过渡，保证有界完成。
    TransitionTimeout,

    /// 章节获取成功（只在 `LoadingChapter` 状态有效）
    ///
    /// `chapter_id` 用于丢弃已被取代的过期结果。
    ChapterLoaded {
        chapter_id: String,
        chapter: Chapter,
    },

    /// 章节获取失败（只在 `LoadingChapter` 状态有效）
    ChapterFailed {
        chapter_id: String,
        error: LoadError,
    },
}

impl PlaybackInput {
    /// 创建跳过输入
    pub fn skip() -> Self {
        Self::Skip
    }

    /// 创建选择输入
    pub fn choice(index: usize) -> Self {
        Self::ChoiceSelected { index }
    }

    /// 创建章节加载成功输入
    pub fn chapter_loaded(chapter_id: impl Into<String>, chapter: Chapter) -> Self {
        Self::ChapterLoaded {
            chapter_id: chapter_id.into(),
            chapter,
        }
    }

    /// 创建章节加载失败输入
    pub fn chapter_failed(chapter_id: impl Into<String>, error: LoadError) -> Self {
        Self::ChapterFailed {
            chapter_id: chapter_id.into(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_creation() {
        assert_eq!(PlaybackInput::skip(), PlaybackInput::Skip);
        assert_eq!(
            PlaybackInput::choice(2),
            PlaybackInput::ChoiceSelected { index: 2 }
        );
    }

    #[test]
    fn test_input_serialization() {
        let input = PlaybackInput::chapter_failed(
            "chapter2",
            LoadError::NotFound {
                chapter_id: "chapter2".to_string(),
                location: "chapters/chapter2.json".to_string(),
            },
        );
        let json = serde_json::to_string(&input).unwrap();
        let deserialized: PlaybackInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, deserialized);
    }
}
