//! # State 模块
//!
//! 定义播放位置指针、引擎阶段与等待模型。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**，不允许隐式全局状态
//! - [`PlaybackPointer`] 是"玩家在哪"的唯一事实来源，
//!   只由状态机在其转换中修改，宿主/UI 永远不直接写
//! - 指针更新永远在章节加载**成功之后**，失败时保持最后一次成功的位置

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 播放位置指针
///
/// `{章节, 场景}` 坐标，表示当前进度。可序列化（存档使用同一坐标）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackPointer {
    /// 当前章节 ID
    pub chapter_id: String,
    /// 当前场景 ID（必须能在已加载章节中解析）
    pub scene_id: String,
}

impl PlaybackPointer {
    /// 创建指针
    pub fn new(chapter_id: impl Into<String>, scene_id: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            scene_id: scene_id.into(),
        }
    }
}

/// 引擎阶段
///
/// # 状态转换
///
/// ```text
/// Idle           -> start() 后进入 LoadingChapter
/// LoadingChapter -> 获取成功: 设置指针, 进入 Transitioning
///                -> 获取失败: 进入 Error（错误指示 + 清空选项）
/// Transitioning  -> 所有过渡完成(或超时强制完成): 进入 Revealing
/// Revealing      -> 自然完成或跳过: 启用选项, 进入 AwaitingChoice
/// AwaitingChoice -> 选中场景目标: 回到 Transitioning（指针场景立即更新）
///                -> 选中章节目标: 进入 LoadingChapter（指针在加载成功前不动）
/// Error          -> 终态，只有重新加载章节（读档/重启）才能恢复
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// 初始状态，尚未开始
    Idle,

    /// 正在加载章节
    LoadingChapter {
        /// 目标章节 ID
        chapter_id: String,
        /// 起始场景；None 表示用章节默认场景
        start_scene: Option<String>,
    },

    /// 正在执行场景资源过渡
    Transitioning,

    /// 正在揭示场景文本
    Revealing,

    /// 等待玩家选择（选项列表可能为空，即终局场景）
    AwaitingChoice,

    /// 章节加载失败后的终态
    Error,
}

impl PlaybackPhase {
    /// 是否处于错误终态
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// 等待原因
///
/// 引擎在 `tick` 之间挂起的协作点。宿主根据此状态决定做什么：
///
/// ```text
/// None               -> 没有事情可做（Idle / Error / 终局前的空转）
/// WaitForChapter     -> 获取章节文档，回传 ChapterLoaded / ChapterFailed
/// WaitForTransitions -> 执行淡入淡出；每完成一个回传 TransitionFinished；
///                       从进入该状态起计时，超过 timeout 后回传 TransitionTimeout
/// WaitForTick        -> 等待指定时长后调用 tick(None)
/// WaitForChoice      -> 采集玩家选择（或存档/读档等外部触发）
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaitingReason {
    /// 不等待任何事件
    None,

    /// 等待章节获取结果
    WaitForChapter {
        /// 在途的章节 ID
        chapter_id: String,
    },

    /// 等待资源过渡完成
    ///
    /// `timeout` 从**本批过渡开始**计时一次，不随部分完成而重置。
    WaitForTransitions {
        /// 未决过渡数量
        pending: usize,
        /// 有界完成的硬上限
        timeout: Duration,
    },

    /// 等待一个揭示 tick
    WaitForTick(Duration),

    /// 等待玩家选择
    ///
    /// `choice_count` 记录选项数量，用于验证输入合法性；
    /// 0 表示终局场景（无可选项，仍是合法的等待状态）。
    WaitForChoice { choice_count: usize },
}

impl WaitingReason {
    /// 是否处于等待状态
    pub fn is_waiting(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for WaitingReason {
    fn default() -> Self {
        Self::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_serialization() {
        let pointer = PlaybackPointer::new("chapter1", "start");
        let json = serde_json::to_string(&pointer).unwrap();
        let deserialized: PlaybackPointer = serde_json::from_str(&json).unwrap();
        assert_eq!(pointer, deserialized);
    }

    #[test]
    fn test_waiting_reason() {
        assert!(!WaitingReason::None.is_waiting());
        assert!(
            WaitingReason::WaitForChoice { choice_count: 0 }.is_waiting(),
            "终局场景仍然是等待状态"
        );
        assert!(WaitingReason::WaitForTick(Duration::from_millis(22)).is_waiting());
    }

    #[test]
    fn test_phase_is_error() {
        assert!(PlaybackPhase::Error.is_error());
        assert!(!PlaybackPhase::Idle.is_error());
    }
}
