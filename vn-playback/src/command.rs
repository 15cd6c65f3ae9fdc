//! # Command 模块
//!
//! 定义引擎向宿主发出的所有指令。
//! Command 是引擎与宿主之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作
//! - **引擎无关**：不包含任何渲染/网络库的类型

use serde::{Deserialize, Serialize};

/// 呈现给玩家的单个选项
///
/// 选择时宿主只回传索引，跳转目标留在引擎内部。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceItem {
    /// 选项显示文本
    pub label: String,
}

/// 引擎向宿主发出的指令
///
/// 宿主接收 Command 后，将其转换为实际的获取、渲染等操作。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 请求获取章节文档
    ///
    /// 宿主完成后通过 `ChapterLoaded` / `ChapterFailed` 输入回传结果。
    RequestChapter {
        /// 章节 ID
        chapter_id: String,
    },

    /// 以淡入淡出方式切换背景
    ///
    /// 宿主完成淡入后回传 `TransitionFinished`。
    TransitionBackground {
        /// 已解析的资源路径
        path: String,
    },

    /// 以淡入淡出方式切换立绘
    TransitionCharacter {
        /// 已解析的资源路径
        path: String,
    },

    /// 清空文本区（新场景取代进行中的揭示时）
    ClearText,

    /// 显示文本的当前前缀
    ///
    /// 揭示过程中每个 tick 发出一次，前缀严格递增，最后一次即完整文本。
    RevealText {
        /// 当前已揭示的前缀
        prefix: String,
    },

    /// 构建选项控件（可见但**禁用**，直到揭示完成或被跳过）
    PresentChoices {
        /// 选项列表（有序，选择时按索引回传）
        choices: Vec<ChoiceItem>,
    },

    /// 启用所有选项控件
    EnableChoices,

    /// 清空选项控件
    ClearChoices,

    /// 在文本区显示章节加载错误指示
    ShowLoadError {
        /// 人类可读的错误信息
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::RevealText {
            prefix: "夜色降".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }

    #[test]
    fn test_present_choices_serialization() {
        let cmd = Command::PresentChoices {
            choices: vec![
                ChoiceItem {
                    label: "进门".to_string(),
                },
                ChoiceItem {
                    label: "离开".to_string(),
                },
            ],
        };

        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }
}
