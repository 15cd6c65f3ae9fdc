//! # Chapter 模块
//!
//! 章节数据模型：场景图的定义与 JSON 解析。
//!
//! ## 设计原则
//!
//! - 章节**原子加载、加载后不可变**，切换章节时整体替换
//! - 与外部章节文档的 JSON 格式对齐（`text` / `bg` / `char` / `choices`）
//! - 选项目标"场景或章节二选一"的约束由 [`ChoiceTarget`] 枚举在类型层面保证，
//!   非法文档（两者都有或都没有）在解析阶段报错

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::assets::AssetRef;
use crate::error::LoadError;

/// 章节的默认起始场景 ID
pub const DEFAULT_SCENE: &str = "start";

/// 选项跳转目标
///
/// 每个选项**恰好**指向一个目标：当前章节内的场景，或需要加载的另一章节
/// （从其默认场景开始）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceTarget {
    /// 当前章节内的场景 ID
    Scene(String),
    /// 另一章节的 ID
    Chapter(String),
}

/// 选项
///
/// 序列化格式与章节文档对齐：
///
/// ```text
/// { "text": "进门", "next": "hallway" }          -> target: Scene("hallway")
/// { "text": "离开", "nextChapter": "chapter2" }  -> target: Chapter("chapter2")
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChoice", into = "RawChoice")]
pub struct Choice {
    /// 选项显示文本
    pub label: String,
    /// 跳转目标
    pub target: ChoiceTarget,
}

impl Choice {
    /// 创建指向场景的选项
    pub fn to_scene(label: impl Into<String>, scene_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ChoiceTarget::Scene(scene_id.into()),
        }
    }

    /// 创建指向章节的选项
    pub fn to_chapter(label: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ChoiceTarget::Chapter(chapter_id.into()),
        }
    }
}

/// 选项的原始序列化形式
///
/// `next` 与 `nextChapter` 在文档中是两个可选字段，
/// 转换为 [`Choice`] 时校验"恰好一个"。
#[derive(Serialize, Deserialize)]
struct RawChoice {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next: Option<String>,
    #[serde(default, rename = "nextChapter", skip_serializing_if = "Option::is_none")]
    next_chapter: Option<String>,
}

impl TryFrom<RawChoice> for Choice {
    type Error = String;

    fn try_from(raw: RawChoice) -> Result<Self, Self::Error> {
        let target = match (raw.next, raw.next_chapter) {
            (Some(scene), None) => ChoiceTarget::Scene(scene),
            (None, Some(chapter)) => ChoiceTarget::Chapter(chapter),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "选项 '{}' 同时指定了 next 和 nextChapter",
                    raw.text
                ));
            }
            (None, None) => {
                return Err(format!("选项 '{}' 缺少 next 或 nextChapter", raw.text));
            }
        };

        Ok(Choice {
            label: raw.text,
            target,
        })
    }
}

impl From<Choice> for RawChoice {
    fn from(choice: Choice) -> Self {
        let (next, next_chapter) = match choice.target {
            ChoiceTarget::Scene(id) => (Some(id), None),
            ChoiceTarget::Chapter(id) => (None, Some(id)),
        };
        RawChoice {
            text: choice.label,
            next,
            next_chapter,
        }
    }
}

/// 场景
///
/// 一个叙事节拍：文本、可选的背景/立绘引用、以及有序的选项列表。
/// 没有选项的场景是**设计上的终局场景**，不是错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Scene {
    /// 场景文本
    #[serde(default)]
    pub text: String,

    /// 背景图引用（相对于资源根目录），None 表示沿用当前背景
    #[serde(default, rename = "bg", skip_serializing_if = "Option::is_none")]
    pub background: Option<AssetRef>,

    /// 立绘引用，None 表示沿用当前立绘
    #[serde(default, rename = "char", skip_serializing_if = "Option::is_none")]
    pub character: Option<AssetRef>,

    /// 选项列表（有序）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl Scene {
    /// 是否为终局场景（无任何选项）
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

/// 章节
///
/// 场景 ID 到 [`Scene`] 的映射。加载后不可变；
/// 引擎同一时刻只持有一个章节，切换时整体替换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chapter {
    scenes: HashMap<String, Scene>,
}

impl Chapter {
    /// 从场景映射构建章节（测试和工具使用）
    pub fn new(scenes: HashMap<String, Scene>) -> Self {
        Self { scenes }
    }

    /// 从章节文档（JSON 字节）解析
    ///
    /// # 参数
    ///
    /// - `chapter_id`: 章节 ID（仅用于错误信息）
    /// - `bytes`: 章节文档内容
    pub fn from_json(chapter_id: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        serde_json::from_slice(bytes).map_err(|e| LoadError::ParseFailed {
            chapter_id: chapter_id.to_string(),
            message: e.to_string(),
        })
    }

    /// 获取场景
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.get(scene_id)
    }

    /// 场景是否存在
    pub fn contains(&self, scene_id: &str) -> bool {
        self.scenes.contains_key(scene_id)
    }

    /// 场景数量
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// 是否为空章节
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// 遍历所有 (场景 ID, 场景)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scene)> {
        self.scenes.iter()
    }

    /// 所有场景 ID
    pub fn scene_ids(&self) -> impl Iterator<Item = &String> {
        self.scenes.keys()
    }
}
