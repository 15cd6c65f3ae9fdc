//! # 诊断模块
//!
//! 章节静态检查 API，不依赖 IO 或引擎。
//!
//! ## 设计原则
//!
//! - 纯函数 API，宿主可在加载后立刻检查并记录结果
//! - 诊断分级：Error（播放时会失败）、Warn（可疑结构）、Info（信息提示）
//! - 诊断永远不阻断播放：悬空目标等问题在运行时仍会以
//!   [`RuntimeError::SceneNotFound`](crate::error::RuntimeError) 形式暴露

use std::collections::HashSet;

use crate::chapter::{Chapter, ChoiceTarget, DEFAULT_SCENE, Scene};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（播放时会失败）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 章节 ID
    pub chapter_id: String,
    /// 场景 ID（如果可定位）
    pub scene_id: Option<String>,
    /// 诊断消息
    pub message: String,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(chapter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            chapter_id: chapter_id.into(),
            scene_id: None,
            message: message.into(),
        }
    }

    /// 创建警告诊断
    pub fn warn(chapter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            chapter_id: chapter_id.into(),
            scene_id: None,
            message: message.into(),
        }
    }

    /// 创建信息诊断
    pub fn info(chapter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            chapter_id: chapter_id.into(),
            scene_id: None,
            message: message.into(),
        }
    }

    /// 设置场景定位
    pub fn with_scene(mut self, scene_id: impl Into<String>) -> Self {
        self.scene_id = Some(scene_id.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.chapter_id)?;
        if let Some(scene) = &self.scene_id {
            write!(f, "#{}", scene)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否没有任何错误级诊断
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }
}

/// 分析一个已加载的章节
///
/// 检查项：
///
/// - 默认起始场景缺失（Error，按默认场景进入该章节会失败）
/// - 选项指向本章节中不存在的场景（Error）
/// - 从起始场景出发不可达的场景（Warn）
/// - 终局场景数量（Info，便于编剧核对）
pub fn analyze_chapter(chapter_id: &str, chapter: &Chapter) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    if chapter.is_empty() {
        result.push(Diagnostic::error(chapter_id, "章节为空，没有任何场景"));
        return result;
    }

    if !chapter.contains(DEFAULT_SCENE) {
        result.push(Diagnostic::error(
            chapter_id,
            format!("缺少默认起始场景 '{}'", DEFAULT_SCENE),
        ));
    }

    // 悬空的场景目标
    for (scene_id, scene) in chapter.iter() {
        for choice in &scene.choices {
            if let ChoiceTarget::Scene(target) = &choice.target
                && !chapter.contains(target)
            {
                result.push(
                    Diagnostic::error(
                        chapter_id,
                        format!("选项 '{}' 指向不存在的场景 '{}'", choice.label, target),
                    )
                    .with_scene(scene_id.clone()),
                );
            }
        }
    }

    // 从起始场景可达性
    let reachable = reachable_scenes(chapter, DEFAULT_SCENE);
    if !reachable.is_empty() {
        for scene_id in chapter.scene_ids() {
            if !reachable.contains(scene_id.as_str()) {
                result.push(
                    Diagnostic::warn(chapter_id, "从起始场景不可达")
                        .with_scene(scene_id.clone()),
                );
            }
        }
    }

    let terminal_count = chapter.iter().filter(|(_, s)| s.is_terminal()).count();
    if terminal_count > 0 {
        result.push(Diagnostic::info(
            chapter_id,
            format!("包含 {} 个终局场景", terminal_count),
        ));
    }

    result
}

/// 从指定场景出发可达的所有场景 ID（只沿场景目标，不跨章节）
fn reachable_scenes<'a>(chapter: &'a Chapter, from: &str) -> HashSet<&'a str> {
    let mut reachable = HashSet::new();
    let Some((start_id, _)) = chapter.iter().find(|(id, _)| id.as_str() == from) else {
        return reachable;
    };

    let mut stack = vec![start_id.as_str()];
    while let Some(scene_id) = stack.pop() {
        if !reachable.insert(scene_id) {
            continue;
        }
        let Some(scene) = chapter.scene(scene_id) else {
            continue;
        };
        for choice in &scene.choices {
            if let ChoiceTarget::Scene(target) = &choice.target
                && let Some((target_id, _)) = chapter.iter().find(|(id, _)| *id == target)
            {
                stack.push(target_id.as_str());
            }
        }
    }

    reachable
}

/// 按场景 ID 排序的 (ID, 场景) 列表，保证提取结果确定有序
fn sorted_scenes(chapter: &Chapter) -> Vec<(&String, &Scene)> {
    let mut entries: Vec<(&String, &Scene)> = chapter.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// 提取章节引用的所有资源（背景/立绘，未解析的原始引用，去重）
///
/// 宿主可用它在进入场景前预检资源是否存在。
pub fn extract_asset_references(chapter: &Chapter) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for (_, scene) in sorted_scenes(chapter) {
        for reference in [&scene.background, &scene.character].into_iter().flatten() {
            if !reference.is_empty() && seen.insert(reference.clone()) {
                references.push(reference.clone());
            }
        }
    }

    references
}

/// 提取章节引用的所有其他章节 ID（选项的章节目标，去重）
pub fn extract_chapter_references(chapter: &Chapter) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for (_, scene) in sorted_scenes(chapter) {
        for choice in &scene.choices {
            if let ChoiceTarget::Chapter(target) = &choice.target
                && seen.insert(target.clone())
            {
                references.push(target.clone());
            }
        }
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::{Choice, Scene};
    use std::collections::HashMap;

    fn chapter(scenes: Vec<(&str, Scene)>) -> Chapter {
        Chapter::new(
            scenes
                .into_iter()
                .map(|(id, s)| (id.to_string(), s))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn scene_with_choices(choices: Vec<Choice>) -> Scene {
        Scene {
            text: "...".to_string(),
            background: None,
            character: None,
            choices,
        }
    }

    #[test]
    fn test_clean_chapter() {
        let ch = chapter(vec![
            (
                "start",
                scene_with_choices(vec![Choice::to_scene("前进", "end")]),
            ),
            ("end", scene_with_choices(vec![])),
        ]);

        let result = analyze_chapter("c1", &ch);
        assert!(result.is_clean());
        assert_eq!(result.warn_count(), 0);
    }

    #[test]
    fn test_missing_start_scene() {
        let ch = chapter(vec![("intro", scene_with_choices(vec![]))]);
        let result = analyze_chapter("c1", &ch);

        assert_eq!(result.error_count(), 1);
        assert!(result.diagnostics[0].message.contains("start"));
    }

    #[test]
    fn test_dangling_scene_target() {
        let ch = chapter(vec![(
            "start",
            scene_with_choices(vec![Choice::to_scene("前进", "nowhere")]),
        )]);
        let result = analyze_chapter("c1", &ch);

        assert_eq!(result.error_count(), 1);
        let d = &result.diagnostics[0];
        assert_eq!(d.scene_id.as_deref(), Some("start"));
        assert!(d.message.contains("nowhere"));
    }

    #[test]
    fn test_unreachable_scene_warns() {
        let ch = chapter(vec![
            ("start", scene_with_choices(vec![])),
            ("orphan", scene_with_choices(vec![])),
        ]);
        let result = analyze_chapter("c1", &ch);

        assert!(result.is_clean());
        assert_eq!(result.warn_count(), 1);
    }

    #[test]
    fn test_empty_chapter_is_error() {
        let result = analyze_chapter("c1", &chapter(vec![]));
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_extract_references() {
        let ch = chapter(vec![
            (
                "start",
                Scene {
                    text: String::new(),
                    background: Some("night.png".to_string()),
                    character: Some("heroine.png".to_string()),
                    choices: vec![Choice::to_chapter("下一章", "chapter2")],
                },
            ),
            (
                "tail",
                Scene {
                    text: String::new(),
                    background: Some("night.png".to_string()),
                    character: None,
                    choices: vec![Choice::to_chapter("支线", "chapter3")],
                },
            ),
        ]);

        let assets = extract_asset_references(&ch);
        assert_eq!(assets, vec!["night.png", "heroine.png"]);

        let chapters = extract_chapter_references(&ch);
        assert_eq!(chapters, vec!["chapter2", "chapter3"]);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error("c1", "选项指向不存在的场景").with_scene("start");
        assert_eq!(format!("{}", d), "[ERROR] c1#start: 选项指向不存在的场景");
    }
}
