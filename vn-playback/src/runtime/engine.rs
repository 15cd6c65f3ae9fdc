//! # Engine 模块
//!
//! 叙事状态机：把资源过渡、文本揭示、选项可用性编排为确定性的
//! 逐场景协议，并负责选项路由与章节切换。
//!
//! ## 执行模型
//!
//! ```text
//! tick(input) -> (Vec<Command>, WaitingReason)
//! ```
//!
//! 1. 输入只在匹配的阶段被消费，否则丢弃（竞态防护）
//! 2. 场景协议：过渡（并发、联合等待）-> 揭示 -> 启用选项，是严格顺序屏障
//! 3. 指针只在这里被修改；章节目标先加载成功、再更新指针

use crate::chapter::{Chapter, DEFAULT_SCENE, ChoiceTarget, Scene};
use crate::command::{ChoiceItem, Command};
use crate::error::RuntimeError;
use crate::input::PlaybackInput;
use crate::state::{PlaybackPhase, PlaybackPointer, WaitingReason};
use crate::transition::{DEFAULT_TRANSITION_TIMEOUT, TransitionCoordinator};
use crate::typewriter::{DEFAULT_CHARS_PER_SEC, RevealStep, Typewriter};

use std::time::Duration;

/// 引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 启动时加载的默认章节
    pub start_chapter: String,
    /// 启动时的起始场景；None 表示用章节默认场景
    pub start_scene: Option<String>,
    /// 文本揭示速率（字符/秒）
    pub chars_per_sec: f64,
    /// 资源根目录（路径约定前缀）
    pub asset_root: String,
    /// 资源过渡硬超时
    pub transition_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_chapter: "chapter1".to_string(),
            start_scene: None,
            chars_per_sec: DEFAULT_CHARS_PER_SEC,
            asset_root: crate::assets::DEFAULT_ASSET_ROOT.to_string(),
            transition_timeout: DEFAULT_TRANSITION_TIMEOUT,
        }
    }
}

/// 叙事播放引擎
///
/// 持有**唯一**的可变 [`PlaybackPointer`] 和**唯一**的已加载 [`Chapter`]，
/// 两者只在状态转换中被修改，没有外部写入者。
///
/// # 使用示例
///
/// ```ignore
/// let mut engine = PlaybackEngine::new(EngineConfig::default());
/// let (commands, mut waiting) = engine.start();
///
/// loop {
///     // 宿主执行 commands，按 waiting 采集输入...
///     let (commands, next) = engine.tick(input)?;
///     waiting = next;
/// }
/// ```
pub struct PlaybackEngine {
    /// 配置
    config: EngineConfig,
    /// 当前阶段
    phase: PlaybackPhase,
    /// 播放位置（首个章节加载成功前为 None）
    pointer: Option<PlaybackPointer>,
    /// 当前加载的章节（整体替换，不做部分更新）
    chapter: Option<Chapter>,
    /// 文本揭示组件
    typewriter: Typewriter,
    /// 资源过渡协调器
    transitions: TransitionCoordinator,
}

impl PlaybackEngine {
    /// 创建引擎（`Idle` 状态，尚未加载任何内容）
    pub fn new(config: EngineConfig) -> Self {
        let transitions =
            TransitionCoordinator::with_config(config.asset_root.clone(), config.transition_timeout);
        Self {
            config,
            phase: PlaybackPhase::Idle,
            pointer: None,
            chapter: None,
            typewriter: Typewriter::new(),
            transitions,
        }
    }

    /// 启动：加载配置的默认章节/场景
    pub fn start(&mut self) -> (Vec<Command>, WaitingReason) {
        let chapter_id = self.config.start_chapter.clone();
        let start_scene = self.config.start_scene.clone();
        self.load_chapter_at(chapter_id, start_scene)
    }

    /// 加载指定章节，从指定场景（None 为章节默认场景）开始
    ///
    /// 任何阶段都可调用：进行中的揭示被取消清空，未决过渡被丢弃。
    /// 这也是 `Error` 终态唯一的恢复路径（读档、重启）。
    pub fn load_chapter_at(
        &mut self,
        chapter_id: String,
        start_scene: Option<String>,
    ) -> (Vec<Command>, WaitingReason) {
        self.typewriter.cancel();
        self.transitions.abandon();

        tracing::info!(%chapter_id, ?start_scene, "开始加载章节");
        self.phase = PlaybackPhase::LoadingChapter {
            chapter_id: chapter_id.clone(),
            start_scene,
        };

        (
            vec![
                Command::ClearText,
                Command::ClearChoices,
                Command::RequestChapter {
                    chapter_id: chapter_id.clone(),
                },
            ],
            WaitingReason::WaitForChapter { chapter_id },
        )
    }

    /// 核心驱动函数
    ///
    /// 根据输入推进状态机，返回产生的指令和新的等待状态。
    /// `tick(None)` 在 `Revealing` 中表示一个揭示 tick 已到期，
    /// 其余阶段无输入时是无操作。
    ///
    /// # 错误
    ///
    /// - [`RuntimeError::SceneNotFound`]：选项指向本章节中不存在的场景，
    ///   指针与阶段保持不变
    /// - [`RuntimeError::InvalidChoiceIndex`]：索引超出选项范围
    pub fn tick(
        &mut self,
        input: Option<PlaybackInput>,
    ) -> Result<(Vec<Command>, WaitingReason), RuntimeError> {
        let Some(input) = input else {
            if matches!(self.phase, PlaybackPhase::Revealing) {
                return Ok(self.advance_reveal());
            }
            return Ok((Vec::new(), self.waiting()));
        };

        match (self.phase.clone(), input) {
            // 章节获取成功：先校验起始场景，再提交指针和章节
            (
                PlaybackPhase::LoadingChapter {
                    chapter_id,
                    start_scene,
                },
                PlaybackInput::ChapterLoaded {
                    chapter_id: loaded_id,
                    chapter,
                },
            ) => {
                if loaded_id != chapter_id {
                    tracing::debug!(%loaded_id, %chapter_id, "丢弃过期的章节加载结果");
                    return Ok((Vec::new(), self.waiting()));
                }
                self.commit_chapter(chapter_id, start_scene, chapter)
            }

            // 章节获取失败：进入 Error 终态，指针保持最后一次成功的位置
            (
                PlaybackPhase::LoadingChapter { chapter_id, .. },
                PlaybackInput::ChapterFailed {
                    chapter_id: failed_id,
                    error,
                },
            ) => {
                if failed_id != chapter_id {
                    tracing::debug!(%failed_id, %chapter_id, "丢弃过期的章节加载失败");
                    return Ok((Vec::new(), self.waiting()));
                }
                tracing::error!(%chapter_id, %error, "章节加载失败");
                Ok(self.enter_error(error.to_string()))
            }

            // 单个过渡完成：全部结清后进入揭示
            (PlaybackPhase::Transitioning, PlaybackInput::TransitionFinished) => {
                if self.transitions.acknowledge() {
                    Ok(self.begin_reveal())
                } else {
                    Ok((Vec::new(), self.waiting()))
                }
            }

            // 过渡硬超时：强制完成，自动恢复，照常进入揭示
            (PlaybackPhase::Transitioning, PlaybackInput::TransitionTimeout) => {
                let forced = self.transitions.force_complete();
                tracing::warn!(forced, "资源过渡超时，强制完成");
                Ok(self.begin_reveal())
            }

            // 跳过揭示：立即给出完整文本并启用选项
            (PlaybackPhase::Revealing, PlaybackInput::Skip) => {
                match self.typewriter.skip() {
                    Some(full_text) => Ok(self.finish_reveal(full_text)),
                    // Revealing 阶段揭示器必然活动；防御性处理
                    None => Ok((Vec::new(), self.waiting())),
                }
            }

            // 选项路由：场景目标先校验再更新指针；章节目标进入加载
            (PlaybackPhase::AwaitingChoice, PlaybackInput::ChoiceSelected { index }) => {
                self.select_choice(index)
            }

            // 状态不匹配的输入一律丢弃，不排队（竞态防护）
            (phase, input) => {
                tracing::debug!(?phase, ?input, "输入在当前阶段无效，已丢弃");
                Ok((Vec::new(), self.waiting()))
            }
        }
    }

    /// 当前阶段
    pub fn phase(&self) -> &PlaybackPhase {
        &self.phase
    }

    /// 当前播放位置
    pub fn pointer(&self) -> Option<&PlaybackPointer> {
        self.pointer.as_ref()
    }

    /// 当前加载的章节
    pub fn chapter(&self) -> Option<&Chapter> {
        self.chapter.as_ref()
    }

    /// 当前场景
    pub fn current_scene(&self) -> Option<&Scene> {
        let pointer = self.pointer.as_ref()?;
        self.chapter.as_ref()?.scene(&pointer.scene_id)
    }

    /// 当前等待状态（由阶段派生，无独立副本）
    pub fn waiting(&self) -> WaitingReason {
        match &self.phase {
            PlaybackPhase::Idle | PlaybackPhase::Error => WaitingReason::None,
            PlaybackPhase::LoadingChapter { chapter_id, .. } => WaitingReason::WaitForChapter {
                chapter_id: chapter_id.clone(),
            },
            PlaybackPhase::Transitioning => WaitingReason::WaitForTransitions {
                pending: self.transitions.pending(),
                timeout: self.transitions.timeout(),
            },
            PlaybackPhase::Revealing => WaitingReason::WaitForTick(self.typewriter.interval()),
            PlaybackPhase::AwaitingChoice => WaitingReason::WaitForChoice {
                choice_count: self.current_choice_count(),
            },
        }
    }

    /// 校验并提交新章节，随后进入起始场景
    fn commit_chapter(
        &mut self,
        chapter_id: String,
        start_scene: Option<String>,
        chapter: Chapter,
    ) -> Result<(Vec<Command>, WaitingReason), RuntimeError> {
        let scene_id = start_scene.unwrap_or_else(|| DEFAULT_SCENE.to_string());

        if !chapter.contains(&scene_id) {
            // 提交前校验：指针尚未移动，按加载失败处理
            tracing::error!(%chapter_id, %scene_id, "章节中找不到起始场景");
            let message = RuntimeError::SceneNotFound {
                chapter_id,
                scene_id,
            }
            .to_string();
            return Ok(self.enter_error(message));
        }

        self.chapter = Some(chapter);
        self.pointer = Some(PlaybackPointer::new(chapter_id, scene_id.clone()));
        self.enter_scene(&scene_id)
    }

    /// 处理选项选择
    fn select_choice(
        &mut self,
        index: usize,
    ) -> Result<(Vec<Command>, WaitingReason), RuntimeError> {
        let scene = self.current_scene().ok_or(RuntimeError::NoChapterLoaded)?;
        let choice = scene
            .choices
            .get(index)
            .ok_or(RuntimeError::InvalidChoiceIndex {
                index,
                max: scene.choices.len(),
            })?;

        match choice.target.clone() {
            ChoiceTarget::Scene(scene_id) => self.enter_scene(&scene_id),
            ChoiceTarget::Chapter(chapter_id) => Ok(self.load_chapter_at(chapter_id, None)),
        }
    }

    /// 进入场景：取消在途揭示、构建禁用态选项、计划过渡
    ///
    /// 目标场景不存在时返回 [`RuntimeError::SceneNotFound`]，
    /// 指针与阶段**不**改变。
    fn enter_scene(
        &mut self,
        scene_id: &str,
    ) -> Result<(Vec<Command>, WaitingReason), RuntimeError> {
        let chapter = self.chapter.as_ref().ok_or(RuntimeError::NoChapterLoaded)?;
        let pointer = self.pointer.as_mut().ok_or(RuntimeError::NoChapterLoaded)?;

        let scene = chapter
            .scene(scene_id)
            .ok_or_else(|| RuntimeError::SceneNotFound {
                chapter_id: pointer.chapter_id.clone(),
                scene_id: scene_id.to_string(),
            })?
            .clone();

        // 指针场景在目标校验成功后立即更新
        pointer.scene_id = scene_id.to_string();
        tracing::debug!(
            chapter_id = %pointer.chapter_id,
            scene_id,
            "进入场景"
        );

        // 新场景取代在途揭示：取消清空
        self.typewriter.cancel();

        let mut commands = vec![
            Command::ClearText,
            Command::PresentChoices {
                choices: scene
                    .choices
                    .iter()
                    .map(|c| ChoiceItem {
                        label: c.label.clone(),
                    })
                    .collect(),
            },
        ];

        let transition_commands = self.transitions.begin_scene(&scene);
        commands.extend(transition_commands);

        if self.transitions.is_idle() {
            // 两层都是 no-op：跳过过渡屏障，直接揭示
            let (reveal_commands, waiting) = self.begin_reveal();
            commands.extend(reveal_commands);
            Ok((commands, waiting))
        } else {
            self.phase = PlaybackPhase::Transitioning;
            Ok((commands, self.waiting()))
        }
    }

    /// 过渡屏障结清后开始揭示当前场景文本
    fn begin_reveal(&mut self) -> (Vec<Command>, WaitingReason) {
        let text = self
            .current_scene()
            .map(|s| s.text.clone())
            .unwrap_or_default();

        self.typewriter
            .start(&text, Some(self.config.chars_per_sec));

        let mut commands = vec![Command::RevealText {
            prefix: String::new(),
        }];

        if self.typewriter.is_active() {
            self.phase = PlaybackPhase::Revealing;
            (commands, self.waiting())
        } else {
            // 空文本：揭示立即完成
            commands.push(Command::EnableChoices);
            self.phase = PlaybackPhase::AwaitingChoice;
            (commands, self.waiting())
        }
    }

    /// 一个揭示 tick 到期
    fn advance_reveal(&mut self) -> (Vec<Command>, WaitingReason) {
        match self.typewriter.tick() {
            Some(RevealStep::Progress(prefix)) => (
                vec![Command::RevealText { prefix }],
                WaitingReason::WaitForTick(self.typewriter.interval()),
            ),
            Some(RevealStep::Done(full_text)) => self.finish_reveal(full_text),
            None => {
                // Revealing 阶段揭示器必然活动；防御性自愈
                tracing::debug!("揭示器已不活动，直接启用选项");
                self.phase = PlaybackPhase::AwaitingChoice;
                (vec![Command::EnableChoices], self.waiting())
            }
        }
    }

    /// 揭示完成（自然完成或跳过，对调用方完全一致）
    fn finish_reveal(&mut self, full_text: String) -> (Vec<Command>, WaitingReason) {
        self.phase = PlaybackPhase::AwaitingChoice;
        (
            vec![
                Command::RevealText { prefix: full_text },
                Command::EnableChoices,
            ],
            self.waiting(),
        )
    }

    /// 进入 Error 终态：文本区显示错误指示，清空选项
    fn enter_error(&mut self, message: String) -> (Vec<Command>, WaitingReason) {
        self.typewriter.cancel();
        self.transitions.abandon();
        self.phase = PlaybackPhase::Error;
        (
            vec![
                Command::ShowLoadError { message },
                Command::ClearChoices,
            ],
            WaitingReason::None,
        )
    }

    /// 当前场景的选项数量
    fn current_choice_count(&self) -> usize {
        self.current_scene().map(|s| s.choices.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::Choice;
    use crate::error::LoadError;
    use std::collections::HashMap;

    fn test_chapter() -> Chapter {
        let mut scenes = HashMap::new();
        scenes.insert(
            "start".to_string(),
            Scene {
                text: "ab".to_string(),
                background: Some("night.png".to_string()),
                character: None,
                choices: vec![
                    Choice::to_scene("前进", "end"),
                    Choice::to_chapter("下一章", "chapter2"),
                ],
            },
        );
        scenes.insert(
            "end".to_string(),
            Scene {
                text: "完".to_string(),
                background: Some("night.png".to_string()),
                character: None,
                choices: vec![],
            },
        );
        Chapter::new(scenes)
    }

    /// 启动并提交测试章节，推进到 AwaitingChoice
    fn engine_at_choice() -> PlaybackEngine {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        engine
            .tick(Some(PlaybackInput::chapter_loaded("chapter1", test_chapter())))
            .unwrap();
        // 背景过渡
        engine
            .tick(Some(PlaybackInput::TransitionFinished))
            .unwrap();
        // "ab" 两个 tick
        engine.tick(None).unwrap();
        engine.tick(None).unwrap();
        assert_eq!(engine.phase(), &PlaybackPhase::AwaitingChoice);
        engine
    }

    #[test]
    fn test_startup_requests_default_chapter() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        let (commands, waiting) = engine.start();

        assert!(commands.contains(&Command::RequestChapter {
            chapter_id: "chapter1".to_string()
        }));
        assert_eq!(
            waiting,
            WaitingReason::WaitForChapter {
                chapter_id: "chapter1".to_string()
            }
        );
        assert!(engine.pointer().is_none());
    }

    #[test]
    fn test_scene_protocol_order() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();

        let (commands, waiting) = engine
            .tick(Some(PlaybackInput::chapter_loaded("chapter1", test_chapter())))
            .unwrap();

        // 选项先构建（禁用态），过渡随后
        assert!(matches!(&commands[0], Command::ClearText));
        assert!(matches!(
            &commands[1],
            Command::PresentChoices { choices } if choices.len() == 2
        ));
        assert!(matches!(
            &commands[2],
            Command::TransitionBackground { path } if path == "assets/night.png"
        ));
        assert!(matches!(
            waiting,
            WaitingReason::WaitForTransitions { pending: 1, .. }
        ));

        // 指针在加载成功后指向起始场景
        let pointer = engine.pointer().unwrap();
        assert_eq!(pointer.chapter_id, "chapter1");
        assert_eq!(pointer.scene_id, "start");

        // 过渡结清后才开始揭示
        let (commands, waiting) = engine
            .tick(Some(PlaybackInput::TransitionFinished))
            .unwrap();
        assert_eq!(
            commands,
            vec![Command::RevealText {
                prefix: String::new()
            }]
        );
        assert!(matches!(waiting, WaitingReason::WaitForTick(_)));

        // 两个揭示 tick：最后一个附带启用选项
        let (commands, _) = engine.tick(None).unwrap();
        assert_eq!(
            commands,
            vec![Command::RevealText {
                prefix: "a".to_string()
            }]
        );

        let (commands, waiting) = engine.tick(None).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::RevealText {
                    prefix: "ab".to_string()
                },
                Command::EnableChoices,
            ]
        );
        assert_eq!(waiting, WaitingReason::WaitForChoice { choice_count: 2 });
    }

    #[test]
    fn test_load_failure_enters_error_without_touching_pointer() {
        let mut engine = engine_at_choice();
        let before = engine.pointer().cloned();

        // 选择章节目标，加载失败
        engine.tick(Some(PlaybackInput::choice(1))).unwrap();
        let (commands, waiting) = engine
            .tick(Some(PlaybackInput::chapter_failed(
                "chapter2",
                LoadError::NotFound {
                    chapter_id: "chapter2".to_string(),
                    location: "chapters/chapter2.json".to_string(),
                },
            )))
            .unwrap();

        assert!(engine.phase().is_error());
        assert!(matches!(&commands[0], Command::ShowLoadError { .. }));
        assert!(commands.contains(&Command::ClearChoices));
        assert_eq!(waiting, WaitingReason::None);
        // 指针停留在最后一次成功的位置
        assert_eq!(engine.pointer().cloned(), before);
    }

    #[test]
    fn test_error_recovers_only_via_fresh_load() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        engine
            .tick(Some(PlaybackInput::chapter_failed(
                "chapter1",
                LoadError::Unreachable {
                    chapter_id: "chapter1".to_string(),
                    message: "io".to_string(),
                },
            )))
            .unwrap();
        assert!(engine.phase().is_error());

        // Error 态下其他输入全部丢弃
        let (commands, waiting) = engine.tick(Some(PlaybackInput::choice(0))).unwrap();
        assert!(commands.is_empty());
        assert_eq!(waiting, WaitingReason::None);

        // 重新加载恢复
        let (_, waiting) = engine.load_chapter_at("chapter1".to_string(), None);
        assert!(matches!(waiting, WaitingReason::WaitForChapter { .. }));
    }

    #[test]
    fn test_choice_during_reveal_is_dropped() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        engine
            .tick(Some(PlaybackInput::chapter_loaded("chapter1", test_chapter())))
            .unwrap();
        engine
            .tick(Some(PlaybackInput::TransitionFinished))
            .unwrap();
        assert_eq!(engine.phase(), &PlaybackPhase::Revealing);

        let before = engine.pointer().cloned();
        let (commands, _) = engine.tick(Some(PlaybackInput::choice(0))).unwrap();
        assert!(commands.is_empty());
        assert_eq!(engine.pointer().cloned(), before);
        assert_eq!(engine.phase(), &PlaybackPhase::Revealing);
    }

    #[test]
    fn test_skip_mid_reveal_enables_choices() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        engine
            .tick(Some(PlaybackInput::chapter_loaded("chapter1", test_chapter())))
            .unwrap();
        engine
            .tick(Some(PlaybackInput::TransitionFinished))
            .unwrap();

        let (commands, waiting) = engine.tick(Some(PlaybackInput::Skip)).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::RevealText {
                    prefix: "ab".to_string()
                },
                Command::EnableChoices,
            ]
        );
        assert_eq!(waiting, WaitingReason::WaitForChoice { choice_count: 2 });

        // 跳过之后没有后续 tick
        let (commands, _) = engine.tick(None).unwrap();
        assert!(commands.is_empty());
    }

    #[test]
    fn test_skip_outside_revealing_is_dropped() {
        let mut engine = engine_at_choice();
        let (commands, waiting) = engine.tick(Some(PlaybackInput::Skip)).unwrap();
        assert!(commands.is_empty());
        assert_eq!(waiting, WaitingReason::WaitForChoice { choice_count: 2 });
    }

    #[test]
    fn test_local_choice_reenters_transitioning() {
        let mut engine = engine_at_choice();

        let (commands, _) = engine.tick(Some(PlaybackInput::choice(0))).unwrap();
        // 指针场景立即更新，章节不变
        let pointer = engine.pointer().unwrap();
        assert_eq!(pointer.chapter_id, "chapter1");
        assert_eq!(pointer.scene_id, "end");

        // "end" 场景背景与当前一致：无过渡，直接进入揭示
        assert!(
            !commands
                .iter()
                .any(|c| matches!(c, Command::TransitionBackground { .. })),
        );
        assert_eq!(engine.phase(), &PlaybackPhase::Revealing);
    }

    #[test]
    fn test_chapter_choice_defers_pointer_update() {
        let mut engine = engine_at_choice();

        let (commands, waiting) = engine.tick(Some(PlaybackInput::choice(1))).unwrap();
        assert!(commands.contains(&Command::RequestChapter {
            chapter_id: "chapter2".to_string()
        }));
        assert_eq!(
            waiting,
            WaitingReason::WaitForChapter {
                chapter_id: "chapter2".to_string()
            }
        );
        // 加载成功前指针不动
        assert_eq!(engine.pointer().unwrap().chapter_id, "chapter1");

        let mut scenes = HashMap::new();
        scenes.insert("start".to_string(), Scene::default());
        engine
            .tick(Some(PlaybackInput::chapter_loaded(
                "chapter2",
                Chapter::new(scenes),
            )))
            .unwrap();
        let pointer = engine.pointer().unwrap();
        assert_eq!(pointer.chapter_id, "chapter2");
        assert_eq!(pointer.scene_id, "start");
    }

    #[test]
    fn test_invalid_choice_index() {
        let mut engine = engine_at_choice();
        let result = engine.tick(Some(PlaybackInput::choice(9)));
        assert_eq!(
            result,
            Err(RuntimeError::InvalidChoiceIndex { index: 9, max: 2 })
        );
        // 引擎状态未被破坏
        assert_eq!(engine.phase(), &PlaybackPhase::AwaitingChoice);
    }

    #[test]
    fn test_dangling_scene_target_is_diagnosable() {
        let mut scenes = HashMap::new();
        scenes.insert(
            "start".to_string(),
            Scene {
                text: String::new(),
                background: None,
                character: None,
                choices: vec![Choice::to_scene("坏选项", "nowhere")],
            },
        );

        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        engine
            .tick(Some(PlaybackInput::chapter_loaded(
                "chapter1",
                Chapter::new(scenes),
            )))
            .unwrap();
        assert_eq!(engine.phase(), &PlaybackPhase::AwaitingChoice);

        let result = engine.tick(Some(PlaybackInput::choice(0)));
        assert_eq!(
            result,
            Err(RuntimeError::SceneNotFound {
                chapter_id: "chapter1".to_string(),
                scene_id: "nowhere".to_string(),
            })
        );
        // 指针与阶段保持不变
        assert_eq!(engine.pointer().unwrap().scene_id, "start");
        assert_eq!(engine.phase(), &PlaybackPhase::AwaitingChoice);
    }

    #[test]
    fn test_missing_start_scene_is_load_failure() {
        let mut scenes = HashMap::new();
        scenes.insert("intro".to_string(), Scene::default());

        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        let (commands, _) = engine
            .tick(Some(PlaybackInput::chapter_loaded(
                "chapter1",
                Chapter::new(scenes),
            )))
            .unwrap();

        assert!(engine.phase().is_error());
        assert!(engine.pointer().is_none());
        assert!(matches!(
            &commands[0],
            Command::ShowLoadError { message } if message.contains("start")
        ));
    }

    #[test]
    fn test_stale_chapter_result_is_dropped() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();

        let (commands, waiting) = engine
            .tick(Some(PlaybackInput::chapter_loaded("other", test_chapter())))
            .unwrap();
        assert!(commands.is_empty());
        assert_eq!(
            waiting,
            WaitingReason::WaitForChapter {
                chapter_id: "chapter1".to_string()
            }
        );
    }

    #[test]
    fn test_transition_timeout_forces_progress() {
        let mut engine = PlaybackEngine::new(EngineConfig::default());
        engine.start();
        engine
            .tick(Some(PlaybackInput::chapter_loaded("chapter1", test_chapter())))
            .unwrap();
        assert_eq!(engine.phase(), &PlaybackPhase::Transitioning);

        // 宿主从未回报完成：超时输入仍保证推进
        let (commands, waiting) = engine
            .tick(Some(PlaybackInput::TransitionTimeout))
            .unwrap();
        assert_eq!(
            commands,
            vec![Command::RevealText {
                prefix: String::new()
            }]
        );
        assert!(matches!(waiting, WaitingReason::WaitForTick(_)));
    }

    #[test]
    fn test_terminal_scene_awaits_with_empty_choices() {
        let mut engine = engine_at_choice();
        engine.tick(Some(PlaybackInput::choice(0))).unwrap();
        // "完" 一个字符
        let (commands, waiting) = engine.tick(None).unwrap();

        assert!(commands.contains(&Command::EnableChoices));
        assert_eq!(engine.phase(), &PlaybackPhase::AwaitingChoice);
        assert_eq!(waiting, WaitingReason::WaitForChoice { choice_count: 0 });
    }
}
