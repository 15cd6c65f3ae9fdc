//! # VN Playback
//!
//! 分支叙事（视觉小说）的核心播放引擎。
//!
//! ## 架构概述
//!
//! `vn-playback` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过**命令驱动模式**与宿主层（Host）通信：
//!
//! ```text
//! Host                          Engine
//!   │                              │
//!   │──── PlaybackInput ─────────►│
//!   │                              │ tick()
//!   │◄─── (Vec<Command>, WaitingReason) ──│
//!   │                              │
//! ```
//!
//! 网络获取、文件 IO、真实计时、渲染都发生在宿主：引擎通过
//! [`WaitingReason`] 声明它在等什么，宿主满足后以 [`PlaybackInput`]
//! 回传结果。原本异步的三个挂起点（章节获取、资源过渡的联合等待、
//! 逐字揭示的 tick）因此都成为显式、可测试的协作点。
//!
//! ## 核心类型
//!
//! - [`PlaybackEngine`]：叙事状态机，持有唯一的 [`PlaybackPointer`] 和已加载章节
//! - [`Command`]：引擎向宿主发出的指令
//! - [`PlaybackInput`]：宿主向引擎传递的输入
//! - [`WaitingReason`]：引擎的等待状态
//! - [`SaveRecord`]：单槽存档的持久化契约
//!
//! ## 使用示例
//!
//! ```ignore
//! use vn_playback::{EngineConfig, PlaybackEngine, PlaybackInput, WaitingReason};
//!
//! let mut engine = PlaybackEngine::new(EngineConfig::default());
//! let (commands, mut waiting) = engine.start();
//!
//! loop {
//!     // 宿主执行 commands...
//!
//!     let input = match waiting {
//!         WaitingReason::WaitForChapter { chapter_id } => {
//!             Some(fetch_chapter(&chapter_id))
//!         }
//!         WaitingReason::WaitForTick(duration) => {
//!             sleep(duration);
//!             None
//!         }
//!         WaitingReason::WaitForChoice { .. } => wait_for_choice(),
//!         // ...
//!     };
//!
//!     let (commands, next) = engine.tick(input)?;
//!     waiting = next;
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`chapter`]：章节/场景/选项数据模型
//! - [`command`]：Command 定义
//! - [`input`]：PlaybackInput 定义
//! - [`state`]：指针、阶段和等待模型
//! - [`typewriter`]：逐字揭示组件
//! - [`transition`]：资源过渡协调器
//! - [`save`]：存档数据契约
//! - [`diagnostic`]：章节静态检查
//! - [`error`]：错误类型定义
//! - [`runtime`]：状态机引擎

pub mod assets;
pub mod chapter;
pub mod command;
pub mod diagnostic;
pub mod error;
pub mod input;
pub mod runtime;
pub mod save;
pub mod state;
pub mod transition;
pub mod typewriter;

// 重导出核心类型
pub use assets::{AssetRef, normalize_logical_path, resolve_asset_path};
pub use chapter::{Chapter, Choice, ChoiceTarget, DEFAULT_SCENE, Scene};
pub use command::{ChoiceItem, Command};
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_chapter, extract_asset_references,
    extract_chapter_references,
};
pub use error::{LoadError, RestoreError, RuntimeError, SaveError};
pub use input::PlaybackInput;
pub use runtime::{EngineConfig, PlaybackEngine};
pub use save::{SAVE_KEY, SaveRecord};
pub use state::{PlaybackPhase, PlaybackPointer, WaitingReason};
pub use transition::{DEFAULT_TRANSITION_TIMEOUT, TransitionCoordinator};
pub use typewriter::{DEFAULT_CHARS_PER_SEC, MIN_TICK_INTERVAL, RevealStep, Typewriter};
