//! # Transition 模块
//!
//! 资源过渡协调器：计划每个场景的背景/立绘切换，跟踪未决过渡，
//! 并承诺**有界完成**。
//!
//! ## 契约
//!
//! - 引用缺失/为空，或解析到与当前相同的位置 -> 立即完成，无视觉效果
//!   （幂等保证，不发指令、不产生等待）
//! - 变化的引用各发一条过渡指令，由宿主并发执行，引擎**联合等待**全部完成
//! - 即使资源加载失败或动画完成回调永远不触发，等待也会在固定上限内结束：
//!   宿主按 `WaitForTransitions.timeout` 回传超时输入，协调器强制完成所有
//!   未决过渡。这是显式的回退策略，不是尽力而为

use std::time::Duration;

use crate::assets::{DEFAULT_ASSET_ROOT, resolve_asset_path};
use crate::chapter::Scene;
use crate::command::Command;

/// 过渡硬超时默认值
///
/// 对应"约 1 秒量级"的有界完成上限。
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_millis(1200);

/// 过渡协调器
///
/// 持有当前显示的资源引用（解析后的路径），据此判断哪些切换是 no-op。
#[derive(Debug, Clone)]
pub struct TransitionCoordinator {
    /// 资源根目录（路径约定前缀）
    asset_root: String,
    /// 当前显示的背景（解析后路径）
    current_background: Option<String>,
    /// 当前显示的立绘（解析后路径）
    current_character: Option<String>,
    /// 未决过渡数量
    pending: usize,
    /// 硬超时
    timeout: Duration,
}

impl TransitionCoordinator {
    /// 创建协调器
    pub fn new() -> Self {
        Self::with_config(DEFAULT_ASSET_ROOT, DEFAULT_TRANSITION_TIMEOUT)
    }

    /// 创建协调器（指定资源根目录与超时）
    pub fn with_config(asset_root: impl Into<String>, timeout: Duration) -> Self {
        Self {
            asset_root: asset_root.into(),
            current_background: None,
            current_character: None,
            pending: 0,
            timeout,
        }
    }

    /// 为一个场景计划过渡
    ///
    /// 返回需要宿主执行的过渡指令；同时把变化的引用记为当前显示。
    /// 背景与立绘引用跨场景（乃至跨章节）保留，场景未提供的层不动。
    pub fn begin_scene(&mut self, scene: &Scene) -> Vec<Command> {
        debug_assert_eq!(self.pending, 0, "上一批过渡必须先结清");

        let mut commands = Vec::new();

        if let Some(path) = Self::plan_layer(
            &self.asset_root,
            &mut self.current_background,
            scene.background.as_deref(),
        ) {
            commands.push(Command::TransitionBackground { path });
        }

        if let Some(path) = Self::plan_layer(
            &self.asset_root,
            &mut self.current_character,
            scene.character.as_deref(),
        ) {
            commands.push(Command::TransitionCharacter { path });
        }

        self.pending = commands.len();
        commands
    }

    /// 单层的过渡决策：变化则返回解析后路径并更新当前引用
    fn plan_layer(
        asset_root: &str,
        current: &mut Option<String>,
        reference: Option<&str>,
    ) -> Option<String> {
        let reference = reference?;
        if reference.is_empty() {
            return None;
        }

        let resolved = resolve_asset_path(asset_root, reference);
        if current.as_deref() == Some(resolved.as_str()) {
            // 解析到同一位置：幂等 no-op
            return None;
        }

        *current = Some(resolved.clone());
        Some(resolved)
    }

    /// 单个过渡完成确认
    ///
    /// 返回是否全部结清。
    pub fn acknowledge(&mut self) -> bool {
        self.pending = self.pending.saturating_sub(1);
        self.pending == 0
    }

    /// 超时强制完成所有未决过渡
    ///
    /// 返回被强制完成的数量。内部自动恢复，不对外构成硬失败。
    pub fn force_complete(&mut self) -> usize {
        let forced = self.pending;
        self.pending = 0;
        forced
    }

    /// 丢弃未决过渡（新的章节加载取代当前场景时）
    pub fn abandon(&mut self) {
        self.pending = 0;
    }

    /// 是否没有未决过渡
    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }

    /// 未决过渡数量
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// 硬超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TransitionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
