//! # Typewriter 模块
//!
//! 文本逐字揭示组件。
//!
//! ## 契约
//!
//! - 严格从左到右，每个 tick 多揭示一个字符（Unicode 标量，不按字节切）
//! - tick 间隔 = `max(最小间隔下限, 1/速率)`
//! - 长度为 n 的文本自然揭示恰好产生 n+1 个递增前缀
//!   （起始的空前缀 + 每个 tick 一个）
//! - 同一时刻最多一个活动揭示：`start` 隐式取消并清空上一个
//! - **取消清空**（cancel）：中止并留下空白输出
//! - **取消补全**（skip）：中止但立即给出完整文本；非揭示中调用是 no-op

use std::time::Duration;

/// 默认揭示速率（字符/秒）
pub const DEFAULT_CHARS_PER_SEC: f64 = 45.0;

/// tick 间隔下限
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// 单次 tick 的揭示结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStep {
    /// 揭示又前进了一个字符，附当前前缀
    Progress(String),
    /// 本 tick 揭示了最后一个字符，附完整文本
    Done(String),
}

impl RevealStep {
    /// 取出前缀文本
    pub fn prefix(&self) -> &str {
        match self {
            Self::Progress(s) | Self::Done(s) => s,
        }
    }

    /// 是否揭示完毕
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// 逐字揭示组件
///
/// 本身不持有计时器：引擎通过 [`Typewriter::interval`] 告知宿主等待多久，
/// 宿主等待后再驱动 [`Typewriter::tick`]，组件不需要知道真实时间流逝。
#[derive(Debug, Clone)]
pub struct Typewriter {
    /// 完整文本（按 Unicode 标量拆分）
    chars: Vec<char>,
    /// 已揭示的字符数
    shown: usize,
    /// tick 间隔
    interval: Duration,
    /// 是否正在揭示
    active: bool,
}

impl Typewriter {
    /// 创建空闲的组件
    pub fn new() -> Self {
        Self {
            chars: Vec::new(),
            shown: 0,
            interval: MIN_TICK_INTERVAL,
            active: false,
        }
    }

    /// 开始揭示
    ///
    /// 隐式取消并清空任何进行中的揭示。空文本立即完成（不产生活动揭示）。
    ///
    /// # 参数
    ///
    /// - `text`: 要揭示的文本（允许为空）
    /// - `rate`: 速率（字符/秒）；None 或非正值回退到默认速率
    pub fn start(&mut self, text: &str, rate: Option<f64>) {
        self.cancel();

        let cps = rate.filter(|r| *r > 0.0).unwrap_or(DEFAULT_CHARS_PER_SEC);
        self.interval = Duration::from_secs_f64(1.0 / cps).max(MIN_TICK_INTERVAL);
        self.chars = text.chars().collect();
        self.shown = 0;
        self.active = !self.chars.is_empty();
    }

    /// 推进一个 tick
    ///
    /// 非揭示中返回 None。
    pub fn tick(&mut self) -> Option<RevealStep> {
        if !self.active {
            return None;
        }

        self.shown += 1;
        let prefix: String = self.chars[..self.shown].iter().collect();

        if self.shown >= self.chars.len() {
            self.active = false;
            Some(RevealStep::Done(prefix))
        } else {
            Some(RevealStep::Progress(prefix))
        }
    }

    /// 取消补全：中止揭示并立即返回完整文本
    ///
    /// 只在揭示中有意义，否则是 no-op（返回 None）。
    pub fn skip(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }

        self.shown = self.chars.len();
        self.active = false;
        Some(self.chars.iter().collect())
    }

    /// 取消清空：中止揭示并丢弃文本
    pub fn cancel(&mut self) {
        self.chars.clear();
        self.shown = 0;
        self.active = false;
    }

    /// 是否正在揭示
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 当前 tick 间隔
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}
