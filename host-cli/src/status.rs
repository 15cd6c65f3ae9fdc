//! # 瞬时状态行
//!
//! 存档/读档结果的短时展示：设置后在 TTL 内可见，过期自动消失。
//! 纯观察性质，与引擎状态无关。

use std::time::{Duration, Instant};

/// 默认展示时长
pub const DEFAULT_STATUS_TTL: Duration = Duration::from_millis(1500);

/// 瞬时状态行
#[derive(Debug)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
    ttl: Duration,
}

impl StatusLine {
    /// 创建状态行
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_STATUS_TTL)
    }

    /// 创建状态行（指定 TTL）
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { message: None, ttl }
    }

    /// 设置状态消息（覆盖上一条）
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), Instant::now()));
    }

    /// 当前可见的状态消息；过期返回 None 并清除
    pub fn current(&mut self) -> Option<&str> {
        let expired = matches!(&self.message, Some((_, shown_at)) if shown_at.elapsed() >= self.ttl);
        if expired {
            self.message = None;
        }
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    /// 立即清除
    pub fn clear(&mut self) {
        self.message = None;
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_visible_within_ttl() {
        let mut status = StatusLine::new();
        status.show("已保存");
        assert_eq!(status.current(), Some("已保存"));
    }

    #[test]
    fn test_message_expires() {
        let mut status = StatusLine::with_ttl(Duration::ZERO);
        status.show("已保存");
        assert_eq!(status.current(), None);
    }

    #[test]
    fn test_new_message_replaces_old() {
        let mut status = StatusLine::new();
        status.show("已保存");
        status.show("读档失败");
        assert_eq!(status.current(), Some("读档失败"));
    }

    #[test]
    fn test_clear() {
        let mut status = StatusLine::new();
        status.show("已保存");
        status.clear();
        assert_eq!(status.current(), None);
    }
}
