//! # Runtime 模块
//!
//! 播放引擎实现。
//!
//! - [`engine`]：状态机与 tick 驱动

pub mod engine;

pub use engine::{EngineConfig, PlaybackEngine};
