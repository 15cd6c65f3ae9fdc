//! # Save 模块
//!
//! 单槽存档的数据契约。
//!
//! ## 设计原则
//!
//! - 存档是 [`PlaybackPointer`] 的持久化快照 + 审计时间戳，
//!   固定版本化键下的扁平 JSON 记录，写入即覆盖
//! - 读取时校验：键缺失 -> `NotFound`；无法解析或缺少必需字段 -> `Corrupt`
//! - 存档结果只影响瞬时状态文本，永远不把引擎推入错误状态

use serde::{Deserialize, Serialize};

use crate::error::{RestoreError, SaveError};
use crate::state::PlaybackPointer;

/// 存档的固定版本化键
///
/// 单槽持久化：键值存储中只有这一个键，格式变更时键随版本号更换。
pub const SAVE_KEY: &str = "vn_save_v1";

/// 存档记录
///
/// 序列化格式与持久化存储中的历史记录对齐：
///
/// ```text
/// { "chapter": "chapter1", "scene": "s3", "savedAt": 1754550000000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// 章节 ID
    #[serde(rename = "chapter", default)]
    pub chapter_id: String,

    /// 场景 ID
    #[serde(rename = "scene", default)]
    pub scene_id: String,

    /// 保存时间（Unix 毫秒）
    #[serde(rename = "savedAt", default)]
    pub saved_at: u64,
}

impl SaveRecord {
    /// 为指针拍摄快照，时间戳取当前时间
    pub fn capture(pointer: &PlaybackPointer) -> Self {
        Self {
            chapter_id: pointer.chapter_id.clone(),
            scene_id: pointer.scene_id.clone(),
            saved_at: unix_millis_now(),
        }
    }

    /// 还原为指针坐标
    pub fn pointer(&self) -> PlaybackPointer {
        PlaybackPointer::new(&self.chapter_id, &self.scene_id)
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(|e| SaveError::Serialization(e.to_string()))
    }

    /// 从 JSON 字符串解析并校验
    ///
    /// 必需字段（chapter / scene）缺失或为空都视为损坏，
    /// 与历史记录的宽松写法兼容（字段缺失解析为默认空串后再校验）。
    pub fn from_json(json: &str) -> Result<Self, RestoreError> {
        let record: SaveRecord =
            serde_json::from_str(json).map_err(|e| RestoreError::Corrupt(e.to_string()))?;

        if record.chapter_id.is_empty() {
            return Err(RestoreError::Corrupt("缺少章节 ID".to_string()));
        }
        if record.scene_id.is_empty() {
            return Err(RestoreError::Corrupt("缺少场景 ID".to_string()));
        }

        Ok(record)
    }
}

/// 当前 Unix 时间（毫秒）
///
/// 简单实现，不引入 chrono；格式化展示由宿主负责。
fn unix_millis_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_roundtrip() {
        let pointer = PlaybackPointer::new("c1", "s3");
        let record = SaveRecord::capture(&pointer);

        let json = record.to_json().unwrap();
        let loaded = SaveRecord::from_json(&json).unwrap();

        assert_eq!(loaded, record);
        assert_eq!(loaded.pointer(), pointer);
    }

    #[test]
    fn test_wire_format_field_names() {
        let record = SaveRecord {
            chapter_id: "c1".to_string(),
            scene_id: "s3".to_string(),
            saved_at: 42,
        };

        let json = record.to_json().unwrap();
        assert!(json.contains("\"chapter\":\"c1\""));
        assert!(json.contains("\"scene\":\"s3\""));
        assert!(json.contains("\"savedAt\":42"));
    }

    #[test]
    fn test_missing_scene_is_corrupt() {
        let result = SaveRecord::from_json(r#"{ "chapter": "c1", "savedAt": 42 }"#);
        assert!(matches!(result, Err(RestoreError::Corrupt(_))));
    }

    #[test]
    fn test_empty_chapter_is_corrupt() {
        let result = SaveRecord::from_json(r#"{ "chapter": "", "scene": "s3" }"#);
        assert!(matches!(result, Err(RestoreError::Corrupt(_))));
    }

    #[test]
    fn test_unparseable_record_is_corrupt() {
        assert!(matches!(
            SaveRecord::from_json("{{{"),
            Err(RestoreError::Corrupt(_))
        ));
    }
}
