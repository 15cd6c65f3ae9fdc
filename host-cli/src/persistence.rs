//! # Persistence 模块
//!
//! 单槽存档的持久化管理：把 [`SaveRecord`] 写入/读出耐久键值存储。
//!
//! ## 设计原则
//!
//! - 存储抽象为 [`KeyValueStore`]，文件系统实现为每个键一个文件
//! - 固定版本化键 [`SAVE_KEY`]，写入即覆盖（单槽）
//! - 读取校验在核心的 `SaveRecord::from_json` 中完成；
//!   这里只负责把存储层错误映射进错误分类

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use vn_playback::{PlaybackPointer, RestoreError, SAVE_KEY, SaveError, SaveRecord};

/// 键值存储错误
#[derive(Error, Debug)]
pub enum StorageError {
    /// 读取失败
    #[error("存储读取失败: {0}")]
    Read(String),

    /// 写入失败
    #[error("存储写入失败: {0}")]
    Write(String),
}

/// 耐久键值存储 trait
///
/// 引擎的持久化契约只需要按键读写字符串；键缺失不是错误。
pub trait KeyValueStore {
    /// 读取键对应的值，键不存在返回 `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 写入键值，覆盖已有值
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// 文件系统键值存储
///
/// 每个键对应 `<dir>/<key>.json` 一个文件。
#[derive(Debug, Clone)]
pub struct FsKeyValueStore {
    /// 存档目录
    dir: PathBuf,
}

impl FsKeyValueStore {
    /// 创建文件系统键值存储
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FsKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::Write(e.to_string()))?;
        std::fs::write(self.key_path(key), value).map_err(|e| StorageError::Write(e.to_string()))
    }
}

/// 存档管理器
///
/// 存读结果只用于瞬时状态展示，永远不影响引擎状态：
/// 失败的存档/读档让播放停留在原处。
pub struct PersistenceManager<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceManager<S> {
    /// 创建存档管理器
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 保存当前播放位置（覆盖之前的存档）
    pub fn save(&self, pointer: &PlaybackPointer) -> Result<SaveRecord, SaveError> {
        let record = SaveRecord::capture(pointer);
        let json = record.to_json()?;
        self.store
            .set(SAVE_KEY, &json)
            .map_err(|e| SaveError::Storage(e.to_string()))?;

        tracing::info!(
            chapter_id = %record.chapter_id,
            scene_id = %record.scene_id,
            "存档已写入"
        );
        Ok(record)
    }

    /// 读取存档
    pub fn load(&self) -> Result<SaveRecord, RestoreError> {
        let json = self
            .store
            .get(SAVE_KEY)
            .map_err(|e| RestoreError::Storage(e.to_string()))?
            .ok_or(RestoreError::NotFound)?;

        SaveRecord::from_json(&json)
    }
}
