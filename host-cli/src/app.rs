//! # App 模块
//!
//! 协作式驱动循环：按引擎的等待状态逐一满足它——获取章节、执行过渡、
//! 睡过揭示 tick、采集玩家输入——并把产生的指令渲染到终端。
//!
//! 终端没有真正的淡入淡出：过渡指令渲染为一行切换提示后立即确认完成，
//! 天然落在过渡的有界完成上限之内。

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, UNIX_EPOCH};

use vn_playback::{
    Command, DiagnosticLevel, EngineConfig, PlaybackEngine, PlaybackInput, WaitingReason,
    analyze_chapter,
};

use crate::chapter_store::{ChapterStore, FsChapterSource};
use crate::persistence::{FsKeyValueStore, PersistenceManager};
use crate::status::StatusLine;

/// 宿主配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 章节文档目录
    pub chapters_dir: PathBuf,
    /// 存档目录
    pub saves_dir: PathBuf,
    /// 资源根目录（路径约定前缀）
    pub asset_root: String,
    /// 启动章节
    pub start_chapter: String,
    /// 启动场景；None 用章节默认场景
    pub start_scene: Option<String>,
    /// 文本揭示速率（字符/秒）
    pub chars_per_sec: f64,
}

/// 选择提示的玩家动作
enum PlayerAction {
    /// 选中第 index 个选项（从 0 开始）
    Choose(usize),
    /// 存档
    Save,
    /// 读档
    Load,
    /// 退出
    Quit,
    /// 无效输入，重新提示
    Invalid,
}

/// 终端宿主
pub struct App {
    engine: PlaybackEngine,
    store: ChapterStore,
    persistence: PersistenceManager<FsKeyValueStore>,
    status: StatusLine,
    /// 当前场景的选项标签（渲染用副本；路由仍在引擎内）
    choices: Vec<String>,
}

impl App {
    /// 创建宿主
    pub fn new(config: AppConfig) -> Self {
        let engine = PlaybackEngine::new(EngineConfig {
            start_chapter: config.start_chapter,
            start_scene: config.start_scene,
            chars_per_sec: config.chars_per_sec,
            asset_root: config.asset_root,
            ..EngineConfig::default()
        });

        Self {
            engine,
            store: ChapterStore::new(FsChapterSource::new(config.chapters_dir)),
            persistence: PersistenceManager::new(FsKeyValueStore::new(config.saves_dir)),
            status: StatusLine::new(),
            choices: Vec::new(),
        }
    }

    /// 主循环：驱动引擎直到玩家退出
    pub fn run(&mut self) -> anyhow::Result<()> {
        let (commands, mut waiting) = self.engine.start();
        self.render(&commands);

        loop {
            match waiting.clone() {
                WaitingReason::WaitForChapter { chapter_id } => {
                    let input = self.fulfill_chapter_request(chapter_id);
                    waiting = self.step(Some(input))?;
                }

                WaitingReason::WaitForTransitions { .. } => {
                    // 切换已渲染完毕，逐个确认；真实渲染宿主在 timeout 内回报，
                    // 否则回传 TransitionTimeout
                    waiting = self.step(Some(PlaybackInput::TransitionFinished))?;
                }

                WaitingReason::WaitForTick(interval) => {
                    thread::sleep(interval);
                    waiting = self.step(None)?;
                }

                WaitingReason::WaitForChoice { choice_count } => {
                    match self.prompt_player(choice_count)? {
                        PlayerAction::Choose(index) => {
                            // 选择路由错误（如悬空场景目标）不致命：提示后留在原地
                            match self.engine.tick(Some(PlaybackInput::choice(index))) {
                                Ok((commands, next)) => {
                                    self.render(&commands);
                                    waiting = next;
                                }
                                Err(e) => {
                                    tracing::error!(%e, "选项路由失败");
                                    self.status.show(e.to_string());
                                }
                            }
                        }
                        PlayerAction::Save => self.save_game(),
                        PlayerAction::Load => {
                            if let Some(next) = self.try_load_save() {
                                waiting = next;
                            }
                        }
                        PlayerAction::Quit => return Ok(()),
                        PlayerAction::Invalid => {}
                    }
                }

                WaitingReason::None => {
                    if self.engine.phase().is_error() {
                        // Error 终态：唯一的恢复路径是重新加载（这里是读档）
                        match self.prompt_recovery()? {
                            PlayerAction::Load => {
                                if let Some(next) = self.try_load_save() {
                                    waiting = next;
                                }
                            }
                            PlayerAction::Quit => return Ok(()),
                            _ => {}
                        }
                    } else {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// tick 一次并渲染产生的指令
    fn step(&mut self, input: Option<PlaybackInput>) -> anyhow::Result<WaitingReason> {
        let (commands, waiting) = self.engine.tick(input)?;
        self.render(&commands);
        Ok(waiting)
    }

    /// 满足章节获取请求
    fn fulfill_chapter_request(&self, chapter_id: String) -> PlaybackInput {
        match self.store.load(&chapter_id) {
            Ok(chapter) => {
                // 静态检查只记录，不阻断播放
                let report = analyze_chapter(&chapter_id, &chapter);
                for diagnostic in &report.diagnostics {
                    match diagnostic.level {
                        DiagnosticLevel::Error => tracing::error!("{diagnostic}"),
                        DiagnosticLevel::Warn => tracing::warn!("{diagnostic}"),
                        DiagnosticLevel::Info => tracing::debug!("{diagnostic}"),
                    }
                }
                PlaybackInput::chapter_loaded(chapter_id, chapter)
            }
            Err(error) => PlaybackInput::chapter_failed(chapter_id, error),
        }
    }

    /// 渲染指令
    fn render(&mut self, commands: &[Command]) {
        for command in commands {
            match command {
                // 由 WaitForChapter 分支处理
                Command::RequestChapter { .. } => {}

                Command::TransitionBackground { path } => println!("〔背景 ⇢ {path}〕"),
                Command::TransitionCharacter { path } => println!("〔立绘 ⇢ {path}〕"),

                Command::ClearText => println!(),
                Command::RevealText { prefix } => {
                    // 前缀递增，回车覆盖同一行
                    print!("\r{prefix}");
                    let _ = io::stdout().flush();
                }

                Command::PresentChoices { choices } => {
                    self.choices = choices.iter().map(|c| c.label.clone()).collect();
                }
                Command::EnableChoices => {
                    println!();
                    for (index, label) in self.choices.iter().enumerate() {
                        println!("  {}. {label}", index + 1);
                    }
                }
                Command::ClearChoices => self.choices.clear(),

                Command::ShowLoadError { message } => println!("⚠ {message}"),
            }
        }
    }

    /// 选择提示
    fn prompt_player(&mut self, choice_count: usize) -> io::Result<PlayerAction> {
        if let Some(message) = self.status.current() {
            println!("〔{message}〕");
        }
        if choice_count == 0 {
            println!("（故事到此为止）");
        }
        print!("> 选项编号，或 s 存档 / l 读档 / q 退出: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(PlayerAction::Quit);
        }

        let trimmed = line.trim();
        Ok(match trimmed {
            "s" => PlayerAction::Save,
            "l" => PlayerAction::Load,
            "q" => PlayerAction::Quit,
            _ => match trimmed.parse::<usize>() {
                Ok(n) if n >= 1 && n <= choice_count => PlayerAction::Choose(n - 1),
                _ => {
                    println!("无效输入");
                    PlayerAction::Invalid
                }
            },
        })
    }

    /// Error 终态的恢复提示
    fn prompt_recovery(&mut self) -> io::Result<PlayerAction> {
        if let Some(message) = self.status.current() {
            println!("〔{message}〕");
        }
        print!("> l 读档 / q 退出: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(PlayerAction::Quit);
        }

        Ok(match line.trim() {
            "l" => PlayerAction::Load,
            "q" => PlayerAction::Quit,
            _ => PlayerAction::Invalid,
        })
    }

    /// 存档当前进度，结果进入瞬时状态行
    fn save_game(&mut self) {
        match self.engine.pointer() {
            Some(pointer) => match self.persistence.save(pointer) {
                Ok(record) => self
                    .status
                    .show(format!("已保存（{}）", format_saved_at(record.saved_at))),
                Err(e) => self.status.show(format!("保存失败: {e}")),
            },
            None => self.status.show("当前没有可保存的进度"),
        }
    }

    /// 读档并驱动引擎重新加载
    ///
    /// 失败（无存档/损坏/存储错误）只进入瞬时状态行，播放停在原处。
    fn try_load_save(&mut self) -> Option<WaitingReason> {
        match self.persistence.load() {
            Ok(record) => {
                self.status
                    .show(format!("已读档（{}）", format_saved_at(record.saved_at)));
                let (commands, waiting) = self
                    .engine
                    .load_chapter_at(record.chapter_id, Some(record.scene_id));
                self.render(&commands);
                Some(waiting)
            }
            Err(e) => {
                tracing::warn!(%e, "读档失败");
                self.status.show(e.to_string());
                None
            }
        }
    }
}

/// 把存档时间戳格式化为本地时间
fn format_saved_at(millis: u64) -> String {
    let time = UNIX_EPOCH + Duration::from_millis(millis);
    chrono::DateTime::<chrono::Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
