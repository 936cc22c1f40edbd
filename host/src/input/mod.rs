//! # Input 模块
//!
//! 无渲染运行下的输入：按帧号排好的脚本指令。
//!
//! ## 设计说明
//!
//! - 指令写成 `帧号:指令`，例如 `120:attack`
//! - 到达帧号后指令进入待处理队列，由场景按名称消费
//! - 场景忙时指令保留，超过 [`COMMAND_TTL`] 帧仍未消费则丢弃

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

/// 指令未被消费时保留的帧数
pub const COMMAND_TTL: u64 = 120;

/// 输入指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    /// 确认（游戏结束画面返回标题）
    Ok,
    /// 取消（关闭菜单）
    Cancel,
    NewGame,
    Continue,
    Options,
    Exit,
    /// 地图上打开菜单
    Menu,
    /// 地图上立即遇敌
    Encounter,
    Attack,
    Guard,
    Escape,
    /// 读档画面确认读取
    Load,
    /// 回到标题
    Title,
}

impl InputCommand {
    pub const ALL: [InputCommand; 13] = [
        InputCommand::Ok,
        InputCommand::Cancel,
        InputCommand::NewGame,
        InputCommand::Continue,
        InputCommand::Options,
        InputCommand::Exit,
        InputCommand::Menu,
        InputCommand::Encounter,
        InputCommand::Attack,
        InputCommand::Guard,
        InputCommand::Escape,
        InputCommand::Load,
        InputCommand::Title,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InputCommand::Ok => "ok",
            InputCommand::Cancel => "cancel",
            InputCommand::NewGame => "new_game",
            InputCommand::Continue => "continue",
            InputCommand::Options => "options",
            InputCommand::Exit => "exit",
            InputCommand::Menu => "menu",
            InputCommand::Encounter => "encounter",
            InputCommand::Attack => "attack",
            InputCommand::Guard => "guard",
            InputCommand::Escape => "escape",
            InputCommand::Load => "load",
            InputCommand::Title => "title",
        }
    }
}

impl fmt::Display for InputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputCommand {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or(InputError::UnknownCommand { name })
    }
}

/// 输入脚本错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("指令格式应为 帧号:指令，实际为 '{entry}'")]
    MalformedEntry { entry: String },

    #[error("无效的帧号 '{value}'")]
    InvalidFrame { value: String },

    #[error("未知指令 '{name}'")]
    UnknownCommand { name: String },
}

/// 解析一条 `帧号:指令`
pub fn parse_entry(entry: &str) -> Result<(u64, InputCommand), InputError> {
    let (frame, command) = entry
        .split_once(':')
        .ok_or_else(|| InputError::MalformedEntry {
            entry: entry.to_string(),
        })?;
    let frame = frame
        .trim()
        .parse::<u64>()
        .map_err(|_| InputError::InvalidFrame {
            value: frame.to_string(),
        })?;
    Ok((frame, command.parse()?))
}

/// 输入管理器
#[derive(Debug, Default)]
pub struct InputManager {
    /// 尚未到达的指令（帧号 -> 指令）
    script: BTreeMap<u64, Vec<InputCommand>>,
    /// 已到达、等待消费的指令（到达帧号，指令）
    pending: VecDeque<(u64, InputCommand)>,
    frame: u64,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `帧号:指令` 列表创建
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, InputError> {
        let mut input = Self::new();
        for entry in entries {
            let (frame, command) = parse_entry(entry.as_ref())?;
            input.schedule(frame, command);
        }
        Ok(input)
    }

    /// 安排在指定帧到达的指令
    pub fn schedule(&mut self, frame: u64, command: InputCommand) {
        self.script.entry(frame).or_default().push(command);
    }

    /// 立即加入待处理队列
    pub fn press(&mut self, command: InputCommand) {
        self.pending.push_back((self.frame, command));
    }

    /// 进入新的一帧：到达的指令入队，过期的丢弃
    pub fn begin_frame(&mut self, frame: u64) {
        self.frame = frame;
        let due: Vec<u64> = self.script.range(..=frame).map(|(f, _)| *f).collect();
        for f in due {
            if let Some(commands) = self.script.remove(&f) {
                for command in commands {
                    debug!(frame, %command, "指令到达");
                    self.pending.push_back((frame, command));
                }
            }
        }
        self.pending.retain(|(arrived, command)| {
            let keep = frame.saturating_sub(*arrived) < COMMAND_TTL;
            if !keep {
                debug!(frame, %command, "指令过期，丢弃");
            }
            keep
        });
    }

    /// 消费一条指定的指令
    pub fn trigger(&mut self, command: InputCommand) -> bool {
        match self.pending.iter().position(|(_, c)| *c == command) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// 消费候选列表中最早到达的一条
    pub fn trigger_any(&mut self, commands: &[InputCommand]) -> Option<InputCommand> {
        let index = self
            .pending
            .iter()
            .position(|(_, c)| commands.contains(c))?;
        self.pending.remove(index).map(|(_, c)| c)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 脚本中的指令是否已全部到达并被消费
    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty() && self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        assert_eq!(parse_entry("120:attack"), Ok((120, InputCommand::Attack)));
        assert_eq!(
            parse_entry(" 5 : New-Game "),
            Ok((5, InputCommand::NewGame))
        );
        assert!(matches!(
            parse_entry("attack"),
            Err(InputError::MalformedEntry { .. })
        ));
        assert!(matches!(
            parse_entry("x:attack"),
            Err(InputError::InvalidFrame { .. })
        ));
        assert_eq!(
            parse_entry("3:dance"),
            Err(InputError::UnknownCommand {
                name: "dance".to_string()
            })
        );
    }

    #[test]
    fn test_commands_arrive_on_frame() {
        let mut input = InputManager::from_entries(&["2:menu", "2:cancel", "4:ok"]).unwrap();
        input.begin_frame(1);
        assert!(!input.trigger(InputCommand::Menu));
        input.begin_frame(2);
        assert_eq!(input.pending_count(), 2);
        assert!(input.trigger(InputCommand::Cancel));
        assert!(input.trigger(InputCommand::Menu));
        assert!(!input.trigger(InputCommand::Menu));
        input.begin_frame(4);
        assert!(input.trigger(InputCommand::Ok));
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_unconsumed_commands_expire() {
        let mut input = InputManager::from_entries(&["0:attack"]).unwrap();
        input.begin_frame(0);
        input.begin_frame(COMMAND_TTL - 1);
        assert_eq!(input.pending_count(), 1);
        input.begin_frame(COMMAND_TTL);
        assert_eq!(input.pending_count(), 0);
    }

    #[test]
    fn test_trigger_any_takes_earliest() {
        let mut input = InputManager::new();
        input.press(InputCommand::Guard);
        input.press(InputCommand::Attack);
        assert_eq!(
            input.trigger_any(&[InputCommand::Attack, InputCommand::Guard]),
            Some(InputCommand::Guard)
        );
        assert_eq!(input.trigger_any(&[InputCommand::Escape]), None);
    }
}
