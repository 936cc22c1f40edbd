//! # Sound 模块
//!
//! 音效提示。实际播放由宿主实现 [`SoundSink`]。

use serde::{Deserialize, Serialize};

/// 音效提示（来自动画时间轴）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub name: String,
    #[serde(default = "default_volume")]
    pub volume: u32,
    #[serde(default = "default_pitch")]
    pub pitch: u32,
    #[serde(default)]
    pub pan: i32,
}

fn default_volume() -> u32 {
    90
}

fn default_pitch() -> u32 {
    100
}

impl SoundCue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: default_volume(),
            pitch: default_pitch(),
            pan: 0,
        }
    }
}

/// 系统音效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemSound {
    /// 首领倒下（第一段）
    BossCollapse1,
    /// 首领倒下（持续震动段）
    BossCollapse2,
}

/// 音效输出
pub trait SoundSink {
    fn play_se(&mut self, cue: &SoundCue);
    fn play_system(&mut self, sound: SystemSound);

    /// 在 `frames` 帧内淡出所有音乐（BGM/BGS/ME）
    fn fade_out_music(&mut self, frames: u32) {
        let _ = frames;
    }
}

/// 已播放的音效记录
#[derive(Debug, Clone, PartialEq)]
pub enum PlayedSound {
    Se(SoundCue),
    System(SystemSound),
    MusicFadeOut { frames: u32 },
}

/// 只记录不播放的音效输出
#[derive(Debug, Default)]
pub struct SoundLog {
    played: Vec<PlayedSound>,
}

impl SoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> &[PlayedSound] {
        &self.played
    }

    /// 某个系统音效播放的次数
    pub fn count_system(&self, sound: SystemSound) -> usize {
        self.played
            .iter()
            .filter(|p| **p == PlayedSound::System(sound))
            .count()
    }

    /// 某个音效名播放的次数
    pub fn count_se(&self, name: &str) -> usize {
        self.played
            .iter()
            .filter(|p| matches!(p, PlayedSound::Se(cue) if cue.name == name))
            .count()
    }

    pub fn clear(&mut self) {
        self.played.clear();
    }
}

impl SoundSink for SoundLog {
    fn play_se(&mut self, cue: &SoundCue) {
        self.played.push(PlayedSound::Se(cue.clone()));
    }

    fn play_system(&mut self, sound: SystemSound) {
        self.played.push(PlayedSound::System(sound));
    }

    fn fade_out_music(&mut self, frames: u32) {
        self.played.push(PlayedSound::MusicFadeOut { frames });
    }
}
