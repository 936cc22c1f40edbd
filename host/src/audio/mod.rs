//! # Audio 模块
//!
//! 无输出设备的音频管理：记录 BGM / ME 状态和播放过的音效。
//!
//! ## 功能特性
//!
//! - BGM / ME：切换、停止、按帧淡出
//! - SE：记录播放历史（供测试与轨迹日志读取）
//! - 实现 [`SoundSink`]，直接交给战斗画面和场景使用

use stage_runtime::{PlayedSound, SoundCue, SoundLog, SoundSink, SystemSound};
use tracing::{debug, trace};

/// 音乐淡出状态
#[derive(Debug, Clone, Copy, PartialEq)]
struct MusicFade {
    remaining: u32,
    total: u32,
}

/// 音频管理器
#[derive(Debug, Default)]
pub struct AudioManager {
    /// 当前 BGM
    current_bgm: Option<String>,
    /// 当前 ME
    current_me: Option<String>,
    /// 音乐音量 (0.0 - 1.0)，淡出时下降
    music_volume: f32,
    fade: Option<MusicFade>,
    /// 音效历史
    log: SoundLog,
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            music_volume: 1.0,
            ..Default::default()
        }
    }

    /// 播放 BGM（同名时不重新开始）
    pub fn play_bgm(&mut self, name: &str) {
        if self.current_bgm.as_deref() == Some(name) && self.fade.is_none() {
            return;
        }
        debug!(bgm = name, "播放 BGM");
        self.current_bgm = Some(name.to_string());
        self.music_volume = 1.0;
        self.fade = None;
    }

    pub fn stop_bgm(&mut self) {
        if let Some(bgm) = self.current_bgm.take() {
            debug!(bgm = %bgm, "停止 BGM");
        }
    }

    pub fn play_me(&mut self, name: &str) {
        debug!(me = name, "播放 ME");
        self.current_me = Some(name.to_string());
    }

    pub fn stop_me(&mut self) {
        self.current_me = None;
    }

    /// 停止所有音乐
    pub fn stop_all(&mut self) {
        self.stop_bgm();
        self.stop_me();
        self.fade = None;
        self.music_volume = 1.0;
    }

    pub fn current_bgm(&self) -> Option<&str> {
        self.current_bgm.as_deref()
    }

    pub fn current_me(&self) -> Option<&str> {
        self.current_me.as_deref()
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// 播放历史
    pub fn history(&self) -> &[PlayedSound] {
        self.log.played()
    }

    /// 某个音效名播放的次数
    pub fn count_se(&self, name: &str) -> usize {
        self.log.count_se(name)
    }

    pub fn count_system(&self, sound: SystemSound) -> usize {
        self.log.count_system(sound)
    }

    /// 推进一帧（音乐淡出）
    pub fn update(&mut self) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        fade.remaining = fade.remaining.saturating_sub(1);
        self.music_volume = fade.remaining as f32 / fade.total.max(1) as f32;
        if fade.remaining == 0 {
            self.fade = None;
            self.current_bgm = None;
            self.current_me = None;
            self.music_volume = 1.0;
            debug!("音乐淡出结束");
        }
    }
}

impl SoundSink for AudioManager {
    fn play_se(&mut self, cue: &SoundCue) {
        trace!(se = %cue.name, volume = cue.volume, pitch = cue.pitch, "播放 SE");
        self.log.play_se(cue);
    }

    fn play_system(&mut self, sound: SystemSound) {
        trace!(?sound, "播放系统音效");
        self.log.play_system(sound);
    }

    fn fade_out_music(&mut self, frames: u32) {
        self.log.fade_out_music(frames);
        if self.current_bgm.is_none() && self.current_me.is_none() {
            return;
        }
        if frames == 0 {
            self.stop_all();
            return;
        }
        debug!(frames, "音乐淡出");
        self.fade = Some(MusicFade {
            remaining: frames,
            total: frames,
        });
    }
}
