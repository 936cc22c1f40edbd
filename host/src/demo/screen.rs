//! 画面状态（闪光、缩放、亮度）

use stage_runtime::{Color, ScreenState, Zoom};

/// 画面状态及其逐帧变化
#[derive(Debug, Clone, Default)]
pub struct GameScreen {
    state: ScreenState,
    flash_duration: u32,
    fade_out_duration: u32,
    fade_in_duration: u32,
}

impl GameScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// 开始闪光，alpha 在 `duration` 帧内衰减到 0
    pub fn start_flash(&mut self, color: Color, duration: u32) {
        self.state.flash_color = color;
        self.flash_duration = duration;
    }

    pub fn set_zoom(&mut self, x: f32, y: f32, scale: f32) {
        self.state.zoom = Zoom { x, y, scale };
    }

    pub fn clear_zoom(&mut self) {
        self.state.zoom = Zoom::default();
    }

    pub fn start_fade_out(&mut self, duration: u32) {
        self.fade_out_duration = duration;
        self.fade_in_duration = 0;
    }

    pub fn start_fade_in(&mut self, duration: u32) {
        self.fade_in_duration = duration;
        self.fade_out_duration = 0;
    }

    /// 战斗开始时清除残留的闪光与缩放
    pub fn on_battle_start(&mut self) {
        self.state.clear();
        self.flash_duration = 0;
    }

    /// 推进一帧
    pub fn update(&mut self) {
        if self.flash_duration > 0 {
            let d = self.flash_duration as f32;
            self.state.flash_color.a *= (d - 1.0) / d;
            self.flash_duration -= 1;
        }
        if self.fade_out_duration > 0 {
            let d = self.fade_out_duration as f32;
            self.state.brightness *= (d - 1.0) / d;
            self.fade_out_duration -= 1;
        }
        if self.fade_in_duration > 0 {
            let d = self.fade_in_duration as f32;
            self.state.brightness = (self.state.brightness * (d - 1.0) + 255.0) / d;
            self.fade_in_duration -= 1;
        }
    }
}
