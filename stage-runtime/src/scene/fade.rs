//! # Fade 模块
//!
//! 场景的全屏淡入淡出遮罩。
//!
//! ## 设计说明
//!
//! 每帧遮罩透明度向目标端推进 `1/剩余帧数` 的比例，
//! 剩余 1 帧时正好到达 0 或 255。持续时间归零后遮罩保持不动，直到下次使用。

use crate::node::{Color, SpriteNode};

/// 普通淡入淡出速度（帧）
pub const FADE_SPEED: u32 = 24;
/// 未指定时长时的默认值
pub const DEFAULT_FADE_DURATION: u32 = 30;

/// 淡入淡出方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeDirection {
    #[default]
    Idle,
    /// 遮罩 255 -> 0，画面显现
    In,
    /// 遮罩 0 -> 255，画面消失
    Out,
}

/// 全屏遮罩
#[derive(Debug)]
pub struct ScreenFade {
    node: SpriteNode,
    direction: FadeDirection,
    duration: u32,
}

impl Default for ScreenFade {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenFade {
    pub fn new() -> Self {
        let node = SpriteNode::new();
        node.set_opacity(0.0);
        node.set_blend_color(Color::BLACK);
        Self {
            node,
            direction: FadeDirection::Idle,
            duration: 0,
        }
    }

    pub fn node(&self) -> &SpriteNode {
        &self.node
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn opacity(&self) -> f32 {
        self.node.opacity()
    }

    pub fn is_fading(&self) -> bool {
        self.duration > 0
    }

    /// 遮罩颜色（白或黑）
    pub fn color(&self) -> Color {
        self.node.blend_color()
    }

    /// 开始淡入，`duration == 0` 时使用默认时长
    pub fn start_in(&mut self, duration: u32, white: bool) {
        self.start(FadeDirection::In, duration, white);
        self.node.set_opacity(255.0);
    }

    /// 开始淡出，`duration == 0` 时使用默认时长
    pub fn start_out(&mut self, duration: u32, white: bool) {
        self.start(FadeDirection::Out, duration, white);
        self.node.set_opacity(0.0);
    }

    fn start(&mut self, direction: FadeDirection, duration: u32, white: bool) {
        self.direction = direction;
        self.duration = if duration == 0 {
            DEFAULT_FADE_DURATION
        } else {
            duration
        };
        self.node
            .set_blend_color(if white { Color::WHITE } else { Color::BLACK });
    }

    /// 推进一帧
    pub fn update(&mut self) {
        if self.duration == 0 {
            return;
        }
        let d = self.duration as f32;
        let opacity = self.node.opacity();
        match self.direction {
            FadeDirection::In => self.node.set_opacity(opacity - opacity / d),
            FadeDirection::Out => self.node.set_opacity(opacity + (255.0 - opacity) / d),
            FadeDirection::Idle => {}
        }
        self.duration -= 1;
    }
}
