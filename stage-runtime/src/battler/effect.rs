//! # Effect 模块
//!
//! 战斗者的定时视觉效果（出现、消失、闪白、闪烁、倒下等）。
//!
//! 效果作用于战斗者的根节点：透明度、混合模式、混合色与震动偏移。
//! 开始任何效果前都会先复原这些状态。

use tracing::debug;

use crate::node::{BlendMode, Color, SpriteNode};
use crate::sound::{SoundSink, SystemSound};

/// 效果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectKind {
    #[default]
    None,
    Appear,
    Disappear,
    Whiten,
    Blink,
    Collapse,
    BossCollapse,
    InstantCollapse,
}

impl EffectKind {
    /// 从名称解析（camelCase）
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "appear" => Some(EffectKind::Appear),
            "disappear" => Some(EffectKind::Disappear),
            "whiten" => Some(EffectKind::Whiten),
            "blink" => Some(EffectKind::Blink),
            "collapse" => Some(EffectKind::Collapse),
            "bossCollapse" => Some(EffectKind::BossCollapse),
            "instantCollapse" => Some(EffectKind::InstantCollapse),
            _ => None,
        }
    }
}

/// 效果状态
///
/// `kind == None` 当且仅当 `remaining == 0`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectState {
    kind: EffectKind,
    remaining: u32,
    appeared: bool,
    shake: f32,
}

impl EffectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn appeared(&self) -> bool {
        self.appeared
    }

    pub fn set_appeared(&mut self, appeared: bool) {
        self.appeared = appeared;
    }

    /// 当前震动偏移（首领倒下时左右摇晃）
    pub fn shake(&self) -> f32 {
        self.shake
    }

    pub fn is_effecting(&self) -> bool {
        self.kind != EffectKind::None
    }

    /// 开始效果，替换正在进行的效果
    ///
    /// # 参数
    /// - `node`: 效果作用的节点
    /// - `height`: 精灵像素高度，决定首领倒下的持续时间
    pub fn start(&mut self, kind: EffectKind, node: &SpriteNode, height: u32) {
        let (remaining, appeared) = match kind {
            EffectKind::None => return,
            EffectKind::Appear => (16, Some(true)),
            EffectKind::Disappear => (32, Some(false)),
            EffectKind::Whiten => (16, None),
            EffectKind::Blink => (20, None),
            EffectKind::Collapse => (32, Some(false)),
            EffectKind::BossCollapse => (height, Some(false)),
            EffectKind::InstantCollapse => (16, Some(false)),
        };
        debug!(effect = ?kind, duration = remaining, "开始效果");

        self.remaining = remaining;
        if let Some(appeared) = appeared {
            self.appeared = appeared;
        }
        self.kind = if remaining > 0 { kind } else { EffectKind::None };
        self.revert_to_normal(node);
    }

    /// 复原震动、混合模式、透明度与混合色
    pub fn revert_to_normal(&mut self, node: &SpriteNode) {
        self.shake = 0.0;
        node.set_blend_mode(BlendMode::Normal);
        node.set_opacity(255.0);
        node.set_blend_color(Color::CLEAR);
    }

    /// 推进一帧
    pub fn update(&mut self, node: &SpriteNode, sound: &mut dyn SoundSink) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        let d = self.remaining;

        match self.kind {
            EffectKind::Whiten => {
                let alpha = 128.0 - (16.0 - d as f32) * 10.0;
                node.set_blend_color(Color::new(255.0, 255.0, 255.0, alpha.max(0.0)));
            }
            EffectKind::Blink => {
                node.set_opacity(if d % 10 < 5 { 255.0 } else { 0.0 });
            }
            EffectKind::Appear => {
                node.set_opacity((16.0 - d as f32) * 16.0);
            }
            EffectKind::Disappear => {
                node.set_opacity(256.0 - (32.0 - d as f32) * 10.0);
            }
            EffectKind::Collapse => {
                node.set_blend_mode(BlendMode::Add);
                node.set_blend_color(Color::new(255.0, 128.0, 128.0, 128.0));
                node.set_opacity(decay(node.opacity(), d));
            }
            EffectKind::BossCollapse => {
                self.shake = (d % 2) as f32 * 4.0 - 2.0;
                node.set_blend_mode(BlendMode::Add);
                let opacity = decay(node.opacity(), d);
                node.set_opacity(opacity);
                node.set_blend_color(Color::new(255.0, 255.0, 255.0, 255.0 - opacity));
                if d % 20 == 19 {
                    sound.play_system(SystemSound::BossCollapse2);
                }
            }
            EffectKind::InstantCollapse => {
                node.set_opacity(0.0);
            }
            EffectKind::None => {}
        }

        if self.remaining == 0 {
            self.kind = EffectKind::None;
            self.shake = 0.0;
        }
    }
}

/// `opacity * d / (d + 1)`
fn decay(opacity: f32, d: u32) -> f32 {
    let d = d as f32;
    opacity * d / (d + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::SoundLog;

    #[test]
    fn test_collapse_decay_recurrence() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.set_appeared(true);
        effect.start(EffectKind::Collapse, &node, 0);
        assert_eq!(effect.remaining(), 32);
        assert!(!effect.appeared());
        assert_eq!(node.opacity(), 255.0);

        let mut expected = 255.0f32;
        for d in [31.0f32, 30.0, 29.0] {
            effect.update(&node, &mut sound);
            expected = expected * d / (d + 1.0);
            assert_eq!(node.opacity(), expected);
            assert_eq!(node.blend_mode(), BlendMode::Add);
        }
        assert!((node.opacity() - 255.0 * 29.0 / 32.0).abs() < 1e-3);
    }

    #[test]
    fn test_boss_collapse_duration_is_height() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::BossCollapse, &node, 40);
        assert_eq!(effect.remaining(), 40);

        let mut ticks = 0;
        while effect.is_effecting() {
            effect.update(&node, &mut sound);
            ticks += 1;
        }
        assert_eq!(ticks, 40);
        assert_eq!(node.opacity(), 0.0);
        // d = 39, 19 时各播放一次
        assert_eq!(sound.count_system(SystemSound::BossCollapse2), 2);
        assert_eq!(effect.shake(), 0.0);
    }

    #[test]
    fn test_boss_collapse_shakes() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::BossCollapse, &node, 10);
        effect.update(&node, &mut sound);
        // d = 9
        assert_eq!(effect.shake(), 2.0);
        effect.update(&node, &mut sound);
        assert_eq!(effect.shake(), -2.0);
    }

    #[test]
    fn test_zero_height_boss_collapse_stays_idle() {
        let node = SpriteNode::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::BossCollapse, &node, 0);
        assert_eq!(effect.kind(), EffectKind::None);
        assert_eq!(effect.remaining(), 0);
    }

    #[test]
    fn test_appear_ramps_up() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::Appear, &node, 0);
        assert!(effect.appeared());
        effect.update(&node, &mut sound);
        assert_eq!(node.opacity(), 16.0);
        for _ in 0..15 {
            effect.update(&node, &mut sound);
        }
        assert_eq!(node.opacity(), 255.0);
        assert_eq!(effect.kind(), EffectKind::None);
    }

    #[test]
    fn test_disappear_ramps_down() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.set_appeared(true);
        effect.start(EffectKind::Disappear, &node, 0);
        assert!(!effect.appeared());
        effect.update(&node, &mut sound);
        // 256 - (32 - 31) * 10
        assert_eq!(node.opacity(), 246.0);
        for _ in 0..31 {
            effect.update(&node, &mut sound);
        }
        assert_eq!(node.opacity(), 0.0);
    }

    #[test]
    fn test_blink_square_wave() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::Blink, &node, 0);
        let mut seen = Vec::new();
        for _ in 0..20 {
            effect.update(&node, &mut sound);
            seen.push(node.opacity());
        }
        // d = 19..15 -> 0, d = 14..10 -> 255
        assert_eq!(&seen[..5], &[0.0; 5]);
        assert_eq!(&seen[5..10], &[255.0; 5]);
        assert!(!effect.is_effecting());
    }

    #[test]
    fn test_whiten_fades_tint() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::Whiten, &node, 0);
        effect.update(&node, &mut sound);
        assert_eq!(node.blend_color().a, 118.0);
        for _ in 0..15 {
            effect.update(&node, &mut sound);
        }
        assert_eq!(node.blend_color().a, 0.0);
    }

    #[test]
    fn test_start_reverts_visual_state() {
        let node = SpriteNode::new();
        node.set_opacity(10.0);
        node.set_blend_mode(BlendMode::Add);
        node.set_blend_color(Color::WHITE);
        let mut effect = EffectState::new();
        effect.start(EffectKind::Whiten, &node, 0);
        assert_eq!(node.opacity(), 255.0);
        assert_eq!(node.blend_mode(), BlendMode::Normal);
        assert!(node.blend_color().is_clear());
    }

    #[test]
    fn test_none_is_noop() {
        let node = SpriteNode::new();
        node.set_opacity(40.0);
        let mut effect = EffectState::new();
        effect.start(EffectKind::None, &node, 0);
        assert_eq!(node.opacity(), 40.0);
        assert!(!effect.is_effecting());
    }

    #[test]
    fn test_instant_collapse() {
        let node = SpriteNode::new();
        let mut sound = SoundLog::new();
        let mut effect = EffectState::new();
        effect.start(EffectKind::InstantCollapse, &node, 0);
        effect.update(&node, &mut sound);
        assert_eq!(node.opacity(), 0.0);
        assert_eq!(effect.remaining(), 15);
    }

    #[test]
    fn test_names() {
        assert_eq!(EffectKind::from_name("bossCollapse"), Some(EffectKind::BossCollapse));
        assert_eq!(EffectKind::from_name("explode"), None);
    }
}
