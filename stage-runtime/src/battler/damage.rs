//! # Damage 模块
//!
//! 伤害数字弹出。
//!
//! 数字从 `Damage` 系统图中截取：10 列 5 行，
//! 第 0/1 行为 HP 伤害/回复，第 2/3 行为 MP，第 4 行是 "miss"。

use crate::assets::BitmapHandle;
use crate::model::ActionResult;
use crate::node::{Color, SpriteNode};

/// 弹出持续的 tick 数
pub const DAMAGE_DURATION: u32 = 90;
const CRITICAL_FLASH: Color = Color::new(255.0, 0.0, 0.0, 160.0);
const CRITICAL_FLASH_DURATION: u32 = 60;

#[derive(Debug)]
struct Digit {
    node: SpriteNode,
    dy: f32,
    ry: f32,
}

/// 一次伤害弹出
#[derive(Debug)]
pub struct DamagePopup {
    root: SpriteNode,
    digits: Vec<Digit>,
    duration: u32,
    flash_color: Color,
    flash_duration: u32,
}

impl DamagePopup {
    pub fn new(bitmap: BitmapHandle, result: &ActionResult, target_alive: bool) -> Self {
        let mut popup = Self {
            root: SpriteNode::new(),
            digits: Vec::new(),
            duration: DAMAGE_DURATION,
            flash_color: Color::CLEAR,
            flash_duration: 0,
        };

        let w = bitmap.width() as f32 / 10.0;
        let h = bitmap.height() as f32 / 5.0;
        if result.missed || result.evaded {
            let node = popup.push_digit(&bitmap, 0.0);
            node.set_frame(0.0, 4.0 * h, 4.0 * w, h);
        } else if result.hp_affected {
            popup.create_digits(&bitmap, 0, result.hp_damage, w, h);
        } else if target_alive && result.mp_damage != 0 {
            popup.create_digits(&bitmap, 2, result.mp_damage, w, h);
        }
        if result.critical {
            popup.flash_color = CRITICAL_FLASH;
            popup.flash_duration = CRITICAL_FLASH_DURATION;
        }
        popup
    }

    fn create_digits(&mut self, bitmap: &BitmapHandle, base_row: u32, value: i32, w: f32, h: f32) {
        let text = value.unsigned_abs().to_string();
        let row = base_row + u32::from(value < 0);
        let len = text.len() as f32;
        for (i, ch) in text.chars().enumerate() {
            let n = ch.to_digit(10).unwrap_or(0) as f32;
            let node = self.push_digit(bitmap, -(i as f32));
            node.set_frame(n * w, row as f32 * h, w, h);
            node.set_position((i as f32 - (len - 1.0) / 2.0) * w, -40.0);
        }
    }

    fn push_digit(&mut self, bitmap: &BitmapHandle, dy: f32) -> SpriteNode {
        let node = SpriteNode::new();
        node.set_bitmap(Some(bitmap.clone()));
        node.set_position(0.0, -40.0);
        self.root.add_child(&node);
        self.digits.push(Digit {
            node: node.clone(),
            dy,
            ry: -40.0,
        });
        node
    }

    pub fn root(&self) -> &SpriteNode {
        &self.root
    }

    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }

    pub fn is_playing(&self) -> bool {
        self.duration > 0
    }

    pub fn update(&mut self) {
        if self.duration > 0 {
            self.duration -= 1;
            for digit in &mut self.digits {
                digit.dy += 0.5;
                digit.ry += digit.dy;
                if digit.ry >= 0.0 {
                    digit.ry = 0.0;
                    digit.dy *= -0.6;
                }
                let x = digit.node.position().x;
                digit.node.set_position(x, digit.ry.round());
                digit.node.set_blend_color(self.flash_color);
            }
        }

        if self.flash_duration > 0 {
            let d = self.flash_duration as f32;
            self.flash_duration -= 1;
            self.flash_color.a = self.flash_color.a * (d - 1.0) / d;
        }

        if self.duration < 10 {
            self.root
                .set_opacity(255.0 * self.duration as f32 / 10.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StaticBitmap;

    fn damage_sheet() -> BitmapHandle {
        BitmapHandle::new(StaticBitmap::new(320, 320))
    }

    #[test]
    fn test_hp_digits_layout() {
        let result = ActionResult {
            hp_affected: true,
            hp_damage: 123,
            ..Default::default()
        };
        let popup = DamagePopup::new(damage_sheet(), &result, true);
        assert_eq!(popup.digit_count(), 3);
        let digits = popup.root().children();
        // 居中排列
        assert_eq!(digits[0].position().x, -32.0);
        assert_eq!(digits[1].position().x, 0.0);
        assert_eq!(digits[2].frame().x, 3.0 * 32.0);
        assert_eq!(digits[2].frame().y, 0.0);
    }

    #[test]
    fn test_recovery_uses_next_row() {
        let result = ActionResult {
            hp_affected: true,
            hp_damage: -50,
            ..Default::default()
        };
        let popup = DamagePopup::new(damage_sheet(), &result, true);
        assert_eq!(popup.root().children()[0].frame().y, 64.0);
    }

    #[test]
    fn test_miss_and_mp() {
        let miss = ActionResult {
            missed: true,
            ..Default::default()
        };
        let popup = DamagePopup::new(damage_sheet(), &miss, true);
        assert_eq!(popup.digit_count(), 1);
        assert_eq!(popup.root().children()[0].frame().width, 128.0);

        let mp = ActionResult {
            mp_damage: 7,
            ..Default::default()
        };
        assert_eq!(DamagePopup::new(damage_sheet(), &mp, true).digit_count(), 1);
        // 目标已倒下时不显示 MP
        assert_eq!(DamagePopup::new(damage_sheet(), &mp, false).digit_count(), 0);
    }

    #[test]
    fn test_lifetime_and_fade() {
        let result = ActionResult {
            hp_affected: true,
            hp_damage: 5,
            critical: true,
            ..Default::default()
        };
        let mut popup = DamagePopup::new(damage_sheet(), &result, true);
        popup.update();
        let digit = popup.root().children()[0].clone();
        assert_eq!(digit.blend_color().r, 255.0);
        for _ in 0..84 {
            popup.update();
        }
        assert!(popup.is_playing());
        assert_eq!(popup.root().opacity(), 127.5);
        for _ in 0..5 {
            popup.update();
        }
        assert!(!popup.is_playing());
        assert_eq!(popup.root().opacity(), 0.0);
        // 落地后停在 0
        assert_eq!(digit.position().y, 0.0);
    }
}
