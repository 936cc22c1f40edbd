//! # Weapon 模块
//!
//! 攻击时的武器挥动。武器图每页 12 把，每把 3 个图案（96×64）。

use crate::assets::{AssetCategory, AssetLoader};
use crate::node::SpriteNode;

const WEAPON_WAIT: u32 = 12;
const WEAPON_WIDTH: f32 = 96.0;
const WEAPON_HEIGHT: f32 = 64.0;

/// 武器挥动
#[derive(Debug)]
pub struct WeaponSwing {
    node: SpriteNode,
    image_id: u32,
    count: u32,
    pattern: u32,
}

impl Default for WeaponSwing {
    fn default() -> Self {
        Self::new()
    }
}

impl WeaponSwing {
    pub fn new() -> Self {
        let node = SpriteNode::new();
        node.set_position(-16.0, 0.0);
        Self {
            node,
            image_id: 0,
            count: 0,
            pattern: 0,
        }
    }

    pub fn node(&self) -> &SpriteNode {
        &self.node
    }

    /// 开始挥动，`image_id == 0` 表示清除
    pub fn setup(&mut self, image_id: u32, loader: &mut dyn AssetLoader) {
        self.image_id = image_id;
        self.count = 0;
        self.pattern = 0;
        let bitmap = if image_id > 0 {
            let page = (image_id - 1) / 12 + 1;
            Some(loader.load(AssetCategory::WeaponSheet, &format!("Weapons{page}"), 0))
        } else {
            None
        };
        self.node.set_bitmap(bitmap);
        self.update_frame();
    }

    pub fn update(&mut self) {
        self.count += 1;
        if self.count >= WEAPON_WAIT {
            self.pattern += 1;
            if self.pattern >= 3 {
                self.image_id = 0;
            }
            self.update_frame();
            self.count = 0;
        }
    }

    fn update_frame(&self) {
        if self.image_id > 0 {
            let index = (self.image_id - 1) % 12;
            let sx = ((index / 6) * 3 + self.pattern) as f32 * WEAPON_WIDTH;
            let sy = (index % 6) as f32 * WEAPON_HEIGHT;
            self.node.set_frame(sx, sy, WEAPON_WIDTH, WEAPON_HEIGHT);
        } else {
            self.node.set_frame(0.0, 0.0, 0.0, 0.0);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.image_id > 0
    }

    pub fn pattern(&self) -> u32 {
        self.pattern
    }
}
