//! # Overlay 模块
//!
//! 状态覆盖图（中毒、睡眠等在战斗者身上循环播放的 8 帧动画）。

use crate::assets::{AssetCategory, AssetLoader};
use crate::node::SpriteNode;

const OVERLAY_WAIT: u32 = 8;
const OVERLAY_SIZE: f32 = 96.0;
const OVERLAY_PATTERNS: u32 = 8;

#[derive(Debug)]
pub struct StateOverlay {
    node: SpriteNode,
    overlay_index: u32,
    count: u32,
    pattern: u32,
}

impl StateOverlay {
    pub fn new(loader: &mut dyn AssetLoader) -> Self {
        let node = SpriteNode::new();
        node.set_bitmap(Some(loader.load(AssetCategory::SystemSheet, "States", 0)));
        node.set_frame(0.0, 0.0, 0.0, 0.0);
        Self {
            node,
            overlay_index: 0,
            count: 0,
            pattern: 0,
        }
    }

    pub fn node(&self) -> &SpriteNode {
        &self.node
    }

    pub fn overlay_index(&self) -> u32 {
        self.overlay_index
    }

    /// 推进一帧
    ///
    /// # 参数
    /// - `overlay_index`: 战斗者当前的覆盖图行号，0 表示无
    pub fn update(&mut self, overlay_index: u32) {
        self.count += 1;
        if self.count < OVERLAY_WAIT {
            return;
        }
        self.count = 0;
        self.pattern = (self.pattern + 1) % OVERLAY_PATTERNS;
        self.overlay_index = overlay_index;

        if self.overlay_index > 0 {
            let sx = self.pattern as f32 * OVERLAY_SIZE;
            let sy = (self.overlay_index - 1) as f32 * OVERLAY_SIZE;
            self.node.set_frame(sx, sy, OVERLAY_SIZE, OVERLAY_SIZE);
        } else {
            self.node.set_frame(0.0, 0.0, 0.0, 0.0);
        }
    }
}
