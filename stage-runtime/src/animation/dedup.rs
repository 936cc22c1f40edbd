//! # Dedup 模块
//!
//! 全屏动画的同帧去重。
//!
//! 同一帧内对同一个全屏动画资源的多次请求，只有第一个实例创建单元与
//! 闪光节点并播放音效，其余实例标记为重复。
//!
//! ## 设计说明
//!
//! 两个集合由编排者（战斗精灵组）持有，每帧开始时调用 [`AnimationDedup::begin_tick`] 清空，
//! 再传入各个 [`super::AnimationPlayer::setup`]。去重只在同一次更新内生效，不跨帧。

use std::collections::HashSet;

/// 每帧作用域的去重集合
#[derive(Debug, Default, Clone)]
pub struct AnimationDedup {
    /// 已创建单元节点的动画 id
    node_owners: HashSet<u32>,
    /// 已获得音效播放权的动画 id
    sound_owners: HashSet<u32>,
}

impl AnimationDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新的一帧开始，清空所有记录
    pub fn begin_tick(&mut self) {
        self.node_owners.clear();
        self.sound_owners.clear();
    }

    pub fn nodes_claimed(&self, animation_id: u32) -> bool {
        self.node_owners.contains(&animation_id)
    }

    /// 登记单元节点所有权，返回是否为首次登记
    pub fn claim_nodes(&mut self, animation_id: u32) -> bool {
        self.node_owners.insert(animation_id)
    }

    pub fn sound_claimed(&self, animation_id: u32) -> bool {
        self.sound_owners.contains(&animation_id)
    }

    /// 登记音效播放权，返回是否为首次登记
    pub fn claim_sound(&mut self, animation_id: u32) -> bool {
        self.sound_owners.insert(animation_id)
    }

    pub fn is_empty(&self) -> bool {
        self.node_owners.is_empty() && self.sound_owners.is_empty()
    }
}
