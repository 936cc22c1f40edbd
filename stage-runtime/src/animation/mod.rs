//! # Animation 模块
//!
//! 动画资源与播放。
//!
//! ## 模块结构
//!
//! - [`resource`]：动画数据表（帧、单元、时间轴提示）与动画库
//! - [`dedup`]：全屏动画的同帧去重集合
//! - [`player`]：动画播放器

pub mod dedup;
pub mod player;
pub mod resource;

pub use dedup::AnimationDedup;
pub use player::{ANIMATION_RATE, AnimationPlayer, CELL_SIZE, MAX_CELLS};
pub use resource::{
    AnimationLibrary, AnimationPosition, AnimationResource, CellData, FlashScope, TimingCue,
};
