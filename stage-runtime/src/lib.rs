//! # Stage Runtime
//!
//! 2D RPG 战斗画面的表现核心。
//!
//! ## 架构概述
//!
//! `stage-runtime` 是纯逻辑核心，不做渲染，也不读文件（只解析 JSON 数据表）。
//! 游戏状态、资源加载、音效都由宿主通过 trait 提供：
//!
//! ```text
//! Host                               Runtime
//!   │  Battler / BattleStatus            │
//!   │  AssetLoader / SoundSink ────────►│
//!   │                                    │ update()（每帧一次）
//!   │◄──── SpriteNode 树（位置/帧/透明度）│
//! ```
//!
//! 每帧的更新顺序固定：场景 → 战斗画面 → 各战斗者 → 动画播放器，
//! 保证动画读取的是战斗者本帧的最终位置。
//!
//! ## 失败策略
//!
//! 逐帧路径上没有错误：资源未就绪时计数停顿，战斗者缺失时隐藏，
//! 未知动作冻结在图案 0。只有数据表加载与启动阶段返回 [`StageError`]。
//!
//! ## 核心类型
//!
//! - [`AnimationPlayer`]：按时间轴播放动画单元、闪光与音效
//! - [`BattlerVisual`]：战斗者的移动、动作、效果与选中高亮
//! - [`SceneController`]：场景栈与切换顺序
//!
//! ## 模块结构
//!
//! - [`node`]：精灵节点树
//! - [`tween`]：位移补间
//! - [`assets`]：位图与资源加载接口
//! - [`sound`]：音效接口
//! - [`model`]：外部游戏状态接口与意图队列
//! - [`animation`]：动画数据与播放
//! - [`battler`]：战斗者表现
//! - [`scene`]：场景生命周期
//! - [`error`]：错误类型

pub mod animation;
pub mod assets;
pub mod battler;
pub mod error;
pub mod model;
pub mod node;
pub mod scene;
pub mod sound;
pub mod tween;

// 重导出核心类型
pub use animation::{
    AnimationDedup, AnimationLibrary, AnimationPlayer, AnimationPosition, AnimationResource,
    CellData, FlashScope, TimingCue,
};
pub use assets::{AssetCategory, AssetLoader, Bitmap, BitmapHandle, StaticBitmap, UniformLoader};
pub use battler::{
    BattleFrame, BattlerSide, BattlerVisual, DamagePopup, EffectKind, EffectState, MotionProfile,
    MotionSpec, SheetLayout, StateOverlay, StepParams, WeaponSwing,
};
pub use error::{DataError, StageError, StageResult};
pub use model::{
    ActionResult, AnimationRequest, BattleStatus, Battler, BattlerIntent, BattlerRef,
    IntentQueue, ScreenState, Zoom,
};
pub use node::{BlendMode, Color, Rect, SpriteNode, Vec2};
pub use scene::{
    FadeDirection, Navigator, Scene, SceneBase, SceneContext, SceneController, SceneFactory,
    SceneKind, SceneState, ScreenFade,
};
pub use sound::{PlayedSound, SoundCue, SoundLog, SoundSink, SystemSound};
pub use tween::{Easing, MovementState, smooth_step};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _profile = MotionProfile::classic();
        let _movement = MovementState::new(Easing::SmoothStep);
        let _player = AnimationPlayer::new(Vec2::new(816.0, 624.0));
        let _fade = ScreenFade::new();
        let _queue = IntentQueue::new();
        let _err = StageError::BootTimeout { frames: 3600 };
        assert_eq!(SceneKind::from_name("battle"), Some(SceneKind::Battle));
    }
}
