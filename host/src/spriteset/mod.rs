//! # Spriteset 模块
//!
//! 战斗画面：战场、格子、全部战斗者表现和画面级的闪光/淡出遮罩。
//!
//! ## 节点结构
//!
//! ```text
//! root（画面缩放与震动）
//!  ├── base
//!  │    ├── background（上一场景的快照）
//!  │    └── battle_field（动画与伤害弹出也挂在这里）
//!  │         ├── foe squares / ally squares
//!  │         └── 各战斗者 root
//!  ├── flash
//!  └── fade
//! ```
//!
//! ## 每帧顺序
//!
//! 清空去重集合 → 画面遮罩 → 各战斗者 → 各战斗者的动画播放器。
//! 动画最后推进，读取到的是战斗者本帧的最终位置。

use std::rc::Rc;

use stage_runtime::{
    AnimationDedup, AnimationLibrary, AssetLoader, BattleFrame, BattleStatus, BattlerRef,
    BattlerSide, BattlerVisual, MotionProfile, SceneKind, ScreenState, SoundSink, SpriteNode,
    Vec2,
};
use tracing::debug;

use crate::demo::{DemoBattle, DemoBattlerRef};

/// 同时上场的我方人数上限
pub const MAX_BATTLE_MEMBERS: usize = 4;

/// 格子布局：原点与相邻格子的间距
#[derive(Debug, Clone, Copy, PartialEq)]
struct SquareLayout {
    origin: Vec2,
    step: Vec2,
}

const ALLY_SQUARES: SquareLayout = SquareLayout {
    origin: Vec2::new(160.0, 260.0),
    step: Vec2::new(-24.0, 72.0),
};

const FOE_SQUARES: SquareLayout = SquareLayout {
    origin: Vec2::new(640.0, 260.0),
    step: Vec2::new(24.0, 72.0),
};

fn create_squares(layout: SquareLayout, count: usize) -> SpriteNode {
    let squares = SpriteNode::new();
    squares.set_position(layout.origin.x, layout.origin.y);
    for i in 0..count {
        let square = SpriteNode::new();
        square.set_position(layout.step.x * i as f32, layout.step.y * i as f32);
        squares.add_child(&square);
    }
    squares
}

/// 战斗画面
pub struct BattleSpriteset {
    root: SpriteNode,
    background: SpriteNode,
    battle_field: SpriteNode,
    flash: SpriteNode,
    fade: SpriteNode,
    enemies: Vec<BattlerVisual>,
    actors: Vec<BattlerVisual>,
    dedup: AnimationDedup,
    viewport: Vec2,
    background_source: Option<SceneKind>,
}

impl std::fmt::Debug for BattleSpriteset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleSpriteset")
            .field("enemies", &self.enemies.len())
            .field("actors", &self.actors.len())
            .field("background_source", &self.background_source)
            .finish()
    }
}

impl BattleSpriteset {
    pub fn new(
        battle: &DemoBattle,
        profile: Rc<MotionProfile>,
        loader: &mut dyn AssetLoader,
        viewport: Vec2,
    ) -> Self {
        let root = SpriteNode::new();
        let base = SpriteNode::new();
        let background = SpriteNode::new();
        let battle_field = SpriteNode::new();
        root.add_child(&base);
        base.add_child(&background);
        base.add_child(&battle_field);

        let foe_squares = create_squares(FOE_SQUARES, battle.troop().len());
        let ally_squares = create_squares(ALLY_SQUARES, MAX_BATTLE_MEMBERS);
        battle_field.add_child(&foe_squares);
        battle_field.add_child(&ally_squares);

        let enemies = Self::create_visuals(
            BattlerSide::Foe,
            battle.troop(),
            battle.troop().len(),
            &foe_squares,
            &battle_field,
            &profile,
            loader,
        );
        let actors = Self::create_visuals(
            BattlerSide::Ally,
            battle.party(),
            MAX_BATTLE_MEMBERS,
            &ally_squares,
            &battle_field,
            &profile,
            loader,
        );

        let flash = SpriteNode::new();
        flash.set_opacity(0.0);
        let fade = SpriteNode::new();
        fade.set_opacity(0.0);
        root.add_child(&flash);
        root.add_child(&fade);

        debug!(
            enemies = enemies.len(),
            actors = actors.len(),
            "创建战斗画面"
        );
        Self {
            root,
            background,
            battle_field,
            flash,
            fade,
            enemies,
            actors,
            dedup: AnimationDedup::new(),
            viewport,
            background_source: None,
        }
    }

    fn create_visuals(
        side: BattlerSide,
        members: &[DemoBattlerRef],
        slots: usize,
        squares: &SpriteNode,
        battle_field: &SpriteNode,
        profile: &Rc<MotionProfile>,
        loader: &mut dyn AssetLoader,
    ) -> Vec<BattlerVisual> {
        (0..slots)
            .map(|i| {
                let mut visual = BattlerVisual::new(side, profile.clone(), loader);
                battle_field.add_child(visual.root());
                if let Some(member) = members.get(i) {
                    let battler: BattlerRef = member.clone();
                    visual.set_battler(Some(battler));
                    visual.set_square(squares, member.borrow().index());
                }
                visual
            })
            .collect()
    }

    pub fn root(&self) -> &SpriteNode {
        &self.root
    }

    pub fn battle_field(&self) -> &SpriteNode {
        &self.battle_field
    }

    pub fn flash(&self) -> &SpriteNode {
        &self.flash
    }

    pub fn fade(&self) -> &SpriteNode {
        &self.fade
    }

    pub fn enemies(&self) -> &[BattlerVisual] {
        &self.enemies
    }

    pub fn actors(&self) -> &[BattlerVisual] {
        &self.actors
    }

    /// 所有战斗者表现（敌方在前）
    pub fn battler_visuals(&self) -> impl Iterator<Item = &BattlerVisual> {
        self.enemies.iter().chain(self.actors.iter())
    }

    /// 以上一场景的快照作为背景
    pub fn set_background(&mut self, source: Option<SceneKind>) {
        self.background_source = source;
        self.background.set_visible(source.is_some());
    }

    pub fn background_source(&self) -> Option<SceneKind> {
        self.background_source
    }

    // ---- 查询 ----

    pub fn is_animation_playing(&self) -> bool {
        self.battler_visuals().any(|v| v.is_animation_playing())
    }

    pub fn is_effecting(&self) -> bool {
        self.battler_visuals().any(|v| v.is_effecting())
    }

    pub fn is_anyone_moving(&self) -> bool {
        self.battler_visuals().any(|v| v.is_moving())
    }

    /// 动画播放中或有人在移动
    pub fn is_busy(&self) -> bool {
        self.is_animation_playing() || self.is_anyone_moving()
    }

    // ---- 每帧 ----

    /// 推进一帧
    pub fn update(
        &mut self,
        status: &dyn BattleStatus,
        screen: &ScreenState,
        loader: &mut dyn AssetLoader,
        sound: &mut dyn SoundSink,
        library: &AnimationLibrary,
    ) {
        self.dedup.begin_tick();
        self.update_screen_sprites(screen);
        self.update_position(screen);

        let mut frame = BattleFrame {
            status,
            loader,
            sound: &mut *sound,
            library,
            dedup: &mut self.dedup,
            viewport: self.viewport,
        };
        for visual in self.enemies.iter_mut().chain(self.actors.iter_mut()) {
            visual.update(&mut frame);
        }
        for visual in self.enemies.iter_mut().chain(self.actors.iter_mut()) {
            visual.update_animations(sound);
        }
    }

    fn update_screen_sprites(&mut self, screen: &ScreenState) {
        let color = screen.flash_color;
        self.flash.set_blend_color(color.with_alpha(255.0));
        self.flash.set_opacity(color.a);
        self.fade.set_opacity(255.0 - screen.brightness);
    }

    fn update_position(&mut self, screen: &ScreenState) {
        let zoom = screen.zoom;
        self.root.set_scale(zoom.scale, zoom.scale);
        let x = (-zoom.x * (zoom.scale - 1.0)).round() + screen.shake.round();
        let y = (-zoom.y * (zoom.scale - 1.0)).round();
        self.root.set_position(x, y);
    }
}
