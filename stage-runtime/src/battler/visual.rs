//! # Battler Visual 模块
//!
//! 单个战斗者在画面上的表现：移动、动作图案循环、效果、选中高亮、
//! 动画与伤害弹出。
//!
//! ## 节点结构
//!
//! ```text
//! root（位置 = home + offset + 震动，效果作用于此）
//!  ├── shadow
//!  ├── weapon
//!  ├── main（动作图，动画与选中高亮作用于此）
//!  └── state overlay
//! ```
//!
//! 动画播放器与伤害弹出挂在 root 的父节点（战场层）上。
//!
//! ## 每帧顺序
//!
//! 1. 取走战斗者的全部意图
//! 2. 目标位置 / 动作图 / 帧，推进移动
//! 3. 开始新请求的动画
//! 4. 伤害弹出
//! 5. 选中高亮
//! 6. 动作请求与图案计数
//! 7. 效果
//!
//! 动画播放器由 [`BattlerVisual::update_animations`] 单独推进，
//! 编排者在所有战斗者更新完后调用，保证动画读取到的是本帧的最终位置。

use std::rc::Rc;

use tracing::debug;

use super::damage::DamagePopup;
use super::effect::{EffectKind, EffectState};
use super::motion::{BattlerSide, MotionProfile, MotionSpec};
use super::overlay::StateOverlay;
use super::weapon::WeaponSwing;
use crate::animation::{AnimationDedup, AnimationLibrary, AnimationPlayer};
use crate::assets::{AssetCategory, AssetLoader};
use crate::model::{
    ActionResult, AnimationRequest, BattleStatus, Battler, BattlerIntent, BattlerRef,
};
use crate::node::{Color, SpriteNode, Vec2};
use crate::sound::SoundSink;
use crate::tween::MovementState;

const SELECTION_TINT: Color = Color::new(255.0, 255.0, 255.0, 64.0);

/// 一帧更新所需的外部服务
pub struct BattleFrame<'a> {
    pub status: &'a dyn BattleStatus,
    pub loader: &'a mut dyn AssetLoader,
    pub sound: &'a mut dyn SoundSink,
    pub library: &'a AnimationLibrary,
    /// 本帧的全屏动画去重集合，由编排者在帧开始时清空
    pub dedup: &'a mut AnimationDedup,
    /// 画面尺寸
    pub viewport: Vec2,
}

/// 当前动作
#[derive(Debug, Clone, PartialEq)]
struct CurrentMotion {
    name: String,
    spec: MotionSpec,
}

/// 本帧取走的意图，按类别整理
#[derive(Default)]
struct FrameIntents {
    motions: Vec<String>,
    refresh: bool,
    animations: Vec<AnimationRequest>,
    damages: Vec<ActionResult>,
    weapon: Option<u32>,
}

/// 战斗者表现
pub struct BattlerVisual {
    side: BattlerSide,
    profile: Rc<MotionProfile>,
    battler: Option<BattlerRef>,

    root: SpriteNode,
    main: SpriteNode,
    shadow: SpriteNode,
    weapon: WeaponSwing,
    overlay: StateOverlay,

    movement: MovementState,
    motion: Option<CurrentMotion>,
    motion_count: u32,
    pattern: u32,

    effect: EffectState,
    pending_effect: Option<EffectKind>,
    selection_count: u32,

    battler_name: String,
    scaled: bool,
    need_mirror: bool,
    mirrored: bool,
    retreating: bool,

    animations: Vec<AnimationPlayer>,
    damages: Vec<DamagePopup>,
}

impl std::fmt::Debug for BattlerVisual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattlerVisual")
            .field("side", &self.side)
            .field("has_battler", &self.battler.is_some())
            .field("motion", &self.motion_name())
            .field("pattern", &self.pattern)
            .field("offset", &self.movement.offset())
            .field("effect", &self.effect.kind())
            .field("animations", &self.animations.len())
            .finish()
    }
}

impl BattlerVisual {
    pub fn new(side: BattlerSide, profile: Rc<MotionProfile>, loader: &mut dyn AssetLoader) -> Self {
        let root = SpriteNode::new();
        let main = SpriteNode::new();
        let shadow = SpriteNode::new();
        shadow.set_bitmap(Some(loader.load(AssetCategory::SystemSheet, "Shadow2", 0)));
        shadow.set_position(0.0, -2.0);
        shadow.set_visible(false);
        let weapon = WeaponSwing::new();
        let overlay = StateOverlay::new(loader);

        root.add_child(&shadow);
        root.add_child(weapon.node());
        root.add_child(&main);
        root.add_child(overlay.node());

        let need_mirror = side == BattlerSide::Foe && profile.foe_starts_mirrored;

        Self {
            side,
            movement: MovementState::new(profile.easing),
            profile,
            battler: None,
            root,
            main,
            shadow,
            weapon,
            overlay,
            motion: None,
            motion_count: 0,
            pattern: 0,
            effect: EffectState::new(),
            pending_effect: None,
            selection_count: 0,
            battler_name: String::new(),
            scaled: false,
            need_mirror,
            mirrored: false,
            retreating: false,
            animations: Vec::new(),
            damages: Vec::new(),
        }
    }

    // ---- 设置 ----

    /// 绑定战斗者
    ///
    /// 换成不同的战斗者时重置为入场状态：idle 动作、回到原位、
    /// 按存活状态决定是否已出场。
    pub fn set_battler(&mut self, battler: Option<BattlerRef>) {
        let changed = match (&self.battler, &battler) {
            (Some(a), Some(b)) => !same_battler(a, b),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return;
        }
        self.battler = battler;
        if self.battler.is_some() {
            self.start_entry_motion();
            self.init_visibility();
        }
    }

    pub fn battler(&self) -> Option<&BattlerRef> {
        self.battler.as_ref()
    }

    pub fn set_home(&mut self, x: f32, y: f32) {
        self.movement.set_home(x, y);
        self.update_position();
    }

    /// 以格子节点的位置作为原位
    ///
    /// `squares` 的第 `index` 个子节点决定位置，索引越界时不做任何事。
    pub fn set_square(&mut self, squares: &SpriteNode, index: usize) {
        if let Some(square) = squares.children().get(index) {
            let pos = squares.position() + square.position();
            self.set_home(pos.x, pos.y);
        }
    }

    /// 开始移动，目标不变时无效果
    pub fn start_move(&mut self, x: f32, y: f32, duration: u32) -> bool {
        self.movement.start_move(x, y, duration)
    }

    /// 切换动作，返回是否真的切换了
    ///
    /// 未知名称会清空当前动作（帧固定在图案 0）。
    pub fn start_motion(&mut self, name: &str) -> bool {
        let next = self.profile.motion(name).map(|spec| CurrentMotion {
            name: name.to_string(),
            spec,
        });
        if next.as_ref().map(|m| &m.name) == self.motion.as_ref().map(|m| &m.name) {
            return false;
        }
        if next.is_none() {
            debug!(motion = name, "未知动作");
        }
        self.motion = next;
        self.motion_count = 0;
        self.pattern = 0;
        true
    }

    /// 开始效果（替换正在进行的效果）
    pub fn start_effect(&mut self, kind: EffectKind) {
        let height = self.main.frame().height.max(0.0) as u32;
        self.effect.start(kind, &self.root, height);
    }

    /// 重新选择动作
    ///
    /// 返回 false 表示没有战斗者，或者正在进行的防御动作在指令输入阶段不被打断。
    pub fn refresh_motion(&mut self, status: &dyn BattleStatus) -> bool {
        let Some(battler) = self.battler.clone() else {
            return false;
        };
        if self.motion_name() == Some("guard") && status.is_inputting() {
            return false;
        }
        let name = select_motion(&*battler.borrow());
        self.start_motion(name);
        true
    }

    /// 入场：先按战斗者状态刷新，再统一切到 idle 并回到原位
    fn start_entry_motion(&mut self) {
        let refreshed = self.battler.as_ref().map(|b| select_motion(&*b.borrow()));
        if let Some(name) = refreshed {
            self.start_motion(name);
        }
        self.start_motion("idle");
        self.movement.start_move(0.0, 0.0, 0);
        self.update_position();
    }

    fn init_visibility(&mut self) {
        let alive = self
            .battler
            .as_ref()
            .is_some_and(|b| b.borrow().is_alive());
        self.effect.set_appeared(alive);
        if !alive {
            self.root.set_opacity(0.0);
        }
    }

    // ---- 查询 ----

    pub fn side(&self) -> BattlerSide {
        self.side
    }

    pub fn root(&self) -> &SpriteNode {
        &self.root
    }

    /// 动作图节点（动画目标）
    pub fn main(&self) -> &SpriteNode {
        &self.main
    }

    pub fn shadow(&self) -> &SpriteNode {
        &self.shadow
    }

    pub fn weapon(&self) -> &WeaponSwing {
        &self.weapon
    }

    pub fn movement(&self) -> &MovementState {
        &self.movement
    }

    pub fn effect(&self) -> &EffectState {
        &self.effect
    }

    pub fn motion_name(&self) -> Option<&str> {
        self.motion.as_ref().map(|m| m.name.as_str())
    }

    pub fn pattern(&self) -> u32 {
        self.pattern
    }

    pub fn is_moving(&self) -> bool {
        self.movement.is_moving()
    }

    pub fn is_effecting(&self) -> bool {
        self.effect.is_effecting()
    }

    pub fn is_animation_playing(&self) -> bool {
        !self.animations.is_empty()
    }

    pub fn is_damage_playing(&self) -> bool {
        !self.damages.is_empty()
    }

    pub fn is_retreating(&self) -> bool {
        self.retreating
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn animations(&self) -> &[AnimationPlayer] {
        &self.animations
    }

    // ---- 每帧更新 ----

    /// 推进一帧
    pub fn update(&mut self, frame: &mut BattleFrame<'_>) {
        if let Some(battler) = self.battler.clone() {
            let intents = self.collect_intents(&battler);
            self.update_main(&battler, frame);
            self.setup_animations(&battler, &intents.animations, frame);
            self.update_damage_popups(&battler, &intents.damages, frame);
            self.update_selection(&battler);
            self.update_motion(&intents, frame);
            self.update_effect(&battler, frame);
            let overlay_index = battler.borrow().state_overlay_index();
            self.overlay.update(overlay_index);
        } else {
            self.main.set_bitmap(None);
        }
        self.weapon.update();
        self.shadow.set_visible(self.battler.is_some());
        let visible = self
            .battler
            .as_ref()
            .is_some_and(|b| b.borrow().is_sprite_visible());
        self.root.set_visible(visible);
    }

    /// 推进所有动画播放器，并撤下已结束的
    pub fn update_animations(&mut self, sound: &mut dyn SoundSink) {
        for player in &mut self.animations {
            player.update(sound);
        }
        self.animations.retain_mut(|player| {
            if player.is_playing() {
                true
            } else {
                player.remove();
                false
            }
        });
    }

    fn collect_intents(&mut self, battler: &BattlerRef) -> FrameIntents {
        let mut out = FrameIntents::default();
        for intent in battler.borrow_mut().take_intents() {
            match intent {
                BattlerIntent::Motion(name) => out.motions.push(name),
                BattlerIntent::RefreshMotion => out.refresh = true,
                BattlerIntent::Effect(kind) => self.pending_effect = Some(kind),
                BattlerIntent::Animation(request) => out.animations.push(request),
                BattlerIntent::DamagePopup(result) => out.damages.push(result),
                BattlerIntent::WeaponAnimation(id) => out.weapon = Some(id),
            }
        }
        out
    }

    fn update_main(&mut self, battler: &BattlerRef, frame: &mut BattleFrame<'_>) {
        if battler.borrow().is_sprite_visible() {
            if !self.is_moving() {
                self.update_target_position(battler, frame.status);
            }
            self.update_bitmap(battler, frame.loader);
            self.update_frame();
        }
        self.update_move(frame.status);
        self.update_position();
    }

    fn update_target_position(&mut self, battler: &BattlerRef, status: &dyn BattleStatus) {
        let escaped = status.is_escaped() && self.side == BattlerSide::Ally;
        let acting = battler.borrow().is_acting();
        if acting && !escaped {
            self.step_forward();
        } else if escaped {
            if !self.retreating {
                self.retreat();
            }
        } else if !self.movement.in_home_position() {
            self.step_back();
        }
    }

    fn step_forward(&mut self) {
        let step = self.profile.step_forward(self.side);
        self.start_move(step.offset_x, step.offset_y, step.duration);
    }

    fn step_back(&mut self) {
        self.start_move(0.0, 0.0, self.profile.step_back_duration);
    }

    fn retreat(&mut self) {
        debug!(side = ?self.side, "撤退");
        self.need_mirror = true;
        self.retreating = true;
        let retreat = self.profile.retreat;
        self.start_move(retreat.offset_x, retreat.offset_y, retreat.duration);
    }

    fn update_bitmap(&mut self, battler: &BattlerRef, loader: &mut dyn AssetLoader) {
        let (name, hue) = {
            let b = battler.borrow();
            (b.battler_name(), b.battler_hue())
        };
        if self.battler_name != name {
            let bitmap = loader.load(AssetCategory::BattlerSheet, &name, hue);
            self.main.set_bitmap(Some(bitmap));
            self.battler_name = name;
        }
    }

    fn update_frame(&mut self) {
        let Some(bitmap) = self.main.bitmap() else {
            return;
        };
        self.update_scale(bitmap.is_ready(), bitmap.width());

        let layout = self.profile.sheet;
        let (cw, ch) = layout.cell_size(bitmap.width(), bitmap.height());
        let (index, pattern) = match &self.motion {
            Some(m) if self.pattern < m.spec.pattern_count => (m.spec.index, self.pattern),
            Some(m) => (m.spec.index, 0),
            None => (0, 0),
        };
        let cy = index % layout.rows.max(1);
        self.main.set_frame(
            (pattern * cw) as f32,
            (cy * ch) as f32,
            cw as f32,
            ch as f32,
        );
    }

    fn update_scale(&mut self, ready: bool, width: u32) {
        if !self.scaled && ready && width > 0 {
            if let Some(target) = self.profile.target_cell_width {
                let ratio = target / (width as f32 / self.profile.sheet.columns.max(1) as f32);
                let scale = self.root.scale();
                self.root.set_scale(scale.x * ratio, scale.y * ratio);
            }
            self.scaled = true;
        }
        if self.need_mirror {
            let scale = self.root.scale();
            self.root.set_scale(-scale.x, scale.y);
            self.need_mirror = false;
            self.mirrored = !self.mirrored;
        }
    }

    fn update_move(&mut self, status: &dyn BattleStatus) {
        let ready = self.main.bitmap().is_none_or(|b| b.is_ready());
        if ready && self.movement.update() && !status.is_battle_end() {
            self.refresh_motion(status);
        }
    }

    fn update_position(&mut self) {
        let pos = self.movement.position();
        self.root.set_position(pos.x + self.effect.shake(), pos.y);
    }

    fn animation_layer(&self) -> SpriteNode {
        self.root.parent().unwrap_or_else(|| self.root.clone())
    }

    fn setup_animations(
        &mut self,
        battler: &BattlerRef,
        requests: &[AnimationRequest],
        frame: &mut BattleFrame<'_>,
    ) {
        if requests.is_empty() {
            return;
        }
        let layer = self.animation_layer();
        for request in requests {
            let Some(resource) = frame.library.get(request.animation_id) else {
                debug!(animation_id = request.animation_id, "动画不存在，忽略请求");
                continue;
            };
            let delay = if resource.is_screen() { 0 } else { request.delay };
            let mut player = AnimationPlayer::new(frame.viewport);
            player.setup(
                &layer,
                &self.main,
                resource,
                request.mirror,
                delay,
                frame.loader,
                frame.dedup,
            );
            self.animations.push(player);
        }
        let visible = battler.borrow().is_sprite_visible();
        for player in &self.animations {
            player.root().set_visible(visible);
        }
    }

    fn update_damage_popups(
        &mut self,
        battler: &BattlerRef,
        results: &[ActionResult],
        frame: &mut BattleFrame<'_>,
    ) {
        for result in results {
            let (visible, alive) = {
                let b = battler.borrow();
                (b.is_sprite_visible(), b.is_alive())
            };
            if !visible {
                continue;
            }
            let bitmap = frame.loader.load(AssetCategory::SystemSheet, "Damage", 0);
            let popup = DamagePopup::new(bitmap, result, alive);
            let pos = self.root.position();
            popup.root().set_position(pos.x, pos.y - 8.0);
            self.animation_layer().add_child(popup.root());
            self.damages.push(popup);
        }

        for popup in &mut self.damages {
            popup.update();
        }
        if self.damages.first().is_some_and(|p| !p.is_playing()) {
            let finished = self.damages.remove(0);
            finished.root().remove_from_parent();
        }
    }

    fn update_selection(&mut self, battler: &BattlerRef) {
        if battler.borrow().is_selected() {
            self.selection_count += 1;
            if self.selection_count % 30 < 15 {
                self.main.set_blend_color(SELECTION_TINT);
            } else {
                self.main.set_blend_color(Color::CLEAR);
            }
        } else if self.selection_count > 0 {
            self.selection_count = 0;
            self.main.set_blend_color(Color::CLEAR);
        }
    }

    fn update_motion(&mut self, intents: &FrameIntents, frame: &mut BattleFrame<'_>) {
        for name in &intents.motions {
            self.start_motion(name);
        }
        if let Some(id) = intents.weapon {
            self.weapon.setup(id, frame.loader);
        }
        if intents.refresh {
            self.refresh_motion(frame.status);
        }
        self.update_motion_count(frame.status);
    }

    fn update_motion_count(&mut self, status: &dyn BattleStatus) {
        let Some(spec) = self.motion.as_ref().map(|m| m.spec) else {
            return;
        };
        self.motion_count += 1;
        if self.motion_count < self.profile.motion_speed {
            return;
        }
        self.motion_count = 0;
        if spec.looping {
            self.pattern = (self.pattern + 1) % spec.pattern_count.max(1);
        } else if self.pattern + 1 >= spec.pattern_count {
            if self.refresh_motion(status) {
                self.pattern = 0;
            }
        } else {
            self.pattern += 1;
        }
    }

    fn update_effect(&mut self, battler: &BattlerRef, frame: &mut BattleFrame<'_>) {
        if self.effect.appeared()
            && let Some(kind) = self.pending_effect.take()
        {
            self.start_effect(kind);
        }
        let (alive, hidden) = {
            let b = battler.borrow();
            (b.is_alive(), b.is_hidden())
        };
        if !self.effect.appeared() && alive {
            self.start_effect(EffectKind::Appear);
        } else if self.effect.appeared() && hidden {
            self.start_effect(EffectKind::Disappear);
        }
        self.effect.update(&self.root, frame.sound);
        self.update_position();
    }
}

/// 按战斗者状态选择动作名
fn select_motion(b: &dyn Battler) -> &'static str {
    let state = b.state_motion_index();
    if b.is_inputting() || b.is_acting() {
        "run"
    } else if state == 3 {
        "dead"
    } else if state == 2 {
        "sleep"
    } else if b.is_guard() || b.is_guard_waiting() {
        "guard"
    } else if b.is_dying() {
        "dying"
    } else {
        "idle"
    }
}

fn same_battler(a: &BattlerRef, b: &BattlerRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
