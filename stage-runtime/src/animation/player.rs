//! # Animation Player 模块
//!
//! 在目标节点上播放一段动画资源。
//!
//! ## 时间轴
//!
//! - 每个动画帧持续 `rate`（固定 4）个 tick，总时长 `帧数 * rate + 1`
//! - 位图未就绪时不推进（延迟与时长都冻结），不会报错
//! - 延迟未结束时只递减延迟
//! - 每 `rate` 个 tick 切换到下一帧，应用最多 16 个单元并处理该帧的时间轴提示
//!
//! ## 设计说明
//!
//! 播放器拥有自己的根节点、16 个单元节点以及可选的全屏闪光节点；
//! 目标节点由调用方拥有，播放器只修改它的混合色和隐藏锁存，
//! 并在 [`AnimationPlayer::remove`] 时复原。

use std::f32::consts::PI;
use std::rc::Rc;

use tracing::trace;

use super::dedup::AnimationDedup;
use super::resource::{AnimationPosition, AnimationResource, CellData, FlashScope, TimingCue};
use crate::assets::{AssetCategory, AssetLoader, BitmapHandle};
use crate::node::{Color, SpriteNode, Vec2};
use crate::sound::SoundSink;

/// 每个动画帧的 tick 数
pub const ANIMATION_RATE: u32 = 4;
/// 单元节点上限
pub const MAX_CELLS: usize = 16;
/// 动画图单元边长
pub const CELL_SIZE: f32 = 192.0;

/// 动画播放器
#[derive(Debug)]
pub struct AnimationPlayer {
    root: SpriteNode,
    viewport: Vec2,
    target: Option<SpriteNode>,
    resource: Option<Rc<AnimationResource>>,
    mirror: bool,
    delay: u32,
    rate: u32,
    duration: u32,
    bitmap1: Option<BitmapHandle>,
    bitmap2: Option<BitmapHandle>,
    cells: Vec<SpriteNode>,
    screen_flash: Option<SpriteNode>,
    flash_color: Color,
    flash_duration: u32,
    screen_flash_duration: u32,
    hiding_duration: u32,
    duplicated: bool,
}

impl AnimationPlayer {
    /// 创建播放器
    ///
    /// # 参数
    /// - `viewport`: 画面尺寸，全屏动画居中于此
    pub fn new(viewport: Vec2) -> Self {
        Self {
            root: SpriteNode::new(),
            viewport,
            target: None,
            resource: None,
            mirror: false,
            delay: 0,
            rate: ANIMATION_RATE,
            duration: 0,
            bitmap1: None,
            bitmap2: None,
            cells: Vec::new(),
            screen_flash: None,
            flash_color: Color::CLEAR,
            flash_duration: 0,
            screen_flash_duration: 0,
            hiding_duration: 0,
            duplicated: false,
        }
    }

    /// 开始播放
    ///
    /// 对同一个播放器再次调用会先撤下正在进行的播放。
    ///
    /// # 参数
    /// - `layer`: 播放器根节点挂载的父节点
    /// - `target`: 动画作用的目标节点
    /// - `dedup`: 本帧的全屏动画去重集合
    #[allow(clippy::too_many_arguments)]
    pub fn setup(
        &mut self,
        layer: &SpriteNode,
        target: &SpriteNode,
        resource: Rc<AnimationResource>,
        mirror: bool,
        delay: u32,
        loader: &mut dyn AssetLoader,
        dedup: &mut AnimationDedup,
    ) {
        self.remove();

        self.target = Some(target.clone());
        self.mirror = mirror;
        self.delay = delay;
        self.rate = ANIMATION_RATE;
        self.duration = resource.frame_count() as u32 * self.rate + 1;
        self.flash_color = Color::CLEAR;
        self.flash_duration = 0;
        self.screen_flash_duration = 0;
        self.hiding_duration = 0;

        self.bitmap1 = Some(load_sheet(
            loader,
            &resource.animation1_name,
            resource.animation1_hue,
        ));
        self.bitmap2 = Some(load_sheet(
            loader,
            &resource.animation2_name,
            resource.animation2_hue,
        ));

        self.resource = Some(resource);
        self.create_nodes(dedup);
        layer.add_child(&self.root);
    }

    fn create_nodes(&mut self, dedup: &mut AnimationDedup) {
        let Some(resource) = self.resource.clone() else {
            return;
        };
        let id = resource.id;

        for node in self.root.children() {
            self.root.remove_child(&node);
        }
        self.cells.clear();
        self.screen_flash = None;

        if !dedup.nodes_claimed(id) {
            for _ in 0..MAX_CELLS {
                let cell = SpriteNode::new();
                cell.set_visible(false);
                self.root.add_child(&cell);
                self.cells.push(cell);
            }
            if resource.is_screen() {
                dedup.claim_nodes(id);
            }
            let flash = SpriteNode::new();
            flash.set_opacity(0.0);
            flash.set_visible(false);
            self.root.add_child(&flash);
            self.screen_flash = Some(flash);
        }

        if dedup.sound_claimed(id) {
            self.duplicated = true;
        } else {
            self.duplicated = false;
            if resource.is_screen() {
                dedup.claim_sound(id);
            }
        }
    }

    /// 撤下播放器
    ///
    /// 只有确实从父节点上移除时才复原目标的混合色和可见性。
    pub fn remove(&mut self) -> bool {
        if !self.root.remove_from_parent() {
            return false;
        }
        if let Some(target) = &self.target {
            target.set_blend_color(Color::CLEAR);
            target.show();
        }
        true
    }

    /// 推进一帧
    pub fn update(&mut self, sound: &mut dyn SoundSink) {
        self.update_main(sound);
        self.update_flash();
        self.update_screen_flash();
        self.update_hiding();
    }

    pub fn is_playing(&self) -> bool {
        self.duration > 0
    }

    /// 两张动画图是否都已就绪
    pub fn is_ready(&self) -> bool {
        matches!(
            (&self.bitmap1, &self.bitmap2),
            (Some(b1), Some(b2)) if b1.is_ready() && b2.is_ready()
        )
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn is_duplicated(&self) -> bool {
        self.duplicated
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror
    }

    pub fn root(&self) -> &SpriteNode {
        &self.root
    }

    pub fn cells(&self) -> &[SpriteNode] {
        &self.cells
    }

    pub fn screen_flash_node(&self) -> Option<&SpriteNode> {
        self.screen_flash.as_ref()
    }

    pub fn resource(&self) -> Option<&Rc<AnimationResource>> {
        self.resource.as_ref()
    }

    pub fn flash_color(&self) -> Color {
        self.flash_color
    }

    pub fn is_hiding_target(&self) -> bool {
        self.hiding_duration > 0
    }

    fn update_main(&mut self, sound: &mut dyn SoundSink) {
        if !self.is_playing() {
            return;
        }
        if !self.is_ready() {
            trace!(duration = self.duration, "动画图未就绪，暂停播放");
            return;
        }
        if self.delay > 0 {
            self.delay -= 1;
            return;
        }
        self.duration -= 1;
        self.update_position();
        if self.duration % self.rate == 0 {
            self.update_frame(sound);
        }
    }

    fn update_position(&mut self) {
        let Some(resource) = &self.resource else {
            return;
        };
        if resource.position == AnimationPosition::Screen {
            self.root
                .set_position(self.viewport.x / 2.0, self.viewport.y / 2.0);
            return;
        }
        let Some(target) = &self.target else {
            return;
        };

        let origin = self
            .root
            .parent()
            .map(|layer| layer.absolute_position())
            .unwrap_or_default();
        let mut pos = target.absolute_position() - origin;
        match resource.position {
            AnimationPosition::Head => pos.y -= target.height(),
            AnimationPosition::Center => pos.y -= target.height() / 2.0,
            _ => {}
        }
        self.root.set_position(pos.x, pos.y);
    }

    /// 当前帧序号
    pub fn current_frame_index(&self) -> usize {
        let Some(resource) = &self.resource else {
            return 0;
        };
        let shown = (self.duration + self.rate - 1) / self.rate;
        resource.frame_count().saturating_sub(shown as usize)
    }

    fn update_frame(&mut self, sound: &mut dyn SoundSink) {
        if self.duration == 0 {
            return;
        }
        let Some(resource) = self.resource.clone() else {
            return;
        };
        let index = self.current_frame_index();
        if let Some(frame) = resource.frames.get(index) {
            self.apply_frame(frame);
        }
        for timing in resource.timings_at(index) {
            self.process_timing(timing, sound);
        }
    }

    fn apply_frame(&self, frame: &[CellData]) {
        for (i, node) in self.cells.iter().enumerate() {
            match frame.get(i) {
                Some(cell) => self.apply_cell(node, cell),
                None => node.set_visible(false),
            }
        }
    }

    fn apply_cell(&self, node: &SpriteNode, cell: &CellData) {
        if cell.pattern < 0 {
            node.set_visible(false);
            return;
        }
        let pattern = cell.pattern;
        let sx = (pattern % 5) as f32 * CELL_SIZE;
        let sy = (pattern % 100 / 5) as f32 * CELL_SIZE;
        let bitmap = if pattern < 100 {
            self.bitmap1.clone()
        } else {
            self.bitmap2.clone()
        };
        node.set_bitmap(bitmap);
        node.set_frame(sx, sy, CELL_SIZE, CELL_SIZE);

        let mut x = cell.x;
        let mut rotation = cell.rotation * PI / 180.0;
        let mut scale_x = cell.scale / 100.0;
        if cell.mirror {
            scale_x = -scale_x;
        }
        if self.mirror {
            x = -x;
            rotation = -rotation;
            scale_x = -scale_x;
        }

        node.set_position(x, cell.y);
        node.set_rotation(rotation);
        node.set_scale(scale_x, cell.scale / 100.0);
        node.set_opacity(cell.opacity);
        node.set_blend_mode(cell.blend);
        node.set_visible(true);
    }

    fn process_timing(&mut self, timing: &TimingCue, sound: &mut dyn SoundSink) {
        let duration = timing.flash_duration * self.rate;
        match timing.flash_scope {
            FlashScope::Target => self.start_flash(timing.flash_color, duration),
            FlashScope::Screen => self.start_screen_flash(timing.flash_color, duration),
            FlashScope::HideTarget => self.start_hiding(duration),
            FlashScope::None => {}
        }
        if !self.duplicated
            && let Some(se) = &timing.se
        {
            sound.play_se(se);
        }
    }

    fn start_flash(&mut self, color: Color, duration: u32) {
        self.flash_color = color;
        self.flash_duration = duration;
    }

    fn start_screen_flash(&mut self, color: Color, duration: u32) {
        self.screen_flash_duration = duration;
        if let Some(node) = &self.screen_flash {
            node.set_blend_color(color.with_alpha(255.0));
            node.set_opacity(color.a);
            node.set_visible(duration > 0);
        }
    }

    fn start_hiding(&mut self, duration: u32) {
        self.hiding_duration = duration;
        if let Some(target) = &self.target {
            target.hide();
        }
    }

    fn update_flash(&mut self) {
        if self.flash_duration == 0 {
            return;
        }
        let d = self.flash_duration as f32;
        self.flash_duration -= 1;
        self.flash_color.a = self.flash_color.a * (d - 1.0) / d;
        if let Some(target) = &self.target {
            target.set_blend_color(self.flash_color);
        }
    }

    fn update_screen_flash(&mut self) {
        if self.screen_flash_duration == 0 {
            return;
        }
        let d = self.screen_flash_duration as f32;
        self.screen_flash_duration -= 1;
        if let Some(node) = &self.screen_flash {
            let abs = self.root.absolute_position();
            node.set_position(-abs.x, -abs.y);
            node.set_opacity(node.opacity() * (d - 1.0) / d);
            node.set_visible(self.screen_flash_duration > 0);
        }
    }

    fn update_hiding(&mut self) {
        if self.hiding_duration == 0 {
            return;
        }
        self.hiding_duration -= 1;
        if self.hiding_duration == 0
            && let Some(target) = &self.target
        {
            target.show();
        }
    }
}

fn load_sheet(loader: &mut dyn AssetLoader, name: &str, hue: i32) -> BitmapHandle {
    if name.is_empty() {
        BitmapHandle::empty()
    } else {
        loader.load(AssetCategory::AnimationSheet, name, hue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{StaticBitmap, UniformLoader};
    use crate::node::BlendMode;
    use crate::sound::SoundLog;

    /// 所有请求共享同一张位图的加载器
    struct SharedLoader {
        bitmap: Rc<StaticBitmap>,
    }

    impl AssetLoader for SharedLoader {
        fn load(&mut self, _: AssetCategory, _: &str, _: i32) -> BitmapHandle {
            BitmapHandle::from_rc(self.bitmap.clone())
        }
    }

    fn cell(pattern: i32, x: f32, rotation: f32, mirror: bool) -> CellData {
        CellData {
            pattern,
            x,
            y: 8.0,
            scale: 100.0,
            rotation,
            mirror,
            opacity: 255.0,
            blend: BlendMode::Add,
        }
    }

    fn resource(id: u32, frames: usize, position: AnimationPosition) -> Rc<AnimationResource> {
        Rc::new(AnimationResource {
            id,
            name: format!("anim{id}"),
            animation1_name: "Hit1".into(),
            animation1_hue: 0,
            animation2_name: String::new(),
            animation2_hue: 0,
            position,
            frames: (0..frames).map(|i| vec![cell(i as i32, 10.0, 0.0, false)]).collect(),
            timings: Vec::new(),
        })
    }

    fn viewport() -> Vec2 {
        Vec2::new(816.0, 624.0)
    }

    #[test]
    fn test_duration_formula() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut dedup = AnimationDedup::new();
        let mut player = AnimationPlayer::new(viewport());
        player.setup(
            &layer,
            &target,
            resource(1, 5, AnimationPosition::Center),
            false,
            0,
            &mut loader,
            &mut dedup,
        );
        assert_eq!(player.duration(), 5 * 4 + 1);
        assert!(player.is_playing());
        assert_eq!(layer.child_count(), 1);
    }

    #[test]
    fn test_duration_decreases_by_one_per_tick() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut dedup = AnimationDedup::new();
        let mut sound = SoundLog::new();
        let mut player = AnimationPlayer::new(viewport());
        player.setup(
            &layer,
            &target,
            resource(1, 3, AnimationPosition::Center),
            false,
            0,
            &mut loader,
            &mut dedup,
        );

        let mut last = player.duration();
        while player.is_playing() {
            player.update(&mut sound);
            assert_eq!(player.duration(), last - 1);
            last = player.duration();
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_stalls_while_not_ready() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let bitmap = Rc::new(StaticBitmap::pending(960, 960));
        let mut loader = SharedLoader {
            bitmap: bitmap.clone(),
        };
        let mut dedup = AnimationDedup::new();
        let mut sound = SoundLog::new();
        let mut player = AnimationPlayer::new(viewport());
        player.setup(
            &layer,
            &target,
            resource(1, 2, AnimationPosition::Center),
            false,
            3,
            &mut loader,
            &mut dedup,
        );

        for _ in 0..10 {
            player.update(&mut sound);
        }
        assert!(!player.is_ready());
        assert_eq!(player.duration(), 9);
        assert_eq!(player.delay(), 3);

        bitmap.set_ready(true);
        player.update(&mut sound);
        // 先消耗延迟
        assert_eq!(player.delay(), 2);
        assert_eq!(player.duration(), 9);
    }

    #[test]
    fn test_frame_progression_and_hidden_extra_cells() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut dedup = AnimationDedup::new();
        let mut sound = SoundLog::new();
        let mut player = AnimationPlayer::new(viewport());
        player.setup(
            &layer,
            &target,
            resource(1, 3, AnimationPosition::Feet),
            false,
            0,
            &mut loader,
            &mut dedup,
        );

        player.update(&mut sound);
        assert_eq!(player.current_frame_index(), 0);
        assert_eq!(player.cells().len(), MAX_CELLS);
        assert!(player.cells()[0].visible());
        assert!(player.cells()[1..].iter().all(|c| !c.visible()));
        assert_eq!(player.cells()[0].frame().x, 0.0);

        for _ in 0..4 {
            player.update(&mut sound);
        }
        assert_eq!(player.current_frame_index(), 1);
        assert_eq!(player.cells()[0].frame().x, CELL_SIZE);
    }

    #[test]
    fn test_source_rect_and_second_sheet() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut dedup = AnimationDedup::new();
        let mut sound = SoundLog::new();
        let mut res = (*resource(9, 1, AnimationPosition::Feet)).clone();
        res.animation2_name = "Hit2".into();
        res.frames = vec![vec![cell(7, 0.0, 0.0, false), cell(112, 0.0, 0.0, false)]];
        let mut player = AnimationPlayer::new(viewport());
        player.setup(&layer, &target, Rc::new(res), false, 0, &mut loader, &mut dedup);
        player.update(&mut sound);

        let first = &player.cells()[0];
        assert_eq!(first.frame().x, 2.0 * CELL_SIZE);
        assert_eq!(first.frame().y, CELL_SIZE);
        assert!(first.bitmap().unwrap().ptr_eq(player.bitmap1.as_ref().unwrap()));

        let second = &player.cells()[1];
        // 112 % 5 = 2, (112 % 100) / 5 = 2
        assert_eq!(second.frame().x, 2.0 * CELL_SIZE);
        assert_eq!(second.frame().y, 2.0 * CELL_SIZE);
        assert!(second.bitmap().unwrap().ptr_eq(player.bitmap2.as_ref().unwrap()));
    }

    #[test]
    fn test_mirror_composition() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut sound = SoundLog::new();

        let mut res = (*resource(2, 1, AnimationPosition::Feet)).clone();
        res.frames = vec![vec![cell(0, 10.0, 90.0, false), cell(1, 10.0, 90.0, true)]];
        let res = Rc::new(res);

        let mut plain = AnimationPlayer::new(viewport());
        plain.setup(&layer, &target, res.clone(), false, 0, &mut loader, &mut AnimationDedup::new());
        plain.update(&mut sound);
        assert_eq!(plain.cells()[0].scale().x, 1.0);
        assert_eq!(plain.cells()[1].scale().x, -1.0);
        assert_eq!(plain.cells()[1].position().x, 10.0);

        let mut mirrored = AnimationPlayer::new(viewport());
        mirrored.setup(&layer, &target, res, true, 0, &mut loader, &mut AnimationDedup::new());
        mirrored.update(&mut sound);
        let a = &mirrored.cells()[0];
        assert_eq!(a.position().x, -10.0);
        assert_eq!(a.scale().x, -1.0);
        assert!((a.rotation() + PI / 2.0).abs() < 1e-6);
        // 两个镜像叠加后恢复
        let b = &mirrored.cells()[1];
        assert_eq!(b.scale().x, 1.0);
        assert_eq!(b.position().x, -10.0);
    }

    #[test]
    fn test_position_modes() {
        let field = SpriteNode::new();
        let battler = SpriteNode::new();
        let body = SpriteNode::new();
        battler.set_position(300.0, 200.0);
        body.set_frame(0.0, 0.0, 64.0, 40.0);
        field.add_child(&battler);
        battler.add_child(&body);

        let mut loader = UniformLoader::new(960, 960);
        let mut sound = SoundLog::new();
        let cases = [
            (AnimationPosition::Head, Vec2::new(300.0, 160.0)),
            (AnimationPosition::Center, Vec2::new(300.0, 180.0)),
            (AnimationPosition::Feet, Vec2::new(300.0, 200.0)),
            (AnimationPosition::Screen, Vec2::new(408.0, 312.0)),
        ];
        for (i, (position, expected)) in cases.into_iter().enumerate() {
            let mut player = AnimationPlayer::new(viewport());
            player.setup(
                &field,
                &body,
                resource(i as u32, 1, position),
                false,
                0,
                &mut loader,
                &mut AnimationDedup::new(),
            );
            player.update(&mut sound);
            assert_eq!(player.root().position(), expected, "{position:?}");
        }
    }

    #[test]
    fn test_screen_animation_dedup() {
        let layer = SpriteNode::new();
        let a = SpriteNode::new();
        let b = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut dedup = AnimationDedup::new();
        let mut sound = SoundLog::new();

        let mut res = (*resource(40, 2, AnimationPosition::Screen)).clone();
        res.timings = vec![TimingCue {
            frame: 0,
            flash_scope: FlashScope::Screen,
            flash_color: Color::new(255.0, 255.0, 255.0, 200.0),
            flash_duration: 2,
            se: Some(crate::sound::SoundCue::new("Thunder9")),
        }];
        let res = Rc::new(res);

        let mut first = AnimationPlayer::new(viewport());
        let mut second = AnimationPlayer::new(viewport());
        first.setup(&layer, &a, res.clone(), false, 0, &mut loader, &mut dedup);
        second.setup(&layer, &b, res.clone(), false, 0, &mut loader, &mut dedup);

        assert!(!first.is_duplicated());
        assert!(second.is_duplicated());
        assert_eq!(first.cells().len(), MAX_CELLS);
        assert!(first.screen_flash_node().is_some());
        assert!(second.cells().is_empty());
        assert!(second.screen_flash_node().is_none());

        first.update(&mut sound);
        second.update(&mut sound);
        assert_eq!(sound.count_se("Thunder9"), 1);

        // 下一帧清空后再请求，不再视为重复
        dedup.begin_tick();
        let mut third = AnimationPlayer::new(viewport());
        third.setup(&layer, &a, res, false, 0, &mut loader, &mut dedup);
        assert!(!third.is_duplicated());
    }

    #[test]
    fn test_non_screen_animation_not_deduped() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut dedup = AnimationDedup::new();
        let res = resource(3, 1, AnimationPosition::Center);

        let mut first = AnimationPlayer::new(viewport());
        let mut second = AnimationPlayer::new(viewport());
        first.setup(&layer, &target, res.clone(), false, 0, &mut loader, &mut dedup);
        second.setup(&layer, &target, res, false, 0, &mut loader, &mut dedup);
        assert!(!second.is_duplicated());
        assert_eq!(second.cells().len(), MAX_CELLS);
    }

    #[test]
    fn test_target_flash_decays_and_remove_restores() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut sound = SoundLog::new();
        let mut res = (*resource(5, 4, AnimationPosition::Center)).clone();
        res.timings = vec![TimingCue {
            frame: 0,
            flash_scope: FlashScope::Target,
            flash_color: Color::new(255.0, 255.0, 255.0, 160.0),
            flash_duration: 1,
            se: None,
        }];
        let mut player = AnimationPlayer::new(viewport());
        player.setup(&layer, &target, Rc::new(res), false, 0, &mut loader, &mut AnimationDedup::new());

        // 第一帧：触发闪光（持续 4 tick）并立即衰减一次
        player.update(&mut sound);
        assert_eq!(target.blend_color().a, 160.0 * 3.0 / 4.0);
        player.update(&mut sound);
        assert_eq!(target.blend_color().a, 160.0 * 3.0 / 4.0 * 2.0 / 3.0);
        player.update(&mut sound);
        player.update(&mut sound);
        assert_eq!(target.blend_color().a, 0.0);

        target.set_blend_color(Color::WHITE);
        target.hide();
        assert!(player.remove());
        assert!(target.blend_color().is_clear());
        assert!(target.is_shown());
        // 已撤下，再次调用无效果
        assert!(!player.remove());
    }

    #[test]
    fn test_hide_target_restored_after_timer() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut sound = SoundLog::new();
        let mut res = (*resource(6, 4, AnimationPosition::Center)).clone();
        res.timings = vec![TimingCue {
            frame: 0,
            flash_scope: FlashScope::HideTarget,
            flash_color: Color::CLEAR,
            flash_duration: 2,
            se: None,
        }];
        let mut player = AnimationPlayer::new(viewport());
        player.setup(&layer, &target, Rc::new(res), false, 0, &mut loader, &mut AnimationDedup::new());

        player.update(&mut sound);
        assert!(target.is_hidden());
        // 8 tick 的隐藏，第一帧已经消耗 1
        for _ in 0..6 {
            player.update(&mut sound);
        }
        assert!(target.is_hidden());
        player.update(&mut sound);
        assert!(!target.is_hidden());
    }

    #[test]
    fn test_screen_flash_node_fades() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut sound = SoundLog::new();
        let mut res = (*resource(8, 4, AnimationPosition::Screen)).clone();
        res.timings = vec![TimingCue {
            frame: 0,
            flash_scope: FlashScope::Screen,
            flash_color: Color::new(255.0, 0.0, 0.0, 200.0),
            flash_duration: 1,
            se: None,
        }];
        let mut player = AnimationPlayer::new(viewport());
        player.setup(&layer, &target, Rc::new(res), false, 0, &mut loader, &mut AnimationDedup::new());

        player.update(&mut sound);
        let flash = player.screen_flash_node().unwrap().clone();
        assert_eq!(flash.opacity(), 150.0);
        assert!(flash.visible());
        // 覆盖层始终位于画面原点
        assert_eq!(flash.absolute_position(), Vec2::zero());
        for _ in 0..3 {
            player.update(&mut sound);
        }
        assert_eq!(flash.opacity(), 0.0);
        assert!(!flash.visible());
    }

    #[test]
    fn test_resetup_supersedes_playback() {
        let layer = SpriteNode::new();
        let target = SpriteNode::new();
        let mut loader = UniformLoader::new(960, 960);
        let mut sound = SoundLog::new();
        let mut player = AnimationPlayer::new(viewport());
        player.setup(&layer, &target, resource(1, 5, AnimationPosition::Center), false, 0, &mut loader, &mut AnimationDedup::new());
        for _ in 0..6 {
            player.update(&mut sound);
        }
        target.hide();

        player.setup(&layer, &target, resource(2, 2, AnimationPosition::Center), false, 0, &mut loader, &mut AnimationDedup::new());
        assert_eq!(player.duration(), 9);
        assert_eq!(player.resource().unwrap().id, 2);
        // 旧播放撤下时复原目标
        assert!(target.is_shown());
        assert_eq!(layer.child_count(), 1);
        assert_eq!(player.root().child_count(), MAX_CELLS + 1);
    }
}
