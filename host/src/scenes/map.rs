//! 地图场景
//!
//! 地图本身不绘制，只保留场景切换相关的行为：
//! 传送后的淡入、菜单呼出、遇敌以及进入战斗前的遇敌效果。

use stage_runtime::{
    AssetCategory, AssetLoader, BitmapHandle, Color, Scene, SceneBase, SceneContext, SceneKind,
    SoundCue, SoundSink,
};
use tracing::debug;

use super::{BATTLE_BGM, BATTLE_START_SE, MAP_BGM, StageServices, resources_ready};
use crate::input::InputCommand;

/// 遇敌效果的帧数
pub const ENCOUNTER_EFFECT_SPEED: u32 = 60;

/// 自动运行时在地图上停留多少帧后遇敌
pub const AUTO_ENCOUNTER_FRAMES: u32 = 90;

/// 玩家行走图
const PLAYER_SHEET: &str = "Actor1";

/// 地图场景
#[derive(Debug)]
pub struct MapScene {
    base: SceneBase,
    transfer: bool,
    map_loaded: bool,
    player_sheet: Option<BitmapHandle>,
    wait_count: u32,
    encounter_effect_duration: u32,
    /// 场景开始后经过的帧数
    frames: u32,
}

impl MapScene {
    pub fn new(services: &StageServices) -> Self {
        Self {
            base: services.scene_base(),
            transfer: false,
            map_loaded: false,
            player_sheet: None,
            wait_count: 0,
            encounter_effect_duration: 0,
            frames: 0,
        }
    }

    pub fn encounter_effect_duration(&self) -> u32 {
        self.encounter_effect_duration
    }

    fn needs_fade_in(ctx: &SceneContext<'_, StageServices>) -> bool {
        ctx.nav.is_previous_scene(SceneKind::Battle) || ctx.nav.is_previous_scene(SceneKind::Load)
    }

    fn needs_slow_fade_out(ctx: &SceneContext<'_, StageServices>) -> bool {
        ctx.nav.is_next_scene(SceneKind::Title) || ctx.nav.is_next_scene(SceneKind::Gameover)
    }

    /// 检查全灭、遇敌与菜单呼出
    fn update_scene(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let all_dead = ctx.services.game.is_party_all_dead();
        ctx.check_gameover(all_dead);
        if !ctx.nav.is_scene_changing() {
            self.update_encounter(ctx);
        }
        if !ctx.nav.is_scene_changing() {
            self.update_call_menu(ctx);
        }
    }

    fn update_encounter(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        let triggered = services.input.trigger(InputCommand::Encounter)
            || (services.game.is_auto_play() && self.frames >= AUTO_ENCOUNTER_FRAMES);
        if triggered {
            services.game.setup_battle();
            ctx.nav.goto(SceneKind::Battle);
        }
    }

    fn update_call_menu(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if ctx.services.input.trigger(InputCommand::Menu) {
            ctx.nav.reserve_current();
            ctx.nav.push(SceneKind::Menu);
            self.wait_count = 2;
        }
    }

    fn launch_battle(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let audio = &mut ctx.services.audio;
        audio.stop_bgm();
        audio.stop_me();
        audio.play_se(&SoundCue::new(BATTLE_START_SE));
        self.encounter_effect_duration = ENCOUNTER_EFFECT_SPEED;
    }

    /// 遇敌效果：放大、两次白色闪光，后半段淡出
    fn update_encounter_effect(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if self.encounter_effect_duration == 0 {
            return;
        }
        self.encounter_effect_duration -= 1;
        let speed = ENCOUNTER_EFFECT_SPEED;
        let n = speed - self.encounter_effect_duration;
        let p = n as f32 / speed as f32;
        let q = 2.0 * p * p + 1.0;
        let zoom_x = ctx.services.viewport.x / 2.0;
        let zoom_y = ctx.services.viewport.y / 2.0 - 24.0;
        if n == 2 {
            ctx.nav.snap_for_background();
            ctx.services.game.screen.start_flash(Color::WHITE, speed / 2);
        }
        ctx.services.game.screen.set_zoom(zoom_x, zoom_y, q);
        if n == speed / 6 {
            ctx.services.game.screen.start_flash(Color::WHITE, speed / 2);
        }
        if n == speed / 2 {
            ctx.services.audio.play_bgm(BATTLE_BGM);
            self.base.start_fade_out(self.base.fade_speed(), false);
        }
    }
}

impl Scene<StageServices> for MapScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Map
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn create(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        self.transfer = services.game.is_transferring();
        debug!(map_id = services.game.map_id(), transfer = self.transfer, "加载地图");
        self.player_sheet = Some(services.resources.load(
            AssetCategory::CharacterSheet,
            PLAYER_SHEET,
            0,
        ));
    }

    fn is_ready(&mut self, ctx: &mut SceneContext<'_, StageServices>) -> bool {
        let sheet_ready = self.player_sheet.as_ref().is_none_or(|b| b.is_ready());
        if !self.map_loaded && sheet_ready {
            if self.transfer {
                ctx.services.game.perform_transfer();
            }
            self.map_loaded = true;
        }
        self.map_loaded && resources_ready(ctx)
    }

    fn start(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.nav.clear_stack();
        if self.transfer || Self::needs_fade_in(ctx) {
            self.base.start_fade_in(self.base.fade_speed(), false);
            ctx.services.audio.play_bgm(MAP_BGM);
        }
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.services.game.screen.update();
        if self.base.is_active() && !ctx.nav.is_scene_changing() {
            self.update_scene(ctx);
        } else if ctx.nav.is_next_scene(SceneKind::Battle) {
            self.update_encounter_effect(ctx);
        }
        self.wait_count = self.wait_count.saturating_sub(1);
        self.frames += 1;
        self.base.update();
    }

    fn stop(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if ctx.nav.is_next_scene(SceneKind::Menu) {
            ctx.nav.snap_for_background();
        }
        if Self::needs_slow_fade_out(ctx) {
            self.base.start_fade_out(self.base.slow_fade_speed(), false);
        } else if ctx.nav.is_next_scene(SceneKind::Battle) {
            self.launch_battle(ctx);
        }
    }

    fn is_busy(&self) -> bool {
        self.wait_count > 0 || self.encounter_effect_duration > 0 || self.base.is_busy()
    }

    fn terminate(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.services.game.screen.clear_zoom();
    }
}
