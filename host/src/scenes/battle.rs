//! 战斗场景

use stage_runtime::{BattleStatus, Scene, SceneBase, SceneContext, SceneKind};
use tracing::{debug, info, warn};

use super::{BATTLE_BGM, StageServices, VICTORY_ME, resources_ready};
use crate::demo::{BattleCommand, BattleResult};
use crate::input::InputCommand;
use crate::spriteset::BattleSpriteset;

const COMMANDS: [InputCommand; 3] = [
    InputCommand::Attack,
    InputCommand::Guard,
    InputCommand::Escape,
];

fn battle_command(command: InputCommand) -> Option<BattleCommand> {
    match command {
        InputCommand::Attack => Some(BattleCommand::Attack),
        InputCommand::Guard => Some(BattleCommand::Guard),
        InputCommand::Escape => Some(BattleCommand::Escape),
        _ => None,
    }
}

/// 战斗场景
///
/// 战斗进程只在场景活动、且画面没有移动、动画和效果时推进一步。
#[derive(Debug)]
pub struct BattleScene {
    base: SceneBase,
    spriteset: Option<BattleSpriteset>,
}

impl BattleScene {
    pub fn new(services: &StageServices) -> Self {
        Self {
            base: services.scene_base(),
            spriteset: None,
        }
    }

    pub fn spriteset(&self) -> Option<&BattleSpriteset> {
        self.spriteset.as_ref()
    }

    fn is_spriteset_busy(&self) -> bool {
        self.spriteset.as_ref().is_some_and(|s| s.is_busy())
    }

    fn is_spriteset_effecting(&self) -> bool {
        self.spriteset.as_ref().is_some_and(|s| s.is_effecting())
    }

    fn update_battle_process(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        let inputting = services.game.battle().is_some_and(|b| b.is_inputting());
        let command = if inputting {
            services
                .input
                .trigger_any(&COMMANDS)
                .and_then(battle_command)
                .or_else(|| {
                    services
                        .game
                        .is_auto_play()
                        .then_some(BattleCommand::Attack)
                })
        } else {
            None
        };
        if let Some(battle) = services.game.battle_mut() {
            battle.update(command);
        }
    }

    fn update_battle_end(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        let Some(result) = services.game.battle_mut().and_then(|b| b.take_end()) else {
            return;
        };
        info!(?result, "战斗结束");
        match result {
            BattleResult::Victory | BattleResult::Escape => {
                if result == BattleResult::Victory {
                    services.audio.play_me(VICTORY_ME);
                }
                if services.game.is_battle_test() {
                    ctx.nav.exit();
                } else {
                    ctx.nav.goto(SceneKind::Map);
                }
            }
            BattleResult::Defeat => ctx.nav.goto(SceneKind::Gameover),
        }
    }

    fn needs_slow_fade_out(ctx: &SceneContext<'_, StageServices>) -> bool {
        ctx.nav.is_next_scene(SceneKind::Title)
            || ctx.nav.is_next_scene(SceneKind::Gameover)
            || ctx.nav.is_next_scene(SceneKind::Map)
    }
}

impl Scene<StageServices> for BattleScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Battle
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn create(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        if services.game.battle().is_none() {
            warn!("进入战斗场景时没有战斗，重新准备");
            services.game.setup_battle();
        }
        let Some(battle) = services.game.battle() else {
            return;
        };
        let mut spriteset = BattleSpriteset::new(
            battle,
            services.profile.clone(),
            &mut services.resources,
            services.viewport,
        );
        spriteset.set_background(ctx.nav.background_source());
        self.spriteset = Some(spriteset);
    }

    fn is_ready(&mut self, ctx: &mut SceneContext<'_, StageServices>) -> bool {
        resources_ready(ctx)
    }

    fn start(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        self.base.start_fade_in(self.base.fade_speed(), false);
        let services = &mut *ctx.services;
        services.audio.play_bgm(BATTLE_BGM);
        if let Some(battle) = services.game.battle_mut() {
            battle.start();
        }
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.services.game.screen.update();
        if self.base.is_active() && !self.is_busy() && !self.is_spriteset_effecting() {
            self.update_battle_process(ctx);
            self.update_battle_end(ctx);
        }
        if let Some(spriteset) = self.spriteset.as_mut() {
            let services = &mut *ctx.services;
            if let Some(battle) = services.game.battle() {
                spriteset.update(
                    battle,
                    services.game.screen.state(),
                    &mut services.resources,
                    &mut services.audio,
                    &services.library,
                );
            }
        }
        self.base.update();
    }

    fn stop(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if ctx.nav.is_next_scene(SceneKind::Menu) {
            ctx.nav.snap_for_background();
        }
        if Self::needs_slow_fade_out(ctx) {
            self.base.start_fade_out(self.base.slow_fade_speed(), false);
        }
    }

    fn is_busy(&self) -> bool {
        self.base.is_busy() || self.is_spriteset_busy()
    }

    fn terminate(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        let result = services.game.end_battle();
        debug!(?result, "销毁战斗场景");
        // 销毁在下一场景 create 之后：游戏结束场景已经开始播放自己的 ME
        if ctx.nav.current_scene() != Some(SceneKind::Gameover) {
            services.audio.stop_me();
        }
    }
}
