//! 游戏结束场景

use stage_runtime::{Scene, SceneBase, SceneContext, SceneKind};

use super::{GAMEOVER_ME, StageServices, resources_ready};
use crate::input::InputCommand;

/// 游戏结束场景：确认后回到标题
#[derive(Debug)]
pub struct GameoverScene {
    base: SceneBase,
}

impl GameoverScene {
    pub fn new(services: &StageServices) -> Self {
        Self {
            base: services.scene_base(),
        }
    }
}

impl Scene<StageServices> for GameoverScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Gameover
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn create(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let audio = &mut ctx.services.audio;
        audio.stop_bgm();
        audio.play_me(GAMEOVER_ME);
    }

    fn is_ready(&mut self, ctx: &mut SceneContext<'_, StageServices>) -> bool {
        resources_ready(ctx)
    }

    fn start(&mut self, _ctx: &mut SceneContext<'_, StageServices>) {
        self.base.start_fade_in(self.base.slow_fade_speed(), false);
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if self.base.is_active() && !self.is_busy() {
            let services = &mut *ctx.services;
            if services.input.trigger(InputCommand::Ok) || services.game.is_auto_play() {
                ctx.nav.goto(SceneKind::Title);
            }
        }
        self.base.update();
    }

    fn stop(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        self.base.fade_out_all(&mut ctx.services.audio);
    }

    fn terminate(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.services.audio.stop_all();
    }
}
