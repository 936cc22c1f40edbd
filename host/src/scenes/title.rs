//! 标题场景

use stage_runtime::{Scene, SceneBase, SceneContext, SceneKind};
use tracing::debug;

use super::{StageServices, TITLE_BGM, resources_ready};
use crate::input::InputCommand;
use crate::ui::WindowOpenness;

const COMMANDS: [InputCommand; 4] = [
    InputCommand::NewGame,
    InputCommand::Continue,
    InputCommand::Options,
    InputCommand::Exit,
];

/// 标题场景
#[derive(Debug)]
pub struct TitleScene {
    base: SceneBase,
    command_window: WindowOpenness,
}

impl TitleScene {
    pub fn new(services: &StageServices) -> Self {
        Self {
            base: services.scene_base(),
            command_window: WindowOpenness::new(),
        }
    }

    pub fn command_window(&self) -> &WindowOpenness {
        &self.command_window
    }

    fn handle_command(&mut self, command: InputCommand, ctx: &mut SceneContext<'_, StageServices>) {
        debug!(%command, "标题指令");
        let services = &mut *ctx.services;
        match command {
            InputCommand::NewGame => {
                services.game.setup_new_game();
                self.command_window.close();
                self.base.fade_out_all(&mut services.audio);
                ctx.nav.goto(SceneKind::Map);
            }
            InputCommand::Continue | InputCommand::Options => {
                self.command_window.hide();
                ctx.nav.reserve_current();
                let next = if command == InputCommand::Continue {
                    SceneKind::Load
                } else {
                    SceneKind::Options
                };
                ctx.nav.push(next);
            }
            InputCommand::Exit => {
                self.command_window.close();
                ctx.nav.exit();
            }
            _ => {}
        }
    }
}

impl Scene<StageServices> for TitleScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Title
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn create(&mut self, _ctx: &mut SceneContext<'_, StageServices>) {
        self.command_window.open();
    }

    fn is_ready(&mut self, ctx: &mut SceneContext<'_, StageServices>) -> bool {
        resources_ready(ctx)
    }

    fn start(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.nav.clear_stack();
        let audio = &mut ctx.services.audio;
        audio.play_bgm(TITLE_BGM);
        audio.stop_me();
        self.base.start_fade_in(self.base.fade_speed(), false);
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if self.base.is_active() && !ctx.nav.is_scene_changing() && self.command_window.is_open() {
            let services = &mut *ctx.services;
            let command = services.input.trigger_any(&COMMANDS).or_else(|| {
                services
                    .game
                    .is_auto_play()
                    .then_some(InputCommand::NewGame)
            });
            if let Some(command) = command {
                self.handle_command(command, ctx);
            }
        }
        self.command_window.update();
        self.base.update();
    }

    fn stop(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        ctx.nav.snap_for_background();
    }

    fn is_busy(&self) -> bool {
        self.command_window.is_closing() || self.base.is_busy()
    }

    fn resume(&mut self, _ctx: &mut SceneContext<'_, StageServices>) {
        self.command_window.show();
    }
}
