//! 菜单类场景（主菜单、设置、读档）
//!
//! 三者共用一个实现：以上一场景的快照为背景，打开一个指令窗口，
//! 取消时返回上一场景。

use stage_runtime::{Scene, SceneBase, SceneContext, SceneKind};
use tracing::{debug, info};

use super::{StageServices, resources_ready};
use crate::input::InputCommand;
use crate::ui::WindowOpenness;

/// 菜单类场景
#[derive(Debug)]
pub struct GuiScene {
    kind: SceneKind,
    base: SceneBase,
    window: WindowOpenness,
    background: Option<SceneKind>,
    load_success: bool,
}

impl GuiScene {
    pub fn new(kind: SceneKind, services: &StageServices) -> Self {
        debug_assert!(kind.is_gui());
        Self {
            kind,
            base: services.scene_base(),
            window: WindowOpenness::new(),
            background: None,
            load_success: false,
        }
    }

    /// 背景快照来自哪个场景
    pub fn background_source(&self) -> Option<SceneKind> {
        self.background
    }

    pub fn window(&self) -> &WindowOpenness {
        &self.window
    }

    fn commands(&self) -> &'static [InputCommand] {
        match self.kind {
            SceneKind::Menu => &[
                InputCommand::Cancel,
                InputCommand::Options,
                InputCommand::Title,
            ],
            SceneKind::Load => &[InputCommand::Cancel, InputCommand::Load],
            _ => &[InputCommand::Cancel],
        }
    }

    fn handle_command(&mut self, command: InputCommand, ctx: &mut SceneContext<'_, StageServices>) {
        debug!(scene = %self.kind, %command, "菜单指令");
        match command {
            InputCommand::Cancel => ctx.nav.pop(),
            InputCommand::Options => {
                self.window.hide();
                ctx.nav.reserve_current();
                ctx.nav.push(SceneKind::Options);
            }
            InputCommand::Title => {
                self.base.fade_out_all(&mut ctx.services.audio);
                ctx.nav.goto(SceneKind::Title);
            }
            InputCommand::Load => {
                info!("读档");
                self.base.fade_out_all(&mut ctx.services.audio);
                ctx.nav.goto(SceneKind::Map);
                self.load_success = true;
            }
            _ => {}
        }
    }
}

impl Scene<StageServices> for GuiScene {
    fn kind(&self) -> SceneKind {
        self.kind
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn create(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        self.background = ctx.nav.background_source();
        self.window.open();
    }

    fn is_ready(&mut self, ctx: &mut SceneContext<'_, StageServices>) -> bool {
        resources_ready(ctx)
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if self.base.is_active() && !ctx.nav.is_scene_changing() && self.window.is_open() {
            let commands = self.commands();
            if let Some(command) = ctx.services.input.trigger_any(commands) {
                self.handle_command(command, ctx);
            }
        }
        self.window.update();
        self.base.update();
    }

    fn terminate(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        if self.load_success {
            ctx.services.game.on_after_load();
        }
    }

    fn resume(&mut self, _ctx: &mut SceneContext<'_, StageServices>) {
        self.window.show();
    }
}
