//! 启动场景

use stage_runtime::{AssetCategory, Scene, SceneBase, SceneContext, SceneKind, StageError};
use tracing::{debug, info};

use super::StageServices;

/// 启动时预载的系统图
pub const SYSTEM_IMAGES: [&str; 6] = [
    "Shadow2", "Damage", "States", "Weapons1", "Weapons2", "Weapons3",
];

/// 启动场景
///
/// 加载数据库并预载系统图，全部就绪后进入标题或战斗测试。
/// 超过 `boot_timeout_frames` 仍未就绪时报 [`StageError::BootTimeout`]。
#[derive(Debug)]
pub struct BootScene {
    base: SceneBase,
    waited: u32,
    timeout: u32,
}

impl BootScene {
    pub fn new(services: &StageServices) -> Self {
        Self {
            base: services.scene_base(),
            waited: 0,
            timeout: services.timing.boot_timeout_frames,
        }
    }
}

impl Scene<StageServices> for BootScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Boot
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn create(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        services.game.load_database();
        for name in SYSTEM_IMAGES {
            services.resources.reserve(AssetCategory::SystemSheet, name);
        }
    }

    fn is_ready(&mut self, ctx: &mut SceneContext<'_, StageServices>) -> bool {
        let services = &mut *ctx.services;
        if services.game.is_database_loaded() && services.resources.is_ready() {
            debug!(frames = self.waited, "启动资源就绪");
            return true;
        }
        self.waited += 1;
        if self.waited >= self.timeout {
            services.fail(StageError::BootTimeout {
                frames: self.waited,
            });
        }
        false
    }

    fn start(&mut self, ctx: &mut SceneContext<'_, StageServices>) {
        let services = &mut *ctx.services;
        if services.game.is_battle_test() {
            info!("战斗测试");
            services.game.setup_battle_test();
            ctx.nav.goto(SceneKind::Battle);
            return;
        }
        match services.game.check_player_location() {
            Ok(()) => ctx.nav.goto(SceneKind::Title),
            Err(e) => services.fail(e),
        }
    }
}
