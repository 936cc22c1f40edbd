//! # Scenes 模块
//!
//! 具体场景：把表现核心、演示游戏状态与宿主服务组装起来。
//!
//! ## 模块结构
//!
//! - [`boot`]：启动，等待数据库与系统图
//! - [`title`]：标题画面
//! - [`map`]：地图与遇敌效果
//! - [`battle`]：战斗
//! - [`gui`]：菜单、设置、读档
//! - [`gameover`]：游戏结束
//!
//! 所有场景共享一个 [`StageServices`]，由 [`create_scene`] 按种类构造。

pub mod battle;
pub mod boot;
pub mod gameover;
pub mod gui;
pub mod map;
pub mod title;

pub use battle::BattleScene;
pub use boot::BootScene;
pub use gameover::GameoverScene;
pub use gui::GuiScene;
pub use map::MapScene;
pub use title::TitleScene;

use std::rc::Rc;

use stage_runtime::{
    AnimationLibrary, MotionProfile, Scene, SceneBase, SceneContext, SceneKind, StageError, Vec2,
};

use crate::audio::AudioManager;
use crate::config::TimingConfig;
use crate::demo::GameState;
use crate::input::InputManager;
use crate::resources::ResourceManager;

/// 标题 BGM
pub const TITLE_BGM: &str = "Theme6";
/// 地图 BGM
pub const MAP_BGM: &str = "Field1";
/// 战斗 BGM
pub const BATTLE_BGM: &str = "Battle1";
/// 战斗开始音效
pub const BATTLE_START_SE: &str = "Battle1";
/// 胜利 ME
pub const VICTORY_ME: &str = "Victory1";
/// 游戏结束 ME
pub const GAMEOVER_ME: &str = "Gameover1";

/// 场景共享的宿主服务
#[derive(Debug)]
pub struct StageServices {
    pub timing: TimingConfig,
    pub resources: ResourceManager,
    pub audio: AudioManager,
    pub game: GameState,
    pub library: AnimationLibrary,
    pub profile: Rc<MotionProfile>,
    pub viewport: Vec2,
    pub input: InputManager,
    /// 启动阶段的致命错误，由帧驱动取走
    pub fatal: Option<StageError>,
}

impl StageServices {
    /// 记录致命错误（只保留第一个）
    pub fn fail(&mut self, error: StageError) {
        if self.fatal.is_none() {
            tracing::error!(error = %error, "场景运行失败");
            self.fatal = Some(error);
        }
    }

    /// 按配置的速度创建场景公共状态
    pub fn scene_base(&self) -> SceneBase {
        SceneBase::new().with_fade_speed(self.timing.fade_speed)
    }
}

/// 所有已请求的位图就绪
pub(crate) fn resources_ready(ctx: &SceneContext<'_, StageServices>) -> bool {
    ctx.services.resources.is_ready()
}

/// 场景工厂
pub fn create_scene(kind: SceneKind, services: &mut StageServices) -> Box<dyn Scene<StageServices>> {
    match kind {
        SceneKind::Boot => Box::new(BootScene::new(services)),
        SceneKind::Title => Box::new(TitleScene::new(services)),
        SceneKind::Map => Box::new(MapScene::new(services)),
        SceneKind::Battle => Box::new(BattleScene::new(services)),
        SceneKind::Menu | SceneKind::Options | SceneKind::Load => {
            Box::new(GuiScene::new(kind, services))
        }
        SceneKind::Gameover => Box::new(GameoverScene::new(services)),
    }
}
