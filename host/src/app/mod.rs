//! # App 模块
//!
//! 无渲染的帧驱动：持有场景控制器与宿主服务，每次 `tick` 推进一帧。
//!
//! ## 每帧顺序
//!
//! 1. 输入脚本：本帧到达的指令入队
//! 2. 资源时钟前进（模拟加载延迟）
//! 3. 场景控制器更新（切换 → 当前场景 → 战斗画面）
//! 4. 音乐淡出推进
//! 5. 检查场景报告的致命错误，记录场景轨迹

use std::fs;
use std::path::Path;
use std::rc::Rc;

use stage_runtime::{
    AnimationLibrary, MotionProfile, SceneController, SceneKind, StageError, Vec2,
};
use tracing::{debug, info, warn};

use crate::audio::AudioManager;
use crate::config::AppConfig;
use crate::demo::{GameState, demo_animations};
use crate::error::{HostError, HostResult};
use crate::input::InputManager;
use crate::resources::ResourceManager;
use crate::scenes::{StageServices, create_scene};

/// 场景轨迹中的一条：第几帧进入了哪个场景
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTrace {
    pub frame: u64,
    pub scene: SceneKind,
}

/// 帧驱动
#[derive(Debug)]
pub struct StageApp {
    controller: SceneController<StageServices>,
    services: StageServices,
    frame: u64,
    trace: Vec<SceneTrace>,
}

impl StageApp {
    /// 按配置创建，并以启动场景开始
    pub fn new(config: &AppConfig, input: InputManager, auto_play: bool) -> HostResult<Self> {
        config.validate()?;
        let profile = load_profile(config)?;
        let library = load_animations(config)?;
        let (width, height) = config.viewport();

        let mut game = GameState::new();
        game.set_battle_test(config.battle_test);
        game.set_auto_play(auto_play);

        let mut services = StageServices {
            timing: config.timing.clone(),
            resources: ResourceManager::new(
                &config.assets_root,
                config.timing.asset_latency_frames,
            ),
            audio: AudioManager::new(),
            game,
            library,
            profile: Rc::new(profile),
            viewport: Vec2::new(width, height),
            input,
            fatal: None,
        };

        let mut controller = SceneController::new(create_scene);
        controller.run(SceneKind::Boot, &mut services);
        info!(
            profile = %config.profile,
            battle_test = config.battle_test,
            auto_play,
            "应用初始化完成"
        );

        Ok(Self {
            controller,
            services,
            frame: 0,
            trace: Vec::new(),
        })
    }

    /// 推进一帧
    pub fn tick(&mut self) -> Result<(), StageError> {
        let services = &mut self.services;
        services.input.begin_frame(self.frame);
        services.resources.tick();
        self.controller.update(services);
        services.audio.update();

        if let Some(error) = services.fatal.take() {
            return Err(error);
        }

        if let Some(kind) = self.controller.current_kind()
            && self.trace.last().map(|t| t.scene) != Some(kind)
        {
            info!(frame = self.frame, scene = %kind, "进入场景");
            self.trace.push(SceneTrace {
                frame: self.frame,
                scene: kind,
            });
        }
        self.frame += 1;
        Ok(())
    }

    /// 运行至多 `frames` 帧，控制器退出时提前结束；返回实际运行的帧数
    pub fn run(&mut self, frames: u64) -> Result<u64, StageError> {
        let start = self.frame;
        while self.frame - start < frames && !self.controller.is_exited() {
            self.tick()?;
        }
        debug!(frames = self.frame - start, exited = self.is_exited(), "运行结束");
        Ok(self.frame - start)
    }

    /// 运行直到进入指定场景，返回是否到达
    pub fn run_until(&mut self, kind: SceneKind, max_frames: u64) -> Result<bool, StageError> {
        for _ in 0..max_frames {
            if self.is_exited() {
                break;
            }
            self.tick()?;
            if self.controller.current_kind() == Some(kind) && self.controller.is_current_started() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn trace(&self) -> &[SceneTrace] {
        &self.trace
    }

    pub fn current_kind(&self) -> Option<SceneKind> {
        self.controller.current_kind()
    }

    pub fn is_exited(&self) -> bool {
        self.controller.is_exited()
    }

    pub fn controller(&self) -> &SceneController<StageServices> {
        &self.controller
    }

    pub fn services(&self) -> &StageServices {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut StageServices {
        &mut self.services
    }
}

/// 加载动作配置：内置名称或相对于资源根目录的 JSON 文件
fn load_profile(config: &AppConfig) -> HostResult<MotionProfile> {
    if let Ok(profile) = MotionProfile::builtin(&config.profile) {
        return Ok(profile);
    }
    let path = config.assets_root.join(&config.profile);
    let json = read_file(&path)?;
    Ok(MotionProfile::from_json(&json)?)
}

/// 加载动画数据表；文件不存在时使用内置演示数据
fn load_animations(config: &AppConfig) -> HostResult<AnimationLibrary> {
    let path = config.animations_full_path();
    if !path.exists() {
        warn!(path = %path.display(), "动画数据表不存在，使用内置演示数据");
        return Ok(demo_animations()?);
    }
    let json = read_file(&path)?;
    Ok(AnimationLibrary::from_json(&json)?)
}

fn read_file(path: &Path) -> HostResult<String> {
    fs::read_to_string(path).map_err(|e| HostError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
