//! # Config 模块
//!
//! 运行时配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// 资源根目录
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    /// 动画数据表路径（相对于 assets_root）
    #[serde(default = "default_animations_path")]
    pub animations_path: String,

    /// 动作配置：内置名称（`classic` / `sheet`）或相对于 assets_root 的 JSON 路径
    #[serde(default = "default_profile")]
    pub profile: String,

    /// 启动后直接进入战斗
    #[serde(default)]
    pub battle_test: bool,

    /// 窗口配置（决定画面尺寸）
    #[serde(default)]
    pub window: WindowConfig,

    /// 时序配置
    #[serde(default)]
    pub timing: TimingConfig,

    /// 调试配置
    #[serde(default)]
    pub debug: DebugConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_window_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_window_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_window_title")]
    pub title: String,
}

/// 时序配置（单位：帧）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// 普通淡入淡出速度
    #[serde(default = "default_fade_speed")]
    pub fade_speed: u32,

    /// 启动阶段等待资源的上限
    #[serde(default = "default_boot_timeout_frames")]
    pub boot_timeout_frames: u32,

    /// 模拟的位图加载延迟
    #[serde(default)]
    pub asset_latency_frames: u32,
}

/// 调试配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugConfig {
    /// 日志级别（trace / debug / info / warn / error）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// 默认值函数
fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_animations_path() -> String {
    "data/Animations.json".to_string()
}

fn default_profile() -> String {
    "classic".to_string()
}

fn default_window_width() -> u32 {
    816
}

fn default_window_height() -> u32 {
    624
}

fn default_window_title() -> String {
    "Battle Stage".to_string()
}

fn default_fade_speed() -> u32 {
    stage_runtime::scene::FADE_SPEED
}

fn default_boot_timeout_frames() -> u32 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            animations_path: default_animations_path(),
            profile: default_profile(),
            battle_test: false,
            window: WindowConfig::default(),
            timing: TimingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            title: default_window_title(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_speed: default_fade_speed(),
            boot_timeout_frames: default_boot_timeout_frames(),
            asset_latency_frames: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并打印警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 动画数据表完整路径
    pub fn animations_full_path(&self) -> PathBuf {
        self.assets_root.join(&self.animations_path)
    }

    /// 画面尺寸
    pub fn viewport(&self) -> (f32, f32) {
        (self.window.width as f32, self.window.height as f32)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::ValidationFailed(format!(
                "窗口尺寸无效: {}x{}",
                self.window.width, self.window.height
            )));
        }

        if self.timing.fade_speed == 0 {
            return Err(ConfigError::ValidationFailed(
                "fade_speed 必须大于 0".to_string(),
            ));
        }

        if self.timing.boot_timeout_frames == 0 {
            return Err(ConfigError::ValidationFailed(
                "boot_timeout_frames 必须大于 0".to_string(),
            ));
        }

        if self.profile.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "必须配置 profile（动作配置）".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
