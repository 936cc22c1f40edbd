//! # Host 层
//!
//! 战斗画面表现核心的宿主层实现（无渲染）。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 配置加载
//! - 资源加载（读取位图尺寸，模拟加载延迟）
//! - 音频状态与音效记录
//! - 脚本输入
//! - 演示用的游戏状态（队伍、敌群、战斗进程）
//! - 具体场景与战斗画面的组装
//!
//! 表现逻辑本身都在 `stage-runtime` 中，Host 层只提供数据与服务。

pub mod app;
pub mod audio;
pub mod config;
pub mod demo;
pub mod error;
pub mod input;
pub mod resources;
pub mod scenes;
pub mod spriteset;
pub mod ui;

// 重导出核心类型
pub use app::{SceneTrace, StageApp};
pub use audio::AudioManager;
pub use config::{AppConfig, ConfigError, DebugConfig, TimingConfig, WindowConfig};
pub use demo::{BattleCommand, BattleResult, DemoBattle, GameState};
pub use error::{HostError, HostResult};
pub use input::{InputCommand, InputError, InputManager};
pub use resources::{ResourceError, ResourceManager};
pub use scenes::{StageServices, create_scene};
pub use spriteset::BattleSpriteset;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _config = AppConfig::default();
        let _audio = AudioManager::new();
        let _input = InputManager::new();
        let _game = GameState::new();
        let _rm = ResourceManager::new("assets", 0);
        assert_eq!("attack".parse::<InputCommand>(), Ok(InputCommand::Attack));
    }
}
