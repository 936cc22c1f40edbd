//! # Demo 模块
//!
//! 演示用的游戏状态层：队伍、敌群、战斗进程与画面状态。
//!
//! 表现核心只通过 `Battler` / `BattleStatus` 读取这些数据，
//! 这里的数值规则只为驱动画面，不追求完整。

pub mod battle;
pub mod battler;
pub mod screen;

pub use battle::{BattleCommand, BattlePhase, BattleResult, DemoBattle};
pub use battler::{BattlerSpec, DemoBattler, DemoBattlerRef};
pub use screen::GameScreen;

use stage_runtime::{AnimationLibrary, BattlerSide, DataError, StageError, StageResult};
use tracing::{debug, info};

/// 内置的演示动画数据
pub const DEMO_ANIMATIONS: &str = include_str!("../../data/animations.json");

/// 加载内置动画数据
pub fn demo_animations() -> Result<AnimationLibrary, DataError> {
    AnimationLibrary::from_json(DEMO_ANIMATIONS)
}

/// 第 `n` 场战斗的敌群：奇数场是首领战
pub fn troop_for(n: u32) -> Vec<BattlerSpec> {
    if n % 2 == 1 {
        vec![BattlerSpec::new("Dragon", "Dragon", 160, 18).boss()]
    } else {
        vec![
            BattlerSpec::new("Slime", "Slime", 40, 6),
            BattlerSpec::new("Slime", "Slime", 40, 6),
            BattlerSpec::new("Bat", "Bat", 30, 8).hidden(),
        ]
    }
}

/// 默认队伍
fn default_party() -> Vec<DemoBattlerRef> {
    [
        BattlerSpec::new("Harold", "Actor1_1", 120, 30),
        BattlerSpec::new("Therese", "Actor1_2", 90, 24),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, spec)| DemoBattler::shared(spec, BattlerSide::Ally, i))
    .collect()
}

/// 游戏状态
#[derive(Debug)]
pub struct GameState {
    party: Vec<DemoBattlerRef>,
    pub screen: GameScreen,
    start_map_id: u32,
    map_id: u32,
    database_loaded: bool,
    battle_test: bool,
    /// 没有指令输入时自动推进（标题选新游戏、地图遇敌、战斗攻击）
    auto_play: bool,
    transferring: bool,
    battle: Option<DemoBattle>,
    battles_fought: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            party: default_party(),
            screen: GameScreen::new(),
            start_map_id: 1,
            map_id: 0,
            database_loaded: false,
            battle_test: false,
            auto_play: false,
            transferring: false,
            battle: None,
            battles_fought: 0,
        }
    }

    // ---- 数据库 ----

    pub fn load_database(&mut self) {
        debug!("数据库加载完成");
        self.database_loaded = true;
    }

    pub fn is_database_loaded(&self) -> bool {
        self.database_loaded
    }

    pub fn set_start_map(&mut self, map_id: u32) {
        self.start_map_id = map_id;
    }

    pub fn start_map_id(&self) -> u32 {
        self.start_map_id
    }

    /// 新游戏需要有效的初始地图
    pub fn check_player_location(&self) -> StageResult<()> {
        if self.start_map_id == 0 {
            return Err(StageError::StartPositionUnset);
        }
        Ok(())
    }

    // ---- 模式 ----

    pub fn set_battle_test(&mut self, battle_test: bool) {
        self.battle_test = battle_test;
    }

    pub fn is_battle_test(&self) -> bool {
        self.battle_test
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        self.auto_play = auto_play;
    }

    pub fn is_auto_play(&self) -> bool {
        self.auto_play
    }

    // ---- 地图 ----

    /// 开始新游戏：恢复队伍并移动到初始地图
    pub fn setup_new_game(&mut self) {
        info!(map_id = self.start_map_id, "新游戏");
        for b in &self.party {
            b.borrow_mut().recover_all();
        }
        self.map_id = self.start_map_id;
        self.transferring = true;
        self.battles_fought = 0;
    }

    /// 读档后回到地图
    pub fn on_after_load(&mut self) {
        if self.map_id == 0 {
            self.map_id = self.start_map_id;
        }
        self.transferring = false;
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn is_transferring(&self) -> bool {
        self.transferring
    }

    pub fn perform_transfer(&mut self) {
        self.transferring = false;
    }

    // ---- 战斗 ----

    pub fn party(&self) -> &[DemoBattlerRef] {
        &self.party
    }

    pub fn is_party_all_dead(&self) -> bool {
        self.party.iter().all(|b| b.borrow().is_dead())
    }

    /// 准备下一场战斗
    pub fn setup_battle(&mut self) {
        let troop = troop_for(self.battles_fought)
            .into_iter()
            .enumerate()
            .map(|(i, spec)| DemoBattler::shared(spec, BattlerSide::Foe, i))
            .collect();
        self.battles_fought += 1;
        self.screen.on_battle_start();
        let can_escape = !self.battle_test;
        self.battle = Some(DemoBattle::new(self.party.clone(), troop, can_escape));
    }

    /// 战斗测试：直接准备一场战斗
    pub fn setup_battle_test(&mut self) {
        for b in &self.party {
            b.borrow_mut().recover_all();
        }
        self.setup_battle();
    }

    pub fn battle(&self) -> Option<&DemoBattle> {
        self.battle.as_ref()
    }

    pub fn battle_mut(&mut self) -> Option<&mut DemoBattle> {
        self.battle.as_mut()
    }

    pub fn battles_fought(&self) -> u32 {
        self.battles_fought
    }

    /// 结束战斗，清理战斗者状态
    pub fn end_battle(&mut self) -> Option<BattleResult> {
        let mut battle = self.battle.take()?;
        battle.on_battle_end();
        battle.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_animations_parse() {
        let library = demo_animations().unwrap();
        assert_eq!(library.ids(), vec![1, 2, 3]);
        assert!(library.get(2).unwrap().is_screen());
    }

    #[test]
    fn test_start_position_check() {
        let mut game = GameState::new();
        assert!(game.check_player_location().is_ok());
        game.set_start_map(0);
        assert_eq!(
            game.check_player_location(),
            Err(StageError::StartPositionUnset)
        );
    }

    #[test]
    fn test_troops_alternate() {
        let mut game = GameState::new();
        game.setup_battle();
        assert_eq!(game.battle().unwrap().troop().len(), 3);
        game.end_battle();
        game.setup_battle();
        let battle = game.battle().unwrap();
        assert_eq!(battle.troop().len(), 1);
        assert!(battle.troop()[0].borrow().is_boss());
    }

    #[test]
    fn test_new_game_transfers() {
        let mut game = GameState::new();
        game.setup_new_game();
        assert!(game.is_transferring());
        assert_eq!(game.map_id(), 1);
        game.perform_transfer();
        assert!(!game.is_transferring());
    }

    #[test]
    fn test_end_battle_clears_battle() {
        let mut game = GameState::new();
        game.setup_battle_test();
        assert!(game.battle().is_some());
        assert_eq!(game.end_battle(), None);
        assert!(game.battle().is_none());
    }
}
