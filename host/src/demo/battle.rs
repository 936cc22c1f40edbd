//! # 演示战斗进程
//!
//! 回合制战斗的最小实现，驱动战斗者发出表现意图。
//!
//! ```text
//! Start -> Input --(指令)--> Turn --(行动队列清空)--> Input ...
//!                               \--(一方全灭 / 逃跑)--> End
//! ```
//!
//! 每个行动分三步执行（开始 → 命中 → 结束），每次 [`DemoBattle::update`] 推进一步。
//! 场景只在战斗画面空闲时调用 `update`，所以前进、动画、效果都会播完再进入下一步。

use std::collections::VecDeque;

use stage_runtime::{BattleStatus, Battler, BattlerSide};
use tracing::{debug, info};

use super::battler::DemoBattlerRef;

/// 普通攻击的动画 id
pub const ATTACK_ANIMATION: u32 = 1;
/// 我方武器图像 id
pub const WEAPON_IMAGE: u32 = 2;
/// 每隔几次攻击出现一次会心一击
const CRITICAL_INTERVAL: u32 = 3;

/// 战斗阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Init,
    Start,
    Input,
    Turn,
    End,
}

/// 战斗结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    Victory,
    Defeat,
    Escape,
}

/// 玩家指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleCommand {
    Attack,
    Guard,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionStep {
    Start,
    Hit,
    Finish,
}

/// 一次行动
#[derive(Debug, Clone)]
struct Action {
    subject: DemoBattlerRef,
    step: ActionStep,
}

/// 战斗进程
#[derive(Debug)]
pub struct DemoBattle {
    phase: BattlePhase,
    party: Vec<DemoBattlerRef>,
    troop: Vec<DemoBattlerRef>,
    queue: VecDeque<Action>,
    turn: u32,
    attacks: u32,
    can_escape: bool,
    escaped: bool,
    result: Option<BattleResult>,
    /// 战斗结束已由场景处理
    end_taken: bool,
    /// 增援在第几回合登场
    reinforce_turn: u32,
}

impl DemoBattle {
    pub fn new(party: Vec<DemoBattlerRef>, troop: Vec<DemoBattlerRef>, can_escape: bool) -> Self {
        Self {
            phase: BattlePhase::Init,
            party,
            troop,
            queue: VecDeque::new(),
            turn: 0,
            attacks: 0,
            can_escape,
            escaped: false,
            result: None,
            end_taken: false,
            reinforce_turn: 2,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn party(&self) -> &[DemoBattlerRef] {
        &self.party
    }

    pub fn troop(&self) -> &[DemoBattlerRef] {
        &self.troop
    }

    pub fn is_party_all_dead(&self) -> bool {
        self.party.iter().all(|b| b.borrow().is_dead())
    }

    pub fn is_troop_all_dead(&self) -> bool {
        self.troop.iter().all(|b| {
            let b = b.borrow();
            b.is_dead() || b.is_hidden()
        }) && self.troop.iter().any(|b| b.borrow().is_dead())
    }

    /// 开始战斗
    pub fn start(&mut self) {
        if self.phase == BattlePhase::Init {
            info!(
                party = self.party.len(),
                troop = self.troop.len(),
                "战斗开始"
            );
            self.phase = BattlePhase::Start;
        }
    }

    /// 推进一步；`command` 只在指令输入阶段被消费，返回是否消费了
    pub fn update(&mut self, command: Option<BattleCommand>) -> bool {
        match self.phase {
            BattlePhase::Init => false,
            BattlePhase::Start => {
                self.start_input();
                false
            }
            BattlePhase::Input => match command {
                Some(command) => {
                    self.start_turn(command);
                    true
                }
                None => false,
            },
            BattlePhase::Turn => {
                self.process_action();
                false
            }
            BattlePhase::End => false,
        }
    }

    /// 取走战斗结果（只返回一次）
    pub fn take_end(&mut self) -> Option<BattleResult> {
        if self.phase == BattlePhase::End && !self.end_taken {
            self.end_taken = true;
            self.result
        } else {
            None
        }
    }

    /// 战斗结束后清理所有战斗者
    pub fn on_battle_end(&mut self) {
        for b in self.party.iter().chain(self.troop.iter()) {
            b.borrow_mut().on_battle_end();
        }
    }

    fn start_input(&mut self) {
        self.turn += 1;
        if self.turn == self.reinforce_turn {
            for b in &self.troop {
                b.borrow_mut().appear();
            }
        }
        debug!(turn = self.turn, "指令输入");
        self.phase = BattlePhase::Input;
        for b in &self.party {
            let mut b = b.borrow_mut();
            if !b.is_dead() {
                b.set_guarding(false);
                b.set_inputting(true);
            }
        }
        if let Some(target) = self.first_alive(BattlerSide::Foe) {
            target.borrow_mut().set_selected(true);
        }
    }

    fn start_turn(&mut self, command: BattleCommand) {
        debug!(turn = self.turn, ?command, "回合开始");
        for b in self.party.iter().chain(self.troop.iter()) {
            let mut b = b.borrow_mut();
            b.set_inputting(false);
            b.set_selected(false);
        }
        if command == BattleCommand::Escape && self.can_escape {
            self.escaped = true;
            self.finish(BattleResult::Escape);
            return;
        }
        self.phase = BattlePhase::Turn;
        for b in &self.party {
            // 逃跑失败时我方不行动
            if b.borrow().is_dead() || command == BattleCommand::Escape {
                continue;
            }
            if command == BattleCommand::Guard {
                b.borrow_mut().set_guarding(true);
            } else {
                self.queue.push_back(Action {
                    subject: b.clone(),
                    step: ActionStep::Start,
                });
            }
        }
        for b in &self.troop {
            if b.borrow().is_alive() {
                self.queue.push_back(Action {
                    subject: b.clone(),
                    step: ActionStep::Start,
                });
            }
        }
    }

    fn process_action(&mut self) {
        let Some(mut action) = self.queue.pop_front() else {
            self.end_turn();
            return;
        };
        if action.step == ActionStep::Finish {
            action.subject.borrow_mut().perform_action_end();
            self.check_end();
            return;
        }
        if !action.subject.borrow().is_alive() {
            return;
        }
        let side = action.subject.borrow().side();
        let target_side = match side {
            BattlerSide::Ally => BattlerSide::Foe,
            BattlerSide::Foe => BattlerSide::Ally,
        };
        let Some(target) = self.first_alive(target_side) else {
            self.end_turn();
            return;
        };

        match action.step {
            ActionStep::Start => {
                let mut subject = action.subject.borrow_mut();
                subject.perform_action_start();
                subject.perform_attack(WEAPON_IMAGE);
                drop(subject);
                target
                    .borrow_mut()
                    .request_animation(ATTACK_ANIMATION, side == BattlerSide::Foe, 0);
                action.step = ActionStep::Hit;
                self.queue.push_front(action);
            }
            ActionStep::Hit => {
                self.attacks += 1;
                let critical = self.attacks % CRITICAL_INTERVAL == 0;
                let attack = action.subject.borrow().attack();
                let damage = if critical { attack * 3 } else { attack };
                target.borrow_mut().take_damage(damage, critical);
                action.step = ActionStep::Finish;
                self.queue.push_front(action);
            }
            ActionStep::Finish => {}
        }
    }

    fn end_turn(&mut self) {
        self.queue.clear();
        if !self.check_end() {
            self.start_input();
        }
    }

    fn check_end(&mut self) -> bool {
        if self.phase == BattlePhase::End {
            return true;
        }
        if self.is_party_all_dead() {
            self.finish(BattleResult::Defeat);
            true
        } else if self.is_troop_all_dead() {
            for b in &self.party {
                b.borrow_mut().perform_victory();
            }
            self.finish(BattleResult::Victory);
            true
        } else {
            false
        }
    }

    fn finish(&mut self, result: BattleResult) {
        info!(?result, turn = self.turn, "战斗结束");
        self.queue.clear();
        self.result = Some(result);
        self.phase = BattlePhase::End;
    }

    fn first_alive(&self, side: BattlerSide) -> Option<DemoBattlerRef> {
        let members = match side {
            BattlerSide::Ally => &self.party,
            BattlerSide::Foe => &self.troop,
        };
        members.iter().find(|b| b.borrow().is_alive()).cloned()
    }
}

impl BattleStatus for DemoBattle {
    fn is_inputting(&self) -> bool {
        self.phase == BattlePhase::Input
    }

    fn is_escaped(&self) -> bool {
        self.escaped
    }

    fn is_battle_end(&self) -> bool {
        self.phase == BattlePhase::End
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::battler::{BattlerSpec, DemoBattler};

    fn battle(enemy_hp: i32) -> DemoBattle {
        let party = vec![DemoBattler::shared(
            BattlerSpec::new("Harold", "Actor1_1", 100, 40),
            BattlerSide::Ally,
            0,
        )];
        let troop = vec![DemoBattler::shared(
            BattlerSpec::new("Slime", "Slime", enemy_hp, 10),
            BattlerSide::Foe,
            0,
        )];
        DemoBattle::new(party, troop, true)
    }

    fn run_turn(b: &mut DemoBattle, command: BattleCommand) {
        assert_eq!(b.phase(), BattlePhase::Input);
        assert!(b.update(Some(command)));
        for _ in 0..20 {
            if b.phase() != BattlePhase::Turn {
                break;
            }
            b.update(None);
        }
    }

    #[test]
    fn test_start_enters_input() {
        let mut b = battle(100);
        assert!(!b.update(Some(BattleCommand::Attack)));
        b.start();
        b.update(None);
        assert_eq!(b.phase(), BattlePhase::Input);
        assert!(b.is_inputting());
        assert!(b.party()[0].borrow().is_undecided());
        assert!(b.troop()[0].borrow().is_selected());
    }

    #[test]
    fn test_attack_turn_exchanges_damage() {
        let mut b = battle(100);
        b.start();
        b.update(None);
        run_turn(&mut b, BattleCommand::Attack);
        assert_eq!(b.troop()[0].borrow().hp(), 60);
        assert_eq!(b.party()[0].borrow().hp(), 90);
        assert_eq!(b.phase(), BattlePhase::Input);
        assert_eq!(b.turn(), 2);
    }

    #[test]
    fn test_victory() {
        let mut b = battle(30);
        b.start();
        b.update(None);
        run_turn(&mut b, BattleCommand::Attack);
        assert_eq!(b.phase(), BattlePhase::End);
        assert!(b.is_battle_end());
        assert_eq!(b.take_end(), Some(BattleResult::Victory));
        assert_eq!(b.take_end(), None);
    }

    #[test]
    fn test_escape() {
        let mut b = battle(100);
        b.start();
        b.update(None);
        run_turn(&mut b, BattleCommand::Escape);
        assert!(b.is_escaped());
        assert_eq!(b.take_end(), Some(BattleResult::Escape));
    }

    #[test]
    fn test_guard_skips_party_action() {
        let mut b = battle(100);
        b.start();
        b.update(None);
        run_turn(&mut b, BattleCommand::Guard);
        assert_eq!(b.troop()[0].borrow().hp(), 100);
        // 防御减半
        assert_eq!(b.party()[0].borrow().hp(), 95);
    }

    #[test]
    fn test_defeat() {
        let party = vec![DemoBattler::shared(
            BattlerSpec::new("Harold", "Actor1_1", 5, 1),
            BattlerSide::Ally,
            0,
        )];
        let troop = vec![DemoBattler::shared(
            BattlerSpec::new("Ogre", "Ogre", 100, 10),
            BattlerSide::Foe,
            0,
        )];
        let mut b = DemoBattle::new(party, troop, false);
        b.start();
        b.update(None);
        run_turn(&mut b, BattleCommand::Escape);
        assert_eq!(b.take_end(), Some(BattleResult::Defeat));
        assert!(!b.is_escaped());
    }

    #[test]
    fn test_hidden_enemy_appears_on_second_turn() {
        let party = vec![DemoBattler::shared(
            BattlerSpec::new("Harold", "Actor1_1", 100, 1),
            BattlerSide::Ally,
            0,
        )];
        let troop = vec![
            DemoBattler::shared(BattlerSpec::new("Slime", "Slime", 50, 1), BattlerSide::Foe, 0),
            DemoBattler::shared(
                BattlerSpec::new("Bat", "Bat", 50, 1).hidden(),
                BattlerSide::Foe,
                1,
            ),
        ];
        let mut b = DemoBattle::new(party, troop, true);
        b.start();
        b.update(None);
        assert!(b.troop()[1].borrow().is_hidden());
        run_turn(&mut b, BattleCommand::Guard);
        assert!(!b.troop()[1].borrow().is_hidden());
    }
}
