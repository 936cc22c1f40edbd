//! 演示用战斗者

use std::cell::RefCell;
use std::rc::Rc;

use stage_runtime::{ActionResult, Battler, BattlerIntent, BattlerSide, EffectKind, IntentQueue};
use tracing::debug;

/// 共享的演示战斗者
pub type DemoBattlerRef = Rc<RefCell<DemoBattler>>;

/// 战斗者定义
#[derive(Debug, Clone, PartialEq)]
pub struct BattlerSpec {
    pub name: String,
    /// 动作图资源名
    pub sheet: String,
    pub max_hp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub boss: bool,
    /// 开战时隐藏，之后登场
    pub hidden: bool,
}

impl BattlerSpec {
    pub fn new(name: &str, sheet: &str, max_hp: i32, attack: i32) -> Self {
        Self {
            name: name.to_string(),
            sheet: sheet.to_string(),
            max_hp,
            max_mp: 0,
            attack,
            boss: false,
            hidden: false,
        }
    }

    pub fn boss(mut self) -> Self {
        self.boss = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// 演示战斗者：持有数值与意图队列
#[derive(Debug)]
pub struct DemoBattler {
    spec: BattlerSpec,
    side: BattlerSide,
    index: usize,
    hp: i32,
    mp: i32,
    hidden: bool,
    selected: bool,
    acting: bool,
    inputting: bool,
    guarding: bool,
    intents: IntentQueue,
    last_result: ActionResult,
}

impl DemoBattler {
    pub fn new(spec: BattlerSpec, side: BattlerSide, index: usize) -> Self {
        Self {
            hp: spec.max_hp,
            mp: spec.max_mp,
            hidden: spec.hidden,
            spec,
            side,
            index,
            selected: false,
            acting: false,
            inputting: false,
            guarding: false,
            intents: IntentQueue::new(),
            last_result: ActionResult::default(),
        }
    }

    pub fn shared(spec: BattlerSpec, side: BattlerSide, index: usize) -> DemoBattlerRef {
        Rc::new(RefCell::new(Self::new(spec, side, index)))
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn side(&self) -> BattlerSide {
        self.side
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn attack(&self) -> i32 {
        self.spec.attack
    }

    pub fn is_boss(&self) -> bool {
        self.spec.boss
    }

    pub fn is_dead(&self) -> bool {
        !self.hidden && self.hp <= 0
    }

    pub fn last_result(&self) -> &ActionResult {
        &self.last_result
    }

    /// 待处理的意图数量
    pub fn pending_intents(&self) -> usize {
        self.intents.len()
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_inputting(&mut self, inputting: bool) {
        if self.inputting != inputting {
            self.inputting = inputting;
            self.intents.push(BattlerIntent::RefreshMotion);
        }
    }

    pub fn set_guarding(&mut self, guarding: bool) {
        self.guarding = guarding;
    }

    pub fn request_motion(&mut self, name: &str) {
        self.intents.request_motion(name);
    }

    pub fn request_effect(&mut self, kind: EffectKind) {
        self.intents.request_effect(kind);
    }

    pub fn request_animation(&mut self, animation_id: u32, mirror: bool, delay: u32) {
        self.intents.request_animation(animation_id, mirror, delay);
    }

    /// 登场
    pub fn appear(&mut self) {
        if self.hidden {
            debug!(name = %self.spec.name, "登场");
            self.hidden = false;
        }
    }

    /// 行动开始：敌方闪白，我方进入行动状态（前进）
    pub fn perform_action_start(&mut self) {
        match self.side {
            BattlerSide::Foe => self.request_effect(EffectKind::Whiten),
            BattlerSide::Ally => {
                self.acting = true;
                self.intents.push(BattlerIntent::RefreshMotion);
            }
        }
    }

    /// 行动：我方播放攻击动作并挥动武器
    pub fn perform_attack(&mut self, weapon_image: u32) {
        if self.side == BattlerSide::Ally {
            self.request_motion("melee");
            if weapon_image > 0 {
                self.intents.push(BattlerIntent::WeaponAnimation(weapon_image));
            }
        }
    }

    pub fn perform_action_end(&mut self) {
        self.acting = false;
        self.intents.push(BattlerIntent::RefreshMotion);
    }

    /// 承受伤害，返回是否因此倒下
    pub fn take_damage(&mut self, value: i32, critical: bool) -> bool {
        let value = if self.guarding { value / 2 } else { value };
        let was_alive = self.is_alive();
        self.hp = (self.hp - value).max(0);
        self.last_result = ActionResult {
            critical,
            hp_affected: true,
            hp_damage: value,
            ..Default::default()
        };
        self.intents
            .push(BattlerIntent::DamagePopup(self.last_result.clone()));
        match self.side {
            BattlerSide::Foe => self.request_effect(EffectKind::Blink),
            BattlerSide::Ally => self.request_motion("damaged"),
        }
        let collapsed = was_alive && self.hp == 0;
        if collapsed {
            self.perform_collapse();
        }
        collapsed
    }

    /// 未命中
    pub fn take_miss(&mut self) {
        self.last_result = ActionResult {
            missed: true,
            ..Default::default()
        };
        self.intents
            .push(BattlerIntent::DamagePopup(self.last_result.clone()));
        if self.side == BattlerSide::Ally {
            self.request_motion("evade");
        }
    }

    fn perform_collapse(&mut self) {
        debug!(name = %self.spec.name, boss = self.spec.boss, "倒下");
        match self.side {
            BattlerSide::Foe => self.request_effect(if self.spec.boss {
                EffectKind::BossCollapse
            } else {
                EffectKind::Collapse
            }),
            BattlerSide::Ally => self.intents.push(BattlerIntent::RefreshMotion),
        }
    }

    pub fn perform_victory(&mut self) {
        if self.is_alive() {
            self.request_motion("victory");
        }
    }

    /// 战斗结束，清除临时状态
    pub fn on_battle_end(&mut self) {
        self.selected = false;
        self.acting = false;
        self.inputting = false;
        self.guarding = false;
        self.intents.drain();
    }

    /// 完全恢复
    pub fn recover_all(&mut self) {
        self.hp = self.spec.max_hp;
        self.mp = self.spec.max_mp;
    }
}

impl Battler for DemoBattler {
    fn is_alive(&self) -> bool {
        !self.hidden && self.hp > 0
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn is_sprite_visible(&self) -> bool {
        true
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn is_acting(&self) -> bool {
        self.acting
    }

    fn is_inputting(&self) -> bool {
        self.inputting
    }

    fn state_motion_index(&self) -> u32 {
        if self.is_dead() { 3 } else { 0 }
    }

    fn is_guard(&self) -> bool {
        self.guarding
    }

    fn is_guard_waiting(&self) -> bool {
        false
    }

    fn is_dying(&self) -> bool {
        self.is_alive() && self.hp < self.spec.max_hp / 4
    }

    fn is_undecided(&self) -> bool {
        self.inputting
    }

    fn battler_name(&self) -> String {
        self.spec.sheet.clone()
    }

    fn take_intents(&mut self) -> Vec<BattlerIntent> {
        self.intents.drain()
    }
}
