//! # Model 模块
//!
//! 外部游戏状态层的接口。
//!
//! 战斗者、战斗进程、画面状态都由宿主的数据层拥有；
//! 本 crate 只读取它们，唯一的写操作是取走战斗者的意图队列。
//!
//! ## 意图队列
//!
//! 战斗者把动作、效果、动画、伤害弹出等请求按顺序压入 [`IntentQueue`]，
//! 表现层每帧调用一次 [`Battler::take_intents`] 全部取走，
//! 因此同一帧内的多个动画请求都会被处理，不会丢失。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::battler::EffectKind;
use crate::node::Color;

/// 动画播放请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationRequest {
    pub animation_id: u32,
    pub mirror: bool,
    /// 延迟帧数
    pub delay: u32,
}

/// 行动结果（伤害弹出用）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResult {
    pub missed: bool,
    pub evaded: bool,
    pub critical: bool,
    pub hp_affected: bool,
    pub hp_damage: i32,
    pub mp_damage: i32,
}

/// 战斗者发出的表现意图
#[derive(Debug, Clone, PartialEq)]
pub enum BattlerIntent {
    /// 切换到指定动作
    Motion(String),
    /// 重新选择动作
    RefreshMotion,
    /// 开始效果
    Effect(EffectKind),
    /// 播放动画
    Animation(AnimationRequest),
    /// 弹出伤害数字
    DamagePopup(ActionResult),
    /// 挥动武器（武器图像 id，0 表示无）
    WeaponAnimation(u32),
}

/// 意图队列
#[derive(Debug, Clone, Default)]
pub struct IntentQueue {
    pending: VecDeque<BattlerIntent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: BattlerIntent) {
        self.pending.push_back(intent);
    }

    pub fn request_motion(&mut self, name: impl Into<String>) {
        self.push(BattlerIntent::Motion(name.into()));
    }

    pub fn request_effect(&mut self, kind: EffectKind) {
        self.push(BattlerIntent::Effect(kind));
    }

    pub fn request_animation(&mut self, animation_id: u32, mirror: bool, delay: u32) {
        self.push(BattlerIntent::Animation(AnimationRequest {
            animation_id,
            mirror,
            delay,
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// 按压入顺序取走全部意图
    pub fn drain(&mut self) -> Vec<BattlerIntent> {
        self.pending.drain(..).collect()
    }
}

/// 战斗者
pub trait Battler {
    fn is_alive(&self) -> bool;
    /// 是否被隐藏（例如尚未出场的敌人）
    fn is_hidden(&self) -> bool;
    /// 精灵是否应当显示
    fn is_sprite_visible(&self) -> bool;
    fn is_selected(&self) -> bool;
    fn is_acting(&self) -> bool;
    fn is_inputting(&self) -> bool;
    /// 状态动作代码：0 无，1 异常，2 睡眠，3 死亡
    fn state_motion_index(&self) -> u32;
    fn is_guard(&self) -> bool;
    fn is_guard_waiting(&self) -> bool;
    fn is_dying(&self) -> bool;
    fn is_undecided(&self) -> bool;
    /// 动作图资源名
    fn battler_name(&self) -> String;
    fn battler_hue(&self) -> i32 {
        0
    }
    /// 状态覆盖图行号，0 表示无
    fn state_overlay_index(&self) -> u32 {
        0
    }
    /// 取走本帧所有待处理的意图
    fn take_intents(&mut self) -> Vec<BattlerIntent>;
}

/// 共享的战斗者引用
pub type BattlerRef = Rc<RefCell<dyn Battler>>;

/// 战斗进程
pub trait BattleStatus {
    /// 是否处于指令输入阶段
    fn is_inputting(&self) -> bool;
    /// 是否已逃跑
    fn is_escaped(&self) -> bool;
    /// 战斗是否已结束
    fn is_battle_end(&self) -> bool;
}

/// 画面缩放
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// 画面状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenState {
    pub zoom: Zoom,
    /// 色调 [r, g, b, gray]
    pub tone: [f32; 4],
    pub flash_color: Color,
    /// 震动偏移（像素）
    pub shake: f32,
    /// 亮度 (0.0 - 255.0)
    pub brightness: f32,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            zoom: Zoom::default(),
            tone: [0.0; 4],
            flash_color: Color::CLEAR,
            shake: 0.0,
            brightness: 255.0,
        }
    }
}

impl ScreenState {
    /// 清除缩放与闪光
    pub fn clear(&mut self) {
        self.zoom = Zoom::default();
        self.flash_color = Color::CLEAR;
        self.shake = 0.0;
    }
}
