//! # Battler 模块
//!
//! 战斗者的画面表现。
//!
//! ## 模块结构
//!
//! - [`motion`]：动作表与配置
//! - [`effect`]：定时视觉效果
//! - [`damage`]：伤害数字弹出
//! - [`weapon`]：武器挥动
//! - [`overlay`]：状态覆盖图
//! - [`visual`]：把以上组合起来的 [`BattlerVisual`]

pub mod damage;
pub mod effect;
pub mod motion;
pub mod overlay;
pub mod visual;
pub mod weapon;

pub use damage::{DAMAGE_DURATION, DamagePopup};
pub use effect::{EffectKind, EffectState};
pub use motion::{BattlerSide, MotionProfile, MotionSpec, SheetLayout, StepParams};
pub use overlay::StateOverlay;
pub use visual::{BattleFrame, BattlerVisual};
pub use weapon::WeaponSwing;
