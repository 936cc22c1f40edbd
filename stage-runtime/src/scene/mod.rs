//! # Scene 模块
//!
//! 场景生命周期与切换。
//!
//! ## 模块结构
//!
//! - [`kind`]：场景种类标签
//! - [`fade`]：全屏淡入淡出遮罩
//! - [`lifecycle`]：`Scene` trait、公共状态与导航请求
//! - [`controller`]：场景栈与切换顺序

pub mod controller;
pub mod fade;
pub mod kind;
pub mod lifecycle;

pub use controller::SceneController;
pub use fade::{DEFAULT_FADE_DURATION, FADE_SPEED, FadeDirection, ScreenFade};
pub use kind::SceneKind;
pub use lifecycle::{Navigator, Scene, SceneBase, SceneContext, SceneFactory, SceneState};
