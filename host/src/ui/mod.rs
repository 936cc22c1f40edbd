//! # UI 模块
//!
//! 无绘制的界面状态。场景只关心窗口开合进度，据此判断是否仍在忙。

pub mod window;

pub use window::WindowOpenness;
