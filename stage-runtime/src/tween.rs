//! # Tween 模块
//!
//! 位置偏移补间。
//!
//! ## 设计说明
//!
//! 补间不是按起点/终点插值，而是每帧把当前偏移向目标推进
//! `1/剩余帧数` 的比例（线性）或平滑步进权重（SmoothStep）。
//! 剩余 1 帧时权重为 1，因此在整数帧数后精确到达目标。

use serde::{Deserialize, Serialize};

use crate::node::Vec2;

/// 补间曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    /// 线性
    #[default]
    Linear,
    /// 平滑步进（3x² - 2x³）
    SmoothStep,
}

impl Easing {
    /// 计算本帧的推进权重
    ///
    /// # 参数
    /// - `remaining`: 推进前的剩余帧数（>= 1）
    pub fn weight(&self, remaining: u32) -> f32 {
        let t = 1.0 / remaining.max(1) as f32;
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => smooth_step(t),
        }
    }
}

/// 平滑步进函数，输入会被截断到 0.0 - 1.0
pub fn smooth_step(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// 移动状态
///
/// 屏幕位置 = `home + offset`，每帧重新计算。
#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    home: Vec2,
    offset: Vec2,
    /// 当前目标；从未开始移动时为 None
    target: Option<Vec2>,
    remaining: u32,
    easing: Easing,
}

impl Default for MovementState {
    fn default() -> Self {
        Self::new(Easing::Linear)
    }
}

impl MovementState {
    pub fn new(easing: Easing) -> Self {
        Self {
            home: Vec2::zero(),
            offset: Vec2::zero(),
            target: None,
            remaining: 0,
            easing,
        }
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn set_home(&mut self, x: f32, y: f32) {
        self.home = Vec2::new(x, y);
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        self.home + self.offset
    }

    /// 是否正在移动
    pub fn is_moving(&self) -> bool {
        self.remaining > 0
    }

    /// 是否在原位（偏移为 0）
    pub fn in_home_position(&self) -> bool {
        self.offset == Vec2::zero()
    }

    /// 开始移动
    ///
    /// 目标与当前目标相同时不做任何事，返回 false。
    /// `duration == 0` 时立即到达。
    pub fn start_move(&mut self, x: f32, y: f32, duration: u32) -> bool {
        let target = Vec2::new(x, y);
        if self.target == Some(target) {
            return false;
        }
        self.target = Some(target);
        self.remaining = duration;
        if duration == 0 {
            self.offset = target;
        }
        true
    }

    /// 推进一帧，返回本帧是否刚好结束移动
    pub fn update(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        let Some(target) = self.target else {
            self.remaining = 0;
            return false;
        };

        let w = self.easing.weight(self.remaining);
        self.offset = self.offset.lerp(target, w);
        self.remaining -= 1;

        if self.remaining == 0 {
            self.offset = target;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_step_bounds() {
        assert_eq!(smooth_step(0.0), 0.0);
        assert_eq!(smooth_step(1.0), 1.0);
        assert_eq!(smooth_step(0.5), 0.5);
        assert_eq!(smooth_step(2.0), 1.0);
    }

    #[test]
    fn test_linear_arrives_exactly() {
        for duration in [1u32, 2, 3, 7, 12, 24, 36] {
            let mut m = MovementState::new(Easing::Linear);
            m.start_move(448.0, 0.0, duration);
            let mut ended = 0;
            for _ in 0..duration {
                if m.update() {
                    ended += 1;
                }
            }
            assert_eq!(m.offset(), Vec2::new(448.0, 0.0), "duration {duration}");
            assert_eq!(ended, 1);
            assert!(!m.is_moving());
        }
    }

    #[test]
    fn test_smooth_step_arrives_exactly() {
        let mut m = MovementState::new(Easing::SmoothStep);
        m.start_move(-448.0, 48.0, 48);
        for _ in 0..48 {
            m.update();
        }
        assert_eq!(m.offset(), Vec2::new(-448.0, 48.0));
    }

    #[test]
    fn test_linear_step_values() {
        let mut m = MovementState::new(Easing::Linear);
        m.start_move(12.0, 0.0, 4);
        m.update();
        // (0 * 3 + 12) / 4
        assert_eq!(m.offset().x, 3.0);
        m.update();
        // (3 * 2 + 12) / 3
        assert_eq!(m.offset().x, 6.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut m = MovementState::default();
        assert!(m.start_move(-400.0, 0.0, 0));
        assert_eq!(m.offset(), Vec2::new(-400.0, 0.0));
        assert!(!m.is_moving());
        assert!(!m.update());
    }

    #[test]
    fn test_identical_start_is_noop() {
        let mut m = MovementState::default();
        assert!(m.start_move(48.0, 0.0, 12));
        m.update();
        m.update();
        assert_eq!(m.remaining(), 10);
        assert!(!m.start_move(48.0, 0.0, 12));
        assert_eq!(m.remaining(), 10);
    }

    #[test]
    fn test_retarget_replaces_in_flight_move() {
        let mut m = MovementState::default();
        m.start_move(48.0, 0.0, 12);
        m.update();
        assert!(m.start_move(0.0, 0.0, 4));
        assert_eq!(m.remaining(), 4);
        for _ in 0..4 {
            m.update();
        }
        assert!(m.in_home_position());
    }

    #[test]
    fn test_position_includes_home() {
        let mut m = MovementState::default();
        m.set_home(600.0, 280.0);
        m.start_move(-48.0, 0.0, 0);
        assert_eq!(m.position(), Vec2::new(552.0, 280.0));
    }
}
