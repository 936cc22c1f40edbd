//! # Motion 模块
//!
//! 动作表与动作配置（profile）。
//!
//! 动作图的动作编号、图案数、步进距离等常量以数据表形式提供，
//! 内置两套配置：`classic`（7×5 动作图，线性移动）与
//! `sheet`（精简动作表，平滑步进移动）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::tween::Easing;

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattlerSide {
    /// 我方（向正方向前进）
    Ally,
    /// 敌方（向负方向前进）
    Foe,
}

/// 动作定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSpec {
    /// 动作图中的行号
    pub index: u32,
    pub pattern_count: u32,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl MotionSpec {
    pub const fn new(index: u32, pattern_count: u32, looping: bool) -> Self {
        Self {
            index,
            pattern_count,
            looping,
        }
    }
}

/// 一次移动的参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepParams {
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    pub duration: u32,
}

impl StepParams {
    pub const fn new(offset_x: f32, offset_y: f32, duration: u32) -> Self {
        Self {
            offset_x,
            offset_y,
            duration,
        }
    }
}

/// 动作图布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    pub columns: u32,
    pub rows: u32,
    /// 每格右侧裁掉的像素
    #[serde(default)]
    pub cell_margin: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            columns: 7,
            rows: 5,
            cell_margin: 0,
        }
    }
}

impl SheetLayout {
    /// 根据位图尺寸计算单格宽高
    pub fn cell_size(&self, width: u32, height: u32) -> (u32, u32) {
        let cw = (width / self.columns.max(1)).saturating_sub(self.cell_margin);
        let ch = height / self.rows.max(1);
        (cw, ch)
    }
}

/// 动作配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionProfile {
    pub name: String,
    pub motions: BTreeMap<String, MotionSpec>,
    #[serde(default)]
    pub easing: Easing,
    pub ally_step: StepParams,
    pub foe_step: StepParams,
    pub step_back_duration: u32,
    #[serde(default = "default_retreat")]
    pub retreat: StepParams,
    /// 每个图案持续的 tick 数
    #[serde(default = "default_motion_speed")]
    pub motion_speed: u32,
    #[serde(default)]
    pub sheet: SheetLayout,
    /// 首次就绪时把单格缩放到此宽度
    #[serde(default)]
    pub target_cell_width: Option<f32>,
    /// 敌方创建时即水平翻转
    #[serde(default)]
    pub foe_starts_mirrored: bool,
}

fn default_retreat() -> StepParams {
    StepParams::new(-400.0, 0.0, 30)
}

fn default_motion_speed() -> u32 {
    8
}

impl MotionProfile {
    /// 经典配置：完整动作表，线性移动
    pub fn classic() -> Self {
        let motions = [
            ("idle", MotionSpec::new(0, 7, true)),
            ("run", MotionSpec::new(1, 6, false)),
            ("back", MotionSpec::new(2, 3, false)),
            ("guard", MotionSpec::new(3, 8, false)),
            ("evade", MotionSpec::new(4, 7, false)),
            ("damaged", MotionSpec::new(5, 7, false)),
            ("dying", MotionSpec::new(6, 7, true)),
            ("dead", MotionSpec::new(7, 7, false)),
            ("melee", MotionSpec::new(9, 8, false)),
            ("missile", MotionSpec::new(10, 7, false)),
            ("channel", MotionSpec::new(11, 7, false)),
            ("toss", MotionSpec::new(12, 7, false)),
            ("victory", MotionSpec::new(13, 7, false)),
            ("asleep", MotionSpec::new(14, 7, true)),
        ];
        Self {
            name: "classic".to_string(),
            motions: motions
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            easing: Easing::Linear,
            ally_step: StepParams::new(448.0, 0.0, 24),
            foe_step: StepParams::new(-448.0, 0.0, 36),
            step_back_duration: 12,
            retreat: default_retreat(),
            motion_speed: default_motion_speed(),
            sheet: SheetLayout {
                columns: 7,
                rows: 5,
                cell_margin: 9,
            },
            target_cell_width: Some(66.0),
            foe_starts_mirrored: false,
        }
    }

    /// 精简动作图配置：平滑步进移动
    pub fn sheet() -> Self {
        let motions = [
            ("idle", MotionSpec::new(0, 7, true)),
            ("run", MotionSpec::new(1, 3, false)),
            ("melee", MotionSpec::new(2, 5, false)),
            ("back", MotionSpec::new(3, 3, false)),
            ("block", MotionSpec::new(4, 7, false)),
        ];
        Self {
            name: "sheet".to_string(),
            motions: motions
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            easing: Easing::SmoothStep,
            ally_step: StepParams::new(448.0, 0.0, 48),
            foe_step: StepParams::new(-448.0, 0.0, 48),
            step_back_duration: 48,
            retreat: default_retreat(),
            motion_speed: default_motion_speed(),
            sheet: SheetLayout::default(),
            target_cell_width: None,
            foe_starts_mirrored: true,
        }
    }

    /// 按名称取内置配置
    pub fn builtin(name: &str) -> Result<Self, DataError> {
        match name {
            "classic" => Ok(Self::classic()),
            "sheet" => Ok(Self::sheet()),
            _ => Err(DataError::UnknownProfile {
                name: name.to_string(),
            }),
        }
    }

    /// 从 JSON 加载并校验
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let profile: MotionProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// 校验配置：必须有 idle，图案数不能为 0
    pub fn validate(&self) -> Result<(), DataError> {
        if !self.motions.contains_key("idle") {
            return Err(DataError::MissingMotion {
                profile: self.name.clone(),
                motion: "idle".to_string(),
            });
        }
        for (name, spec) in &self.motions {
            if spec.pattern_count == 0 {
                return Err(DataError::InvalidMotion {
                    motion: name.clone(),
                    message: "图案数不能为 0".to_string(),
                });
            }
        }
        if self.motion_speed == 0 {
            return Err(DataError::InvalidMotion {
                motion: "*".to_string(),
                message: "motionSpeed 不能为 0".to_string(),
            });
        }
        Ok(())
    }

    /// 查找动作，未知名称返回 None
    pub fn motion(&self, name: &str) -> Option<MotionSpec> {
        self.motions.get(name).copied()
    }

    /// 该阵营的前进参数
    pub fn step_forward(&self, side: BattlerSide) -> StepParams {
        match side {
            BattlerSide::Ally => self.ally_step,
            BattlerSide::Foe => self.foe_step,
        }
    }
}
