//! # Animation Resource 模块
//!
//! 动画数据表：帧、单元、时间轴提示。
//!
//! JSON 布局与动画数据库一致（camelCase 字段；单元为 8 个数字的数组）。

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::node::{BlendMode, Color};
use crate::sound::SoundCue;

/// 动画位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnimationPosition {
    /// 头顶（向上偏移整个目标高度）
    Head,
    /// 中心（向上偏移半个目标高度）
    #[default]
    Center,
    /// 脚下
    Feet,
    /// 全屏（画面中心）
    Screen,
}

impl TryFrom<u8> for AnimationPosition {
    type Error = DataError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AnimationPosition::Head),
            1 => Ok(AnimationPosition::Center),
            2 => Ok(AnimationPosition::Feet),
            3 => Ok(AnimationPosition::Screen),
            _ => Err(DataError::UnknownPosition { code }),
        }
    }
}

impl From<AnimationPosition> for u8 {
    fn from(p: AnimationPosition) -> u8 {
        match p {
            AnimationPosition::Head => 0,
            AnimationPosition::Center => 1,
            AnimationPosition::Feet => 2,
            AnimationPosition::Screen => 3,
        }
    }
}

/// 单元数据：`[pattern, x, y, scale%, rotation°, mirror, opacity, blend]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 8]", into = "[f32; 8]")]
pub struct CellData {
    /// 图案编号，负数表示不显示；< 100 取第一张图，否则第二张
    pub pattern: i32,
    pub x: f32,
    pub y: f32,
    /// 缩放百分比
    pub scale: f32,
    /// 旋转角度（度）
    pub rotation: f32,
    pub mirror: bool,
    pub opacity: f32,
    pub blend: BlendMode,
}

impl From<[f32; 8]> for CellData {
    fn from(v: [f32; 8]) -> Self {
        Self {
            pattern: v[0] as i32,
            x: v[1],
            y: v[2],
            scale: v[3],
            rotation: v[4],
            mirror: v[5] != 0.0,
            opacity: v[6],
            blend: BlendMode::from_code(v[7] as u8),
        }
    }
}

impl From<CellData> for [f32; 8] {
    fn from(c: CellData) -> Self {
        let blend = match c.blend {
            BlendMode::Normal => 0.0,
            BlendMode::Add => 1.0,
            BlendMode::Multiply => 2.0,
            BlendMode::Screen => 3.0,
        };
        [
            c.pattern as f32,
            c.x,
            c.y,
            c.scale,
            c.rotation,
            if c.mirror { 1.0 } else { 0.0 },
            c.opacity,
            blend,
        ]
    }
}

/// 闪光范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FlashScope {
    #[default]
    None,
    /// 目标闪光
    Target,
    /// 全屏闪光
    Screen,
    /// 隐藏目标
    HideTarget,
}

impl From<u8> for FlashScope {
    fn from(code: u8) -> Self {
        match code {
            1 => FlashScope::Target,
            2 => FlashScope::Screen,
            3 => FlashScope::HideTarget,
            _ => FlashScope::None,
        }
    }
}

impl From<FlashScope> for u8 {
    fn from(s: FlashScope) -> u8 {
        match s {
            FlashScope::None => 0,
            FlashScope::Target => 1,
            FlashScope::Screen => 2,
            FlashScope::HideTarget => 3,
        }
    }
}

/// 时间轴提示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingCue {
    /// 触发的帧序号
    pub frame: usize,
    #[serde(default)]
    pub flash_scope: FlashScope,
    #[serde(default)]
    pub flash_color: Color,
    /// 闪光持续（以动画帧为单位）
    #[serde(default)]
    pub flash_duration: u32,
    #[serde(default)]
    pub se: Option<SoundCue>,
}

/// 动画资源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationResource {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animation1_name: String,
    #[serde(default)]
    pub animation1_hue: i32,
    #[serde(default)]
    pub animation2_name: String,
    #[serde(default)]
    pub animation2_hue: i32,
    #[serde(default)]
    pub position: AnimationPosition,
    #[serde(default)]
    pub frames: Vec<Vec<CellData>>,
    #[serde(default)]
    pub timings: Vec<TimingCue>,
}

impl AnimationResource {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// 是否全屏动画
    pub fn is_screen(&self) -> bool {
        self.position == AnimationPosition::Screen
    }

    /// 某帧上的所有提示
    pub fn timings_at(&self, frame: usize) -> impl Iterator<Item = &TimingCue> {
        self.timings.iter().filter(move |t| t.frame == frame)
    }
}

/// 动画库（按 id 索引）
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    entries: HashMap<u32, Rc<AnimationResource>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 数组加载，允许 null 条目
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let list: Vec<Option<AnimationResource>> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for resource in list.into_iter().flatten() {
            library.insert(resource)?;
        }
        Ok(library)
    }

    pub fn insert(&mut self, resource: AnimationResource) -> Result<(), DataError> {
        let id = resource.id;
        if self.entries.contains_key(&id) {
            return Err(DataError::DuplicateAnimation { id });
        }
        self.entries.insert(id, Rc::new(resource));
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<Rc<AnimationResource>> {
        self.entries.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已排序的 id 列表
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
