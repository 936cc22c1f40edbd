//! # Node 模块
//!
//! 保留模式的精灵节点。
//!
//! 渲染层拥有节点树并负责绘制；本 crate 只读写节点上的表现状态
//! （位置、缩放、旋转、透明度、混合模式、混合色、可见性），
//! 并创建/销毁自己分配的子节点（动画单元、闪光覆盖层、伤害数字等）。
//!
//! ## 设计说明
//!
//! `SpriteNode` 是 `Rc<RefCell<..>>` 句柄，克隆只复制句柄。
//! 父子关系：父节点强引用子节点，子节点弱引用父节点。

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::assets::BitmapHandle;

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 单位向量 (1, 1)
    pub const fn one() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for (f32, f32) {
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

/// RGBA 颜色，分量范围 0-255
///
/// 用作混合色（叠加色调）时 alpha 表示叠加强度。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// 透明（无叠加）
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(255.0, 255.0, 255.0, 255.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 255.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 替换 alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_clear(&self) -> bool {
        self.a <= 0.0
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// 矩形（源区域）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 混合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Screen,
}

impl BlendMode {
    /// 从动画数据中的数字代码转换，未知代码按 Normal 处理
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => BlendMode::Add,
            2 => BlendMode::Multiply,
            3 => BlendMode::Screen,
            _ => BlendMode::Normal,
        }
    }
}

/// 节点内部状态
struct NodeData {
    position: Vec2,
    scale: Vec2,
    rotation: f32,
    opacity: f32,
    blend_mode: BlendMode,
    blend_color: Color,
    frame: Rect,
    bitmap: Option<BitmapHandle>,
    visible: bool,
    hidden: bool,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<SpriteNode>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            scale: Vec2::one(),
            rotation: 0.0,
            opacity: 255.0,
            blend_mode: BlendMode::Normal,
            blend_color: Color::CLEAR,
            frame: Rect::default(),
            bitmap: None,
            visible: true,
            hidden: false,
            parent: Weak::new(),
            children: Vec::new(),
        }
    }
}

/// 精灵节点句柄
#[derive(Clone, Default)]
pub struct SpriteNode {
    inner: Rc<RefCell<NodeData>>,
}

impl fmt::Debug for SpriteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.inner.borrow();
        f.debug_struct("SpriteNode")
            .field("position", &d.position)
            .field("opacity", &d.opacity)
            .field("visible", &d.visible)
            .field("hidden", &d.hidden)
            .field("children", &d.children.len())
            .finish()
    }
}

impl SpriteNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否是同一个节点
    pub fn ptr_eq(&self, other: &SpriteNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn data(&self) -> Ref<'_, NodeData> {
        self.inner.borrow()
    }

    // ---- 变换 ----

    pub fn position(&self) -> Vec2 {
        self.data().position
    }

    pub fn set_position(&self, x: f32, y: f32) {
        self.inner.borrow_mut().position = Vec2::new(x, y);
    }

    pub fn scale(&self) -> Vec2 {
        self.data().scale
    }

    pub fn set_scale(&self, x: f32, y: f32) {
        self.inner.borrow_mut().scale = Vec2::new(x, y);
    }

    /// 旋转角度（弧度）
    pub fn rotation(&self) -> f32 {
        self.data().rotation
    }

    pub fn set_rotation(&self, radians: f32) {
        self.inner.borrow_mut().rotation = radians;
    }

    /// 透明度 (0.0 - 255.0)
    pub fn opacity(&self) -> f32 {
        self.data().opacity
    }

    /// 设置透明度，超出范围会被截断
    pub fn set_opacity(&self, opacity: f32) {
        self.inner.borrow_mut().opacity = opacity.clamp(0.0, 255.0);
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.data().blend_mode
    }

    pub fn set_blend_mode(&self, mode: BlendMode) {
        self.inner.borrow_mut().blend_mode = mode;
    }

    pub fn blend_color(&self) -> Color {
        self.data().blend_color
    }

    pub fn set_blend_color(&self, color: Color) {
        self.inner.borrow_mut().blend_color = color;
    }

    // ---- 图像 ----

    pub fn frame(&self) -> Rect {
        self.data().frame
    }

    pub fn set_frame(&self, x: f32, y: f32, width: f32, height: f32) {
        self.inner.borrow_mut().frame = Rect::new(x, y, width, height);
    }

    pub fn bitmap(&self) -> Option<BitmapHandle> {
        self.data().bitmap.clone()
    }

    pub fn set_bitmap(&self, bitmap: Option<BitmapHandle>) {
        self.inner.borrow_mut().bitmap = bitmap;
    }

    /// 节点高度：源区域高度乘以纵向缩放
    pub fn height(&self) -> f32 {
        let d = self.data();
        d.frame.height * d.scale.y.abs()
    }

    // ---- 可见性 ----

    pub fn visible(&self) -> bool {
        self.data().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.borrow_mut().visible = visible;
    }

    /// 临时隐藏（与 visible 独立的锁存）
    pub fn hide(&self) {
        self.inner.borrow_mut().hidden = true;
    }

    pub fn show(&self) {
        self.inner.borrow_mut().hidden = false;
    }

    pub fn is_hidden(&self) -> bool {
        self.data().hidden
    }

    /// 实际是否可见：`visible && !hidden`
    pub fn is_shown(&self) -> bool {
        let d = self.data();
        d.visible && !d.hidden
    }

    // ---- 节点树 ----

    /// 添加子节点，已有父节点时先从原父节点移除
    pub fn add_child(&self, child: &SpriteNode) {
        child.remove_from_parent();
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// 移除子节点，返回是否确实移除了
    pub fn remove_child(&self, child: &SpriteNode) -> bool {
        let mut d = self.inner.borrow_mut();
        let before = d.children.len();
        d.children.retain(|c| !c.ptr_eq(child));
        let removed = d.children.len() != before;
        drop(d);
        if removed {
            child.inner.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// 从父节点移除自己
    pub fn remove_from_parent(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => false,
        }
    }

    pub fn parent(&self) -> Option<SpriteNode> {
        self.data()
            .parent
            .upgrade()
            .map(|inner| SpriteNode { inner })
    }

    pub fn children(&self) -> Vec<SpriteNode> {
        self.data().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// 沿父链累加得到的绝对位置
    pub fn absolute_position(&self) -> Vec2 {
        let mut pos = self.position();
        let mut current = self.parent();
        while let Some(node) = current {
            pos = pos + node.position();
            current = node.parent();
        }
        pos
    }
}
