//! # Assets 模块
//!
//! 资源加载接口。
//!
//! 图像解码与缓存由宿主负责；本 crate 只需要一个可以查询
//! 是否就绪、宽高的位图句柄。资源未就绪时相关播放停顿，不报错。

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// 资源类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    /// 行走图
    CharacterSheet,
    /// 战斗者动作图
    BattlerSheet,
    /// 系统图（伤害数字、状态覆盖、图标）
    SystemSheet,
    /// 武器图
    WeaponSheet,
    /// 动画图
    AnimationSheet,
}

impl AssetCategory {
    /// 资源子目录
    pub fn folder(&self) -> &'static str {
        match self {
            AssetCategory::CharacterSheet => "img/characters",
            AssetCategory::BattlerSheet => "img/battlers",
            AssetCategory::SystemSheet => "img/system",
            AssetCategory::WeaponSheet => "img/weapons",
            AssetCategory::AnimationSheet => "img/animations",
        }
    }
}

/// 位图
pub trait Bitmap {
    /// 是否已加载完成
    fn is_ready(&self) -> bool;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// 位图句柄
#[derive(Clone)]
pub struct BitmapHandle(Rc<dyn Bitmap>);

impl BitmapHandle {
    pub fn new(bitmap: impl Bitmap + 'static) -> Self {
        Self(Rc::new(bitmap))
    }

    pub fn from_rc(bitmap: Rc<dyn Bitmap>) -> Self {
        Self(bitmap)
    }

    /// 空位图：立即就绪，尺寸为 0
    pub fn empty() -> Self {
        Self::new(StaticBitmap::new(0, 0))
    }

    pub fn is_ready(&self) -> bool {
        self.0.is_ready()
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn ptr_eq(&self, other: &BitmapHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BitmapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapHandle")
            .field("ready", &self.is_ready())
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// 资源加载器
pub trait AssetLoader {
    /// 按类别与名称请求位图
    ///
    /// 立即返回句柄；句柄可能尚未就绪。
    fn load(&mut self, category: AssetCategory, name: &str, hue: i32) -> BitmapHandle;
}

/// 固定尺寸的位图，就绪状态可手动切换
///
/// 用于测试和无渲染运行。
#[derive(Debug)]
pub struct StaticBitmap {
    width: u32,
    height: u32,
    ready: Cell<bool>,
}

impl StaticBitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ready: Cell::new(true),
        }
    }

    /// 创建尚未就绪的位图
    pub fn pending(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ready: Cell::new(false),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }
}

impl Bitmap for StaticBitmap {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// 每个名称返回同一尺寸位图的加载器
///
/// 名称为空时返回空位图。
#[derive(Debug)]
pub struct UniformLoader {
    width: u32,
    height: u32,
    requests: Vec<(AssetCategory, String)>,
}

impl UniformLoader {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            requests: Vec::new(),
        }
    }

    /// 已收到的请求（按顺序）
    pub fn requests(&self) -> &[(AssetCategory, String)] {
        &self.requests
    }
}

impl AssetLoader for UniformLoader {
    fn load(&mut self, category: AssetCategory, name: &str, _hue: i32) -> BitmapHandle {
        self.requests.push((category, name.to_string()));
        if name.is_empty() {
            BitmapHandle::empty()
        } else {
            BitmapHandle::new(StaticBitmap::new(self.width, self.height))
        }
    }
}
