//! # Resources 模块
//!
//! 位图资源管理：按类别解析路径、读取图像尺寸并缓存句柄。
//!
//! ## 设计说明
//!
//! 无渲染运行时只需要位图的尺寸与就绪状态，因此只读取图像头部
//! （`image::image_dimensions`），不解码像素。
//!
//! `asset_latency_frames > 0` 时，新请求的位图要经过这么多次 [`ResourceManager::tick`]
//! 才就绪，用来复现真实加载中的停顿。缺失或损坏的文件记录一次警告，
//! 返回立即就绪的空位图。

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use stage_runtime::{AssetCategory, AssetLoader, Bitmap, BitmapHandle};
use tracing::{debug, warn};

mod error;

pub use error::ResourceError;

/// 已读取尺寸的位图，在资源时钟到达 `ready_at` 后就绪
#[derive(Debug)]
pub struct LoadedBitmap {
    width: u32,
    height: u32,
    ready_at: u64,
    clock: Rc<Cell<u64>>,
}

impl Bitmap for LoadedBitmap {
    fn is_ready(&self) -> bool {
        self.clock.get() >= self.ready_at
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// 缓存键：类别、名称、色相
type CacheKey = (AssetCategory, String, i32);

/// 资源管理器
#[derive(Debug)]
pub struct ResourceManager {
    /// 资源基础路径
    base_path: PathBuf,
    /// 新请求的位图需要等待的帧数
    latency: u32,
    clock: Rc<Cell<u64>>,
    cache: HashMap<CacheKey, BitmapHandle>,
    /// 已经警告过的缺失路径
    missing: HashSet<PathBuf>,
}

impl ResourceManager {
    /// 创建新的资源管理器
    ///
    /// # 参数
    ///
    /// - `base_path`: 资源文件的基础路径（如 "assets"）
    /// - `latency`: 位图就绪前需要的 tick 次数
    pub fn new(base_path: impl Into<PathBuf>, latency: u32) -> Self {
        Self {
            base_path: base_path.into(),
            latency,
            clock: Rc::new(Cell::new(0)),
            cache: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 资源的完整路径
    pub fn resolve_path(&self, category: AssetCategory, name: &str) -> PathBuf {
        self.base_path
            .join(category.folder())
            .join(format!("{name}.png"))
    }

    /// 读取图像尺寸
    pub fn probe(&self, category: AssetCategory, name: &str) -> Result<(u32, u32), ResourceError> {
        let path = self.resolve_path(category, name);
        if !path.exists() {
            return Err(ResourceError::NotFound {
                path: path.display().to_string(),
            });
        }
        image::image_dimensions(&path).map_err(|e| ResourceError::InvalidFormat {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 预先请求资源（启动时预载系统图）
    pub fn reserve(&mut self, category: AssetCategory, name: &str) {
        self.load(category, name, 0);
    }

    /// 推进资源时钟一帧
    pub fn tick(&mut self) {
        self.clock.set(self.clock.get() + 1);
    }

    /// 所有已请求的位图是否都已就绪
    pub fn is_ready(&self) -> bool {
        self.cache.values().all(|b| b.is_ready())
    }

    /// 已缓存的位图数量
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// 缺失的资源数量
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    /// 清空缓存（场景切换后释放请求）
    pub fn clear_cache(&mut self) {
        debug!(count = self.cache.len(), "清空位图缓存");
        self.cache.clear();
    }

    fn create(&mut self, category: AssetCategory, name: &str) -> BitmapHandle {
        match self.probe(category, name) {
            Ok((width, height)) => BitmapHandle::new(LoadedBitmap {
                width,
                height,
                ready_at: self.clock.get() + self.latency as u64,
                clock: self.clock.clone(),
            }),
            Err(e) => {
                let path = self.resolve_path(category, name);
                if self.missing.insert(path) {
                    warn!(error = %e, "位图加载失败，使用空位图");
                }
                BitmapHandle::empty()
            }
        }
    }
}

impl AssetLoader for ResourceManager {
    fn load(&mut self, category: AssetCategory, name: &str, hue: i32) -> BitmapHandle {
        if name.is_empty() {
            return BitmapHandle::empty();
        }
        let key = (category, name.to_string(), hue);
        if let Some(handle) = self.cache.get(&key) {
            return handle.clone();
        }
        let handle = self.create(category, name);
        debug!(?category, name, ready = handle.is_ready(), "请求位图");
        self.cache.insert(key, handle.clone());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(root: &Path, category: AssetCategory, name: &str, width: u32, height: u32) {
        let dir = root.join(category.folder());
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::new(width, height)
            .save(dir.join(format!("{name}.png")))
            .unwrap();
    }

    #[test]
    fn test_load_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), AssetCategory::BattlerSheet, "Slime", 64, 48);
        let mut rm = ResourceManager::new(dir.path(), 0);

        let bitmap = rm.load(AssetCategory::BattlerSheet, "Slime", 0);
        assert!(bitmap.is_ready());
        assert_eq!((bitmap.width(), bitmap.height()), (64, 48));
    }

    #[test]
    fn test_load_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), AssetCategory::SystemSheet, "Damage", 10, 10);
        let mut rm = ResourceManager::new(dir.path(), 0);

        let a = rm.load(AssetCategory::SystemSheet, "Damage", 0);
        let b = rm.load(AssetCategory::SystemSheet, "Damage", 0);
        assert!(a.ptr_eq(&b));
        // 不同色相是不同的位图
        let c = rm.load(AssetCategory::SystemSheet, "Damage", 90);
        assert!(!a.ptr_eq(&c));
        assert_eq!(rm.cached_count(), 2);
    }

    #[test]
    fn test_latency_delays_ready() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), AssetCategory::AnimationSheet, "Hit1", 32, 32);
        let mut rm = ResourceManager::new(dir.path(), 2);

        let bitmap = rm.load(AssetCategory::AnimationSheet, "Hit1", 0);
        assert!(!bitmap.is_ready());
        assert!(!rm.is_ready());
        rm.tick();
        assert!(!bitmap.is_ready());
        rm.tick();
        assert!(bitmap.is_ready());
        assert!(rm.is_ready());
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut rm = ResourceManager::new(dir.path(), 5);

        let bitmap = rm.load(AssetCategory::BattlerSheet, "Nobody", 0);
        assert!(bitmap.is_ready());
        assert_eq!(bitmap.width(), 0);
        assert_eq!(rm.missing_count(), 1);
        assert!(matches!(
            rm.probe(AssetCategory::BattlerSheet, "Nobody"),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_image_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join(AssetCategory::SystemSheet.folder());
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("Broken.png"), b"not a png").unwrap();
        let rm = ResourceManager::new(dir.path(), 0);

        assert!(matches!(
            rm.probe(AssetCategory::SystemSheet, "Broken"),
            Err(ResourceError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_empty_name_not_cached() {
        let mut rm = ResourceManager::new("assets", 0);
        let bitmap = rm.load(AssetCategory::AnimationSheet, "", 0);
        assert_eq!(bitmap.width(), 0);
        assert_eq!(rm.cached_count(), 0);
    }
}
