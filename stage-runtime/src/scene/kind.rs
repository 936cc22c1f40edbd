//! # Scene Kind
//!
//! 场景种类标签。导航栈与"下一个/上一个场景是否为某种"的判断都比较这个标签。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 场景种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// 启动（等待资源与数据库）
    Boot,
    /// 标题画面
    Title,
    /// 地图
    Map,
    /// 战斗
    Battle,
    /// 主菜单
    Menu,
    /// 设置
    Options,
    /// 读档
    Load,
    /// 游戏结束
    Gameover,
}

impl SceneKind {
    pub const ALL: [SceneKind; 8] = [
        SceneKind::Boot,
        SceneKind::Title,
        SceneKind::Map,
        SceneKind::Battle,
        SceneKind::Menu,
        SceneKind::Options,
        SceneKind::Load,
        SceneKind::Gameover,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::Boot => "boot",
            SceneKind::Title => "title",
            SceneKind::Map => "map",
            SceneKind::Battle => "battle",
            SceneKind::Menu => "menu",
            SceneKind::Options => "options",
            SceneKind::Load => "load",
            SceneKind::Gameover => "gameover",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// 叠在其他场景上的界面（菜单类）
    pub fn is_gui(&self) -> bool {
        matches!(self, SceneKind::Menu | SceneKind::Options | SceneKind::Load)
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for kind in SceneKind::ALL {
            assert_eq!(SceneKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SceneKind::from_name("shop"), None);
    }

    #[test]
    fn test_gui_kinds() {
        assert!(SceneKind::Menu.is_gui());
        assert!(!SceneKind::Map.is_gui());
        assert!(!SceneKind::Battle.is_gui());
    }
}
