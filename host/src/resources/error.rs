//! # Resource Error 模块
//!
//! 定义资源管理相关的错误类型。
//!
//! 资源错误不会传进逐帧更新：[`ResourceManager`](super::ResourceManager)
//! 记录警告后退化为空位图。

use thiserror::Error;

/// 资源管理错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// 资源未找到
    #[error("资源未找到: {path}")]
    NotFound {
        /// 资源路径
        path: String,
    },

    /// 无效的资源格式
    #[error("无效的资源格式: {path} - {message}")]
    InvalidFormat {
        /// 资源路径
        path: String,
        /// 错误消息
        message: String,
    },
}
