//! # Error 模块
//!
//! 定义 stage-runtime 中使用的错误类型。
//!
//! 逐帧更新路径上不存在错误：资源未就绪时停顿，引用缺失时隐藏。
//! 只有数据表加载和启动阶段会把错误抛给上层。

use thiserror::Error;

/// 数据表错误（动画库、动作配置）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// JSON 解析失败
    #[error("数据解析失败: {message}")]
    Parse { message: String },

    /// 未知的动画位置代码
    #[error("未知的动画位置代码 {code}，有效范围是 0..=3")]
    UnknownPosition { code: u8 },

    /// 无效的动作定义
    #[error("动作 '{motion}' 无效 - {message}")]
    InvalidMotion { motion: String, message: String },

    /// 动作配置缺少必需的动作
    #[error("动作配置 '{profile}' 缺少动作 '{motion}'")]
    MissingMotion { profile: String, motion: String },

    /// 动画 id 重复
    #[error("动画 id {id} 重复定义")]
    DuplicateAnimation { id: u32 },

    /// 未知的内置配置名
    #[error("未知的动作配置 '{name}'")]
    UnknownProfile { name: String },
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Parse {
            message: e.to_string(),
        }
    }
}

/// stage-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// 启动超时（资源或数据库在限定帧数内未就绪）
    #[error("启动超时：{frames} 帧内资源未就绪")]
    BootTimeout { frames: u32 },

    /// 新游戏没有设置初始位置
    #[error("未设置玩家初始位置")]
    StartPositionUnset,

    /// 数据错误
    #[error("数据错误: {0}")]
    Data(#[from] DataError),
}

/// Result 类型别名
pub type StageResult<T> = Result<T, StageError>;
