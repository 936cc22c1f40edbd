//! # Error 模块
//!
//! 宿主层的顶层错误：启动前的配置、数据与输入脚本错误，以及运行中的致命错误。

use std::path::PathBuf;

use stage_runtime::{DataError, StageError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::input::InputError;

/// 宿主错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("数据错误: {0}")]
    Data(#[from] DataError),

    #[error("输入脚本错误: {0}")]
    Input(#[from] InputError),

    #[error("运行失败: {0}")]
    Stage(#[from] StageError),

    #[error("读取文件失败: {path} - {message}")]
    Io { path: PathBuf, message: String },
}

/// Result 类型别名
pub type HostResult<T> = Result<T, HostError>;
