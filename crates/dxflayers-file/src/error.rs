//! 文件操作错误定义

use dxflayers_core::srs::SrsError;
use std::path::PathBuf;
use thiserror::Error;

/// 导出过程中的致命错误
///
/// 图层容器创建失败、单个字段复制失败不在此列，它们作为警告收集在
/// [`crate::export::ExportReport`] 中。
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot resolve spatial reference: {0}")]
    ReferenceResolution(#[from] SrsError),

    #[error("cannot open DXF input {path}: {reason}")]
    InputOpen { path: PathBuf, reason: String },
}

/// GeoPackage 容器错误
#[derive(Error, Debug)]
pub enum GpkgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoPackage error: {0}")]
    Container(#[from] rusqlite_gpkg::GpkgError),

    #[error("{0} is a directory")]
    NotAFile(PathBuf),

    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    #[error("Invalid srs id: {0}")]
    InvalidSrsId(i32),

    #[error("Feature srs {found} does not match layer srs {expected}")]
    SrsMismatch { expected: i32, found: i32 },
}
