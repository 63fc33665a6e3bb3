//! DXF 读取与 GeoPackage 写出
//!
//! - `dxf_io`：把 DXF 实体读成要素集合
//! - `gpkg`：基于 `rusqlite_gpkg` 的 GeoPackage 容器
//! - `export`：按图层拆分并逐层写出

pub mod config;
pub mod dxf_io;
pub mod error;
pub mod export;
pub mod gpkg;

#[cfg(test)]
mod test_support;

pub use config::ReaderConfig;
pub use dxf_io::{DxfDataset, FeatureCollection};
pub use error::{ExportError, GpkgError};
pub use export::{
    export_collection, export_layers, ExportOptions, ExportReport, ExportWarning, LayerOutput,
};
pub use gpkg::{field_values, FeatureLayer, GeoPackage};
