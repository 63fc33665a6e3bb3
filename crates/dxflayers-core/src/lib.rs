//! dxflayers 核心数据模型
//!
//! 提供按图层拆分 DXF 所需的全部与格式无关的类型。
//!
//! # 组成
//!
//! - `Schema` / `FieldValue`: 字段模式与字段值，支持按目标类型转换
//! - `InputFeature` / `OutputFeature`: 输入要素与输出要素
//! - `LayerGroups`: 按图层名分组（保持首次出现顺序）
//! - `SpatialReference`: EPSG 代码到坐标系定义的解析
//!
//! # 示例
//!
//! ```rust
//! use dxflayers_core::prelude::*;
//!
//! let schema = Schema::new(vec![FieldDefn::new("Layer", FieldType::String)]);
//! let features = vec![InputFeature::new(vec!["Wall".into()], None)];
//! let groups = LayerGroups::partition(&features, &schema);
//!
//! assert_eq!(groups.layer_names(), vec!["Wall"]);
//! assert_eq!(output_file_name("Wall"), "wall.gpkg");
//! ```

pub mod feature;
pub mod field;
pub mod geometry;
pub mod layer;
pub mod math;
pub mod naming;
pub mod srs;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::feature::{InputFeature, OutputFeature, LAYER_FIELD};
    pub use crate::field::{CoerceError, FieldDefn, FieldType, FieldValue, Schema};
    pub use crate::geometry::Geometry;
    pub use crate::layer::LayerGroups;
    pub use crate::math::Point3;
    pub use crate::naming::{layer_slug, layers_dir_name, output_file_name};
    pub use crate::srs::{SpatialReference, SrsError, DEFAULT_EPSG};
}
