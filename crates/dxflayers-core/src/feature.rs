//! 输入/输出要素
//!
//! 输入要素由读取器产生，导出时只读；输出要素按暂存模式逐字段复制，
//! 并在几何上附加本次运行的空间参考。

use crate::field::{FieldValue, Schema};
use crate::geometry::Geometry;

/// DXF 要素上标识图层的字段名
pub const LAYER_FIELD: &str = "Layer";

/// 输入要素
#[derive(Debug, Clone, PartialEq)]
pub struct InputFeature {
    /// 与输入模式逐位对齐的字段值
    pub values: Vec<FieldValue>,

    /// 几何（可能为空）
    pub geometry: Option<Geometry>,
}

impl InputFeature {
    pub fn new(values: Vec<FieldValue>, geometry: Option<Geometry>) -> Self {
        Self { values, geometry }
    }

    /// 按字段名取值
    pub fn get<'a>(&'a self, schema: &Schema, name: &str) -> Option<&'a FieldValue> {
        schema.index_of(name).and_then(|i| self.values.get(i))
    }

    /// 所属图层名；缺失或非文本时视为空字符串
    pub fn layer_name(&self, schema: &Schema) -> &str {
        match self.get(schema, LAYER_FIELD) {
            Some(FieldValue::String(name)) => name.as_str(),
            _ => "",
        }
    }
}

/// 输出要素
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFeature {
    /// 与暂存模式逐位对齐的字段值
    pub values: Vec<FieldValue>,

    /// 原样传递的几何
    pub geometry: Option<Geometry>,

    /// 附加的空间参考ID
    pub srs_id: i32,
}

impl OutputFeature {
    /// 按模式创建全空要素
    pub fn new(schema: &Schema, srs_id: i32) -> Self {
        Self {
            values: vec![FieldValue::Null; schema.len()],
            geometry: None,
            srs_id,
        }
    }

    /// 设置指定下标的字段值
    pub fn set(&mut self, index: usize, value: FieldValue) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// 设置几何
    pub fn with_geometry(mut self, geometry: Option<Geometry>) -> Self {
        self.geometry = geometry;
        self
    }
}
