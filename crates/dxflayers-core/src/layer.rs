//! 图层分组
//!
//! DXF 中的图层只是要素上的一个字段值。导出前按原始图层名（未规范化）
//! 把要素分组：分组顺序为图层首次出现的顺序，组内顺序与输入顺序一致。

use crate::feature::InputFeature;
use crate::field::Schema;
use indexmap::IndexMap;

/// 按图层名分组的要素集合
#[derive(Debug, Default)]
pub struct LayerGroups<'a> {
    groups: IndexMap<String, Vec<&'a InputFeature>>,
}

impl<'a> LayerGroups<'a> {
    /// 一次遍历完成分组，不丢弃、不去重
    pub fn partition(
        features: impl IntoIterator<Item = &'a InputFeature>,
        schema: &Schema,
    ) -> Self {
        let mut groups: IndexMap<String, Vec<&'a InputFeature>> = IndexMap::new();
        for feature in features {
            groups
                .entry(feature.layer_name(schema).to_string())
                .or_default()
                .push(feature);
        }
        Self { groups }
    }

    /// 获取指定图层的要素
    pub fn get(&self, layer: &str) -> Option<&[&'a InputFeature]> {
        self.groups.get(layer).map(|v| v.as_slice())
    }

    /// 按首次出现顺序遍历 (图层名, 要素)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a InputFeature])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// 图层名列表
    pub fn layer_names(&self) -> Vec<&str> {
        self.groups.keys().map(|k| k.as_str()).collect()
    }

    /// 图层数量
    pub fn count(&self) -> usize {
        self.groups.len()
    }

    /// 所有组内要素总数
    pub fn feature_count(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }
}
