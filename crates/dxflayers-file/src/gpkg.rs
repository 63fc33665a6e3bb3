//! GeoPackage 容器（.gpkg）
//!
//! 在 `rusqlite_gpkg` 之上按字段模式管理要素表：
//! - 磁盘文件与内存两种形式，结构完全相同
//! - 几何列 `geom` 接受任意简单要素类型，Z 维度按图层决定
//! - 在两个容器之间整表复制

use crate::error::GpkgError;
use dxflayers_core::feature::OutputFeature;
use dxflayers_core::field::{FieldDefn, FieldType, FieldValue, Schema};
use dxflayers_core::geometry::empty_wkt;
use dxflayers_core::srs::SpatialReference;
use geo_traits::GeometryTrait;
use rusqlite::ErrorCode;
use rusqlite_gpkg::{
    ColumnSpec, ColumnType, Dimension, GeometryType, Gpkg, GpkgFeature, GpkgLayer, Value,
};
use std::path::Path;

/// 要素表的几何列名
pub const GEOMETRY_COLUMN: &str = "geom";

/// GeoPackage 容器
#[derive(Debug)]
pub struct GeoPackage {
    gpkg: Gpkg,
}

impl GeoPackage {
    /// 在磁盘上新建容器，已存在的同名文件会被覆盖
    pub fn create(path: &Path) -> Result<Self, GpkgError> {
        if path.is_dir() {
            return Err(GpkgError::NotAFile(path.to_path_buf()));
        }
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(Self {
            gpkg: Gpkg::open(path)?,
        })
    }

    /// 新建内存容器
    pub fn in_memory() -> Result<Self, GpkgError> {
        Ok(Self {
            gpkg: Gpkg::open_in_memory()?,
        })
    }

    /// 以只读方式打开已有容器
    pub fn open(path: &Path) -> Result<Self, GpkgError> {
        Ok(Self {
            gpkg: Gpkg::open_read_only(path)?,
        })
    }

    /// 登记空间参考，已登记的同一 srs_id 直接跳过
    pub fn register_srs(&self, srs: &SpatialReference) -> Result<(), GpkgError> {
        let registered = self.gpkg.register_srs(
            &srs.name,
            srs.srs_id,
            &srs.organization,
            srs.organization_coordsys_id,
            &srs.definition,
            &srs.name,
        );
        match registered {
            Err(rusqlite_gpkg::GpkgError::Sql(rusqlite::Error::SqliteFailure(e, _)))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Ok(())
            }
            other => Ok(other?),
        }
    }

    /// 按字段模式创建要素表
    ///
    /// 空间参考须已登记。同名表已存在时报错。
    pub fn create_layer(
        &self,
        name: &str,
        schema: &Schema,
        srs: &SpatialReference,
        dimension: Dimension,
    ) -> Result<FeatureLayer, GpkgError> {
        // 列名在表定义中按原样加双引号
        if let Some(field) = schema.iter().find(|f| f.name.contains('"')) {
            return Err(GpkgError::InvalidFieldName(field.name.clone()));
        }
        let srs_id = u32::try_from(srs.srs_id).map_err(|_| GpkgError::InvalidSrsId(srs.srs_id))?;

        let columns: Vec<ColumnSpec> = schema
            .iter()
            .map(|f| ColumnSpec {
                name: f.name.clone(),
                column_type: column_type(f.field_type),
            })
            .collect();
        let layer = self.gpkg.create_layer(
            name,
            GEOMETRY_COLUMN,
            GeometryType::GeometryCollection,
            dimension,
            srs_id,
            &columns,
        )?;
        Ok(FeatureLayer {
            layer,
            schema: schema.clone(),
            srs_id: srs.srs_id,
        })
    }

    /// 打开已有要素表
    pub fn layer(&self, name: &str) -> Result<FeatureLayer, GpkgError> {
        let layer = self.gpkg.get_layer(name)?;
        let srs_id = i32::try_from(layer.srs_id).map_err(|_| GpkgError::InvalidSrsId(-1))?;
        let schema = Schema::new(
            layer
                .property_columns
                .iter()
                .map(|c| FieldDefn::new(c.name.clone(), field_type(c.column_type)))
                .collect(),
        );
        Ok(FeatureLayer {
            layer,
            schema,
            srs_id,
        })
    }

    /// 所有要素表名
    pub fn layer_names(&self) -> Result<Vec<String>, GpkgError> {
        Ok(self.gpkg.list_layers()?)
    }

    /// 从另一个容器的要素表整表复制
    ///
    /// 目标表沿用源表的字段模式与坐标维度，`srs` 须与源表一致。
    /// 返回复制的要素数。
    pub fn copy_layer(
        &self,
        source: &FeatureLayer,
        target: &str,
        srs: &SpatialReference,
    ) -> Result<u64, GpkgError> {
        if srs.srs_id != source.srs_id() {
            return Err(GpkgError::SrsMismatch {
                expected: source.srs_id(),
                found: srs.srs_id,
            });
        }
        self.register_srs(srs)?;
        let layer = self.create_layer(target, source.schema(), srs, source.dimension())?;

        let mut copied = 0;
        for feature in source.features()? {
            layer.insert_geometry(feature.geometry()?, feature.properties())?;
            copied += 1;
        }
        Ok(copied)
    }
}

/// 要素表句柄
///
/// 字段模式在打开时读取一次，写入语句由连接缓存。
#[derive(Debug)]
pub struct FeatureLayer {
    layer: GpkgLayer,
    schema: Schema,
    srs_id: i32,
}

impl FeatureLayer {
    pub fn name(&self) -> &str {
        &self.layer.layer_name
    }

    /// 字段模式（不含主键与几何列）
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn srs_id(&self) -> i32 {
        self.srs_id
    }

    pub fn dimension(&self) -> Dimension {
        self.layer.geometry_dimension
    }

    /// 几何是否带Z坐标
    pub fn has_z(&self) -> bool {
        matches!(self.dimension(), Dimension::Xyz | Dimension::Xyzm)
    }

    /// 按 fid 顺序读取全部要素
    pub fn features(&self) -> Result<Vec<GpkgFeature>, GpkgError> {
        Ok(self.layer.features()?)
    }

    pub fn feature_count(&self) -> Result<u64, GpkgError> {
        Ok(self.layer.features()?.len() as u64)
    }

    /// 写入一个要素
    ///
    /// 没有几何的要素写入空几何集合。
    pub fn insert(&self, feature: &OutputFeature) -> Result<(), GpkgError> {
        if feature.srs_id != self.srs_id {
            return Err(GpkgError::SrsMismatch {
                expected: self.srs_id,
                found: feature.srs_id,
            });
        }

        let values: Vec<Value> = (0..self.schema.len())
            .map(|i| feature.values.get(i).map(to_value).unwrap_or(Value::Null))
            .collect();
        let with_z = self.has_z();
        match &feature.geometry {
            Some(geometry) => self.insert_geometry(geometry.to_wkt(with_z), &values),
            None => self.insert_geometry(empty_wkt(with_z), &values),
        }
    }

    /// 写入任意几何与按模式排列的字段值
    pub fn insert_geometry<G>(&self, geometry: G, values: &[Value]) -> Result<(), GpkgError>
    where
        G: GeometryTrait<T = f64>,
    {
        self.layer.insert(geometry, values)?;
        Ok(())
    }
}

/// 读取要素的字段值，顺序与字段模式一致
pub fn field_values(feature: &GpkgFeature) -> Vec<FieldValue> {
    feature.properties().iter().map(from_value).collect()
}

fn column_type(field_type: FieldType) -> ColumnType {
    match field_type {
        FieldType::Integer => ColumnType::Integer,
        FieldType::Real => ColumnType::Double,
        FieldType::String => ColumnType::Varchar,
    }
}

fn field_type(column_type: ColumnType) -> FieldType {
    match column_type {
        ColumnType::Integer | ColumnType::Boolean => FieldType::Integer,
        ColumnType::Double => FieldType::Real,
        _ => FieldType::String,
    }
}

fn to_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(v) => Value::Integer(*v),
        FieldValue::Real(v) => Value::Real(*v),
        FieldValue::String(s) => Value::Text(s.clone()),
    }
}

fn from_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Integer(v) => FieldValue::Integer(*v),
        Value::Real(v) => FieldValue::Real(*v),
        Value::Text(s) => FieldValue::String(s.clone()),
        Value::Blob(bytes) | Value::Geometry(bytes) => {
            FieldValue::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
