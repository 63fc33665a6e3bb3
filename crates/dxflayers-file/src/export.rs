//! 按图层导出
//!
//! 把 DXF 的 `entities` 集合按 `Layer` 字段拆分，每个图层写成一个
//! `<slug>.gpkg`。每组先写入内存暂存容器，再整表复制到磁盘容器，
//! 同一时刻只持有一个图层的数据。
//!
//! 三类可恢复的失败不会中断导出：
//! - 某图层的输出容器无法创建：跳过该图层
//! - 容器已创建但暂存或复制失败：删除该文件，跳过该图层
//! - 某要素的单个字段无法复制：该字段写空字符串，要素照常写出
//!
//! 它们以 [`ExportWarning`] 的形式收集在 [`ExportReport`] 中并记录警告日志。

use crate::config::ReaderConfig;
use crate::dxf_io::{DxfDataset, FeatureCollection, ENTITIES};
use crate::error::{ExportError, GpkgError};
use crate::gpkg::{FeatureLayer, GeoPackage};
use dxflayers_core::feature::{InputFeature, OutputFeature};
use dxflayers_core::field::{FieldValue, Schema};
use dxflayers_core::geometry::Geometry;
use dxflayers_core::layer::LayerGroups;
use dxflayers_core::naming::{layer_slug, output_file_name};
use dxflayers_core::srs::{SpatialReference, DEFAULT_EPSG};
use rusqlite_gpkg::Dimension;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 导出选项
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// EPSG 代码，None 时使用 [`DEFAULT_EPSG`]
    pub epsg: Option<u32>,

    /// 输出目录，None 时使用当前目录
    pub out_dir: Option<PathBuf>,

    /// 是否在标准输出打印每个输出文件名
    pub verbose: bool,

    /// DXF 读取配置
    pub reader: ReaderConfig,
}

impl ExportOptions {
    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = Some(epsg);
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(out_dir.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    /// 图层输出文件的完整路径
    pub fn output_path(&self, layer: &str) -> PathBuf {
        let file_name = output_file_name(layer);
        match &self.out_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// 非致命的导出警告
#[derive(Debug, Clone, PartialEq)]
pub enum ExportWarning {
    /// 输出容器无法创建，整个图层被跳过
    ContainerNotCreated {
        layer: String,
        slug: String,
        reason: String,
    },

    /// 单个字段无法复制，已替换为空字符串
    FieldNotCopied {
        layer: String,
        slug: String,
        feature_index: usize,
        field: String,
        reason: String,
    },

    /// 容器已创建但暂存数据未能写入
    LayerNotWritten {
        layer: String,
        slug: String,
        reason: String,
    },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::ContainerNotCreated { slug, .. } => {
                write!(f, "ERROR: layer \"{}\" was not created", slug)
            }
            ExportWarning::FieldNotCopied {
                slug,
                feature_index,
                field,
                ..
            } => write!(
                f,
                "ERROR: layer \"{}\" feature#{} {} was not copied",
                slug, feature_index, field
            ),
            ExportWarning::LayerNotWritten { slug, .. } => {
                write!(f, "ERROR: layer \"{}\" was not written", slug)
            }
        }
    }
}

/// 成功写出的图层
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOutput {
    /// 原始图层名
    pub layer: String,
    pub path: PathBuf,
    pub feature_count: u64,
}

/// 导出结果：写出的图层与收集到的警告
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub outputs: Vec<LayerOutput>,
    pub warnings: Vec<ExportWarning>,
}

impl ExportReport {
    /// 写出的要素总数
    pub fn feature_count(&self) -> u64 {
        self.outputs.iter().map(|o| o.feature_count).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, warning: ExportWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// 将 DXF 文件按图层导出为 GeoPackage
pub fn export_layers(input: &Path, options: &ExportOptions) -> Result<ExportReport, ExportError> {
    let srs = SpatialReference::from_epsg(options.epsg.unwrap_or(DEFAULT_EPSG))?;

    let dataset = DxfDataset::open(input, &options.reader)?;
    let entities = dataset.collection(ENTITIES)?;
    info!(
        "{}: {} features, EPSG:{}",
        input.display(),
        entities.len(),
        srs.srs_id
    );

    Ok(export_collection(entities, &srs, options))
}

/// 将已读取的要素集合按图层导出
pub fn export_collection(
    collection: &FeatureCollection,
    srs: &SpatialReference,
    options: &ExportOptions,
) -> ExportReport {
    let groups = LayerGroups::partition(&collection.features, &collection.schema);
    debug!("{} layers", groups.count());

    let mut report = ExportReport::default();
    for (layer, features) in groups.iter() {
        let path = options.output_path(layer);
        if options.verbose {
            println!("{}", output_file_name(layer));
        }
        export_group(
            layer,
            features,
            &collection.schema,
            srs,
            &path,
            &mut report,
        );
    }
    report
}

/// 导出单个图层
///
/// 暂存容器与磁盘容器都在本函数内创建并释放。写出失败时不留下文件。
fn export_group(
    layer: &str,
    features: &[&InputFeature],
    schema: &Schema,
    srs: &SpatialReference,
    path: &Path,
    report: &mut ExportReport,
) {
    let slug = layer_slug(layer);

    let persisted = match GeoPackage::create(path) {
        Ok(package) => package,
        Err(e) => {
            report.warn(ExportWarning::ContainerNotCreated {
                layer: layer.to_string(),
                slug,
                reason: e.to_string(),
            });
            return;
        }
    };

    let written = stage_features(layer, &slug, features, schema, srs, report)
        .and_then(|staged| persisted.copy_layer(&staged, ENTITIES, srs));
    drop(persisted);

    match written {
        Ok(feature_count) => {
            info!("{}: {} features -> {}", layer, feature_count, path.display());
            report.outputs.push(LayerOutput {
                layer: layer.to_string(),
                path: path.to_path_buf(),
                feature_count,
            });
        }
        Err(e) => {
            if let Err(remove) = std::fs::remove_file(path) {
                warn!("cannot remove {}: {}", path.display(), remove);
            }
            report.warn(ExportWarning::LayerNotWritten {
                layer: layer.to_string(),
                slug,
                reason: e.to_string(),
            });
        }
    }
}

/// 在内存容器中按输入模式逐要素、逐字段暂存
///
/// 任一要素带Z坐标时整层按三维写出。
fn stage_features(
    layer: &str,
    slug: &str,
    features: &[&InputFeature],
    schema: &Schema,
    srs: &SpatialReference,
    report: &mut ExportReport,
) -> Result<FeatureLayer, GpkgError> {
    let dimension = if features
        .iter()
        .any(|f| f.geometry.as_ref().is_some_and(Geometry::has_z))
    {
        Dimension::Xyz
    } else {
        Dimension::Xy
    };

    let staging = GeoPackage::in_memory()?;
    staging.register_srs(srs)?;
    let staged = staging.create_layer(ENTITIES, schema, srs, dimension)?;
    let staging_schema = staged.schema();

    for (feature_index, source) in features.iter().enumerate() {
        let mut output = OutputFeature::new(staging_schema, srs.srs_id);
        for (i, field) in staging_schema.iter().enumerate() {
            let value = source
                .get(schema, &field.name)
                .cloned()
                .unwrap_or(FieldValue::Null);
            match value.coerce(field.field_type) {
                Ok(value) => output.set(i, value),
                Err(e) => {
                    report.warn(ExportWarning::FieldNotCopied {
                        layer: layer.to_string(),
                        slug: slug.to_string(),
                        feature_index,
                        field: field.name.clone(),
                        reason: e.to_string(),
                    });
                    output.set(i, FieldValue::String(String::new()));
                }
            }
        }
        // 只附加空间参考，坐标原样保留
        let output = output.with_geometry(source.geometry.clone());
        staged.insert(&output)?;
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxf_io::entities_schema;
    use crate::gpkg::field_values;
    use crate::test_support::{sample_drawing, save_drawing};
    use dxflayers_core::field::{FieldDefn, FieldType};
    use dxflayers_core::math::Point3;

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions::default().with_out_dir(dir)
    }

    fn count(path: &Path) -> u64 {
        GeoPackage::open(path)
            .expect("Failed to open output")
            .layer(ENTITIES)
            .unwrap()
            .feature_count()
            .unwrap()
    }

    fn entity(layer: &str, text: &str) -> InputFeature {
        InputFeature::new(
            vec![
                layer.into(),
                FieldValue::Integer(0),
                "AcDbEntity:AcDbText".into(),
                FieldValue::Null,
                "1F".into(),
                text.into(),
            ],
            Some(Geometry::Point(Point3::new(1.0, 2.0, 0.0))),
        )
    }

    fn collection(features: Vec<InputFeature>) -> FeatureCollection {
        FeatureCollection {
            name: ENTITIES.to_string(),
            schema: entities_schema(),
            features,
        }
    }

    fn default_srs() -> SpatialReference {
        SpatialReference::from_epsg(DEFAULT_EPSG).unwrap()
    }

    #[test]
    fn test_export_layers_per_group() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());
        let out = dir.path().join("plan-layers");
        std::fs::create_dir(&out).unwrap();

        let report = export_layers(&input, &options(&out)).expect("Export failed");

        assert!(report.is_clean());
        assert_eq!(report.feature_count(), 4);
        let names: Vec<&str> = report.outputs.iter().map(|o| o.layer.as_str()).collect();
        assert_eq!(names, vec!["Wall", "Door 1", "0"]);

        assert_eq!(count(&out.join("wall.gpkg")), 2);
        assert_eq!(count(&out.join("door-1.gpkg")), 1);
        assert_eq!(count(&out.join("0.gpkg")), 1);
    }

    #[test]
    fn test_output_keeps_schema_and_srs() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());

        export_layers(&input, &options(dir.path()).with_epsg(4326)).unwrap();

        let package = GeoPackage::open(&dir.path().join("wall.gpkg")).unwrap();
        assert_eq!(package.layer_names().unwrap(), vec![ENTITIES.to_string()]);
        let layer = package.layer(ENTITIES).unwrap();
        assert_eq!(layer.schema(), &entities_schema());
        assert_eq!(layer.srs_id(), 4326);

        let features = layer.features().unwrap();
        assert!(features[0].geometry().is_ok());
        assert_eq!(field_values(&features[0])[0], FieldValue::from("Wall"));
    }

    #[test]
    fn test_every_output_shares_schema() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());

        let report = export_layers(&input, &options(dir.path())).unwrap();

        assert_eq!(report.outputs.len(), 3);
        for output in &report.outputs {
            let package = GeoPackage::open(&output.path).unwrap();
            let layer = package.layer(ENTITIES).unwrap();
            assert_eq!(layer.schema(), &entities_schema(), "{}", output.layer);
            assert_eq!(layer.srs_id(), 23700);
        }
    }

    #[test]
    fn test_empty_layer_name_writes_dot_gpkg() {
        let dir = tempfile::tempdir().unwrap();
        let collection = collection(vec![entity("", "unnamed")]);

        let report = export_collection(&collection, &default_srs(), &options(dir.path()));

        assert!(report.is_clean());
        assert_eq!(report.outputs[0].layer, "");
        let path = dir.path().join(".gpkg");
        assert_eq!(report.outputs[0].path, path);
        assert_eq!(count(&path), 1);
    }

    #[test]
    fn test_slug_collision_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let collection = collection(vec![
            entity("Wall", "first"),
            entity("WALL", "second"),
            entity("WALL", "third"),
        ]);

        let report = export_collection(&collection, &default_srs(), &options(dir.path()));

        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.outputs[0].path, report.outputs[1].path);

        let package = GeoPackage::open(&dir.path().join("wall.gpkg")).unwrap();
        let features = package.layer(ENTITIES).unwrap().features().unwrap();
        let layers: Vec<FieldValue> = features.iter().map(|f| field_values(f)[0].clone()).collect();
        assert_eq!(layers, vec![FieldValue::from("WALL"), FieldValue::from("WALL")]);
    }

    #[test]
    fn test_rerun_overwrites_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());
        let options = options(dir.path());

        export_layers(&input, &options).unwrap();
        let report = export_layers(&input, &options).unwrap();

        assert!(report.is_clean());
        assert_eq!(count(&dir.path().join("wall.gpkg")), 2);
    }

    #[test]
    fn test_unconvertible_field_degrades_to_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let mut feature = entity("Wall", "label");
        feature.values[1] = "abc".into();

        let report =
            export_collection(&collection(vec![feature]), &default_srs(), &options(dir.path()));

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].to_string(),
            "ERROR: layer \"wall\" feature#0 PaperSpace was not copied"
        );
        assert_eq!(report.outputs.len(), 1);

        let package = GeoPackage::open(&dir.path().join("wall.gpkg")).unwrap();
        let features = package.layer(ENTITIES).unwrap().features().unwrap();
        assert_eq!(features.len(), 1);
        let values = field_values(&features[0]);
        assert_eq!(values[1], FieldValue::String(String::new()));
        assert_eq!(values[4], FieldValue::from("1F"));
    }

    #[test]
    fn test_elevated_layer_is_three_dimensional() {
        let dir = tempfile::tempdir().unwrap();
        let mut raised = entity("Levels", "raised");
        raised.geometry = Some(Geometry::Point(Point3::new(1.0, 2.0, 7.5)));

        export_collection(
            &collection(vec![entity("Levels", "flat"), raised]),
            &default_srs(),
            &options(dir.path()),
        );

        let package = GeoPackage::open(&dir.path().join("levels.gpkg")).unwrap();
        assert!(package.layer(ENTITIES).unwrap().has_z());
    }

    #[test]
    fn test_failed_staging_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = FeatureCollection {
            name: ENTITIES.to_string(),
            schema: Schema::new(vec![
                FieldDefn::new("Layer", FieldType::String),
                FieldDefn::new("odd\"name", FieldType::String),
            ]),
            features: vec![InputFeature::new(vec!["Wall".into(), "x".into()], None)],
        };

        let report = export_collection(&broken, &default_srs(), &options(dir.path()));

        assert!(report.outputs.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].to_string(),
            "ERROR: layer \"wall\" was not written"
        );
        assert!(!dir.path().join("wall.gpkg").exists());
    }

    #[test]
    fn test_container_failure_skips_one_layer() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        // 同名目录占位，wall.gpkg 无法创建
        std::fs::create_dir(out.join("wall.gpkg")).unwrap();

        let report = export_layers(&input, &options(&out)).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].to_string(),
            "ERROR: layer \"wall\" was not created"
        );
        assert!(out.join("wall.gpkg").is_dir());
        assert_eq!(count(&out.join("door-1.gpkg")), 1);
        assert_eq!(count(&out.join("0.gpkg")), 1);
    }

    #[test]
    fn test_unknown_epsg_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let result = export_layers(&input, &options(&out).with_epsg(999_999));

        assert!(matches!(result, Err(ExportError::ReferenceResolution(_))));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_national_grid_epsg() {
        let dir = tempfile::tempdir().unwrap();
        let input = save_drawing(dir.path(), "plan.dxf", &sample_drawing());

        export_layers(&input, &options(dir.path()).with_epsg(27700)).unwrap();

        let package = GeoPackage::open(&dir.path().join("0.gpkg")).unwrap();
        assert_eq!(package.layer(ENTITIES).unwrap().srs_id(), 27700);
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_layers(&dir.path().join("missing.dxf"), &options(dir.path()));
        assert!(matches!(result, Err(ExportError::InputOpen { .. })));
    }

    #[test]
    fn test_output_path() {
        let options = ExportOptions::default();
        assert_eq!(options.output_path("Door 1"), PathBuf::from("door-1.gpkg"));

        let options = options.with_out_dir("/tmp/plan-layers");
        assert_eq!(
            options.output_path("Wall"),
            PathBuf::from("/tmp/plan-layers/wall.gpkg")
        );
    }
}
