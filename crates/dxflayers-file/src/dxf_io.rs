//! DXF文件读取
//!
//! 把 DXF 的 ENTITIES 段暴露为名为 `entities` 的要素集合：
//! - 固定字段模式：Layer, PaperSpace, SubClasses, Linetype, EntityHandle, Text
//! - 曲线离散化为折线，文字与块参照取插入点
//! - 不支持的实体类型跳过

use crate::config::ReaderConfig;
use crate::error::ExportError;
use dxf::entities::{Entity, EntityType};
use dxflayers_core::feature::{InputFeature, LAYER_FIELD};
use dxflayers_core::field::{FieldDefn, FieldType, FieldValue, Schema};
use dxflayers_core::geometry::{
    arc_points, bulge_points, circle_points, ellipse_points, Geometry,
};
use dxflayers_core::math::{Point3, Vector3};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 要素集合名称
pub const ENTITIES: &str = "entities";

/// DXF 实体集合的字段模式
pub fn entities_schema() -> Schema {
    Schema::new(vec![
        FieldDefn::new(LAYER_FIELD, FieldType::String),
        FieldDefn::new("PaperSpace", FieldType::Integer),
        FieldDefn::new("SubClasses", FieldType::String),
        FieldDefn::new("Linetype", FieldType::String),
        FieldDefn::new("EntityHandle", FieldType::String),
        FieldDefn::new("Text", FieldType::String),
    ])
}

/// 只读要素集合
#[derive(Debug)]
pub struct FeatureCollection {
    pub name: String,
    pub schema: Schema,
    pub features: Vec<InputFeature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// 以只读方式打开的 DXF 数据集
#[derive(Debug)]
pub struct DxfDataset {
    path: PathBuf,
    entities: FeatureCollection,
}

impl DxfDataset {
    /// 打开 DXF 文件
    pub fn open(path: &Path, config: &ReaderConfig) -> Result<Self, ExportError> {
        let drawing = dxf::Drawing::load_file_with_encoding(path, config.encoding).map_err(
            |e| ExportError::InputOpen {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        )?;

        Ok(Self::from_drawing(path, &drawing))
    }

    /// 从已加载的图纸构建数据集
    pub fn from_drawing(path: &Path, drawing: &dxf::Drawing) -> Self {
        let features: Vec<InputFeature> = drawing.entities().filter_map(convert_entity).collect();
        debug!("{}: {} features read", path.display(), features.len());

        Self {
            path: path.to_path_buf(),
            entities: FeatureCollection {
                name: ENTITIES.to_string(),
                schema: entities_schema(),
                features,
            },
        }
    }

    /// 按名称获取要素集合（忽略大小写），DXF 只有 `entities` 一个集合
    pub fn collection(&self, name: &str) -> Result<&FeatureCollection, ExportError> {
        if name.eq_ignore_ascii_case(&self.entities.name) {
            Ok(&self.entities)
        } else {
            Err(ExportError::InputOpen {
                path: self.path.clone(),
                reason: format!("no '{}' collection", name),
            })
        }
    }
}

/// 将DXF实体转换为输入要素
fn convert_entity(entity: &Entity) -> Option<InputFeature> {
    let (subclass, geometry, text) = match &entity.specific {
        EntityType::ModelPoint(point) => ("AcDbPoint", Geometry::Point(point3(&point.location)), None),

        EntityType::Line(line) => (
            "AcDbLine",
            Geometry::LineString(vec![point3(&line.p1), point3(&line.p2)]),
            None,
        ),

        EntityType::LwPolyline(lwpoly) => {
            let vertices: Vec<(Point3, f64)> = lwpoly
                .vertices
                .iter()
                .map(|v| (Point3::new(v.x, v.y, 0.0), v.bulge))
                .collect();
            (
                "AcDbPolyline",
                Geometry::LineString(polyline_points(&vertices, lwpoly.is_closed())),
                None,
            )
        }

        EntityType::Polyline(poly) => {
            let vertices: Vec<(Point3, f64)> = poly
                .vertices()
                .map(|v| (point3(&v.location), v.bulge))
                .collect();
            (
                "AcDb2dPolyline",
                Geometry::LineString(polyline_points(&vertices, poly.is_closed())),
                None,
            )
        }

        EntityType::Circle(circle) => (
            "AcDbCircle",
            Geometry::LineString(circle_points(&point3(&circle.center), circle.radius)),
            None,
        ),

        EntityType::Arc(arc) => {
            if !finite_angles(arc.start_angle, arc.end_angle) {
                debug!("skipping ARC {:X} with non-finite angles", entity.common.handle.0);
                return None;
            }
            (
                "AcDbCircle:AcDbArc",
                Geometry::LineString(arc_points(
                    &point3(&arc.center),
                    arc.radius,
                    arc.start_angle.to_radians(),
                    arc.end_angle.to_radians(),
                )),
                None,
            )
        }

        EntityType::Ellipse(ellipse) => {
            if !finite_angles(ellipse.start_parameter, ellipse.end_parameter) {
                debug!(
                    "skipping ELLIPSE {:X} with non-finite parameters",
                    entity.common.handle.0
                );
                return None;
            }
            let major_axis = Vector3::new(
                ellipse.major_axis.x,
                ellipse.major_axis.y,
                ellipse.major_axis.z,
            );
            (
                "AcDbEllipse",
                Geometry::LineString(ellipse_points(
                    &point3(&ellipse.center),
                    &major_axis,
                    ellipse.minor_axis_ratio,
                    ellipse.start_parameter,
                    ellipse.end_parameter,
                )),
                None,
            )
        }

        EntityType::Spline(spline) => {
            // 有拟合点时优先使用拟合点
            let source = if spline.fit_points.is_empty() {
                &spline.control_points
            } else {
                &spline.fit_points
            };
            let mut points: Vec<Point3> = source.iter().map(point3).collect();
            if spline.is_closed() {
                close_ring(&mut points);
            }
            ("AcDbSpline", Geometry::LineString(points), None)
        }

        EntityType::Leader(leader) => (
            "AcDbLeader",
            Geometry::LineString(leader.vertices.iter().map(point3).collect()),
            None,
        ),

        EntityType::Solid(solid) => {
            // SOLID 的第三、四角点按 Z 字形排列
            let mut ring = vec![
                point3(&solid.first_corner),
                point3(&solid.second_corner),
                point3(&solid.fourth_corner),
                point3(&solid.third_corner),
            ];
            ring.dedup();
            close_ring(&mut ring);
            ("AcDbTrace", Geometry::Polygon(vec![ring]), None)
        }

        EntityType::Text(text) => (
            "AcDbText",
            Geometry::Point(point3(&text.location)),
            Some(text.value.clone()),
        ),

        EntityType::MText(mtext) => (
            "AcDbMText",
            Geometry::Point(point3(&mtext.insertion_point)),
            Some(mtext.text.clone()),
        ),

        EntityType::Insert(insert) => (
            "AcDbBlockReference",
            Geometry::Point(point3(&insert.location)),
            None,
        ),

        _ => {
            debug!("ignoring unsupported entity in layer '{}'", entity.common.layer);
            return None;
        }
    };

    let common = &entity.common;
    let values = vec![
        FieldValue::String(common.layer.clone()),
        if common.is_in_paper_space {
            FieldValue::Integer(1)
        } else {
            FieldValue::Null
        },
        FieldValue::String(format!("AcDbEntity:{}", subclass)),
        non_empty(&common.line_type_name),
        FieldValue::String(format!("{:X}", common.handle.0)),
        text.map(FieldValue::String).unwrap_or(FieldValue::Null),
    ];

    let geometry = (!geometry.is_empty()).then_some(geometry);
    Some(InputFeature::new(values, geometry))
}

fn finite_angles(start: f64, end: f64) -> bool {
    start.is_finite() && end.is_finite()
}

fn point3(p: &dxf::Point) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

fn non_empty(s: &str) -> FieldValue {
    if s.is_empty() {
        FieldValue::Null
    } else {
        FieldValue::String(s.to_string())
    }
}

fn close_ring(points: &mut Vec<Point3>) {
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first != last {
            points.push(first);
        }
    }
}

/// 展开带凸度的多段线顶点
fn polyline_points(vertices: &[(Point3, f64)], closed: bool) -> Vec<Point3> {
    let mut points = Vec::with_capacity(vertices.len());
    let segment_count = if closed {
        vertices.len()
    } else {
        vertices.len().saturating_sub(1)
    };

    for (i, (point, bulge)) in vertices.iter().enumerate() {
        points.push(*point);
        if i < segment_count {
            let next = &vertices[(i + 1) % vertices.len()].0;
            points.extend(bulge_points(point, next, *bulge));
        }
    }

    if closed {
        close_ring(&mut points);
    }
    points
}
