//! 几何图元定义
//!
//! 导出端只需要简单要素模型（OGC Simple Features）：
//! - Point / LineString / Polygon
//! - 对应的 Multi* 以及 GeometryCollection
//!
//! 曲线（圆、圆弧、椭圆、凸度段）在读取时离散化为折线。
//! 写出时转换为 `wkt` 的类型化几何，坐标维度由 [`Geometry::has_z`] 决定。

use crate::math::{approx_eq, Point3, Vector3};
use std::f64::consts::TAU;
use wkt::types::{
    Coord, Dimension, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use wkt::Wkt;

/// 整圆离散化时的分段数
pub const CIRCLE_SEGMENTS: usize = 64;

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point3),
    LineString(Vec<Point3>),
    /// 第一个环为外环，其余为内环
    Polygon(Vec<Vec<Point3>>),
    MultiPoint(Vec<Point3>),
    MultiLineString(Vec<Vec<Point3>>),
    MultiPolygon(Vec<Vec<Vec<Point3>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// 遍历所有坐标
    pub fn for_each_point(&self, f: &mut impl FnMut(&Point3)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::LineString(points) | Geometry::MultiPoint(points) => {
                points.iter().for_each(|p| f(p))
            }
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().flatten().for_each(|p| f(p))
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().for_each(|p| f(p))
            }
            Geometry::GeometryCollection(members) => {
                for member in members {
                    member.for_each_point(f);
                }
            }
        }
    }

    /// 是否不含任何坐标
    pub fn is_empty(&self) -> bool {
        let mut empty = true;
        self.for_each_point(&mut |_: &Point3| empty = false);
        empty
    }

    /// 是否存在非零Z坐标
    pub fn has_z(&self) -> bool {
        let mut has_z = false;
        self.for_each_point(&mut |p: &Point3| {
            if !approx_eq(p.z, 0.0) {
                has_z = true;
            }
        });
        has_z
    }

    /// 转换为 `wkt` 几何，可直接交给 GeoPackage 写出
    ///
    /// `with_z` 为真时保留Z坐标，否则只写XY。
    pub fn to_wkt(&self, with_z: bool) -> Wkt<f64> {
        let dim = if with_z { Dimension::XYZ } else { Dimension::XY };
        match self {
            Geometry::Point(p) => Wkt::Point(point(p, dim)),
            Geometry::LineString(points) => Wkt::LineString(line_string(points, dim)),
            Geometry::Polygon(rings) => Wkt::Polygon(polygon(rings, dim)),
            Geometry::MultiPoint(points) => Wkt::MultiPoint(MultiPoint::new(
                points.iter().map(|p| point(p, dim)).collect(),
                dim,
            )),
            Geometry::MultiLineString(lines) => Wkt::MultiLineString(MultiLineString::new(
                lines.iter().map(|line| line_string(line, dim)).collect(),
                dim,
            )),
            Geometry::MultiPolygon(polygons) => Wkt::MultiPolygon(MultiPolygon::new(
                polygons.iter().map(|rings| polygon(rings, dim)).collect(),
                dim,
            )),
            Geometry::GeometryCollection(members) => Wkt::GeometryCollection(
                GeometryCollection::new(members.iter().map(|m| m.to_wkt(with_z)).collect(), dim),
            ),
        }
    }
}

/// 无坐标的几何集合，用于没有几何的要素
pub fn empty_wkt(with_z: bool) -> Wkt<f64> {
    let dim = if with_z { Dimension::XYZ } else { Dimension::XY };
    Wkt::GeometryCollection(GeometryCollection::empty(dim))
}

fn coord(p: &Point3, dim: Dimension) -> Coord<f64> {
    Coord {
        x: p.x,
        y: p.y,
        z: (dim == Dimension::XYZ).then_some(p.z),
        m: None,
    }
}

fn point(p: &Point3, dim: Dimension) -> Point<f64> {
    Point::new(Some(coord(p, dim)), dim)
}

fn line_string(points: &[Point3], dim: Dimension) -> LineString<f64> {
    LineString::new(points.iter().map(|p| coord(p, dim)).collect(), dim)
}

fn polygon(rings: &[Vec<Point3>], dim: Dimension) -> Polygon<f64> {
    Polygon::new(rings.iter().map(|ring| line_string(ring, dim)).collect(), dim)
}

/// 把任意角度差归一到 `(0, 2π]`
fn sweep_angle(start: f64, end: f64) -> f64 {
    let sweep = (end - start).rem_euclid(TAU);
    if sweep == 0.0 {
        TAU
    } else {
        sweep
    }
}

/// 圆弧离散化
///
/// 角度为弧度，从 `start` 逆时针到 `end`。分段数按扫过角度与整圆的比例取整，至少为1。
/// 角度必须有限，由调用方检查。
pub fn arc_points(center: &Point3, radius: f64, start: f64, end: f64) -> Vec<Point3> {
    let sweep = sweep_angle(start, end);
    let segments = ((CIRCLE_SEGMENTS as f64 * sweep / TAU).ceil() as usize).max(1);
    (0..=segments)
        .map(|i| {
            let angle = start + sweep * i as f64 / segments as f64;
            Point3::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z,
            )
        })
        .collect()
}

/// 整圆离散化（首尾闭合）
pub fn circle_points(center: &Point3, radius: f64) -> Vec<Point3> {
    let mut points = arc_points(center, radius, 0.0, TAU);
    if let (Some(first), Some(last)) = (points.first().copied(), points.last_mut()) {
        *last = first;
    }
    points
}

/// 椭圆离散化
///
/// `major_axis` 为相对圆心的长轴向量，参数范围 `[start, end]`（弧度）。
pub fn ellipse_points(
    center: &Point3,
    major_axis: &Vector3,
    ratio: f64,
    start: f64,
    end: f64,
) -> Vec<Point3> {
    let sweep = sweep_angle(start, end);
    let minor_axis = Vector3::new(-major_axis.y, major_axis.x, 0.0) * ratio;
    let segments = ((CIRCLE_SEGMENTS as f64 * sweep / TAU).ceil() as usize).max(1);
    (0..=segments)
        .map(|i| {
            let t = start + sweep * i as f64 / segments as f64;
            *center + major_axis * t.cos() + minor_axis * t.sin()
        })
        .collect()
}

/// 凸度段离散化
///
/// DXF 多段线顶点的 bulge = tan(θ/4)，θ 为圆弧包角，正值表示逆时针。
/// 返回 `from` 到 `to` 之间的中间点（不含端点）。
pub fn bulge_points(from: &Point3, to: &Point3, bulge: f64) -> Vec<Point3> {
    if approx_eq(bulge, 0.0) {
        return Vec::new();
    }
    let chord = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
    if approx_eq(chord, 0.0) {
        return Vec::new();
    }

    let theta = 4.0 * bulge.atan();
    let radius = chord / (2.0 * (theta / 2.0).sin().abs());
    let mid_x = (from.x + to.x) / 2.0;
    let mid_y = (from.y + to.y) / 2.0;
    // 圆心到弦中点的有向距离
    let sagitta_offset = radius * (theta / 2.0).cos() * theta.signum();
    let nx = -(to.y - from.y) / chord;
    let ny = (to.x - from.x) / chord;
    let center = Point3::new(mid_x + nx * sagitta_offset, mid_y + ny * sagitta_offset, from.z);

    let start = (from.y - center.y).atan2(from.x - center.x);
    let segments = ((CIRCLE_SEGMENTS as f64 * theta.abs() / TAU).ceil() as usize).max(2);
    (1..segments)
        .map(|i| {
            let angle = start + theta * i as f64 / segments as f64;
            Point3::new(
                center.x + radius.abs() * angle.cos(),
                center.y + radius.abs() * angle.sin(),
                from.z,
            )
        })
        .collect()
}
