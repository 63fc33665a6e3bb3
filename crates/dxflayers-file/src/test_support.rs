//! 测试用 DXF 样例

use dxf::entities::{Circle, Entity, EntityType, Line, Text};
use dxf::enums::AcadVersion;
use dxf::{Drawing, Point};
use std::path::{Path, PathBuf};

/// 指定图层上的直线
pub fn line_on(layer: &str, x: f64) -> Entity {
    let mut line = Line::default();
    line.p1 = Point::new(x, 0.0, 0.0);
    line.p2 = Point::new(x, 10.0, 0.0);
    let mut entity = Entity::new(EntityType::Line(line));
    entity.common.layer = layer.to_string();
    entity
}

/// 指定图层上的圆
pub fn circle_on(layer: &str, radius: f64) -> Entity {
    let mut circle = Circle::default();
    circle.center = Point::new(5.0, 5.0, 0.0);
    circle.radius = radius;
    let mut entity = Entity::new(EntityType::Circle(circle));
    entity.common.layer = layer.to_string();
    entity
}

/// 指定图层上的单行文字
pub fn text_on(layer: &str, value: &str) -> Entity {
    let mut text = Text::default();
    text.location = Point::new(1.0, 2.0, 0.0);
    text.value = value.to_string();
    text.text_height = 2.5;
    let mut entity = Entity::new(EntityType::Text(text));
    entity.common.layer = layer.to_string();
    entity
}

/// 空图纸
pub fn drawing_with(entities: Vec<Entity>) -> Drawing {
    let mut drawing = Drawing::new();
    drawing.header.version = AcadVersion::R2000;
    for entity in entities {
        drawing.add_entity(entity);
    }
    drawing
}

/// 两个图层 "Wall"、"Door 1" 加上默认图层 "0" 的样例
pub fn sample_drawing() -> Drawing {
    drawing_with(vec![
        line_on("Wall", 0.0),
        circle_on("Door 1", 1.0),
        line_on("Wall", 20.0),
        text_on("0", "hello"),
    ])
}

/// 保存图纸并返回路径
pub fn save_drawing(dir: &Path, name: &str, drawing: &Drawing) -> PathBuf {
    let path = dir.join(name);
    drawing.save_file(&path).expect("Failed to save DXF");
    path
}
