//! 输出命名规则

/// GeoPackage 文件扩展名
pub const GPKG_EXTENSION: &str = "gpkg";

/// DXF 文件扩展名（比较时忽略大小写）
pub const DXF_EXTENSION: &str = "dxf";

/// 图层名的规范化形式（小写、连字符分隔、去除特殊字符）
pub fn layer_slug(layer: &str) -> String {
    slug::slugify(layer)
}

/// 图层对应的输出文件名，如 `"Door 1"` -> `door-1.gpkg`
pub fn output_file_name(layer: &str) -> String {
    format!("{}.{}", layer_slug(layer), GPKG_EXTENSION)
}

/// 输入文件对应的输出目录名：主干中的 `.` 替换为 `-`，再加 `-layers` 后缀
pub fn layers_dir_name(stem: &str) -> String {
    format!("{}-layers", stem.replace('.', "-"))
}
