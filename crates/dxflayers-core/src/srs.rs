//! 空间参考系
//!
//! 由 EPSG 代码解析出完整的坐标系定义（OGC WKT），写入 GeoPackage 的
//! `gpkg_spatial_ref_sys` 表并附加到每个输出几何上。只附加，不做坐标变换。
//!
//! 定义取自 `crs-definitions` 收录的 EPSG 登记表。

/// 未指定时使用的 EPSG 代码（HD72 / EOV）
pub const DEFAULT_EPSG: u32 = 23700;

/// 空间参考系定义（对应 gpkg_spatial_ref_sys 的一行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialReference {
    pub srs_id: i32,
    pub name: String,
    pub organization: String,
    pub organization_coordsys_id: i32,
    pub definition: String,
}

impl SpatialReference {
    /// 按 EPSG 代码解析
    pub fn from_epsg(code: u32) -> Result<Self, SrsError> {
        let def = u16::try_from(code)
            .ok()
            .and_then(crs_definitions::from_code)
            .ok_or(SrsError::Unknown(code))?;
        let id = i32::from(def.code);

        Ok(Self {
            srs_id: id,
            name: wkt_name(def.wkt).unwrap_or("unnamed").to_string(),
            organization: "EPSG".to_string(),
            organization_coordsys_id: id,
            definition: def.wkt.to_string(),
        })
    }
}

/// WKT 根节点的名称，如 `PROJCS["HD72 / EOV",...]` 中的 `HD72 / EOV`
fn wkt_name(wkt: &str) -> Option<&str> {
    let (_, rest) = wkt.split_once("[\"")?;
    let (name, _) = rest.split_once('"')?;
    Some(name)
}

/// 空间参考解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SrsError {
    #[error("unknown EPSG code: {0}")]
    Unknown(u32),
}
