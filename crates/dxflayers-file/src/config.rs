//! 读取配置
//!
//! DXF 文本编码由环境变量 `DXF_ENCODING` 控制，默认 UTF-8。

use encoding_rs::{Encoding, UTF_8};
use tracing::warn;

/// 指定 DXF 文本编码的环境变量
pub const DXF_ENCODING_ENV: &str = "DXF_ENCODING";

/// DXF 读取配置
#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
    /// 输入文本编码
    pub encoding: &'static Encoding,
}

impl ReaderConfig {
    /// 从环境变量读取，未设置时使用 UTF-8
    pub fn from_env() -> Self {
        match std::env::var(DXF_ENCODING_ENV) {
            Ok(label) => Self::from_label(&label),
            Err(_) => Self::default(),
        }
    }

    /// 按编码标签（如 `utf-8`、`windows-1250`）创建
    ///
    /// 无法识别的标签回退到 UTF-8。
    pub fn from_label(label: &str) -> Self {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => Self { encoding },
            None => {
                warn!("unknown {} '{}', falling back to UTF-8", DXF_ENCODING_ENV, label);
                Self::default()
            }
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}
