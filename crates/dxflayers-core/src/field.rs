//! 字段模式与字段值
//!
//! 输入数据集的字段定义会原样复制到每个输出容器，
//! 因此同一输入产生的所有输出拥有完全相同的字段模式。

use std::fmt;

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Real,
    String,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "Integer"),
            FieldType::Real => write!(f, "Real"),
            FieldType::String => write!(f, "String"),
        }
    }
}

/// 字段定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefn {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDefn {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// 有序字段模式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDefn>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDefn>) -> Self {
        Self { fields }
    }

    /// 按名称查找字段下标
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDefn> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 字段值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    String(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// 转换为目标字段类型
    ///
    /// 空值保持为空；非有限浮点数无法写入任何字段。
    pub fn coerce(&self, target: FieldType) -> Result<FieldValue, CoerceError> {
        let fail = |reason: &str| CoerceError {
            value: self.to_string(),
            target,
            reason: reason.to_string(),
        };

        match (self, target) {
            (FieldValue::Null, _) => Ok(FieldValue::Null),
            (FieldValue::Real(v), _) if !v.is_finite() => Err(fail("non-finite number")),

            (FieldValue::Integer(v), FieldType::Integer) => Ok(FieldValue::Integer(*v)),
            (FieldValue::Integer(v), FieldType::Real) => Ok(FieldValue::Real(*v as f64)),
            (FieldValue::Integer(v), FieldType::String) => Ok(FieldValue::String(v.to_string())),

            (FieldValue::Real(v), FieldType::Integer) => {
                if v.fract() != 0.0 {
                    Err(fail("fractional part would be lost"))
                } else if *v < i64::MIN as f64 || *v >= i64::MAX as f64 {
                    Err(fail("out of integer range"))
                } else {
                    Ok(FieldValue::Integer(*v as i64))
                }
            }
            (FieldValue::Real(v), FieldType::Real) => Ok(FieldValue::Real(*v)),
            (FieldValue::Real(v), FieldType::String) => Ok(FieldValue::String(v.to_string())),

            (FieldValue::String(s), FieldType::Integer) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| fail(&e.to_string())),
            (FieldValue::String(s), FieldType::Real) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(FieldValue::Real(v)),
                Ok(_) => Err(fail("non-finite number")),
                Err(e) => Err(fail(&e.to_string())),
            },
            (FieldValue::String(s), FieldType::String) => Ok(FieldValue::String(s.clone())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Real(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

/// 字段值转换错误
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot convert {value} to {target}: {reason}")]
pub struct CoerceError {
    pub value: String,
    pub target: FieldType,
    pub reason: String,
}
