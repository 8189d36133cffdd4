use parquet_format_safe::Type;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use crate::parquet_bridge::Repetition;
use crate::error::{Error, Result};

/// The physical type of a primitive column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(usize),
}

impl From<PhysicalType> for (Type, Option<i32>) {
    fn from(physical_type: PhysicalType) -> Self {
        match physical_type {
            PhysicalType::Boolean => (Type::BOOLEAN, None),
            PhysicalType::Int32 => (Type::INT32, None),
            PhysicalType::Int64 => (Type::INT64, None),
            PhysicalType::Int96 => (Type::INT96, None),
            PhysicalType::Float => (Type::FLOAT, None),
            PhysicalType::Double => (Type::DOUBLE, None),
            PhysicalType::ByteArray => (Type::BYTE_ARRAY, None),
            PhysicalType::FixedLenByteArray(length) => {
                (Type::FIXED_LEN_BYTE_ARRAY, Some(length as i32))
            },
        }
    }
}

impl TryFrom<(Type, Option<i32>)> for PhysicalType {
    type Error = Error;

    fn try_from((type_, length): (Type, Option<i32>)) -> Result<Self> {
        Ok(match type_ {
            Type::BOOLEAN => PhysicalType::Boolean,
            Type::INT32 => PhysicalType::Int32,
            Type::INT64 => PhysicalType::Int64,
            Type::INT96 => PhysicalType::Int96,
            Type::FLOAT => PhysicalType::Float,
            Type::DOUBLE => PhysicalType::Double,
            Type::BYTE_ARRAY => PhysicalType::ByteArray,
            Type::FIXED_LEN_BYTE_ARRAY => {
                let length = length
                    .ok_or_else(|| Error::oos("fixed-length byte array requires a length"))?;
                PhysicalType::FixedLenByteArray(length as usize)
            },
            _ => return Err(Error::oos("the physical type is not supported")),
        })
    }
}

/// Common attributes of any field: its name, repetition and optional
/// caller-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct FieldInfo {
    /// The field name
    pub name: String,
    /// The repetition
    pub repetition: Repetition,
    /// The optional id, to select fields by id
    pub id: Option<i32>,
}

/// A primitive (leaf) field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PrimitiveType {
    /// The fields' generic information
    pub field_info: FieldInfo,
    /// The physical type
    pub physical_type: PhysicalType,
}

impl PrimitiveType {
    /// A required primitive field with the given name and physical type.
    pub fn from_physical(name: String, physical_type: PhysicalType) -> Self {
        let field_info = FieldInfo {
            name,
            repetition: Repetition::Required,
            id: None,
        };
        Self {
            field_info,
            physical_type,
        }
    }
}

/// A tree of fields: either a leaf or a group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ParquetType {
    PrimitiveType(PrimitiveType),
    GroupType {
        field_info: FieldInfo,
        fields: Vec<ParquetType>,
    },
}

impl ParquetType {
    /// The name of this field.
    pub fn name(&self) -> &str {
        &self.get_field_info().name
    }

    /// The generic information of this field.
    pub fn get_field_info(&self) -> &FieldInfo {
        match self {
            ParquetType::PrimitiveType(primitive) => &primitive.field_info,
            ParquetType::GroupType { field_info, .. } => field_info,
        }
    }

    /// A required leaf with the given name and physical type.
    pub fn from_physical(name: String, physical_type: PhysicalType) -> Self {
        ParquetType::PrimitiveType(PrimitiveType::from_physical(name, physical_type))
    }

    /// A group with the given name, repetition and fields.
    pub fn from_group(
        name: String,
        repetition: Repetition,
        fields: Vec<ParquetType>,
        id: Option<i32>,
    ) -> Self {
        ParquetType::GroupType {
            field_info: FieldInfo {
                name,
                repetition,
                id,
            },
            fields,
        }
    }
}
