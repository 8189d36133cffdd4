//! Native value types encoded with the `PLAIN` encoding.
use crate::schema::types::PhysicalType;

/// A physical native type of the format: a fixed-width value stored
/// little-endian.
pub trait NativeType: std::fmt::Debug + Send + Sync + 'static + Copy + Clone {
    /// The little-endian byte representation of this type.
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8], Error = std::array::TryFromSliceError>;

    /// The value as little-endian bytes.
    fn to_le_bytes(&self) -> Self::Bytes;

    /// The physical type of this native type.
    const TYPE: PhysicalType;
}

macro_rules! native {
    ($type:ty, $physical_type:expr) => {
        impl NativeType for $type {
            type Bytes = [u8; std::mem::size_of::<Self>()];

            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            const TYPE: PhysicalType = $physical_type;
        }
    };
}

native!(i32, PhysicalType::Int32);
native!(i64, PhysicalType::Int64);
native!(f32, PhysicalType::Float);
native!(f64, PhysicalType::Double);
