//! Index types for surface mesh elements.
//!
//! Vertices and faces are identified by type-safe `u32` wrappers so that a
//! vertex index can never be passed where a face index is expected.

use std::fmt::{self, Debug};

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe face index (position of a face in key order).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Create an index, or `None` if the value does not fit in 32 bits.
            #[inline]
            pub fn try_new(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }

            /// Get the index as `usize`.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw stored value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(FaceId, "F");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(v.raw(), 42);
    }

    #[test]
    fn test_try_new_range() {
        assert_eq!(VertexId::try_new(7), Some(VertexId::new(7)));
        assert_eq!(VertexId::try_new(u32::MAX as usize).map(VertexId::raw), Some(u32::MAX));
        assert_eq!(VertexId::try_new(u32::MAX as usize + 1), None);
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        assert!(VertexId::new(3) < VertexId::new(7));
        let mut ids = vec![VertexId::new(9), VertexId::new(1), VertexId::new(4)];
        ids.sort();
        assert_eq!(ids, vec![VertexId::new(1), VertexId::new(4), VertexId::new(9)]);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(42)), "V(42)");
        assert_eq!(format!("{:?}", FaceId::from(7)), "F(7)");
    }
}
