//! Winding-independent face keys and the orientation resolver.
//!
//! A triangle is stored under a [`FaceKey`] (its three vertices in ascending
//! order) together with an [`Orientation`] that records which of the two
//! possible windings the face has. Every cyclic rotation of a triangle maps to
//! the same key and the same orientation; a reflection maps to the same key
//! and the opposite orientation.
//!
//! # Convention
//!
//! For a key `(a, b, c)` with `a < b < c`:
//!
//! | Orientation | Emitted winding |
//! |-------------|-----------------|
//! | `Negative`  | `(a, b, c)`     |
//! | `Positive`  | `(c, b, a)`     |
//!
//! [`canonicalize`] is the exact inverse of [`FaceKey::oriented`].

use super::index::VertexId;

/// Winding classification of a triangle relative to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Orientation {
    /// Winding follows ascending vertex order.
    Negative,
    /// Not yet determined. Invalid for export.
    #[default]
    Undefined,
    /// Winding follows descending vertex order.
    Positive,
}

impl Orientation {
    /// The numeric sign: -1, 0 or +1.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Orientation::Negative => -1,
            Orientation::Undefined => 0,
            Orientation::Positive => 1,
        }
    }

    /// Parse a numeric sign.
    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            -1 => Some(Orientation::Negative),
            0 => Some(Orientation::Undefined),
            1 => Some(Orientation::Positive),
            _ => None,
        }
    }

    /// Whether the orientation has been resolved.
    #[inline]
    pub fn is_defined(self) -> bool {
        self != Orientation::Undefined
    }

    /// The opposite winding. `Undefined` stays undefined.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Negative => Orientation::Positive,
            Orientation::Undefined => Orientation::Undefined,
            Orientation::Positive => Orientation::Negative,
        }
    }
}

/// An unordered triangle: three distinct vertices in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceKey([VertexId; 3]);

impl FaceKey {
    /// Build a key from three vertices in any order.
    ///
    /// Returns `None` if any vertex is repeated.
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Option<Self> {
        let mut sorted = [a, b, c];
        sorted.sort_unstable();
        if sorted[0] == sorted[1] || sorted[1] == sorted[2] {
            return None;
        }
        Some(Self(sorted))
    }

    /// The vertices in ascending order.
    #[inline]
    pub fn vertices(&self) -> [VertexId; 3] {
        self.0
    }

    /// Whether the key contains a vertex.
    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        self.0.contains(&v)
    }

    /// The three undirected edges, each with the smaller vertex first.
    pub fn edges(&self) -> [(VertexId, VertexId); 3] {
        let [a, b, c] = self.0;
        [(a, b), (b, c), (a, c)]
    }

    /// The winding emitted for a given orientation.
    ///
    /// Returns `None` for [`Orientation::Undefined`].
    pub fn oriented(&self, orientation: Orientation) -> Option<[VertexId; 3]> {
        let [a, b, c] = self.0;
        match orientation {
            Orientation::Negative => Some([a, b, c]),
            Orientation::Positive => Some([c, b, a]),
            Orientation::Undefined => None,
        }
    }
}

/// Compute the key and orientation of a wound triangle.
///
/// The triple is rotated so that its largest vertex is last; the orientation
/// is `Negative` when the first remaining entry is smaller than the second and
/// `Positive` otherwise. Any cyclic rotation of the input gives the same
/// result.
///
/// Returns `None` for a degenerate triangle.
///
/// # Example
///
/// ```
/// use surfbridge::mesh::{canonicalize, Orientation, VertexId};
///
/// let tri = [VertexId::new(4), VertexId::new(2), VertexId::new(9)];
/// let (key, orientation) = canonicalize(tri).unwrap();
/// assert_eq!(orientation, Orientation::Positive);
/// assert_eq!(key.oriented(orientation).unwrap(), [VertexId::new(9), VertexId::new(4), VertexId::new(2)]);
/// ```
pub fn canonicalize(tri: [VertexId; 3]) -> Option<(FaceKey, Orientation)> {
    let key = FaceKey::new(tri[0], tri[1], tri[2])?;

    let max_idx = (0..3).max_by_key(|&i| tri[i]).unwrap_or(2);
    let rotated = [tri[(max_idx + 1) % 3], tri[(max_idx + 2) % 3], tri[max_idx]];

    let orientation = if rotated[0] < rotated[1] {
        Orientation::Negative
    } else {
        Orientation::Positive
    };

    Some((key, orientation))
}

/// Whether a wound triangle traverses the directed edge `from -> to`.
#[inline]
pub fn has_directed_edge(tri: &[VertexId; 3], from: VertexId, to: VertexId) -> bool {
    (0..3).any(|i| tri[i] == from && tri[(i + 1) % 3] == to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: usize, b: usize, c: usize) -> [VertexId; 3] {
        [VertexId::new(a), VertexId::new(b), VertexId::new(c)]
    }

    #[test]
    fn test_rotations_agree() {
        let a = canonicalize(tri(3, 8, 5)).unwrap();
        let b = canonicalize(tri(8, 5, 3)).unwrap();
        let c = canonicalize(tri(5, 3, 8)).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_reflection_flips_orientation() {
        let (k1, o1) = canonicalize(tri(0, 1, 2)).unwrap();
        let (k2, o2) = canonicalize(tri(2, 1, 0)).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(o1, Orientation::Negative);
        assert_eq!(o2, Orientation::Positive);
        assert_eq!(o1.flipped(), o2);
    }

    #[test]
    fn test_oriented_inverts_canonicalize() {
        for input in [tri(0, 1, 2), tri(2, 1, 0), tri(7, 3, 5), tri(5, 3, 7)] {
            let (key, orientation) = canonicalize(input).unwrap();
            let out = key.oriented(orientation).unwrap();
            // Emitted winding is a cyclic rotation of the input.
            let rotations = [
                [input[0], input[1], input[2]],
                [input[1], input[2], input[0]],
                [input[2], input[0], input[1]],
            ];
            assert!(rotations.contains(&out), "{:?} not a rotation of {:?}", out, input);
        }
    }

    #[test]
    fn test_degenerate_rejected() {
        assert!(canonicalize(tri(1, 1, 2)).is_none());
        assert!(canonicalize(tri(4, 2, 4)).is_none());
    }

    #[test]
    fn test_undefined_has_no_winding() {
        let key = FaceKey::new(VertexId::new(0), VertexId::new(1), VertexId::new(2)).unwrap();
        assert!(key.oriented(Orientation::Undefined).is_none());
        assert_eq!(Orientation::from_sign(0), Some(Orientation::Undefined));
        assert_eq!(Orientation::from_sign(2), None);
        assert_eq!(Orientation::Positive.sign(), 1);
    }

    #[test]
    fn test_directed_edge() {
        let t = tri(0, 1, 2);
        assert!(has_directed_edge(&t, VertexId::new(2), VertexId::new(0)));
        assert!(!has_directed_edge(&t, VertexId::new(0), VertexId::new(2)));
    }
}
