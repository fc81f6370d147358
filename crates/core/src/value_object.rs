//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two with the
/// same attribute values are the same value. A discount percentage or a set
/// of order totals is a value object; a cart line (which keeps its id across
/// quantity changes) is an entity.
///
/// To "modify" a value object, construct a new one. The bounds keep value
/// objects cheap to pass around and easy to assert on in tests.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
