//! The tagged union of values a property can carry.

/// Discriminant for [`PropertyValue`], used to validate schema conformance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// A scalar `f64`.
    Double,
    /// A scalar `i64`.
    Int,
    /// A boolean flag.
    Bool,
    /// A 3-vector (position/orientation `at`/`up`).
    Double3,
    /// A 6-vector (orientation `at` + `up` packed together).
    Double6,
    /// A filter design descriptor.
    BiquadConfig,
}

/// A property value as carried across the property queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// See [`PropertyKind::Double`].
    Double(f64),
    /// See [`PropertyKind::Int`].
    Int(i64),
    /// See [`PropertyKind::Bool`].
    Bool(bool),
    /// See [`PropertyKind::Double3`].
    Double3([f64; 3]),
    /// See [`PropertyKind::Double6`].
    Double6([f64; 6]),
    /// See [`PropertyKind::BiquadConfig`].
    BiquadConfig(synthizer_dsp::FilterDesign),
}

impl PropertyValue {
    /// The discriminant of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Double(_) => PropertyKind::Double,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Double3(_) => PropertyKind::Double3,
            PropertyValue::Double6(_) => PropertyKind::Double6,
            PropertyValue::BiquadConfig(_) => PropertyKind::BiquadConfig,
        }
    }

    /// Extracts the `f64` payload, if this value is [`PropertyValue::Double`].
    pub fn as_double(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Extracts the `i64` payload, if this value is [`PropertyValue::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Extracts the `[f64; 3]` payload, if this value is [`PropertyValue::Double3`].
    pub fn as_double3(&self) -> Option<[f64; 3]> {
        match self {
            PropertyValue::Double3(v) => Some(*v),
            _ => None,
        }
    }
}
