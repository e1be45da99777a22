//! Errors raised while building a design.

/// A construction error reported by a [`Design`](crate::design::Design) method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    /// A slice is empty, reversed, out of range, or taken of a composite signal.
    #[error("invalid slice [{start}:{stop}] of `{signal}` (width {width})")]
    InvalidSlice {
        /// The signal being sliced.
        signal: String,
        /// Requested start bit.
        start: u32,
        /// Requested stop bit.
        stop: u32,
        /// Width of the sliced signal.
        width: u32,
    },

    /// An ID does not refer to an entity of this design.
    #[error("unknown {kind} id {index}")]
    UnknownReference {
        /// The kind of entity, such as `signal` or `block`.
        kind: &'static str,
        /// The raw ID.
        index: u32,
    },

    /// A struct or array type is wider than `u32::MAX` bits.
    #[error("type {ty} is wider than {} bits", u32::MAX)]
    WidthOverflow {
        /// The rejected type.
        ty: String,
    },

    /// A composite signal was used where a leaf is required.
    #[error("`{signal}` is a composite signal and cannot be accessed directly")]
    NonLeafAccess {
        /// The composite signal.
        signal: String,
    },

    /// Two connected endpoints have different widths.
    #[error("cannot connect `{lhs}` ({lhs_width} bits) to `{rhs}` ({rhs_width} bits)")]
    WidthMismatch {
        /// Left endpoint.
        lhs: String,
        /// Left width.
        lhs_width: u32,
        /// Right endpoint.
        rhs: String,
        /// Right width.
        rhs_width: u32,
    },

    /// Two connected composites or bundles have different shapes.
    #[error("cannot connect `{lhs}` to `{rhs}`: shapes differ")]
    ShapeMismatch {
        /// Left endpoint.
        lhs: String,
        /// Right endpoint.
        rhs: String,
    },

    /// A struct signal or interface has no field with this name.
    #[error("`{signal}` has no field `{field}`")]
    UnknownField {
        /// The struct signal or interface.
        signal: String,
        /// The requested field.
        field: String,
    },

    /// An array index is past the end.
    #[error("index {index} out of range for `{signal}` of size {size}")]
    IndexOutOfRange {
        /// The array signal.
        signal: String,
        /// The requested index.
        index: u32,
        /// The array size.
        size: u32,
    },

    /// A name is declared twice in one component.
    #[error("`{name}` is already declared in `{owner}`")]
    DuplicateName {
        /// The component path.
        owner: String,
        /// The duplicated name.
        name: String,
    },

    /// A reset value is attached to the wrong block or signal.
    #[error("invalid reset value for `{signal}` in block `{block}`: {reason}")]
    InvalidReset {
        /// The block.
        block: String,
        /// The reset target.
        signal: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A connection request cannot be expressed in the netlist.
    #[error("invalid connection: {reason}")]
    InvalidConnection {
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_slice() {
        let err = DesignError::InvalidSlice {
            signal: "top.x".to_string(),
            start: 4,
            stop: 9,
            width: 8,
        };
        assert_eq!(err.to_string(), "invalid slice [4:9] of `top.x` (width 8)");
    }

    #[test]
    fn display_unknown_reference() {
        let err = DesignError::UnknownReference {
            kind: "signal",
            index: 12,
        };
        assert_eq!(err.to_string(), "unknown signal id 12");
    }

    #[test]
    fn display_width_mismatch() {
        let err = DesignError::WidthMismatch {
            lhs: "top.a".to_string(),
            lhs_width: 8,
            rhs: "top.b".to_string(),
            rhs_width: 4,
        };
        assert_eq!(
            err.to_string(),
            "cannot connect `top.a` (8 bits) to `top.b` (4 bits)"
        );
    }

    #[test]
    fn display_duplicate_name() {
        let err = DesignError::DuplicateName {
            owner: "top.q".to_string(),
            name: "full".to_string(),
        };
        assert_eq!(err.to_string(), "`full` is already declared in `top.q`");
    }

    #[test]
    fn display_invalid_reset() {
        let err = DesignError::InvalidReset {
            block: "top.comb".to_string(),
            signal: "top.y".to_string(),
            reason: "block is combinational".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid reset value for `top.y` in block `top.comb`: block is combinational"
        );
    }

    #[test]
    fn display_shape_and_field_errors() {
        let err = DesignError::ShapeMismatch {
            lhs: "top.p".to_string(),
            rhs: "top.r".to_string(),
        };
        assert_eq!(err.to_string(), "cannot connect `top.p` to `top.r`: shapes differ");
        let err = DesignError::UnknownField {
            signal: "top.p".to_string(),
            field: "crc".to_string(),
        };
        assert_eq!(err.to_string(), "`top.p` has no field `crc`");
        let err = DesignError::IndexOutOfRange {
            signal: "top.mem".to_string(),
            index: 4,
            size: 4,
        };
        assert_eq!(err.to_string(), "index 4 out of range for `top.mem` of size 4");
    }
}
