//! Signal types and the interning type database.
//!
//! Every signal carries a [`TypeId`] into a [`TypeDb`]. Only [`Type::Bits`] is a
//! leaf type; structs and arrays describe composite signals that are expanded
//! into child signals when declared.

use crate::arena::Arena;
use crate::error::DesignError;
use crate::ids::TypeId;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use trellis_common::Ident;

/// The shape of a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// A fixed-width bit vector.
    Bits {
        /// The number of bits.
        width: u32,
    },
    /// A struct with named fields, laid out in declaration order.
    Struct {
        /// The struct type name.
        name: Ident,
        /// Named fields with their types.
        fields: Vec<(Ident, TypeId)>,
    },
    /// A fixed-size array of identically-typed elements.
    Array {
        /// The type of each element.
        element: TypeId,
        /// The number of elements.
        size: u32,
    },
}

/// Interned types for cheap comparison.
///
/// Each unique [`Type`] is stored once and referenced by [`TypeId`], so two
/// composite signals have the same shape exactly when their type IDs match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDb {
    types: Arena<TypeId, Type>,
}

impl TypeDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, reusing the ID of an identical one.
    ///
    /// Fails with `WidthOverflow` if the total width does not fit in a `u32`,
    /// so every interned type has a representable [`TypeDb::bit_width`].
    pub fn intern(&mut self, ty: Type) -> Result<TypeId, DesignError> {
        if let Some(id) = self.find(&ty) {
            return Ok(id);
        }
        if self.checked_width(&ty).is_none() {
            return Err(DesignError::WidthOverflow {
                ty: self.describe(&ty),
            });
        }
        Ok(self.types.alloc(ty))
    }

    /// Interns a `width`-bit leaf type.
    pub fn bits(&mut self, width: u32) -> TypeId {
        let ty = Type::Bits { width };
        let found = self.find(&ty);
        match found {
            Some(id) => id,
            None => self.types.alloc(ty),
        }
    }

    /// Returns the type, or `UnknownReference` if `id` was not interned here.
    pub fn lookup(&self, id: TypeId) -> Result<&Type, DesignError> {
        self.types.lookup(id)
    }

    /// Total bit width of a type, summed over struct fields and array elements.
    pub fn bit_width(&self, id: TypeId) -> u32 {
        // Interning rejected anything wider than `u32::MAX` bits.
        match &self.types[id] {
            Type::Bits { width } => *width,
            Type::Struct { fields, .. } => fields.iter().map(|(_, f)| self.bit_width(*f)).sum(),
            Type::Array { element, size } => self.bit_width(*element) * size,
        }
    }

    fn find(&self, ty: &Type) -> Option<TypeId> {
        self.types
            .iter()
            .find(|(_, existing)| *existing == ty)
            .map(|(id, _)| id)
    }

    fn checked_width(&self, ty: &Type) -> Option<u32> {
        match ty {
            Type::Bits { width } => Some(*width),
            Type::Struct { fields, .. } => fields
                .iter()
                .try_fold(0u32, |acc, (_, f)| acc.checked_add(self.bit_width(*f))),
            Type::Array { element, size } => self.bit_width(*element).checked_mul(*size),
        }
    }

    fn describe(&self, ty: &Type) -> String {
        match ty {
            Type::Bits { width } => format!("bits({width})"),
            Type::Struct { fields, .. } => format!("struct of {} fields", fields.len()),
            Type::Array { element, size } => {
                format!("array of {size} x {} bits", self.bit_width(*element))
            }
        }
    }

    /// Returns `true` if values of this type are plain bit vectors.
    pub fn is_leaf(&self, id: TypeId) -> bool {
        matches!(self.types[id], Type::Bits { .. })
    }

    /// Number of distinct types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Index<TypeId> for TypeDb {
    type Output = Type;

    fn index(&self, id: TypeId) -> &Type {
        &self.types[id]
    }
}
