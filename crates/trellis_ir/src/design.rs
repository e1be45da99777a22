//! The design builder.
//!
//! A [`Design`] collects the component hierarchy, signals, constants,
//! interfaces, method ports, connection requests, update blocks and ordering
//! constraints. It performs local validation (widths, shapes, names, IDs) as
//! each item is added. Global checks such as driver election and cycle
//! detection happen during elaboration.

use crate::arena::{Arena, ArenaId};
use crate::block::{BlockKind, BlockSpec, UpdateBlock};
use crate::component::{Component, Const};
use crate::constraint::{Constraint, ConstraintSide};
use crate::error::DesignError;
use crate::ids::{
    BlockId, ComponentId, ConstId, ConstraintId, InterfaceId, MethodId, SignalId, TypeId,
};
use crate::interface::{FieldDecl, Interface, MethodPort, MethodRole};
use crate::signal::{Direction, Signal, SignalShape};
use crate::types::{Type, TypeDb};
use std::collections::{HashMap, HashSet};
use trellis_common::{BitRange, Bits, Ident, Interner};

/// One end of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A signal.
    Signal(SignalId),
    /// A constant.
    Const(ConstId),
}

impl From<SignalId> for Endpoint {
    fn from(id: SignalId) -> Self {
        Endpoint::Signal(id)
    }
}

impl From<ConstId> for Endpoint {
    fn from(id: ConstId) -> Self {
        Endpoint::Const(id)
    }
}

/// A hierarchical design under construction.
#[derive(Debug)]
pub struct Design {
    interner: Interner,
    types: TypeDb,
    components: Arena<ComponentId, Component>,
    signals: Arena<SignalId, Signal>,
    consts: Arena<ConstId, Const>,
    interfaces: Arena<InterfaceId, Interface>,
    methods: Arena<MethodId, MethodPort>,
    blocks: Arena<BlockId, UpdateBlock>,
    constraints: Arena<ConstraintId, Constraint>,
    /// Leaf-level connection requests in the order they were made.
    connections: Vec<(Endpoint, Endpoint)>,
    slices: HashMap<(SignalId, BitRange), SignalId>,
    names: HashSet<(ComponentId, Ident)>,
    block_names: HashSet<(ComponentId, Ident)>,
    top: ComponentId,
}

impl Design {
    /// Creates a design whose top component is called `top_name`.
    ///
    /// The top component gets its 1-bit `reset` input like every other
    /// component; the test bench drives it.
    pub fn new(top_name: &str) -> Self {
        let mut design = Self {
            interner: Interner::new(),
            types: TypeDb::new(),
            components: Arena::new(),
            signals: Arena::new(),
            consts: Arena::new(),
            interfaces: Arena::new(),
            methods: Arena::new(),
            blocks: Arena::new(),
            constraints: Arena::new(),
            connections: Vec::new(),
            slices: HashMap::new(),
            names: HashSet::new(),
            block_names: HashSet::new(),
            top: ComponentId::from_raw(0),
        };
        design.top = design.alloc_component(top_name, None);
        design
    }

    // ---------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------

    /// Adds a sub-component whose `reset` is connected to the parent's.
    pub fn add_component(
        &mut self,
        parent: ComponentId,
        name: &str,
    ) -> Result<ComponentId, DesignError> {
        self.try_component(parent)?;
        self.claim_name(parent, name)?;
        let id = self.alloc_component(name, Some(parent));
        self.components[parent].children.push(id);
        let child_reset = self.components[id].reset;
        let parent_reset = self.components[parent].reset;
        self.connections
            .push((Endpoint::Signal(child_reset), Endpoint::Signal(parent_reset)));
        Ok(id)
    }

    fn alloc_component(&mut self, name: &str, parent: Option<ComponentId>) -> ComponentId {
        let id = self.components.next_id();
        let bit = self.types.bits(1);
        let reset_name = self.interner.get_or_intern("reset");
        let reset = self.signals.alloc(Signal {
            name: reset_name,
            owner: id,
            ty: bit,
            width: 1,
            direction: Direction::In,
            shape: SignalShape::Leaf,
            parent: None,
        });
        self.names.insert((id, reset_name));
        let name = self.interner.get_or_intern(name);
        self.components.alloc(Component {
            name,
            parent,
            children: Vec::new(),
            signals: vec![reset],
            reset,
        })
    }

    fn claim_name(&mut self, owner: ComponentId, name: &str) -> Result<Ident, DesignError> {
        let ident = self.interner.get_or_intern(name);
        if !self.names.insert((owner, ident)) {
            return Err(DesignError::DuplicateName {
                owner: self.component_path(owner),
                name: name.to_string(),
            });
        }
        Ok(ident)
    }

    // ---------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------

    /// Interns a `width`-bit leaf type.
    pub fn bits_type(&mut self, width: u32) -> TypeId {
        self.types.bits(width)
    }

    /// Interns a struct type with the given fields in declaration order.
    pub fn struct_type(
        &mut self,
        name: &str,
        fields: &[(&str, TypeId)],
    ) -> Result<TypeId, DesignError> {
        let mut seen = HashSet::new();
        let mut interned = Vec::with_capacity(fields.len());
        for (field, ty) in fields {
            self.try_type(*ty)?;
            if !seen.insert(*field) {
                return Err(DesignError::DuplicateName {
                    owner: name.to_string(),
                    name: field.to_string(),
                });
            }
            interned.push((self.interner.get_or_intern(field), *ty));
        }
        let ty = Type::Struct {
            name: self.interner.get_or_intern(name),
            fields: interned,
        };
        self.types.intern(ty).map_err(|err| match err {
            DesignError::WidthOverflow { .. } => DesignError::WidthOverflow {
                ty: format!("struct `{name}`"),
            },
            other => other,
        })
    }

    /// Interns a fixed-size array type.
    pub fn array_type(&mut self, element: TypeId, size: u32) -> Result<TypeId, DesignError> {
        self.try_type(element)?;
        self.types.intern(Type::Array { element, size })
    }

    // ---------------------------------------------------------------
    // Signals
    // ---------------------------------------------------------------

    /// Declares a signal, expanding composite types into child signals.
    pub fn add_signal(
        &mut self,
        owner: ComponentId,
        name: &str,
        ty: TypeId,
        direction: Direction,
    ) -> Result<SignalId, DesignError> {
        self.try_component(owner)?;
        self.try_type(ty)?;
        self.claim_name(owner, name)?;
        let id = self.expand(owner, name.to_string(), ty, direction, None);
        self.components[owner].signals.push(id);
        Ok(id)
    }

    /// Declares a `width`-bit input port.
    pub fn in_port(
        &mut self,
        owner: ComponentId,
        name: &str,
        width: u32,
    ) -> Result<SignalId, DesignError> {
        let ty = self.types.bits(width);
        self.add_signal(owner, name, ty, Direction::In)
    }

    /// Declares a `width`-bit output port.
    pub fn out_port(
        &mut self,
        owner: ComponentId,
        name: &str,
        width: u32,
    ) -> Result<SignalId, DesignError> {
        let ty = self.types.bits(width);
        self.add_signal(owner, name, ty, Direction::Out)
    }

    /// Declares a `width`-bit internal wire.
    pub fn wire(
        &mut self,
        owner: ComponentId,
        name: &str,
        width: u32,
    ) -> Result<SignalId, DesignError> {
        let ty = self.types.bits(width);
        self.add_signal(owner, name, ty, Direction::Wire)
    }

    /// Allocates a signal and, for composite types, its whole child tree.
    /// Parents are allocated before their children.
    fn expand(
        &mut self,
        owner: ComponentId,
        path: String,
        ty: TypeId,
        direction: Direction,
        parent: Option<SignalId>,
    ) -> SignalId {
        let width = self.types.bit_width(ty);
        let name = self.interner.get_or_intern(&path);
        let id = self.signals.alloc(Signal {
            name,
            owner,
            ty,
            width,
            direction,
            shape: SignalShape::Leaf,
            parent,
        });
        let shape = match self.types[ty].clone() {
            Type::Bits { .. } => return id,
            Type::Struct { fields, .. } => {
                let mut children = Vec::with_capacity(fields.len());
                for (field, field_ty) in fields {
                    let child_path = format!("{path}.{}", self.interner.resolve(field));
                    let child = self.expand(owner, child_path, field_ty, direction, Some(id));
                    children.push((field, child));
                }
                SignalShape::Struct { fields: children }
            }
            Type::Array { element, size } => SignalShape::Array {
                elements: (0..size)
                    .map(|i| self.expand(owner, format!("{path}[{i}]"), element, direction, Some(id)))
                    .collect(),
            },
        };
        self.signals[id].shape = shape;
        id
    }

    /// Returns the slice `[start, stop)` of a leaf signal.
    ///
    /// Slicing the same bits twice returns the same ID. A slice of a slice is
    /// a slice of the root with the offset applied.
    pub fn slice(&mut self, signal: SignalId, start: u32, stop: u32) -> Result<SignalId, DesignError> {
        let sig = self.try_signal(signal)?;
        let range = BitRange::new(start, stop);
        let root_range = sig.root_range(signal);
        let (root, base) = match root_range {
            Some(r) if range.fits(sig.width) => r,
            _ => {
                return Err(DesignError::InvalidSlice {
                    signal: self.full_name(signal),
                    start,
                    stop,
                    width: sig.width,
                })
            }
        };
        let absolute = range.offset(base.start);
        if let Some(&existing) = self.slices.get(&(root, absolute)) {
            return Ok(existing);
        }
        let root_sig = &self.signals[root];
        let (owner, direction) = (root_sig.owner, root_sig.direction);
        let path = format!(
            "{}[{}:{}]",
            self.interner.resolve(root_sig.name),
            absolute.start,
            absolute.stop
        );
        let name = self.interner.get_or_intern(&path);
        let ty = self.types.bits(absolute.width());
        let id = self.signals.alloc(Signal {
            name,
            owner,
            ty,
            width: absolute.width(),
            direction,
            shape: SignalShape::Slice {
                root,
                range: absolute,
            },
            parent: None,
        });
        self.slices.insert((root, absolute), id);
        Ok(id)
    }

    /// Returns the leaf signals of a (possibly composite) signal in declared order.
    pub fn leaves(&self, signal: SignalId) -> Result<Vec<SignalId>, DesignError> {
        self.try_signal(signal)?;
        let mut out = Vec::new();
        self.collect_leaves(signal, &mut out);
        Ok(out)
    }

    fn collect_leaves(&self, signal: SignalId, out: &mut Vec<SignalId>) {
        match &self.signals[signal].shape {
            SignalShape::Leaf | SignalShape::Slice { .. } => out.push(signal),
            SignalShape::Struct { fields } => {
                for (_, child) in fields {
                    self.collect_leaves(*child, out);
                }
            }
            SignalShape::Array { elements } => {
                for child in elements {
                    self.collect_leaves(*child, out);
                }
            }
        }
    }

    /// Returns the child signal for a struct field.
    pub fn field(&self, signal: SignalId, name: &str) -> Result<SignalId, DesignError> {
        let sig = self.try_signal(signal)?;
        let found = match (&sig.shape, self.interner.get(name)) {
            (SignalShape::Struct { fields }, Some(ident)) => {
                fields.iter().find(|(f, _)| *f == ident).map(|(_, s)| *s)
            }
            _ => None,
        };
        found.ok_or_else(|| DesignError::UnknownField {
            signal: self.full_name(signal),
            field: name.to_string(),
        })
    }

    /// Returns the child signal for an array element.
    pub fn element(&self, signal: SignalId, index: u32) -> Result<SignalId, DesignError> {
        let sig = self.try_signal(signal)?;
        match &sig.shape {
            SignalShape::Array { elements } => {
                elements
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| DesignError::IndexOutOfRange {
                        signal: self.full_name(signal),
                        index,
                        size: elements.len() as u32,
                    })
            }
            _ => Err(DesignError::UnknownField {
                signal: self.full_name(signal),
                field: format!("[{index}]"),
            }),
        }
    }

    // ---------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------

    /// Binds a constant value into the connection graph.
    pub fn add_const(&mut self, owner: ComponentId, value: Bits) -> Result<ConstId, DesignError> {
        self.try_component(owner)?;
        Ok(self.consts.alloc(Const { owner, value }))
    }

    /// Requests that two endpoints carry the same value.
    ///
    /// Composite signals connect leaf-by-leaf and must have the same type.
    /// Leaf widths must match. Connecting two constants is rejected.
    pub fn connect(
        &mut self,
        a: impl Into<Endpoint>,
        b: impl Into<Endpoint>,
    ) -> Result<(), DesignError> {
        match (a.into(), b.into()) {
            (Endpoint::Const(x), Endpoint::Const(y)) => {
                self.try_const(x)?;
                self.try_const(y)?;
                Err(DesignError::InvalidConnection {
                    reason: format!(
                        "cannot connect {} to {}",
                        self.const_name(x),
                        self.const_name(y)
                    ),
                })
            }
            (Endpoint::Signal(s), Endpoint::Const(c)) | (Endpoint::Const(c), Endpoint::Signal(s)) => {
                self.connect_const(s, c)
            }
            (Endpoint::Signal(x), Endpoint::Signal(y)) => self.connect_signals(x, y),
        }
    }

    fn connect_const(&mut self, signal: SignalId, constant: ConstId) -> Result<(), DesignError> {
        let sig = self.try_signal(signal)?;
        let width = self.try_const(constant)?.value.width();
        if !sig.is_leaf() {
            return Err(DesignError::ShapeMismatch {
                lhs: self.full_name(signal),
                rhs: self.const_name(constant),
            });
        }
        if sig.width != width {
            return Err(DesignError::WidthMismatch {
                lhs: self.full_name(signal),
                lhs_width: sig.width,
                rhs: self.const_name(constant),
                rhs_width: width,
            });
        }
        self.connections
            .push((Endpoint::Signal(signal), Endpoint::Const(constant)));
        Ok(())
    }

    fn connect_signals(&mut self, x: SignalId, y: SignalId) -> Result<(), DesignError> {
        let sx = self.try_signal(x)?;
        let sy = self.try_signal(y)?;
        match (sx.is_leaf(), sy.is_leaf()) {
            (true, true) => {
                if sx.width != sy.width {
                    return Err(DesignError::WidthMismatch {
                        lhs: self.full_name(x),
                        lhs_width: sx.width,
                        rhs: self.full_name(y),
                        rhs_width: sy.width,
                    });
                }
                self.connections.push((Endpoint::Signal(x), Endpoint::Signal(y)));
                Ok(())
            }
            (false, false) if sx.ty == sy.ty => {
                let pairs: Vec<_> = self.leaves(x)?.into_iter().zip(self.leaves(y)?).collect();
                for (lx, ly) in pairs {
                    self.connections
                        .push((Endpoint::Signal(lx), Endpoint::Signal(ly)));
                }
                Ok(())
            }
            _ => Err(DesignError::ShapeMismatch {
                lhs: self.full_name(x),
                rhs: self.full_name(y),
            }),
        }
    }

    // ---------------------------------------------------------------
    // Interfaces and method ports
    // ---------------------------------------------------------------

    /// Declares an interface: one signal per field, named `<name>.<field>`.
    pub fn add_interface(
        &mut self,
        owner: ComponentId,
        name: &str,
        fields: &[FieldDecl],
    ) -> Result<InterfaceId, DesignError> {
        self.try_component(owner)?;
        let mut seen = HashSet::new();
        for field in fields {
            self.try_type(field.ty)?;
            if !seen.insert(field.name.as_str()) {
                return Err(DesignError::DuplicateName {
                    owner: format!("{}.{name}", self.component_path(owner)),
                    name: field.name.clone(),
                });
            }
        }
        let ifc_name = self.claim_name(owner, name)?;
        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let sig = self.expand(
                owner,
                format!("{name}.{}", field.name),
                field.ty,
                field.direction,
                None,
            );
            self.components[owner].signals.push(sig);
            members.push((self.interner.get_or_intern(&field.name), sig));
        }
        Ok(self.interfaces.alloc(Interface {
            name: ifc_name,
            owner,
            fields: members,
        }))
    }

    /// Returns the signal carrying an interface field.
    pub fn interface_field(&self, ifc: InterfaceId, field: &str) -> Result<SignalId, DesignError> {
        let interface = self.try_interface(ifc)?;
        self.interner
            .get(field)
            .and_then(|f| interface.field(f))
            .ok_or_else(|| DesignError::UnknownField {
                signal: self.interface_name(ifc),
                field: field.to_string(),
            })
    }

    /// Connects two interfaces field-by-field by name.
    pub fn connect_interfaces(&mut self, a: InterfaceId, b: InterfaceId) -> Result<(), DesignError> {
        let ia = self.try_interface(a)?;
        let ib = self.try_interface(b)?;
        let mismatch = || DesignError::ShapeMismatch {
            lhs: self.interface_name(a),
            rhs: self.interface_name(b),
        };
        if ia.fields.len() != ib.fields.len() {
            return Err(mismatch());
        }
        let mut pairs = Vec::with_capacity(ia.fields.len());
        for (name, sa) in &ia.fields {
            let sb = ib.field(*name).ok_or_else(mismatch)?;
            pairs.push((*sa, sb));
        }
        for (sa, sb) in pairs {
            self.connect_signals(sa, sb)?;
        }
        Ok(())
    }

    /// Declares a method port with `en`, `rdy`, and optional `msg` and `ret`.
    pub fn add_method(
        &mut self,
        owner: ComponentId,
        name: &str,
        role: MethodRole,
        arg: Option<TypeId>,
        ret: Option<TypeId>,
    ) -> Result<MethodId, DesignError> {
        self.try_component(owner)?;
        for ty in arg.iter().chain(ret.iter()) {
            self.try_type(*ty)?;
        }
        let method_name = self.claim_name(owner, name)?;
        let request = role.request_direction();
        let response = request.flip();
        let bit = self.types.bits(1);
        let en = self.expand(owner, format!("{name}.en"), bit, request, None);
        let rdy = self.expand(owner, format!("{name}.rdy"), bit, response, None);
        let msg = arg.map(|ty| self.expand(owner, format!("{name}.msg"), ty, request, None));
        let ret = ret.map(|ty| self.expand(owner, format!("{name}.ret"), ty, response, None));
        let signals = &mut self.components[owner].signals;
        signals.extend([en, rdy]);
        signals.extend(msg);
        signals.extend(ret);
        Ok(self.methods.alloc(MethodPort {
            name: method_name,
            owner,
            role,
            en,
            rdy,
            msg,
            ret,
        }))
    }

    /// Connects two method ports signal-by-signal.
    pub fn connect_methods(&mut self, a: MethodId, b: MethodId) -> Result<(), DesignError> {
        let ma = *self.try_method(a)?;
        let mb = *self.try_method(b)?;
        if ma.msg.is_some() != mb.msg.is_some() || ma.ret.is_some() != mb.ret.is_some() {
            return Err(DesignError::ShapeMismatch {
                lhs: self.method_name(a),
                rhs: self.method_name(b),
            });
        }
        self.connect_signals(ma.en, mb.en)?;
        self.connect_signals(ma.rdy, mb.rdy)?;
        if let (Some(x), Some(y)) = (ma.msg, mb.msg) {
            self.connect_signals(x, y)?;
        }
        if let (Some(x), Some(y)) = (ma.ret, mb.ret) {
            self.connect_signals(x, y)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Update blocks and constraints
    // ---------------------------------------------------------------

    /// Registers an update block.
    ///
    /// Calling a method port adds its `en` and `msg` to the write set and its
    /// `rdy` and `ret` to the read set.
    pub fn register(&mut self, spec: BlockSpec) -> Result<BlockId, DesignError> {
        let BlockSpec {
            owner,
            name,
            kind,
            mut reads,
            mut writes,
            calls,
            reset_values,
            logic,
        } = spec;
        self.try_component(owner)?;
        for method in &calls {
            let port = *self.try_method(*method)?;
            writes.push(port.en);
            writes.extend(port.msg);
            reads.push(port.rdy);
            reads.extend(port.ret);
        }
        for &signal in reads.iter().chain(&writes) {
            if !self.try_signal(signal)?.is_leaf() {
                return Err(DesignError::NonLeafAccess {
                    signal: self.full_name(signal),
                });
            }
        }
        dedup_in_order(&mut reads);
        dedup_in_order(&mut writes);

        let block_path = format!("{}.{name}", self.component_path(owner));
        for (signal, value) in &reset_values {
            let reason = if kind != BlockKind::Sequential {
                Some("block is combinational".to_string())
            } else if !writes.contains(signal) {
                Some("signal is not a write target of the block".to_string())
            } else if self.signals[*signal].width != value.width() {
                Some(format!(
                    "expected {} bits, got {}",
                    self.signals[*signal].width,
                    value.width()
                ))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(DesignError::InvalidReset {
                    block: block_path,
                    signal: self.full_name(*signal),
                    reason,
                });
            }
        }

        let ident = self.interner.get_or_intern(&name);
        if !self.block_names.insert((owner, ident)) {
            return Err(DesignError::DuplicateName {
                owner: self.component_path(owner),
                name,
            });
        }
        Ok(self.blocks.alloc(UpdateBlock {
            owner,
            name: ident,
            kind,
            reads,
            writes,
            calls,
            reset_values,
            logic,
        }))
    }

    /// Records an ordering constraint `lhs < rhs`.
    pub fn add_constraint(
        &mut self,
        lhs: ConstraintSide,
        rhs: ConstraintSide,
    ) -> Result<ConstraintId, DesignError> {
        self.check_side(lhs)?;
        self.check_side(rhs)?;
        Ok(self.constraints.alloc(Constraint { lhs, rhs }))
    }

    fn check_side(&self, side: ConstraintSide) -> Result<(), DesignError> {
        match side {
            ConstraintSide::Block(b) => self.try_block(b).map(|_| ()),
            ConstraintSide::Read(s) | ConstraintSide::Write(s) => {
                if self.try_signal(s)?.is_leaf() {
                    Ok(())
                } else {
                    Err(DesignError::NonLeafAccess {
                        signal: self.full_name(s),
                    })
                }
            }
            ConstraintSide::Call(m) => self.try_method(m).map(|_| ()),
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Returns the top component.
    pub fn top(&self) -> ComponentId {
        self.top
    }

    /// Returns a component.
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id]
    }

    /// Returns a signal.
    pub fn signal(&self, id: SignalId) -> &Signal {
        &self.signals[id]
    }

    /// Iterates over every signal, including slices and composite parents.
    pub fn signals(&self) -> impl Iterator<Item = (SignalId, &Signal)> {
        self.signals.iter()
    }

    /// Returns the number of signals.
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Returns a constant.
    pub fn constant(&self, id: ConstId) -> &Const {
        &self.consts[id]
    }

    /// Iterates over constants in declaration order.
    pub fn consts(&self) -> impl Iterator<Item = (ConstId, &Const)> {
        self.consts.iter()
    }

    /// Returns the number of constants.
    pub fn const_count(&self) -> usize {
        self.consts.len()
    }

    /// Returns an interface.
    pub fn interface(&self, id: InterfaceId) -> &Interface {
        &self.interfaces[id]
    }

    /// Returns a method port.
    pub fn method(&self, id: MethodId) -> &MethodPort {
        &self.methods[id]
    }

    /// Returns an update block.
    pub fn block(&self, id: BlockId) -> &UpdateBlock {
        &self.blocks[id]
    }

    /// Iterates over update blocks in registration order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &UpdateBlock)> {
        self.blocks.iter()
    }

    /// Iterates over constraints in declaration order.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints.iter()
    }

    /// Returns every leaf-level connection request in the order made.
    pub fn connections(&self) -> &[(Endpoint, Endpoint)] {
        &self.connections
    }

    /// Returns `true` if the signal is, or lies inside, a port of the top component.
    pub fn is_top_port(&self, id: SignalId) -> bool {
        self.signals
            .lookup(id)
            .is_ok_and(|s| s.owner == self.top && s.direction.is_port())
    }

    /// Resolves a hierarchical name such as `top.q.enq.msg`.
    pub fn find_signal(&self, full_name: &str) -> Option<SignalId> {
        self.signals.ids().find(|id| self.full_name(*id) == full_name)
    }

    // ---------------------------------------------------------------
    // Names
    // ---------------------------------------------------------------

    /// Returns the dotted instance path of a component, such as `top.q`.
    pub fn component_path(&self, id: ComponentId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current.and_then(|c| self.components.lookup(c).ok()) {
            parts.push(c.name);
            current = c.parent;
        }
        self.interner.dotted(parts.into_iter().rev())
    }

    /// Returns the hierarchical name of a signal.
    pub fn full_name(&self, id: SignalId) -> String {
        self.qualified(id, self.signals.lookup(id).map(|s| (s.owner, s.name)))
    }

    /// Returns the hierarchical name of a block, such as `top.q.ff`.
    pub fn block_name(&self, id: BlockId) -> String {
        self.qualified(id, self.blocks.lookup(id).map(|b| (b.owner, b.name)))
    }

    /// Returns the hierarchical name of a method port, such as `top.q.enq`.
    pub fn method_name(&self, id: MethodId) -> String {
        self.qualified(id, self.methods.lookup(id).map(|m| (m.owner, m.name)))
    }

    /// Returns the hierarchical name of an interface.
    pub fn interface_name(&self, id: InterfaceId) -> String {
        self.qualified(id, self.interfaces.lookup(id).map(|i| (i.owner, i.name)))
    }

    fn qualified<I: ArenaId>(
        &self,
        id: I,
        found: Result<(ComponentId, Ident), DesignError>,
    ) -> String {
        match found {
            Ok((owner, name)) => format!(
                "{}.{}",
                self.component_path(owner),
                self.interner.resolve(name)
            ),
            Err(_) => format!("<{} {}>", I::KIND, id.as_raw()),
        }
    }

    /// Describes a constant for diagnostics.
    pub fn const_name(&self, id: ConstId) -> String {
        match self.consts.lookup(id) {
            Ok(c) => format!("const {:?} in {}", c.value, self.component_path(c.owner)),
            Err(_) => format!("<const {}>", id.as_raw()),
        }
    }

    // ---------------------------------------------------------------
    // Checked lookups
    // ---------------------------------------------------------------

    /// Returns a signal, or `UnknownReference` for an ID from another design.
    pub fn try_signal(&self, id: SignalId) -> Result<&Signal, DesignError> {
        self.signals.lookup(id)
    }

    fn try_component(&self, id: ComponentId) -> Result<&Component, DesignError> {
        self.components.lookup(id)
    }

    fn try_const(&self, id: ConstId) -> Result<&Const, DesignError> {
        self.consts.lookup(id)
    }

    fn try_interface(&self, id: InterfaceId) -> Result<&Interface, DesignError> {
        self.interfaces.lookup(id)
    }

    fn try_method(&self, id: MethodId) -> Result<&MethodPort, DesignError> {
        self.methods.lookup(id)
    }

    fn try_block(&self, id: BlockId) -> Result<&UpdateBlock, DesignError> {
        self.blocks.lookup(id)
    }

    fn try_type(&self, id: TypeId) -> Result<&Type, DesignError> {
        self.types.lookup(id)
    }
}

fn dedup_in_order(signals: &mut Vec<SignalId>) {
    let mut seen = HashSet::new();
    signals.retain(|s| seen.insert(*s));
}
