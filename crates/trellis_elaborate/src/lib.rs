//! Elaboration of a registered design into an executable plan.
//!
//! Elaboration resolves nets into storage cells, checks that every read bit
//! has exactly one driver, and builds the static schedule. The resulting
//! [`Elaboration`] is immutable and can be shared between simulation kernels.
//!
//! # Usage
//!
//! ```ignore
//! let elab = trellis_elaborate::elaborate(&design, &config.elaborate)?;
//! println!("{}", elab.fingerprint());
//! ```

#![warn(missing_docs)]

pub mod errors;
pub mod nets;
pub mod schedule;

pub use errors::ElabError;
pub use nets::{Cell, Location, Net, NetSource, Netlist};
pub use schedule::{Schedule, Step};

use std::collections::{HashMap, HashSet};
use std::fmt;
use trellis_common::{Bits, ContentHash};
use trellis_config::ElaborateConfig;
use trellis_ir::{BlockFn, BlockId, BlockKind, Design, Direction, SignalId};

/// How the test bench may access a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// Not reachable from the boundary.
    Internal,
    /// A top-level input, or a slice of one.
    Input,
    /// A top-level output, or a slice of one.
    Output,
}

/// Flattened per-signal information.
#[derive(Debug, Clone)]
pub struct SignalInfo {
    /// Hierarchical name.
    pub name: String,
    /// Width in bits.
    pub width: u32,
    /// Storage location, `None` for composites.
    pub location: Option<Location>,
    /// Boundary role.
    pub port: PortKind,
    /// `true` for a slice, which aliases bits of its root signal.
    pub slice: bool,
}

/// An update block prepared for execution.
#[derive(Clone)]
pub struct BlockPlan {
    /// Hierarchical name.
    pub name: String,
    /// Combinational or sequential.
    pub kind: BlockKind,
    /// Declared read set, including method `rdy`/`ret`.
    pub reads: HashSet<SignalId>,
    /// Declared write set, including method `en`/`msg`.
    pub writes: HashSet<SignalId>,
    /// Values published in place of running the block while reset is high.
    /// Covers every write target of a sequential block.
    pub reset_writes: Vec<(SignalId, Bits)>,
    /// The block's logic.
    pub logic: BlockFn,
}

impl fmt::Debug for BlockPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPlan")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("reads", &self.reads.len())
            .field("writes", &self.writes.len())
            .finish_non_exhaustive()
    }
}

/// The immutable result of elaborating a design.
#[derive(Debug, Clone)]
pub struct Elaboration {
    /// Resolved nets and storage cells.
    pub netlist: Netlist,
    /// Static evaluation order.
    pub schedule: Schedule,
    /// Blocks indexed by [`BlockId`].
    pub blocks: Vec<BlockPlan>,
    /// Signals indexed by [`SignalId`].
    pub signals: Vec<SignalInfo>,
    /// The top component's reset input.
    pub reset: SignalId,
    names: HashMap<String, SignalId>,
}

impl Elaboration {
    /// Looks up a signal by hierarchical name, such as `top.q.deq.ret`.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.names.get(name).copied()
    }

    /// Returns a signal's information, if the ID is known.
    pub fn signal(&self, id: SignalId) -> Option<&SignalInfo> {
        self.signals.get(id.index())
    }

    /// Returns a block plan, if the ID is known.
    pub fn block(&self, id: BlockId) -> Option<&BlockPlan> {
        self.blocks.get(id.index())
    }

    /// Returns the schedule fingerprint.
    pub fn fingerprint(&self) -> ContentHash {
        self.schedule.fingerprint()
    }
}

/// Elaborates a design.
///
/// Resolves nets, checks drivers, and computes the schedule. The design is
/// not modified; elaborating the same design twice yields the same
/// fingerprint.
pub fn elaborate(design: &Design, config: &ElaborateConfig) -> Result<Elaboration, ElabError> {
    let netlist = nets::resolve(design, config)?;
    let schedule = schedule::build(design, &netlist)?;

    let mut signals = Vec::with_capacity(design.signal_count());
    let mut names = HashMap::with_capacity(design.signal_count());
    for (id, sig) in design.signals() {
        let name = design.full_name(id);
        let port = match sig.direction {
            Direction::In if design.is_top_port(id) => PortKind::Input,
            Direction::Out if design.is_top_port(id) => PortKind::Output,
            _ => PortKind::Internal,
        };
        names.insert(name.clone(), id);
        signals.push(SignalInfo {
            name,
            width: sig.width,
            location: netlist.location(id),
            port,
            slice: sig.is_slice(),
        });
    }

    let blocks = design
        .blocks()
        .map(|(id, block)| {
            let reset_writes = match block.kind {
                BlockKind::Combinational => Vec::new(),
                BlockKind::Sequential => block
                    .writes
                    .iter()
                    .map(|&w| {
                        let value = block
                            .reset_values
                            .iter()
                            .find(|(s, _)| *s == w)
                            .map(|(_, v)| v.clone())
                            .unwrap_or_else(|| Bits::new(design.signal(w).width));
                        (w, value)
                    })
                    .collect(),
            };
            BlockPlan {
                name: design.block_name(id),
                kind: block.kind,
                reads: block.reads.iter().copied().collect(),
                writes: block.writes.iter().copied().collect(),
                reset_writes,
                logic: block.logic.clone(),
            }
        })
        .collect();

    let elab = Elaboration {
        netlist,
        schedule,
        blocks,
        signals,
        reset: design.component(design.top()).reset,
        names,
    };
    log::debug!(
        "elaborated `{}`: {} cells, {} settle steps, {} commit blocks, fingerprint {}",
        design.component_path(design.top()),
        elab.netlist.cells.len(),
        elab.schedule.comb.len(),
        elab.schedule.seq.len(),
        elab.fingerprint()
    );
    Ok(elab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trellis_ir::{BlockError, BlockSpec, SignalAccess};

    fn noop(_: &mut dyn SignalAccess) -> Result<(), BlockError> {
        Ok(())
    }

    fn counter() -> Design {
        let mut d = Design::new("top");
        let top = d.top();
        let count = d.out_port(top, "count", 4).unwrap();
        let next = d.wire(top, "next", 4).unwrap();
        d.register(
            BlockSpec::combinational(top, "inc", noop)
                .reads([count])
                .writes([next]),
        )
        .unwrap();
        d.register(
            BlockSpec::sequential(top, "ff", noop)
                .reads([next])
                .writes([count])
                .reset_value(count, Bits::from_u64(3, 4)),
        )
        .unwrap();
        d
    }

    #[test]
    fn elaboration_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Elaboration>();
    }

    #[test]
    fn signal_table_and_names() {
        let d = counter();
        let elab = elaborate(&d, &ElaborateConfig::default()).unwrap();
        let count = elab.find_signal("top.count").unwrap();
        let info = elab.signal(count).unwrap();
        assert_eq!(info.width, 4);
        assert_eq!(info.port, PortKind::Output);
        assert_eq!(elab.signal(elab.reset).unwrap().port, PortKind::Input);
        let next = elab.find_signal("top.next").unwrap();
        assert_eq!(elab.signal(next).unwrap().port, PortKind::Internal);
        assert!(elab.find_signal("top.missing").is_none());
    }

    #[test]
    fn reset_writes_cover_every_target() {
        let mut d = counter();
        let top = d.top();
        let a = d.wire(top, "a", 2).unwrap();
        let b = d.wire(top, "b", 2).unwrap();
        let id = d
            .register(
                BlockSpec::sequential(top, "pair", noop)
                    .writes([a, b])
                    .reset_value(b, Bits::from_u64(2, 2)),
            )
            .unwrap();
        let elab = elaborate(&d, &ElaborateConfig::default()).unwrap();
        let plan = elab.block(id).unwrap();
        assert_eq!(
            plan.reset_writes,
            vec![(a, Bits::new(2)), (b, Bits::from_u64(2, 2))]
        );
        let inc = elab.blocks.iter().find(|b| b.name == "top.inc").unwrap();
        assert!(inc.reset_writes.is_empty());
    }

    #[test]
    fn repeated_elaboration_is_identical() {
        let d = counter();
        let first = elaborate(&d, &ElaborateConfig::default()).unwrap();
        let second = elaborate(&d, &ElaborateConfig::default()).unwrap();
        assert_eq!(first.schedule, second.schedule);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn schedule_serializes() {
        let elab = elaborate(&counter(), &ElaborateConfig::default()).unwrap();
        let json = serde_json::to_value(&elab.schedule).unwrap();
        assert_eq!(json["comb"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["seq"].as_array().map(Vec::len), Some(1));
    }

    proptest! {
        #[test]
        fn chain_is_ordered_regardless_of_declaration_order(
            order in (2usize..8).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        ) {
            let n = order.len();
            let mut d = Design::new("top");
            let top = d.top();
            let wires: Vec<SignalId> = (0..n)
                .map(|i| d.wire(top, &format!("w{i}"), 1).unwrap())
                .collect();
            let mut ids = vec![BlockId::from_raw(0); n];
            for &i in &order {
                let mut spec = BlockSpec::combinational(top, format!("b{i}"), noop).writes([wires[i]]);
                if i > 0 {
                    spec = spec.reads([wires[i - 1]]);
                }
                ids[i] = d.register(spec).unwrap();
            }
            let elab = elaborate(&d, &ElaborateConfig::default()).unwrap();
            let expected: Vec<Step> = ids.iter().map(|b| Step::Block(*b)).collect();
            prop_assert_eq!(&elab.schedule.comb, &expected);
            let again = elaborate(&d, &ElaborateConfig::default()).unwrap();
            prop_assert_eq!(elab.fingerprint(), again.fingerprint());
        }
    }
}
