//! Net resolution.
//!
//! Connection requests are unioned into nets, every root leaf signal is given
//! a storage cell (shared by all roots of one net), and each net elects at most
//! one driver. Nets whose members occupy more than one location get a fanout
//! step that copies the driver's bits to the remaining locations. A global
//! per-cell check then rejects conflicting writers, and every bit read by a
//! block must be covered by some writer.

use crate::errors::ElabError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use trellis_common::{BitRange, Bits, InternalError};
use trellis_config::ElaborateConfig;
use trellis_ir::{
    BlockId, CellId, ConstId, Design, Direction, Endpoint, NetId, SignalId, SignalShape,
};

/// A bit range of one storage cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Location {
    /// The storage cell.
    pub cell: CellId,
    /// The bits within the cell.
    pub range: BitRange,
}

impl Location {
    /// Returns `true` if both locations share a cell and some bits.
    pub fn overlaps(&self, other: &Location) -> bool {
        self.cell == other.cell && self.range.overlaps(other.range)
    }
}

/// A storage cell backing one or more aliased root signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Cell width in bits.
    pub width: u32,
    /// Value at kernel construction. Non-zero only for constant-driven cells.
    pub init: Bits,
}

/// The elected driver of a net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetSource {
    /// The member location that something else writes.
    Location(Location),
    /// A constant member.
    Const(ConstId, Bits),
}

/// A resolved net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    /// Hierarchical name of the lowest-numbered member.
    pub name: String,
    /// Member leaf signals in declaration order.
    pub members: Vec<SignalId>,
    /// Constant members.
    pub consts: Vec<ConstId>,
    /// The elected driver, `None` if undriven.
    pub source: Option<NetSource>,
    /// Locations the fanout step copies the source to. Empty means no step.
    pub fanout: Vec<Location>,
}

impl Net {
    /// Returns `true` if this net needs a fanout step at settle time.
    pub fn has_fanout(&self) -> bool {
        !self.fanout.is_empty()
    }
}

/// Something that writes a storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Writer {
    /// An update block.
    Block(BlockId),
    /// A net fanout step.
    Net(NetId),
    /// The test bench, through a top-level input.
    External(SignalId),
    /// A constant initializing a whole cell.
    Const(ConstId),
}

/// The finalized, immutable netlist.
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    /// Nets indexed by [`NetId`].
    pub nets: Vec<Net>,
    /// Cells indexed by [`CellId`].
    pub cells: Vec<Cell>,
    locations: Vec<Option<Location>>,
    net_of: Vec<Option<NetId>>,
}

impl Netlist {
    /// Returns a net.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    /// Iterates over nets with their IDs.
    pub fn iter_nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets
            .iter()
            .enumerate()
            .map(|(i, net)| (NetId::from_raw(i as u32), net))
    }

    /// Returns the location of a leaf signal, `None` for composites.
    pub fn location(&self, signal: SignalId) -> Option<Location> {
        self.locations.get(signal.index()).copied().flatten()
    }

    /// Returns the net a leaf signal belongs to.
    pub fn net_of(&self, signal: SignalId) -> Option<NetId> {
        self.net_of.get(signal.index()).copied().flatten()
    }
}

/// Disjoint-set forest with path compression and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Location(Location),
    Const(ConstId),
}

struct WriteTarget {
    writer: Writer,
    location: Location,
    /// The declared write target, for block writes.
    signal: Option<SignalId>,
}

/// Resolves the design's connections into a [`Netlist`].
pub fn resolve(design: &Design, config: &ElaborateConfig) -> Result<Netlist, ElabError> {
    let signal_count = design.signal_count();
    let endpoint_index = |e: &Endpoint| match e {
        Endpoint::Signal(s) => s.index(),
        Endpoint::Const(c) => signal_count + c.index(),
    };
    let mut uf = UnionFind::new(signal_count + design.const_count());
    for (a, b) in design.connections() {
        uf.union(endpoint_index(a), endpoint_index(b));
    }

    // Nets are numbered by their lowest-numbered leaf member.
    let mut nets: Vec<Net> = Vec::new();
    let mut class_net: HashMap<usize, NetId> = HashMap::new();
    let mut net_of = vec![None; signal_count];
    for (id, sig) in design.signals() {
        if !sig.is_leaf() {
            continue;
        }
        let class = uf.find(id.index());
        let net = *class_net.entry(class).or_insert_with(|| {
            nets.push(Net {
                name: design.full_name(id),
                members: Vec::new(),
                consts: Vec::new(),
                source: None,
                fanout: Vec::new(),
            });
            NetId::from_raw(nets.len() as u32 - 1)
        });
        nets[net.index()].members.push(id);
        net_of[id.index()] = Some(net);
    }
    for (c, _) in design.consts() {
        if let Some(net) = class_net.get(&uf.find(signal_count + c.index())) {
            nets[net.index()].consts.push(c);
        }
    }

    // One cell per net containing root leaves; slices view their root's cell.
    let mut cells: Vec<Cell> = Vec::new();
    let mut cell_net: Vec<NetId> = Vec::new();
    let mut locations: Vec<Option<Location>> = vec![None; signal_count];
    for (i, net) in nets.iter().enumerate() {
        let mut net_cell = None;
        for &member in &net.members {
            let sig = design.signal(member);
            if !matches!(sig.shape, SignalShape::Leaf) {
                continue;
            }
            let cell = *net_cell.get_or_insert_with(|| {
                cells.push(Cell {
                    width: sig.width,
                    init: Bits::new(sig.width),
                });
                cell_net.push(NetId::from_raw(i as u32));
                CellId::from_raw(cells.len() as u32 - 1)
            });
            locations[member.index()] = Some(Location {
                cell,
                range: BitRange::full(sig.width),
            });
        }
    }
    for (id, sig) in design.signals() {
        if let SignalShape::Slice { root, range } = sig.shape {
            let root_loc = location_of(&locations, design, root)?;
            locations[id.index()] = Some(Location {
                cell: root_loc.cell,
                range,
            });
        }
    }

    // Distinct member locations per net, each with the first member found there.
    let mut net_locs: Vec<Vec<(Location, SignalId)>> = Vec::with_capacity(nets.len());
    for net in &nets {
        let mut locs: Vec<(Location, SignalId)> = Vec::new();
        for &member in &net.members {
            let loc = location_of(&locations, design, member)?;
            if !locs.iter().any(|(l, _)| *l == loc) {
                locs.push((loc, member));
            }
        }
        for (i, (a, sa)) in locs.iter().enumerate() {
            if let Some((_, sb)) = locs[i + 1..].iter().find(|(b, _)| a.overlaps(b)) {
                return Err(ElabError::OverlappingSlice {
                    first: design.full_name(*sa),
                    second: design.full_name(*sb),
                });
            }
        }
        net_locs.push(locs);
    }

    let mut block_writes: Vec<(BlockId, SignalId, Location)> = Vec::new();
    for (b, block) in design.blocks() {
        for &w in &block.writes {
            block_writes.push((b, w, location_of(&locations, design, w)?));
        }
    }
    let mut external: Vec<(SignalId, Location)> = Vec::new();
    for (id, sig) in design.signals() {
        if matches!(sig.shape, SignalShape::Leaf)
            && sig.owner == design.top()
            && sig.direction == Direction::In
        {
            external.push((id, location_of(&locations, design, id)?));
        }
    }

    // Driver election, iterated until the set of fanout-fed locations is stable.
    let mut fed: Vec<(NetId, Location)> = Vec::new();
    let elected = loop {
        let mut elected: Vec<Option<Candidate>> = Vec::with_capacity(nets.len());
        for (i, net) in nets.iter().enumerate() {
            let id = NetId::from_raw(i as u32);
            let mut candidates: Vec<Candidate> = net_locs[i]
                .iter()
                .filter(|(loc, _)| {
                    external.iter().any(|(_, l)| l.overlaps(loc))
                        || block_writes.iter().any(|(_, _, l)| l.overlaps(loc))
                        || fed.iter().any(|(n, l)| *n != id && l.overlaps(loc))
                })
                .map(|(loc, _)| Candidate::Location(*loc))
                .collect();
            candidates.extend(net.consts.iter().map(|c| Candidate::Const(*c)));
            if candidates.len() > 1 {
                let mut drivers = Vec::new();
                for candidate in &candidates {
                    let writers = match candidate {
                        Candidate::Location(loc) => {
                            writers_at(loc, &external, &block_writes, &fed, id)
                        }
                        Candidate::Const(c) => vec![Writer::Const(*c)],
                    };
                    for w in writers {
                        let name = describe_writer(design, &nets, w);
                        if !drivers.contains(&name) {
                            drivers.push(name);
                        }
                    }
                }
                return Err(ElabError::MultipleDriver {
                    net: net.name.clone(),
                    drivers,
                });
            }
            elected.push(candidates.pop());
        }
        let next_fed: Vec<(NetId, Location)> = elected
            .iter()
            .enumerate()
            .flat_map(|(i, candidate)| {
                let id = NetId::from_raw(i as u32);
                fed_targets(&net_locs[i], *candidate)
                    .into_iter()
                    .map(move |loc| (id, loc))
            })
            .collect();
        if next_fed == fed {
            break elected;
        }
        fed = next_fed;
    };

    let mut const_inits: Vec<(ConstId, Location)> = Vec::new();
    for (i, candidate) in elected.into_iter().enumerate() {
        let locs = &net_locs[i];
        match candidate {
            None => {}
            Some(Candidate::Location(driver)) => {
                nets[i].source = Some(NetSource::Location(driver));
                nets[i].fanout = locs
                    .iter()
                    .map(|(l, _)| *l)
                    .filter(|l| *l != driver)
                    .collect();
            }
            Some(Candidate::Const(c)) => {
                let value = design.constant(c).value.clone();
                match locs.as_slice() {
                    [(loc, _)] if loc.range == BitRange::full(cells[loc.cell.index()].width) => {
                        cells[loc.cell.index()].init = value.clone();
                        const_inits.push((c, *loc));
                    }
                    _ => nets[i].fanout = locs.iter().map(|(l, _)| *l).collect(),
                }
                nets[i].source = Some(NetSource::Const(c, value));
            }
        }
    }

    let mut targets: Vec<WriteTarget> = Vec::new();
    targets.extend(block_writes.iter().map(|(b, s, l)| WriteTarget {
        writer: Writer::Block(*b),
        location: *l,
        signal: Some(*s),
    }));
    targets.extend(external.iter().map(|(s, l)| WriteTarget {
        writer: Writer::External(*s),
        location: *l,
        signal: None,
    }));
    for (i, net) in nets.iter().enumerate() {
        targets.extend(net.fanout.iter().map(|l| WriteTarget {
            writer: Writer::Net(NetId::from_raw(i as u32)),
            location: *l,
            signal: None,
        }));
    }
    targets.extend(const_inits.iter().map(|(c, l)| WriteTarget {
        writer: Writer::Const(*c),
        location: *l,
        signal: None,
    }));
    check_writers(design, &nets, &cell_net, &targets)?;
    check_reads(design, config, &nets, &cells, &locations, &net_of, &targets)?;

    log::debug!(
        "resolved {} nets into {} cells, {} with fanout",
        nets.len(),
        cells.len(),
        nets.iter().filter(|n| n.has_fanout()).count()
    );
    Ok(Netlist {
        nets,
        cells,
        locations,
        net_of,
    })
}

fn location_of(
    locations: &[Option<Location>],
    design: &Design,
    signal: SignalId,
) -> Result<Location, ElabError> {
    locations
        .get(signal.index())
        .copied()
        .flatten()
        .ok_or_else(|| {
            InternalError::new(
                "net resolution",
                format!("`{}` has no storage location", design.full_name(signal)),
            )
            .into()
        })
}

/// Locations a net writes once its driver is known, including a whole cell
/// initialized by a constant.
fn fed_targets(locs: &[(Location, SignalId)], candidate: Option<Candidate>) -> Vec<Location> {
    match candidate {
        None => Vec::new(),
        Some(Candidate::Location(driver)) => locs
            .iter()
            .map(|(l, _)| *l)
            .filter(|l| *l != driver)
            .collect(),
        Some(Candidate::Const(_)) => locs.iter().map(|(l, _)| *l).collect(),
    }
}

fn writers_at(
    loc: &Location,
    external: &[(SignalId, Location)],
    block_writes: &[(BlockId, SignalId, Location)],
    fed: &[(NetId, Location)],
    own: NetId,
) -> Vec<Writer> {
    let mut writers = Vec::new();
    writers.extend(
        external
            .iter()
            .filter(|(_, l)| l.overlaps(loc))
            .map(|(s, _)| Writer::External(*s)),
    );
    writers.extend(
        block_writes
            .iter()
            .filter(|(_, _, l)| l.overlaps(loc))
            .map(|(b, _, _)| Writer::Block(*b)),
    );
    writers.extend(
        fed.iter()
            .filter(|(n, l)| *n != own && l.overlaps(loc))
            .map(|(n, _)| Writer::Net(*n)),
    );
    writers
}

fn describe_writer(design: &Design, nets: &[Net], writer: Writer) -> String {
    match writer {
        Writer::Block(b) => format!("block {}", design.block_name(b)),
        Writer::Net(n) => match nets.get(n.index()) {
            Some(net) => format!("net {}", net.name),
            None => format!("net #{}", n.as_raw()),
        },
        Writer::External(s) => format!("input {}", design.full_name(s)),
        Writer::Const(c) => design.const_name(c),
    }
}

/// Rejects overlapping writes to one cell from different writers, and
/// overlapping distinct slices that are both block write targets.
fn check_writers(
    design: &Design,
    nets: &[Net],
    cell_net: &[NetId],
    targets: &[WriteTarget],
) -> Result<(), ElabError> {
    let mut by_cell: BTreeMap<CellId, Vec<&WriteTarget>> = BTreeMap::new();
    for t in targets {
        by_cell.entry(t.location.cell).or_default().push(t);
    }
    for (cell, group) in by_cell {
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                if !a.location.overlaps(&b.location) {
                    continue;
                }
                if let (Some(sa), Some(sb)) = (a.signal, b.signal) {
                    if sa != sb
                        && a.location != b.location
                        && design.signal(sa).is_slice()
                        && design.signal(sb).is_slice()
                    {
                        return Err(ElabError::OverlappingSlice {
                            first: design.full_name(sa),
                            second: design.full_name(sb),
                        });
                    }
                }
                if a.writer != b.writer {
                    let net = cell_net
                        .get(cell.index())
                        .and_then(|n| nets.get(n.index()))
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| format!("cell #{}", cell.as_raw()));
                    return Err(ElabError::MultipleDriver {
                        net,
                        drivers: vec![
                            describe_writer(design, nets, a.writer),
                            describe_writer(design, nets, b.writer),
                        ],
                    });
                }
            }
        }
    }
    Ok(())
}

/// Requires every bit read by a block or a fanout step to be written by something.
fn check_reads(
    design: &Design,
    config: &ElaborateConfig,
    nets: &[Net],
    cells: &[Cell],
    locations: &[Option<Location>],
    net_of: &[Option<NetId>],
    targets: &[WriteTarget],
) -> Result<(), ElabError> {
    let mut covered: Vec<Vec<bool>> = cells
        .iter()
        .map(|c| vec![false; c.width as usize])
        .collect();
    for t in targets {
        let bits = &mut covered[t.location.cell.index()];
        for bit in t.location.range.start..t.location.range.stop {
            bits[bit as usize] = true;
        }
    }
    let is_covered = |loc: &Location| {
        (loc.range.start..loc.range.stop).all(|bit| covered[loc.cell.index()][bit as usize])
    };

    let mut uncovered: Vec<(NetId, String)> = Vec::new();
    for (b, block) in design.blocks() {
        for &r in &block.reads {
            let loc = location_of(locations, design, r)?;
            if is_covered(&loc) {
                continue;
            }
            let net = net_of
                .get(r.index())
                .copied()
                .flatten()
                .ok_or_else(|| {
                    InternalError::new(
                        "net resolution",
                        format!("`{}` has no net", design.full_name(r)),
                    )
                })?;
            uncovered.push((net, design.block_name(b)));
        }
    }
    for (i, net) in nets.iter().enumerate() {
        if let (Some(NetSource::Location(driver)), true) = (&net.source, net.has_fanout()) {
            if !is_covered(driver) {
                uncovered.push((NetId::from_raw(i as u32), format!("net {}", net.name)));
            }
        }
    }

    let mut groups: Vec<(NetId, Vec<String>)> = Vec::new();
    for (net, reader) in uncovered {
        match groups.iter_mut().find(|(n, _)| *n == net) {
            Some((_, readers)) => {
                if !readers.contains(&reader) {
                    readers.push(reader);
                }
            }
            None => groups.push((net, vec![reader])),
        }
    }
    for (net, readers) in groups {
        let name = &nets[net.index()].name;
        if config.allow_floating_nets {
            log::warn!(
                "`{name}` has no driver; {} will read zero",
                readers.join(", ")
            );
        } else {
            return Err(ElabError::NoDriver {
                net: name.clone(),
                readers,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_ir::{BlockError, BlockSpec, SignalAccess};

    fn noop(_: &mut dyn SignalAccess) -> Result<(), BlockError> {
        Ok(())
    }

    fn strict() -> ElaborateConfig {
        ElaborateConfig::default()
    }

    #[test]
    fn union_find_merges_transitively() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(3, 4);
        uf.union(1, 4);
        assert_eq!(uf.find(0), uf.find(3));
        assert_ne!(uf.find(0), uf.find(2));
        uf.union(0, 4);
        assert_eq!(uf.find(1), uf.find(4));
    }

    #[test]
    fn connected_roots_share_a_cell() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.in_port(top, "a", 8).unwrap();
        let b = d.wire(top, "b", 8).unwrap();
        let c = d.out_port(top, "c", 8).unwrap();
        d.connect(a, b).unwrap();
        d.connect(c, b).unwrap();
        let netlist = resolve(&d, &strict()).unwrap();
        assert_eq!(netlist.location(a), netlist.location(b));
        assert_eq!(netlist.location(a), netlist.location(c));
        let net = netlist.net(netlist.net_of(a).unwrap());
        assert_eq!(net.members, vec![a, b, c]);
        assert_eq!(net.source, Some(NetSource::Location(netlist.location(a).unwrap())));
        assert!(!net.has_fanout());
    }

    #[test]
    fn slice_net_gets_fanout() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.in_port(top, "x", 8).unwrap();
        let lo = d.slice(x, 0, 4).unwrap();
        let y = d.wire(top, "y", 4).unwrap();
        d.connect(lo, y).unwrap();
        let netlist = resolve(&d, &strict()).unwrap();
        let net = netlist.net(netlist.net_of(y).unwrap());
        assert_eq!(net.source, Some(NetSource::Location(netlist.location(lo).unwrap())));
        assert_eq!(net.fanout, vec![netlist.location(y).unwrap()]);
        assert_ne!(netlist.location(x).unwrap().cell, netlist.location(y).unwrap().cell);
    }

    #[test]
    fn sourcing_through_other_nets_reaches_fixed_point() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.wire(top, "x", 8).unwrap();
        let a = d.wire(top, "a", 4).unwrap();
        let b = d.wire(top, "b", 2).unwrap();
        let a_lo = d.slice(a, 0, 2).unwrap();
        let x_lo = d.slice(x, 0, 4).unwrap();
        d.connect(a_lo, b).unwrap();
        d.connect(x_lo, a).unwrap();
        d.register(BlockSpec::combinational(top, "drive", noop).writes([x]))
            .unwrap();
        d.register(BlockSpec::combinational(top, "use", noop).reads([b]))
            .unwrap();
        let netlist = resolve(&d, &strict()).unwrap();
        let b_net = netlist.net(netlist.net_of(b).unwrap());
        assert_eq!(
            b_net.source,
            Some(NetSource::Location(netlist.location(a_lo).unwrap()))
        );
    }

    #[test]
    fn overlapping_members_rejected() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.in_port(top, "x", 8).unwrap();
        let s1 = d.slice(x, 0, 4).unwrap();
        let s2 = d.slice(x, 2, 6).unwrap();
        d.connect(s1, s2).unwrap();
        let err = resolve(&d, &strict()).unwrap_err();
        assert_eq!(
            err,
            ElabError::OverlappingSlice {
                first: "top.x[0:4]".to_string(),
                second: "top.x[2:6]".to_string()
            }
        );
    }

    #[test]
    fn overlapping_written_slices_rejected_even_in_one_block() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.wire(top, "x", 8).unwrap();
        let s1 = d.slice(x, 0, 4).unwrap();
        let s2 = d.slice(x, 3, 8).unwrap();
        d.register(BlockSpec::combinational(top, "w", noop).writes([s1, s2]))
            .unwrap();
        let err = resolve(&d, &strict()).unwrap_err();
        assert!(matches!(err, ElabError::OverlappingSlice { .. }));
    }

    #[test]
    fn disjoint_written_slices_are_fine() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.wire(top, "x", 8).unwrap();
        let lo = d.slice(x, 0, 4).unwrap();
        let hi = d.slice(x, 4, 8).unwrap();
        d.register(BlockSpec::combinational(top, "lo", noop).writes([lo]))
            .unwrap();
        d.register(BlockSpec::combinational(top, "hi", noop).writes([hi]))
            .unwrap();
        d.register(BlockSpec::combinational(top, "use", noop).reads([x]))
            .unwrap();
        resolve(&d, &strict()).unwrap();
    }

    #[test]
    fn two_blocks_on_one_net() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.wire(top, "a", 1).unwrap();
        let b = d.wire(top, "b", 1).unwrap();
        d.connect(a, b).unwrap();
        d.register(BlockSpec::combinational(top, "f", noop).writes([a]))
            .unwrap();
        d.register(BlockSpec::combinational(top, "g", noop).writes([b]))
            .unwrap();
        let err = resolve(&d, &strict()).unwrap_err();
        assert_eq!(
            err,
            ElabError::MultipleDriver {
                net: "top.a".to_string(),
                drivers: vec!["block top.f".to_string(), "block top.g".to_string()]
            }
        );
    }

    #[test]
    fn written_top_input_is_multiply_driven() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.in_port(top, "a", 4).unwrap();
        d.register(BlockSpec::combinational(top, "f", noop).writes([a]))
            .unwrap();
        let err = resolve(&d, &strict()).unwrap_err();
        assert!(matches!(err, ElabError::MultipleDriver { .. }));
        assert!(err.to_string().contains("input top.a"));
    }

    #[test]
    fn two_constants_conflict() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.wire(top, "a", 4).unwrap();
        let c0 = d.add_const(top, Bits::from_u64(1, 4)).unwrap();
        let c1 = d.add_const(top, Bits::from_u64(2, 4)).unwrap();
        d.connect(a, c0).unwrap();
        d.connect(a, c1).unwrap();
        assert!(matches!(
            resolve(&d, &strict()).unwrap_err(),
            ElabError::MultipleDriver { .. }
        ));
    }

    #[test]
    fn constant_initializes_whole_cell() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.wire(top, "a", 4).unwrap();
        let c = d.add_const(top, Bits::from_u64(5, 4)).unwrap();
        d.connect(a, c).unwrap();
        d.register(BlockSpec::combinational(top, "use", noop).reads([a]))
            .unwrap();
        let netlist = resolve(&d, &strict()).unwrap();
        let loc = netlist.location(a).unwrap();
        assert_eq!(netlist.cells[loc.cell.index()].init, Bits::from_u64(5, 4));
        assert!(!netlist.net(netlist.net_of(a).unwrap()).has_fanout());
    }

    #[test]
    fn constant_feeding_a_slice_uses_fanout() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.wire(top, "x", 8).unwrap();
        let hi = d.slice(x, 4, 8).unwrap();
        let c = d.add_const(top, Bits::from_u64(0xa, 4)).unwrap();
        d.connect(hi, c).unwrap();
        let netlist = resolve(&d, &strict()).unwrap();
        let net = netlist.net(netlist.net_of(hi).unwrap());
        assert_eq!(net.fanout, vec![netlist.location(hi).unwrap()]);
        assert!(matches!(net.source, Some(NetSource::Const(_, _))));
    }

    #[test]
    fn undriven_read_fails() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.wire(top, "a", 1).unwrap();
        d.register(BlockSpec::combinational(top, "f", noop).reads([a]))
            .unwrap();
        d.register(BlockSpec::sequential(top, "g", noop).reads([a]))
            .unwrap();
        let err = resolve(&d, &strict()).unwrap_err();
        assert_eq!(
            err,
            ElabError::NoDriver {
                net: "top.a".to_string(),
                readers: vec!["top.f".to_string(), "top.g".to_string()]
            }
        );
    }

    #[test]
    fn partially_driven_read_fails() {
        let mut d = Design::new("top");
        let top = d.top();
        let x = d.wire(top, "x", 8).unwrap();
        let lo = d.slice(x, 0, 4).unwrap();
        d.register(BlockSpec::combinational(top, "lo", noop).writes([lo]))
            .unwrap();
        d.register(BlockSpec::combinational(top, "use", noop).reads([x]))
            .unwrap();
        assert!(matches!(
            resolve(&d, &strict()).unwrap_err(),
            ElabError::NoDriver { .. }
        ));
    }

    #[test]
    fn floating_nets_tolerated_when_configured() {
        let mut d = Design::new("top");
        let top = d.top();
        let a = d.wire(top, "a", 1).unwrap();
        d.register(BlockSpec::combinational(top, "f", noop).reads([a]))
            .unwrap();
        let config = ElaborateConfig {
            allow_floating_nets: true,
        };
        let netlist = resolve(&d, &config).unwrap();
        assert_eq!(netlist.net(netlist.net_of(a).unwrap()).source, None);
    }

    #[test]
    fn unread_undriven_net_is_legal() {
        let mut d = Design::new("top");
        let top = d.top();
        d.wire(top, "dangling", 3).unwrap();
        d.out_port(top, "unused", 2).unwrap();
        resolve(&d, &strict()).unwrap();
    }

    #[test]
    fn child_resets_alias_top_reset() {
        let mut d = Design::new("top");
        let q = d.add_component(d.top(), "q").unwrap();
        let netlist = resolve(&d, &strict()).unwrap();
        assert_eq!(
            netlist.location(d.component(q).reset),
            netlist.location(d.component(d.top()).reset)
        );
    }
}
