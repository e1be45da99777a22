//! Static scheduling of update blocks and net fanout steps.
//!
//! Combinational steps are ordered so that every writer of a location runs
//! before every reader of it, subject to explicit constraints. Sequential
//! blocks all observe pre-commit state, so only explicit constraints order
//! them. Ties are broken by declaration order, making the schedule a pure
//! function of the design.

use crate::errors::ElabError;
use crate::nets::{Location, NetSource, Netlist};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::Incoming;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use trellis_common::{ContentHash, ContentHasher, InternalError};
use trellis_ir::{BlockId, BlockKind, ConstraintSide, Design, NetId, SignalId};

/// A unit of work in the settle phase.
///
/// Blocks sort before nets; within a kind, by declaration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Step {
    /// Run an update block.
    Block(BlockId),
    /// Copy a net's source to its fanout locations.
    Net(NetId),
}

/// The static evaluation order for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Combinational blocks and fanout steps in settle order.
    pub comb: Vec<Step>,
    /// Sequential blocks in commit order.
    pub seq: Vec<BlockId>,
}

impl Schedule {
    /// Returns a stable hash of the step order.
    pub fn fingerprint(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        for step in &self.comb {
            match step {
                Step::Block(b) => hasher.write_u8(0).write_u32(b.as_raw()),
                Step::Net(n) => hasher.write_u8(1).write_u32(n.as_raw()),
            };
        }
        hasher.write_u8(0xff);
        for b in &self.seq {
            hasher.write_u8(0).write_u32(b.as_raw());
        }
        hasher.finish()
    }
}

#[derive(Debug, Default)]
struct Access {
    reads: Vec<Location>,
    writes: Vec<Location>,
}

impl Access {
    fn reads_any(&self, loc: &Location) -> bool {
        self.reads.iter().any(|r| r.overlaps(loc))
    }

    fn writes_any(&self, loc: &Location) -> bool {
        self.writes.iter().any(|w| w.overlaps(loc))
    }

    fn feeds(&self, reader: &Access) -> bool {
        self.writes.iter().any(|w| reader.reads_any(w))
    }
}

/// Builds the schedule for a resolved design.
pub fn build(design: &Design, netlist: &Netlist) -> Result<Schedule, ElabError> {
    let mut access: HashMap<Step, Access> = HashMap::new();
    for (b, block) in design.blocks() {
        let entry = Access {
            reads: locations(design, netlist, &block.reads)?,
            writes: locations(design, netlist, &block.writes)?,
        };
        access.insert(Step::Block(b), entry);
    }
    for (n, net) in netlist.iter_nets() {
        if !net.has_fanout() {
            continue;
        }
        let reads = match &net.source {
            Some(NetSource::Location(loc)) => vec![*loc],
            _ => Vec::new(),
        };
        access.insert(
            Step::Net(n),
            Access {
                reads,
                writes: net.fanout.clone(),
            },
        );
    }
    let is_comb = |step: Step| match step {
        Step::Block(b) => design.block(b).kind == BlockKind::Combinational,
        Step::Net(_) => true,
    };

    let mut steps: Vec<Step> = access.keys().copied().collect();
    steps.sort();

    let mut comb: DiGraph<Step, ()> = DiGraph::new();
    let mut comb_nodes: HashMap<Step, NodeIndex> = HashMap::new();
    let mut seq: DiGraph<BlockId, ()> = DiGraph::new();
    let mut seq_nodes: HashMap<BlockId, NodeIndex> = HashMap::new();
    for &step in &steps {
        match step {
            Step::Block(b) if !is_comb(step) => {
                seq_nodes.insert(b, seq.add_node(b));
            }
            _ => {
                comb_nodes.insert(step, comb.add_node(step));
            }
        }
    }

    // Writers before readers, including a step that reads its own output.
    for (&w, &wi) in &comb_nodes {
        for (&r, &ri) in &comb_nodes {
            if access[&w].feeds(&access[&r]) {
                comb.update_edge(wi, ri, ());
            }
        }
    }

    for (_, constraint) in design.constraints() {
        let lhs = expand_side(design, netlist, &steps, &access, constraint.lhs)?;
        let rhs = expand_side(design, netlist, &steps, &access, constraint.rhs)?;
        for &a in &lhs {
            for &b in &rhs {
                if a == b {
                    continue;
                }
                match (is_comb(a), is_comb(b)) {
                    (true, true) => {
                        comb.update_edge(comb_nodes[&a], comb_nodes[&b], ());
                    }
                    (true, false) => {}
                    (false, false) => {
                        if let (Step::Block(x), Step::Block(y)) = (a, b) {
                            seq.update_edge(seq_nodes[&x], seq_nodes[&y], ());
                        }
                    }
                    (false, true) => {
                        return Err(ElabError::CrossPhaseConstraint {
                            lhs: step_name(design, netlist, a),
                            rhs: step_name(design, netlist, b),
                        })
                    }
                }
            }
        }
    }

    if let Some(cycle) = find_cycle(&comb) {
        return Err(ElabError::CombinationalCycle {
            blocks: cycle
                .into_iter()
                .map(|s| step_name(design, netlist, s))
                .collect(),
        });
    }

    let (comb_order, stuck) = topological_order(&comb);
    if !stuck.is_empty() {
        return Err(InternalError::new(
            "scheduling",
            "acyclic combinational graph left unordered steps",
        )
        .into());
    }
    let (seq_order, stuck) = topological_order(&seq);
    if !stuck.is_empty() {
        return Err(ElabError::ConstraintCycle {
            blocks: stuck.into_iter().map(|b| design.block_name(b)).collect(),
        });
    }

    log::debug!(
        "scheduled {} combinational steps and {} sequential blocks",
        comb_order.len(),
        seq_order.len()
    );
    Ok(Schedule {
        comb: comb_order,
        seq: seq_order,
    })
}

fn locations(
    design: &Design,
    netlist: &Netlist,
    signals: &[SignalId],
) -> Result<Vec<Location>, ElabError> {
    signals
        .iter()
        .map(|&s| {
            netlist.location(s).ok_or_else(|| {
                ElabError::from(InternalError::new(
                    "scheduling",
                    format!("`{}` has no storage location", design.full_name(s)),
                ))
            })
        })
        .collect()
}

/// Returns every step matched by one side of a constraint.
fn expand_side(
    design: &Design,
    netlist: &Netlist,
    steps: &[Step],
    access: &HashMap<Step, Access>,
    side: ConstraintSide,
) -> Result<Vec<Step>, ElabError> {
    let located = |s: SignalId| {
        netlist.location(s).ok_or_else(|| {
            ElabError::from(InternalError::new(
                "scheduling",
                format!("`{}` has no storage location", design.full_name(s)),
            ))
        })
    };
    Ok(match side {
        ConstraintSide::Block(b) => vec![Step::Block(b)],
        ConstraintSide::Read(s) => {
            let loc = located(s)?;
            steps
                .iter()
                .copied()
                .filter(|step| access[step].reads_any(&loc))
                .collect()
        }
        ConstraintSide::Write(s) => {
            let loc = located(s)?;
            steps
                .iter()
                .copied()
                .filter(|step| access[step].writes_any(&loc))
                .collect()
        }
        ConstraintSide::Call(m) => {
            let en = located(design.method(m).en)?;
            let mut callers = Vec::new();
            for (b, block) in design.blocks() {
                for &call in &block.calls {
                    if located(design.method(call).en)?.overlaps(&en) {
                        callers.push(Step::Block(b));
                        break;
                    }
                }
            }
            callers
        }
    })
}

fn step_name(design: &Design, netlist: &Netlist, step: Step) -> String {
    match step {
        Step::Block(b) => design.block_name(b),
        Step::Net(n) => format!("net {}", netlist.net(n).name),
    }
}

/// Finds the shortest cycle through the earliest step of the earliest cyclic
/// component. The first step is repeated at the end.
fn find_cycle(graph: &DiGraph<Step, ()>) -> Option<Vec<Step>> {
    let scc = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .min_by_key(|scc| scc.iter().map(|n| graph[*n]).min())?;
    let start = *scc.iter().min_by_key(|n| graph[**n])?;
    let members: HashSet<NodeIndex> = scc.iter().copied().collect();

    let mut prev: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors(node)
            .filter(|n| members.contains(n))
            .collect();
        next.sort_by_key(|n| graph[*n]);
        for n in next {
            if n == start {
                let mut path = vec![graph[node]];
                let mut cur = node;
                while cur != start {
                    match prev.get(&cur) {
                        Some(p) => cur = *p,
                        None => break,
                    }
                    path.push(graph[cur]);
                }
                path.reverse();
                path.push(graph[start]);
                return Some(path);
            }
            if !prev.contains_key(&n) {
                prev.insert(n, node);
                queue.push_back(n);
            }
        }
    }
    None
}

/// Kahn's algorithm, always taking the smallest ready node.
///
/// Returns the order and any nodes left on a cycle, sorted.
fn topological_order<N: Copy + Ord>(graph: &DiGraph<N, ()>) -> (Vec<N>, Vec<N>) {
    let mut indegree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<(N, NodeIndex)>> = graph
        .node_indices()
        .filter(|n| indegree[n.index()] == 0)
        .map(|n| Reverse((graph[n], n)))
        .collect();
    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((weight, node))) = ready.pop() {
        order.push(weight);
        for next in graph.neighbors(node) {
            indegree[next.index()] -= 1;
            if indegree[next.index()] == 0 {
                ready.push(Reverse((graph[next], next)));
            }
        }
    }
    let mut stuck: Vec<N> = graph
        .node_indices()
        .filter(|n| indegree[n.index()] > 0)
        .map(|n| graph[n])
        .collect();
    stuck.sort();
    (order, stuck)
}
