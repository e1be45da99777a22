//! Simulation kernel replaying a precomputed schedule.
//!
//! [`SimKernel`] owns the cell storage for one simulation. Each tick runs the
//! combinational steps once in schedule order (Settle), then the sequential
//! blocks against the settled state with their writes published together
//! (Commit). Any failure halts the kernel.

use std::sync::Arc;

use trellis_common::Bits;
use trellis_config::SimulationConfig;
use trellis_elaborate::{
    BlockPlan, Elaboration, Location, NetSource, PortKind, SignalInfo, Step,
};
use trellis_ir::{BlockError, BlockId, NetId, SignalAccess, SignalId};

use crate::error::SimError;
use crate::state::SimState;

/// A running simulation of one elaborated design.
#[derive(Debug, Clone)]
pub struct SimKernel {
    elab: Arc<Elaboration>,
    config: SimulationConfig,
    state: SimState,
    /// Completed ticks.
    tick: u64,
    halted: bool,
}

impl SimKernel {
    /// Creates a kernel with default simulation settings.
    pub fn new(elab: Arc<Elaboration>) -> Self {
        Self::with_config(elab, SimulationConfig::default())
    }

    /// Creates a kernel with its cells at their initial values.
    pub fn with_config(elab: Arc<Elaboration>, config: SimulationConfig) -> Self {
        let state = SimState::new(&elab.netlist.cells);
        log::debug!(
            "kernel created over {} cells, schedule {}",
            elab.netlist.cells.len(),
            elab.fingerprint()
        );
        Self {
            elab,
            config,
            state,
            tick: 0,
            halted: false,
        }
    }

    /// Returns the current cell storage.
    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Returns the number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Returns `true` once a failure has halted the kernel.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Runs every combinational step once, in schedule order.
    ///
    /// Settling twice without new inputs leaves the state unchanged.
    pub fn settle(&mut self) -> Result<(), SimError> {
        self.check_running()?;
        self.guard(Self::settle_steps)
    }

    /// Runs the sequential blocks and publishes their writes together.
    ///
    /// While reset is high every sequential block publishes its reset values
    /// instead of running.
    pub fn commit(&mut self) -> Result<(), SimError> {
        self.check_running()?;
        self.guard(Self::commit_blocks)
    }

    /// Settles, commits, and advances the tick counter.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.check_running()?;
        self.guard(|k| {
            k.settle_steps()?;
            if log::log_enabled!(log::Level::Trace) {
                log::trace!("{:>4}: {}", k.tick, k.line_trace());
            }
            k.commit_blocks()
        })?;
        self.tick += 1;
        log::trace!("tick {} complete", self.tick);
        Ok(())
    }

    /// Ticks `n` times.
    pub fn run(&mut self, n: u64) -> Result<(), SimError> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    /// Ticks until `done` holds on the settled state, returning the number of
    /// ticks taken.
    ///
    /// Fails with [`SimError::TickLimitExceeded`] once `max_ticks` ticks have
    /// passed without `done` holding.
    pub fn run_until<F>(&mut self, mut done: F) -> Result<u64, SimError>
    where
        F: FnMut(&SimKernel) -> bool,
    {
        let mut taken = 0;
        loop {
            self.settle()?;
            if done(&*self) {
                return Ok(taken);
            }
            if let Some(limit) = self.config.max_ticks {
                if taken >= limit {
                    return Err(SimError::TickLimitExceeded { limit });
                }
            }
            self.tick()?;
            taken += 1;
        }
    }

    /// Holds the top-level reset high for `reset_cycles` ticks, then lowers it.
    pub fn sim_reset(&mut self) -> Result<(), SimError> {
        let reset = self.elab.reset;
        self.write(reset, Bits::from_bool(true))?;
        self.run(u64::from(self.config.reset_cycles))?;
        self.write(reset, Bits::from_bool(false))?;
        log::debug!("reset held for {} ticks", self.config.reset_cycles);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Boundary access
    // ---------------------------------------------------------------

    /// Resolves a hierarchical signal name.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.elab.find_signal(name)
    }

    /// Resolves a hierarchical signal name or fails with `UnknownSignal`.
    pub fn lookup(&self, name: &str) -> Result<SignalId, SimError> {
        self.find_signal(name).ok_or_else(|| SimError::UnknownSignal {
            name: name.to_string(),
        })
    }

    /// Reads a top-level port.
    pub fn read(&self, signal: SignalId) -> Result<Bits, SimError> {
        let info = self.info(signal)?;
        if info.port == PortKind::Internal {
            return Err(SimError::NotBoundary {
                signal: info.name.clone(),
            });
        }
        self.load(info)
    }

    /// Renders every top-level leaf port as `name=value`, in declaration order.
    ///
    /// `tick` logs this at trace level after settling, one line per cycle.
    pub fn line_trace(&self) -> String {
        self.elab
            .signals
            .iter()
            .filter(|info| info.port != PortKind::Internal && !info.slice)
            .filter_map(|info| {
                let value = self.load(info).ok()?;
                Some(match value.to_u64() {
                    Ok(v) => format!("{}={v:#x}", info.name),
                    Err(_) => format!("{}={value}", info.name),
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reads any leaf signal, port or not.
    pub fn inspect(&self, signal: SignalId) -> Result<Bits, SimError> {
        self.load(self.info(signal)?)
    }

    /// Writes a top-level input. The value is visible to the next settle.
    pub fn write(&mut self, signal: SignalId, value: Bits) -> Result<(), SimError> {
        let elab = Arc::clone(&self.elab);
        let info = signal_info(&elab, signal)?;
        if info.port != PortKind::Input {
            return Err(SimError::NotWritable {
                signal: info.name.clone(),
            });
        }
        let loc = leaf_location(info)?;
        if value.width() != info.width {
            return Err(SimError::WidthMismatch {
                signal: info.name.clone(),
                expected: info.width,
                actual: value.width(),
            });
        }
        self.state.write(loc, &value)?;
        Ok(())
    }

    /// Reads a top-level port of at most 64 bits as an integer.
    pub fn read_u64(&self, signal: SignalId) -> Result<u64, SimError> {
        Ok(self.read(signal)?.to_u64()?)
    }

    /// Writes an integer to a top-level input, truncated to its width.
    pub fn write_u64(&mut self, signal: SignalId, value: u64) -> Result<(), SimError> {
        let width = self.info(signal)?.width;
        self.write(signal, Bits::from_u64(value, width))
    }

    fn info(&self, signal: SignalId) -> Result<&SignalInfo, SimError> {
        signal_info(&self.elab, signal)
    }

    fn load(&self, info: &SignalInfo) -> Result<Bits, SimError> {
        Ok(self.state.read(leaf_location(info)?)?)
    }

    // ---------------------------------------------------------------
    // Phases
    // ---------------------------------------------------------------

    fn check_running(&self) -> Result<(), SimError> {
        if self.halted {
            Err(SimError::Halted { tick: self.tick })
        } else {
            Ok(())
        }
    }

    /// Halts the kernel if `f` fails.
    fn guard<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SimError>,
    ) -> Result<T, SimError> {
        let result = f(self);
        if let Err(e) = &result {
            self.halted = true;
            log::debug!("kernel halted at tick {}: {e}", self.tick);
        }
        result
    }

    fn settle_steps(&mut self) -> Result<(), SimError> {
        let elab = Arc::clone(&self.elab);
        for step in &elab.schedule.comb {
            match *step {
                Step::Block(b) => self.run_block(&elab, b, None)?,
                Step::Net(n) => self.fanout(&elab, n)?,
            }
        }
        Ok(())
    }

    fn commit_blocks(&mut self) -> Result<(), SimError> {
        let elab = Arc::clone(&self.elab);
        let mut pending: Vec<(Location, Bits)> = Vec::new();
        if self.reset_asserted(&elab)? {
            for &b in &elab.schedule.seq {
                let plan = block_plan(&elab, b)?;
                for (signal, value) in &plan.reset_writes {
                    let info = self.info(*signal)?;
                    pending.push((leaf_location(info)?, value.clone()));
                }
            }
        } else {
            for &b in &elab.schedule.seq {
                self.run_block(&elab, b, Some(&mut pending))?;
            }
        }
        for (loc, value) in &pending {
            self.state.write(*loc, value)?;
        }
        Ok(())
    }

    fn reset_asserted(&self, elab: &Elaboration) -> Result<bool, SimError> {
        Ok(!self.load(self.info(elab.reset)?)?.is_zero())
    }

    fn run_block(
        &mut self,
        elab: &Elaboration,
        id: BlockId,
        buffer: Option<&mut Vec<(Location, Bits)>>,
    ) -> Result<(), SimError> {
        let plan = block_plan(elab, id)?;
        let tick = self.tick;
        let mut ctx = BlockCtx {
            elab,
            plan,
            state: &mut self.state,
            buffer,
        };
        let access: &mut dyn SignalAccess = &mut ctx;
        (plan.logic)(access).map_err(|source| SimError::Block {
            tick,
            block: plan.name.clone(),
            source,
        })
    }

    fn fanout(&mut self, elab: &Elaboration, id: NetId) -> Result<(), SimError> {
        let net = elab.netlist.net(id);
        let value = match &net.source {
            Some(NetSource::Location(loc)) => self.state.read(*loc)?,
            Some(NetSource::Const(_, value)) => value.clone(),
            None => return Ok(()),
        };
        for target in &net.fanout {
            self.state.write(*target, &value)?;
        }
        log::trace!("net {} <- {value:?}", net.name);
        Ok(())
    }
}

fn signal_info(elab: &Elaboration, signal: SignalId) -> Result<&SignalInfo, SimError> {
    elab.signal(signal).ok_or_else(|| SimError::UnknownSignal {
        name: format!("<signal {}>", signal.as_raw()),
    })
}

fn block_plan(elab: &Elaboration, id: BlockId) -> Result<&BlockPlan, SimError> {
    elab.block(id).ok_or_else(|| SimError::UnknownSignal {
        name: format!("<block {}>", id.as_raw()),
    })
}

fn leaf_location(info: &SignalInfo) -> Result<Location, SimError> {
    info.location.ok_or_else(|| SimError::NotLeaf {
        signal: info.name.clone(),
    })
}

/// The [`SignalAccess`] a block runs against.
///
/// Without a buffer, writes land in storage immediately. With one, they are
/// queued and reads keep seeing the pre-commit state.
struct BlockCtx<'a> {
    elab: &'a Elaboration,
    plan: &'a BlockPlan,
    state: &'a mut SimState,
    buffer: Option<&'a mut Vec<(Location, Bits)>>,
}

impl BlockCtx<'_> {
    fn location(&self, signal: SignalId) -> Option<Location> {
        self.elab.signal(signal).and_then(|s| s.location)
    }
}

impl SignalAccess for BlockCtx<'_> {
    fn read(&self, signal: SignalId) -> Result<Bits, BlockError> {
        let loc = match self.location(signal) {
            Some(loc) if self.plan.reads.contains(&signal) => loc,
            _ => {
                return Err(BlockError::UndeclaredRead {
                    signal: self.signal_name(signal),
                })
            }
        };
        Ok(self.state.read(loc)?)
    }

    fn write(&mut self, signal: SignalId, value: Bits) -> Result<(), BlockError> {
        let loc = match self.location(signal) {
            Some(loc) if self.plan.writes.contains(&signal) => loc,
            _ => {
                return Err(BlockError::UndeclaredWrite {
                    signal: self.signal_name(signal),
                })
            }
        };
        if value.width() != loc.range.width() {
            return Err(BlockError::WidthMismatch {
                signal: self.signal_name(signal),
                expected: loc.range.width(),
                actual: value.width(),
            });
        }
        match self.buffer.as_deref_mut() {
            Some(pending) => pending.push((loc, value)),
            None => self.state.write(loc, &value)?,
        }
        Ok(())
    }

    fn width(&self, signal: SignalId) -> Option<u32> {
        self.elab.signal(signal).map(|s| s.width)
    }

    fn signal_name(&self, signal: SignalId) -> String {
        match self.elab.signal(signal) {
            Some(s) => s.name.clone(),
            None => format!("<signal {}>", signal.as_raw()),
        }
    }
}
