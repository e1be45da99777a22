//! Cycle-level simulation kernel for Trellis designs.
//!
//! The kernel replays the schedule computed by `trellis_elaborate` once per
//! tick: combinational steps settle in order, then sequential blocks commit
//! atomically. Several kernels can share one elaboration, each owning its own
//! storage.
//!
//! # Usage
//!
//! ```ignore
//! use trellis_sim::build;
//!
//! let mut sim = build(&design, &config)?;
//! sim.sim_reset()?;
//! let enq_en = sim.lookup("top.enq.en")?;
//! sim.write_u64(enq_en, 1)?;
//! sim.tick()?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod kernel;
pub mod state;

use std::sync::Arc;

use trellis_config::ProjectConfig;
use trellis_elaborate::elaborate;
use trellis_ir::Design;

pub use error::SimError;
pub use kernel::SimKernel;
pub use state::SimState;

/// Elaborates `design` and wraps the result in a kernel configured from `config`.
pub fn build(design: &Design, config: &ProjectConfig) -> Result<SimKernel, SimError> {
    let elab = elaborate(design, &config.elaborate)?;
    Ok(SimKernel::with_config(Arc::new(elab), config.simulation))
}
