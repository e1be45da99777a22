//! Fixture components and helpers for end-to-end kernel tests.
//!
//! The fixtures are small but complete designs built through the public
//! `Design` API: plain, enabled and resettable registers, a one-entry bypass
//! queue, and a message source and sink that talk to it through method ports.
//! Integration tests under `tests/` elaborate and simulate them.

#![warn(missing_docs)]

use std::sync::{Arc, Mutex};

use trellis_common::Bits;
use trellis_config::{load_config_from_str, ConfigError, ProjectConfig};
use trellis_ir::{
    BlockError, BlockId, BlockSpec, ComponentId, ConstraintSide, Design, DesignError, MethodId,
    MethodRole, SignalAccess, SignalId,
};

/// Parses a configuration for a conformance project, with optional extra
/// TOML sections appended after `[project]`.
pub fn make_config(name: &str, extra: &str) -> Result<ProjectConfig, ConfigError> {
    let toml_str = format!(
        r#"
[project]
name = "{name}"
description = "conformance fixture"

{extra}
"#
    );
    load_config_from_str(&toml_str)
}

// ---------------------------------------------------------------
// Registers
// ---------------------------------------------------------------

/// Handles to a register component.
#[derive(Debug, Clone, Copy)]
pub struct RegPorts {
    /// The register component.
    pub component: ComponentId,
    /// Next-value input.
    pub d: SignalId,
    /// Current-value output.
    pub q: SignalId,
    /// Write enable, for enabled registers.
    pub en: Option<SignalId>,
    /// The sequential update block.
    pub block: BlockId,
}

/// Adds a register that loads `d` every tick and resets to zero.
pub fn add_reg(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
) -> Result<RegPorts, DesignError> {
    build_reg(design, parent, name, width, false, None)
}

/// Adds a register that loads `d` only while `en` is high.
pub fn add_reg_en(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
) -> Result<RegPorts, DesignError> {
    build_reg(design, parent, name, width, true, None)
}

/// Adds a register that resets to `reset_value`.
pub fn add_reg_rst(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
    reset_value: u64,
) -> Result<RegPorts, DesignError> {
    build_reg(design, parent, name, width, false, Some(reset_value))
}

fn build_reg(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
    with_en: bool,
    reset_value: Option<u64>,
) -> Result<RegPorts, DesignError> {
    let component = design.add_component(parent, name)?;
    let d = design.in_port(component, "d", width)?;
    let q = design.out_port(component, "q", width)?;
    let en = if with_en {
        Some(design.in_port(component, "en", 1)?)
    } else {
        None
    };
    let mut spec = BlockSpec::sequential(component, "up", move |io: &mut dyn SignalAccess| {
        if let Some(en) = en {
            if !io.read_bool(en)? {
                return Ok(());
            }
        }
        let value = io.read(d)?;
        io.write(q, value)
    })
    .reads([d])
    .reads(en)
    .writes([q]);
    if let Some(value) = reset_value {
        spec = spec.reset_value(q, Bits::from_u64(value, width));
    }
    let block = design.register(spec)?;
    Ok(RegPorts {
        component,
        d,
        q,
        en,
        block,
    })
}

/// Builds `top` holding two resettable registers whose outputs feed each
/// other's inputs, exposed as `top.a` and `top.b`.
pub fn swap_design(width: u32, a_reset: u64, b_reset: u64) -> Result<Design, DesignError> {
    let mut d = Design::new("top");
    let top = d.top();
    let a = d.out_port(top, "a", width)?;
    let b = d.out_port(top, "b", width)?;
    let ra = add_reg_rst(&mut d, top, "ra", width, a_reset)?;
    let rb = add_reg_rst(&mut d, top, "rb", width, b_reset)?;
    d.connect(ra.d, rb.q)?;
    d.connect(rb.d, ra.q)?;
    d.connect(a, ra.q)?;
    d.connect(b, rb.q)?;
    Ok(d)
}

// ---------------------------------------------------------------
// One-entry bypass queue
// ---------------------------------------------------------------

/// Handles to a one-entry bypass queue.
#[derive(Debug, Clone, Copy)]
pub struct BypassQueuePorts {
    /// The queue component.
    pub component: ComponentId,
    /// Callee method taking a `width`-bit message.
    pub enq: MethodId,
    /// Callee method returning a `width`-bit message.
    pub deq: MethodId,
    /// 1-bit occupancy output.
    pub count: SignalId,
    /// Computes `enq.rdy`.
    pub enq_rdy: BlockId,
    /// Computes `deq.rdy`.
    pub deq_rdy: BlockId,
    /// Computes `deq.ret`.
    pub deq_ret: BlockId,
    /// The sequential state block.
    pub ff: BlockId,
}

/// Adds a one-entry bypass queue.
///
/// A message enqueued into an empty queue can be dequeued in the same tick.
/// Otherwise it is held until dequeued. Enqueue is ready only while empty.
pub fn add_bypass_queue(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
) -> Result<BypassQueuePorts, DesignError> {
    let component = design.add_component(parent, name)?;
    let msg_ty = design.bits_type(width);
    let enq_id = design.add_method(component, "enq", MethodRole::Callee, Some(msg_ty), None)?;
    let deq_id = design.add_method(component, "deq", MethodRole::Callee, None, Some(msg_ty))?;
    let count = design.out_port(component, "count", 1)?;
    let full = design.wire(component, "full", 1)?;
    let entry = design.wire(component, "entry", width)?;
    design.connect(count, full)?;
    let reset = design.component(component).reset;
    let enq = *design.method(enq_id);
    let deq = *design.method(deq_id);
    let (enq_msg, deq_ret) = match (enq.msg, deq.ret) {
        (Some(m), Some(r)) => (m, r),
        _ => {
            return Err(DesignError::InvalidConnection {
                reason: "queue methods lack payload signals".to_string(),
            })
        }
    };

    let enq_rdy = design.register(
        BlockSpec::combinational(component, "enq_rdy", move |io: &mut dyn SignalAccess| {
            let ready = !io.read_bool(reset)? && !io.read_bool(full)?;
            io.write_bool(enq.rdy, ready)
        })
        .reads([reset, full])
        .writes([enq.rdy]),
    )?;

    let deq_rdy = design.register(
        BlockSpec::combinational(component, "deq_rdy", move |io: &mut dyn SignalAccess| {
            let ready =
                !io.read_bool(reset)? && (io.read_bool(full)? || io.read_bool(enq.en)?);
            io.write_bool(deq.rdy, ready)
        })
        .reads([reset, full, enq.en])
        .writes([deq.rdy]),
    )?;

    // Bypass path: an empty queue forwards the incoming message.
    let deq_ret_block = design.register(
        BlockSpec::combinational(component, "deq_ret", move |io: &mut dyn SignalAccess| {
            let out = if io.read_bool(full)? {
                io.read(entry)?
            } else {
                io.read(enq_msg)?
            };
            io.write(deq_ret, out)
        })
        .reads([full, entry, enq_msg])
        .writes([deq_ret]),
    )?;

    let ff = design.register(
        BlockSpec::sequential(component, "ff", move |io: &mut dyn SignalAccess| {
            let enq_en = io.read_bool(enq.en)?;
            let deq_en = io.read_bool(deq.en)?;
            let is_full = io.read_bool(full)?;
            io.write_bool(full, !deq_en && (enq_en || is_full))?;
            if enq_en && !deq_en {
                let msg = io.read(enq_msg)?;
                io.write(entry, msg)?;
            }
            Ok(())
        })
        .reads([enq.en, deq.en, enq_msg, full])
        .writes([full, entry]),
    )?;

    Ok(BypassQueuePorts {
        component,
        enq: enq_id,
        deq: deq_id,
        count,
        enq_rdy,
        deq_rdy,
        deq_ret: deq_ret_block,
        ff,
    })
}

/// Builds `top` exposing a bypass queue's methods and count at the boundary,
/// as `top.enq.*`, `top.deq.*` and `top.count`.
pub fn bypass_queue_design(width: u32) -> Result<(Design, BypassQueuePorts), DesignError> {
    let mut d = Design::new("top");
    let top = d.top();
    let msg_ty = d.bits_type(width);
    let enq = d.add_method(top, "enq", MethodRole::Callee, Some(msg_ty), None)?;
    let deq = d.add_method(top, "deq", MethodRole::Callee, None, Some(msg_ty))?;
    let count = d.out_port(top, "count", 1)?;
    let q = add_bypass_queue(&mut d, top, "q", width)?;
    d.connect_methods(enq, q.enq)?;
    d.connect_methods(deq, q.deq)?;
    d.connect(count, q.count)?;
    Ok((d, q))
}

// ---------------------------------------------------------------
// Source and sink
// ---------------------------------------------------------------

/// Messages observed by a sink, shared with the test.
pub type Received = Arc<Mutex<Vec<u64>>>;

/// Handles to a test source.
#[derive(Debug, Clone, Copy)]
pub struct SourcePorts {
    /// The source component.
    pub component: ComponentId,
    /// Caller method sending one message per call.
    pub send: MethodId,
    /// High once every message has been sent.
    pub done: SignalId,
    /// The block issuing calls.
    pub up_src: BlockId,
}

/// Adds a source that sends `msgs` in order, one per tick while the
/// downstream method is ready.
pub fn add_test_source(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
    msgs: Vec<u64>,
) -> Result<SourcePorts, DesignError> {
    let component = design.add_component(parent, name)?;
    let msg_ty = design.bits_type(width);
    let send_id = design.add_method(component, "send", MethodRole::Caller, Some(msg_ty), None)?;
    let send = *design.method(send_id);
    let done = design.out_port(component, "done", 1)?;
    let index = design.wire(component, "index", 32)?;
    let total = msgs.len() as u64;

    let status = design.register(
        BlockSpec::combinational(component, "status", move |io: &mut dyn SignalAccess| {
            let sent = io.read_u64(index)?;
            io.write_bool(done, sent >= total)
        })
        .reads([index])
        .writes([done]),
    )?;

    let up_src = design.register(
        BlockSpec::combinational(component, "up_src", move |io: &mut dyn SignalAccess| {
            let sent = io.read_u64(index)? as usize;
            let ready = io.read_bool(send.rdy)?;
            match msgs.get(sent) {
                Some(&msg) if ready => {
                    io.call(&send, Some(Bits::from_u64(msg, width)))?;
                }
                _ => io.idle(&send)?,
            }
            Ok(())
        })
        .reads([index])
        .calls(send_id),
    )?;

    design.register(
        BlockSpec::sequential(component, "advance", move |io: &mut dyn SignalAccess| {
            if io.read_bool(send.en)? {
                let sent = io.read_u64(index)?;
                io.write_u64(index, sent + 1)?;
            }
            Ok(())
        })
        .reads([send.en, index])
        .writes([index]),
    )?;

    // Status is computed before any block issues a call on `send`.
    design.add_constraint(ConstraintSide::Block(status), ConstraintSide::Call(send_id))?;

    Ok(SourcePorts {
        component,
        send: send_id,
        done,
        up_src,
    })
}

/// Handles to a test sink.
#[derive(Debug, Clone)]
pub struct SinkPorts {
    /// The sink component.
    pub component: ComponentId,
    /// Caller method returning one message per call.
    pub recv: MethodId,
    /// Every message received so far, in order.
    pub received: Received,
}

/// Adds a sink that takes a message every tick one is ready.
pub fn add_test_sink(
    design: &mut Design,
    parent: ComponentId,
    name: &str,
    width: u32,
) -> Result<SinkPorts, DesignError> {
    let component = design.add_component(parent, name)?;
    let msg_ty = design.bits_type(width);
    let recv_id = design.add_method(component, "recv", MethodRole::Caller, None, Some(msg_ty))?;
    let recv = *design.method(recv_id);
    let ret = recv.ret.ok_or_else(|| DesignError::InvalidConnection {
        reason: "sink method lacks a return value".to_string(),
    })?;
    let received: Received = Arc::default();

    design.register(
        BlockSpec::combinational(component, "take", move |io: &mut dyn SignalAccess| {
            if io.read_bool(recv.rdy)? {
                io.call(&recv, None)?;
            } else {
                io.idle(&recv)?;
            }
            Ok(())
        })
        .calls(recv_id),
    )?;

    let log = Arc::clone(&received);
    design.register(
        BlockSpec::sequential(component, "record", move |io: &mut dyn SignalAccess| {
            if io.read_bool(recv.en)? {
                let value = io.read_u64(ret)?;
                log.lock()
                    .map_err(|_| BlockError::Logic("received log poisoned".to_string()))?
                    .push(value);
            }
            Ok(())
        })
        .reads([recv.en, ret]),
    )?;

    Ok(SinkPorts {
        component,
        recv: recv_id,
        received,
    })
}

/// Handles to a source → bypass queue → sink pipeline.
#[derive(Debug, Clone)]
pub struct PipelinePorts {
    /// The source.
    pub src: SourcePorts,
    /// The queue.
    pub queue: BypassQueuePorts,
    /// The sink.
    pub sink: SinkPorts,
}

/// Builds `top` with a source feeding a bypass queue drained by a sink.
pub fn pipeline_design(width: u32, msgs: Vec<u64>) -> Result<(Design, PipelinePorts), DesignError> {
    let mut d = Design::new("top");
    let top = d.top();
    let src = add_test_source(&mut d, top, "src", width, msgs)?;
    let queue = add_bypass_queue(&mut d, top, "q", width)?;
    let sink = add_test_sink(&mut d, top, "sink", width)?;
    d.connect_methods(src.send, queue.enq)?;
    d.connect_methods(queue.deq, sink.recv)?;
    Ok((d, PipelinePorts { src, queue, sink }))
}
