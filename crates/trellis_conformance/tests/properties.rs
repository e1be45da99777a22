//! Randomized checks of kernel behavior against simple reference models.

use std::sync::Arc;

use proptest::prelude::*;
use trellis_config::{ElaborateConfig, ProjectConfig};
use trellis_conformance::{add_reg, bypass_queue_design};
use trellis_elaborate::elaborate;
use trellis_ir::{BlockSpec, Design, SignalAccess, SignalId};
use trellis_sim::{build, SimKernel};

/// `top.in_` through `depth` registers to `top.out`, with a combinational
/// xor tap `top.tap = in_ ^ out`.
fn delay_line(depth: usize) -> Design {
    let mut d = Design::new("top");
    let top = d.top();
    let input = d.in_port(top, "in_", 8).unwrap();
    let output = d.out_port(top, "out", 8).unwrap();
    let tap = d.out_port(top, "tap", 8).unwrap();
    let regs: Vec<_> = (0..depth)
        .map(|i| add_reg(&mut d, top, &format!("r{i}"), 8).unwrap())
        .collect();
    d.connect(input, regs[0].d).unwrap();
    for pair in regs.windows(2) {
        d.connect(pair[0].q, pair[1].d).unwrap();
    }
    d.connect(regs[depth - 1].q, output).unwrap();
    d.register(
        BlockSpec::combinational(top, "xor", move |io: &mut dyn SignalAccess| {
            let a = io.read_u64(input)?;
            let b = io.read_u64(output)?;
            io.write_u64(tap, a ^ b)
        })
        .reads([input, output])
        .writes([tap]),
    )
    .unwrap();
    d
}

#[derive(Debug, Clone, Copy)]
struct QueueOp {
    enq: Option<u8>,
    deq: bool,
}

fn queue_op() -> impl Strategy<Value = QueueOp> {
    (proptest::option::of(any::<u8>()), any::<bool>()).prop_map(|(enq, deq)| QueueOp { enq, deq })
}

fn lookup(sim: &SimKernel, names: &[&str]) -> Vec<SignalId> {
    names.iter().map(|n| sim.lookup(n).unwrap()).collect()
}

proptest! {
    #[test]
    fn delay_line_outputs_past_inputs(
        depth in 1usize..5,
        inputs in proptest::collection::vec(any::<u8>(), 1..20),
    ) {
        let mut sim = build(&delay_line(depth), &ProjectConfig::named("delay")).unwrap();
        let input = sim.lookup("top.in_").unwrap();
        let output = sim.lookup("top.out").unwrap();
        let tap = sim.lookup("top.tap").unwrap();
        sim.sim_reset().unwrap();
        for (t, &value) in inputs.iter().enumerate() {
            sim.write_u64(input, u64::from(value)).unwrap();
            sim.settle().unwrap();
            let expected = if t >= depth { u64::from(inputs[t - depth]) } else { 0 };
            let out = sim.read_u64(output).unwrap();
            prop_assert_eq!(out, expected);
            prop_assert_eq!(sim.read_u64(tap).unwrap(), u64::from(value) ^ out);
            sim.tick().unwrap();
        }
    }

    #[test]
    fn settle_is_idempotent(
        depth in 1usize..4,
        inputs in proptest::collection::vec(any::<u8>(), 1..10),
    ) {
        let mut sim = build(&delay_line(depth), &ProjectConfig::named("settle")).unwrap();
        let input = sim.lookup("top.in_").unwrap();
        for value in inputs {
            sim.write_u64(input, u64::from(value)).unwrap();
            sim.settle().unwrap();
            let once = sim.state().clone();
            sim.settle().unwrap();
            prop_assert_eq!(sim.state(), &once);
            sim.tick().unwrap();
        }
    }

    #[test]
    fn bypass_queue_matches_model(ops in proptest::collection::vec(queue_op(), 1..40)) {
        let (design, _) = bypass_queue_design(8).unwrap();
        let mut sim = build(&design, &ProjectConfig::named("model")).unwrap();
        sim.sim_reset().unwrap();
        let ids = lookup(
            &sim,
            &["top.enq.en", "top.enq.msg", "top.enq.rdy", "top.deq.en", "top.deq.rdy", "top.deq.ret", "top.count"],
        );
        let (enq_en, enq_msg, enq_rdy, deq_en, deq_rdy, deq_ret, count) =
            (ids[0], ids[1], ids[2], ids[3], ids[4], ids[5], ids[6]);

        let mut held: Option<u8> = None;
        for op in ops {
            // Offer only what the queue reports ready for.
            sim.write_u64(enq_en, 0).unwrap();
            sim.write_u64(deq_en, 0).unwrap();
            sim.settle().unwrap();
            let can_enq = sim.read_u64(enq_rdy).unwrap() == 1;
            prop_assert_eq!(can_enq, held.is_none());

            let enq = op.enq.filter(|_| can_enq);
            sim.write_u64(enq_en, u64::from(enq.is_some())).unwrap();
            sim.write_u64(enq_msg, u64::from(enq.unwrap_or(0))).unwrap();
            sim.settle().unwrap();
            let can_deq = sim.read_u64(deq_rdy).unwrap() == 1;
            prop_assert_eq!(can_deq, held.is_some() || enq.is_some());
            let deq = op.deq && can_deq;
            if deq {
                let front = held.or(enq).map(u64::from);
                prop_assert_eq!(Some(sim.read_u64(deq_ret).unwrap()), front);
            }
            sim.write_u64(deq_en, u64::from(deq)).unwrap();
            sim.tick().unwrap();

            held = match (held, enq, deq) {
                (Some(_), _, true) => None,
                (None, Some(_), true) => None,
                (None, Some(m), false) => Some(m),
                (h, _, _) => h,
            };
            sim.write_u64(enq_en, 0).unwrap();
            sim.write_u64(deq_en, 0).unwrap();
            sim.settle().unwrap();
            prop_assert_eq!(sim.read_u64(count).unwrap(), u64::from(held.is_some()));
        }
    }

    #[test]
    fn kernels_sharing_an_elaboration_are_independent(
        a in proptest::collection::vec(any::<u8>(), 1..8),
        b in proptest::collection::vec(any::<u8>(), 1..8),
    ) {
        let elab = Arc::new(elaborate(&delay_line(1), &ElaborateConfig::default()).unwrap());
        let mut left = SimKernel::new(Arc::clone(&elab));
        let mut right = SimKernel::new(elab);
        let input = left.lookup("top.in_").unwrap();
        let output = left.lookup("top.out").unwrap();
        for &v in &a {
            left.write_u64(input, u64::from(v)).unwrap();
            left.tick().unwrap();
        }
        for &v in &b {
            right.write_u64(input, u64::from(v)).unwrap();
            right.tick().unwrap();
        }
        prop_assert_eq!(left.read_u64(output).unwrap(), u64::from(*a.last().unwrap()));
        prop_assert_eq!(right.read_u64(output).unwrap(), u64::from(*b.last().unwrap()));
        prop_assert_eq!(left.tick_count(), a.len() as u64);
    }
}
