//! Register fixtures: load, enable, reset values, and commit atomicity.

use std::sync::Arc;

use trellis_common::Bits;
use trellis_config::ElaborateConfig;
use trellis_conformance::{add_reg, add_reg_en, add_reg_rst, swap_design};
use trellis_elaborate::elaborate;
use trellis_ir::Design;
use trellis_sim::SimKernel;

fn kernel(design: &Design) -> SimKernel {
    SimKernel::new(Arc::new(
        elaborate(design, &ElaborateConfig::default()).unwrap(),
    ))
}

/// `top.in_` -> reg -> `top.out`, with an optional enable at `top.en`.
fn wrapped(enable: bool) -> Design {
    let mut d = Design::new("top");
    let top = d.top();
    let input = d.in_port(top, "in_", 16).unwrap();
    let output = d.out_port(top, "out", 16).unwrap();
    let reg = if enable {
        add_reg_en(&mut d, top, "reg", 16).unwrap()
    } else {
        add_reg(&mut d, top, "reg", 16).unwrap()
    };
    d.connect(input, reg.d).unwrap();
    d.connect(output, reg.q).unwrap();
    if let Some(en) = reg.en {
        let top_en = d.in_port(top, "en", 1).unwrap();
        d.connect(top_en, en).unwrap();
    }
    d
}

#[test]
fn reg_delays_by_one_tick() {
    let d = wrapped(false);
    let mut sim = kernel(&d);
    let input = sim.lookup("top.in_").unwrap();
    let output = sim.lookup("top.out").unwrap();
    sim.sim_reset().unwrap();
    for value in [0xa, 0xb, 0xc] {
        sim.write_u64(input, value).unwrap();
        sim.settle().unwrap();
        let before = sim.read_u64(output).unwrap();
        sim.tick().unwrap();
        assert_ne!(before, value);
        assert_eq!(sim.read_u64(output).unwrap(), value);
    }
}

#[test]
fn reg_en_holds_when_disabled() {
    let d = wrapped(true);
    let mut sim = kernel(&d);
    let input = sim.lookup("top.in_").unwrap();
    let output = sim.lookup("top.out").unwrap();
    let en = sim.lookup("top.en").unwrap();
    sim.sim_reset().unwrap();

    sim.write_u64(en, 1).unwrap();
    sim.write_u64(input, 0x1234).unwrap();
    sim.tick().unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0x1234);

    sim.write_u64(en, 0).unwrap();
    sim.write_u64(input, 0x5678).unwrap();
    sim.run(3).unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0x1234);
}

#[test]
fn reset_values_apply_while_reset_is_high() {
    let mut d = Design::new("top");
    let top = d.top();
    let output = d.out_port(top, "out", 8).unwrap();
    let input = d.in_port(top, "in_", 8).unwrap();
    let reg = add_reg_rst(&mut d, top, "reg", 8, 0x5a).unwrap();
    d.connect(input, reg.d).unwrap();
    d.connect(output, reg.q).unwrap();
    let mut sim = kernel(&d);
    let reset = sim.lookup("top.reset").unwrap();

    sim.write_u64(input, 0x11).unwrap();
    sim.tick().unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0x11);

    sim.write_u64(reset, 1).unwrap();
    sim.tick().unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0x5a);
    sim.tick().unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0x5a);

    sim.write_u64(reset, 0).unwrap();
    sim.tick().unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0x11);
}

#[test]
fn swap_is_atomic() {
    let d = swap_design(8, 1, 2).unwrap();
    let mut sim = kernel(&d);
    let a = sim.lookup("top.a").unwrap();
    let b = sim.lookup("top.b").unwrap();
    sim.sim_reset().unwrap();
    assert_eq!((sim.read_u64(a).unwrap(), sim.read_u64(b).unwrap()), (1, 2));
    sim.tick().unwrap();
    assert_eq!((sim.read_u64(a).unwrap(), sim.read_u64(b).unwrap()), (2, 1));
    sim.tick().unwrap();
    assert_eq!((sim.read_u64(a).unwrap(), sim.read_u64(b).unwrap()), (1, 2));
}

#[test]
fn register_chain_shifts() {
    let mut d = Design::new("top");
    let top = d.top();
    let input = d.in_port(top, "in_", 4).unwrap();
    let output = d.out_port(top, "out", 4).unwrap();
    let regs: Vec<_> = (0..3)
        .map(|i| add_reg(&mut d, top, &format!("r{i}"), 4).unwrap())
        .collect();
    d.connect(input, regs[0].d).unwrap();
    for pair in regs.windows(2) {
        d.connect(pair[0].q, pair[1].d).unwrap();
    }
    d.connect(output, regs[2].q).unwrap();
    let mut sim = kernel(&d);
    sim.write(input, Bits::from_u64(7, 4)).unwrap();
    sim.run(2).unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 0);
    sim.tick().unwrap();
    assert_eq!(sim.read_u64(output).unwrap(), 7);
}
