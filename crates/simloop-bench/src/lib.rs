//! Benchmark profiles for the simloop scheduler.
//!
//! Provides pre-built loops and registries for the criterion benches:
//!
//! - [`reference_scheduler`]: a basic-clock loop with a mix of every-pass
//!   and slower periodic components, ended by a deadline
//! - [`populated_registry`]: a registry with a realistic spread of
//!   published value types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use simloop_clock::BasicClock;
use simloop_core::{shared, Signal};
use simloop_engine::{Deadline, FnComponent, LoopError, Scheduler};
use simloop_registry::Registry;

/// Loop step size used by [`reference_scheduler`].
pub const REFERENCE_STEP: f64 = 0.001;

/// Build a loop with `components` integrators stepping `passes` times.
///
/// Every fourth integrator runs at a tenth of the loop rate, the rest on
/// every pass. Each integrator accumulates into its own [`Signal`].
pub fn reference_scheduler(
    components: usize,
    passes: u64,
) -> Result<(Scheduler, Vec<Signal<f64>>), LoopError> {
    let mut sched = Scheduler::new();
    sched.set_clock(BasicClock::new(REFERENCE_STEP)?)?;

    let mut outputs = Vec::with_capacity(components);
    for i in 0..components {
        let out = Signal::new(0.0);
        let acc = out.clone();
        let cadence = if i % 4 == 3 {
            REFERENCE_STEP * 10.0
        } else {
            REFERENCE_STEP
        };
        let integrator = FnComponent::new()
            .on_init({
                let acc = out.clone();
                move |_| {
                    acc.set(0.0);
                    Ok(())
                }
            })
            .on_step(move |_, dt| {
                acc.update(|v| *v += dt);
                Ok(())
            })
            .periodic(cadence);
        sched.add_component(shared(integrator))?;
        outputs.push(out);
    }

    let end = (passes.saturating_sub(1)) as f64 * REFERENCE_STEP;
    sched.add_stop_monitor(&shared(Deadline::new(end)))?;
    Ok((sched, outputs))
}

/// Registry with `n` published values cycling through `f64`, `u32`,
/// `bool` and `[f32; 3]`.
pub fn populated_registry(n: usize) -> Arc<Registry> {
    let registry = Arc::new(Registry::new());
    for i in 0..n {
        let name = format!("component{}.value{}", i / 8, i % 8);
        match i % 4 {
            0 => registry.publish(name, &Signal::new(i as f64)),
            1 => registry.publish(name, &Signal::new(i as u32)),
            2 => registry.publish(name, &Signal::new(i % 2 == 0)),
            _ => registry.publish(name, &Signal::new([i as f32; 3])),
        }
    }
    registry
}
