use std::{fmt::Debug, sync::Arc};

use rand::rngs::StdRng;

use crate::executor::Executor;
use flow_probe_core::prelude::ShutdownHandle;
use flow_probe_instruments::Reporter;

pub trait UserValuesConstraint: Default + Debug + Send + Sync + 'static {}

impl UserValuesConstraint for () {}

/// Context shared by the whole run. Global hooks get mutable access during setup; VU hooks see it
/// read-only through their [VuContext].
pub struct RunnerContext<RV: UserValuesConstraint> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
    environment: String,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
        environment: String,
    ) -> Self {
        Self {
            executor,
            reporter,
            shutdown_handle,
            environment,
            value: Default::default(),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    /// The environment name this run targets, as resolved from the CLI or the `ENVIRONMENT`
    /// variable.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// End the whole run early. Every VU stops at its next iteration boundary and in-flight
    /// operations are cancelled.
    pub fn force_stop_scenario(&self) {
        self.shutdown_handle.shutdown();
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}

/// Per-VU context handed to the VU setup, behaviour and teardown hooks.
pub struct VuContext<RV: UserValuesConstraint, V: UserValuesConstraint> {
    vu_id: String,
    vu_index: usize,
    runner_context: Arc<RunnerContext<RV>>,
    rng: StdRng,
    value: V,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> VuContext<RV, V> {
    pub(crate) fn new(
        vu_id: String,
        vu_index: usize,
        runner_context: Arc<RunnerContext<RV>>,
        rng: StdRng,
    ) -> Self {
        Self {
            vu_id,
            vu_index,
            runner_context,
            rng,
            value: Default::default(),
        }
    }

    pub fn vu_id(&self) -> &str {
        &self.vu_id
    }

    pub fn vu_index(&self) -> usize {
        self.vu_index
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext<RV>> {
        &self.runner_context
    }

    /// This VU's random source, seeded from the run's base seed and the VU index so that
    /// randomized branching is reproducible.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn get(&self) -> &V {
        &self.value
    }
}
