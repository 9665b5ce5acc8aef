use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{ProbeScenarioCli, ReporterOpt};
use crate::context::{RunnerContext, UserValuesConstraint, VuContext};
use crate::load::LoadProfile;
use flow_probe_instruments::Threshold;

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type GlobalHook<RV> = fn(Arc<RunnerContext<RV>>) -> HookResult;
pub type VuHookMut<RV, V> = fn(&mut VuContext<RV, V>) -> HookResult;

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario binary to define what the run looks like: the
/// load profiles it offers, the thresholds it is judged against, and its hooks.
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint, V: UserValuesConstraint> {
    /// The name of the scenario, which should be unique within the suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    cli: ProbeScenarioCli,
    /// Named load profiles, in registration order. The CLI selects one by name; the first is the
    /// default.
    load_profiles: Vec<(String, LoadProfile)>,
    thresholds: Vec<Threshold>,
    /// Global setup hook, run once before any VUs start.
    setup_fn: Option<GlobalHookMut<RV>>,
    /// Per-VU setup hook, run once as each VU thread starts.
    setup_vu_fn: Option<VuHookMut<RV, V>>,
    /// The behaviour every VU loops while it is admitted by the load profile.
    vu_behaviour: Option<VuHookMut<RV, V>>,
    /// Per-VU teardown hook, best effort.
    teardown_vu_fn: Option<VuHookMut<RV, V>>,
    /// Global teardown hook, best effort, run after all VUs have stopped.
    teardown_fn: Option<GlobalHook<RV>>,
}

pub(crate) struct ScenarioDefinition<RV: UserValuesConstraint, V: UserValuesConstraint> {
    pub name: String,
    pub environment: String,
    pub profile_name: String,
    pub profile: LoadProfile,
    pub thresholds: Vec<Threshold>,
    pub soak: bool,
    pub no_progress: bool,
    pub reporter: ReporterOpt,
    pub seed: Option<u64>,
    pub summary_path: PathBuf,
    pub run_id: String,
    pub duration_cap: Option<Duration>,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub setup_vu_fn: Option<VuHookMut<RV, V>>,
    pub vu_behaviour: Option<VuHookMut<RV, V>>,
    pub teardown_vu_fn: Option<VuHookMut<RV, V>>,
    pub teardown_fn: Option<GlobalHook<RV>>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinition<RV, V> {
    /// The planned wall-clock length of the run, or `None` for a soak run.
    pub fn planned_duration(&self) -> Option<Duration> {
        if self.soak {
            return None;
        }
        let total = self.profile.total_duration();
        Some(match self.duration_cap {
            Some(cap) => cap.min(total),
            None => total,
        })
    }
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinitionBuilder<RV, V> {
    /// Initialise a new scenario definition from the scenario name and parsed command line
    /// arguments.
    pub fn new(name: &str, cli: ProbeScenarioCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            load_profiles: Vec::new(),
            thresholds: Vec::new(),
            setup_fn: None,
            setup_vu_fn: None,
            vu_behaviour: None,
            teardown_vu_fn: None,
            teardown_fn: None,
        }
    }

    /// Initialise a new scenario definition, parsing the command line and setting up logging.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, crate::init::init())
    }

    /// Register a named load profile. The first registered profile is the default.
    pub fn use_load_profile(mut self, name: &str, profile: LoadProfile) -> Self {
        if self.load_profiles.iter().any(|(n, _)| n == name) {
            panic!("Load profile [{}] is already defined", name);
        }
        self.load_profiles.push((name.to_string(), profile));
        self
    }

    /// Add an aggregate threshold, evaluated once at the end of the run.
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    /// Set the global setup hook [ScenarioDefinitionBuilder::setup_fn].
    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the per-VU setup hook [ScenarioDefinitionBuilder::setup_vu_fn].
    pub fn use_vu_setup(mut self, setup_vu_fn: VuHookMut<RV, V>) -> Self {
        self.setup_vu_fn = Some(setup_vu_fn);
        self
    }

    /// Set the VU behaviour hook [ScenarioDefinitionBuilder::vu_behaviour].
    pub fn use_vu_behaviour(mut self, behaviour: VuHookMut<RV, V>) -> Self {
        self.vu_behaviour = Some(behaviour);
        self
    }

    /// Set the per-VU teardown hook [ScenarioDefinitionBuilder::teardown_vu_fn].
    pub fn use_vu_teardown(mut self, teardown_vu_fn: VuHookMut<RV, V>) -> Self {
        self.teardown_vu_fn = Some(teardown_vu_fn);
        self
    }

    /// Set the global teardown hook [ScenarioDefinitionBuilder::teardown_fn].
    pub fn use_teardown(mut self, teardown_fn: GlobalHook<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV, V>> {
        let environment = self
            .cli
            .environment
            .or_else(|| std::env::var("ENVIRONMENT").ok())
            .unwrap_or_else(|| "local".to_string());

        if self.load_profiles.is_empty() {
            anyhow::bail!(
                "Scenario [{}] does not define any load profiles",
                self.name
            );
        }

        let (profile_name, profile) = match &self.cli.load_profile {
            Some(requested) => self
                .load_profiles
                .iter()
                .find(|(name, _)| name == requested)
                .cloned()
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown load profile [{}], scenario [{}] defines: {}",
                        requested,
                        self.name,
                        self.load_profiles
                            .iter()
                            .map(|(name, _)| name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })?,
            None => self.load_profiles[0].clone(),
        };

        let summary_path = self.cli.summary_path.unwrap_or_else(|| {
            PathBuf::from(format!(
                "results/{}-test-results-{}.json",
                self.name, environment
            ))
        });

        let run_id = self.cli.run_id.unwrap_or_else(|| nanoid::nanoid!());

        Ok(ScenarioDefinition {
            name: self.name,
            environment,
            profile_name,
            profile,
            thresholds: self.thresholds,
            soak: self.cli.soak,
            no_progress: self.cli.no_progress,
            reporter: self.cli.reporter,
            seed: self.cli.seed,
            summary_path,
            run_id,
            duration_cap: self.cli.duration.map(Duration::from_secs),
            setup_fn: self.setup_fn,
            setup_vu_fn: self.setup_vu_fn,
            vu_behaviour: self.vu_behaviour,
            teardown_vu_fn: self.teardown_vu_fn,
            teardown_fn: self.teardown_fn,
        })
    }
}
