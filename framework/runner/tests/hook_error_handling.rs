use std::sync::Arc;
use flow_probe_core::prelude::VuBailError;
use flow_probe_runner::prelude::{
    HookResult, LoadProfile, ProbeScenarioCli, ReporterOpt, RunnerContext,
    ScenarioDefinitionBuilder, UserValuesConstraint, VuContext, run,
};

#[derive(Default, Debug)]
struct RunnerContextValue {}

impl UserValuesConstraint for RunnerContextValue {}

#[derive(Default, Debug)]
struct VuContextValue {
    value: i32,
}

impl UserValuesConstraint for VuContextValue {}

fn sample_cli_cfg(summary_dir: &tempfile::TempDir, scenario_name: &str) -> ProbeScenarioCli {
    ProbeScenarioCli {
        environment: Some("local".to_string()),
        load_profile: None,
        duration: None,
        soak: false,
        no_progress: true,
        reporter: ReporterOpt::Noop,
        seed: Some(42),
        summary_path: Some(summary_dir.path().join(format!("{}.json", scenario_name))),
        run_id: None,
    }
}

#[test]
fn propagate_error_in_setup_hook() {
    fn setup(_tx: &mut RunnerContext<RunnerContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in setup hook"))
    }

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "propagate_error_in_setup_hook",
        sample_cli_cfg(&dir, "propagate_error_in_setup_hook"),
    )
    .use_load_profile("short", LoadProfile::constant(1, 5))
    .use_setup(setup);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Error in setup hook");
}

#[test]
fn capture_error_in_vu_setup() {
    fn vu_setup(_ctx: &mut VuContext<RunnerContextValue, VuContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in VU setup hook"))
    }

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "capture_error_in_vu_setup",
        sample_cli_cfg(&dir, "capture_error_in_vu_setup"),
    )
    .use_load_profile("short", LoadProfile::constant(1, 1))
    .use_vu_setup(vu_setup);

    let result = run(scenario);

    assert!(result.is_ok());
    // The VU never ran, so it does not count as surviving to the end of the run.
    assert_eq!(0, result.unwrap());
}

#[test]
fn capture_error_in_vu_behaviour_and_continue() {
    fn vu_behaviour(ctx: &mut VuContext<RunnerContextValue, VuContextValue>) -> HookResult {
        if ctx.get().value < 5 {
            ctx.get_mut().value += 1;
        } else {
            // Save time running this test by shutting down once this has run a few times.
            ctx.runner_context().force_stop_scenario();
        }

        Err(anyhow::anyhow!("Error in VU behaviour hook"))
    }

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "capture_error_in_vu_behaviour_and_continue",
        sample_cli_cfg(&dir, "capture_error_in_vu_behaviour_and_continue"),
    )
    .use_load_profile("short", LoadProfile::constant(1, 30))
    .use_vu_behaviour(vu_behaviour);

    let result = run(scenario);

    assert!(result.is_ok());
    assert_eq!(1, result.unwrap());
}

#[test]
fn bail_error_stops_vu_behaviour() {
    fn vu_behaviour(ctx: &mut VuContext<RunnerContextValue, VuContextValue>) -> HookResult {
        if ctx.vu_index() == 0 {
            Err(VuBailError::default().into())
        } else {
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "bail_error_stops_vu_behaviour",
        sample_cli_cfg(&dir, "bail_error_stops_vu_behaviour"),
    )
    .use_load_profile("short", LoadProfile::constant(2, 1))
    .use_vu_behaviour(vu_behaviour);

    let result = run(scenario);

    assert!(result.is_ok());
    assert_eq!(1, result.unwrap());
}

#[test]
fn capture_error_in_vu_teardown() {
    fn vu_teardown(_ctx: &mut VuContext<RunnerContextValue, VuContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in VU teardown hook"))
    }

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "capture_error_in_vu_teardown",
        sample_cli_cfg(&dir, "capture_error_in_vu_teardown"),
    )
    .use_load_profile("short", LoadProfile::constant(1, 1))
    .use_vu_teardown(vu_teardown);

    let result = run(scenario);

    assert!(result.is_ok());
    assert_eq!(1, result.unwrap());
}

#[test]
fn capture_error_in_teardown() {
    fn teardown(_ctx: Arc<RunnerContext<RunnerContextValue>>) -> HookResult {
        Err(anyhow::anyhow!("Error in teardown hook"))
    }

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "capture_error_in_teardown",
        sample_cli_cfg(&dir, "capture_error_in_teardown"),
    )
    .use_load_profile("short", LoadProfile::constant(1, 1))
    .use_teardown(teardown);

    let result = run(scenario);

    assert!(result.is_ok());
}

#[test]
fn run_summary_is_written() {
    fn vu_behaviour(ctx: &mut VuContext<RunnerContextValue, VuContextValue>) -> HookResult {
        ctx.runner_context().reporter().add_iteration(true);
        Ok(())
    }

    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("run_summary_is_written.json");
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, VuContextValue>::new(
        "run_summary_is_written",
        sample_cli_cfg(&dir, "run_summary_is_written"),
    )
    .use_load_profile("short", LoadProfile::constant(1, 1))
    .use_vu_behaviour(vu_behaviour);

    let result = run(scenario);
    assert!(result.is_ok());

    let summary =
        flow_probe_summary_model::load_run_summary(std::fs::File::open(&summary_path).unwrap())
            .unwrap();
    assert_eq!("run_summary_is_written", summary.scenario_name);
    assert_eq!("local", summary.environment);
    assert_eq!("short", summary.load_profile);
    assert_eq!(Some(1), summary.run_duration);
    assert!(summary.iterations > 0);
}
