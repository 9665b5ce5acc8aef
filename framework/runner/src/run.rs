use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::ReporterOpt;
use crate::context::{RunnerContext, UserValuesConstraint, VuContext};
use crate::definition::{ScenarioDefinition, ScenarioDefinitionBuilder};
use crate::executor::Executor;
use crate::monitor::start_monitor;
use crate::pacer::start_pacer;
use crate::progress::start_progress;
use crate::shutdown::start_shutdown_listener;
use flow_probe_core::prelude::{ShutdownHandle, ShutdownSignalError, VuBailError};
use flow_probe_instruments::{ReportConfig, Reporter, RunStats};
use flow_probe_summary_model::{
    write_run_summary, CheckSummary, OperationSummary, RunSummary, ThresholdSummary,
};

/// Run a scenario to completion.
///
/// Returns the number of VUs that were still running when the load profile expired. VUs that
/// failed their setup or bailed are not counted.
pub fn run<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: ScenarioDefinitionBuilder<RV, V>,
) -> anyhow::Result<usize> {
    let definition = definition.build()?;

    log::info!(
        "Running scenario [{}] against the [{}] environment with load profile [{}]",
        definition.name,
        definition.environment,
        definition.profile_name
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime)?;

    let reporter = Arc::new(build_reporter(
        definition.reporter,
        &runtime,
        &shutdown_handle,
    )?);
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.clone()));

    let mut runner_context = RunnerContext::new(
        executor,
        reporter.clone(),
        shutdown_handle.clone(),
        definition.environment.clone(),
    );

    if let Some(setup_fn) = &definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    let planned = definition.planned_duration();
    if let Some(planned) = planned {
        if !definition.no_progress {
            start_progress(planned, shutdown_handle.new_listener());
        }
    }

    // Ready to start spawning VUs, so start the resource monitor to flag high usage by the probe
    // itself which might make the measurements misleading.
    start_monitor(shutdown_handle.new_listener());

    let active_target = Arc::new(AtomicUsize::new(0));
    start_pacer(
        definition.profile.clone(),
        planned,
        active_target.clone(),
        shutdown_handle.clone(),
        shutdown_handle.new_listener(),
    );

    let started_at = chrono::Utc::now().timestamp();
    let base_seed = definition.seed.unwrap_or_else(rand::random);
    log::debug!("Using base seed {}", base_seed);

    let runner_context = Arc::new(runner_context);
    let runner_context_for_teardown = runner_context.clone();

    let vu_count = definition.profile.max_vus();
    let mut handles = Vec::new();
    for vu_index in 0..vu_count {
        // Read access to the runner context for each VU
        let runner_context = runner_context.clone();

        let setup_vu_fn = definition.setup_vu_fn;
        let vu_behaviour_fn = definition.vu_behaviour;
        let teardown_vu_fn = definition.teardown_vu_fn;
        let active_target = active_target.clone();

        // For us to check whether the VU should stop between iterations
        let mut cycle_shutdown_receiver = shutdown_handle.new_listener();

        let vu_id = format!("vu-{}", vu_index);

        handles.push(
            std::thread::Builder::new()
                .name(vu_id.clone())
                .spawn(move || {
                    let rng = StdRng::seed_from_u64(base_seed.wrapping_add(vu_index as u64));
                    let mut context = VuContext::new(vu_id.clone(), vu_index, runner_context, rng);
                    if let Some(setup_vu_fn) = setup_vu_fn {
                        if let Err(e) = setup_vu_fn(&mut context) {
                            log::error!("VU setup failed for {}: {:?}", vu_id, e);
                            return false;
                        }
                    }

                    let mut bailed = false;
                    if let Some(behaviour) = vu_behaviour_fn {
                        loop {
                            if cycle_shutdown_receiver.should_shutdown() {
                                log::debug!("Stopping {}", vu_id);
                                break;
                            }

                            if vu_index >= active_target.load(Ordering::SeqCst) {
                                // Not admitted by the load profile yet, or ramped back down.
                                std::thread::sleep(std::time::Duration::from_millis(100));
                                continue;
                            }

                            match behaviour(&mut context) {
                                Ok(()) => {}
                                Err(e) if e.is::<ShutdownSignalError>() => {
                                    // Expected when the run ends mid-iteration. The check at the
                                    // top of the loop will catch this and break out.
                                }
                                Err(e) if e.is::<VuBailError>() => {
                                    log::info!("{} is bailing", vu_id);
                                    bailed = true;
                                    break;
                                }
                                Err(e) => {
                                    log::error!("VU behaviour failed for {}: {:?}", vu_id, e);
                                }
                            }
                        }
                    }

                    if let Some(teardown_vu_fn) = teardown_vu_fn {
                        if let Err(e) = teardown_vu_fn(&mut context) {
                            log::error!("VU teardown failed for {}: {:?}", vu_id, e);
                        }
                    }

                    !bailed
                })
                .expect("Failed to spawn thread for virtual user"),
        );
    }

    let mut vu_end_count = 0;
    for handle in handles {
        let completed = handle
            .join()
            .map_err(|e| anyhow::anyhow!("Error joining thread for virtual user: {:?}", e))?;
        if completed {
            vu_end_count += 1;
        }
    }

    if let Some(teardown_fn) = definition.teardown_fn {
        // Don't crash the runner if the teardown fails. We still want the reporting and the run
        // summary to happen. The hook is documented as 'best effort'.
        if let Err(e) = teardown_fn(runner_context_for_teardown.clone()) {
            log::error!("Teardown failed: {:?}", e);
        }
    }

    let stats = reporter.finalize();

    let summary = build_summary(&definition, &stats, started_at, vu_count, vu_end_count);
    for threshold in &summary.thresholds {
        if threshold.passed {
            log::info!(
                "Threshold passed: {} (observed {:.2})",
                threshold.description,
                threshold.observed
            );
        } else {
            log::warn!(
                "Threshold FAILED: {} (observed {:.2})",
                threshold.description,
                threshold.observed
            );
        }
    }

    write_run_summary(&summary, &definition.summary_path).with_context(|| {
        format!(
            "Failed to write run summary to {}",
            definition.summary_path.display()
        )
    })?;
    log::info!(
        "Run summary written to {} (config fingerprint [{}])",
        definition.summary_path.display(),
        summary.fingerprint()
    );

    Ok(vu_end_count)
}

fn build_reporter(
    opt: ReporterOpt,
    runtime: &tokio::runtime::Runtime,
    shutdown_handle: &ShutdownHandle,
) -> anyhow::Result<Reporter> {
    Ok(match opt {
        ReporterOpt::Summary => ReportConfig::default().enable_summary().init(),
        ReporterOpt::Influx => ReportConfig::default()
            .enable_influx(runtime, shutdown_handle.new_listener())?
            .init(),
        ReporterOpt::Noop => ReportConfig::default().init(),
    })
}

fn build_summary<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: &ScenarioDefinition<RV, V>,
    stats: &RunStats,
    started_at: i64,
    vu_count: usize,
    vu_end_count: usize,
) -> RunSummary {
    RunSummary {
        run_id: definition.run_id.clone(),
        scenario_name: definition.name.clone(),
        environment: definition.environment.clone(),
        load_profile: definition.profile_name.clone(),
        started_at,
        run_duration: definition.planned_duration().map(|d| d.as_secs()),
        vu_count,
        vu_end_count,
        iterations: stats.iterations,
        iteration_error_rate: stats.iteration_error_rate(),
        request_count: stats.request_count,
        request_failure_rate: stats.request_failure_rate(),
        request_duration_p95_ms: stats.request_duration_p95_ms,
        operations: stats
            .operations
            .iter()
            .map(|(operation_id, op)| {
                (
                    operation_id.clone(),
                    OperationSummary {
                        count: op.count,
                        error_count: op.error_count,
                        mean_ms: op.mean_ms,
                        min_ms: op.min_ms,
                        max_ms: op.max_ms,
                        p95_ms: op.p95_ms,
                    },
                )
            })
            .collect(),
        checks: stats
            .checks
            .iter()
            .map(|(name, check)| {
                (
                    name.clone(),
                    CheckSummary {
                        passes: check.passes,
                        fails: check.fails,
                    },
                )
            })
            .collect(),
        thresholds: definition
            .thresholds
            .iter()
            .map(|threshold| {
                let outcome = threshold.evaluate(stats);
                ThresholdSummary {
                    description: outcome.description,
                    observed: outcome.observed,
                    passed: outcome.passed,
                }
            })
            .collect(),
        probe_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
