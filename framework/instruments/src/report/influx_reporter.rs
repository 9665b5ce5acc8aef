use std::time::SystemTime;

use anyhow::Context;
use influxdb::{Client, InfluxDbWriteable, Timestamp, WriteQuery};
use tokio::runtime::Runtime;
use tokio::select;
use tokio::sync::mpsc::UnboundedSender;

use crate::report::ReportCollector;
use crate::OperationRecord;
use flow_probe_core::prelude::DelegatedShutdownListener;

/// Streams measurements to InfluxDB, the external metrics sink for longer or distributed runs.
///
/// Records are queued on an unbounded channel and written by a background task so that VU
/// iterations never wait on the sink. The task drains the queue on shutdown.
pub struct InfluxReporter {
    writer: UnboundedSender<WriteQuery>,
}

impl InfluxReporter {
    pub fn new(
        runtime: &Runtime,
        shutdown_listener: DelegatedShutdownListener,
    ) -> anyhow::Result<Self> {
        let client = Client::new(
            std::env::var("INFLUX_HOST").context(
                "Cannot configure the influx reporter without environment variable `INFLUX_HOST`",
            )?,
            std::env::var("INFLUX_BUCKET").context(
                "Cannot configure the influx reporter without environment variable `INFLUX_BUCKET`",
            )?,
        )
        .with_token(std::env::var("INFLUX_TOKEN").context(
            "Cannot configure the influx reporter without environment variable `INFLUX_TOKEN`",
        )?);

        let writer = start_write_task(runtime, shutdown_listener, client);

        Ok(Self { writer })
    }

    fn send(&self, query: WriteQuery) {
        if let Err(e) = self.writer.send(query) {
            log::warn!("Failed to queue metric for InfluxDB: {}", e);
        }
    }

    fn timestamp() -> Timestamp {
        Timestamp::Nanoseconds(
            SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .expect("SystemTime before UNIX_EPOCH")
                .as_nanos(),
        )
    }
}

impl ReportCollector for InfluxReporter {
    fn add_operation(&mut self, operation_record: &OperationRecord) {
        let Some(elapsed) = operation_record.elapsed else {
            log::warn!(
                "Not reporting unfinished operation record: {}",
                operation_record.operation_id
            );
            return;
        };

        self.send(
            Self::timestamp()
                .into_query("probe.operation_duration")
                .add_field("value", elapsed.as_secs_f64() * 1000.0)
                .add_tag("operation_id", operation_record.operation_id.clone())
                .add_tag("is_error", operation_record.is_error.to_string()),
        );
    }

    fn add_check(&mut self, name: &str, passed: bool) {
        self.send(
            Self::timestamp()
                .into_query("probe.check")
                .add_field("passed", passed)
                .add_tag("check", name.to_string()),
        );
    }

    fn add_iteration(&mut self, success: bool) {
        self.send(
            Self::timestamp()
                .into_query("probe.iteration")
                .add_field("failed", !success),
        );
    }

    fn finalize(&self) {
        // Nothing to flush here. The write task drains the channel when the shutdown signal
        // arrives.
    }
}

fn start_write_task(
    runtime: &Runtime,
    mut shutdown_listener: DelegatedShutdownListener,
    client: Client,
) -> UnboundedSender<WriteQuery> {
    let (writer, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    runtime.spawn(async move {
        loop {
            select! {
                _ = shutdown_listener.wait_for_shutdown() => {
                    log::debug!("Shutting down the influx reporter");
                    break;
                }
                query = receiver.recv() => {
                    if let Some(query) = query {
                        if let Err(e) = client.query(query).await {
                            log::warn!("Failed to send metric to InfluxDB: {}", e);
                        }
                    } else {
                        break;
                    }
                }
            }
        }

        log::trace!("Draining any remaining metrics before shutting down...");
        let mut drain_count = 0;
        while let Ok(query) = receiver.try_recv() {
            if let Err(e) = client.query(query).await {
                log::warn!("Failed to send metric to InfluxDB: {}", e);
            }
            drain_count += 1;
        }
        log::debug!("Drained {} remaining metrics", drain_count);
    });
    writer
}
