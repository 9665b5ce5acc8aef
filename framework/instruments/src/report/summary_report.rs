mod checks_table;
mod operations_table;

use std::collections::BTreeMap;

use tabled::settings::Style;
use tabled::Table;

use crate::report::summary_report::checks_table::CheckRow;
use crate::report::summary_report::operations_table::OperationRow;
use crate::report::ReportCollector;
use crate::OperationRecord;

/// Keeps every record in memory and prints summary tables at the end of the run.
///
/// This is the default reporter and is most useful while developing scenarios or when running
/// without an InfluxDB instance to stream to.
pub struct SummaryReporter {
    operation_records: Vec<OperationRecord>,
    checks: BTreeMap<String, (u64, u64)>,
    iterations: u64,
    failed_iterations: u64,
}

impl SummaryReporter {
    pub fn new() -> Self {
        Self {
            operation_records: Vec::new(),
            checks: BTreeMap::new(),
            iterations: 0,
            failed_iterations: 0,
        }
    }

    fn print_summary_of_operations(&self) {
        let rows = self
            .operation_records
            .iter()
            .fold(
                BTreeMap::new(),
                |mut acc: BTreeMap<String, Vec<&OperationRecord>>, record| {
                    acc.entry(record.operation_id.clone()).or_default().push(record);
                    acc
                },
            )
            .into_iter()
            .filter_map(|(operation_id, records)| {
                let durations: Vec<f64> = records
                    .iter()
                    .filter_map(|record| record.duration())
                    .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
                    .collect();
                if durations.is_empty() {
                    return None;
                }

                let total_operations = durations.len();
                let failed_operations = records.iter().filter(|record| record.is_error).count();
                let total_duration_ms: f64 = durations.iter().sum();

                Some(OperationRow {
                    operation_id,
                    avg_time_ms: total_duration_ms / total_operations as f64,
                    min_time_ms: durations.iter().copied().fold(f64::INFINITY, f64::min),
                    max_time_ms: durations.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    total_operations,
                    failed_operations,
                })
            })
            .collect::<Vec<_>>();

        println!("\nSummary of operations");
        let mut table = Table::new(rows);
        table.with(Style::modern());
        println!("{table}");
    }

    fn print_summary_of_checks(&self) {
        if self.checks.is_empty() {
            return;
        }

        let rows = self
            .checks
            .iter()
            .map(|(check, (passes, fails))| CheckRow {
                check: check.clone(),
                passes: *passes,
                fails: *fails,
                pass_rate: *passes as f64 / (*passes + *fails) as f64,
            })
            .collect::<Vec<_>>();

        println!("\nSummary of checks");
        let mut table = Table::new(rows);
        table.with(Style::modern());
        println!("{table}");

        if self.iterations > 0 {
            println!(
                "\n{} iterations, {} failed ({:.2}% error rate)",
                self.iterations,
                self.failed_iterations,
                100.0 * self.failed_iterations as f64 / self.iterations as f64
            );
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCollector for SummaryReporter {
    fn add_operation(&mut self, operation_record: &OperationRecord) {
        self.operation_records.push(operation_record.clone());
    }

    fn add_check(&mut self, name: &str, passed: bool) {
        let entry = self.checks.entry(name.to_string()).or_insert((0, 0));
        if passed {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    fn add_iteration(&mut self, success: bool) {
        self.iterations += 1;
        if !success {
            self.failed_iterations += 1;
        }
    }

    fn finalize(&self) {
        self.print_summary_of_operations();
        self.print_summary_of_checks();
    }
}
