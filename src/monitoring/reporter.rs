/*!
 * Run Reporter
 * Renders table snapshots and lifecycle events for the operator
 */

use crate::clock::SimTime;
use crate::core::types::{SlotIndex, WorkerPid};
use crate::process::TableSnapshot;
use crate::scheduler::RunSummary;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;
use tracing::warn;

const RULE_WIDTH: usize = 52;

/// Output format for [`TableReporter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

/// Snapshot emitted when the clock crosses a report boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TableReport {
    /// The boundary that triggered this report
    pub boundary: SimTime,
    /// Clock value when the report was taken
    pub now: SimTime,
    pub table: TableSnapshot,
}

/// Worker lifecycle events observed by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    Launched {
        pid: WorkerPid,
        slot: SlotIndex,
        at: SimTime,
    },
    Terminated {
        pid: WorkerPid,
        slot: SlotIndex,
        at: SimTime,
    },
    LaunchFailed {
        reason: String,
        at: SimTime,
    },
}

/// Sink for controller output. Never feeds back into controller state.
pub trait Reporter {
    fn report_table(&mut self, report: &TableReport);

    fn report_event(&mut self, _event: &ControllerEvent) {}

    fn report_summary(&mut self, _summary: &RunSummary) {}
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report_table(&mut self, report: &TableReport) {
        (**self).report_table(report)
    }

    fn report_event(&mut self, event: &ControllerEvent) {
        (**self).report_event(event)
    }

    fn report_summary(&mut self, summary: &RunSummary) {
        (**self).report_summary(summary)
    }
}

/// Render a snapshot in the fixed-width column layout
pub fn render_table(table: &TableSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}{:<10}{:<12}{:<12}{:<12}",
        "Index", "Occ", "PID", "StartSec", "StartNano"
    );
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for (index, pcb) in table.entries.iter().enumerate() {
        if pcb.occupied {
            let _ = writeln!(
                out,
                "{:<6}{:<10}{:<12}{:<12}{:<12}",
                index,
                1,
                pcb.pid,
                pcb.start.seconds(),
                pcb.start.nanos()
            );
        } else {
            let _ = writeln!(out, "{:<6}{:<10}{:<12}{:<12}{:<12}", index, 0, "-", "-", "-");
        }
    }
    out.push('\n');
    out
}

/// Writes reports to any `Write`, stdout in production
pub struct TableReporter<W: Write> {
    out: W,
    format: ReportFormat,
}

impl TableReporter<std::io::Stdout> {
    pub fn stdout(format: ReportFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write> TableReporter<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write report");
        }
    }

    fn emit_json<T: Serialize>(&mut self, value: &T) {
        match serde_json::to_string(value) {
            Ok(mut line) => {
                line.push('\n');
                self.emit(&line);
            }
            Err(e) => warn!(error = %e, "Failed to serialize report"),
        }
    }
}

impl<W: Write> Reporter for TableReporter<W> {
    fn report_table(&mut self, report: &TableReport) {
        match self.format {
            ReportFormat::Table => {
                let text = render_table(&report.table);
                self.emit(&text);
            }
            ReportFormat::Json => self.emit_json(report),
        }
    }

    fn report_event(&mut self, event: &ControllerEvent) {
        match (self.format, event) {
            (ReportFormat::Json, _) => self.emit_json(event),
            (ReportFormat::Table, ControllerEvent::Terminated { pid, .. }) => {
                self.emit(&format!("OSS: Child process terminated: {}\n", pid));
            }
            // Launches and skipped spawns only show up in the logs
            (ReportFormat::Table, _) => {}
        }
    }

    fn report_summary(&mut self, summary: &RunSummary) {
        match self.format {
            ReportFormat::Table => {
                let text = format!(
                    "Number of processes launched: {}\n\
                     Workers ran for a combined total of {} seconds and {} nanoseconds.\n",
                    summary.launched,
                    summary.final_time.seconds(),
                    summary.final_time.nanos()
                );
                self.emit(&text);
            }
            ReportFormat::Json => self.emit_json(summary),
        }
    }
}

/// Keeps everything it is given; used by tests and benches
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub tables: Vec<TableReport>,
    pub events: Vec<ControllerEvent>,
    pub summaries: Vec<RunSummary>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminated_pids(&self) -> Vec<WorkerPid> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ControllerEvent::Terminated { pid, .. } => Some(*pid),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report_table(&mut self, report: &TableReport) {
        self.tables.push(report.clone());
    }

    fn report_event(&mut self, event: &ControllerEvent) {
        self.events.push(event.clone());
    }

    fn report_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }
}
