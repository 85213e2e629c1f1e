/*!
 * Controller
 * The tick-driven scheduling loop
 *
 * Every tick runs the same fixed sequence:
 * 1. Advance the simulated clock
 * 2. Reap at most one terminated worker and free its slot
 * 3. Emit one table report per crossed report boundary
 * 4. Launch a worker if admission control allows it
 * 5. Re-evaluate whether the run is finished
 */

use super::admission::{AdmissionPolicy, AdmissionState};
use super::config::{ControllerSettings, SchedulerConfig};
use super::pacing::TickPacer;
use crate::clock::{ClockStore, SimTime, SimulatedClock};
use crate::core::errors::{OssError, OssResult};
use crate::core::types::WorkerPid;
use crate::monitoring::{ControllerEvent, Reporter, RunSpan, TableReport};
use crate::process::{Launcher, ProcessTable, Reaper, SpawnFailurePolicy, WorkBudget};
use crate::signals::{CancelReason, CancellationToken};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Running,
    Done,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Cancelled(CancelReason),
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Clock value after the advance
    pub now: SimTime,
    /// Worker whose slot was released this tick
    pub terminated: Option<WorkerPid>,
    /// Table reports emitted this tick
    pub reports: u32,
    /// Worker launched this tick
    pub launched: Option<WorkerPid>,
    pub state: ControllerState,
}

/// Final accounting for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub launched: u32,
    pub failed_launches: u32,
    pub final_time: SimTime,
    pub ticks: u64,
    pub reports: u64,
    pub outcome: RunOutcome,
}

/// The scheduler.
///
/// Owns the clock and the process table; launching, reaping and reporting
/// go through the injected seams so tests can drive it without real
/// processes.
pub struct Controller<S, L, R, P>
where
    S: ClockStore,
    L: Launcher,
    R: Reaper,
    P: Reporter,
{
    config: SchedulerConfig,
    settings: ControllerSettings,
    policy: AdmissionPolicy,
    budget: WorkBudget,
    clock: SimulatedClock<S>,
    table: ProcessTable,
    admission: AdmissionState,
    launcher: L,
    reaper: R,
    reporter: P,
    next_report: SimTime,
    state: ControllerState,
    ticks: u64,
    reports: u64,
}

impl<S, L, R, P> Controller<S, L, R, P>
where
    S: ClockStore,
    L: Launcher,
    R: Reaper,
    P: Reporter,
{
    /// Validate the configuration and build a controller with a zeroed
    /// clock. Nothing ticks until [`tick`](Self::tick) or [`run`](Self::run).
    pub fn new(
        config: SchedulerConfig,
        settings: ControllerSettings,
        store: S,
        launcher: L,
        reaper: R,
        reporter: P,
    ) -> OssResult<Self> {
        config.validate(&settings)?;

        let policy = AdmissionPolicy::from_config(&config);
        let budget = config.worker_budget();
        let first_report = SimTime::from_nanos(settings.report_interval_ns);

        info!(
            total_workers = config.total_workers,
            max_concurrent = config.max_concurrent,
            budget = %budget,
            launch_gap = %policy.launch_gap(),
            capacity = settings.table_capacity,
            "Controller initialized"
        );

        Ok(Self {
            table: ProcessTable::new(settings.table_capacity),
            clock: SimulatedClock::new(store),
            admission: AdmissionState::default(),
            next_report: first_report,
            state: ControllerState::Running,
            ticks: 0,
            reports: 0,
            config,
            settings,
            policy,
            budget,
            launcher,
            reaper,
            reporter,
        })
    }

    /// Run one tick. A no-op once the controller is done.
    pub fn tick(&mut self) -> OssResult<TickReport> {
        if self.state == ControllerState::Done {
            return Ok(TickReport {
                now: self.clock.now(),
                terminated: None,
                reports: 0,
                launched: None,
                state: ControllerState::Done,
            });
        }

        self.ticks += 1;
        let now = self.clock.advance(self.settings.tick_increment_ns as u64);
        let terminated = self.reap(now);
        let reports = self.emit_due_reports(now);
        let launched = self.admit(now)?;

        debug_assert_eq!(self.admission.running as usize, self.table.occupied_count());

        if !self.policy.has_work(&self.admission) {
            self.state = ControllerState::Done;
        }

        Ok(TickReport {
            now,
            terminated,
            reports,
            launched,
            state: self.state,
        })
    }

    /// Tick until every worker has been launched and has exited, or the
    /// token is cancelled.
    ///
    /// The finish condition is checked before each tick, so a run with
    /// nothing to launch performs no ticks at all.
    pub fn run<T: TickPacer>(
        &mut self,
        token: &CancellationToken,
        pacer: &mut T,
    ) -> OssResult<RunSummary> {
        let span = RunSpan::new(self.config.total_workers, self.config.max_concurrent);
        let _entered = span.enter();

        let outcome = loop {
            if !self.policy.has_work(&self.admission) {
                self.state = ControllerState::Done;
                break RunOutcome::Completed;
            }
            if let Some(reason) = token.cancelled() {
                warn!(
                    %reason,
                    live_workers = self.admission.running,
                    sim_sec = self.clock.now().seconds(),
                    sim_nano = self.clock.now().nanos(),
                    "Run cancelled"
                );
                break RunOutcome::Cancelled(reason);
            }

            if let Err(e) = self.tick() {
                span.record_ticks(self.ticks);
                span.record_outcome("error");
                return Err(e);
            }
            pacer.pace();
        };

        let summary = self.summary(outcome);
        span.record_ticks(summary.ticks);
        span.record_launched(summary.launched);
        span.record_outcome(match outcome {
            RunOutcome::Completed => "completed",
            RunOutcome::Cancelled(_) => "cancelled",
        });

        info!(
            launched = summary.launched,
            failed_launches = summary.failed_launches,
            sim_sec = summary.final_time.seconds(),
            sim_nano = summary.final_time.nanos(),
            ticks = summary.ticks,
            "Run summary"
        );
        if outcome == RunOutcome::Completed {
            self.reporter.report_summary(&summary);
        }
        Ok(summary)
    }

    pub fn summary(&self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            launched: self.admission.launched,
            failed_launches: self.admission.failed,
            final_time: self.clock.now(),
            ticks: self.ticks,
            reports: self.reports,
            outcome,
        }
    }

    /// Workers that may still be alive
    pub fn live_workers(&self) -> u32 {
        self.admission.running
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn admission(&self) -> &AdmissionState {
        &self.admission
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Hand back the clock so its storage can be released
    pub fn into_clock(self) -> SimulatedClock<S> {
        self.clock
    }

    fn reap(&mut self, now: SimTime) -> Option<WorkerPid> {
        let pid = self.reaper.poll_terminated()?;

        match self.table.release(pid) {
            Some(slot) => {
                self.admission.record_exit();
                info!(pid, slot, sim_sec = now.seconds(), sim_nano = now.nanos(), "Worker terminated");
                self.reporter
                    .report_event(&ControllerEvent::Terminated { pid, slot, at: now });
                Some(pid)
            }
            None => {
                debug!(pid, "Reaped pid not in process table, ignoring");
                None
            }
        }
    }

    fn emit_due_reports(&mut self, now: SimTime) -> u32 {
        let mut emitted = 0;
        while now >= self.next_report {
            let report = TableReport {
                boundary: self.next_report,
                now,
                table: self.table.snapshot(),
            };
            self.reporter.report_table(&report);
            emitted += 1;

            let next = self.next_report.saturating_add_nanos(self.settings.report_interval_ns);
            if next == self.next_report {
                // Clock saturated; no later boundary exists
                break;
            }
            self.next_report = next;
        }
        self.reports += emitted as u64;
        emitted
    }

    fn admit(&mut self, now: SimTime) -> OssResult<Option<WorkerPid>> {
        if !self.policy.admits(&self.admission, now) {
            return Ok(None);
        }

        let slot = self.table.find_free_slot().ok_or_else(|| {
            OssError::ProcessTable(format!(
                "admitted launch with no free slot ({} running, capacity {})",
                self.admission.running,
                self.table.capacity()
            ))
        })?;

        match self.launcher.launch(self.budget) {
            Ok(pid) => {
                self.table.occupy(slot, pid, now)?;
                self.admission.record_launch(now, self.policy.launch_gap());
                info!(
                    pid,
                    slot,
                    sim_sec = now.seconds(),
                    sim_nano = now.nanos(),
                    launched = self.admission.launched,
                    "Worker launched"
                );
                self.reporter
                    .report_event(&ControllerEvent::Launched { pid, slot, at: now });
                Ok(Some(pid))
            }
            Err(e) => match self.settings.spawn_failure {
                SpawnFailurePolicy::Abort => Err(e),
                SpawnFailurePolicy::SkipAndContinue => {
                    warn!(error = %e, sim_sec = now.seconds(), sim_nano = now.nanos(), "Launch failed, skipping");
                    self.admission
                        .record_failed_launch(now, self.policy.launch_gap());
                    self.reporter.report_event(&ControllerEvent::LaunchFailed {
                        reason: e.to_string(),
                        at: now,
                    });
                    Ok(None)
                }
            },
        }
    }
}
