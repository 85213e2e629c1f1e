/*!
 * Process Tests
 * Real child processes through the launcher and the reaper
 */

use oss_scheduler::scheduler::YieldPacing;
use oss_scheduler::{
    CancellationToken, Controller, ControllerSettings, ExecutionConfig, Launcher, OssError,
    ProcessLauncher, Reaper, RunOutcome, SchedulerConfig, ShmClockOwner, WaitReaper, WorkBudget,
    WorkerPid,
};
use oss_scheduler::monitoring::RecordingReporter;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::time::{Duration, Instant};

fn reap_within(reaper: &mut WaitReaper, limit: Duration) -> Option<WorkerPid> {
    let start = Instant::now();
    while start.elapsed() < limit {
        if let Some(pid) = reaper.poll_terminated() {
            return Some(pid);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

fn unique_name(tag: &str) -> String {
    format!("/oss-proc-{}-{}", tag, std::process::id())
}

#[test]
#[serial]
fn test_reaper_returns_launched_pid() {
    let mut launcher = ProcessLauncher::new(ExecutionConfig::new("/bin/true", "/unused"));
    let mut reaper = WaitReaper::new();

    let pid = launcher.launch(WorkBudget::new(0, 0)).unwrap();

    assert_eq!(reap_within(&mut reaper, Duration::from_secs(5)), Some(pid));
    assert_eq!(reaper.reaped(), 1);
    assert_eq!(launcher.spawned(), 1);
}

#[test]
#[serial]
fn test_reaper_without_children_returns_none() {
    let mut reaper = WaitReaper::new();
    assert_eq!(reaper.poll_terminated(), None);
}

#[test]
#[serial]
fn test_failing_child_is_still_reaped() {
    let mut launcher = ProcessLauncher::new(ExecutionConfig::new("/bin/false", "/unused"));
    let mut reaper = WaitReaper::new();

    let pid = launcher.launch(WorkBudget::new(0, 0)).unwrap();
    assert_eq!(reap_within(&mut reaper, Duration::from_secs(5)), Some(pid));
}

#[test]
#[serial]
fn test_missing_worker_binary() {
    let mut launcher =
        ProcessLauncher::new(ExecutionConfig::new("/nonexistent/worker", "/unused"));
    assert!(matches!(
        launcher.launch(WorkBudget::new(1, 0)),
        Err(OssError::Spawn(_))
    ));
}

#[test]
#[serial]
fn test_worker_binary_exits_at_deadline() {
    let name = unique_name("worker");
    let owner = ShmClockOwner::create(&name).unwrap();
    let mut launcher =
        ProcessLauncher::new(ExecutionConfig::new(env!("CARGO_BIN_EXE_worker"), name.clone()));
    let mut reaper = WaitReaper::new();

    let pid = launcher.launch(WorkBudget::new(0, 0)).unwrap();

    assert_eq!(reap_within(&mut reaper, Duration::from_secs(10)), Some(pid));
    owner.release().unwrap();
}

#[test]
#[serial]
fn test_controller_runs_real_workers() {
    let name = unique_name("run");
    let owner = ShmClockOwner::create(&name).unwrap();
    let launcher =
        ProcessLauncher::new(ExecutionConfig::new(env!("CARGO_BIN_EXE_worker"), name.clone()));

    let mut controller = Controller::new(
        SchedulerConfig::new(2, 1, 0.01, 0.0),
        ControllerSettings::default(),
        owner,
        launcher,
        WaitReaper::new(),
        RecordingReporter::new(),
    )
    .unwrap();

    let token = CancellationToken::new().with_watchdog(Duration::from_secs(30));
    let summary = controller.run(&token, &mut YieldPacing).unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.launched, 2);
    assert_eq!(controller.live_workers(), 0);
    assert_eq!(controller.reporter().terminated_pids().len(), 2);

    controller.into_clock().into_store().release().unwrap();
}
