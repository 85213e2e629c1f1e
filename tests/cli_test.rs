/*!
 * CLI Tests
 * Argument parsing, validation and exit codes of the `oss` binary
 */

use clap::Parser;
use oss_scheduler::cli::{usage_exit_code, Cli, WorkerCli};
use oss_scheduler::clock::{ClockSource, ClockStore};
use oss_scheduler::{ReportFormat, ShmClockOwner, ShmClockView, SimTime, SpawnFailurePolicy, WorkBudget};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::process::Command;
use std::time::Duration;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("oss").chain(args.iter().copied()))
}

fn oss() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_oss"));
    command.env_remove("OSS_CLOCK_SHM").env_remove("OSS_WORKER_PATH");
    command
}

#[test]
fn test_required_flags_parse() {
    let cli = parse(&["-n", "3", "-s", "1", "-t", "1.5", "-i", "0"]).unwrap();
    let (config, settings) = cli.into_config().unwrap();

    assert_eq!(config.total_workers, 3);
    assert_eq!(config.max_concurrent, 1);
    assert_eq!(config.worker_budget(), WorkBudget::new(1, 500_000_000));
    assert_eq!(settings.watchdog, Duration::from_secs(60));
    assert_eq!(settings.spawn_failure, SpawnFailurePolicy::Abort);
    assert_eq!(cli.report_format, ReportFormat::Table);
}

#[test]
fn test_optional_flags() {
    let cli = parse(&[
        "-n", "1", "-s", "2", "-t", "0", "-i", "0.25",
        "--watchdog", "5",
        "--on-spawn-failure", "skip",
        "--report-format", "json",
        "--shm-name", "/oss-cli-test",
        "--worker-path", "/opt/worker",
    ])
    .unwrap();
    let (_, settings) = cli.into_config().unwrap();

    assert_eq!(settings.watchdog, Duration::from_secs(5));
    assert_eq!(settings.spawn_failure, SpawnFailurePolicy::SkipAndContinue);
    assert_eq!(cli.report_format, ReportFormat::Json);
    assert_eq!(cli.execution_config().unwrap().program.to_str(), Some("/opt/worker"));
}

#[test]
fn test_missing_flag_is_usage_error() {
    let err = parse(&["-n", "3", "-s", "1", "-t", "1"]).unwrap_err();
    assert_eq!(usage_exit_code(&err), 1);
}

#[test]
fn test_help_exits_zero() {
    let err = parse(&["-h"]).unwrap_err();
    assert_eq!(usage_exit_code(&err), 0);
}

#[test]
fn test_negative_duration_rejected_by_validation() {
    let cli = parse(&["-n", "1", "-s", "1", "-t", "-2", "-i", "0"]).unwrap();
    assert!(cli.into_config().unwrap_err().is_configuration());
}

#[test]
fn test_zero_concurrency_rejected() {
    let cli = parse(&["-n", "1", "-s", "0", "-t", "1", "-i", "0"]).unwrap();
    assert!(cli.into_config().unwrap_err().is_configuration());
}

#[test]
fn test_bad_shm_name_rejected() {
    let cli = parse(&["-n", "1", "-s", "1", "-t", "1", "-i", "0", "--shm-name", "clock"]).unwrap();
    assert!(cli.into_config().unwrap_err().is_configuration());
}

#[test]
fn test_worker_positional_budget() {
    let cli = WorkerCli::try_parse_from(["worker", "2", "250"]).unwrap();
    assert_eq!(cli.budget(), WorkBudget::new(2, 250));
}

#[test]
fn test_binary_rejects_capacity_overflow() {
    let status = oss()
        .args(["-n", "1", "-s", "11", "-t", "1", "-i", "0"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_binary_usage_error_exit_code() {
    let status = oss().args(["-n", "1"]).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_binary_help_exit_code() {
    let status = oss().arg("-h").status().unwrap();
    assert_eq!(status.code(), Some(0));
}

#[test]
#[serial]
fn test_binary_zero_workers() {
    let name = format!("/oss-cli-zero-{}", std::process::id());
    let output = oss()
        .args(["-n", "0", "-s", "1", "-t", "1", "-i", "0"])
        .args(["--shm-name", &name])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Number of processes launched: 0"));
    assert!(stdout.contains("0 seconds and 0 nanoseconds"));

    // The clock object is unlinked on exit
    assert!(ShmClockView::attach(&name).is_err());
}

#[test]
#[serial]
fn test_binary_full_run() {
    let output = oss()
        .args(["-n", "2", "-s", "1", "-t", "0.05", "-i", "0"])
        .args(["--shm-name", &format!("/oss-cli-run-{}", std::process::id())])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Number of processes launched: 2"));
    assert_eq!(stdout.matches("OSS: Child process terminated:").count(), 2);
    assert_eq!(stdout.matches("--Terminating").count(), 2);
}

#[test]
#[serial]
fn test_watchdog_teardown_spares_launcher() {
    let name = format!("/oss-cli-wd-{}", std::process::id());
    let output = Command::new("sh")
        .arg("-c")
        .arg(r#""$0" -n 1 -s 1 -t 1 -i 0 --watchdog 0 --shm-name "$1"; echo "launcher survived $?""#)
        .arg(env!("CARGO_BIN_EXE_oss"))
        .arg(&name)
        .env_remove("OSS_CLOCK_SHM")
        .env_remove("OSS_WORKER_PATH")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("watchdog expired, terminating all child processes"));
    assert!(stdout.contains("launcher survived 0"));
}

#[test]
#[serial]
fn test_binary_refuses_clock_in_use() {
    let name = format!("/oss-cli-busy-{}", std::process::id());
    let owner = ShmClockOwner::create(&name).unwrap();
    owner.store(SimTime::new(5, 0));

    let output = oss()
        .args(["-n", "1", "-s", "1", "-t", "1", "-i", "0"])
        .args(["--shm-name", &name])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(owner.load(), SimTime::new(5, 0));
    owner.release().unwrap();
}
