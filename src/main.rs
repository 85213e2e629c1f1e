/*!
 * OSS - Main Entry Point
 *
 * Controller process that:
 * - Owns the simulated clock in shared memory
 * - Launches workers under admission control
 * - Reaps workers and prints the process table
 */

use clap::Parser;
use nix::unistd::{getpid, getppid};
use std::process::ExitCode;
use tracing::info;

use oss_scheduler::cli::{usage_exit_code, Cli};
use oss_scheduler::scheduler::YieldPacing;
use oss_scheduler::signals::{become_group_leader, install_signal_handlers, teardown};
use oss_scheduler::{
    init_tracing, CancellationToken, Controller, OssResult, ProcessLauncher, RunOutcome,
    ShmClockOwner, TableReporter, WaitReaper,
};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    init_tracing("oss");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> OssResult<()> {
    let (config, settings) = cli.into_config()?;

    println!(
        "OSS starting, PID:{} PPID:{}\nCalled With:\n-n: {}\n-s: {}\n-t: {}\n-i: {}",
        getpid(),
        getppid(),
        config.total_workers,
        config.max_concurrent,
        config.worker_duration,
        config.launch_interval
    );

    become_group_leader()?;
    install_signal_handlers()?;
    let token = CancellationToken::new()
        .with_watchdog(settings.watchdog)
        .observing_signals();

    let execution = cli.execution_config()?;
    let region = ShmClockOwner::create(&cli.shm_name)?;
    info!(shm = %cli.shm_name, worker = %execution.program.display(), "Controller ready");

    let mut controller = Controller::new(
        config,
        settings,
        region,
        ProcessLauncher::new(execution),
        WaitReaper::new(),
        TableReporter::stdout(cli.report_format),
    )?;

    let result = controller.run(&token, &mut YieldPacing);

    let cancelled = match &result {
        Ok(summary) => match summary.outcome {
            RunOutcome::Cancelled(reason) => {
                println!("OSS: {}, terminating all child processes...", reason);
                true
            }
            RunOutcome::Completed => false,
        },
        Err(_) => false,
    };
    let terminate_group = cancelled || controller.live_workers() > 0;

    let region = controller.into_clock().into_store();
    let cleanup = teardown(Some(region), terminate_group);

    result?;
    cleanup
}
