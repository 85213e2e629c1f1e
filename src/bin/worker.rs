/*!
 * Worker - Entry Point
 *
 * Attaches read-only to the controller's clock and runs until the given
 * budget of simulated time has passed.
 */

use clap::Parser;
use nix::unistd::{getpid, getppid};
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, warn};

use oss_scheduler::cli::{usage_exit_code, WorkerCli};
use oss_scheduler::scheduler::FnPacer;
use oss_scheduler::worker::{render_banner, render_message};
use oss_scheduler::{init_tracing, ClockReader, OssResult, ShmClockView, Worker};

fn main() -> ExitCode {
    let cli = match WorkerCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    init_tracing("worker");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}

fn run(cli: WorkerCli) -> OssResult<()> {
    let pid = getpid().as_raw();
    let ppid = getppid().as_raw();
    let budget = cli.budget();

    print!("{}", render_banner(pid, ppid, budget));

    let view = ShmClockView::attach(&cli.shm_name)?;
    debug!(shm = %cli.shm_name, budget = %budget, "Attached to shared clock");

    let mut worker = Worker::start(ClockReader::new(view), budget);
    let mut stdout = std::io::stdout();

    // The controller owns the clock; once it is gone the clock stops.
    let mut pacer = FnPacer(|| {
        if getppid().as_raw() != ppid {
            warn!(pid, ppid, "Controller exited, abandoning work");
            std::process::exit(1);
        }
        std::thread::yield_now();
    });

    worker.run(&mut pacer, |message| {
        let _ = stdout.write_all(render_message(pid, ppid, message).as_bytes());
        let _ = stdout.flush();
    });

    Ok(())
}
