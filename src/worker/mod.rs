/*!
 * Worker
 * Reads the shared clock until its work budget has elapsed
 *
 * A worker is a poll-based state machine: [`Worker::poll`] reads the clock
 * once and reports at most one lifecycle event. The binary drives it in a
 * loop; tests drive it against a local clock.
 */

use crate::clock::{ClockReader, ClockSource, SimTime};
use crate::process::WorkBudget;
use crate::scheduler::TickPacer;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Lifecycle points a worker announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerEvent {
    Started,
    /// Count of whole-second changes observed since start
    SecondsPassed(u32),
    Terminating,
}

/// An event with the clock reading that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerMessage {
    pub event: WorkerEvent,
    pub now: SimTime,
    pub deadline: SimTime,
}

/// Worker state machine over a read-only clock
#[derive(Debug)]
pub struct Worker<C: ClockSource> {
    clock: ClockReader<C>,
    budget: WorkBudget,
    started_at: SimTime,
    deadline: SimTime,
    last_seconds: u32,
    seconds_passed: u32,
    finished: bool,
}

impl<C: ClockSource> Worker<C> {
    /// Read the clock once and fix the deadline at `now + budget`
    pub fn start(clock: ClockReader<C>, budget: WorkBudget) -> Self {
        let started_at = clock.now();
        let deadline = started_at.saturating_add(budget.as_sim_time());
        Self {
            clock,
            budget,
            started_at,
            deadline,
            last_seconds: started_at.seconds(),
            seconds_passed: 0,
            finished: false,
        }
    }

    pub fn budget(&self) -> WorkBudget {
        self.budget
    }

    pub fn deadline(&self) -> SimTime {
        self.deadline
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The message announcing the start
    pub fn started(&self) -> WorkerMessage {
        WorkerMessage {
            event: WorkerEvent::Started,
            now: self.started_at,
            deadline: self.deadline,
        }
    }

    /// Read the clock and report what changed, if anything.
    ///
    /// Returns `Terminating` exactly once, when the deadline is reached,
    /// and `None` forever after.
    pub fn poll(&mut self) -> Option<WorkerMessage> {
        if self.finished {
            return None;
        }

        let now = self.clock.now();
        let event = if now >= self.deadline {
            self.finished = true;
            WorkerEvent::Terminating
        } else if now.seconds() > self.last_seconds {
            self.last_seconds = now.seconds();
            self.seconds_passed += 1;
            WorkerEvent::SecondsPassed(self.seconds_passed)
        } else {
            return None;
        };

        Some(WorkerMessage {
            event,
            now,
            deadline: self.deadline,
        })
    }

    /// Poll until terminating, handing every message to `emit`
    pub fn run<T, F>(&mut self, pacer: &mut T, mut emit: F)
    where
        T: TickPacer,
        F: FnMut(&WorkerMessage),
    {
        emit(&self.started());
        while !self.finished {
            if let Some(message) = self.poll() {
                emit(&message);
            }
            pacer.pace();
        }
    }
}

/// The banner printed before the clock is first read
pub fn render_banner(pid: i32, ppid: i32, budget: WorkBudget) -> String {
    format!(
        "Worker starting, PID:{} PPID:{}\nCalled With:\nInterval: {} seconds, {} nanoseconds\n",
        pid, ppid, budget.seconds, budget.nanos
    )
}

/// Render a lifecycle message in the operator-facing format
pub fn render_message(pid: i32, ppid: i32, message: &WorkerMessage) -> String {
    let mut out = format!(
        "Worker PID:{} PPID:{}\nSysClockS: {} SysclockNano: {} TermTimeS: {} TermTimeNano: {}\n",
        pid,
        ppid,
        message.now.seconds(),
        message.now.nanos(),
        message.deadline.seconds(),
        message.deadline.nanos()
    );
    let _ = match message.event {
        WorkerEvent::Started => writeln!(out, "--Just Starting"),
        WorkerEvent::SecondsPassed(n) => writeln!(out, "--{} seconds have passed", n),
        WorkerEvent::Terminating => writeln!(out, "--Terminating"),
    };
    out
}
