/*!
 * Shared Test Doubles
 * In-process workers that finish when the local clock passes their deadline
 */

#![allow(dead_code)]

use oss_scheduler::clock::ClockSource;
use oss_scheduler::{
    Controller, ControllerSettings, Launcher, LocalClock, OssResult, Reaper, SchedulerConfig,
    SimTime, WorkBudget, WorkerPid,
};
use oss_scheduler::monitoring::RecordingReporter;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const FIRST_PID: WorkerPid = 1000;

#[derive(Debug, Default)]
pub struct WorldState {
    next_pid: WorkerPid,
    live: Vec<(WorkerPid, SimTime)>,
    pub launched: Vec<(WorkerPid, SimTime)>,
    pub reaped: Vec<WorkerPid>,
    pub max_live: usize,
    strays: VecDeque<WorkerPid>,
}

/// Handle for inspecting and steering the simulated workers
#[derive(Clone)]
pub struct World {
    clock: LocalClock,
    state: Rc<RefCell<WorldState>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            clock: LocalClock::new(),
            state: Rc::new(RefCell::new(WorldState {
                next_pid: FIRST_PID,
                ..WorldState::default()
            })),
        }
    }

    pub fn clock(&self) -> LocalClock {
        self.clock.clone()
    }

    pub fn launcher(&self) -> SimLauncher {
        SimLauncher {
            clock: self.clock.clone(),
            state: Rc::clone(&self.state),
        }
    }

    pub fn reaper(&self) -> SimReaper {
        SimReaper {
            clock: self.clock.clone(),
            state: Rc::clone(&self.state),
        }
    }

    /// Make the next reap report a pid the controller never launched
    pub fn inject_stray(&self, pid: WorkerPid) {
        self.state.borrow_mut().strays.push_back(pid);
    }

    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn launched(&self) -> Vec<(WorkerPid, SimTime)> {
        self.state.borrow().launched.clone()
    }

    pub fn reaped(&self) -> Vec<WorkerPid> {
        self.state.borrow().reaped.clone()
    }

    pub fn max_live(&self) -> usize {
        self.state.borrow().max_live
    }
}

pub struct SimLauncher {
    clock: LocalClock,
    state: Rc<RefCell<WorldState>>,
}

impl Launcher for SimLauncher {
    fn launch(&mut self, budget: WorkBudget) -> OssResult<WorkerPid> {
        let now = self.clock.load();
        let mut state = self.state.borrow_mut();
        let pid = state.next_pid;
        state.next_pid += 1;
        state.live.push((pid, now.saturating_add(budget.as_sim_time())));
        state.launched.push((pid, now));
        state.max_live = state.max_live.max(state.live.len());
        Ok(pid)
    }
}

pub struct SimReaper {
    clock: LocalClock,
    state: Rc<RefCell<WorldState>>,
}

impl Reaper for SimReaper {
    fn poll_terminated(&mut self) -> Option<WorkerPid> {
        let now = self.clock.load();
        let mut state = self.state.borrow_mut();
        if let Some(pid) = state.strays.pop_front() {
            return Some(pid);
        }
        let index = state.live.iter().position(|(_, deadline)| now >= *deadline)?;
        let (pid, _) = state.live.remove(index);
        state.reaped.push(pid);
        Some(pid)
    }
}

pub type SimController = Controller<LocalClock, SimLauncher, SimReaper, RecordingReporter>;

pub fn controller(
    world: &World,
    config: SchedulerConfig,
    settings: ControllerSettings,
) -> OssResult<SimController> {
    Controller::new(
        config,
        settings,
        world.clock(),
        world.launcher(),
        world.reaper(),
        RecordingReporter::new(),
    )
}
