//! Command channel between a camera handle and its acquisition worker.
//!
//! A message counter pairs with a condvar so the worker never misses a
//! command posted while it was busy producing a frame: `send` bumps the
//! counter, the receiver compares it against the last number it has seen.
//! `recv_timeout` doubles as the worker's frame pacing tick.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum WorkerCmd {
    /// Worker should exit its loop.
    Halt,
}

pub struct CmdChan {
    cmd: Arc<Mutex<(usize, WorkerCmd)>>, // (msg_num, worker_cmd)
    condvar: Arc<Condvar>,
}

impl CmdChan {
    pub fn new() -> Self {
        Self {
            cmd: Arc::new(Mutex::new((0, WorkerCmd::Halt))),
            condvar: Arc::new(Condvar::new()),
        }
    }

    pub fn new_recvr(&self) -> CmdRecvr {
        // Initialize with the currently posted message number so the
        // receiver only reacts to commands sent after its creation.
        let (msg_num, _cmd_val) = &*self.cmd.lock();
        CmdRecvr {
            cmd: self.cmd.clone(),
            condvar: self.condvar.clone(),
            viewed_msg_num: *msg_num,
        }
    }

    pub fn send(&self, cmd: WorkerCmd) {
        let mut guard = self.cmd.lock();
        let (msg_num, cmd_val) = &mut *guard;
        *cmd_val = cmd;
        *msg_num += 1;
        self.condvar.notify_all();
    }
}

pub struct CmdRecvr {
    cmd: Arc<Mutex<(usize, WorkerCmd)>>,
    condvar: Arc<Condvar>,
    viewed_msg_num: usize,
}

impl CmdRecvr {
    /// Waits up to `timeout` for a new command.
    ///
    /// Returns `None` on the pacing timeout. If several commands were posted
    /// since the last receive, only the latest one is delivered.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<WorkerCmd> {
        let mut guard = self.cmd.lock();
        let (msg_num, _cmd_val) = &*guard;
        if *msg_num == self.viewed_msg_num {
            self.condvar.wait_for(&mut guard, timeout);
        }
        let (msg_num, cmd_val) = &*guard;
        if *msg_num > self.viewed_msg_num {
            self.viewed_msg_num = *msg_num;
            Some(*cmd_val)
        } else {
            None
        }
    }
}
