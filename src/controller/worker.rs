use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use super::{ControllerState, PhyController};
use crate::error::{ControllerError, ControllerResult};
use crate::phy::{PhyIndex, TuningMode};
use crate::transport::Transport;

enum Command {
    Select(usize, Sender<ControllerResult<()>>),
    Switch(Sender<ControllerResult<PhyIndex>>),
    SetTuningMode(TuningMode, Sender<()>),
    Snapshot(Sender<ControllerState>),
    Shutdown,
}

/// Cloneable front of a controller owned by a worker thread.
///
/// Commands from all handles are queued and executed one at a time in
/// arrival order; each call blocks until its command has run.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: Sender<Command>,
}

impl ControllerHandle {
    fn request<R>(&self, build: impl FnOnce(Sender<R>) -> Command) -> ControllerResult<R> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(build(reply_tx))
            .map_err(|_| ControllerError::WorkerGone)?;
        reply_rx
            .recv()
            .map_err(|_| ControllerError::WorkerGone)
    }

    pub fn select(&self, phy: usize) -> ControllerResult<()> {
        self.request(|reply| Command::Select(phy, reply))?
    }

    pub fn switch(&self) -> ControllerResult<PhyIndex> {
        self.request(Command::Switch)?
    }

    pub fn set_tuning_mode(&self, mode: TuningMode) -> ControllerResult<()> {
        self.request(|reply| Command::SetTuningMode(mode, reply))
    }

    /// Copy of the controller state after all earlier commands ran
    pub fn snapshot(&self) -> ControllerResult<ControllerState> {
        self.request(Command::Snapshot)
    }

    /// Ask the worker to stop after the commands already queued
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Thread that exclusively owns a [`PhyController`]
pub struct ControllerWorker<T: Transport> {
    handle: ControllerHandle,
    thread: JoinHandle<PhyController<T>>,
}

impl<T: Transport + Send + 'static> ControllerWorker<T> {
    pub fn spawn(controller: PhyController<T>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<Command>();
        let thread = thread::spawn(move || run(controller, rx));
        Self {
            handle: ControllerHandle { tx },
            thread,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Stop the worker and take the controller back
    pub fn join(self) -> ControllerResult<PhyController<T>> {
        self.handle.shutdown();
        self.thread
            .join()
            .map_err(|_| ControllerError::WorkerGone)
    }
}

fn run<T: Transport>(mut controller: PhyController<T>, rx: Receiver<Command>) -> PhyController<T> {
    info!("Controller worker started");
    // Ends on Shutdown or once every handle is dropped
    while let Ok(command) = rx.recv() {
        match command {
            Command::Select(phy, reply) => {
                let _ = reply.send(controller.select(phy));
            }
            Command::Switch(reply) => {
                let _ = reply.send(controller.switch());
            }
            Command::SetTuningMode(mode, reply) => {
                controller.set_tuning_mode(mode);
                let _ = reply.send(());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(controller.state().clone());
            }
            Command::Shutdown => {
                debug!("Controller worker shutting down");
                break;
            }
        }
    }
    info!("Controller worker stopped");
    controller
}
