use crate::config::OptConfig;
use crate::opt::control::{Progress, SearchObserver};
use crate::opt::material::{Engine, run_engine};
use anyhow::{Context, Result, bail};
use crossbeam::channel::{Receiver, Sender, TryRecvError, unbounded};
use log::{debug, info, warn};
use panelcut::entities::{LayoutResult, PartSpec, StockSheetSpec};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::thread;
use std::thread::JoinHandle;

/// Commands accepted by an [`OptimizerTask`]
#[derive(Clone, Debug)]
pub enum TaskCommand {
    /// Starts an optimization, or queues it behind the running one
    Start(StartRequest),
    /// Stops the running optimization, which then completes with its best result so far.
    /// Queued requests are not affected.
    Cancel,
}

#[derive(Clone, Debug)]
pub struct StartRequest {
    pub parts: Vec<PartSpec>,
    pub stock: StockSheetSpec,
    pub engine: Engine,
    pub config: OptConfig,
    pub seed: u64,
    /// Overrides the time budget of the config
    pub time_budget_ms: Option<u64>,
}

/// Messages emitted by an [`OptimizerTask`].
/// Every start request yields zero or more `Progress` messages followed by exactly one `Complete`.
#[derive(Clone, Debug)]
pub enum TaskMessage {
    Progress(Progress),
    Complete(LayoutResult),
}

/// An optimizer running on a dedicated worker thread, driven over channels.
pub struct OptimizerTask {
    commands: Sender<TaskCommand>,
    messages: Receiver<TaskMessage>,
    handle: Option<JoinHandle<()>>,
}

impl OptimizerTask {
    pub fn spawn() -> Result<Self> {
        let (command_tx, command_rx) = unbounded();
        let (message_tx, message_rx) = unbounded();
        let handle = thread::Builder::new()
            .name("optimizer".to_string())
            .spawn(move || worker(command_rx, message_tx))
            .context("could not spawn optimizer thread")?;

        Ok(OptimizerTask {
            commands: command_tx,
            messages: message_rx,
            handle: Some(handle),
        })
    }

    pub fn start(&self, request: StartRequest) -> Result<()> {
        self.commands
            .send(TaskCommand::Start(request))
            .context("optimizer task has stopped")
    }

    pub fn cancel(&self) -> Result<()> {
        self.commands
            .send(TaskCommand::Cancel)
            .context("optimizer task has stopped")
    }

    pub fn messages(&self) -> &Receiver<TaskMessage> {
        &self.messages
    }

    /// Blocks until the running optimization completes, passing every progress report to `on_progress`.
    pub fn wait(&self, mut on_progress: impl FnMut(&Progress)) -> Result<LayoutResult> {
        loop {
            match self.messages.recv() {
                Ok(TaskMessage::Progress(progress)) => on_progress(&progress),
                Ok(TaskMessage::Complete(result)) => return Ok(result),
                Err(_) => bail!("optimizer task stopped without completing"),
            }
        }
    }
}

impl Drop for OptimizerTask {
    fn drop(&mut self) {
        //a closed command channel ends the worker loop
        let (closed, _) = unbounded();
        self.commands = closed;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("[TASK] optimizer thread panicked");
            }
        }
    }
}

fn worker(commands: Receiver<TaskCommand>, messages: Sender<TaskMessage>) {
    //starts received while an optimization was running
    let queued = RefCell::new(VecDeque::new());
    loop {
        let next = queued.borrow_mut().pop_front();
        let request = match next {
            Some(request) => request,
            None => match commands.recv() {
                Ok(TaskCommand::Start(request)) => request,
                Ok(TaskCommand::Cancel) => {
                    debug!("[TASK] nothing running, cancel ignored");
                    continue;
                }
                Err(_) => break,
            },
        };
        info!(
            "[TASK] starting {} engine on {} parts",
            request.engine,
            request.parts.len()
        );
        let mut observer = ChannelObserver {
            commands: &commands,
            messages: &messages,
            queued: &queued,
            cancelled: Cell::new(false),
        };
        let config = OptConfig {
            time_budget_ms: request.time_budget_ms.unwrap_or(request.config.time_budget_ms),
            ..request.config
        };
        let result = run_engine(
            request.engine,
            &request.parts,
            &request.stock,
            &config,
            request.seed,
            &mut observer,
        );
        if messages.send(TaskMessage::Complete(result)).is_err() {
            break;
        }
    }
    debug!("[TASK] command channel closed, worker stops");
}

/// Forwards progress to the message channel and polls the command channel for cancellation.
/// Starts arriving in the meantime are queued for the worker.
struct ChannelObserver<'a> {
    commands: &'a Receiver<TaskCommand>,
    messages: &'a Sender<TaskMessage>,
    queued: &'a RefCell<VecDeque<StartRequest>>,
    cancelled: Cell<bool>,
}

impl SearchObserver for ChannelObserver<'_> {
    fn cancelled(&self) -> bool {
        while !self.cancelled.get() {
            match self.commands.try_recv() {
                Ok(TaskCommand::Cancel) => {
                    info!("[TASK] cancel received");
                    self.cancelled.set(true);
                }
                Ok(TaskCommand::Start(request)) => {
                    let mut queued = self.queued.borrow_mut();
                    queued.push_back(request);
                    debug!(
                        "[TASK] start queued behind the running optimization ({} waiting)",
                        queued.len()
                    );
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    //the handle is gone, nobody waits for the queued requests
                    self.queued.borrow_mut().clear();
                    self.cancelled.set(true);
                }
            }
        }
        self.cancelled.get()
    }

    fn progress(&mut self, progress: Progress) {
        if self.messages.send(TaskMessage::Progress(progress)).is_err() {
            self.cancelled.set(true);
        }
    }
}
