//! Cancellable polling loop.
//!
//! One cycle runs at a time. Between cycles the scheduler sleeps for a fixed
//! interval, and cancellation is observed while a cycle is in flight and while
//! sleeping. Any error from a cycle stops the loop and is returned as is.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// One unit of polling work
pub trait Cycle {
    type Output: Display;

    fn run(&mut self) -> impl Future<Output = Result<Self::Output>>;
    fn clear(&mut self) -> impl Future<Output = Result<()>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Sleeping,
    /// Terminal
    Stopped,
}

/// Requests that arrive from outside the loop while it sleeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Skip the rest of the current sleep
    PublishNow,
    Clear,
}

pub struct Scheduler<C> {
    cycle: C,
    interval: Duration,
    cancel: CancellationToken,
    commands: Option<UnboundedReceiver<Command>>,
    state: State,
    cycles: u64,
}

impl<C: Cycle> Scheduler<C> {
    pub fn new(cycle: C, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            cycle,
            interval,
            cancel,
            commands: None,
            state: State::Idle,
            cycles: 0,
        }
    }

    pub fn with_commands(mut self, commands: UnboundedReceiver<Command>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of cycles that completed successfully
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run until cancelled or until a cycle fails
    pub async fn run(&mut self) -> Result<()> {
        let result = self.run_until_stopped().await;
        self.state = State::Stopped;
        info!("Stopped after {} cycle(s)", self.cycles);
        result
    }

    async fn run_until_stopped(&mut self) -> Result<()> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            self.state = State::Running;
            let output = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Cancelled during a cycle, dropping it");
                    return Ok(());
                }
                output = self.cycle.run() => output?,
            };
            self.cycles += 1;
            info!("{output}");

            if self.cancel.is_cancelled() {
                return Ok(());
            }

            self.state = State::Sleeping;
            if !self.sleep().await? {
                return Ok(());
            }
        }
    }

    /// Wait out the interval. Returns `false` when cancelled.
    async fn sleep(&mut self) -> Result<bool> {
        let deadline = tokio::time::sleep(self.interval);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(false),
                _ = &mut deadline => return Ok(true),
                command = next_command(&mut self.commands) => match command {
                    Command::PublishNow => {
                        debug!("Publishing now");
                        return Ok(true);
                    }
                    Command::Clear => {
                        tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => return Ok(false),
                            cleared = self.cycle.clear() => cleared?,
                        }
                        info!("Status cleared");
                    }
                },
            }
        }
    }
}

/// Next command, or never when there is no channel or it has closed
async fn next_command(commands: &mut Option<UnboundedReceiver<Command>>) -> Command {
    let command = match commands.as_mut() {
        Some(receiver) => receiver.recv().await,
        None => None,
    };

    match command {
        Some(command) => command,
        None => {
            *commands = None;
            std::future::pending().await
        }
    }
}
