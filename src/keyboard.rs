use std::io::IsTerminal;

use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::keymap::{Action, KeyMap, Keymaps};
use crate::logging;
use crate::scheduler::Command;

/// Leaves raw mode when dropped
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        logging::set_raw_terminal(true);
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        logging::set_raw_terminal(false);
        let _ = disable_raw_mode();
    }
}

/// Single key commands while attached to a terminal
pub struct KeyboardListener {
    keymaps: Keymaps,
    cancel: CancellationToken,
    commands: UnboundedSender<Command>,
}

impl KeyboardListener {
    pub fn new(keymaps: Keymaps, cancel: CancellationToken, commands: UnboundedSender<Command>) -> Self {
        Self {
            keymaps,
            cancel,
            commands,
        }
    }

    pub fn is_available() -> bool {
        std::io::stdin().is_terminal()
    }

    /// Put the terminal in raw mode and handle keys until cancelled
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        let raw = RawMode::enable()?;
        let mut bindings = self.keymaps.iter().map(|(k, a)| format!("{k}: {a:?}")).collect::<Vec<_>>();
        bindings.sort();
        info!("Keys: {}", bindings.join(", "));

        Ok(tokio::spawn(async move {
            let _raw = raw;
            let mut reader = EventStream::new();
            loop {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    event = reader.next() => match event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle(KeyMap::from(key));
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!("Failed to read terminal event: {err}");
                            break;
                        }
                        None => break,
                    }
                }
            }
        }))
    }

    fn handle(&self, key: KeyMap) {
        match self.keymaps.get(&key) {
            Some(Action::Quit) => {
                info!("Exiting...");
                self.cancel.cancel();
            }
            Some(Action::PublishNow) => {
                info!("Updating status to current track...");
                let _ = self.commands.send(Command::PublishNow);
            }
            Some(Action::Clear) => {
                info!("Clearing status...");
                let _ = self.commands.send(Command::Clear);
            }
            None => info!("Unknown key pressed: {key}"),
        }
    }
}
