//! Process lifecycle hooks: load, interrupt, unload

use std::sync::Arc;

use parking_lot::Mutex;
use pgcurl_easy::{Easy, EasyConfig};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::Result;
use crate::session::Session;

/// Configuration applied when the extension is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Configuration for every session's context
    pub easy: EasyConfig,
    /// Listen for Ctrl-C and abort in-flight transfers
    pub install_signal_handler: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            easy: EasyConfig::default(),
            install_signal_handler: true,
        }
    }
}

#[derive(Debug)]
struct InterruptState {
    token: CancellationToken,
    closed: bool,
}

/// Process-wide interrupt source shared by every session.
///
/// Triggering cancels the current token and arms a fresh one, so a signal
/// aborts only the transfers already running when it arrived.
#[derive(Debug, Clone)]
pub struct Interrupt {
    state: Arc<Mutex<InterruptState>>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    /// Create an armed interrupt source
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InterruptState {
                token: CancellationToken::new(),
                closed: false,
            })),
        }
    }

    /// Token a transfer starting now should watch
    pub fn current(&self) -> CancellationToken {
        self.state.lock().token.clone()
    }

    /// Abort running transfers and re-arm for the next ones.
    pub fn trigger(&self) {
        let mut state = self.state.lock();
        state.token.cancel();
        if !state.closed {
            state.token = CancellationToken::new();
        }
    }

    /// Abort running transfers and every later one.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.token.cancel();
    }

    /// Whether [`close`](Self::close) was called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// A loaded extension: configuration, interrupt source and signal listener.
#[derive(Debug)]
pub struct Extension {
    config: ExtensionConfig,
    interrupt: Interrupt,
    shutdown: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl Extension {
    /// Validate the configuration and set up the interrupt source.
    ///
    /// The Ctrl-C listener needs a tokio runtime; outside of one it is
    /// skipped with a warning.
    pub fn load(config: ExtensionConfig) -> Result<Self> {
        config.easy.validate()?;

        let interrupt = Interrupt::new();
        let shutdown = CancellationToken::new();
        let listener = if config.install_signal_handler {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => Some(runtime.spawn(listen(interrupt.clone(), shutdown.clone()))),
                Err(_) => {
                    warn!("no tokio runtime; interrupt listener not installed");
                    None
                }
            }
        } else {
            None
        };

        info!(signal_handler = listener.is_some(), "extension loaded");
        Ok(Self {
            config,
            interrupt,
            shutdown,
            listener,
        })
    }

    /// Configuration the extension was loaded with
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    /// Create a session bound to this extension's interrupt source.
    pub fn session(&self) -> Result<Session> {
        let easy = Easy::with_config(self.config.easy.clone())?;
        Ok(Session::new(easy, self.interrupt.clone()))
    }

    /// Abort every transfer currently running in any session.
    pub fn interrupt(&self) {
        warn!("interrupt requested; aborting in-flight transfers");
        self.interrupt.trigger();
    }

    /// Shared interrupt source
    pub fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Whether the Ctrl-C listener is running
    pub fn has_signal_listener(&self) -> bool {
        self.listener.as_ref().is_some_and(|l| !l.is_finished())
    }

    /// Stop the listener and cancel outstanding work.
    pub fn unload(mut self) {
        self.stop();
        info!("extension unloaded");
    }

    fn stop(&mut self) {
        self.shutdown.cancel();
        self.interrupt.close();
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

impl Drop for Extension {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn listen(interrupt: Interrupt, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    warn!("interrupt received; aborting in-flight transfers");
                    interrupt.trigger();
                }
                Err(e) => {
                    warn!(error = %e, "cannot listen for interrupts");
                    break;
                }
            },
        }
    }
}
