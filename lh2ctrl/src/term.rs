use std::io;
use strum::Display;
use tokio::signal::unix::{signal, Signal, SignalKind};

/// External termination request kinds that trigger fleet shutdown.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum TermSignal {
    #[strum(serialize = "SIGTERM")]
    Terminate,
    #[strum(serialize = "SIGHUP")]
    Hangup,
}

/// Listens for SIGTERM/SIGHUP.
///
/// Handlers are installed on construction and stay installed for the process
/// lifetime, so a signal arriving while nobody is waiting is held and
/// observed by the next `recv`.
#[derive(Debug)]
pub struct Termination {
    terminate: Signal,
    hangup: Signal,
}

impl Termination {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Completes when either signal is received.
    pub async fn recv(&mut self) -> TermSignal {
        tokio::select! {
            _ = self.terminate.recv() => TermSignal::Terminate,
            _ = self.hangup.recv() => TermSignal::Hangup,
        }
    }
}
