//! Session management
//!
//! A session owns a console and the consuming end of its receive queue. On a
//! host, a reader thread plays the part of the UART receive interrupt: it
//! collects input and pushes it into the queue, while the main loop drains
//! the queue into the console.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use super::console::Console;
use super::output::Transport;
use super::rx::{RxConsumer, RxProducer};

/// A console session
pub struct Session {
    /// The console being driven
    pub console: Console,
    /// Receive queue, console side
    rx: RxConsumer,
    /// Running flag, shared with the reader thread and with commands
    running: Arc<AtomicBool>,
    /// Reader thread handle
    reader_thread: Option<JoinHandle<()>>,
}

impl Session {
    /// Create a session; `running` is set to true
    pub fn new(console: Console, rx: RxConsumer, running: Arc<AtomicBool>) -> Self {
        running.store(true, Ordering::SeqCst);
        Self {
            console,
            rx,
            running,
            reader_thread: None,
        }
    }

    /// Start the reader thread.
    ///
    /// `read` is called in a loop until the session stops. It returns the
    /// bytes received since the last call (possibly none), or `None` once
    /// the input is closed.
    pub fn start<F>(&mut self, mut producer: RxProducer, mut read: F)
    where
        F: FnMut() -> io::Result<Option<Vec<u8>>> + Send + 'static,
    {
        let running = self.running.clone();
        let reader_thread = thread::spawn(move || {
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                match read() {
                    Ok(Some(bytes)) => {
                        let queued = producer.push_all(&bytes);
                        if queued < bytes.len() {
                            warn!(
                                "Receive queue full, dropped {} bytes ({} overruns)",
                                bytes.len() - queued,
                                producer.overruns()
                            );
                        }
                    }
                    Ok(None) => {
                        info!("Input closed");
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                    Err(e) => {
                        warn!("Input error: {}", e);
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }
        });

        self.reader_thread = Some(reader_thread);
    }

    /// Check if session is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Bytes received but not yet processed
    pub fn pending(&self) -> usize {
        self.rx.available()
    }

    /// Feed every pending byte to the console (non-blocking)
    pub fn process_input(&mut self, out: &mut dyn Transport) -> usize {
        self.console.poll(&mut self.rx, out)
    }

    /// Stop the reader thread and wait for it
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.reader_thread.take() {
            if handle.join().is_err() {
                warn!("Reader thread panicked");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
