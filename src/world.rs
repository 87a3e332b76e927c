//! Assembly and scheduling context for a set of control systems.
//!
//! `World` owns the connection builder, the shared monotonic clock, the
//! global stop flag, and the background threads. Each background system runs
//! its own cooperative loop on a named thread (tick, then sleep for the
//! duration the tick asked for) and reports a fatal tick error back over a
//! channel; the foreground loop in `run` polls that channel once per tick
//! and surfaces the first fault to the caller.

use crossbeam_channel::{Receiver as ChannelReceiver, Sender as ChannelSender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::signal::{Emitter, Receiver};
use crate::{Result, WaldoError};

/// Monotonic clock shared by every port of one world. Stamps messages with
/// nanoseconds since the world was created.
pub struct WorldClock {
    epoch: Instant,
}

impl WorldClock {
    fn new() -> WorldClock {
        WorldClock { epoch: Instant::now() }
    }

    pub fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// One independently scheduled component. `tick` must not block on I/O:
/// missing input is an ordinary `None` read, and the returned duration is
/// how long the scheduler should suspend the system before the next tick.
pub trait ControlSystem: Send {
    fn tick(&mut self) -> Result<Duration>;
}

pub struct World {
    clock: Arc<WorldClock>,
    stop: Arc<AtomicBool>,
    fault_tx: ChannelSender<WaldoError>,
    fault_rx: ChannelReceiver<WaldoError>,
    threads: Vec<JoinHandle<()>>,
}

impl World {
    pub fn new() -> World {
        let (fault_tx, fault_rx) = crossbeam_channel::unbounded();
        World {
            clock: Arc::new(WorldClock::new()),
            stop: Arc::new(AtomicBool::new(false)),
            fault_tx,
            fault_rx,
            threads: Vec::new(),
        }
    }

    pub fn clock(&self) -> Arc<WorldClock> {
        self.clock.clone()
    }

    /// Shared stop flag, e.g. for a Ctrl-C handler.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Unicast connection. Wiring to a declared-absent sink adds no edge.
    pub fn connect<T>(&mut self, tx: &mut Emitter<T>, rx: &mut Receiver<T>)
    where
        T: Clone + Send + 'static,
    {
        if rx.is_sink() {
            return;
        }
        let cell = rx.bind();
        tx.add_direct(self.clock.clone(), cell);
    }

    /// Unicast connection with an in-transit value transform.
    pub fn connect_map<T, U, F>(&mut self, tx: &mut Emitter<T>, rx: &mut Receiver<U>, map: F)
    where
        T: Send + 'static,
        U: Clone + Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        if rx.is_sink() {
            return;
        }
        let cell = rx.bind();
        tx.add_mapped(self.clock.clone(), cell, map);
    }

    /// Fan one emitter out to several receivers, each with independent
    /// freshness. Sinks are filtered here, once; a connection left with no
    /// receivers is an assembly error, not a silent runtime drop.
    pub fn connect_broadcast<T>(
        &mut self,
        signal: &str,
        tx: &mut Emitter<T>,
        receivers: Vec<&mut Receiver<T>>,
    ) -> Result<()>
    where
        T: Clone + Send + 'static,
    {
        let live: Vec<&mut Receiver<T>> =
            receivers.into_iter().filter(|rx| !rx.is_sink()).collect();
        if live.is_empty() {
            return Err(WaldoError::NoReceivers { signal: signal.to_string() });
        }
        for rx in live {
            self.connect(tx, rx);
        }
        Ok(())
    }

    /// Run a control system on its own named background thread until the
    /// world stops or the system faults. A fault stops only that thread;
    /// `run` picks it up and stops the rest of the world.
    pub fn spawn<S>(&mut self, name: &str, mut system: S) -> Result<()>
    where
        S: ControlSystem + 'static,
    {
        let stop = self.stop.clone();
        let faults = self.fault_tx.clone();
        let system_name = name.to_string();

        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                log::debug!("control system '{}' started", system_name);
                while !stop.load(Ordering::Relaxed) {
                    match system.tick() {
                        Ok(pause) => std::thread::sleep(pause),
                        Err(e) => {
                            log::error!("control system '{}' failed: {}", system_name, e);
                            let _ = faults.send(WaldoError::Background {
                                system: system_name,
                                source: Box::new(e),
                            });
                            return;
                        }
                    }
                }
                log::debug!("control system '{}' stopped", system_name);
            })
            .map_err(|e| WaldoError::Fault(format!("failed to spawn '{}': {}", name, e)))?;

        self.threads.push(handle);
        Ok(())
    }

    /// Drive the foreground control system until the world stops. The first
    /// error, foreground or background, stops everything and is returned to
    /// the supervisor; the core never retries on its own.
    pub fn run(&mut self, main: &mut dyn ControlSystem) -> Result<()> {
        while !self.should_stop() {
            if let Ok(fault) = self.fault_rx.try_recv() {
                self.request_stop();
                return Err(fault);
            }
            match main.tick() {
                Ok(pause) => std::thread::sleep(pause),
                Err(e) => {
                    self.request_stop();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl Default for World {
    fn default() -> World {
        World::new()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.request_stop();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}
