//! Runs flow commands on the tokio runtime for the synchronous TUI loop.
//!
//! Completions come back as flow events over a std channel; the UI drains it
//! between frames.

use std::sync::mpsc;

use palm_core::{Command, Event};
use palm_oracle::InsightAdapter;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub struct Worker {
    handle: Handle,
    adapter: InsightAdapter,
    tx: mpsc::Sender<Event>,
    in_flight: Vec<JoinHandle<()>>,
}

impl Worker {
    pub fn new(handle: Handle, adapter: InsightAdapter) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                handle,
                adapter,
                tx,
                in_flight: Vec::new(),
            },
            rx,
        )
    }

    pub fn execute(&mut self, commands: Vec<Command>) {
        self.in_flight.retain(|h| !h.is_finished());
        for command in commands {
            let tx = self.tx.clone();
            let task = match command {
                Command::Schedule(timer) => self.handle.spawn(async move {
                    tokio::time::sleep(timer.delay).await;
                    let _ = tx.send(Event::TimerFired(timer));
                }),
                Command::RequestInsight(request) => {
                    let adapter = self.adapter.clone();
                    self.handle.spawn(async move {
                        let result = adapter.generate(&request).await;
                        let _ = tx.send(Event::InsightReady {
                            generation: request.generation,
                            result: Box::new(result),
                        });
                    })
                }
            };
            self.in_flight.push(task);
        }
    }

    /// Abort everything still pending. Late events would be ignored anyway.
    pub fn cancel_all(&mut self) {
        for h in self.in_flight.drain(..) {
            h.abort();
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }
}
