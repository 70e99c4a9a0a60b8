use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::system::scheduler::SampleOutcome;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Sample(SampleOutcome),
}

/// Merges terminal input with snapshots published by the sampling scheduler.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(mut samples: mpsc::UnboundedReceiver<SampleOutcome>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();

        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut sampling = true;

            loop {
                tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(evt)) => {
                                let mapped = match evt {
                                    CrosstermEvent::Key(key) => Some(Event::Key(key)),
                                    CrosstermEvent::Resize(_, _) => Some(Event::Resize),
                                    _ => None,
                                };
                                if let Some(e) = mapped
                                    && tx.send(e).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(_)) => break,
                            None => break,
                        }
                    }
                    maybe_sample = samples.recv(), if sampling => {
                        // Keep serving input after the scheduler goes away.
                        let Some(outcome) = maybe_sample else {
                            sampling = false;
                            continue;
                        };
                        if tx.send(Event::Sample(outcome)).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, _task: task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
