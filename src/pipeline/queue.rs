//! Bounded single-producer/single-consumer hand-off between discovery and extraction.
//!
//! End-of-stream is signalled by dropping the producer: the consumer then drains whatever is
//! still queued and stops.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::Reference;

/// Create a queue holding at most `capacity` unconsumed references (minimum 1).
pub fn bounded_queue(capacity: usize) -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = bounded::<Reference>(capacity.max(1));
    (
        QueueProducer {
            tx,
            max_depth: 0,
        },
        QueueConsumer { rx },
    )
}

pub struct QueueProducer {
    tx: Sender<Reference>,
    max_depth: usize,
}

impl QueueProducer {
    /// Enqueue, blocking while the queue is full. Gives the reference back if the consumer
    /// has gone away.
    pub fn push(&mut self, reference: Reference) -> Result<(), Reference> {
        self.tx.send(reference).map_err(|e| e.into_inner())?;
        self.max_depth = self.max_depth.max(self.tx.len());
        Ok(())
    }

    /// Highest occupancy observed right after an enqueue.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Signal end-of-stream. Returns the observed maximum depth.
    pub fn close(self) -> usize {
        self.max_depth
    }
}

pub struct QueueConsumer {
    rx: Receiver<Reference>,
}

impl Iterator for QueueConsumer {
    type Item = Reference;

    /// Blocks while the queue is empty and the producer is alive.
    fn next(&mut self) -> Option<Reference> {
        self.rx.recv().ok()
    }
}
