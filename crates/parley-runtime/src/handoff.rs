//! Bounded handoff channel between the execution task and the event
//! sequencer.

use parley_contract::executor::{ExecutionError, OutputChunk};
use tokio::sync::mpsc;

/// Handoff channel capacity. A slow consumer applies backpressure to the
/// producer through the bounded channel rather than buffering unboundedly.
pub const HANDOFF_CAPACITY: usize = 64;

/// One item handed from the execution task to the sequencer.
#[derive(Debug)]
pub enum HandoffItem {
    /// Incremental output, in production order.
    Chunk(OutputChunk),
    /// Terminal failure marker. At most one per run, and always the last
    /// item the producer sends.
    Failed(ExecutionError),
}

pub(crate) fn channel() -> (mpsc::Sender<HandoffItem>, mpsc::Receiver<HandoffItem>) {
    mpsc::channel(HANDOFF_CAPACITY)
}
