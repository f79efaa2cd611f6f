mod replay;
mod runner;
mod source;
mod stream;

use crossbeam_channel::Receiver;

pub use replay::{RecordedFrame, Recorder, ReplaySource};
pub use runner::{RunSummary, Runner};
pub use source::{LandmarkSource, MAX_HANDS, ScriptedSource};
pub use stream::{SourceStream, start_source_stream};

/// Blocks for the next item, then skips ahead to the newest one queued.
pub fn recv_latest_frame<T>(frame_rx: &Receiver<T>) -> Option<T> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}
