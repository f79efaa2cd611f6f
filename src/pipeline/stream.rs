use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;

use super::source::LandmarkSource;
use crate::types::LandmarkFrame;

#[derive(Debug)]
pub struct SourceStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<u64>>,
}

impl SourceStream {
    pub fn stop(mut self) -> thread::Result<u64> {
        self.stop.store(true, Ordering::SeqCst);
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(0),
        }
    }

    pub fn join(mut self) -> thread::Result<u64> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(0),
        }
    }
}

impl Drop for SourceStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Starts reading frames, one per `frame_interval`. Frames are offered with
/// `try_send`, so a slow consumer only ever sees the newest one. The sender
/// is dropped when the source runs dry, which disconnects the consumer.
pub fn start_source_stream<S>(
    mut source: S,
    frame_interval: Duration,
    frame_tx: Sender<LandmarkFrame>,
) -> SourceStream
where
    S: LandmarkSource + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let mut produced = 0u64;
        while !stop_flag.load(Ordering::Relaxed) {
            let Some(frame) = source.next_frame() else {
                log::info!("landmark source exhausted after {produced} frames");
                break;
            };
            produced += 1;

            // Drop if the game loop is busy.
            let _ = frame_tx.try_send(frame);

            if !frame_interval.is_zero() {
                thread::sleep(frame_interval);
            }
        }
        produced
    });

    SourceStream {
        stop,
        handle: Some(handle),
    }
}
