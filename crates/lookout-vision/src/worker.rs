use lookout_base::Tensor;
use lookout_infer::{Gesture, GestureClassifier, HandLandmarker, HandLandmarks};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};

const RESULT_CAPACITY: usize = 4;

/// Strictly increasing millisecond timestamps since creation.
#[derive(Debug)]
pub struct Timestamps {
    start: Instant,
    last: Option<u64>,
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::new()
    }
}

impl Timestamps {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: None,
        }
    }

    pub fn next(&mut self) -> u64 {
        let elapsed = self.start.elapsed().as_millis() as u64;
        self.next_at(elapsed)
    }

    /// Timestamp for a frame seen `elapsed_ms` after start, bumped past the previous one if needed.
    pub fn next_at(&mut self, elapsed_ms: u64) -> u64 {
        let ts = match self.last {
            Some(last) => elapsed_ms.max(last + 1),
            None => elapsed_ms,
        };
        self.last = Some(ts);
        ts
    }
}

struct Request {
    seq: u64,
    timestamp_ms: u64,
    frame: Tensor<u8>,
}

/// Hands and gestures found in frame `seq`.
#[derive(Debug, Clone)]
pub struct GestureResult {
    pub seq: u64,
    pub timestamp_ms: u64,
    pub hands: Vec<(HandLandmarks, Option<Gesture>)>,
}

impl GestureResult {
    /// Whether the result may still be drawn on frame `current_seq`.
    pub fn is_fresh(&self, current_seq: u64, stale_after_frames: u64) -> bool {
        current_seq.saturating_sub(self.seq) <= stale_after_frames
    }
}

/// Runs hand landmarks and gesture classification on a dedicated thread.
///
/// Frames go in through a single-slot channel: while the worker is busy, new frames are
/// refused rather than queued. Results are collected with [`drain`](Self::drain).
pub struct GestureWorker {
    requests: Option<mpsc::Sender<Request>>,
    results: Option<mpsc::Receiver<GestureResult>>,
    timestamps: Timestamps,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for GestureWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureWorker")
            .field("running", &self.thread_handle.is_some())
            .finish()
    }
}

impl GestureWorker {
    pub fn spawn<L, G>(landmarker: L, classifier: G) -> Self
    where
        L: HandLandmarker + Send + 'static,
        G: GestureClassifier + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel(1);
        let (result_tx, result_rx) = mpsc::channel(RESULT_CAPACITY);

        let handle = thread::spawn(move || {
            worker_loop(landmarker, classifier, request_rx, result_tx);
        });

        Self {
            requests: Some(request_tx),
            results: Some(result_rx),
            timestamps: Timestamps::new(),
            thread_handle: Some(handle),
        }
    }

    /// Hands frame `seq` to the worker. Returns `false` if the worker was busy and the frame was
    /// dropped, or if the worker has stopped.
    ///
    /// The frame is only copied once the worker has room for it.
    pub fn submit(&mut self, seq: u64, frame: &Tensor<u8>) -> bool {
        let Some(requests) = &self.requests else {
            return false;
        };
        match requests.try_reserve() {
            Ok(permit) => {
                permit.send(Request {
                    seq,
                    timestamp_ms: self.timestamps.next(),
                    frame: frame.clone(),
                });
                true
            }
            Err(TrySendError::Full(())) => {
                log::trace!("gesture worker busy, dropping frame {seq}");
                false
            }
            Err(TrySendError::Closed(())) => {
                log::warn!("gesture worker stopped, dropping frame {seq}");
                false
            }
        }
    }

    /// Collects everything the worker has finished since the last call and returns the newest.
    pub fn drain(&mut self) -> Option<GestureResult> {
        let results = self.results.as_mut()?;
        let mut latest = None;
        while let Ok(result) = results.try_recv() {
            latest = Some(result);
        }
        latest
    }
}

impl Drop for GestureWorker {
    fn drop(&mut self) {
        // closing both channels ends the worker loop
        drop(self.requests.take());
        drop(self.results.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop<L, G>(
    mut landmarker: L,
    mut classifier: G,
    mut requests: mpsc::Receiver<Request>,
    results: mpsc::Sender<GestureResult>,
) where
    L: HandLandmarker,
    G: GestureClassifier,
{
    while let Some(request) = requests.blocking_recv() {
        let hands = match landmarker.landmarks(&request.frame) {
            Ok(hands) => hands,
            Err(e) => {
                log::warn!("hand landmarks failed on frame {}: {e}", request.seq);
                continue;
            }
        };

        let hands = hands
            .into_iter()
            .map(|hand| {
                let gesture = classifier.classify(&hand).unwrap_or_else(|e| {
                    log::warn!("gesture classification failed on frame {}: {e}", request.seq);
                    None
                });
                (hand, gesture)
            })
            .collect();

        let result = GestureResult {
            seq: request.seq,
            timestamp_ms: request.timestamp_ms,
            hands,
        };
        if results.blocking_send(result).is_err() {
            break;
        }
    }
    log::debug!("gesture worker stopped");
}
