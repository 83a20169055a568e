//! Landmark ingest on a worker thread
//!
//! Detectors usually deliver results on their own background thread. The
//! feed moves one [`StrokeTracker`] onto a dedicated worker, accepts frames
//! over a bounded channel and hands back updates in frame order. A shared
//! snapshot lets a render thread read the latest strokes without touching
//! the tracker. Events that the consumer does not read in time are dropped
//! and counted; the snapshot always stays complete.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use glam::DVec2;
use parking_lot::Mutex;

use crate::landmarks::HandObservation;
use crate::mapper::CoordinateMapper;
use crate::stroke::Stroke;
use crate::tracker::{DrawingState, FrameReport, StrokeTracker, StrokeUpdate};

/// Default number of frames that may wait for the worker
pub const DEFAULT_QUEUE_DEPTH: usize = 2;

/// Default number of unread events kept for the consumer
pub const DEFAULT_EVENT_DEPTH: usize = 256;

/// Detector output for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    /// Monotonic frame number assigned by the producer
    pub frame_number: u64,
    /// Detected hand, `None` when tracking is lost
    pub hand: Option<HandObservation>,
}

impl HandFrame {
    pub fn new(frame_number: u64, hand: Option<HandObservation>) -> Self {
        Self { frame_number, hand }
    }
}

/// Event produced by the worker
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A frame was processed
    Frame { frame_number: u64, report: FrameReport },
    /// Strokes were cleared
    Cleared { discarded: usize },
}

/// Latest tracker state, readable from any thread
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// All strokes, the last one open while drawing
    pub strokes: Vec<Stroke>,
    /// Current pen state
    pub state: DrawingState,
    /// Pen indicator position
    pub indicator: Option<DVec2>,
    /// Last accepted frame number
    pub last_frame: Option<u64>,
    /// Frames run through the tracker
    pub frames_processed: u64,
    /// Frames refused for arriving out of order
    pub frames_rejected: u64,
}

enum Command {
    Frame(HandFrame),
    Clear,
}

/// Tracker running on a background thread
pub struct ObservationFeed {
    /// Channel to send frames and control messages to the worker
    command_sender: Option<Sender<Command>>,
    /// Events from the worker, in processing order
    event_receiver: Receiver<FeedEvent>,
    /// Latest state published by the worker
    snapshot: Arc<Mutex<FeedSnapshot>>,
    /// Whether the worker is running
    running: Arc<AtomicBool>,
    /// Frames refused because the queue was full
    dropped_frames: AtomicU64,
    /// Events discarded because the consumer fell behind
    dropped_events: Arc<AtomicU64>,
    /// Worker thread handle
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl ObservationFeed {
    /// Start a worker with the default queue depth
    pub fn spawn<M>(tracker: StrokeTracker<M>) -> std::io::Result<Self>
    where
        M: CoordinateMapper + Send + 'static,
    {
        Self::with_queue_depth(tracker, DEFAULT_QUEUE_DEPTH)
    }

    /// Start a worker accepting up to `queue_depth` pending frames
    pub fn with_queue_depth<M>(tracker: StrokeTracker<M>, queue_depth: usize) -> std::io::Result<Self>
    where
        M: CoordinateMapper + Send + 'static,
    {
        Self::with_depths(tracker, queue_depth, DEFAULT_EVENT_DEPTH)
    }

    /// Start a worker with explicit frame queue and event buffer sizes
    pub fn with_depths<M>(
        tracker: StrokeTracker<M>,
        queue_depth: usize,
        event_depth: usize,
    ) -> std::io::Result<Self>
    where
        M: CoordinateMapper + Send + 'static,
    {
        let (command_sender, command_receiver) = crossbeam_channel::bounded(queue_depth.max(1));
        let (event_sender, event_receiver) = crossbeam_channel::bounded(event_depth.max(1));
        let snapshot = Arc::new(Mutex::new(FeedSnapshot::default()));
        let running = Arc::new(AtomicBool::new(true));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let snapshot_clone = snapshot.clone();
        let running_clone = running.clone();
        let dropped_events_clone = dropped_events.clone();

        let thread_handle = std::thread::Builder::new()
            .name("stroke-tracker".to_string())
            .spawn(move || {
                Self::worker_thread(
                    tracker,
                    command_receiver,
                    event_sender,
                    snapshot_clone,
                    dropped_events_clone,
                );
                running_clone.store(false, Ordering::Release);
            })?;

        Ok(Self {
            command_sender: Some(command_sender),
            event_receiver,
            snapshot,
            running,
            dropped_frames: AtomicU64::new(0),
            dropped_events,
            thread_handle: Some(thread_handle),
        })
    }

    /// Worker main loop
    fn worker_thread<M: CoordinateMapper>(
        mut tracker: StrokeTracker<M>,
        commands: Receiver<Command>,
        events: Sender<FeedEvent>,
        snapshot: Arc<Mutex<FeedSnapshot>>,
        dropped_events: Arc<AtomicU64>,
    ) {
        log::info!("Stroke tracker worker started");

        while let Ok(command) = commands.recv() {
            let event = match command {
                Command::Frame(frame) => {
                    let last_frame = snapshot.lock().last_frame;
                    if let Some(last) = last_frame.filter(|&last| frame.frame_number <= last) {
                        log::warn!(
                            "Dropping out-of-order frame {} (last processed {})",
                            frame.frame_number,
                            last
                        );
                        snapshot.lock().frames_rejected += 1;
                        continue;
                    }

                    let report = tracker.on_observation(frame.hand.as_ref());
                    Self::publish(&tracker, &snapshot, frame.frame_number, &report.update);
                    FeedEvent::Frame {
                        frame_number: frame.frame_number,
                        report,
                    }
                }
                Command::Clear => {
                    let discarded = tracker.clear();
                    let mut published = snapshot.lock();
                    published.strokes.clear();
                    published.state = tracker.state();
                    published.indicator = tracker.indicator();
                    FeedEvent::Cleared { discarded }
                }
            };

            // Consumer may only read the snapshot; keep tracking regardless
            if let Err(TrySendError::Full(_)) = events.try_send(event) {
                dropped_events.fetch_add(1, Ordering::Relaxed);
            }
        }

        log::info!("Stroke tracker worker stopped");
    }

    /// Mirror one update into the snapshot without copying the history
    fn publish<M: CoordinateMapper>(
        tracker: &StrokeTracker<M>,
        snapshot: &Mutex<FeedSnapshot>,
        frame_number: u64,
        update: &StrokeUpdate,
    ) {
        let mut snapshot = snapshot.lock();
        snapshot.last_frame = Some(frame_number);
        snapshot.frames_processed += 1;

        match *update {
            StrokeUpdate::NoChange => {}
            StrokeUpdate::StrokeStarted(point) => snapshot.strokes.push(Stroke::new(point)),
            StrokeUpdate::SegmentAppended { to, .. } => {
                if let Some(stroke) = snapshot.strokes.last_mut() {
                    stroke.extend_to(to);
                }
            }
            StrokeUpdate::StrokeSealed => {
                if let Some(stroke) = snapshot.strokes.last_mut() {
                    stroke.seal();
                }
            }
        }
        snapshot.state = tracker.state();
        snapshot.indicator = tracker.indicator();
    }

    /// Queue a frame without blocking. Returns false if it was dropped.
    pub fn submit(&self, frame: HandFrame) -> bool {
        let Some(ref sender) = self.command_sender else {
            return false;
        };
        match sender.try_send(Command::Frame(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped_frames.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Queue a frame, waiting for room in the queue
    pub fn submit_blocking(&self, frame: HandFrame) -> bool {
        self.command_sender
            .as_ref()
            .map_or(false, |sender| sender.send(Command::Frame(frame)).is_ok())
    }

    /// Clear all strokes after the frames already queued
    pub fn clear(&self) -> bool {
        self.command_sender
            .as_ref()
            .map_or(false, |sender| sender.send(Command::Clear).is_ok())
    }

    /// Next event, if one is ready
    pub fn try_next_event(&self) -> Option<FeedEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receiver for all worker events
    pub fn events(&self) -> &Receiver<FeedEvent> {
        &self.event_receiver
    }

    /// Copy of the latest published state
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Frames dropped because the worker fell behind
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Events discarded because nobody read them in time
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Stop the worker after it drains queued frames
    pub fn stop(&mut self) {
        // Drop sender to signal thread to stop
        self.command_sender = None;

        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("Stroke tracker worker panicked");
            }
        }
    }
}

impl Drop for ObservationFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::landmarks::LandmarkPoint;

    fn pinch_at(x: f64) -> Option<HandObservation> {
        Some(HandObservation::pinch(
            LandmarkPoint::new(x, 0.5, 0.9),
            LandmarkPoint::new(x + 0.01, 0.5, 0.9),
        ))
    }

    fn feed() -> ObservationFeed {
        ObservationFeed::spawn(StrokeTracker::new(TrackerConfig::default()).unwrap()).unwrap()
    }

    fn drain(feed: &ObservationFeed) -> Vec<FeedEvent> {
        feed.events().try_iter().collect()
    }

    #[test]
    fn test_frames_processed_in_order() {
        let mut feed = feed();
        assert!(feed.submit_blocking(HandFrame::new(1, pinch_at(0.1))));
        assert!(feed.submit_blocking(HandFrame::new(2, pinch_at(0.2))));
        assert!(feed.submit_blocking(HandFrame::new(3, None)));
        feed.stop();

        let events = drain(&feed);
        assert_eq!(events.len(), 3);
        let updates: Vec<StrokeUpdate> = events
            .iter()
            .map(|e| match e {
                FeedEvent::Frame { report, .. } => report.update,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert!(matches!(updates[0], StrokeUpdate::StrokeStarted(_)));
        assert!(matches!(updates[1], StrokeUpdate::SegmentAppended { .. }));
        assert_eq!(updates[2], StrokeUpdate::StrokeSealed);

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.strokes.len(), 1);
        assert!(snapshot.strokes[0].is_sealed());
        assert_eq!(snapshot.last_frame, Some(3));
        assert_eq!(snapshot.frames_processed, 3);
        assert_eq!(snapshot.state, DrawingState::Idle);
        assert!(!feed.is_running());
    }

    #[test]
    fn test_out_of_order_frames_rejected() {
        let mut feed = feed();
        feed.submit_blocking(HandFrame::new(5, pinch_at(0.1)));
        feed.submit_blocking(HandFrame::new(4, pinch_at(0.2)));
        feed.submit_blocking(HandFrame::new(5, pinch_at(0.2)));
        feed.submit_blocking(HandFrame::new(6, pinch_at(0.2)));
        feed.stop();

        let frames: Vec<u64> = drain(&feed)
            .into_iter()
            .filter_map(|e| match e {
                FeedEvent::Frame { frame_number, .. } => Some(frame_number),
                FeedEvent::Cleared { .. } => None,
            })
            .collect();
        assert_eq!(frames, vec![5, 6]);

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.frames_rejected, 2);
        assert_eq!(snapshot.strokes[0].segments().len(), 1);
    }

    #[test]
    fn test_clear_is_ordered_with_frames() {
        let mut feed = feed();
        feed.submit_blocking(HandFrame::new(1, pinch_at(0.1)));
        feed.submit_blocking(HandFrame::new(2, None));
        feed.clear();
        feed.clear();
        feed.stop();

        let cleared: Vec<usize> = drain(&feed)
            .into_iter()
            .filter_map(|e| match e {
                FeedEvent::Cleared { discarded } => Some(discarded),
                FeedEvent::Frame { .. } => None,
            })
            .collect();
        assert_eq!(cleared, vec![1, 0]);
        assert!(feed.snapshot().strokes.is_empty());
    }

    #[test]
    fn test_unread_events_are_bounded() {
        let tracker = StrokeTracker::new(TrackerConfig::default()).unwrap();
        let mut feed = ObservationFeed::with_depths(tracker, 2, 4).unwrap();
        for i in 0..500u64 {
            assert!(feed.submit_blocking(HandFrame::new(i + 1, pinch_at(0.1 + i as f64 * 0.001))));
        }
        feed.stop();

        assert_eq!(feed.events().len(), 4);
        assert_eq!(feed.dropped_events(), 496);

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.frames_processed, 500);
        assert_eq!(snapshot.strokes.len(), 1);
        assert_eq!(snapshot.strokes[0].segments().len(), 499);
    }

    #[test]
    fn test_snapshot_mirrors_tracker() {
        let frames = [
            pinch_at(0.1),
            pinch_at(0.12),
            pinch_at(0.15),
            None,
            pinch_at(0.5),
            pinch_at(0.52),
        ];

        let mut reference = StrokeTracker::new(TrackerConfig::default()).unwrap();
        for hand in &frames {
            reference.on_observation(hand.as_ref());
        }

        let mut feed = feed();
        for (i, hand) in frames.iter().enumerate() {
            feed.submit_blocking(HandFrame::new(i as u64 + 1, hand.clone()));
        }
        feed.stop();

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.strokes, reference.strokes());
        assert_eq!(snapshot.state, reference.state());
        assert_eq!(snapshot.indicator, reference.indicator());
    }

    #[test]
    fn test_full_queue_drops_frames() {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded::<()>();
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        // Holds the worker inside the first pinch frame until the gate closes
        let mapper = move |p: DVec2| {
            let _ = entered_tx.send(());
            let _ = gate_rx.recv();
            p
        };
        let tracker = StrokeTracker::with_mapper(TrackerConfig::default(), mapper).unwrap();
        let mut feed = ObservationFeed::with_queue_depth(tracker, 1).unwrap();

        assert!(feed.submit(HandFrame::new(1, pinch_at(0.1))));
        entered_rx.recv().unwrap();

        assert!(feed.submit(HandFrame::new(2, pinch_at(0.11))));
        assert!(!feed.submit(HandFrame::new(3, pinch_at(0.12))));
        assert!(!feed.submit(HandFrame::new(4, pinch_at(0.13))));
        assert_eq!(feed.dropped_frames(), 2);

        drop(gate_tx);
        feed.stop();

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.frames_processed, 2);
        assert_eq!(snapshot.last_frame, Some(2));
        assert_eq!(snapshot.strokes[0].segments().len(), 1);
    }

    #[test]
    fn test_stopped_feed_refuses_frames() {
        let mut feed = feed();
        feed.stop();
        assert!(!feed.submit(HandFrame::new(1, None)));
        assert!(!feed.submit_blocking(HandFrame::new(1, None)));
        assert!(!feed.clear());
    }
}
