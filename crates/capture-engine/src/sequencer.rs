//! The countdown sequencer.
//!
//! A booth run is a timed loop: count 3-2-1, take a shot, pause, and
//! repeat until the layout's shot count is reached. The loop is split
//! into a pure state machine ([`Sequencer`]) and an async driver
//! ([`run_capture_sequence`]) that sleeps on an injected [`Clock`], so
//! the whole cadence is testable with virtual time.

use std::time::Duration;

use picapica_booth_model::{CaptureSession, Frame};
use picapica_common::clock::Clock;
use picapica_common::config::BoothDefaults;
use picapica_common::BoothResult;
use tokio::sync::mpsc::UnboundedSender;

use crate::capturer::capture_from_source;
use crate::source::FrameSource;

/// Timing knobs for a capture sequence.
#[derive(Debug, Clone)]
pub struct SequenceTiming {
    /// Countdown start value for each shot.
    pub countdown_from: u32,

    /// Interval between countdown ticks.
    pub tick: Duration,

    /// Pause between a capture and the next countdown.
    pub shot_delay: Duration,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            tick: Duration::from_millis(1000),
            shot_delay: Duration::from_millis(500),
        }
    }
}

impl From<&BoothDefaults> for SequenceTiming {
    fn from(defaults: &BoothDefaults) -> Self {
        Self {
            countdown_from: defaults.countdown_from,
            tick: Duration::from_millis(defaults.tick_ms),
            shot_delay: Duration::from_millis(defaults.shot_delay_ms),
        }
    }
}

/// Where the sequencer is between timer firings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No sequence running.
    Idle,

    /// Counting down toward the next shot.
    Counting {
        shots_remaining: u32,
        seconds_left: u32,
    },

    /// A shot was just taken; waiting out the inter-shot pause.
    PostShot { shots_remaining: u32 },
}

/// What the driver must do after a timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Show the new countdown value.
    Tick(u32),

    /// Countdown hit zero: take a shot now.
    Capture,

    /// All shots taken; the sequence is over.
    Complete,
}

/// Observable progress of a booth run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoothEvent {
    /// The visible countdown number changed.
    Countdown(u32),

    /// A shot landed in the session at `index`.
    Captured { index: usize },

    /// The run finished with `captured` shots in capture order.
    SequenceComplete { captured: usize },
}

/// Pure countdown state machine. Knows nothing about clocks, sources,
/// or sessions; the driver feeds it timer firings.
#[derive(Debug)]
pub struct Sequencer {
    countdown_from: u32,
    phase: Phase,
}

impl Sequencer {
    pub fn new(countdown_from: u32) -> Self {
        Self {
            countdown_from: countdown_from.max(1),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Arm a run of `shots` shots. No-op (returns false) unless idle.
    pub fn begin(&mut self, shots: u32) -> bool {
        if self.phase != Phase::Idle || shots == 0 {
            return false;
        }
        self.phase = Phase::Counting {
            shots_remaining: shots,
            seconds_left: self.countdown_from,
        };
        true
    }

    /// How long the driver should sleep before the next `on_timer`,
    /// or `None` when idle.
    pub fn next_delay(&self, timing: &SequenceTiming) -> Option<Duration> {
        match self.phase {
            Phase::Idle => None,
            Phase::Counting { .. } => Some(timing.tick),
            Phase::PostShot { .. } => Some(timing.shot_delay),
        }
    }

    /// Advance on timer expiry.
    pub fn on_timer(&mut self) -> Step {
        match self.phase {
            Phase::Idle => Step::Complete,
            Phase::Counting {
                shots_remaining,
                seconds_left,
            } => {
                if seconds_left > 1 {
                    self.phase = Phase::Counting {
                        shots_remaining,
                        seconds_left: seconds_left - 1,
                    };
                    Step::Tick(seconds_left - 1)
                } else {
                    // Countdown reaches zero on this firing.
                    self.phase = Phase::PostShot {
                        shots_remaining: shots_remaining - 1,
                    };
                    Step::Capture
                }
            }
            Phase::PostShot { shots_remaining } => {
                if shots_remaining > 0 {
                    self.phase = Phase::Counting {
                        shots_remaining,
                        seconds_left: self.countdown_from,
                    };
                    Step::Tick(self.countdown_from)
                } else {
                    self.phase = Phase::Idle;
                    Step::Complete
                }
            }
        }
    }
}

/// Run one full countdown/capture sequence against `session`.
///
/// Returns `Ok(None)` without touching anything if a sequence is
/// already running (the entry guard). Otherwise clears the session's
/// frames, runs the full cadence, and returns the captured frames in
/// order. Shots the capturer could not produce (no video source) are
/// skipped; the run still completes and reports what it got.
///
/// If the returned future is dropped mid-run, the session keeps its
/// `capturing` flag; callers tearing down a booth view should
/// `finish_capturing` (or drop the session) before starting another.
pub async fn run_capture_sequence(
    session: &mut CaptureSession,
    source: &mut dyn FrameSource,
    clock: &dyn Clock,
    timing: &SequenceTiming,
    events: Option<&UnboundedSender<BoothEvent>>,
) -> BoothResult<Option<Vec<Frame>>> {
    if !session.begin_capturing() {
        tracing::debug!("capture already in progress; start ignored");
        return Ok(None);
    }
    session.reset();

    let shot_count = session.shot_count() as u32;
    let layout = session.layout();
    tracing::info!(%layout, shot_count, "starting capture sequence");

    let mut sequencer = Sequencer::new(timing.countdown_from);
    sequencer.begin(shot_count);
    emit(events, BoothEvent::Countdown(timing.countdown_from));

    while let Some(delay) = sequencer.next_delay(timing) {
        clock.sleep(delay).await;

        match sequencer.on_timer() {
            Step::Tick(n) => emit(events, BoothEvent::Countdown(n)),
            Step::Capture => {
                emit(events, BoothEvent::Countdown(0));
                match capture_from_source(source, layout, session.filter()) {
                    Some(frame) => match session.push_frame(frame) {
                        Ok(index) => emit(events, BoothEvent::Captured { index }),
                        Err(e) => {
                            tracing::error!(error = %e, "frame append rejected");
                            break;
                        }
                    },
                    None => tracing::warn!("no video frame available; shot skipped"),
                }
            }
            Step::Complete => break,
        }
    }

    session.finish_capturing();
    let frames = session.frames().to_vec();
    tracing::info!(captured = frames.len(), "capture sequence complete");
    emit(
        events,
        BoothEvent::SequenceComplete {
            captured: frames.len(),
        },
    );
    Ok(Some(frames))
}

fn emit(events: Option<&UnboundedSender<BoothEvent>>, event: BoothEvent) {
    if let Some(tx) = events {
        // Receiver gone just means nobody is watching the countdown.
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NullSource, TestPatternSource};
    use picapica_booth_model::Layout;
    use picapica_common::clock::ManualClock;

    #[test]
    fn begin_is_rejected_unless_idle() {
        let mut seq = Sequencer::new(3);
        assert!(seq.begin(4));
        assert!(!seq.begin(4));
        assert_eq!(
            seq.phase(),
            Phase::Counting {
                shots_remaining: 4,
                seconds_left: 3
            }
        );
    }

    #[test]
    fn one_shot_cadence() {
        let mut seq = Sequencer::new(3);
        seq.begin(1);
        assert_eq!(seq.on_timer(), Step::Tick(2));
        assert_eq!(seq.on_timer(), Step::Tick(1));
        assert_eq!(seq.on_timer(), Step::Capture);
        assert_eq!(seq.on_timer(), Step::Complete);
        assert!(seq.is_idle());
    }

    #[test]
    fn rearm_between_shots() {
        let mut seq = Sequencer::new(3);
        seq.begin(2);
        seq.on_timer();
        seq.on_timer();
        assert_eq!(seq.on_timer(), Step::Capture);
        // Inter-shot pause elapses, countdown re-arms at 3.
        assert_eq!(seq.on_timer(), Step::Tick(3));
        assert_eq!(
            seq.phase(),
            Phase::Counting {
                shots_remaining: 1,
                seconds_left: 3
            }
        );
    }

    #[test]
    fn delays_follow_phase() {
        let timing = SequenceTiming::default();
        let mut seq = Sequencer::new(3);
        assert_eq!(seq.next_delay(&timing), None);

        seq.begin(1);
        assert_eq!(seq.next_delay(&timing), Some(Duration::from_millis(1000)));

        seq.on_timer();
        seq.on_timer();
        seq.on_timer(); // capture
        assert_eq!(seq.next_delay(&timing), Some(Duration::from_millis(500)));
    }

    #[tokio::test]
    async fn full_sequence_captures_in_order() {
        let mut session = CaptureSession::new(Layout::ThreeByTwo);
        let mut source = TestPatternSource::new(640, 480);
        let clock = ManualClock::new();
        let timing = SequenceTiming::default();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let frames =
            run_capture_sequence(&mut session, &mut source, &clock, &timing, Some(&tx))
                .await
                .unwrap()
                .expect("sequence should run");

        assert_eq!(frames.len(), 6);
        assert!(!session.is_capturing());
        for frame in &frames {
            assert_eq!((frame.width(), frame.height()), (600, 600));
        }

        // 6 shots x (3 ticks + 1 pause).
        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 24);
        assert_eq!(
            sleeps.iter().filter(|d| **d == timing.tick).count(),
            18
        );
        assert_eq!(
            sleeps.iter().filter(|d| **d == timing.shot_delay).count(),
            6
        );

        // Events arrive in strict order: 3,2,1,0,shot for each round.
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 6 * 5 + 1);
        assert_eq!(events[0], BoothEvent::Countdown(3));
        assert_eq!(events[4], BoothEvent::Captured { index: 0 });
        assert_eq!(events[9], BoothEvent::Captured { index: 1 });
        assert_eq!(
            events.last(),
            Some(&BoothEvent::SequenceComplete { captured: 6 })
        );
    }

    #[tokio::test]
    async fn four_shot_layouts_capture_four() {
        for layout in [Layout::FourByTwo, Layout::TwoByTwo] {
            let mut session = CaptureSession::new(layout);
            let mut source = TestPatternSource::new(1280, 720);
            let clock = ManualClock::new();
            let timing = SequenceTiming::default();

            let frames = run_capture_sequence(&mut session, &mut source, &clock, &timing, None)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(frames.len(), 4, "{layout}");
        }
    }

    #[tokio::test]
    async fn start_while_capturing_is_a_noop() {
        let mut session = CaptureSession::new(Layout::TwoByTwo);
        assert!(session.begin_capturing());
        let before = session.frames().len();

        let mut source = TestPatternSource::new(640, 480);
        let clock = ManualClock::new();
        let timing = SequenceTiming::default();

        let result = run_capture_sequence(&mut session, &mut source, &clock, &timing, None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(session.frames().len(), before);
        assert!(session.is_capturing());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn dry_source_completes_with_no_frames() {
        let mut session = CaptureSession::new(Layout::TwoByTwo);
        let mut source = NullSource;
        let clock = ManualClock::new();
        let timing = SequenceTiming::default();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let frames = run_capture_sequence(&mut session, &mut source, &clock, &timing, Some(&tx))
            .await
            .unwrap()
            .unwrap();
        assert!(frames.is_empty());
        assert!(!session.is_capturing());

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert_eq!(last, Some(BoothEvent::SequenceComplete { captured: 0 }));
    }
}
