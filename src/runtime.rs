//! Session runtime.
//!
//! Drives an [`AnnotatorApp`] against a concrete [`FrameStore`]: executes
//! the effects each update returns, feeds completions back in as messages,
//! and owns the timer queue for delayed look-ahead prefetches. Effects are
//! executed between messages, never during one, which preserves the
//! single-threaded event model.

use web_time::{Duration, Instant};

use crate::app::AnnotatorApp;
use crate::error::AnnotatorError;
use crate::message::{Effect, Message};
use crate::remote::FrameStore;

#[derive(Debug)]
struct ScheduledPrefetch {
    frame: i64,
    due_at: Instant,
}

/// Synchronous effect executor over a frame store.
pub struct SessionRuntime<S: FrameStore> {
    app: AnnotatorApp,
    store: S,
    now: Instant,
    scheduled: Vec<ScheduledPrefetch>,
}

impl<S: FrameStore> SessionRuntime<S> {
    /// Wrap an app and a store, starting the session clock now.
    pub fn new(app: AnnotatorApp, store: S) -> Self {
        Self {
            app,
            store,
            now: Instant::now(),
            scheduled: Vec::new(),
        }
    }

    /// The driven application.
    pub fn app(&self) -> &AnnotatorApp {
        &self.app
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store, for scripted failures.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The session clock.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Apply a message and execute every effect it produces, recursively
    /// feeding completions back in.
    pub fn dispatch(&mut self, message: Message) {
        let effects = self.app.update(message, self.now);
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Advance the session clock, firing look-ahead prefetches that came
    /// due.
    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
        let mut due = Vec::new();
        self.scheduled.retain(|entry| {
            if entry.due_at <= self.now {
                due.push(entry.frame);
                false
            } else {
                true
            }
        });
        for frame in due {
            self.dispatch(Message::PrefetchDue(frame));
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::FetchFrame(key) => {
                let result =
                    self.store
                        .fetch_frame(&key.video, key.frame, key.max_width, key.max_height);
                self.dispatch(Message::FrameFetched {
                    key,
                    result,
                    prefetch: false,
                });
            }
            Effect::PrefetchFrame(key) => {
                // Prefetch failures get their own kind so the app's
                // swallow-and-log path is distinguishable from an active
                // fetch failure.
                let result = self
                    .store
                    .fetch_frame(&key.video, key.frame, key.max_width, key.max_height)
                    .map_err(|e| match e {
                        AnnotatorError::FetchFailed { message } => {
                            AnnotatorError::PrefetchFailed { message }
                        }
                        other => other,
                    });
                self.dispatch(Message::FrameFetched {
                    key,
                    result,
                    prefetch: true,
                });
            }
            Effect::SchedulePrefetch { frame, delay } => {
                self.scheduled.push(ScheduledPrefetch {
                    frame,
                    due_at: self.now + delay,
                });
            }
            Effect::PushAnnotation(annotation) => {
                let video = annotation.video_name().to_string();
                let frame = annotation.frame_number();
                let result = self.store.put_annotation(&annotation);
                self.dispatch(Message::PushResolved {
                    video,
                    frame,
                    result,
                });
            }
            Effect::RequestSegmentation {
                video,
                frame,
                start,
                end,
            } => {
                if let Err(e) = self.store.request_segmentation(&video, frame, start, end) {
                    log::warn!("🧠 {}", e);
                }
            }
        }
    }
}
