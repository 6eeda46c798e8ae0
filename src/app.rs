//! The annotation application core.
//!
//! `AnnotatorApp` owns every piece of state and applies one [`Message`] at
//! a time, returning the [`Effect`]s the runtime must execute. All state
//! transitions are atomic with respect to each other; fetch and push
//! completions re-enter as messages and are checked against the current
//! position before they touch the visible view, so a stale response for a
//! frame the user has already left is cached but never applied.

use web_time::Instant;

use crate::cache::{FrameCache, FrameKey};
use crate::config::AppConfig;
use crate::editor::{AnnotationChanged, AnnotationEditor};
use crate::error::AnnotatorError;
use crate::message::{Effect, Message};
use crate::model::Annotation;
use crate::navigator::FrameNavigator;
use crate::scene::{self, Scene};
use crate::sync::{PushDisposition, SyncController};

/// Composition root: navigator, cache, editor, and sync controller wired
/// into one message-driven state machine.
pub struct AnnotatorApp {
    surface_width: u32,
    surface_height: u32,
    prefetch_delay: web_time::Duration,
    video: Option<String>,
    navigator: FrameNavigator,
    cache: FrameCache,
    editor: Option<AnnotationEditor>,
    sync: SyncController,
    /// Fetch failure text for the actively viewed frame. While set, the
    /// canvas shows the message and pointer input is inert.
    fetch_error: Option<String>,
}

impl AnnotatorApp {
    /// Create an app from configuration, with no video selected.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            surface_width: config.surface_width,
            surface_height: config.surface_height,
            prefetch_delay: config.prefetch_delay(),
            video: None,
            navigator: FrameNavigator::new(),
            cache: FrameCache::new(config.staleness_window()),
            editor: None,
            sync: SyncController::new(),
            fetch_error: None,
        }
    }

    /// The active frame index.
    pub fn current_frame(&self) -> i64 {
        self.navigator.current()
    }

    /// The selected video, if any.
    pub fn video(&self) -> Option<&str> {
        self.video.as_deref()
    }

    /// Cache key for the frame currently on screen.
    fn active_key(&self) -> Option<FrameKey> {
        let video = self.video.as_ref()?;
        Some(FrameKey::new(
            video.clone(),
            self.navigator.current(),
            self.surface_width,
            self.surface_height,
        ))
    }

    fn key_for(&self, frame: i64) -> Option<FrameKey> {
        let video = self.video.as_ref()?;
        Some(FrameKey::new(
            video.clone(),
            frame,
            self.surface_width,
            self.surface_height,
        ))
    }

    /// True when the active frame's payload is on hand and no error is
    /// showing, i.e. the canvas accepts pointer input.
    fn canvas_interactive(&self, now: Instant) -> bool {
        if self.fetch_error.is_some() {
            return false;
        }
        match self.active_key() {
            Some(key) => self.cache.lookup(&key, now).is_some(),
            None => false,
        }
    }

    /// Fetch the active frame unless it is cached fresh or already in
    /// flight. A fresh cache hit also clears any lingering error state.
    fn ensure_active_fetched(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        let Some(key) = self.active_key() else {
            return;
        };
        if self.cache.lookup(&key, now).is_some() {
            self.fetch_error = None;
            self.seed_from_cache(&key, now);
            return;
        }
        if self.cache.begin_fetch(&key) {
            effects.push(Effect::FetchFrame(key));
        }
    }

    /// Seed the editor's draft from a cached payload for the active frame.
    fn seed_from_cache(&mut self, key: &FrameKey, now: Instant) {
        let Some(annotation) = self
            .cache
            .lookup(key, now)
            .map(|payload| payload.annotation_or_empty(&key.video))
        else {
            return;
        };
        if let Some(editor) = self.editor.as_mut() {
            editor.seed(key.frame, annotation);
        }
    }

    /// Issue a look-ahead fetch for a frame unless it is already cached or
    /// in flight.
    fn prefetch(&mut self, frame: i64, now: Instant, effects: &mut Vec<Effect>) {
        let Some(key) = self.key_for(frame) else {
            return;
        };
        if self.cache.lookup(&key, now).is_some() || !self.cache.begin_fetch(&key) {
            return;
        }
        log::debug!("🖼️ Prefetching frame {}", frame);
        effects.push(Effect::PrefetchFrame(key));
    }

    /// Start a push for a finalized edit, or coalesce behind one in flight.
    fn push_edit(&mut self, changed: AnnotationChanged, effects: &mut Vec<Effect>) {
        let video = changed.annotation.video_name().to_string();
        let frame = changed.annotation.frame_number();
        if self.sync.request_push(&video, frame) == PushDisposition::Start {
            effects.push(Effect::PushAnnotation(changed.annotation));
        }
    }

    /// Apply one message and return the effects the runtime must execute.
    pub fn update(&mut self, message: Message, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        match message {
            Message::VideoSelected(video) => {
                log::info!("🎬 Selected video {}", video);
                self.editor = Some(AnnotationEditor::new(video.clone()));
                self.video = Some(video);
                self.navigator = FrameNavigator::new();
                self.fetch_error = None;
                self.ensure_active_fetched(now, &mut effects);
            }

            Message::NextFrame => {
                if self.video.is_none() {
                    return effects;
                }
                self.navigator.next();
                self.ensure_active_fetched(now, &mut effects);
                effects.push(Effect::SchedulePrefetch {
                    frame: self.navigator.lookahead_target(),
                    delay: self.prefetch_delay,
                });
            }

            Message::PrevFrame => {
                if self.video.is_none() {
                    return effects;
                }
                self.navigator.prev();
                self.ensure_active_fetched(now, &mut effects);
            }

            Message::SeekFrame(target) => {
                if self.video.is_none() {
                    return effects;
                }
                self.navigator.seek(target);
                self.ensure_active_fetched(now, &mut effects);
            }

            Message::HoverNext => {
                let target = self.navigator.hover_target();
                self.prefetch(target, now, &mut effects);
            }

            Message::PrefetchDue(frame) => {
                self.prefetch(frame, now, &mut effects);
            }

            Message::PointerDown { x, y } => {
                if !self.canvas_interactive(now) {
                    return effects;
                }
                let frame = self.navigator.current();
                let (w, h) = (self.surface_width, self.surface_height);
                if let Some(editor) = self.editor.as_mut() {
                    match editor.pointer_down(frame, x, y, w, h) {
                        Ok(Some(changed)) => self.push_edit(changed, &mut effects),
                        Ok(None) => {}
                        Err(e) => log::debug!("Pointer-down ignored: {}", e),
                    }
                }
            }

            Message::PointerMove { x, y } => {
                if !self.canvas_interactive(now) {
                    return effects;
                }
                let frame = self.navigator.current();
                let (w, h) = (self.surface_width, self.surface_height);
                if let Some(editor) = self.editor.as_mut() {
                    if let Err(e) = editor.pointer_move(frame, x, y, w, h) {
                        log::debug!("Pointer-move ignored: {}", e);
                    }
                }
            }

            Message::PointerUp => {
                if !self.canvas_interactive(now) {
                    return effects;
                }
                let frame = self.navigator.current();
                if let Some(changed) = self
                    .editor
                    .as_mut()
                    .and_then(|editor| editor.pointer_up(frame))
                {
                    self.push_edit(changed, &mut effects);
                }
            }

            Message::ModeSelected(mode) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_mode(mode);
                }
            }

            Message::ToggleOverlay => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.toggle_segmentation();
                }
            }

            Message::ClearFrame => {
                if !self.canvas_interactive(now) {
                    return effects;
                }
                let frame = self.navigator.current();
                if let Some(editor) = self.editor.as_mut() {
                    let changed = editor.clear(frame);
                    self.push_edit(changed, &mut effects);
                }
            }

            Message::SegmentRange { start, end } => {
                let Some(video) = self.video.clone() else {
                    return effects;
                };
                let frame = self.navigator.current();
                if let Err(e) = validate_segment_range(frame, start, end) {
                    log::warn!("🧠 {}", e);
                    return effects;
                }
                // Overlays for the whole range will change as the server
                // works; drop the video's cached payloads so later reads
                // observe them.
                self.cache.invalidate_video(&video);
                effects.push(Effect::RequestSegmentation {
                    video,
                    frame,
                    start,
                    end,
                });
            }

            Message::SurfaceResized { width, height } => {
                if width == 0 || height == 0 {
                    log::debug!("Ignoring resize to {}x{}", width, height);
                    return effects;
                }
                self.surface_width = width;
                self.surface_height = height;
                self.ensure_active_fetched(now, &mut effects);
            }

            Message::FrameFetched {
                key,
                result,
                prefetch,
            } => match result {
                Ok(payload) => {
                    let is_active = Some(&key) == self.active_key().as_ref();
                    if is_active {
                        self.fetch_error = None;
                        if let Some(editor) = self.editor.as_mut() {
                            editor.seed(key.frame, payload.annotation_or_empty(&key.video));
                        }
                    }
                    self.cache.insert(key, payload, now);
                }
                Err(e) => {
                    self.cache.fetch_failed(&key);
                    if prefetch {
                        // Prefetch is an optimization, not a correctness
                        // requirement.
                        log::debug!("Prefetch of frame {} failed: {}", key.frame, e);
                    } else if Some(&key) == self.active_key().as_ref() {
                        let message = match e {
                            AnnotatorError::FetchFailed { message } => message,
                            other => other.to_string(),
                        };
                        log::error!("Fetch of active frame {} failed: {}", key.frame, message);
                        self.fetch_error = Some(message);
                    } else {
                        log::debug!("Stale fetch failure for frame {} discarded", key.frame);
                    }
                }
            },

            Message::PushResolved {
                video,
                frame,
                result,
            } => {
                let completion = self.sync.complete(&video, frame, result.is_ok());
                if completion.invalidate {
                    self.cache.invalidate(&video, frame);
                    // The active frame refetches so the view reconverges
                    // with server-confirmed state.
                    if self.video.as_deref() == Some(video.as_str())
                        && self.navigator.current() == frame
                    {
                        self.ensure_active_fetched(now, &mut effects);
                    }
                }
                if completion.repush {
                    if let Some(draft) = self.draft_for(&video, frame) {
                        if self.sync.request_push(&video, frame) == PushDisposition::Start {
                            effects.push(Effect::PushAnnotation(draft));
                        }
                    }
                }
            }
        }
        effects
    }

    fn draft_for(&self, video: &str, frame: i64) -> Option<Annotation> {
        if self.video.as_deref() != Some(video) {
            return None;
        }
        self.editor
            .as_ref()
            .and_then(|editor| editor.draft(frame))
            .cloned()
    }

    /// Resolve the current view: loading placeholder, the active frame's
    /// fetch error, or the frame with its annotation overlay.
    pub fn scene(&self, now: Instant) -> Result<Scene<'_>, AnnotatorError> {
        let key = self.active_key();
        let payload = key.as_ref().and_then(|key| self.cache.lookup(key, now));
        let draft = self
            .editor
            .as_ref()
            .and_then(|editor| editor.draft(self.navigator.current()));
        let show_segmentation = self
            .editor
            .as_ref()
            .is_some_and(|editor| editor.show_segmentation());
        scene::build_scene(
            payload,
            draft,
            show_segmentation,
            self.fetch_error.as_deref(),
            self.surface_width,
            self.surface_height,
        )
    }
}

/// Client-side mirror of the server's segmentation range rules.
pub(crate) fn validate_segment_range(
    frame: i64,
    start: i64,
    end: i64,
) -> Result<(), AnnotatorError> {
    if start > frame {
        return Err(AnnotatorError::SegmentationRejected {
            message: "start_frame should be less than frame_number".to_string(),
        });
    }
    if end <= 0 {
        return Err(AnnotatorError::SegmentationRejected {
            message: "end_frame should be greater than 0".to_string(),
        });
    }
    if end < frame {
        return Err(AnnotatorError::SegmentationRejected {
            message: "end_frame should be greater than frame_number".to_string(),
        });
    }
    if start > end {
        return Err(AnnotatorError::SegmentationRejected {
            message: "start_frame should be less than end_frame".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::DrawMode;
    use crate::model::FramePayload;

    fn payload(frame: i64) -> FramePayload {
        FramePayload {
            frame_number: frame,
            image: format!("frame-{frame}"),
            segmented_image: None,
            annotation: None,
            width: 800,
            height: 600,
        }
    }

    fn key(frame: i64) -> FrameKey {
        FrameKey::new("clip.mp4", frame, 800, 600)
    }

    /// App with video selected and frame 0 resolved.
    fn ready_app(now: Instant) -> AnnotatorApp {
        let mut app = AnnotatorApp::new(&AppConfig::default());
        let effects = app.update(Message::VideoSelected("clip.mp4".to_string()), now);
        assert_eq!(effects, vec![Effect::FetchFrame(key(0))]);
        app.update(
            Message::FrameFetched {
                key: key(0),
                result: Ok(payload(0)),
                prefetch: false,
            },
            now,
        );
        app
    }

    #[test]
    fn test_stale_fetch_response_is_cached_but_not_applied() {
        let now = Instant::now();
        let mut app = AnnotatorApp::new(&AppConfig::default());
        app.update(Message::VideoSelected("clip.mp4".to_string()), now);

        // Navigate away before frame 0 resolves.
        let effects = app.update(Message::NextFrame, now);
        assert!(effects.contains(&Effect::FetchFrame(key(1))));

        // The late frame-0 response lands: cached, but the view stays on
        // frame 1's pending fetch.
        app.update(
            Message::FrameFetched {
                key: key(0),
                result: Ok(payload(0)),
                prefetch: false,
            },
            now,
        );
        assert_eq!(app.scene(now).unwrap(), Scene::Loading);

        app.update(
            Message::FrameFetched {
                key: key(1),
                result: Ok(payload(1)),
                prefetch: false,
            },
            now,
        );
        let Scene::Frame(frame) = app.scene(now).unwrap() else {
            panic!("expected frame scene");
        };
        assert_eq!(frame.frame_number, 1);

        // Coming back to frame 0 reuses the cached late response.
        let effects = app.update(Message::PrevFrame, now);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_stale_fetch_failure_is_discarded() {
        let now = Instant::now();
        let mut app = ready_app(now);
        app.update(Message::NextFrame, now);

        // A failure for a frame that is no longer active must not surface.
        app.update(
            Message::FrameFetched {
                key: key(0),
                result: Err(AnnotatorError::FetchFailed {
                    message: "too late".to_string(),
                }),
                prefetch: false,
            },
            now,
        );
        assert_eq!(app.scene(now).unwrap(), Scene::Loading);
    }

    #[test]
    fn test_interleaved_pushes_coalesce_to_last_full_state() {
        let now = Instant::now();
        let mut app = ready_app(now);
        app.update(Message::ModeSelected(DrawMode::PositivePoint), now);

        // P1: first point, push starts.
        let effects = app.update(Message::PointerDown { x: 80.0, y: 60.0 }, now);
        let [Effect::PushAnnotation(p1)] = effects.as_slice() else {
            panic!("expected a push, got {effects:?}");
        };
        assert_eq!(p1.positive_points().len(), 1);

        // P2 issued before P1 resolves: coalesced, nothing on the wire.
        let effects = app.update(Message::PointerDown { x: 160.0, y: 120.0 }, now);
        assert!(effects.is_empty());

        // P1 acknowledged: the follow-up push carries the full current
        // draft, so the server converges on P2's payload.
        let effects = app.update(
            Message::PushResolved {
                video: "clip.mp4".to_string(),
                frame: 0,
                result: Ok(()),
            },
            now,
        );
        let push = effects.iter().find_map(|e| match e {
            Effect::PushAnnotation(a) => Some(a),
            _ => None,
        });
        assert_eq!(push.unwrap().positive_points().len(), 2);
        // The ack also invalidated the cache, forcing a refetch.
        assert!(effects.contains(&Effect::FetchFrame(key(0))));

        // Final ack: nothing left to push.
        let effects = app.update(
            Message::PushResolved {
                video: "clip.mp4".to_string(),
                frame: 0,
                result: Ok(()),
            },
            now,
        );
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::PushAnnotation(_))));
    }

    #[test]
    fn test_next_schedules_delayed_lookahead() {
        let now = Instant::now();
        let mut app = ready_app(now);
        let effects = app.update(Message::NextFrame, now);
        assert!(effects.contains(&Effect::SchedulePrefetch {
            frame: 3,
            delay: AppConfig::default().prefetch_delay(),
        }));
    }

    #[test]
    fn test_prev_schedules_no_prefetch() {
        let now = Instant::now();
        let mut app = ready_app(now);
        let effects = app.update(Message::PrevFrame, now);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::SchedulePrefetch { .. })));
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let now = Instant::now();
        let mut app = ready_app(now);
        let effects = app.update(Message::SurfaceResized { width: 0, height: 600 }, now);
        assert!(effects.is_empty());
        assert!(app.scene(now).is_ok());
    }

    #[test]
    fn test_resize_refetches_at_new_bounds() {
        let now = Instant::now();
        let mut app = ready_app(now);
        let effects = app.update(
            Message::SurfaceResized {
                width: 640,
                height: 480,
            },
            now,
        );
        assert_eq!(
            effects,
            vec![Effect::FetchFrame(FrameKey::new("clip.mp4", 0, 640, 480))]
        );
    }

    #[test]
    fn test_messages_without_video_are_inert() {
        let now = Instant::now();
        let mut app = AnnotatorApp::new(&AppConfig::default());
        assert!(app.update(Message::NextFrame, now).is_empty());
        assert!(app.update(Message::PointerDown { x: 1.0, y: 1.0 }, now).is_empty());
        assert!(app
            .update(Message::SegmentRange { start: 0, end: 5 }, now)
            .is_empty());
        assert_eq!(app.scene(now).unwrap(), Scene::Loading);
    }

    #[test]
    fn test_segment_range_validation_rules() {
        assert!(validate_segment_range(5, 0, 10).is_ok());
        assert!(validate_segment_range(5, 5, 10).is_ok());
        assert!(validate_segment_range(5, 7, 10).is_err());
        assert!(validate_segment_range(5, 0, 0).is_err());
        assert!(validate_segment_range(5, 0, 4).is_err());
        assert!(validate_segment_range(5, 9, 8).is_err());
    }
}
