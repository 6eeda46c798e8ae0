//! In-memory frame store.
//!
//! A synthetic [`FrameStore`] for the demo binary and scenario tests:
//! deterministic frame payloads, scripted failure injection, and recorded
//! writes in arrival order. Segmentation runs apply immediately instead of
//! in the background; visibility still works like the real store (a frame's
//! overlay appears only on a later refetch).

use std::collections::{HashMap, HashSet};

use crate::error::AnnotatorError;
use crate::model::{Annotation, FramePayload};
use crate::remote::{FrameStore, VideoInfo, VideoListing};

/// Native dimensions used for synthetic videos.
const NATIVE_WIDTH: u32 = 1280;
const NATIVE_HEIGHT: u32 = 720;

#[derive(Debug, Clone)]
struct StoredVideo {
    size_bytes: u64,
    frame_count: i64,
}

/// In-memory implementation of the remote store contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    videos: HashMap<String, StoredVideo>,
    annotations: HashMap<(String, i64), Annotation>,
    /// Every accepted write, in arrival order.
    write_log: Vec<Annotation>,
    segmented: HashSet<(String, i64)>,
    fetch_calls: usize,
    fail_next_fetch: Option<String>,
    fail_next_push: Option<String>,
    alive: bool,
}

impl MemoryStore {
    /// Create an empty store that reports itself alive.
    pub fn new() -> Self {
        Self {
            alive: true,
            ..Self::default()
        }
    }

    /// Register a synthetic video with the given frame count.
    pub fn add_video(&mut self, name: impl Into<String>, frame_count: i64, size_bytes: u64) {
        self.videos.insert(
            name.into(),
            StoredVideo {
                size_bytes,
                frame_count,
            },
        );
    }

    /// Make the next `fetch_frame` fail with the given message.
    pub fn fail_next_fetch(&mut self, message: impl Into<String>) {
        self.fail_next_fetch = Some(message.into());
    }

    /// Make the next `put_annotation` fail with the given message.
    pub fn fail_next_push(&mut self, message: impl Into<String>) {
        self.fail_next_push = Some(message.into());
    }

    /// Flip the liveness flag.
    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    /// Number of `fetch_frame` calls that reached the store.
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls
    }

    /// Accepted writes in arrival order.
    pub fn write_log(&self) -> &[Annotation] {
        &self.write_log
    }

    /// Currently stored annotation for (video, frame).
    pub fn stored_annotation(&self, video: &str, frame: i64) -> Option<&Annotation> {
        self.annotations.get(&(video.to_string(), frame))
    }

    /// Fit the native dimensions into the requested bounds, preserving
    /// aspect ratio, the way the real server does.
    fn fitted_dimensions(max_width: u32, max_height: u32) -> (u32, u32) {
        if NATIVE_HEIGHT <= max_height && NATIVE_WIDTH <= max_width {
            return (NATIVE_WIDTH, NATIVE_HEIGHT);
        }
        let ratio = if NATIVE_HEIGHT > NATIVE_WIDTH {
            max_height as f64 / NATIVE_HEIGHT as f64
        } else {
            max_width as f64 / NATIVE_WIDTH as f64
        };
        (
            (NATIVE_WIDTH as f64 * ratio) as u32,
            (NATIVE_HEIGHT as f64 * ratio) as u32,
        )
    }
}

impl FrameStore for MemoryStore {
    fn fetch_frame(
        &mut self,
        video: &str,
        frame: i64,
        max_width: u32,
        max_height: u32,
    ) -> Result<FramePayload, AnnotatorError> {
        self.fetch_calls += 1;
        if let Some(message) = self.fail_next_fetch.take() {
            return Err(AnnotatorError::FetchFailed { message });
        }
        let stored = self
            .videos
            .get(video)
            .ok_or_else(|| AnnotatorError::FetchFailed {
                message: "Video not found".to_string(),
            })?;
        if frame < 0 || frame >= stored.frame_count {
            return Err(AnnotatorError::FetchFailed {
                message: "Frame not found".to_string(),
            });
        }

        let (width, height) = Self::fitted_dimensions(max_width, max_height);
        let key = (video.to_string(), frame);
        Ok(FramePayload {
            frame_number: frame,
            image: format!("frame-{video}-{frame}"),
            segmented_image: self
                .segmented
                .contains(&key)
                .then(|| format!("segmented-{video}-{frame}")),
            annotation: self.annotations.get(&key).cloned(),
            width,
            height,
        })
    }

    fn put_annotation(&mut self, annotation: &Annotation) -> Result<(), AnnotatorError> {
        if let Some(message) = self.fail_next_push.take() {
            return Err(AnnotatorError::PushFailed { message });
        }
        let key = (
            annotation.video_name().to_string(),
            annotation.frame_number(),
        );
        self.annotations.insert(key, annotation.clone());
        self.write_log.push(annotation.clone());
        Ok(())
    }

    fn request_segmentation(
        &mut self,
        video: &str,
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
        if !self.videos.contains_key(video) {
            return Err(AnnotatorError::SegmentationRejected {
                message: "Video not found".to_string(),
            });
        }
        for f in start..=end {
            self.segmented.insert((video.to_string(), f));
        }
        log::info!("🧠 Segmentation covering frames {start}..={end} of {video}");
        Ok(())
    }

    fn list_videos(&mut self) -> Result<VideoListing, AnnotatorError> {
        let mut videos: Vec<VideoInfo> = self
            .videos
            .iter()
            .map(|(name, v)| VideoInfo {
                name: name.clone(),
                size_bytes: v.size_bytes,
            })
            .collect();
        videos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(VideoListing { videos })
    }

    fn liveness(&mut self) -> bool {
        self.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn store() -> MemoryStore {
        let mut s = MemoryStore::new();
        s.add_video("clip.mp4", 100, 4096);
        s
    }

    #[test]
    fn test_fetch_downscales_preserving_aspect() {
        let mut s = store();
        let p = s.fetch_frame("clip.mp4", 0, 800, 600).unwrap();
        assert_eq!((p.width, p.height), (800, 450));

        // Bounds larger than the native size leave it untouched.
        let p = s.fetch_frame("clip.mp4", 0, 1920, 1080).unwrap();
        assert_eq!((p.width, p.height), (1280, 720));
    }

    #[test]
    fn test_unknown_video_and_frame_fail() {
        let mut s = store();
        assert!(s.fetch_frame("nope.mp4", 0, 800, 600).is_err());
        assert!(s.fetch_frame("clip.mp4", -1, 800, 600).is_err());
        assert!(s.fetch_frame("clip.mp4", 100, 800, 600).is_err());
    }

    #[test]
    fn test_put_is_last_write_wins() {
        let mut s = store();
        let mut a1 = Annotation::empty("clip.mp4", 0);
        a1.push_positive(Point::new(0.1, 0.1));
        let mut a2 = Annotation::empty("clip.mp4", 0);
        a2.push_negative(Point::new(0.9, 0.9));

        s.put_annotation(&a1).unwrap();
        s.put_annotation(&a2).unwrap();
        assert_eq!(s.stored_annotation("clip.mp4", 0), Some(&a2));
        assert_eq!(s.write_log().len(), 2);
    }

    #[test]
    fn test_segmentation_validation() {
        let mut s = store();
        assert!(s.request_segmentation("clip.mp4", 5, 7, 10).is_err());
        assert!(s.request_segmentation("clip.mp4", 5, 0, 0).is_err());
        assert!(s.request_segmentation("clip.mp4", 5, 0, 4).is_err());
        assert!(s.request_segmentation("clip.mp4", 5, 9, 8).is_err());
        assert!(s.request_segmentation("clip.mp4", 5, 0, 10).is_ok());
    }

    #[test]
    fn test_segmentation_appears_on_refetch() {
        let mut s = store();
        assert!(s.fetch_frame("clip.mp4", 5, 800, 600).unwrap().segmented_image.is_none());
        s.request_segmentation("clip.mp4", 5, 5, 10).unwrap();
        assert!(s.fetch_frame("clip.mp4", 5, 800, 600).unwrap().segmented_image.is_some());
        assert!(s.fetch_frame("clip.mp4", 4, 800, 600).unwrap().segmented_image.is_none());
    }

    #[test]
    fn test_listing_and_liveness() {
        let mut s = store();
        s.add_video("b.mp4", 10, 123);
        let listing = s.list_videos().unwrap();
        assert_eq!(listing.videos.len(), 2);
        assert_eq!(listing.videos[0].name, "b.mp4");
        assert!(s.liveness());
        s.set_alive(false);
        assert!(!s.liveness());
    }
}
