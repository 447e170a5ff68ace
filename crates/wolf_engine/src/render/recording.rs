//! Headless render backend
//!
//! Keeps the live drawables and every submitted frame in memory. Used by the
//! demo and by tests that check what would have been drawn.

use std::collections::BTreeMap;

use super::{BackendResult, DrawItem, Drawable, DrawableHandle, RenderBackend, RenderError};

/// One presented frame
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Items in submission order
    pub items: Vec<DrawItem>,
}

/// Backend that records instead of drawing
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    next_handle: u64,
    drawables: BTreeMap<DrawableHandle, Drawable>,
    frames: Vec<RecordedFrame>,
    /// Frames kept; 0 keeps all
    capacity: usize,
}

impl RecordingBackend {
    /// Backend keeping every frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend keeping only the last `capacity` frames
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Registered drawables
    pub fn drawables(&self) -> impl Iterator<Item = (DrawableHandle, &Drawable)> {
        self.drawables.iter().map(|(&h, d)| (h, d))
    }

    /// Number of registered drawables
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }

    /// Drawable behind a handle
    pub fn drawable(&self, handle: DrawableHandle) -> Option<&Drawable> {
        self.drawables.get(&handle)
    }

    /// Recorded frames, oldest first
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Most recent frame
    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl RenderBackend for RecordingBackend {
    fn register_drawable(&mut self, drawable: &Drawable) -> BackendResult<DrawableHandle> {
        self.next_handle += 1;
        let handle = DrawableHandle(self.next_handle);
        self.drawables.insert(handle, drawable.clone());
        Ok(handle)
    }

    fn unregister_drawable(&mut self, handle: DrawableHandle) -> BackendResult<()> {
        self.drawables
            .remove(&handle)
            .map(|_| ())
            .ok_or(RenderError::UnknownDrawable(handle))
    }

    fn draw(&mut self, items: &[DrawItem], delta_time: f32) -> BackendResult<()> {
        if let Some(item) = items.iter().find(|i| !self.drawables.contains_key(&i.handle)) {
            return Err(RenderError::UnknownDrawable(item.handle));
        }
        self.frames.push(RecordedFrame {
            delta_time,
            items: items.to_vec(),
        });
        if self.capacity > 0 && self.frames.len() > self.capacity {
            let excess = self.frames.len() - self.capacity;
            self.frames.drain(..excess);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    fn item(handle: DrawableHandle) -> DrawItem {
        DrawItem {
            handle,
            position: Vec2::zeros(),
            rotation: 0.0,
            size: Vec2::new(1.0, 1.0),
            z_index: 0,
        }
    }

    #[test]
    fn test_rejects_unknown_handles() {
        let mut backend = RecordingBackend::new();
        let handle = backend
            .register_drawable(&Drawable {
                texture: "ship".to_string(),
                size: Vec2::new(1.0, 1.0),
            })
            .unwrap();
        backend.unregister_drawable(handle).unwrap();

        assert_eq!(
            backend.draw(&[item(handle)], 0.0),
            Err(RenderError::UnknownDrawable(handle))
        );
        assert_eq!(
            backend.unregister_drawable(handle),
            Err(RenderError::UnknownDrawable(handle))
        );
    }

    #[test]
    fn test_capacity_keeps_latest_frames() {
        let mut backend = RecordingBackend::with_capacity(2);
        for n in 0..5 {
            backend.draw(&[], n as f32).unwrap();
        }
        let deltas: Vec<f32> = backend.frames().iter().map(|f| f.delta_time).collect();
        assert_eq!(deltas, vec![3.0, 4.0]);
    }
}
