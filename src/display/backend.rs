//! Render backends that consume the frames built by the display system

use std::any::Any;

use anyhow::Result;

use super::Frame;

/// Receives one [`Frame`] per tick and paints it somewhere.
pub trait RenderBackend {
    fn present(&mut self, frame: &Frame) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Keeps the most recent frames in memory.
pub struct FrameRecorder {
    frames: Vec<Frame>,
    capacity: usize,
}

impl FrameRecorder {
    /// Keep at most `capacity` frames, dropping the oldest.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::new(),
            capacity,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RenderBackend for FrameRecorder {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        self.frames.push(frame.clone());
        if self.frames.len() > self.capacity {
            self.frames.remove(0);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: u64) -> Frame {
        Frame {
            tick,
            width: 10,
            height: 10,
            smoothing: true,
            commands: Vec::new(),
        }
    }

    #[test]
    fn test_recorder_drops_oldest() {
        let mut recorder = FrameRecorder::new(2);
        for tick in 1..=3 {
            recorder.present(&frame(tick)).unwrap();
        }
        let ticks: Vec<_> = recorder.frames().iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![2, 3]);
        assert_eq!(recorder.latest().map(|f| f.tick), Some(3));
    }
}
