//! JSON frame dumps for offline inspection

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{Frame, RenderBackend};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub tick: u64,
    pub timestamp: String,
    pub command_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameDump {
    pub metadata: FrameMetadata,
    pub frame: Frame,
}

/// Writes every `interval_ticks`-th frame to `<dir>/frame_<tick>.json`.
///
/// An interval of zero disables writing.
pub struct FrameWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
    written: Vec<PathBuf>,
}

impl FrameWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create frame directory {}", output_dir.display()))?;
        Ok(Self {
            output_dir,
            interval_ticks,
            written: Vec::new(),
        })
    }

    pub fn should_write(&self, tick: u64) -> bool {
        self.interval_ticks > 0 && tick > 0 && tick % self.interval_ticks == 0
    }

    pub fn frame_path(&self, tick: u64) -> PathBuf {
        self.output_dir.join(format!("frame_{tick:08}.json"))
    }

    /// Paths written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn load(path: impl AsRef<Path>) -> Result<FrameDump> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read frame dump {}", path.display()))?;
        let dump = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(dump)
    }
}

impl RenderBackend for FrameWriter {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if !self.should_write(frame.tick) {
            return Ok(());
        }
        let dump = FrameDump {
            metadata: FrameMetadata {
                tick: frame.tick,
                timestamp: chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
                command_count: frame.commands.len(),
            },
            frame: frame.clone(),
        };
        let path = self.frame_path(frame.tick);
        let json = serde_json::to_string_pretty(&dump)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        self.written.push(path);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
