//! Frame statistics for the debug overlay.
//!
//! Sampled once per rendered frame: the pre-render hook marks the start of
//! the frame, the post-render hook closes it and records the layer's
//! tile/buffer/feature counters.

use web_time::Instant;

/// Counters reported by the rendering layer after a frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderMetrics {
    /// Number of tiles that were drawn this frame.
    pub tile_count: u32,
    /// GPU buffer memory held by those tiles, in bytes.
    pub buffer_bytes: u64,
    /// Number of features in the drawn tiles.
    pub feature_count: u32,
}

/// Weight of the newest sample in the moving averages.
const SMOOTHING: f64 = 0.1;

/// Rolling frame timing plus the last sampled render counters.
#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    frame_start: Option<Instant>,
    last_frame_end: Option<Instant>,

    /// Smoothed time between pre- and post-render, in milliseconds.
    pub frame_time_ms: Option<f64>,

    /// Smoothed frames per second, from the interval between frames.
    pub fps: Option<f64>,

    /// Counters from the most recent frame.
    pub metrics: RenderMetrics,

    /// Frames sampled so far.
    pub frames: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self, now: Instant) {
        self.frame_start = Some(now);
    }

    /// Closes the frame started by [`begin_frame`](Self::begin_frame).
    ///
    /// A post-render without a matching pre-render still updates the
    /// counters and fps, only the frame time is left unchanged.
    pub fn end_frame(&mut self, now: Instant, metrics: RenderMetrics) {
        if let Some(start) = self.frame_start.take() {
            let ms = now.duration_since(start).as_secs_f64() * 1000.0;
            self.frame_time_ms = Some(smooth(self.frame_time_ms, ms));
        }

        if let Some(prev) = self.last_frame_end {
            let interval = now.duration_since(prev).as_secs_f64();
            if interval > 0.0 {
                self.fps = Some(smooth(self.fps, 1.0 / interval));
            }
        }
        self.last_frame_end = Some(now);

        self.metrics = metrics;
        self.frames += 1;
    }

    pub fn buffer_megabytes(&self) -> f64 {
        self.metrics.buffer_bytes as f64 / (1024.0 * 1024.0)
    }

    /// One line per statistic, as shown in the overlay panel.
    pub fn format_lines(&self) -> Vec<String> {
        vec![
            format!("frame: {}", format_optional(self.frame_time_ms, "ms", 2)),
            format!("fps: {}", format_optional(self.fps, "", 1)),
            format!("tiles: {}", self.metrics.tile_count),
            format!("buffer: {:.2} MB", self.buffer_megabytes()),
            format!("features: {}", self.metrics.feature_count),
        ]
    }
}

fn smooth(previous: Option<f64>, sample: f64) -> f64 {
    match previous {
        Some(prev) => prev + SMOOTHING * (sample - prev),
        None => sample,
    }
}

fn format_optional(value: Option<f64>, unit: &str, decimals: usize) -> String {
    match value {
        Some(v) if unit.is_empty() => format!("{:.*}", decimals, v),
        Some(v) => format!("{:.*} {}", decimals, v, unit),
        None => "n/a".to_string(),
    }
}
