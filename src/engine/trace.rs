//! Call traces attached to errors
//!
//! Frames come from [`std::backtrace::Backtrace::capture`], so nothing is
//! recorded unless `RUST_BACKTRACE` (or `RUST_LIB_BACKTRACE`) enables it.
//! Scrubbing never changes what an error means.

use std::backtrace::{Backtrace, BacktraceStatus};

/// Symbol prefixes that belong to the engine itself
const ENGINE_MODULES: &[&str] = &[
    concat!(env!("CARGO_CRATE_NAME"), "::engine::"),
    concat!(env!("CARGO_CRATE_NAME"), "::error::"),
    concat!(env!("CARGO_CRATE_NAME"), "::registry::"),
];

/// Frames produced by the capture itself
const CAPTURE_MODULES: &[&str] = &["std::backtrace", "std::backtrace_rs"];

/// One resolved stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub location: Option<String>,
}

impl Frame {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether this frame belongs to blockdsl's engine or the capture machinery
    pub fn is_internal(&self) -> bool {
        ENGINE_MODULES
            .iter()
            .chain(CAPTURE_MODULES)
            .any(|module| self.symbol.contains(module))
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}", self.symbol, location),
            None => write!(f, "{}", self.symbol),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    /// Capture the current stack, honouring the backtrace environment variables
    pub fn capture() -> Self {
        let backtrace = Backtrace::capture();
        match backtrace.status() {
            BacktraceStatus::Captured => Self::parse(&backtrace.to_string()),
            _ => Self::default(),
        }
    }

    /// Capture the current stack whatever the environment says
    pub fn force_capture() -> Self {
        Self::parse(&Backtrace::force_capture().to_string())
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Parse the rendering produced by `Backtrace`'s `Display` impl
    pub fn parse(text: &str) -> Self {
        let mut frames: Vec<Frame> = Vec::new();

        for line in text.lines() {
            let line = line.trim();

            if let Some(location) = line.strip_prefix("at ") {
                if let Some(frame) = frames.last_mut() {
                    frame.location = Some(location.to_string());
                }
                continue;
            }

            if let Some((index, symbol)) = line.split_once(": ") {
                if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                    frames.push(Frame::new(symbol.trim()));
                }
            }
        }

        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every engine-internal frame
    pub fn scrub(&mut self) {
        self.frames.retain(|frame| !frame.is_internal());
    }

    pub fn has_internal_frames(&self) -> bool {
        self.frames.iter().any(Frame::is_internal)
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "{:>4}: {}", i, frame)?;
        }
        Ok(())
    }
}
