//! Scripted keyboard input for headless runs.
//!
//! A script is a comma separated list of `keys:frames` segments. Keys are
//! joined with `+` and named `left`, `right`, `up` and `action`; `idle` holds
//! nothing. A segment without a frame count lasts for the rest of the run.
//! Once every segment is used up no key is held.

use std::collections::BTreeSet;

use lava_run_host::{InputSource, Key};
use thiserror::Error;

/// Reasons an input script is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The script contained no segments.
    #[error("input script is empty")]
    Empty,
    /// A key name was not recognised.
    #[error("unknown key `{0}` (expected left, right, up, action or idle)")]
    UnknownKey(String),
    /// A frame count did not parse as a positive integer.
    #[error("invalid frame count `{0}`")]
    InvalidFrameCount(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Segment {
    keys: BTreeSet<Key>,
    frames: u32,
}

/// Timeline of held keys indexed by frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScriptedInput {
    segments: Vec<Segment>,
}

impl ScriptedInput {
    /// Parses a script such as `right:120,right+up:10,action`.
    pub(crate) fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut segments = Vec::new();
        for raw in script.split(',').map(str::trim) {
            if raw.is_empty() {
                continue;
            }
            let (names, frames) = match raw.split_once(':') {
                Some((names, count)) => {
                    let frames = count
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|frames| *frames > 0)
                        .ok_or_else(|| ScriptError::InvalidFrameCount(count.trim().to_owned()))?;
                    (names, frames)
                }
                None => (raw, u32::MAX),
            };

            let mut keys = BTreeSet::new();
            for name in names.split('+').map(str::trim) {
                match name.to_ascii_lowercase().as_str() {
                    "left" => {
                        let _ = keys.insert(Key::Left);
                    }
                    "right" => {
                        let _ = keys.insert(Key::Right);
                    }
                    "up" => {
                        let _ = keys.insert(Key::Up);
                    }
                    "action" => {
                        let _ = keys.insert(Key::Action);
                    }
                    "idle" => {}
                    _ => return Err(ScriptError::UnknownKey(name.to_owned())),
                }
            }
            segments.push(Segment { keys, frames });
        }

        if segments.is_empty() {
            return Err(ScriptError::Empty);
        }
        Ok(Self { segments })
    }

    /// Keys held during the provided frame.
    pub(crate) fn at(&self, frame: u32) -> FrameKeys<'_> {
        let mut start = 0_u32;
        for segment in &self.segments {
            let end = start.saturating_add(segment.frames);
            if frame < end {
                return FrameKeys(Some(&segment.keys));
            }
            start = end;
        }
        FrameKeys(None)
    }
}

/// Keys held during a single frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameKeys<'a>(Option<&'a BTreeSet<Key>>);

impl InputSource for FrameKeys<'_> {
    fn is_down(&self, key: Key) -> bool {
        self.0.is_some_and(|keys| keys.contains(&key))
    }
}
