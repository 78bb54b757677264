//! Frame sources for the interactive drivers.
//!
//! The camera pipeline and the landmark detector are external collaborators.
//! [`DetectionSource`] is the seam they implement: per frame, the detector's
//! landmark output (if any) plus the user's capture signal. [`ReplaySource`]
//! reads recorded frames from a JSONL file so the binary and the tests run
//! headless.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::landmark::Landmarks;
use crate::session::CaptureSignal;

/// One frame worth of input: the detection and the user's signal.
#[derive(Debug, Clone)]
pub struct Frame {
    pub detection: Option<Landmarks>,
    pub signal: CaptureSignal,
}

/// Produces per-frame hand detections and capture signals.
pub trait DetectionSource {
    /// Returns the next frame, or [`None`] when the source is exhausted.
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>>;
}

/// Replays landmark recordings from a JSONL file, one frame per line.
///
/// Line shape:
///
/// ```json
/// {"hands": [[[0.51, 0.62, 0.0], ...]], "signal": "confirm"}
/// ```
///
/// `hands` lists each detected hand's landmark positions; all hands are
/// concatenated into one detection, mirroring detectors that report several
/// hands per frame. `signal` is `"idle"`, `"confirm"`, or `"cancel"` and
/// defaults to idle when omitted. Empty lines are skipped.
pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open recording {}", path.display()))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl DetectionSource for ReplaySource {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let record: FrameRecord = serde_json::from_str(&line)
                .with_context(|| format!("malformed frame record on line {}", self.line_no))?;
            return Ok(Some(record.into()));
        }
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    hands: Vec<Vec<[f32; 3]>>,
    #[serde(default)]
    signal: SignalRecord,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SignalRecord {
    #[default]
    Idle,
    Confirm,
    Cancel,
}

impl From<FrameRecord> for Frame {
    fn from(record: FrameRecord) -> Self {
        let positions: Vec<[f32; 3]> = record.hands.into_iter().flatten().collect();
        Frame {
            detection: if positions.is_empty() {
                None
            } else {
                Some(Landmarks::from_positions(positions))
            },
            signal: match record.signal {
                SignalRecord::Idle => CaptureSignal::Idle,
                SignalRecord::Confirm => CaptureSignal::Confirm,
                SignalRecord::Cancel => CaptureSignal::Cancel,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn replay(content: &str) -> (tempfile::NamedTempFile, ReplaySource) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let source = ReplaySource::open(file.path()).unwrap();
        (file, source)
    }

    #[test]
    fn parses_frames_and_signals() {
        let hand: Vec<String> = (0..21).map(|i| format!("[0.{i:02}, 0.5, 0.0]")).collect();
        let content = format!(
            "{{\"hands\": [[{}]], \"signal\": \"confirm\"}}\n\n{{\"hands\": []}}\n",
            hand.join(", ")
        );
        let (_file, mut source) = replay(&content);

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.signal, CaptureSignal::Confirm);
        assert_eq!(first.detection.unwrap().len(), 21);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.signal, CaptureSignal::Idle);
        assert!(second.detection.is_none());

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn concatenates_multiple_hands() {
        let hand: Vec<String> = (0..21).map(|_| "[0.5, 0.5, 0.0]".to_owned()).collect();
        let joined = hand.join(", ");
        let content = format!("{{\"hands\": [[{joined}], [{joined}]]}}\n");
        let (_file, mut source) = replay(&content);

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.detection.unwrap().len(), 42);
    }

    #[test]
    fn malformed_lines_error_with_line_number() {
        let (_file, mut source) = replay("{\"hands\": 12}\n");
        let err = source.next_frame().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
