//! Pinch Replay - runs a recorded observation log through the tracker
//!
//! Reads JSON Lines where each line is one detector frame:
//!
//! ```text
//! {"frame_number": 1, "hand": {"index_tip": {"x": 0.5, "y": 0.5, "confidence": 0.9}, "thumb_tip": {...}}}
//! {"frame_number": 2, "hand": null}
//! {"clear": true}
//! ```
//!
//! and prints one JSON `StrokeUpdate` per frame followed by a summary.
//! Lines with extra fields are rejected. Frames whose number does not
//! increase are skipped with a warning and counted as `rejected`.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use pinch_draw::{
    telemetry, CoordinateMapper, HandObservation, LineVertexBuilder, StrokeTracker, StrokeUpdate,
    TrackerConfig, ViewportMapper,
};
use serde::{Deserialize, Serialize};

/// Clear command line
#[derive(Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClearEntry {
    clear: bool,
}

/// Detector frame line
#[derive(Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameEntry {
    frame_number: u64,
    #[serde(default)]
    hand: Option<HandObservation>,
}

/// One line of the observation log
#[derive(Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum LogEntry {
    Clear(ClearEntry),
    Frame(FrameEntry),
}

fn parse_entry(line: &str) -> Result<LogEntry> {
    serde_json::from_str(line).with_context(|| format!("Not a frame or clear entry: {}", line))
}

#[derive(Debug, PartialEq, Serialize)]
struct FrameOutput {
    frame_number: u64,
    update: StrokeUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault: Option<String>,
}

/// Totals printed after the last frame
#[derive(Debug, Default, PartialEq, Serialize)]
struct ReplaySummary {
    frames: u64,
    faults: u64,
    rejected: u64,
    strokes: usize,
    segments: usize,
    discarded: usize,
}

/// Drives a tracker from log entries, enforcing increasing frame numbers
struct Replayer<M> {
    tracker: StrokeTracker<M>,
    last_frame: Option<u64>,
    summary: ReplaySummary,
}

impl<M: CoordinateMapper> Replayer<M> {
    fn new(tracker: StrokeTracker<M>) -> Self {
        Self {
            tracker,
            last_frame: None,
            summary: ReplaySummary::default(),
        }
    }

    fn process(&mut self, entry: LogEntry) -> Option<FrameOutput> {
        let frame = match entry {
            LogEntry::Clear(ClearEntry { clear }) => {
                if clear {
                    self.summary.discarded += self.tracker.clear();
                }
                return None;
            }
            LogEntry::Frame(frame) => frame,
        };

        if let Some(last) = self.last_frame.filter(|&last| frame.frame_number <= last) {
            log::warn!(
                "Skipping out-of-order frame {} (last processed {})",
                frame.frame_number,
                last
            );
            self.summary.rejected += 1;
            return None;
        }
        self.last_frame = Some(frame.frame_number);

        let report = self.tracker.on_observation(frame.hand.as_ref());
        self.summary.frames += 1;
        if report.fault.is_some() {
            self.summary.faults += 1;
        }
        Some(FrameOutput {
            frame_number: frame.frame_number,
            update: report.update,
            fault: report.fault.map(|e| e.to_string()),
        })
    }

    fn finish(mut self) -> ReplaySummary {
        let vertices = LineVertexBuilder::from_strokes(self.tracker.strokes(), *self.tracker.style());
        self.summary.strokes = self.tracker.strokes().len();
        self.summary.segments = vertices.segment_count();
        self.summary
    }
}

/// Replay every line of `reader`, writing one JSON line per frame and the summary.
fn replay<M, R, W>(tracker: StrokeTracker<M>, reader: R, mut out: W) -> Result<ReplaySummary>
where
    M: CoordinateMapper,
    R: BufRead,
    W: Write,
{
    let mut replayer = Replayer::new(tracker);

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_number + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let entry = parse_entry(&line).with_context(|| format!("Invalid entry on line {}", line_number + 1))?;
        if let Some(output) = replayer.process(entry) {
            serde_json::to_writer(&mut out, &output)?;
            writeln!(out)?;
        }
    }

    let summary = replayer.finish();
    serde_json::to_writer(&mut out, &summary)?;
    writeln!(out)?;
    out.flush()?;
    Ok(summary)
}

struct Options {
    input: PathBuf,
    config: Option<PathBuf>,
    viewport: Option<(f64, f64)>,
}

fn usage() -> &'static str {
    "usage: pinch-replay <observations.jsonl> [--config <config.json>] [--viewport <width>x<height>]"
}

fn parse_args() -> Result<Options> {
    let mut args = std::env::args().skip(1);
    let mut input = None;
    let mut config = None;
    let mut viewport = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(PathBuf::from(args.next().context("--config needs a path")?));
            }
            "--viewport" => {
                let spec = args.next().context("--viewport needs <width>x<height>")?;
                let (w, h) = spec
                    .split_once('x')
                    .with_context(|| format!("Invalid viewport {:?}", spec))?;
                viewport = Some((
                    w.parse().with_context(|| format!("Invalid width {:?}", w))?,
                    h.parse().with_context(|| format!("Invalid height {:?}", h))?,
                ));
            }
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument {:?}\n{}", arg, usage()),
        }
    }

    Ok(Options {
        input: input.context(usage())?,
        config,
        viewport,
    })
}

fn run(options: Options) -> Result<()> {
    let config = match &options.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    let mapper = match options.viewport {
        Some((width, height)) => ViewportMapper::front_camera(width, height),
        None => ViewportMapper::new(1.0, 1.0),
    };
    let tracker = StrokeTracker::with_mapper(config, mapper)?;

    let file = File::open(&options.input)
        .with_context(|| format!("Failed to open {:?}", options.input))?;
    let stdout = std::io::stdout();
    let summary = replay(tracker, BufReader::new(file), BufWriter::new(stdout.lock()))?;

    log::info!(
        "Replayed {} frames into {} strokes ({} faults, {} out of order)",
        summary.frames,
        summary.strokes,
        summary.faults,
        summary.rejected
    );
    Ok(())
}

fn main() -> Result<()> {
    telemetry::init_logging("info");

    log::info!("Pinch Replay v{}", env!("CARGO_PKG_VERSION"));

    run(parse_args()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pinch_line(frame_number: u64, x: f64) -> String {
        serde_json::json!({
            "frame_number": frame_number,
            "hand": {
                "index_tip": { "x": x, "y": 0.5, "confidence": 0.9 },
                "thumb_tip": { "x": x + 0.02, "y": 0.5, "confidence": 0.9 },
            },
        })
        .to_string()
    }

    fn run_lines(lines: &[String]) -> (ReplaySummary, Vec<String>) {
        let tracker = StrokeTracker::new(TrackerConfig::default()).unwrap();
        let mut out = Vec::new();
        let summary = replay(tracker, Cursor::new(lines.join("\n")), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        (summary, text.lines().map(str::to_string).collect())
    }

    #[test]
    fn test_parse_frame_line() {
        let LogEntry::Frame(frame) = parse_entry(&pinch_line(7, 0.3)).unwrap() else {
            panic!("expected frame");
        };
        assert_eq!(frame.frame_number, 7);
        assert_eq!(frame.hand.unwrap().index_tip().unwrap().x, 0.3);

        let LogEntry::Frame(frame) = parse_entry(r#"{"frame_number": 8, "hand": null}"#).unwrap() else {
            panic!("expected frame");
        };
        assert!(frame.hand.is_none());
    }

    #[test]
    fn test_parse_clear_line() {
        assert_eq!(
            parse_entry(r#"{"clear": true}"#).unwrap(),
            LogEntry::Clear(ClearEntry { clear: true })
        );
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_entry("not json").is_err());
        assert!(parse_entry(r#"{"frame_number": -1}"#).is_err());
        assert!(parse_entry(r#"{"frame_number": 1, "hand": {"palm": {"x": 0, "y": 0, "confidence": 1}}}"#).is_err());
        assert!(parse_entry(r#"{"frame_number": 2, "hand": null, "clear": true}"#).is_err());
        assert!(parse_entry(r#"{"clear": true, "extra": 1}"#).is_err());
    }

    #[test]
    fn test_replay_outputs_and_summary() {
        let lines = vec![
            pinch_line(1, 0.30),
            pinch_line(2, 0.31),
            pinch_line(3, 0.32),
            r#"{"frame_number": 4, "hand": null}"#.to_string(),
            String::new(),
            pinch_line(5, 0.60),
            r#"{"frame_number": 6}"#.to_string(),
        ];
        let (summary, output) = run_lines(&lines);

        assert_eq!(
            summary,
            ReplaySummary {
                frames: 6,
                faults: 0,
                rejected: 0,
                strokes: 2,
                segments: 2,
                discarded: 0,
            }
        );
        assert_eq!(output.len(), 7);
        assert!(output[0].contains("StrokeStarted"));
        assert!(output[1].contains("SegmentAppended"));
        assert!(output[3].contains("StrokeSealed"));
        assert!(output[6].contains("\"segments\":2"));
    }

    #[test]
    fn test_replay_clear_counts_discarded() {
        let lines = vec![
            pinch_line(1, 0.30),
            r#"{"frame_number": 2}"#.to_string(),
            r#"{"clear": true}"#.to_string(),
            r#"{"clear": false}"#.to_string(),
        ];
        let (summary, _) = run_lines(&lines);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.strokes, 0);
    }

    #[test]
    fn test_replay_skips_out_of_order_frames() {
        let lines = vec![pinch_line(2, 0.30), pinch_line(1, 0.31), pinch_line(2, 0.32), pinch_line(3, 0.33)];
        let (summary, output) = run_lines(&lines);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.segments, 1);
        assert_eq!(output.len(), 3);
    }

    #[test]
    fn test_replay_reports_bad_line_number() {
        let tracker = StrokeTracker::new(TrackerConfig::default()).unwrap();
        let input = format!("{}\n{{\"frame_number\": 2, \"hand\": null, \"clear\": true}}", pinch_line(1, 0.3));
        let err = replay(tracker, Cursor::new(input), Vec::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
