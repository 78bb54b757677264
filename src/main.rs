//! Interactive menu for teaching and recognizing hand gestures.
//!
//! Drives a [`GestureSession`] from a replayed landmark recording: collect
//! labeled examples, train, recognize frame by frame, list what has been
//! learned. Frame acquisition is behind [`DetectionSource`], so swapping the
//! recording for a live camera/detector pipeline only touches this binary.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use structopt::StructOpt;

use mudra::session::{CaptureSignal, CaptureStatus, GestureSession};
use mudra::source::{DetectionSource, ReplaySource};
use mudra::store::ModelStore;

const DEFAULT_SAMPLES: usize = 50;

/// Teach and recognize custom hand gestures from a landmark stream.
#[derive(StructOpt)]
struct Options {
    /// Directory where classifier and corpus snapshots are stored.
    #[structopt(long, default_value = "gesture_models")]
    model_dir: PathBuf,

    /// JSONL landmark recording that stands in for the camera feed.
    #[structopt(long)]
    replay: PathBuf,
}

fn main() -> anyhow::Result<()> {
    mudra::init_logger!();
    let options = Options::from_args();

    let mut session = GestureSession::new(ModelStore::new(&options.model_dir)?);
    session.restore()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        println!();
        println!("==================================================");
        println!("  1. Collect examples for a new gesture");
        println!("  2. Train the classifier");
        println!("  3. Recognize gestures");
        println!("  4. List learned gestures");
        println!("  5. Exit");
        println!("==================================================");

        match prompt(&mut input, "Select (1-5): ")?.as_str() {
            "1" => collect(&mut session, &options, &mut input)?,
            "2" => match session.train() {
                Ok(accuracy) => println!("Training finished, holdout accuracy {accuracy:.2}"),
                Err(e) => println!("{e}"),
            },
            "3" => recognize(&session, &options)?,
            "4" => list(&session),
            "5" => break,
            other => println!("Invalid choice: {other:?}"),
        }
    }

    Ok(())
}

fn prompt(input: &mut impl BufRead, text: &str) -> anyhow::Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn collect(
    session: &mut GestureSession,
    options: &Options,
    input: &mut impl BufRead,
) -> anyhow::Result<()> {
    let name = prompt(input, "Gesture name: ")?;
    if name.is_empty() {
        println!("Gesture name must not be empty.");
        return Ok(());
    }

    let samples = prompt(input, &format!("Sample count (default {DEFAULT_SAMPLES}): "))?;
    let target = if samples.is_empty() {
        DEFAULT_SAMPLES
    } else {
        match samples.parse() {
            Ok(n) => n,
            Err(_) => {
                println!("Not a number: {samples:?}");
                return Ok(());
            }
        }
    };

    let mut source = ReplaySource::open(&options.replay)?;
    let mut collector = session.begin_collection(&name, target);
    while let Some(frame) = source.next_frame()? {
        match collector.feed(frame.detection.as_ref(), frame.signal) {
            CaptureStatus::InProgress { captured, target } => {
                if frame.signal == CaptureSignal::Confirm {
                    println!("Captured {captured}/{target}");
                }
            }
            CaptureStatus::Complete | CaptureStatus::Cancelled => break,
        }
    }

    let stored = session.finish_collection(collector);
    println!("Collected {stored} samples for {name:?}");
    Ok(())
}

fn recognize(session: &GestureSession, options: &Options) -> anyhow::Result<()> {
    if !session.is_trained() {
        println!("No trained classifier yet. Collect examples and train first.");
        return Ok(());
    }

    let mut source = ReplaySource::open(&options.replay)?;
    while let Some(frame) = source.next_frame()? {
        if let Some(text) = session.on_frame(frame.detection.as_ref()).overlay_text() {
            println!("{text}");
        }
    }
    Ok(())
}

fn list(session: &GestureSession) {
    if session.corpus().num_classes() == 0 {
        println!("No gestures learned yet.");
        return;
    }
    println!("Learned gestures:");
    for (_, name, count) in session.corpus().classes() {
        println!("- {name}: {count} samples");
    }
}
