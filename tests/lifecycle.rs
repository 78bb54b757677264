//! End-to-end lifecycle: collect → train → recognize → persist → restore.

use mudra::classify::Prediction;
use mudra::feature::{self, FeatureVector};
use mudra::landmark::{Landmarks, NUM_LANDMARKS};
use mudra::session::{CaptureSignal, DisplayHint, GestureSession};
use mudra::store::ModelStore;

/// A synthetic hand pose: fingers fan out from the wrist with a per-gesture
/// spread, plus a small per-sample jitter.
fn hand(spread: f32, jitter: f32) -> Landmarks {
    let positions = (0..NUM_LANDMARKS)
        .map(|i| {
            let t = i as f32 / NUM_LANDMARKS as f32;
            [
                0.5 + t * spread + jitter,
                0.5 - t * (1.0 - spread) * 0.4 + jitter,
                t * 0.01,
            ]
        })
        .collect();
    Landmarks::from_positions(positions)
}

fn feature_for(spread: f32, jitter: f32) -> FeatureVector {
    feature::extract(Some(&hand(spread, jitter))).unwrap()
}

fn session_in(dir: &std::path::Path) -> GestureSession {
    GestureSession::new(ModelStore::new(dir).unwrap())
}

fn teach(session: &mut GestureSession, name: &str, spread: f32, samples: usize) {
    let mut collector = session.begin_collection(name, samples);
    for i in 0..samples {
        collector.feed(
            Some(&hand(spread, i as f32 * 0.004)),
            CaptureSignal::Confirm,
        );
    }
    assert_eq!(session.finish_collection(collector), samples);
}

#[test]
fn teach_two_gestures_and_recognize_them() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut session = session_in(dir.path());

    teach(&mut session, "wave", 0.1, 12);
    teach(&mut session, "fist", 0.8, 12);

    let accuracy = session.train().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(session.is_trained());

    match session.predict(Some(&feature_for(0.1, 0.002))) {
        Prediction::Gesture { name, confidence } => {
            assert_eq!(name, "wave");
            assert!(confidence > 0.7);
        }
        other => panic!("expected \"wave\", got {other:?}"),
    }
    match session.predict(Some(&feature_for(0.8, 0.002))) {
        Prediction::Gesture { name, confidence } => {
            assert_eq!(name, "fist");
            assert!(confidence > 0.7);
        }
        other => panic!("expected \"fist\", got {other:?}"),
    }
}

#[test]
fn fresh_session_cannot_train_or_recognize() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut session = session_in(dir.path());

    assert!(session.train().is_err());
    assert!(!session.is_trained());
    assert_eq!(
        session.predict(Some(&feature_for(0.1, 0.0))),
        Prediction::Rejected { confidence: 0.0 }
    );
}

#[test]
fn restore_before_any_save_starts_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut session = session_in(dir.path());
    session.restore().unwrap();
    assert!(!session.is_trained());
    assert!(session.corpus().is_empty());
}

#[test]
fn snapshot_survives_a_process_restart() {
    let dir = tempfile::TempDir::new().unwrap();

    let mut first = session_in(dir.path());
    teach(&mut first, "wave", 0.1, 12);
    teach(&mut first, "fist", 0.8, 12);
    first.train().unwrap();

    // Fixed probes evaluated by both "processes".
    let probes: Vec<FeatureVector> = (0..5)
        .map(|i| feature_for(if i % 2 == 0 { 0.1 } else { 0.8 }, i as f32 * 0.003))
        .collect();
    let expected: Vec<Prediction> = probes.iter().map(|p| first.predict(Some(p))).collect();

    let mut second = session_in(dir.path());
    second.restore().unwrap();
    assert!(second.is_trained());
    assert_eq!(second.corpus().len(), first.corpus().len());

    let first_names: Vec<_> = first.corpus().classes().map(|(_, n, c)| (n.to_owned(), c)).collect();
    let second_names: Vec<_> = second.corpus().classes().map(|(_, n, c)| (n.to_owned(), c)).collect();
    assert_eq!(first_names, second_names);

    let restored: Vec<Prediction> = probes.iter().map(|p| second.predict(Some(p))).collect();
    assert_eq!(restored, expected);
}

#[test]
fn retraining_replaces_the_classifier() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut session = session_in(dir.path());

    teach(&mut session, "wave", 0.1, 12);
    teach(&mut session, "fist", 0.8, 12);
    session.train().unwrap();

    // A third gesture is unknown to the first classifier.
    teach(&mut session, "point", 0.45, 12);
    session.train().unwrap();

    match session.predict(Some(&feature_for(0.45, 0.002))) {
        Prediction::Gesture { name, .. } => assert_eq!(name, "point"),
        other => panic!("expected \"point\" after retraining, got {other:?}"),
    }
}

#[test]
fn recognition_loop_reports_overlay_text() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut session = session_in(dir.path());

    teach(&mut session, "wave", 0.1, 12);
    teach(&mut session, "fist", 0.8, 12);
    session.train().unwrap();

    let hint = session.on_frame(Some(&hand(0.1, 0.001)));
    let text = hint.overlay_text().unwrap();
    assert!(text.starts_with("Gesture: wave"), "unexpected overlay {text:?}");

    assert_eq!(session.on_frame(None), DisplayHint::NoHand);
    assert_eq!(session.on_frame(None).overlay_text(), None);
}
