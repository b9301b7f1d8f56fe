use chrono::NaiveDate;
use rectify_engine::{seeded_rng, Answer, BirthRecord, LifeEvent, RectificationEngine};
use std::sync::Arc;
use std::thread;

fn birth_record() -> BirthRecord {
    BirthRecord::parse("1964-12-01T19:05", 48.8566, 2.3522, "Europe/Paris").unwrap()
}

fn evidence() -> (Vec<Answer>, Vec<LifeEvent>) {
    let answers = vec![
        Answer::new("body_type", "slim"),
        Answer::new("temperament", "restless"),
        Answer::new("career_change_age", 34),
    ];
    let events = vec![
        LifeEvent::new(NaiveDate::from_ymd_opt(1988, 6, 18).unwrap(), "Married")
            .with_category("relationship"),
        LifeEvent::new(NaiveDate::from_ymd_opt(1999, 2, 3).unwrap(), "Relocated abroad")
            .with_category("travel")
            .with_weight(1.5),
    ];
    (answers, events)
}

#[test]
fn test_same_seed_gives_identical_results() {
    let engine = RectificationEngine::default();
    let record = birth_record();
    let (answers, events) = evidence();

    let first = engine
        .rectify_combined(&record, &answers, &events, &mut seeded_rng(2024))
        .unwrap();
    let second = engine
        .rectify_combined(&record, &answers, &events, &mut seeded_rng(2024))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.adjustment_minutes().to_bits(),
        second.adjustment_minutes().to_bits()
    );
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_different_seeds_sample_different_offsets() {
    let engine = RectificationEngine::default();
    let record = birth_record();

    let offsets: Vec<f64> = (0..10)
        .map(|seed| {
            engine
                .rectify_from_questionnaire(&record, &[], &mut seeded_rng(seed))
                .unwrap()
                .adjustment_minutes()
        })
        .collect();

    assert!(offsets.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(RectificationEngine::default());
    let record = birth_record();
    let (answers, events) = evidence();

    let expected: Vec<_> = (0..8u64)
        .map(|seed| {
            engine
                .rectify_combined(&record, &answers, &events, &mut seeded_rng(seed))
                .unwrap()
        })
        .collect();

    let handles: Vec<_> = (0..8u64)
        .map(|seed| {
            let engine = Arc::clone(&engine);
            let record = record.clone();
            let (answers, events) = (answers.clone(), events.clone());
            thread::spawn(move || {
                engine
                    .rectify_combined(&record, &answers, &events, &mut seeded_rng(seed))
                    .unwrap()
            })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_result_serializes_for_the_api_layer() {
    let engine = RectificationEngine::default();
    let (answers, _) = evidence();
    let result = engine
        .rectify_from_questionnaire(&birth_record(), &answers, &mut seeded_rng(5))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["timezone"], "Europe/Paris");
    assert_eq!(json["evidence_count"], 3);
    assert_eq!(json["conflicting"], false);
    assert_eq!(json["sources"], serde_json::json!(["questionnaire"]));
    assert_eq!(json["original_datetime"], "1964-12-01T19:05:00");
}
