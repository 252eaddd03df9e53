use covidboard::data::normalize::{normalize, EntitySeries};
use covidboard::data::{RawTable, TableLayout};
use covidboard::series::{DerivedValues, SeriesEngine, ViewKind};

/// Build a table with one row per entity over consecutive days of March 2020.
fn series(rows: &[(&str, &[u64])]) -> EntitySeries {
    let n = rows[0].1.len();
    let mut csv = String::from("Province/State,Country/Region,Lat,Long");
    for d in 1..=n {
        csv.push_str(&format!(",3/{}/20", d));
    }
    csv.push('\n');
    for (name, counts) in rows {
        csv.push_str(&format!(",{},0,0", name));
        for c in counts.iter() {
            csv.push_str(&format!(",{}", c));
        }
        csv.push('\n');
    }
    let raw = RawTable::from_csv_bytes(csv.as_bytes(), &TableLayout::countries()).unwrap();
    normalize(&raw).unwrap()
}

fn new_values(values: &DerivedValues) -> Vec<f64> {
    match values {
        DerivedValues::New { new } => new.clone(),
        other => panic!("expected new view, got {:?}", other),
    }
}

#[test]
fn constant_series_has_zero_new_counts() {
    let s = series(&[("X", &[10, 10, 10, 10])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["X"], 1).unwrap();
    assert_eq!(new_values(&out.entries[0].values), vec![0.0, 0.0, 0.0]);
}

#[test]
fn differences_are_one_shorter() {
    let s = series(&[("X", &[0, 1, 3, 6, 10])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["X"], 1).unwrap();
    let entry = &out.entries[0];
    assert_eq!(new_values(&entry.values), vec![1.0, 2.0, 3.0, 4.0]);
    // first date has no prior value and is dropped
    assert_eq!(entry.dates, s.dates()[1..].to_vec());
}

#[test]
fn window_one_is_identity_on_differences() {
    let s = series(&[("X", &[3, 4, 9, 9, 20, 21])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["X"], 1).unwrap();
    assert_eq!(new_values(&out.entries[0].values), vec![1.0, 5.0, 0.0, 11.0, 1.0]);
}

#[test]
fn constant_differences_stay_constant_through_growing_prefix() {
    let cum: Vec<u64> = (0..20).map(|i| 100 + 5 * i).collect();
    let s = series(&[("X", &cum[..])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["X"], 7).unwrap();
    let new = new_values(&out.entries[0].values);
    assert_eq!(new.len(), 19);
    assert!(new.iter().all(|v| (*v - 5.0).abs() < 1e-12));
}

#[test]
fn trailing_mean_over_partial_window() {
    let s = series(&[("X", &[0, 2, 6, 12, 20])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["X"], 2).unwrap();
    // differences 2, 4, 6, 8
    assert_eq!(new_values(&out.entries[0].values), vec![2.0, 3.0, 5.0, 7.0]);
}

#[test]
fn new_vs_total_pairs_are_aligned() {
    let s = series(&[("X", &[0, 1, 3, 6, 10, 15]), ("Y", &[2, 2, 2, 3, 3, 9])]);
    let out = SeriesEngine::new(1, 14).new_vs_total(&s, &["X", "Y"], 3).unwrap();
    assert_eq!(out.view, ViewKind::NewVsTotal);
    for entry in &out.entries {
        match &entry.values {
            DerivedValues::NewVsTotal { total, new } => {
                assert_eq!(total.len(), new.len());
                assert_eq!(total.len(), entry.dates.len());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
    let x = out.entry("X").unwrap();
    // after skipping one date: cum 1,3,6,10,15 -> diffs 2,3,4,5
    assert_eq!(x.dates, s.dates()[2..].to_vec());
    match &x.values {
        DerivedValues::NewVsTotal { total, new } => {
            assert_eq!(new, &vec![2.0, 2.5, 3.0, 4.0]);
            // rolling totals 1, 2, 10/3, 19/3, 31/3 with the first dropped
            assert_eq!(total[0], 2.0);
            assert!((total[3] - 31.0 / 3.0).abs() < 1e-12);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn unknown_entities_come_back_empty() {
    let s = series(&[("X", &[0, 1, 3]), ("Y", &[5, 5, 6])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["Y", "Atlantis", "X"], 1).unwrap();
    let names: Vec<&str> = out.entries.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(names, vec!["Y", "Atlantis", "X"]);
    assert!(out.entry("Atlantis").unwrap().is_empty());
    assert_eq!(out.unknown, vec!["Atlantis"]);
    assert_eq!(new_values(&out.entry("X").unwrap().values), vec![1.0, 2.0]);
    assert_eq!(new_values(&out.entry("Y").unwrap().values), vec![0.0, 1.0]);
}

#[test]
fn total_preserves_requested_order_and_values() {
    let s = series(&[("A", &[1, 2]), ("B", &[3, 4])]);
    let out = SeriesEngine::new(39, 14).total(&s, &["B", "A"]);
    assert_eq!(out.entries[0].entity, "B");
    assert_eq!(out.entries[0].values, DerivedValues::Total { cumulative: vec![3, 4] });
    assert_eq!(out.entries[1].dates, s.dates().to_vec());
}

#[test]
fn corrected_counts_give_negative_new_values() {
    let s = series(&[("X", &[10, 12, 11, 15])]);
    let out = SeriesEngine::new(0, 14).new_counts(&s, &["X"], 1).unwrap();
    assert_eq!(new_values(&out.entries[0].values), vec![2.0, -1.0, 4.0]);
}

#[test]
fn window_above_maximum_is_rejected() {
    let s = series(&[("X", &[0, 1])]);
    assert!(SeriesEngine::new(0, 14).new_counts(&s, &["X"], 15).is_err());
    assert!(SeriesEngine::new(0, 14).new_vs_total(&s, &["X"], 0).is_err());
}

#[test]
fn queries_do_not_mutate_the_source() {
    let s = series(&[("X", &[0, 1, 3])]);
    let before = s.clone();
    let engine = SeriesEngine::new(0, 14);
    let _ = engine.new_counts(&s, &["X"], 2).unwrap();
    let _ = engine.new_vs_total(&s, &["X"], 2).unwrap();
    assert_eq!(s, before);
}
