use covidboard::chart::{assemble, AxisValues, Category, ChartOptions, Scale, EMPHASIS_WIDTH, NORMAL_WIDTH};
use covidboard::data::normalize::{normalize, EntitySeries};
use covidboard::data::{RawTable, TableLayout};
use covidboard::series::SeriesEngine;

const CSV: &str = "\
Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20,3/4/20
,Sweden,0,0,1,4,9,16
,Norway,0,0,0,2,4,6
";

fn series() -> EntitySeries {
    let raw = RawTable::from_csv_bytes(CSV.as_bytes(), &TableLayout::countries()).unwrap();
    normalize(&raw).unwrap()
}

fn emphasis() -> Vec<String> {
    vec!["Sweden".to_string()]
}

#[test]
fn total_chart_titles_and_widths() {
    let derived = SeriesEngine::new(0, 14).total(&series(), &["Norway", "Sweden"]);
    let opts = ChartOptions::new(Category::Confirmed, Scale::Log).with_emphasis(&emphasis());
    let spec = assemble(&derived, &opts);

    assert_eq!(spec.title, "Covid-19 confirmed cases");
    assert_eq!(spec.x_axis.title, "Date");
    assert_eq!(spec.y_axis.title, "Covid-19 confirmed cases");
    assert_eq!(spec.y_axis.scale, Scale::Log);
    assert_eq!(spec.lines[0].name, "Norway");
    assert_eq!(spec.lines[0].width, NORMAL_WIDTH);
    assert_eq!(spec.lines[1].width, EMPHASIS_WIDTH);
    assert_eq!(spec.lines[1].y, vec![1.0, 4.0, 9.0, 16.0]);
    assert!(matches!(spec.lines[1].x, AxisValues::Dates(ref d) if d.len() == 4));
}

#[test]
fn new_chart_mentions_window() {
    let derived = SeriesEngine::new(0, 14).new_counts(&series(), &["Sweden"], 7).unwrap();
    let spec = assemble(&derived, &ChartOptions::new(Category::Deaths, Scale::Linear));
    assert_eq!(spec.title, "Covid-19 new deaths rolling mean of 7 days");
    assert_eq!(spec.y_axis.title, "Covid-19 new deaths");
    assert_eq!(spec.y_axis.scale, Scale::Linear);
    assert_eq!(spec.lines[0].y, vec![3.0, 4.0, 5.0]);
    assert_eq!(spec.lines[0].width, NORMAL_WIDTH);
}

#[test]
fn new_vs_total_uses_numeric_log_x_axis() {
    let derived = SeriesEngine::new(0, 14).new_vs_total(&series(), &["Sweden"], 1).unwrap();
    let opts = ChartOptions::new(Category::Confirmed, Scale::Log).with_emphasis(&emphasis());
    let spec = assemble(&derived, &opts);
    assert_eq!(spec.title, "Covid-19 confirmed cases rolling mean of 1 days");
    assert_eq!(spec.x_axis.title, "Total confirmed cases");
    assert_eq!(spec.x_axis.scale, Scale::Log);
    assert_eq!(spec.y_axis.title, "New confirmed cases per day");
    assert_eq!(spec.lines[0].x, AxisValues::Numbers(vec![4.0, 9.0, 16.0]));
    assert_eq!(spec.lines[0].y, vec![3.0, 5.0, 7.0]);
    assert_eq!(spec.lines[0].width, EMPHASIS_WIDTH);
}

#[test]
fn unknown_entities_are_carried_into_the_chart() {
    let derived = SeriesEngine::new(0, 14).total(&series(), &["Sweden", "Atlantis"]);
    let spec = assemble(&derived, &ChartOptions::new(Category::Confirmed, Scale::Log));
    assert_eq!(spec.lines.len(), 2);
    assert!(spec.lines[1].x.is_empty());
    assert!(spec.lines[1].y.is_empty());
    assert_eq!(spec.unknown, vec!["Atlantis"]);
}

#[test]
fn chart_serializes_for_a_renderer() {
    let derived = SeriesEngine::new(0, 14).total(&series(), &["Sweden"]);
    let opts = ChartOptions::new(Category::Confirmed, Scale::Linear).with_size(950, 750);
    let json = serde_json::to_value(assemble(&derived, &opts)).unwrap();
    assert_eq!(json["width"], 950);
    assert_eq!(json["y_axis"]["scale"], "linear");
    assert_eq!(json["lines"][0]["mode"], "lines+markers");
    assert_eq!(json["lines"][0]["x"][0], "2020-03-01");
}
