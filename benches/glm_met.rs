use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glm_met::{DateRange, Historical, LonLat, MetAdapter, MetHttpClient, MetRequest};
use serde_json::json;

/// Serves one canned archive response.
struct Canned(String);

impl MetHttpClient for Canned {
    fn get_text(&self, _request: &MetRequest) -> glm_met::Result<String> {
        Ok(self.0.clone())
    }
}

fn month_of_hours() -> String {
    let rows = 31 * 24;
    let time: Vec<String> = (0..rows)
        .map(|i| format!("2020-01-{:02}T{:02}:00", i / 24 + 1, i % 24))
        .collect();
    json!({
        "latitude": -34.25,
        "longitude": 116.75,
        "hourly_units": {"time": "iso8601"},
        "hourly": {
            "time": time,
            "shortwave_radiation": vec![350.0; rows],
            "cloudcover": vec![42; rows],
            "temperature_2m": vec![18.5; rows],
            "relativehumidity_2m": vec![65.0; rows],
            "windspeed_10m": vec![3.2; rows],
            "precipitation": vec![0.3; rows]
        }
    })
    .to_string()
}

fn bench_historical(c: &mut Criterion) {
    let client = Canned(month_of_hours());
    let mut adapter = Historical::builder()
        .location(LonLat::new(116.75, -34.25).unwrap())
        .date_range(DateRange::parse("2020-01-01", "2020-01-31").unwrap())
        .build();

    c.bench_function("historical_fetch_and_convert", |b| {
        b.iter(|| {
            adapter.fetch(black_box(&client), None).unwrap();
            adapter.convert().unwrap().height()
        })
    });
}

criterion_group!(benches, bench_historical);
criterion_main!(benches);
