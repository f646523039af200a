//! Basic example of turning location samples into country visits.
//!
//! Run with: cargo run --example timeline_basics

use chrono::{Duration, TimeZone, Utc};
use country_timeline::{
    analyze_samples, LatLngE7, Polygon, Region, RegionGeometry, RegionIndex, Ring, Sample,
};

fn main() {
    // Two made-up neighbours split at longitude 10, the western one with a lake (hole)
    let west = Region::new(
        "Westland",
        RegionGeometry::Polygon(Polygon::new(vec![
            Ring::from_xy(&[(0.0, 40.0), (0.0, 50.0), (10.0, 50.0), (10.0, 40.0)]),
            Ring::from_xy(&[(4.0, 44.0), (4.0, 46.0), (6.0, 46.0), (6.0, 44.0)]),
        ])),
    );
    let east = Region::new(
        "Eastland",
        RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[
            (10.0, 40.0),
            (10.0, 50.0),
            (20.0, 50.0),
            (20.0, 40.0),
        ])])),
    );
    let index = RegionIndex::new(vec![west, east]);

    let t0 = Utc.with_ymd_and_hms(2022, 7, 1, 9, 0, 0).unwrap();
    let stops = [
        (42.0, 2.0),  // Westland
        (48.0, 8.0),  // Westland
        (45.0, 5.0),  // on the lake: no country
        (45.0, 15.0), // Eastland
        (41.0, 19.0), // Eastland
        (43.0, 3.0),  // back in Westland
    ];
    let samples: Vec<Sample> = stops
        .iter()
        .enumerate()
        .map(|(day, &(lat, lng))| {
            let start = t0 + Duration::days(day as i64);
            Sample::new(LatLngE7::from_degrees(lat, lng), start, start + Duration::hours(8))
        })
        .collect();

    let (visits, stats) = analyze_samples(samples, index);

    println!("Country Timeline Example\n");
    println!(
        "{} samples: {} matched, {} outside every country\n",
        stats.samples, stats.matched, stats.dropped
    );
    println!("{:<10} {:<12} {:<12}", "Country", "Start", "End");
    for visit in &visits {
        println!(
            "{:<10} {:<12} {:<12}",
            visit.country,
            visit.start.format("%Y-%m-%d"),
            visit.end.format("%Y-%m-%d")
        );
    }
}
