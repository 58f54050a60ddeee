//! Criterion benchmarks for badge evaluation over a Paris-sized network.
//!
//! Run with: cargo bench --bench evaluate

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use metroquest::database::Record;
use metroquest::model::{Line, Station, StationState};
use metroquest::service::catalog::{parse_badges, DEFAULT_BADGES};
use metroquest::service::evaluator::newly_earned;
use metroquest::service::network::Network;
use metroquest::service::profile::badge_statuses;
use metroquest::service::snapshot::Aggregates;
use metroquest::time::{now, LocalTime};

const LINES: u32 = 16;
const STATIONS_PER_LINE: u32 = 20;

fn network() -> Network {
    let mut lines = Vec::new();
    let mut stations = Vec::new();

    for line in 0..LINES {
        let id = Record::<Line>::new(format!("l{line}"));
        lines.push(Line::new(id.clone(), line, line.to_string(), format!("Line {line}"), "#FFCD00".to_string(), None));

        for position in 1..=STATIONS_PER_LINE {
            stations.push(Station::new(
                Record::new(format!("l{line}-s{position}")),
                id.clone(),
                format!("Station {position}"),
                position,
                None,
            ));
        }
    }

    Network::new(lines, stations)
}

/// Every other station stopped at, the rest passed through.
fn states(network: &Network) -> Vec<StationState> {
    let user = Record::new("bench".to_string());
    let at = now();

    network
        .stations()
        .iter()
        .enumerate()
        .map(|(index, station)| {
            let mut state = StationState::new(user.clone(), station.id.clone(), at);
            state.passed = true;
            state.first_passed_at = Some(at);
            if index % 2 == 0 {
                state.stopped = true;
                state.first_stopped_at = Some(at);
            }
            state
        })
        .collect()
}

fn bench_evaluation(c: &mut Criterion) {
    let network = network();
    let states = states(&network);
    let catalog = parse_badges(DEFAULT_BADGES).expect("default catalog is valid");
    let earned = HashSet::new();
    let clock = LocalTime::utc();

    let mut group = c.benchmark_group("badge_evaluation");

    group.bench_function("aggregates_320_stations", |b| {
        b.iter(|| black_box(Aggregates::compute(black_box(&network), black_box(&states), clock)));
    });

    let aggregates = Aggregates::compute(&network, &states, clock);

    group.bench_function("newly_earned_default_catalog", |b| {
        b.iter(|| black_box(newly_earned(black_box(&catalog), &earned, black_box(&aggregates))));
    });

    group.bench_function("badge_statuses_default_catalog", |b| {
        b.iter(|| black_box(badge_statuses(black_box(&catalog), &earned, black_box(&aggregates))));
    });

    group.finish();
}

criterion_group!(benches, bench_evaluation);
criterion_main!(benches);
