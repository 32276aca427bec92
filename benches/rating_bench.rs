use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wengrate::{
    BatchProcessor, Game, ModelConfig, Outcome, PlackettLuce, Rating, RatingModel,
    ThurstoneMostellerFull,
};

fn team_of_one(mu: f64, sigma: f64) -> Vec<Rating> {
    vec![Rating::new(mu, sigma, None)]
}

pub fn plackett_luce_two_player(c: &mut Criterion) {
    let model = PlackettLuce::new(ModelConfig::default());
    let teams = vec![team_of_one(32.1, 4.233), team_of_one(41.01, 1.34)];
    let outcome = Outcome::Ranks(vec![0.0, 1.0]);

    c.bench_function("PlackettLuce 1v1", |b| {
        b.iter(|| model.rate(black_box(&teams), black_box(Some(&outcome)), None, None, None))
    });
}

pub fn plackett_luce_eight_team_ffa(c: &mut Criterion) {
    let model = PlackettLuce::new(ModelConfig::default());
    let teams: Vec<Vec<Rating>> = (0..8)
        .map(|i| team_of_one(25.0 + i as f64, 25.0 / 3.0))
        .collect();
    let ranks: Vec<f64> = (0..8).map(|i| i as f64).collect();
    let outcome = Outcome::Ranks(ranks);

    c.bench_function("PlackettLuce 8-team free-for-all", |b| {
        b.iter(|| model.rate(black_box(&teams), black_box(Some(&outcome)), None, None, None))
    });
}

pub fn thurstone_mosteller_full_four_team(c: &mut Criterion) {
    let model = ThurstoneMostellerFull::new(ModelConfig::default());
    let teams: Vec<Vec<Rating>> = (0..4)
        .map(|i| team_of_one(25.0 + i as f64 * 2.0, 25.0 / 3.0))
        .collect();
    let outcome = Outcome::Ranks(vec![0.0, 1.0, 2.0, 3.0]);

    c.bench_function("ThurstoneMostellerFull 4-team", |b| {
        b.iter(|| model.rate(black_box(&teams), black_box(Some(&outcome)), None, None, None))
    });
}

pub fn predict_win_multi_team(c: &mut Criterion) {
    let model = PlackettLuce::new(ModelConfig::default());
    let teams: Vec<Vec<Rating>> = (0..6)
        .map(|i| team_of_one(20.0 + i as f64 * 3.0, 25.0 / 3.0))
        .collect();

    c.bench_function("predict_win 6-team", |b| {
        b.iter(|| model.predict_win(black_box(&teams)))
    });
}

pub fn batch_process_1000_games(c: &mut Criterion) {
    let games: Vec<Game> = (0..1000)
        .map(|i| {
            let a = format!("p{}", i % 64);
            let b = format!("p{}", (i + 1) % 64);
            Game {
                teams: vec![vec![a], vec![b]],
                ranks: Some(vec![0.0, 1.0]),
                scores: None,
                weights: None,
            }
        })
        .collect();
    let processor = BatchProcessor::new(PlackettLuce::new(ModelConfig::default()), 4, true);

    c.bench_function("BatchProcessor 1000 games, 4 workers", |b| {
        b.iter(|| processor.process(black_box(&games), None))
    });
}

criterion_group!(
    benches,
    plackett_luce_two_player,
    plackett_luce_eight_team_ffa,
    thurstone_mosteller_full_four_team,
    predict_win_multi_team,
    batch_process_1000_games,
);
criterion_main!(benches);
