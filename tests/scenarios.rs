//! End-to-end scenarios mirroring the numeric worked examples used to
//! pin down this crate's update formulas.

use wengrate::{
    partition_waves, BradleyTerryFull, Game, ModelConfig, Outcome, PlackettLuce, Rating,
    RatingModel, ThurstoneMostellerFull,
};

#[test]
fn two_player_plackett_luce_defaults() {
    let cfg = ModelConfig::default();
    let model = PlackettLuce::new(cfg.clone());
    let a = Rating::new(25.0, 8.333, Some("A".to_string()));
    let b = Rating::new(25.0, 8.333, Some("B".to_string()));
    let teams = vec![vec![a], vec![b]];
    let outcome = Outcome::Ranks(vec![1.0, 2.0]);

    let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();

    assert!((out[0][0].mu - 27.6352).abs() < 5e-3);
    assert!((out[0][0].sigma - 8.0655).abs() < 5e-3);
    assert!((out[1][0].mu - 22.3648).abs() < 5e-3);
    assert!((out[1][0].sigma - 8.0655).abs() < 5e-3);
}

#[test]
fn five_player_free_for_all_bradley_terry_full_defaults() {
    let cfg = ModelConfig::default();
    let model = BradleyTerryFull::new(cfg.clone());
    let teams: Vec<Vec<Rating>> = (0..5)
        .map(|i| vec![Rating::new(cfg.mu, cfg.sigma, Some(format!("P{i}")))])
        .collect();
    let outcome = Outcome::Ranks(vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();

    let expected_mu = [35.5416, 30.2708, 25.0, 19.7292, 14.4584];
    for (player, &mu) in out.iter().zip(expected_mu.iter()) {
        assert!((player[0].mu - mu).abs() < 5e-3, "got {}, want {mu}", player[0].mu);
        assert!((player[0].sigma - 7.2025).abs() < 5e-3);
    }
}

#[test]
fn three_team_score_tie_on_thurstone_mosteller_full() {
    let model = ThurstoneMostellerFull::new(ModelConfig::default());
    let cfg = ModelConfig::default();
    let a = vec![Rating::new(cfg.mu, cfg.sigma, Some("A".to_string()))];
    let b = vec![Rating::new(cfg.mu, cfg.sigma, Some("B".to_string()))];
    let c = vec![Rating::new(cfg.mu, cfg.sigma, Some("C".to_string()))];
    let teams = vec![a, b, c];
    let outcome = Outcome::Scores(vec![5.0, 5.0, 3.0]);

    let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();

    assert!((out[0][0].mu - out[1][0].mu).abs() < 1e-9, "A and B tied, should finish equal");
    assert!(out[0][0].mu > out[2][0].mu, "C lost outright, should finish strictly lower");
    assert!(out[1][0].mu > out[2][0].mu, "C lost outright, should finish strictly lower");
}

#[test]
fn four_game_wave_partition_matches_worked_example() {
    let g = |left: &[&str], right: &[&str]| Game {
        teams: vec![
            left.iter().map(|s| s.to_string()).collect(),
            right.iter().map(|s| s.to_string()).collect(),
        ],
        ranks: None,
        scores: None,
        weights: None,
    };

    let games = vec![
        g(&["a", "b"], &["c", "d"]), // G0
        g(&["e", "f"], &["g", "h"]), // G1
        g(&["a", "e"], &["i", "j"]), // G2 touches G0 and G1
        g(&["c", "g"], &["k", "l"]), // G3 touches G0 and G1
    ];

    let waves = partition_waves(&games);
    assert_eq!(waves, vec![vec![0, 1], vec![2, 3]]);
}
