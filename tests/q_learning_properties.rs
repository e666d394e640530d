//! Q-learning engine: convergence, exploration and value propagation.

mod common;

use std::collections::HashMap;

use common::{cell, engine, greedy, obs_at};
use qbert::{
    abstraction::{PolicyKind, StateRepr},
    board::Move,
    q_learning::{DistanceMetric, ExplorationMode, LearnerConfig},
};
use statrs::distribution::{ChiSquared, ContinuousCDF};

#[test]
fn test_single_state_loop_converges_to_discounted_sum() {
    let reward = 4.0;
    let gamma = 0.9;
    let mut learner = engine(
        greedy(1).with_discount_factor(gamma).with_learning_rate(0.2),
        StateRepr::Simple,
        PolicyKind::Block,
    );
    let state = learner.abstract_state(&obs_at(cell(2, 1)));

    let expected = reward / (1.0 - gamma);
    let mut q = 0.0;
    let mut gap = expected;
    for step in 0..2_000 {
        q = learner.update(&state, Move::Down, &state, reward);
        let next_gap = (q - expected).abs();
        assert!(
            next_gap <= gap + 1e-12,
            "gap grew at step {step}: {gap} -> {next_gap}"
        );
        gap = next_gap;
    }
    assert!(q <= expected + 1e-9);
    assert!(gap < 1e-6, "{q} vs {expected}");
}

#[test]
fn test_terminal_like_state_backs_up_reward_only() {
    let mut learner = engine(greedy(2), StateRepr::Simple, PolicyKind::Block);
    let state = learner.abstract_state(&obs_at(cell(1, 0)));
    let next = learner.abstract_state(&obs_at(cell(2, 0)));
    let q = learner.update(&state, Move::Down, &next, 25.0);
    assert!((q - 2.5).abs() < 1e-12);
}

#[test]
fn test_full_epsilon_is_uniform_over_valid_moves() {
    let config = LearnerConfig::default()
        .with_exploration(ExplorationMode::Random)
        .with_epsilon(1.0)
        .with_seed(Some(77));
    let mut learner = engine(config, StateRepr::Simple, PolicyKind::Block);
    let state = learner.abstract_state(&obs_at(cell(3, 1)));
    // A strongly preferred move must not bias pure exploration.
    learner.update(&state, Move::Up, &state, 1_000.0);

    let draws = 8_000;
    let mut counts: HashMap<Move, usize> = HashMap::new();
    for _ in 0..draws {
        *counts.entry(learner.best_action(&state).unwrap()).or_default() += 1;
    }
    assert_eq!(counts.len(), 4);

    let expected = draws as f64 / 4.0;
    let statistic: f64 = counts
        .values()
        .map(|&observed| (observed as f64 - expected).powi(2) / expected)
        .sum();
    let p_value = 1.0 - ChiSquared::new(3.0).unwrap().cdf(statistic);
    assert!(p_value > 0.001, "chi-squared {statistic}, p = {p_value}");
}

#[test]
fn test_random_choice_from_top_uses_only_legal_moves() {
    let config = LearnerConfig::default()
        .with_exploration(ExplorationMode::Random)
        .with_epsilon(1.0)
        .with_seed(Some(5));
    let mut learner = engine(config, StateRepr::AdjacentConservative, PolicyKind::Enemy);
    let state = learner.abstract_state(&obs_at(qbert::board::Cell::TOP));
    for _ in 0..200 {
        let m = learner.best_action(&state).unwrap();
        assert!(matches!(m, Move::Down | Move::Right));
    }
}

#[test]
fn test_optimistic_prefers_untried_moves() {
    let config = LearnerConfig::default()
        .with_exploration(ExplorationMode::Optimistic)
        .with_seed(Some(9));
    let mut learner = engine(config, StateRepr::Simple, PolicyKind::Block);
    let here = obs_at(cell(3, 1));
    let state = learner.abstract_state(&here);
    let next = learner.abstract_state(&here.projected(cell(4, 1)));

    // Visited once and worth less than the bonus: still treated as untried.
    learner.update(&state, Move::Down, &next, 25.0);
    assert_eq!(learner.visits().get(&state, Move::Down), 1);
    assert_eq!(learner.best_actions(&state).unwrap().len(), 4);

    for _ in 0..5 {
        learner.update(&state, Move::Left, &next, -500.0);
    }
    let best = learner.best_actions(&state).unwrap();
    assert!(!best.contains(&Move::Left));
    assert_eq!(best.len(), 3);
}

#[test]
fn test_simple_metric_copies_value_to_neighbors() {
    let config = greedy(3).with_distance_metric(DistanceMetric::Simple);
    let mut learner = engine(config, StateRepr::Simple, PolicyKind::Block);
    let before = obs_at(cell(2, 1));
    let after = before.projected(cell(3, 1));

    let new_q = learner.learn_step(&before, Move::Down, &after, 25.0);
    assert!(new_q > 0.0);
    for (_, neighbor) in before.position.neighbors() {
        let state = learner.abstract_state(&before.projected(neighbor));
        assert_eq!(learner.q_table().get(&state, Move::Down), new_q, "{neighbor}");
    }
}

#[test]
fn test_adjacent_metric_copies_value_with_inverse_move() {
    let config = greedy(4).with_distance_metric(DistanceMetric::Adjacent);
    let mut learner = engine(config, StateRepr::Simple, PolicyKind::Block);
    let before = obs_at(cell(2, 1));
    let after = before.projected(cell(3, 2));

    let new_q = learner.learn_step(&before, Move::Right, &after, 25.0);
    for (_, neighbor) in before.position.neighbors() {
        let state = learner.abstract_state(&before.projected(neighbor));
        assert_eq!(learner.q_table().get(&state, Move::Left), new_q, "{neighbor}");
        assert_eq!(learner.q_table().get(&state, Move::Right), 0.0);
    }
}

#[test]
fn test_no_metric_touches_only_the_visited_state() {
    let mut learner = engine(greedy(6), StateRepr::Simple, PolicyKind::Block);
    let before = obs_at(cell(2, 1));
    learner.learn_step(&before, Move::Down, &before.projected(cell(3, 1)), 25.0);
    assert_eq!(learner.table_size(), 1);
}

#[test]
fn test_non_finite_values_are_kept() {
    let mut learner = engine(greedy(8), StateRepr::Simple, PolicyKind::Block);
    let state = learner.abstract_state(&obs_at(cell(1, 1)));
    let q = learner.update(&state, Move::Down, &state, f64::INFINITY);
    assert!(q.is_infinite());
    assert_eq!(learner.q_table().non_finite_count(), 1);
    assert!(learner.best_action(&state).is_ok());
}
