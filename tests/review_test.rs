//! Integration tests: trend series, report table and the full review flow.

mod common;

use chess_core::Game;
use common::{cp, cp_only, game, mate, settings, ScriptedEngine};
use move_review::normalize::MATE_SENTINEL;
use move_review::pipeline::review_game;
use move_review::report::{render_text, GameReport};
use move_review::sampler::stable_evaluation;
use move_review::trend::evaluate_plies;
use shakmaty::{Chess, Color};

const SCHOLARS_MATE: &str = r#"[Event "Casual Game"]
[White "Tracked"]
[Black "Opponent"]
[Result "1-0"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0"#;

#[tokio::test]
async fn identical_samples_average_to_the_same_value() {
    let mut engine = ScriptedEngine::new(vec![cp_only(37), cp_only(37), cp_only(37)]);
    let s = settings(Color::White, 3);

    let eval = stable_evaluation(&mut engine, &Chess::default(), Color::White, &s.sampling)
        .await
        .unwrap();

    assert_eq!(eval, 37.0);
    assert_eq!(engine.queries.len(), 3);
    assert!(engine.queries.iter().all(|q| q.budget == s.sampling.budget));
}

#[tokio::test]
async fn trend_samples_every_ply_from_tracked_point_of_view() {
    let g = game(&["e4", "e5", "Nf3"]);
    let mut engine = ScriptedEngine::new(vec![
        // after e4, Black to move
        cp_only(-20),
        cp_only(-40),
        // after e5, White to move
        cp_only(10),
        cp_only(15),
        // after Nf3, Black to move: Black is getting mated in one trial
        mate(None, -3),
        cp_only(-200),
    ]);

    let evals = evaluate_plies(&mut engine, &g, &settings(Color::White, 2))
        .await
        .unwrap();

    let plies: Vec<usize> = evals.iter().map(|e| e.ply).collect();
    let values: Vec<f64> = evals.iter().map(|e| e.eval).collect();
    assert_eq!(plies, vec![1, 2, 3]);
    assert_eq!(values, vec![30.0, 12.5, f64::from(MATE_SENTINEL + 200) / 2.0]);
    assert_eq!(evals[1].side, Color::Black);

    let report = GameReport::from_evaluations(g.metadata.clone(), &evals);
    assert_eq!(report.trend.len(), 3);
    assert_eq!(
        report.table_lines(),
        vec!["1. | e4 | +30 | e5 | +12 |", "2. | Nf3 | +5100 |  |  |"]
    );
}

#[tokio::test]
async fn trend_for_black_flips_signs() {
    let g = game(&["d4"]);
    let mut engine = ScriptedEngine::new(vec![cp_only(-25)]);

    let evals = evaluate_plies(&mut engine, &g, &settings(Color::Black, 1))
        .await
        .unwrap();

    // Black to move reports -25 for itself
    assert_eq!(evals[0].eval, -25.0);
}

#[tokio::test]
async fn full_review_of_a_miniature() {
    let g = Game::from_pgn(SCHOLARS_MATE).unwrap();
    assert_eq!(g.len(), 7);

    let mut replies = vec![
        // Trend pass: one sample after each of the 7 plies
        cp_only(-30),
        cp_only(25),
        cp_only(50),
        cp_only(-60),
        cp_only(-55),
        cp_only(600),
        mate(None, 0),
    ];
    replies.extend([
        // 1. e4: engine agrees
        cp("e2e4", 30),
        cp_only(-30),
        // 2. Qh5: engine prefers Nf3, 90 cp worse
        cp("g1f3", 40),
        cp_only(50),
        // 3. Bc4: engine agrees, small drift
        cp("f1c4", 60),
        cp_only(-55),
        // 4. Qxf7#: mate either way
        mate(Some("h5f7"), 1),
        mate(None, 0),
    ]);
    let mut engine = ScriptedEngine::new(replies);

    let review = review_game(&mut engine, &g, &settings(Color::White, 1))
        .await
        .unwrap();

    assert_eq!(engine.remaining(), 0);
    assert_eq!(engine.queries.len(), 7 + 4 * 2);

    assert_eq!(review.report.rows.len(), 4);
    assert!(review.report.rows[3].black.is_none());
    assert_eq!(review.report.rows[3].white.notation, "Qxf7#");
    assert_eq!(review.report.trend.last().map(|p| p.eval), Some(f64::from(MATE_SENTINEL)));

    assert_eq!(review.moves.len(), 4);
    assert_eq!(review.moves[3].errors, vec![0]);
    assert_eq!(review.accuracy.total, 4);
    assert_eq!(review.accuracy.accurate, 3);
    assert_eq!(review.accuracy.percentage, 75.0);
    assert_eq!(review.accuracy.flagged.len(), 1);

    let text = render_text(&review.report, &review.accuracy);
    assert!(text.starts_with("Tracked vs Opponent (1-0)"));
    assert!(text.contains("1. | e4 | +30 | e5 | +25 |"));
    assert!(text.contains("2. Qh5 -> Nf3  avg. diff: 90"));
    assert!(text.contains("Overall Accuracy: 75.00%"));

    let json = serde_json::to_value(&review).unwrap();
    assert_eq!(json["settings"]["tracked"], "white");
    assert_eq!(json["accuracy"]["flagged"][0]["best"], "Nf3");
    assert_eq!(json["report"]["trend"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn review_stops_at_first_engine_failure() {
    let g = game(&["e4", "e5"]);
    // Trend pass completes, move error pass runs dry
    let mut engine = ScriptedEngine::new(vec![cp_only(-30), cp_only(20)]);

    let err = review_game(&mut engine, &g, &settings(Color::White, 1))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), "engine");
}
