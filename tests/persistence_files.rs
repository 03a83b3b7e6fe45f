use std::fs;
use std::path::{Path, PathBuf};

use bullet_purgatory::persistence::MAX_HIGH_SCORES;
use bullet_purgatory::prelude::*;

/// Fresh scratch directory per test
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bullet_purgatory_{}_{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_in(dir: &Path) -> GameConfig {
    GameConfig {
        scores_path: dir.join("scores.scr"),
        state_path: dir.join("state.stt"),
        ..GameConfig::default()
    }
}

#[test]
fn test_saved_state_resumes() {
    let dir = scratch("resume");
    let config = config_in(&dir);

    GameState::new(77, 2).save(&config.state_path).unwrap();
    assert_eq!(starting_state(&config), GameState::new(77, 2));
}

#[test]
fn test_incomplete_state_falls_back_to_defaults() {
    let dir = scratch("incomplete");
    let config = config_in(&dir);

    fs::write(&config.state_path, "{\"score\": 12}\n").unwrap();
    assert_eq!(GameState::load(&config.state_path), None);
    assert_eq!(
        starting_state(&config),
        GameState::new(config.starting_score, config.starting_lives)
    );
}

#[test]
fn test_missing_state_falls_back_to_defaults() {
    let dir = scratch("missing");
    let config = config_in(&dir);

    assert_eq!(starting_state(&config), GameState::new(0, 5));
}

#[test]
fn test_outcomes_accumulate_best_scores() {
    let dir = scratch("scores");
    let config = config_in(&dir);

    for (name, score) in [("ada", 40), ("bob", 15), ("ada", 25), ("cy", 90)] {
        record_outcome(
            &config,
            &SessionOutcome {
                name: name.to_string(),
                score,
            },
        )
        .unwrap();
    }

    let scores = HighScores::load(&config.scores_path).unwrap();
    assert_eq!(scores.get("ada"), Some(40));
    assert_eq!(
        scores.top(MAX_HIGH_SCORES),
        vec![
            ("cy".to_string(), 90),
            ("ada".to_string(), 40),
            ("bob".to_string(), 15)
        ]
    );
}

#[test]
fn test_top_ten_only() {
    let dir = scratch("top_ten");
    let config = config_in(&dir);

    let mut scores = HighScores::new();
    for n in 0..15 {
        scores.record(&format!("player{n:02}"), n * 10);
    }
    scores.save(&config.scores_path).unwrap();

    let top = HighScores::load(&config.scores_path).unwrap().top(MAX_HIGH_SCORES);
    assert_eq!(top.len(), MAX_HIGH_SCORES);
    assert_eq!(top[0], ("player14".to_string(), 140));
    assert_eq!(top[9], ("player05".to_string(), 50));
}
