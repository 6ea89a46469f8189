use pattern_catalogue::catalogue::{self, Category};
use pattern_catalogue::AppConfig;

fn quick_config(dir: &tempfile::TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.flyweight.asteroid_count = 1_000;
    config.document.output_path = dir.path().join("document.txt");
    config
}

#[test]
fn test_every_demo_runs_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(&dir);

    for entry in catalogue::DEMOS {
        let transcript = (entry.run)(&config).unwrap_or_else(|e| panic!("{} failed: {e:#}", entry.name));
        assert!(!transcript.is_empty(), "{} produced no output", entry.name);
    }
}

#[test]
fn test_document_demo_writes_into_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(&dir);

    let entry = catalogue::find("document-editor").unwrap();
    (entry.run)(&config).unwrap();
    assert!(config.document.output_path.exists());
}

#[test]
fn test_seeded_demos_are_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let config = quick_config(&dir);

    for name in ["snake_ladder", "music_player", "tic_tac_toe"] {
        let entry = catalogue::find(name).unwrap();
        let first = (entry.run)(&config).unwrap();
        let second = (entry.run)(&config).unwrap();
        assert_eq!(first, second, "{name} is not deterministic");
    }
}

#[test]
fn test_config_file_drives_demos() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.toml");
    std::fs::write(
        &path,
        "[tic_tac_toe]\nboard_size = 4\n\n[snake_ladder]\nboard_size = 50\ndifficulty = \"easy\"\n",
    )
    .unwrap();

    let mut config = AppConfig::load(Some(path.as_path())).unwrap();
    config.flyweight.asteroid_count = 10;
    assert_eq!(config.tic_tac_toe.board_size, 4);

    for entry in catalogue::by_category(Category::Problem) {
        (entry.run)(&config).unwrap_or_else(|e| panic!("{} failed: {e:#}", entry.name));
    }
}
