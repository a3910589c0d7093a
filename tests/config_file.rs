// tests/config_file.rs
//
// The shipped sample config parses and agrees with the built-in defaults
// where it restates them; explicit paths and $PIPELINE_CONFIG_PATH resolve.

use std::env;
use std::io::Write as _;

use serial_test::serial;

use content_pipeline::config::{PipelineConfig, ENV_PATH};
use content_pipeline::model::Category;

const SAMPLE: &str = include_str!("../config/pipeline.toml");

#[test]
fn sample_config_parses() {
    let cfg = PipelineConfig::from_toml_str(SAMPLE).expect("sample config parses");
    let defaults = PipelineConfig::default();

    assert_eq!(cfg.languages, vec!["en", "de"]);
    assert_eq!(cfg.scoring, defaults.scoring);
    assert_eq!(cfg.feedback_delay_secs, 7200);
    assert_eq!(cfg.synthesis.secondary, defaults.synthesis.secondary);
    assert_eq!(cfg.synthesis.voices, defaults.synthesis.voices);
    assert_eq!(cfg.affiliates.links["finance"][0].label, "Budget planner");
    assert_eq!(cfg.scoring.category_multiplier(Category::Entertainment), 0.8);
    assert_eq!(cfg.status_addr, None);
}

#[test]
#[serial]
fn explicit_path_wins_and_env_path_is_honoured() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "daily_count = 7\nlanguages = [\"ko\"]").unwrap();

    let cfg = PipelineConfig::load(Some(f.path())).unwrap();
    assert_eq!(cfg.daily_count, 7);
    assert_eq!(cfg.languages, vec!["ko"]);

    env::set_var(ENV_PATH, f.path());
    let cfg = PipelineConfig::load(None).unwrap();
    assert_eq!(cfg.daily_count, 7);

    env::set_var(ENV_PATH, "/definitely/not/here.toml");
    assert!(PipelineConfig::load(None).is_err());
    env::remove_var(ENV_PATH);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let err = PipelineConfig::load(Some(std::path::Path::new("/nope/pipeline.toml"))).unwrap_err();
    assert!(format!("{err:#}").contains("/nope/pipeline.toml"));
}
