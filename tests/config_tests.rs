use std::path::PathBuf;
use tokio_test::{assert_err, assert_ok};

use aeosgen::error::Error;
use aeosgen::request::validate_target_name;
use aeosgen::{FencePolicy, GeneratorConfig, TemplateSource};

#[test]
fn test_defaults()
{   let config = GeneratorConfig::default();
    assert_eq!(config.template, TemplateSource::default());
    assert_eq!(config.template.branch, "main");
    assert_eq!(config.completion.max_tokens, 2000);
    assert_eq!(config.completion.temperature, 0.7);
    assert_eq!(config.completion.timeout_secs, None);
    assert_eq!(config.entry_point, PathBuf::from("src/index.ts"));
    assert_eq!(config.fence_policy, FencePolicy::Keep);
    assert!(config.cleanup_on_failure);
    assert_ok!(config.validate());
}

#[test]
fn test_from_file_fills_missing_keys()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aeosgen.json");
    std::fs::write(
      &path,
      r#"{
        "template": { "owner": "me", "repo": "my-template", "branch": "next" },
        "completion": { "model": "mistral-small-latest", "api_base": "https://api.mistral.ai/v1" },
        "fence_policy": "strip"
      }"#
    ).unwrap();

    let config = assert_ok!(GeneratorConfig::from_file(&path));
    assert_eq!(
      config.template,
      TemplateSource::new("me", "my-template").with_branch("next")
    );
    assert_eq!(config.completion.model, "mistral-small-latest");
    assert_eq!(config.completion.max_tokens, 2000);
    assert_eq!(config.fence_policy, FencePolicy::Strip);
    assert!(config.cleanup_on_failure);
}

#[test]
fn test_from_file_errors()
{   let dir = tempfile::tempdir().unwrap();

    let missing = assert_err!(
      GeneratorConfig::from_file(&dir.path().join("nope.json"))
    );
    assert!(matches!(missing, Error::Io(_)));

    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "fence_policy": "sometimes" }"#).unwrap();
    let bad = assert_err!(GeneratorConfig::from_file(&path));
    assert!(matches!(bad, Error::InvalidConfiguration(_)));
}

#[test]
fn test_validate_rejects_bad_values()
{   let mut config = GeneratorConfig::default();
    config.template.repo = " ".to_string();
    assert!(matches!(
      assert_err!(config.validate()),
      Error::InvalidConfiguration(_)
    ));

    let mut config = GeneratorConfig::default();
    config.completion.temperature = 3.5;
    assert_err!(config.validate());

    let mut config = GeneratorConfig::default();
    config.entry_point = PathBuf::from("/etc/passwd");
    assert_err!(config.validate());
}

#[test]
fn test_target_name_rules()
{   assert_ok!(validate_target_name("weather-plugin"));
    assert_ok!(validate_target_name("plugin_2.0"));
    assert_err!(validate_target_name(""));
    assert_err!(validate_target_name(".."));
    assert_err!(validate_target_name("nested/name"));
}
