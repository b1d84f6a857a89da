// ABOUTME: Integration tests for settings parsing, env file layering and resolution.
// ABOUTME: Covers YAML settings, precedence between flags, shell and env file.

use lamdeploy::config::*;
use lamdeploy::deploy::DeployError;
use lamdeploy::error::Error;
use proptest::prelude::*;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
stack_name: support-bot
region: eu-west-1
environment: prod
repository: bots/support
template: infra/stack.yaml
env_file: .env.prod
build:
  context: service
  dockerfile: service/Containerfile
function_update:
  timeout: 2m
  initial_backoff: 1s
  max_backoff: 10s
parameters:
  MemorySize: "1024"
  LogLevel:
    env: BOT_LOG_LEVEL
    default: info
tags:
  team: platform
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.stack_name.unwrap().as_str(), "support-bot");
        assert_eq!(settings.region.unwrap().as_str(), "eu-west-1");
        assert_eq!(settings.repository.unwrap().as_str(), "bots/support");
        assert_eq!(settings.build.dockerfile.to_str(), Some("service/Containerfile"));
        assert_eq!(settings.build.platform, DEFAULT_PLATFORM);
        assert_eq!(settings.function_update.timeout, Duration::from_secs(120));
        assert_eq!(settings.function_update.max_backoff, Duration::from_secs(10));
        assert_eq!(
            settings.parameters.get("LogLevel"),
            Some(&EnvValue::FromEnv {
                var: "BOT_LOG_LEVEL".to_string(),
                default: Some("info".to_string()),
            })
        );
        assert_eq!(settings.tags.get("team").map(String::as_str), Some("platform"));
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = Settings::from_yaml("{}").unwrap();
        assert!(settings.stack_name.is_none());
        assert_eq!(settings.build, BuildSettings::default());
        assert_eq!(settings.function_update, FunctionUpdateSettings::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Settings::from_yaml("stack_name: bot\nservers: []\n");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn invalid_stack_name_is_rejected_at_parse_time() {
        assert!(Settings::from_yaml("stack_name: 9lives\n").is_err());
    }

    #[test]
    fn uppercase_repository_is_rejected_at_parse_time() {
        assert!(Settings::from_yaml("repository: SlackBot\n").is_err());
    }
}

mod discovery {
    use super::*;

    #[test]
    fn discover_prefers_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME), "stack_name: primary\n").unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME_ALT), "stack_name: alternate\n").unwrap();

        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.stack_name.unwrap().as_str(), "primary");
    }

    #[test]
    fn discover_reads_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".lamdeploy")).unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME_DIR), "environment: staging\n").unwrap();

        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.environment.as_deref(), Some("staging"));
    }

    #[test]
    fn discover_without_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::discover(dir.path()).unwrap();
        assert!(settings.stack_name.is_none());
    }

    #[test]
    fn discover_surfaces_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME), "stack_name: [\n").unwrap();
        assert!(Settings::discover(dir.path()).is_err());
    }
}

mod resolution {
    use super::*;

    fn secrets() -> [(&'static str, &'static str); 3] {
        [
            (SLACK_BOT_TOKEN, "xoxb-1"),
            (SLACK_SIGNING_SECRET, "sig"),
            (ANTHROPIC_API_KEY, "sk-ant"),
        ]
    }

    #[test]
    fn secrets_can_come_from_env_file() {
        let env = EnvSnapshot::default().with_env_file(&EnvFile::parse(
            "SLACK_BOT_TOKEN=xoxb-1\nSLACK_SIGNING_SECRET=sig\nANTHROPIC_API_KEY=sk-ant\n",
        ));
        let config =
            DeploymentConfig::resolve(&Settings::default(), &env, &Overrides::default()).unwrap();
        assert_eq!(config.target.stack_name.as_str(), DEFAULT_STACK_NAME);
    }

    #[test]
    fn missing_secrets_are_all_named() {
        let env = EnvSnapshot::from_pairs([(SLACK_BOT_TOKEN, "xoxb-1")]);
        let err = DeploymentConfig::resolve(&Settings::default(), &env, &Overrides::default())
            .unwrap_err();
        match err {
            Error::Deploy(DeployError::MissingSecret { names }) => {
                assert_eq!(names, vec![SLACK_SIGNING_SECRET, ANTHROPIC_API_KEY]);
            }
            other => panic!("expected MissingSecret, got {other:?}"),
        }
    }

    #[test]
    fn explicit_image_tag_is_used() {
        let mut pairs = secrets().to_vec();
        pairs.push((ENV_IMAGE_TAG, "release-42"));
        let env = EnvSnapshot::from_pairs(pairs);
        let config =
            DeploymentConfig::resolve(&Settings::default(), &env, &Overrides::default()).unwrap();
        assert_eq!(config.target.image_tag.as_str(), "release-42");
    }

    #[test]
    fn parameter_references_resolve_from_environment() {
        let settings = Settings::from_yaml(
            "parameters:\n  LogLevel:\n    env: BOT_LOG_LEVEL\n    default: info\n  Memory: \"512\"\n",
        )
        .unwrap();
        let env = EnvSnapshot::from_pairs([("BOT_LOG_LEVEL", "debug")]);
        let target = DeployTarget::resolve(&settings, &env, &Overrides::default()).unwrap();
        assert_eq!(target.parameters.get("LogLevel").map(String::as_str), Some("debug"));
        assert_eq!(target.parameters.get("Memory").map(String::as_str), Some("512"));
    }

    #[test]
    fn unresolvable_parameter_reference_fails() {
        let settings = Settings::from_yaml("parameters:\n  LogLevel:\n    env: BOT_LOG_LEVEL\n")
            .unwrap();
        let result = DeployTarget::resolve(&settings, &EnvSnapshot::default(), &Overrides::default());
        assert!(matches!(result, Err(Error::MissingEnvVar(v)) if v == "BOT_LOG_LEVEL"));
    }

    #[test]
    fn repository_setting_overrides_derived_name() {
        let settings = Settings::from_yaml("stack_name: Support-Bot\nrepository: bots/support\n")
            .unwrap();
        let target =
            DeployTarget::resolve(&settings, &EnvSnapshot::default(), &Overrides::default())
                .unwrap();
        assert_eq!(target.repository.as_str(), "bots/support");
    }

    #[test]
    fn mixed_case_stack_name_derives_lowercase_repository() {
        let overrides = Overrides {
            stack_name: Some("Support-Bot".to_string()),
            ..Default::default()
        };
        let target =
            DeployTarget::resolve(&Settings::default(), &EnvSnapshot::default(), &overrides)
                .unwrap();
        assert_eq!(target.repository.as_str(), "support-bot");
    }

    #[test]
    fn poll_without_backoff_is_rejected() {
        for yaml in [
            "function_update:\n  timeout: 200ms\n  initial_backoff: 0s\n",
            "function_update:\n  initial_backoff: 0s\n  max_backoff: 0s\n",
            "function_update:\n  timeout: 0s\n",
            "function_update:\n  initial_backoff: 30s\n  max_backoff: 5s\n",
        ] {
            let settings = Settings::from_yaml(yaml).unwrap();
            let result =
                DeployTarget::resolve(&settings, &EnvSnapshot::default(), &Overrides::default());
            assert!(
                matches!(result, Err(Error::InvalidConfig(ref msg)) if msg.contains("function_update")),
                "expected rejection for {yaml:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn custom_poll_bounds_are_kept() {
        let settings = Settings::from_yaml(
            "function_update:\n  timeout: 1m\n  initial_backoff: 500ms\n  max_backoff: 4s\n",
        )
        .unwrap();
        let target =
            DeployTarget::resolve(&settings, &EnvSnapshot::default(), &Overrides::default())
                .unwrap();
        assert_eq!(target.function_update.initial_backoff, Duration::from_millis(500));
        assert_eq!(target.function_update.max_backoff, Duration::from_secs(4));
    }

    #[test]
    fn process_environment_beats_env_file() {
        temp_env::with_vars(
            [
                ("LAMDEPLOY_TEST_STACK", Some("from-shell")),
                ("LAMDEPLOY_TEST_ONLY_FILE", None::<&str>),
            ],
            || {
                let env = EnvSnapshot::from_process().with_env_file(&EnvFile::parse(
                    "LAMDEPLOY_TEST_STACK=from-file\nLAMDEPLOY_TEST_ONLY_FILE=file\n",
                ));
                assert_eq!(env.get("LAMDEPLOY_TEST_STACK"), Some("from-shell"));
                assert_eq!(env.get("LAMDEPLOY_TEST_ONLY_FILE"), Some("file"));
            },
        );
    }

    #[test]
    fn region_falls_back_to_default_region_variable() {
        temp_env::with_vars(
            [
                ("AWS_REGION", None::<&str>),
                ("AWS_DEFAULT_REGION", Some("ap-southeast-2")),
                ("STACK_NAME", None),
                ("ENVIRONMENT", None),
                ("IMAGE_TAG", None),
            ],
            || {
                let env = EnvSnapshot::from_process();
                let target =
                    DeployTarget::resolve(&Settings::default(), &env, &Overrides::default())
                        .unwrap();
                assert_eq!(target.region.as_str(), "ap-southeast-2");
            },
        );
    }
}

mod env_file_properties {
    use super::*;

    proptest! {
        #[test]
        fn simple_assignments_parse_verbatim(
            key in "[A-Z][A-Z0-9_]{0,20}",
            value in "[A-Za-z0-9_./:-]{0,40}",
        ) {
            let file = EnvFile::parse(&format!("{key}={value}\n"));
            prop_assert_eq!(file.entries(), &[(key, value)]);
        }

        #[test]
        fn quoted_values_are_unwrapped(
            key in "[A-Z][A-Z0-9_]{0,20}",
            value in "[A-Za-z0-9 _=-]{0,40}",
        ) {
            let file = EnvFile::parse(&format!("export {key}=\"{value}\"\n"));
            prop_assert_eq!(file.entries()[0].1.as_str(), value.as_str());
        }

        #[test]
        fn comment_lines_never_produce_entries(body in "[A-Za-z0-9 =_]{0,40}") {
            let file = EnvFile::parse(&format!("# {body}\n"));
            prop_assert!(file.is_empty());
        }
    }
}
