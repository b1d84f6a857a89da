// ABOUTME: Test support utilities.
// ABOUTME: Recording mocks for the cloud and engine capabilities, plus shared fixtures.

use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod mock_cloud;
#[allow(dead_code)]
pub mod mock_engine;

use lamdeploy::commands::Invocation;
use lamdeploy::config::{EnvSnapshot, Overrides, Settings};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("lamdeploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub const TAG: &str = "20240101-120000";

/// Environment with all three secrets and a fixed image tag.
#[allow(dead_code)]
pub fn full_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SLACK_BOT_TOKEN", "xoxb-test"),
        ("SLACK_SIGNING_SECRET", "signing-test"),
        ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ("IMAGE_TAG", TAG),
    ]
}

#[allow(dead_code)]
pub fn invocation_with(pairs: Vec<(&str, &str)>, settings: Settings) -> Invocation {
    Invocation {
        settings,
        env: EnvSnapshot::from_pairs(pairs),
        overrides: Overrides::default(),
    }
}

#[allow(dead_code)]
pub fn invocation() -> Invocation {
    invocation_with(full_env(), Settings::default())
}

/// Full environment minus one variable.
#[allow(dead_code)]
pub fn env_without(name: &str) -> Vec<(&'static str, &'static str)> {
    full_env().into_iter().filter(|(k, _)| *k != name).collect()
}
