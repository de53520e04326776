use sahak_common::observability::{init_logging, LogConfig};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Debug-level logs for mock-server tests, written under the temp dir.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = init_logging(LogConfig {
            app_name: "sahak-llm-tests",
            log_dir: Some(std::env::temp_dir().join("sahak-llm-tests")),
            emit_stderr: std::env::var_os("SAHAK_TEST_STDERR").is_some(),
            default_filter: "sahak_llm=debug,http=debug".to_string(),
            ..LogConfig::default()
        });
    });
}
