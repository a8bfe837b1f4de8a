use std::path::PathBuf;
use std::sync::Arc;

use anyhow::ensure;
use rc_core::domain::ReferenceBackend;

use crate::config::{AppConfig, TransportModeConfig};
use crate::http::HttpGateway;
use crate::mock::MockGateway;

// ---------------------------------------------------------------------------
// RuntimeConfig — fully validated runtime configuration
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Live,
    Mock,
}

pub struct RuntimeConfig {
    pub mode: TransportMode,
    pub endpoint: String,
    pub timeout_ms: u64,
    pub mock_delay_ms: Option<(u64, u64)>,
    pub log_level: String,
    pub log_format: String,
    pub session_cache: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// into_runtime — converts raw AppConfig into validated RuntimeConfig
// ---------------------------------------------------------------------------

pub fn into_runtime(config: AppConfig) -> Result<RuntimeConfig, anyhow::Error> {
    ensure!(config.gateway.timeout_ms > 0, "timeout_ms must be positive");

    let mode = match config.gateway.mode {
        TransportModeConfig::Live => TransportMode::Live,
        TransportModeConfig::Mock => TransportMode::Mock,
    };

    if mode == TransportMode::Live {
        ensure!(
            config.gateway.endpoint.starts_with("http://")
                || config.gateway.endpoint.starts_with("https://"),
            "live mode requires an http(s) endpoint, got {:?}",
            config.gateway.endpoint
        );
    }

    let mock_delay_ms = match config.gateway.mock_delay_ms {
        None => None,
        Some([lo, hi]) => {
            ensure!(lo <= hi, "mock_delay_ms range is reversed: [{lo}, {hi}]");
            Some((lo, hi))
        }
    };

    Ok(RuntimeConfig {
        mode,
        endpoint: config.gateway.endpoint,
        timeout_ms: config.gateway.timeout_ms,
        mock_delay_ms,
        log_level: config.logging.level,
        log_format: config.logging.format,
        session_cache: config.session.cache_path.map(PathBuf::from),
    })
}

// ---------------------------------------------------------------------------
// build_backend — constructs the transport selected by the config
// ---------------------------------------------------------------------------

pub fn build_backend(runtime: &RuntimeConfig) -> Result<Arc<dyn ReferenceBackend>, anyhow::Error> {
    match runtime.mode {
        TransportMode::Live => {
            let gateway = HttpGateway::new(&runtime.endpoint, runtime.timeout_ms)?;
            Ok(Arc::new(gateway))
        }
        TransportMode::Mock => {
            let mut mock = MockGateway::with_sample_data();
            if let Some((lo, hi)) = runtime.mock_delay_ms {
                mock = mock.with_delay_range(lo, hi);
            }
            Ok(Arc::new(mock))
        }
    }
}

// ---------------------------------------------------------------------------
// init_tracing — subscriber setup per config
// ---------------------------------------------------------------------------

pub fn init_tracing(runtime: &RuntimeConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&runtime.log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if runtime.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GatewayConfig, LoggingConfig, SessionConfig};

    fn make_config() -> AppConfig {
        AppConfig {
            gateway: GatewayConfig {
                endpoint: "https://script.example.com/macros/s/key/exec".to_owned(),
                mode: TransportModeConfig::Live,
                timeout_ms: 30_000,
                mock_delay_ms: None,
            },
            logging: LoggingConfig::default(),
            session: SessionConfig::default(),
        }
    }

    #[test]
    fn test_valid_live_config_converts() {
        let runtime = into_runtime(make_config()).expect("valid config should convert");

        assert_eq!(runtime.mode, TransportMode::Live);
        assert_eq!(runtime.timeout_ms, 30_000);
        assert_eq!(runtime.log_level, "info");
        assert!(runtime.session_cache.is_none());
    }

    #[test]
    fn test_live_mode_requires_endpoint() {
        let mut config = make_config();
        config.gateway.endpoint.clear();

        match into_runtime(config) {
            Err(e) => assert!(e.to_string().contains("live mode requires")),
            Ok(_) => panic!("expected error for empty endpoint"),
        }
    }

    #[test]
    fn test_mock_mode_needs_no_endpoint() {
        let mut config = make_config();
        config.gateway.endpoint.clear();
        config.gateway.mode = TransportModeConfig::Mock;

        let runtime = into_runtime(config).expect("mock mode converts without endpoint");
        assert_eq!(runtime.mode, TransportMode::Mock);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = make_config();
        config.gateway.timeout_ms = 0;

        match into_runtime(config) {
            Err(e) => assert!(e.to_string().contains("timeout_ms")),
            Ok(_) => panic!("expected error for zero timeout"),
        }
    }

    #[test]
    fn test_reversed_delay_range_rejected() {
        let mut config = make_config();
        config.gateway.mode = TransportModeConfig::Mock;
        config.gateway.mock_delay_ms = Some([200, 50]);

        match into_runtime(config) {
            Err(e) => assert!(e.to_string().contains("reversed")),
            Ok(_) => panic!("expected error for reversed range"),
        }
    }

    #[test]
    fn test_build_backend_mock() {
        let mut config = make_config();
        config.gateway.mode = TransportModeConfig::Mock;

        let runtime = into_runtime(config).unwrap();
        let backend = build_backend(&runtime);
        assert!(backend.is_ok());
    }
}
