//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use oak_disperser::config::{Config, LogFormat};
    use oak_disperser::{BatchValidator, DisperserError};
    use serde_json::json;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    const EXAMPLE_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/disperser.example.yaml");

    #[test]
    fn test_example_config_matches_defaults() {
        let config = tokio_test::block_on(Config::from_file(EXAMPLE_CONFIG)).unwrap();

        assert_eq!(config.dispatcher, Config::default().dispatcher);
        assert_eq!(config.server, Config::default().server);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_without_file() {
        let config = tokio_test::block_on(Config::load(None)).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_bad_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"dispatcher: [not, a, mapping]\n").unwrap();

        let err = tokio_test::block_on(Config::load(Some(file.path()))).unwrap_err();
        assert!(matches!(err, DisperserError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = tokio_test::block_on(Config::load(Some(Path::new("/no/such/config.yaml"))))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_file_defaults_flow_into_validation() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"dispatcher:\n  default_timeout_ms: 750\n  default_expect_status: [202]\n  block_private_targets: true\n",
        )
        .unwrap();

        let config = tokio_test::block_on(Config::from_file(file.path())).unwrap();
        let validator = BatchValidator::new(config.dispatcher());

        let batch = validator
            .validate(&json!({ "actions": [{ "id": "a", "url": "https://hooks.example.com" }] }))
            .unwrap();
        assert_eq!(batch.actions()[0].timeout_ms(), 750);
        assert!(batch.actions()[0].expects(202));
        assert!(!batch.actions()[0].expects(200));

        let err = validator
            .validate(&json!({ "actions": [{ "id": "a", "url": "http://localhost:9000" }] }))
            .unwrap_err();
        assert!(err.has_field("actions[0].url"));
    }
}
