//! `hostguard validate`: check a configuration file for errors.
//!
//! The file goes through the same parser and validator as `run`, so a file
//! that passes here is one the gate will start with. Both report formats
//! name the route the gate would enforce.

use std::path::Path;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::sources::parse_config_str;
use crate::config::validation;
use crate::error::{HostGuardError, ValidationError};

pub fn execute(args: &ValidateArgs) -> Result<(), HostGuardError> {
    let path = &args.config;
    let config = load(path)?;
    let outcome = validation::validate(&config);
    let errors = outcome.as_ref().err().map_or(&[][..], Vec::as_slice);

    match args.format {
        ValidateFormat::Json => println!("{}", json_report(&config, errors)),
        // Errors reach the terminal once, through main
        ValidateFormat::Text if errors.is_empty() => println!(
            "\u{2713} {}",
            validation::format_validation_report(&path.display().to_string(), &config)
        ),
        ValidateFormat::Text => {}
    }

    outcome.map_err(|errors| HostGuardError::ConfigValidation { errors })
}

/// Read and parse `path` by extension, without validating it.
pub fn load(path: &Path) -> Result<Config, HostGuardError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HostGuardError::ConfigFileNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// `valid`, the parsed route, and one entry per error (empty when valid).
#[must_use]
pub fn json_report(config: &Config, errors: &[ValidationError]) -> serde_json::Value {
    let errors: Vec<serde_json::Value> = errors
        .iter()
        .map(|e| {
            serde_json::json!({
                "field": e.field,
                "message": e.message,
                "suggestion": e.suggestion,
            })
        })
        .collect();
    serde_json::json!({
        "valid": errors.is_empty(),
        "route": {
            "host": config.route.host,
            "port": config.route.port,
        },
        "errors": errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_for(config: &Config) -> Vec<ValidationError> {
        validation::validate(config).err().unwrap_or_default()
    }

    #[test]
    fn json_report_for_valid_config() {
        let config = Config::new("verification.example", 8080);
        let report = json_report(&config, &errors_for(&config));
        assert_eq!(report["valid"], true);
        assert_eq!(report["route"]["host"], "verification.example");
        assert_eq!(report["route"]["port"], 8080);
        assert_eq!(report["errors"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn json_report_lists_each_error() {
        let config = Config::new("verification.example:8080", 0);
        let report = json_report(&config, &errors_for(&config));
        assert_eq!(report["valid"], false);

        let errors = report["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "route.host");
        assert_eq!(
            errors[0]["suggestion"],
            "use host 'verification.example' and set route.port to 8080"
        );
        assert_eq!(errors[1]["field"], "route.port");
        assert!(errors[1]["suggestion"].is_null());
    }

    #[test]
    fn invalid_config_error_lists_every_field() {
        let err = HostGuardError::ConfigValidation {
            errors: errors_for(&Config::new("", 0)),
        };
        let text = err.to_string();
        assert!(text.contains("route.host: host cannot be empty"), "{text}");
        assert!(text.contains("route.port"), "{text}");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load(Path::new("no-such-hostguard.yaml")).unwrap_err();
        assert!(matches!(err, HostGuardError::ConfigFileNotFound { .. }));
    }

    #[cfg(feature = "json")]
    #[test]
    fn execute_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "hostguard-{}-validate-invalid.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"route": {"host": "bad host", "port": 8080}}"#).unwrap();

        let args = ValidateArgs {
            config: path.clone(),
            format: ValidateFormat::Json,
        };
        let err = execute(&args).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        let HostGuardError::ConfigValidation { errors } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "route.host");
    }

    #[test]
    fn execute_accepts_example_config() {
        let args = ValidateArgs {
            config: Path::new(env!("CARGO_MANIFEST_DIR")).join("example/hostguard.yaml"),
            format: ValidateFormat::Text,
        };
        #[cfg(feature = "yaml")]
        assert!(execute(&args).is_ok());
        #[cfg(not(feature = "yaml"))]
        assert!(matches!(
            execute(&args),
            Err(HostGuardError::UnsupportedFormat(_))
        ));
    }
}
