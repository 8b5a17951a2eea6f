//! `hostguard init`: generate a starter configuration file.
//!
//! Writes a documented YAML, JSON, or TOML template. Existing files are
//! never overwritten.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::HostGuardError;

pub fn execute(args: &InitArgs) -> Result<(), HostGuardError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("hostguard.{}", args.format.extension())));

    if output.exists() {
        return Err(HostGuardError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Yaml => YAML_TEMPLATE,
        ConfigFormat::Json => JSON_TEMPLATE,
        ConfigFormat::Toml => TOML_TEMPLATE,
    }
}

const YAML_TEMPLATE: &str = r#"# hostguard config
#
# Requests are only let through when their Host header names this route:
#   Host: portal.example        (bare host)
#   Host: portal.example:8080   (host and port)
# Any X-Forwarded-Host header is rejected with 400 Bad Request.

route:
  host: "portal.example"
  port: 8080
"#;

const JSON_TEMPLATE: &str = r#"{
  "route": {
    "host": "portal.example",
    "port": 8080
  }
}
"#;

const TOML_TEMPLATE: &str = r#"# hostguard config
#
# Requests are only let through when their Host header names this route.
# Any X-Forwarded-Host header is rejected with 400 Bad Request.

[route]
host = "portal.example"
port = 8080
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::parse_config_str;
    use crate::config::validation::validate;

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_template_is_valid() {
        let config = parse_config_str("yaml", YAML_TEMPLATE, "template").unwrap();
        validate(&config).unwrap();
        assert_eq!(config.route.port, 8080);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_template_is_valid() {
        let config = parse_config_str("json", JSON_TEMPLATE, "template").unwrap();
        validate(&config).unwrap();
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_template_is_valid() {
        let config = parse_config_str("toml", TOML_TEMPLATE, "template").unwrap();
        validate(&config).unwrap();
    }
}
