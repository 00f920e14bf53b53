//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{LineItemScope, OrderflowConfig};
use super::secret::secret_string;
use crate::domain::errors::PipelineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file, or starts from defaults when it does not exist
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`OrderflowConfig`]
/// 4. Applies environment variable overrides (`SHOPIFY_*`, `ORDERFLOW_*`)
/// 5. Resolves relative paths against the file's directory
/// 6. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use orderflow::config::loader::load_config;
///
/// let config = load_config("orderflow.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<OrderflowConfig> {
    let path = path.as_ref();

    let (mut config, base_dir) = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|e| {
            PipelineError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let contents = substitute_env_vars(&contents)?;

        let config: OrderflowConfig = toml::from_str(&contents)
            .map_err(|e| PipelineError::Configuration(format!("Failed to parse TOML: {e}")))?;

        (config, config_dir(path)?)
    } else {
        tracing::debug!(
            path = %path.display(),
            "Configuration file not found, using defaults and environment"
        );
        (OrderflowConfig::default(), std::env::current_dir()?)
    };

    apply_env_overrides(&mut config)?;
    config.resolve_paths(&base_dir);

    config.validate().map_err(|e| {
        PipelineError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Absolute directory containing the configuration file
fn config_dir(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/")))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides
///
/// Store credentials use the `SHOPIFY_API_*` names; everything else follows
/// `ORDERFLOW_<SECTION>_<KEY>`.
fn apply_env_overrides(config: &mut OrderflowConfig) -> Result<()> {
    // Shopify credentials
    if let Ok(val) = std::env::var("SHOPIFY_API_URL") {
        config.shopify.store_url = val;
    }
    if let Ok(val) = std::env::var("SHOPIFY_API_VERSION") {
        config.shopify.api_version = val;
    }
    if let Ok(val) = std::env::var("SHOPIFY_API_KEY") {
        config.shopify.api_key = secret_string(val);
    }

    if let Ok(val) = std::env::var("ORDERFLOW_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Shopify overrides
    if let Ok(val) = std::env::var("ORDERFLOW_SHOPIFY_EXPECTED_STORE_NAME") {
        config.shopify.expected_store_name = Some(val).filter(|v| !v.is_empty());
    }
    if let Ok(val) = std::env::var("ORDERFLOW_SHOPIFY_PAGE_SIZE") {
        config.shopify.page_size = parse_override("ORDERFLOW_SHOPIFY_PAGE_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_SHOPIFY_MAX_PAGES") {
        config.shopify.max_pages = parse_override("ORDERFLOW_SHOPIFY_MAX_PAGES", &val)?;
    }

    // Database and export overrides
    if let Some(path) = database_path_override() {
        config.database.path = path;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_EXPORT_OUTPUT_PATH") {
        config.export.output_path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("ORDERFLOW_EXPORT_LINE_ITEM_SCOPE") {
        config.export.line_item_scope =
            LineItemScope::from_str(&val).map_err(PipelineError::Configuration)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ORDERFLOW_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ORDERFLOW_LOGGING_LOCAL_PATH") {
        config.logging.local_path = PathBuf::from(val);
    }

    Ok(())
}

/// Database path from `ORDERFLOW_DATABASE_PATH`, if set
pub fn database_path_override() -> Option<PathBuf> {
    std::env::var_os("ORDERFLOW_DATABASE_PATH").map(PathBuf::from)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

fn parse_override<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        PipelineError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}
