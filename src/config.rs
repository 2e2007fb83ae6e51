use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("unknown LD profile '{profile}'")]
    UnknownLdProfile { profile: String },

    #[error("knowledge database has no '{name}' setting")]
    MissingSetting { name: String },

    #[error("zone size must be positive, got {0}")]
    InvalidZoneSize(i64),
}

/// How to narrow ambiguous group membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityReduction {
    #[default]
    No,
    Implication,
    Quality,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ambiguity reduction '{0}' (expected no, implication, quality or any)")]
pub struct UnknownAmbiguityReduction(pub String);

impl FromStr for AmbiguityReduction {
    type Err = UnknownAmbiguityReduction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "no" => Ok(AmbiguityReduction::No),
            "implication" => Ok(AmbiguityReduction::Implication),
            "quality" => Ok(AmbiguityReduction::Quality),
            "any" | "yes" => Ok(AmbiguityReduction::Any),
            _ => Err(UnknownAmbiguityReduction(s.to_string())),
        }
    }
}

impl fmt::Display for AmbiguityReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AmbiguityReduction::No => "no",
            AmbiguityReduction::Implication => "implication",
            AmbiguityReduction::Quality => "quality",
            AmbiguityReduction::Any => "any",
        };
        f.write_str(name)
    }
}

/// Options that shape compiled queries; every field ends up as a template
/// parameter or a compiler switch.
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Coordinate base of reported positions (0 or 1)
    #[validate(range(min = 0, max = 1, message = "Coordinate base must be 0 or 1"))]
    pub coordinate_base: u8,

    /// Whether reported regions exclude their end position
    pub regions_half_open: bool,

    /// Bases a locus may fall outside a region and still match it
    #[validate(range(min = 0, message = "Region position margin cannot be negative"))]
    pub region_position_margin: i64,

    /// Minimum shared fraction, in percent, for two regions to match
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "Region match percent must be between 0 and 100"
    ))]
    pub region_match_percent: Option<f64>,

    /// Minimum shared bases for two regions to match
    #[validate(range(min = 0, message = "Region match bases cannot be negative"))]
    pub region_match_bases: Option<i64>,

    pub allow_unvalidated_snp_positions: bool,

    pub allow_ambiguous_knowledge: bool,

    pub reduce_ambiguous_knowledge: AmbiguityReduction,

    /// Filter alternate model candidates against the alternate input only
    pub alternate_model_filtering: bool,

    /// Name of the LD profile used for gene regions
    pub ld_profile: String,

    /// Log the store's query plan instead of running queries
    pub debug_query: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            coordinate_base: 1,
            regions_half_open: false,
            region_position_margin: 0,
            region_match_percent: Some(100.0),
            region_match_bases: Some(0),
            allow_unvalidated_snp_positions: true,
            allow_ambiguous_knowledge: false,
            reduce_ambiguous_knowledge: AmbiguityReduction::No,
            alternate_model_filtering: false,
            ld_profile: String::new(),
            debug_query: false,
        }
    }
}

impl QueryConfig {
    /// Create configuration from `ANNOGRAPH_*` environment variables with
    /// validation. A `.env` file in the working directory is honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            coordinate_base: parse_env_var("ANNOGRAPH_COORDINATE_BASE", "1")?,
            regions_half_open: parse_env_var("ANNOGRAPH_REGIONS_HALF_OPEN", "false")?,
            region_position_margin: parse_env_var("ANNOGRAPH_REGION_POSITION_MARGIN", "0")?,
            region_match_percent: parse_optional_env_var("ANNOGRAPH_REGION_MATCH_PERCENT", "100")?,
            region_match_bases: parse_optional_env_var("ANNOGRAPH_REGION_MATCH_BASES", "0")?,
            allow_unvalidated_snp_positions: parse_env_var(
                "ANNOGRAPH_ALLOW_UNVALIDATED_SNP_POSITIONS",
                "true",
            )?,
            allow_ambiguous_knowledge: parse_env_var("ANNOGRAPH_ALLOW_AMBIGUOUS_KNOWLEDGE", "false")?,
            reduce_ambiguous_knowledge: parse_env_var("ANNOGRAPH_REDUCE_AMBIGUOUS_KNOWLEDGE", "no")?,
            alternate_model_filtering: parse_env_var("ANNOGRAPH_ALTERNATE_MODEL_FILTERING", "false")?,
            ld_profile: env::var("ANNOGRAPH_LD_PROFILE").unwrap_or_default(),
            debug_query: parse_env_var("ANNOGRAPH_DEBUG_QUERY", "false")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file; missing keys keep their defaults
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides.
    pub fn merge(&mut self, cli: CliConfig) -> Result<(), ConfigError> {
        if let Some(ld_profile) = cli.ld_profile {
            self.ld_profile = ld_profile;
        }
        if let Some(base) = cli.coordinate_base {
            self.coordinate_base = base;
        }
        if let Some(reduction) = cli.reduce_ambiguous_knowledge {
            self.reduce_ambiguous_knowledge = reduction;
        }
        self.allow_ambiguous_knowledge |= cli.allow_ambiguous_knowledge;
        self.alternate_model_filtering |= cli.alternate_model_filtering;
        self.debug_query |= cli.debug_query;

        self.validate()?;
        Ok(())
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub ld_profile: Option<String>,
    pub coordinate_base: Option<u8>,
    pub reduce_ambiguous_knowledge: Option<AmbiguityReduction>,
    pub allow_ambiguous_knowledge: bool,
    pub alternate_model_filtering: bool,
    pub debug_query: bool,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

/// Like [`parse_env_var`]; an empty value or `none` unsets the option.
fn parse_optional_env_var<T: FromStr>(key: &str, default: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.coordinate_base, 1);
        assert_eq!(config.region_match_percent, Some(100.0));
        assert!(config.allow_unvalidated_snp_positions);
    }

    #[test]
    fn test_invalid_coordinate_base() {
        let config = QueryConfig {
            coordinate_base: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_match_percent() {
        let config = QueryConfig {
            region_match_percent: Some(120.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = QueryConfig {
            region_match_percent: None,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ambiguity_reduction_parsing() {
        assert_eq!("Quality".parse(), Ok(AmbiguityReduction::Quality));
        assert_eq!("yes".parse(), Ok(AmbiguityReduction::Any));
        assert!("sometimes".parse::<AmbiguityReduction>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("ANNOGRAPH_COORDINATE_BASE", "0");
        env::set_var("ANNOGRAPH_REGION_MATCH_PERCENT", "none");
        env::set_var("ANNOGRAPH_REDUCE_AMBIGUOUS_KNOWLEDGE", "implication");
        env::set_var("ANNOGRAPH_LD_PROFILE", "dprime-rs");

        let config = QueryConfig::from_env();

        env::remove_var("ANNOGRAPH_COORDINATE_BASE");
        env::remove_var("ANNOGRAPH_REGION_MATCH_PERCENT");
        env::remove_var("ANNOGRAPH_REDUCE_AMBIGUOUS_KNOWLEDGE");
        env::remove_var("ANNOGRAPH_LD_PROFILE");

        let config = config.unwrap();
        assert_eq!(config.coordinate_base, 0);
        assert_eq!(config.region_match_percent, None);
        assert_eq!(config.reduce_ambiguous_knowledge, AmbiguityReduction::Implication);
        assert_eq!(config.ld_profile, "dprime-rs");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        env::set_var("ANNOGRAPH_REGION_POSITION_MARGIN", "wide");
        let result = QueryConfig::from_env();
        env::remove_var("ANNOGRAPH_REGION_POSITION_MARGIN");

        assert!(matches!(result, Err(ConfigError::Parse { field, .. }) if field == "ANNOGRAPH_REGION_POSITION_MARGIN"));
    }

    #[test]
    fn test_from_yaml_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "regions_half_open: true\nreduce_ambiguous_knowledge: any").unwrap();

        let config = QueryConfig::from_yaml_file(file.path()).unwrap();
        assert!(config.regions_half_open);
        assert_eq!(config.reduce_ambiguous_knowledge, AmbiguityReduction::Any);
        assert_eq!(config.coordinate_base, 1);
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = QueryConfig::default();
        config
            .merge(CliConfig {
                ld_profile: Some("rsq".to_string()),
                debug_query: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.ld_profile, "rsq");
        assert!(config.debug_query);

        let bad = CliConfig {
            coordinate_base: Some(5),
            ..Default::default()
        };
        assert!(config.merge(bad).is_err());
    }
}
