use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use atoll::core::selection::parse_intervals;
use atoll::engine::config::{self as core_config, ALIGNMENT_DOMAIN, ANALYSIS_DOMAIN};
use atoll::engine::domain::{DomainDefinition, NumberingMode};
use atoll::engine::scoring::{ScoringScheme, SubstitutionMatrix};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAlignmentConfig {
    matrix: Option<SubstitutionMatrix>,
    gap_open: Option<i32>,
    gap_extend: Option<i32>,
    min_identity: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialDomainsConfig {
    prefix: Option<String>,
    numbering: Option<NumberingMode>,
}

/// Settings read from the optional TOML configuration file.
///
/// Every key is optional. Precedence is `-S key=value`, then command-line flags, then
/// the file, then built-in defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    alignment: Option<PartialAlignmentConfig>,
    domains: Option<PartialDomainsConfig>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(self, args: &RunArgs) -> Result<core_config::RunConfig> {
        let mut overrides = PartialRunConfig::default();
        overrides.apply_set_values(&args.set_values)?;

        let file_alignment = self.alignment.unwrap_or_default();
        let file_domains = self.domains.unwrap_or_default();
        let set_alignment = overrides.alignment.unwrap_or_default();
        let set_domains = overrides.domains.unwrap_or_default();

        let matrix = set_alignment
            .matrix
            .or(args.matrix)
            .or(file_alignment.matrix)
            .unwrap_or_default();
        let (default_open, default_extend) = matrix.default_gap_penalties();
        let gap_open = set_alignment
            .gap_open
            .or(args.gap_open)
            .or(file_alignment.gap_open)
            .unwrap_or(default_open);
        let gap_extend = set_alignment
            .gap_extend
            .or(args.gap_extend)
            .or(file_alignment.gap_extend)
            .unwrap_or(default_extend);
        let scoring = ScoringScheme::new(matrix, gap_open, gap_extend)
            .map_err(|e| CliError::Config(e.to_string()))?;

        let numbering = set_domains
            .numbering
            .or(args.resnum)
            .or(file_domains.numbering)
            .unwrap_or_default();

        let mut builder = core_config::RunConfigBuilder::new()
            .scoring(scoring)
            .numbering(numbering);

        if let Some(min_identity) = set_alignment
            .min_identity
            .or(args.min_identity)
            .or(file_alignment.min_identity)
        {
            builder = builder.min_identity(min_identity);
        }
        if let Some(prefix) = set_domains
            .prefix
            .as_deref()
            .or(args.prefix.as_deref())
            .or(file_domains.prefix.as_deref())
        {
            builder = builder.prefix(prefix);
        }

        if let Some(expression) = &args.resalign {
            builder = builder.domain(Self::parse_domain(ALIGNMENT_DOMAIN, expression)?);
        }
        builder = builder.domain(Self::parse_domain(ANALYSIS_DOMAIN, &args.reshelix)?);

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn parse_domain(name: &str, expression: &str) -> Result<DomainDefinition> {
        let intervals = parse_intervals(expression).map_err(|e| {
            CliError::Argument(format!("Invalid '{}' selection '{}': {}", name, expression, e))
        })?;
        Ok(DomainDefinition::new(name, intervals))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "alignment.matrix" => {
                    self.alignment.get_or_insert_with(Default::default).matrix =
                        Some(parse_value(key, value_str)?);
                }
                "alignment.gap-open" => {
                    self.alignment.get_or_insert_with(Default::default).gap_open =
                        Some(parse_value(key, value_str)?);
                }
                "alignment.gap-extend" => {
                    self.alignment
                        .get_or_insert_with(Default::default)
                        .gap_extend = Some(parse_value(key, value_str)?);
                }
                "alignment.min-identity" => {
                    self.alignment
                        .get_or_insert_with(Default::default)
                        .min_identity = Some(parse_value(key, value_str)?);
                }
                "domains.prefix" => {
                    self.domains.get_or_insert_with(Default::default).prefix =
                        Some(value_str.to_string());
                }
                "domains.numbering" => {
                    self.domains.get_or_insert_with(Default::default).numbering =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
