use super::domain::{DomainDefinition, NumberingMode};
use super::scoring::ScoringScheme;
use thiserror::Error;

pub const ALIGNMENT_DOMAIN: &str = "alignment";
pub const ANALYSIS_DOMAIN: &str = "phelix";
pub const DEFAULT_PREFIX: &str = "TM";
pub const DEFAULT_MIN_IDENTITY: f64 = 0.3;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Required domain '{0}' is not declared")]
    MissingDomain(String),
    #[error("Domain '{0}' declares no intervals")]
    EmptyDomain(String),
    #[error("Domain '{0}' is declared more than once")]
    DuplicateDomain(String),
    #[error("Minimum identity must lie within [0, 1], got {0}")]
    InvalidIdentity(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub scoring: ScoringScheme,
    pub numbering: NumberingMode,
    pub prefix: String,
    pub min_identity: f64,
    pub domains: Vec<DomainDefinition>, // Declaration order
    pub analysis_domain: String,
}

impl RunConfig {
    pub fn domain(&self, name: &str) -> Option<&DomainDefinition> {
        self.domains.iter().find(|d| d.name == name)
    }
}

#[derive(Default)]
pub struct RunConfigBuilder {
    scoring: Option<ScoringScheme>,
    numbering: Option<NumberingMode>,
    prefix: Option<String>,
    min_identity: Option<f64>,
    domains: Vec<DomainDefinition>,
    analysis_domain: Option<String>,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scoring(mut self, scoring: ScoringScheme) -> Self {
        self.scoring = Some(scoring);
        self
    }
    pub fn numbering(mut self, numbering: NumberingMode) -> Self {
        self.numbering = Some(numbering);
        self
    }
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }
    pub fn min_identity(mut self, min_identity: f64) -> Self {
        self.min_identity = Some(min_identity);
        self
    }
    pub fn domain(mut self, domain: DomainDefinition) -> Self {
        self.domains.push(domain);
        self
    }
    pub fn analysis_domain(mut self, name: &str) -> Self {
        self.analysis_domain = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let analysis_domain = self
            .analysis_domain
            .unwrap_or_else(|| ANALYSIS_DOMAIN.to_string());

        for (i, domain) in self.domains.iter().enumerate() {
            if domain.intervals.is_empty() {
                return Err(ConfigError::EmptyDomain(domain.name.clone()));
            }
            if self.domains[..i].iter().any(|d| d.name == domain.name) {
                return Err(ConfigError::DuplicateDomain(domain.name.clone()));
            }
        }
        if !self.domains.iter().any(|d| d.name == analysis_domain) {
            return Err(ConfigError::MissingDomain(analysis_domain));
        }

        let min_identity = self.min_identity.unwrap_or(DEFAULT_MIN_IDENTITY);
        if !(0.0..=1.0).contains(&min_identity) {
            return Err(ConfigError::InvalidIdentity(min_identity));
        }

        Ok(RunConfig {
            scoring: self
                .scoring
                .ok_or(ConfigError::MissingParameter("scoring"))?,
            numbering: self
                .numbering
                .ok_or(ConfigError::MissingParameter("numbering"))?,
            prefix: self.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            min_identity,
            domains: self.domains,
            analysis_domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection::ResidueInterval;

    fn helix_domain() -> DomainDefinition {
        DomainDefinition::new(ANALYSIS_DOMAIN, vec![ResidueInterval::single(5)])
    }

    fn complete() -> RunConfigBuilder {
        RunConfigBuilder::new()
            .scoring(ScoringScheme::default())
            .numbering(NumberingMode::Position)
    }

    #[test]
    fn builds_with_defaults() {
        let config = complete().domain(helix_domain()).build().unwrap();
        assert_eq!(config.prefix, DEFAULT_PREFIX);
        assert_eq!(config.min_identity, DEFAULT_MIN_IDENTITY);
        assert_eq!(config.analysis_domain, ANALYSIS_DOMAIN);
        assert!(config.domain(ANALYSIS_DOMAIN).is_some());
    }

    #[test]
    fn keeps_domain_declaration_order() {
        let config = complete()
            .domain(DomainDefinition::new(
                ALIGNMENT_DOMAIN,
                vec![ResidueInterval::single(1)],
            ))
            .domain(helix_domain())
            .build()
            .unwrap();
        let names: Vec<_> = config.domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![ALIGNMENT_DOMAIN, ANALYSIS_DOMAIN]);
    }

    #[test]
    fn missing_analysis_domain_is_rejected() {
        let err = complete()
            .domain(DomainDefinition::new(
                ALIGNMENT_DOMAIN,
                vec![ResidueInterval::single(1)],
            ))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingDomain(ANALYSIS_DOMAIN.into()));
    }

    #[test]
    fn empty_and_duplicate_domains_are_rejected() {
        let empty = complete()
            .domain(DomainDefinition::new(ANALYSIS_DOMAIN, vec![]))
            .build();
        assert_eq!(empty, Err(ConfigError::EmptyDomain(ANALYSIS_DOMAIN.into())));

        let duplicate = complete().domain(helix_domain()).domain(helix_domain()).build();
        assert_eq!(
            duplicate,
            Err(ConfigError::DuplicateDomain(ANALYSIS_DOMAIN.into()))
        );
    }

    #[test]
    fn missing_parameters_are_named() {
        let err = RunConfigBuilder::new()
            .numbering(NumberingMode::Resid)
            .domain(helix_domain())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("scoring"));
    }

    #[test]
    fn identity_threshold_must_be_a_fraction() {
        let err = complete()
            .domain(helix_domain())
            .min_identity(1.5)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidIdentity(1.5));
    }
}
