//! Legacy scrape-job surface of the `tracing` interface.
//!
//! Older providers advertised Prometheus-style scrape jobs instead of
//! ingesters. The shapes are kept here for charms that still exchange them;
//! the endpoint notification path does not use this module.
//!
//! Only a subset of `<scrape_config>` is supported: `job_name`,
//! `static_configs`, `scrape_interval` and `scrape_timeout`. Anything else a
//! provider sends is dropped.
//!
//! A target of the form `*:<port>` is a wildcard: it stands for "every unit
//! of the providing application, on `<port>`" and is expanded against the
//! unit addresses found in unit databags.
//!
//! `job_name` should be a fixed literal. Deriving it from something like the
//! unit name breaks series continuity when leadership moves.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::keys;
use crate::error::ScrapeJobError;
use crate::traits::Databag;

pub const ALLOWED_KEYS: [&str; 4] = [
    "job_name",
    "static_configs",
    "scrape_interval",
    "scrape_timeout",
];

/// Label attached to targets expanded from a wildcard.
pub const UNIT_LABEL: &str = "juju_unit";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticConfig {
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default)]
    pub static_configs: Vec<StaticConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_timeout: Option<String>,
}

/// A unit of the providing application, as advertised in its unit databag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTarget {
    pub unit_name: String,
    pub address: String,
}

impl UnitTarget {
    /// Read `tempo_scrape_unit_name` / `tempo_scrape_unit_address`; `None`
    /// unless both are present.
    pub fn from_databag(databag: &Databag) -> Option<Self> {
        Some(Self {
            unit_name: databag.get(keys::UNIT_NAME)?.clone(),
            address: databag.get(keys::UNIT_ADDRESS)?.clone(),
        })
    }

    pub fn to_databag(&self) -> Databag {
        Databag::from([
            (keys::UNIT_NAME.to_string(), self.unit_name.clone()),
            (keys::UNIT_ADDRESS.to_string(), self.address.clone()),
        ])
    }
}

impl ScrapeJob {
    /// Scrape every unit on port 80.
    pub fn default_job() -> Self {
        Self {
            static_configs: vec![StaticConfig {
                targets: vec!["*:80".to_string()],
                labels: BTreeMap::new(),
            }],
            ..Default::default()
        }
    }

    /// Build a job from a raw JSON object, dropping unsupported keys.
    pub fn sanitize(raw: &Value) -> Result<Self, ScrapeJobError> {
        let Value::Object(fields) = raw else {
            return Err(ScrapeJobError::InvalidJob(format!("expected an object, got {raw}")));
        };
        let kept: serde_json::Map<String, Value> = fields
            .iter()
            .filter(|(key, _)| ALLOWED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(serde_json::from_value(Value::Object(kept))?)
    }

    /// Replace wildcard targets with one static config per unit.
    ///
    /// Each expanded config carries the original labels plus
    /// [`UNIT_LABEL`]. Fully qualified targets stay in a config of their own
    /// without the unit label.
    pub fn expand_wildcards(&self, units: &[UnitTarget]) -> ScrapeJob {
        let mut static_configs = Vec::new();
        for config in &self.static_configs {
            let mut wildcard_ports = Vec::new();
            let mut fixed = Vec::new();
            for target in &config.targets {
                match target.strip_prefix("*:") {
                    Some(port) => wildcard_ports.push(port),
                    None => fixed.push(target.clone()),
                }
            }

            if !fixed.is_empty() {
                static_configs.push(StaticConfig {
                    targets: fixed,
                    labels: config.labels.clone(),
                });
            }
            if wildcard_ports.is_empty() {
                continue;
            }
            for unit in units {
                let mut labels = config.labels.clone();
                labels.insert(UNIT_LABEL.to_string(), unit.unit_name.clone());
                static_configs.push(StaticConfig {
                    targets: wildcard_ports
                        .iter()
                        .map(|port| format!("{}:{}", unit.address, port))
                        .collect(),
                    labels,
                });
            }
        }

        ScrapeJob {
            static_configs,
            ..self.clone()
        }
    }
}

/// Ensure no two jobs share a name. Two unnamed jobs count as a clash.
pub fn validate_jobs(jobs: &[ScrapeJob]) -> Result<(), ScrapeJobError> {
    if jobs.len() < 2 {
        return Ok(());
    }
    let mut seen = BTreeSet::new();
    for job in jobs {
        if !seen.insert(job.job_name.as_deref()) {
            return Err(ScrapeJobError::DuplicateJobName(job.job_name.clone()));
        }
    }
    Ok(())
}

/// Sanitize and validate a list of raw jobs. An empty list means the
/// default job.
pub fn sanitize_jobs(raw: &[Value]) -> Result<Vec<ScrapeJob>, ScrapeJobError> {
    if raw.is_empty() {
        return Ok(vec![ScrapeJob::default_job()]);
    }
    let jobs = raw
        .iter()
        .map(ScrapeJob::sanitize)
        .collect::<Result<Vec<_>, _>>()?;
    validate_jobs(&jobs)?;
    Ok(jobs)
}

/// Application databag entry carrying `jobs` under `scrape_jobs`.
pub fn encode_jobs(jobs: &[ScrapeJob]) -> Result<Databag, ScrapeJobError> {
    validate_jobs(jobs)?;
    Ok(Databag::from([(
        keys::SCRAPE_JOBS.to_string(),
        serde_json::to_string(jobs)?,
    )]))
}

/// Jobs published under `scrape_jobs`; the default job when the key is
/// absent.
pub fn decode_jobs(databag: &Databag) -> Result<Vec<ScrapeJob>, ScrapeJobError> {
    match databag.get(keys::SCRAPE_JOBS) {
        Some(encoded) => {
            let raw: Vec<Value> = serde_json::from_str(encoded)?;
            sanitize_jobs(&raw)
        }
        None => Ok(vec![ScrapeJob::default_job()]),
    }
}
