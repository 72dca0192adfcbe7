//! Configuration management for ipharvest.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::aggregator::{Numbering, DEFAULT_COUNTER_START};
use crate::model::Category;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the output files are written to
    pub output_dir: String,

    /// First counter value in each numbered category (100 reproduces the
    /// mixed-remark source's own numbering)
    pub counter_start: u32,

    /// Per-category first counter values, overriding `counter_start`
    pub counter_starts: BTreeMap<Category, u32>,

    /// HTTP fetch behaviour
    pub fetch: FetchConfig,

    /// Sources, in any order; they are processed in priority order
    pub sources: Vec<SourceConfig>,

    /// Output file names
    pub outputs: OutputsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            counter_start: DEFAULT_COUNTER_START,
            counter_starts: BTreeMap::new(),
            fetch: FetchConfig::default(),
            sources: default_sources(),
            outputs: OutputsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path.as_ref());
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.max_retries == 0 {
            anyhow::bail!("fetch.max_retries must be at least 1");
        }

        if self.fetch.max_concurrent == 0 {
            anyhow::bail!("fetch.max_concurrent must be at least 1");
        }

        for category in self.counter_starts.keys() {
            if !category.is_numbered() {
                anyhow::bail!(
                    "Category '{}' is not numbered and takes no counter start",
                    category
                );
            }
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                anyhow::bail!("Duplicate source name '{}'", source.name);
            }
            if source.enabled && !source.url.starts_with("https://") {
                anyhow::bail!(
                    "Source '{}' URL must use HTTPS: {}",
                    source.name,
                    source.url
                );
            }
        }

        for (key, name) in self.outputs.named() {
            if let Some(name) = name {
                if name.trim().is_empty() {
                    anyhow::bail!("Output file name for '{}' is empty", key);
                }
                if name.contains('/') || name.contains('\\') || name == ".." {
                    anyhow::bail!(
                        "Output file name for '{}' must be a plain file name: {}",
                        key,
                        name
                    );
                }
            }
        }

        Ok(())
    }

    /// Save configuration to YAML file atomically
    ///
    /// Uses tempfile + rename so a crash never leaves a half-written config.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        crate::output::write_atomic(path.as_ref(), content.as_bytes())
    }

    /// Enabled sources in config order
    pub fn enabled_sources(&self) -> Vec<&SourceConfig> {
        self.sources.iter().filter(|s| s.enabled).collect()
    }

    pub fn numbering(&self) -> Numbering {
        self.counter_starts.iter().fold(
            Numbering::starting_at(self.counter_start),
            |numbering, (category, start)| numbering.with_category_start(*category, *start),
        )
    }

    /// Default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Attempts per URL, including the first one
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay_ms: u64,
    /// Sources fetched in parallel
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 3,
            retry_delay_ms: 2000,
            max_concurrent: 4,
        }
    }
}

/// One remote source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub kind: SourceKind,
}

fn default_true() -> bool {
    true
}

/// Source format, which decides the parser used on the fetched text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// One address per line, optional `#remark`; every line gets `category`
    List { category: Category },
    /// `address#CT|CU|CM...` lines classified by remark
    Mixed,
    /// Base64 subscription blob fetched directly from `url`
    Subscription,
    /// HTML landing page whose subscription link must be discovered first
    SubscriptionPage,
}

impl SourceKind {
    /// Position in the fixed processing order; lower runs first.
    pub fn rank(self) -> u8 {
        match self {
            SourceKind::List {
                category: Category::Telecom,
            } => 0,
            SourceKind::List {
                category: Category::Unicom,
            } => 1,
            SourceKind::List {
                category: Category::Mobile,
            } => 2,
            SourceKind::List {
                category: Category::Other,
            } => 3,
            SourceKind::Mixed => 4,
            SourceKind::List { .. } => 5,
            SourceKind::Subscription | SourceKind::SubscriptionPage => 6,
        }
    }
}

/// Output file names; `None` disables that file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    pub combined: Option<String>,
    pub telecom: Option<String>,
    pub unicom: Option<String>,
    pub mobile: Option<String>,
    pub other: Option<String>,
    pub multi_line: Option<String>,
    pub ipv6: Option<String>,
    pub proxy: Option<String>,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            combined: Some("cmip.txt".to_string()),
            telecom: Some("ct.txt".to_string()),
            unicom: Some("cu.txt".to_string()),
            mobile: Some("cm.txt".to_string()),
            other: None,
            multi_line: Some("multiline.txt".to_string()),
            ipv6: Some("ipv6.txt".to_string()),
            proxy: Some("proxy.txt".to_string()),
        }
    }
}

impl OutputsConfig {
    /// File name for a category bucket
    pub fn for_category(&self, category: Category) -> Option<&str> {
        let name = match category {
            Category::Telecom => &self.telecom,
            Category::Unicom => &self.unicom,
            Category::Mobile => &self.mobile,
            Category::Other => &self.other,
            Category::MultiLine => &self.multi_line,
            Category::Ipv6Dedicated => &self.ipv6,
            Category::ProxyReverse => &self.proxy,
        };
        name.as_deref()
    }

    fn named(&self) -> Vec<(&'static str, Option<&str>)> {
        let mut named = vec![("combined", self.combined.as_deref())];
        named.extend(
            Category::ALL
                .iter()
                .map(|c| (c.as_str(), self.for_category(*c))),
        );
        named
    }
}

fn list_source(name: &str, url: &str, category: Category) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        url: url.to_string(),
        enabled: true,
        kind: SourceKind::List { category },
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        list_source("ct", "https://cf.090227.xyz/ct?ips=6", Category::Telecom),
        list_source("cu", "https://cf.090227.xyz/cu", Category::Unicom),
        list_source("cm", "https://cf.090227.xyz/cmcc?ips=8", Category::Mobile),
        list_source(
            "other",
            "https://cf.090227.xyz/ip.164746.xyz",
            Category::Other,
        ),
        SourceConfig {
            name: "cloudflare_yes".to_string(),
            url: "https://cf.090227.xyz/CloudFlareYes".to_string(),
            enabled: true,
            kind: SourceKind::Mixed,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, ".");
        assert_eq!(config.counter_start, 1);
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.sources.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.sources, config.sources);
        assert_eq!(parsed.outputs.combined, config.outputs.combined);
    }

    #[test]
    fn test_source_kinds_from_yaml() {
        let yaml = r#"
sources:
  - name: ct
    url: https://example.com/ct
    kind: list
    category: telecom
  - name: v6
    url: https://example.com/v6
    kind: list
    category: ipv6
  - name: mixed
    url: https://example.com/mixed
    kind: mixed
  - name: landing
    url: https://example.com/
    kind: subscription_page
    enabled: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sources.len(), 4);
        assert_eq!(
            config.sources[0].kind,
            SourceKind::List {
                category: Category::Telecom
            }
        );
        assert_eq!(
            config.sources[1].kind,
            SourceKind::List {
                category: Category::Ipv6Dedicated
            }
        );
        assert_eq!(config.sources[2].kind, SourceKind::Mixed);
        assert!(config.sources[2].enabled);
        assert_eq!(config.sources[3].kind, SourceKind::SubscriptionPage);
        assert_eq!(config.enabled_sources().len(), 3);
        // unspecified sections keep their defaults
        assert_eq!(config.fetch.retry_delay_ms, 2000);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = r#"
sources:
  - name: x
    url: https://example.com/
    kind: carrier_pigeon
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_rank_order() {
        let ranks: Vec<u8> = [
            SourceKind::List {
                category: Category::Telecom,
            },
            SourceKind::List {
                category: Category::Unicom,
            },
            SourceKind::List {
                category: Category::Mobile,
            },
            SourceKind::List {
                category: Category::Other,
            },
            SourceKind::Mixed,
            SourceKind::List {
                category: Category::MultiLine,
            },
            SourceKind::SubscriptionPage,
        ]
        .iter()
        .map(|k| k.rank())
        .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(SourceKind::Subscription.rank(), 6);
    }

    #[test]
    fn test_validation_http_url_rejected() {
        let mut config = Config::default();
        config.sources[0].url = "http://example.com/list".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTPS"));
    }

    #[test]
    fn test_validation_disabled_http_allowed() {
        let mut config = Config::default();
        config.sources[0].url = "http://example.com/list".to_string();
        config.sources[0].enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_duplicate_names() {
        let mut config = Config::default();
        config.sources[1].name = "ct".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_validation_zero_retries() {
        let mut config = Config::default();
        config.fetch.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_output_names() {
        let mut config = Config::default();
        config.outputs.proxy = Some("../proxy.txt".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.outputs.combined = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_outputs_for_category() {
        let outputs = OutputsConfig::default();
        assert_eq!(outputs.for_category(Category::Telecom), Some("ct.txt"));
        assert_eq!(outputs.for_category(Category::Other), None);
        assert_eq!(outputs.for_category(Category::ProxyReverse), Some("proxy.txt"));
    }

    #[test]
    fn test_numbering_from_config() {
        let config = Config {
            counter_start: 100,
            ..Default::default()
        };
        assert_eq!(config.numbering(), Numbering::MIXED_REMARK_COMPAT);
    }

    #[test]
    fn test_per_category_counter_starts() {
        let yaml = r#"
counter_starts:
  unicom: 100
  mobile: 100
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        let numbering = config.numbering();
        assert_eq!(numbering.start_for(Category::Telecom), 1);
        assert_eq!(numbering.start_for(Category::Unicom), 100);
        assert_eq!(numbering.start_for(Category::Mobile), 100);
    }

    #[test]
    fn test_counter_start_for_proxy_rejected() {
        let config: Config = serde_yaml::from_str("counter_starts:\n  proxy: 5\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not numbered"));
    }

    #[test]
    fn test_template_parses_and_validates() {
        let config: Config = serde_yaml::from_str(&Config::generate_default_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.len(), Config::default().sources.len() + 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipharvest.yaml");
        let config = Config {
            counter_start: 7,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.counter_start, 7);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.sources.len(), 5);
    }
}
