//! # ipharvest - Fronting IP Candidate Aggregator
//!
//! Collects candidate IPv4/IPv6 fronting addresses from several
//! heterogeneous sources, normalizes them into one entry type, removes
//! duplicates across sources, classifies them by carrier, and writes
//! stable, numbered category files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ipharvest                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, resolve, parse, check, init        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Sources: list, mixed, subscription, subscription_page│
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── Retries with fixed delay, empty text on failure      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parsers                                                    │
//! │    ├── List / inline-remark lists                           │
//! │    ├── Mixed-remark lists (CT/CU/CM classification)         │
//! │    ├── Landing page resolver (regex)                        │
//! │    └── Subscription blobs (base64 + vless URIs)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator                                                 │
//! │    └── First-wins dedup, per-category numbering             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Output (tempfile)                                          │
//! │    └── Combined + per-category files, written atomically    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use ipharvest::aggregator::{aggregate, Numbering};
//! use ipharvest::model::Category;
//! use ipharvest::parser::{parse_list, parse_mixed};
//!
//! let telecom = parse_list(["1.2.3.4#note"], Category::Telecom);
//! let mixed = parse_mixed(["1.2.3.4#CM", "5.6.7.8#CU-HK"]);
//!
//! let out = aggregate([telecom, mixed], Numbering::default());
//! assert_eq!(out.combined, vec!["1.2.3.4#电信1", "5.6.7.8#联通1"]);
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Deduplication, classification and numbering
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Per-line parse errors
//! - [`fetcher`] - HTTP client for downloading sources
//! - [`lock`] - Output directory locking
//! - [`model`] - Categories and entries
//! - [`output`] - Atomic file output
//! - [`parser`] - List and mixed-remark parsers
//! - [`pipeline`] - Source ordering and end-to-end runs
//! - [`resolver`] - Subscription link discovery
//! - [`stats`] - Run summary
//! - [`subscription`] - Subscription blob parsing
//! - [`utils`] - Formatting helpers
//! - [`validation`] - Address validation

pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod lock;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod stats;
pub mod subscription;
pub mod utils;
pub mod validation;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use model::{Category, Entry};
