//! Core data model: carrier categories and parsed entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification bucket for an address.
///
/// Declaration order is the order buckets are concatenated into the
/// combined output, so `Ord` doubles as output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// China Telecom (CT)
    Telecom,
    /// China Unicom (CU)
    Unicom,
    /// China Mobile (CM)
    Mobile,
    Other,
    MultiLine,
    #[serde(rename = "ipv6")]
    Ipv6Dedicated,
    /// Addresses taken from proxy subscription descriptors
    #[serde(rename = "proxy")]
    ProxyReverse,
}

impl Category {
    /// Every category, in combined-output order.
    pub const ALL: [Category; 7] = [
        Category::Telecom,
        Category::Unicom,
        Category::Mobile,
        Category::Other,
        Category::MultiLine,
        Category::Ipv6Dedicated,
        Category::ProxyReverse,
    ];

    /// Fixed tag written into labels, before the counter.
    pub fn display_tag(self) -> &'static str {
        match self {
            Category::Telecom => "电信",
            Category::Unicom => "联通",
            Category::Mobile => "移动",
            Category::Other => "其他",
            Category::MultiLine => "多线",
            Category::Ipv6Dedicated => "IPV6-",
            Category::ProxyReverse => PROXY_LABEL_SUFFIX,
        }
    }

    /// Whether labels in this category carry a running counter.
    pub fn is_numbered(self) -> bool {
        !matches!(self, Category::ProxyReverse)
    }

    /// Stable identifier used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Telecom => "telecom",
            Category::Unicom => "unicom",
            Category::Mobile => "mobile",
            Category::Other => "other",
            Category::MultiLine => "multi_line",
            Category::Ipv6Dedicated => "ipv6",
            Category::ProxyReverse => "proxy",
        }
    }
}

/// Suffix appended to reverse-proxy labels after the country code.
pub const PROXY_LABEL_SUFFIX: &str = "（反代IP）";

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "telecom" | "ct" => Ok(Category::Telecom),
            "unicom" | "cu" => Ok(Category::Unicom),
            "mobile" | "cm" => Ok(Category::Mobile),
            "other" => Ok(Category::Other),
            "multi_line" | "multiline" => Ok(Category::MultiLine),
            "ipv6" => Ok(Category::Ipv6Dedicated),
            "proxy" => Ok(Category::ProxyReverse),
            _ => Err(format!(
                "Invalid category '{}'. Valid values: telecom, unicom, mobile, other, multi_line, ipv6, proxy",
                s
            )),
        }
    }
}

/// A single accepted candidate address, produced by a parser.
///
/// `address` is kept exactly as the source spelled it; two entries are
/// duplicates only when their address strings are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub address: String,
    pub category: Category,
    pub remark: Option<String>,
}

impl Entry {
    pub fn new(address: impl Into<String>, category: Category) -> Self {
        Self {
            address: address.into(),
            category,
            remark: None,
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }
}
