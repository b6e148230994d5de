use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};

/// Which versions a run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// Release versions for the release commit
    #[default]
    Release,
    /// Release versions into the tagged copy, properties get their release value
    Tag,
    /// Next development versions after the release
    Next,
}

impl RewriteMode {
    /// Suffix of the side file written when simulating
    pub fn suffix(&self) -> &'static str {
        match self {
            RewriteMode::Release => "release",
            RewriteMode::Tag => "tag",
            RewriteMode::Next => "next",
        }
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for RewriteMode {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "release" => Ok(RewriteMode::Release),
            "tag" => Ok(RewriteMode::Tag),
            "next" | "development" => Ok(RewriteMode::Next),
            other => Err(ReleaseError::config(format!(
                "Unknown rewrite mode '{}', expected release, tag or next",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes() {
        assert_eq!(RewriteMode::Release.suffix(), "release");
        assert_eq!(RewriteMode::Tag.suffix(), "tag");
        assert_eq!(RewriteMode::Next.suffix(), "next");
        assert_eq!(RewriteMode::default(), RewriteMode::Release);
    }

    #[test]
    fn test_parse() {
        assert_eq!("TAG".parse::<RewriteMode>().unwrap(), RewriteMode::Tag);
        assert_eq!("next".parse::<RewriteMode>().unwrap(), RewriteMode::Next);
        assert!("publish".parse::<RewriteMode>().is_err());
    }
}
