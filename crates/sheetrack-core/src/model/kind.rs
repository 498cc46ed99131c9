use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The four levels of the catalog hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Sheet,
    Topic,
    SubPattern,
    Problem,
}

impl EntityKind {
    pub const ALL: [Self; 4] = [Self::Sheet, Self::Topic, Self::SubPattern, Self::Problem];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sheet => "sheet",
            Self::Topic => "topic",
            Self::SubPattern => "sub-pattern",
            Self::Problem => "problem",
        }
    }

    /// Backing table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Sheet => "sheets",
            Self::Topic => "topics",
            Self::SubPattern => "sub_patterns",
            Self::Problem => "problems",
        }
    }

    /// Primary key column in [`Self::table`].
    #[must_use]
    pub const fn id_column(self) -> &'static str {
        match self {
            Self::Sheet => "sheet_id",
            Self::Topic => "topic_id",
            Self::SubPattern => "sub_pattern_id",
            Self::Problem => "problem_id",
        }
    }

    /// Column holding the immutable parent reference, `None` for the root.
    #[must_use]
    pub const fn parent_column(self) -> Option<&'static str> {
        match self.parent() {
            Some(parent) => Some(parent.id_column()),
            None => None,
        }
    }

    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Sheet => None,
            Self::Topic => Some(Self::Sheet),
            Self::SubPattern => Some(Self::Topic),
            Self::Problem => Some(Self::SubPattern),
        }
    }

    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Sheet => Some(Self::Topic),
            Self::Topic => Some(Self::SubPattern),
            Self::SubPattern => Some(Self::Problem),
            Self::Problem => None,
        }
    }

    /// Whether soft-delete is blocked while active children exist.
    ///
    /// Sheets are intentionally unguarded; deleting one is an operational decision.
    #[must_use]
    pub const fn is_delete_guarded(self) -> bool {
        matches!(self, Self::Topic | Self::SubPattern)
    }

    /// Whether entities of this kind carry a sibling `order`.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Self::Sheet)
    }

    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Sheet => "sh",
            Self::Topic => "tp",
            Self::SubPattern => "sp",
            Self::Problem => "pb",
        }
    }

    /// Infer the kind from a key's prefix (`sh-`, `tp-`, `sp-`, `pb-`).
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        let (prefix, rest) = id.split_once('-')?;
        if rest.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|kind| kind.id_prefix() == prefix)
    }

    /// Generate a fresh opaque key for this kind.
    #[must_use]
    pub fn new_id(self) -> String {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.id_prefix(), &raw[..10])
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheet" => Ok(Self::Sheet),
            "topic" => Ok(Self::Topic),
            "sub-pattern" | "subpattern" | "sub_pattern" | "pattern" => Ok(Self::SubPattern),
            "problem" => Ok(Self::Problem),
            other => Err(format!(
                "unknown entity kind '{other}': expected one of sheet, topic, sub-pattern, problem"
            )),
        }
    }
}

/// Judge platform a problem is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    LeetCode,
    #[serde(rename = "GFG")]
    Gfg,
    Other,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeetCode => "LeetCode",
            Self::Gfg => "GFG",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leetcode" | "lc" => Ok(Self::LeetCode),
            "gfg" | "geeksforgeeks" => Ok(Self::Gfg),
            "other" => Ok(Self::Other),
            other => Err(format!(
                "unknown platform '{other}': expected one of LeetCode, GFG, Other"
            )),
        }
    }
}
