//! Semantic version and constraint evaluation.
//!
//! Thin wrapper around the `semver` crate plus the release-stage model:
//! a stage is matched against the prerelease label of a plugin version,
//! with the stable stage represented by an empty label.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// Parse a semantic version string. Fails on empty or malformed input.
pub fn parse_version(s: &str) -> Result<Version, semver::Error> {
    Version::parse(s.trim())
}

/// Parse a version constraint expression.
///
/// Accepts the `semver` crate's comma-separated comparator syntax as well
/// as space-separated comparators (`">=1.0.0 <2.0.0"`) as written by many
/// plugin authors; the latter are normalized before parsing.
pub fn parse_constraint(s: &str) -> Result<VersionReq, semver::Error> {
    let s = s.trim();
    if s.contains(',') {
        return VersionReq::parse(s);
    }

    let comparators = comparator_tokens(s);
    if comparators.len() > 1 {
        VersionReq::parse(&comparators.join(", "))
    } else {
        VersionReq::parse(s)
    }
}

/// Split a space-separated constraint into comparators, re-attaching
/// operators that were written with a space before the version
/// (`">= 1.0.0 < 2.0.0"`).
fn comparator_tokens(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending_op: Option<String> = None;

    for word in s.split_whitespace() {
        let op_only = !word.is_empty()
            && word
                .chars()
                .all(|c| matches!(c, '<' | '>' | '=' | '^' | '~' | '!'));

        match pending_op.take() {
            Some(mut op) => {
                op.push_str(word);
                tokens.push(op);
            }
            None if op_only => pending_op = Some(word.to_string()),
            None => tokens.push(word.to_string()),
        }
    }
    if let Some(op) = pending_op {
        tokens.push(op);
    }
    tokens
}

/// True iff `version` satisfies `constraint`. Pure.
pub fn satisfies(version: &Version, constraint: &VersionReq) -> bool {
    constraint.matches(version)
}

/// Total order over versions: numeric (major, minor, patch), with a
/// prerelease sorting below the same numeric version without one.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

/// Release stage of a plugin version, derived from its prerelease label.
///
/// `Stable` is the empty label; every other stage matches a prerelease
/// label that starts with the stage token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStage {
    Dev,
    Alpha,
    Beta,
    Rc,
    Stable,
}

impl ReleaseStage {
    /// The prerelease token for this stage; empty for `Stable`.
    pub fn token(&self) -> &'static str {
        match self {
            ReleaseStage::Dev => "dev",
            ReleaseStage::Alpha => "alpha",
            ReleaseStage::Beta => "beta",
            ReleaseStage::Rc => "rc",
            ReleaseStage::Stable => "",
        }
    }

    /// Whether a version belongs to this stage.
    ///
    /// Prefix test, not substring: `Beta` matches `1.0.0-beta.3` but not
    /// `1.0.0-public.beta`. Pinned by `stage_prefix_not_substring`.
    pub fn matches(&self, version: &Version) -> bool {
        let pre = version.pre.as_str();
        match self {
            ReleaseStage::Stable => pre.is_empty(),
            _ => !pre.is_empty() && pre.starts_with(self.token()),
        }
    }
}

impl Display for ReleaseStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseStage::Stable => f.write_str("stable"),
            other => f.write_str(other.token()),
        }
    }
}

impl FromStr for ReleaseStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dev" => Ok(ReleaseStage::Dev),
            "alpha" => Ok(ReleaseStage::Alpha),
            "beta" => Ok(ReleaseStage::Beta),
            "rc" => Ok(ReleaseStage::Rc),
            "stable" | "" => Ok(ReleaseStage::Stable),
            other => Err(format!("unknown release stage: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_version_rejects_empty_and_garbage() {
        assert!(parse_version("").is_err());
        assert!(parse_version("   ").is_err());
        assert!(parse_version("not-a-version").is_err());
        assert!(parse_version("1.2").is_err());
    }

    #[test]
    fn parse_version_roundtrips_canonical_input() {
        for s in ["0.1.0", "1.2.3", "10.20.30"] {
            assert_eq!(parse_version(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn compare_is_numeric_then_prerelease() {
        let v = |s| parse_version(s).unwrap();
        assert_eq!(compare(&v("1.0.0"), &v("2.0.0")), Ordering::Less);
        assert_eq!(compare(&v("1.10.0"), &v("1.9.0")), Ordering::Greater);
        assert_eq!(compare(&v("1.0.0"), &v("1.0.0")), Ordering::Equal);
        // Prerelease sorts below the same numeric version.
        assert_eq!(compare(&v("1.0.0-beta.1"), &v("1.0.0")), Ordering::Less);
        assert_eq!(compare(&v("1.0.0-alpha"), &v("1.0.0-beta")), Ordering::Less);
    }

    #[test]
    fn constraint_accepts_comma_and_space_separation() {
        let v = parse_version("1.5.0").unwrap();
        for expr in [">=1.0.0, <2.0.0", ">=1.0.0 <2.0.0", ">= 1.0.0 < 2.0.0"] {
            let req = parse_constraint(expr).unwrap();
            assert!(satisfies(&v, &req), "{expr}");
        }

        let too_new = parse_version("2.0.0").unwrap();
        let req = parse_constraint(">=1.0.0 <2.0.0").unwrap();
        assert!(!satisfies(&too_new, &req));
    }

    #[test]
    fn constraint_wildcard_and_caret() {
        let v = parse_version("1.5.0").unwrap();
        assert!(satisfies(&v, &parse_constraint("*").unwrap()));
        assert!(satisfies(&v, &parse_constraint("^1.0.0").unwrap()));
        assert!(!satisfies(&v, &parse_constraint("^2.0.0").unwrap()));
    }

    #[test]
    fn constraint_rejects_malformed_input() {
        assert!(parse_constraint("").is_err());
        assert!(parse_constraint(">=>").is_err());
        assert!(parse_constraint("one two three").is_err());
    }

    #[test]
    fn stable_stage_is_empty_prerelease() {
        let v = |s| parse_version(s).unwrap();
        assert!(ReleaseStage::Stable.matches(&v("1.0.0")));
        assert!(!ReleaseStage::Stable.matches(&v("1.0.0-beta.1")));
    }

    #[test]
    fn stage_matches_prerelease_prefix() {
        let v = |s| parse_version(s).unwrap();
        assert!(ReleaseStage::Beta.matches(&v("1.0.0-beta.2")));
        assert!(ReleaseStage::Beta.matches(&v("1.0.0-beta")));
        assert!(!ReleaseStage::Beta.matches(&v("1.0.0-alpha.1")));
        assert!(ReleaseStage::Rc.matches(&v("2.0.0-rc.1")));
        assert!(!ReleaseStage::Dev.matches(&v("2.0.0")));
    }

    #[test]
    fn stage_prefix_not_substring() {
        // The stage token must start the label, not merely appear in it.
        let v = parse_version("1.0.0-public.beta").unwrap();
        assert!(!ReleaseStage::Beta.matches(&v));
    }

    #[test]
    fn stage_from_str_roundtrip() {
        for s in ["dev", "alpha", "beta", "rc", "stable"] {
            assert_eq!(s.parse::<ReleaseStage>().unwrap().to_string(), s);
        }
        assert_eq!("".parse::<ReleaseStage>().unwrap(), ReleaseStage::Stable);
        assert!("nightly".parse::<ReleaseStage>().is_err());
    }
}
