//! Version specifiers: `[feed/]version-or-label[/arch]`.
//!
//! The router only depends on [`parse`]; the rest of this module is used by
//! the local version manager to match specifiers against installed and
//! remote versions.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::errors::ParseError;

static SPECIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:([a-z0-9_-]+)/)?(?:v?(\d+(?:\.\d+){0,2})|(lts|latest))(?:/(x86|x64|arm|arm64|armv7l|ppc64le|s390x))?$",
    )
    .expect("specifier regex is valid")
});

/// Reserved non-numeric version aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Lts,
    Latest,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Lts => write!(f, "lts"),
            Label::Latest => write!(f, "latest"),
        }
    }
}

/// A dotted numeric version, possibly partial (`6`, `6.3`, `6.3.1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemVer {
    parts: Vec<u64>,
}

impl SemVer {
    /// Parse `6.3.1` or `v6.3.1`. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        let parts = s
            .split('.')
            .map(|p| p.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }
        Some(Self { parts })
    }

    pub fn is_complete(&self) -> bool {
        self.parts.len() == 3
    }

    /// True when every component of `self` equals the matching leading
    /// component of `other`. A complete version only matches itself.
    pub fn matches(&self, other: &SemVer) -> bool {
        self.parts.len() <= other.parts.len()
            && self.parts.iter().zip(&other.parts).all(|(a, b)| a == b)
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        write!(f, "{}", joined.join("."))
    }
}

/// Either a numeric version or a reserved label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOrLabel {
    Semantic(SemVer),
    Label(Label),
}

impl std::fmt::Display for VersionOrLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionOrLabel::Semantic(v) => write!(f, "{}", v),
            VersionOrLabel::Label(l) => write!(f, "{}", l),
        }
    }
}

/// Parsed `[feed/]version-or-label[/arch]`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpecifier {
    feed_name: Option<String>,
    version: VersionOrLabel,
    arch: Option<String>,
}

impl VersionSpecifier {
    pub fn new(feed_name: Option<String>, version: VersionOrLabel, arch: Option<String>) -> Self {
        Self {
            feed_name,
            version,
            arch,
        }
    }

    pub fn feed_name(&self) -> Option<&str> {
        self.feed_name.as_deref()
    }

    pub fn version(&self) -> &VersionOrLabel {
        &self.version
    }

    pub fn semantic(&self) -> Option<&SemVer> {
        match &self.version {
            VersionOrLabel::Semantic(v) => Some(v),
            VersionOrLabel::Label(_) => None,
        }
    }

    pub fn arch(&self) -> Option<&str> {
        self.arch.as_deref()
    }

    /// Architecture to use when none was given.
    pub fn arch_or_host(&self) -> String {
        self.arch.clone().unwrap_or_else(host_arch)
    }
}

impl std::fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(feed) = &self.feed_name {
            write!(f, "{}/", feed)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(arch) = &self.arch {
            write!(f, "/{}", arch)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VersionSpecifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::Invalid { raw: s.to_string() };
        let caps = SPECIFIER_RE.captures(s.trim()).ok_or_else(invalid)?;

        let feed_name = caps.get(1).map(|m| m.as_str().to_string());
        let version = match (caps.get(2), caps.get(3)) {
            (Some(v), _) => VersionOrLabel::Semantic(SemVer::parse(v.as_str()).ok_or_else(invalid)?),
            (None, Some(l)) if l.as_str().eq_ignore_ascii_case("lts") => {
                VersionOrLabel::Label(Label::Lts)
            }
            (None, Some(_)) => VersionOrLabel::Label(Label::Latest),
            (None, None) => return Err(invalid()),
        };
        let arch = caps.get(4).map(|m| m.as_str().to_lowercase());

        Ok(Self::new(feed_name, version, arch))
    }
}

/// Parse an optional raw argument. An absent argument is a parse failure.
pub fn parse(raw: Option<&str>) -> Result<VersionSpecifier, ParseError> {
    match raw {
        None => Err(ParseError::Missing),
        Some(s) if s.trim().is_empty() => Err(ParseError::Missing),
        Some(s) => s.parse(),
    }
}

/// Host architecture in node's naming.
pub fn host_arch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "x86",
        "aarch64" => "arm64",
        "arm" => "arm",
        "powerpc64" => "ppc64le",
        "s390x" => "s390x",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sem(s: &str) -> SemVer {
        SemVer::parse(s).unwrap()
    }

    #[test]
    fn test_parse_plain_version() {
        let v = parse(Some("6.3.1")).unwrap();
        assert_eq!(v.feed_name(), None);
        assert_eq!(v.semantic(), Some(&sem("6.3.1")));
        assert_eq!(v.arch(), None);
    }

    #[test]
    fn test_parse_version_with_arch() {
        let v = parse(Some("6.3.1/x86")).unwrap();
        assert_eq!(v.arch(), Some("x86"));
        assert_eq!(v.to_string(), "6.3.1/x86");
    }

    #[test]
    fn test_parse_full_specifier() {
        let v = parse(Some("node/6.7.0/x64")).unwrap();
        assert_eq!(v.feed_name(), Some("node"));
        assert_eq!(v.semantic(), Some(&sem("6.7.0")));
        assert_eq!(v.arch(), Some("x64"));
        assert_eq!(v.to_string(), "node/6.7.0/x64");
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            parse(Some("lts")).unwrap().version(),
            &VersionOrLabel::Label(Label::Lts)
        );
        assert_eq!(
            parse(Some("node/LATEST")).unwrap().version(),
            &VersionOrLabel::Label(Label::Latest)
        );
    }

    #[test]
    fn test_parse_strips_leading_v() {
        let v = parse(Some("v4.6.0")).unwrap();
        assert_eq!(v.to_string(), "4.6.0");
    }

    #[test]
    fn test_parse_partial_version() {
        let v = parse(Some("6.3")).unwrap();
        assert!(!v.semantic().unwrap().is_complete());
    }

    #[test]
    fn test_parse_missing_is_error() {
        assert_eq!(parse(None), Err(ParseError::Missing));
        assert_eq!(parse(Some("")), Err(ParseError::Missing));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["node", "6.3.1.2", "a/b/c/d", "6.3.1/sparc", "/6.3.1", "lts/"] {
            match parse(Some(raw)) {
                Err(ParseError::Invalid { raw: r }) => assert_eq!(r, raw),
                other => panic!("expected Invalid for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_semver_partial_matching() {
        assert!(sem("6").matches(&sem("6.3.1")));
        assert!(sem("6.3").matches(&sem("6.3.1")));
        assert!(!sem("6.4").matches(&sem("6.3.1")));
        assert!(!sem("6.3.1").matches(&sem("6.3")));
    }

    #[test]
    fn test_semver_ordering_is_numeric() {
        assert!(sem("10.0.0") > sem("9.11.2"));
        assert!(sem("6.3.1") < sem("6.10.0"));
    }
}
