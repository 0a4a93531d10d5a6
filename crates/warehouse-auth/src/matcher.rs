//! Path normalization for permission lookups.
//!
//! Permissions are stored against path patterns such as
//! `/api/admin/users/{id}` or `/api/products/{productCode}`, while requests
//! arrive with concrete paths. A [`PathNormalizer`] turns a concrete path into
//! an ordered list of [`Probe`]s, most specific first; the authorizer tries
//! them in order and stops at the first permission found.
//!
//! The default matcher table is:
//!
//! | order | matcher            | `/api/admin/users/42`          |
//! |-------|--------------------|--------------------------------|
//! | 1     | `Exact`            | `/api/admin/users/42`          |
//! | 2     | `NumericTail`      | `/api/admin/users/{id}`        |
//! | 3     | `AlphanumericTail` | (skipped: tail is all digits)  |
//! | 4     | `NumericPattern`   | scan of stored patterns        |

use warehouse_config::AccessConfig;

/// One lookup to attempt against the permission store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Look up a permission whose `api_path` equals this string.
    Literal(String),
    /// Scan the stored patterns for the method, reading placeholders as `[0-9]+`.
    NumericPattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// The path exactly as received.
    Exact,
    /// Trailing segment of ASCII digits rewritten to `placeholder`.
    NumericTail { placeholder: String },
    /// Trailing segment of ASCII letters, digits, `-` or `_` (not all digits)
    /// rewritten to `placeholder`.
    AlphanumericTail { placeholder: String },
    /// Stored patterns with their placeholders read as `[0-9]+`.
    NumericPattern,
}

impl PathMatcher {
    /// The probe this matcher contributes for `path`, if it applies.
    pub fn probe(&self, path: &str) -> Option<Probe> {
        match self {
            PathMatcher::Exact => Some(Probe::Literal(path.to_string())),
            PathMatcher::NumericTail { placeholder } => {
                let (prefix, tail) = split_tail(path)?;
                is_numeric_segment(tail).then(|| Probe::Literal(format!("{prefix}/{placeholder}")))
            }
            PathMatcher::AlphanumericTail { placeholder } => {
                let (prefix, tail) = split_tail(path)?;
                (is_code_segment(tail) && !is_numeric_segment(tail))
                    .then(|| Probe::Literal(format!("{prefix}/{placeholder}")))
            }
            PathMatcher::NumericPattern => Some(Probe::NumericPattern),
        }
    }
}

/// Ordered table of matchers evaluated against each request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNormalizer {
    matchers: Vec<PathMatcher>,
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::from_config(&AccessConfig::default())
    }
}

impl PathNormalizer {
    pub fn new(matchers: Vec<PathMatcher>) -> Self {
        Self { matchers }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(vec![
            PathMatcher::Exact,
            PathMatcher::NumericTail {
                placeholder: config.numeric_placeholder.clone(),
            },
            PathMatcher::AlphanumericTail {
                placeholder: config.alphanumeric_placeholder.clone(),
            },
            PathMatcher::NumericPattern,
        ])
    }

    pub fn matchers(&self) -> &[PathMatcher] {
        &self.matchers
    }

    /// Probes for `path` in priority order, without duplicates.
    pub fn candidates(&self, path: &str) -> Vec<Probe> {
        let mut probes: Vec<Probe> = Vec::with_capacity(self.matchers.len());
        for probe in self.matchers.iter().filter_map(|m| m.probe(path)) {
            if !probes.contains(&probe) {
                probes.push(probe);
            }
        }
        probes
    }
}

/// Splits `/a/b/c` into (`/a/b`, `c`). `None` when there is no `/` or the
/// trailing segment is empty.
fn split_tail(path: &str) -> Option<(&str, &str)> {
    let (prefix, tail) = path.rsplit_once('/')?;
    (!tail.is_empty()).then_some((prefix, tail))
}

fn is_numeric_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn is_code_segment(segment: &str) -> bool {
    segment.bytes().any(|b| b.is_ascii_alphanumeric())
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Numeric,
}

/// A stored `api_path` compiled for the numeric pattern scan.
///
/// Whole-segment placeholders (`{id}`, `{productCode}`, ...) match one
/// segment of ASCII digits; every other segment must match literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPattern {
    segments: Vec<Segment>,
}

impl PermissionPattern {
    pub fn compile(api_path: &str) -> Self {
        let segments = api_path
            .split('/')
            .map(|segment| {
                if is_placeholder_segment(segment) {
                    Segment::Numeric
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();

        Self { segments }
    }

    pub fn has_placeholders(&self) -> bool {
        self.segments.contains(&Segment::Numeric)
    }

    pub fn is_match(&self, path: &str) -> bool {
        let mut parts = path.split('/');
        for segment in &self.segments {
            let Some(part) = parts.next() else {
                return false;
            };
            let matched = match segment {
                Segment::Literal(literal) => literal == part,
                Segment::Numeric => is_numeric_segment(part),
            };
            if !matched {
                return false;
            }
        }
        parts.next().is_none()
    }
}

fn is_placeholder_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literals(probes: &[Probe]) -> Vec<&str> {
        probes
            .iter()
            .filter_map(|p| match p {
                Probe::Literal(s) => Some(s.as_str()),
                Probe::NumericPattern => None,
            })
            .collect()
    }

    #[test]
    fn test_numeric_tail_candidates() {
        let probes = PathNormalizer::default().candidates("/api/admin/users/123");
        assert_eq!(
            probes,
            vec![
                Probe::Literal("/api/admin/users/123".to_string()),
                Probe::Literal("/api/admin/users/{id}".to_string()),
                Probe::NumericPattern,
            ]
        );
    }

    #[test]
    fn test_every_numeric_tail_yields_id_probe() {
        let normalizer = PathNormalizer::default();
        for tail in ["0", "7", "42", "0001", "18446744073709551616"] {
            let path = format!("/api/stock-in/{tail}");
            let probes = normalizer.candidates(&path);
            assert!(
                probes.contains(&Probe::Literal("/api/stock-in/{id}".to_string())),
                "missing {{id}} probe for {path}"
            );
        }
    }

    #[test]
    fn test_alphanumeric_tail_candidates() {
        let probes = PathNormalizer::default().candidates("/api/products/SKU-001");
        assert_eq!(
            literals(&probes),
            vec!["/api/products/SKU-001", "/api/products/{productCode}"]
        );
        assert_eq!(probes.last(), Some(&Probe::NumericPattern));
    }

    #[test]
    fn test_exact_probe_comes_first() {
        let probes = PathNormalizer::default().candidates("/api/admin/users/search");
        assert_eq!(
            probes.first(),
            Some(&Probe::Literal("/api/admin/users/search".to_string()))
        );
    }

    #[test]
    fn test_malformed_tails_only_probe_exact() {
        let normalizer = PathNormalizer::default();
        for path in ["/api/products/", "/api/products/%20x", "/api/products/caf\u{e9}", "", "noslash"] {
            let probes = normalizer.candidates(path);
            assert_eq!(
                literals(&probes),
                vec![path],
                "unexpected probes for {path:?}"
            );
        }
    }

    #[test]
    fn test_custom_placeholders() {
        let config = AccessConfig {
            numeric_placeholder: "{key}".to_string(),
            alphanumeric_placeholder: "{code}".to_string(),
        };
        let normalizer = PathNormalizer::from_config(&config);
        assert!(
            normalizer
                .candidates("/api/roles/5")
                .contains(&Probe::Literal("/api/roles/{key}".to_string()))
        );
        assert!(
            normalizer
                .candidates("/api/products/AB1")
                .contains(&Probe::Literal("/api/products/{code}".to_string()))
        );
    }

    #[test]
    fn test_duplicate_probes_are_removed() {
        let normalizer = PathNormalizer::new(vec![
            PathMatcher::Exact,
            PathMatcher::Exact,
            PathMatcher::NumericPattern,
        ]);
        assert_eq!(normalizer.candidates("/a").len(), 2);
    }

    #[test]
    fn test_pattern_matches_numeric_placeholders() {
        let pattern = PermissionPattern::compile("/api/admin/roles/{id}/permissions");
        assert!(pattern.has_placeholders());
        assert!(pattern.is_match("/api/admin/roles/3/permissions"));
        assert!(!pattern.is_match("/api/admin/roles/abc/permissions"));
        assert!(!pattern.is_match("/api/admin/roles/3"));
        assert!(!pattern.is_match("/api/admin/roles/3/permissions/extra"));
    }

    #[test]
    fn test_pattern_reads_any_placeholder_as_numeric() {
        let pattern = PermissionPattern::compile("/api/products/{productCode}");
        assert!(pattern.is_match("/api/products/1001"));
        assert!(!pattern.is_match("/api/products/ABC123"));
    }

    #[test]
    fn test_pattern_without_placeholders() {
        let pattern = PermissionPattern::compile("/api/products");
        assert!(!pattern.has_placeholders());
        assert!(pattern.is_match("/api/products"));
        assert!(!pattern.is_match("/api/products/1"));
    }

    #[test]
    fn test_empty_braces_are_literal() {
        let pattern = PermissionPattern::compile("/api/{}/x");
        assert!(!pattern.has_placeholders());
        assert!(pattern.is_match("/api/{}/x"));
        assert!(!pattern.is_match("/api/1/x"));
    }
}
