//! User-Agent and IP based robot detection.

use regex::{RegexSet, RegexSetBuilder};
use std::collections::HashSet;

use crate::domain::collaborators::RobotFilter;
use crate::domain::entities::RequestContext;

/// Patterns matched against the User-Agent when none are configured.
///
/// Covers generic crawler markers and the link scanners mail gateways run
/// on every link before the recipient sees the message.
pub const DEFAULT_ROBOT_PATTERNS: &[&str] = &[
    r"bot\b",
    r"crawl",
    r"spider",
    r"slurp",
    r"facebookexternalhit",
    r"preview",
    r"headlesschrome",
    r"python-requests",
    r"curl/",
    r"wget/",
    r"barracuda",
    r"mimecast",
    r"proofpoint",
];

/// Excludes visitors whose User-Agent matches a pattern or whose IP is listed.
///
/// Matching is case-insensitive. A request without a User-Agent is not
/// excluded on that ground alone.
pub struct UserAgentRobotFilter {
    patterns: RegexSet,
    excluded_ips: HashSet<String>,
}

impl UserAgentRobotFilter {
    /// Builds a filter from User-Agent patterns and excluded IP addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid regular expression.
    pub fn new<P, I>(patterns: P, excluded_ips: I) -> Result<Self, regex::Error>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        I: IntoIterator<Item = String>,
    {
        let patterns = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            patterns,
            excluded_ips: excluded_ips.into_iter().collect(),
        })
    }

    /// Filter using [`DEFAULT_ROBOT_PATTERNS`] and no excluded IPs.
    pub fn with_defaults() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_ROBOT_PATTERNS, Vec::new())
    }
}

impl RobotFilter for UserAgentRobotFilter {
    fn is_excluded(&self, request: &RequestContext) -> bool {
        if let Some(ip) = &request.ip_address
            && self.excluded_ips.contains(ip)
        {
            return true;
        }

        request
            .user_agent
            .as_deref()
            .is_some_and(|ua| self.patterns.is_match(ua))
    }
}
