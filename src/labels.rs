//! DNS label sanitation.
//!
//! Orchestrator object names (framework names, task names, discovery names)
//! are free-form. These helpers turn them into DNS-legal labels under either
//! the permissive RFC 1123 host name rules or the legacy RFC 952 rules.

use serde::{Deserialize, Serialize};

/// Separator between fragments of a multi-label name.
pub const SEP: char = '.';

/// Host name rule set used to sanitize labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostnameSpec {
    /// RFC 1123: letters, digits and hyphens, up to 63 characters.
    #[default]
    Rfc1123,
    /// RFC 952: must start with a letter, up to 24 characters.
    Rfc952,
}

impl HostnameSpec {
    fn max_len(self) -> usize {
        match self {
            Self::Rfc1123 => 63,
            Self::Rfc952 => 24,
        }
    }

    fn trims_left(self, c: char) -> bool {
        match self {
            Self::Rfc1123 => c == '-',
            Self::Rfc952 => c == '-' || c.is_ascii_digit(),
        }
    }

    /// Sanitize `name` into a single DNS label.
    ///
    /// Uppercase ASCII is lowercased, `-`, `.` and `_` become `-`, and any
    /// other character is dropped. The result may be empty.
    pub fn label(self, name: &str) -> String {
        let mapped = name.chars().filter_map(|c| match c {
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            'a'..='z' | '0'..='9' => Some(c),
            '-' | '.' | '_' => Some('-'),
            _ => None,
        });

        let mut label: String = mapped
            .skip_while(|&c| self.trims_left(c))
            .take(self.max_len())
            .collect();

        let trimmed = label.trim_end_matches('-').len();
        label.truncate(trimmed);
        label
    }
}

/// Mangle `name` into a valid domain fragment: one or more labels joined by
/// `sep`. Fragments that sanitize to nothing are dropped.
pub fn domain_frag(name: &str, sep: char, spec: HostnameSpec) -> String {
    let mut out = String::with_capacity(name.len());
    for label in name.split(sep).map(|frag| spec.label(frag)) {
        if label.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(sep);
        }
        out.push_str(&label);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1123_lowercases_and_maps_separators() {
        assert_eq!(HostnameSpec::Rfc1123.label("My_Web.App"), "my-web-app");
        assert_eq!(HostnameSpec::Rfc1123.label("a$b%c"), "abc");
    }

    #[test]
    fn test_rfc1123_trims_hyphens_at_both_ends() {
        assert_eq!(HostnameSpec::Rfc1123.label("--web--"), "web");
        assert_eq!(HostnameSpec::Rfc1123.label("1web"), "1web");
    }

    #[test]
    fn test_rfc1123_truncates_to_63() {
        let long = "a".repeat(100);
        assert_eq!(HostnameSpec::Rfc1123.label(&long).len(), 63);
    }

    #[test]
    fn test_rfc952_requires_leading_letter() {
        assert_eq!(HostnameSpec::Rfc952.label("123-web"), "web");
        assert_eq!(HostnameSpec::Rfc952.label("4567"), "");
    }

    #[test]
    fn test_rfc952_truncates_to_24_and_trims_tail() {
        // 23 letters then a separator that lands at the cut
        let name = format!("{}-tail", "a".repeat(23));
        assert_eq!(HostnameSpec::Rfc952.label(&name), "a".repeat(23));
    }

    #[test]
    fn test_domain_frag_keeps_dots_between_labels() {
        assert_eq!(
            domain_frag("Chronos.Prod", SEP, HostnameSpec::Rfc1123),
            "chronos.prod"
        );
        assert_eq!(domain_frag("a..b.", SEP, HostnameSpec::Rfc1123), "a.b");
        assert_eq!(domain_frag("$$$", SEP, HostnameSpec::Rfc1123), "");
    }
}
