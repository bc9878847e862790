//! Line-oriented key lists and result files.
//!
//! Key lists alternate `N=<int>` and `e=<int>` lines; blank lines are
//! skipped, anything else is a hard error naming the line. Result files
//! carry one line per key; the `Hacked d=` form is parseable back so a
//! later run can re-verify previously recovered exponents.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rug::Integer;

use crate::pipeline::Outcome;
use crate::PublicKey;

/// A `Hacked d=...` result line parsed back for re-verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKey {
    pub e: Integer,
    pub n: Integer,
    pub d: Integer,
}

/// Parse a decimal arbitrary-precision integer.
pub fn parse_int(s: &str) -> Result<Integer> {
    let trimmed = s.trim();
    Integer::parse(trimmed)
        .map(Integer::from)
        .map_err(|err| anyhow::anyhow!("invalid integer `{}`: {}", trimmed, err))
}

/// Read a key list file of alternating `N=` / `e=` lines.
pub fn read_key_list(path: &Path) -> Result<Vec<PublicKey>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading key list {}", path.display()))?;
    parse_key_list(&text).with_context(|| format!("parsing key list {}", path.display()))
}

/// Parse key list text. Exposed separately so tests need no filesystem.
pub fn parse_key_list(text: &str) -> Result<Vec<PublicKey>> {
    let mut keys = Vec::new();
    let mut pending_n: Option<Integer> = None;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match pending_n.take() {
            None => {
                let value = line
                    .strip_prefix("N=")
                    .with_context(|| format!("line {}: expected `N=<int>`, got `{}`", idx + 1, line))?;
                pending_n =
                    Some(parse_int(value).with_context(|| format!("line {}: bad modulus", idx + 1))?);
            }
            Some(n) => {
                let value = line
                    .strip_prefix("e=")
                    .with_context(|| format!("line {}: expected `e=<int>`, got `{}`", idx + 1, line))?;
                let e = parse_int(value)
                    .with_context(|| format!("line {}: bad public exponent", idx + 1))?;
                keys.push(PublicKey::new(e, n));
            }
        }
    }
    if pending_n.is_some() {
        bail!("key list ends with an unpaired `N=` line");
    }
    Ok(keys)
}

/// One result line per outcome class. Only genuinely cracked keys get the
/// `Hacked` form; the other classes are spelled out so a result file never
/// overstates what happened.
pub fn format_outcome(key: &PublicKey, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Cracked { d, .. } => {
            format!("Hacked d={}, for e={}, n={}", d, key.e, key.n)
        }
        Outcome::ExponentNotFound => format!("No d found for e={}, n={}", key.e, key.n),
        Outcome::FactorizationFailed { d } => {
            format!("Found d={} but failed to factor n={}", d, key.n)
        }
        Outcome::Unverified { d, reason, .. } => {
            format!("Unverified d={} for e={}, n={} ({})", d, key.e, key.n, reason)
        }
    }
}

/// Recognize a `Hacked d=<d>, for e=<e>, n=<n>` line anywhere in the input
/// line (tolerates prefixes like `Pair 3: `). Returns None for every other
/// line form.
pub fn parse_result_line(line: &str) -> Option<RecoveredKey> {
    let start = line.find("Hacked d=")?;
    let rest = &line[start + "Hacked d=".len()..];
    let (d_str, rest) = rest.split_once(", for e=")?;
    let (e_str, n_str) = rest.split_once(", n=")?;
    let d = parse_int(d_str).ok()?;
    let e = parse_int(e_str).ok()?;
    let n = parse_int(n_str).ok()?;
    Some(RecoveredKey { e, n, d })
}

/// Read every `Hacked` line from a result file, skipping the other forms.
pub fn read_result_list(path: &Path) -> Result<Vec<RecoveredKey>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading result file {}", path.display()))?;
    Ok(text.lines().filter_map(parse_result_line).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::UnverifiedReason;

    #[test]
    fn parses_alternating_key_list() {
        let text = "N=3233\ne=2753\n\nN=77\ne=7\n";
        let keys = parse_key_list(text).unwrap();
        assert_eq!(
            keys,
            vec![
                PublicKey::new(Integer::from(2753u32), Integer::from(3233u32)),
                PublicKey::new(Integer::from(7u32), Integer::from(77u32)),
            ]
        );
    }

    #[test]
    fn whitespace_around_lines_is_tolerated() {
        let keys = parse_key_list("  N=3233  \n  e=2753  \n").unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].n, Integer::from(3233u32));
    }

    #[test]
    fn empty_input_yields_no_keys() {
        assert!(parse_key_list("").unwrap().is_empty());
        assert!(parse_key_list("\n\n").unwrap().is_empty());
    }

    #[test]
    fn unpaired_modulus_is_an_error() {
        let err = parse_key_list("N=3233\n").unwrap_err();
        assert!(err.to_string().contains("unpaired"));
    }

    #[test]
    fn wrong_prefix_reports_line_number() {
        let err = parse_key_list("N=3233\nd=17\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {:#}", err);
    }

    #[test]
    fn garbage_integer_is_an_error() {
        assert!(parse_key_list("N=notanumber\ne=3\n").is_err());
    }

    #[test]
    fn outcome_lines_round_trip_through_parser() {
        let key = PublicKey::new(Integer::from(2753u32), Integer::from(3233u32));
        let outcome = Outcome::Cracked {
            d: Integer::from(17u32),
            p: Integer::from(53u32),
            q: Integer::from(61u32),
        };
        let line = format_outcome(&key, &outcome);
        assert_eq!(line, "Hacked d=17, for e=2753, n=3233");
        let parsed = parse_result_line(&line).unwrap();
        assert_eq!(parsed.d, Integer::from(17u32));
        assert_eq!(parsed.e, key.e);
        assert_eq!(parsed.n, key.n);
    }

    #[test]
    fn prefixed_result_lines_still_parse() {
        let parsed = parse_result_line("Pair 3: Hacked d=17, for e=2753, n=3233").unwrap();
        assert_eq!(parsed.d, Integer::from(17u32));
    }

    #[test]
    fn non_hacked_lines_do_not_parse() {
        assert_eq!(parse_result_line("No d found for e=65537, n=3233"), None);
        assert_eq!(parse_result_line("Found d=17 but failed to factor n=3233"), None);
        assert_eq!(parse_result_line(""), None);
    }

    #[test]
    fn unverified_line_names_the_reason() {
        let key = PublicKey::new(Integer::from(2753u32), Integer::from(3233u32));
        let outcome = Outcome::Unverified {
            d: Integer::from(17u32),
            p: Integer::from(53u32),
            q: Integer::from(61u32),
            reason: UnverifiedReason::RoundTripMismatch,
        };
        assert_eq!(
            format_outcome(&key, &outcome),
            "Unverified d=17 for e=2753, n=3233 (message round trip failed)"
        );
    }

    #[test]
    fn not_found_line_does_not_claim_success() {
        let key = PublicKey::new(Integer::from(65537u32), Integer::from(3233u32));
        let line = format_outcome(&key, &Outcome::ExponentNotFound);
        assert_eq!(line, "No d found for e=65537, n=3233");
        assert_eq!(parse_result_line(&line), None);
    }
}
