//! Placeholder syntax used by Domain Connect templates.
//!
//! Template strings embed variables between `%` delimiters, for example `"v=spf1 include:%spfhost% ~all"`.
//! The same delimiter is used for the raw key/value command line argument (`%key1%val1%key2%val2%`).

use std::collections::HashMap;

use itertools::Itertools;
use log::trace;

/// Delimiter that opens and closes a placeholder
pub const DELIMITER: char = '%';

/// Returns the placeholder names embedded in `s`, in order of appearance.
///
/// The string is split on [`DELIMITER`]. Segments at odd positions are names, segments at even positions are
/// literal text. A name only counts if a closing delimiter follows it, so a string containing `n` delimiters
/// always yields `n / 2` names and any text after an unmatched final delimiter is ignored.
/// Names are not deduplicated. Adjacent delimiters (`"%%"`) yield an empty name so the count above holds,
/// callers that look names up must skip empty ones.
pub fn placeholders(s: &str) -> impl Iterator<Item = &str> {
    let segments = s.split(DELIMITER).collect_vec();
    let last = segments.len() - 1;
    segments
        .into_iter()
        .enumerate()
        .filter(move |(i, _)| i % 2 == 1 && *i < last)
        .map(|(_, name)| name)
}

/// Parse the raw `%key1%val1%key2%val2%` command line argument into a map.
///
/// Empty segments are skipped, the remaining segments are paired up as key and value.
/// A trailing key without a value is dropped and later duplicates replace earlier ones.
pub fn parse_kvs(s: &str) -> HashMap<String, String> {
    s.split(DELIMITER)
        .filter(|segment| !segment.is_empty())
        .tuples::<(&str, &str)>()
        .inspect(|(k, v)| trace!("storing command line kv {}={}", k, v))
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}
