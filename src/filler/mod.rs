//! Generated stand-in values for template variables and the `state` parameter when none are supplied.

#[cfg(test)]
use mockall::automock;
use rand::seq::SliceRandom;

/// Length of every generated value
pub const FILLER_LEN: usize = 8;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A `Filler` produces syntactically valid values for placeholders that have no supplied value.
/// Values are never used as security tokens.
#[cfg_attr(test, automock)]
pub trait Filler {
    /// Returns a string of `len` ASCII letters
    fn fill(&self, len: usize) -> String;
}

/// Draws each character uniformly from `a-z` and `A-Z` using the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomFiller;

impl Filler for RandomFiller {
    fn fill(&self, len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .filter_map(|_| LETTERS.choose(&mut rng))
            .map(|b| char::from(*b))
            .collect()
    }
}
