//! Classification of indexed artifacts against the live set.

use crate::live::LiveSet;
use crate::scanner::Candidate;

use std::path::PathBuf;

/// Paths of the candidates whose relative path is not live, in input order.
///
/// Matching is exact on the normalised relative path: `Foobar` is an
/// orphan even when `Foo` is live.
pub fn orphans(candidates: &[Candidate], live: &LiveSet) -> Vec<PathBuf> {
    candidates
        .iter()
        .filter(|candidate| !live.contains(&candidate.rel_path))
        .map(|candidate| candidate.path.clone())
        .collect()
}
