//! Title similarity scoring for catalog candidates.

use shelf_core::{CatalogCandidate, ScoredCandidate};

/// Levenshtein distance between two titles, counted in `char`s.
///
/// Zero means an exact match. No normalization by length is applied; the
/// value is only used as a ranking key.
pub fn score(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let row = b.len() + 1;

    // (a.len() + 1) x (b.len() + 1) matrix, row-major.
    let mut matrix = vec![0usize; (a.len() + 1) * row];
    let at = |i: usize, j: usize| i * row + j;

    for i in 1..=a.len() {
        matrix[at(i, 0)] = i;
    }
    for j in 1..=b.len() {
        matrix[at(0, j)] = j;
    }

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let deletion = matrix[at(i, j + 1)] + 1;
            let insertion = matrix[at(i + 1, j)] + 1;
            let substitution = matrix[at(i, j)] + cost;
            matrix[at(i + 1, j + 1)] = deletion.min(insertion).min(substitution);
        }
    }

    matrix[at(a.len(), b.len())]
}

/// Score every candidate against `title` and sort best-first.
///
/// The sort is stable, so candidates with equal scores keep the order the
/// catalog returned them in.
pub fn rank_candidates(title: &str, candidates: Vec<CatalogCandidate>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            score: score(title, &candidate.title),
            candidate,
        })
        .collect();
    scored.sort_by_key(|c| c.score);
    scored
}

/// The best match for `title`, or `None` when there are no candidates.
pub fn pick_winner(title: &str, candidates: Vec<CatalogCandidate>) -> Option<ScoredCandidate> {
    rank_candidates(title, candidates).into_iter().next()
}
