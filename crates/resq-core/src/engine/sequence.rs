/// Gap placeholder in aligned sequences.
pub const GAP: char = '-';

const MATCH_AWARD: i32 = 1;
const MISMATCH_PENALTY: i32 = -1;
const GAP_PENALTY: i32 = -1;

// An input character that is itself a gap placeholder scores as a gap
// transition, not a mismatch. This lets a previously aligned, gapped
// sequence be re-aligned without distorting the scoring.
fn pair_score(a: char, b: char) -> i32 {
    if a == b {
        MATCH_AWARD
    } else if a == GAP || b == GAP {
        GAP_PENALTY
    } else {
        MISMATCH_PENALTY
    }
}

/// Global pairwise alignment of two one-letter-code sequences.
///
/// Classic Needleman-Wunsch with match +1, mismatch -1, gap -1. Both
/// returned sequences have equal length, at least as long as the longer
/// input, with [`GAP`] characters padding insertions and deletions.
///
/// The traceback tie-break order is fixed: diagonal first, then consuming
/// from `seq_a` (gap in `seq_b`), then consuming from `seq_b`. Identical
/// inputs therefore always produce byte-identical alignments.
pub fn align(seq_a: &str, seq_b: &str) -> (String, String) {
    let a: Vec<char> = seq_a.chars().collect();
    let b: Vec<char> = seq_b.chars().collect();
    let n = a.len();
    let m = b.len();
    let width = n + 1;

    // Score matrix with the standard cumulative-gap boundary conditions;
    // row index runs over seq_b, column index over seq_a.
    let mut score = vec![0i32; (m + 1) * width];
    for i in 0..=m {
        score[i * width] = GAP_PENALTY * i as i32;
    }
    for j in 0..=n {
        score[j] = GAP_PENALTY * j as i32;
    }
    for i in 1..=m {
        for j in 1..=n {
            let diagonal = score[(i - 1) * width + (j - 1)] + pair_score(a[j - 1], b[i - 1]);
            let skip_b = score[(i - 1) * width + j] + GAP_PENALTY;
            let skip_a = score[i * width + (j - 1)] + GAP_PENALTY;
            score[i * width + j] = diagonal.max(skip_b).max(skip_a);
        }
    }

    let mut aligned_a: Vec<char> = Vec::with_capacity(n.max(m));
    let mut aligned_b: Vec<char> = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        let current = score[i * width + j];
        if current == score[(i - 1) * width + (j - 1)] + pair_score(a[j - 1], b[i - 1]) {
            aligned_a.push(a[j - 1]);
            aligned_b.push(b[i - 1]);
            i -= 1;
            j -= 1;
        } else if current == score[i * width + (j - 1)] + GAP_PENALTY {
            aligned_a.push(a[j - 1]);
            aligned_b.push(GAP);
            j -= 1;
        } else {
            aligned_a.push(GAP);
            aligned_b.push(b[i - 1]);
            i -= 1;
        }
    }
    while j > 0 {
        aligned_a.push(a[j - 1]);
        aligned_b.push(GAP);
        j -= 1;
    }
    while i > 0 {
        aligned_a.push(GAP);
        aligned_b.push(b[i - 1]);
        i -= 1;
    }

    aligned_a.reverse();
    aligned_b.reverse();
    (aligned_a.into_iter().collect(), aligned_b.into_iter().collect())
}
