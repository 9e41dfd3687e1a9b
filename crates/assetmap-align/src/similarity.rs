//! Character-sequence similarity.
//!
//! Ratcliff/Obershelp "gestalt" matching: find the longest common block,
//! recurse on the pieces to its left and right, and score
//! `2 * matched / (len(a) + len(b))`. This is the classic `SequenceMatcher`
//! ratio, including its popular-element pruning for long second sequences.
//! It is neither an edit distance nor a token overlap.

use std::collections::HashMap;

use crate::error::AlignError;

/// Sequences at least this long get popular-element pruning.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Matcher with the second sequence pre-indexed, so one candidate can be
/// scored against many targets cheaply (or vice versa).
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let b2j = index_b(&b);
        Self { a, b, b2j }
    }

    /// Replace the first sequence, keeping the index of the second.
    pub fn set_a(&mut self, a: &str) {
        self.a = a.chars().collect();
    }

    /// Replace the second sequence and rebuild its index.
    pub fn set_b(&mut self, b: &str) {
        self.b = b.chars().collect();
        self.b2j = index_b(&self.b);
    }

    /// Longest matching block in `a[alo..ahi]` / `b[blo..bhi]` as
    /// `(i, j, size)`. Ties go to the block that starts earliest in `a`,
    /// then earliest in `b`.
    pub fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (a, b) = (&self.a, &self.b);
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);

        // j2len[j] = length of the longest match ending with a[i-1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(ch) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Pruned (popular) elements never seed a block but may extend one.
        while besti > alo && bestj > blo && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && a[besti + bestsize] == b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// All non-overlapping matching blocks, ordered by position.
    pub fn matching_blocks(&self) -> Vec<(usize, usize, usize)> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        blocks.sort_unstable();
        blocks
    }

    /// Similarity in `[0, 1]`; two empty sequences are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|&(_, _, k)| k).sum();
        2.0 * matched as f64 / total as f64
    }
}

fn index_b(b: &[char]) -> HashMap<char, Vec<usize>> {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }
    let n = b.len();
    if n >= AUTOJUNK_MIN_LEN {
        let ntest = n / 100 + 1;
        b2j.retain(|_, positions| positions.len() <= ntest);
    }
    b2j
}

/// Similarity ratio of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

/// Result of [`best_match`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'a> {
    /// Position of the winner in the target slice.
    pub index: usize,
    pub target: &'a str,
    pub score: f64,
}

/// Highest-scoring target for `candidate`.
///
/// Scanning is left to right and a later target replaces the current best
/// when its score is greater *or equal*, so among equal scores the last one
/// wins.
pub fn best_match<'a, T: AsRef<str>>(
    candidate: &str,
    targets: &'a [T],
) -> Result<BestMatch<'a>, AlignError> {
    if targets.is_empty() {
        return Err(AlignError::InvalidInput(format!(
            "no targets to match {candidate:?} against"
        )));
    }

    let mut matcher = SequenceMatcher::new(candidate, "");
    let mut best: Option<BestMatch<'a>> = None;
    for (index, target) in targets.iter().enumerate() {
        let target = target.as_ref();
        matcher.set_b(target);
        let score = matcher.ratio();
        if best.map_or(true, |b| score >= b.score) {
            best = Some(BestMatch {
                index,
                target,
                score,
            });
        }
    }
    best.ok_or_else(|| AlignError::InvalidInput("empty target set".to_string()))
}
