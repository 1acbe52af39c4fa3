//! Partial string similarity on a 0..=100 scale.
//!
//! Matching blocks follow Ratcliff/Obershelp: take the longest common run,
//! then recurse on the text to its left and to its right. A ratio is `2 * M / T` where `M` is the number of
//! matched characters and `T` the combined length. No junk heuristics are
//! applied. All lengths count Unicode scalar values.

use std::collections::HashMap;

/// A run of `size` equal characters at `a[a_start..]` and `b[b_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    size: usize,
}

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b_index: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &ch) in b.iter().enumerate() {
            b_index.entry(ch).or_default().push(j);
        }
        Self { a, b, b_index }
    }

    /// Longest common run inside `a[alo..ahi]` and `b[blo..bhi]`; the
    /// earliest such run in `a` wins, then the earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            a_start: alo,
            b_start: blo,
            size: 0,
        };
        // Length of the run ending at b[j] for the previous row of `a`.
        let mut run_len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = Block {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            run_len = next;
        }
        best
    }

    /// Non-overlapping matching blocks in increasing order, adjacent runs
    /// merged, terminated by the zero-size block `(len(a), len(b), 0)`.
    fn matching_blocks(&self) -> Vec<Block> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            found.push(block);
            if alo < block.a_start && blo < block.b_start {
                pending.push((alo, block.a_start, blo, block.b_start));
            }
            let a_end = block.a_start + block.size;
            let b_end = block.b_start + block.size;
            if a_end < ahi && b_end < bhi {
                pending.push((a_end, ahi, b_end, bhi));
            }
        }
        found.sort_unstable_by_key(|b| (b.a_start, b.b_start));

        let mut merged: Vec<Block> = Vec::with_capacity(found.len() + 1);
        for block in found {
            match merged.last_mut() {
                Some(last)
                    if last.a_start + last.size == block.a_start
                        && last.b_start + last.size == block.b_start =>
                {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Block {
            a_start: self.a.len(),
            b_start: self.b.len(),
            size: 0,
        });
        merged
    }

    fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|b| b.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Similarity of two whole strings in `[0, 1]`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    Matcher::new(&a, &b).ratio()
}

/// Best similarity of the shorter string against any equally long window of
/// the longer one, as an integer percentage.
///
/// Windows are anchored on the matching blocks between the two strings.
/// A window whose ratio exceeds `0.995` short-circuits to `100`. An empty
/// input scores `0`.
pub fn partial_ratio(s1: &str, s2: &str) -> u8 {
    let s1: Vec<char> = s1.chars().collect();
    let s2: Vec<char> = s2.chars().collect();
    if s1.is_empty() || s2.is_empty() {
        return 0;
    }
    let (shorter, longer) = if s1.len() <= s2.len() {
        (&s1, &s2)
    } else {
        (&s2, &s1)
    };

    let mut best = 0.0f64;
    for block in Matcher::new(shorter, longer).matching_blocks() {
        let start = block.b_start.saturating_sub(block.a_start);
        let end = (start + shorter.len()).min(longer.len());
        let window = &longer[start..end];
        let r = Matcher::new(shorter, window).ratio();
        if r > 0.995 {
            return 100;
        }
        best = best.max(r);
    }
    (best * 100.0).round() as u8
}
