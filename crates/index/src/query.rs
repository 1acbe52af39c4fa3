use crate::{EntryId, NearDupIndex};
use hashbrown::HashSet;
use perceptual::Fingerprint;

/// An indexed entry within tolerance of a query fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearDuplicate {
    pub id: EntryId,
    /// Hamming distance to the query, at most the index tolerance.
    pub distance: u32,
}

impl NearDupIndex {
    /// Every entry whose fingerprint is within `tolerance` bits of `query`.
    ///
    /// Each slice table is looked up with the query's pattern for that slice and
    /// the candidates are verified against the full distance. Results are
    /// deduplicated and ordered by `(distance, id)`.
    pub fn near_duplicates(&self, query: Fingerprint) -> Vec<NearDuplicate> {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut out = Vec::new();

        for (slice, table) in self.slices.iter().zip(self.tables.iter()) {
            let key = query.bit_slice(slice.offset, slice.width);
            let Some(bucket) = table.get(&key) else {
                continue;
            };
            for &pos in bucket {
                if !seen.insert(pos) {
                    continue;
                }
                let entry = &self.entries[pos as usize];
                let distance = entry.fingerprint.hamming_distance(query);
                if distance <= self.tolerance {
                    out.push(NearDuplicate {
                        id: entry.id,
                        distance,
                    });
                }
            }
        }

        out.sort_unstable_by_key(|hit| (hit.distance, hit.id));
        out
    }

    /// Ids of [`Self::near_duplicates`], keeping its order.
    pub fn near_duplicate_ids(&self, query: Fingerprint) -> Vec<EntryId> {
        self.near_duplicates(query).into_iter().map(|hit| hit.id).collect()
    }

    /// Reference lookup that compares `query` against every entry.
    pub fn linear_scan(&self, query: Fingerprint) -> Vec<NearDuplicate> {
        let mut out: Vec<NearDuplicate> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let distance = entry.fingerprint.hamming_distance(query);
                (distance <= self.tolerance).then_some(NearDuplicate {
                    id: entry.id,
                    distance,
                })
            })
            .collect();
        out.sort_unstable_by_key(|hit| (hit.distance, hit.id));
        out
    }
}
