use crate::data::UnitId;
use itertools::Itertools;

/// Returns the smallest positive id not present in `used`.
///
/// Walks the sorted ids from 1 and stops at the first position whose id is
/// not the expected one; a dense `1..=n` prefix yields `n + 1`.
pub fn lowest_free_id<I>(used: I) -> UnitId
where
    I: IntoIterator<Item = UnitId>,
{
    let mut candidate: UnitId = 1;
    for id in used.into_iter().filter(|id| *id > 0).sorted_unstable().dedup() {
        if id != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}
