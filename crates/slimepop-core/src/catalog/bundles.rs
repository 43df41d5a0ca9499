//! ============================================================================
//! Bundle Generation - Deterministic grant tables for `bundle_01..bundle_20`
//! ============================================================================
//! A bundle's ordinal `i` selects one of five grant patterns (`i % 5`). Raw
//! content numbers are clamped into the catalog range, de-duplicated in order,
//! and padded with alternating skin/sound fillers until three grants exist.
//! ============================================================================

use super::types::{bundle_id, skin_id, sound_id, BundleDef, BUNDLE_COUNT, SKIN_COUNT, SOUND_COUNT};

/// Every bundle grants exactly this many items
pub const GRANTS_PER_BUNDLE: usize = 3;

fn skin(n: i64) -> String {
    skin_id(n.clamp(1, SKIN_COUNT as i64) as u32)
}

fn sound(n: i64) -> String {
    sound_id(n.clamp(1, SOUND_COUNT as i64) as u32)
}

/// Compute the grant list for the bundle at ordinal `i`
pub fn grants_for_ordinal(i: u32) -> Vec<String> {
    let n = i as i64;
    let raw = match n % 5 {
        1 => vec![skin(n * 2 - 1), skin(n * 2), sound(n)],
        2 => vec![skin(n), sound(n * 2 - 1), sound(n * 2)],
        3 => vec![skin(n * 2 - 1), skin(n * 2), skin(n * 2 + 1)],
        4 => vec![sound(n * 2 - 1), sound(n * 2), sound(n * 2 + 1)],
        _ => vec![skin(n), skin(n + 10), sound(n + 10)],
    };

    let mut grants: Vec<String> = Vec::with_capacity(GRANTS_PER_BUNDLE);
    for id in raw {
        if !grants.contains(&id) {
            grants.push(id);
        }
    }
    pad_with_fillers(grants, n)
}

fn pad_with_fillers(mut grants: Vec<String>, seed: i64) -> Vec<String> {
    grants.truncate(GRANTS_PER_BUNDLE);
    let mut k = seed;
    while grants.len() < GRANTS_PER_BUNDLE {
        let slot = k.rem_euclid(50) + 1;
        let candidate = if k % 2 == 0 { skin(slot) } else { sound(slot) };
        if !grants.contains(&candidate) {
            grants.push(candidate);
        }
        k += 1;
    }
    grants
}

pub(crate) fn standard_bundles() -> Vec<BundleDef> {
    (1..=BUNDLE_COUNT)
        .map(|i| BundleDef {
            bundle_id: bundle_id(i),
            granted_product_ids: grants_for_ordinal(i),
            display_name: format!("Relax Pack {:02}", i),
        })
        .collect()
}
