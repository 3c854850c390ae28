use phf::{Map, phf_map};

/// Reference radius for each element symbol used when labelling bubbles as atoms.
///
/// Every radius is unique so a radius maps back to exactly one symbol.
pub static ELEMENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.30,
    "HE" => 1.40,
    "LI" => 0.76,
    "C" => 1.70,
    "N" => 1.55,
    "O" => 1.50,
    "F" => 1.47,
    "NE" => 1.54,
    "NA" => 1.02,
    "MG" => 0.72,
    "P" => 1.95,
    "S" => 1.80,
    "CL" => 1.75,
    "AR" => 1.88,
    "K" => 1.38,
    "CA" => 1.00,
    "ZN" => 0.74,
    "BR" => 1.85,
    "KR" => 2.02,
    "I" => 1.98,
    "XE" => 2.16,
};

/// Looks up the radius of an element symbol, ignoring case.
pub fn element_radius(symbol: &str) -> Option<f64> {
    ELEMENT_RADII.get(symbol.to_ascii_uppercase().as_str()).copied()
}

/// The `(radius, symbol)` table sorted by radius.
pub fn sorted_radii() -> Vec<(f64, &'static str)> {
    let mut entries: Vec<(f64, &'static str)> =
        ELEMENT_RADII.entries().map(|(symbol, radius)| (*radius, *symbol)).collect();
    entries.sort_by(|a, b| a.0.total_cmp(&b.0));
    entries
}

/// Finds the entry whose key is nearest to `value` in a slice sorted by key.
///
/// Uses a binary search for the insertion point and compares the two neighbors around it.
/// When both are equally close the smaller key wins. Returns `None` for an empty slice.
pub fn find_closest_key<V>(value: f64, sorted_entries: &[(f64, V)]) -> Option<&(f64, V)> {
    let pos = sorted_entries.partition_point(|(key, _)| *key < value);
    let below = pos.checked_sub(1).and_then(|i| sorted_entries.get(i));
    let above = sorted_entries.get(pos);
    match (below, above) {
        (Some(lo), Some(hi)) => {
            if (hi.0 - value) < (value - lo.0) {
                Some(hi)
            } else {
                Some(lo)
            }
        }
        (lo, hi) => lo.or(hi),
    }
}

/// Snaps every radius to the nearest tabulated element radius.
///
/// Returns the snapped radii and the matching element symbols, both in input order.
pub fn standardize_radii_to_atomic(radii: &[f64]) -> (Vec<f64>, Vec<&'static str>) {
    let table = sorted_radii();
    radii
        .iter()
        .filter_map(|&r| find_closest_key(r, &table).copied())
        .unzip()
}
