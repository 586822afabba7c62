use super::model::{Catalog, Record};

/// Whether `record`'s name contains `needle`, which must already be lowercase.
fn name_contains(record: &Record, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
}

/// Records whose name contains `term` (case-insensitive), cheapest unit
/// price first.
///
/// The sort is stable, so records with equal unit prices keep catalog
/// order. An empty term matches every record.
pub fn search<'a>(catalog: &'a Catalog, term: &str) -> Vec<&'a Record> {
    let needle = term.to_lowercase();
    let mut hits: Vec<&Record> = catalog
        .iter()
        .filter(|record| name_contains(record, &needle))
        .collect();
    hits.sort_by(|a, b| a.unit_price.total_cmp(&b.unit_price));
    hits
}
