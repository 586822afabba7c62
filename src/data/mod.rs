/// Data layer: core types, column resolution, loading, and search.
///
/// Architecture:
/// ```text
///   *price*.csv / *price*.json
///        │
///        ▼
///   ┌──────────┐   ┌─────────┐
///   │  loader  │──▶│ columns │  header synonyms → name / price / weight
///   └──────────┘   └─────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Catalog  │  Vec<Record>, append-only
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  name substring → records by unit price
///   └──────────┘
/// ```

pub mod columns;
pub mod filter;
pub mod loader;
pub mod model;
