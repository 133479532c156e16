/// Data layer: core types, loading, cleaning and projection.
///
/// Architecture:
/// ```text
///  .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + infer column kinds → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  deduplicate, drop missing → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  view     │  select columns → Table → NumericView
///   └──────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
pub mod view;
