/// Data layer: core types, loading, filtering, aggregation, and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  loader   │ ───▶ │  cache    │  fingerprint → PaperSet
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ PaperSet  │  Vec<Paper>, journal index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐      ┌──────────┐
///   │  filter   │ ───▶ │  stats    │      │  export   │
///   └──────────┘      └──────────┘      └──────────┘
/// ```
///
/// Data flows one way; a `PaperSet` is immutable once built, and every
/// selection change recomputes the filtered indices and aggregates from it.
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
