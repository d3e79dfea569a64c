//! Data layer: core types, loading, filtering, aggregation, export.
//!
//! Architecture:
//! ```text
//!  .xlsx / .xls / .ods
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read one named sheet → Table (memoized per path+sheet)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  Vec<Record>, declared columns, observed filter values
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply per-column allow-lists → filtered Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  KPIs, grouped sums, monthly series, aging, reconcile
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  filtered Table → CSV
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
