/// Data layer: loading, validation, caching and aggregation.
///
/// Architecture:
/// ```text
///  Google Sheets / CSV folder
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch worksheets → Workbook (string cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  validate columns + cells → FinanceData
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  memoized until Refresh
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by / sum / mean / top-N per chart
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod loader;
pub mod model;
pub mod schema;
pub mod selection;
pub mod sheets;
