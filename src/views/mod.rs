/// Feature views: several differently shaped matrices from one series.
///
/// ```text
///   values ──┬── Raw             warmup 0      [value]
///            ├── Delta           warmup 1      [Δvalue, value]
///            ├── Window(w)…      warmup w − 1  [rolling mean]
///            └── WindowDelta(w)… warmup 1      [Δvalue, value]
/// ```

pub mod builder;
pub mod kind;

pub use builder::{FeatureView, build_view, build_views, plan_views};
pub use kind::{ColumnRole, ViewId, ViewKind};
