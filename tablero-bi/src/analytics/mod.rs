//! Pure aggregation and cross-reference transforms over a snapshot
//!
//! Everything here is a pure function over immutable input; running a
//! transform twice over the same snapshot yields identical output.

pub mod aggregate;
pub mod costs;

pub use aggregate::{monthly_rollup, sorted_desc, sum_by, GroupTotal, MonthTotal};
pub use costs::{accrue_costs, canonical_name, total_accrued, TaskCost};
