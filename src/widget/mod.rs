//! Client-side state of the workout widget: the store, the optimistic sync
//! controller, the animated donut and the day-box projection.

pub mod api;
pub mod chart;
pub mod popup;
pub mod render;
pub mod store;
pub mod sync;

pub use api::{HttpWorkoutApi, WorkoutApi};
pub use chart::{ChartFrame, DonutChart, GOAL};
pub use store::WorkoutStore;
pub use sync::{ReconciliationOutcome, SyncController, SyncState};
