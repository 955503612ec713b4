//! Core library for itinera: attachment extraction, plan building, PDF
//! rendering, the in-memory plan store and signed flash messages.

pub mod extract;
pub mod flash;
pub mod model;
pub mod plan;
pub mod render;
pub mod store;

pub use extract::{ExtractError, Upload, extract};
pub use model::{
    AttachmentSummary, ClientInfo, DayEntry, Plan, RecommendationCategory, Recommendations,
    RequestError, TripInfo, TripRequest,
};
pub use plan::build;
pub use render::{RenderError, render};
pub use store::{PlanId, PlanStore};
