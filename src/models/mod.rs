//! Request and response bodies of the admin API

pub mod requests;
pub mod responses;

pub use requests::{InvalidateRequest, InvalidationTarget};
pub use responses::{
    ClearResponse, DomainStatsResponse, HealthResponse, RemovedResponse, StatsResponse,
    UserWarmupResponse,
};
