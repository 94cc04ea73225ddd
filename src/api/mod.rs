// src/api/mod.rs
// 外部协作方：后端 REST、健身追踪、LLM
pub mod client;
pub mod error;
pub mod fit;
pub mod llm;
pub mod request;
pub mod transport;
pub use client::DashboardApi;
pub use error::ApiError;
pub use fit::{
    ActivityKind, ActivitySegment, Fetched, FitSession, FitState, FitnessTracker, HeartRatePoint,
    SimulatedFitTracker, SleepSegment, SleepStage,
};
pub use llm::{CompletionOptions, HealthData, LlmClient, LlmConnection, UserProfile};
pub use request::{ApiRequest, Method, TimeRange};
pub use transport::{HttpTransport, MemoryTransport, Transport};
