//! 核心层：请求、产物、共享上下文、错误与重试策略

pub mod artifact;
pub mod context;
pub mod error;
pub mod request;
pub mod retry;

pub use artifact::{
    Artifact, ArtifactFamily, ArtifactPayload, ArtifactStatus, BudgetLine, BudgetPlan,
    CreativeSuggestion, CurrentConditions, DailyForecast, FailureReason, Finding, Headline, Idea,
    ItineraryPlan, RiskClassification, SafetyVerdict, StageId, StageInfo, TripLength,
    WeatherAlert, WeatherAlertKind, WeatherOutlook,
};
pub use context::SharedContext;
pub use error::{ContextError, FailureKind, HiveError, ToolFailure};
pub use request::{Request, RequestMode};
pub use retry::RetryPolicy;
