//! 编排核心：槽位抽取、意图分类、预订状态机、行程协调、会话状态与回合控制

pub mod booking;
pub mod context;
pub mod error;
pub mod extract;
pub mod intent;
pub mod itinerary;
pub mod orchestrator;
pub mod session;

pub use booking::{BookingFlow, BookingState};
pub use context::{PartialContext, TravelMode, TripContext};
pub use error::AgentError;
pub use extract::extract;
pub use intent::{classify, Intent};
pub use itinerary::ItineraryCoordinator;
pub use orchestrator::{create_llm_from_config, Orchestrator, TurnOutcome};
pub use session::{AgentOutputCache, Session};
