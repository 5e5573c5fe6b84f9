//! 工具箱：天气预报与酒店预订，统一经 ToolExecutor 调用

pub mod booking;
pub mod executor;
pub mod registry;
pub mod weather;

pub use booking::HotelBookingTool;
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry};
pub use weather::WeatherTool;
