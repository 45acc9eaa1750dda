//! 工具层：外部数据源适配器、注册表与超时执行器

pub mod executor;
pub mod news;
pub mod registry;
pub mod types;
pub mod weather;

pub use executor::ToolExecutor;
pub use news::GoogleNewsTool;
pub use registry::{ToolAdapter, ToolRegistry};
pub use types::{NewsBrief, NewsQuery, ToolQuery, ToolResponse, WeatherQuery, WeatherReport};
pub use weather::OpenMeteoTool;
