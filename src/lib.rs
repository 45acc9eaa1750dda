//! Hive - Rust 专家编排引擎
//!
//! 模块划分：
//! - **agent**: 由配置装配工具、推理后端、流水线与分发器
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 请求、产物、共享上下文、错误与重试
//! - **dispatcher**: 根分发器，判定请求形态并交给对应编排器
//! - **llm**: 推理后端抽象与实现（模板 / OpenAI 兼容）
//! - **observability**: tracing 初始化
//! - **specialists**: 领域专家（天气、新闻安全、官方通告、行程、主题、菜单、活动、预算）
//! - **synthesis**: 合成最终结果与 Markdown 渲染
//! - **tools**: 工具适配器（Open-Meteo、Google News RSS）与执行器
//! - **workflow**: 顺序 / 并行编排与流水线构建

pub mod agent;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod llm;
pub mod observability;
pub mod specialists;
pub mod synthesis;
pub mod tools;
pub mod workflow;

pub use dispatcher::RootDispatcher;
pub use synthesis::RunResult;
