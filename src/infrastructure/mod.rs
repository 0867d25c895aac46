//! Infrastructure layer - External service implementations

pub mod logging;
pub mod observability;
pub mod render;
pub mod services;
pub mod storage;
