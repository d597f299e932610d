// LUKU AI puzzle assistant backend.

pub mod api;
pub mod characters;
pub mod config;
pub mod error;
pub mod gamification;
pub mod llm;
pub mod llms_txt;
pub mod metrics;
pub mod profile;
pub mod puzzle;
pub mod session;
pub mod store;
