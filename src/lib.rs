pub mod api;
pub mod config;
pub mod corpus;
pub mod drafting;
pub mod llm;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod retrieval;
pub mod synthesis;
