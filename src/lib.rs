//! Session-scoped interaction store and HTTP service for security awareness
//! training: generated phishing samples, incident scenarios, quizzes and
//! Q&A, plus vulnerability advisories and password tools.

pub mod advisories;
pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod generation;
pub mod models;
pub mod password;
pub mod session;
pub mod training;
