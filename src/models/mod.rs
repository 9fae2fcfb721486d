//! Data types for the training service.
//!
//! # Core Concepts
//!
//! - [`SlotKey`]: module plus sub-task, naming one piece of generatable content.
//! - [`GeneratedItem`]: what a slot holds. Its [`ItemState`] is the single
//!   source of truth for rendering (empty, spinner, content, or error with retry).
//! - [`Prompt`]: the text sent to the generation service, kept with the item.
//!
//! Everything else is request/response bodies for the HTTP surface and the
//! outputs of the advisory feed, the password tools and the quiz grader.

mod advisory;
mod item;
mod password;
mod quiz;
mod session;
mod slot;
mod training;

pub use advisory::*;
pub use item::*;
pub use password::*;
pub use quiz::*;
pub use session::*;
pub use slot::*;
pub use training::*;
