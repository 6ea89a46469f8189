//! A catalogue of design pattern demos and low level design problems.
//!
//! Every demo lives in its own module under [`patterns`] or [`problems`] and
//! exposes `demo(&AppConfig) -> anyhow::Result<Transcript>`. The
//! [`catalogue`] registry ties names to those entry points for the
//! `patterns` binary.

pub mod catalogue;
pub mod config;
pub mod logging;
pub mod patterns;
pub mod problems;
pub mod transcript;

pub use config::AppConfig;
pub use transcript::Transcript;
