//! Core of db2-connector.
//! Not intended to be used directly.
#![warn(future_incompatible, rust_2018_idioms)]
#![allow(clippy::type_complexity, clippy::module_inception)]
//
// Allows an API be documented as only available in some specific platforms.
// <https://doc.rust-lang.org/unstable-book/language-features/doc-cfg.html>
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;

pub mod connector;
pub mod driver;
mod logger;
pub mod model;
pub mod pool;
pub mod sql;

pub mod db2;

pub use error::{Error, Result};
