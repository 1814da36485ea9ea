#![forbid(unsafe_code)]

//! Terminal demo host for the typist animator.

pub mod app;
pub mod cli;
pub mod logging;
pub mod render;
pub mod session;
