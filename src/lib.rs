//! distserve - serve a project's `dist` build output, or the project root when
//! there is none, through a static file server.
//!
//! The launcher picks the directory and prints one status line, then hands
//! off to a [`server::StaticServer`]. By default that is an external
//! `http-server` process, and it can also be served in-process.

pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod server;
