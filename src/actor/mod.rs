//! Actor System for Watch Mode
//!
//! Message-passing concurrency between the watcher, the per-kind pipeline
//! runners and the live reload broadcaster:
//!
//! ```text
//! FsActor --> PipelineRunner (per kind) --> WsActor
//! (watch)         (rebuild)               (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `runner` - Serialized pipeline re-runs, one task per asset kind
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod runner;
pub mod ws;

pub use coordinator::Coordinator;
