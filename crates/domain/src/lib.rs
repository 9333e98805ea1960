//! Tickwatch Domain - Core clock types
//!
//! This crate defines the domain model for the Tickwatch world clock.
//! All types here are pure Rust with no I/O dependencies.

pub mod config;
pub mod error;
pub mod location;
pub mod offset_view;
pub mod payload;
pub mod records;
pub mod subscription;
pub mod time;

pub use config::{ClockConfig, ReconnectPolicy};
pub use error::{ConfigError, DecodeError, DecodeResult};
pub use location::{LOCATIONS, Location};
pub use offset_view::{OffsetView, render_offset};
pub use payload::{
    CountPayload, StatusPayload, TickPayload, decode_count, decode_status, decode_tick,
    json_type_name,
};
pub use records::{
    CourseGrade, GradeRecord, RecordError, Student, StudentId, Transcript, TranscriptLookup,
};
pub use subscription::{ChannelEvent, SubscriptionState};
pub use time::{CanonicalTime, WatcherCount};
