//! Tickwatch Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the time authority and records service)
//! - The canonical time store and the error surface
//! - Use case orchestration (baseline fetch, push subscription, records)
//! - Application-level error handling

pub mod error;
pub mod error_surface;
pub mod ports;
pub mod store;
pub mod subscription;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
pub use error_surface::{ErrorSurface, SAMPLE_ERROR};
pub use ports::{ChannelError, ChannelSession, PushChannel, RecordsGateway, StatusSource};
pub use store::{StoreClosed, TimeReader, TimeSnapshot, TimeStore, TimeWriter};
pub use subscription::SubscriptionManager;
pub use use_cases::{
    AddGradeInput, AddGradeOutput, AddStudentInput, AddStudentOutput, FetchBaseline,
    StudentRecords, ViewTranscriptInput,
};
