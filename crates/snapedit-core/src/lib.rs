//! # SnapEdit Core
//!
//! Core types, errors and the application event bus shared by every SnapEdit
//! crate. Geometry and colour primitives live here so that the settings crate
//! and the editor agree on one representation.

pub mod error;
pub mod event_bus;
pub mod geometry;

pub use error::{ArchiveError, Error, Result, SceneError, ServiceError, SessionError};

pub use event_bus::{
    event_bus, AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, HistoryEvent,
    NoticeLevel, SessionEvent, SubscriptionId, ToolEvent,
};

pub use geometry::{Color, Point, Rect};
