//! # Event Bus Module
//!
//! Publish/subscribe channel between the editor core and whatever drives it.
//!
//! - The history manager publishes undo/redo availability
//! - The tool state machine publishes activations, rejections and notices
//! - Subscribers filter by category and receive events synchronously, or
//!   poll a tokio broadcast receiver from an async task
//!
//! ## Usage
//!
//! ```rust,ignore
//! use snapedit_core::event_bus::{EventBus, EventCategory, EventFilter, AppEvent};
//!
//! let bus = EventBus::new();
//! let sub = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::History]),
//!     |event| {
//!         if let AppEvent::History(h) = event {
//!             println!("{:?}", h);
//!         }
//!     },
//! );
//! bus.unsubscribe(sub);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
