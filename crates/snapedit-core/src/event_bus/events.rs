//! Event type definitions for the event bus.
//!
//! This module defines all editor events organized by category.
//! Events are designed to be cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

/// Root event enum for all editor events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Undo/redo availability and restore progress
    History(HistoryEvent),
    /// Tool activation and rejection
    Tool(ToolEvent),
    /// Per-session milestones (flatten, crop commit, segmentation)
    Session(SessionEvent),
    /// User-visible messages
    Notice {
        /// Severity of the message.
        level: NoticeLevel,
        /// The message text.
        message: String,
    },
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::History(_) => EventCategory::History,
            AppEvent::Tool(_) => EventCategory::Tool,
            AppEvent::Session(_) => EventCategory::Session,
            AppEvent::Notice { .. } => EventCategory::Notice,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::History(e) => e.description(),
            AppEvent::Tool(e) => e.description(),
            AppEvent::Session(e) => e.description(),
            AppEvent::Notice { level, message } => format!("[{}] {}", level, message),
        }
    }

    /// Convenience constructor for an informational notice
    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        AppEvent::Notice {
            level,
            message: message.into(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// History events.
    History,
    /// Tool activation events.
    Tool,
    /// Session milestone events.
    Session,
    /// User-visible notices.
    Notice,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::History => write!(f, "History"),
            EventCategory::Tool => write!(f, "Tool"),
            EventCategory::Session => write!(f, "Session"),
            EventCategory::Notice => write!(f, "Notice"),
        }
    }
}

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// History-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// Undo/redo availability changed.
    Changed {
        /// Whether an undo step is available.
        can_undo: bool,
        /// Whether a redo step is available.
        can_redo: bool,
        /// Number of snapshots held.
        depth: usize,
    },
    /// A restore began; pushes are suppressed until it finishes.
    RestoreStarted {
        /// Cursor position being restored.
        index: usize,
    },
    /// The in-flight restore completed.
    RestoreFinished {
        /// Cursor position that was restored.
        index: usize,
    },
    /// The stack was emptied.
    Cleared,
}

impl HistoryEvent {
    fn description(&self) -> String {
        match self {
            HistoryEvent::Changed {
                can_undo,
                can_redo,
                depth,
            } => format!(
                "History depth {} (undo: {}, redo: {})",
                depth, can_undo, can_redo
            ),
            HistoryEvent::RestoreStarted { index } => format!("Restoring snapshot {}", index),
            HistoryEvent::RestoreFinished { index } => format!("Restored snapshot {}", index),
            HistoryEvent::Cleared => "History cleared".to_string(),
        }
    }
}

/// Tool state machine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolEvent {
    /// A tool became active.
    Activated {
        /// Name of the new tool.
        tool: String,
        /// Name of the tool that was left.
        previous: String,
    },
    /// An activation request was refused.
    Rejected {
        /// Name of the requested tool.
        tool: String,
        /// Why it was refused.
        reason: String,
    },
}

impl ToolEvent {
    fn description(&self) -> String {
        match self {
            ToolEvent::Activated { tool, previous } => {
                format!("Tool: {} -> {}", previous, tool)
            }
            ToolEvent::Rejected { tool, reason } => {
                format!("Tool {} rejected: {}", tool, reason)
            }
        }
    }
}

/// Session milestone events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Composite layers were merged into one raster.
    Flattened {
        /// Tool whose layers were merged.
        tool: String,
    },
    /// Flattening was skipped because the layout did not match.
    FlattenSkipped {
        /// Tool being left.
        tool: String,
        /// The layout mismatch.
        reason: String,
    },
    /// A crop was committed.
    CropCommitted {
        /// New canvas width in pixels.
        width: u32,
        /// New canvas height in pixels.
        height: u32,
    },
    /// A segmentation request was issued.
    SegmentationStarted {
        /// Request ticket.
        ticket: u64,
    },
    /// A segmentation request completed.
    SegmentationFinished {
        /// Request ticket.
        ticket: u64,
        /// Round trip in milliseconds.
        elapsed_ms: u64,
    },
    /// A segmentation request failed or timed out.
    SegmentationFailed {
        /// Request ticket.
        ticket: u64,
        /// Failure message.
        error: String,
    },
    /// A layered composite was (re)applied.
    CompositeApplied {
        /// Tool that produced the composite.
        tool: String,
    },
}

impl SessionEvent {
    fn description(&self) -> String {
        match self {
            SessionEvent::Flattened { tool } => format!("Flattened {} layers", tool),
            SessionEvent::FlattenSkipped { tool, reason } => {
                format!("Skipped flattening {}: {}", tool, reason)
            }
            SessionEvent::CropCommitted { width, height } => {
                format!("Cropped to {}x{}", width, height)
            }
            SessionEvent::SegmentationStarted { ticket } => {
                format!("Segmentation #{} started", ticket)
            }
            SessionEvent::SegmentationFinished { ticket, elapsed_ms } => {
                format!("Segmentation #{} finished in {}ms", ticket, elapsed_ms)
            }
            SessionEvent::SegmentationFailed { ticket, error } => {
                format!("Segmentation #{} failed: {}", ticket, error)
            }
            SessionEvent::CompositeApplied { tool } => format!("{} composite applied", tool),
        }
    }
}
