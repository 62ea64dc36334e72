//! Core types for datepick.
//!
//! This crate provides the selection engine behind a dual-calendar date picker:
//! - `calendar` module with the Persian and Gregorian calendar systems
//! - `engine` module with `DatePickerEngine`, which owns the selection state
//! - `registry` module with the shared outside-click dismissal registry

pub mod bridge;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod listener;
pub mod registry;
pub mod value;

pub use calendar::{Calendar, CalendarDate, CalendarSystem, MonthGrid};
pub use engine::DatePickerEngine;
pub use error::{PickerError, PickerResult};
pub use identity::Identity;
pub use value::{ComposedValue, Mode, TimeOfDay};
