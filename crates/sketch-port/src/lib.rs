// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Drawing port contract for sketch renderers.
//!
//! This crate defines the capability surface a renderer implements
//! ([`Graphics`]) and the value types that flow through it. It contains NO
//! wire logic; that lives in sketch-wire.
//!
//! # Design Principles
//!
//! - **Renderers own state**: fill, stroke, transform and the shape under
//!   construction live in the implementor, never in the caller.
//! - **Order is the contract**: calls are a total order; [`Command`] logs
//!   replay in sequence.
//! - **Precision is the caller's**: the port speaks `f64`; anything that
//!   narrows (the stream encoder) documents it.
//!
//! # Crate Features
//!
//! - `std` (default): Enables std library. Disable for no_std contexts.
//! - `serde`: Serialize/deserialize commands and value types (colors as
//!   `"#AARRGGBB"` strings).

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

mod color;
mod command;
mod port;
mod types;

pub use color::{Color, ColorParseError};
pub use command::{replay, Command};
pub use port::Graphics;
pub use types::{
    AngleMode, BlendMode, ColorStop, EndShape, Gradient, GradientKind, HAlign, Image, Pattern,
    Point, ShapeKind, ShapeMode, StrokeCap, StrokeJoin, VAlign,
};
