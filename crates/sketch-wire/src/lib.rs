// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Binary command streams for sketch-port renderers.
//!
//! This crate provides:
//! - [`ByteCursor`], a bounds-checked endian-aware cursor over a fixed buffer
//! - the [`Opcode`] catalogue, the single owner of numeric wire values
//! - [`Encoder`], a [`sketch_port::Graphics`] that serializes calls
//! - [`Decoder`], which replays a stream onto any [`sketch_port::Graphics`]
//! - [`Recorder`], a headless renderer for tests and tooling
//!
//! # Wire format
//!
//! A stream is a sequence of records with no header. Each record is a `u32`
//! opcode followed by its operands: `f32` coordinates, `u32` colors packed
//! `0xAARRGGBB`, `u32` mode values, NUL-terminated strings, `u32`-counted point
//! lists and image blocks. Byte order and [`Framing`] are agreed out of band
//! through [`WireConfig`].
//!
//! # Crate Features
//!
//! - `serde`: Serialize/deserialize [`WireConfig`] and the port types.

mod config;
mod cursor;
mod decoder;
mod encoder;
mod error;
mod opcode;
mod recorder;

pub use config::{
    Framing, PaintFallback, WireConfig, DEFAULT_MAX_IMAGE_PIXELS, DEFAULT_MAX_POINTS,
    DEFAULT_MAX_STRING_LEN,
};
pub use cursor::{ByteCursor, CursorError, Endian, ZString};
pub use decoder::{decode_into, DecodeSummary, Decoder, DecoderState, Record};
pub use encoder::{encode_commands, prologue, Encoder};
pub use error::WireError;
pub use opcode::{Opcode, WireEnum};
pub use recorder::Recorder;
