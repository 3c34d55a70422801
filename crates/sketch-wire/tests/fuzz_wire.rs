// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property checks: arbitrary bytes never panic the decoder, random scenes round-trip.

use proptest::prelude::*;
use sketch_port::{Color, Command, Point};
use sketch_wire::{
    decode_into, encode_commands, ByteCursor, Framing, Recorder, WireConfig, WireError,
};

fn bare() -> WireConfig {
    WireConfig::default().with_prologue(false)
}

fn small_limits(framing: Framing) -> WireConfig {
    WireConfig {
        max_points: 4096,
        max_image_pixels: 4096,
        max_string_len: 64,
        ..bare().with_framing(framing)
    }
}

fn coord() -> impl Strategy<Value = f64> {
    any::<i16>().prop_map(|v| f64::from(v) / 4.0)
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Push),
        Just(Command::Pop),
        Just(Command::NoFill),
        any::<u32>().prop_map(|c| Command::Fill {
            color: Color::from_argb(c)
        }),
        (coord(), coord(), coord(), coord()).prop_map(|(x, y, width, height)| Command::Rect {
            x,
            y,
            width,
            height
        }),
        prop::collection::vec((coord(), coord()), 0..16).prop_map(|pts| Command::Polygon {
            points: pts.into_iter().map(Point::from).collect()
        }),
        ("[a-zA-Z0-9 ]{0,40}", coord(), coord()).prop_map(|(text, x, y)| Command::Text {
            text,
            x,
            y
        }),
    ]
}

proptest! {
    #[test]
    fn fuzz_decode_garbage_no_panics(bytes in prop::collection::vec(any::<u8>(), 0..1024)) {
        // Only checks that nothing panics or reads out of bounds.
        for framing in [Framing::Dense, Framing::LengthPrefixed] {
            let mut rec = Recorder::new();
            let _ = decode_into(&bytes, &small_limits(framing), &mut rec);
        }
    }

    #[test]
    fn fuzz_roundtrip_random_scenes(calls in prop::collection::vec(command(), 0..64)) {
        let bytes = encode_commands(&calls, &bare(), 1 << 16).unwrap();
        let mut rec = Recorder::new();
        let summary = decode_into(&bytes, &bare(), &mut rec).unwrap();
        prop_assert_eq!(summary.calls, calls.len());
        prop_assert_eq!(rec.commands(), calls.as_slice());
    }

    #[test]
    fn fuzz_truncated_scene_is_a_prefix(
        calls in prop::collection::vec(command(), 1..32),
        cut_seed in any::<prop::sample::Index>(),
    ) {
        let bytes = encode_commands(&calls, &bare(), 1 << 16).unwrap();
        let cut = cut_seed.index(bytes.len());
        let mut rec = Recorder::new();
        let result = decode_into(&bytes[..cut], &bare(), &mut rec);
        prop_assert_eq!(rec.commands(), &calls[..rec.len()]);
        if let Err(err) = result {
            let is_truncation = matches!(err, WireError::Truncation { .. });
            prop_assert!(is_truncation);
        }
    }

    #[test]
    fn fuzz_cursor_seek_clamps(len in 0usize..64, target in 0usize..128) {
        let bytes = vec![0u8; len];
        let mut c = ByteCursor::new(&bytes[..]);
        let result = c.seek(target);
        prop_assert_eq!(result.is_ok(), target <= len);
        prop_assert_eq!(c.position(), target.min(len));
        prop_assert!(c.remaining() <= len);
    }
}
