// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Human-readable views of a stream: record table and hex dump.

use std::io::{self, Write};

use comfy_table::Table;
use serde_json::Value;
use sketch_port::Command;
use sketch_wire::{DecodeSummary, Decoder, Opcode, Record, Recorder, WireConfig, WireError};

/// Arrays longer than this are summarized instead of listed.
const MAX_LISTED: usize = 4;

/// One decoded record, formatted.
#[derive(Debug)]
pub struct Row {
    /// Byte offset of the record.
    pub offset: usize,
    /// Opcode name.
    pub opcode: String,
    /// `key=value` operands.
    pub args: String,
}

/// Result of decoding a whole stream for display.
#[derive(Debug)]
pub struct Inspection {
    /// Every record decoded before the end or the fault.
    pub rows: Vec<Row>,
    /// Counters.
    pub summary: DecodeSummary,
    /// Deepest push nesting.
    pub max_depth: usize,
    /// Whether pushes and pops matched.
    pub balanced: bool,
    /// What stopped decoding early, if anything.
    pub fault: Option<WireError>,
}

/// Decode `bytes` against a [`Recorder`], keeping a row per record.
pub fn inspect(bytes: &[u8], config: &WireConfig) -> Inspection {
    let mut decoder = Decoder::new(bytes, config.clone());
    let mut recorder = Recorder::new();
    let mut rows = Vec::new();
    let fault = loop {
        match decoder.next_record() {
            Ok(Some((offset, record))) => {
                let args = match &record {
                    Record::Command(command) => {
                        command.apply(&mut recorder);
                        describe(command)
                    }
                    Record::Skipped { len, .. } => format!("{len} bytes skipped"),
                    Record::Nop => String::new(),
                };
                rows.push(Row {
                    offset,
                    opcode: record_name(&record),
                    args,
                });
            }
            Ok(None) => break None,
            Err(err) => break Some(err),
        }
    };
    Inspection {
        rows,
        summary: DecodeSummary {
            calls: recorder.len(),
            ..decoder.summary()
        },
        max_depth: recorder.max_depth(),
        balanced: recorder.is_balanced(),
        fault,
    }
}

/// Write the record table and a one-line summary.
pub fn render(inspection: &Inspection, out: &mut impl Write) -> io::Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["offset", "opcode", "arguments"]);
    for row in &inspection.rows {
        table.add_row(vec![
            row.offset.to_string(),
            row.opcode.clone(),
            row.args.clone(),
        ]);
    }
    writeln!(out, "{table}")?;
    let s = &inspection.summary;
    writeln!(
        out,
        "{} records, {} calls, {} bytes, max push depth {}",
        s.records, s.calls, s.bytes, inspection.max_depth
    )?;
    if !inspection.balanced {
        writeln!(out, "warning: push/pop unbalanced")?;
    }
    Ok(())
}

/// Write one hex line group per record. Returns the fault, if any.
pub fn dump(
    bytes: &[u8],
    config: &WireConfig,
    out: &mut impl Write,
) -> io::Result<Option<WireError>> {
    let mut decoder = Decoder::new(bytes, config.clone());
    loop {
        let start = decoder.position();
        match decoder.next_record() {
            Ok(Some((offset, record))) => {
                let end = decoder.position();
                write_hex(out, offset, &record_name(&record), &bytes[offset..end])?;
            }
            Ok(None) => return Ok(None),
            Err(err) => {
                let tail = &bytes[start..bytes.len().min(start + 64)];
                write_hex(out, start, "<fault>", tail)?;
                writeln!(out, "fault: {err}")?;
                return Ok(Some(err));
            }
        }
    }
}

fn write_hex(out: &mut impl Write, offset: usize, label: &str, bytes: &[u8]) -> io::Result<()> {
    if bytes.is_empty() {
        return writeln!(out, "{offset:08x}  {label}");
    }
    for (i, line) in bytes.chunks(16).enumerate() {
        let words = line.chunks(4).map(hex::encode).collect::<Vec<_>>().join(" ");
        let label = if i == 0 { label } else { "" };
        writeln!(out, "{:08x}  {label:<14} {words}", offset + i * 16)?;
    }
    Ok(())
}

/// Display name of a record's opcode.
pub fn record_name(record: &Record) -> String {
    match record {
        Record::Nop => Opcode::Nop.name().to_owned(),
        Record::Command(command) => Opcode::of(command).name().to_owned(),
        Record::Skipped { value, .. } => Opcode::from_u32(*value)
            .map_or_else(|| format!("unknown({value:#x})"), |op| op.name().to_owned()),
    }
}

/// `key=value` rendering of a command's operands.
pub fn describe(command: &Command) -> String {
    let Ok(Value::Object(fields)) = serde_json::to_value(command) else {
        return String::new();
    };
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != "op")
        .map(|(key, value)| match (key.as_str(), value) {
            ("text" | "name", Value::String(s)) => format!("{key}={s:?}"),
            _ => format!("{key}={}", format_value(value)),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Array(items) if items.len() > MAX_LISTED => format!("[{} items]", items.len()),
        Value::Array(items) => {
            let inner: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => match (map.get("x"), map.get("y")) {
            (Some(x), Some(y)) if map.len() == 2 => format!("({x}, {y})"),
            _ => {
                let inner: Vec<_> = map
                    .iter()
                    .map(|(k, v)| format!("{k}={}", format_value(v)))
                    .collect();
                format!("{{{}}}", inner.join(" "))
            }
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
