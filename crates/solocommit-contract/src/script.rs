//! Minimal script push encoding.
//!
//! Constructor and function arguments are pushed with the shortest
//! encoding (`OP_0`, `OP_1`..`OP_16`, `OP_1NEGATE`, direct pushes, then
//! `OP_PUSHDATA1/2/4`). The bytes must match what the program's tooling
//! produces, or the redeem script hashes to a different address.

use solocommit_types::ConstructorArg;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;

/// Encode an integer as a minimal script number (little-endian, sign bit in
/// the top byte).
#[must_use]
pub fn encode_script_number(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let negative = value < 0;
    let magnitude = value.unsigned_abs().to_le_bytes();
    let used = magnitude.iter().rposition(|b| *b != 0).map_or(1, |i| i + 1);
    let mut out = Vec::with_capacity(used + 1);
    out.extend_from_slice(&magnitude[..used]);
    let last = used - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

/// Append a minimal push of `data` to `script`.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data {
        [] => script.push(OP_0),
        [n @ 1..=16] => script.push(OP_1 + *n - 1),
        [0x81] => script.push(OP_1NEGATE),
        _ => {
            let len = data.len();
            if let Ok(len @ 1..=75) = u8::try_from(len) {
                script.push(len);
            } else if let Ok(len) = u8::try_from(len) {
                script.push(OP_PUSHDATA1);
                script.push(len);
            } else if let Ok(len) = u16::try_from(len) {
                script.push(OP_PUSHDATA2);
                script.extend_from_slice(&len.to_le_bytes());
            } else {
                // Pushes are far below 4 GiB; redeem scripts cap at 520 bytes.
                let len = u32::try_from(len).unwrap_or(u32::MAX);
                script.push(OP_PUSHDATA4);
                script.extend_from_slice(&len.to_le_bytes());
            }
            script.extend_from_slice(data);
        }
    }
}

/// Append a minimal push of a script number.
pub fn push_int(script: &mut Vec<u8>, value: i64) {
    push_data(script, &encode_script_number(value));
}

/// Append a constructor argument.
pub fn push_arg(script: &mut Vec<u8>, arg: &ConstructorArg) {
    match arg {
        ConstructorArg::Bytes(bytes) => push_data(script, bytes),
        ConstructorArg::Int(value) => push_int(script, *value),
    }
}
