//! Room code generation and validation
//!
//! Codes are six characters in `XXX-XXX` form, drawn from an alphabet with
//! the easily confused characters (I, O, 0, 1) removed. The relay treats
//! codes as opaque strings; this format exists so codes can be read aloud.

use rand::seq::SliceRandom;
use rand::Rng;

use ninefold_core::RoomId;

use crate::error::{CliError, Result};

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a fresh room code, e.g. `K7Q-M2X`.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
    let mut code = String::with_capacity(7);
    for i in 0..6 {
        if i == 3 {
            code.push('-');
        }
        // Alphabet is non-empty, choose cannot fail.
        let c = *ALPHABET.choose(rng).unwrap_or(&b'A');
        code.push(c as char);
    }
    RoomId::new(code)
}

/// Normalize user input into a room code, rejecting malformed ones.
pub fn parse_room_code(input: &str) -> Result<RoomId> {
    let upper = input.trim().to_ascii_uppercase();
    // The alphabet is pure ASCII, so anything else is malformed; checking up
    // front also keeps the byte slicing below on char boundaries.
    if !upper.is_ascii() {
        return Err(CliError::RoomCode(input.to_string()));
    }
    let normalized = match (upper.len(), upper.find('-')) {
        (7, Some(3)) => upper,
        // Accept the bare six characters and insert the dash.
        (6, None) => format!("{}-{}", &upper[..3], &upper[3..]),
        _ => return Err(CliError::RoomCode(input.to_string())),
    };
    let valid = normalized
        .bytes()
        .enumerate()
        .all(|(i, b)| if i == 3 { b == b'-' } else { ALPHABET.contains(&b) });
    if !valid {
        return Err(CliError::RoomCode(input.to_string()));
    }
    Ok(RoomId::new(normalized))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
