//! Streaming UTF-8 reassembly
//!
//! Bytes from the link arrive one at a time and a multi-byte character may
//! be split across reads. [`Utf8Assembly`] collects the lead byte and its
//! continuation bytes and hands back a whole [`Codepoint`] once the
//! sequence is complete. Unlike the buffered reader in [`crate::codepoint`],
//! continuation bytes are checked here: a corrupted sequence is thrown away.

use crate::codepoint::Codepoint;

/// Result of pushing one high-bit byte into the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Step {
    /// A full character is ready
    Complete(Codepoint),
    /// More continuation bytes are expected
    Pending,
    /// A bad continuation byte ended the sequence. The partial bytes and the
    /// offending byte are both dropped.
    Invalid { discarded: usize },
    /// A byte that cannot start a sequence (stray continuation or 0xF8+)
    Ignored,
}

/// Reassembly state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8Assembly {
    #[default]
    Idle,
    Partial {
        expected: u8,
        received: u8,
        bytes: [u8; 4],
    },
}

/// Expected sequence length for a lead byte, by bit mask
fn lead_len(byte: u8) -> Option<u8> {
    if byte & 0xE0 == 0xC0 {
        Some(2)
    } else if byte & 0xF0 == 0xE0 {
        Some(3)
    } else if byte & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl Utf8Assembly {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Feed one byte with the high bit set.
    pub fn push(&mut self, byte: u8) -> Utf8Step {
        match *self {
            Self::Idle => match lead_len(byte) {
                Some(expected) => {
                    let mut bytes = [0u8; 4];
                    bytes[0] = byte;
                    *self = Self::Partial {
                        expected,
                        received: 1,
                        bytes,
                    };
                    Utf8Step::Pending
                }
                None => Utf8Step::Ignored,
            },
            Self::Partial {
                expected,
                received,
                mut bytes,
            } => {
                if !is_continuation(byte) {
                    *self = Self::Idle;
                    return Utf8Step::Invalid {
                        discarded: received as usize + 1,
                    };
                }
                bytes[received as usize] = byte;
                let received = received + 1;
                if received < expected {
                    *self = Self::Partial {
                        expected,
                        received,
                        bytes,
                    };
                    return Utf8Step::Pending;
                }
                *self = Self::Idle;
                match Codepoint::from_bytes(&bytes[..expected as usize]) {
                    Some(cp) => Utf8Step::Complete(cp),
                    None => Utf8Step::Invalid {
                        discarded: expected as usize,
                    },
                }
            }
        }
    }

    /// Take whatever bytes have been collected so far and go idle.
    ///
    /// Used when a line ending interrupts a sequence.
    pub fn take_partial(&mut self) -> Vec<u8> {
        let taken = match *self {
            Self::Idle => Vec::new(),
            Self::Partial {
                received, bytes, ..
            } => bytes[..received as usize].to_vec(),
        };
        *self = Self::Idle;
        taken
    }
}
