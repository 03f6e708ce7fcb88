//! Message assembler: Morse symbols → text.
//!
//! Dots and dashes collect in a fixed-capacity code buffer. A character
//! gap looks the buffer up in the table; a word gap does the same and then
//! adds a space. Bad input never aborts the session: an unknown code or an
//! over-long run of elements leaves a single placeholder character in the
//! text and decoding carries on.

use core::fmt;

use heapless::{String, Vec};
use log::{debug, warn};
use serde::Serialize;

use super::{Element, MorseSymbol, table};
use crate::config::MorseConfig;
use crate::error::DecodeError;

/// Capacity of the code buffer. `MorseConfig::max_symbols` may not exceed it.
pub const MAX_CODE_LEN: usize = 8;

/// Longest message a session can hold; further characters are dropped.
pub const MESSAGE_CAPACITY: usize = 128;

// ---------------------------------------------------------------------------
// Decoded message
// ---------------------------------------------------------------------------

/// Final text of a decode session. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
    text: String<MESSAGE_CAPACITY>,
    anomalies: u16,
}

impl DecodedMessage {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of placeholder characters written into the text.
    pub fn anomalies(&self) -> u16 {
        self.anomalies
    }

    /// At least one real character (not a placeholder or space) decoded.
    pub fn has_content(&self, placeholder: char) -> bool {
        self.text.chars().any(|c| c != placeholder && c != ' ')
    }
}

impl fmt::Display for DecodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Accumulates symbols into a message.
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    buffer: Vec<Element, MAX_CODE_LEN>,
    message: String<MESSAGE_CAPACITY>,
    max_symbols: usize,
    placeholder: char,
    /// Overflowed this character; drop elements until the next gap.
    discarding: bool,
    anomalies: u16,
    truncated: bool,
}

impl MessageAssembler {
    pub fn new(cfg: &MorseConfig) -> Self {
        Self {
            buffer: Vec::new(),
            message: String::new(),
            max_symbols: cfg.max_symbols.clamp(1, MAX_CODE_LEN),
            placeholder: cfg.placeholder,
            discarding: false,
            anomalies: 0,
            truncated: false,
        }
    }

    /// Consume one symbol.
    ///
    /// Returns the character appended by a flush, if any. An `Err` reports
    /// an anomaly that has already been recovered from: the placeholder is
    /// in the text and the buffer is clear.
    pub fn push(&mut self, symbol: MorseSymbol) -> Result<Option<char>, DecodeError> {
        match symbol {
            MorseSymbol::Dot => self.push_element(Element::Dot),
            MorseSymbol::Dash => self.push_element(Element::Dash),
            MorseSymbol::CharGap => self.flush(),
            MorseSymbol::WordGap => {
                let flushed = self.flush();
                if !self.message.is_empty() && !self.message.ends_with(' ') {
                    self.append(' ');
                }
                flushed
            }
        }
    }

    /// Resolve whatever is in the code buffer into a character.
    pub fn flush(&mut self) -> Result<Option<char>, DecodeError> {
        self.discarding = false;
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let result = match table::lookup(&self.buffer) {
            Some(c) => {
                debug!("assembler: {} -> '{}'", self.pending_code(), c);
                self.append(c);
                Ok(Some(c))
            }
            None => {
                warn!("assembler: unrecognized code {}", self.pending_code());
                self.append_placeholder();
                Err(DecodeError::UnrecognizedCode)
            }
        };
        self.buffer.clear();
        result
    }

    /// Close the session: flush the buffer, drop a trailing space, and
    /// hand over the text.
    pub fn finalize(mut self) -> DecodedMessage {
        if let Err(e) = self.flush() {
            debug!("assembler: final flush recovered from {e}");
        }
        while self.message.ends_with(' ') {
            self.message.pop();
        }
        DecodedMessage {
            text: self.message,
            anomalies: self.anomalies,
        }
    }

    /// Text decoded so far.
    pub fn text(&self) -> &str {
        &self.message
    }

    /// Elements waiting for a gap.
    pub fn pending(&self) -> &[Element] {
        &self.buffer
    }

    /// Anything decoded or waiting to be decoded.
    pub fn has_content(&self) -> bool {
        !self.message.is_empty() || !self.buffer.is_empty()
    }

    pub fn anomalies(&self) -> u16 {
        self.anomalies
    }

    fn push_element(&mut self, element: Element) -> Result<Option<char>, DecodeError> {
        if self.discarding {
            return Ok(None);
        }
        if self.buffer.len() >= self.max_symbols || self.buffer.push(element).is_err() {
            warn!(
                "assembler: code {}{} exceeds {} elements, flushing",
                self.pending_code(),
                element.as_char(),
                self.max_symbols
            );
            self.buffer.clear();
            self.discarding = true;
            self.append_placeholder();
            return Err(DecodeError::BufferOverflow);
        }
        Ok(None)
    }

    fn append_placeholder(&mut self) {
        self.anomalies = self.anomalies.saturating_add(1);
        self.append(self.placeholder);
    }

    fn append(&mut self, c: char) {
        if self.message.push(c).is_err() && !self.truncated {
            warn!("assembler: message full at {MESSAGE_CAPACITY} bytes, dropping further text");
            self.truncated = true;
        }
    }

    fn pending_code(&self) -> String<MAX_CODE_LEN> {
        self.buffer.iter().map(|e| e.as_char()).collect()
    }
}
