//! International Morse code table: letters and digits.

use super::Element;

/// `(character, code)` pairs, code spelled with `.` and `-`.
pub const MORSE_TABLE: [(char, &str); 36] = [
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
];

/// Character for a dot/dash sequence, if it is in the table.
pub fn lookup(code: &[Element]) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(_, pattern)| spells(pattern, code))
        .map(|(c, _)| *c)
}

/// Code for a character (case-insensitive), if it is in the table.
pub fn code_for(c: char) -> Option<&'static str> {
    let upper = c.to_ascii_uppercase();
    MORSE_TABLE
        .iter()
        .find(|(k, _)| *k == upper)
        .map(|(_, pattern)| *pattern)
}

fn spells(pattern: &str, code: &[Element]) -> bool {
    pattern.len() == code.len()
        && pattern
            .chars()
            .zip(code)
            .all(|(p, e)| p == e.as_char())
}
