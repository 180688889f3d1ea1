//! Characters that may never appear in a HED string.

const C0_NAMES: [&str; 32] = [
    "NULL",
    "START OF HEADING",
    "START OF TEXT",
    "END OF TEXT",
    "END OF TRANSMISSION",
    "ENQUIRY",
    "ACKNOWLEDGE",
    "BELL",
    "BACKSPACE",
    "CHARACTER TABULATION",
    "LINE FEED",
    "LINE TABULATION",
    "FORM FEED",
    "CARRIAGE RETURN",
    "SHIFT OUT",
    "SHIFT IN",
    "DATA LINK ESCAPE",
    "DEVICE CONTROL ONE",
    "DEVICE CONTROL TWO",
    "DEVICE CONTROL THREE",
    "DEVICE CONTROL FOUR",
    "NEGATIVE ACKNOWLEDGE",
    "SYNCHRONOUS IDLE",
    "END OF TRANSMISSION BLOCK",
    "CANCEL",
    "END OF MEDIUM",
    "SUBSTITUTE",
    "ESCAPE",
    "INFORMATION SEPARATOR FOUR",
    "INFORMATION SEPARATOR THREE",
    "INFORMATION SEPARATOR TWO",
    "INFORMATION SEPARATOR ONE",
];

// 0x80..=0x9F
const C1_NAMES: [&str; 32] = [
    "PADDING CHARACTER",
    "HIGH OCTET PRESET",
    "BREAK PERMITTED HERE",
    "NO BREAK HERE",
    "INDEX",
    "NEXT LINE",
    "START OF SELECTED AREA",
    "END OF SELECTED AREA",
    "CHARACTER TABULATION SET",
    "CHARACTER TABULATION WITH JUSTIFICATION",
    "LINE TABULATION SET",
    "PARTIAL LINE FORWARD",
    "PARTIAL LINE BACKWARD",
    "REVERSE LINE FEED",
    "SINGLE SHIFT TWO",
    "SINGLE SHIFT THREE",
    "DEVICE CONTROL STRING",
    "PRIVATE USE ONE",
    "PRIVATE USE TWO",
    "SET TRANSMIT STATE",
    "CANCEL CHARACTER",
    "MESSAGE WAITING",
    "START OF GUARDED AREA",
    "END OF GUARDED AREA",
    "START OF STRING",
    "SINGLE GRAPHIC CHARACTER INTRODUCER",
    "SINGLE CHARACTER INTRODUCER",
    "CONTROL SEQUENCE INTRODUCER",
    "STRING TERMINATOR",
    "OPERATING SYSTEM COMMAND",
    "PRIVACY MESSAGE",
    "APPLICATION PROGRAM COMMAND",
];

/// Whether `c` is rejected wherever it appears.
pub(crate) fn is_invalid_character(c: char) -> bool {
    matches!(c, '[' | ']' | '~' | '"') || matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Unicode name of a character, for issue messages.
pub(crate) fn character_name(c: char) -> String {
    let code = c as u32;
    let name = match code {
        0x00..=0x1F => Some(C0_NAMES[code as usize]),
        0x7F => Some("DELETE"),
        0x80..=0x9F => Some(C1_NAMES[(code - 0x80) as usize]),
        _ => match c {
            '[' => Some("LEFT SQUARE BRACKET"),
            ']' => Some("RIGHT SQUARE BRACKET"),
            '~' => Some("TILDE"),
            '"' => Some("QUOTATION MARK"),
            '{' => Some("LEFT CURLY BRACKET"),
            '}' => Some("RIGHT CURLY BRACKET"),
            _ => None,
        },
    };
    name.map_or_else(|| format!("U+{code:04X}"), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_set() {
        for c in ['[', ']', '~', '"', '\0', '\t', '\n', '\u{7f}', '\u{85}', '\u{9f}'] {
            assert!(is_invalid_character(c), "{c:?}");
        }
        for c in ['a', ' ', '#', '{', '/', '\u{a0}', 'é'] {
            assert!(!is_invalid_character(c), "{c:?}");
        }
    }

    #[test]
    fn names() {
        assert_eq!(character_name('\t'), "CHARACTER TABULATION");
        assert_eq!(character_name('\u{7f}'), "DELETE");
        assert_eq!(character_name('\u{85}'), "NEXT LINE");
        assert_eq!(character_name('\u{9f}'), "APPLICATION PROGRAM COMMAND");
        assert_eq!(character_name('~'), "TILDE");
        assert_eq!(character_name('{'), "LEFT CURLY BRACKET");
        assert_eq!(character_name('é'), "U+00E9");
    }
}
