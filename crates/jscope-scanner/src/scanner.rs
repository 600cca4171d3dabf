//! The tokenizer state machine.
//!
//! The scanner owns the source text and advances one token per `scan()`
//! call. Trivia (whitespace and comments) is always skipped, but a line
//! break inside the skipped trivia is recorded on the following token
//! because automatic semicolon insertion needs it.
//!
//! Lexical errors never stop the scanner: an unterminated construct is
//! reported through the internal diagnostic list, the token is flagged
//! `UNTERMINATED`, and scanning continues so the parser always reaches end
//! of file.

use crate::token::TokenKind;
use bitflags::bitflags;
use jscope_common::diagnostics::{Diagnostic, ErrorKind};
use jscope_common::span::Span;

bitflags! {
    /// Per-token facts recorded while scanning.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        /// A line terminator occurred between the previous token and this one
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// The token ran into end of line/file before its closing delimiter
        const UNTERMINATED = 1 << 1;
        /// Numeric literal written in legacy octal form (e.g. `0755`)
        const LEGACY_OCTAL = 1 << 2;
    }
}

/// Saved scanner position for speculative parsing.
#[derive(Clone, Debug)]
pub struct ScannerCheckpoint {
    pos: usize,
    token: TokenKind,
    token_start: usize,
    token_flags: TokenFlags,
    token_value: String,
    regex_flags: String,
    numeric_value: f64,
    diagnostics_len: usize,
}

/// The tokenizer.
pub struct Scanner {
    text: Vec<u8>,
    source: String,
    pos: usize,
    token: TokenKind,
    token_start: usize,
    token_flags: TokenFlags,
    /// Cooked token text: identifier name, string value after escape
    /// processing, raw numeric text, or regex pattern.
    token_value: String,
    /// Flag characters of a regular expression literal.
    regex_flags: String,
    numeric_value: f64,
    diagnostics: Vec<Diagnostic>,
}

impl Scanner {
    /// Create a scanner over `source`. When `allow_shebang` is set, a
    /// leading `#!...` line is skipped; otherwise it is reported and skipped
    /// anyway so the rest of the file still parses.
    pub fn new(source: String, allow_shebang: bool) -> Scanner {
        let mut scanner = Scanner {
            text: source.as_bytes().to_vec(),
            source,
            pos: 0,
            token: TokenKind::Unknown,
            token_start: 0,
            token_flags: TokenFlags::empty(),
            token_value: String::new(),
            regex_flags: String::new(),
            numeric_value: 0.0,
            diagnostics: Vec::new(),
        };
        scanner.skip_shebang(allow_shebang);
        scanner
    }

    // =========================================================================
    // Token accessors
    // =========================================================================

    #[inline]
    pub fn token(&self) -> TokenKind {
        self.token
    }

    #[inline]
    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    #[inline]
    pub fn token_span(&self) -> Span {
        Span::from_bounds(self.token_start(), self.token_end())
    }

    /// Cooked text of the current token.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Flags portion of the current regular expression literal.
    #[inline]
    pub fn token_regex_flags(&self) -> &str {
        &self.regex_flags
    }

    /// Numeric value of the current numeric literal.
    #[inline]
    pub fn token_numeric_value(&self) -> f64 {
        self.numeric_value
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Drain lexical diagnostics collected since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // =========================================================================
    // Save / restore for speculative parsing
    // =========================================================================

    pub fn save_state(&self) -> ScannerCheckpoint {
        ScannerCheckpoint {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            token_flags: self.token_flags,
            token_value: self.token_value.clone(),
            regex_flags: self.regex_flags.clone(),
            numeric_value: self.numeric_value,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, checkpoint: ScannerCheckpoint) {
        self.pos = checkpoint.pos;
        self.token = checkpoint.token;
        self.token_start = checkpoint.token_start;
        self.token_flags = checkpoint.token_flags;
        self.token_value = checkpoint.token_value;
        self.regex_flags = checkpoint.regex_flags;
        self.numeric_value = checkpoint.numeric_value;
        // Diagnostics raised during an abandoned speculation are withdrawn.
        self.diagnostics.truncate(checkpoint.diagnostics_len);
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Advance to the next token and return its kind.
    pub fn scan(&mut self) -> TokenKind {
        self.token_flags = TokenFlags::empty();
        self.skip_trivia();
        self.token_start = self.pos;
        self.token_value.clear();
        self.regex_flags.clear();

        let Some(&byte) = self.text.get(self.pos) else {
            self.token = TokenKind::EndOfFileToken;
            return self.token;
        };

        self.token = match byte {
            b'{' => self.single(TokenKind::OpenBraceToken),
            b'}' => self.single(TokenKind::CloseBraceToken),
            b'(' => self.single(TokenKind::OpenParenToken),
            b')' => self.single(TokenKind::CloseParenToken),
            b'[' => self.single(TokenKind::OpenBracketToken),
            b']' => self.single(TokenKind::CloseBracketToken),
            b';' => self.single(TokenKind::SemicolonToken),
            b',' => self.single(TokenKind::CommaToken),
            b'~' => self.single(TokenKind::TildeToken),
            b':' => self.single(TokenKind::ColonToken),
            b'?' => self.single(TokenKind::QuestionToken),
            b'.' => {
                if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.single(TokenKind::DotToken)
                }
            }
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_exclamation(),
            b'+' => self.pick3(b'+', TokenKind::PlusPlusToken, TokenKind::PlusEqualsToken, TokenKind::PlusToken),
            b'-' => self.pick3(b'-', TokenKind::MinusMinusToken, TokenKind::MinusEqualsToken, TokenKind::MinusToken),
            b'*' => self.pick_eq(TokenKind::AsteriskEqualsToken, TokenKind::AsteriskToken),
            b'/' => self.pick_eq(TokenKind::SlashEqualsToken, TokenKind::SlashToken),
            b'%' => self.pick_eq(TokenKind::PercentEqualsToken, TokenKind::PercentToken),
            b'^' => self.pick_eq(TokenKind::CaretEqualsToken, TokenKind::CaretToken),
            b'&' => self.pick3(b'&', TokenKind::AmpersandAmpersandToken, TokenKind::AmpersandEqualsToken, TokenKind::AmpersandToken),
            b'|' => self.pick3(b'|', TokenKind::BarBarToken, TokenKind::BarEqualsToken, TokenKind::BarToken),
            b'"' | b'\'' => self.scan_string(byte),
            b'0'..=b'9' => self.scan_number(),
            _ if is_identifier_start(byte) => self.scan_identifier(),
            _ => {
                self.pos += 1;
                self.report(
                    ErrorKind::UnexpectedToken,
                    format!("unexpected character '{}'", self.source[self.token_start..self.pos].escape_debug()),
                );
                TokenKind::Unknown
            }
        };
        self.token
    }

    /// Re-scan a `/` or `/=` token as the start of a regular expression
    /// literal. Called by the parser when division would be a parse error at
    /// the current position.
    pub fn rescan_slash_as_regex(&mut self) -> TokenKind {
        debug_assert!(matches!(
            self.token,
            TokenKind::SlashToken | TokenKind::SlashEqualsToken
        ));
        self.pos = self.token_start;
        self.token_value.clear();
        self.regex_flags.clear();

        // Opening slash.
        self.pos += 1;
        let body_start = self.pos;
        let mut in_class = false;
        let mut terminated = false;
        while let Some(&byte) = self.text.get(self.pos) {
            match byte {
                b'\\' => {
                    self.pos += 2.min(self.text.len() - self.pos);
                    continue;
                }
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => {
                    terminated = true;
                    break;
                }
                b'\n' | b'\r' => break,
                _ => {}
            }
            self.pos += 1;
        }

        self.token_value
            .push_str(&self.source[body_start..self.pos]);
        if terminated {
            self.pos += 1; // closing slash
            let flags_start = self.pos;
            while self
                .text
                .get(self.pos)
                .is_some_and(|&b| is_identifier_part(b))
            {
                self.pos += 1;
            }
            self.regex_flags
                .push_str(&self.source[flags_start..self.pos]);
        } else {
            self.token_flags |= TokenFlags::UNTERMINATED;
            self.report(
                ErrorKind::UnterminatedRegExp,
                "unterminated regular expression literal".to_string(),
            );
        }

        self.token = TokenKind::RegularExpressionLiteral;
        self.token
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    fn skip_shebang(&mut self, allowed: bool) {
        if self.text.starts_with(b"#!") {
            let end = self
                .text
                .iter()
                .position(|&b| b == b'\n' || b == b'\r')
                .unwrap_or(self.text.len());
            if !allowed {
                self.diagnostics.push(Diagnostic::new(
                    ErrorKind::ShebangNotAllowed,
                    Span::from_bounds(0, end as u32),
                    "shebang line is not allowed here",
                ));
            }
            self.pos = end;
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.text.get(self.pos) {
                Some(b' ' | b'\t' | 0x0b | 0x0c) => self.pos += 1,
                Some(b'\n' | b'\r') => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                Some(b'/') => match self.peek_at(1) {
                    Some(b'/') => {
                        self.pos += 2;
                        while self
                            .text
                            .get(self.pos)
                            .is_some_and(|&b| b != b'\n' && b != b'\r')
                        {
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        let comment_start = self.pos;
                        self.pos += 2;
                        let mut closed = false;
                        while self.pos < self.text.len() {
                            if self.text[self.pos] == b'\n' || self.text[self.pos] == b'\r' {
                                self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                            }
                            if self.text[self.pos] == b'*' && self.peek_at(1) == Some(b'/') {
                                self.pos += 2;
                                closed = true;
                                break;
                            }
                            self.pos += 1;
                        }
                        if !closed {
                            self.diagnostics.push(Diagnostic::new(
                                ErrorKind::UnterminatedComment,
                                Span::from_bounds(comment_start as u32, self.pos as u32),
                                "unterminated block comment",
                            ));
                        }
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    // =========================================================================
    // Token scanners
    // =========================================================================

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// `X=` vs `X` for single-character operators.
    fn pick_eq(&mut self, with_eq: TokenKind, without: TokenKind) -> TokenKind {
        self.pos += 1;
        if self.text.get(self.pos) == Some(&b'=') {
            self.pos += 1;
            with_eq
        } else {
            without
        }
    }

    /// `XX` vs `X=` vs `X` (for `+ - & |`).
    fn pick3(&mut self, double: u8, doubled: TokenKind, with_eq: TokenKind, plain: TokenKind) -> TokenKind {
        self.pos += 1;
        match self.text.get(self.pos) {
            Some(&b) if b == double => {
                self.pos += 1;
                doubled
            }
            Some(b'=') => {
                self.pos += 1;
                with_eq
            }
            _ => plain,
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.pos += 1;
        match self.text.get(self.pos) {
            Some(b'=') => self.single(TokenKind::LessThanEqualsToken),
            Some(b'<') => self.pick_eq(
                TokenKind::LessThanLessThanEqualsToken,
                TokenKind::LessThanLessThanToken,
            ),
            _ => TokenKind::LessThanToken,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        self.pos += 1;
        match self.text.get(self.pos) {
            Some(b'=') => self.single(TokenKind::GreaterThanEqualsToken),
            Some(b'>') => {
                self.pos += 1;
                match self.text.get(self.pos) {
                    Some(b'=') => self.single(TokenKind::GreaterThanGreaterThanEqualsToken),
                    Some(b'>') => self.pick_eq(
                        TokenKind::GreaterThanGreaterThanGreaterThanEqualsToken,
                        TokenKind::GreaterThanGreaterThanGreaterThanToken,
                    ),
                    _ => TokenKind::GreaterThanGreaterThanToken,
                }
            }
            _ => TokenKind::GreaterThanToken,
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.pos += 1;
        match self.text.get(self.pos) {
            Some(b'=') => self.pick_eq(
                TokenKind::EqualsEqualsEqualsToken,
                TokenKind::EqualsEqualsToken,
            ),
            Some(b'>') => self.single(TokenKind::EqualsGreaterThanToken),
            _ => TokenKind::EqualsToken,
        }
    }

    fn scan_exclamation(&mut self) -> TokenKind {
        self.pos += 1;
        match self.text.get(self.pos) {
            Some(b'=') => self.pick_eq(
                TokenKind::ExclamationEqualsEqualsToken,
                TokenKind::ExclamationEqualsToken,
            ),
            _ => TokenKind::ExclamationToken,
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        while self
            .text
            .get(self.pos)
            .is_some_and(|&b| is_identifier_part(b))
        {
            self.pos += 1;
        }
        self.token_value
            .push_str(&self.source[self.token_start..self.pos]);
        TokenKind::keyword(&self.token_value).unwrap_or(TokenKind::Identifier)
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.pos;

        // Hex: 0x / 0X
        if self.text[self.pos] == b'0'
            && matches!(self.peek_at(1), Some(b'x' | b'X'))
        {
            self.pos += 2;
            let digits_start = self.pos;
            while self
                .text
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_hexdigit())
            {
                self.pos += 1;
            }
            if self.pos == digits_start {
                self.report(
                    ErrorKind::BadNumericLiteral,
                    "hexadecimal literal has no digits".to_string(),
                );
                self.numeric_value = f64::NAN;
            } else {
                self.numeric_value = u64::from_str_radix(&self.source[digits_start..self.pos], 16)
                    .map(|v| v as f64)
                    .unwrap_or(f64::INFINITY);
            }
            self.token_value.push_str(&self.source[start..self.pos]);
            return TokenKind::NumericLiteral;
        }

        // Legacy octal: a leading 0 followed only by octal digits.
        if self.text[self.pos] == b'0'
            && self.peek_at(1).is_some_and(|b| (b'0'..=b'7').contains(&b))
        {
            let digits_start = self.pos + 1;
            let mut end = digits_start;
            while self
                .text
                .get(end)
                .is_some_and(|&b| (b'0'..=b'7').contains(&b))
            {
                end += 1;
            }
            // `09`, `0.5`, `08e2` fall through to decimal scanning below.
            let next = self.text.get(end);
            if !next.is_some_and(|&b| b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E') {
                self.pos = end;
                self.token_flags |= TokenFlags::LEGACY_OCTAL;
                self.numeric_value = u64::from_str_radix(&self.source[digits_start..end], 8)
                    .map(|v| v as f64)
                    .unwrap_or(f64::INFINITY);
                self.token_value.push_str(&self.source[start..self.pos]);
                self.report(
                    ErrorKind::OctalLiteralDeprecated,
                    "octal literals are deprecated".to_string(),
                );
                return TokenKind::NumericLiteral;
            }
        }

        // Decimal: digits [. digits] [e [+-] digits]
        while self.text.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.text.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            while self.text.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.text.get(self.pos), Some(b'e' | b'E')) {
            let exp_start = self.pos;
            self.pos += 1;
            if matches!(self.text.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.text.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                while self.text.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                // `1e` with no exponent digits: report and back out of the
                // exponent so `1e` scans as `1` followed by an identifier.
                self.pos = exp_start;
                self.report(
                    ErrorKind::BadNumericLiteral,
                    "exponent has no digits".to_string(),
                );
            }
        }

        self.token_value.push_str(&self.source[start..self.pos]);
        self.numeric_value = self.token_value.parse().unwrap_or(f64::NAN);
        TokenKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: u8) -> TokenKind {
        self.pos += 1;
        loop {
            match self.text.get(self.pos) {
                None | Some(b'\n' | b'\r') => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    self.report(
                        ErrorKind::UnterminatedString,
                        "unterminated string literal".to_string(),
                    );
                    break;
                }
                Some(&b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => self.scan_escape(),
                Some(&b) if b < 0x80 => {
                    self.token_value.push(b as char);
                    self.pos += 1;
                }
                _ => {
                    // Multi-byte UTF-8 sequence; copy it through verbatim.
                    let ch_start = self.pos;
                    self.pos += 1;
                    while self.text.get(self.pos).is_some_and(|&b| b & 0xc0 == 0x80) {
                        self.pos += 1;
                    }
                    self.token_value.push_str(&self.source[ch_start..self.pos]);
                }
            }
        }
        TokenKind::StringLiteral
    }

    fn scan_escape(&mut self) {
        self.pos += 1; // backslash
        let Some(&byte) = self.text.get(self.pos) else {
            return;
        };
        self.pos += 1;
        match byte {
            b'n' => self.token_value.push('\n'),
            b't' => self.token_value.push('\t'),
            b'r' => self.token_value.push('\r'),
            b'b' => self.token_value.push('\u{8}'),
            b'f' => self.token_value.push('\u{c}'),
            b'v' => self.token_value.push('\u{b}'),
            b'0' if !self.text.get(self.pos).is_some_and(|b| b.is_ascii_digit()) => {
                self.token_value.push('\0');
            }
            b'x' => {
                if let Some(ch) = self.scan_hex_escape(2) {
                    self.token_value.push(ch);
                }
            }
            b'u' => {
                if let Some(ch) = self.scan_hex_escape(4) {
                    self.token_value.push(ch);
                }
            }
            // Escaped line terminator: a line continuation, contributes nothing.
            b'\n' => {}
            b'\r' => {
                if self.text.get(self.pos) == Some(&b'\n') {
                    self.pos += 1;
                }
            }
            _ => {
                // Identity escape; non-ASCII lead bytes handled as their
                // whole sequence.
                if byte < 0x80 {
                    self.token_value.push(byte as char);
                } else {
                    let ch_start = self.pos - 1;
                    while self.text.get(self.pos).is_some_and(|&b| b & 0xc0 == 0x80) {
                        self.pos += 1;
                    }
                    self.token_value.push_str(&self.source[ch_start..self.pos]);
                }
            }
        }
    }

    fn scan_hex_escape(&mut self, digits: usize) -> Option<char> {
        let start = self.pos;
        for _ in 0..digits {
            if !self
                .text
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_hexdigit())
            {
                return None;
            }
            self.pos += 1;
        }
        u32::from_str_radix(&self.source[start..self.pos], 16)
            .ok()
            .and_then(char::from_u32)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.get(self.pos + offset).copied()
    }

    fn report(&mut self, kind: ErrorKind, message: String) {
        let span = Span::from_bounds(self.token_start as u32, self.pos as u32);
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }
}

#[inline]
fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

#[inline]
fn is_identifier_part(byte: u8) -> bool {
    is_identifier_start(byte) || byte.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(text: &str) -> Scanner {
        Scanner::new(text.to_string(), false)
    }

    #[test]
    fn test_scan_empty() {
        let mut s = scanner("");
        assert_eq!(s.scan(), TokenKind::EndOfFileToken);
    }

    #[test]
    fn test_scan_punctuation() {
        let mut s = scanner("{}()[];,");
        assert_eq!(s.scan(), TokenKind::OpenBraceToken);
        assert_eq!(s.scan(), TokenKind::CloseBraceToken);
        assert_eq!(s.scan(), TokenKind::OpenParenToken);
        assert_eq!(s.scan(), TokenKind::CloseParenToken);
        assert_eq!(s.scan(), TokenKind::OpenBracketToken);
        assert_eq!(s.scan(), TokenKind::CloseBracketToken);
        assert_eq!(s.scan(), TokenKind::SemicolonToken);
        assert_eq!(s.scan(), TokenKind::CommaToken);
    }

    #[test]
    fn test_scan_compound_operators() {
        let mut s = scanner("=== !== == != >>> >>>= && ||");
        assert_eq!(s.scan(), TokenKind::EqualsEqualsEqualsToken);
        assert_eq!(s.scan(), TokenKind::ExclamationEqualsEqualsToken);
        assert_eq!(s.scan(), TokenKind::EqualsEqualsToken);
        assert_eq!(s.scan(), TokenKind::ExclamationEqualsToken);
        assert_eq!(s.scan(), TokenKind::GreaterThanGreaterThanGreaterThanToken);
        assert_eq!(
            s.scan(),
            TokenKind::GreaterThanGreaterThanGreaterThanEqualsToken
        );
        assert_eq!(s.scan(), TokenKind::AmpersandAmpersandToken);
        assert_eq!(s.scan(), TokenKind::BarBarToken);
    }

    #[test]
    fn test_scan_keywords_and_identifiers() {
        let mut s = scanner("var foo let of");
        assert_eq!(s.scan(), TokenKind::VarKeyword);
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert_eq!(s.token_value(), "foo");
        // Contextual words stay identifiers.
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert_eq!(s.token_value(), "let");
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert_eq!(s.token_value(), "of");
    }

    #[test]
    fn test_scan_string_with_escapes() {
        let mut s = scanner(r#""a\n\x41B""#);
        assert_eq!(s.scan(), TokenKind::StringLiteral);
        assert_eq!(s.token_value(), "a\nAB");
    }

    #[test]
    fn test_unterminated_string_recovers() {
        let mut s = scanner("\"abc\nvar");
        assert_eq!(s.scan(), TokenKind::StringLiteral);
        assert!(s.token_flags().contains(TokenFlags::UNTERMINATED));
        assert_eq!(s.take_diagnostics().len(), 1);
        assert_eq!(s.scan(), TokenKind::VarKeyword);
    }

    #[test]
    fn test_scan_numbers() {
        let mut s = scanner("42 3.14 .5 1e3 0xFF 0755");
        assert_eq!(s.scan(), TokenKind::NumericLiteral);
        assert_eq!(s.token_numeric_value(), 42.0);
        assert_eq!(s.scan(), TokenKind::NumericLiteral);
        assert_eq!(s.token_numeric_value(), 3.14);
        assert_eq!(s.scan(), TokenKind::NumericLiteral);
        assert_eq!(s.token_numeric_value(), 0.5);
        assert_eq!(s.scan(), TokenKind::NumericLiteral);
        assert_eq!(s.token_numeric_value(), 1000.0);
        assert_eq!(s.scan(), TokenKind::NumericLiteral);
        assert_eq!(s.token_numeric_value(), 255.0);
        assert_eq!(s.scan(), TokenKind::NumericLiteral);
        assert_eq!(s.token_numeric_value(), 493.0);
        assert!(s.token_flags().contains(TokenFlags::LEGACY_OCTAL));
    }

    #[test]
    fn test_preceding_line_break() {
        let mut s = scanner("a\nb c");
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert!(!s.has_preceding_line_break());
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert!(s.has_preceding_line_break());
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert!(!s.has_preceding_line_break());
    }

    #[test]
    fn test_comments_skipped() {
        let mut s = scanner("a // one\n/* two\nthree */ b");
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert_eq!(s.scan(), TokenKind::Identifier);
        assert_eq!(s.token_value(), "b");
        assert!(s.has_preceding_line_break());
    }

    #[test]
    fn test_regex_rescan() {
        let mut s = scanner("/ab[c/]d/gi");
        assert_eq!(s.scan(), TokenKind::SlashToken);
        assert_eq!(
            s.rescan_slash_as_regex(),
            TokenKind::RegularExpressionLiteral
        );
        assert_eq!(s.token_value(), "ab[c/]d");
        assert_eq!(s.token_regex_flags(), "gi");
        assert_eq!(s.scan(), TokenKind::EndOfFileToken);
    }

    #[test]
    fn test_save_restore() {
        let mut s = scanner("a b c");
        s.scan();
        let checkpoint = s.save_state();
        s.scan();
        assert_eq!(s.token_value(), "b");
        s.restore_state(checkpoint);
        assert_eq!(s.token_value(), "a");
        s.scan();
        assert_eq!(s.token_value(), "b");
    }

    #[test]
    fn test_shebang() {
        let mut s = Scanner::new("#!/usr/bin/env node\nvar x;".to_string(), true);
        assert_eq!(s.scan(), TokenKind::VarKeyword);
        assert!(s.take_diagnostics().is_empty());

        let mut s = Scanner::new("#! node\nvar x;".to_string(), false);
        assert_eq!(s.scan(), TokenKind::VarKeyword);
        assert_eq!(s.take_diagnostics().len(), 1);
    }
}
