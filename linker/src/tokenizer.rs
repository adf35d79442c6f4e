// whitespace tokenizer with line/column tracking

use std::fmt;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ErrCode {
    NumExpected,
    SymExpected,
    AddrExpected,
    SymTooLong,
    TooManyDefInModule,
    TooManyUseInModule,
    TooManyInstr,
    MarieExpected,
}

impl ErrCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrCode::NumExpected => "NUM_EXPECTED",
            ErrCode::SymExpected => "SYM_EXPECTED",
            ErrCode::AddrExpected => "ADDR_EXPECTED",
            ErrCode::SymTooLong => "SYM_TOO_LONG",
            ErrCode::TooManyDefInModule => "TOO_MANY_DEF_IN_MODULE",
            ErrCode::TooManyUseInModule => "TOO_MANY_USE_IN_MODULE",
            ErrCode::TooManyInstr => "TOO_MANY_INSTR",
            ErrCode::MarieExpected => "MARIE_EXPECTED",
        }
    }
}

/// A syntax error with the 1-based position of the offending token (or one
/// past the end of the last line when the input ran out).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ParseError {
    pub line: usize,
    pub offset: usize,
    pub code: ErrCode,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse Error line {} offset {}: {}",
            self.line,
            self.offset,
            self.code.as_str()
        )
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug)]
pub struct Token<'a> {
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
}

impl<'a> Token<'a> {
    pub fn error(&self, code: ErrCode) -> ParseError {
        ParseError {
            line: self.line,
            offset: self.column,
            code,
        }
    }
}

/// Walks the input one whitespace-delimited token at a time, tracking
/// `(line, column)` as plain cursor state.
pub struct Tokenizer<'a> {
    lines: Vec<&'a str>,
    line: usize,
    col: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            lines: input.lines().collect(),
            line: 0,
            col: 0,
        }
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        while self.line < self.lines.len() {
            let cur = self.lines[self.line].as_bytes();
            while self.col < cur.len() && cur[self.col].is_ascii_whitespace() {
                self.col += 1;
            }
            if self.col >= cur.len() {
                self.line += 1;
                self.col = 0;
                continue;
            }
            let start = self.col;
            while self.col < cur.len() && !cur[self.col].is_ascii_whitespace() {
                self.col += 1;
            }
            return Some(Token {
                text: &self.lines[self.line][start..self.col],
                line: self.line + 1,
                column: start + 1,
            });
        }
        None
    }

    /// Where an end-of-input error points: one past the final line's end.
    pub fn eof_error(&self, code: ErrCode) -> ParseError {
        let (line, offset) = match self.lines.last() {
            Some(last) => (self.lines.len(), last.len() + 1),
            None => (1, 1),
        };
        ParseError { line, offset, code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut t = Tokenizer::new("ab  cd\n\n  x 12\n");
        let tok = t.next_token().unwrap();
        assert_eq!((tok.text, tok.line, tok.column), ("ab", 1, 1));
        let tok = t.next_token().unwrap();
        assert_eq!((tok.text, tok.line, tok.column), ("cd", 1, 5));
        let tok = t.next_token().unwrap();
        assert_eq!((tok.text, tok.line, tok.column), ("x", 3, 3));
        let tok = t.next_token().unwrap();
        assert_eq!((tok.text, tok.line, tok.column), ("12", 3, 5));
        assert!(t.next_token().is_none());
    }

    #[test]
    fn eof_error_points_past_the_last_line() {
        let mut t = Tokenizer::new("1 xy\n2 z");
        while t.next_token().is_some() {}
        let e = t.eof_error(ErrCode::NumExpected);
        assert_eq!((e.line, e.offset), (2, 4));
        assert_eq!(e.to_string(), "Parse Error line 2 offset 4: NUM_EXPECTED");
    }

    #[test]
    fn empty_input_errors_at_origin() {
        let t = Tokenizer::new("");
        let e = t.eof_error(ErrCode::SymExpected);
        assert_eq!((e.line, e.offset), (1, 1));
    }
}
