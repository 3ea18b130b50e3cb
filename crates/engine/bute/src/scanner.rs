//! Hand-written tokenizer for attribute-file sources
//!
//! Classifies the character stream into identifiers, numeric and
//! string literals, and the punctuation that delimits groups and
//! composite literals. Tracks the current line for diagnostics and
//! folds every consumed byte into a running FNV-1a checksum so two
//! loads of identical content can be compared cheaply.

use crate::{Error, Result};
use std::fmt;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 16_777_619;

/// Token classes produced by the scanner
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Group or attribute name
    Ident(String),
    /// Integer literal, range-checked by the parser
    Int(i64),
    /// Floating-point literal
    Float(f64),
    /// Quoted string literal, escapes resolved
    Str(String),
    Equals,       // =
    LBracket,     // [
    RBracket,     // ]
    LParen,       // (
    RParen,       // )
    LAngle,       // <
    RAngle,       // >
    Comma,        // ,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Int(i) => write!(f, "integer {}", i),
            Token::Float(v) => write!(f, "number {}", v),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::Equals => write!(f, "'='"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LAngle => write!(f, "'<'"),
            Token::RAngle => write!(f, "'>'"),
            Token::Comma => write!(f, "','"),
        }
    }
}

/// Tokenizer over a source string
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    checksum: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            checksum: FNV_OFFSET,
        }
    }

    /// Line of the most recently consumed character (1-indexed)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Running checksum over every byte consumed so far
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        self.checksum = (self.checksum ^ b as u32).wrapping_mul(FNV_PRIME);
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn lex_error(&self, message: impl Into<String>) -> Error {
        Error::Lex {
            line: self.line,
            message: message.into(),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'/') => {
                    if self.input.get(self.pos + 1) == Some(&b'/') {
                        while let Some(b) = self.advance() {
                            if b == b'\n' {
                                break;
                            }
                        }
                    } else {
                        return Err(self.lex_error("unexpected '/'"));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Advance exactly one token; `Ok(None)` means end of source.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace_and_comments()?;

        let Some(b) = self.peek() else {
            return Ok(None);
        };

        let tok = match b {
            b'=' => {
                self.advance();
                Token::Equals
            }
            b'[' => {
                self.advance();
                Token::LBracket
            }
            b']' => {
                self.advance();
                Token::RBracket
            }
            b'(' => {
                self.advance();
                Token::LParen
            }
            b')' => {
                self.advance();
                Token::RParen
            }
            b'<' => {
                self.advance();
                Token::LAngle
            }
            b'>' => {
                self.advance();
                Token::RAngle
            }
            b',' => {
                self.advance();
                Token::Comma
            }
            b'"' => self.scan_string()?,
            b'-' | b'+' | b'0'..=b'9' => self.scan_number()?,
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_ident(),
            other => {
                return Err(self.lex_error(format!("unexpected character '{}'", other as char)));
            }
        };

        Ok(Some(tok))
    }

    fn scan_ident(&mut self) -> Token {
        let mut name = String::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                name.push(b as char);
                self.advance();
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    fn scan_number(&mut self) -> Result<Token> {
        let mut text = String::new();
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            text.push(self.advance().unwrap() as char);
        }

        let mut is_float = false;
        let mut has_digits = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {
                    has_digits = true;
                    text.push(b as char);
                    self.advance();
                }
                b'.' if !is_float => {
                    is_float = true;
                    text.push('.');
                    self.advance();
                }
                b'e' | b'E' => {
                    is_float = true;
                    text.push(b as char);
                    self.advance();
                    if matches!(self.peek(), Some(b'-') | Some(b'+')) {
                        text.push(self.advance().unwrap() as char);
                    }
                }
                _ => break,
            }
        }

        if !has_digits {
            return Err(self.lex_error(format!("malformed numeric literal '{}'", text)));
        }

        if is_float {
            let v: f64 = text
                .parse()
                .map_err(|_| self.lex_error(format!("malformed numeric literal '{}'", text)))?;
            Ok(Token::Float(v))
        } else {
            let v: i64 = text
                .parse()
                .map_err(|_| self.lex_error(format!("integer literal '{}' out of range", text)))?;
            Ok(Token::Int(v))
        }
    }

    fn scan_string(&mut self) -> Result<Token> {
        let start_line = self.line;
        self.advance(); // opening quote

        let mut bytes = Vec::new();
        loop {
            match self.advance() {
                None | Some(b'\n') => {
                    return Err(Error::Lex {
                        line: start_line,
                        message: "unterminated string literal".to_string(),
                    });
                }
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(b'"') => bytes.push(b'"'),
                    Some(b'\\') => bytes.push(b'\\'),
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(other) => {
                        return Err(
                            self.lex_error(format!("unknown escape '\\{}'", other as char))
                        );
                    }
                    None => {
                        return Err(Error::Lex {
                            line: start_line,
                            message: "unterminated string literal".to_string(),
                        });
                    }
                },
                // Multi-byte UTF-8 passes through untouched; the input
                // was a valid str and we only split at ASCII bytes.
                Some(b) => bytes.push(b),
            }
        }

        let text = String::from_utf8(bytes)
            .map_err(|e| self.lex_error(format!("invalid utf-8 in string literal: {}", e)))?;
        Ok(Token::Str(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(src: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(src);
        let mut out = Vec::new();
        while let Some(tok) = scanner.next_token().unwrap() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn test_punctuation_and_idents() {
        let toks = all_tokens("[Weapon]\nDamage = 10");
        assert_eq!(
            toks,
            vec![
                Token::LBracket,
                Token::Ident("Weapon".to_string()),
                Token::RBracket,
                Token::Ident("Damage".to_string()),
                Token::Equals,
                Token::Int(10),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let toks = all_tokens("-12 3.5 +7 1e3 -2.5e-1");
        assert_eq!(
            toks,
            vec![
                Token::Int(-12),
                Token::Float(3.5),
                Token::Int(7),
                Token::Float(1000.0),
                Token::Float(-0.25),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let toks = all_tokens(r#""a \"b\" \\ \n""#);
        assert_eq!(toks, vec![Token::Str("a \"b\" \\ \n".to_string())]);
    }

    #[test]
    fn test_unterminated_string() {
        let mut scanner = Scanner::new("\"abc");
        assert!(matches!(
            scanner.next_token(),
            Err(Error::Lex { line: 1, .. })
        ));
    }

    #[test]
    fn test_comments_skipped() {
        let toks = all_tokens("// header comment\n5 // trailing\n6");
        assert_eq!(toks, vec![Token::Int(5), Token::Int(6)]);
    }

    #[test]
    fn test_line_tracking() {
        let mut scanner = Scanner::new("1\n2\n\"oops");
        scanner.next_token().unwrap();
        scanner.next_token().unwrap();
        match scanner.next_token() {
            Err(Error::Lex { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_checksum_determinism_and_sensitivity() {
        let run = |src: &str| {
            let mut s = Scanner::new(src);
            while s.next_token().unwrap().is_some() {}
            s.checksum()
        };
        assert_eq!(run("[A]\nB = 1"), run("[A]\nB = 1"));
        assert_ne!(run("[A]\nB = 1"), run("[A]\nB = 2"));
    }
}
