//! Recursive-descent parser for attribute-file sources
//!
//! Grammar, two levels deep:
//!
//! ```text
//! source    := (group)*
//! group     := '[' IDENT ']' (attribute)*
//! attribute := IDENT '=' literal
//! literal   := INT | FLOAT | STRING
//!            | '(' num ',' num ')'                      point
//!            | '(' num ',' num ',' num ',' num ')'      rect
//!            | '<' num ',' num ',' num '>'              vector
//!            | '[' num ',' num ']'                      range
//! ```
//!
//! A `[` only means a range literal after `=`, so it never clashes
//! with a group header. Duplicate attributes within a group overwrite
//! (last one wins); duplicate group headers merge into one group.

use crate::scanner::{Scanner, Token};
use crate::table::ButeFile;
use crate::value::{Point, Range, Rect, Value};
use crate::{Error, Result};
use glam::Vec3;

pub(crate) struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Result<Self> {
        let mut scanner = Scanner::new(src);
        let current = scanner.next_token()?;
        Ok(Parser { scanner, current })
    }

    /// Consume the whole source into `file`'s base tables, returning
    /// the checksum of the scanned bytes.
    pub fn parse_into(mut self, file: &mut ButeFile) -> Result<u32> {
        while self.current.is_some() {
            self.parse_group(file)?;
        }
        Ok(self.scanner.checksum())
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.scanner.next_token()?;
        Ok(())
    }

    fn syntax_error(&self, expected: &str) -> Error {
        let found = match &self.current {
            Some(tok) => tok.to_string(),
            None => "end of source".to_string(),
        };
        Error::Syntax {
            line: self.scanner.line(),
            expected: expected.to_string(),
            found,
        }
    }

    /// Consume the current token if it matches, else fail without
    /// consuming anything.
    fn expect(&mut self, tok: Token, expected: &str) -> Result<()> {
        if self.current.as_ref() == Some(&tok) {
            self.advance()
        } else {
            Err(self.syntax_error(expected))
        }
    }

    fn take_ident(&mut self, what: &str) -> Result<String> {
        match self.current.take() {
            Some(Token::Ident(name)) => {
                self.advance()?;
                Ok(name)
            }
            other => {
                self.current = other;
                Err(self.syntax_error(what))
            }
        }
    }

    fn parse_group(&mut self, file: &mut ButeFile) -> Result<()> {
        self.expect(Token::LBracket, "'[' starting a group header")?;
        let tag = self.take_ident("group name")?;
        self.expect(Token::RBracket, "']' closing the group header")?;

        // A header with no attributes still creates the group.
        file.touch_base_group(&tag);

        while matches!(self.current, Some(Token::Ident(_))) {
            self.parse_attribute(file, &tag)?;
        }
        Ok(())
    }

    fn parse_attribute(&mut self, file: &mut ButeFile, tag: &str) -> Result<()> {
        let name = self.take_ident("attribute name")?;
        self.expect(Token::Equals, "'='")?;
        let value = self.parse_literal(file)?;
        file.insert_base(tag, &name, value);
        Ok(())
    }

    fn parse_literal(&mut self, file: &mut ButeFile) -> Result<Value> {
        match self.current.clone() {
            Some(Token::Int(i)) => {
                self.advance()?;
                if let Ok(v) = i32::try_from(i) {
                    Ok(Value::Int(v))
                } else if let Ok(v) = u32::try_from(i) {
                    Ok(Value::Dword(v))
                } else {
                    Err(Error::Lex {
                        line: self.scanner.line(),
                        message: format!("integer literal {} out of range", i),
                    })
                }
            }
            Some(Token::Float(v)) => {
                self.advance()?;
                Ok(Value::Float(v as f32))
            }
            Some(Token::Str(s)) => {
                self.advance()?;
                Ok(Value::String(file.intern(&s)))
            }
            Some(Token::LParen) => {
                self.advance()?;
                self.parse_paren_composite()
            }
            Some(Token::LAngle) => {
                self.advance()?;
                let x = self.parse_num()? as f32;
                self.expect(Token::Comma, "','")?;
                let y = self.parse_num()? as f32;
                self.expect(Token::Comma, "','")?;
                let z = self.parse_num()? as f32;
                self.expect(Token::RAngle, "'>' closing a vector literal")?;
                Ok(Value::Vector(Vec3::new(x, y, z)))
            }
            Some(Token::LBracket) => {
                self.advance()?;
                let min = self.parse_num()? as f32;
                self.expect(Token::Comma, "','")?;
                let max = self.parse_num()? as f32;
                self.expect(Token::RBracket, "']' closing a range literal")?;
                Ok(Value::Range(Range::new(min, max)))
            }
            _ => Err(self.syntax_error("a literal value")),
        }
    }

    /// Parenthesized tuples: arity 2 is a point, arity 4 a rect.
    fn parse_paren_composite(&mut self) -> Result<Value> {
        let mut nums = vec![self.parse_num()?];
        while self.current == Some(Token::Comma) {
            self.advance()?;
            nums.push(self.parse_num()?);
        }
        self.expect(Token::RParen, "')' closing a composite literal")?;

        match nums.as_slice() {
            [x, y] => Ok(Value::Point(Point::new(*x as i32, *y as i32))),
            [l, t, r, b] => Ok(Value::Rect(Rect::new(
                *l as i32, *t as i32, *r as i32, *b as i32,
            ))),
            _ => Err(Error::Syntax {
                line: self.scanner.line(),
                expected: "2 numbers (point) or 4 numbers (rect)".to_string(),
                found: format!("{} numbers", nums.len()),
            }),
        }
    }

    fn parse_num(&mut self) -> Result<f64> {
        match self.current {
            Some(Token::Int(i)) => {
                self.advance()?;
                Ok(i as f64)
            }
            Some(Token::Float(v)) => {
                self.advance()?;
                Ok(v)
            }
            _ => Err(self.syntax_error("a number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::table::ButeFile;
    use crate::value::ValueKind;
    use crate::Error;

    #[test]
    fn test_duplicate_attribute_last_wins() {
        let file = ButeFile::from_str("[A]\nX = 1\nX = 2").unwrap();
        assert_eq!(file.get_int("A", "X").unwrap(), 2);
        assert_eq!(file.attrs("A").unwrap().count(), 1);
    }

    #[test]
    fn test_duplicate_group_merges() {
        let src = "[A]\nX = 1\n[B]\nY = 2\n[A]\nZ = 3";
        let file = ButeFile::from_str(src).unwrap();
        assert_eq!(file.get_int("A", "X").unwrap(), 1);
        assert_eq!(file.get_int("A", "Z").unwrap(), 3);
        assert_eq!(file.tags().count(), 2);
    }

    #[test]
    fn test_empty_group() {
        let file = ButeFile::from_str("[Empty]").unwrap();
        assert!(file.tag_exists("Empty"));
        assert_eq!(file.attrs("Empty").unwrap().count(), 0);
    }

    #[test]
    fn test_composite_literals() {
        let src = "[G]\nP = (3, 4)\nR = (0, 1, 20, 21)\nV = <1.0, 2.0, 3.0>\nRg = [0.5, 9.5]";
        let file = ButeFile::from_str(src).unwrap();
        assert_eq!(file.value_type("G", "P"), Some(ValueKind::Point));
        assert_eq!(file.value_type("G", "R"), Some(ValueKind::Rect));
        assert_eq!(file.value_type("G", "V"), Some(ValueKind::Vector));
        assert_eq!(file.value_type("G", "Rg"), Some(ValueKind::Range));
        assert_eq!(file.get_point("G", "P").unwrap().x, 3);
        assert_eq!(file.get_rect("G", "R").unwrap().bottom, 21);
        assert_eq!(file.get_vector("G", "V").unwrap().z, 3.0);
        assert_eq!(file.get_range("G", "Rg").unwrap().max, 9.5);
    }

    #[test]
    fn test_bad_composite_arity() {
        let err = ButeFile::from_str("[G]\nP = (1, 2, 3)").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_syntax_error_carries_line() {
        let err = ButeFile::from_str("[G]\nX = 1\nY 2").unwrap_err();
        match err {
            Error::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_large_int_becomes_dword() {
        let file = ButeFile::from_str("[G]\nBig = 3000000000").unwrap();
        assert_eq!(file.value_type("G", "Big"), Some(ValueKind::Dword));
        assert_eq!(file.get_dword("G", "Big").unwrap(), 3_000_000_000);
    }
}
