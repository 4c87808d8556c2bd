//! Splits a script buffer into lines and words without copying.
//!
//! A [`Line`] borrows its raw extent from the buffer; [`Word`]s borrow from the
//! line. Nothing here can fail: any byte sequence tokenizes.

use std::fmt::Debug;

use nom::{IResult, bytes::complete::{take_till, take_while}};

fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() && !is_line_break(b)
}

fn line_body(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till(is_line_break)(i)
}

fn line_breaks(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_line_break)(i)
}

fn spaces(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_space)(i)
}

fn word(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till(|b| is_space(b) || is_line_break(b))(i)
}

/// A run of non-whitespace bytes inside a line
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Word<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Offset of the word from the start of its line
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Case sensitive keyword comparison
    pub fn is(&self, keyword: &str) -> bool {
        self.bytes == keyword.as_bytes()
    }

    /// Case insensitive keyword comparison
    pub fn is_ignore_case(&self, keyword: &str) -> bool {
        self.bytes.eq_ignore_ascii_case(keyword.as_bytes())
    }
}

impl Debug for Word<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}@{}", String::from_utf8_lossy(self.bytes), self.offset))
    }
}

impl PartialEq<&str> for Word<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.is(other)
    }
}

/// Iterator over the words of a line
#[derive(Clone)]
pub struct Words<'a> {
    line: &'a [u8],
    rest: &'a [u8],
}

impl<'a> Iterator for Words<'a> {
    type Item = Word<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Ok((rest, _)) = spaces(self.rest) else {
            return None;
        };
        let offset = self.line.len() - rest.len();
        let Ok((rest, bytes)) = word(rest) else {
            return None;
        };
        self.rest = rest;
        if bytes.is_empty() {
            None
        } else {
            Some(Word { bytes, offset })
        }
    }
}

/// One line of a script buffer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    raw: &'a [u8],
    terminated: bool,
}

impl<'a> Line<'a> {
    /// The full line without its terminator, leading and trailing spaces included
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// False only for an unterminated trailing fragment, more of the line follows in the next buffer
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn words(&self) -> Words<'a> {
        Words { line: self.raw, rest: self.raw }
    }

    pub fn first_word(&self) -> Option<Word<'a>> {
        self.words().next()
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// Everything after the first word and one separator, for lines with at least two words
    pub fn argument(&self) -> Option<&'a [u8]> {
        let mut words = self.words();
        let first = words.next()?;
        words.next()?;
        Some(&self.raw[first.offset() + first.len() + 1..])
    }

    pub fn is_blank(&self) -> bool {
        self.first_word().is_none()
    }
}

impl Debug for Line<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Line")
            .field("raw", &String::from_utf8_lossy(self.raw))
            .field("terminated", &self.terminated)
            .finish()
    }
}

/// Iterator over the lines of a buffer.
/// Runs of line breaks collapse, so no empty line is produced between them.
#[derive(Clone)]
pub struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let Ok((rest, raw)) = line_body(self.rest) else {
            return None;
        };
        let Ok((rest, breaks)) = line_breaks(rest) else {
            return None;
        };
        self.rest = rest;
        Some(Line { raw, terminated: !breaks.is_empty() })
    }
}

/// Tokenize a buffer into lines
pub fn lines(buffer: &[u8]) -> Lines<'_> {
    Lines { rest: buffer }
}
