//! Text codec for record blocks.
//!
//! A block is a sequence of parenthesised values, one top-level value per
//! line:
//!
//! ```text
//! (("Foo" "Regular") (("foo.ttf" "0" "1000")))
//! ```
//!
//! Atoms are always written as double-quoted strings. On input, bare symbols
//! are accepted as atoms too, and `;` starts a comment running to the end of
//! the line.

use anyhow::{anyhow, Result};

use crate::value::Value;

/// Parse a whole block into its top-level values.
pub fn parse_block(input: &str) -> Result<Vec<Value>> {
    let mut parser = Parser::new(input);
    let mut values = Vec::new();
    while let Some(value) = parser.next_value()? {
        values.push(value);
    }
    Ok(values)
}

/// Render values as a block, one per line.
pub fn print_block(values: &[Value]) -> String {
    let mut out = String::new();
    for value in values {
        write_value(value, &mut out);
        out.push('\n');
    }
    out
}

pub fn print_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Atom(label) => write_quoted(label, out),
        Value::Tuple(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(item, out);
            }
            out.push(')');
        }
    }
}

fn write_quoted(label: &str, out: &mut String) {
    out.push('"');
    for ch in label.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Deepest tuple nesting accepted on input.
pub const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            depth: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_blank(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn next_value(&mut self) -> Result<Option<Value>> {
        self.skip_blank();
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };
        match ch {
            '(' => {
                if self.depth >= MAX_DEPTH {
                    return Err(anyhow!("line {}: nesting too deep", self.line));
                }
                self.bump();
                self.depth += 1;
                let tuple = self.tuple();
                self.depth -= 1;
                tuple.map(Some)
            }
            ')' => Err(anyhow!("line {}: unbalanced ')'", self.line)),
            '"' => {
                self.bump();
                self.quoted().map(Some)
            }
            _ => Ok(Some(self.symbol())),
        }
    }

    fn tuple(&mut self) -> Result<Value> {
        let start = self.line;
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.chars.peek() {
                None => return Err(anyhow!("line {start}: unterminated '('")),
                Some(')') => {
                    self.bump();
                    return Ok(Value::Tuple(items));
                }
                Some(_) => {
                    if let Some(item) = self.next_value()? {
                        items.push(item);
                    }
                }
            }
        }
    }

    fn quoted(&mut self) -> Result<Value> {
        let start = self.line;
        let mut label = String::new();
        loop {
            match self.bump() {
                None => return Err(anyhow!("line {start}: unterminated string")),
                Some('"') => return Ok(Value::Atom(label)),
                Some('\\') => match self.bump() {
                    Some('n') => label.push('\n'),
                    Some('t') => label.push('\t'),
                    Some(other) => label.push(other),
                    None => return Err(anyhow!("line {start}: unterminated string")),
                },
                Some(ch) => label.push(ch),
            }
        }
    }

    fn symbol(&mut self) -> Value {
        let mut label = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | ';') {
                break;
            }
            label.push(ch);
            self.bump();
        }
        Value::Atom(label)
    }
}
