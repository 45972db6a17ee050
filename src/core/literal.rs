// LogTriage - core/literal.rs
//
// Reader for the Python-style tuple literal carried by "inverted label"
// warnings, e.g. `('V1', 100610, 'lh', [12, 40])`.
//
// Supports strings (single or double quoted, common escapes), integers,
// floats, `None`/`True`/`False`, lists, tuples, and dicts with scalar keys.
// Values map onto `serde_json::Value`; tuples become arrays. Anything else is
// rejected so an unexpected repr forces human triage.

use serde_json::{Map, Number, Value};

/// Parse a complete literal. Trailing non-whitespace is an error.
pub fn parse_literal(text: &str) -> Result<Value, String> {
    let mut reader = Reader {
        chars: text.chars().collect(),
        pos: 0,
    };
    let value = reader.value()?;
    reader.skip_ws();
    if reader.pos != reader.chars.len() {
        return Err(format!("unexpected trailing text at offset {}", reader.pos));
    }
    Ok(value)
}

enum Parsed {
    Items(Vec<Value>),
    Bare(Value),
}

impl Parsed {
    fn into_value(self) -> Value {
        match self {
            Parsed::Items(items) => Value::Array(items),
            Parsed::Bare(value) => value,
        }
    }
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
}

impl Reader {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), String> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(format!("expected '{want}', found '{c}' at offset {}", self.pos - 1)),
            None => Err(format!("expected '{want}', found end of input")),
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        match self.peek() {
            Some('(') => self.sequence('(', ')', true).map(Parsed::into_value),
            Some('[') => self.sequence('[', ']', false).map(Parsed::into_value),
            Some('{') => self.dict(),
            Some(q @ ('\'' | '"')) => self.string(q).map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            Some(c) => Err(format!("unexpected '{c}' at offset {}", self.pos)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    /// Comma-separated items between `open` and `close`. A single-item tuple
    /// needs its trailing comma; `(x)` is just `x`.
    fn sequence(&mut self, open: char, close: char, is_tuple: bool) -> Result<Parsed, String> {
        self.expect(open)?;
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                break;
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => saw_comma = true,
                Some(c) if c == close => break,
                Some(c) => return Err(format!("unexpected '{c}' in sequence at offset {}", self.pos - 1)),
                None => return Err(format!("unterminated sequence, expected '{close}'")),
            }
        }
        if is_tuple && items.len() == 1 && !saw_comma {
            // `(x)` is a parenthesised value, not a tuple.
            return Ok(Parsed::Bare(items.remove(0)));
        }
        Ok(Parsed::Items(items))
    }

    fn dict(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => (if b { "True" } else { "False" }).to_string(),
                Value::Null => "None".to_string(),
                _ => return Err("dict keys must be scalars".to_string()),
            };
            self.skip_ws();
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => break,
                Some(c) => return Err(format!("unexpected '{c}' in dict at offset {}", self.pos - 1)),
                None => return Err("unterminated dict".to_string()),
            }
        }
        Ok(Value::Object(map))
    }

    fn string(&mut self, quote: char) -> Result<String, String> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".to_string()),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err("unterminated escape".to_string()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("invalid number '{raw}'"))
    }

    fn keyword(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "None" => Ok(Value::Null),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            other => Err(format!("unsupported name '{other}'")),
        }
    }
}
