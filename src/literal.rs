// ===============================
// src/literal.rs
// ===============================
//
// Parser literal kecil untuk potongan script yang ditanam di halaman HTML.
// Grammar dibatasi: number, string ('..' / ".."), true/false/null/undefined,
// array, object (key bare atau quoted). Trailing comma & komentar // /* */
// diterima. Hasilnya serde_json::Value supaya ekstraksi field bisa typed.
//
// Tidak ada eksekusi / evaluasi ekspresi. Nilai di luar grammar di top level
// -> None; di dalam array/object nilainya dilewati sampai ',' berikutnya dan
// dibaca sebagai null.
//
use serde_json::{Map, Number, Value};

const MAX_DEPTH: usize = 64;

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
    too_deep: bool,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src: src.as_bytes(), pos: 0, depth: 0, too_deep: false }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.src.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                Some(b'/') if self.src.get(self.pos + 1) == Some(&b'*') => {
                    self.pos += 2;
                    while self.pos < self.src.len() {
                        if self.src[self.pos] == b'*' && self.src.get(self.pos + 1) == Some(&b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn eat(&mut self, b: u8) -> bool {
        self.skip_trivia();
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_trivia();
        match self.peek()? {
            b'[' => self.array(),
            b'{' => self.object(),
            b'"' | b'\'' => self.string().map(Value::String),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number(),
            b if is_ident_start(b) => match self.ident()? {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                "null" | "undefined" => Some(Value::Null),
                _ => None,
            },
            _ => None,
        }
    }

    fn array(&mut self) -> Option<Value> {
        self.enter()?;
        self.pos += 1; // '['
        let mut out = Vec::new();
        loop {
            if self.eat(b']') {
                break;
            }
            out.push(self.element(b']')?);
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                break;
            }
            return None;
        }
        self.depth -= 1;
        Some(Value::Array(out))
    }

    fn object(&mut self) -> Option<Value> {
        self.enter()?;
        self.pos += 1; // '{'
        let mut out = Map::new();
        loop {
            if self.eat(b'}') {
                break;
            }
            self.skip_trivia();
            let key = match self.peek()? {
                b'"' | b'\'' => self.string()?,
                b if is_ident_start(b) => self.ident()?.to_string(),
                b'0'..=b'9' => self.digits_key()?,
                _ => return None,
            };
            if !self.eat(b':') {
                return None;
            }
            let v = self.element(b'}')?;
            out.insert(key, v);
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                break;
            }
            return None;
        }
        self.depth -= 1;
        Some(Value::Object(out))
    }

    /// Value inside a container. Anything the grammar cannot read (`14 * 2`,
    /// calls, template strings) is skipped up to the next separator and kept as null.
    fn element(&mut self, close: u8) -> Option<Value> {
        let (start, depth) = (self.pos, self.depth);
        if let Some(v) = self.value() {
            self.skip_trivia();
            if matches!(self.peek(), Some(b) if b == b',' || b == close) {
                return Some(v);
            }
        }
        if self.too_deep {
            return None;
        }
        self.pos = start;
        self.depth = depth;
        self.skip_expr(close)?;
        Some(Value::Null)
    }

    /// Advance to the next `,` or `close` at nesting level 0 without consuming it.
    /// Unbalanced brackets or end of input -> None.
    fn skip_expr(&mut self, close: u8) -> Option<()> {
        let mut nesting = 0usize;
        loop {
            self.skip_trivia();
            let b = self.peek()?;
            match b {
                b'"' | b'\'' | b'`' => {
                    self.pos += 1;
                    loop {
                        let c = self.peek()?;
                        self.pos += 1;
                        if c == b'\\' {
                            self.pos += 1;
                        } else if c == b {
                            break;
                        }
                    }
                    continue;
                }
                b'(' | b'[' | b'{' => nesting += 1,
                b')' | b']' | b'}' => {
                    if nesting == 0 {
                        return (b == close).then_some(());
                    }
                    nesting -= 1;
                }
                b',' if nesting == 0 => return Some(()),
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn enter(&mut self) -> Option<()> {
        self.depth += 1;
        self.too_deep = self.depth > MAX_DEPTH;
        (!self.too_deep).then_some(())
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.peek()?;
        self.pos += 1;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let b = self.peek()?;
            self.pos += 1;
            match b {
                b'\\' => {
                    let esc = self.peek()?;
                    self.pos += 1;
                    match esc {
                        b'n' => buf.push(b'\n'),
                        b't' => buf.push(b'\t'),
                        b'r' => buf.push(b'\r'),
                        b'u' => {
                            let hex = self.src.get(self.pos..self.pos + 4)?;
                            let code = u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?;
                            let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                            let mut tmp = [0u8; 4];
                            buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
                            self.pos += 4;
                        }
                        other => buf.push(other),
                    }
                }
                b'\n' => return None,
                _ if b == quote => break,
                _ => buf.push(b),
            }
        }
        String::from_utf8(buf).ok()
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.pos += 1;
        }
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' | b'.' | b'_' => self.pos += 1,
                b'e' | b'E' => {
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'-') | Some(b'+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let raw = std::str::from_utf8(&self.src[start..self.pos]).ok()?;
        let cleaned: String = raw.trim_start_matches('+').chars().filter(|c| *c != '_').collect();
        let f: f64 = cleaned.parse().ok()?;
        if !f.is_finite() {
            return None;
        }
        if !cleaned.contains(['.', 'e', 'E']) {
            if let Ok(i) = cleaned.parse::<i64>() {
                return Some(Value::Number(i.into()));
            }
        }
        Number::from_f64(f).map(Value::Number)
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_ident_char(b)) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.src[start..self.pos]).ok()
    }

    fn digits_key(&mut self) -> Option<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.src[start..self.pos]).ok().map(str::to_string)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Parse one literal at the start of `src` (leading whitespace/comments allowed).
/// Returns the value and the number of bytes consumed.
pub fn parse_value(src: &str) -> Option<(Value, usize)> {
    let mut c = Cursor::new(src);
    let v = c.value()?;
    Some((v, c.pos))
}

/// Find the first whole-word `name` followed by `=` or `:` and parse the literal after it.
///
/// `name == x`, `name => x` and `otherName = x` do not match. If the first
/// assignment of `name` holds something outside the grammar the search moves on
/// to the next occurrence.
pub fn find_assignment(text: &str, name: &str) -> Option<Value> {
    if name.is_empty() {
        return None;
    }
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(rel) = text[from..].find(name) {
        let at = from + rel;
        let end = at + name.len();
        from = end;

        let before_ok = at == 0 || !is_ident_char(bytes[at - 1]);
        let after_ok = bytes.get(end).map_or(true, |b| !is_ident_char(*b));
        if !before_ok || !after_ok {
            continue;
        }

        // Lewati whitespace + quote penutup key ("name": ...)
        let mut i = end;
        if matches!(bytes.get(i), Some(b'"') | Some(b'\'')) {
            i += 1;
        }
        while matches!(bytes.get(i), Some(b) if b.is_ascii_whitespace()) {
            i += 1;
        }
        let is_assign = match bytes.get(i) {
            Some(b':') => true,
            Some(b'=') => !matches!(bytes.get(i + 1), Some(b'=') | Some(b'>')),
            _ => false,
        };
        if !is_assign {
            continue;
        }
        if let Some((v, _)) = parse_value(&text[i + 1..]) {
            return Some(v);
        }
    }
    None
}

/// Numeric view of a literal; numeric strings ("0.8566") are accepted.
pub fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
