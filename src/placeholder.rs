//! Scanner for Qt-style positional placeholders (`%1` .. `%99`).
//!
//! A `%` followed by one or two digits is a place marker substituted at
//! display time; any other `%` is a literal character (the format has no
//! escape for it). Two digits are consumed greedily, so `%11` is marker
//! eleven, not marker one followed by `1`.

/// One scanned piece of a message string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// 1-based marker index as written (`%3` -> 3).
    Placeholder(u32),
}

struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Consumes a `%N`/`%NN` marker at the current position, if present.
    fn scan_marker(&mut self) -> Option<u32> {
        let bytes = self.rest().as_bytes();
        if bytes.first() != Some(&b'%') {
            return None;
        }
        let mut digits = 0;
        while digits < 2 {
            match bytes.get(1 + digits) {
                Some(b'0'..=b'9') => digits += 1,
                _ => break,
            }
        }
        if digits == 0 {
            return None;
        }
        let index: u32 = self.rest()[1..1 + digits].parse().ok()?;
        if index == 0 {
            // "%0" is not a marker in this format.
            return None;
        }
        self.position += 1 + digits;
        Some(index)
    }

    fn scan(mut self) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut text_start = self.position;
        while self.position < self.input.len() {
            let before = self.position;
            if let Some(index) = self.scan_marker() {
                if text_start < before {
                    segments.push(Segment::Text(&self.input[text_start..before]));
                }
                segments.push(Segment::Placeholder(index));
                text_start = self.position;
            } else {
                // Advance past one char (not byte: input is UTF-8).
                let c = self.rest().chars().next().unwrap_or('\0');
                self.position += c.len_utf8().max(1);
            }
        }
        if text_start < self.input.len() {
            segments.push(Segment::Text(&self.input[text_start..]));
        }
        segments
    }
}

/// Splits a message string into literal text and placeholder segments.
pub fn parse(input: &str) -> Vec<Segment<'_>> {
    Scanner::new(input).scan()
}

/// Substitutes place markers positionally: `%1` takes `values[0]` and so
/// on. Markers without a corresponding value are left verbatim, matching
/// what the host toolkit displays for missing arguments.
pub fn substitute(input: &str, values: &[&str]) -> String {
    let mut result = String::with_capacity(input.len());
    for segment in parse(input) {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::Placeholder(index) => match values.get(index as usize - 1) {
                Some(value) => result.push_str(value),
                None => {
                    result.push('%');
                    result.push_str(&index.to_string());
                }
            },
        }
    }
    result
}

/// Marker indices in first-occurrence order, without duplicates.
pub fn indices(input: &str) -> Vec<u32> {
    let mut seen = Vec::new();
    for segment in parse(input) {
        if let Segment::Placeholder(index) = segment {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
    }
    seen
}
