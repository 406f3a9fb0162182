//! Structural extractor: recovers text exposed through PDF content-stream syntax.
//!
//! There is no tokenizer or object model here, just forward scans over the decoded
//! buffer looking for five shapes, each applied across the whole string:
//!
//! 1. `BT ... ET` text objects, keeping only `Tj` / `TJ` operands
//! 2. parenthesized literal strings of 5–500 characters
//! 3. bracketed arrays of 5–500 characters
//! 4. `stream ... endstream` payloads that are already readable (no filter decoding)
//! 5. `/F<n> <size> Tf (<text>)` font-prefixed show-text
//!
//! Literal and array extents are matched once per buffer up front, so every later
//! lookup is constant time and a buffer full of unclosed delimiters costs one pass.

use std::ops::Range;

use super::decoder::ENCODING_ORDER;
use super::normalize::collapse_whitespace;
use super::{scan_encodings, StrategyOutput};

const LITERAL_MIN_CHARS: usize = 5;
const LITERAL_MAX_CHARS: usize = 500;
/// Upper bound for a single operand inside a text object.
const OPERAND_MAX_CHARS: usize = 4096;
/// Kerning adjustments more negative than this read as a word gap.
const TJ_SPACE_KERNING: f32 = -200.0;
/// Share of printable characters a stream payload needs to be treated as text.
const READABLE_STREAM_RATIO: f32 = 0.85;
/// Minimum kept length for matches found outside `Tj` / `TJ` operands.
const LOOSE_TOKEN_MIN_CHARS: usize = 3;

/// Runs the structural scans over each candidate encoding.
pub fn extract(bytes: &[u8]) -> StrategyOutput {
    scan_encodings(bytes, &ENCODING_ORDER, scan)
}

/// Runs all five scans over one decoded string, appending tokens in discovery order.
pub fn scan(text: &str, out: &mut StrategyOutput) {
    let content = Content::new(text);
    let b = text.as_bytes();

    for block in content.text_objects() {
        for operand in content.show_text_operands(block) {
            if keep_operand(&operand) {
                out.push(&operand);
            }
        }
    }

    let mut i = 0;
    while let Some(open) = find_byte(b, i, b'(') {
        i = match content.literal_at(open) {
            Some(span) if span.holds(LITERAL_MIN_CHARS, LITERAL_MAX_CHARS) => {
                push_loose(out, &decode_literal(&text[span.inner()]));
                span.end()
            }
            _ => open + 1,
        };
    }

    let mut i = 0;
    while let Some(open) = find_byte(b, i, b'[') {
        i = match content.array_at(open) {
            Some(span) if span.holds(LITERAL_MIN_CHARS, LITERAL_MAX_CHARS) => {
                push_loose(out, &content.array_text(span.inner()));
                span.end()
            }
            _ => open + 1,
        };
    }

    for payload in stream_payloads(text) {
        push_loose(out, &strip_delimiters(payload));
    }

    for literal in content.font_prefixed_literals() {
        push_loose(out, &literal);
    }
}

fn keep_operand(token: &str) -> bool {
    !token.is_empty() && token.chars().any(|c| c.is_ascii_alphabetic())
}

/// Matches outside `Tj` / `TJ` operands must read as text; delimiters found inside
/// binary data would otherwise carve garbage out of it.
fn push_loose(out: &mut StrategyOutput, raw: &str) {
    if !is_readable(raw) {
        return;
    }
    let token = collapse_whitespace(raw);
    if token.chars().count() >= LOOSE_TOKEN_MIN_CHARS && keep_operand(&token) {
        out.push(&token);
    }
}

fn find_byte(b: &[u8], from: usize, needle: u8) -> Option<usize> {
    b.get(from..)?
        .iter()
        .position(|&c| c == needle)
        .map(|p| p + from)
}

/// True when `b[at..]` starts with `word` standing alone between non-alphanumeric bytes.
fn is_keyword_at(b: &[u8], at: usize, word: &[u8]) -> bool {
    b.get(at..).is_some_and(|rest| rest.starts_with(word))
        && (at == 0 || !b[at - 1].is_ascii_alphanumeric())
        && b
            .get(at + word.len())
            .map_or(true, |c| !c.is_ascii_alphanumeric())
}

/// A delimited region: byte offsets of its opening and closing delimiters and the
/// number of characters between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    open: usize,
    close: usize,
    chars: usize,
}

impl Span {
    fn inner(&self) -> Range<usize> {
        self.open + 1..self.close
    }

    fn end(&self) -> usize {
        self.close + 1
    }

    fn holds(&self, min_chars: usize, max_chars: usize) -> bool {
        (min_chars..=max_chars).contains(&self.chars)
    }
}

fn span_at(spans: &[Span], open: usize) -> Option<Span> {
    spans
        .binary_search_by_key(&open, |s| s.open)
        .ok()
        .map(|i| spans[i])
}

/// One decoded buffer with its literal strings and arrays already matched.
struct Content<'a> {
    text: &'a str,
    /// Balanced `( ... )` pairs honouring escapes, sorted by `open`.
    literals: Vec<Span>,
    /// `[ ... ]` pairs outside literals; arrays do not nest.
    arrays: Vec<Span>,
}

impl<'a> Content<'a> {
    fn new(text: &'a str) -> Self {
        let mut literals = Vec::new();
        let mut opens: Vec<(usize, usize)> = Vec::new();
        let mut chars = text.char_indices().enumerate();
        while let Some((n, (at, c))) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '(' => opens.push((at, n)),
                ')' => {
                    if let Some((open, open_n)) = opens.pop() {
                        literals.push(Span {
                            open,
                            close: at,
                            chars: n - open_n - 1,
                        });
                    }
                }
                _ => {}
            }
        }
        literals.sort_unstable_by_key(|s| s.open);

        let b = text.as_bytes();
        let mut arrays = Vec::new();
        let mut pending: Option<(usize, usize)> = None;
        let (mut i, mut n) = (0, 0);
        while i < b.len() {
            match b[i] {
                b'(' => {
                    if let Some(span) = span_at(&literals, i) {
                        n += span.chars + 2;
                        i = span.end();
                        continue;
                    }
                }
                b'[' => pending = Some((i, n)),
                b']' => {
                    if let Some((open, open_n)) = pending.take() {
                        arrays.push(Span {
                            open,
                            close: i,
                            chars: n - open_n - 1,
                        });
                    }
                }
                _ => {}
            }
            if b[i] & 0xC0 != 0x80 {
                n += 1;
            }
            i += 1;
        }

        Self {
            text,
            literals,
            arrays,
        }
    }

    fn literal_at(&self, open: usize) -> Option<Span> {
        span_at(&self.literals, open)
    }

    fn array_at(&self, open: usize) -> Option<Span> {
        span_at(&self.arrays, open)
    }

    /// Decoded literal opening at `open` and the index past its `)`.
    fn literal(&self, open: usize, max_chars: usize) -> Option<(String, usize)> {
        let span = self.literal_at(open).filter(|s| s.chars <= max_chars)?;
        Some((decode_literal(&self.text[span.inner()]), span.end()))
    }

    /// Byte ranges of `BT ... ET` bodies. String operands are skipped while looking
    /// for `ET`, so a literal containing the letters "ET" cannot end the block early.
    fn text_objects(&self) -> Vec<Range<usize>> {
        let b = self.text.as_bytes();
        let mut blocks = Vec::new();
        let mut i = 0;

        while i + 1 < b.len() {
            if !is_keyword_at(b, i, b"BT") {
                i += 1;
                continue;
            }
            let body_start = i + 2;
            let mut j = body_start;
            let mut end = None;
            while j + 1 < b.len() {
                if b[j] == b'(' {
                    if let Some(span) = self.literal_at(j).filter(|s| s.chars <= OPERAND_MAX_CHARS)
                    {
                        j = span.end();
                        continue;
                    }
                }
                if is_keyword_at(b, j, b"ET") {
                    end = Some(j);
                    break;
                }
                j += 1;
            }
            match end {
                Some(e) => {
                    blocks.push(body_start..e);
                    i = e + 2;
                }
                None => break,
            }
        }

        blocks
    }

    /// Operands of `Tj` (single string) and `TJ` (string array) inside one text object.
    fn show_text_operands(&self, block: Range<usize>) -> Vec<String> {
        let b = self.text.as_bytes();
        let mut operands = Vec::new();
        let mut i = block.start;

        while i < block.end {
            let parsed = match b[i] {
                b'(' => self
                    .literal(i, OPERAND_MAX_CHARS)
                    .map(|(content, end)| (content, end, b"Tj")),
                b'<' if b.get(i + 1) != Some(&b'<') => {
                    read_hex_string(b, i).map(|(content, end)| (content, end, b"Tj"))
                }
                b'[' => self
                    .array_at(i)
                    .filter(|s| s.chars <= OPERAND_MAX_CHARS)
                    .map(|s| (self.array_text(s.inner()), s.end(), b"TJ")),
                _ => None,
            };

            match parsed {
                Some((content, end, operator)) if end <= block.end => {
                    let k = end + count_while(b, end, |c| c.is_ascii_whitespace());
                    if k + 2 <= block.end && is_keyword_at(b, k, operator) {
                        operands.push(collapse_whitespace(&content));
                        i = k + 2;
                    } else {
                        i = end;
                    }
                }
                _ => i += 1,
            }
        }

        operands
    }

    /// Text carried by an array body: string elements concatenated, large negative
    /// kerning read as a space. Arrays without string elements fall back to their raw
    /// content.
    fn array_text(&self, inner: Range<usize>) -> String {
        let b = self.text.as_bytes();
        let mut out = String::new();
        let mut saw_string = false;
        let mut i = inner.start;

        while i < inner.end {
            match b[i] {
                b'(' => match self.literal(i, OPERAND_MAX_CHARS) {
                    Some((content, end)) => {
                        out.push_str(&content);
                        saw_string = true;
                        i = end;
                    }
                    None => i += 1,
                },
                b'<' => match read_hex_string(b, i) {
                    Some((content, end)) => {
                        out.push_str(&content);
                        saw_string = true;
                        i = end;
                    }
                    None => i += 1,
                },
                b'-' | b'.' | b'0'..=b'9' => {
                    let start = i;
                    i += 1;
                    while i < inner.end && (b[i].is_ascii_digit() || b[i] == b'.') {
                        i += 1;
                    }
                    if let Ok(kern) = self.text[start..i].parse::<f32>() {
                        if kern < TJ_SPACE_KERNING {
                            out.push(' ');
                        }
                    }
                }
                _ => i += 1,
            }
        }

        if saw_string {
            out
        } else {
            strip_delimiters(&self.text[inner])
        }
    }

    /// Literals shown right after a `/F<n> <size> Tf` font selection.
    fn font_prefixed_literals(&self) -> Vec<String> {
        let b = self.text.as_bytes();
        let mut literals = Vec::new();
        let mut i = 0;

        while let Some(slash) = find_byte(b, i, b'/') {
            i = slash + 1;
            let Some(after_font) = match_font_selection(b, slash) else {
                continue;
            };
            if let Some((content, end)) = self.literal(after_font, LITERAL_MAX_CHARS) {
                literals.push(content);
                i = end;
            }
        }

        literals
    }
}

/// Resolves the escapes of a literal string body.
fn decode_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'r' | 't') => out.push(' '),
            Some('b' | 'f' | '\n') | None => {}
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some(first @ '0'..='7') => {
                let mut value = u32::from(first) - u32::from('0');
                for _ in 0..2 {
                    match chars.next_if(|c| ('0'..='7').contains(c)) {
                        Some(d) => value = value * 8 + (u32::from(d) - u32::from('0')),
                        None => break,
                    }
                }
                out.push(char::from((value & 0xFF) as u8));
            }
            // Unknown escapes drop the backslash and keep the character.
            Some(other) => out.push(other),
        }
    }

    out
}

/// Parses a `<...>` hex string at `open`; odd trailing digits are padded with zero.
/// Gives up at the first byte that cannot appear in a hex string.
fn read_hex_string(b: &[u8], open: usize) -> Option<(String, usize)> {
    let mut digits = Vec::new();
    for (k, &c) in b.get(open + 1..)?.iter().enumerate().take(OPERAND_MAX_CHARS) {
        match c {
            b'>' => return Some((hex_text(&digits), open + 2 + k)),
            c if c.is_ascii_hexdigit() => digits.push(c),
            c if c.is_ascii_whitespace() => {}
            _ => return None,
        }
    }
    None
}

fn hex_text(digits: &[u8]) -> String {
    digits
        .chunks(2)
        .filter_map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = pair.get(1).and_then(|c| (*c as char).to_digit(16)).unwrap_or(0);
            let byte = (hi * 16 + lo) as u8;
            (byte.is_ascii_graphic() || byte == b' ').then_some(byte as char)
        })
        .collect()
}

/// Raw payloads between `stream` and `endstream` keywords.
fn stream_payloads(text: &str) -> Vec<&str> {
    let b = text.as_bytes();
    let mut payloads = Vec::new();
    let mut i = 0;

    while i + 6 <= b.len() {
        if !is_keyword_at(b, i, b"stream") {
            i += 1;
            continue;
        }
        let mut start = i + 6;
        if b[start..].starts_with(b"\r\n") {
            start += 2;
        } else if b.get(start) == Some(&b'\n') || b.get(start) == Some(&b'\r') {
            start += 1;
        }
        let mut j = start;
        let mut end = None;
        while j + 9 <= b.len() {
            if is_keyword_at(b, j, b"endstream") {
                end = Some(j);
                break;
            }
            j += 1;
        }
        match end {
            Some(e) => {
                payloads.push(&text[start..e]);
                i = e + 9;
            }
            None => break,
        }
    }

    payloads
}

fn is_readable(payload: &str) -> bool {
    let total = payload.chars().count();
    if total == 0 {
        return false;
    }
    let printable = payload
        .chars()
        .filter(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
        .count();
    printable as f32 / total as f32 >= READABLE_STREAM_RATIO
}

/// Replaces PDF delimiter characters with spaces.
fn strip_delimiters(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '(' | ')' | '[' | ']' | '<' | '>' | '{' | '}' | '/' | '\\' | '%' => ' ',
            c => c,
        })
        .collect();
    collapse_whitespace(&replaced)
}

/// Matches `/F<digits> <ws> <number> <ws> Tf <ws>* (` at `at`, returning the index of `(`.
fn match_font_selection(b: &[u8], at: usize) -> Option<usize> {
    let mut i = at + 1;
    if b.get(i) != Some(&b'F') {
        return None;
    }
    i += 1;
    let digits = count_while(b, i, |c| c.is_ascii_digit());
    if digits == 0 {
        return None;
    }
    i += digits;
    let ws = count_while(b, i, |c| c.is_ascii_whitespace());
    if ws == 0 {
        return None;
    }
    i += ws;
    let size = count_while(b, i, |c| c.is_ascii_digit() || c == b'.');
    if size == 0 {
        return None;
    }
    i += size;
    let ws = count_while(b, i, |c| c.is_ascii_whitespace());
    if ws == 0 || !b[i + ws..].starts_with(b"Tf") {
        return None;
    }
    i += ws + 2;
    i += count_while(b, i, |c| c.is_ascii_whitespace());
    (b.get(i) == Some(&b'(')).then_some(i)
}

fn count_while(b: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    b.get(from..)
        .map_or(0, |rest| rest.iter().take_while(|&&c| pred(c)).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn scan_str(text: &str) -> String {
        let mut out = StrategyOutput::default();
        scan(text, &mut out);
        out.text
    }

    fn blocks(text: &str) -> Vec<&str> {
        Content::new(text)
            .text_objects()
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    fn operands_in_first_block(text: &str) -> Vec<String> {
        let content = Content::new(text);
        let blocks = content.text_objects();
        content.show_text_operands(blocks[0].clone())
    }

    fn operands(text: &str) -> Vec<String> {
        Content::new(text).show_text_operands(0..text.len())
    }

    #[test]
    fn test_bt_et_tj_operand_is_recovered() {
        let text = scan_str("BT (Hello World) Tj ET");
        assert!(text.contains("Hello World"), "got: {text}");
    }

    #[test]
    fn test_text_object_yields_only_show_text_operands() {
        let text = "q BT /F1 12 Tf 72 700 Td (Jane Doe) Tj ET Q";
        assert_eq!(blocks(text).len(), 1);
        assert_eq!(operands_in_first_block(text), vec!["Jane Doe".to_string()]);
    }

    #[test]
    fn test_tj_array_joins_fragments_and_reads_kerning_gaps() {
        let operands = operands(" [(Soft) 20 (ware) -300 (Engineer)] TJ ");
        assert_eq!(operands, vec!["Software Engineer".to_string()]);
    }

    #[test]
    fn test_hex_string_operand_is_decoded() {
        // "Rust"
        assert_eq!(operands(" <52757374> Tj "), vec!["Rust".to_string()]);
    }

    #[test]
    fn test_hex_string_stops_at_foreign_byte() {
        assert!(read_hex_string(b"<52 75 zz>", 0).is_none());
        assert_eq!(
            read_hex_string(b"<527> Tj", 0),
            Some(("Rp".to_string(), 5))
        );
    }

    #[test]
    fn test_literal_containing_et_does_not_end_block() {
        let text = "BT (MARKET ET) Tj (Analyst) Tj ET";
        assert_eq!(blocks(text).len(), 1);
        assert_eq!(
            operands_in_first_block(text),
            vec!["MARKET ET".to_string(), "Analyst".to_string()]
        );
    }

    #[test]
    fn test_et_followed_by_letter_is_not_a_terminator() {
        let found = blocks("BT (One) Tj ETX (Two) Tj ET");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Two"));
    }

    #[test]
    fn test_unterminated_text_object_is_ignored() {
        assert!(blocks("BT (Never closed) Tj").is_empty());
    }

    #[test]
    fn test_operand_without_letters_is_dropped() {
        let text = scan_str("BT (12345) Tj ET");
        assert!(text.is_empty(), "got: {text}");
    }

    #[test]
    fn test_literal_escapes_are_decoded() {
        let text = r"(Smith \(PhD\)\nA\101) rest";
        let (content, end) = Content::new(text).literal(0, 500).unwrap();
        assert_eq!(content, "Smith (PhD) AA");
        assert_eq!(&text[end..], " rest");
    }

    #[test]
    fn test_nested_literal_is_matched_to_outer_close() {
        let content = Content::new("(a (b) c) tail");
        let span = content.literal_at(0).unwrap();
        assert_eq!(span.close, 8);
        assert_eq!(span.chars, 7);
        assert!(content.literal_at(3).is_some());
    }

    #[test]
    fn test_literal_respects_length_bounds() {
        assert_eq!(scan_str("(abcd)"), "");
        assert_eq!(scan_str("(abcde)"), "abcde");
        let at_limit = "a".repeat(500);
        assert_eq!(scan_str(&format!("({at_limit})")), at_limit);
        let long = format!("({})", "a".repeat(501));
        assert_eq!(scan_str(&long), "");
    }

    #[test]
    fn test_literal_bounds_count_characters_not_bytes() {
        // 500 characters, 550 bytes
        let body = format!("{}{}", "a".repeat(450), "\u{e9}".repeat(50));
        assert_eq!(scan_str(&format!("({body})")), body);
    }

    #[test]
    fn test_loose_literal_of_binary_bytes_is_dropped() {
        let binary: String = (0x80u8..0xC0).map(char::from).collect();
        assert_eq!(scan_str(&format!("(ab{binary}cd)")), "");
        assert_eq!(scan_str(&format!("[ab{binary}cd]")), "");
    }

    #[test]
    fn test_array_respects_length_bounds() {
        let at_limit = "a".repeat(500);
        assert_eq!(scan_str(&format!("[{at_limit}]")), at_limit);
        assert_eq!(scan_str(&format!("[{}]", "a".repeat(501))), "");
    }

    #[test]
    fn test_bracket_array_without_strings_keeps_stripped_content() {
        assert_eq!(scan_str("[/PDF /Text]"), "PDF Text");
    }

    #[test]
    fn test_numeric_array_is_dropped() {
        assert_eq!(scan_str("/MediaBox [0 0 612 792]"), "");
    }

    #[test]
    fn test_readable_stream_payload_is_kept() {
        let text = scan_str("stream\nProfessional summary goes here\nendstream");
        assert_eq!(text, "Professional summary goes here");
    }

    #[test]
    fn test_binary_stream_payload_is_skipped() {
        let payload: String = (0x80u8..0xFF).map(char::from).collect();
        let text = scan_str(&format!("stream\n{payload}abc\nendstream"));
        assert!(text.is_empty(), "got: {text}");
    }

    #[test]
    fn test_font_prefixed_literal_is_recovered() {
        let font = |text: &str| Content::new(text).font_prefixed_literals();
        assert_eq!(font("/F2 10.5 Tf (Education)"), vec!["Education".to_string()]);
        assert!(font("/F 10 Tf (Nope)").is_empty());
        assert!(font("/Font 10 Tf (Nope)").is_empty());
    }

    #[test]
    fn test_patterns_are_reported_in_discovery_order_without_dedup() {
        let text = scan_str("BT (Hello World) Tj ET");
        // once from the text object, once from the loose literal scan
        assert_eq!(text, "Hello World Hello World");
    }

    #[test]
    fn test_extract_crosses_threshold_on_first_encoding() {
        let pdf = "BT (Experienced platform engineer) Tj ET\n".repeat(3);
        let out = extract(pdf.as_bytes());
        assert!(out.crossed_threshold);
        assert_eq!(out.encoding, Some(crate::extraction::TextEncoding::Utf8));
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let inputs: [&[u8]; 6] = [
            b"",
            b"(",
            b"BT",
            b"[(\\",
            b"/F1 12 Tf (",
            b"stream",
        ];
        for input in inputs {
            let _ = extract(input);
        }
    }

    #[test]
    fn test_unclosed_delimiters_scan_in_linear_time() {
        for fill in [b'(', b'[', b'<'] {
            let mut input = b"BT ".to_vec();
            input.extend(std::iter::repeat(fill).take(1 << 20));
            let started = Instant::now();
            let out = extract(&input);
            assert!(out.text.is_empty());
            assert!(
                started.elapsed() < Duration::from_secs(5),
                "{} took {:?}",
                fill as char,
                started.elapsed()
            );
        }
    }
}
