//! HTML pretty-printer.
//!
//! Block elements go on their own line, indented two spaces per level.
//! Runs of text and inline elements stay on one line with whitespace
//! collapsed. `pre`, `textarea`, `script` and `style` bodies are copied
//! verbatim.

const INDENT: &str = "  ";

/// Elements whose body is never reformatted.
const RAW: &[&str] = &["pre", "textarea", "script", "style"];

/// Elements without a closing tag.
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that flow with surrounding text.
const INLINE: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "time", "u", "var", "wbr",
];

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    /// Comment, doctype or processing instruction.
    Special(&'a str),
    Open {
        name: String,
        raw: &'a str,
        self_closing: bool,
    },
    Close {
        name: String,
        raw: &'a str,
    },
}

/// Re-indent `html` with two spaces per nesting level.
pub fn beautify_html(html: &str) -> String {
    let mut printer = Printer::default();
    let mut rest = html;

    while !rest.is_empty() {
        let (token, tail) = next_token(rest);
        rest = tail;

        match token {
            Token::Text(text) => printer.push_inline_text(text),
            Token::Special(raw) => printer.line(raw),
            Token::Close { name, raw } => {
                if INLINE.contains(&name.as_str()) {
                    printer.push_inline(raw);
                } else {
                    printer.dedent();
                    printer.line(raw);
                }
            }
            Token::Open {
                name,
                raw,
                self_closing,
            } => {
                let name = name.as_str();
                if RAW.contains(&name) && !self_closing {
                    let (body, close, tail) = split_raw_body(rest, name);
                    rest = tail;
                    printer.raw_block(raw, body, close);
                } else if INLINE.contains(&name) {
                    printer.push_inline(raw);
                } else if self_closing || VOID.contains(&name) {
                    printer.line(raw);
                } else if let Some((body, close, tail)) = inline_body(rest, name) {
                    rest = tail;
                    printer.line(&format!("{raw}{body}{close}"));
                } else {
                    printer.line(raw);
                    printer.indent();
                }
            }
        }
    }

    printer.finish()
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
    /// Pending inline run, whitespace already collapsed.
    pending: String,
}

impl Printer {
    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.flush();
        self.depth = self.depth.saturating_sub(1);
    }

    fn push_inline_text(&mut self, text: &str) {
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() && !self.pending.is_empty() {
                self.pending.push(' ');
            }
            return;
        }
        if text.starts_with(char::is_whitespace) && !self.pending.is_empty() {
            self.pending.push(' ');
        }
        let mut first = true;
        for word in words {
            if !first {
                self.pending.push(' ');
            }
            self.pending.push_str(word);
            first = false;
        }
        if text.ends_with(char::is_whitespace) {
            self.pending.push(' ');
        }
    }

    fn push_inline(&mut self, raw: &str) {
        self.pending.push_str(raw);
    }

    fn flush(&mut self) {
        let run = self.pending.trim();
        if !run.is_empty() {
            let run = run.to_string();
            self.write_line(&run);
        }
        self.pending.clear();
    }

    fn line(&mut self, raw: &str) {
        self.flush();
        self.write_line(raw.trim());
    }

    fn raw_block(&mut self, open: &str, body: &str, close: &str) {
        self.flush();
        self.write_indent();
        self.out.push_str(open);
        self.out.push_str(body);
        self.out.push_str(close);
        self.out.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn write_line(&mut self, line: &str) {
        self.write_indent();
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

/// Split the next token off `input`.
fn next_token(input: &str) -> (Token<'_>, &str) {
    if !input.starts_with('<') {
        let end = input.find('<').unwrap_or(input.len());
        return (Token::Text(&input[..end]), &input[end..]);
    }

    if let Some(body) = input.strip_prefix("<!--") {
        let end = body.find("-->").map_or(input.len(), |i| i + 4 + 3);
        return (Token::Special(&input[..end]), &input[end..]);
    }

    let bytes = input.as_bytes();
    let second = bytes.get(1).copied().unwrap_or(b' ');
    let is_special = second == b'!' || second == b'?';
    let is_close = second == b'/';
    let starts_name = |b: u8| b.is_ascii_alphabetic();

    if !is_special && !is_close && !starts_name(second) {
        let end = input[1..].find('<').map_or(input.len(), |i| i + 1);
        return (Token::Text(&input[..end]), &input[end..]);
    }

    let end = tag_end(input);
    let raw = &input[..end];
    let rest = &input[end..];

    if is_special {
        return (Token::Special(raw), rest);
    }

    let name_start = if is_close { 2 } else { 1 };
    let name: String = raw[name_start..]
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect::<String>()
        .to_ascii_lowercase();

    if is_close {
        (Token::Close { name, raw }, rest)
    } else {
        let self_closing = raw.trim_end_matches('>').trim_end().ends_with('/');
        (
            Token::Open {
                name,
                raw,
                self_closing,
            },
            rest,
        )
    }
}

/// Body of an element holding only text and inline elements, collapsed to
/// one line, with its closing tag and the remaining input.
fn inline_body<'a>(input: &'a str, name: &str) -> Option<(String, &'a str, &'a str)> {
    let mut run = Printer::default();
    let mut rest = input;
    while !rest.is_empty() {
        let (token, tail) = next_token(rest);
        match token {
            Token::Text(text) => run.push_inline_text(text),
            Token::Close { name: inner, raw } if inner == name => {
                return Some((run.pending.trim().to_string(), raw, tail));
            }
            Token::Open { name: inner, raw, .. } | Token::Close { name: inner, raw }
                if INLINE.contains(&inner.as_str()) =>
            {
                run.push_inline(raw);
            }
            _ => return None,
        }
        rest = tail;
    }
    None
}

/// Byte offset just past the `>` closing the tag at the start of `input`.
fn tag_end(input: &str) -> usize {
    let mut quote = None;
    for (i, c) in input.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return i + 1,
            _ => {}
        }
    }
    input.len()
}

/// Split the body of a raw element from its closing tag.
fn split_raw_body<'a>(input: &'a str, name: &str) -> (&'a str, &'a str, &'a str) {
    let lower = input.to_ascii_lowercase();
    let needle = format!("</{name}");
    match lower.find(&needle) {
        Some(start) => {
            let end = start + tag_end(&input[start..]);
            (&input[..start], &input[start..end], &input[end..])
        }
        None => (input, "", ""),
    }
}
