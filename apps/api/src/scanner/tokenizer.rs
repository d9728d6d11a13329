//! Whitespace- and punctuation-aware tokenizer.
//!
//! Text is split on whitespace first. Inside each chunk:
//! - leading punctuation (brackets, quotes, bullets) becomes one token per char,
//! - trailing punctuation (brackets, quotes, `, ; : ! ? .`) likewise,
//! - `/` and `\` are split out as infixes, `-` only between two alphanumerics.
//!
//! Everything else stays inside the token, so `c++`, `c#`, `node.js` and
//! `asp.net` survive as single tokens.

/// A token borrowed from the source text. Offsets are byte offsets and always
/// fall on char boundaries, so `&text[start..end] == text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub lower: String,
    pub start: usize,
    pub end: usize,
}

impl<'a> Token<'a> {
    fn new(source: &'a str, start: usize, end: usize) -> Self {
        let text = &source[start..end];
        Self {
            text,
            lower: text.to_lowercase(),
            start,
            end,
        }
    }
}

fn is_prefix(c: char) -> bool {
    matches!(
        c,
        '(' | '[' | '{' | '<' | '"' | '\'' | '“' | '‘' | '«' | '*' | '•' | '·' | '–' | '—'
    )
}

fn is_suffix(c: char) -> bool {
    matches!(
        c,
        ')' | ']' | '}' | '>' | '"' | '\'' | '”' | '’' | '»' | ',' | ';' | ':' | '!' | '?' | '.'
            | '…'
    )
}

pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chunk_start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        match (c.is_whitespace(), chunk_start) {
            (true, Some(start)) => {
                push_chunk(text, start, idx, &mut tokens);
                chunk_start = None;
            }
            (false, None) => chunk_start = Some(idx),
            _ => {}
        }
    }
    if let Some(start) = chunk_start {
        push_chunk(text, start, text.len(), &mut tokens);
    }

    tokens
}

/// Lowercased token texts of a phrase, used to turn phrase patterns into
/// token rules.
pub fn tokenize_lower(phrase: &str) -> Vec<String> {
    tokenize(phrase).into_iter().map(|t| t.lower).collect()
}

fn push_chunk<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Token<'a>>) {
    let mut lo = start;
    let mut hi = end;

    while let Some(c) = text[lo..hi].chars().next() {
        if !is_prefix(c) {
            break;
        }
        out.push(Token::new(text, lo, lo + c.len_utf8()));
        lo += c.len_utf8();
    }

    let mut suffixes = Vec::new();
    while let Some(c) = text[lo..hi].chars().next_back() {
        if !is_suffix(c) {
            break;
        }
        hi -= c.len_utf8();
        suffixes.push((hi, hi + c.len_utf8()));
    }

    push_infixes(text, lo, hi, out);

    out.extend(
        suffixes
            .into_iter()
            .rev()
            .map(|(s, e)| Token::new(text, s, e)),
    );
}

fn push_infixes<'a>(text: &'a str, lo: usize, hi: usize, out: &mut Vec<Token<'a>>) {
    let chars: Vec<(usize, char)> = text[lo..hi].char_indices().collect();
    let mut piece_start = lo;

    for (i, &(idx, c)) in chars.iter().enumerate() {
        let split = match c {
            '/' | '\\' => true,
            '-' => {
                i > 0
                    && i + 1 < chars.len()
                    && chars[i - 1].1.is_alphanumeric()
                    && chars[i + 1].1.is_alphanumeric()
            }
            _ => false,
        };
        if split {
            let at = lo + idx;
            if at > piece_start {
                out.push(Token::new(text, piece_start, at));
            }
            out.push(Token::new(text, at, at + c.len_utf8()));
            piece_start = at + c.len_utf8();
        }
    }

    if hi > piece_start {
        out.push(Token::new(text, piece_start, hi));
    }
}
