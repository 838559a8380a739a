//! `try_files` extraction from an nginx-style document.
//!
//! # Responsibilities
//! - Tokenize the document (words, quoted strings, `{`, `}`, `;`, comments)
//! - Find the outermost `location <prefix>` block by brace depth
//! - Return the arguments of that block's own `try_files` directive
//!
//! # Design Decisions
//! - Brace-depth scanning instead of pattern matching, so nested blocks
//!   and braces inside comments cannot cut the block short
//! - Only the subset of the grammar needed for one directive is understood
//! - Regex locations (`~`, `~*`) never match a prefix

use thiserror::Error;

use crate::site::rule::RouteRule;

const LOCATION: &str = "location";
const TRY_FILES: &str = "try_files";

/// Why no rule could be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no `location {0}` block found")]
    BlockMissing(String),

    #[error("no `try_files` directive in `location {0}` block")]
    DirectiveMissing(String),

    #[error("`try_files` in `location {0}` has no arguments")]
    EmptyDirective(String),

    #[error("unbalanced braces")]
    Unbalanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Open,
    Close,
    Semicolon,
}

/// Extract the `try_files` templates of the `location <prefix>` block.
///
/// `prefix` matches with or without its trailing slash, so `/docs/` finds
/// both `location /docs/ {` and `location /docs {`.
pub fn extract(document: &str, prefix: &str) -> Result<RouteRule, ExtractError> {
    let tokens = tokenize(document);
    let open = find_location(&tokens, prefix)?;
    let body = block_body(&tokens, open)?;
    let args = directive_args(body, TRY_FILES)
        .ok_or_else(|| ExtractError::DirectiveMissing(prefix.to_string()))?;

    if args.is_empty() {
        return Err(ExtractError::EmptyDirective(prefix.to_string()));
    }
    Ok(RouteRule::new(args))
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b';')
}

fn tokenize(document: &str) -> Vec<Token<'_>> {
    let bytes = document.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'{' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b'}' => {
                tokens.push(Token::Close);
                i += 1;
            }
            b';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            quote @ (b'"' | b'\'') => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != quote {
                    if bytes[end] == b'\\' {
                        end += 1;
                    }
                    end += 1;
                }
                let end = end.min(bytes.len());
                tokens.push(Token::Word(&document[start..end]));
                i = end + 1;
            }
            _ => {
                let start = i;
                while i < bytes.len() && !is_delimiter(bytes[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(&document[start..i]));
            }
        }
    }
    tokens
}

fn location_matches(path: &str, prefix: &str) -> bool {
    path == prefix || (prefix.len() > 1 && path == prefix.trim_end_matches('/'))
}

/// Index of the `{` opening the shallowest matching location block.
fn find_location(tokens: &[Token<'_>], prefix: &str) -> Result<usize, ExtractError> {
    let mut depth = 0usize;
    let mut at_statement_start = true;
    let mut best: Option<(usize, usize)> = None;

    for (i, token) in tokens.iter().enumerate() {
        match *token {
            Token::Open => {
                depth += 1;
                at_statement_start = true;
            }
            Token::Close => {
                depth = depth.checked_sub(1).ok_or(ExtractError::Unbalanced)?;
                at_statement_start = true;
            }
            Token::Semicolon => at_statement_start = true,
            Token::Word(word) => {
                if at_statement_start && word == LOCATION {
                    if let Some(open) = location_header(&tokens[i + 1..], prefix) {
                        if best.map_or(true, |(d, _)| depth < d) {
                            best = Some((depth, i + 1 + open));
                        }
                    }
                }
                at_statement_start = false;
            }
        }
    }

    best.map(|(_, open)| open)
        .ok_or_else(|| ExtractError::BlockMissing(prefix.to_string()))
}

/// Parse `[modifier] path {` and return the offset of `{` when the path matches.
fn location_header(rest: &[Token<'_>], prefix: &str) -> Option<usize> {
    let open = rest.iter().position(|t| !matches!(t, Token::Word(_)))?;
    if rest[open] != Token::Open {
        return None;
    }

    let words: Vec<&str> = rest[..open]
        .iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(*w),
            _ => None,
        })
        .collect();

    let path = match words.as_slice() {
        [path] => *path,
        ["=" | "^~", path] => *path,
        _ => return None,
    };
    location_matches(path, prefix).then_some(open)
}

/// Tokens strictly between the `{` at `open` and its matching `}`.
fn block_body<'t, 'a>(tokens: &'t [Token<'a>], open: usize) -> Result<&'t [Token<'a>], ExtractError> {
    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        match token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&tokens[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }
    Err(ExtractError::Unbalanced)
}

/// Arguments of the first top-level `name ... ;` statement in `body`.
fn directive_args(body: &[Token<'_>], name: &str) -> Option<Vec<String>> {
    let mut depth = 0usize;
    let mut at_statement_start = true;

    for (i, token) in body.iter().enumerate() {
        match *token {
            Token::Open => {
                depth += 1;
                at_statement_start = true;
            }
            Token::Close => {
                depth = depth.saturating_sub(1);
                at_statement_start = true;
            }
            Token::Semicolon => at_statement_start = true,
            Token::Word(word) => {
                if depth == 0 && at_statement_start && word == name {
                    let mut args = Vec::new();
                    for next in &body[i + 1..] {
                        match next {
                            Token::Word(arg) => args.push(arg.to_string()),
                            Token::Semicolon => return Some(args),
                            _ => return None,
                        }
                    }
                    return None;
                }
                at_statement_start = false;
            }
        }
    }
    None
}
