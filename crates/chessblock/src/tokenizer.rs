//! Move text lexer.

use std::sync::LazyLock;

use regex::Regex;

use crate::nag::Nag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Move(String),
    Comment(String),
    Nag(Nag),
    OpenVariation,
    CloseVariation,
}

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[\w+\s+"[^"]*"\]"#).expect("header pattern is valid"));
static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:1-0|0-1|1/2-1/2|\*)\s*$").expect("result pattern is valid")
});

fn ends_move(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | '$')
}

/// Lex move text into tokens. Header segments and a trailing game result are
/// removed first; move numbers and unknown characters produce no tokens.
pub fn tokenize(move_text: &str) -> Vec<Token> {
    let without_headers = HEADER_RE.replace_all(move_text, " ");
    let text = RESULT_RE.replace(&without_headers, "");
    let chars: Vec<char> = text.chars().collect();

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                let Some(len) = chars[i + 1..].iter().position(|&ch| ch == '}') else {
                    // Unterminated comment: drop the rest of the input.
                    break;
                };
                let body: String = chars[i + 1..i + 1 + len].iter().collect();
                tokens.push(Token::Comment(body.trim().to_string()));
                i += len + 2;
            }
            '(' => {
                tokens.push(Token::OpenVariation);
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseVariation);
                i += 1;
            }
            '$' => {
                let digits: String = chars[i + 1..]
                    .iter()
                    .take_while(|ch| ch.is_ascii_digit())
                    .collect();
                if let Some(nag) = Nag::from_digits(&digits) {
                    tokens.push(Token::Nag(nag));
                }
                i += 1 + digits.len();
            }
            '0'..='9' => {
                let run: String = chars[i..].iter().take_while(|&&ch| !ends_move(ch)).collect();
                if is_zero_castling(&run) {
                    tokens.push(Token::Move(run.clone()));
                    i += run.chars().count();
                } else {
                    // Move number: digits then dots. Anything else numeric is noise.
                    let digits = chars[i..].iter().take_while(|ch| ch.is_ascii_digit()).count();
                    let dots = chars[i + digits..].iter().take_while(|&&ch| ch == '.').count();
                    i += digits + dots;
                }
            }
            c if c.is_ascii_alphabetic() => {
                let run: String = chars[i..].iter().take_while(|&&ch| !ends_move(ch)).collect();
                i += run.chars().count();
                tokens.push(Token::Move(run));
            }
            _ => i += 1,
        }
    }
    tokens
}

fn is_zero_castling(run: &str) -> bool {
    let bare = run.trim_end_matches(['+', '#', '!', '?']);
    bare == "0-0" || bare == "0-0-0"
}
