#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Nil,
    And,
    Or,
    Not,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

/// A token and the byte offset where it starts.
pub type Spanned = (Token, usize);

fn keyword(word: &str) -> Option<Token> {
    let tok = match word {
        "true" => Token::True,
        "false" => Token::False,
        "nil" => Token::Nil,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "contains" => Token::Contains,
        "startsWith" => Token::StartsWith,
        "endsWith" => Token::EndsWith,
        "matches" => Token::Matches,
        _ => return None,
    };
    Some(tok)
}

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, String> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut num_str = String::new();
                let mut is_float = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        num_str.push(c);
                        chars.next();
                    } else if c == '.' && !is_float {
                        // `1.foo` is not a number; only consume the dot before a digit.
                        let mut ahead = chars.clone();
                        ahead.next();
                        match ahead.peek() {
                            Some(&(_, d)) if d.is_ascii_digit() => {
                                is_float = true;
                                num_str.push('.');
                                chars.next();
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                let tok = if is_float {
                    Token::Float(
                        num_str
                            .parse()
                            .map_err(|_| format!("invalid number {num_str}"))?,
                    )
                } else {
                    Token::Int(
                        num_str
                            .parse()
                            .map_err(|_| format!("integer {num_str} out of range"))?,
                    )
                };
                tokens.push((tok, pos));
            }
            '"' | '\'' => {
                let quote = ch;
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            let (_, esc) = chars
                                .next()
                                .ok_or_else(|| format!("unterminated string at position {pos}"))?;
                            s.push(match esc {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                '\\' | '"' | '\'' => esc,
                                other => return Err(format!("unknown escape \\{other}")),
                            });
                        }
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => s.push(c),
                    }
                }
                if !closed {
                    return Err(format!("unterminated string at position {pos}"));
                }
                tokens.push((Token::Str(s), pos));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // Field names after `.` are never keywords (`github.event.in`).
                let after_dot = matches!(tokens.last(), Some((Token::Dot, _)));
                let tok = match keyword(&word) {
                    Some(kw) if !after_dot => kw,
                    _ => Token::Ident(word),
                };
                tokens.push((tok, pos));
            }
            _ => {
                chars.next();
                let next = chars.peek().map(|&(_, c)| c);
                let (tok, wide) = match (ch, next) {
                    ('=', Some('=')) => (Token::Eq, true),
                    ('!', Some('=')) => (Token::Ne, true),
                    ('<', Some('=')) => (Token::Le, true),
                    ('>', Some('=')) => (Token::Ge, true),
                    ('&', Some('&')) => (Token::And, true),
                    ('|', Some('|')) => (Token::Or, true),
                    ('<', _) => (Token::Lt, false),
                    ('>', _) => (Token::Gt, false),
                    ('!', _) => (Token::Bang, false),
                    ('+', _) => (Token::Plus, false),
                    ('-', _) => (Token::Minus, false),
                    ('*', _) => (Token::Star, false),
                    ('/', _) => (Token::Slash, false),
                    ('%', _) => (Token::Percent, false),
                    ('.', _) => (Token::Dot, false),
                    (',', _) => (Token::Comma, false),
                    ('(', _) => (Token::LParen, false),
                    (')', _) => (Token::RParen, false),
                    ('[', _) => (Token::LBracket, false),
                    (']', _) => (Token::RBracket, false),
                    ('=', _) => return Err(format!("unexpected '=' at position {pos} (use ==)")),
                    (c, _) => return Err(format!("unexpected character '{c}' at position {pos}")),
                };
                if wide {
                    chars.next();
                }
                tokens.push((tok, pos));
            }
        }
    }

    Ok(tokens)
}
