use super::lexer::{Spanned, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Contains => "contains",
            BinaryOp::StartsWith => "startsWith",
            BinaryOp::EndsWith => "endsWith",
            BinaryOp::Matches => "matches",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    List(Vec<Expr>),
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Collect every top-level variable name referenced by the expression.
    pub fn idents<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Ident(name) => out.push(name),
            Expr::List(items) => items.iter().for_each(|e| e.idents(out)),
            Expr::Member(base, _) => base.idents(out),
            Expr::Index(base, idx) => {
                base.idents(out);
                idx.idents(out);
            }
            Expr::Unary(_, e) => e.idents(out),
            Expr::Binary(_, l, r) => {
                l.idents(out);
                r.idents(out);
            }
        }
    }
}

/// Recursive descent parser. Precedence, loosest first:
///
/// ```text
/// or      = and (("or" | "||") and)*
/// and     = eq (("and" | "&&") eq)*
/// eq      = rel (("==" | "!=") rel)*
/// rel     = add (("<" | "<=" | ">" | ">=" | "in" | "not in" | "contains"
///               | "startsWith" | "endsWith" | "matches") add)*
/// add     = mul (("+" | "-") mul)*
/// mul     = unary (("*" | "/" | "%") unary)*
/// unary   = ("!" | "not" | "-") unary | postfix
/// postfix = primary ("." IDENT | "[" or "]")*
/// primary = literal | IDENT | "(" or ")" | "[" (or ("," or)*)? "]"
/// ```
///
/// Operator chains, unary prefixes, postfix accessors and brackets all count
/// towards [`MAX_DEPTH`], which bounds the height of the resulting tree.
pub fn parse(tokens: &[Spanned]) -> Result<Expr, String> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    if let Some((tok, at)) = parser.tokens.get(parser.pos) {
        return Err(format!("unexpected {} at position {at}", describe(tok)));
    }
    Ok(expr)
}

pub const MAX_DEPTH: usize = 128;

struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&'t Spanned> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(format!("expression nested too deeply (limit {MAX_DEPTH})"));
        }
        Ok(())
    }

    fn expect(&mut self, want: Token) -> Result<(), String> {
        match self.advance() {
            Some((tok, _)) if *tok == want => Ok(()),
            Some((tok, at)) => Err(format!(
                "expected {} but found {} at position {at}",
                describe(&want),
                describe(tok)
            )),
            None => Err(format!(
                "expected {} but reached end of expression",
                describe(&want)
            )),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            self.enter()?;
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut left = self.parse_equality()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            self.enter()?;
            let right = self.parse_equality()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => break,
            };
            self.pos += 1;
            self.enter()?;
            let right = self.parse_relational()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                Some(Token::In) => BinaryOp::In,
                Some(Token::Contains) => BinaryOp::Contains,
                Some(Token::StartsWith) => BinaryOp::StartsWith,
                Some(Token::EndsWith) => BinaryOp::EndsWith,
                Some(Token::Matches) => BinaryOp::Matches,
                Some(Token::Not) if self.peek_at(1) == Some(&Token::In) => {
                    self.pos += 1;
                    BinaryOp::NotIn
                }
                _ => break,
            };
            self.pos += 1;
            self.enter()?;
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            self.enter()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            self.enter()?;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        let op = match self.peek() {
            Some(Token::Bang) | Some(Token::Not) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let mark = self.depth;
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    self.enter()?;
                    match self.advance() {
                        Some((Token::Ident(name), _)) => {
                            expr = Expr::Member(Box::new(expr), name.clone());
                        }
                        Some((tok, at)) => {
                            return Err(format!(
                                "expected field name after '.' but found {} at position {at}",
                                describe(tok)
                            ))
                        }
                        None => return Err("expected field name after '.'".to_string()),
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    self.enter()?;
                    let index = self.parse_or()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }
        self.depth = mark;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let (tok, at) = self
            .advance()
            .ok_or_else(|| "unexpected end of expression".to_string())?;
        let expr = match tok {
            Token::Int(n) => Expr::Literal(Literal::Int(*n)),
            Token::Float(f) => Expr::Literal(Literal::Float(*f)),
            Token::Str(s) => Expr::Literal(Literal::Str(s.clone())),
            Token::True => Expr::Literal(Literal::Bool(true)),
            Token::False => Expr::Literal(Literal::Bool(false)),
            Token::Nil => Expr::Literal(Literal::Nil),
            Token::Ident(name) => Expr::Ident(name.clone()),
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                self.depth -= 1;
                inner
            }
            Token::LBracket => {
                self.enter()?;
                let mut items = Vec::new();
                if self.peek() != Some(&Token::RBracket) {
                    loop {
                        items.push(self.parse_or()?);
                        if self.peek() == Some(&Token::Comma) {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
                self.expect(Token::RBracket)?;
                self.depth -= 1;
                Expr::List(items)
            }
            other => return Err(format!("unexpected {} at position {at}", describe(other))),
        };
        Ok(expr)
    }
}

fn describe(tok: &Token) -> String {
    let text = match tok {
        Token::Int(n) => return format!("number {n}"),
        Token::Float(f) => return format!("number {f}"),
        Token::Str(s) => return format!("string {s:?}"),
        Token::Ident(name) => return format!("identifier `{name}`"),
        Token::True => "true",
        Token::False => "false",
        Token::Nil => "nil",
        Token::And => "and",
        Token::Or => "or",
        Token::Not => "not",
        Token::In => "in",
        Token::Contains => "contains",
        Token::StartsWith => "startsWith",
        Token::EndsWith => "endsWith",
        Token::Matches => "matches",
        Token::Eq => "==",
        Token::Ne => "!=",
        Token::Lt => "<",
        Token::Le => "<=",
        Token::Gt => ">",
        Token::Ge => ">=",
        Token::Plus => "+",
        Token::Minus => "-",
        Token::Star => "*",
        Token::Slash => "/",
        Token::Percent => "%",
        Token::Bang => "!",
        Token::Dot => ".",
        Token::Comma => ",",
        Token::LParen => "(",
        Token::RParen => ")",
        Token::LBracket => "[",
        Token::RBracket => "]",
    };
    format!("`{text}`")
}
