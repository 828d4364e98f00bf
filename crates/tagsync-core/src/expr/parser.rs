use crate::domain::TagName;
use crate::expr::ast::Expr;
use crate::expr::token::{Token, TokenStack};
use crate::expr::ExprError;

const WILDCARD_CHARS: [char; 3] = ['%', '#', '*'];

/// Highest construct a call site may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Atom,
    Intersection,
    Union,
}

/// Deepest run of nested groups and negations a query may use.
pub const MAX_NESTING: usize = 256;
/// Most tag literals a single query may mention.
pub const MAX_LITERALS: usize = 1024;

/// Parses a full expression. Any token left over after the top level is an
/// error; nothing is recovered.
pub fn parse(tokens: TokenStack) -> Result<Expr, ExprError> {
    if tokens.is_empty() {
        return Err(ExprError::malformed("empty expression"));
    }
    let mut parser = Parser {
        tokens,
        depth: 0,
        literals: 0,
    };
    let expr = parser.level(Level::Union)?;
    match parser.tokens.pop() {
        None => Ok(expr),
        Some(Token::Close) => Err(ExprError::malformed("unbalanced '}'")),
        Some(token) => Err(ExprError::malformed(format!(
            "unexpected token {}",
            describe(&token)
        ))),
    }
}

/// Recursive descent state. `depth` and `literals` bound the size of the
/// tree so later recursive walks over it stay shallow.
struct Parser {
    tokens: TokenStack,
    depth: usize,
    literals: usize,
}

impl Parser {
    fn level(&mut self, max: Level) -> Result<Expr, ExprError> {
        let mut left = self.atom()?;
        loop {
            match self.tokens.peek() {
                None | Some(Token::Close) => break,
                Some(Token::Comma) => {
                    if max < Level::Union {
                        break;
                    }
                    self.tokens.pop();
                    let right = self.level(Level::Intersection)?;
                    left = Expr::Or(Box::new(left), Box::new(right));
                }
                Some(_) => {
                    if max < Level::Intersection {
                        break;
                    }
                    let right = self.atom()?;
                    left = Expr::And(Box::new(left), Box::new(right));
                }
            }
        }
        Ok(left)
    }

    fn atom(&mut self) -> Result<Expr, ExprError> {
        match self.tokens.pop() {
            None => Err(ExprError::malformed("expression ends after an operator")),
            Some(Token::Open) => self.nested(|parser| {
                let inner = parser.level(Level::Union)?;
                match parser.tokens.pop() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(ExprError::malformed("unbalanced '{'")),
                }
            }),
            Some(Token::Close) => Err(ExprError::malformed("unexpected '}'")),
            Some(Token::Comma) => Err(ExprError::malformed("unexpected ','")),
            Some(Token::Word(word)) => self.word(&word),
        }
    }

    fn word(&mut self, word: &str) -> Result<Expr, ExprError> {
        match word.strip_prefix('-') {
            // bare `-` negates whatever atom follows, e.g. `-{a,b}`
            Some("") => self.nested(|parser| {
                Ok(Expr::Not(Box::new(parser.level(Level::Atom)?)))
            }),
            Some(rest) => self.nested(|parser| Ok(Expr::Not(Box::new(parser.word(rest)?)))),
            None => {
                self.literals += 1;
                if self.literals > MAX_LITERALS {
                    return Err(ExprError::malformed(format!(
                        "more than {MAX_LITERALS} tags in one expression"
                    )));
                }
                literal(word)
            }
        }
    }

    fn nested(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<Expr, ExprError>,
    ) -> Result<Expr, ExprError> {
        if self.depth >= MAX_NESTING {
            return Err(ExprError::malformed(format!(
                "expression nested deeper than {MAX_NESTING} levels"
            )));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }
}

fn literal(raw: &str) -> Result<Expr, ExprError> {
    if raw.starts_with('~') {
        return Err(ExprError::malformed(format!("reserved prefix in {raw}")));
    }
    if raw.contains(WILDCARD_CHARS) {
        return Err(ExprError::malformed(format!(
            "wildcards are not supported: {raw}"
        )));
    }
    let tag =
        TagName::new(raw).map_err(|_| ExprError::malformed(format!("invalid tag {raw:?}")))?;
    Ok(Expr::Literal { tag, negate: false })
}

fn describe(token: &Token) -> String {
    match token {
        Token::Open => "'{'".to_string(),
        Token::Close => "'}'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Word(word) => format!("{word:?}"),
    }
}
