#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open,
    Close,
    Comma,
    Word(String),
}

/// Tokens stored in reverse, so `pop` yields them left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStack {
    reversed: Vec<Token>,
}

impl TokenStack {
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        tokens.reverse();
        Self { reversed: tokens }
    }

    pub fn pop(&mut self) -> Option<Token> {
        self.reversed.pop()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.reversed.last()
    }

    pub fn is_empty(&self) -> bool {
        self.reversed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reversed.len()
    }
}

pub fn tokenize(input: &str) -> TokenStack {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.peek() {
                Some(&next @ ('{' | '}' | ',')) => {
                    word.push(next);
                    chars.next();
                }
                _ => word.push('\\'),
            },
            '{' | '}' | ',' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(match ch {
                    '{' => Token::Open,
                    '}' => Token::Close,
                    _ => Token::Comma,
                });
            }
            ch if ch.is_whitespace() => flush_word(&mut word, &mut tokens),
            ch => word.push(ch),
        }
    }
    flush_word(&mut word, &mut tokens);

    TokenStack::from_tokens(tokens)
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}
