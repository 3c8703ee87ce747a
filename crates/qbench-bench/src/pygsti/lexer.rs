//! Lexer for PyGSTi circuit strings.

use logos::Logos;

/// Tokens of the PyGSTi circuit grammar.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// The empty circuit `{}`.
    #[token("{}")]
    Empty,

    /// A gate name such as `Gxpi2` or `Gcnot`. Names end at the next `G`.
    #[regex(r"G[a-z0-9_]*", |lex| lex.slice().to_string())]
    Gate(String),

    /// A qubit index or repetition count, optionally prefixed with `Q`.
    #[regex(r"Q?[0-9]+", |lex| lex.slice().trim_start_matches('Q').parse::<u32>().ok())]
    Index(u32),

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("^")]
    Caret,

    #[token("@")]
    At,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Empty => write!(f, "{{}}"),
            Token::Gate(name) => write!(f, "{name}"),
            Token::Index(v) => write!(f, "{v}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Caret => write!(f, "^"),
            Token::At => write!(f, "@"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Tokenize a circuit string, stopping at the first invalid token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => {
                let span = lexer.span();
                return Err(format!(
                    "invalid token '{}' at column {}",
                    &source[span.clone()],
                    span.start + 1
                ));
            }
        }
    }

    Ok(tokens)
}
