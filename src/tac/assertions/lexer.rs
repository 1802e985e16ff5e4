/*!
Tokenization of assertion lines.

A line is first split into words: operators are cut out of the text (longest
match first, so `<=` never becomes `<` `=`) and everything else is split on
whitespace. Each word is then classified, in priority order, as a modifier
following `@`, a declared constant, an operator, a rule prefix, a number or
a counter reference. Anything else is a syntax error naming the word and the
whole line.
*/

use super::error::{AssertionError, AssertionResult};
use super::rule::{RuleMatch, RulePrefix};
use std::fmt;

lazy_static::lazy_static! {
    static ref NUMBER_PATTERN: regex::Regex =
        regex::Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("Failed to compile number pattern");

    /// `[(c|s)port[N].]name` - kind letter, port number, dotted counter name
    pub(super) static ref COUNTER_PATTERN: regex::Regex = regex::Regex::new(
        r"^(?:([cs])port([0-9]+)?\.)?([a-zA-Z0-9._]+)$"
    ).expect("Failed to compile counter reference pattern");
}

/// Named numeric constants usable in expressions
const CONSTANTS: &[(&str, f64)] = &[("const_name", 0.0)];

/// Operator symbols, two-character symbols first
const SYMBOLS: &[&str] = &[
    "<=", ">=", "==", "!=", "!", "*", "/", "%", "+", "-", "<", ">", "&", "|", "(", ")", "@",
];

/// Rate modifier attached to a counter reference with `@`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    /// Delta over the last second
    Sec,
    /// Delta over the last minute
    Min,
}

impl Modifier {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "sec" => Some(Modifier::Sec),
            "min" => Some(Modifier::Min),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Sec => "sec",
            Modifier::Min => "min",
        }
    }

    /// Window length in ticks
    pub fn window(&self) -> usize {
        match self {
            Modifier::Sec => 2,
            Modifier::Min => 120,
        }
    }
}

/// Associativity of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Expression operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Not,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "!" => Operator::Not,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "%" => Operator::Modulo,
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "<" => Operator::Less,
            "<=" => Operator::LessOrEqual,
            ">" => Operator::Greater,
            ">=" => Operator::GreaterOrEqual,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "&" => Operator::And,
            "|" => Operator::Or,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Not => "!",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::And => "&",
            Operator::Or => "|",
        }
    }

    /// Lower binds tighter
    pub fn priority(&self) -> u8 {
        match self {
            Operator::Not => 3,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 5,
            Operator::Add | Operator::Subtract => 6,
            Operator::Less
            | Operator::LessOrEqual
            | Operator::Greater
            | Operator::GreaterOrEqual => 8,
            Operator::Equal | Operator::NotEqual => 9,
            Operator::And => 13,
            Operator::Or => 14,
        }
    }

    pub fn associativity(&self) -> Associativity {
        match self {
            Operator::Not => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Not)
    }
}

/// Token classes
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Rule(RulePrefix),
    /// Counter reference, as written (`cport1.http.attempts`)
    Variable(String),
    Number(f64),
    Operator(Operator),
    LeftParen,
    RightParen,
}

/// A classified word of an assertion line
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub modifier: Option<Modifier>,
}

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            modifier: None,
        }
    }

    pub fn number(value: f64) -> Self {
        Self::new(TokenKind::Number(value))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(TokenKind::Variable(name.into()))
    }

    pub fn operator(op: Operator) -> Self {
        Self::new(TokenKind::Operator(op))
    }

    /// Binding key of a variable token: the name plus `@modifier` if any.
    /// The same counter with and without a modifier are distinct variables.
    pub fn variable_key(&self) -> Option<String> {
        match &self.kind {
            TokenKind::Variable(name) => Some(match self.modifier {
                Some(m) => format!("{}@{}", name, m.keyword()),
                None => name.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Rule(rule) => write!(f, "{}", rule),
            TokenKind::Variable(_) => {
                write!(f, "{}", self.variable_key().unwrap_or_default())
            }
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Operator(op) => f.write_str(op.symbol()),
            TokenKind::LeftParen => f.write_str("("),
            TokenKind::RightParen => f.write_str(")"),
        }
    }
}

/// Piece of a line before classification
#[derive(Debug, Clone, PartialEq)]
enum Lexeme<'a> {
    Symbol(&'static str),
    Word(&'a str),
}

/// Cut operators out of the line and split the rest on whitespace
fn split_words(expression: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut pos = 0;

    while pos < expression.len() {
        let rest = &expression[pos..];
        let symbol = SYMBOLS.iter().copied().find(|s| rest.starts_with(*s));
        let ch = rest.chars().next().unwrap_or(' ');

        if symbol.is_some() || ch.is_whitespace() {
            if let Some(start) = word_start.take() {
                lexemes.push(Lexeme::Word(&expression[start..pos]));
            }
        }
        match symbol {
            Some(symbol) => {
                lexemes.push(Lexeme::Symbol(symbol));
                pos += symbol.len();
            }
            None => {
                if !ch.is_whitespace() && word_start.is_none() {
                    word_start = Some(pos);
                }
                pos += ch.len_utf8();
            }
        }
    }
    if let Some(start) = word_start {
        lexemes.push(Lexeme::Word(&expression[start..]));
    }
    lexemes
}

/// Tokenize a full assertion line, rule prefix included
pub fn tokenize(expression: &str) -> AssertionResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut pending_modifier = false;

    for lexeme in split_words(expression) {
        if pending_modifier {
            pending_modifier = false;
            let word = match lexeme {
                Lexeme::Word(w) => w,
                Lexeme::Symbol(s) => s,
            };
            let modifier =
                Modifier::from_keyword(word).ok_or_else(|| AssertionError::UnknownModifier {
                    modifier: word.to_string(),
                    expression: expression.to_string(),
                })?;
            match tokens.last_mut() {
                Some(token)
                    if matches!(token.kind, TokenKind::Variable(_)) && token.modifier.is_none() =>
                {
                    token.modifier = Some(modifier)
                }
                _ => {
                    return Err(AssertionError::UnknownModifier {
                        modifier: format!("@{}", word),
                        expression: expression.to_string(),
                    })
                }
            }
            continue;
        }

        let word = match lexeme {
            Lexeme::Symbol("@") => {
                pending_modifier = true;
                continue;
            }
            Lexeme::Symbol("(") => {
                tokens.push(Token::new(TokenKind::LeftParen));
                continue;
            }
            Lexeme::Symbol(")") => {
                tokens.push(Token::new(TokenKind::RightParen));
                continue;
            }
            Lexeme::Symbol(symbol) => {
                let op = Operator::from_symbol(symbol).ok_or_else(|| {
                    AssertionError::UnknownToken {
                        token: symbol.to_string(),
                        expression: expression.to_string(),
                    }
                })?;
                tokens.push(Token::operator(op));
                continue;
            }
            Lexeme::Word(word) => word,
        };

        if let Some((_, value)) = CONSTANTS.iter().find(|(name, _)| *name == word) {
            tokens.push(Token::number(*value));
            continue;
        }

        match RulePrefix::parse(word) {
            RuleMatch::Rule(rule) => {
                tokens.push(Token::new(TokenKind::Rule(rule)));
                continue;
            }
            RuleMatch::InvalidSpan => {
                return Err(AssertionError::InvalidSpan {
                    expression: expression.to_string(),
                })
            }
            RuleMatch::NoMatch => {}
        }

        if NUMBER_PATTERN.is_match(word) {
            let value = word.parse::<f64>().map_err(|_| AssertionError::UnknownToken {
                token: word.to_string(),
                expression: expression.to_string(),
            })?;
            tokens.push(Token::number(value));
            continue;
        }

        if COUNTER_PATTERN.is_match(word) {
            tokens.push(Token::variable(word));
            continue;
        }

        return Err(AssertionError::UnknownToken {
            token: word.to_string(),
            expression: expression.to_string(),
        });
    }

    if pending_modifier {
        return Err(AssertionError::UnknownModifier {
            modifier: "@".to_string(),
            expression: expression.to_string(),
        });
    }
    Ok(tokens)
}

/// Tokenize a line and split off its rule prefix.
///
/// The prefix must be the first token and must not appear anywhere else.
pub fn tokenize_assertion(expression: &str) -> AssertionResult<(RulePrefix, Vec<Token>)> {
    let mut tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(AssertionError::EmptyExpression {
            expression: expression.to_string(),
        });
    }

    let rule = match tokens[0].kind {
        TokenKind::Rule(rule) => rule,
        _ => {
            return Err(AssertionError::MissingRulePrefix {
                expression: expression.to_string(),
            })
        }
    };

    if let Some(misplaced) = tokens[1..]
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Rule(_)))
    {
        return Err(AssertionError::MisplacedRulePrefix {
            rule: misplaced.to_string(),
            expression: expression.to_string(),
        });
    }

    tokens.remove(0);
    Ok((rule, tokens))
}
