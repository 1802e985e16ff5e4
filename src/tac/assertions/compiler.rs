//! Infix to reverse polish conversion
//!
//! Shunting-yard over the operator table in [`Operator::priority`]. The
//! produced program is checked for balanced parentheses and operator arity
//! so that evaluation never underflows its stack.

use super::error::{AssertionError, AssertionResult};
use super::lexer::{Associativity, Operator, Token, TokenKind};

/// Compiled reverse polish program
pub type Program = Vec<Token>;

/// Convert an infix token stream (rule prefix removed) into RPN
pub fn compile(tokens: &[Token], expression: &str) -> AssertionResult<Program> {
    let mut output: Program = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Number(_) | TokenKind::Variable(_) => output.push(token.clone()),
            TokenKind::Operator(incoming) => {
                while let Some(top) = stack.last() {
                    let TokenKind::Operator(top_op) = top.kind else {
                        break;
                    };
                    if !pops_before(*incoming, top_op) {
                        break;
                    }
                    if let Some(top) = stack.pop() {
                        output.push(top);
                    }
                }
                stack.push(token.clone());
            }
            TokenKind::LeftParen => stack.push(token.clone()),
            TokenKind::RightParen => loop {
                match stack.pop() {
                    Some(Token {
                        kind: TokenKind::LeftParen,
                        ..
                    }) => break,
                    Some(op) => output.push(op),
                    None => {
                        return Err(AssertionError::UnbalancedParentheses {
                            expression: expression.to_string(),
                        })
                    }
                }
            },
            TokenKind::Rule(rule) => {
                return Err(AssertionError::MisplacedRulePrefix {
                    rule: rule.to_string(),
                    expression: expression.to_string(),
                })
            }
        }
    }

    while let Some(token) = stack.pop() {
        if token.kind == TokenKind::LeftParen {
            return Err(AssertionError::UnbalancedParentheses {
                expression: expression.to_string(),
            });
        }
        output.push(token);
    }

    check_arity(&output, expression)?;
    Ok(output)
}

/// Whether the operator on top of the stack is emitted before `incoming`
fn pops_before(incoming: Operator, top: Operator) -> bool {
    match incoming.associativity() {
        Associativity::Left => top.priority() <= incoming.priority(),
        Associativity::Right => top.priority() < incoming.priority(),
    }
}

/// Simulate stack depth; every operator must find its operands and exactly
/// one value must remain
fn check_arity(program: &[Token], expression: &str) -> AssertionResult<()> {
    let malformed = |reason: &str| AssertionError::MalformedExpression {
        reason: reason.to_string(),
        expression: expression.to_string(),
    };

    let mut depth: usize = 0;
    for token in program {
        match &token.kind {
            TokenKind::Operator(op) => {
                let arity = if op.is_unary() { 1 } else { 2 };
                if depth < arity {
                    return Err(malformed(&format!(
                        "missing operand for '{}'",
                        op.symbol()
                    )));
                }
                depth -= arity - 1;
            }
            _ => depth += 1,
        }
    }

    match depth {
        1 => Ok(()),
        0 => Err(malformed("no value")),
        _ => Err(malformed("missing operator")),
    }
}

/// Space separated rendering of a program, e.g. `2 3 4 * +`
pub fn render(program: &[Token]) -> String {
    program
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
