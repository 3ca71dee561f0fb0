use crate::token::TokenKind;

/// Binding power for expression operators, loosest first. Derived `Ord`
/// gives the comparison the Pratt loop needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    BitOr,
    BitAnd,
    Equals,
    LessGreater,
    Shift,
    Sum,
    Product,
    Prefix,
    Call,
}

/// Token kinds that do not act as infix operators sit at `Lowest`, which
/// stops the climbing loop.
pub fn of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::BitOr | TokenKind::BitXor => Precedence::BitOr,
        TokenKind::BitAnd => Precedence::BitAnd,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::LtEq
        | TokenKind::GtEq
        | TokenKind::LAngle
        | TokenKind::RAngle => Precedence::LessGreater,
        TokenKind::ShiftL | TokenKind::ShiftR => Precedence::Shift,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Mul | TokenKind::Div | TokenKind::Mod => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}
