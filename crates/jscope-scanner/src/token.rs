//! Token kinds for the ES5/ES6-ish grammar the parser understands.

use serde::Serialize;

/// Every token the scanner can produce.
///
/// `let`, `of`, `get`, and `set` are contextual: they scan as `Identifier`
/// and the parser decides from the token text, which is how real-world ES5
/// code that uses them as plain identifiers keeps parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Unknown,
    EndOfFileToken,

    // Literals
    Identifier,
    StringLiteral,
    NumericLiteral,
    RegularExpressionLiteral,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    DotToken,
    ColonToken,
    QuestionToken,

    // Comparison operators
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,

    // Arithmetic and bitwise operators
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,

    // Assignment operators
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    EqualsGreaterThanToken,

    // Keywords
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,
}

impl TokenKind {
    /// Map reserved-word text to its keyword kind. Contextual words (`let`,
    /// `of`, `get`, `set`) deliberately stay identifiers.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "break" => TokenKind::BreakKeyword,
            "case" => TokenKind::CaseKeyword,
            "catch" => TokenKind::CatchKeyword,
            "const" => TokenKind::ConstKeyword,
            "continue" => TokenKind::ContinueKeyword,
            "debugger" => TokenKind::DebuggerKeyword,
            "default" => TokenKind::DefaultKeyword,
            "delete" => TokenKind::DeleteKeyword,
            "do" => TokenKind::DoKeyword,
            "else" => TokenKind::ElseKeyword,
            "false" => TokenKind::FalseKeyword,
            "finally" => TokenKind::FinallyKeyword,
            "for" => TokenKind::ForKeyword,
            "function" => TokenKind::FunctionKeyword,
            "if" => TokenKind::IfKeyword,
            "in" => TokenKind::InKeyword,
            "instanceof" => TokenKind::InstanceOfKeyword,
            "new" => TokenKind::NewKeyword,
            "null" => TokenKind::NullKeyword,
            "return" => TokenKind::ReturnKeyword,
            "switch" => TokenKind::SwitchKeyword,
            "this" => TokenKind::ThisKeyword,
            "throw" => TokenKind::ThrowKeyword,
            "true" => TokenKind::TrueKeyword,
            "try" => TokenKind::TryKeyword,
            "typeof" => TokenKind::TypeOfKeyword,
            "var" => TokenKind::VarKeyword,
            "void" => TokenKind::VoidKeyword,
            "while" => TokenKind::WhileKeyword,
            "with" => TokenKind::WithKeyword,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        self >= TokenKind::BreakKeyword
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::EqualsToken
                | TokenKind::PlusEqualsToken
                | TokenKind::MinusEqualsToken
                | TokenKind::AsteriskEqualsToken
                | TokenKind::SlashEqualsToken
                | TokenKind::PercentEqualsToken
                | TokenKind::LessThanLessThanEqualsToken
                | TokenKind::GreaterThanGreaterThanEqualsToken
                | TokenKind::GreaterThanGreaterThanGreaterThanEqualsToken
                | TokenKind::AmpersandEqualsToken
                | TokenKind::BarEqualsToken
                | TokenKind::CaretEqualsToken
        )
    }

    /// Source text of the token for fixed-text tokens, or a short description
    /// for the variable ones. Used in diagnostics.
    pub fn text(self) -> &'static str {
        match self {
            TokenKind::Unknown => "<unknown>",
            TokenKind::EndOfFileToken => "end of file",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumericLiteral => "numeric literal",
            TokenKind::RegularExpressionLiteral => "regular expression",
            TokenKind::OpenBraceToken => "{",
            TokenKind::CloseBraceToken => "}",
            TokenKind::OpenParenToken => "(",
            TokenKind::CloseParenToken => ")",
            TokenKind::OpenBracketToken => "[",
            TokenKind::CloseBracketToken => "]",
            TokenKind::SemicolonToken => ";",
            TokenKind::CommaToken => ",",
            TokenKind::DotToken => ".",
            TokenKind::ColonToken => ":",
            TokenKind::QuestionToken => "?",
            TokenKind::LessThanToken => "<",
            TokenKind::GreaterThanToken => ">",
            TokenKind::LessThanEqualsToken => "<=",
            TokenKind::GreaterThanEqualsToken => ">=",
            TokenKind::EqualsEqualsToken => "==",
            TokenKind::ExclamationEqualsToken => "!=",
            TokenKind::EqualsEqualsEqualsToken => "===",
            TokenKind::ExclamationEqualsEqualsToken => "!==",
            TokenKind::PlusToken => "+",
            TokenKind::MinusToken => "-",
            TokenKind::AsteriskToken => "*",
            TokenKind::SlashToken => "/",
            TokenKind::PercentToken => "%",
            TokenKind::PlusPlusToken => "++",
            TokenKind::MinusMinusToken => "--",
            TokenKind::LessThanLessThanToken => "<<",
            TokenKind::GreaterThanGreaterThanToken => ">>",
            TokenKind::GreaterThanGreaterThanGreaterThanToken => ">>>",
            TokenKind::AmpersandToken => "&",
            TokenKind::BarToken => "|",
            TokenKind::CaretToken => "^",
            TokenKind::ExclamationToken => "!",
            TokenKind::TildeToken => "~",
            TokenKind::AmpersandAmpersandToken => "&&",
            TokenKind::BarBarToken => "||",
            TokenKind::EqualsToken => "=",
            TokenKind::PlusEqualsToken => "+=",
            TokenKind::MinusEqualsToken => "-=",
            TokenKind::AsteriskEqualsToken => "*=",
            TokenKind::SlashEqualsToken => "/=",
            TokenKind::PercentEqualsToken => "%=",
            TokenKind::LessThanLessThanEqualsToken => "<<=",
            TokenKind::GreaterThanGreaterThanEqualsToken => ">>=",
            TokenKind::GreaterThanGreaterThanGreaterThanEqualsToken => ">>>=",
            TokenKind::AmpersandEqualsToken => "&=",
            TokenKind::BarEqualsToken => "|=",
            TokenKind::CaretEqualsToken => "^=",
            TokenKind::EqualsGreaterThanToken => "=>",
            TokenKind::BreakKeyword => "break",
            TokenKind::CaseKeyword => "case",
            TokenKind::CatchKeyword => "catch",
            TokenKind::ConstKeyword => "const",
            TokenKind::ContinueKeyword => "continue",
            TokenKind::DebuggerKeyword => "debugger",
            TokenKind::DefaultKeyword => "default",
            TokenKind::DeleteKeyword => "delete",
            TokenKind::DoKeyword => "do",
            TokenKind::ElseKeyword => "else",
            TokenKind::FalseKeyword => "false",
            TokenKind::FinallyKeyword => "finally",
            TokenKind::ForKeyword => "for",
            TokenKind::FunctionKeyword => "function",
            TokenKind::IfKeyword => "if",
            TokenKind::InKeyword => "in",
            TokenKind::InstanceOfKeyword => "instanceof",
            TokenKind::NewKeyword => "new",
            TokenKind::NullKeyword => "null",
            TokenKind::ReturnKeyword => "return",
            TokenKind::SwitchKeyword => "switch",
            TokenKind::ThisKeyword => "this",
            TokenKind::ThrowKeyword => "throw",
            TokenKind::TrueKeyword => "true",
            TokenKind::TryKeyword => "try",
            TokenKind::TypeOfKeyword => "typeof",
            TokenKind::VarKeyword => "var",
            TokenKind::VoidKeyword => "void",
            TokenKind::WhileKeyword => "while",
            TokenKind::WithKeyword => "with",
        }
    }
}

impl PartialOrd for TokenKind {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenKind {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u32).cmp(&(*other as u32))
    }
}
