//! Token types for the DDL lexer.

use super::Span;

macro_rules! keywords {
    ($($variant:ident => $text:literal, $reserved:literal;)*) => {
        /// SQL keywords recognised by the lexer.
        ///
        /// Keywords that are not reserved by the server may still be used as
        /// bare identifiers (`comment`, `engine`, `first`, ...).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )*
        }

        impl Keyword {
            /// Looks up a keyword, ignoring ASCII case.
            #[must_use]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// Upper-case spelling of the keyword.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }

            /// Whether the keyword is reserved, i.e. can only be used as an
            /// identifier when quoted.
            #[must_use]
            pub const fn is_reserved(&self) -> bool {
                match self {
                    $(Self::$variant => $reserved,)*
                }
            }
        }
    };
}

keywords! {
    // Queries
    Select => "SELECT", true;
    From => "FROM", true;
    Where => "WHERE", true;
    Order => "ORDER", true;
    By => "BY", true;
    Group => "GROUP", true;
    Having => "HAVING", true;
    Limit => "LIMIT", true;
    Offset => "OFFSET", false;
    Distinct => "DISTINCT", true;
    All => "ALL", true;
    Join => "JOIN", true;
    Inner => "INNER", true;
    Left => "LEFT", true;
    Right => "RIGHT", true;
    Outer => "OUTER", true;
    Cross => "CROSS", true;
    Natural => "NATURAL", true;
    StraightJoin => "STRAIGHT_JOIN", true;
    On => "ON", true;
    Using => "USING", true;
    Union => "UNION", true;
    As => "AS", true;
    Case => "CASE", true;
    When => "WHEN", true;
    Then => "THEN", true;
    Else => "ELSE", true;
    End => "END", false;
    Cast => "CAST", false;
    Interval => "INTERVAL", true;

    // Operators
    And => "AND", true;
    Or => "OR", true;
    Xor => "XOR", true;
    Not => "NOT", true;
    In => "IN", true;
    Between => "BETWEEN", true;
    Like => "LIKE", true;
    Is => "IS", true;
    Null => "NULL", true;
    True => "TRUE", true;
    False => "FALSE", true;
    Exists => "EXISTS", true;
    Div => "DIV", true;
    Mod => "MOD", true;
    Asc => "ASC", true;
    Desc => "DESC", true;

    // Statements
    Create => "CREATE", true;
    Alter => "ALTER", true;
    Drop => "DROP", true;
    Rename => "RENAME", true;
    Table => "TABLE", true;
    View => "VIEW", false;
    Temporary => "TEMPORARY", false;
    If => "IF", true;
    Replace => "REPLACE", true;

    // Alter specifications
    Add => "ADD", true;
    Modify => "MODIFY", false;
    Change => "CHANGE", true;
    Column => "COLUMN", true;
    First => "FIRST", false;
    After => "AFTER", false;
    To => "TO", true;
    Remove => "REMOVE", false;
    Partitioning => "PARTITIONING", false;

    // Keys and constraints
    Index => "INDEX", true;
    Key => "KEY", true;
    Primary => "PRIMARY", true;
    Unique => "UNIQUE", true;
    Fulltext => "FULLTEXT", true;
    Spatial => "SPATIAL", true;
    Foreign => "FOREIGN", true;
    References => "REFERENCES", true;
    Constraint => "CONSTRAINT", true;
    Check => "CHECK", true;
    Enforced => "ENFORCED", false;
    Cascade => "CASCADE", true;
    Restrict => "RESTRICT", true;
    Set => "SET", true;
    No => "NO", false;
    Action => "ACTION", false;
    Update => "UPDATE", true;
    Delete => "DELETE", true;
    Visible => "VISIBLE", false;
    Invisible => "INVISIBLE", false;

    // Column attributes
    Default => "DEFAULT", true;
    AutoIncrement => "AUTO_INCREMENT", false;
    Comment => "COMMENT", false;
    Collate => "COLLATE", true;
    Character => "CHARACTER", true;
    Charset => "CHARSET", false;
    Unsigned => "UNSIGNED", true;
    Signed => "SIGNED", false;
    Zerofill => "ZEROFILL", true;
    Generated => "GENERATED", true;
    Always => "ALWAYS", false;
    Stored => "STORED", true;
    Virtual => "VIRTUAL", true;
    Binary => "BINARY", true;

    // Table options
    Engine => "ENGINE", false;
    RowFormat => "ROW_FORMAT", false;
    KeyBlockSize => "KEY_BLOCK_SIZE", false;

    // Partitioning
    Partition => "PARTITION", true;
    Partitions => "PARTITIONS", false;
    Range => "RANGE", true;
    List => "LIST", false;
    Hash => "HASH", false;
    Linear => "LINEAR", true;
    Columns => "COLUMNS", false;
    Values => "VALUES", true;
    Less => "LESS", false;
    Than => "THAN", false;
    Maxvalue => "MAXVALUE", true;

    // Views
    Algorithm => "ALGORITHM", false;
    Undefined => "UNDEFINED", false;
    Merge => "MERGE", false;
    Temptable => "TEMPTABLE", false;
    Definer => "DEFINER", false;
    Sql => "SQL", true;
    Security => "SECURITY", false;
    Invoker => "INVOKER", false;
    With => "WITH", true;
    Cascaded => "CASCADED", false;
    Local => "LOCAL", false;
    Option => "OPTION", true;
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal (`42`).
    Integer(i64),
    /// Floating point literal (`3.14`, `1e10`).
    Float(f64),
    /// String literal, quotes and escapes removed.
    String(String),
    /// Hex literal (`X'CAFE'`).
    Blob(Vec<u8>),
    /// Bare or backtick-quoted identifier.
    Identifier(String),
    /// Bare keyword.
    Keyword(Keyword),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `=`
    Eq,
    /// `<=>`
    NullSafeEq,
    /// `!=` or `<>`
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `&&`
    DoubleAmpersand,
    /// `||`
    DoublePipe,
    /// `!`
    Bang,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    LeftShift,
    RightShift,

    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    At,

    /// End of input.
    Eof,
    /// Unrecognised input; carries a description.
    Error(String),
}

impl TokenKind {
    /// Short human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(n) => format!("integer {n}"),
            Self::Float(f) => format!("number {f}"),
            Self::String(s) => format!("string '{s}'"),
            Self::Blob(_) => String::from("hex literal"),
            Self::Identifier(name) => format!("identifier `{name}`"),
            Self::Keyword(kw) => format!("keyword {}", kw.as_str()),
            Self::Eof => String::from("end of input"),
            Self::Error(message) => message.clone(),
            other => format!("{other:?}"),
        }
    }
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_ignores_case() {
        assert_eq!(Keyword::from_str("auto_increment"), Some(Keyword::AutoIncrement));
        assert_eq!(Keyword::from_str("Fulltext"), Some(Keyword::Fulltext));
        assert_eq!(Keyword::from_str("varchar"), None);
        assert_eq!(Keyword::KeyBlockSize.as_str(), "KEY_BLOCK_SIZE");
    }

    #[test]
    fn reserved_words() {
        assert!(Keyword::Select.is_reserved());
        assert!(Keyword::Key.is_reserved());
        assert!(!Keyword::Comment.is_reserved());
        assert!(!Keyword::View.is_reserved());
    }

    #[test]
    fn token_keyword_accessor() {
        let token = Token::new(TokenKind::Keyword(Keyword::Table), Span::new(0, 5));
        assert_eq!(token.as_keyword(), Some(Keyword::Table));
        assert!(!token.is_eof());
        assert!(Token::new(TokenKind::Eof, Span::default()).is_eof());
    }
}
