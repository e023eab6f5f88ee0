//! Column data types (MySQL type family).

/// Width class of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegerKind {
    Tiny,
    Small,
    Medium,
    Int,
    Big,
}

impl IntegerKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tiny => "tinyint",
            Self::Small => "smallint",
            Self::Medium => "mediumint",
            Self::Int => "int",
            Self::Big => "bigint",
        }
    }
}

/// Size class shared by the TEXT and BLOB families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LobSize {
    Tiny,
    Regular,
    Medium,
    Long,
}

impl LobSize {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Regular => "",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

/// A column data type.
///
/// Pure spelling synonyms (`INTEGER`, `NUMERIC`, `REAL`, ...) are folded by
/// the parser; semantic rewrites such as `BOOLEAN` to `tinyint(1)` are left
/// to schema normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Integer {
        kind: IntegerKind,
        display_width: Option<u32>,
        unsigned: bool,
        zerofill: bool,
    },
    /// `BOOL` / `BOOLEAN`.
    Boolean,
    Bit(Option<u32>),
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
        unsigned: bool,
        zerofill: bool,
    },
    Float {
        precision: Option<u32>,
        scale: Option<u32>,
        unsigned: bool,
    },
    Double {
        precision: Option<u32>,
        scale: Option<u32>,
        unsigned: bool,
    },
    Char(Option<u32>),
    Varchar(Option<u32>),
    Binary(Option<u32>),
    Varbinary(Option<u32>),
    Text(LobSize),
    Blob(LobSize),
    Enum(Vec<String>),
    Set(Vec<String>),
    Date,
    Time(Option<u32>),
    Datetime(Option<u32>),
    Timestamp(Option<u32>),
    Year,
    Json,
    /// Spatial types (`geometry`, `point`, ...), stored lower-case.
    Spatial(String),
    /// Anything else, spelled as written.
    Custom(String),
}

impl DataType {
    /// Convenience constructor for a plain signed integer type.
    #[must_use]
    pub const fn integer(kind: IntegerKind) -> Self {
        Self::Integer {
            kind,
            display_width: None,
            unsigned: false,
            zerofill: false,
        }
    }

    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Integer { .. } | Self::Boolean)
    }

    /// Character types that carry a charset and collation.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Char(_) | Self::Varchar(_) | Self::Text(_) | Self::Enum(_) | Self::Set(_)
        )
    }

    /// Types that accept a key prefix length.
    #[must_use]
    pub const fn accepts_key_prefix(&self) -> bool {
        matches!(
            self,
            Self::Char(_)
                | Self::Varchar(_)
                | Self::Binary(_)
                | Self::Varbinary(_)
                | Self::Text(_)
                | Self::Blob(_)
        )
    }

    /// TEXT and BLOB columns can only be indexed through a prefix.
    #[must_use]
    pub const fn requires_key_prefix(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Blob(_))
    }

    /// Renders the type the way `SHOW CREATE TABLE` spells it.
    #[must_use]
    pub fn to_sql(&self) -> String {
        fn sign(unsigned: bool, zerofill: bool) -> &'static str {
            match (unsigned, zerofill) {
                (_, true) => " unsigned zerofill",
                (true, false) => " unsigned",
                (false, false) => "",
            }
        }
        fn precision(p: Option<u32>, s: Option<u32>) -> String {
            match (p, s) {
                (Some(p), Some(s)) => format!("({p},{s})"),
                (Some(p), None) => format!("({p})"),
                _ => String::new(),
            }
        }
        fn length(len: Option<u32>) -> String {
            len.map(|n| format!("({n})")).unwrap_or_default()
        }
        fn values(values: &[String]) -> String {
            values
                .iter()
                .map(|v| format!("'{}'", v.replace('\\', "\\\\").replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(",")
        }

        match self {
            Self::Integer {
                kind,
                display_width,
                unsigned,
                zerofill,
            } => format!(
                "{}{}{}",
                kind.as_str(),
                length(*display_width),
                sign(*unsigned, *zerofill)
            ),
            Self::Boolean => String::from("boolean"),
            Self::Bit(len) => format!("bit{}", length(*len)),
            Self::Decimal {
                precision: p,
                scale: s,
                unsigned,
                zerofill,
            } => format!("decimal{}{}", precision(*p, *s), sign(*unsigned, *zerofill)),
            Self::Float {
                precision: p,
                scale: s,
                unsigned,
            } => format!("float{}{}", precision(*p, *s), sign(*unsigned, false)),
            Self::Double {
                precision: p,
                scale: s,
                unsigned,
            } => format!("double{}{}", precision(*p, *s), sign(*unsigned, false)),
            Self::Char(len) => format!("char{}", length(*len)),
            Self::Varchar(len) => format!("varchar{}", length(*len)),
            Self::Binary(len) => format!("binary{}", length(*len)),
            Self::Varbinary(len) => format!("varbinary{}", length(*len)),
            Self::Text(size) => format!("{}text", size.prefix()),
            Self::Blob(size) => format!("{}blob", size.prefix()),
            Self::Enum(v) => format!("enum({})", values(v)),
            Self::Set(v) => format!("set({})", values(v)),
            Self::Date => String::from("date"),
            Self::Time(fsp) => format!("time{}", length(*fsp)),
            Self::Datetime(fsp) => format!("datetime{}", length(*fsp)),
            Self::Timestamp(fsp) => format!("timestamp{}", length(*fsp)),
            Self::Year => String::from("year"),
            Self::Json => String::from("json"),
            Self::Spatial(name) | Self::Custom(name) => name.clone(),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}
