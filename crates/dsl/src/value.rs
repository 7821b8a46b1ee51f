//! Typed variable values

use std::fmt;

/// Base type of a variable's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Int,
    Float,
    Bool,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Bool => "Bool",
        };
        f.write_str(name)
    }
}

/// A typed literal
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    /// Infer a literal's type by trial parse: integer, then float, else string
    ///
    /// An all-digit literal is always an `Int`. Float parsing only applies to
    /// text containing a digit, so words like `inf` or `nan` stay strings.
    pub fn infer(text: &str) -> Self {
        if let Ok(value) = text.parse::<i64>() {
            return Self::Int(value);
        }
        if text.bytes().any(|b| b.is_ascii_digit())
            && let Ok(value) = text.parse::<f64>()
        {
            return Self::Float(value);
        }
        Self::String(text.to_string())
    }

    pub fn base_type(&self) -> BaseType {
        match self {
            Self::String(_) => BaseType::String,
            Self::Int(_) => BaseType::Int,
            Self::Float(_) => BaseType::Float,
            Self::Bool(_) => BaseType::Bool,
        }
    }

    /// Render the value as field text
    ///
    /// Integers in decimal, floats fixed-point with six decimals, booleans
    /// and strings as-is.
    pub fn to_external(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => format!("{value:.6}"),
            Self::Bool(value) => value.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_external())
    }
}

/// A `variable NAME { value = LITERAL }` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: Literal,
}

impl Variable {
    pub fn new(name: &str, value: Literal) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    pub fn base_type(&self) -> BaseType {
        self.value.base_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_int() {
        assert_eq!(Literal::infer("42"), Literal::Int(42));
        assert_eq!(Literal::infer("-7"), Literal::Int(-7));
    }

    #[test]
    fn test_infer_float() {
        assert_eq!(Literal::infer("2.5"), Literal::Float(2.5));
        assert_eq!(Literal::infer("1e3"), Literal::Float(1000.0));
    }

    #[test]
    fn test_infer_string() {
        assert_eq!(Literal::infer("foo"), Literal::String("foo".to_string()));
        assert_eq!(Literal::infer("inf"), Literal::String("inf".to_string()));
        assert_eq!(
            Literal::infer("1.2.3"),
            Literal::String("1.2.3".to_string())
        );
        assert_eq!(Literal::infer("true").base_type(), BaseType::String);
    }

    #[test]
    fn test_all_digits_never_float() {
        assert_eq!(Literal::infer("0010").base_type(), BaseType::Int);
    }

    #[test]
    fn test_to_external() {
        assert_eq!(Literal::Int(7).to_external(), "7");
        assert_eq!(Literal::Float(2.5).to_external(), "2.500000");
        assert_eq!(Literal::Bool(true).to_external(), "true");
        assert_eq!(Literal::String("x".into()).to_external(), "x");
    }
}
