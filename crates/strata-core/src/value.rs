//! Dynamic argument values and computed expressions
//!
//! Users hand the client heterogeneous values: literals, dates, nested
//! lists and dictionaries, references to algorithms, and computed
//! expressions (optionally typed as proxies). Promotion coerces these
//! into whatever an algorithm parameter declares.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Proxy, ProxyKind, StrataError, StrataResult};

/// A value passed to, or produced by, an algorithm call
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Argument left out entirely
    Undefined,
    /// Explicit null
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Native client-side date
    Date(DateTime<Utc>),
    List(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
    /// Reference to a named algorithm
    Algorithm(String),
    /// Untyped computed expression
    Computed(Expression),
    /// Computed expression typed as a proxy
    Proxy(Proxy),
}

impl Value {
    /// Build a computed call value
    pub fn call(function: impl Into<String>, args: BTreeMap<String, Value>) -> Self {
        Value::Computed(Expression::call(function, args))
    }

    /// Build a computed variable value
    pub fn variable(name: impl Into<String>, declared_type: Option<&str>) -> Self {
        Value::Computed(Expression::Variable {
            name: name.into(),
            declared_type: declared_type.map(str::to_owned),
        })
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&Proxy> {
        match self {
            Value::Proxy(p) => Some(p),
            _ => None,
        }
    }

    /// Computed or proxy value
    #[inline]
    pub fn is_computed(&self) -> bool {
        matches!(self, Value::Computed(_) | Value::Proxy(_))
    }

    /// Underlying expression of a computed or proxy value
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            Value::Computed(expr) => Some(expr),
            Value::Proxy(p) => Some(p.expression()),
            _ => None,
        }
    }

    /// Consume into the underlying expression, if computed
    pub fn into_expression(self) -> Option<Expression> {
        match self {
            Value::Computed(expr) => Some(expr),
            Value::Proxy(p) => Some(p.into_expression()),
            _ => None,
        }
    }

    /// Capability tag of a proxy value
    pub fn proxy_kind(&self) -> Option<ProxyKind> {
        self.as_proxy().map(Proxy::kind)
    }

    /// Proxy carrying the given capability tag
    pub fn is_kind(&self, kind: ProxyKind) -> bool {
        self.proxy_kind() == Some(kind)
    }

    /// Proxy of any collection kind
    pub fn is_collection(&self) -> bool {
        self.proxy_kind().is_some_and(ProxyKind::is_collection)
    }

    /// A value a String proxy can be built from: a literal, a String
    /// proxy, a variable declared as a string, or any other computed value.
    pub fn is_string_like(&self) -> bool {
        // String proxies and string-typed variables are computed values too.
        matches!(self, Value::String(_) | Value::Computed(_) | Value::Proxy(_))
    }

    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean {}", b),
            Value::Number(n) => format!("number {}", n),
            Value::String(s) => format!("string {:?}", s),
            Value::Date(d) => format!("date {}", d.to_rfc3339()),
            Value::List(items) => format!("list of {} items", items.len()),
            Value::Dictionary(d) => format!("dictionary with {} keys", d.len()),
            Value::Algorithm(name) => format!("algorithm {}", name),
            Value::Computed(expr) => format!("computed {}", expr),
            Value::Proxy(p) => format!("{} {}", p.type_name(), p.expression()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Expression> for Value {
    fn from(expr: Expression) -> Self {
        Value::Computed(expr)
    }
}

impl From<Proxy> for Value {
    fn from(proxy: Proxy) -> Self {
        Value::Proxy(proxy)
    }
}

/// A node of a computation graph
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// Invocation of a named algorithm with named arguments
    Call {
        function: String,
        args: BTreeMap<String, Value>,
    },
    /// Placeholder bound when the graph is evaluated
    Variable {
        name: String,
        declared_type: Option<String>,
    },
    /// Literal lifted into the graph
    Constant(Box<Value>),
}

impl Expression {
    pub fn call(function: impl Into<String>, args: BTreeMap<String, Value>) -> Self {
        Expression::Call {
            function: function.into(),
            args,
        }
    }

    pub fn constant(value: Value) -> Self {
        Expression::Constant(Box::new(value))
    }

    /// Name of the invoked algorithm, for calls
    pub fn function(&self) -> Option<&str> {
        match self {
            Expression::Call { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Named arguments, for calls
    pub fn args(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Expression::Call { args, .. } => Some(args),
            _ => None,
        }
    }

    pub fn is_call_to(&self, name: &str) -> bool {
        self.function() == Some(name)
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// Variable declared as a string, or a string constant
    pub fn is_string_typed(&self) -> bool {
        match self {
            Expression::Variable { declared_type, .. } => declared_type.as_deref() == Some("String"),
            Expression::Constant(value) => matches!(**value, Value::String(_)),
            Expression::Call { .. } => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Call { function, args } => {
                write!(f, "{}(", function)?;
                for (i, name) in args.keys().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(name)?;
                }
                f.write_str(")")
            }
            Expression::Variable { name, .. } => write!(f, "var {}", name),
            Expression::Constant(value) => write!(f, "const {}", value.describe()),
        }
    }
}

/// Parse a date string into a native date.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(input: &str) -> StrataResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StrataError::InvalidDate(input.to_string()))
}

/// Build a native date from milliseconds since the Unix epoch
pub fn date_from_millis(millis: f64) -> StrataResult<DateTime<Utc>> {
    if !millis.is_finite() {
        return Err(StrataError::InvalidDate(millis.to_string()));
    }
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| StrataError::InvalidDate(millis.to_string()))
}
