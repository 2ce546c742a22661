//! Logical values produced and consumed by the codec.

use std::fmt;

/// A dynamically-typed extprot value.
///
/// `Value` is the host representation the descriptor engine parses the wire
/// format into and renders back out of. Strings are byte sequences on the
/// wire, so they are carried as raw bytes here; [`Value::as_str`] recovers
/// UTF-8 text when there is some.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int(i64),
    Long(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    /// Key-value pairs in wire order.
    Assoc(Vec<(Value, Value)>),
    Record(Record),
    Variant(Variant),
}

/// A message decoded into named fields, in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

/// One constructor of a disjoint union, with its payload values.
///
/// Constant constructors carry no values and encode at the ENUM wire type;
/// payload constructors encode as tagged tuples.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub tag: u32,
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

impl Variant {
    pub fn new(name: impl Into<String>, tag: u32, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            tag,
            values,
        }
    }
}

impl Value {
    /// A string value from UTF-8 text.
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::Bytes(s.as_ref().as_bytes().to_vec())
    }

    /// The logical type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Bytes(_) => "string",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Assoc(_) => "assoc",
            Self::Record(_) => "message",
            Self::Variant(_) => "union",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) | Self::Long(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The value as UTF-8 text, if it is a valid string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Looks up an assoc entry by key; the last pair with the key wins.
    pub fn assoc_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Assoc(pairs) => pairs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Self::Record(r)
    }
}

impl From<Variant> for Value {
    fn from(v: Variant) -> Self {
        Self::Variant(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Byte(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "\"{s}\""),
                Err(_) => write!(f, "<{} bytes>", b.len()),
            },
            Self::Tuple(items) => write_seq(f, "(", items, ")"),
            Self::List(items) => write_seq(f, "[", items, "]"),
            Self::Assoc(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} -> {v}")?;
                }
                write!(f, "}}")
            }
            Self::Record(r) => {
                write!(f, "{} {{", r.name)?;
                for (i, (name, value)) in r.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Variant(v) => {
                if v.values.is_empty() {
                    write!(f, "{}", v.name)
                } else {
                    write!(f, "{}", v.name)?;
                    write_seq(f, "(", &v.values, ")")
                }
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_field_lookup() {
        let rec = Record::new(
            "person",
            vec![
                ("id".into(), Value::Int(7)),
                ("name".into(), Value::string("ann")),
            ],
        );
        assert_eq!(rec.get("id"), Some(&Value::Int(7)));
        assert_eq!(rec.get("missing"), None);
    }

    #[test]
    fn assoc_last_pair_wins() {
        let assoc = Value::Assoc(vec![
            (Value::string("k"), Value::Int(1)),
            (Value::string("k"), Value::Int(2)),
        ]);
        assert_eq!(assoc.assoc_get(&Value::string("k")), Some(&Value::Int(2)));
        assert_eq!(assoc.assoc_get(&Value::string("x")), None);
    }

    #[test]
    fn display_is_compact() {
        let v = Value::Tuple(vec![Value::Int(1), Value::Bool(true), Value::string("hi")]);
        assert_eq!(v.to_string(), "(1, true, \"hi\")");
        let variant = Value::Variant(Variant::new("Known", 0, vec![Value::Int(3)]));
        assert_eq!(variant.to_string(), "Known(3)");
    }
}
