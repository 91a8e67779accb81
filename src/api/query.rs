use std::fmt;

/// Right-hand side of a field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(u64),
    Text(String),
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A ticket filter in Freshdesk search syntax, e.g.
/// `agent_id:5 AND (status:2 OR status:3)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equals { field: String, value: Value },
    AllOf(Vec<Query>),
    AnyOf(Vec<Query>),
}

pub struct Parameter(String);

impl Parameter {
    pub fn equals(self, value: impl Into<Value>) -> Query {
        Query::Equals {
            field: self.0,
            value: value.into(),
        }
    }
}

impl Query {
    pub fn field(name: &str) -> Parameter {
        Parameter(name.to_string())
    }

    pub fn all_of(parts: impl IntoIterator<Item = Query>) -> Query {
        Query::AllOf(parts.into_iter().collect())
    }

    pub fn any_of(parts: impl IntoIterator<Item = Query>) -> Query {
        Query::AnyOf(parts.into_iter().collect())
    }

    fn write_group(f: &mut fmt::Formatter<'_>, parts: &[Query], op: &str) -> fmt::Result {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", op)?;
            }
            match part {
                Query::Equals { .. } => write!(f, "{}", part)?,
                _ if part.len() == 1 => write!(f, "{}", part)?,
                _ => write!(f, "({})", part)?,
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        match self {
            Query::Equals { .. } => 1,
            Query::AllOf(parts) | Query::AnyOf(parts) => parts.len(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Equals { field, value } => match value {
                Value::Int(v) => write!(f, "{}:{}", field, v),
                Value::Text(v) => write!(f, "{}:'{}'", field, v.replace('\'', "\\'")),
            },
            Query::AllOf(parts) => Self::write_group(f, parts, "AND"),
            Query::AnyOf(parts) => Self::write_group(f, parts, "OR"),
        }
    }
}
