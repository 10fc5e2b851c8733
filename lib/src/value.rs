use std::sync::Arc;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Chainable, Result};

pub type Dict<K = Arc<str>, V = Value> = BTreeMap<K, V>;

/// Represents any metadata or context value.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Dict(Arc<Dict>),
}

impl Value {
    /// Parses `string` as YAML.
    ///
    /// Mapping keys that aren't strings are converted to their string form,
    /// and YAML tags are discarded in favor of the tagged value.
    ///
    /// ```rust
    /// use board::value::Value;
    ///
    /// let value = Value::from_yaml("title: Hello\n1: one").unwrap();
    /// let dict = value.as_dict().unwrap();
    /// assert_eq!(dict["title"].as_str(), Some("Hello"));
    /// assert_eq!(dict["1"].as_str(), Some("one"));
    /// ```
    pub fn from_yaml(string: &str) -> Result<Value> {
        let yaml: serde_yaml_ng::Value = serde_yaml_ng::from_str(string)
            .chain(error!("invalid YAML"))?;

        Ok(yaml.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(v) => Some(&**v),
            _ => None
        }
    }

    pub fn into_dict(self) -> Result<Arc<Dict>, Value> {
        match self {
            Value::Dict(v) => Ok(v),
            _ => Err(self)
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }
}

fn yaml_key(key: serde_yaml_ng::Value) -> Arc<str> {
    use serde_yaml_ng::Value as Yaml;

    match key {
        Yaml::String(s) => s.into(),
        Yaml::Bool(b) => b.to_string().into(),
        Yaml::Number(n) => n.to_string().into(),
        Yaml::Null => "null".into(),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml_ng::to_string(&other)
            .map(|s| s.trim_end().into())
            .unwrap_or_else(|_| other_kind(&other).into()),
    }
}

fn other_kind(value: &serde_yaml_ng::Value) -> &'static str {
    match value {
        serde_yaml_ng::Value::Sequence(_) => "sequence",
        serde_yaml_ng::Value::Mapping(_) => "mapping",
        _ => "value",
    }
}

impl From<serde_yaml_ng::Value> for Value {
    fn from(value: serde_yaml_ng::Value) -> Self {
        use serde_yaml_ng::Value as Yaml;

        match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Yaml::String(s) => Value::String(s.into()),
            Yaml::Sequence(seq) => seq.into_iter().map(Value::from).collect(),
            Yaml::Mapping(map) => {
                let dict = map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Value::from(v)))
                    .collect::<Dict>();

                Value::Dict(Arc::new(dict))
            }
            Yaml::Tagged(tagged) => tagged.value.into(),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($T:ty),+ => $E:ident::$kind:ident) => {
        $(
            impl From<$T> for $E {
                fn from(value: $T) -> Self {
                    $E::$kind(value.into())
                }
            }
        )+
    };
}

impl_from_primitive!(bool => Value::Bool);
impl_from_primitive!(&str => Value::String);
impl_from_primitive!(String => Value::String);
impl_from_primitive!(Arc<str> => Value::String);
impl_from_primitive!(Arc<Vec<Value>> => Value::Array);
impl_from_primitive!(Arc<Dict> => Value::Dict);
impl_from_primitive!(i8, i16, i32, i64, u8, u16, u32 => Value::Int);
impl_from_primitive!(f32, f64 => Value::Float);

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Value::Dict(Arc::new(value))
    }
}

impl<T> From<Option<T>> for Value where Value: From<T> {
    fn from(value: Option<T>) -> Self {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}

impl<T> From<Vec<T>> for Value where Value: From<T> {
    fn from(value: Vec<T>) -> Self {
        value.into_iter()
            .map(Value::from)
            .collect()
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let vec = iter.into_iter().collect::<Vec<Value>>();
        Value::Array(Arc::new(vec))
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut dict: $crate::value::Dict = $crate::value::Dict::new();
        $(dict.insert($key.into(), $crate::value::Value::from($value));)*
        dict
    });
}
