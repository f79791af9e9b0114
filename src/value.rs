use std::fmt;

use crate::ast::Number;

/// A runtime value. Equality is tag-first: values of different tags never
/// compare equal, while ints and floats inside `Number` compare numerically.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(Number),
    Str(String),
    List(Vec<Value>),
    Map(ValueMap),
    Nothing,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Nothing => "nothing",
        }
    }

    /// False values: `false`, zero, the empty string/list/map, `Nothing`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(value) => *value,
            Value::Number(value) => value.as_f64() != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::List(values) => !values.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Nothing => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "{value}"),
            Value::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Nothing => write!(f, "nothing"),
        }
    }
}

/// An insertion-ordered map. Keys are arbitrary values, so storage is a pair
/// list; inserting an existing key updates the value in place and keeps the
/// key's original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_tag_equality_is_false() {
        assert_ne!(Value::Number(Number::Int(1)), Value::Bool(true));
        assert_ne!(Value::Str("1".to_string()), Value::Number(Number::Int(1)));
        assert_eq!(
            Value::Number(Number::Int(1)),
            Value::Number(Number::Float(1.0))
        );
    }

    #[test]
    fn truthiness_per_tag() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(Number::Int(0)).is_truthy());
        assert!(!Value::Number(Number::Float(0.0)).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::List(Vec::new()).is_truthy());
        assert!(!Value::Map(ValueMap::new()).is_truthy());
        assert!(!Value::Nothing.is_truthy());
        assert!(Value::Number(Number::Float(0.5)).is_truthy());
        assert!(Value::Str(" ".to_string()).is_truthy());
    }

    #[test]
    fn duplicate_map_keys_update_in_place() {
        let mut map = ValueMap::new();
        map.insert(Value::Str("a".to_string()), Value::Number(Number::Int(1)));
        map.insert(Value::Str("b".to_string()), Value::Number(Number::Int(2)));
        map.insert(Value::Str("a".to_string()), Value::Number(Number::Int(3)));
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&Value::Str("a".to_string())),
            Some(&Value::Number(Number::Int(3)))
        );
        let keys: Vec<String> = map.iter().map(|(key, _)| key.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn displays_collections_readably() {
        let list = Value::List(vec![
            Value::Number(Number::Int(1)),
            Value::Str("two".to_string()),
            Value::Nothing,
        ]);
        assert_eq!(list.to_string(), "[1, two, nothing]");
        let map: ValueMap = [
            (Value::Str("hello".to_string()), Value::Number(Number::Int(4))),
            (Value::Number(Number::Int(24)), Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        assert_eq!(Value::Map(map).to_string(), "{hello: 4, 24: false}");
    }
}
