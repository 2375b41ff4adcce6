//! Addressing nodes inside a menu tree.
//!
//! A [`MenuPath`] holds one index per level. Hosts exchange paths in the
//! document's own shape, where each descent is spelled out:
//! `[1, "submenu", "options", 0]`. A child list is addressed through the node
//! that owns it (`add_option(Some(&owner))`), so every wire path names a node.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::MenuError;

const SUBMENU: &str = "submenu";
const OPTIONS: &str = "options";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuPath(Vec<usize>);

impl MenuPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Path of a top-level option.
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn to_wire(&self) -> Vec<Value> {
        let mut steps = Vec::with_capacity(self.0.len() * 3);
        for (n, &i) in self.0.iter().enumerate() {
            if n > 0 {
                steps.push(Value::from(SUBMENU));
                steps.push(Value::from(OPTIONS));
            }
            steps.push(Value::from(i));
        }
        steps
    }
}

/// Parse the alternating `index, "submenu", "options", index, ...` form.
pub fn parse_wire(steps: &[Value]) -> Result<MenuPath, MenuError> {
    let mut indices = Vec::new();
    let mut iter = steps.iter();
    while let Some(step) = iter.next() {
        let index = step
            .as_u64()
            .ok_or_else(|| MenuError::ParsePath(format!("expected an index, found {}", step)))?;
        indices.push(index as usize);

        match (iter.next(), iter.next()) {
            (None, _) => return Ok(MenuPath(indices)),
            (Some(Value::String(s)), Some(Value::String(o))) if s == SUBMENU && o == OPTIONS => {}
            _ => {
                return Err(MenuError::ParsePath(
                    "expected \"submenu\", \"options\" between indices".to_string(),
                ))
            }
        }
    }
    Err(MenuError::ParsePath("path must end with an index".to_string()))
}

impl fmt::Display for MenuPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

/// Dotted form used on the command line: `1.0.2`.
impl FromStr for MenuPath {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MenuError::ParsePath("empty path".to_string()));
        }
        s.split('.')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| MenuError::ParsePath(format!("'{}' is not an index", part)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MenuPath)
    }
}

impl Serialize for MenuPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MenuPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let steps = Vec::<Value>::deserialize(deserializer)?;
        parse_wire(&steps).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(value: Value) -> Result<MenuPath, MenuError> {
        parse_wire(value.as_array().unwrap())
    }

    #[test]
    fn test_wire_form() {
        let path = MenuPath::new(vec![0, 2, 1]);
        assert_eq!(
            Value::from(path.to_wire()),
            json!([0, "submenu", "options", 2, "submenu", "options", 1])
        );
        assert_eq!(Value::from(MenuPath::root(4).to_wire()), json!([4]));
    }

    #[test]
    fn test_parse_wire() {
        assert_eq!(wire(json!([1, "submenu", "options", 0])).unwrap(), MenuPath::new(vec![1, 0]));
        assert_eq!(wire(json!([3])).unwrap(), MenuPath::root(3));
    }

    #[test]
    fn test_parse_wire_rejects_garbage() {
        assert!(wire(json!([])).is_err());
        assert!(wire(json!(["submenu"])).is_err());
        assert!(wire(json!([0, "options", "submenu", 1])).is_err());
        assert!(wire(json!([0, "submenu"])).is_err());
        assert!(wire(json!([1, "submenu", "options"])).is_err());
        assert!(wire(json!([-1])).is_err());
    }

    #[test]
    fn test_serde_uses_wire_form() {
        let path: MenuPath = serde_json::from_value(json!([3, "submenu", "options", 4])).unwrap();
        assert_eq!(path.indices(), &[3, 4]);
        assert_eq!(serde_json::to_value(&path).unwrap(), json!([3, "submenu", "options", 4]));
        assert!(serde_json::from_value::<MenuPath>(json!([3, "submenu", "options"])).is_err());
    }

    #[test]
    fn test_dotted_form() {
        let path: MenuPath = "1.0.2".parse().unwrap();
        assert_eq!(path.indices(), &[1, 0, 2]);
        assert_eq!(path.to_string(), "1.0.2");
        assert!("".parse::<MenuPath>().is_err());
        assert!("1..2".parse::<MenuPath>().is_err());
        assert!("a".parse::<MenuPath>().is_err());
    }

    #[test]
    fn test_child_and_depth() {
        let path = MenuPath::new(vec![1, 0]);
        assert_eq!(path.child(3).indices(), &[1, 0, 3]);
        assert_eq!(path.depth(), 2);
    }
}
