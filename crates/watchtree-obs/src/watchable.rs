//! Typed catalog of the variables a model can record.
//!
//! Built once at setup from the model's recorded state paths. Each path
//! segment becomes a [`Variable`]: inner segments are structured, the last
//! is a float. Indexed segments (`pop[3]`) become arrays whose size grows
//! to cover the largest index seen.

use tracing::warn;
use watchtree_core::StateId;
use watchtree_path::{split_indexed, InstancePath, StatePath};

/// Scalar or array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    /// A single value.
    Simple,
    /// `size` elements, addressed `name[0]` to `name[size - 1]`.
    Array {
        /// Element count.
        size: u64,
    },
}

/// What a variable holds.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableType {
    /// A recorded float.
    Float,
    /// Nested variables.
    Structured(Vec<Variable>),
}

/// One entry of the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Segment name, without any index.
    pub name: String,
    /// Scalar or array.
    pub kind: VariableKind,
    /// Float or nested.
    pub ty: VariableType,
}

impl Variable {
    fn new(name: &str, index: Option<u64>, terminal: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: match index {
                Some(i) => VariableKind::Array { size: i + 1 },
                None => VariableKind::Simple,
            },
            ty: if terminal {
                VariableType::Float
            } else {
                VariableType::Structured(Vec::new())
            },
        }
    }

    fn accepts(&self, index: Option<u64>) -> bool {
        match (self.kind, index) {
            (VariableKind::Simple, None) => true,
            (VariableKind::Array { size }, Some(i)) => i < size,
            _ => false,
        }
    }
}

/// The variable catalog.
///
/// # Examples
///
/// ```
/// use watchtree_obs::WatchableVariables;
/// use watchtree_path::InstancePath;
///
/// let vars = WatchableVariables::from_states(["pop/0/v", "pop/2/v"].map(Into::into));
/// assert!(vars.contains(&InstancePath::decode("pop[1].v").unwrap()));
/// assert!(!vars.contains(&InstancePath::decode("pop[3].v").unwrap()));
/// assert_eq!(vars.paths().len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WatchableVariables {
    variables: Vec<Variable>,
}

impl WatchableVariables {
    /// Build the catalog from recorded state identifiers.
    ///
    /// Identifiers that do not parse as state paths are logged and skipped.
    /// A segment seen once as scalar and once as array keeps its first
    /// shape.
    pub fn from_states<I: IntoIterator<Item = StateId>>(states: I) -> Self {
        let mut catalog = Self::default();
        for state in states {
            match StatePath::from_state(&state).and_then(|p| p.to_instance()) {
                Ok(path) => catalog.insert(&path),
                Err(e) => warn!(state = %state, error = %e, "skipping unwatchable state"),
            }
        }
        catalog
    }

    fn insert(&mut self, path: &InstancePath) {
        let segments = path.segments();
        let mut level = &mut self.variables;
        for (i, segment) in segments.iter().enumerate() {
            let terminal = i + 1 == segments.len();
            let (name, index) = match split_indexed(segment) {
                Some((name, index)) => (name, Some(index)),
                None => (segment.as_str(), None),
            };

            let position = match level.iter().position(|v| v.name == name) {
                Some(position) => position,
                None => {
                    level.push(Variable::new(name, index, terminal));
                    level.len() - 1
                }
            };
            let variable = &mut level[position];
            if let (VariableKind::Array { size }, Some(seen)) = (&mut variable.kind, index) {
                *size = (*size).max(seen + 1);
            }
            match &mut variable.ty {
                VariableType::Structured(children) if !terminal => level = children,
                VariableType::Float if terminal => return,
                _ => {
                    warn!(%path, %segment, "variable shape conflicts with catalog");
                    return;
                }
            }
        }
    }

    /// Top-level variables.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Whether `suffix` names a float variable in the catalog, with every
    /// index in range.
    pub fn contains(&self, suffix: &InstancePath) -> bool {
        let segments = suffix.segments();
        let mut level = self.variables.as_slice();
        for (i, segment) in segments.iter().enumerate() {
            let terminal = i + 1 == segments.len();
            let (name, index) = match split_indexed(segment) {
                Some((name, index)) => (name, Some(index)),
                None => (segment.as_str(), None),
            };
            let Some(variable) = level.iter().find(|v| v.name == name && v.accepts(index)) else {
                return false;
            };
            match &variable.ty {
                VariableType::Structured(children) if !terminal => level = children,
                VariableType::Float => return terminal,
                VariableType::Structured(_) => return false,
            }
        }
        false
    }

    /// Every concrete float path, arrays expanded, in catalog order.
    pub fn paths(&self) -> Vec<InstancePath> {
        let mut out = Vec::new();
        collect(&self.variables, &mut Vec::new(), &mut out);
        out
    }
}

fn collect(level: &[Variable], prefix: &mut Vec<String>, out: &mut Vec<InstancePath>) {
    for variable in level {
        let names: Vec<String> = match variable.kind {
            VariableKind::Simple => vec![variable.name.clone()],
            VariableKind::Array { size } => {
                (0..size).map(|i| format!("{}[{i}]", variable.name)).collect()
            }
        };
        for name in names {
            prefix.push(name);
            match &variable.ty {
                VariableType::Float => {
                    if let Ok(path) = InstancePath::from_segments(prefix.iter().cloned()) {
                        out.push(path);
                    }
                }
                VariableType::Structured(children) => collect(children, prefix, out),
            }
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(states: &[&str]) -> WatchableVariables {
        WatchableVariables::from_states(states.iter().map(|&s| StateId::from(s)))
    }

    fn path(text: &str) -> InstancePath {
        InstancePath::decode(text).unwrap()
    }

    #[test]
    fn nested_structure() {
        let vars = catalog(&["hhpop/0/bioPhys1/naChans/na/m/q", "hhpop/0/v"]);
        let top = vars.variables();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "hhpop");
        assert_eq!(top[0].kind, VariableKind::Array { size: 1 });
        let VariableType::Structured(children) = &top[0].ty else {
            panic!("hhpop should be structured");
        };
        let names: Vec<&str> = children.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["bioPhys1", "v"]);
        assert_eq!(children[1].ty, VariableType::Float);
    }

    #[test]
    fn array_size_grows_to_max_index() {
        let vars = catalog(&["pop/1/v", "pop/4/v", "pop/2/v"]);
        assert_eq!(vars.variables()[0].kind, VariableKind::Array { size: 5 });
    }

    #[test]
    fn contains_checks_shape_and_range() {
        let vars = catalog(&["pop/2/v", "time"]);
        assert!(vars.contains(&path("time")));
        assert!(vars.contains(&path("pop[0].v")));
        assert!(!vars.contains(&path("pop[3].v")));
        assert!(!vars.contains(&path("pop.v")));
        assert!(!vars.contains(&path("pop[0]")));
        assert!(!vars.contains(&path("pop[0].v.x")));
    }

    #[test]
    fn paths_expand_arrays() {
        let vars = catalog(&["pop/1/v", "t"]);
        let paths: Vec<String> = vars.paths().iter().map(InstancePath::encode).collect();
        assert_eq!(paths, ["pop[0].v", "pop[1].v", "t"]);
    }

    #[test]
    fn invalid_states_are_skipped() {
        let vars = catalog(&["0/v", "a//b", "ok"]);
        assert_eq!(vars.paths(), vec![path("ok")]);
    }

    #[test]
    fn shape_conflict_keeps_first() {
        let vars = catalog(&["m/q", "m"]);
        assert!(vars.contains(&path("m.q")));
        assert!(!vars.contains(&path("m")));
    }
}
