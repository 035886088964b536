use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A single value of an Abinit input variable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DeckValue {
    Integer(i64),
    Real(f64),
    Token(String),
    Integers(Vec<i64>),
    Reals(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
    #[serde(skip)]
    Quoted(String),
    #[serde(skip)]
    FixedReals { values: Vec<f64>, decimals: usize },
}

impl DeckValue {
    pub fn quoted(value: impl Into<String>) -> Self {
        Self::Quoted(value.into())
    }

    pub fn token(value: impl Into<String>) -> Self {
        Self::Token(value.into())
    }

    /// Reals written with a fixed number of decimals, one row per line.
    pub fn fixed_reals(values: Vec<f64>, decimals: usize) -> Self {
        Self::FixedReals { values, decimals }
    }

    fn is_multiline(&self) -> bool {
        match self {
            Self::Matrix(rows) => rows.len() > 1,
            Self::FixedReals { values, .. } => values.len() > 1,
            _ => false,
        }
    }

    fn render_into(&self, out: &mut String, indent: &str) {
        match self {
            Self::Integer(value) => {
                let _ = write!(out, "{value}");
            }
            Self::Real(value) => out.push_str(&format_real(*value)),
            Self::Token(value) => out.push_str(value),
            Self::Quoted(value) => {
                let _ = write!(out, "\"{value}\"");
            }
            Self::Integers(values) => out.push_str(&join(values.iter().map(i64::to_string))),
            Self::Reals(values) => out.push_str(&join(values.iter().copied().map(format_real))),
            Self::Matrix(rows) => {
                for (index, row) in rows.iter().enumerate() {
                    if index > 0 {
                        out.push('\n');
                        out.push_str(indent);
                    }
                    out.push_str(&join(row.iter().copied().map(format_real)));
                }
            }
            Self::FixedReals { values, decimals } => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        out.push('\n');
                        out.push_str(indent);
                    }
                    let _ = write!(out, "{value:.decimals$}", decimals = *decimals);
                }
            }
        }
    }
}

impl From<i64> for DeckValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for DeckValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<usize> for DeckValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for DeckValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for DeckValue {
    fn from(value: &str) -> Self {
        Self::Token(value.to_string())
    }
}

impl From<Vec<i64>> for DeckValue {
    fn from(values: Vec<i64>) -> Self {
        Self::Integers(values)
    }
}

impl From<Vec<f64>> for DeckValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Reals(values)
    }
}

impl From<Vec<Vec<f64>>> for DeckValue {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self::Matrix(rows)
    }
}

impl From<Vec<[f64; 3]>> for DeckValue {
    fn from(rows: Vec<[f64; 3]>) -> Self {
        Self::Matrix(rows.into_iter().map(|row| row.to_vec()).collect())
    }
}

/// Solver input variables keyed by name.
///
/// Keys are emitted in sorted order so that repeated writes of the same
/// deck are byte-identical.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputDeck {
    variables: BTreeMap<String, DeckValue>,
}

impl InputDeck {
    /// Stage `name`; `None` removes any earlier value instead of writing it.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Option<DeckValue>) {
        let name = name.into();
        match value {
            Some(value) => {
                self.variables.insert(name, value);
            }
            None => {
                self.variables.remove(&name);
            }
        }
    }

    pub fn set_variables<I, K>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, Option<DeckValue>)>,
        K: Into<String>,
    {
        for (name, value) in variables {
            self.set_variable(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&DeckValue> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn render(&self) -> String {
        let width = self
            .variables
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(8);
        let indent = " ".repeat(width + 1);

        let mut out = String::new();
        for (name, value) in &self.variables {
            if value.is_multiline() {
                out.push_str(name);
                out.push('\n');
                out.push_str(&indent);
            } else {
                let _ = write!(out, "{name:<width$} ");
            }
            value.render_into(&mut out, &indent);
            out.push('\n');
        }
        out
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(" ")
}

pub(crate) fn format_real(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let magnitude = value.abs();
    if !(1.0e-4..1.0e10).contains(&magnitude) {
        return format!("{value:e}");
    }
    let rendered = format!("{value}");
    if rendered.contains('.') {
        rendered
    } else {
        format!("{rendered}.0")
    }
}
