//! Nested style literals: the authoring-side input of the compiler.

/// One declaration value: keyword text, a bare number (default units are
/// appended by the `units` visitor), or a space-joined list.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    List(Vec<Value>),
}

impl Value {
    pub fn to_css(&self) -> String {
        match self {
            Value::Str(text) => text.clone(),
            Value::Num(number) => format_number(*number),
            Value::List(parts) => parts
                .iter()
                .map(Value::to_css)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Num(value as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.trunc() == n && n.abs() < 9.007_199_254_740_992e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One entry of a literal: a declaration or a nested block (selector or
/// at-rule).
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Decl(Value),
    Block(StyleLiteral),
}

/// Ordered nested literal. Order is preserved all the way into the
/// stylesheet text, so hashing is stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleLiteral {
    entries: Vec<(String, Entry)>,
}

impl StyleLiteral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decl(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((name.into(), Entry::Decl(value.into())));
        self
    }

    pub fn block(mut self, selector: impl Into<String>, nested: StyleLiteral) -> Self {
        self.entries.push((selector.into(), Entry::Block(nested)));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn into_entries(self) -> Vec<(String, Entry)> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a [`StyleLiteral`]:
///
/// ```ignore
/// style! {
///     "color": "red",
///     "fontSize": 14,
///     "&:hover": { "color": "blue" },
///     "@media (max-width: 600px)": { "padding": 0 },
/// }
/// ```
#[macro_export]
macro_rules! style {
    ($($key:literal : $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut literal = $crate::literal::StyleLiteral::new();
        $( literal = $crate::style_entry!(literal, $key, $value); )*
        literal
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! style_entry {
    ($literal:expr, $key:literal, { $($inner:tt)* }) => {
        $literal.block($key, $crate::style! { $($inner)* })
    };
    ($literal:expr, $key:literal, $value:expr) => {
        $literal.decl($key, $value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_preserves_order_and_nesting() {
        let literal = crate::style! {
            "color": "red",
            "fontSize": 14,
            "&:hover": { "color": "blue" },
        };
        let entries: Vec<_> = literal.entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "color");
        assert!(matches!(entries[2].1, Entry::Block(_)));
    }

    #[test]
    fn list_values_join_with_spaces() {
        let value = Value::List(vec![Value::Num(0.0), Value::Str("auto".into())]);
        assert_eq!(value.to_css(), "0 auto");
    }
}
