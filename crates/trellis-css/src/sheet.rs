//! Reference-counted rule registry.
//!
//! Rules enter keyed by class name; repeated entries bump a count instead
//! of duplicating text. Exited rules are only dropped by an explicit
//! [`Stylesheet::sweep`], so a rule that is re-entered before the sweep
//! keeps its text.

use indexmap::IndexMap;

struct Rule {
    css: String,
    count: usize,
}

#[derive(Default)]
pub struct Stylesheet {
    rules: IndexMap<String, Rule>,
    maybe_unused: Vec<String>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Registers a use of `key`. `css` may be omitted only when the rule is
    /// already present.
    pub fn enter(&mut self, key: &str, css: Option<String>) {
        match self.rules.get_mut(key) {
            Some(rule) => rule.count += 1,
            None => {
                let css = css.unwrap_or_else(|| panic!("missing css for new rule {key}"));
                self.rules.insert(key.to_string(), Rule { css, count: 1 });
            }
        }
    }

    /// Releases one use of `key`; rules that reach zero become candidates
    /// for the next sweep.
    pub fn exit(&mut self, key: &str) {
        if let Some(rule) = self.rules.get_mut(key) {
            rule.count = rule.count.saturating_sub(1);
            if rule.count == 0 {
                self.maybe_unused.push(key.to_string());
            }
        }
    }

    /// Drops rules that are still unreferenced.
    pub fn sweep(&mut self) {
        let maybe_unused = std::mem::take(&mut self.maybe_unused);
        for key in maybe_unused {
            if self.rules.get(&key).is_some_and(|rule| rule.count == 0) {
                self.rules.shift_remove(&key);
                log::debug!("dropped unused rule {key}");
            }
        }
    }

    /// Full stylesheet text, insertion order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for rule in self.rules.values() {
            out.push_str(&rule.css);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
