use serde_json::Value;

use crate::vars::VariableMap;

/// Name lookup for placeholders, conditions and loop targets.
///
/// Inside an `{{#each}}` body the current item is bound as `this` and its
/// position as `@index`; an inner loop shadows the outer binding.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    vars: &'a VariableMap,
    item: Option<(&'a Value, usize)>,
}

impl<'a> Scope<'a> {
    pub fn root(vars: &'a VariableMap) -> Self {
        Self { vars, item: None }
    }

    /// Child scope with `item` bound as `this`.
    #[must_use]
    pub fn with_item<'b>(&self, item: &'b Value, index: usize) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope { vars: self.vars, item: Some((item, index)) }
    }

    pub fn in_loop(&self) -> bool {
        self.item.is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        match (name, self.item) {
            ("this", Some((item, _))) => Some(item.clone()),
            ("@index", Some((_, index))) => Some(Value::from(index)),
            _ => self.vars.get(name).cloned(),
        }
    }
}
