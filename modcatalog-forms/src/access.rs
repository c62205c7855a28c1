use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// The two operations a rendered field needs from its host.
///
/// `set` receives `Value::Null` for "unset / use default".
pub trait FieldAccess {
    fn initial(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
}

impl<G, S> FieldAccess for (G, S)
where
    G: Fn(&str) -> Option<Value>,
    S: FnMut(&str, Value),
{
    fn initial(&self, key: &str) -> Option<Value> {
        (self.0)(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        (self.1)(key, value)
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for &mut T {
    fn initial(&self, key: &str) -> Option<Value> {
        (**self).initial(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        (**self).set(key, value)
    }
}

/// JSON-object backed host. Setting `null` removes the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormModel {
    values: Map<String, Value>,
}

pub type SharedModel = Rc<RefCell<FormModel>>;

impl FormModel {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn shared(self) -> SharedModel {
        Rc::new(RefCell::new(self))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}

impl FieldAccess for FormModel {
    fn initial(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        if value.is_null() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), value);
        }
    }
}

impl FieldAccess for SharedModel {
    fn initial(&self, key: &str) -> Option<Value> {
        self.borrow().initial(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.borrow_mut().set(key, value)
    }
}
