//! Built-in prototype objects.

use std::rc::Rc;

use crate::builtins;
use crate::value::{Object, ObjectKind, Value};

/// The prototypes every object of a given kind links to.
///
/// Built once per interpreter and shared by reference from each instance.
pub struct Realm {
    pub object_prototype: Rc<Object>,
    pub function_prototype: Rc<Object>,
    pub array_prototype: Rc<Object>,
    pub string_prototype: Rc<Object>,
    pub number_prototype: Rc<Object>,
    pub boolean_prototype: Rc<Object>,
    pub error_prototype: Rc<Object>,
}

impl Realm {
    pub fn new() -> Self {
        let object_prototype = Rc::new(Object::new(ObjectKind::Plain, None));
        let derived = || Rc::new(Object::new(ObjectKind::Plain, Some(object_prototype.clone())));
        let realm = Realm {
            function_prototype: derived(),
            array_prototype: derived(),
            string_prototype: derived(),
            number_prototype: derived(),
            boolean_prototype: derived(),
            error_prototype: derived(),
            object_prototype: object_prototype.clone(),
        };
        realm.error_prototype.define("name", Value::string("Error"));
        realm.error_prototype.define("message", Value::string(""));
        builtins::install_prototype_methods(&realm);
        realm
    }

    /// A fresh `{}`.
    pub fn plain_object(&self) -> Rc<Object> {
        Rc::new(Object::new(ObjectKind::Plain, Some(self.object_prototype.clone())))
    }

    pub fn array(&self, items: Vec<Value>) -> Value {
        let kind = ObjectKind::Array(std::cell::RefCell::new(items));
        Value::Object(Rc::new(Object::new(kind, Some(self.array_prototype.clone()))))
    }

    /// An error object with own `name` and `message`.
    pub fn error(&self, name: &str, message: impl Into<String>) -> Value {
        let obj = Object::new(ObjectKind::Error, Some(self.error_prototype.clone()));
        obj.define("name", Value::string(name));
        obj.define("message", Value::string(message.into()));
        Value::Object(Rc::new(obj))
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}
