use std::{collections::HashMap, sync::Arc};

use lazy_static::lazy_static;
use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Location,
};

use super::{
    builtins::register_builtins,
    function::{Function, Method},
    modules::register_modules,
    types::{Type, TypeSet},
};

/// A nominal type: its own methods plus at most one parent.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub parent: Option<String>,
    pub methods: Vec<Arc<Method>>,
}

/// Registry of every type, method and global function.
///
/// The built-in namespace is created once through `namespace()` and is
/// read-only afterwards. Tests build fabricated namespaces from `empty()`.
#[derive(Debug, Default)]
pub struct TypeNamespace {
    objects: HashMap<String, ObjectType>,
    functions: HashMap<String, Arc<Function>>,
    vtables: HashMap<String, Vec<Arc<Method>>>,
}

lazy_static! {
    static ref NAMESPACE: TypeNamespace = TypeNamespace::builtin();
}

/// The process-wide built-in namespace.
pub fn namespace() -> &'static TypeNamespace {
    &NAMESPACE
}

impl TypeNamespace {
    pub fn empty() -> Self {
        TypeNamespace::default()
    }

    pub fn builtin() -> Self {
        let mut ns = TypeNamespace::empty();
        register_builtins(&mut ns);
        register_modules(&mut ns);
        debug!(
            "type namespace ready: {} types, {} functions",
            ns.objects.len(),
            ns.functions.len()
        );
        ns
    }

    /// Registers a type with its methods. Primitive and container tables
    /// (`str`, `list`, ...) are registered the same way, without a parent.
    pub fn register_object(&mut self, name: &str, parent: Option<&str>, methods: Vec<Function>) {
        let methods = methods
            .into_iter()
            .map(|function| Arc::new(Method::new(function, name)))
            .collect::<Vec<_>>();

        for method in &methods {
            self.vtables
                .entry(method.name().to_string())
                .or_default()
                .push(method.clone());
        }

        self.objects.insert(
            name.to_string(),
            ObjectType {
                name: name.to_string(),
                parent: parent.map(str::to_string),
                methods,
            },
        );
    }

    pub fn register_function(&mut self, function: Function) {
        self.functions
            .insert(function.name.clone(), Arc::new(function));
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions.get(name)
    }

    pub fn lookup_object(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name)
    }

    /// Replaces a lazy type by the object it names.
    pub fn resolve_lazy(&self, ty: &Type) -> Result<Type, Error> {
        match ty {
            Type::Lazy(name) if self.objects.contains_key(name) => Ok(Type::object(name)),
            Type::Lazy(name) => Err(Error::new(
                ErrorImpl::UnknownLazyType { name: name.clone() },
                Location::null(),
            )),
            other => Ok(other.clone()),
        }
    }

    /// Resolves every lazy member of `types`, recursing into containers.
    /// Unknown lazies are dropped.
    pub fn resolve_all(&self, types: &TypeSet) -> TypeSet {
        types
            .iter()
            .filter_map(|ty| match ty {
                Type::List(elements) => Some(Type::List(self.resolve_all(elements))),
                Type::Dict(values) => Some(Type::Dict(self.resolve_all(values))),
                other => self.resolve_lazy(other).ok(),
            })
            .collect()
    }

    /// The nearest method called `name`, walking from `ty` up the parents.
    pub fn resolve_method(&self, ty: &Type, name: &str) -> Result<Option<Arc<Method>>, Error> {
        let ty = self.resolve_lazy(ty)?;
        let mut current = Some(ty.table_name().to_string());

        // Bounded so a malformed parent cycle cannot loop forever.
        for _ in 0..=self.objects.len() {
            let Some(object) = current.and_then(|name| self.objects.get(&name)) else {
                return Ok(None);
            };
            if let Some(method) = object.methods.iter().find(|m| m.name() == name) {
                return Ok(Some(method.clone()));
            }
            current = object.parent.clone();
        }

        Ok(None)
    }

    /// Every method called `name` on any type, used when the receiver's type
    /// is unknown.
    pub fn guess_methods(&self, name: &str) -> &[Arc<Method>] {
        self.vtables.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `name` is `ancestor` or inherits from it.
    pub fn is_subtype(&self, name: &str, ancestor: &str) -> bool {
        let mut current = Some(name.to_string());
        for _ in 0..=self.objects.len() {
            match current {
                Some(ref n) if n == ancestor => return true,
                Some(n) => current = self.objects.get(&n).and_then(|o| o.parent.clone()),
                None => return false,
            }
        }
        false
    }
}
