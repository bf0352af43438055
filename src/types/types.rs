use std::fmt::Display;

/// A statically known type.
///
/// Containers are parameterised by a `TypeSet` and compared structurally.
/// Objects and lazies are nominal; a lazy names an object that is looked up
/// through the namespace before any method is resolved on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Any,
    Void,
    Bool,
    Int,
    Str,
    List(TypeSet),
    Dict(TypeSet),
    Object(String),
    Lazy(String),
}

impl Type {
    pub fn object(name: &str) -> Type {
        Type::Object(name.to_string())
    }

    pub fn lazy(name: &str) -> Type {
        Type::Lazy(name.to_string())
    }

    pub fn list(elements: TypeSet) -> Type {
        Type::List(elements)
    }

    pub fn dict(values: TypeSet) -> Type {
        Type::Dict(values)
    }

    /// Display name, used for deduplication and ordering.
    pub fn name(&self) -> String {
        match self {
            Type::Any => String::from("any"),
            Type::Void => String::from("void"),
            Type::Bool => String::from("bool"),
            Type::Int => String::from("int"),
            Type::Str => String::from("str"),
            Type::List(elements) => format!("list({})", elements),
            Type::Dict(values) => format!("dict({})", values),
            Type::Object(name) | Type::Lazy(name) => name.clone(),
        }
    }

    /// Name of the method table this type reads from.
    pub fn table_name(&self) -> &str {
        match self {
            Type::Any => "any",
            Type::Void => "void",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Str => "str",
            Type::List(_) => "list",
            Type::Dict(_) => "dict",
            Type::Object(name) | Type::Lazy(name) => name,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A normalised union of types.
///
/// All lists collapse into one list holding the union of their element
/// sets, all dicts likewise, every other type appears once per name.
/// Members are kept sorted by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeSet {
    types: Vec<Type>,
}

impl TypeSet {
    pub fn new() -> Self {
        TypeSet { types: vec![] }
    }

    pub fn from_types(types: Vec<Type>) -> Self {
        let mut set = TypeSet::new();
        for ty in types {
            set.insert(ty);
        }
        set
    }

    pub fn single(ty: Type) -> Self {
        TypeSet::from_types(vec![ty])
    }

    pub fn insert(&mut self, ty: Type) {
        match ty {
            Type::List(elements) => {
                match self.types.iter_mut().find(|t| matches!(t, Type::List(_))) {
                    Some(Type::List(existing)) => existing.union(&elements),
                    _ => self.types.push(Type::List(elements)),
                }
            }
            Type::Dict(values) => {
                match self.types.iter_mut().find(|t| matches!(t, Type::Dict(_))) {
                    Some(Type::Dict(existing)) => existing.union(&values),
                    _ => self.types.push(Type::Dict(values)),
                }
            }
            other => {
                let name = other.name();
                if !self.types.iter().any(|t| t.name() == name) {
                    self.types.push(other);
                }
            }
        }
        self.types.sort_by_cached_key(|t| t.name());
    }

    pub fn union(&mut self, other: &TypeSet) {
        for ty in other.iter() {
            self.insert(ty.clone());
        }
    }

    pub fn merged(&self, other: &TypeSet) -> TypeSet {
        let mut merged = self.clone();
        merged.union(other);
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.types.contains(ty)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.types.iter().any(|t| t.name() == name)
    }

    /// Holds `any`, or nothing at all was inferred.
    pub fn is_unknown(&self) -> bool {
        self.is_empty() || self.contains(&Type::Any)
    }

    pub fn list_elements(&self) -> Option<&TypeSet> {
        self.types.iter().find_map(|t| match t {
            Type::List(elements) => Some(elements),
            _ => None,
        })
    }

    pub fn dict_values(&self) -> Option<&TypeSet> {
        self.types.iter().find_map(|t| match t {
            Type::Dict(values) => Some(values),
            _ => None,
        })
    }

    pub fn without_void(&self) -> TypeSet {
        TypeSet {
            types: self
                .types
                .iter()
                .filter(|t| **t != Type::Void)
                .cloned()
                .collect(),
        }
    }

    /// True if every member of `self` is present in `other`, recursing into
    /// container element sets.
    pub fn is_subset(&self, other: &TypeSet) -> bool {
        self.types.iter().all(|ty| match ty {
            Type::List(elements) => other
                .list_elements()
                .is_some_and(|theirs| elements.is_subset(theirs)),
            Type::Dict(values) => other
                .dict_values()
                .is_some_and(|theirs| values.is_subset(theirs)),
            _ => other.contains_name(&ty.name()),
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.name()).collect()
    }
}

impl Display for TypeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join("|"))
    }
}

impl FromIterator<Type> for TypeSet {
    fn from_iter<T: IntoIterator<Item = Type>>(iter: T) -> Self {
        TypeSet::from_types(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a Type;
    type IntoIter = std::slice::Iter<'a, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
