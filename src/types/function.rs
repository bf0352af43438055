use indexmap::IndexMap;

use super::types::TypeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionalArgument {
    pub name: String,
    pub types: TypeSet,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kwarg {
    pub name: String,
    pub types: TypeSet,
    pub optional: bool,
}

/// Signature of a built-in function or method.
///
/// The variadic parameter, if any, lives in `varargs`, after every entry of
/// `positional`. Functions registered without a signature are unchecked
/// and accept any arguments; `open_kwargs` signatures check positional
/// arguments only.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub positional: Vec<PositionalArgument>,
    pub varargs: Option<PositionalArgument>,
    pub kwargs: IndexMap<String, Kwarg>,
    pub return_types: TypeSet,
    checked: bool,
    open_kwargs: bool,
    min_pos_args: usize,
    max_pos_args: Option<usize>,
    required_kwargs: Vec<String>,
}

impl Function {
    pub fn builder(name: &str) -> FunctionBuilder {
        FunctionBuilder {
            name: name.to_string(),
            positional: vec![],
            varargs: None,
            kwargs: IndexMap::new(),
            return_types: TypeSet::new(),
            checked: false,
            open_kwargs: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.name
    }

    /// Number of required positional arguments before the first optional one.
    pub fn min_pos_args(&self) -> usize {
        self.min_pos_args
    }

    /// `None` when a variadic parameter makes the count unbounded.
    pub fn max_pos_args(&self) -> Option<usize> {
        self.max_pos_args
    }

    pub fn required_kwargs(&self) -> &[String] {
        &self.required_kwargs
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn has_kwarg(&self, name: &str) -> bool {
        self.open_kwargs || self.kwargs.contains_key(name)
    }

    /// The parameter the `idx`th positional argument binds to.
    pub fn positional_at(&self, idx: usize) -> Option<&PositionalArgument> {
        self.positional.get(idx).or(self.varargs.as_ref())
    }
}

pub struct FunctionBuilder {
    name: String,
    positional: Vec<PositionalArgument>,
    varargs: Option<PositionalArgument>,
    kwargs: IndexMap<String, Kwarg>,
    return_types: TypeSet,
    checked: bool,
    open_kwargs: bool,
}

impl FunctionBuilder {
    pub fn returns(mut self, types: TypeSet) -> Self {
        self.return_types = types;
        self
    }

    /// Marks the signature as complete even if it declares no arguments.
    pub fn no_args(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Accepts keyword arguments beyond the declared ones.
    pub fn any_kwargs(mut self) -> Self {
        self.checked = true;
        self.open_kwargs = true;
        self
    }

    pub fn pos(self, name: &str, types: TypeSet) -> Self {
        self.positional_arg(name, types, false)
    }

    pub fn opt_pos(self, name: &str, types: TypeSet) -> Self {
        self.positional_arg(name, types, true)
    }

    fn positional_arg(mut self, name: &str, types: TypeSet, optional: bool) -> Self {
        self.checked = true;
        self.positional.push(PositionalArgument {
            name: name.to_string(),
            types,
            optional,
        });
        self
    }

    pub fn varargs(self, name: &str, types: TypeSet) -> Self {
        self.variadic(name, types, false)
    }

    pub fn opt_varargs(self, name: &str, types: TypeSet) -> Self {
        self.variadic(name, types, true)
    }

    fn variadic(mut self, name: &str, types: TypeSet, optional: bool) -> Self {
        self.checked = true;
        self.varargs = Some(PositionalArgument {
            name: name.to_string(),
            types,
            optional,
        });
        self
    }

    pub fn kwarg(self, name: &str, types: TypeSet) -> Self {
        self.keyword_arg(name, types, true)
    }

    pub fn required_kwarg(self, name: &str, types: TypeSet) -> Self {
        self.keyword_arg(name, types, false)
    }

    fn keyword_arg(mut self, name: &str, types: TypeSet, optional: bool) -> Self {
        self.checked = true;
        self.kwargs.insert(
            name.to_string(),
            Kwarg {
                name: name.to_string(),
                types,
                optional,
            },
        );
        self
    }

    pub fn build(self) -> Function {
        let leading_required = self
            .positional
            .iter()
            .take_while(|arg| !arg.optional)
            .count();
        let variadic_required = leading_required == self.positional.len()
            && self.varargs.as_ref().is_some_and(|v| !v.optional);
        let min_pos_args = leading_required + usize::from(variadic_required);

        let max_pos_args = match self.varargs {
            Some(_) => None,
            None => Some(self.positional.len()),
        };

        let required_kwargs = self
            .kwargs
            .values()
            .filter(|kwarg| !kwarg.optional)
            .map(|kwarg| kwarg.name.clone())
            .collect();

        Function {
            name: self.name,
            positional: self.positional,
            varargs: self.varargs,
            kwargs: self.kwargs,
            return_types: self.return_types,
            checked: self.checked,
            open_kwargs: self.open_kwargs,
            min_pos_args,
            max_pos_args,
            required_kwargs,
        }
    }
}

/// A function bound to the object type that declares it.
///
/// `owner` is the declaring type's name and is resolved through the
/// namespace when needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub function: Function,
    pub owner: String,
}

impl Method {
    pub fn new(function: Function, owner: &str) -> Self {
        Method {
            function,
            owner: owner.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn id(&self) -> String {
        format!("{}.{}", self.owner, self.function.name)
    }
}
