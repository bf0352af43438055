use crate::{errors::errors::ErrorImpl, TYPES};

use super::{
    function::Function,
    modules::module_type_name,
    namespace::{namespace, TypeNamespace},
    types::{Type, TypeSet},
};

fn method(name: &str, ret: Type) -> Function {
    Function::builder(name).returns(TYPES![ret]).no_args().build()
}

#[test]
fn test_typeset_collapses_containers() {
    let set = TYPES![
        Type::list(TYPES![Type::Int]),
        Type::Str,
        Type::list(TYPES![Type::Str]),
        Type::Str,
    ];

    assert_eq!(set.len(), 2);
    assert_eq!(set.list_elements(), Some(&TYPES![Type::Int, Type::Str]));
    assert_eq!(set.to_string(), "list(int|str)|str");
}

#[test]
fn test_typeset_is_sorted_by_name() {
    let a = TYPES![Type::Str, Type::object("dep"), Type::Bool];
    let b = TYPES![Type::Bool, Type::Str, Type::object("dep")];
    assert_eq!(a, b);
    assert_eq!(a.names(), vec!["bool", "dep", "str"]);
}

#[test]
fn test_container_equality_is_structural() {
    let a = Type::dict(TYPES![Type::Int, Type::Str]);
    let b = Type::dict(TYPES![Type::Str, Type::Int, Type::Str]);
    assert_eq!(a, b);
    assert_ne!(a, Type::dict(TYPES![Type::Int]));
}

#[test]
fn test_typeset_subset() {
    let small = TYPES![Type::Int, Type::list(TYPES![Type::Str])];
    let big = TYPES![Type::Int, Type::Bool, Type::list(TYPES![Type::Str, Type::Int])];
    assert!(small.is_subset(&big));
    assert!(!big.is_subset(&small));
    assert!(TypeSet::new().is_subset(&small));
}

#[test]
fn test_function_argument_bounds() {
    let function = Function::builder("f")
        .pos("a", TYPES![Type::Str])
        .opt_pos("b", TYPES![Type::Str])
        .required_kwarg("k", TYPES![Type::Bool])
        .kwarg("o", TYPES![Type::Bool])
        .build();
    assert_eq!(function.min_pos_args(), 1);
    assert_eq!(function.max_pos_args(), Some(2));
    assert_eq!(function.required_kwargs(), &[String::from("k")]);
    assert!(function.has_kwarg("o"));
    assert!(!function.has_kwarg("x"));

    let variadic = Function::builder("g")
        .pos("a", TYPES![Type::Str])
        .varargs("rest", TYPES![Type::Str])
        .build();
    assert_eq!(variadic.min_pos_args(), 2);
    assert_eq!(variadic.max_pos_args(), None);
    assert_eq!(variadic.positional_at(5).map(|a| a.name.as_str()), Some("rest"));

    let unchecked = Function::builder("h").build();
    assert!(!unchecked.is_checked());
}

#[test]
fn test_nearest_ancestor_method_wins() {
    let mut ns = TypeNamespace::empty();
    ns.register_object("A", None, vec![method("m", Type::Int)]);
    ns.register_object("B", Some("A"), vec![]);
    ns.register_object("C", Some("B"), vec![]);

    let found = ns
        .resolve_method(&Type::object("C"), "m")
        .unwrap()
        .expect("method on A");
    assert_eq!(found.owner, "A");

    ns.register_object("B", Some("A"), vec![method("m", Type::Str)]);
    let found = ns
        .resolve_method(&Type::object("C"), "m")
        .unwrap()
        .expect("method on B");
    assert_eq!(found.owner, "B");
    assert_eq!(found.id(), "B.m");
    assert_eq!(found.function.return_types, TYPES![Type::Str]);

    assert!(ns
        .resolve_method(&Type::object("C"), "missing")
        .unwrap()
        .is_none());
}

#[test]
fn test_lazy_types_resolve_through_namespace() {
    let mut ns = TypeNamespace::empty();
    ns.register_object("later", None, vec![method("go", Type::Bool)]);

    assert_eq!(
        ns.resolve_lazy(&Type::lazy("later")).unwrap(),
        Type::object("later")
    );
    let found = ns.resolve_method(&Type::lazy("later"), "go").unwrap();
    assert!(found.is_some());

    let error = ns.resolve_lazy(&Type::lazy("nowhere")).unwrap_err();
    assert_eq!(
        error.get_internal(),
        &ErrorImpl::UnknownLazyType {
            name: String::from("nowhere")
        }
    );
    assert!(ns.resolve_method(&Type::lazy("nowhere"), "go").is_err());
}

#[test]
fn test_resolve_all_drops_unknown_lazies() {
    let mut ns = TypeNamespace::empty();
    ns.register_object("known", None, vec![]);

    let resolved = ns.resolve_all(&TYPES![
        Type::lazy("known"),
        Type::lazy("unknown"),
        Type::list(TYPES![Type::lazy("known")]),
    ]);
    assert_eq!(
        resolved,
        TYPES![Type::object("known"), Type::list(TYPES![Type::object("known")])]
    );
}

#[test]
fn test_builtin_machines_inherit() {
    let ns = namespace();
    let system = ns
        .resolve_method(&Type::object("host_machine"), "system")
        .unwrap()
        .expect("inherited from build_machine");
    assert_eq!(system.owner, "build_machine");
    assert!(ns.is_subtype("both_libs", "build_tgt"));
    assert!(!ns.is_subtype("dep", "tgt"));
}

#[test]
fn test_builtin_primitive_methods() {
    let ns = namespace();
    let split = ns.resolve_method(&Type::Str, "split").unwrap().unwrap();
    assert_eq!(
        split.function.return_types,
        TYPES![Type::list(TYPES![Type::Str])]
    );

    let length = ns
        .resolve_method(&Type::list(TYPES![Type::Int]), "length")
        .unwrap()
        .unwrap();
    assert_eq!(length.owner, "list");
}

#[test]
fn test_vtable_guesses_by_name() {
    let ns = namespace();
    let owners = ns
        .guess_methods("found")
        .iter()
        .map(|m| m.owner.clone())
        .collect::<Vec<_>>();
    assert!(owners.contains(&String::from("dep")));
    assert!(owners.contains(&String::from("external_program")));
    assert!(ns.guess_methods("no_such_method").is_empty());
}

#[test]
fn test_module_lazies_are_registered() {
    let ns = namespace();
    let module = module_type_name("python").unwrap();
    let find = ns
        .resolve_method(&Type::object(module), "find_installation")
        .unwrap()
        .unwrap();
    let resolved = ns.resolve_all(&find.function.return_types);
    assert_eq!(resolved, TYPES![Type::object("python_installation")]);

    assert_eq!(module_type_name("unstable-rust"), Some("rust_module"));
    assert_eq!(module_type_name("nope"), None);
}

#[test]
fn test_global_functions() {
    let ns = namespace();
    let executable = ns.lookup_function("executable").unwrap();
    assert_eq!(executable.return_types, TYPES![Type::object("exe")]);
    assert!(executable.has_kwarg("install"));

    let files = ns.lookup_function("files").unwrap();
    assert_eq!(files.min_pos_args(), 0);
    assert_eq!(files.max_pos_args(), None);
    assert!(ns.lookup_function("not_a_function").is_none());
}
