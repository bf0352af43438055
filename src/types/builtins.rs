//! Built-in primitives, objects and global functions.

use crate::TYPES;

use super::{
    function::{Function, FunctionBuilder},
    namespace::TypeNamespace,
    types::{Type, TypeSet},
};

fn f(name: &str) -> FunctionBuilder {
    Function::builder(name)
}

fn obj(name: &str) -> Type {
    Type::object(name)
}

fn str_list() -> Type {
    Type::list(TYPES![Type::Str])
}

/// Return types of `get_option` before the option kind is known.
pub fn option_types() -> TypeSet {
    TYPES![
        Type::Str,
        Type::Int,
        Type::Bool,
        obj("feature"),
        Type::list(TYPES![Type::Str, Type::Int, Type::Bool]),
    ]
}

/// Every target kind `build_target` may produce.
pub fn build_target_types() -> TypeSet {
    TYPES![obj("exe"), obj("lib"), obj("build_tgt"), obj("both_libs"), obj("jar")]
}

pub fn register_builtins(ns: &mut TypeNamespace) {
    register_primitives(ns);
    register_machines(ns);
    register_targets(ns);
    register_objects(ns);
    register_compiler(ns);
    register_functions(ns);
}

fn register_primitives(ns: &mut TypeNamespace) {
    ns.register_object("any", None, vec![]);
    ns.register_object("void", None, vec![]);

    ns.register_object(
        "bool",
        None,
        vec![
            f("to_int").returns(TYPES![Type::Int]).no_args().build(),
            f("to_string")
                .returns(TYPES![Type::Str])
                .opt_pos("true_str", TYPES![Type::Str])
                .opt_pos("false_str", TYPES![Type::Str])
                .build(),
        ],
    );

    ns.register_object(
        "int",
        None,
        vec![
            f("is_even").returns(TYPES![Type::Bool]).no_args().build(),
            f("is_odd").returns(TYPES![Type::Bool]).no_args().build(),
            f("to_string")
                .returns(TYPES![Type::Str])
                .kwarg("fill", TYPES![Type::Int])
                .build(),
        ],
    );

    let fragment = || TYPES![Type::Str];
    ns.register_object(
        "str",
        None,
        vec![
            f("contains")
                .returns(TYPES![Type::Bool])
                .pos("fragment", fragment())
                .build(),
            f("endswith")
                .returns(TYPES![Type::Bool])
                .pos("fragment", fragment())
                .build(),
            f("format")
                .returns(TYPES![Type::Str])
                .opt_varargs("value", TYPES![Type::Int, Type::Bool, Type::Str])
                .build(),
            f("join")
                .returns(TYPES![Type::Str])
                .opt_varargs("strings", TYPES![Type::Str, str_list()])
                .build(),
            f("replace")
                .returns(TYPES![Type::Str])
                .pos("old", fragment())
                .pos("new", fragment())
                .build(),
            f("split")
                .returns(TYPES![str_list()])
                .opt_pos("split_string", fragment())
                .build(),
            f("splitlines").returns(TYPES![str_list()]).no_args().build(),
            f("startswith")
                .returns(TYPES![Type::Bool])
                .pos("fragment", fragment())
                .build(),
            f("strip")
                .returns(TYPES![Type::Str])
                .opt_pos("strip_chars", fragment())
                .build(),
            f("substring")
                .returns(TYPES![Type::Str])
                .opt_pos("start", TYPES![Type::Int])
                .opt_pos("end", TYPES![Type::Int])
                .build(),
            f("to_int").returns(TYPES![Type::Int]).no_args().build(),
            f("to_lower").returns(TYPES![Type::Str]).no_args().build(),
            f("to_upper").returns(TYPES![Type::Str]).no_args().build(),
            f("underscorify").returns(TYPES![Type::Str]).no_args().build(),
            f("version_compare")
                .returns(TYPES![Type::Bool])
                .pos("compare_string", fragment())
                .build(),
        ],
    );

    ns.register_object(
        "list",
        None,
        vec![
            f("contains")
                .returns(TYPES![Type::Bool])
                .pos("item", TYPES![Type::Any])
                .build(),
            f("get")
                .returns(TYPES![Type::Any])
                .pos("index", TYPES![Type::Int])
                .opt_pos("fallback", TYPES![Type::Any])
                .build(),
            f("length").returns(TYPES![Type::Int]).no_args().build(),
        ],
    );

    ns.register_object(
        "dict",
        None,
        vec![
            f("get")
                .returns(TYPES![Type::Any])
                .pos("key", TYPES![Type::Str])
                .opt_pos("fallback", TYPES![Type::Any])
                .build(),
            f("has_key")
                .returns(TYPES![Type::Bool])
                .pos("key", TYPES![Type::Str])
                .build(),
            f("keys").returns(TYPES![str_list()]).no_args().build(),
        ],
    );
}

fn register_machines(ns: &mut TypeNamespace) {
    let str_method = |name: &str| f(name).returns(TYPES![Type::Str]).no_args().build();

    ns.register_object(
        "meson",
        None,
        vec![
            f("add_devenv").build(),
            f("add_dist_script").build(),
            f("add_install_script").build(),
            f("add_postconf_script").build(),
            str_method("backend"),
            str_method("build_root"),
            f("can_run_host_binaries")
                .returns(TYPES![Type::Bool])
                .no_args()
                .build(),
            str_method("current_build_dir"),
            str_method("current_source_dir"),
            f("get_compiler")
                .returns(TYPES![obj("compiler")])
                .pos("language", TYPES![Type::Str])
                .kwarg("native", TYPES![Type::Bool])
                .build(),
            f("get_cross_property")
                .returns(TYPES![Type::Any])
                .pos("propname", TYPES![Type::Str])
                .opt_pos("fallback_value", TYPES![Type::Any])
                .build(),
            f("get_external_property")
                .returns(TYPES![Type::Any])
                .pos("propname", TYPES![Type::Str])
                .opt_pos("fallback_value", TYPES![Type::Any])
                .kwarg("native", TYPES![Type::Bool])
                .build(),
            str_method("global_build_root"),
            str_method("global_source_root"),
            f("has_exe_wrapper")
                .returns(TYPES![Type::Bool])
                .no_args()
                .build(),
            f("has_external_property")
                .returns(TYPES![Type::Bool])
                .pos("propname", TYPES![Type::Str])
                .kwarg("native", TYPES![Type::Bool])
                .build(),
            f("install_dependency_manifest").build(),
            f("is_cross_build").returns(TYPES![Type::Bool]).no_args().build(),
            f("is_subproject").returns(TYPES![Type::Bool]).no_args().build(),
            f("is_unity").returns(TYPES![Type::Bool]).no_args().build(),
            f("override_dependency").build(),
            f("override_find_program").build(),
            str_method("project_build_root"),
            f("project_license").returns(TYPES![str_list()]).no_args().build(),
            f("project_license_files")
                .returns(TYPES![Type::list(TYPES![obj("file")])])
                .no_args()
                .build(),
            str_method("project_name"),
            str_method("project_source_root"),
            str_method("project_version"),
            str_method("source_root"),
            str_method("version"),
        ],
    );

    ns.register_object(
        "build_machine",
        None,
        vec![
            str_method("cpu"),
            str_method("cpu_family"),
            str_method("endian"),
            str_method("system"),
        ],
    );
    ns.register_object("host_machine", Some("build_machine"), vec![]);
    ns.register_object("target_machine", Some("build_machine"), vec![]);
}

fn register_targets(ns: &mut TypeNamespace) {
    ns.register_object("tgt", None, vec![]);
    ns.register_object(
        "build_tgt",
        Some("tgt"),
        vec![
            f("extract_all_objects")
                .returns(TYPES![obj("extracted_obj")])
                .kwarg("recursive", TYPES![Type::Bool])
                .build(),
            f("extract_objects")
                .returns(TYPES![obj("extracted_obj")])
                .opt_varargs("source", TYPES![Type::Str, obj("file")])
                .build(),
            f("found").returns(TYPES![Type::Bool]).no_args().build(),
            f("full_path").returns(TYPES![Type::Str]).no_args().build(),
            f("name").returns(TYPES![Type::Str]).no_args().build(),
            f("path").returns(TYPES![Type::Str]).no_args().build(),
            f("private_dir_include")
                .returns(TYPES![obj("inc")])
                .no_args()
                .build(),
        ],
    );
    ns.register_object("exe", Some("build_tgt"), vec![]);
    ns.register_object("lib", Some("build_tgt"), vec![]);
    ns.register_object("jar", Some("build_tgt"), vec![]);
    ns.register_object(
        "both_libs",
        Some("lib"),
        vec![
            f("get_shared_lib").returns(TYPES![obj("lib")]).no_args().build(),
            f("get_static_lib").returns(TYPES![obj("lib")]).no_args().build(),
        ],
    );
    ns.register_object(
        "custom_tgt",
        Some("tgt"),
        vec![
            f("full_path").returns(TYPES![Type::Str]).no_args().build(),
            f("to_list")
                .returns(TYPES![Type::list(TYPES![obj("custom_idx")])])
                .no_args()
                .build(),
        ],
    );
    ns.register_object(
        "custom_idx",
        None,
        vec![f("full_path").returns(TYPES![Type::Str]).no_args().build()],
    );
    ns.register_object("run_tgt", Some("tgt"), vec![]);
    ns.register_object("alias_tgt", Some("tgt"), vec![]);
}

fn register_objects(ns: &mut TypeNamespace) {
    let bool_method = |name: &str| f(name).returns(TYPES![Type::Bool]).no_args().build();
    let str_method = |name: &str| f(name).returns(TYPES![Type::Str]).no_args().build();

    ns.register_object(
        "dep",
        None,
        vec![
            f("as_link_whole").returns(TYPES![obj("dep")]).no_args().build(),
            f("as_system")
                .returns(TYPES![obj("dep")])
                .opt_pos("value", TYPES![Type::Str])
                .build(),
            bool_method("found"),
            f("get_configtool_variable")
                .returns(TYPES![Type::Str])
                .pos("var_name", TYPES![Type::Str])
                .build(),
            f("get_pkgconfig_variable")
                .returns(TYPES![Type::Str])
                .pos("var_name", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("get_variable")
                .returns(TYPES![Type::Str])
                .opt_pos("varname", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            str_method("include_type"),
            str_method("name"),
            f("partial_dependency")
                .returns(TYPES![obj("dep")])
                .any_kwargs()
                .build(),
            str_method("type_name"),
            str_method("version"),
        ],
    );

    ns.register_object(
        "external_program",
        None,
        vec![
            bool_method("found"),
            str_method("full_path"),
            str_method("path"),
            str_method("version"),
        ],
    );

    ns.register_object(
        "feature",
        None,
        vec![
            bool_method("allowed"),
            bool_method("auto"),
            f("disable_auto_if")
                .returns(TYPES![obj("feature")])
                .pos("value", TYPES![Type::Bool])
                .build(),
            f("disable_if")
                .returns(TYPES![obj("feature")])
                .pos("value", TYPES![Type::Bool])
                .kwarg("error_message", TYPES![Type::Str])
                .build(),
            bool_method("disabled"),
            f("enable_auto_if")
                .returns(TYPES![obj("feature")])
                .pos("value", TYPES![Type::Bool])
                .build(),
            f("enable_if")
                .returns(TYPES![obj("feature")])
                .pos("value", TYPES![Type::Bool])
                .kwarg("error_message", TYPES![Type::Str])
                .build(),
            bool_method("enabled"),
            f("require")
                .returns(TYPES![obj("feature")])
                .pos("value", TYPES![Type::Bool])
                .kwarg("error_message", TYPES![Type::Str])
                .build(),
        ],
    );

    let env_edit = |name: &str| {
        f(name)
            .returns(TYPES![Type::Void])
            .pos("variable", TYPES![Type::Str])
            .varargs("value", TYPES![Type::Str])
            .kwarg("separator", TYPES![Type::Str])
            .build()
    };
    ns.register_object(
        "env",
        None,
        vec![
            env_edit("append"),
            env_edit("prepend"),
            env_edit("set"),
            f("unset")
                .returns(TYPES![Type::Void])
                .pos("variable", TYPES![Type::Str])
                .build(),
        ],
    );

    let cfg_set = |name: &str| {
        f(name)
            .returns(TYPES![Type::Void])
            .pos("varname", TYPES![Type::Str])
            .pos("value", TYPES![Type::Str, Type::Int, Type::Bool])
            .kwarg("description", TYPES![Type::Str])
            .build()
    };
    ns.register_object(
        "cfg_data",
        None,
        vec![
            f("get")
                .returns(TYPES![Type::Str, Type::Int, Type::Bool])
                .pos("varname", TYPES![Type::Str])
                .opt_pos("default_value", TYPES![Type::Str, Type::Int, Type::Bool])
                .build(),
            f("get_unquoted")
                .returns(TYPES![Type::Str, Type::Int, Type::Bool])
                .pos("varname", TYPES![Type::Str])
                .opt_pos("default_value", TYPES![Type::Str, Type::Int, Type::Bool])
                .build(),
            f("has")
                .returns(TYPES![Type::Bool])
                .pos("varname", TYPES![Type::Str])
                .build(),
            f("keys").returns(TYPES![str_list()]).no_args().build(),
            f("merge_from")
                .returns(TYPES![Type::Void])
                .pos("other", TYPES![obj("cfg_data")])
                .build(),
            cfg_set("set"),
            cfg_set("set10"),
            cfg_set("set_quoted"),
        ],
    );

    ns.register_object("file", None, vec![str_method("full_path")]);
    ns.register_object("inc", None, vec![]);
    ns.register_object(
        "generator",
        None,
        vec![f("process")
            .returns(TYPES![obj("generated_list")])
            .varargs("source", TYPES![Type::Str, obj("file")])
            .kwarg("env", TYPES![obj("env")])
            .kwarg("extra_args", TYPES![str_list()])
            .kwarg("preserve_path_from", TYPES![Type::Str])
            .build()],
    );
    ns.register_object("generated_list", None, vec![]);
    ns.register_object("extracted_obj", None, vec![]);
    ns.register_object("disabler", None, vec![bool_method("found")]);
    ns.register_object(
        "runresult",
        None,
        vec![
            bool_method("compiled"),
            f("returncode").returns(TYPES![Type::Int]).no_args().build(),
            str_method("stderr"),
            str_method("stdout"),
        ],
    );
    ns.register_object(
        "subproject",
        None,
        vec![
            bool_method("found"),
            f("get_variable")
                .returns(TYPES![Type::Any])
                .pos("var_name", TYPES![Type::Str])
                .opt_pos("fallback", TYPES![Type::Any])
                .build(),
        ],
    );
    ns.register_object("range", None, vec![]);
    ns.register_object("structured_src", None, vec![]);
    ns.register_object("module", None, vec![bool_method("found")]);
}

fn register_compiler(ns: &mut TypeNamespace) {
    // Compiler checks share one set of keyword arguments.
    let check = |name: &str, ret: Type| {
        f(name)
            .returns(TYPES![ret])
            .pos("code", TYPES![Type::Str, obj("file")])
            .kwarg("args", TYPES![str_list()])
            .kwarg("dependencies", TYPES![obj("dep"), Type::list(TYPES![obj("dep")])])
            .kwarg("include_directories", TYPES![obj("inc"), Type::list(TYPES![obj("inc")])])
            .kwarg("name", TYPES![Type::Str])
            .kwarg("no_builtin_args", TYPES![Type::Bool])
            .kwarg("prefix", TYPES![Type::Str, str_list()])
            .kwarg("required", TYPES![Type::Bool, obj("feature")])
            .build()
    };
    let multi = |name: &str, ret: Type| {
        f(name)
            .returns(TYPES![ret])
            .opt_varargs("arg", TYPES![Type::Str, str_list()])
            .kwarg("checked", TYPES![Type::Str])
            .build()
    };
    let simple = |name: &str, ret: Type| f(name).returns(TYPES![ret]).no_args().build();

    ns.register_object(
        "compiler",
        None,
        vec![
            check("alignment", Type::Int),
            check("check_header", Type::Bool),
            simple("cmd_array", str_list()),
            check("compiles", Type::Bool),
            check("compute_int", Type::Int),
            f("find_library")
                .returns(TYPES![obj("dep")])
                .pos("libname", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            multi("first_supported_argument", str_list()),
            multi("first_supported_link_argument", str_list()),
            simple("get_argument_syntax", Type::Str),
            check("get_define", Type::Str),
            simple("get_id", Type::Str),
            simple("get_linker_id", Type::Str),
            multi("get_supported_arguments", str_list()),
            multi("get_supported_function_attributes", str_list()),
            multi("get_supported_link_arguments", str_list()),
            multi("has_argument", Type::Bool),
            check("has_function", Type::Bool),
            f("has_function_attribute")
                .returns(TYPES![Type::Bool])
                .pos("name", TYPES![Type::Str])
                .kwarg("required", TYPES![Type::Bool, obj("feature")])
                .build(),
            check("has_header", Type::Bool),
            f("has_header_symbol")
                .returns(TYPES![Type::Bool])
                .pos("header", TYPES![Type::Str])
                .pos("symbol", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            multi("has_link_argument", Type::Bool),
            f("has_member")
                .returns(TYPES![Type::Bool])
                .pos("typename", TYPES![Type::Str])
                .pos("membername", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("has_members")
                .returns(TYPES![Type::Bool])
                .pos("typename", TYPES![Type::Str])
                .varargs("member", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            multi("has_multi_arguments", Type::Bool),
            multi("has_multi_link_arguments", Type::Bool),
            check("has_type", Type::Bool),
            check("links", Type::Bool),
            f("preprocess")
                .returns(TYPES![Type::list(TYPES![obj("custom_idx")])])
                .opt_varargs("source", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            check("run", obj("runresult")),
            check("sizeof", Type::Int),
            simple("symbols_have_underscore_prefix", Type::Bool),
            simple("version", Type::Str),
        ],
    );
}

fn register_functions(ns: &mut TypeNamespace) {
    let void = || TYPES![Type::Void];
    let sources = || TYPES![Type::Str, obj("file"), obj("custom_tgt"), obj("generated_list")];

    // Signature-less functions accept anything.
    for name in [
        "add_global_arguments",
        "add_global_link_arguments",
        "add_languages",
        "add_project_arguments",
        "add_project_dependencies",
        "add_project_link_arguments",
        "add_test_setup",
        "benchmark",
        "install_data",
        "install_emptydir",
        "install_headers",
        "install_man",
        "install_subdir",
        "install_symlink",
        "summary",
        "test",
    ] {
        ns.register_function(f(name).returns(void()).build());
    }

    for (name, ret) in [
        ("executable", "exe"),
        ("library", "lib"),
        ("shared_library", "lib"),
        ("static_library", "lib"),
        ("shared_module", "build_tgt"),
        ("both_libraries", "both_libs"),
        ("jar", "jar"),
    ] {
        ns.register_function(
            f(name)
                .returns(TYPES![obj(ret)])
                .pos("target_name", TYPES![Type::Str])
                .opt_varargs("source", sources())
                .any_kwargs()
                .build(),
        );
    }
    ns.register_function(
        f("build_target")
            .returns(TYPES![obj("build_tgt")])
            .pos("target_name", TYPES![Type::Str])
            .opt_varargs("source", sources())
            .any_kwargs()
            .build(),
    );

    for name in ["message", "warning", "debug", "error"] {
        ns.register_function(
            f(name)
                .returns(void())
                .varargs("text", TYPES![Type::Any])
                .build(),
        );
    }

    let functions = vec![
        f("alias_target")
            .returns(TYPES![obj("alias_tgt")])
            .pos("target_name", TYPES![Type::Str])
            .varargs("dep", TYPES![obj("tgt")])
            .build(),
        f("assert")
            .returns(void())
            .pos("condition", TYPES![Type::Bool])
            .opt_pos("message", TYPES![Type::Str])
            .build(),
        f("configuration_data")
            .returns(TYPES![obj("cfg_data")])
            .opt_pos("data", TYPES![Type::dict(TYPES![Type::Str, Type::Int, Type::Bool])])
            .build(),
        f("configure_file")
            .returns(TYPES![obj("file")])
            .any_kwargs()
            .build(),
        f("custom_target")
            .returns(TYPES![obj("custom_tgt")])
            .opt_pos("name", TYPES![Type::Str])
            .any_kwargs()
            .build(),
        f("declare_dependency")
            .returns(TYPES![obj("dep")])
            .any_kwargs()
            .build(),
        f("dependency")
            .returns(TYPES![obj("dep")])
            .opt_varargs("names", TYPES![Type::Str])
            .any_kwargs()
            .build(),
        f("disabler").returns(TYPES![obj("disabler")]).no_args().build(),
        f("environment")
            .returns(TYPES![obj("env")])
            .opt_pos("env", TYPES![Type::Str, str_list(), Type::dict(TYPES![Type::Str, str_list()])])
            .kwarg("method", TYPES![Type::Str])
            .kwarg("separator", TYPES![Type::Str])
            .build(),
        f("files")
            .returns(TYPES![Type::list(TYPES![obj("file")])])
            .opt_varargs("file", TYPES![Type::Str])
            .build(),
        f("find_program")
            .returns(TYPES![obj("external_program")])
            .varargs("program_name", TYPES![Type::Str, obj("file")])
            .any_kwargs()
            .build(),
        f("generator")
            .returns(TYPES![obj("generator")])
            .pos("exe", TYPES![obj("exe"), obj("external_program")])
            .any_kwargs()
            .build(),
        f("get_option")
            .returns(option_types())
            .pos("option_name", TYPES![Type::Str])
            .build(),
        f("get_variable")
            .returns(TYPES![Type::Any])
            .pos("variable_name", TYPES![Type::Str])
            .opt_pos("default", TYPES![Type::Any])
            .build(),
        f("import")
            .returns(TYPES![obj("module")])
            .pos("module_name", TYPES![Type::Str])
            .kwarg("disabler", TYPES![Type::Bool])
            .kwarg("required", TYPES![Type::Bool, obj("feature")])
            .build(),
        f("include_directories")
            .returns(TYPES![obj("inc")])
            .opt_varargs("includes", TYPES![Type::Str, obj("inc")])
            .kwarg("is_system", TYPES![Type::Bool])
            .build(),
        f("is_disabler")
            .returns(TYPES![Type::Bool])
            .pos("var", TYPES![Type::Any])
            .build(),
        f("is_variable")
            .returns(TYPES![Type::Bool])
            .pos("var", TYPES![Type::Str])
            .build(),
        f("join_paths")
            .returns(TYPES![Type::Str])
            .varargs("part", TYPES![Type::Str])
            .build(),
        f("project")
            .returns(void())
            .pos("project_name", TYPES![Type::Str])
            .opt_varargs("language", TYPES![Type::Str, str_list()])
            .kwarg("default_options", TYPES![str_list(), Type::dict(TYPES![Type::Str, Type::Int, Type::Bool])])
            .kwarg("license", TYPES![Type::Str, str_list()])
            .kwarg("license_files", TYPES![Type::Str, str_list()])
            .kwarg("meson_version", TYPES![Type::Str])
            .kwarg("subproject_dir", TYPES![Type::Str])
            .kwarg("version", TYPES![Type::Str, obj("file")])
            .build(),
        f("range")
            .returns(TYPES![obj("range")])
            .pos("start", TYPES![Type::Int])
            .opt_pos("stop", TYPES![Type::Int])
            .opt_pos("step", TYPES![Type::Int])
            .build(),
        f("run_command")
            .returns(TYPES![obj("runresult")])
            .opt_varargs("command", TYPES![Type::Str, obj("file"), obj("external_program")])
            .kwarg("capture", TYPES![Type::Bool])
            .kwarg("check", TYPES![Type::Bool])
            .kwarg("env", TYPES![obj("env"), str_list(), Type::dict(TYPES![Type::Str])])
            .build(),
        f("run_target")
            .returns(TYPES![obj("run_tgt")])
            .pos("target_name", TYPES![Type::Str])
            .any_kwargs()
            .build(),
        f("set_variable")
            .returns(void())
            .pos("variable_name", TYPES![Type::Str])
            .pos("value", TYPES![Type::Any])
            .build(),
        f("structured_sources")
            .returns(TYPES![obj("structured_src")])
            .pos("root", TYPES![Type::Any])
            .opt_pos("additional", TYPES![Type::dict(TYPES![Type::Any])])
            .build(),
        f("subdir")
            .returns(void())
            .pos("dir_name", TYPES![Type::Str])
            .kwarg("if_found", TYPES![obj("dep"), Type::list(TYPES![obj("dep")])])
            .build(),
        f("subdir_done").returns(void()).no_args().build(),
        f("subproject")
            .returns(TYPES![obj("subproject")])
            .pos("subproject_name", TYPES![Type::Str])
            .kwarg("default_options", TYPES![str_list(), Type::dict(TYPES![Type::Any])])
            .kwarg("required", TYPES![Type::Bool, obj("feature")])
            .kwarg("version", TYPES![Type::Str, str_list()])
            .build(),
        f("unset_variable")
            .returns(void())
            .pos("variable_name", TYPES![Type::Str])
            .build(),
        f("vcs_tag")
            .returns(TYPES![obj("custom_tgt")])
            .any_kwargs()
            .build(),
    ];
    for function in functions {
        ns.register_function(function);
    }
}
