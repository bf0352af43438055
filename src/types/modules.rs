//! Types returned by `import(...)`.
//!
//! Some modules hand out objects registered after them (`python`'s
//! installation, `cmake`'s subproject); those are referenced as lazy types.

use crate::TYPES;

use super::{
    function::{Function, FunctionBuilder},
    namespace::TypeNamespace,
    types::Type,
};

fn f(name: &str) -> FunctionBuilder {
    Function::builder(name)
}

fn obj(name: &str) -> Type {
    Type::object(name)
}

/// Object type for the module imported as `name`.
pub fn module_type_name(name: &str) -> Option<&'static str> {
    let ty = match name {
        "cmake" => "cmake_module",
        "fs" => "fs_module",
        "gnome" => "gnome_module",
        "i18n" => "i18n_module",
        "rust" | "unstable-rust" => "rust_module",
        "python" => "python_module",
        "python3" => "python3_module",
        "pkgconfig" => "pkgconfig_module",
        "keyval" | "unstable-keyval" => "keyval_module",
        "dlang" => "dlang_module",
        "unstable-external_project" => "external_project_module",
        "hotdoc" => "hotdoc_module",
        "java" => "java_module",
        "windows" => "windows_module",
        "cuda" | "unstable-cuda" => "cuda_module",
        "icestorm" | "unstable-icestorm" => "icestorm_module",
        "qt4" => "qt4_module",
        "qt5" => "qt5_module",
        "qt6" => "qt6_module",
        _ => return None,
    };
    Some(ty)
}

pub fn register_modules(ns: &mut TypeNamespace) {
    let str_list = || Type::list(TYPES![Type::Str]);
    let bool_path_query = |name: &str| {
        f(name)
            .returns(TYPES![Type::Bool])
            .pos("file", TYPES![Type::Str, obj("file")])
            .build()
    };
    let str_path_query = |name: &str| {
        f(name)
            .returns(TYPES![Type::Str])
            .pos("file", TYPES![Type::Str, obj("file")])
            .build()
    };

    ns.register_object(
        "fs_module",
        Some("module"),
        vec![
            bool_path_query("exists"),
            bool_path_query("is_dir"),
            bool_path_query("is_file"),
            bool_path_query("is_symlink"),
            bool_path_query("is_absolute"),
            f("hash")
                .returns(TYPES![Type::Str])
                .pos("file", TYPES![Type::Str, obj("file")])
                .pos("hash_algorithm", TYPES![Type::Str])
                .build(),
            f("size")
                .returns(TYPES![Type::Int])
                .pos("file", TYPES![Type::Str, obj("file")])
                .build(),
            f("is_samepath")
                .returns(TYPES![Type::Bool])
                .pos("path1", TYPES![Type::Str, obj("file")])
                .pos("path2", TYPES![Type::Str, obj("file")])
                .build(),
            str_path_query("expanduser"),
            str_path_query("as_posix"),
            f("replace_suffix")
                .returns(TYPES![Type::Str])
                .pos("file", TYPES![Type::Str, obj("file")])
                .pos("suffix", TYPES![Type::Str])
                .build(),
            str_path_query("parent"),
            str_path_query("name"),
            str_path_query("stem"),
            f("read")
                .returns(TYPES![Type::Str])
                .pos("file", TYPES![Type::Str, obj("file")])
                .kwarg("encoding", TYPES![Type::Str])
                .build(),
            f("copyfile")
                .returns(TYPES![obj("custom_tgt")])
                .pos("src", TYPES![Type::Str, obj("file")])
                .opt_pos("dst", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            str_path_query("relative_to"),
        ],
    );

    ns.register_object(
        "python_module",
        Some("module"),
        vec![f("find_installation")
            .returns(TYPES![Type::lazy("python_installation")])
            .opt_pos("name_or_path", TYPES![Type::Str])
            .any_kwargs()
            .build()],
    );
    ns.register_object(
        "python_installation",
        Some("external_program"),
        vec![
            f("extension_module")
                .returns(TYPES![obj("build_tgt")])
                .pos("module_name", TYPES![Type::Str])
                .opt_varargs("source", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("dependency").returns(TYPES![obj("dep")]).any_kwargs().build(),
            f("install_sources")
                .returns(TYPES![Type::Void])
                .varargs("file", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("get_install_dir").returns(TYPES![Type::Str]).any_kwargs().build(),
            f("language_version").returns(TYPES![Type::Str]).no_args().build(),
            f("get_path")
                .returns(TYPES![Type::Str])
                .pos("path_name", TYPES![Type::Str])
                .opt_pos("fallback", TYPES![Type::Any])
                .build(),
            f("has_path")
                .returns(TYPES![Type::Bool])
                .pos("path_name", TYPES![Type::Str])
                .build(),
            f("get_variable")
                .returns(TYPES![Type::Str])
                .pos("variable_name", TYPES![Type::Str])
                .opt_pos("fallback", TYPES![Type::Any])
                .build(),
            f("has_variable")
                .returns(TYPES![Type::Bool])
                .pos("variable_name", TYPES![Type::Str])
                .build(),
        ],
    );
    ns.register_object(
        "python3_module",
        Some("module"),
        vec![
            f("find_python")
                .returns(TYPES![obj("external_program")])
                .no_args()
                .build(),
            f("extension_module")
                .returns(TYPES![obj("build_tgt")])
                .pos("module_name", TYPES![Type::Str])
                .opt_varargs("source", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("language_version").returns(TYPES![Type::Str]).no_args().build(),
            f("sysconfig_path")
                .returns(TYPES![Type::Str])
                .pos("path_name", TYPES![Type::Str])
                .build(),
        ],
    );

    ns.register_object(
        "pkgconfig_module",
        Some("module"),
        vec![f("generate")
            .returns(TYPES![obj("external_program")])
            .opt_pos("libraries", TYPES![obj("lib")])
            .any_kwargs()
            .build()],
    );

    ns.register_object(
        "i18n_module",
        Some("module"),
        vec![
            f("gettext")
                .returns(TYPES![Type::list(TYPES![
                    Type::list(TYPES![obj("custom_tgt")]),
                    obj("run_tgt")
                ])])
                .pos("packagename", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("merge_file")
                .returns(TYPES![obj("custom_tgt")])
                .any_kwargs()
                .build(),
            f("itstool_join")
                .returns(TYPES![obj("custom_tgt")])
                .any_kwargs()
                .build(),
        ],
    );

    ns.register_object(
        "gnome_module",
        Some("module"),
        vec![
            f("compile_resources")
                .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                .pos("id", TYPES![Type::Str])
                .pos("input_file", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("compile_schemas")
                .returns(TYPES![obj("custom_tgt")])
                .any_kwargs()
                .build(),
            f("gdbus_codegen")
                .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                .pos("name", TYPES![Type::Str])
                .opt_pos("file", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("generate_gir")
                .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                .varargs("target", TYPES![obj("exe"), obj("lib")])
                .any_kwargs()
                .build(),
            f("genmarshal")
                .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                .pos("basename", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("mkenums")
                .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                .pos("name", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("mkenums_simple")
                .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                .pos("name", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("post_install").returns(TYPES![Type::Void]).any_kwargs().build(),
            f("yelp")
                .returns(TYPES![Type::Void])
                .pos("project_id", TYPES![Type::Str])
                .opt_varargs("source", TYPES![Type::Str])
                .any_kwargs()
                .build(),
        ],
    );

    ns.register_object(
        "cmake_module",
        Some("module"),
        vec![
            f("subproject")
                .returns(TYPES![Type::lazy("cmake_subproject")])
                .pos("subproject_name", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("subproject_options")
                .returns(TYPES![Type::lazy("cmake_subproject_options")])
                .no_args()
                .build(),
            f("write_basic_package_version_file")
                .returns(TYPES![Type::Void])
                .any_kwargs()
                .build(),
            f("configure_package_config_file")
                .returns(TYPES![Type::Void])
                .any_kwargs()
                .build(),
        ],
    );
    let by_target = |name: &str, ret: Type| {
        f(name)
            .returns(TYPES![ret])
            .pos("target", TYPES![Type::Str])
            .build()
    };
    ns.register_object(
        "cmake_subproject",
        None,
        vec![
            by_target("dependency", obj("dep")),
            by_target("include_directories", obj("inc")),
            by_target("target", obj("tgt")),
            by_target("target_type", Type::Str),
            f("target_list").returns(TYPES![str_list()]).no_args().build(),
            f("found").returns(TYPES![Type::Bool]).no_args().build(),
            f("get_variable")
                .returns(TYPES![Type::Any])
                .pos("var_name", TYPES![Type::Str])
                .opt_pos("fallback", TYPES![Type::Any])
                .build(),
        ],
    );
    ns.register_object(
        "cmake_subproject_options",
        None,
        vec![
            f("add_cmake_defines")
                .returns(TYPES![Type::Void])
                .varargs("defines", TYPES![Type::dict(TYPES![Type::Any])])
                .build(),
            f("set_override_option")
                .returns(TYPES![Type::Void])
                .pos("opt", TYPES![Type::Str])
                .pos("val", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("set_install")
                .returns(TYPES![Type::Void])
                .pos("install", TYPES![Type::Bool])
                .any_kwargs()
                .build(),
            f("append_compile_args")
                .returns(TYPES![Type::Void])
                .pos("language", TYPES![Type::Str])
                .varargs("arg", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("append_link_args")
                .returns(TYPES![Type::Void])
                .varargs("arg", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("clear").returns(TYPES![Type::Void]).no_args().build(),
        ],
    );

    ns.register_object(
        "keyval_module",
        Some("module"),
        vec![f("load")
            .returns(TYPES![Type::dict(TYPES![Type::Str])])
            .pos("file", TYPES![Type::Str, obj("file")])
            .build()],
    );

    ns.register_object(
        "rust_module",
        Some("module"),
        vec![
            f("test")
                .returns(TYPES![Type::Void])
                .pos("name", TYPES![Type::Str])
                .pos("tgt", TYPES![obj("build_tgt")])
                .any_kwargs()
                .build(),
            f("bindgen")
                .returns(TYPES![obj("custom_tgt")])
                .any_kwargs()
                .build(),
            f("proc_macro")
                .returns(TYPES![obj("build_tgt")])
                .pos("name", TYPES![Type::Str])
                .opt_varargs("source", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
        ],
    );

    ns.register_object(
        "windows_module",
        Some("module"),
        vec![f("compile_resources")
            .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
            .opt_varargs("file", TYPES![Type::Str, obj("file")])
            .any_kwargs()
            .build()],
    );

    ns.register_object(
        "java_module",
        Some("module"),
        vec![
            f("generate_native_header")
                .returns(TYPES![obj("custom_tgt")])
                .pos("file", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("generate_native_headers")
                .returns(TYPES![obj("custom_tgt")])
                .opt_varargs("file", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
            f("native_headers")
                .returns(TYPES![obj("custom_tgt")])
                .opt_varargs("file", TYPES![Type::Str, obj("file")])
                .any_kwargs()
                .build(),
        ],
    );

    ns.register_object(
        "dlang_module",
        Some("module"),
        vec![f("generate_dub_file")
            .returns(TYPES![Type::Void])
            .pos("name", TYPES![Type::Str])
            .pos("source", TYPES![Type::Str])
            .any_kwargs()
            .build()],
    );

    ns.register_object(
        "cuda_module",
        Some("module"),
        vec![
            f("min_driver_version")
                .returns(TYPES![Type::Str])
                .pos("version", TYPES![Type::Str])
                .build(),
            f("nvcc_arch_flags")
                .returns(TYPES![str_list()])
                .pos("compiler", TYPES![Type::Str, obj("compiler")])
                .opt_varargs("arch", TYPES![Type::Str])
                .any_kwargs()
                .build(),
            f("nvcc_arch_readable")
                .returns(TYPES![str_list()])
                .pos("compiler", TYPES![Type::Str, obj("compiler")])
                .opt_varargs("arch", TYPES![Type::Str])
                .any_kwargs()
                .build(),
        ],
    );

    ns.register_object(
        "hotdoc_module",
        Some("module"),
        vec![
            f("has_extensions")
                .returns(TYPES![Type::Bool])
                .varargs("extension", TYPES![Type::Str])
                .build(),
            f("generate_doc")
                .returns(TYPES![Type::lazy("hotdoc_target")])
                .pos("project_name", TYPES![Type::Str])
                .any_kwargs()
                .build(),
        ],
    );
    ns.register_object(
        "hotdoc_target",
        Some("custom_tgt"),
        vec![f("config_path").returns(TYPES![Type::Str]).no_args().build()],
    );

    ns.register_object(
        "icestorm_module",
        Some("module"),
        vec![f("project")
            .returns(TYPES![Type::list(TYPES![obj("run_tgt"), obj("custom_tgt")])])
            .pos("project_name", TYPES![Type::Str])
            .opt_varargs("file", TYPES![Type::Str, obj("file")])
            .any_kwargs()
            .build()],
    );

    ns.register_object(
        "external_project_module",
        Some("module"),
        vec![f("add_project")
            .returns(TYPES![Type::lazy("external_project")])
            .pos("script", TYPES![Type::Str])
            .any_kwargs()
            .build()],
    );
    ns.register_object(
        "external_project",
        None,
        vec![f("dependency")
            .returns(TYPES![obj("dep")])
            .pos("subdir", TYPES![Type::Str])
            .any_kwargs()
            .build()],
    );

    for qt in ["qt4_module", "qt5_module", "qt6_module"] {
        ns.register_object(
            qt,
            Some("module"),
            vec![
                f("compile_resources")
                    .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                    .any_kwargs()
                    .build(),
                f("compile_ui")
                    .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                    .any_kwargs()
                    .build(),
                f("compile_moc")
                    .returns(TYPES![Type::list(TYPES![obj("custom_tgt"), obj("generated_list")])])
                    .any_kwargs()
                    .build(),
                f("preprocess")
                    .returns(TYPES![Type::list(TYPES![obj("custom_tgt"), obj("generated_list")])])
                    .opt_varargs("source", TYPES![Type::Str, obj("file")])
                    .any_kwargs()
                    .build(),
                f("compile_translations")
                    .returns(TYPES![Type::list(TYPES![obj("custom_tgt")])])
                    .any_kwargs()
                    .build(),
                f("has_tools").returns(TYPES![Type::Bool]).any_kwargs().build(),
            ],
        );
    }
}
