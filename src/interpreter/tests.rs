use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use indoc::indoc;

use crate::{
    analyzer::{
        analyze_ast,
        cancel::CancellationToken,
        diagnostics::Severity,
        options::{MesonOption, OptionKind, OptionValue, Options},
    },
    ast::{ast::Ast, parse_ast},
    errors::errors::{Error, ErrorImpl},
    types::namespace::namespace,
    Location,
};

use super::{
    builtins::version_compare,
    expr::join_path,
    interpret_file,
    process::{ProcessRunner, SystemProcessRunner},
    value::{types_of, RangeValue, RunResult, Value},
    InterpretResult,
};

/// Records every command and answers with a canned result.
struct FakeRunner {
    calls: RefCell<Vec<(Vec<String>, PathBuf, Vec<(String, String)>, bool)>>,
    response: Result<RunResult, Error>,
}

impl FakeRunner {
    fn returning(returncode: i64, stdout: &str, stderr: &str) -> Self {
        FakeRunner {
            calls: RefCell::new(vec![]),
            response: Ok(RunResult {
                returncode,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }),
        }
    }

    fn failing_to_spawn() -> Self {
        FakeRunner {
            calls: RefCell::new(vec![]),
            response: Err(Error::new(
                ErrorImpl::SpawnFailed {
                    command: "missing-tool".to_string(),
                    message: "No such file or directory".to_string(),
                },
                Location::null(),
            )),
        }
    }
}

impl ProcessRunner for FakeRunner {
    fn run(
        &self,
        argv: &[String],
        cwd: &Path,
        env: &[(String, String)],
        capture: bool,
        _cancel: &CancellationToken,
    ) -> Result<RunResult, Error> {
        self.calls
            .borrow_mut()
            .push((argv.to_vec(), cwd.to_path_buf(), env.to_vec(), capture));
        self.response.clone()
    }
}

fn parse(source: &str) -> Ast {
    parse_ast(PathBuf::from("/project/meson.build"), source)
}

fn run_with(source: &str, options: &Options, runner: &dyn ProcessRunner) -> InterpretResult {
    interpret_file(&parse(source), options, runner, &CancellationToken::new())
}

fn run(source: &str) -> InterpretResult {
    run_with(source, &Options::new(), &FakeRunner::returning(0, "", ""))
}

fn value(result: &InterpretResult, name: &str) -> Value {
    result
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("`{}` not in scope", name))
}

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|v| Value::Int(*v)).collect())
}

fn strs(values: &[&str]) -> Value {
    Value::list(values.iter().map(|v| Value::str(*v)).collect())
}

#[test]
fn test_arithmetic_and_strings() {
    let result = run(indoc! {"
        a = 1 + 2 * 3
        b = 7 % 4
        c = 'foo' + 'bar'
        d = 'include' / 'sub'
        e = 'include' / '/abs'
        f = -a
        g = 10 / 3
    "});

    assert_eq!(value(&result, "a"), Value::Int(7));
    assert_eq!(value(&result, "b"), Value::Int(3));
    assert_eq!(value(&result, "c"), Value::str("foobar"));
    assert_eq!(value(&result, "d"), Value::str("include/sub"));
    assert_eq!(value(&result, "e"), Value::str("/abs"));
    assert_eq!(value(&result, "f"), Value::Int(-7));
    assert_eq!(value(&result, "g"), Value::Int(3));
    assert!(result.diagnostics.is_empty());
    assert!(!result.aborted);
}

#[test]
fn test_invalid_operations_are_error_values() {
    let result = run(indoc! {"
        a = 1 / 0
        b = 1 + 'x'
        c = b + 1
        d = [1][5]
        e = {'k': 1}['nope']
        after = true
    "});

    assert_eq!(value(&result, "a"), Value::error("Division by zero"));
    assert!(value(&result, "b").is_error());
    assert_eq!(value(&result, "c"), value(&result, "b"));
    assert!(value(&result, "d").is_error());
    assert!(value(&result, "e").is_error());
    assert_eq!(value(&result, "after"), Value::Bool(true));

    assert!(!result.aborted);
    assert_eq!(result.diagnostics.len(), 5);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.severity == Severity::Warning));
    assert_eq!(result.diagnostics[0].message, "Division by zero");
}

#[test]
fn test_comparisons_and_membership() {
    let result = run(indoc! {"
        a = 1 < 2
        b = 'abc' >= 'abd'
        c = [1, 'x'] == [1, 'x']
        d = {'a': 1, 'b': 2} == {'b': 2, 'a': 1}
        e = 2 in [1, 2]
        f = 'k' not in {'k': 1}
        g = 'ell' in 'hello'
        h = 1 == 'one'
    "});

    assert_eq!(value(&result, "a"), Value::Bool(true));
    assert_eq!(value(&result, "b"), Value::Bool(false));
    assert_eq!(value(&result, "c"), Value::Bool(true));
    assert_eq!(value(&result, "d"), Value::Bool(true));
    assert_eq!(value(&result, "e"), Value::Bool(true));
    assert_eq!(value(&result, "f"), Value::Bool(false));
    assert_eq!(value(&result, "g"), Value::Bool(true));
    assert_eq!(value(&result, "h"), Value::Bool(false));
}

#[test]
fn test_logical_operators_short_circuit() {
    let result = run(indoc! {"
        a = false and undefined_call()
        b = true or undefined_call()
        c = true and not false
        d = true ? 'yes' : undefined_call()
    "});

    assert_eq!(value(&result, "a"), Value::Bool(false));
    assert_eq!(value(&result, "b"), Value::Bool(true));
    assert_eq!(value(&result, "c"), Value::Bool(true));
    assert_eq!(value(&result, "d"), Value::str("yes"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_assignment_does_not_alias_containers() {
    let result = run(indoc! {"
        a = [1]
        b = a
        b += [2]
        d = {'k': 1}
        e = d
        e += {'k': 2, 'j': 3}
        l = [1, 2]
        m = l
        m[0] = 9
        n = {'x': [1]}
        o = n
        o['x'] += 2
    "});

    assert_eq!(value(&result, "a"), ints(&[1]));
    assert_eq!(value(&result, "b"), ints(&[1, 2]));
    assert_eq!(value(&result, "l"), ints(&[1, 2]));
    assert_eq!(value(&result, "m"), ints(&[9, 2]));

    let Value::Dict(d) = value(&result, "d") else {
        panic!("d is not a dict");
    };
    assert_eq!(d.get("k"), Some(&Value::Int(1)));
    assert_eq!(d.len(), 1);

    let Value::Dict(e) = value(&result, "e") else {
        panic!("e is not a dict");
    };
    assert_eq!(e.get("k"), Some(&Value::Int(2)));
    assert_eq!(e.get("j"), Some(&Value::Int(3)));

    let Value::Dict(n) = value(&result, "n") else {
        panic!("n is not a dict");
    };
    assert_eq!(n.get("x"), Some(&ints(&[1])));
    let Value::Dict(o) = value(&result, "o") else {
        panic!("o is not a dict");
    };
    assert_eq!(o.get("x"), Some(&ints(&[1, 2])));
}

#[test]
fn test_compound_assignment() {
    let result = run(indoc! {"
        s = 'a'
        s += 'b'
        i = 5
        i -= 2
        i *= 4
        l = ['x']
        l += 'y'
        l += ['z', 1]
        neg = [1, 2, 3]
        neg[-1] = 0
    "});

    assert_eq!(value(&result, "s"), Value::str("ab"));
    assert_eq!(value(&result, "i"), Value::Int(12));
    assert_eq!(
        value(&result, "l"),
        Value::list(vec![
            Value::str("x"),
            Value::str("y"),
            Value::str("z"),
            Value::Int(1)
        ])
    );
    assert_eq!(value(&result, "neg"), ints(&[1, 2, 0]));
}

#[test]
fn test_compound_assignment_matches_static_types() {
    let sources = [
        "x = [1]\nx += 'a'\n",
        "x = [1]\nx += ['a', true]\n",
        "x = {'a': 1}\nx += {'b': 'c'}\n",
        "x = 'a'\nx += 'b'\n",
        "x = 1\nx += 2\n",
        "x = []\nx += [[1]]\n",
    ];

    for source in sources {
        let ast = parse(source);
        let runtime = interpret_file(
            &ast,
            &Options::new(),
            &FakeRunner::returning(0, "", ""),
            &CancellationToken::new(),
        );
        let analysis = analyze_ast(&ast, namespace(), &Options::new());

        let concrete = types_of([&value(&runtime, "x")]);
        let inferred = analysis.scope.get("x").cloned().unwrap_or_default();
        assert!(
            concrete.is_subset(&inferred),
            "{:?}: runtime {} not within inferred {}",
            source,
            concrete,
            inferred
        );
    }
}

#[test]
fn test_loop_binding_and_break() {
    let result = run(indoc! {"
        seen = []
        foreach i : [1, 2, 3]
          seen += i
          if i == 2
            break
          endif
        endforeach
    "});

    assert_eq!(value(&result, "seen"), ints(&[1, 2]));
    assert_eq!(value(&result, "i"), Value::Int(2));
}

#[test]
fn test_continue_skips_rest_of_body() {
    let result = run(indoc! {"
        odd = []
        foreach i : range(6)
          if i.is_even()
            continue
          endif
          odd += i
        endforeach
    "});

    assert_eq!(value(&result, "odd"), ints(&[1, 3, 5]));
}

#[test]
fn test_break_only_leaves_innermost_loop() {
    let result = run(indoc! {"
        pairs = []
        foreach a : [1, 2]
          foreach b : [10, 20, 30]
            if b == 20
              break
            endif
            pairs += a + b
          endforeach
        endforeach
    "});

    assert_eq!(value(&result, "pairs"), ints(&[11, 12]));
}

#[test]
fn test_loop_variable_is_a_copy() {
    let result = run(indoc! {"
        items = [[1], [2]]
        foreach item : items
          item += 5
        endforeach
    "});

    assert_eq!(
        value(&result, "items"),
        Value::list(vec![ints(&[1]), ints(&[2])])
    );
    assert_eq!(value(&result, "item"), ints(&[2, 5]));
}

#[test]
fn test_dict_iteration() {
    let result = run(indoc! {"
        keys = []
        total = 0
        foreach k, v : {'a': 1, 'b': 2}
          keys += k
          total += v
        endforeach
        foreach x : {'a': 1}
        endforeach
    "});

    assert_eq!(value(&result, "keys"), strs(&["a", "b"]));
    assert_eq!(value(&result, "total"), Value::Int(3));
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.diagnostics[0].message.contains("two identifiers"));
}

#[test]
fn test_selection_runs_one_branch() {
    let result = run(indoc! {"
        if false
          assert(false, 'never')
        elif 1 == 1
          x = 'elif'
        elif true
          x = 'second'
        else
          x = 'else'
        endif
        if false
          y = 1
        endif
    "});

    assert_eq!(value(&result, "x"), Value::str("elif"));
    assert!(result.get("y").is_none());
    assert!(!result.aborted);
}

#[test]
fn test_assert_aborts_file() {
    let result = run(indoc! {"
        x = 1
        assert(1 == 2, 'boom')
        y = 2
    "});

    assert!(result.aborted);
    assert_eq!(value(&result, "x"), Value::Int(1));
    assert!(result.get("y").is_none());

    let fatal = result
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Error)
        .expect("fatal diagnostic");
    assert!(fatal.message.contains("boom"));
    assert_eq!(fatal.location.start_line, 1);
}

#[test]
fn test_error_function_aborts_inside_loop() {
    let result = run(indoc! {"
        foreach i : [1, 2]
          error('stop at', i)
        endforeach
        after = 1
    "});

    assert!(result.aborted);
    assert!(result.get("after").is_none());
    assert_eq!(result.diagnostics.last().map(|d| d.message.as_str()), Some("stop at 1"));
}

#[test]
fn test_run_command_result() {
    let runner = FakeRunner::returning(0, "1.2.3\n", "");
    let result = run_with(
        indoc! {"
            r = run_command('git', ['describe', '--tags'], env: {'LANG': 'C'}, capture: true)
            out = r.stdout().strip()
            code = r.returncode()
        "},
        &Options::new(),
        &runner,
    );

    assert_eq!(value(&result, "out"), Value::str("1.2.3"));
    assert_eq!(value(&result, "code"), Value::Int(0));

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (argv, cwd, env, capture) = &calls[0];
    assert_eq!(argv, &["git", "describe", "--tags"]);
    assert_eq!(cwd, Path::new("/project"));
    assert_eq!(env, &[("LANG".to_string(), "C".to_string())]);
    assert!(*capture);
}

#[test]
fn test_run_command_check() {
    let runner = FakeRunner::returning(2, "", "bad things\n");
    let tolerated = run_with(
        "r = run_command('false', check: false, capture: false)\ncode = r.returncode()\n",
        &Options::new(),
        &runner,
    );
    assert!(!tolerated.aborted);
    assert_eq!(value(&tolerated, "code"), Value::Int(2));
    assert!(!runner.calls.borrow()[0].3);

    let checked = run_with(
        "r = run_command('false')\nafter = 1\n",
        &Options::new(),
        &runner,
    );
    assert!(checked.aborted);
    assert!(checked.get("after").is_none());
    let message = &checked.diagnostics.last().map(|d| d.message.clone());
    assert!(message.as_deref().is_some_and(|m| m.contains("bad things")));
}

#[test]
fn test_spawn_failure_is_not_fatal() {
    let runner = FakeRunner::failing_to_spawn();
    let result = run_with(
        "r = run_command('missing-tool')\nafter = 1\n",
        &Options::new(),
        &runner,
    );

    assert!(!result.aborted);
    assert_eq!(value(&result, "after"), Value::Int(1));
    assert!(value(&result, "r").is_error());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error && d.message.contains("missing-tool")));
}

#[test]
fn test_cancelled_loop_aborts() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = interpret_file(
        &parse("x = 1\nforeach i : [1]\n  y = i\nendforeach\n"),
        &Options::new(),
        &FakeRunner::returning(0, "", ""),
        &cancel,
    );

    assert!(result.aborted);
    assert_eq!(value(&result, "x"), Value::Int(1));
    assert!(result.get("y").is_none());
}

#[test]
fn test_string_methods() {
    let result = run(indoc! {"
        parts = 'a,b,,c'.split(',')
        words = '  two words '.split()
        joined = '-'.join(['x', 'y'])
        fmt = '@0@ is @1@'.format('answer', 42)
        stripped = '--name--'.strip('-')
        sub = 'abcdef'.substring(1, -1)
        num = ' 12 '.to_int()
        bad = 'twelve'.to_int()
        under = 'foo-bar.baz'.underscorify()
        upper = 'abc'.to_upper()
        newer = '1.10.0'.version_compare('>1.9')
        starts = 'libfoo'.startswith('lib')
        missing = 'abc'.nope()
    "});

    assert_eq!(value(&result, "parts"), strs(&["a", "b", "", "c"]));
    assert_eq!(value(&result, "words"), strs(&["two", "words"]));
    assert_eq!(value(&result, "joined"), Value::str("x-y"));
    assert_eq!(value(&result, "fmt"), Value::str("answer is 42"));
    assert_eq!(value(&result, "stripped"), Value::str("name"));
    assert_eq!(value(&result, "sub"), Value::str("bcde"));
    assert_eq!(value(&result, "num"), Value::Int(12));
    assert!(value(&result, "bad").is_error());
    assert_eq!(value(&result, "under"), Value::str("foo_bar_baz"));
    assert_eq!(value(&result, "upper"), Value::str("ABC"));
    assert_eq!(value(&result, "newer"), Value::Bool(true));
    assert_eq!(value(&result, "starts"), Value::Bool(true));
    assert!(value(&result, "missing").is_error());
}

#[test]
fn test_format_substitutes_in_one_pass() {
    let result = run(indoc! {"
        swapped = '@0@-@1@'.format('@1@', 'b')
        kept = '@0@ @3@ @x@'.format('a')
        repeated = '@0@@0@'.format(7)
    "});

    assert_eq!(value(&result, "swapped"), Value::str("@1@-b"));
    assert_eq!(value(&result, "kept"), Value::str("a @3@ @x@"));
    assert_eq!(value(&result, "repeated"), Value::str("77"));
}

#[test]
fn test_huge_ranges_are_lazy() {
    let result = run(indoc! {"
        big = range(1000000000000)
        last = big[-1]
        first = []
        foreach i : range(0, 9223372036854775807, 2)
          if i > 4
            break
          endif
          first += i
        endforeach
        empty = []
        foreach i : range(5, 1)
          empty += i
        endforeach
    "});

    assert!(!result.aborted, "{:?}", result.diagnostics);
    assert_eq!(
        value(&result, "big"),
        Value::Range(RangeValue {
            start: 0,
            stop: 1_000_000_000_000,
            step: 1,
        })
    );
    assert_eq!(value(&result, "last"), Value::Int(999_999_999_999));
    assert_eq!(value(&result, "first"), ints(&[0, 2, 4]));
    assert_eq!(value(&result, "empty"), ints(&[]));
}

#[test]
fn test_cancellation_stops_endless_range() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = interpret_file(
        &parse("foreach i : range(9223372036854775807)
  x = i
endforeach
"),
        &Options::new(),
        &FakeRunner::returning(0, "", ""),
        &cancel,
    );

    assert!(result.aborted);
    assert!(result.get("x").is_none());
}

#[test]
fn test_range_value_bounds() {
    let range = RangeValue {
        start: -3,
        stop: 4,
        step: 3,
    };
    assert_eq!(range.len(), 3);
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![-3, 0, 3]);
    assert_eq!(range.get(2), Some(3));
    assert_eq!(range.get(3), None);

    let widest = RangeValue {
        start: i64::MIN,
        stop: i64::MAX,
        step: i64::MAX,
    };
    assert_eq!(widest.len(), 3);
    assert_eq!(widest.iter().count(), 3);
    assert!(RangeValue { start: 2, stop: 2, step: 1 }.is_empty());
}

#[test]
fn test_container_and_primitive_methods() {
    let result = run(indoc! {"
        l = [1, 2, 3]
        len = l.length()
        last = l.get(-1)
        fallback = l.get(10, 'none')
        has = l.contains(2)
        d = {'b': 1, 'a': 2}
        keys = d.keys()
        hk = d.has_key('a')
        dg = d.get('zz', 0)
        n = 4
        even = n.is_even()
        istr = n.to_string()
        yes = true
        bint = yes.to_int()
        bstr = (not yes).to_string('yes', 'no')
    "});

    assert_eq!(value(&result, "len"), Value::Int(3));
    assert_eq!(value(&result, "last"), Value::Int(3));
    assert_eq!(value(&result, "fallback"), Value::str("none"));
    assert_eq!(value(&result, "has"), Value::Bool(true));
    assert_eq!(value(&result, "keys"), strs(&["a", "b"]));
    assert_eq!(value(&result, "hk"), Value::Bool(true));
    assert_eq!(value(&result, "dg"), Value::Int(0));
    assert_eq!(value(&result, "even"), Value::Bool(true));
    assert_eq!(value(&result, "istr"), Value::str("4"));
    assert_eq!(value(&result, "bint"), Value::Int(1));
    assert_eq!(value(&result, "bstr"), Value::str("no"));
}

#[test]
fn test_variable_builtins_and_options() {
    let mut options = Options::new();
    options.insert(MesonOption {
        name: "with_docs".to_string(),
        kind: OptionKind::Boolean,
        description: None,
        choices: vec![],
        deprecated: false,
        value: Some(OptionValue::Bool(false)),
    });
    options.insert(MesonOption {
        name: "backend".to_string(),
        kind: OptionKind::Combo,
        description: None,
        choices: vec!["ninja".to_string(), "make".to_string()],
        deprecated: false,
        value: None,
    });

    let result = run_with(
        indoc! {"
            set_variable('dyn', 5)
            got = get_variable('dyn')
            defaulted = get_variable('absent', 'dflt')
            known = is_variable('dyn')
            unset_variable('dyn')
            gone = is_variable('dyn')
            docs = get_option('with_docs')
            backend = get_option('backend')
            nope = get_option('nope')
            paths = join_paths('a', 'b', 'c')
            srcs = files('a.c', ['b.c'])
        "},
        &options,
        &FakeRunner::returning(0, "", ""),
    );

    assert_eq!(value(&result, "got"), Value::Int(5));
    assert_eq!(value(&result, "defaulted"), Value::str("dflt"));
    assert_eq!(value(&result, "known"), Value::Bool(true));
    assert_eq!(value(&result, "gone"), Value::Bool(false));
    assert!(result.get("dyn").is_none());
    assert_eq!(value(&result, "docs"), Value::Bool(false));
    assert_eq!(value(&result, "backend"), Value::str("ninja"));
    assert!(value(&result, "nope").is_error());
    assert_eq!(value(&result, "paths"), Value::str("a/b/c"));
    assert_eq!(value(&result, "srcs"), strs(&["a.c", "b.c"]));
}

#[test]
fn test_opaque_objects_and_disablers() {
    let result = run(indoc! {"
        dep = declare_dependency()
        cc = meson.get_compiler('c')
        d = disabler()
        disabled = files(d)
        is_off = is_disabler(disabled)
        found = d.found()
        unknown = not_a_function()
    "});

    assert_eq!(value(&result, "dep"), Value::Object("dep".to_string()));
    assert_eq!(value(&result, "cc"), Value::Object("compiler".to_string()));
    assert_eq!(value(&result, "disabled"), Value::Disabler);
    assert_eq!(value(&result, "is_off"), Value::Bool(true));
    assert_eq!(value(&result, "found"), Value::Bool(false));
    assert_eq!(
        value(&result, "unknown"),
        Value::error("Unknown function `not_a_function`")
    );
}

#[test]
fn test_format_strings() {
    let result = run(indoc! {"
        name = 'world'
        count = 3
        greeting = f'hello @name@ x@count@'
        broken = f'@missing@'
    "});

    assert_eq!(value(&result, "greeting"), Value::str("hello world x3"));
    assert!(value(&result, "broken").is_error());
}

#[test]
fn test_value_types() {
    let mut entries = IndexMap::new();
    entries.insert("a".to_string(), Value::Int(1));
    let dict = Value::dict(entries);

    assert_eq!(dict.type_name(), "dict(int)");
    assert_eq!(
        Value::list(vec![Value::Int(1), Value::str("s")]).type_name(),
        "list(int|str)"
    );
    assert_eq!(
        Value::RunResult(Default::default()).type_name(),
        "runresult"
    );
    assert_eq!(Value::str("x").to_display_string(), "x");
    assert_eq!(strs(&["x"]).to_string(), "['x']");
}

#[test]
fn test_helpers() {
    assert_eq!(join_path("", "b"), "b");
    assert_eq!(join_path("a/", "b"), "a/b");
    assert!(version_compare("1.2.0", ">=1.2"));
    assert!(version_compare("1.2", "1.2"));
    assert!(!version_compare("0.9", ">=0.10"));
    assert!(version_compare("2.0", "!=1.0"));
    assert!(version_compare("1.0.0-rc1", "<1.0.1"));
}

#[cfg(unix)]
#[test]
fn test_system_runner_captures_output() {
    let runner = SystemProcessRunner::default();
    let argv = ["sh", "-c", "echo out; echo err >&2; exit 3"].map(String::from);
    let result = runner
        .run(&argv, Path::new("/"), &[], true, &CancellationToken::new())
        .expect("sh runs");

    assert_eq!(result.returncode, 3);
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
}

#[cfg(unix)]
#[test]
fn test_system_runner_env_and_no_capture() {
    let runner = SystemProcessRunner::default();
    let argv = ["sh", "-c", "test \"$GREETING\" = hi"].map(String::from);
    let env = [("GREETING".to_string(), "hi".to_string())];
    let result = runner
        .run(&argv, Path::new("/"), &env, false, &CancellationToken::new())
        .expect("sh runs");

    assert_eq!(result.returncode, 0);
    assert!(result.stdout.is_empty());
}

#[test]
fn test_system_runner_spawn_failure() {
    let runner = SystemProcessRunner::default();
    let argv = ["definitely-not-a-real-program-4711".to_string()];
    let error = runner
        .run(&argv, Path::new("."), &[], true, &CancellationToken::new())
        .expect_err("spawn fails");

    assert_eq!(error.get_error_name(), "SpawnFailed");
}

#[cfg(unix)]
#[test]
fn test_system_runner_kills_on_cancel() {
    let runner = SystemProcessRunner::default();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(50));
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let argv = ["sleep", "30"].map(String::from);
    let error = runner
        .run(&argv, Path::new("/"), &[], true, &cancel)
        .expect_err("cancelled");
    canceller.join().expect("canceller thread");

    assert_eq!(error.get_error_name(), "Cancelled");
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}
