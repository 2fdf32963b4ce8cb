use std::{cell::RefCell, io::Write, rc::Rc};

use adascript::Interpreter;
use walkdir::WalkDir;

/// A `Write` sink with shared storage, so a test can hand the interpreter
/// its output stream and still read what was printed.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn run(source: &str) -> Result<String, String> {
    let buffer = SharedBuffer::default();
    let mut interpreter =
        Interpreter::with_output(std::env::temp_dir(), Box::new(buffer.clone()));
    match interpreter.eval_source(source) {
        Ok(()) => Ok(buffer.contents()),
        Err(e) => Err(e.to_string()),
    }
}

fn assert_output(source: &str, expected: &str) {
    match run(source) {
        Ok(output) => assert_eq!(output, expected, "script:\n{source}"),
        Err(e) => panic!("Script failed: {e}\n{source}"),
    }
}

fn assert_success(source: &str) {
    if let Err(e) = run(source) {
        panic!("Script failed: {e}\n{source}");
    }
}

fn assert_failure(source: &str) -> String {
    match run(source) {
        Ok(_) => panic!("Script succeeded but was expected to fail:\n{source}"),
        Err(e) => e,
    }
}

#[test]
fn arithmetic_precedence() {
    assert_output("let x = 2 + 3 * 4; print(x);", "14\n");
    assert_output("print((2 + 3) * 4);", "20\n");
    assert_output("print(10 / 4);", "2.5\n");
    assert_output("print(7 % 4);", "3\n");
    assert_output("print(-3 + 5);", "2\n");
}

#[test]
fn recursive_functions() {
    assert_output("func f(n){ if(n<2) return n; return f(n-1)+f(n-2);} print(f(10));",
                  "55\n");
}

#[test]
fn classes_and_methods() {
    let source = r#"
        class C {
            func init(x){ this.x = x; }
            func get(){ return this.x; }
        }
        let c = new C(7);
        print(c.get());
    "#;
    assert_output(source, "7\n");
    // `new` is optional
    assert_output("class C { func init(x){ this.x = x; } } let c = C(9); print(c.x);",
                  "9\n");
}

#[test]
fn multi_let_unpacking() {
    assert_output("let xs = [1,2,3]; let a,b,c = xs; print(a+b+c);", "6\n");
    assert_output("let a, b; print(a); print(b);", "null\nnull\n");
    assert_output("let p = [4, 5]; let x = 0; x, y = p; print(x + y);", "9\n");
    assert_failure("let a, b = [1, 2, 3];");
    assert_failure("let a, b = 5;");
}

#[test]
fn dict_literals_and_updates() {
    assert_output(r#"let d = {"k": 1}; d["k"] = d["k"] + 1; print(d["k"]);"#, "2\n");
    assert_output(r#"let d = {"k": 1}; print(has(d, "k"), has(d, "x"));"#, "true false\n");
    assert_output(r#"let d = {"a": 1}; d.b = 2; print(d.b + d["a"]);"#, "3\n");
    assert_failure(r#"let d = {}; print(d["missing"]);"#);
}

#[test]
fn strings_concatenate_with_plus() {
    assert_output(r#"print("a" + "b");"#, "ab\n");
    assert_output(r#"print("n = " + 4);"#, "n = 4\n");
    assert_output(r#"print(1 + " and " + true);"#, "1 and true\n");
    assert_failure("let x = true + false;");
}

#[test]
fn display_forms() {
    assert_output("print(str(1.5), str(14), str(true), str(null));",
                  "1.5 14 true null\n");
    assert_output("print(str([1]));", "<list>\n");
    assert_output("print([1, 2, 3]);", "[1, 2, 3]\n");
    assert_output(r#"print(["a", 1]);"#, "[\"a\", 1]\n");
}

#[test]
fn casts() {
    assert_output(r#"print(int("42") + 1);"#, "43\n");
    assert_output("print(int(3.9), int(-3.9));", "3 -3\n");
    assert_output(r#"print(float("2.5") * 2);"#, "5\n");
    assert_output("print(int(true), int(false));", "1 0\n");
    assert_failure(r#"print(int("not a number"));"#);
}

#[test]
fn range_boundaries() {
    assert_output("print(len(range(0)));", "0\n");
    assert_output("print(range(5, 0, -1));", "[5, 4, 3, 2, 1]\n");
    assert_output("print(range(3));", "[0, 1, 2]\n");
    assert_output("print(range(2, 5));", "[2, 3, 4]\n");
    assert_failure("range(0, 10, 0);");
}

#[test]
fn len_covers_lists_dicts_strings() {
    assert_output(r#"print(len([1,2,3]), len({"a": 1}), len("abcd"));"#, "3 1 4\n");
    assert_failure("len(5);");
}

#[test]
fn scopes_and_shadowing() {
    assert_output("let x = 1; let x = 2; print(x);", "2\n");
    assert_output("let x = 1; { let x = 9; print(x); } print(x);", "9\n1\n");
    assert_output("let x = 1; { x = 5; } print(x);", "5\n");
    let message = assert_failure("undefined_name = 3;");
    assert!(message.contains("Undefined variable"), "got: {message}");
}

#[test]
fn undefined_reads_are_null() {
    assert_output("print(missing);", "null\n");
    assert_output("if (missing) print(1); else print(2);", "2\n");
}

#[test]
fn closures_see_later_updates() {
    let source = r#"
        let counter = 0;
        func bump(){ counter = counter + 1; return counter; }
        bump(); bump();
        print(bump());
    "#;
    assert_output(source, "3\n");
}

#[test]
fn methods_bind_this_per_invocation() {
    let source = r#"
        class Box {
            func init(v){ this.v = v; }
            func pair(other){ return this.v + other.get(); }
            func get(){ return this.v; }
        }
        let a = Box(1);
        let b = Box(2);
        print(a.pair(b));
        print(b.pair(a));
    "#;
    assert_output(source, "3\n3\n");
}

#[test]
fn struct_and_union_declarations() {
    let source = r#"
        struct Point { x; y; }
        let p = Point();
        p.x = 3; p.y = 4;
        print(p.x + p.y);
    "#;
    assert_output(source, "7\n");
    assert_output("union Shape { circle; square; } let s = Shape(); print(s);",
                  "<instance>\n");
    // without an init, construction takes no arguments
    assert_failure("struct Point { x; } let p = Point(1);");
}

#[test]
fn control_flow() {
    assert_output("let n = 0; while (n < 5) n = n + 1; print(n);", "5\n");
    assert_output("if (1 < 2) print(\"yes\"); else print(\"no\");", "yes\n");
    assert_output("let s = 0; for (x in range(5)) s = s + x; print(s);", "10\n");
    assert_output(r#"for (ch in "abc") print(ch);"#, "a\nb\nc\n");
}

#[test]
fn for_over_dict_yields_every_key_once() {
    let source = r#"
        let d = {"a": 1, "b": 2, "c": 3};
        let seen = 0;
        for (k in d) seen = seen + d[k];
        print(seen);
    "#;
    assert_output(source, "6\n");
}

#[test]
fn logical_operators_short_circuit() {
    assert_output("print(true && false, true || false);", "false true\n");
    // the right side must not run when the left decides the result
    assert_success("func boom(){ return 1 / 0; } let x = false && boom(); print(x);");
    assert_success("func boom(){ return 1 / 0; } let x = true || boom(); print(x);");
    assert_output("print(1 && 2);", "true\n");
}

#[test]
fn textual_operators_are_aliases() {
    assert_output("print(not false);", "true\n");
    assert_output("print(1 equals 1, 1 equals 2);", "true false\n");
    assert_output("print(true and true, false or true);", "true true\n");
}

#[test]
fn equality_is_kind_then_value() {
    assert_output(r#"print(1 == 1, "a" == "a", null == null);"#, "true true true\n");
    assert_output(r#"print(1 == "1", true == 1, null == false);"#, "false false false\n");
    assert_output("let xs = [1]; let ys = [1]; let zs = xs; print(xs == ys, xs == zs);",
                  "false true\n");
    assert_failure(r#"print(1 < "2");"#);
}

#[test]
fn division_and_modulo_by_zero_are_distinct() {
    let division = assert_failure("let x = 1 / 0;");
    assert!(division.contains("Division by zero"), "got: {division}");
    let modulo = assert_failure("let x = 1 % 0;");
    assert!(modulo.contains("Modulo by zero"), "got: {modulo}");
}

#[test]
fn list_reference_semantics() {
    let source = r#"
        let xs = [1, 2];
        let ys = xs;
        ys[0] = 9;
        print(xs[0]);
    "#;
    assert_output(source, "9\n");
    // scalars behave by value
    assert_output("let a = 1; let b = a; b = 2; print(a);", "1\n");
}

#[test]
fn list_index_assignment_appends_at_length() {
    assert_output("let xs = [1]; xs[1] = 2; print(len(xs), xs[1]);", "2 2\n");
    let message = assert_failure("let xs = [1]; xs[3] = 9;");
    assert!(message.contains("out of range"), "got: {message}");
    assert_failure("let xs = [1]; print(xs[5]);");
}

#[test]
fn nested_index_targets_persist() {
    let source = r#"
        let grid = [[1, 2], [3, 4]];
        grid[1][0] = 9;
        print(grid[1][0]);
    "#;
    assert_output(source, "9\n");
    let source = r#"
        class Holder { func init(){ this.items = [0]; } }
        let h = Holder();
        h.items[0] = 7;
        print(h.items[0]);
    "#;
    assert_output(source, "7\n");
}

#[test]
fn split_and_join() {
    assert_output(r#"print(join(split("a,b,c", ","), "-"));"#, "a-b-c\n");
    assert_output(r#"print(len(split("one two  three")));"#, "3\n");
    assert_output(r#"let parts = "x.y".split("."); print(parts[0], parts[1]);"#, "x y\n");
    assert_output(r#"print(len("a b c".split()));"#, "3\n");
    assert_failure(r#""abc".split(1);"#);
}

#[test]
fn map_applies_callables() {
    assert_output("func double(x){ return x * 2; } print(map(double, [1, 2, 3]));",
                  "[2, 4, 6]\n");
    assert_output("print(map(str, [1]));", "[\"1\"]\n");
    assert_failure("map(5, [1]);");
}

#[test]
fn math_builtins() {
    assert_output("print(abs(-4), abs(4));", "4 4\n");
    // bisection converges but may land an ulp off an exact root
    assert_output("print(abs(sqrt_bs(9) - 3) < 0.000001);", "true\n");
    assert_output("print(sqrt_bs(0));", "0\n");
    assert_failure("sqrt_bs(-1);");
}

#[test]
fn functions_without_return_yield_null() {
    assert_output("func f(){ let x = 1; } print(f());", "null\n");
    assert_output("func f(){ return; } print(f());", "null\n");
}

#[test]
fn arity_is_checked_before_binding() {
    let message = assert_failure("func f(a, b){ return a; } f(1);");
    assert!(message.contains("argument"), "got: {message}");
    assert_failure("func f(){ return 0; } f(1, 2);");
    assert_failure("len();");
}

#[test]
fn only_callables_can_be_called() {
    let message = assert_failure("let x = 3; x();");
    assert!(message.contains("call"), "got: {message}");
}

#[test]
fn invalid_assignment_targets_are_parse_errors() {
    let message = assert_failure("f() = 1;");
    assert!(message.contains("Invalid assignment target"), "got: {message}");
}

#[test]
fn lex_errors() {
    let message = assert_failure(r#"let s = "unterminated;"#);
    assert!(message.contains("Unterminated string"), "got: {message}");
    let message = assert_failure("let x = 1 & 2;");
    assert!(message.contains("Unexpected character"), "got: {message}");
    assert_failure("let y = 1 | 2;");
    assert_success("// just a comment\nlet x = 1; print(x); // trailing\n");
}

#[test]
fn state_persists_across_eval_calls() {
    let buffer = SharedBuffer::default();
    let mut interpreter =
        Interpreter::with_output(std::env::temp_dir(), Box::new(buffer.clone()));
    interpreter.eval_source("let x = 21;").unwrap();
    interpreter.eval_source("print(x * 2);").unwrap();
    assert_eq!(buffer.contents(), "42\n");
}

#[test]
fn import_is_idempotent() {
    let dir = std::env::temp_dir().join(format!("adascript_import_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("side_effect.ad"), "tally = tally + 1;\n").unwrap();
    std::fs::write(dir.join("main.ad"),
                   "let tally = 0;\nimport \"side_effect\";\nimport \"side_effect.ad\";\nprint(tally);\n").unwrap();

    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(&dir, Box::new(buffer.clone()));
    let source = std::fs::read_to_string(dir.join("main.ad")).unwrap();
    interpreter.eval_source(&source).unwrap();
    assert_eq!(buffer.contents(), "1\n");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn import_cycles_terminate() {
    let dir = std::env::temp_dir().join(format!("adascript_cycle_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a.ad"), "import \"b\";\nlet from_a = 1;\n").unwrap();
    std::fs::write(dir.join("b.ad"), "import \"a\";\nlet from_b = 2;\n").unwrap();

    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(&dir, Box::new(buffer.clone()));
    interpreter.eval_source("import \"a\";\nprint(from_a + from_b);\n").unwrap();
    assert_eq!(buffer.contents(), "3\n");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_imports_fail() {
    let message = assert_failure("import \"does_not_exist_anywhere\";");
    assert!(message.contains("Import failed"), "got: {message}");
}

#[test]
fn script_fixtures_run_cleanly() {
    let mut count = 0;

    for entry in WalkDir::new("tests/scripts").into_iter()
                                              .filter_map(Result::ok)
                                              .filter(|e| {
                                                  e.path()
                                                   .extension()
                                                   .is_some_and(|ext| ext == "ad")
                                              })
    {
        count += 1;
        let path = entry.path();
        let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
                         panic!("Failed to read {path:?}: {e}")
                     });

        let buffer = SharedBuffer::default();
        let parent = path.parent().expect("script has a parent directory");
        let mut interpreter = Interpreter::with_output(parent, Box::new(buffer.clone()));
        if let Err(e) = interpreter.eval_source(&source) {
            panic!("Script {path:?} failed: {e}\n--- output so far ---\n{}",
                   buffer.contents());
        }
    }

    assert!(count > 0, "No .ad fixtures found under tests/scripts");
}
