// Integration tests for the Arson interpreter
//
// These tests verify the interpreter's behavior by running complete Arson programs
// and checking the results. Tests cover:
// - Variable binding and rebinding
// - Control flow (if/elif/else, while, for ... through, return)
// - Functions, lambdas and closures
// - Data structures (arrays, dicts) and chained access
// - Runtime errors
// - Built-in functions

use arson::builtins::BUILTIN_NAMES;
use arson::config::KeywordTable;
use arson::errors::{ArsonError, ErrorKind};
use arson::interpreter::{Interpreter, Value, MAX_CALL_DEPTH};
use arson::lexer::{tokenize, tokenize_with};
use arson::parser::Parser;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

struct Run {
    interp: Interpreter,
    output: String,
    result: Result<(), ArsonError>,
}

fn execute(code: &str, keywords: &KeywordTable, input: &str) -> Run {
    let tokens = tokenize_with(code, keywords).expect("lexing should succeed");
    let program = Parser::new(tokens).parse().expect("parsing should succeed");
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.set_input(Cursor::new(input.as_bytes().to_vec()));
    let result = interp.run(&program);
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    Run { interp, output, result }
}

fn run_code(code: &str) -> Interpreter {
    let run = execute(code, &KeywordTable::default(), "");
    if let Err(err) = run.result {
        panic!("program failed: {:?}", err);
    }
    run.interp
}

fn output_of(code: &str) -> String {
    let run = execute(code, &KeywordTable::default(), "");
    if let Err(err) = run.result {
        panic!("program failed: {:?}", err);
    }
    run.output
}

fn error_of(code: &str) -> ArsonError {
    match execute(code, &KeywordTable::default(), "").result {
        Ok(()) => panic!("expected a runtime error"),
        Err(err) => err,
    }
}

fn number(interp: &Interpreter, name: &str) -> f64 {
    match interp.env.get(name) {
        Some(Value::Number(n)) => n,
        other => panic!("Expected {} to be a number, got {:?}", name, other),
    }
}

#[test]
fn test_builtin_names_are_complete_and_unique() {
    let names = BUILTIN_NAMES;
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len());
    for required in ["fire", "load", "random", "int", "float", "str", "bool"] {
        assert!(unique.contains(required), "missing builtin {}", required);
    }
}

#[test]
fn test_variable_declaration_with_arithmetic() {
    let interp = run_code("burn x = 3 + 4");
    assert_eq!(number(&interp, "x"), 7.0);
}

#[test]
fn test_variable_redeclaration_overwrites() {
    let code = r#"
        burn x = 10
        burn x = 20
        x = x + 1
    "#;
    let interp = run_code(code);
    assert_eq!(number(&interp, "x"), 21.0);
}

#[test]
fn test_assignment_is_an_expression() {
    let interp = run_code("burn a = 0\nburn b = a = 5");
    assert_eq!(number(&interp, "a"), 5.0);
    assert_eq!(number(&interp, "b"), 5.0);
}

#[test]
fn test_flat_right_associative_precedence() {
    let code = r#"
        burn a = 2 * 3 + 4
        burn b = 10 - 2 - 3
        burn c = (2 * 3) + 4
    "#;
    let interp = run_code(code);
    assert_eq!(number(&interp, "a"), 14.0);
    assert_eq!(number(&interp, "b"), 11.0);
    assert_eq!(number(&interp, "c"), 10.0);
}

#[test]
fn test_negation() {
    let interp = run_code("burn x = -4\nburn y = -x + 1");
    assert_eq!(number(&interp, "x"), -4.0);
    assert_eq!(number(&interp, "y"), 5.0);
}

#[test]
fn test_function_call_and_return() {
    let code = r#"
        prepmatch add(a, b) {
            return a + b
        }
        fire(add(2, 3))
    "#;
    assert_eq!(output_of(code), "5\n");
}

#[test]
fn test_function_without_return_yields_null() {
    let code = r#"
        prepmatch nothing() {
            burn local = 1
        }
        fire(nothing())
    "#;
    assert_eq!(output_of(code), "null\n");
}

#[test]
fn test_return_exits_from_nested_blocks() {
    let code = r#"
        prepmatch first_over(limit) {
            for i through (0, 100) {
                while true {
                    if i > limit {
                        return i
                    }
                    i = 1000
                }
            }
            return -1
        }
        fire(first_over(5))
    "#;
    // i is rebound to 1000 inside the while, so the very first iteration returns
    assert_eq!(output_of(code), "1000\n");
}

#[test]
fn test_recursion() {
    let code = r#"
        prepmatch fact(n) {
            if n <= 1 {
                return 1
            }
            return n * fact(n - 1)
        }
        prepmatch fib(n) {
            if n < 2 {
                return n
            }
            return fib(n - 1) + fib(n - 2)
        }
        fire(fact(5), fib(15))
    "#;
    assert_eq!(output_of(code), "120 610\n");
}

#[test]
fn test_wrong_argument_count_is_type_error() {
    let err = error_of("prepmatch add(a, b) { return a + b }\nadd(1)");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert!(err.message.contains("expects 2 arguments, got 1"));
}

#[test]
fn test_lambda_and_call_marker() {
    let code = r#"
        burn double = prepmatch(x) { return x * 2 }
        fire(double(4))
        lightmatch fire(lightmatch double(5))
    "#;
    assert_eq!(output_of(code), "8\n10\n");
}

#[test]
fn test_functions_are_first_class() {
    let code = r#"
        prepmatch apply(f, v) {
            return f(v)
        }
        fire(apply(prepmatch(n) { return n + 1 }, 41))
        prepmatch named() { return 0 }
        fire(named)
    "#;
    assert_eq!(output_of(code), "42\n<function named>\n");
}

#[test]
fn test_closure_captures_primitive_by_value() {
    let code = r#"
        burn count = 1
        prepmatch show() {
            return count
        }
        count = 5
        fire(show(), count)
    "#;
    assert_eq!(output_of(code), "1 5\n");
}

#[test]
fn test_closure_shares_containers() {
    let code = r#"
        burn items = []
        prepmatch add(x) {
            items.push(x)
        }
        add(1)
        add(2)
        fire(items.length, items)
    "#;
    assert_eq!(output_of(code), "2 [1, 2]\n");
}

#[test]
fn test_returned_closure_keeps_its_snapshot() {
    let code = r#"
        prepmatch make_adder(n) {
            return prepmatch(x) { return x + n }
        }
        burn add5 = make_adder(5)
        burn add10 = make_adder(10)
        fire(add5(1), add10(1))
    "#;
    assert_eq!(output_of(code), "6 11\n");
}

#[test]
fn test_function_locals_do_not_leak() {
    let code = r#"
        burn x = 1
        prepmatch f() {
            burn x = 2
            burn inner = 3
            return x
        }
        burn y = f()
    "#;
    let interp = run_code(code);
    assert_eq!(number(&interp, "x"), 1.0);
    assert_eq!(number(&interp, "y"), 2.0);
    assert!(interp.env.get("inner").is_none());
}

#[test]
fn test_if_elif_else_runs_exactly_one_branch() {
    let code = r#"
        prepmatch grade(score) {
            if score >= 90 {
                return "A"
            } elif score >= 80 {
                return "B"
            } elif score >= 70 {
                return "C"
            } else {
                return "F"
            }
        }
        fire(grade(95), grade(85), grade(75), grade(10))
    "#;
    assert_eq!(output_of(code), "A B C F\n");
}

#[test]
fn test_if_without_match_runs_nothing() {
    let code = r#"
        burn ran = false
        if 1 > 2 {
            ran = true
        } elif false {
            ran = true
        }
    "#;
    let interp = run_code(code);
    assert_eq!(interp.env.get("ran"), Some(Value::Bool(false)));
}

#[test]
fn test_truthiness_in_conditions() {
    let code = r#"
        if 0 { fire("zero") }
        if "" { fire("empty string") }
        if [] { fire("empty array") }
        if {} { fire("empty dict") }
        if "x" { fire("string") }
        if [0] { fire("array") }
    "#;
    assert_eq!(output_of(code), "string\narray\n");
}

#[test]
fn test_while_loop() {
    let code = r#"
        burn i = 0
        burn total = 0
        while i < 5 {
            total = total + i
            i = i + 1
        }
    "#;
    let interp = run_code(code);
    assert_eq!(number(&interp, "total"), 10.0);
}

#[test]
fn test_for_loop_prints_range() {
    assert_eq!(output_of("for i through (0, 3) { fire(i) }"), "0\n1\n2\n");
}

#[test]
fn test_for_loop_variable_lives_in_outer_scope() {
    let interp = run_code("for i through (0, 3) { burn last = i }");
    assert_eq!(number(&interp, "i"), 2.0);
    assert_eq!(number(&interp, "last"), 2.0);
}

#[test]
fn test_for_loop_empty_range_and_truncated_bounds() {
    let code = r#"
        for i through (5, 2) { fire("never") }
        for j through (0.9, 2.7) { fire(j) }
    "#;
    assert_eq!(output_of(code), "0\n1\n");
}

#[test]
fn test_closures_created_in_loop_capture_each_iteration() {
    let code = r#"
        burn getters = []
        for i through (0, 3) {
            getters.push(prepmatch() { return i })
        }
        fire(getters[0](), getters[2](), i)
    "#;
    assert_eq!(output_of(code), "0 2 2\n");
}

#[test]
fn test_short_circuit_skips_side_effects() {
    let code = r#"
        burn log = []
        prepmatch touch() {
            log.push(1)
            return true
        }
        burn a = false and touch()
        burn b = true or touch()
        fire(a, b, log.length)
    "#;
    assert_eq!(output_of(code), "false true 0\n");
}

#[test]
fn test_logical_operators_return_deciding_operand() {
    let code = r#"
        fire(0 or "fallback")
        fire("left" and "right")
        fire("" and "never")
    "#;
    assert_eq!(output_of(code), "fallback\nright\n\n");
}

#[test]
fn test_array_methods_and_auto_invocation() {
    let code = r#"
        burn xs = [1, 2, 3]
        xs.push(4)
        fire(xs.length)
        burn last = xs.pop
        xs.update(0, "first")
        fire(xs, last)
    "#;
    assert_eq!(output_of(code), "4\n[first, 2, 3] 4\n");
}

#[test]
fn test_array_indexing_and_chains() {
    let code = r#"
        burn grid = [[1, 2], [3, 4]]
        fire(grid[1][0], grid[0].length, grid.length)
    "#;
    assert_eq!(output_of(code), "3 2 2\n");
}

#[test]
fn test_array_concatenation_creates_new_array() {
    let code = r#"
        burn a = [1]
        burn b = a + [2, 3]
        fire(a, b)
    "#;
    assert_eq!(output_of(code), "[1] [1, 2, 3]\n");
}

#[test]
fn test_array_index_out_of_bounds_is_fatal() {
    let run = execute(
        "burn xs = [1]\nfire(\"before\")\nfire(xs[3])\nfire(\"after\")",
        &KeywordTable::default(),
        "",
    );
    assert_eq!(run.result.unwrap_err().kind, ErrorKind::IndexError);
    assert_eq!(run.output, "before\n");
}

#[test]
fn test_dict_operations() {
    let code = r#"
        burn person = {"name": "Ada", "age": 36}
        person.update("age", 37)
        person.update("city", "London")
        fire(person["age"], person.has("name"), person.has("email"))
        fire(person.keys, person.length)
    "#;
    assert_eq!(output_of(code), "37 true false\n[age, city, name] 3\n");
}

#[test]
fn test_dict_display_is_sorted() {
    assert_eq!(output_of("fire({\"b\": 2, \"a\": [1]})"), "{\"a\": [1], \"b\": 2}\n");
}

#[test]
fn test_dict_missing_key_is_name_error() {
    let err = error_of("burn d = {\"a\": 1}\nfire(d[\"b\"])");
    assert_eq!(err.kind, ErrorKind::NameError);
    assert!(err.message.contains("'b'"));
}

#[test]
fn test_unknown_attribute_is_type_error() {
    let err = error_of("burn xs = []\nxs.size");
    assert_eq!(err.kind, ErrorKind::TypeError);
    let err = error_of("burn n = 5\nn.length");
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_string_operations() {
    let code = r#"
        burn greeting = "Hello " + 'World'
        fire(greeting, "a" < "b", "abc" == "abc")
        fire("tab\there")
    "#;
    assert_eq!(output_of(code), "Hello World true true\ntab\there\n");
}

#[test]
fn test_structural_equality() {
    let code = r#"
        fire([1, 2] == [1, 2], [1, 2] == [2, 1])
        fire({"a": 1} == {"a": 1}, 1 == "1", 0 == false)
    "#;
    assert_eq!(output_of(code), "true false\ntrue false false\n");
}

#[test]
fn test_number_display() {
    assert_eq!(output_of("fire(7 / 2, 10 / 5, 1.50)"), "3.5 2 1.5\n");
}

#[test]
fn test_fire_multiple_values_and_empty() {
    assert_eq!(output_of("fire(1, \"two\", true, [3])\nfire()"), "1 two true [3]\n\n");
}

#[test]
fn test_type_conversions() {
    let code = r#"
        fire(int("42") + 1, int(3.9), float("2.5"), str(12) + "!", bool(0), bool("x"))
    "#;
    assert_eq!(output_of(code), "43 3 2.5 12! false true\n");
}

#[test]
fn test_bad_conversion_is_value_error() {
    assert_eq!(error_of("int(\"forty\")").kind, ErrorKind::ValueError);
}

#[test]
fn test_random_with_equal_bounds() {
    assert_eq!(output_of("fire(random(7, 7))"), "7\n");
}

#[test]
fn test_random_stays_in_bounds() {
    let code = r#"
        burn ok = true
        for i through (0, 50) {
            burn r = random(1, 3)
            if (r < 1) or (r > 3) {
                ok = false
            }
        }
    "#;
    let interp = run_code(code);
    assert_eq!(interp.env.get("ok"), Some(Value::Bool(true)));
}

#[test]
fn test_load_reads_injected_input() {
    let code = r#"
        burn name = load("Name: ")
        burn age = int(load("Age: "))
        burn rest = load("More: ")
        fire("Hi " + name, age + 1, rest == "")
    "#;
    let run = execute(code, &KeywordTable::default(), "Ada\n36\n");
    run.result.unwrap();
    assert_eq!(run.output, "Name: Age: More: Hi Ada 37 true\n");
}

#[test]
fn test_undeclared_variable_is_name_error() {
    let err = error_of("fire(missing)");
    assert_eq!(err.kind, ErrorKind::NameError);
    assert!(err.message.contains("missing"));
}

#[test]
fn test_division_by_zero_is_value_error() {
    assert_eq!(error_of("burn x = 1 / 0").kind, ErrorKind::ValueError);
    assert_eq!(error_of("burn x = 1 % 0").kind, ErrorKind::ValueError);
}

#[test]
fn test_mixed_type_arithmetic_is_type_error() {
    assert_eq!(error_of("burn x = \"a\" - 1").kind, ErrorKind::TypeError);
    assert_eq!(error_of("burn x = [1] < [2]").kind, ErrorKind::TypeError);
}

#[test]
fn test_calling_non_function_is_type_error() {
    assert_eq!(error_of("burn x = 5\nx(1)").kind, ErrorKind::TypeError);
}

#[test]
fn test_output_before_error_is_kept() {
    let run = execute("fire(1)\nfire(nope)\nfire(2)", &KeywordTable::default(), "");
    assert!(run.result.is_err());
    assert_eq!(run.output, "1\n");
}

#[test]
fn test_comments_are_ignored() {
    let code = r#"
        # leading comment
        burn x = 1 # trailing comment
        fire(x)
    "#;
    assert_eq!(output_of(code), "1\n");
}

#[test]
fn test_custom_keyword_table() {
    let keywords = KeywordTable::from_toml_str(
        "var = \"let\"\nfunc = \"fn\"\nreturn = \"give\"\nrange = \"in\"\n",
    )
    .unwrap();
    let code = r#"
        fn square(n) { give n * n }
        let total = 0
        for i in (1, 4) { total = total + square(i) }
        fire(total)
    "#;
    let run = execute(code, &keywords, "");
    run.result.unwrap();
    assert_eq!(run.output, "14\n");
}

#[test]
fn test_default_spelling_is_plain_identifier_after_override() {
    let keywords = KeywordTable::from_toml_str("var = \"let\"\n").unwrap();
    let tokens = tokenize_with("burn", &keywords).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let mut interp = Interpreter::new();
    let err = interp.run(&program).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameError);
}

#[test]
fn test_reserved_keyword_is_parse_error() {
    let tokens = tokenize("lightertype Thing {}").unwrap();
    let err = Parser::new(tokens).parse().unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert!(err.message.contains("not supported"));
}

#[test]
fn test_rebinding_closure_in_long_loop_drops_cleanly() {
    let code = r#"
        for i through (0, 200000) {
            burn g = prepmatch (x) { return x + i }
        }
        fire(g(1))
        fire("done")
    "#;
    let run = execute(code, &KeywordTable::default(), "");
    run.result.unwrap();
    assert_eq!(run.output, "200000\ndone\n");
    drop(run.interp);
}

#[test]
fn test_counter_closures_chained_through_arguments_drop_cleanly() {
    let code = r#"
        prepmatch wrap(inner) { return prepmatch () { return inner() + 1 } }
        burn f = prepmatch () { return 0 }
        for i through (0, 150000) { f = wrap(f) }
        fire("built")
    "#;
    assert_eq!(output_of(code), "built\n");
}

#[test]
fn test_thousand_nested_calls_succeed() {
    let code = format!(
        "prepmatch down(n) {{ if n == 0 {{ return 0 }} return 1 + down(n - 1) }}\nfire(down({}))",
        MAX_CALL_DEPTH - 1
    );
    assert_eq!(output_of(&code), format!("{}\n", MAX_CALL_DEPTH - 1));
}

#[test]
fn test_unbounded_recursion_is_recursion_error() {
    let err = error_of("prepmatch spin(n) { return spin(n + 1) }\nspin(0)");
    assert_eq!(err.kind, ErrorKind::RecursionError);
    assert!(err.message.contains("Maximum call depth of 1000"));
}

#[test]
fn test_fire_and_str_on_self_containing_array() {
    let code = r#"
        burn a = [1]
        a.push(a)
        fire(a)
        fire(str(a))
        fire(a == a)
    "#;
    assert_eq!(output_of(code), "[1, [...]]\n[1, [...]]\ntrue\n");
}

#[test]
fn test_fire_and_str_on_self_containing_dict() {
    let code = r#"
        burn d = {"n": 1}
        d.update("me", d)
        fire(d)
        fire(str(d))
    "#;
    assert_eq!(output_of(code), "{\"me\": {...}, \"n\": 1}\n{\"me\": {...}, \"n\": 1}\n");
}

#[test]
fn test_equality_between_distinct_cycles() {
    let code = r#"
        burn a = [1]
        a.push(a)
        burn b = [1]
        b.push(b)
        burn c = [2]
        c.push(c)
        burn d = {"k": 1}
        d.update("me", d)
        burn e = {"k": 1}
        e.update("me", e)
        fire(a == b)
        fire(a == c)
        fire(d == e)
    "#;
    assert_eq!(output_of(code), "true\nfalse\ntrue\n");
}

#[test]
fn test_int_keeps_magnitudes_beyond_64_bits() {
    assert_eq!(output_of("fire(int(100000000000000000000))"), "100000000000000000000\n");
    assert_eq!(output_of("fire(int(\"99999999999999999999\"))"), "100000000000000000000\n");
    assert_eq!(output_of("fire(int(-100000000000000000000.75))"), "-100000000000000000000\n");
}

#[test]
fn test_range_bound_beyond_integer_range_is_value_error() {
    let err = error_of("for i through (0, 100000000000000000000) { fire(i) }");
    assert_eq!(err.kind, ErrorKind::ValueError);
    assert!(err.message.contains("out of integer range"));
}

#[test]
fn test_deeply_nested_arrays_print_compare_and_drop() {
    let code = r#"
        burn a = []
        burn b = []
        for i through (0, 100000) {
            a = [a]
            b = [b]
        }
        fire(a == b)
        fire(a)
    "#;
    let run = execute(code, &KeywordTable::default(), "");
    run.result.unwrap();
    assert!(run.output.starts_with("true\n[[[["));
    assert_eq!(run.output.len(), "true\n".len() + 2 * 100_001 + 1);
}
