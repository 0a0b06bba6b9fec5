//! Integration tests for the Rill tree-walking interpreter.
//!
//! Tests key interpreter features:
//! - program result values and the reference scenarios
//! - hoisting and the temporal dead zone
//! - closures and per-iteration `let` bindings
//! - equality laws and coercions
//! - control flow: loops, switch fallthrough, break/continue
//! - exceptions: try/catch/finally ordering, error values, stack snapshots
//! - break/continue/return escaping their enclosing body
//! - built-in prelude and the native-function extension point
//! - determinism

use pretty_assertions::assert_eq;
use rill_eval::{EvalError, Interpreter, InterpreterOptions, Thrown, Value};
use rill_lexer::Lexer;
use rill_parser::Parser;
use rill_types::ast::Block;
use rill_types::SourceFile;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Parse source into a program (panics on lex/parse errors).
fn parse(source: &str) -> Block {
    let sf = SourceFile::new("test.js", source);
    let tokens = Lexer::new(&sf)
        .lex()
        .unwrap_or_else(|e| panic!("lex error: {e}"));
    Parser::new(tokens, &sf)
        .parse()
        .unwrap_or_else(|e| panic!("parse error: {e}"))
}

fn run(interp: &mut Interpreter, source: &str) -> Result<Value, EvalError> {
    interp.interpret(&parse(source))
}

/// Evaluate with a fresh interpreter and return the final value.
fn eval(source: &str) -> Value {
    run(&mut Interpreter::new(), source).unwrap_or_else(|e| panic!("runtime error: {e}"))
}

/// Evaluate expecting an uncaught exception.
fn eval_err(source: &str) -> Thrown {
    match run(&mut Interpreter::new(), source) {
        Ok(value) => panic!("expected an exception, got {value}"),
        Err(EvalError::Thrown(thrown)) => thrown,
        Err(other) => panic!("expected a thrown value, got {other}"),
    }
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn text(s: &str) -> Value {
    Value::string(s)
}

// ══════════════════════════════════════════════════════════════════════════════
// Reference scenarios
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_a_multiple_declarators() {
    assert_eq!(eval("var a=1,b=2; a+b;"), num(3.0));
}

#[test]
fn scenario_b_recursive_fibonacci() {
    assert_eq!(
        eval("function f(n){ if(n<=1) return n; return f(n-1)+f(n-2); } f(6);"),
        num(8.0)
    );
}

#[test]
fn scenario_c_let_loop_closures() {
    assert_eq!(
        eval("var r=[]; for(let i=0;i<3;i++){ r.push(function(){return i;}); } r[0]()+r[1]()+r[2]();"),
        num(3.0)
    );
}

#[test]
fn scenario_d_catch_string() {
    assert_eq!(eval(r#"try{ throw "x"; } catch(e){ e; }"#), text("x"));
}

#[test]
fn scenario_e_null_member_is_type_error() {
    let thrown = eval_err("null.prop;");
    assert_eq!(thrown.error_name().as_deref(), Some("TypeError"));
    assert_eq!(
        thrown.message(),
        "TypeError: Cannot read property 'prop' of null (at 'null')"
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Program values
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_program_is_undefined() {
    assert_eq!(eval(""), Value::Undefined);
}

#[test]
fn declarations_yield_undefined() {
    assert_eq!(eval("1; var x = 2;"), Value::Undefined);
    assert_eq!(eval("let y = 2;"), Value::Undefined);
}

#[test]
fn empty_statement_keeps_previous_value() {
    assert_eq!(eval("5;;"), num(5.0));
}

#[test]
fn if_yields_branch_value() {
    assert_eq!(eval("if (true) { 'yes'; } else { 'no'; }"), text("yes"));
    assert_eq!(eval("if (0) 'yes'; else 'no';"), text("no"));
}

#[test]
fn globals_persist_across_runs() {
    let mut interp = Interpreter::new();
    run(&mut interp, "var counter = 1; let fixed = 10; function bump() { counter++; }").unwrap();
    run(&mut interp, "bump(); bump();").unwrap();
    assert_eq!(interp.get_global_value("counter").unwrap(), num(3.0));
    assert_eq!(run(&mut interp, "fixed + counter;").unwrap(), num(13.0));
    assert!(interp.global_names().contains(&"bump".to_string()));
}

// ══════════════════════════════════════════════════════════════════════════════
// Hoisting & TDZ
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn var_read_before_declaration_is_undefined() {
    assert_eq!(eval("var seen = x; var x = 5; seen;"), Value::Undefined);
}

#[test]
fn var_hoists_out_of_nested_blocks() {
    assert_eq!(
        eval("function f() { if (false) { while (false) { var deep = 1; } } return typeof deep; } f();"),
        text("undefined")
    );
    assert_eq!(eval("{ { var inner = 4; } } inner;"), num(4.0));
}

#[test]
fn function_declarations_hoist_with_body() {
    assert_eq!(eval("var r = twice(4); function twice(n) { return n * 2; } r;"), num(8.0));
}

#[test]
fn function_declaration_wins_over_later_var() {
    assert_eq!(eval("var t = typeof g; function g() {} var g; t;"), text("function"));
}

#[test]
fn let_before_declaration_is_reference_error() {
    let thrown = eval_err("var v = y; let y = 1;");
    assert_eq!(thrown.message(), "ReferenceError: y is not defined");
}

#[test]
fn const_before_declaration_is_reference_error() {
    let thrown = eval_err("function f() { return k; } f(); const k = 1;");
    assert_eq!(thrown.error_name().as_deref(), Some("ReferenceError"));
}

#[test]
fn block_scoped_let_does_not_leak() {
    let thrown = eval_err("{ let hidden = 1; } hidden;");
    assert_eq!(thrown.message(), "ReferenceError: hidden is not defined");
}

#[test]
fn inner_let_shadows_outer() {
    assert_eq!(eval("let a = 1; { let a = 2; } a;"), num(1.0));
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations & assignment
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn redeclaring_let_is_syntax_error() {
    let thrown = eval_err("let a = 1; let a = 2;");
    assert_eq!(
        thrown.message(),
        "SyntaxError: Identifier 'a' has already been declared"
    );
}

#[test]
fn var_redeclaration_is_allowed() {
    assert_eq!(eval("var a = 1; var a = 2; a;"), num(2.0));
}

#[test]
fn const_assignment_is_type_error() {
    let thrown = eval_err("const c = 1; c = 2;");
    assert_eq!(thrown.message(), "TypeError: Assignment to constant variable.");
}

#[test]
fn const_without_initializer_is_syntax_error() {
    let thrown = eval_err("const c;");
    assert_eq!(
        thrown.message(),
        "SyntaxError: Missing initializer in const declaration"
    );
}

#[test]
fn assignment_to_undeclared_creates_global() {
    let mut interp = Interpreter::new();
    run(&mut interp, "function f() { leaked = 9; } f();").unwrap();
    assert_eq!(interp.get_global_value("leaked").unwrap(), num(9.0));
}

#[test]
fn compound_assignment_on_names_and_members() {
    assert_eq!(eval("var a = 10; a += 5; a -= 3; a *= 2; a /= 4; a %= 4; a;"), num(2.0));
    assert_eq!(eval("var o = {n: 1}; o.n += 41; o['n'];"), num(42.0));
    assert_eq!(eval("var s = 'a'; s += 1; s;"), text("a1"));
}

#[test]
fn update_prefix_and_postfix() {
    assert_eq!(eval("var i = 5; var a = i++; a * 10 + i;"), num(56.0));
    assert_eq!(eval("var i = 5; var a = ++i; a * 10 + i;"), num(66.0));
    assert_eq!(eval("var o = {c: '3'}; var old = o.c--; old + o.c;"), num(5.0));
}

#[test]
fn assignment_chains_right_to_left() {
    assert_eq!(eval("var a, b; a = b = 7; a + b;"), num(14.0));
}

// ══════════════════════════════════════════════════════════════════════════════
// Closures & loops
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn var_loop_closures_share_final_value() {
    assert_eq!(
        eval("var r=[]; for(var i=0;i<3;i++){ r.push(function(){return i;}); } r[0]()+r[1]()+r[2]();"),
        num(9.0)
    );
}

#[test]
fn let_loop_body_mutation_is_copied_back() {
    assert_eq!(
        eval("var seen = []; for (let i = 0; i < 6; i++) { seen.push(i); i++; } seen.join(',');"),
        text("0,2,4")
    );
}

#[test]
fn let_loop_continue_runs_update() {
    assert_eq!(
        eval("var sum = 0; for (let i = 0; i < 5; i++) { if (i % 2) continue; sum += i; } sum;"),
        num(6.0)
    );
}

#[test]
fn closures_capture_their_scope() {
    let source = "
        function counter() {
            var count = 0;
            return function() { count += 1; return count; };
        }
        var c1 = counter();
        var c2 = counter();
        c1(); c1(); c2();
        c1() * 10 + c2();
    ";
    assert_eq!(eval(source), num(32.0));
}

#[test]
fn named_function_expression_sees_itself() {
    assert_eq!(
        eval("var fact = function f(n) { return n <= 1 ? 1 : n * f(n - 1); }; fact(5);"),
        num(120.0)
    );
}

#[test]
fn while_with_break_and_continue() {
    let source = "
        var i = 0, total = 0;
        while (true) {
            i++;
            if (i > 10) break;
            if (i % 3 != 0) continue;
            total += i;
        }
        total;
    ";
    assert_eq!(eval(source), num(18.0));
}

#[test]
fn for_without_clauses() {
    assert_eq!(eval("var n = 0; for (;;) { n++; if (n == 4) break; } n;"), num(4.0));
}

#[test]
fn return_from_inside_loop() {
    assert_eq!(
        eval("function find(xs, t) { for (var i = 0; i < xs.length; i++) { if (xs[i] === t) return i; } return -1; } find([5, 6, 7], 7);"),
        num(2.0)
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Switch
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn switch_uses_strict_equality() {
    let source = "
        function kind(x) {
            switch (x) {
                case 1: return 'number';
                case '1': return 'string';
                default: return 'other';
            }
        }
        kind(1) + ' ' + kind('1') + ' ' + kind(true);
    ";
    assert_eq!(eval(source), text("number string other"));
}

#[test]
fn switch_falls_through_until_break() {
    let source = "
        var log = [];
        switch (2) {
            case 1: log.push('one');
            case 2: log.push('two');
            case 3: log.push('three'); break;
            case 4: log.push('four');
        }
        log.join(',');
    ";
    assert_eq!(eval(source), text("two,three"));
}

#[test]
fn switch_without_match_or_default_runs_nothing() {
    assert_eq!(eval("var hit = false; switch (9) { case 1: hit = true; } hit;"), Value::Bool(false));
}

#[test]
fn continue_inside_switch_targets_loop() {
    let source = "
        var out = '';
        for (var i = 0; i < 4; i++) {
            switch (i) { case 1: continue; default: out += i; }
        }
        out;
    ";
    assert_eq!(eval(source), text("023"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Exceptions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn finally_runs_on_every_path() {
    let source = "
        var log = [];
        function normal() { try { log.push('t'); } finally { log.push('f1'); } }
        function returns() { try { return 1; } finally { log.push('f2'); } }
        function throws() { try { throw 1; } catch (e) { log.push('c'); } finally { log.push('f3'); } }
        normal(); returns(); throws();
        log.join(',');
    ";
    assert_eq!(eval(source), text("t,f1,f2,c,f3"));
}

#[test]
fn normal_finally_preserves_pending_return() {
    assert_eq!(
        eval("var n = 0; function f() { try { return 'try'; } finally { n++; } } f() + n;"),
        text("try1")
    );
}

#[test]
fn finally_throw_supersedes_pending_return() {
    let source = "
        function f() { try { return 1; } finally { throw 'from finally'; } }
        try { f(); } catch (e) { e; }
    ";
    assert_eq!(eval(source), text("from finally"));
}

#[test]
fn finally_throw_supersedes_pending_exception() {
    let source = "
        try {
            try { throw 'first'; } finally { throw 'second'; }
        } catch (e) { e; }
    ";
    assert_eq!(eval(source), text("second"));
}

#[test]
fn exception_in_catch_replaces_original() {
    let source = "
        var ran = false;
        try {
            try { throw 'a'; } catch (e) { throw e + 'b'; } finally { ran = true; }
        } catch (outer) { outer + ran; }
    ";
    assert_eq!(eval(source), text("abtrue"));
}

#[test]
fn uncaught_exception_propagates_after_finally() {
    let mut interp = Interpreter::new();
    let err = run(&mut interp, "var cleaned = false; try { throw 42; } finally { cleaned = true; }").unwrap_err();
    assert_eq!(err.thrown().map(|t| t.value.clone()), Some(num(42.0)));
    assert_eq!(interp.get_global_value("cleaned").unwrap(), Value::Bool(true));
}

#[test]
fn catch_without_binding() {
    assert_eq!(eval("var ok = 0; try { missing(); } catch { ok = 1; } ok;"), num(1.0));
    assert_eq!(eval("try { throw 1; } catch () { 'empty parens'; }"), text("empty parens"));
}

#[test]
fn engine_errors_are_catchable_error_objects() {
    let source = "
        try { undefinedThing; } catch (e) { e.name + '|' + e.message + '|' + String(e); }
    ";
    assert_eq!(
        eval(source),
        text("ReferenceError|undefinedThing is not defined|ReferenceError: undefinedThing is not defined")
    );
}

#[test]
fn user_errors_via_constructor() {
    assert_eq!(
        eval("try { throw new Error('bad'); } catch (e) { e.toString(); }"),
        text("Error: bad")
    );
    assert_eq!(eval("new TypeError('t').name;"), text("TypeError"));
    assert_eq!(eval("String(new Error());"), text("Error"));
}

#[test]
fn calling_non_function_names_source() {
    let thrown = eval_err("var o = {}; o.missing();");
    assert_eq!(thrown.message(), "TypeError: o.missing is not a function");
}

#[test]
fn new_on_non_constructor_names_source() {
    let thrown = eval_err("var x = 1; new x();");
    assert_eq!(thrown.message(), "TypeError: x is not a constructor");
}

#[test]
fn undefined_member_names_source_text() {
    let thrown = eval_err("var o = {}; o.a.b;");
    assert_eq!(
        thrown.message(),
        "TypeError: Cannot read property 'b' of undefined (at 'o.a')"
    );
}

#[test]
fn stack_snapshot_innermost_first() {
    let source = "function inner() {\n  throw 'deep';\n}\nfunction outer() {\n  inner();\n}\nouter();";
    let thrown = eval_err(source);
    let names: Vec<&str> = thrown.stack.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer"]);
    assert_eq!((thrown.stack[0].line, thrown.stack[0].column), (5, 3));
    assert_eq!((thrown.stack[1].line, thrown.stack[1].column), (7, 1));
    assert_eq!(
        thrown.to_string(),
        "deep\n    at inner [5:3]\n    at outer [7:1]"
    );
}

#[test]
fn constructor_frames_are_labelled() {
    let thrown = eval_err("function Boom() { throw 'x'; }\nnew Boom();");
    assert_eq!(thrown.stack[0].name, "Boom (constructor)");
    let thrown = eval_err("(function() { throw 'y'; })();");
    assert_eq!(thrown.stack[0].name, "anonymous");
}

#[test]
fn call_stack_is_empty_after_exception() {
    let mut interp = Interpreter::new();
    let _ = run(&mut interp, "function f() { throw 1; } f();");
    assert!(interp.call_stack().is_empty());
}

#[test]
fn max_call_depth_throws_range_error() {
    let mut interp = Interpreter::with_options(InterpreterOptions {
        prelude: true,
        max_call_depth: Some(50),
    });
    let value = run(
        &mut interp,
        "function down(n) { return down(n + 1); } try { down(0); } catch (e) { e.name + ': ' + e.message; }",
    )
    .unwrap();
    assert_eq!(value, text("RangeError: Maximum call stack size exceeded"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Escaping control signals
// ══════════════════════════════════════════════════════════════════════════════

/// Run expecting an internal (uncatchable) failure and return its message.
fn internal_err(source: &str) -> String {
    match run(&mut Interpreter::new(), source) {
        Err(EvalError::Internal(msg)) => msg,
        other => panic!("expected an internal error, got {other:?}"),
    }
}

#[test]
fn top_level_break_escapes_the_program() {
    assert_eq!(internal_err("break;"), "illegal break escaped the program");
    assert_eq!(internal_err("var x = 1; if (x) { continue; }"), "illegal continue escaped the program");
}

#[test]
fn top_level_return_escapes_the_program() {
    assert_eq!(internal_err("return 5;"), "illegal return escaped the program");
}

#[test]
fn catch_does_not_intercept_escaping_break() {
    assert_eq!(
        internal_err("var ran = false; try { break; } catch (e) { ran = true; }"),
        "illegal break escaped the program"
    );
}

#[test]
fn continue_escaping_a_function_is_not_catchable() {
    let mut interp = Interpreter::new();
    let err = run(&mut interp, "var caught = false; function f() { continue; } try { f(); } catch (e) { caught = true; }")
        .unwrap_err();
    match err {
        EvalError::Internal(msg) => assert_eq!(msg, "illegal continue escaped the function body"),
        other => panic!("expected an internal error, got {other}"),
    }
    assert_eq!(interp.get_global_value("caught").unwrap(), Value::Bool(false));
    assert!(interp.call_stack().is_empty());
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators & equality
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn equality_laws() {
    assert_eq!(eval("NaN === NaN;"), Value::Bool(false));
    assert_eq!(eval("0 === -0;"), Value::Bool(true));
    assert_eq!(eval("null == undefined;"), Value::Bool(true));
    assert_eq!(eval("null === undefined;"), Value::Bool(false));
    assert_eq!(eval("null == 0;"), Value::Bool(false));
    assert_eq!(eval("'' == 0;"), Value::Bool(true));
    assert_eq!(eval("true == '1';"), Value::Bool(true));
    assert_eq!(eval("[1,2] == '1,2';"), Value::Bool(true));
    assert_eq!(eval("var o = {}; o == o;"), Value::Bool(true));
    assert_eq!(eval("({}) == ({});"), Value::Bool(false));
}

#[test]
fn numbers_loosely_equal_their_decimal_strings() {
    for n in ["0", "1", "-7", "3.5", "0.1", "1e+21", "123456789", "Infinity", "-0.25"] {
        let source = format!("var n = {n}; n == String(n);");
        assert_eq!(eval(&source), Value::Bool(true), "{n}");
    }
}

#[test]
fn arithmetic_follows_ieee() {
    assert_eq!(eval("1 / 0;"), num(f64::INFINITY));
    assert_eq!(eval("-1 / 0;"), num(f64::NEG_INFINITY));
    assert_eq!(eval("0 / 0;"), num(f64::NAN));
    assert_eq!(eval("2 ** 3 ** 2;"), num(512.0));
    assert_eq!(eval("7 % -3;"), num(1.0));
    assert_eq!(eval("'6' * '7';"), num(42.0));
    assert_eq!(eval("1 + 2 + '3';"), text("33"));
    assert_eq!(eval("'1' + 2 + 3;"), text("123"));
}

#[test]
fn bitwise_and_shift_operators() {
    assert_eq!(eval("5 & 3;"), num(1.0));
    assert_eq!(eval("5 | 3;"), num(7.0));
    assert_eq!(eval("5 ^ 3;"), num(6.0));
    assert_eq!(eval("~5;"), num(-6.0));
    assert_eq!(eval("1 << 4 >> 2;"), num(4.0));
    assert_eq!(eval("-16 >>> 28;"), num(15.0));
    assert_eq!(eval("4294967297 | 0;"), num(1.0));
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(eval("0 || 'fallback';"), text("fallback"));
    assert_eq!(eval("'a' && 'b';"), text("b"));
    assert_eq!(eval("null && explode();"), Value::Null);
    assert_eq!(eval("'x' || explode();"), text("x"));
    assert_eq!(eval("0 ?? 'unused';"), num(0.0));
    assert_eq!(eval("undefined ?? null ?? 'last';"), text("last"));
}

#[test]
fn typeof_operator() {
    assert_eq!(eval("typeof 1;"), text("number"));
    assert_eq!(eval("typeof 'a';"), text("string"));
    assert_eq!(eval("typeof true;"), text("boolean"));
    assert_eq!(eval("typeof null;"), text("object"));
    assert_eq!(eval("typeof undefined;"), text("undefined"));
    assert_eq!(eval("typeof notDeclaredAnywhere;"), text("undefined"));
    assert_eq!(eval("typeof function() {};"), text("function"));
    assert_eq!(eval("typeof [];"), text("object"));
    assert_eq!(eval("typeof Array;"), text("function"));
}

#[test]
fn conditional_is_lazy() {
    assert_eq!(eval("true ? 1 : explode();"), num(1.0));
    assert_eq!(eval("var x = 0; x ? a : b = 3; b;"), num(3.0));
}

#[test]
fn relational_on_strings_and_numbers() {
    assert_eq!(eval("'apple' < 'banana';"), Value::Bool(true));
    assert_eq!(eval("'10' < '9';"), Value::Bool(true));
    assert_eq!(eval("'10' < 9;"), Value::Bool(false));
    assert_eq!(eval("undefined < 1;"), Value::Bool(false));
}

// ══════════════════════════════════════════════════════════════════════════════
// Objects, arrays, strings, `this`, `new`
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn array_length_semantics() {
    assert_eq!(eval("var a = [1, 2]; a[5];"), Value::Undefined);
    assert_eq!(eval("var a = [1, 2]; a[4] = 'x'; a.length;"), num(5.0));
    assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; a.join('-');"), text("1"));
    assert_eq!(eval("var a = []; a.length = '2'; a.length;"), num(2.0));
    assert_eq!(eval("var a = [1, 2, 3]; a.length = [1]; a.join();"), text("1"));
}

#[test]
fn invalid_array_lengths_throw_range_error() {
    for write in ["a.length = 1e300", "a.length = -1", "a.length = 1.5", "a[4294967294] = 1", "a = Array(4294967295)"] {
        let source = format!("var a = [7]; try {{ {write}; }} catch (e) {{ e.name + ': ' + e.message + ' ' + a.length; }}");
        assert_eq!(eval(&source), text("RangeError: Invalid array length 1"), "{write}");
    }
    let thrown = eval_err("var a = []; a.length = 1e300;");
    assert_eq!(thrown.error_name().as_deref(), Some("RangeError"));
}

#[test]
fn self_containing_array_joins_as_empty() {
    assert_eq!(eval("var a = [1, 2]; a.push(a); a.join('-');"), text("1-2-"));
    assert_eq!(eval("var a = [1]; a.push([2, a]); String(a);"), text("1,2,"));
    assert_eq!(eval("var a = [1]; a[1] = a; a + '!';"), text("1,!"));
    // The guard is per join, not a global visited set.
    assert_eq!(eval("var b = [1]; [b, b].join(';');"), text("1;1"));
}

#[test]
fn object_literals_and_members() {
    assert_eq!(eval("var o = {a: 1, 'b c': 2, 3: 'three'}; o.a + o['b c'] + o[3];"), text("3three"));
    assert_eq!(eval("var o = {}; o.x = {y: {z: 5}}; o.x.y.z;"), num(5.0));
    assert_eq!(eval("var o = {default: 1, new: 2}; o.default + o.new;"), num(3.0));
}

#[test]
fn string_indexing_and_length() {
    assert_eq!(eval("'hello'.length;"), num(5.0));
    assert_eq!(eval("'hello'[1];"), text("e"));
    assert_eq!(eval("'hi'[7];"), Value::Undefined);
}

#[test]
fn method_calls_bind_this() {
    let source = "
        var account = { balance: 10, deposit: function(n) { this.balance += n; return this; } };
        account.deposit(5).deposit(1).balance;
    ";
    assert_eq!(eval(source), num(16.0));
}

#[test]
fn bare_call_binds_undefined_this() {
    assert_eq!(eval("function who() { return typeof this; } who();"), text("undefined"));
}

#[test]
fn new_creates_instance_with_prototype() {
    let source = "
        function Point(x, y) { this.x = x; this.y = y; }
        Point.prototype.sum = function() { return this.x + this.y; };
        var p = new Point(3, 4);
        p.sum() + (p.hasOwnProperty('sum') ? 100 : 0);
    ";
    assert_eq!(eval(source), num(7.0));
}

#[test]
fn new_returns_explicit_object() {
    assert_eq!(eval("function F() { this.a = 1; return {b: 2}; } var f = new F(); f.b;"), num(2.0));
    assert_eq!(eval("function G() { this.a = 1; return 5; } new G().a;"), num(1.0));
    assert_eq!(eval("function H() { this.n = 9; } var h = new H; h.n;"), num(9.0));
}

#[test]
fn user_to_string_drives_coercion() {
    let source = "
        var money = { amount: 5, toString: function() { return '$' + this.amount; } };
        'cost: ' + money;
    ";
    assert_eq!(eval(source), text("cost: $5"));
}

#[test]
fn non_primitive_to_string_is_type_error() {
    let thrown = eval_err("var o = { toString: function() { return {}; } }; '' + o;");
    assert_eq!(
        thrown.message(),
        "TypeError: Cannot convert object to primitive value"
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Prelude & natives
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn array_methods() {
    assert_eq!(eval("var a = [1, 2, 3]; a.push(4, 5); a.pop(); a.join();"), text("1,2,3,4"));
    assert_eq!(eval("[3, 4, 5].map(function(x, i) { return x * i; }).join(' ');"), text("0 4 10"));
    assert_eq!(eval("var s = 0; [1, 2, 3].forEach(function(x) { s += x; }); s;"), num(6.0));
    assert_eq!(eval("[1, 2, 3, 4].slice(1, -1).join();"), text("2,3"));
    assert_eq!(eval("[1, '1', NaN].indexOf('1');"), num(1.0));
    assert_eq!(eval("[NaN].indexOf(NaN);"), num(-1.0));
    assert_eq!(eval("[NaN].includes(NaN);"), Value::Bool(true));
    assert_eq!(eval("Array.isArray([]) && !Array.isArray({});"), Value::Bool(true));
    assert_eq!(eval("Array(3).length;"), num(3.0));
    assert_eq!(eval("new Array(1, 2).join();"), text("1,2"));
}

#[test]
fn string_methods() {
    assert_eq!(eval("'hello'.charAt(1);"), text("e"));
    assert_eq!(eval("'hello'.indexOf('l');"), num(2.0));
    assert_eq!(eval("'hello'.indexOf('z');"), num(-1.0));
    assert_eq!(eval("'hello'.slice(1, 3);"), text("el"));
    assert_eq!(eval("'hello'.slice(-3);"), text("llo"));
    assert_eq!(eval("'MiXeD'.toUpperCase() + 'MiXeD'.toLowerCase();"), text("MIXEDmixed"));
}

#[test]
fn number_and_conversion_functions() {
    assert_eq!(eval("Number('42') + Number(true);"), num(43.0));
    assert_eq!(eval("Number.parseInt('ff', 16);"), num(255.0));
    assert_eq!(eval("Number.parseFloat('2.5kg');"), num(2.5));
    assert_eq!(eval("Number.isNaN(NaN) && !Number.isNaN('NaN');"), Value::Bool(true));
    assert_eq!(eval("Number.isInteger(5) && !Number.isInteger(5.5);"), Value::Bool(true));
    assert_eq!(eval("String(null) + String([1, [2, 3]]);"), text("null1,2,3"));
    assert_eq!(eval("Boolean('') || Boolean('x');"), Value::Bool(true));
    assert_eq!(eval("(255).toString();"), text("255"));
    assert_eq!(eval("String(2 ** 60);"), text("1152921504606847000"));
    assert_eq!(eval("'' + 123456789012345680000;"), text("123456789012345680000"));
}

#[test]
fn object_prototype_methods() {
    assert_eq!(eval("({}).toString();"), text("[object Object]"));
    assert_eq!(eval("var o = {a: 1}; o.hasOwnProperty('a') && !o.hasOwnProperty('b');"), Value::Bool(true));
    assert_eq!(eval("[1].hasOwnProperty(0);"), Value::Bool(true));
}

#[test]
fn prelude_can_be_disabled() {
    let mut interp = Interpreter::with_options(InterpreterOptions {
        prelude: false,
        max_call_depth: None,
    });
    assert_eq!(run(&mut interp, "typeof Array;").unwrap(), text("undefined"));
    assert_eq!(run(&mut interp, "[1, 2].push(3);").unwrap(), num(3.0));
}

#[test]
fn host_natives_receive_this_and_args() {
    let mut interp = Interpreter::new();
    interp.define_native("sum", |interp, _this, args| {
        let mut total = 0.0;
        for arg in &args {
            total += interp.to_number(arg)?;
        }
        Ok(Value::Number(total))
    });
    interp.define_native("fail", |interp, _this, _args| {
        Err(interp.throw_error("RangeError", "host refused"))
    });
    assert_eq!(run(&mut interp, "sum(1, '2', true);").unwrap(), num(4.0));
    assert_eq!(
        run(&mut interp, "try { fail(); } catch (e) { e.message; }").unwrap(),
        text("host refused")
    );
}

#[test]
fn natives_call_back_into_interpreted_functions() {
    let mut interp = Interpreter::new();
    interp.define_native("apply", |interp, _this, args| {
        let callee = args.first().cloned().unwrap_or_default();
        let rest = args.get(1..).map(<[Value]>::to_vec).unwrap_or_default();
        interp.call_function(&callee, Value::Undefined, rest)
    });
    assert_eq!(
        run(&mut interp, "apply(function(a, b) { return a * b; }, 6, 7);").unwrap(),
        num(42.0)
    );
}

#[test]
fn value_display_for_hosts() {
    assert_eq!(eval("[1, 'a', [true, null]];").to_string(), r#"[1, "a", [true, null]]"#);
    assert_eq!(eval("function named() {} named;").to_string(), "[Function: named]");
    assert_eq!(eval("({a: 1});").to_string(), "[object Object]");
    assert_eq!(eval("new RangeError('r');").to_string(), "RangeError: r");
}

// ══════════════════════════════════════════════════════════════════════════════
// Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn evaluation_is_deterministic() {
    let source = "
        var out = [];
        for (let i = 0; i < 10; i++) { out.push(i * i % 7); }
        var o = {k: out.join('')};
        try { null.x; } catch (e) { o.err = e.message; }
        o.k + '|' + o.err;
    ";
    let program = parse(source);
    let first = Interpreter::new().interpret(&program).unwrap();
    for _ in 0..100 {
        let again = Interpreter::new().interpret(&program).unwrap();
        assert_eq!(again, first);
    }
}
