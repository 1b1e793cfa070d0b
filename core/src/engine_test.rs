use crate::config::IndentConfig;
use crate::engine::IndentEngine;
use crate::pos::Position;
use crate::scan::LexState;

fn engine_with(text: &str, config: IndentConfig) -> IndentEngine {
    let mut engine = IndentEngine::new(config);
    engine.push_str(text);
    engine
}

fn engine(text: &str) -> IndentEngine {
    engine_with(text, IndentConfig::default())
}

fn unaligned() -> IndentConfig {
    IndentConfig {
        align_embedded_if_statements: false,
        align_embedded_using_statements: false,
        ..Default::default()
    }
}

/// Replay `text` character by character and require that at every line
/// ending the prescribed indent matches the indent actually present.
fn assert_replay_clean(text: &str, config: IndentConfig) -> IndentEngine {
    let mut engine = IndentEngine::new(config);
    for ch in text.chars() {
        if ch == '\n' {
            assert!(
                !engine.needs_reindent(),
                "line {} diverges: prescribed {:?}, actual {:?}",
                engine.location().line,
                engine.this_line_indent(),
                engine.current_indent()
            );
        }
        engine.push(ch);
    }
    engine
}

const METHOD_PREFIX: &str = "class Foo\n{\n\tvoid Test()\n\t{\n";

#[test]
fn fresh_engine() {
    let engine = IndentEngine::default();
    assert_eq!(engine.this_line_indent(), "");
    assert_eq!(engine.next_line_indent(), "");
    assert!(!engine.needs_reindent());
    assert_eq!(engine.location(), Position::start());
}

#[test]
fn location_tracking() {
    let engine = engine("ab\ncd");
    assert_eq!(engine.location(), Position::new(2, 3, 5));
}

#[test]
fn location_tracking_crlf() {
    let engine = engine("ab\r\ncd");
    assert_eq!(engine.location(), Position::new(2, 3, 6));
}

#[test]
fn block_indents_one_unit() {
    let engine = engine("class Foo\n{\n");
    assert_eq!(engine.next_line_indent(), "\t");
}

#[test]
fn method_call_unit_indent() {
    let engine = engine_with(&format!("{METHOD_PREFIX}\t\tCall(A,"), IndentConfig::default());
    assert_eq!(engine.this_line_indent(), "\t\t");
    assert_eq!(engine.next_line_indent(), "\t\t\t");
}

#[test]
fn method_call_column_alignment() {
    let config = IndentConfig {
        align_to_first_method_call_argument: true,
        ..Default::default()
    };
    let engine = engine_with(&format!("{METHOD_PREFIX}\t\tCall(A,"), config);
    // "\t\tCall(" puts A at column 8, two of which are the tabs
    assert_eq!(engine.next_line_indent(), format!("\t\t{}", " ".repeat(5)));
}

#[test]
fn method_call_alignment_needs_argument_on_opening_line() {
    let config = IndentConfig {
        align_to_first_method_call_argument: true,
        ..Default::default()
    };
    let engine = engine_with(&format!("{METHOD_PREFIX}\t\tCall(\n"), config);
    // Nothing follows the delimiter, fall back to the unit indent
    assert_eq!(engine.next_line_indent(), "\t\t\t");
}

#[test]
fn indexer_unit_indent() {
    let engine = engine_with(&format!("{METHOD_PREFIX}\t\tx = y[A,"), IndentConfig::default());
    assert_eq!(engine.next_line_indent(), "\t\t\t");
}

#[test]
fn nested_calls_share_one_unit() {
    let engine = engine_with(&format!("{METHOD_PREFIX}\t\tOuter(Inner(A,"), IndentConfig::default());
    assert_eq!(engine.next_line_indent(), "\t\t\t");
}

#[test]
fn unaligned_embedded_ifs_stack() {
    let text = format!("{METHOD_PREFIX}\t\tif (true)\n\t\t\tif (true)\n\t\t\t\tif (true) ");
    let engine = engine_with(&text, unaligned());
    assert_eq!(engine.this_line_indent(), "\t\t\t\t");
    assert_eq!(engine.next_line_indent(), "\t\t\t\t\t");
}

#[test]
fn aligned_embedded_ifs_share_level() {
    let text = format!("{METHOD_PREFIX}\t\tif (true)\n\t\tif (true)\n");
    let engine = engine_with(&text, IndentConfig::default());
    assert_eq!(engine.next_line_indent(), "\t\t\t");
}

#[test]
fn aligned_embedded_usings() {
    let text = format!(
        "{METHOD_PREFIX}\t\tusing (a)\n\t\tusing (b)\n\t\t\tRun();\n\t\tDone();\n\t}}\n}}\n"
    );
    let engine = assert_replay_clean(&text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn unaligned_embedded_usings_stack() {
    let text = format!("{METHOD_PREFIX}\t\tusing (a)\n\t\t\tusing (b)\n");
    let engine = engine_with(&text, unaligned());
    assert_eq!(engine.next_line_indent(), "\t\t\t\t");
}

#[test]
fn embedded_statement_pops_on_semicolon() {
    let text = format!("{METHOD_PREFIX}\t\tif (ready)\n\t\t\tGo();\n");
    let engine = engine_with(&text, IndentConfig::default());
    assert_eq!(engine.next_line_indent(), "\t\t");
}

#[test]
fn brace_coalesces_with_embedded_statement() {
    let text = format!("{METHOD_PREFIX}\t\tif (ready)\n\t\t{{\n");
    let engine = engine_with(&text, IndentConfig::default());
    // No double indent for the braced body of the if
    assert_eq!(engine.next_line_indent(), "\t\t\t");
}

#[test]
fn string_brace_is_inert() {
    let engine = engine("\"{ ");
    assert_eq!(engine.next_line_indent(), "");
    assert!(engine.state().is_string_or_char());
}

#[test]
fn code_brace_is_not_inert() {
    let engine = engine("{ ");
    assert_eq!(engine.next_line_indent(), "\t");
}

#[test]
fn escaped_quote_stays_in_string() {
    // "\"{ ...  the escaped quote does not end the literal
    let engine = engine("\"\\\"{ ");
    assert_eq!(engine.next_line_indent(), "");
    assert_eq!(engine.state(), LexState::StringLiteral);
}

#[test]
fn escaped_backslash_ends_string() {
    // "\\" closes, leaving the brace live code
    let engine = engine("\"\\\\\"{ ");
    assert_eq!(engine.next_line_indent(), "\t");
}

#[test]
fn unterminated_string_recovers_at_newline() {
    let mut engine = engine("x = \"abc\n");
    assert_eq!(engine.state(), LexState::Code);
    assert_eq!(engine.next_line_indent(), "");
    engine.push_str("y();\n");
    assert!(engine.frames().is_empty());
}

#[test]
fn unterminated_char_recovers_at_newline() {
    let engine = engine("c = 'x\n");
    assert_eq!(engine.state(), LexState::Code);
    assert!(engine.frames().is_empty());
}

#[test]
fn escaped_char_literal_quote() {
    let engine = engine("x = '\\'';\n{");
    assert_eq!(engine.next_line_indent(), "\t");
}

#[test]
fn verbatim_string_brace_is_inert() {
    let engine = engine("@\" some \"\"string { \"\"\"\" in a verbatim string \"\" ");
    assert_eq!(engine.next_line_indent(), "");
    assert!(engine.state().is_verbatim());
}

#[test]
fn verbatim_string_double_quote_escape() {
    // @"a""b" is one literal; the brace after it is live code
    let engine = engine("x = @\"a\"\"b\" + \"\";\n{");
    assert_eq!(engine.next_line_indent(), "\t");
}

#[test]
fn verbatim_string_spans_lines() {
    let text = format!(
        "{METHOD_PREFIX}\t\tvar s = @\"line one\nraw two\";\n\t}}\n}}\n"
    );
    let engine = assert_replay_clean(&text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn line_comment_is_inert() {
    let engine = engine("// { [ (\n");
    assert_eq!(engine.next_line_indent(), "");
    assert!(engine.frames().is_empty());
}

#[test]
fn comment_kept_at_first_column() {
    let mut engine = engine("class X\n{\n");
    engine.push_str("// pinned");
    assert_eq!(engine.this_line_indent(), "");
    assert!(!engine.needs_reindent());
}

#[test]
fn comment_first_column_policy_off() {
    let config = IndentConfig {
        keep_comments_at_first_column: false,
        ..Default::default()
    };
    let mut engine = IndentEngine::new(config);
    engine.push_str("class X\n{\n");
    engine.push_str("// pinned");
    assert_eq!(engine.this_line_indent(), "\t");
    assert!(engine.needs_reindent());
}

#[test]
fn indented_comment_follows_block_indent() {
    let mut engine = engine("class X\n{\n");
    engine.push_str("\t// here");
    assert_eq!(engine.this_line_indent(), "\t");
    assert!(!engine.needs_reindent());
}

#[test]
fn multi_line_comment_interior_alignment() {
    let mut engine = engine("class X\n{\n\t/* line 1\n");
    assert_eq!(engine.next_line_indent(), "\t ");
    engine.push_str("\t * line 2");
    assert_eq!(engine.this_line_indent(), "\t ");
    assert!(!engine.needs_reindent());
    engine.push_str("\n\t */");
    assert_eq!(engine.this_line_indent(), "\t ");
    engine.push('\n');
    assert_eq!(engine.next_line_indent(), "\t");
    assert_eq!(engine.state(), LexState::Code);
}

#[test]
fn block_comment_not_closed_by_opening_star() {
    // "/*/" does not terminate the comment it opens
    let engine = engine("/*/ still a comment ");
    assert!(engine.state().is_comment());
}

#[test]
fn preprocessor_directive_lines() {
    let text = "// comment\n#if NOTTHERE\nfoo\n#endif\n";
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert_eq!(engine.next_line_indent(), "");
    assert_eq!(engine.directives().depth(), 0);
    assert!(engine.frames().is_empty());
}

#[test]
fn preprocessor_region_markers() {
    let text = concat!(
        "class X\n",
        "{\n",
        "#region Fields\n",
        "\tint a;\n",
        "#endregion\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
    assert_eq!(engine.directives().markers(), 2);
}

#[test]
fn switch_case_sections() {
    let text = concat!(
        "class C\n",
        "{\n",
        "\tvoid F(int code)\n",
        "\t{\n",
        "\t\tswitch (code)\n",
        "\t\t{\n",
        "\t\t\tcase 0:\n",
        "\t\t\t\tbreak;\n",
        "\t\t\tdefault:\n",
        "\t\t\t\tbreak;\n",
        "\t\t}\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn method_chain_continuation_deep() {
    let text = concat!(
        "class C\n",
        "{\n",
        "\tvoid F()\n",
        "\t{\n",
        "\t\tvar s = x\n",
        "\t\t\t.Foo()\n",
        "\t\t\t.Bar()\n",
        "\t\t\t.Baz();\n",
        "\t\tDone();\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn binary_operator_continuation() {
    let text = concat!(
        "class C\n",
        "{\n",
        "\tvoid F()\n",
        "\t{\n",
        "\t\tint x = 1 +\n",
        "\t\t\t2 +\n",
        "\t\t\t3;\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn do_while_statement() {
    let text = concat!(
        "class C\n",
        "{\n",
        "\tvoid F()\n",
        "\t{\n",
        "\t\tdo\n",
        "\t\t{\n",
        "\t\t\tWork();\n",
        "\t\t}\n",
        "\t\twhile (busy);\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn foreach_and_lock() {
    let text = concat!(
        "class C\n",
        "{\n",
        "\tvoid F()\n",
        "\t{\n",
        "\t\tforeach (var v in vs)\n",
        "\t\t\tUse(v);\n",
        "\t\tlock (gate)\n",
        "\t\t{\n",
        "\t\t\tTouch();\n",
        "\t\t}\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn attribute_lines() {
    let text = concat!(
        "class C\n",
        "{\n",
        "\t[Obsolete]\n",
        "\tvoid F()\n",
        "\t{\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn mismatched_closers_are_tolerated() {
    let mut engine = engine("}\n)\n]\n;\n");
    assert!(engine.frames().is_empty());
    assert_eq!(engine.next_line_indent(), "");
    engine.push_str("{ }\n");
    assert!(engine.frames().is_empty());
}

#[test]
fn wrong_kind_close_leaves_stack_intact() {
    let engine = engine("class C\n{\n\tint x )\n");
    // The stray paren must not pop the type body
    assert_eq!(engine.next_line_indent(), "\t");
}

#[test]
fn needs_reindent_detects_divergence() {
    let mut engine = engine("class C\n{\n");
    engine.push_str("int x");
    assert!(engine.needs_reindent());
    assert_eq!(engine.this_line_indent(), "\t");
    assert_eq!(engine.current_indent(), "");
}

#[test]
fn full_file_replay_basic() {
    let text = concat!(
        "using System;\n",
        "\n",
        "namespace Demo.App\n",
        "{\n",
        "\tclass Counter\n",
        "\t{\n",
        "\t\tint total;\n",
        "\n",
        "\t\tvoid Add(int value)\n",
        "\t\t{\n",
        "\t\t\tif (value > 0)\n",
        "\t\t\t{\n",
        "\t\t\t\ttotal += value;\n",
        "\t\t\t}\n",
        "\t\t\telse\n",
        "\t\t\t{\n",
        "\t\t\t\ttotal -= 1;\n",
        "\t\t\t}\n",
        "\t\t}\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
    assert_eq!(engine.next_line_indent(), "");
}

#[test]
fn full_file_replay_initializers_and_switch() {
    let text = concat!(
        "class Runner\n",
        "{\n",
        "\tstatic readonly int[] Sizes = new int[] {\n",
        "\t\t1,\n",
        "\t\t2,\n",
        "\t};\n",
        "\n",
        "\tstring Describe(int code)\n",
        "\t{\n",
        "\t\tvar label = code\n",
        "\t\t\t.ToString()\n",
        "\t\t\t.Trim();\n",
        "\t\tswitch (code)\n",
        "\t\t{\n",
        "\t\t\tcase 0:\n",
        "\t\t\t\tlabel = \"zero\";\n",
        "\t\t\t\tbreak;\n",
        "\t\t\tdefault:\n",
        "\t\t\t\tlabel = label + \"!\";\n",
        "\t\t\t\tbreak;\n",
        "\t\t}\n",
        "\t\treturn label;\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
}

#[test]
fn full_file_replay_comments_and_directives() {
    let text = concat!(
        "#define TRACE\n",
        "\n",
        "class Logger\n",
        "{\n",
        "\t/* banner\n",
        "\t * more\n",
        "\t */\n",
        "\tvoid Emit(string text)\n",
        "\t{\n",
        "#if TRACE\n",
        "\t\tSystem.Console.WriteLine(\"[\" + text + \"]\");\n",
        "#endif\n",
        "\t\tvar raw = @\"C:\\temp\nline two\";\n",
        "\t}\n",
        "}\n",
    );
    let engine = assert_replay_clean(text, IndentConfig::default());
    assert!(engine.frames().is_empty());
    assert_eq!(engine.directives().depth(), 0);
}
