use std::fs;

use htmlpp::{Condition, NavEntry, Severity};
use pretty_assertions::assert_eq;
use processor::{Context, ProcessError, VariableStore, process};

fn run(source: &str) -> String {
    let mut ctx = Context::new();
    process(source, &mut ctx).expect("processing failed")
}

fn run_with(source: &str, ctx: &mut Context) -> String {
    process(source, ctx).expect("processing failed")
}

const FRAME_HEAD: &str = "<div class=\"sidenav\">\n<ul>\n    <li class=\"menudrop\">&#9776;</li>\n";
const FRAME_TAIL: &str = "</ul>\n</div>\n";

fn link(label: &str, target: &str) -> String {
    format!("<li class=\"sidenav_link\"><a href=\"{target}\">{label}</a></li>\n")
}

fn section(label: &str) -> String {
    format!("<li class=\"sidenav_section\">{label}</li>\n")
}

#[test]
fn passthrough() {
    let doc = "<html>\n<body>\n<p>plain</p>\n<!-- a comment -->\n</body>\n</html>\n";
    assert_eq!(run(doc), doc);
}

#[test]
fn empty_document() {
    assert_eq!(run(""), "");
}

#[test]
fn set_then_reference() {
    assert_eq!(run("<!--#set x hello-->#$(x)"), "hello");
}

#[test]
fn unset_reference_is_empty() {
    assert_eq!(run("<p>#$(missing)</p>\n"), "<p></p>\n");
}

#[test]
fn values_are_trimmed_of_spaces() {
    let mut ctx = Context::new().with_variables(VariableStore::from_iter([("x", "  padded  ")]));
    assert_eq!(run_with("[#$(x)]", &mut ctx), "[padded]");
}

#[test]
fn directive_arguments_see_variables() {
    assert_eq!(
        run("<!--#set a one-->\n<!--#set b #$(a) two-->\n#$(b)\n"),
        "one two\n"
    );
}

#[test]
fn default_does_not_override() {
    let doc = "<!--#set x first-->\n<!--#default x second-->\n<!--#default y third-->\n#$(x) #$(y)\n";
    assert_eq!(run(doc), "first third\n");
}

#[test]
fn default_yields_to_command_line_value() {
    let mut ctx = Context::new().with_variables(VariableStore::from_iter([("mode", "cli")]));
    assert_eq!(
        run_with("<!--#default mode page-->\n#$(mode)\n", &mut ctx),
        "cli\n"
    );
}

#[test]
fn conditional_map_selects_matching_branch() {
    let doc = "<!--#set lang de--><!--#set greeting lang?{*:Hello,en:Hi,de:Hallo}-->#$(greeting)";
    assert_eq!(run(doc), "Hallo");
}

#[test]
fn conditional_map_wildcard_after_exact_match_wins() {
    let doc = "<!--#set lang en--><!--#set greeting lang?{en:Hi,de:Hallo,*:Hello}-->#$(greeting)";
    assert_eq!(run(doc), "Hello");
}

#[test]
fn conditional_map_with_semicolons() {
    let doc = "<!--#set lang en--><!--#set text lang?{en:a, b;de:c, d}-->#$(text)";
    assert_eq!(run(doc), "a, b");
}

#[test]
fn conditional_map_on_unset_dependency_empties_target() {
    let doc = "<!--#set t keep-->\n<!--#set t nope?{*:changed}-->\n[#$(t)]\n";
    assert_eq!(run(doc), "[]\n");
}

#[test]
fn conditional_map_without_match_empties_target() {
    let doc = "<!--#set lang fr-->\n<!--#set t keep-->\n<!--#set t lang?{en:Hi}-->\n[#$(t)]\n";
    assert_eq!(run(doc), "[]\n");
}

#[test]
fn comment_and_uncomment() {
    assert_eq!(
        run("<!--#comment <p>hidden</p>-->\n<!--#uncomment <p>shown</p>-->\n"),
        "<!-- <p>hidden</p> -->\n<p>shown</p>\n"
    );
}

#[test]
fn inline_directive_keeps_surrounding_text() {
    assert_eq!(
        run("<p>before <!--#set x 1-->after #$(x)</p>\n"),
        "<p>before after 1</p>\n"
    );
}

#[test]
fn sidebar_from_headings() {
    let doc = "<h2 id=\"a\">Intro</h2>\n<!--#sidenav include-->\n";
    let expected = format!(
        "<h2 id=\"a\">Intro</h2>\n{FRAME_HEAD}{}{FRAME_TAIL}",
        link("Intro", "#a")
    );
    assert_eq!(run(doc), expected);
}

#[test]
fn sidebar_sees_headings_after_the_anchor() {
    let doc = "<nav><!--#sidenav include--></nav>\n<h2 id=\"one\">One</h2>\n<h3 id=\"two\">Two <em>!</em></h3>\n";
    let expected = format!(
        "<nav>{FRAME_HEAD}{}{}{FRAME_TAIL}</nav>\n<h2 id=\"one\">One</h2>\n<h3 id=\"two\">Two <em>!</em></h3>\n",
        link("One", "#one"),
        link("Two !", "#two")
    );
    assert_eq!(run(doc), expected);
}

#[test]
fn sidebar_modifiers() {
    let doc = concat!(
        "<!--#sidenav include-->\n",
        "<!--#sidenav section Guide-->\n",
        "<!--#sidenav skip-->\n",
        "<h2 id=\"hidden\">Hidden</h2>\n",
        "<!--#sidenav name Short-->\n",
        "<h2 id=\"long\">A very long title</h2>\n",
        "<!--#sidenav custom href=\"other.html\" name=\"Other\"-->\n",
    );
    let expected = format!(
        "{FRAME_HEAD}{}{}{}{FRAME_TAIL}<h2 id=\"hidden\">Hidden</h2>\n<h2 id=\"long\">A very long title</h2>\n",
        section("Guide"),
        link("Short", "#long"),
        link("Other", "other.html")
    );
    assert_eq!(run(doc), expected);
}

#[test]
fn duplicate_targets_keep_the_latest() {
    let doc = concat!(
        "<!--#sidenav custom href=\"#x\" name=\"First\"-->\n",
        "<!--#sidenav custom href=\"#y\" name=\"Y\"-->\n",
        "<!--#sidenav custom href=\"#x\" name=\"Second\"-->\n",
        "<!--#sidenav include-->\n",
    );
    let expected = format!(
        "{FRAME_HEAD}{}{}{FRAME_TAIL}",
        link("Y", "#y"),
        link("Second", "#x")
    );
    assert_eq!(run(doc), expected);
}

#[test]
fn headings_inside_variables_are_found() {
    let mut ctx = Context::new().with_variables(VariableStore::from_iter([(
        "title",
        "<h1 id=\"top\">Top</h1>",
    )]));
    let out = run_with("#$(title)\n<!--#sidenav include-->\n", &mut ctx);
    assert!(out.contains(&link("Top", "#top")));
    assert_eq!(ctx.sidebar.entries().len(), 1);
}

#[test]
fn heading_containing_a_comment_is_found() {
    let mut ctx = Context::new();
    let out = run_with(
        "<h2 id=\"a\">Intro <!-- todo --></h2>\n<!--#sidenav include-->\n",
        &mut ctx,
    );
    assert_eq!(ctx.sidebar.entries().len(), 1);
    assert_eq!(
        out,
        format!(
            "<h2 id=\"a\">Intro <!-- todo --></h2>\n{FRAME_HEAD}{}{FRAME_TAIL}",
            link("Intro", "#a")
        )
    );
}

#[test]
fn heading_containing_a_directive_is_found_once() {
    let mut ctx = Context::new();
    let out = run_with(
        "<h2 id=\"a\"><!--#set x 1-->Intro</h2>\n<!--#sidenav include-->\n",
        &mut ctx,
    );
    assert_eq!(ctx.sidebar.entries().len(), 1);
    assert_eq!(
        out,
        format!(
            "<h2 id=\"a\">Intro</h2>\n{FRAME_HEAD}{}{FRAME_TAIL}",
            link("Intro", "#a")
        )
    );
}

#[test]
fn skip_before_heading_on_the_same_line() {
    let mut ctx = Context::new();
    run_with(
        "<!--#sidenav skip--><h2 id=\"a\">A</h2>\n<h2 id=\"b\">B</h2>\n",
        &mut ctx,
    );
    assert_eq!(
        ctx.sidebar.entries(),
        &[NavEntry::Link {
            label: "B".to_string(),
            target: "#b".to_string(),
        }]
    );
}

#[test]
fn unknown_command_is_light() {
    let mut ctx = Context::new();
    let out = run_with("<!--#frobnicate now-->\nrest\n", &mut ctx);
    assert_eq!(out, "rest\n");
    assert_eq!(ctx.diagnostics().len(), 1);
    assert_eq!(ctx.diagnostics()[0].condition, Condition::UnknownCommand);
    assert!(ctx.diagnostics()[0].message.contains("frobnicate"));
    assert!(ctx.diagnostics()[0].message.contains("include"));
}

#[test]
fn unknown_command_aborts_at_light_threshold() {
    let mut ctx = Context::new().with_threshold(Severity::Light);
    let err = process("<!--#frobnicate-->", &mut ctx).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(matches!(err, ProcessError::Aborted(_)));
}

#[test]
fn invalid_sidenav_command_is_light() {
    let mut ctx = Context::new();
    run_with("<!--#sidenav explode-->\n", &mut ctx);
    assert_eq!(
        ctx.diagnostics()[0].condition,
        Condition::UnknownSidenavCommand
    );
}

#[test]
fn unterminated_comment_is_reported_once() {
    let mut ctx = Context::new();
    let doc = "<p>start</p>\n<!-- never closed\n<p>end</p>\n";
    assert_eq!(run_with(doc, &mut ctx), doc);
    assert_eq!(ctx.diagnostics().len(), 1);
    let report = &ctx.diagnostics()[0];
    assert_eq!(report.condition, Condition::UnterminatedComment);
    assert_eq!(report.span, Some(13..30));
}

#[test]
fn include_splices_file_and_records_dependency() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("part.html"), "<p>part #$(x)</p>\n").unwrap();

    let mut ctx = Context::new().with_base_dir(dir.path());
    let out = run_with(
        "<!--#set x 1-->\n<!--#include part.html-->\n<!--#include part.html-->\n",
        &mut ctx,
    );
    assert_eq!(out, "<p>part 1</p>\n<p>part 1</p>\n");
    assert_eq!(ctx.dependencies, vec!["part.html", "part.html"]);
}

#[test]
fn included_directives_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("nested.html"),
        "<!--#set who nested-->\n<h2 id=\"n\">Nested</h2>\n",
    )
    .unwrap();
    fs::write(dir.path().join("outer.html"), "<!--#include nested.html-->\n").unwrap();

    let mut ctx = Context::new().with_base_dir(dir.path());
    let out = run_with("<!--#include outer.html-->\n#$(who)\n", &mut ctx);
    assert_eq!(out, "<h2 id=\"n\">Nested</h2>\nnested\n");
    assert_eq!(ctx.dependencies, vec!["outer.html", "nested.html"]);
    assert_eq!(ctx.sidebar.entries().len(), 1);
}

#[test]
fn markdown_include_is_converted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.md"), "# Notes\n\nSome *text*.\n").unwrap();

    let mut ctx = Context::new().with_base_dir(dir.path());
    let out = run_with("<!--#include notes.md-->", &mut ctx);
    assert!(out.contains("<h1>Notes</h1>"));
    assert!(out.contains("<em>text</em>"));
}

#[test]
fn missing_include_is_serious() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = Context::new().with_base_dir(dir.path());
    let err = process("<!--#include nope.html-->", &mut ctx).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(ctx.dependencies.is_empty());

    let mut ctx = Context::new()
        .with_base_dir(dir.path())
        .with_threshold(Severity::Critical);
    let out = run_with("<!--#include nope.html-->\n", &mut ctx);
    assert_eq!(out, "<!-- Could not include 'nope.html' -->\n");
    assert_eq!(ctx.diagnostics()[0].condition, Condition::IncludeNotFound);
}

#[test]
fn self_include_hits_the_expansion_limit() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("loop.html"), "<!--#include loop.html-->\n").unwrap();

    let mut ctx = Context::new().with_base_dir(dir.path());
    let err = process("<!--#include loop.html-->\n", &mut ctx).unwrap_err();
    assert!(matches!(err, ProcessError::ExpansionLimit(_)));
}

#[test]
fn crlf_line_endings_survive() {
    assert_eq!(
        run("<!--#set x y-->\r\n<p>#$(x)</p>\r\n"),
        "\r\n<p>y</p>\r\n"
    );
}
