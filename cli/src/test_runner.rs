use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use htmlpp::{Report, Severity};
use processor::{Context, VariableStore};
use serde::Deserialize;

const FIXTURE_SUFFIX: &str = ".test.html";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based document line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Variables seeded before processing, like `--var`.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Severity threshold. Defaults to serious.
    #[serde(default, deserialize_with = "crate::config::severity")]
    pub exit_on: Option<Severity>,

    /// Expected document (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected abort; the fatal report's message must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Expected warnings. If present (even empty), count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    /// Expected dependency list, include paths as written.
    #[serde(default)]
    pub expect_deps: Option<Vec<String>>,
}

/// Split a fixture into its TOML front matter and the document below it.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- front matter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- front matter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + "\n---".len()..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {e}"))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or("?", |name| name.trim_end_matches(FIXTURE_SUFFIX))
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {e}")),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("front matter error: {e}")),
    };
    let description = config.description.clone();

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let variables: VariableStore = config.vars.clone().into_iter().collect();
    let mut ctx = Context::new()
        .with_variables(variables)
        .with_threshold(config.exit_on.unwrap_or_default())
        .with_base_dir(base_dir);

    let result = processor::process(source, &mut ctx);

    let failure = match (&config.expect_error, &config.expect_output, &result) {
        (Some(expected_err), _, Err(err)) => {
            let err_str = err.to_string();
            (!err_str.contains(expected_err.as_str()))
                .then(|| format!("expected error containing \"{expected_err}\", got: {err_str}"))
        }
        (Some(expected_err), _, Ok(_)) => Some(format!(
            "expected error containing \"{expected_err}\", but processing succeeded"
        )),
        (None, _, Err(err)) => Some(format!("unexpected error: {err}")),
        (None, Some(expected_output), Ok(actual)) => {
            let actual = actual.trim();
            let expected = expected_output.trim();
            (actual != expected)
                .then(|| format!("output mismatch\n  expected: {expected}\n  actual:   {actual}"))
        }
        (None, None, Ok(_)) => None,
    };
    if let Some(reason) = failure {
        return fail(description, reason);
    }

    if let Some(expected_warnings) = &config.expect_warnings {
        if let Some(reason) = check_warnings(source, ctx.diagnostics(), expected_warnings) {
            return fail(description, reason);
        }
    }

    if let Some(expected_deps) = &config.expect_deps {
        if *expected_deps != ctx.dependencies {
            return fail(
                description,
                format!(
                    "dependency mismatch\n  expected: {expected_deps:?}\n  actual:   {:?}",
                    ctx.dependencies
                ),
            );
        }
    }

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Pass,
    }
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

/// Check recorded warnings against expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(source: &str, warnings: &[Report], expected: &[ExpectedWarning]) -> Option<String> {
    if warnings.len() != expected.len() {
        let actual_msgs: Vec<String> = warnings.iter().map(|w| format!("    - {w}")).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in warnings.iter().zip(expected).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "warning[{i}]: expected message containing \"{}\", got: {actual}",
                expected.contains
            ));
        }

        let Some(expected_line) = expected.line else {
            continue;
        };
        let Some(span) = &actual.span else {
            return Some(format!(
                "warning[{i}]: expected on line {expected_line}, but warning has no span"
            ));
        };
        let actual_line = byte_offset_to_line(source, span.start);
        if actual_line != expected_line {
            return Some(format!(
                "warning[{i}]: expected on line {expected_line}, but span is on line {actual_line}"
            ));
        }
    }

    None
}

/// Discover fixtures grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(FIXTURE_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {FIXTURE_SUFFIX} files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{s}\x1b[0m")
    }
}

/// Pick the categories to run. Unknown names only warn.
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let before = selected.len();
        for (category, files) in all {
            if category == req || category.starts_with(&format!("{req}/")) {
                selected.insert(category.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{req}' not found (available: {})",
                all.keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

/// Run every fixture under `path` (or a single file). With `categories`
/// non-empty, only those subfolders run. Returns 0 when all pass, 1 otherwise.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let all_categories = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if all_categories.is_empty() {
        eprintln!("no {FIXTURE_SUFFIX} files found in {}", path.display());
        return 1;
    }

    let run_categories = if path.is_file() {
        select(&all_categories, &[])
    } else {
        select(&all_categories, categories)
    };
    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (category, files) in &run_categories {
        eprintln!();
        eprintln!("{}", bold(category_label(category), no_color));

        for file in *files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {line}");
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {ok}. {passed} passed, 0 failed");
        0
    } else {
        let verdict = if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" };
        eprintln!(
            "test result: {verdict}. {passed} passed, {failed} failed (of {})",
            passed + failed
        );
        1
    }
}
