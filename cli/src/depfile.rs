use std::path::Path;

/// Make-style dependency line: `<output>: <dep>...`.
///
/// `deps` are the included paths as written, in discovery order. The target
/// itself is listed last when the output is a different file.
pub fn render(output: &Path, target: &Path, deps: &[String]) -> String {
    let mut line = format!("{}:", output.display());
    for dep in deps {
        line.push(' ');
        line.push_str(dep);
    }
    if output != target {
        line.push(' ');
        line.push_str(&target.display().to_string());
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_includes_then_target() {
        let deps = vec!["header.html".to_string(), "notes.md".to_string()];
        assert_eq!(
            render(Path::new("out/index.html"), Path::new("index.html"), &deps),
            "out/index.html: header.html notes.md index.html\n"
        );
    }

    #[test]
    fn in_place_output_omits_target() {
        let deps = vec!["header.html".to_string()];
        assert_eq!(
            render(Path::new("index.html"), Path::new("index.html"), &deps),
            "index.html: header.html\n"
        );
    }

    #[test]
    fn no_dependencies() {
        assert_eq!(render(Path::new("a"), Path::new("a"), &[]), "a:\n");
    }
}
