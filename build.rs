use grep::regex::RegexMatcher;
use grep::searcher::{Searcher, Sink, SinkMatch};
use std::error::Error;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Directories holding this crate's Rust sources.
const SOURCE_DIRS: [&str; 6] = ["lasso", "simulate", "report", "cli", "tests", "benches"];

/// A source rule enforced at build time.
struct Rule {
    name: &'static str,
    pattern: &'static str,
    advice: &'static str,
    skip_comments_and_strings: bool,
}

const RULES: [Rule; 2] = [
    Rule {
        name: "underscore-prefixed variables",
        pattern: r"\b(_[a-zA-Z0-9_]+)\b",
        advice: "Either use the variable (removing the underscore) or remove it completely.",
        skip_comments_and_strings: true,
    },
    Rule {
        name: "#[allow(dead_code)] attributes",
        pattern: r"#\s*\[\s*allow\s*\(\s*dead_code\s*\)\s*\]",
        advice: "Delete the unused item instead of silencing the lint.",
        skip_comments_and_strings: false,
    },
];

// Collects every matching line of one file for one rule.
struct ViolationCollector<'r> {
    rule: &'r Rule,
    violations: Vec<String>,
    file_path: PathBuf,
}

impl<'r> ViolationCollector<'r> {
    fn new(rule: &'r Rule, file_path: &Path) -> Self {
        Self {
            rule,
            violations: Vec::new(),
            file_path: file_path.to_path_buf(),
        }
    }

    fn check_and_get_error_message(&self) -> Option<String> {
        if self.violations.is_empty() {
            return None;
        }

        let file_name = self.file_path.to_str().unwrap_or("?");
        let mut error_msg = format!(
            "\n❌ ERROR: Found {} {} in {}:\n",
            self.violations.len(),
            self.rule.name,
            file_name
        );
        for violation in &self.violations {
            error_msg.push_str(&format!("   {violation}\n"));
        }
        error_msg.push_str(&format!(
            "\n⚠️ {} are not allowed in this project.\n   {}\n",
            self.rule.name, self.rule.advice
        ));

        Some(error_msg)
    }
}

fn is_comment_or_string(line_text: &str) -> bool {
    if line_text.trim_start().starts_with("//") {
        return true;
    }
    // Odd-numbered segments between quotes are string contents.
    line_text
        .split('"')
        .enumerate()
        .any(|(i, part)| i % 2 == 1 && part.contains('_'))
}

impl Sink for ViolationCollector<'_> {
    type Error = std::io::Error;

    fn matched(&mut self, _: &Searcher, mat: &SinkMatch) -> Result<bool, Self::Error> {
        let line_number = mat.line_number().unwrap_or(0);
        let line_text = std::str::from_utf8(mat.bytes()).unwrap_or("").trim_end();

        if self.rule.skip_comments_and_strings && is_comment_or_string(line_text) {
            return Ok(true);
        }

        self.violations.push(format!("{line_number}:{line_text}"));
        Ok(true)
    }
}

fn scan(rule: &Rule) -> Result<(), Box<dyn Error>> {
    let matcher = RegexMatcher::new_line_matcher(rule.pattern)?;
    let mut searcher = Searcher::new();

    for dir in SOURCE_DIRS {
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        {
            let path = entry.path();
            let mut collector = ViolationCollector::new(rule, path);
            searcher.search_path(&matcher, path, &mut collector)?;
            if let Some(error_message) = collector.check_and_get_error_message() {
                return Err(error_message.into());
            }
        }
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for dir in SOURCE_DIRS {
        println!("cargo:rerun-if-changed={dir}");
    }

    for rule in &RULES {
        if let Err(e) = scan(rule) {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
