// Build-time validation of the field extraction patterns
use regex::Regex;
use std::fs::File;
use std::io::Write;

/// Every regex the line parser uses, in lookup order.
const PATTERNS: &[(&str, &str)] = &[
    (r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}", "iso_timestamp"),
    (r"node_id[=:](\w+)", "node_id_field"),
    (r"user[=:]([^\s,]+)", "user_field"),
    (r"src[=:](\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})", "src_field"),
    (r"dst[=:](\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})", "dst_field"),
    (r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b", "ipv4_token"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut invalid_patterns = Vec::new();
    for &(pattern, name) in PATTERNS {
        if let Err(e) = Regex::new(pattern) {
            invalid_patterns.push((pattern, name, e));
        }
    }

    if !invalid_patterns.is_empty() {
        let mut error_msg = String::from("Build failed due to invalid regex patterns:\n");
        for (pattern, name, error) in &invalid_patterns {
            error_msg.push_str(&format!("  - '{name}': {error} (pattern: {pattern})\n"));
        }
        panic!("{}", error_msg);
    }

    if let Err(e) = generate_validated_regexes(PATTERNS) {
        panic!("Failed to generate regex patterns: {e}");
    }
}

fn generate_validated_regexes(patterns: &[(&str, &str)]) -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::var("OUT_DIR")?;
    let dest_path = std::path::Path::new(&out_dir).join("validated_regexes.rs");
    let mut file = File::create(dest_path)?;

    writeln!(file, "// Auto-generated regex patterns (validated by build.rs)")?;
    writeln!(file, "use crate::parser::regex_patterns::StaticRegexSet;")?;
    writeln!(file)?;
    writeln!(file, "/// Field extraction patterns used by the line parser")?;
    writeln!(file, "pub static VALIDATED_PATTERNS: StaticRegexSet = StaticRegexSet::new(&[")?;
    for (pattern, name) in patterns {
        writeln!(file, "    (r#\"{pattern}\"#, \"{name}\"),")?;
    }
    writeln!(file, "]);")?;
    writeln!(file)?;

    writeln!(file, "/// Pattern indices for type-safe access")?;
    writeln!(file, "pub mod pattern_index {{")?;
    for (i, (_, name)) in patterns.iter().enumerate() {
        writeln!(file, "    pub const {}: usize = {};", name.to_uppercase(), i)?;
    }
    writeln!(file, "}}")?;
    writeln!(file)?;

    writeln!(file, "/// Pattern name lookup")?;
    writeln!(file, "pub fn get_pattern_name(index: usize) -> Option<&'static str> {{")?;
    writeln!(file, "    match index {{")?;
    for (i, (_, name)) in patterns.iter().enumerate() {
        writeln!(file, "        {i} => Some(\"{name}\"),")?;
    }
    writeln!(file, "        _ => None,")?;
    writeln!(file, "    }}")?;
    writeln!(file, "}}")?;

    Ok(())
}
