use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for cmd-audit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new builtin rule
    NewRule {
        /// Tier: critical, high, medium
        #[arg(short, long)]
        tier: String,

        /// Rule ID (e.g., HI-009)
        #[arg(short, long)]
        id: String,

        /// User-facing message (e.g., "Hardcoded webhook secret detected")
        #[arg(short, long)]
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::NewRule { tier, id, message } => new_rule(&tier, &id, &message),
    }
}

fn new_rule(tier: &str, id: &str, message: &str) -> Result<()> {
    let (file_name, severity, prefix) = match tier.to_lowercase().as_str() {
        "critical" | "cr" => ("critical", "Critical", "CR"),
        "high" | "hi" => ("high", "High", "HI"),
        "medium" | "md" => ("medium", "Medium", "MD"),
        _ => bail!("Unknown tier: {}. Valid: critical, high, medium", tier),
    };

    let id_upper = id.to_uppercase();
    let Some((id_prefix, number)) = id_upper.split_once('-') else {
        bail!("ID must be in format XX-NNN (e.g., {}-009)", prefix);
    };
    if id_prefix != prefix {
        bail!("{} rules must use the {}- prefix", file_name, prefix);
    }
    if number.len() != 3 || !number.chars().all(|c| c.is_ascii_digit()) {
        bail!("ID number must be three digits (e.g., {}-009)", prefix);
    }

    let fn_name = id_upper.to_lowercase().replace('-', "_");

    let project_root = find_project_root()?;
    let file_path = project_root
        .join("src/rules/builtin")
        .join(format!("{}.rs", file_name));

    if !file_path.exists() {
        bail!("Tier file not found: {:?}", file_path);
    }

    let content = fs::read_to_string(&file_path)?;

    if content.contains(&format!("fn {}()", fn_name)) {
        bail!("Rule {} already exists in {}.rs", id_upper, file_name);
    }

    let rule_template = generate_rule_template(&fn_name, &id_upper, message, severity);
    let test_template = generate_test_template(&fn_name, &id_upper);
    let new_content = insert_rule(&content, &fn_name, &rule_template, &test_template)?;

    fs::write(&file_path, new_content)?;

    println!("Created rule {} in src/rules/builtin/{}.rs", id_upper, file_name);
    println!();
    println!("Next steps:");
    println!("  1. Write the pattern in fn {}()", fn_name);
    println!("  2. Fill in the cases in test_{}()", fn_name);
    println!("  3. Run: cargo test");
    println!("  4. Run: cargo insta review if the tier snapshot changed");

    Ok(())
}

fn find_project_root() -> Result<PathBuf> {
    let mut path = std::env::current_dir()?;
    loop {
        if path.join("Cargo.toml").exists() && path.join("src/rules/builtin").exists() {
            return Ok(path);
        }
        if !path.pop() {
            bail!("Could not find project root (no Cargo.toml with src/rules/builtin found)");
        }
    }
}

fn generate_rule_template(fn_name: &str, id: &str, message: &str, severity: &str) -> String {
    format!(
        r#"
fn {fn_name}() -> Rule {{
    Rule {{
        id: "{id}",
        severity: Severity::{severity},
        message: "{message}",
        pattern: Regex::new(r"PATTERN").expect("{id}: invalid regex"),
        skip: None,
        min_match_len: None,
    }}
}}"#
    )
}

fn generate_test_template(fn_name: &str, id: &str) -> String {
    format!(
        r#"
    #[test]
    fn test_{fn_name}() {{
        let rule = {fn_name}();
        let cases = [("matching input", true), ("harmless input", false)];

        for (input, should_match) in cases {{
            assert_eq!(rule.pattern.is_match(input), should_match, "{id}: {{input}}");
        }}
    }}"#
    )
}

fn insert_rule(content: &str, fn_name: &str, rule_template: &str, test_template: &str) -> Result<String> {
    let mut lines: Vec<String> = content.lines().map(String::from).collect();

    let list_end = find_rules_list_end(&lines)?;
    lines.insert(list_end, format!("        {}(),", fn_name));

    let rule_idx = find_rule_insert_position(&lines);
    let rule_lines: Vec<String> = rule_template.lines().map(String::from).collect();
    let rule_count = rule_lines.len();
    lines.splice(rule_idx..rule_idx, rule_lines);
    // keep a blank line between the new rule and the test module
    if lines.get(rule_idx + rule_count).is_some_and(|l| !l.trim().is_empty()) {
        lines.insert(rule_idx + rule_count, String::new());
    }

    let test_idx = find_test_insert_position(&lines)?;
    lines.splice(test_idx..test_idx, test_template.lines().map(String::from));

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Index of the `]` closing the `vec![...]` in `pub fn rules()`.
fn find_rules_list_end(lines: &[String]) -> Result<usize> {
    let Some(start) = lines.iter().position(|l| l.starts_with("pub fn rules()")) else {
        bail!("Could not find rules() function to update");
    };
    match lines[start..].iter().position(|l| l.trim() == "]") {
        Some(offset) => Ok(start + offset),
        None => bail!("Could not find the end of the rules() list"),
    }
}

/// Just after the last rule function, before `#[cfg(test)]`.
fn find_rule_insert_position(lines: &[String]) -> usize {
    match lines.iter().position(|l| l.trim() == "#[cfg(test)]") {
        Some(idx) => {
            let mut idx = idx;
            while idx > 0 && lines[idx - 1].trim().is_empty() {
                idx -= 1;
            }
            idx
        }
        None => lines.len(),
    }
}

fn find_test_insert_position(lines: &[String]) -> Result<usize> {
    let mut test_module_start = None;
    let mut brace_depth = 0i32;

    for (i, line) in lines.iter().enumerate() {
        if test_module_start.is_none() && line.trim_start().starts_with("mod tests") {
            test_module_start = Some(i);
        }
        if test_module_start.is_some() {
            brace_depth += line.matches('{').count() as i32;
            brace_depth -= line.matches('}').count() as i32;
            if brace_depth == 0 {
                return Ok(i);
            }
        }
    }

    bail!("Could not find test module closing brace")
}
