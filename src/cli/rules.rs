//! Rules command - list the built-in risk rules

use anyhow::Result;
use console::style;

use archrisk::models::RiskCategory;
use archrisk::rules::builtin_rules;

fn categories() -> Vec<RiskCategory> {
    builtin_rules().iter().map(|rule| rule.category()).collect()
}

/// Run the rules command
pub(super) fn run(json: bool) -> Result<()> {
    let categories = categories();

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    println!("\n{} ({})\n", style("Built-in rules").bold(), categories.len());
    for category in &categories {
        println!(
            "  {}  {}",
            style(format!("{:<32}", category.id)).cyan(),
            category.title
        );
        println!(
            "  {:<32}  {}",
            "",
            style(format!("{:?} / CWE-{}", category.stride, category.cwe)).dim()
        );
    }
    println!(
        "\nSkip a rule with {} or list it under [rules] skip in archrisk.toml.",
        style("--skip-rule <ID>").yellow()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_serializable() {
        let json = serde_json::to_string(&categories()).expect("serialize");
        assert!(json.contains("\"missing-waf\""));
        assert!(json.contains("\"unguarded-direct-datastore-access\""));
    }
}
