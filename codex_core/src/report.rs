//! # Catalog Reports
//!
//! Plain-text and markdown renderings of a [`Library`]:
//!
//! - [`generate_catalog_markdown`] - reference document grouped by classification
//! - [`demo_report`] - the sample lookups printed by `codex demo`

use crate::registry::Library;
use crate::symbols;

/// Generate a markdown reference of every equation in a library.
///
/// Equations are grouped by classification in first-seen order.
pub fn generate_catalog_markdown(library: &Library) -> String {
    let mut output = String::with_capacity(16_000);

    output.push_str(
        r#"# Codex Equation Catalog

> **Auto-generated from the catalog data. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-catalog`

Formulas are reproduced exactly as recorded. They are descriptive text and
are not evaluated.

---

"#,
    );

    let classifications = library.classifications();

    for (tag, _) in &classifications {
        let heading = if tag.is_empty() { "Unclassified" } else { tag.as_str() };
        output.push_str(&format!("## {}\n\n", heading));

        for eq in library.find_by_classification(tag) {
            output.push_str(&format!("### {} ({})\n\n", eq.name, eq.id));

            if !eq.description.is_empty() {
                output.push_str(&format!("{}\n\n", eq.description));
            }

            output.push_str(&format!("**Formula:** `{}`\n\n", eq.formula));

            if !eq.variables.is_empty() {
                let vars: Vec<String> = eq.variables.iter().map(|v| format!("`{}`", v)).collect();
                output.push_str(&format!("**Variables:** {}\n\n", vars.join(", ")));
            }

            if !eq.origin.is_empty() {
                output.push_str(&format!("**Origin:** {}\n\n", eq.origin));
            }

            let report = symbols::scan(eq);
            if !report.undeclared.is_empty() {
                output.push_str(&format!(
                    "**Undeclared symbols:** {}\n\n",
                    report.undeclared.join(", ")
                ));
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Classifications:** {}\n",
        library.len(),
        classifications.len()
    ));

    output
}

/// Sample lookups over a library: totals, one listing per classification
/// and the first entry in full.
pub fn demo_report(library: &Library) -> String {
    let mut output = String::new();

    output.push_str(&format!("Registered equations: {}\n\n", library.len()));

    for (tag, count) in library.classifications() {
        output.push_str(&format!("== {} ({}) ==\n", tag, count));
        for eq in library.find_by_classification(&tag) {
            output.push_str(&format!("  {}\n", eq.summary_line()));
        }
        output.push('\n');
    }

    if let Some(first) = library.list().first() {
        output.push_str(&format!("Lookup {}:\n", first.id));
        output.push_str(&format!("  name:           {}\n", first.name));
        output.push_str(&format!("  formula:        {}\n", first.formula));
        output.push_str(&format!("  description:    {}\n", first.description));
        output.push_str(&format!("  classification: {}\n", first.classification));
        output.push_str(&format!("  variables:      {}\n", first.variables.join(", ")));
        output.push_str(&format!("  origin:         {}\n", first.origin));
    }

    output
}
