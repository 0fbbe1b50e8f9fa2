use super::Context;
use crate::cli::{AddEqArgs, ImportArgs, InitArgs, ListEqArgs, ShowEqArgs};
use crate::error::{CliError, Result};
use codex_core::catalog::{catalog_json, load_catalog};
use codex_core::file_io::save_archive;
use codex_core::symbols;
use codex_core::{Archive, CodexError, Equation, FileLock, MergePolicy};
use serde_json::json;
use std::path::Path;
use tracing::info;

pub fn init(ctx: &Context, args: &InitArgs) -> Result<()> {
    let path = &ctx.config.archive_path;
    if path.exists() && !args.force {
        return Err(CliError::Argument(format!(
            "archive {} already exists (use --force to replace it)",
            path.display()
        )));
    }

    let mut ledger = ctx.open_ledger()?;
    let _lock = FileLock::acquire(path, &ctx.config.user)?;
    let archive = if args.seed {
        Archive::seeded(&args.title, &ctx.config.user)
    } else {
        Archive::new(&args.title, &ctx.config.user)
    };
    save_archive(&archive, path)?;
    info!("Created archive {:?} with {} equations", path, archive.equations.len());

    ctx.record(
        ledger.as_mut(),
        "init",
        json!({"title": args.title, "equations": archive.equations.len()}),
    )?;
    println!(
        "Created archive '{}' at {} ({} equations)",
        args.title,
        path.display(),
        archive.equations.len()
    );
    Ok(())
}

pub fn add_eq(ctx: &Context, args: &AddEqArgs) -> Result<()> {
    let equation = Equation::new(&args.id, &args.name, &args.formula)
        .with_description(&args.description)
        .with_classification(&args.classification)
        .with_variables(args.variables.iter().cloned())
        .with_origin(&args.origin);

    let replaced = ctx.with_archive_mut("add_eq", |archive| {
        if args.strict && archive.equations.contains(&equation.id) {
            return Err(CodexError::duplicate_id(&equation.id).into());
        }
        let replaced = archive.add_equation(equation)?.is_some();
        let payload = json!({"id": args.id, "classification": args.classification, "replaced": replaced});
        Ok((replaced, payload))
    })?;

    if replaced {
        println!("Replaced {}", args.id);
    } else {
        println!("Registered {}", args.id);
    }
    Ok(())
}

pub fn list_eq(ctx: &Context, args: &ListEqArgs) -> Result<()> {
    let archive = ctx.load_archive()?;
    let equations: Vec<&Equation> = archive
        .equations
        .iter()
        .filter(|eq| args.classification.as_ref().map_or(true, |c| &eq.classification == c))
        .filter(|eq| args.origin.as_ref().map_or(true, |o| &eq.origin == o))
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&equations).map_err(CodexError::serialization)?;
        println!("{}", json);
    } else {
        for eq in &equations {
            println!("{}", eq.summary_line());
        }
        println!("{} equation(s)", equations.len());
    }
    Ok(())
}

pub fn show_eq(ctx: &Context, args: &ShowEqArgs) -> Result<()> {
    let archive = ctx.load_archive()?;
    let eq = archive
        .equations
        .get(&args.id)
        .ok_or_else(|| CodexError::equation_not_found(&args.id))?;

    if args.json {
        let json = serde_json::to_string_pretty(eq).map_err(CodexError::serialization)?;
        println!("{}", json);
    } else {
        println!("{} - {}", eq.id, eq.name);
        println!("  formula:        {}", eq.formula);
        println!("  description:    {}", eq.description);
        println!("  classification: {}", eq.classification);
        println!("  variables:      {}", eq.variables.join(", "));
        println!("  origin:         {}", eq.origin);
    }
    Ok(())
}

pub fn remove_eq(ctx: &Context, id: &str) -> Result<()> {
    let removed = ctx.with_archive_mut("remove_eq", |archive| {
        let removed = archive.remove_equation(id)?;
        let payload = json!({"id": removed.id});
        Ok((removed, payload))
    })?;
    println!("Removed {}", removed.id);
    Ok(())
}

pub fn classes(ctx: &Context) -> Result<()> {
    let archive = ctx.load_archive()?;
    for (tag, count) in archive.equations.classifications() {
        let tag = if tag.is_empty() { "(none)".to_string() } else { tag };
        println!("{:>4}  {}", count, tag);
    }
    Ok(())
}

pub fn search(ctx: &Context, text: &str) -> Result<()> {
    let archive = ctx.load_archive()?;
    let found = archive.equations.search(text);
    for eq in &found {
        println!("{}", eq.summary_line());
    }
    println!("{} match(es)", found.len());
    Ok(())
}

pub fn import(ctx: &Context, args: &ImportArgs) -> Result<()> {
    let incoming = load_catalog(&args.input)?;
    let policy: MergePolicy = args.policy.into();
    info!("Importing {} equations from {:?} ({:?})", incoming.len(), args.input, policy);

    let report = ctx.with_archive_mut("import", |archive| {
        let report = archive.equations.merge(incoming, policy)?;
        archive.touch();
        let payload = json!({
            "file": args.input.display().to_string(),
            "added": report.added,
            "replaced": report.replaced,
            "skipped": report.skipped,
        });
        Ok((report, payload))
    })?;
    println!(
        "Imported {}: {} added, {} replaced, {} skipped",
        args.input.display(),
        report.added.len(),
        report.replaced.len(),
        report.skipped.len()
    );
    Ok(())
}

pub fn export(ctx: &Context, output: &Path) -> Result<()> {
    let archive = ctx.load_archive()?;
    let json = catalog_json(&archive.equations)?;
    std::fs::write(output, json)?;
    println!("Exported {} equations to {}", archive.equations.len(), output.display());
    Ok(())
}

pub fn scan_symbols(ctx: &Context, id: Option<&str>) -> Result<()> {
    let archive = ctx.load_archive()?;
    let targets: Vec<&Equation> = match id {
        Some(id) => vec![archive
            .equations
            .get(id)
            .ok_or_else(|| CodexError::equation_not_found(id))?],
        None => archive.equations.list(),
    };

    let mut inconsistent = 0;
    for eq in &targets {
        let report = symbols::scan(eq);
        if report.is_consistent() {
            continue;
        }
        inconsistent += 1;
        println!("{}", eq.id);
        if !report.undeclared.is_empty() {
            println!("  undeclared: {}", report.undeclared.join(", "));
        }
        if !report.unused.is_empty() {
            println!("  unused:     {}", report.unused.join(", "));
        }
    }
    println!("{} of {} equation(s) scanned have mismatched symbols", inconsistent, targets.len());
    Ok(())
}
