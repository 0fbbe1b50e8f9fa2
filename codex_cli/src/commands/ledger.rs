use super::Context;
use crate::error::{CliError, Result};
use codex_core::catalog;
use codex_core::ledger::load_ledger;
use codex_core::report::demo_report;
use codex_core::LedgerFile;
use serde_json::Value;
use tracing::info;

pub fn log(ctx: &Context, event: &str, payload: &str) -> Result<()> {
    let payload: Value = serde_json::from_str(payload)
        .map_err(|e| CliError::Argument(format!("payload is not valid JSON: {}", e)))?;

    let mut ledger = LedgerFile::open(&ctx.config.ledger_path)?;
    let block = ledger.append(event, payload)?;
    println!("Block {} {}", block.index, block.hash);
    Ok(())
}

pub fn chain(ctx: &Context, event: Option<&str>) -> Result<()> {
    let path = &ctx.config.ledger_path;
    if !path.exists() {
        println!("No ledger at {}", path.display());
        return Ok(());
    }

    let ledger = load_ledger(path)?;
    let blocks: Vec<_> = match event {
        Some(event) => ledger.find_by_event(event),
        None => ledger.blocks().iter().collect(),
    };
    for block in &blocks {
        println!(
            "#{:<4} {}  {:<12} {}",
            block.index,
            block.timestamp.to_rfc3339(),
            block.event,
            block.payload
        );
        println!("      hash {}", block.hash);
    }
    println!("{} block(s)", blocks.len());
    Ok(())
}

pub fn verify_chain(ctx: &Context, quarantine: bool) -> Result<()> {
    let path = &ctx.config.ledger_path;
    if !path.exists() {
        println!("No ledger at {}", path.display());
        return Ok(());
    }

    let ledger = if quarantine {
        LedgerFile::open_or_quarantine(path)?.ledger().clone()
    } else {
        let ledger = load_ledger(path)?;
        ledger.verify()?;
        ledger
    };

    info!("Verified {} blocks in {:?}", ledger.len(), path);
    match ledger.last() {
        Some(head) => println!("Chain OK: {} block(s), head {}", ledger.len(), head.hash),
        None => println!("Chain OK: empty"),
    }
    Ok(())
}

pub fn demo() -> Result<()> {
    print!("{}", demo_report(catalog::builtin()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use codex_core::ledger::save_ledger;
    use codex_core::CodexError;
    use serde_json::json;

    #[test]
    fn log_appends_to_chain() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());

        log(&ctx, "scan_symbols", r#"{"count": 3}"#).unwrap();
        log(&ctx, "geo_feed", "{}").unwrap();

        let ledger = load_ledger(&ctx.config.ledger_path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.blocks()[0].payload, json!({"count": 3}));
        verify_chain(&ctx, false).unwrap();
        chain(&ctx, Some("geo_feed")).unwrap();
    }

    #[test]
    fn log_rejects_bad_payload() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());

        assert!(matches!(log(&ctx, "x", "{nope"), Err(CliError::Argument(_))));
        assert!(!ctx.config.ledger_path.exists());
    }

    #[test]
    fn verify_chain_reports_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());
        log(&ctx, "a", "{}").unwrap();
        log(&ctx, "b", "{}").unwrap();

        let mut ledger = load_ledger(&ctx.config.ledger_path).unwrap();
        let mut blocks = ledger.blocks().to_vec();
        blocks[0].payload = json!({"forged": true});
        ledger = serde_json::from_value(serde_json::to_value(&blocks).unwrap()).unwrap();
        save_ledger(&ledger, &ctx.config.ledger_path).unwrap();

        let err = verify_chain(&ctx, false).unwrap_err();
        assert!(matches!(err, CliError::Core(CodexError::ChainBroken { index: 0, .. })));
    }

    #[test]
    fn verify_chain_quarantines_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());
        std::fs::write(&ctx.config.ledger_path, "not json").unwrap();

        assert!(verify_chain(&ctx, false).is_err());
        verify_chain(&ctx, true).unwrap();
        assert!(!ctx.config.ledger_path.exists());
    }

    #[test]
    fn missing_ledger_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());
        chain(&ctx, None).unwrap();
        verify_chain(&ctx, false).unwrap();
    }

    #[test]
    fn demo_runs() {
        demo().unwrap();
    }
}
