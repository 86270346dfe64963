use anyhow::Context;
use clap::Parser;
use console::style;
use extglob::ExtGlob;

/// Test candidate paths against a glob
#[derive(Debug, Parser)]
#[clap(about)]
pub struct Opt {
    /// The glob to test with
    pattern: String,

    /// The paths to test
    #[clap(required = true)]
    candidates: Vec<String>,
}

pub fn matches(opt: Opt) -> anyhow::Result<()> {
    let glob = ExtGlob::new(&opt.pattern)
        .with_context(|| format!("failed to compile '{}'", opt.pattern))?;

    let mut mismatches = 0;
    for candidate in &opt.candidates {
        if glob.matches(candidate) {
            println!("{} {candidate}", style("match   ").green());
        } else {
            mismatches += 1;
            println!("{} {candidate}", style("no match").red());
        }
    }

    if mismatches > 0 {
        anyhow::bail!(
            "{mismatches} of {} candidates did not match '{}'",
            opt.candidates.len(),
            opt.pattern
        );
    }
    Ok(())
}
