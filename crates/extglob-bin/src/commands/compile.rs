use anyhow::Context;
use clap::Parser;
use extglob::ExtGlob;

/// Print the anchored regular expression for each glob
#[derive(Debug, Parser)]
#[clap(about)]
pub struct Opt {
    /// The globs to translate
    #[clap(required = true)]
    patterns: Vec<String>,
}

pub fn compile(opt: Opt) -> anyhow::Result<()> {
    for pattern in &opt.patterns {
        // Compile through the engine so rejected expressions are reported too.
        let glob = ExtGlob::new(pattern).with_context(|| format!("failed to compile '{pattern}'"))?;
        let Some(regex) = glob.regex_source() else {
            anyhow::bail!("'{pattern}' contains a negated group and has no single regular expression");
        };
        if opt.patterns.len() == 1 {
            println!("{regex}");
        } else {
            println!("{pattern}\t{regex}");
        }
    }
    Ok(())
}
