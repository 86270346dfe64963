use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;
use extglob_rules::{HostingManifest, Resolution, RuleSet};

/// Apply the rules of a hosting manifest to request paths
#[derive(Debug, Parser)]
#[clap(about)]
pub struct Opt {
    /// The hosting manifest to read rules from
    #[clap(long, short, default_value = "firebase.json")]
    manifest: PathBuf,

    /// Request paths that exist on disk. Rewrites are not applied to them.
    #[clap(long = "existing", value_name = "PATH")]
    existing: Vec<String>,

    /// The request paths to resolve
    #[clap(required = true)]
    paths: Vec<String>,
}

pub fn resolve(opt: Opt) -> anyhow::Result<()> {
    let manifest = HostingManifest::from_path(&opt.manifest)
        .with_context(|| format!("failed to read {}", opt.manifest.display()))?;
    let rules = RuleSet::compile(&manifest)
        .with_context(|| format!("invalid rules in {}", opt.manifest.display()))?;

    tracing::debug!("serving from '{}'", rules.public_dir());

    for path in &opt.paths {
        match rules.resolve(path, |path| opt.existing.iter().any(|existing| existing == path)) {
            Resolution::Redirect(redirect) => {
                println!(
                    "{path} {} {} {}",
                    style("redirect").yellow(),
                    redirect.status,
                    redirect.destination
                );
            }
            Resolution::Serve { path: served, headers } => {
                println!("{path} {} {served}", style("serve").green());
                for (key, value) in headers {
                    println!("    {key}: {value}");
                }
            }
        }
    }
    Ok(())
}
