use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;

use odoo_domain::{Domain, parse_domain};

use crate::config::DomainsConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Domain text to parse ("-" reads stdin)
    pub expr: Option<String>,

    /// Saved domains file (YAML, TOML or JSON)
    #[arg(short, long, env = "ODOO_DOMAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Parse saved domains whose name matches this pattern (`*` wildcard)
    #[arg(short, long, requires = "config", conflicts_with = "expr")]
    pub name: Option<String>,

    /// Output format (default: config file setting, else json)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Only validate; print nothing on success
    #[arg(long)]
    pub check: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Nested-list RPC argument as JSON
    Json,
    /// Nested-list RPC argument as YAML
    Yaml,
    /// Canonical domain text
    Text,
}

/// One domain to process, labelled for messages.
struct Source {
    label: String,
    text: String,
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DomainsConfig::load(path)
            .with_context(|| format!("Config: Failed to load {}", path.display()))?,
        None => DomainsConfig::default(),
    };
    let format = cli.format.or(config.format).unwrap_or(OutputFormat::Json);

    let sources = collect_sources(cli, &config)?;
    tracing::info!("Parsing {} domain(s) as {:?}", sources.len(), format);

    for source in &sources {
        let domain = parse_domain(&source.text)
            .with_context(|| format!("Parse: {} is not a valid domain", source.label))?;
        tracing::debug!("{}: {} node(s)", source.label, domain.len());

        if cli.check {
            continue;
        }
        if cli.name.is_some() {
            writeln!(out, "# {}", source.label)?;
        }
        write_domain(&domain, format, out)?;
    }

    Ok(())
}

fn collect_sources(cli: &Cli, config: &DomainsConfig) -> Result<Vec<Source>> {
    if let Some(pattern) = &cli.name {
        let sources: Vec<Source> = config
            .select(pattern)
            .map(|(name, text)| Source {
                label: format!("domain '{name}'"),
                text: text.to_string(),
            })
            .collect();
        if sources.is_empty() {
            tracing::warn!("No saved domain matches '{}'", pattern);
            bail!("CLI: No saved domain matches '{pattern}'");
        }
        return Ok(sources);
    }

    let text = match cli.expr.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("CLI: Failed to read domain from stdin")?;
            // a trailing newline is not part of the domain
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
        Some(expr) => expr.to_string(),
        None => bail!("CLI: Provide a domain expression or --name with --config"),
    };

    Ok(vec![Source {
        label: "input".to_string(),
        text,
    }])
}

pub fn write_domain(domain: &Domain, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, domain).context("Output: Failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut *out, domain).context("Output: Failed to write YAML")?;
        }
        OutputFormat::Text => writeln!(out, "{domain}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("odoo-domain").chain(args.iter().copied()))
    }

    fn run_to_string(cli: &Cli) -> Result<String> {
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn writes_json_args() {
        let out = run_to_string(&cli(&["[('name','=','My Name'),'!',('id','=','1')]"])).unwrap();
        assert_eq!(out, "[[\"name\",\"=\",\"My Name\"],[\"!\",[\"id\",\"=\",\"1\"]]]\n");
    }

    #[test]
    fn writes_canonical_text() {
        let out = run_to_string(&cli(&["--format", "text", "( 'a' , '=' , 'b' )"])).unwrap();
        assert_eq!(out, "[('a','=','b')]\n");
    }

    #[test]
    fn check_prints_nothing() {
        let out = run_to_string(&cli(&["--check", "[('a','=','b')]"])).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn reports_syntax_error() {
        let err = run_to_string(&cli(&["('a','=','b'),('c','=','d')"])).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("input is not a valid domain"), "{message}");
        assert!(message.contains("invalid syntax at byte 13"), "{message}");
    }

    #[test]
    fn requires_an_expression() {
        assert!(run_to_string(&cli(&[])).is_err());
    }
}
