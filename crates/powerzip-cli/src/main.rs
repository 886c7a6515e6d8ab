mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use powerzip_client::{HttpAddressRegistry, HttpPlanPricing};
use powerzip_core::{ReferenceData, ResolveError, ResolveResult, ZipCode, normalize_address};
use powerzip_resolver::{AnalyzeRequest, Analyzer, DEFAULT_USAGE_KWH, ResolverConfig};
use serde::Serialize;
use tracing::{debug, level_filters::LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "powerzip", version)]
#[command(about = "Resolve Texas ZIP codes and addresses to the utility that serves them")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print JSON instead of a human-readable card
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the service-address registry
    #[arg(long, global = true, env = "POWERZIP_ADDRESS_API_URL")]
    address_api_url: Option<String>,

    /// Base URL of the plan pricing service
    #[arg(long, global = true, env = "POWERZIP_PRICING_API_URL")]
    pricing_api_url: Option<String>,

    /// Bearer token for both services
    #[arg(long, global = true, env = "POWERZIP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON file of extra boundary ZIPs merged over the built-in registry
    #[arg(long, global = true, value_name = "PATH")]
    boundary_file: Option<PathBuf>,

    /// Per-request timeout for external services, in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    /// Never probe the pricing service for unknown ZIPs
    #[arg(long, global = true)]
    no_probe: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full resolution: municipal screen, static tables, address, pattern, probe
    Analyze {
        zip: String,
        /// Street address, used to settle boundary ZIPs
        #[arg(long)]
        address: Option<String>,
        /// Monthly usage in kWh
        #[arg(long, default_value_t = DEFAULT_USAGE_KWH)]
        usage: u32,
        /// Omit alternative utilities from the answer
        #[arg(long)]
        no_alternatives: bool,
        /// Overall budget for network-bound strategies, in milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,
    },
    /// Static tables only (boundary registry, then direct assignments)
    Lookup { zip: String },
    /// Resolve one street address through the registry
    Address { address: String, zip: String },
    /// Registry details for a service point id
    Details { service_point_id: String },
    /// Ask the pricing service which utilities serve a ZIP
    Probe {
        zip: String,
        #[arg(long, default_value_t = DEFAULT_USAGE_KWH)]
        usage: u32,
    },
    /// Show the normalized form of an address
    Normalize { address: String },
    /// Check the reference tables for invariant violations and source conflicts
    Audit,
}

#[derive(Serialize)]
struct Normalized<'a> {
    input: &'a str,
    normalized: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        })
        .init();
    debug!("powerzip v{}", env!("CARGO_PKG_VERSION"));

    let data = load_reference(cli.boundary_file.as_deref())?;
    let analyzer = build_analyzer(&cli, data)?;

    match &cli.command {
        Command::Analyze {
            zip,
            address,
            usage,
            no_alternatives,
            deadline_ms,
        } => {
            let mut request = AnalyzeRequest::new(zip.as_str())
                .with_usage(*usage)?
                .return_alternatives(!no_alternatives);
            if let Some(address) = address {
                request = request.with_address(address.as_str())?;
            }
            if let Some(ms) = deadline_ms {
                request = request.with_deadline(Duration::from_millis(*ms));
            }
            match analyzer.analyze(&request).await {
                Ok(outcome) => emit(cli.json, &outcome, display::print_outcome),
                Err(ResolveError::NonTexasZip(zip)) => {
                    let answer = display::OutsideTexas::new(&zip);
                    emit(cli.json, &answer, display::print_outside_texas)
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Lookup { zip } => {
            let result = analyzer.resolve_zip(zip)?;
            emit(cli.json, &result, |r| display::print_lookup(zip, r.as_ref()))
        }
        Command::Address { address, zip } => {
            let resolver = analyzer
                .address_resolver()
                .context("address lookups need --address-api-url or POWERZIP_ADDRESS_API_URL")?;
            let result = resolver.resolve_address(address, zip, None).await?;
            emit(cli.json, &result, display::print_result)
        }
        Command::Details { service_point_id } => {
            let resolver = analyzer
                .address_resolver()
                .context("details need --address-api-url or POWERZIP_ADDRESS_API_URL")?;
            let details = resolver.details(service_point_id).await?;
            emit(cli.json, &details, display::print_details)
        }
        Command::Probe { zip, usage } => {
            let prober = analyzer.prober().context(
                "probing needs --pricing-api-url or POWERZIP_PRICING_API_URL (and no --no-probe)",
            )?;
            let (zip_code, usage) = probe_inputs(zip, *usage)?;
            let result = prober.probe_zip(zip_code, usage).await?;
            emit(cli.json, &result, |r| display::print_lookup(zip, r.as_ref()))
        }
        Command::Normalize { address } => {
            let normalized = Normalized {
                input: address,
                normalized: normalize_address(address),
            };
            emit(cli.json, &normalized, |n| println!("{}", n.normalized))
        }
        Command::Audit => {
            let audit = display::Audit::of(analyzer.data());
            emit(cli.json, &audit, display::print_audit)?;
            if !audit.issues.is_empty() {
                anyhow::bail!("{} reference table issue(s)", audit.issues.len());
            }
            Ok(())
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

/// Same ZIP and usage rules as `analyze`.
fn probe_inputs(zip: &str, usage: u32) -> ResolveResult<(ZipCode, u32)> {
    let request = AnalyzeRequest::new(zip).with_usage(usage)?;
    Ok((ZipCode::parse(request.zip())?, request.usage_kwh()))
}

fn load_reference(overlay: Option<&Path>) -> anyhow::Result<ReferenceData> {
    let data = ReferenceData::builtin();
    let Some(path) = overlay else {
        return Ok(data);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading boundary file {}", path.display()))?;
    data.with_boundary_overlay(&json)
        .with_context(|| format!("applying boundary file {}", path.display()))
}

fn build_analyzer(cli: &Cli, data: ReferenceData) -> anyhow::Result<Analyzer> {
    let timeout = Duration::from_secs(cli.timeout_secs);
    let config = ResolverConfig {
        address_timeout: timeout,
        probe_timeout: timeout,
        probe_enabled: !cli.no_probe,
        ..ResolverConfig::default()
    };

    let mut builder = Analyzer::builder(Arc::new(data)).config(config);
    if let Some(url) = &cli.address_api_url {
        let registry = HttpAddressRegistry::new(url.clone(), cli.api_key.clone(), timeout)
            .context("building address registry client")?;
        builder = builder.address_registry(Arc::new(registry));
    }
    if let Some(url) = &cli.pricing_api_url {
        let pricing = HttpPlanPricing::new(url.clone(), cli.api_key.clone(), timeout)
            .context("building pricing client")?;
        builder = builder.plan_pricing(Arc::new(pricing));
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "powerzip",
            "analyze",
            "77573",
            "--address",
            "1234 Main St",
            "--usage",
            "1500",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Analyze {
                zip,
                address,
                usage,
                no_alternatives,
                deadline_ms,
            } => {
                assert_eq!(zip, "77573");
                assert_eq!(address.as_deref(), Some("1234 Main St"));
                assert_eq!(usage, 1500);
                assert!(!no_alternatives);
                assert!(deadline_ms.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn probe_usage_is_range_checked() {
        assert_eq!(
            probe_inputs("76301", 99).unwrap_err(),
            ResolveError::InvalidUsage(99)
        );
        assert_eq!(
            probe_inputs("76301", 5001).unwrap_err(),
            ResolveError::InvalidUsage(5001)
        );
        let (zip, usage) = probe_inputs("76301", 1200).unwrap();
        assert_eq!(zip.to_string(), "76301");
        assert_eq!(usage, 1200);
        assert!(matches!(
            probe_inputs("7630", 1000),
            Err(ResolveError::InvalidZipFormat(_))
        ));
    }

    #[test]
    fn missing_overlay_is_an_error() {
        let err = load_reference(Some(Path::new("/nonexistent/boundaries.json"))).unwrap_err();
        assert!(err.to_string().contains("reading boundary file"));
    }

    #[test]
    fn analyzer_without_endpoints_has_no_network_stages() {
        let cli = Cli::try_parse_from(["powerzip", "audit"]).unwrap();
        let analyzer = build_analyzer(&cli, ReferenceData::builtin()).unwrap();
        assert!(analyzer.address_resolver().is_none());
        assert!(analyzer.prober().is_none());
    }
}
