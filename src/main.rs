mod fetch;
mod output;
mod pipeline;
mod settings;
mod sitemap;
#[cfg(test)]
mod test_server;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "llms_fetch",
    about = "Download the llms.txt variant of every documentation page in a sitemap"
)]
struct Cli {
    /// Sitemap XML file to read
    sitemap: PathBuf,
    /// Directory for `<page>_llms.txt` files (default: docs, env LLMS_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Only fetch URLs containing this host (default: help.getzep.com, env LLMS_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Per-request timeout in seconds (default: 10, env LLMS_TIMEOUT_SECS)
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = Settings::load(Overrides {
        sitemap: Some(cli.sitemap),
        output_dir: cli.output_dir,
        host: cli.host,
        timeout_secs: cli.timeout,
    })?;
    info!(
        sitemap = %settings.sitemap.display(),
        output_dir = %settings.output_dir.display(),
        host = %settings.host,
        "Starting"
    );

    let client = fetch::build_client(settings.timeout())?;
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let summary = pipeline::run(&settings, &client, &pb, &mut std::io::stdout()).await?;
    summary.print();
    info!("Done in {}", format_duration(t0.elapsed()));

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::parse_from(["llms_fetch", "map.xml", "-o", "out", "--host", "a.test", "-t", "3"]);
        assert_eq!(cli.sitemap, PathBuf::from("map.xml"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.host.as_deref(), Some("a.test"));
        assert_eq!(cli.timeout, Some(3));
    }

    #[test]
    fn sitemap_is_required() {
        assert!(Cli::try_parse_from(["llms_fetch"]).is_err());
    }

    #[test]
    fn durations() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
