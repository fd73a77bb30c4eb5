//! chunkxfer command-line client.

mod config;

use std::path::PathBuf;

use anyhow::bail;
use chunkxfer_client::{
    ClientConfig, FileTransferClient, ProgressCallback, ProgressEvent, TransferReport,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chunkxfer", version, about = "Chunked, concurrent file transfers")]
struct Cli {
    /// Server host (defaults to the config file, then this machine).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port.
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Chunks per upload or download.
    #[arg(short, long, global = true)]
    chunks: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers.
    Ping,
    /// Print the server's file listing.
    List,
    /// Upload a local file under its base name.
    Upload { path: PathBuf },
    /// Download a remote file into an existing directory.
    Download {
        name: String,
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Delete a remote file.
    Delete { name: String },
}

impl Cli {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(chunks) = self.chunks {
            config.chunk_count = chunks;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = config::load()?;
    cli.apply(&mut config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli.command, config))
}

async fn run(command: Commands, config: ClientConfig) -> anyhow::Result<()> {
    let progress: ProgressCallback = Box::new(|event: ProgressEvent| {
        tracing::info!(
            kind = %event.kind,
            chunk = event.chunk,
            bytes = event.bytes,
            "chunk finished"
        );
    });
    let client = FileTransferClient::from_config(&config).with_progress(progress);

    let cancel = client.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            cancel.cancel();
        }
    });

    match command {
        Commands::Ping => {
            if !client.ping().await {
                bail!("{} is not responding", client.endpoint());
            }
            println!("{} is alive", client.endpoint());
        }
        Commands::List => {
            print!("{}", client.list_files().await?);
        }
        Commands::Upload { path } => {
            let report = client.upload_file(&path, config.chunk_count).await?;
            summarize(report)?;
        }
        Commands::Download { name, dir } => {
            let report = client
                .download_file(&name, &dir, config.chunk_count)
                .await?;
            summarize(report)?;
        }
        Commands::Delete { name } => {
            client.delete_file(&name).await?;
            println!("deleted {name}");
        }
    }
    Ok(())
}

fn summarize(report: TransferReport) -> anyhow::Result<()> {
    let report = report.into_result()?;
    println!(
        "{} {}: {} bytes in {} chunks",
        report.kind,
        report.name,
        report.bytes_transferred(),
        report.chunks.len()
    );
    Ok(())
}
