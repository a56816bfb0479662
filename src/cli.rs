use crate::demo;
use crate::error::{Error, Result};
use crate::storage::{ListingKind, StorageClient};
use crate::utils::confirm_deletion;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

fn parse_validated_path(path_str: &str) -> Result<String> {
    if path_str.trim().is_empty() {
        Err(Error::InvalidPath {
            path: path_str.to_string(),
        })
    } else {
        Ok(path_str.to_string())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "blobdir",
    version = env!("CARGO_PKG_VERSION"),
    about = "Directory-style access to flat object storage (Azure Blob, S3, OSS, ...)",
    after_help = "Credentials come from the environment; STORAGE_PROVIDER selects the backend (default: azblob)."
)]
pub struct Args {
    /// Container (Azure) or bucket (S3/OSS) to operate on
    #[arg(value_name = "CONTAINER", value_parser = parse_validated_path)]
    pub container: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Upload a file or directory
    Put(PutArgs),
    /// Download a blob or directory
    Get(GetArgs),
    /// List files (or directories with -d) under a prefix
    Ls(LsArgs),
    /// Remove blobs; -R removes everything under a prefix
    Rm(RmArgs),
    /// Remove everything under a prefix
    Rmdir(RmdirArgs),
    /// Run the sample walkthrough against the container
    Demo(DemoArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PutArgs {
    /// The local file or directory to upload
    #[arg(value_name = "LOCAL", value_parser = parse_validated_path)]
    pub local: String,

    /// Destination key for a file, or key prefix for a directory
    #[arg(value_name = "REMOTE")]
    pub remote: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GetArgs {
    /// The blob key or prefix to download
    #[arg(value_name = "REMOTE", value_parser = parse_validated_path)]
    pub remote: String,

    /// Local file path, or directory when ending with '/' or '.'/'..'
    #[arg(value_name = "LOCAL", value_parser = parse_validated_path)]
    pub local: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LsArgs {
    /// The prefix to list (container root when omitted)
    #[arg(value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// List directories instead of files
    #[arg(short = 'd', long)]
    pub dirs: bool,

    /// Process directories recursively
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RmArgs {
    /// Blob key(s) or prefix(es) to delete
    #[arg(value_name = "PATH", required = true, value_parser = parse_validated_path)]
    pub paths: Vec<String>,

    /// Remove every key under the given prefixes
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Force deletion without confirmation
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RmdirArgs {
    /// Prefix to delete recursively
    #[arg(value_name = "PREFIX", value_parser = parse_validated_path)]
    pub prefix: String,

    /// Force deletion without confirmation
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DemoArgs {
    /// Scratch directory for the sample files; removed afterwards
    #[arg(long, value_name = "DIR", default_value = "blobdir-demo")]
    pub workdir: PathBuf,
}

pub async fn run(args: Args, client: StorageClient) -> Result<()> {
    match args.command {
        Command::Put(put) => {
            let remote = put.remote.unwrap_or_default();
            let count = client.upload(&put.local, &remote).await?;
            log::info!("uploaded {count} file(s)");
        }
        Command::Get(get) => {
            let count = client.download(&get.remote, &get.local).await?;
            log::info!("downloaded {count} file(s)");
        }
        Command::Ls(ls) => {
            let prefix = ls.prefix.unwrap_or_default();
            let kind = if ls.dirs {
                ListingKind::Dirs
            } else {
                ListingKind::Files
            };
            let listing = client.list(&prefix, kind, ls.recursive).await?;
            if ls.json {
                println!("{}", serde_json::to_string(&listing)?);
            } else {
                for entry in &listing.entries {
                    println!("{entry}");
                }
            }
        }
        Command::Rm(rm) => {
            if rm.recursive {
                for path in &rm.paths {
                    remove_prefix(&client, path, rm.force).await?;
                }
            } else {
                for path in &rm.paths {
                    client.remove(path, false).await?;
                }
            }
        }
        Command::Rmdir(rmdir) => remove_prefix(&client, &rmdir.prefix, rmdir.force).await?,
        Command::Demo(demo_args) => demo::run(&client, &demo_args.workdir).await?,
    }
    Ok(())
}

async fn remove_prefix(client: &StorageClient, prefix: &str, force: bool) -> Result<()> {
    if !force {
        let base = prefix.trim_end_matches('/');
        let keys: Vec<String> = client
            .list_files(prefix, true)
            .await?
            .into_iter()
            .map(|rest| format!("{base}/{rest}"))
            .collect();
        if keys.is_empty() {
            println!("Nothing to delete under {prefix}");
            return Ok(());
        }
        if !confirm_deletion(&keys, false)? {
            println!("Aborted.");
            return Ok(());
        }
    }
    let count = client.remove_dir(prefix).await?;
    log::info!("removed {count} key(s) under {prefix}");
    Ok(())
}
