//! Sample walkthrough of every directory operation.
//!
//! Creates a small `cats/` tree and a `readme.txt` in a scratch directory,
//! pushes them through upload, list, download and removal against the given
//! container, prints each intermediate state, and cleans up afterwards.

use crate::error::Result;
use crate::storage::StorageClient;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local sample files, relative to the scratch directory.
pub const SAMPLE_FILES: &[(&str, &str)] = &[
    ("readme.txt", "Cat herding for beginners\n"),
    ("cats/herds.txt", "calico, siamese, tabby\n"),
    ("cats/calico/anna.txt", "Anna\n"),
    ("cats/calico/felix.txt", "Felix\n"),
    ("cats/siamese/mocha.txt", "Mocha\n"),
    ("cats/tabby/bojangles.txt", "Bojangles\n"),
];

const REMOTE_ROOT: &str = "cat-herding";

/// Entries the walkthrough creates directly in the scratch directory.
const CREATED_ENTRIES: &[&str] = &["readme.txt", "cats", "downloads"];

/// Write the sample tree below `workdir`.
pub async fn create_sample_tree(workdir: &Path) -> Result<()> {
    for (relative, contents) in SAMPLE_FILES {
        let path = workdir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, contents).await?;
    }
    Ok(())
}

/// Every file below `dir`, relative to it, sorted.
pub async fn local_tree(dir: &Path) -> Result<Vec<String>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(dir) {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect();
                found.push(parts.join("/"));
            }
        }
    }
    found.sort();
    Ok(found)
}

fn local(workdir: &Path, relative: &str) -> String {
    workdir.join(relative).to_string_lossy().to_string()
}

/// Refuse to run over entries the walkthrough would overwrite and delete.
async fn check_workdir(workdir: &Path) -> Result<()> {
    for entry in CREATED_ENTRIES {
        let path = workdir.join(entry);
        if fs::try_exists(&path).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists; pick another --workdir", path.display()),
            )
            .into());
        }
    }
    Ok(())
}

/// Remove what the walkthrough created, and the scratch directory itself
/// if it did not exist before.
async fn clean_workdir(workdir: &Path, fresh: bool) -> Result<()> {
    for entry in CREATED_ENTRIES {
        let path = workdir.join(entry);
        if fs::metadata(&path).await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
    }
    if fresh {
        fs::remove_dir(workdir).await?;
    }
    Ok(())
}

/// Run the walkthrough. Only the files it created are removed afterwards;
/// anything else in `workdir` is left alone.
pub async fn run(client: &StorageClient, workdir: &Path) -> Result<()> {
    check_workdir(workdir).await?;
    let fresh = !fs::try_exists(workdir).await?;

    log::info!(
        "running demo in {} against container {}",
        workdir.display(),
        client.container()
    );
    create_sample_tree(workdir).await?;
    let downloads: PathBuf = workdir.join("downloads");

    // A single file needs the full destination key.
    client
        .upload(&local(workdir, "readme.txt"), &format!("{REMOTE_ROOT}/readme.txt"))
        .await?;
    println!("{:?}", client.list_files("", true).await?);

    // A directory keeps its own name under the destination prefix.
    client.upload(&local(workdir, "cats"), REMOTE_ROOT).await?;
    println!("{:?}", client.list_files("", true).await?);

    println!("{:?}", client.list_files("cat-herding/cats", false).await?);
    println!("{:?}", client.list_files("cat-herding/cats", true).await?);
    println!("{:?}", client.list_dirs("cat-herding/cats", false).await?);
    println!("{:?}", client.list_dirs(REMOTE_ROOT, true).await?);

    // No trailing separator: a literal file path.
    client
        .download(
            "cat-herding/readme.txt",
            &local(workdir, "downloads/cat-info.txt"),
        )
        .await?;
    println!("{:?}", local_tree(&downloads).await?);

    // Trailing separator: saved inside the directory under its own name.
    let herd_info = format!("{}/", local(workdir, "downloads/herd-info"));
    client
        .download("cat-herding/cats/herds.txt", &herd_info)
        .await?;
    println!("{:?}", local_tree(&downloads).await?);

    // A prefix is always downloaded into a directory.
    client
        .download("cat-herding/cats", &local(workdir, "downloads/cat-data"))
        .await?;
    println!("{:?}", local_tree(&downloads).await?);

    client
        .remove("cat-herding/cats/calico/felix.txt", false)
        .await?;
    println!("{:?}", client.list_files("", true).await?);

    client.remove("cat-herding/cats", true).await?;
    println!("{:?}", client.list_files("", true).await?);

    client.remove_dir(REMOTE_ROOT).await?;
    println!("{:?}", client.list_files("", true).await?);

    clean_workdir(workdir, fresh).await
}
