use crate::*;
use assert_cmd::prelude::*;
use blobdir::error::Result;
use blobdir::storage::{ListingKind, StorageClient};
use predicates::prelude::*;
use tokio::fs;

pub fn tests(client: &StorageClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_list_top_level_files,
        test_list_files_recursively,
        test_list_immediate_dirs,
        test_list_dirs_recursively,
        test_list_ignores_sibling_prefixes,
        test_list_missing_prefix_is_empty,
        test_list_container_root,
        test_listing_reports_its_request
    ));

    tests.extend(async_trials!(
        client,
        e2e_test_ls_command_prints_entries,
        e2e_test_ls_command_prints_json
    ));
}

/// Upload the `cats/` tree and a readme under `<prefix>/cat-herding`.
async fn stage_herd(client: &StorageClient, prefix: &str) -> Result<String> {
    let local_dir = temp_local_dir("ls-stage");
    let cats = stage_local_cats(&local_dir).await?;
    let root = format!("{prefix}/cat-herding");

    client.upload(&to_str(&cats), &root).await?;
    client
        .upload(
            &to_str(&local_dir.join("readme.txt")),
            &format!("{root}/readme.txt"),
        )
        .await?;

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(root)
}

async fn test_list_top_level_files(client: StorageClient) -> Result<()> {
    let root = stage_herd(&client, &TEST_FIXTURE.new_prefix()).await?;

    let files = client.list_files(&format!("{root}/cats"), false).await?;
    assert_eq!(files, vec!["herds.txt"]);

    let files = client.list_files(&root, false).await?;
    assert_eq!(files, vec!["readme.txt"]);
    Ok(())
}

async fn test_list_files_recursively(client: StorageClient) -> Result<()> {
    let root = stage_herd(&client, &TEST_FIXTURE.new_prefix()).await?;

    let files = client.list_files(&format!("{root}/cats"), true).await?;
    assert_eq!(sorted(files), cats_files());
    Ok(())
}

async fn test_list_immediate_dirs(client: StorageClient) -> Result<()> {
    let root = stage_herd(&client, &TEST_FIXTURE.new_prefix()).await?;

    let dirs = client.list_dirs(&format!("{root}/cats"), false).await?;
    assert_eq!(sorted(dirs), vec!["calico", "siamese", "tabby"]);

    let dirs = client.list_dirs(&root, false).await?;
    assert_eq!(dirs, vec!["cats"]);
    Ok(())
}

async fn test_list_dirs_recursively(client: StorageClient) -> Result<()> {
    let root = stage_herd(&client, &TEST_FIXTURE.new_prefix()).await?;

    let dirs = client.list_dirs(&root, true).await?;
    assert_eq!(dirs.len(), 4, "no duplicates expected: {dirs:?}");
    assert_eq!(
        sorted(dirs),
        vec!["cats", "cats/calico", "cats/siamese", "cats/tabby"]
    );
    Ok(())
}

async fn test_list_ignores_sibling_prefixes(client: StorageClient) -> Result<()> {
    let prefix = TEST_FIXTURE.new_prefix();
    client
        .operator()
        .write(&format!("{prefix}/cats/herds.txt"), b"in".to_vec())
        .await?;
    client
        .operator()
        .write(&format!("{prefix}/cats-2/other.txt"), b"out".to_vec())
        .await?;

    let files = client.list_files(&format!("{prefix}/cats"), true).await?;
    assert_eq!(files, vec!["herds.txt"]);
    Ok(())
}

async fn test_list_missing_prefix_is_empty(client: StorageClient) -> Result<()> {
    let prefix = TEST_FIXTURE.new_prefix();

    assert!(client.list_files(&prefix, true).await?.is_empty());
    assert!(client.list_dirs(&prefix, false).await?.is_empty());
    Ok(())
}

async fn test_list_container_root(_client: StorageClient) -> Result<()> {
    let client = isolated_client().await;
    client
        .operator()
        .write("top.txt", b"top".to_vec())
        .await?;
    client
        .operator()
        .write("cat-herding/readme.txt", b"readme".to_vec())
        .await?;

    assert_eq!(client.list_files("", false).await?, vec!["top.txt"]);
    assert_eq!(
        sorted(client.list_files("", true).await?),
        vec!["cat-herding/readme.txt", "top.txt"]
    );
    assert_eq!(client.list_dirs("", true).await?, vec!["cat-herding"]);
    Ok(())
}

async fn test_listing_reports_its_request(client: StorageClient) -> Result<()> {
    let root = stage_herd(&client, &TEST_FIXTURE.new_prefix()).await?;

    let listing = client.list(&root, ListingKind::Dirs, true).await?;
    assert_eq!(listing.prefix, root);
    assert_eq!(listing.kind, ListingKind::Dirs);
    assert!(listing.recursive);
    assert_eq!(listing.entries.len(), 4);
    Ok(())
}

async fn e2e_test_ls_command_prints_entries(_client: StorageClient) -> Result<()> {
    let env = E2eTestEnv::new().await;
    env.verifier
        .operator()
        .write("cat-herding/cats/herds.txt", b"herds".to_vec())
        .await?;
    env.verifier
        .operator()
        .write("cat-herding/cats/tabby/bojangles.txt", b"bojangles".to_vec())
        .await?;

    env.command()
        .arg("ls")
        .arg("cat-herding/cats")
        .assert()
        .success()
        .stdout(predicate::str::contains("herds.txt").and(predicate::str::contains("tabby").not()));

    env.command()
        .arg("ls")
        .arg("-R")
        .arg("cat-herding/cats")
        .assert()
        .success()
        .stdout(predicate::str::contains("tabby/bojangles.txt"));

    env.command()
        .arg("ls")
        .arg("-d")
        .arg("cat-herding/cats")
        .assert()
        .success()
        .stdout(predicate::str::contains("tabby").and(predicate::str::contains("herds").not()));

    env.cleanup().await;
    Ok(())
}

async fn e2e_test_ls_command_prints_json(_client: StorageClient) -> Result<()> {
    let env = E2eTestEnv::new().await;
    env.verifier
        .operator()
        .write("cat-herding/readme.txt", b"readme".to_vec())
        .await?;

    env.command()
        .arg("ls")
        .arg("--json")
        .arg("cat-herding")
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""kind":"files""#)
                .and(predicate::str::contains(r#""entries":["readme.txt"]"#)),
        );

    env.cleanup().await;
    Ok(())
}
