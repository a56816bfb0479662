use crate::*;
use assert_cmd::prelude::*;
use blobdir::error::{Error, Result, StorageErrorKind};
use blobdir::storage::StorageClient;
use predicates::prelude::*;
use tokio::fs;

pub fn tests(client: &StorageClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_download_file_to_literal_path,
        test_download_file_into_trailing_slash_dir,
        test_download_file_into_relative_token_dir,
        test_download_prefix_recreates_structure,
        test_download_prefix_ignores_trailing_separator,
        test_download_missing_blob_leaves_no_trace,
        test_download_refuses_escaping_keys,
        test_download_prefers_children_over_same_named_blob
    ));

    tests.extend(async_trials!(
        client,
        e2e_test_get_command_downloads_file,
        e2e_test_get_command_missing_blob_fails
    ));
}

/// Put random content at `<prefix>/cat-herding/readme.txt`.
async fn stage_remote_file(client: &StorageClient, prefix: &str) -> Result<(String, Vec<u8>)> {
    let key = format!("{prefix}/cat-herding/readme.txt");
    let content = TEST_FIXTURE.random_content(1..256 * 1024);
    client.operator().write(&key, content.clone()).await?;
    Ok((key, content))
}

/// Upload the sample tree under `<prefix>/cat-herding/cats`.
async fn stage_remote_cats(client: &StorageClient, prefix: &str) -> Result<String> {
    let local_dir = temp_local_dir("get-stage");
    let cats = stage_local_cats(&local_dir).await?;
    client
        .upload(&to_str(&cats), &format!("{prefix}/cat-herding"))
        .await?;
    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(format!("{prefix}/cat-herding/cats"))
}

async fn test_download_file_to_literal_path(client: StorageClient) -> Result<()> {
    let (key, content) = stage_remote_file(&client, &TEST_FIXTURE.new_prefix()).await?;
    let local_dir = temp_local_dir("get-literal");
    let dest = local_dir.join("nested").join("cat-info.txt");

    let written = client.download(&key, &to_str(&dest)).await?;

    assert_eq!(written, 1);
    assert_eq!(fs::read(&dest).await?, content);
    assert!(!local_dir.join("nested").join("readme.txt").exists());

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn test_download_file_into_trailing_slash_dir(client: StorageClient) -> Result<()> {
    let (key, content) = stage_remote_file(&client, &TEST_FIXTURE.new_prefix()).await?;
    let local_dir = temp_local_dir("get-slash");
    let dest = format!("{}/herd-info/", to_str(&local_dir));

    client.download(&key, &dest).await?;

    let saved = local_dir.join("herd-info").join("readme.txt");
    assert_eq!(fs::read(&saved).await?, content);

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn test_download_file_into_relative_token_dir(client: StorageClient) -> Result<()> {
    let (key, content) = stage_remote_file(&client, &TEST_FIXTURE.new_prefix()).await?;
    let local_dir = temp_local_dir("get-dot");
    fs::create_dir_all(&local_dir).await?;
    let dest = format!("{}/.", to_str(&local_dir));

    client.download(&key, &dest).await?;

    assert_eq!(fs::read(local_dir.join("readme.txt")).await?, content);

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn test_download_prefix_recreates_structure(client: StorageClient) -> Result<()> {
    let remote = stage_remote_cats(&client, &TEST_FIXTURE.new_prefix()).await?;
    let local_dir = temp_local_dir("get-tree");
    let dest = local_dir.join("cat-data");

    let written = client.download(&remote, &to_str(&dest)).await?;

    let expected = cats_files();
    assert_eq!(written, expected.len());
    assert_eq!(blobdir::demo::local_tree(&dest.join("cats")).await?, expected);
    assert_eq!(
        fs::read_to_string(dest.join("cats").join("tabby").join("bojangles.txt")).await?,
        "Bojangles\n"
    );

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn test_download_prefix_ignores_trailing_separator(client: StorageClient) -> Result<()> {
    let remote = stage_remote_cats(&client, &TEST_FIXTURE.new_prefix()).await?;
    let local_dir = temp_local_dir("get-tree-slash");
    let dest = format!("{}/cat-data/", to_str(&local_dir));

    client.download(&format!("{remote}/"), &dest).await?;

    assert_eq!(
        blobdir::demo::local_tree(&local_dir.join("cat-data").join("cats")).await?,
        cats_files()
    );

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn test_download_missing_blob_leaves_no_trace(client: StorageClient) -> Result<()> {
    let prefix = TEST_FIXTURE.new_prefix();
    let local_dir = temp_local_dir("get-missing");
    let dest = local_dir.join("deep").join("out.txt");

    let err = client
        .download(&format!("{prefix}/nothing.txt"), &to_str(&dest))
        .await
        .expect_err("missing blob should fail");

    assert!(matches!(err, Error::DownloadFailed { .. }));
    assert_eq!(err.storage_kind(), Some(StorageErrorKind::NotFound));
    assert!(!local_dir.exists());
    Ok(())
}

async fn test_download_refuses_escaping_keys(client: StorageClient) -> Result<()> {
    let prefix = TEST_FIXTURE.new_prefix();
    client
        .operator()
        .write(&format!("{prefix}/box/../escape.txt"), b"x".to_vec())
        .await
        .ok();
    let keys = client.list_files(&format!("{prefix}/box"), true).await?;
    if !keys.iter().any(|k| k.split('/').any(|s| s == "..")) {
        // the backend normalized the key away; nothing to escape with
        return Ok(());
    }

    let local_dir = temp_local_dir("get-escape");
    let result = client
        .download(&format!("{prefix}/box"), &to_str(&local_dir))
        .await;
    assert!(result.is_err());
    assert!(!local_dir.join("escape.txt").exists());

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn test_download_prefers_children_over_same_named_blob(client: StorageClient) -> Result<()> {
    let prefix = TEST_FIXTURE.new_prefix();
    let key = format!("{prefix}/herd");
    client.operator().write(&key, b"blob".to_vec()).await?;
    client
        .operator()
        .write(&format!("{key}/anna.txt"), b"anna".to_vec())
        .await?;
    let local_dir = temp_local_dir("get-shadowed");

    let written = client.download(&key, &to_str(&local_dir)).await?;

    assert_eq!(written, 1);
    assert_eq!(
        fs::read(local_dir.join("herd").join("anna.txt")).await?,
        b"anna".to_vec()
    );
    assert!(local_dir.join("herd").is_dir());

    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn e2e_test_get_command_downloads_file(_client: StorageClient) -> Result<()> {
    let env = E2eTestEnv::new().await;
    let content = TEST_FIXTURE.random_content(1..4096);
    env.verifier
        .operator()
        .write("cat-herding/cats/herds.txt", content.clone())
        .await?;
    let local_dir = temp_local_dir("e2e-get");

    env.command()
        .arg("get")
        .arg("cat-herding/cats/herds.txt")
        .arg(format!("{}/herd-info/", to_str(&local_dir)))
        .assert()
        .success()
        .stdout(predicate::str::contains("Downloaded:"));

    let saved = local_dir.join("herd-info").join("herds.txt");
    assert_eq!(fs::read(&saved).await?, content);

    env.cleanup().await;
    let _ = fs::remove_dir_all(&local_dir).await;
    Ok(())
}

async fn e2e_test_get_command_missing_blob_fails(_client: StorageClient) -> Result<()> {
    let env = E2eTestEnv::new().await;
    let local_dir = temp_local_dir("e2e-get-missing");

    env.command()
        .arg("get")
        .arg("cat-herding/absent.txt")
        .arg(to_str(&local_dir.join("out.txt")))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to download"));

    assert!(!local_dir.exists());
    env.cleanup().await;
    Ok(())
}
