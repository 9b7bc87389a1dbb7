mod support;

use std::time::{Duration, UNIX_EPOCH};

use vog_sync::SyncError;
use vog_sync::test_support::gzip;
use wiremock::MockServer;

use support::{
    JUL_2017, JUL_2017_SECS, SEP_2001, downloads_of, file_names, mount_file, mount_listing,
};

fn source(server: &MockServer) -> String {
    format!("{}/vog/", server.uri())
}

#[tokio::test]
async fn mirrors_and_expands_fasta() {
    let server = MockServer::start().await;
    let compressed = gzip(b">seq1\nACGT\n");
    mount_listing(&server, "/vog/latest/", &["vog.fa.gz", "README"]).await;
    mount_file(&server, "/vog/latest/vog.fa.gz", &compressed, SEP_2001).await;
    let dir = tempfile::tempdir().unwrap();

    let report = vog_sync_http::sync(&source(&server), "latest", dir.path())
        .await
        .unwrap();

    assert_eq!(report.fetched, ["vog.fa.gz"]);
    assert_eq!(file_names(dir.path()), ["vog.fa", "vog.fa.gz"]);
    assert_eq!(
        std::fs::read(dir.path().join("vog.fa")).unwrap(),
        b">seq1\nACGT\n"
    );
    assert_eq!(std::fs::read(dir.path().join("vog.fa.gz")).unwrap(), compressed);
    assert_eq!(downloads_of(&server, "/vog/latest/README").await, 0);
}

#[tokio::test]
async fn protein_and_member_archives_are_left_alone() {
    let server = MockServer::start().await;
    let proteins = gzip(b">p1\nMKV\n");
    let members = gzip(b"#GroupName\tProteinCount\n");
    mount_listing(&server, "/vog/latest/", &["vog.faa.gz", "vog.members.tsv.gz"]).await;
    mount_file(&server, "/vog/latest/vog.faa.gz", &proteins, SEP_2001).await;
    mount_file(&server, "/vog/latest/vog.members.tsv.gz", &members, SEP_2001).await;
    let dir = tempfile::tempdir().unwrap();

    let report = vog_sync_http::sync(&source(&server), "latest", dir.path())
        .await
        .unwrap();

    assert!(report.decompressed.is_empty());
    assert_eq!(file_names(dir.path()), ["vog.faa.gz", "vog.members.tsv.gz"]);
    assert_eq!(std::fs::read(dir.path().join("vog.faa.gz")).unwrap(), proteins);
    assert_eq!(
        std::fs::read(dir.path().join("vog.members.tsv.gz")).unwrap(),
        members
    );
}

#[tokio::test]
async fn rerun_against_unchanged_share_downloads_nothing() {
    let server = MockServer::start().await;
    mount_listing(&server, "/vog/latest/", &["vog.fa.gz", "vog.lca.tsv.gz"]).await;
    mount_file(&server, "/vog/latest/vog.fa.gz", &gzip(b">s\nA\n"), SEP_2001).await;
    mount_file(&server, "/vog/latest/vog.lca.tsv.gz", &gzip(b"lca"), SEP_2001).await;
    let dir = tempfile::tempdir().unwrap();

    vog_sync_http::sync(&source(&server), "latest", dir.path())
        .await
        .unwrap();
    let second = vog_sync_http::sync(&source(&server), "latest", dir.path())
        .await
        .unwrap();

    assert!(second.fetched.is_empty());
    assert_eq!(second.skipped.len(), 2);
    assert_eq!(downloads_of(&server, "/vog/latest/vog.fa.gz").await, 1);
    assert_eq!(downloads_of(&server, "/vog/latest/vog.lca.tsv.gz").await, 1);
}

#[tokio::test]
async fn newer_remote_file_is_fetched_again() {
    let server = MockServer::start().await;
    mount_listing(&server, "/vog/latest/", &["vog.fa.gz"]).await;
    mount_file(&server, "/vog/latest/vog.fa.gz", &gzip(b">old\nA\n"), SEP_2001).await;
    let dir = tempfile::tempdir().unwrap();
    vog_sync_http::sync(&source(&server), "latest", dir.path())
        .await
        .unwrap();

    server.reset().await;
    mount_listing(&server, "/vog/latest/", &["vog.fa.gz"]).await;
    mount_file(&server, "/vog/latest/vog.fa.gz", &gzip(b">new\nC\n"), JUL_2017).await;

    let report = vog_sync_http::sync(&source(&server), "latest", dir.path())
        .await
        .unwrap();

    assert_eq!(report.fetched, ["vog.fa.gz"]);
    assert_eq!(
        std::fs::read(dir.path().join("vog.fa")).unwrap(),
        b">new\nC\n"
    );
    let mtime = std::fs::metadata(dir.path().join("vog.fa.gz"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(mtime, UNIX_EPOCH + Duration::from_secs(JUL_2017_SECS));
}

#[tokio::test]
async fn unknown_version_fails_without_touching_existing_files() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vog.lca.tsv.gz"), b"kept").unwrap();

    let err = vog_sync_http::sync(&source(&server), "vog999", dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Network { .. }));
    assert_eq!(file_names(dir.path()), ["vog.lca.tsv.gz"]);
}

#[tokio::test]
async fn invalid_version_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let err = vog_sync_http::sync(&source(&server), "../secret", dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Config(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn simultaneous_syncs_of_one_directory_both_complete() {
    let server = MockServer::start().await;
    mount_listing(&server, "/vog/latest/", &["vog.fa.gz", "vog.lca.tsv.gz"]).await;
    mount_file(&server, "/vog/latest/vog.fa.gz", &gzip(b">s\nA\n"), SEP_2001).await;
    mount_file(&server, "/vog/latest/vog.lca.tsv.gz", &gzip(b"lca"), SEP_2001).await;
    let dir = tempfile::tempdir().unwrap();
    let source = source(&server);

    let (first, second) = tokio::time::timeout(Duration::from_secs(30), async {
        tokio::join!(
            vog_sync_http::sync(&source, "latest", dir.path()),
            vog_sync_http::sync(&source, "latest", dir.path())
        )
    })
    .await
    .unwrap();
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.fetched.len() + second.fetched.len(), 2);
    assert_eq!(downloads_of(&server, "/vog/latest/vog.fa.gz").await, 1);
    assert_eq!(downloads_of(&server, "/vog/latest/vog.lca.tsv.gz").await, 1);
    assert_eq!(
        file_names(dir.path()),
        ["vog.fa", "vog.fa.gz", "vog.lca.tsv.gz"]
    );
}
