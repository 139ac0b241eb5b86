//! Runs the real router on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use noteworthy::alignment::{AlignmentRepository, FileAlignmentRepository};
use noteworthy::feedback::{FeedbackDeduplicator, FileFeedbackStore};
use noteworthy::gateway::{HandlerState, create_router_with_state};
use noteworthy::model::MockModelBackend;

use super::fixtures::{example_wiki, session, split_decision_backend};

pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<MockModelBackend>,
    pub feedback_dir: TempDir,
    pub alignment_dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts a server over the canned wiki, file-backed stores and alignment round 1.
pub async fn spawn_test_server() -> anyhow::Result<TestServer> {
    let feedback_dir = TempDir::new()?;
    let alignment_dir = TempDir::new()?;
    std::fs::write(
        alignment_dir.path().join("alignment_1.txt"),
        "Changes in status or affiliation are noteworthy.",
    )?;

    let backend = Arc::new(split_decision_backend());
    let alignments: Arc<dyn AlignmentRepository> =
        Arc::new(FileAlignmentRepository::new(alignment_dir.path()));
    let state = HandlerState::new(
        session(Arc::new(example_wiki()), backend.clone(), alignments),
        FeedbackDeduplicator::new(Arc::new(FileFeedbackStore::new(feedback_dir.path()))),
    )
    .with_mock_provider(true);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router_with_state(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        addr,
        backend,
        feedback_dir,
        alignment_dir,
        handle,
    })
}
