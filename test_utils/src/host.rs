//! A stand-in for the hosting service's REST API, answering `compare` and
//! `commits` requests from a local [`GitTestRepo`].

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::{mpsc, Arc},
    thread::JoinHandle,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat};
use git2::{Oid, Repository, Sort};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::git::GitTestRepo;

const DEFAULT_PER_PAGE: usize = 250;

#[derive(Clone)]
struct HostState {
    dir: Arc<PathBuf>,
    owner: String,
    name: String,
}

#[derive(Deserialize)]
struct PageParams {
    per_page: Option<usize>,
    page: Option<usize>,
}

type ApiError = (StatusCode, String);

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, "Not Found".to_string())
}

pub struct HostApi {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HostApi {
    /// Serve `test_repo` as `full_name` (`OWNER/REPO`) on a free local port.
    pub fn start(test_repo: &GitTestRepo, full_name: &str) -> Self {
        let (owner, name) = full_name
            .split_once('/')
            .expect("full_name to be in OWNER/REPO format");
        let state = HostState {
            dir: Arc::new(test_repo.dir.clone()),
            owner: owner.to_string(),
            name: name.to_string(),
        };
        let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime to build");
            runtime.block_on(async move {
                let app = Router::new()
                    .route("/repos/:owner/:repo/compare/*basehead", get(compare))
                    .route("/repos/:owner/:repo/commits/*reference", get(commit))
                    .with_state(state)
                    .fallback(|| async { error_response(not_found()) });

                let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
                let server = axum::Server::try_bind(&addr)
                    .expect("a free local port")
                    .serve(app.into_make_service());
                addr_tx
                    .send(server.local_addr())
                    .expect("HostApi::start to be waiting for the address");
                server
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("fake host api to serve");
            });
        });

        let addr = addr_rx.recv().expect("fake host api to report its address");
        Self {
            url: format!("http://{addr}"),
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Base URL to use in place of `https://api.github.com`.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for HostApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn error_response((status, message): ApiError) -> Response {
    (
        status,
        Json(json!({
            "message": message,
            "documentation_url": "https://docs.github.com/rest",
        })),
    )
        .into_response()
}

async fn compare(
    State(state): State<HostState>,
    Path((owner, repo, basehead)): Path<(String, String, String)>,
    Query(page): Query<PageParams>,
) -> Response {
    match compare_json(&state, &owner, &repo, &basehead, &page) {
        Ok(body) => Json(body).into_response(),
        Err(e) => error_response(e),
    }
}

async fn commit(
    State(state): State<HostState>,
    Path((owner, repo, reference)): Path<(String, String, String)>,
) -> Response {
    match commit_by_ref_json(&state, &owner, &repo, &reference) {
        Ok(body) => Json(body).into_response(),
        Err(e) => error_response(e),
    }
}

fn open(state: &HostState, owner: &str, repo: &str) -> Result<Repository, ApiError> {
    if owner != state.owner || repo != state.name {
        return Err(not_found());
    }
    Repository::open(state.dir.as_path())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

fn find_oid(git_repo: &Repository, reference: &str) -> Option<Oid> {
    git_repo
        .revparse_single(reference)
        .and_then(|o| o.peel_to_commit())
        .map(|c| c.id())
        .ok()
}

fn compare_json(
    state: &HostState,
    owner: &str,
    repo: &str,
    basehead: &str,
    page: &PageParams,
) -> Result<Value, ApiError> {
    let git_repo = open(state, owner, repo)?;
    let (base, head) = basehead
        .trim_start_matches('/')
        .split_once("...")
        .ok_or_else(not_found)?;
    let base_oid = find_oid(&git_repo, base).ok_or_else(not_found)?;
    let head_oid = find_oid(&git_repo, head).ok_or_else(not_found)?;
    let internal = |e: git2::Error| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string());

    let merge_base = git_repo.merge_base(base_oid, head_oid).map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            format!("No common ancestor between {base} and {head}."),
        )
    })?;

    let mut revwalk = git_repo.revwalk().map_err(internal)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
        .map_err(internal)?;
    revwalk.push(head_oid).map_err(internal)?;
    revwalk.hide(base_oid).map_err(internal)?;
    let ahead = revwalk.collect::<Result<Vec<Oid>, _>>().map_err(internal)?;

    let (ahead_by, behind_by) = git_repo
        .graph_ahead_behind(head_oid, base_oid)
        .map_err(internal)?;
    let status = match (ahead_by, behind_by) {
        (0, 0) => "identical",
        (_, 0) => "ahead",
        (0, _) => "behind",
        _ => "diverged",
    };

    let per_page = page.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let page_number = page.page.unwrap_or(1).max(1);
    let commits = ahead
        .iter()
        .skip((page_number - 1) * per_page)
        .take(per_page)
        .map(|oid| commit_json(&git_repo, state, *oid))
        .collect::<Result<Vec<Value>, ApiError>>()?;

    Ok(json!({
        "status": status,
        "ahead_by": ahead_by,
        "behind_by": behind_by,
        "total_commits": ahead.len(),
        "base_commit": commit_json(&git_repo, state, base_oid)?,
        "merge_base_commit": commit_json(&git_repo, state, merge_base)?,
        "commits": commits,
    }))
}

fn commit_by_ref_json(
    state: &HostState,
    owner: &str,
    repo: &str,
    reference: &str,
) -> Result<Value, ApiError> {
    let git_repo = open(state, owner, repo)?;
    let reference = reference.trim_start_matches('/');
    let oid = find_oid(&git_repo, reference).ok_or_else(|| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("No commit found for SHA: {reference}"),
        )
    })?;
    commit_json(&git_repo, state, oid)
}

fn commit_json(git_repo: &Repository, state: &HostState, oid: Oid) -> Result<Value, ApiError> {
    let commit = git_repo
        .find_commit(oid)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let sha = oid.to_string();
    Ok(json!({
        "sha": sha,
        "html_url": format!("https://github.com/{}/{}/commit/{sha}", state.owner, state.name),
        "commit": {
            "message": commit.message().unwrap_or_default(),
            "author": signature_json(&commit.author()),
            "committer": signature_json(&commit.committer()),
        },
        "parents": commit
            .parent_ids()
            .map(|p| json!({
                "sha": p.to_string(),
                "url": format!("/repos/{}/{}/commits/{p}", state.owner, state.name),
            }))
            .collect::<Vec<Value>>(),
    }))
}

fn signature_json(signature: &git2::Signature) -> Value {
    let date = DateTime::from_timestamp(signature.when().seconds(), 0)
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true));
    json!({
        "name": signature.name().unwrap_or_default(),
        "email": signature.email().unwrap_or_default(),
        "date": date,
    })
}
