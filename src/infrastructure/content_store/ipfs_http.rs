use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::form_urlencoded;

use super::store_interface::{
    AddEntry, AddOptions, ByteStream, ContentStore, ContentStoreFactory, EntryStream, GetOptions,
    StoreEntry, StoreError,
};
use crate::domain::value_objects::content_source::ContentSource;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const DIRECTORY_MIME: &str = "application/x-directory";
const FILE_MIME: &str = "application/octet-stream";

/// Link type of a directory in `ls` responses
const LINK_TYPE_DIRECTORY: i32 = 1;

fn build_http_client() -> Result<Client, StoreError> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .build()
        .map_err(|e| StoreError::http(format!("Failed to create HTTP client: {}", e)))
}

fn map_http_error(endpoint: &str, error: reqwest::Error) -> StoreError {
    if error.is_connect() || error.is_timeout() {
        StoreError::unreachable(endpoint, error.to_string())
    } else if let Some(status) = error.status() {
        StoreError::request_failed(status.as_u16(), error.to_string())
    } else {
        StoreError::http(error.to_string())
    }
}

/// Percent-encode a path for the multipart `filename` parameter
fn encode_filename(path: &str) -> String {
    form_urlencoded::byte_serialize(path.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Multipart layout of an add: every directory part precedes the files below it
fn multipart_layout(entries: &[AddEntry]) -> Vec<(String, Option<usize>)> {
    let mut seen = HashSet::new();
    let mut layout = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let parts: Vec<&str> = entry.path.split('/').filter(|p| !p.is_empty()).collect();
        for depth in 1..parts.len() {
            let dir = parts[..depth].join("/");
            if seen.insert(dir.clone()) {
                layout.push((dir, None));
            }
        }
        layout.push((parts.join("/"), Some(index)));
    }

    layout
}

#[derive(Debug, Deserialize)]
struct AddResponseLine {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Hash")]
    hash: String,
}

/// Pick the resulting cid from the NDJSON body of an add
///
/// The wrapping directory is reported with an empty name; otherwise the last
/// line is the root.
fn parse_add_response(body: &str) -> Result<String, StoreError> {
    let lines = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str::<AddResponseLine>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::invalid_response(e.to_string()))?;

    lines
        .iter()
        .find(|line| line.name.is_empty())
        .or_else(|| lines.last())
        .map(|line| line.hash.clone())
        .ok_or_else(|| StoreError::invalid_response("add returned no entries"))
}

#[derive(Debug, Deserialize)]
struct LsResponse {
    #[serde(rename = "Objects", default)]
    objects: Vec<LsObject>,
}

#[derive(Debug, Deserialize)]
struct LsObject {
    #[serde(rename = "Links", default)]
    links: Vec<LsLink>,
}

#[derive(Debug, Deserialize)]
struct LsLink {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    link_type: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingNode {
    path: String,
    is_directory: bool,
}

fn parse_ls_response(parent: &str, response: LsResponse) -> Vec<PendingNode> {
    response
        .objects
        .into_iter()
        .flat_map(|object| object.links)
        .map(|link| PendingNode {
            path: format!("{}/{}", parent, link.name),
            is_directory: link.link_type == LINK_TYPE_DIRECTORY,
        })
        .collect()
}

/// Kubo RPC client shared by the store and its retrieval streams
#[derive(Clone)]
struct RpcClient {
    http: Client,
    api_url: String,
    timeout: Option<Duration>,
}

impl RpcClient {
    fn post(&self, command: &str) -> RequestBuilder {
        let request = self.http.post(format!("{}/{}", self.api_url, command));
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| map_http_error(&self.api_url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::request_failed(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn ls(&self, path: &str) -> Result<Vec<PendingNode>, StoreError> {
        let response = self.send(self.post("ls").query(&[("arg", path)])).await?;
        let listing: LsResponse = response
            .json()
            .await
            .map_err(|e| StoreError::invalid_response(e.to_string()))?;
        Ok(parse_ls_response(path, listing))
    }

    async fn cat(&self, path: &str) -> Result<ByteStream, StoreError> {
        let response = self.send(self.post("cat").query(&[("arg", path)])).await?;
        let endpoint = self.api_url.clone();
        Ok(response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| map_http_error(&endpoint, e))
            })
            .boxed())
    }
}

/// Depth-first walk over a tree, one RPC per visited node
struct TreeWalk {
    rpc: RpcClient,
    pending: Vec<PendingNode>,
}

impl TreeWalk {
    fn push_children(&mut self, children: Vec<PendingNode>) {
        self.pending.extend(children.into_iter().rev());
    }

    async fn next_entry(mut self) -> Result<Option<(StoreEntry, Self)>, StoreError> {
        let Some(node) = self.pending.pop() else {
            return Ok(None);
        };

        if node.is_directory {
            let children = self.rpc.ls(&node.path).await?;
            self.push_children(children);
            Ok(Some((StoreEntry::directory(node.path), self)))
        } else {
            let content = self.rpc.cat(&node.path).await?;
            Ok(Some((StoreEntry::file(node.path, content), self)))
        }
    }
}

/// ContentStore over the Kubo-compatible HTTP RPC API
pub struct IpfsHttpStore {
    rpc: RpcClient,
}

impl IpfsHttpStore {
    pub fn new(source: &ContentSource) -> Result<Self, StoreError> {
        Ok(Self::with_client(build_http_client()?, source))
    }

    pub fn with_client(client: Client, source: &ContentSource) -> Self {
        Self {
            rpc: RpcClient {
                http: client,
                api_url: source.api_url(),
                timeout: None,
            },
        }
    }

    pub fn api_url(&self) -> &str {
        &self.rpc.api_url
    }
}

#[async_trait]
impl ContentStore for IpfsHttpStore {
    async fn add(&self, entries: Vec<AddEntry>, options: &AddOptions) -> Result<String, StoreError> {
        let layout = multipart_layout(&entries);
        let mut entries: Vec<Option<AddEntry>> = entries.into_iter().map(Some).collect();

        let mut form = Form::new();
        for (path, index) in layout {
            let (content, mime) = match index.and_then(|i| entries[i].take()) {
                Some(entry) => (entry.content, FILE_MIME),
                None => (Vec::new(), DIRECTORY_MIME),
            };
            let part = Part::bytes(content)
                .file_name(encode_filename(&path))
                .mime_str(mime)
                .map_err(|e| StoreError::http(e.to_string()))?;
            form = form.part("file", part);
        }

        let wrap = if options.wrap_with_directory { "true" } else { "false" };
        let request = self
            .rpc
            .post("add")
            .query(&[("pin", "true"), ("wrap-with-directory", wrap)])
            .multipart(form);

        let body = self
            .rpc
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| StoreError::invalid_response(e.to_string()))?;

        let cid = parse_add_response(&body)?;
        debug!("Added content {} via {}", cid, self.rpc.api_url);
        Ok(cid)
    }

    async fn get(&self, cid: &str, options: &GetOptions) -> Result<EntryStream, StoreError> {
        let rpc = RpcClient {
            timeout: options.timeout,
            ..self.rpc.clone()
        };

        let mut walk = TreeWalk {
            rpc,
            pending: Vec::new(),
        };
        let children = walk.rpc.ls(cid).await?;
        walk.push_children(children);

        Ok(stream::try_unfold(walk, TreeWalk::next_entry).boxed())
    }

    async fn check_reachable(&self) -> Result<(), StoreError> {
        self.rpc.send(self.rpc.post("version")).await?;
        Ok(())
    }
}

/// Builds one IpfsHttpStore per source over a shared HTTP client
pub struct IpfsStoreFactory {
    client: Client,
}

impl IpfsStoreFactory {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

impl ContentStoreFactory for IpfsStoreFactory {
    fn connect(&self, source: &ContentSource) -> Result<Arc<dyn ContentStore>, StoreError> {
        Ok(Arc::new(IpfsHttpStore::with_client(
            self.client.clone(),
            source,
        )))
    }
}
