//! Fetches pipeline payloads over HTTP.

use log::{debug, warn};
use thiserror::Error;

use super::pipeline::GeneratedRepoData;

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("request for {url} failed: {source}")]
	Transport {
		url: String,
		#[source]
		source: reqwest::Error,
	},
	#[error("{url} answered with status {status}")]
	Status { url: String, status: u16 },
}

pub fn manifest_url(base: &str) -> String {
	format!("{}/manifest.json", base.trim_end_matches('/'))
}

pub fn repo_url(base: &str, repo_id: &str) -> String {
	format!("{}/{repo_id}.json", base.trim_end_matches('/'))
}

async fn get_json<T: serde::de::DeserializeOwned>(url: String) -> Result<T, LoadError> {
	let response = reqwest::get(&url).await.map_err(|source| LoadError::Transport {
		url: url.clone(),
		source,
	})?;
	let status = response.status();
	if !status.is_success() {
		return Err(LoadError::Status {
			url,
			status: status.as_u16(),
		});
	}
	response
		.json::<T>()
		.await
		.map_err(|source| LoadError::Transport { url, source })
}

/// Ids of every generated repository. A missing or malformed manifest is
/// treated as empty.
pub async fn fetch_manifest(base: &str) -> Vec<String> {
	match get_json::<serde_json::Value>(manifest_url(base)).await {
		Ok(serde_json::Value::Array(items)) => items
			.into_iter()
			.filter_map(|v| v.as_str().map(str::to_owned))
			.collect(),
		Ok(_) => {
			warn!("manifest is not a list; no repositories available");
			Vec::new()
		}
		Err(err) => {
			warn!("{err}");
			Vec::new()
		}
	}
}

pub async fn fetch_repo(base: &str, repo_id: &str) -> Result<GeneratedRepoData, LoadError> {
	let data: GeneratedRepoData = get_json(repo_url(base, repo_id)).await?;
	debug!(
		"loaded {repo_id}: {} module nodes, {} file nodes",
		data.module_nodes.len(),
		data.file_nodes.len()
	);
	Ok(data)
}
