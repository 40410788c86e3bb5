//! Delete repository objects named by path or URL

use crate::config::ClientConfig;
use crate::contents::{CommitInfo, Contents, ContentsApi, CDN_HOST, RAW_HOST};
use crate::error::{Error, Result};
use percent_encoding::percent_decode_str;
use url::Url;

/// A completed delete
#[derive(Debug, Clone)]
pub struct DeletedFile {
    pub path: String,
    /// Version identifier the delete was conditioned on
    pub sha: String,
    pub commit: CommitInfo,
}

/// One item of a delete batch
#[derive(Debug)]
pub struct DeleteOutcome {
    pub input: String,
    pub result: Result<DeletedFile>,
}

/// Deletes repository objects through a contents API
pub struct Deleter<C> {
    api: C,
}

impl<C: ContentsApi> Deleter<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    /// Resolve `input` against the configured repository
    pub fn parse_path(&self, input: &str) -> String {
        parse_path(self.api.config(), input)
    }

    /// Resolve, read the current sha, then delete conditioned on it
    pub async fn try_delete(&self, input: &str) -> Result<DeletedFile> {
        let path = self.parse_path(input);
        let path = path.trim_start_matches('/');
        tracing::debug!(input, path, "resolved");

        let record = match self.api.get_contents(path).await {
            Ok(Contents::Single(record)) => record,
            Ok(Contents::Listing(_)) => {
                return Err(Error::InvalidInput(format!(
                    "{} is a directory, only files can be deleted",
                    path
                )));
            }
            Err(Error::NotFound(_)) => {
                return Err(Error::NotFound(format!(
                    "{} does not exist in {}",
                    path,
                    self.api.config().display_target()
                )));
            }
            Err(e) => return Err(e),
        };

        let commit = self
            .api
            .delete_file(path, &record.sha, &format!("Delete {}", path))
            .await?;

        tracing::info!(path, sha = %record.sha, "deleted");

        Ok(DeletedFile {
            path: path.to_string(),
            sha: record.sha,
            commit,
        })
    }

    /// Delete one object; a failure is logged and returned, never raised
    pub async fn delete_one(&self, input: &str) -> DeleteOutcome {
        let result = self.try_delete(input).await;
        if let Err(e) = &result {
            tracing::error!(input, error = %e, "could not delete");
        }

        DeleteOutcome {
            input: input.to_string(),
            result,
        }
    }

    /// Delete every input in order, whatever the individual outcomes
    pub async fn delete_many<S: AsRef<str>>(&self, inputs: &[S]) {
        for input in inputs {
            self.delete_one(input.as_ref()).await;
        }
    }
}

/// Turn a path or URL into a repository-relative path.
///
/// URLs are tried against the raw-content host, then the jsDelivr mirror,
/// then a search for `<repo>…<branch>/`. Anything else, bare paths
/// included, comes back unchanged.
pub fn parse_path(config: &ClientConfig, input: &str) -> String {
    let url = match Url::parse(input.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => return input.to_string(),
    };

    if let Some(path) = match_raw_url(config, &url).or_else(|| match_cdn_url(config, &url)) {
        return path;
    }

    if let Some(path) = match_after_branch(config, &url).map(|p| decode(&p)) {
        tracing::warn!(input, path = %path, "unsupported URL shape, path guessed from branch name");
        return path;
    }

    input.to_string()
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Non-empty path segments, percent-decoded
fn segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).map(decode).collect())
        .unwrap_or_default()
}

/// `raw.githubusercontent.com/<owner>/<repo>/<branch>/<path>`
fn match_raw_url(config: &ClientConfig, url: &Url) -> Option<String> {
    if url.host_str()? != RAW_HOST {
        return None;
    }

    match segments(url).as_slice() {
        [owner, repo, branch, rest @ ..]
            if !rest.is_empty()
                && owner.eq_ignore_ascii_case(&config.owner)
                && repo.eq_ignore_ascii_case(&config.repo)
                && *branch == config.branch =>
        {
            Some(rest.join("/"))
        }
        _ => None,
    }
}

/// `cdn.jsdelivr.net/gh/<owner>/<repo>[@<branch>]/<path>`
fn match_cdn_url(config: &ClientConfig, url: &Url) -> Option<String> {
    if url.host_str()? != CDN_HOST {
        return None;
    }

    match segments(url).as_slice() {
        [gh, owner, repo_ref, rest @ ..]
            if gh == "gh" && !rest.is_empty() && owner.eq_ignore_ascii_case(&config.owner) =>
        {
            let (repo, branch) = match repo_ref.split_once('@') {
                Some((repo, branch)) => (repo, Some(branch)),
                None => (repo_ref.as_str(), None),
            };

            let same_branch = branch.map_or(true, |b| b == config.branch);
            (repo.eq_ignore_ascii_case(&config.repo) && same_branch).then(|| rest.join("/"))
        }
        _ => None,
    }
}

/// Best effort: everything after the first `<branch>/` that follows the repo name
fn match_after_branch(config: &ClientConfig, url: &Url) -> Option<String> {
    let mut bare = url.clone();
    bare.set_query(None);
    bare.set_fragment(None);
    let text = bare.as_str();

    let repo_at = text.find(config.repo.as_str())?;
    let after_repo = &text[repo_at + config.repo.len()..];

    let marker = format!("{}/", config.branch);
    let (branch_at, _) = after_repo.match_indices(marker.as_str()).find(|(at, _)| {
        matches!(after_repo[..*at].chars().last(), Some('/') | Some('@'))
    })?;

    let path = &after_repo[branch_at + marker.len()..];
    (!path.is_empty()).then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeContents;

    fn config() -> ClientConfig {
        ClientConfig::new("acme", "pics", "ghp_test", "main")
    }

    #[test]
    fn test_parse_raw_url() {
        let path = parse_path(
            &config(),
            "https://raw.githubusercontent.com/acme/pics/main/images/old.png",
        );
        assert_eq!(path, "images/old.png");
    }

    #[test]
    fn test_parse_cdn_url_with_branch() {
        let path = parse_path(
            &config(),
            "https://cdn.jsdelivr.net/gh/acme/pics@main/images/deep/old.png",
        );
        assert_eq!(path, "images/deep/old.png");
    }

    #[test]
    fn test_parse_cdn_url_without_branch() {
        let path = parse_path(&config(), "https://cdn.jsdelivr.net/gh/acme/pics/images/old.png");
        assert_eq!(path, "images/old.png");
    }

    #[test]
    fn test_parse_bare_path_unchanged() {
        assert_eq!(parse_path(&config(), "images/old.png"), "images/old.png");
        assert_eq!(parse_path(&config(), "old.png"), "old.png");
    }

    #[test]
    fn test_parse_path_idempotent_on_bare_paths() {
        for input in ["images/old.png", "a/b/c.txt", "/leading.png", "C:/not/a/url.png", ""] {
            let once = parse_path(&config(), input);
            assert_eq!(parse_path(&config(), &once), once);
        }
    }

    #[test]
    fn test_parse_unsupported_url_shape_uses_branch_fallback() {
        // github.com blob pages are not a recognised shape; the branch search guesses the path
        let path = parse_path(
            &config(),
            "https://github.com/acme/pics/blob/main/images/old.png?raw=true",
        );
        assert_eq!(path, "images/old.png");
    }

    #[test]
    fn test_parse_unsupported_url_shape_without_match_is_unchanged() {
        let input = "https://example.com/some/other/file.png";
        assert_eq!(parse_path(&config(), input), input);
    }

    #[test]
    fn test_raw_url_for_other_repository_is_not_trusted() {
        let input = "https://raw.githubusercontent.com/someone/else/dev/images/old.png";
        assert_eq!(parse_path(&config(), input), input);
    }

    #[test]
    fn test_parse_decodes_escaped_names() {
        assert_eq!(
            parse_path(
                &config(),
                "https://raw.githubusercontent.com/acme/pics/main/images/my%20photo.png",
            ),
            "images/my photo.png"
        );
        assert_eq!(
            parse_path(&config(), "https://cdn.jsdelivr.net/gh/acme/pics@main/images/caf%C3%A9.png"),
            "images/café.png"
        );
        assert_eq!(
            parse_path(&config(), "https://github.com/acme/pics/blob/main/images/report%20%233.png"),
            "images/report #3.png"
        );
    }

    #[test]
    fn test_branch_must_follow_a_separator() {
        let config = ClientConfig::new("acme", "pics", "ghp_test", "in");
        let path = parse_path(&config, "https://example.com/pics/plugin/x/in/a.png");
        assert_eq!(path, "a.png");
    }

    #[tokio::test]
    async fn test_delete_by_url() {
        let api = FakeContents::new()
            .with_file("images/old.png", b"old")
            .with_file("images/keep.png", b"keep");
        let deleter = Deleter::new(api);

        let deleted = deleter
            .try_delete("https://raw.githubusercontent.com/acme/pics/main/images/old.png")
            .await
            .unwrap();

        assert_eq!(deleted.path, "images/old.png");
        assert_eq!(deleted.sha, "sha-1");
        assert_eq!(deleter.api().paths(), vec!["images/keep.png".to_string()]);
        assert_eq!(
            deleter.api().requests(),
            vec!["GET images/old.png".to_string(), "DELETE images/old.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_by_url_with_escaped_name() {
        let deleter = Deleter::new(FakeContents::new().with_file("images/my photo.png", b"old"));

        let deleted = deleter
            .try_delete("https://raw.githubusercontent.com/acme/pics/main/images/my%20photo.png")
            .await
            .unwrap();

        assert_eq!(deleted.path, "images/my photo.png");
        assert!(deleter.api().paths().is_empty());
        assert_eq!(
            deleter.api().requests(),
            vec![
                "GET images/my photo.png".to_string(),
                "DELETE images/my photo.png".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_reports_not_found() {
        let deleter = Deleter::new(FakeContents::new());

        let err = deleter.try_delete("images/ghost.png").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("images/ghost.png"));
        assert_eq!(deleter.api().requests(), vec!["GET images/ghost.png".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_directory_is_rejected() {
        let deleter = Deleter::new(FakeContents::new().with_file("images/a.png", b"a"));

        let err = deleter.try_delete("images").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(deleter.api().paths(), vec!["images/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_many_continues_after_not_found() {
        let api = FakeContents::new()
            .with_file("a.png", b"a")
            .with_file("c.png", b"c");
        let deleter = Deleter::new(api);

        deleter.delete_many(&["a.png", "b.png", "c.png"]).await;

        assert!(deleter.api().paths().is_empty());
        assert_eq!(
            deleter.api().requests(),
            vec![
                "GET a.png".to_string(),
                "DELETE a.png".to_string(),
                "GET b.png".to_string(),
                "GET c.png".to_string(),
                "DELETE c.png".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_one_swallows_errors() {
        let deleter = Deleter::new(FakeContents::new());

        let outcome = deleter.delete_one("missing.png").await;
        assert_eq!(outcome.input, "missing.png");
        assert!(outcome.result.unwrap_err().is_not_found());
        assert!(deleter.delete_one("").await.result.is_err());
        assert_eq!(deleter.api().requests().len(), 2);
    }
}
