use super::vcs_interface::{
    BlobInfo, BranchOptions, CheckoutOptions, CloneRequest, CommitInfo, CommitOptions, GitAuth,
    InitOptions, LogOptions, Person, ReadBlobOptions, RemoteInfo, StatusRow, TransferOptions,
    VcsError, VersionControl,
};
use crate::domain::value_objects::git_url::GitUrl;
use async_trait::async_trait;
use git2::{
    BranchType, ErrorCode, ObjectType, Repository, Signature, Sort, Status, StatusOptions,
    TreeWalkMode, TreeWalkResult,
};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Git engine
///
/// Local reads go through libgit2. Mutations and network transport run the
/// `git` executable so that the user's transport configuration applies.
pub struct GitEngine {
    git_executable: String,
}

impl Default for GitEngine {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
        }
    }
}

impl GitEngine {
    /// Create a new Git engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a git command in the given directory
    async fn execute_git_command(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
        envs: &[(&str, &str)],
    ) -> Result<std::process::Output, VcsError> {
        let mut cmd = Command::new(&self.git_executable);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        for (key, value) in envs {
            cmd.env(key, value);
        }

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VcsError::executable_not_found(&self.git_executable),
            _ => VcsError::from(e),
        })
    }

    /// Execute a git command and check for success
    ///
    /// The token of `auth` never appears in the returned error.
    async fn execute_git_command_checked(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
        auth: Option<&GitAuth>,
    ) -> Result<String, VcsError> {
        let output = self.execute_git_command(args, working_dir, &[]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let command = format!("{} {}", self.git_executable, args.join(" "));
            return Err(VcsError::command_failed(
                redact_token(&command, auth),
                output.status.code().unwrap_or(-1),
                redact_token(&stderr, auth),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a libgit2 read on the blocking pool
    async fn with_repository<T, F>(dir: &Path, f: F) -> Result<T, VcsError>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T, VcsError> + Send + 'static,
    {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let repo = Repository::open(&dir).map_err(|_| VcsError::RepositoryNotFound {
                path: dir.display().to_string(),
            })?;
            f(&repo)
        })
        .await
        .map_err(|e| VcsError::internal(format!("git task failed: {}", e)))?
    }

    /// Remote URL with the token embedded, or the remote name when there is no token
    async fn transfer_target(
        &self,
        dir: &Path,
        options: &TransferOptions,
    ) -> Result<String, VcsError> {
        let Some(auth) = &options.auth else {
            return Ok(options.remote.clone());
        };

        let remote = options.remote.clone();
        let url = Self::with_repository(dir, move |repo| {
            let found = repo.find_remote(&remote)?;
            found
                .url()
                .map(str::to_string)
                .ok_or_else(|| VcsError::InvalidUrl { url: remote.clone() })
        })
        .await?;

        GitUrl::new(&url)
            .with_token(&auth.token)
            .map_err(|_| VcsError::InvalidUrl {
                url: GitUrl::redact(&url),
            })
    }

    /// Branch to transfer: the requested one, else the checked out branch
    async fn transfer_branch(
        &self,
        dir: &Path,
        options: &TransferOptions,
    ) -> Result<String, VcsError> {
        if let Some(reference) = &options.reference {
            return Ok(reference.clone());
        }
        self.current_branch(dir)
            .await?
            .ok_or_else(|| VcsError::reference_not_found("HEAD is detached"))
    }
}

/// Replace every occurrence of the token with a placeholder
fn redact_token(text: &str, auth: Option<&GitAuth>) -> String {
    match auth {
        Some(auth) if !auth.token.is_empty() => text.replace(&auth.token, "***"),
        _ => text.to_string(),
    }
}

fn person(signature: &Signature<'_>) -> Person {
    Person {
        name: signature.name().unwrap_or_default().to_string(),
        email: signature.email().unwrap_or_default().to_string(),
        timestamp: signature.when().seconds(),
    }
}

/// Map libgit2 status flags onto the `[head, workdir, stage]` matrix
fn status_row(path: &str, flags: Status) -> StatusRow {
    let head = if flags.is_index_new() || (flags.is_wt_new() && !flags.is_index_deleted()) {
        0
    } else {
        1
    };

    let workdir = if flags.is_wt_deleted() || (flags.is_index_deleted() && !flags.is_wt_new()) {
        0
    } else if head == 0
        || flags.is_wt_modified()
        || flags.is_index_modified()
        || flags.is_index_deleted()
    {
        2
    } else {
        1
    };

    let stage = if flags.is_index_deleted() || (flags.is_wt_new() && !flags.is_index_new()) {
        0
    } else if flags.is_index_new() || flags.is_index_modified() {
        if flags.is_wt_modified() || flags.is_wt_deleted() {
            3
        } else {
            2
        }
    } else {
        1
    };

    StatusRow {
        path: path.to_string(),
        head,
        workdir,
        stage,
    }
}

fn matches_filter(path: &str, filepaths: &[String]) -> bool {
    filepaths.is_empty()
        || filepaths.iter().any(|filter| {
            let filter = filter.trim_end_matches('/');
            filter.is_empty()
                || filter == "."
                || path == filter
                || path.starts_with(&format!("{}/", filter))
        })
}

#[async_trait]
impl VersionControl for GitEngine {
    async fn init(&self, dir: &Path, options: &InitOptions) -> Result<(), VcsError> {
        tokio::fs::create_dir_all(dir).await?;
        let initial_branch = format!("--initial-branch={}", options.default_branch);
        self.execute_git_command_checked(&["init", "--quiet", &initial_branch], Some(dir), None)
            .await?;
        Ok(())
    }

    async fn add(&self, dir: &Path, filepath: &str) -> Result<(), VcsError> {
        self.execute_git_command_checked(&["add", "--", filepath], Some(dir), None)
            .await?;
        Ok(())
    }

    async fn remove(&self, dir: &Path, filepath: &str) -> Result<(), VcsError> {
        self.execute_git_command_checked(
            &["rm", "--cached", "-r", "--quiet", "--", filepath],
            Some(dir),
            None,
        )
        .await?;
        Ok(())
    }

    async fn checkout(&self, dir: &Path, options: &CheckoutOptions) -> Result<(), VcsError> {
        let tracking = options
            .remote
            .as_ref()
            .map(|remote| format!("{}/{}", remote, options.reference));
        let mut args = vec!["checkout"];

        if options.force {
            args.push("--force");
        }

        match &tracking {
            Some(tracking) => {
                args.extend(["-B", options.reference.as_str(), "--track", tracking.as_str()])
            }
            None => args.push(&options.reference),
        }

        self.execute_git_command_checked(&args, Some(dir), None)
            .await
            .map_err(|e| VcsError::checkout_failed(e.to_string()))?;
        Ok(())
    }

    async fn commit(&self, dir: &Path, options: &CommitOptions) -> Result<String, VcsError> {
        let args = ["commit", "--quiet", "-m", options.message.as_str()];

        let output = match &options.author {
            Some(author) => {
                let envs = [
                    ("GIT_AUTHOR_NAME", author.name.as_str()),
                    ("GIT_AUTHOR_EMAIL", author.email.as_str()),
                    ("GIT_COMMITTER_NAME", author.name.as_str()),
                    ("GIT_COMMITTER_EMAIL", author.email.as_str()),
                ];
                self.execute_git_command(&args, Some(dir), &envs).await?
            }
            None => self.execute_git_command(&args, Some(dir), &[]).await?,
        };

        if !output.status.success() {
            return Err(VcsError::command_failed(
                "git commit",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        self.execute_git_command_checked(&["rev-parse", "HEAD"], Some(dir), None)
            .await
    }

    async fn log(&self, dir: &Path, options: &LogOptions) -> Result<Vec<CommitInfo>, VcsError> {
        let options = options.clone();
        Self::with_repository(dir, move |repo| {
            let start = repo
                .revparse_single(&options.reference)
                .map_err(|_| VcsError::reference_not_found(&options.reference))?
                .peel_to_commit()?;

            let mut revwalk = repo.revwalk()?;
            revwalk.push(start.id())?;
            revwalk.set_sorting(Sort::TIME)?;

            let limit = options.depth.unwrap_or(usize::MAX);
            let mut commits = Vec::new();
            for oid in revwalk.take(limit) {
                let commit = repo.find_commit(oid?)?;
                commits.push(CommitInfo {
                    oid: commit.id().to_string(),
                    message: commit.message().unwrap_or_default().to_string(),
                    parents: commit.parent_ids().map(|p| p.to_string()).collect(),
                    tree: commit.tree_id().to_string(),
                    author: person(&commit.author()),
                    committer: person(&commit.committer()),
                });
            }
            Ok(commits)
        })
        .await
    }

    async fn branch(&self, dir: &Path, options: &BranchOptions) -> Result<(), VcsError> {
        if options.checkout {
            self.execute_git_command_checked(&["checkout", "-b", &options.name], Some(dir), None)
                .await?;
        } else {
            self.execute_git_command_checked(&["branch", &options.name], Some(dir), None)
                .await?;
        }
        Ok(())
    }

    async fn list_branches(
        &self,
        dir: &Path,
        remote: Option<&str>,
    ) -> Result<Vec<String>, VcsError> {
        let remote = remote.map(str::to_string);
        Self::with_repository(dir, move |repo| {
            let branch_type = match remote {
                Some(_) => BranchType::Remote,
                None => BranchType::Local,
            };

            let mut names = Vec::new();
            for entry in repo.branches(Some(branch_type))? {
                let (branch, _) = entry?;
                let Some(name) = branch.name()? else { continue };

                match &remote {
                    Some(remote) => {
                        if let Some(short) = name.strip_prefix(&format!("{}/", remote)) {
                            if short != "HEAD" {
                                names.push(short.to_string());
                            }
                        }
                    }
                    None => names.push(name.to_string()),
                }
            }
            Ok(names)
        })
        .await
    }

    async fn current_branch(&self, dir: &Path) -> Result<Option<String>, VcsError> {
        Self::with_repository(dir, |repo| match repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .map(|target| target.trim_start_matches("refs/heads/").to_string()))
            }
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn list_remotes(&self, dir: &Path) -> Result<Vec<RemoteInfo>, VcsError> {
        Self::with_repository(dir, |repo| {
            let mut remotes = Vec::new();
            for name in repo.remotes()?.iter().flatten() {
                let remote = repo.find_remote(name)?;
                remotes.push(RemoteInfo::new(name, remote.url().unwrap_or_default()));
            }
            Ok(remotes)
        })
        .await
    }

    async fn add_remote(&self, dir: &Path, remote: &RemoteInfo) -> Result<(), VcsError> {
        self.execute_git_command_checked(
            &["remote", "add", &remote.name, &remote.url],
            Some(dir),
            None,
        )
        .await?;
        Ok(())
    }

    async fn delete_remote(&self, dir: &Path, name: &str) -> Result<(), VcsError> {
        self.execute_git_command_checked(&["remote", "remove", name], Some(dir), None)
            .await?;
        Ok(())
    }

    async fn resolve_ref(&self, dir: &Path, reference: &str) -> Result<String, VcsError> {
        let reference = reference.to_string();
        Self::with_repository(dir, move |repo| {
            let object = repo
                .revparse_single(&reference)
                .map_err(|_| VcsError::reference_not_found(&reference))?;
            Ok(object.id().to_string())
        })
        .await
    }

    async fn read_blob(&self, dir: &Path, options: &ReadBlobOptions) -> Result<BlobInfo, VcsError> {
        let options = options.clone();
        Self::with_repository(dir, move |repo| {
            let tree = repo
                .revparse_single(&options.reference)
                .map_err(|_| VcsError::reference_not_found(&options.reference))?
                .peel_to_tree()?;
            let entry = tree
                .get_path(Path::new(&options.filepath))
                .map_err(|_| VcsError::reference_not_found(&options.filepath))?;
            let blob = repo.find_blob(entry.id())?;
            Ok(BlobInfo {
                oid: blob.id().to_string(),
                content: blob.content().to_vec(),
            })
        })
        .await
    }

    async fn list_files(
        &self,
        dir: &Path,
        reference: Option<&str>,
    ) -> Result<Vec<String>, VcsError> {
        let reference = reference.map(str::to_string);
        Self::with_repository(dir, move |repo| {
            let Some(reference) = reference else {
                let index = repo.index()?;
                return Ok(index
                    .iter()
                    .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
                    .collect());
            };

            let tree = repo
                .revparse_single(&reference)
                .map_err(|_| VcsError::reference_not_found(&reference))?
                .peel_to_tree()?;

            let mut files = Vec::new();
            tree.walk(TreeWalkMode::PreOrder, |root, entry| {
                if entry.kind() == Some(ObjectType::Blob) {
                    files.push(format!("{}{}", root, entry.name().unwrap_or_default()));
                }
                TreeWalkResult::Ok
            })?;
            Ok(files)
        })
        .await
    }

    async fn status_matrix(
        &self,
        dir: &Path,
        filepaths: &[String],
    ) -> Result<Vec<StatusRow>, VcsError> {
        let filepaths = filepaths.to_vec();
        Self::with_repository(dir, move |repo| {
            let mut status_options = StatusOptions::new();
            status_options
                .include_untracked(true)
                .recurse_untracked_dirs(true)
                .include_unmodified(true)
                .include_ignored(false);

            let statuses = repo.statuses(Some(&mut status_options))?;
            let rows: Vec<StatusRow> = statuses
                .iter()
                .filter(|entry| !entry.status().is_ignored())
                .filter_map(|entry| {
                    let path = entry.path()?.to_string();
                    matches_filter(&path, &filepaths).then(|| status_row(&path, entry.status()))
                })
                .collect();
            Ok(rows)
        })
        .await
    }

    async fn clone(&self, dir: &Path, request: &CloneRequest) -> Result<(), VcsError> {
        if let Some(parent) = dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // scp-style remotes other than GitHub authenticate with SSH keys
        let url = match &request.auth {
            Some(_) if GitUrl::is_scp_like(&GitUrl::normalize(&request.url)) => {
                debug!("Ignoring token for SSH remote {}", request.url);
                GitUrl::normalize(&request.url)
            }
            Some(auth) => GitUrl::new(&request.url)
                .with_token(&auth.token)
                .map_err(|e| VcsError::clone_failed(e.to_string()))?,
            None => GitUrl::normalize(&request.url),
        };
        let depth = request.depth.map(|d| d.to_string());
        let dest = dir.to_str().ok_or_else(|| VcsError::Internal {
            message: "Invalid destination path".to_string(),
        })?;

        let mut args = vec!["clone", "--quiet"];

        if let Some(depth) = &depth {
            args.push("--depth");
            args.push(depth);
        }

        if request.single_branch {
            args.push("--single-branch");
        } else if depth.is_some() {
            args.push("--no-single-branch");
        }

        if let Some(branch) = &request.branch {
            args.push("--branch");
            args.push(branch);
        }

        args.push("--");
        args.push(&url);
        args.push(dest);

        debug!("Cloning {} into {}", GitUrl::redact(&url), dir.display());

        self.execute_git_command_checked(&args, None, request.auth.as_ref())
            .await
            .map_err(|e| VcsError::clone_failed(e.to_string()))?;
        Ok(())
    }

    async fn push(&self, dir: &Path, options: &TransferOptions) -> Result<(), VcsError> {
        let target = self.transfer_target(dir, options).await?;
        let branch = self.transfer_branch(dir, options).await?;

        let mut args = vec!["push"];
        if options.force {
            args.push("--force");
        }
        args.push(&target);
        args.push(&branch);

        self.execute_git_command_checked(&args, Some(dir), options.auth.as_ref())
            .await
            .map_err(|e| VcsError::network_error(e.to_string()))?;
        Ok(())
    }

    async fn pull(&self, dir: &Path, options: &TransferOptions) -> Result<(), VcsError> {
        let target = self.transfer_target(dir, options).await?;
        let branch = self.transfer_branch(dir, options).await?;

        self.execute_git_command_checked(
            &["pull", "--no-rebase", &target, &branch],
            Some(dir),
            options.auth.as_ref(),
        )
        .await
        .map_err(|e| VcsError::network_error(e.to_string()))?;
        Ok(())
    }

    async fn fetch(&self, dir: &Path, options: &TransferOptions) -> Result<(), VcsError> {
        let target = self.transfer_target(dir, options).await?;

        let mut args = vec!["fetch", "--quiet", target.as_str()];

        // Fetching from a bare URL does not update remote-tracking refs
        let refspec = match (&options.auth, &options.reference) {
            (Some(_), Some(reference)) => Some(format!(
                "+refs/heads/{}:refs/remotes/{}/{}",
                reference, options.remote, reference
            )),
            (Some(_), None) => Some(format!(
                "+refs/heads/*:refs/remotes/{}/*",
                options.remote
            )),
            (None, Some(reference)) => Some(reference.clone()),
            (None, None) => None,
        };
        if let Some(refspec) = &refspec {
            args.push(refspec);
        }

        self.execute_git_command_checked(&args, Some(dir), options.auth.as_ref())
            .await
            .map_err(|e| VcsError::network_error(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{RepositoryInitOptions, Time};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn matrix(flags: Status) -> (u8, u8, u8) {
        let row = status_row("file.txt", flags);
        (row.head, row.workdir, row.stage)
    }

    #[test]
    fn test_status_row_mapping() {
        assert_eq!(matrix(Status::CURRENT), (1, 1, 1));
        assert_eq!(matrix(Status::WT_NEW), (0, 2, 0));
        assert_eq!(matrix(Status::INDEX_NEW), (0, 2, 2));
        assert_eq!(matrix(Status::INDEX_NEW | Status::WT_MODIFIED), (0, 2, 3));
        assert_eq!(matrix(Status::WT_MODIFIED), (1, 2, 1));
        assert_eq!(matrix(Status::INDEX_MODIFIED), (1, 2, 2));
        assert_eq!(matrix(Status::INDEX_MODIFIED | Status::WT_MODIFIED), (1, 2, 3));
        assert_eq!(matrix(Status::WT_DELETED), (1, 0, 1));
        assert_eq!(matrix(Status::INDEX_DELETED), (1, 0, 0));
    }

    #[test]
    fn test_redact_token() {
        let auth = GitAuth::new("ghp_secret");
        assert_eq!(
            redact_token("fatal: https://ghp_secret@github.com/org/repo", Some(&auth)),
            "fatal: https://***@github.com/org/repo"
        );
        assert_eq!(redact_token("plain", None), "plain");
    }

    #[test]
    fn test_matches_filter() {
        let filters = vec!["src".to_string()];
        assert!(matches_filter("src/lib.rs", &filters));
        assert!(!matches_filter("srcx/lib.rs", &filters));
        assert!(matches_filter("anything", &[]));
    }

    fn repository_with_commit() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let mut init = RepositoryInitOptions::new();
        init.initial_head("main");
        let repo = Repository::init_opts(temp_dir.path(), &init).unwrap();

        std::fs::create_dir_all(temp_dir.path().join("docs")).unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "hello").unwrap();
        std::fs::write(temp_dir.path().join("docs/guide.md"), "guide").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.add_path(Path::new("docs/guide.md")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature =
            Signature::new("Tester", "tester@example.com", &Time::new(1_700_000_000, 0)).unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
            .unwrap();

        temp_dir
    }

    #[tokio::test]
    async fn test_reads_through_libgit2() {
        let temp_dir = repository_with_commit();
        let engine = GitEngine::new();

        let log = engine
            .log(temp_dir.path(), &LogOptions::default())
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "initial");
        assert!(log[0].parents.is_empty());
        assert_eq!(log[0].committer.timestamp, 1_700_000_000);

        let head = engine.resolve_ref(temp_dir.path(), "HEAD").await.unwrap();
        assert_eq!(head, log[0].oid);

        let files = engine
            .list_files(temp_dir.path(), Some("HEAD"))
            .await
            .unwrap();
        assert_eq!(files, vec!["README.md".to_string(), "docs/guide.md".to_string()]);

        let blob = engine
            .read_blob(
                temp_dir.path(),
                &ReadBlobOptions {
                    reference: "HEAD".to_string(),
                    filepath: "docs/guide.md".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(blob.content, b"guide".to_vec());

        assert_eq!(
            engine.current_branch(temp_dir.path()).await.unwrap(),
            Some("main".to_string())
        );
        assert_eq!(
            engine.list_branches(temp_dir.path(), None).await.unwrap(),
            vec!["main".to_string()]
        );
        assert!(engine.list_remotes(temp_dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_matrix_reports_changes() {
        let temp_dir = repository_with_commit();
        std::fs::write(temp_dir.path().join("README.md"), "changed").unwrap();
        std::fs::write(temp_dir.path().join("new.txt"), "new").unwrap();

        let engine = GitEngine::new();
        let rows = engine.status_matrix(temp_dir.path(), &[]).await.unwrap();

        let find = |path: &str| {
            rows.iter()
                .find(|r| r.path == path)
                .map(|r| (r.head, r.workdir, r.stage))
        };
        assert_eq!(find("README.md"), Some((1, 2, 1)));
        assert_eq!(find("new.txt"), Some((0, 2, 0)));
        assert_eq!(find("docs/guide.md"), Some((1, 1, 1)));
    }

    #[tokio::test]
    async fn test_missing_repository_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let engine = GitEngine::new();

        let result = engine.log(temp_dir.path(), &LogOptions::default()).await;
        assert!(matches!(result, Err(VcsError::RepositoryNotFound { .. })));
    }
}
