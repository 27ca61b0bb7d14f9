//! Filesystem Article Store Adapter
//!
//! Reads drafts from markdown files in a single directory. Each file may
//! start with YAML front matter fenced by `---` lines:
//!
//! ```text
//! ---
//! title: My Draft
//! slug: my-draft
//! draft: true
//! ---
//! Body in markdown...
//! ```
//!
//! Without a `slug` key the slug is derived from the file name. Without a
//! `draft` key the file counts as a draft.

use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::ArticleSlug;
use crate::ports::{ArticleStore, ArticleStoreError, Draft};

const FENCE: &str = "---";

#[derive(Debug, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default = "default_draft")]
    draft: bool,
}

fn default_draft() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            draft: default_draft(),
        }
    }
}

/// One parsed markdown file.
#[derive(Debug)]
struct ArticleFile {
    slug: ArticleSlug,
    title: String,
    body: String,
    draft: bool,
}

/// Markdown-directory backed article store
#[derive(Debug, Clone)]
pub struct FsArticleStore {
    drafts_dir: PathBuf,
}

impl FsArticleStore {
    /// Create a store reading `*.md` files from `drafts_dir`
    pub fn new<P: AsRef<Path>>(drafts_dir: P) -> Self {
        Self {
            drafts_dir: drafts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn drafts_dir(&self) -> &Path {
        &self.drafts_dir
    }

    /// Resolves the slug a markdown file is published under.
    ///
    /// Prefers the front-matter `slug`; falls back to the file name when the
    /// file is unreadable or has none.
    pub async fn slug_for_path(&self, path: &Path) -> Option<ArticleSlug> {
        let fallback = ArticleSlug::from_file_name(path);
        let Ok(content) = fs::read_to_string(path).await else {
            return fallback;
        };
        match parse_article(path, &content) {
            Ok(article) => Some(article.slug),
            Err(_) => fallback,
        }
    }

    async fn markdown_files(&self) -> Result<Vec<PathBuf>, ArticleStoreError> {
        let mut entries = match fs::read_dir(&self.drafts_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(drafts_dir = %self.drafts_dir.display(), "Drafts directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ArticleStoreError::Io(e.to_string())),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ArticleStoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl ArticleStore for FsArticleStore {
    async fn get_draft(&self, slug: &ArticleSlug) -> Result<Draft, ArticleStoreError> {
        for path in self.markdown_files().await? {
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                // Deleted between listing and reading.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(ArticleStoreError::Io(e.to_string())),
            };

            let article = match parse_article(&path, &content) {
                Ok(article) => article,
                Err(err) => {
                    if ArticleSlug::from_file_name(&path).as_ref() == Some(slug) {
                        return Err(err);
                    }
                    tracing::warn!(file = %path.display(), error = %err, "Skipping unreadable draft");
                    continue;
                }
            };

            if &article.slug != slug {
                continue;
            }
            if !article.draft {
                return Err(ArticleStoreError::NotADraft(slug.clone()));
            }
            return Ok(Draft {
                slug: article.slug,
                title: article.title,
                body: article.body,
            });
        }

        Err(ArticleStoreError::NotFound(slug.clone()))
    }
}

/// Splits `content` into its front-matter YAML (if fenced) and body.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    // Unterminated fence: treat everything as body.
    (None, content)
}

fn parse_article(path: &Path, content: &str) -> Result<ArticleFile, ArticleStoreError> {
    let file = path.display().to_string();
    let (yaml, body) = split_front_matter(content);

    let front_matter = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str::<FrontMatter>(yaml)
            .map_err(|e| ArticleStoreError::FrontMatter {
                file: file.clone(),
                message: e.to_string(),
            })?,
        _ => FrontMatter::default(),
    };

    let slug = match front_matter.slug {
        Some(raw) => ArticleSlug::new(raw).map_err(|e| ArticleStoreError::FrontMatter {
            file: file.clone(),
            message: e.to_string(),
        })?,
        None => ArticleSlug::from_file_name(path).ok_or_else(|| ArticleStoreError::FrontMatter {
            file: file.clone(),
            message: "file name does not yield a slug".to_string(),
        })?,
    };

    let title = front_matter
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| slug.to_string());

    Ok(ArticleFile {
        slug,
        title,
        body: body.trim_start_matches(['\r', '\n']).to_string(),
        draft: front_matter.draft,
    })
}
