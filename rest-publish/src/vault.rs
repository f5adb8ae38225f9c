use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    errors::Error,
    host::{Host, Metadata},
};

/// Markdown files under a root directory, metadata kept as YAML front matter.
#[derive(Debug, Clone)]
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, Error> {
        let mime_type = mime_guess::from_path(path).first_raw();

        if mime_type != Some("text/markdown") {
            return Err(Error::Markdown);
        }

        Ok(self.root.join(path))
    }

    async fn read_text(&self, path: &Path) -> Result<String, Error> {
        let full_path = self.resolve(path)?;

        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::DocumentNotFound),
            Err(e) => Err(e.into()),
        }
    }
}

/// Split `---` delimited front matter from the body.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;

    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];

            return Some((yaml, body));
        }

        offset += line.len();
    }

    None
}

pub fn parse_front_matter(yaml: &str) -> Result<Metadata, Error> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match serde_yaml::from_str::<serde_json::Value>(yaml)? {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(Metadata::new()),
        _ => Err(Error::FrontMatter),
    }
}

/// Full document text with `metadata` as its front matter.
pub fn render_document(metadata: &Metadata, body: &str) -> Result<String, Error> {
    let yaml = serde_yaml::to_string(metadata)?;

    let mut text = String::with_capacity(yaml.len() + body.len() + 8);

    text.push_str("---\n");
    text.push_str(&yaml);
    if !yaml.ends_with('\n') {
        text.push('\n');
    }
    text.push_str("---\n");
    text.push_str(body);

    Ok(text)
}

#[async_trait(?Send)]
impl Host for FileVault {
    async fn read_document(&self, path: &Path) -> Result<Vec<u8>, Error> {
        let full_path = self.resolve(path)?;

        match tokio::fs::read(&full_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::DocumentNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_metadata(&self, path: &Path) -> Result<Metadata, Error> {
        let text = self.read_text(path).await?;

        match split_front_matter(&text) {
            Some((yaml, _)) => parse_front_matter(yaml),
            None => Ok(Metadata::new()),
        }
    }

    async fn write_metadata(&self, path: &Path, metadata: Metadata) -> Result<(), Error> {
        let text = self.read_text(path).await?;

        let body = match split_front_matter(&text) {
            Some((_, body)) => body,
            None => text.as_str(),
        };

        let document = render_document(&metadata, body)?;

        let full_path = self.resolve(path)?;
        let mut temp_name = full_path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = full_path.with_file_name(temp_name);

        tokio::fs::write(&temp_path, document).await?;
        tokio::fs::rename(&temp_path, &full_path).await?;

        tracing::debug!(path = %full_path.display(), "front matter written");

        Ok(())
    }

    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}
