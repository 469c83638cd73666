//! Event handler for user actions.
//!
//! Every interaction is an [`Action`] handed to [`Shell::dispatch`], which
//! mutates the [`Session`] and answers with a [`Reply`]. Errors are turned
//! into reply lines, so no action ever ends the session.

mod action;
mod render;
pub mod repl;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{StreamExt, stream};
use painter_core::types::{ExtractionRecord, RecommendationRecord, UploadedItem};
use painter_core::{ImageCompressor, MetadataExtractor, PaintingRecommender, Result, Session};
use painter_report::{Layout, ReportBuilder, ReportItem};
use painter_tinify::{ImagePreprocessor, PreparedImage};
use secrecy::SecretString;

pub use self::action::{Action, HELP, ParseActionError};
use crate::TRACING_TARGET_SHELL;

/// Title of a report when none is given.
pub const DEFAULT_REPORT_TITLE: &str = "Painting Reader";

/// Builds service clients on demand.
///
/// Providers are resolved per action from the session, so a key entered
/// mid-session takes effect on the next action.
pub trait ProviderFactory: Send + Sync {
    /// Returns the metadata extractor.
    fn extractor(&self, session: &Session) -> Result<Arc<dyn MetadataExtractor>>;

    /// Returns the painting recommender.
    fn recommender(&self, session: &Session) -> Result<Arc<dyn PaintingRecommender>>;

    /// Returns the image compressor.
    fn compressor(&self, session: &Session) -> Result<Arc<dyn ImageCompressor>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Flow {
    #[default]
    Continue,
    Quit,
}

/// Output of one dispatched action.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    lines: Vec<String>,
    flow: Flow,
    /// Number of failures reported in `lines`.
    pub errors: usize,
}

impl Reply {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            ..Self::default()
        }
    }

    fn failure(error: impl fmt::Display) -> Self {
        let mut reply = Self::default();
        reply.push_error(error);
        reply
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn push_error(&mut self, error: impl fmt::Display) {
        self.lines.push(format!("error: {error}"));
        self.errors += 1;
    }

    /// Returns the output lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if the shell should stop.
    pub fn is_quit(&self) -> bool {
        self.flow == Flow::Quit
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// The interaction shell.
pub struct Shell {
    session: Session,
    providers: Arc<dyn ProviderFactory>,
    concurrency: usize,
    layout: Layout,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("session", &self.session)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Creates a shell over `session`.
    ///
    /// At most `concurrency` extraction calls run at once during a batch.
    pub fn new(session: Session, providers: Arc<dyn ProviderFactory>, concurrency: usize) -> Self {
        Self {
            session,
            providers,
            concurrency: concurrency.max(1),
            layout: Layout::default(),
        }
    }

    /// Returns the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles one action.
    pub async fn dispatch(&mut self, action: Action) -> Reply {
        tracing::debug!(target: TRACING_TARGET_SHELL, ?action, "Dispatching action");

        let result = match action {
            Action::Upload(paths) => Ok(self.upload(&paths, true).await),
            Action::Add(paths) => Ok(self.upload(&paths, false).await),
            Action::Extract(names) => self.extract(&names).await,
            Action::Recommend(names) => self.recommend(&names).await,
            Action::Show(name) => self.show(name.as_deref()),
            Action::Cost => Ok(self.cost()),
            Action::Report {
                path,
                compress,
                title,
            } => {
                let title = title.as_deref().unwrap_or(DEFAULT_REPORT_TITLE);
                self.report(&path, compress, title).await
            }
            Action::Key(key) => Ok(self.set_key(key)),
            Action::Reset => {
                self.session.reset();
                Ok(Reply::line("Session cleared."))
            }
            Action::Help => Ok(Reply::line(HELP)),
            Action::Quit => Ok(Reply {
                flow: Flow::Quit,
                ..Reply::line("Bye.")
            }),
        };

        result.unwrap_or_else(|error| {
            tracing::warn!(
                target: TRACING_TARGET_SHELL,
                error = %error,
                "Action failed"
            );
            Reply::failure(error)
        })
    }

    async fn upload(&mut self, paths: &[PathBuf], replace: bool) -> Reply {
        let mut reply = Reply::default();
        let mut items = Vec::with_capacity(paths.len());

        for path in paths {
            match UploadedItem::from_path(path).await {
                Ok(item) => items.push(item),
                Err(error) => reply.push_error(format!("{}: {error}", path.display())),
            }
        }

        let loaded = items.len();
        if replace && loaded > 0 {
            self.session.replace_uploads(items);
        } else {
            for item in items {
                self.session.add_upload(item);
            }
        }

        reply.push(format!(
            "Loaded {loaded} image(s), {} in session.",
            self.session.items().len()
        ));
        reply
    }

    /// Extracts the named uploads, or every pending upload.
    ///
    /// Calls run concurrently; results are applied to the session one by one
    /// in upload order.
    async fn extract(&mut self, names: &[String]) -> Result<Reply> {
        let targets = self.targets(names, |session, item| {
            session.extraction(item.name()).is_none()
        })?;
        if targets.is_empty() {
            return Ok(Reply::line("Nothing to extract."));
        }

        let extractor = self.providers.extractor(&self.session)?;

        tracing::info!(
            target: TRACING_TARGET_SHELL,
            count = targets.len(),
            concurrency = self.concurrency,
            "Extracting metadata"
        );

        let mut results: Vec<(usize, String, Result<ExtractionRecord>)> =
            stream::iter(targets.into_iter().enumerate())
                .map(|(index, item)| {
                    let extractor = extractor.clone();
                    async move {
                        let result = extractor.extract(&item).await;
                        (index, item.name().to_string(), result)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(index, _, _)| *index);

        let mut reply = Reply::default();
        for (_, name, result) in results {
            let outcome = result.and_then(|record| {
                let line = format!("{name}: {}", render::summary(&record));
                self.session.record_extraction(&name, record)?;
                Ok(line)
            });

            match outcome {
                Ok(line) => reply.push(line),
                Err(error) => reply.push_error(format!("{name}: {error}")),
            }
        }

        Ok(reply)
    }

    /// Recommends paintings for the named uploads, or for every extracted
    /// upload that has none yet.
    async fn recommend(&mut self, names: &[String]) -> Result<Reply> {
        let mut reply = Reply::default();
        let mut sources: Vec<(String, ExtractionRecord)> = Vec::new();

        if names.is_empty() {
            sources.extend(
                self.session
                    .extracted_items()
                    .filter(|(_, _, recommendations)| recommendations.is_none())
                    .map(|(item, record, _)| (item.name().to_string(), record.clone())),
            );
        } else {
            for name in names {
                match self.session.require_extraction(name) {
                    Ok(record) => sources.push((name.clone(), record.clone())),
                    Err(error) => reply.push_error(error),
                }
            }
        }

        if sources.is_empty() {
            if reply.errors == 0 {
                reply.push("Nothing to recommend. Extract some images first.");
            }
            return Ok(reply);
        }

        let recommender = self.providers.recommender(&self.session)?;

        for (name, record) in sources {
            let outcome = match recommender.recommend(&record).await {
                Ok(recommendations) => {
                    let titles = recommendations
                        .records
                        .iter()
                        .map(|r| format!("{}, {} ({})", r.title, r.author, r.year))
                        .collect::<Vec<_>>()
                        .join("; ");
                    self.session
                        .record_recommendations(&name, recommendations)
                        .map(|()| titles)
                }
                Err(error) => Err(error),
            };

            match outcome {
                Ok(titles) => reply.push(format!("{} ({name}): {titles}", record.title)),
                Err(error) => reply.push_error(format!("{name}: {error}")),
            }
        }

        Ok(reply)
    }

    fn show(&self, name: Option<&str>) -> Result<Reply> {
        if let Some(name) = name {
            let item = self.session.item(name)?;
            let lines = render::detail(
                item,
                self.session.extraction(name),
                self.session.recommendations(name),
            );
            return Ok(Reply {
                lines,
                ..Reply::default()
            });
        }

        if self.session.items().is_empty() {
            return Ok(Reply::line("No images uploaded."));
        }

        let lines = self
            .session
            .items()
            .iter()
            .map(|item| {
                render::status_row(
                    item,
                    self.session.extraction(item.name()),
                    self.session.recommendations(item.name()),
                )
            })
            .collect();
        Ok(Reply {
            lines,
            ..Reply::default()
        })
    }

    fn cost(&self) -> Reply {
        let cost = self.session.cost();
        Reply::line(format!(
            "Estimated cost: {cost} ({} call(s))",
            cost.call_count()
        ))
    }

    /// Writes every extracted upload into a PDF at `path`.
    ///
    /// An item whose image cannot be embedded is skipped and reported; the
    /// rest of the report is still written.
    async fn report(&self, path: &Path, compress: bool, title: &str) -> Result<Reply> {
        let entries: Vec<(&UploadedItem, &ExtractionRecord, &[RecommendationRecord])> = self
            .session
            .extracted_items()
            .map(|(item, record, recommendations)| {
                (item, record, recommendations.unwrap_or_default())
            })
            .collect();

        if entries.is_empty() {
            return Ok(Reply::line("Nothing to report. Extract some images first."));
        }

        let preprocessor = if compress {
            Some(ImagePreprocessor::new(
                self.providers.compressor(&self.session)?,
            ))
        } else {
            None
        };

        let mut reply = Reply::default();
        let mut builder = ReportBuilder::new(self.layout.clone());
        builder.start(title)?;

        let mut compressed = 0;
        for (item, record, recommendations) in entries {
            let image = match &preprocessor {
                Some(preprocessor) => preprocessor.prepare(item).await,
                None => PreparedImage::Original(item.data().clone()),
            };
            if image.is_compressed() {
                compressed += 1;
            }

            let report_item = ReportItem {
                name: item.name(),
                image: image.bytes(),
                record,
                recommendations,
            };
            if let Err(error) = builder.place_item(&report_item) {
                tracing::warn!(
                    target: TRACING_TARGET_SHELL,
                    item = item.name(),
                    error = %error,
                    "Skipping item in report"
                );
                reply.push_error(format!("{}: {error}", item.name()));
            }
        }

        let placed = builder.image_count();
        let pages = builder.page_count();
        let bytes = builder.seal()?;
        tokio::fs::write(path, &bytes).await?;

        tracing::info!(
            target: TRACING_TARGET_SHELL,
            path = %path.display(),
            items = placed,
            pages,
            compressed,
            size = bytes.len(),
            "Report written"
        );

        reply.push(format!(
            "Wrote {} ({placed} painting(s), {pages} page(s)).",
            path.display()
        ));
        if compress {
            reply.push(format!("{compressed} image(s) compressed."));
        }
        Ok(reply)
    }

    fn set_key(&mut self, key: Option<String>) -> Reply {
        match key.map(|key| key.trim().to_string()) {
            Some(key) if !key.is_empty() => {
                self.session.set_openai_api_key(SecretString::new(key));
                Reply::line("OpenAI API key set.")
            }
            _ => Reply::failure("usage: key <api-key>"),
        }
    }

    /// Resolves action targets: the named uploads, or every upload matching
    /// `pending` when no name is given.
    fn targets(
        &self,
        names: &[String],
        pending: impl Fn(&Session, &UploadedItem) -> bool,
    ) -> Result<Vec<UploadedItem>> {
        if names.is_empty() {
            return Ok(self
                .session
                .items()
                .iter()
                .filter(|item| pending(&self.session, item))
                .cloned()
                .collect());
        }

        names
            .iter()
            .map(|name| self.session.item(name).cloned())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use painter_core::mock::{MockConfig, MockProvider};
    use painter_core::{Credentials, Error};

    use super::*;

    #[derive(Default)]
    pub(crate) struct MockFactory {
        pub(crate) provider: MockProvider,
        pub(crate) require_key: bool,
    }

    impl MockFactory {
        fn check(&self, session: &Session) -> Result<()> {
            if self.require_key {
                session.require_openai_api_key()?;
            }
            Ok(())
        }
    }

    impl ProviderFactory for MockFactory {
        fn extractor(&self, session: &Session) -> Result<Arc<dyn MetadataExtractor>> {
            self.check(session)?;
            Ok(Arc::new(self.provider.clone()))
        }

        fn recommender(&self, session: &Session) -> Result<Arc<dyn PaintingRecommender>> {
            self.check(session)?;
            Ok(Arc::new(self.provider.clone()))
        }

        fn compressor(&self, _session: &Session) -> Result<Arc<dyn ImageCompressor>> {
            Ok(Arc::new(self.provider.clone()))
        }
    }

    fn shell_with(provider: MockProvider, concurrency: usize) -> Shell {
        let factory = MockFactory {
            provider,
            require_key: false,
        };
        Shell::new(Session::default(), Arc::new(factory), concurrency)
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(8, 6, image::Rgb([180, 40, 40]))
            .save(&path)
            .unwrap();
        path
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    async fn upload(shell: &mut Shell, dir: &Path, files: &[&str]) {
        let paths = files.iter().map(|name| write_png(dir, name)).collect();
        let reply = shell.dispatch(Action::Upload(paths)).await;
        assert_eq!(reply.errors, 0, "{reply}");
    }

    #[tokio::test]
    async fn test_cost_after_extract_and_recommend() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with(MockProvider::default(), 1);
        upload(&mut shell, dir.path(), &["guernica.png"]).await;

        let reply = shell.dispatch(Action::Extract(vec![])).await;
        assert_eq!(reply.errors, 0);
        assert_eq!(reply.lines(), ["guernica.png: guernica, Mock Painter (1900)"]);
        assert_eq!(
            shell.dispatch(Action::Cost).await.to_string(),
            "Estimated cost: $0.0090 (1 call(s))"
        );

        let reply = shell.dispatch(Action::Recommend(vec![])).await;
        assert_eq!(reply.errors, 0);
        assert_eq!(
            shell.dispatch(Action::Cost).await.to_string(),
            "Estimated cost: $0.0095 (2 call(s))"
        );
        assert_eq!(
            shell.session().recommendations("guernica.png").unwrap()[0].title,
            "Similar to guernica #1"
        );
    }

    #[tokio::test]
    async fn test_failed_item_keeps_other_results() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::default().failing_on("b.png");
        let mut shell = shell_with(provider, 2);
        upload(&mut shell, dir.path(), &["a.png", "b.png", "c.png"]).await;

        let reply = shell.dispatch(Action::Extract(vec![])).await;
        assert_eq!(reply.errors, 1);
        assert!(reply.lines()[1].starts_with("error: b.png:"));

        let session = shell.session();
        assert!(session.extraction("a.png").is_some());
        assert!(session.extraction("b.png").is_none());
        assert!(session.extraction("c.png").is_some());
        assert_eq!(session.cost().call_count(), 2);

        // Only the failed item is pending now.
        let reply = shell.dispatch(Action::Extract(vec![])).await;
        assert_eq!(reply.errors, 1);
        assert_eq!(reply.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_blocks_api_actions_only() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MockFactory {
            provider: MockProvider::default(),
            require_key: true,
        };
        let mut shell = Shell::new(Session::default(), Arc::new(factory), 1);
        upload(&mut shell, dir.path(), &["a.png"]).await;

        let reply = shell.dispatch(Action::Extract(vec![])).await;
        assert_eq!(reply.to_string(), "error: missing credential: openai");

        assert_eq!(shell.dispatch(Action::Show(None)).await.errors, 0);
        assert_eq!(shell.dispatch(Action::Cost).await.errors, 0);

        let reply = shell.dispatch(Action::Key(Some("sk-test".into()))).await;
        assert_eq!(reply.errors, 0);
        assert_eq!(shell.dispatch(Action::Extract(vec![])).await.errors, 0);
    }

    #[tokio::test]
    async fn test_unknown_and_unextracted_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with(MockProvider::default(), 1);
        upload(&mut shell, dir.path(), &["a.png"]).await;

        let reply = shell.dispatch(Action::Extract(names(&["missing.png"]))).await;
        assert_eq!(reply.to_string(), "error: unknown item: missing.png");

        let reply = shell.dispatch(Action::Recommend(names(&["a.png"]))).await;
        assert_eq!(
            reply.to_string(),
            "error: item has not been extracted yet: a.png"
        );

        let reply = shell.dispatch(Action::Show(Some("missing.png".into()))).await;
        assert_eq!(reply.errors, 1);
    }

    #[tokio::test]
    async fn test_report_written_with_compression_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::default().failing_compression();
        let mut shell = shell_with(provider.clone(), 1);
        upload(&mut shell, dir.path(), &["a.png", "b.png"]).await;
        shell.dispatch(Action::Extract(vec![])).await;
        shell.dispatch(Action::Recommend(names(&["a.png"]))).await;

        let path = dir.path().join("report.pdf");
        let reply = shell
            .dispatch(Action::Report {
                path: path.clone(),
                compress: true,
                title: None,
            })
            .await;

        assert_eq!(reply.errors, 0, "{reply}");
        assert!(reply.lines()[0].contains("2 painting(s)"));
        assert_eq!(reply.lines()[1], "0 image(s) compressed.");
        assert_eq!(provider.compress_calls(), 2);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_report_skips_undecodable_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with(MockProvider::default(), 1);
        upload(&mut shell, dir.path(), &["a.png"]).await;
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, [0x89, b'P', b'N', b'G']).unwrap();
        assert_eq!(shell.dispatch(Action::Add(vec![broken])).await.errors, 0);
        shell.dispatch(Action::Extract(vec![])).await;

        let path = dir.path().join("report.pdf");
        let reply = shell
            .dispatch(Action::Report {
                path: path.clone(),
                compress: false,
                title: Some("Collection".into()),
            })
            .await;

        assert_eq!(reply.errors, 1);
        assert!(reply.lines()[0].starts_with("error: broken.png:"));
        assert!(reply.lines()[1].contains("1 painting(s)"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_report_without_extractions_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with(MockProvider::default(), 1);
        let path = dir.path().join("report.pdf");

        let reply = shell
            .dispatch(Action::Report {
                path: path.clone(),
                compress: false,
                title: None,
            })
            .await;

        assert_eq!(reply.errors, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_batch_extracts_everything() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(MockConfig::default());
        let mut shell = shell_with(provider.clone(), 4);
        let files = ["1.png", "2.png", "3.png", "4.png", "5.png"];
        upload(&mut shell, dir.path(), &files).await;

        let reply = shell.dispatch(Action::Extract(vec![])).await;

        assert_eq!(reply.errors, 0);
        assert_eq!(provider.extract_calls(), 5);
        assert_eq!(shell.session().cost().call_count(), 5);
        // Replies follow upload order regardless of completion order.
        let order: Vec<_> = reply
            .lines()
            .iter()
            .map(|line| line.split(':').next().unwrap_or_default())
            .collect();
        assert_eq!(order, files);
    }

    #[tokio::test]
    async fn test_upload_errors_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_with(MockProvider::default(), 1);
        let good = write_png(dir.path(), "a.png");
        let missing = dir.path().join("missing.png");

        let reply = shell.dispatch(Action::Upload(vec![good, missing])).await;
        assert_eq!(reply.errors, 1);
        assert_eq!(shell.session().items().len(), 1);

        shell.dispatch(Action::Extract(vec![])).await;
        let reply = shell.dispatch(Action::Reset).await;
        assert_eq!(reply.to_string(), "Session cleared.");
        assert!(shell.session().items().is_empty());
        assert_eq!(shell.session().cost().call_count(), 0);
    }

    #[tokio::test]
    async fn test_key_and_quit() {
        let mut shell = Shell::new(
            Session::default().with_credentials(Credentials::default()),
            Arc::new(MockFactory::default()),
            1,
        );

        assert_eq!(shell.dispatch(Action::Key(Some("  ".into()))).await.errors, 1);
        assert!(matches!(
            shell.session().require_openai_api_key(),
            Err(Error::MissingCredential("openai"))
        ));
        assert!(shell.dispatch(Action::Quit).await.is_quit());
        assert!(!shell.dispatch(Action::Help).await.is_quit());
    }
}
