//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::ports::{CommentRepository, DraftRepository, PostRepository, TermRepository};
use folio_core::services::{
    CommentService, DraftService, PublishConfig, PublishingWorkflow, TaxonomyResolver,
};
use folio_infra::{
    InMemoryCommentRepository, InMemoryDraftRepository, InMemoryPostRepository,
    InMemoryTermRepository,
};

#[cfg(feature = "postgres")]
use folio_core::domain::TermKind;
#[cfg(feature = "postgres")]
use folio_infra::{
    DatabaseConfig, DatabaseConnections, PostgresCommentRepository, PostgresDraftRepository,
    PostgresPostRepository, PostgresTermRepository,
};

use crate::config::{AppConfig, DatabaseSettings};

/// Which backend the repositories run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    InMemory,
}

impl Storage {
    pub fn as_str(self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::InMemory => "in-memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub publishing: PublishingWorkflow,
    pub drafts: DraftService,
    pub comments: CommentService,
    pub storage: Storage,
}

struct Repositories {
    posts: Arc<dyn PostRepository>,
    drafts: Arc<dyn DraftRepository>,
    comments: Arc<dyn CommentRepository>,
    categories: Arc<dyn TermRepository>,
    tags: Arc<dyn TermRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            drafts: Arc::new(InMemoryDraftRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            categories: Arc::new(InMemoryTermRepository::categories()),
            tags: Arc::new(InMemoryTermRepository::tags()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(settings: &DatabaseSettings) -> Option<Self> {
        let config = DatabaseConfig {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
        };

        match DatabaseConnections::init(&config).await {
            Ok(connections) => {
                let db = connections.main;
                Some(Self {
                    posts: Arc::new(PostgresPostRepository::new(db.clone())),
                    drafts: Arc::new(PostgresDraftRepository::new(db.clone())),
                    comments: Arc::new(PostgresCommentRepository::new(db.clone())),
                    categories: Arc::new(PostgresTermRepository::new(
                        db.clone(),
                        TermKind::Category,
                    )),
                    tags: Arc::new(PostgresTermRepository::new(db, TermKind::Tag)),
                })
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                None
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn postgres(_settings: &DatabaseSettings) -> Option<Self> {
        tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
        None
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let publish = PublishConfig {
            author_fallback_name: config.author_fallback_name.clone(),
        };

        let postgres = match &config.database {
            Some(settings) => Repositories::postgres(settings).await,
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                None
            }
        };

        let state = match postgres {
            Some(repos) => Self::assemble(repos, Storage::Postgres, publish),
            None => Self::in_memory(publish),
        };

        tracing::info!(storage = state.storage.as_str(), "Application state initialized");
        state
    }

    pub fn in_memory(publish: PublishConfig) -> Self {
        Self::assemble(Repositories::in_memory(), Storage::InMemory, publish)
    }

    fn assemble(repos: Repositories, storage: Storage, publish: PublishConfig) -> Self {
        let taxonomy = TaxonomyResolver::new(repos.categories, repos.tags);
        Self {
            publishing: PublishingWorkflow::new(
                repos.posts.clone(),
                repos.drafts.clone(),
                taxonomy,
                publish,
            ),
            drafts: DraftService::new(repos.drafts),
            comments: CommentService::new(repos.comments, repos.posts),
            storage,
        }
    }
}
