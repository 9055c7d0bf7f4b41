//! Application state - shared across all handlers.

use std::sync::Arc;

use board_core::PostService;
use board_core::domain::Member;
use board_core::ports::{
    AttachmentRepository, FileTransfer, MemberRepository, PostRepository, TokenService,
};
use board_infra::{InMemoryBoardStore, JwtTokenService, LocalFileTransfer};

#[cfg(feature = "postgres")]
use board_infra::{
    PostgresAttachmentRepository, PostgresMemberRepository, PostgresPostRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub tokens: Arc<dyn TokenService>,
    pub max_upload_bytes: usize,
}

struct Stores {
    posts: Arc<dyn PostRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    members: Arc<dyn MemberRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let files: Arc<dyn FileTransfer> = Arc::new(LocalFileTransfer::new(&config.upload_dir)?);
        tracing::info!(upload_dir = %config.upload_dir.display(), "File storage ready");

        let stores = Self::stores(config).await;

        Ok(Self {
            posts: PostService::new(stores.posts, stores.attachments, stores.members, files),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Assemble state from explicit parts.
    pub fn from_parts(
        posts: PostService,
        tokens: Arc<dyn TokenService>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            posts,
            tokens,
            max_upload_bytes,
        }
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> Stores {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory(config).await;
        };

        match board_infra::database::connect(db_config).await {
            Ok(conn) => Stores {
                posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                attachments: Arc::new(PostgresAttachmentRepository::new(conn.clone())),
                members: Arc::new(PostgresMemberRepository::new(conn)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory(config).await
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(config: &AppConfig) -> Stores {
        tracing::info!("Running without postgres feature - using in-memory store");
        Self::in_memory(config).await
    }

    async fn in_memory(config: &AppConfig) -> Stores {
        let store = Arc::new(InMemoryBoardStore::new());
        for user_id in &config.dev_members {
            store.add_member(Member::new(user_id.clone(), user_id.clone())).await;
        }
        if !config.dev_members.is_empty() {
            tracing::info!(members = config.dev_members.len(), "Seeded in-memory members");
        }

        Stores {
            posts: store.clone(),
            attachments: store.clone(),
            members: store,
        }
    }
}
