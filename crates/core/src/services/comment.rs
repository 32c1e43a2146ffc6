//! Comment service.

use chrono::Utc;
use neighborly_common::{AppError, AppResult, id::IdGenerator, sanitize_text, truncate_chars};
use neighborly_db::entities::comment;
use neighborly_db::repositories::CommentRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::entity_ref::{EntityDirectory, EntityRef};
use crate::rate_limit::{FixedWindowLimiter, policies};
use crate::validation::require_text;

/// Stored comment text never exceeds this many characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

const MAX_AUTHOR_CHARS: usize = 100;

/// Input for posting a comment or reply.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub entity_type: String,
    pub entity_id: String,
    pub parent_id: Option<String>,
    pub author_name: String,
    #[validate(email)]
    pub author_email: Option<String>,
    /// Any length is accepted; storage keeps the first [`MAX_COMMENT_CHARS`].
    #[validate(length(min = 1))]
    pub content: String,
}

/// A top-level comment and its replies, oldest first.
#[derive(Debug, Clone)]
pub struct CommentThread {
    pub comment: comment::Model,
    pub replies: Vec<comment::Model>,
}

/// Group a flat, time-ordered list into threads.
///
/// Replies whose parent is not in the list are dropped.
#[must_use]
pub fn thread(comments: Vec<comment::Model>) -> Vec<CommentThread> {
    let (roots, replies): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|c| c.parent_id.is_none());

    let mut threads: Vec<CommentThread> = roots
        .into_iter()
        .map(|comment| CommentThread {
            comment,
            replies: Vec::new(),
        })
        .collect();

    for reply in replies {
        if let Some(parent) = threads
            .iter_mut()
            .find(|t| reply.parent_id.as_deref() == Some(t.comment.id.as_str()))
        {
            parent.replies.push(reply);
        }
    }
    threads
}

/// Service for comments.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    entities: EntityDirectory,
    limiter: FixedWindowLimiter,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        entities: EntityDirectory,
        limiter: FixedWindowLimiter,
    ) -> Self {
        Self {
            comment_repo,
            entities,
            limiter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Approved threads for an entity.
    pub async fn list_for(&self, entity: &EntityRef) -> AppResult<Vec<CommentThread>> {
        let comments = self
            .comment_repo
            .find_approved_for(entity.kind(), entity.id())
            .await?;
        Ok(thread(comments))
    }

    /// Number of approved comments on an entity.
    pub async fn count_for(&self, entity: &EntityRef) -> AppResult<u64> {
        self.comment_repo
            .count_approved_for(entity.kind(), entity.id())
            .await
    }

    /// Latest comments across the site, hidden ones included.
    pub async fn list_recent(&self, limit: u64, offset: u64) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_recent(limit, offset).await
    }

    /// Post a comment. Markup is stripped and the text cut to
    /// [`MAX_COMMENT_CHARS`] before it is stored.
    pub async fn create(&self, input: CreateCommentInput, client_ip: &str) -> AppResult<comment::Model> {
        self.limiter.enforce(client_ip, &policies::COMMENTS).await?;

        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let entity = EntityRef::parse(&input.entity_type, &input.entity_id)?;
        let author_name = require_text("Author name", &sanitize_text(&input.author_name), MAX_AUTHOR_CHARS)?;

        let content = truncate_chars(&sanitize_text(&input.content), MAX_COMMENT_CHARS);
        if content.trim().is_empty() {
            return Err(AppError::Validation("Comment content is required".to_string()));
        }

        self.entities.require(&entity).await?;

        if let Some(parent_id) = &input.parent_id {
            let parent = self
                .comment_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Comment not found: {parent_id}")))?;

            if parent.parent_id.is_some() {
                return Err(AppError::Validation(
                    "Replies can only be one level deep".to_string(),
                ));
            }
            if EntityRef::from_columns(parent.entity_type, parent.entity_id) != entity {
                return Err(AppError::Validation(
                    "Reply must belong to the same item as its parent".to_string(),
                ));
            }
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            entity_type: Set(entity.kind()),
            entity_id: Set(entity.id().to_string()),
            parent_id: Set(input.parent_id),
            author_name: Set(author_name),
            author_email: Set(input.author_email),
            content: Set(content),
            is_approved: Set(true),
            submitter_ip: Set(Some(client_ip.to_string())),
            created_at: Set(Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %created.id, entity = %entity, "Comment created");
        Ok(created)
    }

    /// Show or hide a comment.
    pub async fn set_approved(&self, id: &str, approved: bool) -> AppResult<()> {
        self.comment_repo.set_approved(id, approved).await
    }

    /// Delete a comment and its replies.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.comment_repo.delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_common::ManualClock;
    use neighborly_db::entities::EntityType;
    use neighborly_db::entities::journey;
    use neighborly_db::repositories::{EventRepository, JourneyRepository, PlaceRepository};
    use neighborly_db::test_utils::{comment_model, mock_db, place_model};
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    fn shared_service(db: Arc<DatabaseConnection>) -> CommentService {
        CommentService::new(
            CommentRepository::new(db.clone()),
            EntityDirectory::new(
                PlaceRepository::new(db.clone()),
                JourneyRepository::new(db.clone()),
                EventRepository::new(db),
            ),
            FixedWindowLimiter::in_memory(Arc::new(ManualClock::default())),
        )
    }

    fn service(db: DatabaseConnection) -> CommentService {
        shared_service(Arc::new(db))
    }

    fn input(content: &str) -> CreateCommentInput {
        CreateCommentInput {
            entity_type: "place".to_string(),
            entity_id: "p1".to_string(),
            parent_id: None,
            author_name: "Asha".to_string(),
            author_email: None,
            content: content.to_string(),
        }
    }

    fn reply(id: &str, parent: &str) -> comment::Model {
        let mut c = comment_model(id, EntityType::Place, "p1");
        c.parent_id = Some(parent.to_string());
        c
    }

    #[test]
    fn test_thread_nests_replies() {
        let threads = thread(vec![
            comment_model("c1", EntityType::Place, "p1"),
            reply("r1", "c1"),
            comment_model("c2", EntityType::Place, "p1"),
            reply("r2", "c1"),
            reply("orphan", "gone"),
        ]);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, "c1");
        let ids: Vec<&str> = threads[0].replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert!(threads[1].replies.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_markup_only_content() {
        let svc = service(mock_db().into_connection());
        let result = svc.create(input("<script>alert(1)</script>"), "10.0.0.1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_entity_type() {
        let svc = service(mock_db().into_connection());
        let mut bad = input("hi");
        bad.entity_type = "user".to_string();
        assert!(matches!(
            svc.create(bad, "10.0.0.1").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_reply_to_reply_is_rejected() {
        let db = mock_db()
            .append_query_results([[place_model("p1", "Toit", "bar")]])
            .append_query_results([[reply("r1", "c1")]])
            .into_connection();
        let mut nested = input("me too");
        nested.parent_id = Some("r1".to_string());

        let result = service(db).create(nested, "10.0.0.1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reply_must_match_parent_entity() {
        let db = mock_db()
            .append_query_results([[place_model("p1", "Toit", "bar")]])
            .append_query_results([[comment_model("c1", EntityType::Journey, "p1")]])
            .into_connection();
        let mut cross = input("wrong thread");
        cross.parent_id = Some("c1".to_string());

        let result = service(db).create(cross, "10.0.0.1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sixth_comment_in_an_hour_is_limited() {
        let mut db = mock_db();
        for i in 0..5 {
            db = db
                .append_query_results([[place_model("p1", "Toit", "bar")]])
                .append_query_results([[comment_model(&format!("c{i}"), EntityType::Place, "p1")]]);
        }
        let svc = service(db.into_connection());

        for _ in 0..5 {
            svc.create(input("nice"), "10.0.0.9").await.unwrap();
        }
        let result = svc.create(input("nice"), "10.0.0.9").await;
        assert!(matches!(result, Err(AppError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_comment_on_missing_journey_is_not_found() {
        let db = mock_db()
            .append_query_results([Vec::<journey::Model>::new()])
            .into_connection();
        let mut orphan = input("lovely route");
        orphan.entity_type = "journey".to_string();
        orphan.entity_id = "j404".to_string();

        match service(db).create(orphan, "10.0.0.1").await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Journey not found: j404"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_overlong_comment_is_truncated_not_rejected() {
        let db = Arc::new(
            mock_db()
                .append_query_results([[place_model("p1", "Toit", "bar")]])
                .append_query_results([[comment_model("c1", EntityType::Place, "p1")]])
                .into_connection(),
        );

        let svc = shared_service(Arc::clone(&db));
        svc.create(input(&"b".repeat(25_000)), "10.0.0.1").await.unwrap();
        drop(svc);

        let db = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&"b".repeat(MAX_COMMENT_CHARS)));
        assert!(!log.contains(&"b".repeat(MAX_COMMENT_CHARS + 1)));
    }
}
