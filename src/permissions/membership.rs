use crate::database::models::{ProjectId, UserId};
use crate::database::{EntityStore, StoreResult};

/// Is `user_id` a contributor of `project_id`?
///
/// Existence check only: duplicate rows for the pair (possible when the
/// store does not enforce the composite key) still count as one membership.
/// Project authorship alone does not make someone a contributor.
pub async fn is_contributor(
    store: &dyn EntityStore,
    user_id: UserId,
    project_id: ProjectId,
) -> StoreResult<bool> {
    store.contributor_exists(user_id, project_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewContributor, NewProject, ProjectType};
    use crate::database::MemoryStore;

    async fn project_with_author(store: &MemoryStore) -> (UserId, ProjectId) {
        let author = store.create_user("author").await.unwrap();
        let project = store
            .create_project(NewProject {
                title: "P".into(),
                description: "D".into(),
                kind: ProjectType::Android,
                author_user_id: author.id,
            })
            .await
            .unwrap();
        (author.id, project.id)
    }

    #[tokio::test]
    async fn author_without_row_is_not_a_contributor() {
        let store = MemoryStore::new();
        let (author, project) = project_with_author(&store).await;

        assert!(!is_contributor(&store, author, project).await.unwrap());
    }

    #[tokio::test]
    async fn membership_follows_contributor_rows() {
        let store = MemoryStore::new();
        let (_, project) = project_with_author(&store).await;
        let member = store.create_user("member").await.unwrap();

        store
            .add_contributor(NewContributor {
                user_id: member.id,
                project_id: project,
                role: "dev".into(),
            })
            .await
            .unwrap();
        assert!(is_contributor(&store, member.id, project).await.unwrap());

        store.remove_contributor(member.id, project).await.unwrap();
        assert!(!is_contributor(&store, member.id, project).await.unwrap());
    }

    #[tokio::test]
    async fn tolerates_duplicate_rows() {
        let store = MemoryStore::without_contributor_uniqueness();
        let (_, project) = project_with_author(&store).await;
        let member = store.create_user("member").await.unwrap();
        for role in ["dev", "qa"] {
            store
                .add_contributor(NewContributor {
                    user_id: member.id,
                    project_id: project,
                    role: role.into(),
                })
                .await
                .unwrap();
        }

        assert!(is_contributor(&store, member.id, project).await.unwrap());
        assert_eq!(store.remove_contributor(member.id, project).await.unwrap(), 2);
        assert!(!is_contributor(&store, member.id, project).await.unwrap());
    }
}
