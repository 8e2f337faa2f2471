use error_stack::Report;

pub type RepoResult<T, E> = Result<T, Report<E>>;
pub type OptRepoResult<T, E> = Result<Option<T>, Report<E>>;

#[derive(Debug, thiserror::Error)]
pub enum EntityRepoError {
    #[error("failed to get entity")]
    Get,
    #[error("failed to list entities")]
    List,
    #[error("failed to create entity")]
    Create,
    /// Another entity already uses the id.
    #[error("entity id already exists")]
    AlreadyExists,
    #[error("failed to set entity status")]
    SetStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackRepoError {
    #[error("failed to append feedback")]
    Append,
    #[error("failed to query feedback")]
    Query,
}
