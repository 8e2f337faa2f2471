use engine::PageBounds;
use error_stack::{IntoReport, Report};

pub mod entities;
pub mod feedback;
pub mod initializer;
mod statements;

pub enum ConnectionDetails {
    Url(String),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to initialize postgres {0} repo")]
pub struct RepoInitErr(&'static str);
impl RepoInitErr {
    fn entities() -> Self {
        Self("entities")
    }

    fn feedback() -> Self {
        Self("feedback")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to run postgres migrations")]
pub struct RepoMigrationErr;

/// Postgres rejects a negative offset or limit, so anything that slipped through gets
/// turned into an error here instead of a confusing database failure.
fn check_bounds<E>(bounds: PageBounds, on_err: E) -> Result<PageBounds, Report<E>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    if bounds.offset < 0 || bounds.limit < 0 {
        Err(on_err.into_report().attach(format!(
            "invalid page bounds: offset {}, limit {}",
            bounds.offset, bounds.limit
        )))
    } else {
        Ok(bounds)
    }
}
