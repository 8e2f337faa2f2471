use repository::{EntityRepository, FeedbackRepository};

pub mod id;
pub mod link;
pub mod model;
pub mod repository;
pub mod result;
pub mod validation;

pub use id::generate_entity_id;
pub use link::LinkGenerator;
pub use model::{
    Entity, EntityId, EntityStatus, FeedbackId, FeedbackRecord, FeedbackSummary, NewEntity,
    NewFeedback,
};
pub use validation::{FeedbackSubmission, StatusChange, ValidationError};

/// Bundles the storage capabilities the feedback service runs against.
pub trait FeedbackEngine: Clone + Send + Sync + 'static {
    type Entities: EntityRepository + Send + Sync + 'static;
    type Feedback: FeedbackRepository + Send + Sync + 'static;

    fn entities(&self) -> Self::Entities;
    fn feedback(&self) -> Self::Feedback;
}
