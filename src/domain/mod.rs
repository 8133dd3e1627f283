// Domain model for the land lifecycle: entities, payloads and status machines

pub mod aggregate;
pub mod identity;
pub mod ids;
pub mod interest;
pub mod land;
pub mod section;
pub mod status;
pub mod task;

pub use aggregate::LandAggregate;
pub use identity::Identity;
pub use ids::{EntityRef, HistoryId, InterestId, LandId, SectionId, TaskId, UserId};
pub use interest::{InterestRequest, InvestorInterest};
pub use land::{CommercialTerms, Coordinates, Land, LandFields, LandPatch, Visibility};
pub use section::{LandSection, SectionAssignment, SectionContent, SectionData};
pub use status::{
    InterestDecision, InterestStatus, InterestTransition, LandStatus, LandTransition,
    SectionDecision, SectionStatus, SectionTransition, TaskStatus, UnknownStatus,
};
pub use task::{NewTask, Task, TaskHistory, TaskPatch, TaskPriority};
