//! Domain records with their response, create and update DTOs.
//!
//! Every record derives [`FieldAssign`](crate::FieldAssign) for the dynamic
//! update path and implements [`DomainMapping`](crate::mapping::DomainMapping)
//! and [`Entity`](crate::repository::Entity). Wire names are camelCase.

pub mod agent;
pub mod case;
pub mod plan;
pub mod subscription;
pub mod team;
pub mod user;

pub use agent::{Agent, AgentDto, CreateAgentRequest, UpdateAgentRequest};
pub use case::{Case, CaseDto, CreateCaseRequest, UpdateCaseRequest};
pub use plan::{CreatePlanRequest, Plan, PlanDto, UpdatePlanRequest};
pub use subscription::{
    CreateSubscriptionRequest, Subscription, SubscriptionDto, SubscriptionKind, UpdateSubscriptionRequest,
};
pub use team::{CreateTeamRequest, Team, TeamDto, UpdateTeamRequest};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserDto};
