mod agent;
mod event;
mod log;
mod skill;

pub use agent::{Agent, AgentId, AgentKind, AgentTable};
pub use event::{BuffRemoveKind, Event, EventKind};
pub use log::Log;
pub use skill::{Skill, SkillId, SkillTable};
