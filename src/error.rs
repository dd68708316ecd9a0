use thiserror::Error;

use crate::format::SourceLocation;

pub type Result<T, E = StageError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("{name} already initialized{}", at(.location))]
    DuplicateActor {
        name: String,
        location: Option<SourceLocation>,
    },
    #[error("{0} was not initialized!")]
    UnknownActor(String),
    #[error("{0} is already on stage!")]
    AlreadyOnStage(String),
    #[error("{0} is not on stage!")]
    NotOnStage(String),
    #[error("Ambiguous second-person pronoun")]
    AmbiguousPronoun { speaker: String },
    #[error("{0} is talking to nobody!")]
    NoAddressee(String),

    #[error("Failed to create actor {name}{}: {source}", at(.location))]
    ActorFactory {
        name: String,
        location: Option<SourceLocation>,
        #[source]
        source: anyhow::Error,
    },
}

impl StageError {
    /// Name of the actor the error is about
    pub fn actor(&self) -> &str {
        match self {
            StageError::DuplicateActor { name, .. } | StageError::ActorFactory { name, .. } => {
                name.as_str()
            }
            StageError::UnknownActor(name)
            | StageError::AlreadyOnStage(name)
            | StageError::NotOnStage(name)
            | StageError::NoAddressee(name) => name.as_str(),
            StageError::AmbiguousPronoun { speaker } => speaker.as_str(),
        }
    }

    /// Where the offending declaration was written, if the parser told us
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            StageError::DuplicateActor { location, .. }
            | StageError::ActorFactory { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}

fn at(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" ({})", location),
        None => String::new(),
    }
}
