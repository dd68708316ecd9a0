pub mod cast;
pub mod error;
pub mod format;
pub mod stage;

pub use self::cast::{
    normalize_name, Actor, ActorFactory, CastRegistry, Character, CharacterFactory,
};
pub use self::error::{Result, StageError};
pub use self::format::{Persona, SourceLocation, StageSnapshot};
pub use self::stage::StageTracker;
