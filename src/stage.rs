use std::collections::BTreeSet;
use std::fmt;

use crate::cast::{normalize_name, Actor, ActorFactory, CastRegistry, Character};
use crate::error::{Result, StageError};
use crate::format::{Persona, StageSnapshot};

/// Who is on stage during a play, and who "you" refers to.
///
/// Actors are tracked by their position in the cast, so everything on stage
/// is always part of the cast and on-stage status lives in exactly one place.
/// The pairing used for the second-person pronoun is derived from the
/// on-stage set whenever it is needed.
#[derive(Debug, Clone)]
pub struct StageTracker<A = Character> {
    cast: CastRegistry<A>,
    on_stage: BTreeSet<usize>,
    global_boolean: bool,
}

impl StageTracker<Character> {
    pub fn from_personae(personae: &[Persona]) -> Result<Self> {
        Ok(Self::new(CastRegistry::from_personae(personae)?))
    }
}

impl<A: Actor> StageTracker<A> {
    pub fn new(cast: CastRegistry<A>) -> Self {
        Self {
            cast,
            on_stage: BTreeSet::new(),
            global_boolean: false,
        }
    }

    pub fn with_factory<F>(personae: &[Persona], factory: F) -> Result<Self>
    where
        F: ActorFactory<Actor = A>,
    {
        Ok(Self::new(CastRegistry::new(personae, factory)?))
    }

    pub fn cast(&self) -> &CastRegistry<A> {
        &self.cast
    }

    pub fn cast_mut(&mut self) -> &mut CastRegistry<A> {
        &mut self.cast
    }

    pub fn global_boolean(&self) -> bool {
        self.global_boolean
    }

    pub fn set_global_boolean(&mut self, value: bool) {
        self.global_boolean = value;
    }

    /// Bring every named actor on stage, or none of them.
    ///
    /// Fails with `UnknownActor` or `AlreadyOnStage` for the first offending
    /// name. A name listed twice in the same entrance counts as already on
    /// stage.
    pub fn enter<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entering = Vec::new();
        for name in names {
            let index = self.off_stage_position(name.as_ref())?;
            if entering.contains(&index) {
                return Err(StageError::AlreadyOnStage(self.name_of(index)));
            }
            entering.push(index);
        }

        self.on_stage.extend(entering.iter().copied());

        log::debug!(
            "enter {}: {} on stage",
            self.describe(&entering),
            self.on_stage.len()
        );
        Ok(())
    }

    /// Send every named actor off stage, or none of them.
    pub fn exeunt<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut leaving = Vec::new();
        for name in names {
            let index = self.on_stage_position(name.as_ref())?;
            if leaving.contains(&index) {
                return Err(StageError::NotOnStage(self.name_of(index)));
            }
            leaving.push(index);
        }

        for index in &leaving {
            self.on_stage.remove(index);
        }

        log::debug!(
            "exeunt {}: {} on stage",
            self.describe(&leaving),
            self.on_stage.len()
        );
        Ok(())
    }

    pub fn exeunt_all(&mut self) {
        let leaving = std::mem::take(&mut self.on_stage);
        if !leaving.is_empty() {
            log::debug!("exeunt omnes: {} left the stage", leaving.len());
        }
    }

    pub fn exit(&mut self, name: &str) -> Result<()> {
        let index = self.on_stage_position(name)?;
        self.on_stage.remove(&index);

        log::debug!(
            "exit {}: {} on stage",
            self.cast.get(index).name(),
            self.on_stage.len()
        );
        Ok(())
    }

    /// Fails with `UnknownActor` if the name was never declared, `NotOnStage` if it is off stage
    pub fn assert_on_stage(&self, name: &str) -> Result<()> {
        self.on_stage_position(name).map(|_| ())
    }

    /// Fails with `AlreadyOnStage` if the name is on stage, `UnknownActor` if it was never declared
    pub fn assert_off_stage(&self, name: &str) -> Result<()> {
        self.off_stage_position(name).map(|_| ())
    }

    /// `false` for names outside the cast as well
    pub fn is_on_stage(&self, name: &str) -> bool {
        self.cast
            .position(name)
            .is_some_and(|index| self.on_stage.contains(&index))
    }

    pub fn on_stage_count(&self) -> usize {
        self.on_stage.len()
    }

    /// Actors on stage, in declaration order
    pub fn on_stage_actors(&self) -> impl Iterator<Item = &A> {
        self.on_stage.iter().map(|index| self.cast.get(*index))
    }

    /// Actors off stage, in declaration order
    pub fn off_stage_actors(&self) -> impl Iterator<Item = &A> {
        self.cast
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.on_stage.contains(index))
            .map(|(_, actor)| actor)
    }

    pub fn on_stage_names(&self) -> Vec<&str> {
        self.on_stage_actors().map(Actor::name).collect()
    }

    pub fn off_stage_names(&self) -> Vec<&str> {
        self.off_stage_actors().map(Actor::name).collect()
    }

    /// The two actors facing each other, present only when exactly two are on stage
    pub fn facing(&self) -> Option<(&A, &A)> {
        self.facing_positions()
            .map(|(a, b)| (self.cast.get(a), self.cast.get(b)))
    }

    /// Resolve "you" as spoken by `name`.
    pub fn resolve_opposite(&self, name: &str) -> Result<&A> {
        let index = self.opposite_position(name)?;
        Ok(self.cast.get(index))
    }

    pub fn resolve_opposite_mut(&mut self, name: &str) -> Result<&mut A> {
        let index = self.opposite_position(name)?;
        Ok(self.cast.get_mut(index))
    }

    pub fn lookup(&self, name: &str) -> Result<&A> {
        self.cast.lookup(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut A> {
        self.cast.lookup_mut(name)
    }

    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            global_boolean: self.global_boolean,
            on_stage: self.on_stage_names().into_iter().map(String::from).collect(),
            off_stage: self.off_stage_names().into_iter().map(String::from).collect(),
        }
    }

    fn facing_positions(&self) -> Option<(usize, usize)> {
        if self.on_stage.len() != 2 {
            return None;
        }
        let mut iter = self.on_stage.iter().copied();
        Some((iter.next()?, iter.next()?))
    }

    fn opposite_position(&self, name: &str) -> Result<usize> {
        let index = self.cast.position_or_unknown(name)?;

        let opposite = match self.facing_positions() {
            Some((a, b)) if a == index => Some(b),
            Some((a, b)) if b == index => Some(a),
            _ => None,
        };
        if let Some(opposite) = opposite {
            log::trace!(
                "{} is addressing {}",
                self.cast.get(index).name(),
                self.cast.get(opposite).name()
            );
            return Ok(opposite);
        }

        if !self.on_stage.contains(&index) {
            Err(StageError::NotOnStage(self.name_of(index)))
        } else if self.on_stage.len() > 2 {
            Err(StageError::AmbiguousPronoun {
                speaker: self.name_of(index),
            })
        } else {
            Err(StageError::NoAddressee(self.name_of(index)))
        }
    }

    fn on_stage_position(&self, name: &str) -> Result<usize> {
        let index = self.cast.position_or_unknown(name)?;
        if !self.on_stage.contains(&index) {
            return Err(StageError::NotOnStage(self.name_of(index)));
        }
        Ok(index)
    }

    fn off_stage_position(&self, name: &str) -> Result<usize> {
        let index = self.cast.position_or_unknown(name)?;
        if self.on_stage.contains(&index) {
            return Err(StageError::AlreadyOnStage(self.name_of(index)));
        }
        Ok(index)
    }

    fn name_of(&self, index: usize) -> String {
        normalize_name(self.cast.get(index).name())
    }

    fn describe(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .map(|index| self.cast.get(*index).name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<A: Actor + fmt::Display> fmt::Display for StageTracker<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "global boolean = {}", self.global_boolean)?;
        writeln!(f, "on stage:")?;
        for actor in self.on_stage_actors() {
            writeln!(f, "  {}", actor)?;
        }
        write!(f, "off stage:")?;
        for actor in self.off_stage_actors() {
            write!(f, "\n  {}", actor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(names: &[&str]) -> StageTracker {
        let personae = names.iter().map(|name| Persona::new(*name)).collect::<Vec<_>>();
        StageTracker::from_personae(&personae).unwrap()
    }

    #[test]
    fn test_starts_empty() {
        let stage = tracker(&["Romeo", "Juliet"]);
        assert_eq!(stage.on_stage_count(), 0);
        assert!(!stage.global_boolean());
        assert!(stage.facing().is_none());
        assert_eq!(stage.off_stage_names(), vec!["Romeo", "Juliet"]);
    }

    #[test]
    fn test_enter_and_exit() {
        let mut stage = tracker(&["Romeo", "Juliet", "Tybalt"]);

        stage.enter(["Romeo", "juliet"]).unwrap();
        assert!(stage.is_on_stage("Romeo"));
        assert!(stage.is_on_stage("Juliet"));
        assert!(!stage.is_on_stage("Tybalt"));
        assert!(!stage.is_on_stage("Mercutio"));

        stage.exit("romeo").unwrap();
        assert_eq!(stage.on_stage_names(), vec!["Juliet"]);
        assert!(matches!(
            stage.exit("Romeo"),
            Err(StageError::NotOnStage(name)) if name == "Romeo"
        ));
        assert!(matches!(
            stage.exit("Mercutio"),
            Err(StageError::UnknownActor(name)) if name == "Mercutio"
        ));
    }

    #[test]
    fn test_enter_rejects_repeated_name() {
        let mut stage = tracker(&["Romeo", "Juliet"]);

        assert!(matches!(
            stage.enter(["Juliet", "Romeo", "ROMEO"]),
            Err(StageError::AlreadyOnStage(name)) if name == "Romeo"
        ));
        assert_eq!(stage.on_stage_count(), 0);
    }

    #[test]
    fn test_exeunt_rejects_repeated_name() {
        let mut stage = tracker(&["Romeo", "Juliet"]);
        stage.enter(["Romeo", "Juliet"]).unwrap();

        assert!(matches!(
            stage.exeunt(["Romeo", "Romeo"]),
            Err(StageError::NotOnStage(name)) if name == "Romeo"
        ));
        assert_eq!(stage.on_stage_names(), vec!["Romeo", "Juliet"]);
    }

    #[test]
    fn test_exeunt_is_atomic() {
        let mut stage = tracker(&["Romeo", "Juliet", "Tybalt"]);
        stage.enter(["Romeo", "Juliet"]).unwrap();

        assert!(matches!(
            stage.exeunt(["Romeo", "Tybalt"]),
            Err(StageError::NotOnStage(name)) if name == "Tybalt"
        ));
        assert!(matches!(
            stage.exeunt(["Romeo", "Mercutio"]),
            Err(StageError::UnknownActor(name)) if name == "Mercutio"
        ));
        assert_eq!(stage.on_stage_names(), vec!["Romeo", "Juliet"]);
    }

    #[test]
    fn test_assertions() {
        let mut stage = tracker(&["Romeo", "Juliet"]);
        stage.enter(["Romeo"]).unwrap();

        assert!(stage.assert_on_stage("Romeo").is_ok());
        assert!(stage.assert_off_stage("Juliet").is_ok());
        assert!(matches!(
            stage.assert_on_stage("Juliet"),
            Err(StageError::NotOnStage(_))
        ));
        assert!(matches!(
            stage.assert_off_stage("Romeo"),
            Err(StageError::AlreadyOnStage(_))
        ));
        assert!(matches!(
            stage.assert_on_stage("Paris"),
            Err(StageError::UnknownActor(_))
        ));
        assert!(matches!(
            stage.assert_off_stage("Paris"),
            Err(StageError::UnknownActor(_))
        ));
    }

    #[test]
    fn test_facing_follows_stage() {
        let mut stage = tracker(&["Romeo", "Juliet", "Tybalt"]);

        stage.enter(["Juliet", "Romeo"]).unwrap();
        let (a, b) = stage.facing().unwrap();
        assert_eq!((a.name(), b.name()), ("Romeo", "Juliet"));

        stage.enter(["Tybalt"]).unwrap();
        assert!(stage.facing().is_none());

        stage.exit("Juliet").unwrap();
        let (a, b) = stage.facing().unwrap();
        assert_eq!((a.name(), b.name()), ("Romeo", "Tybalt"));

        stage.exit("Romeo").unwrap();
        assert!(stage.facing().is_none());
    }

    #[test]
    fn test_resolve_opposite() {
        let mut stage = tracker(&["Romeo", "Juliet", "Tybalt"]);

        assert!(matches!(
            stage.resolve_opposite("Romeo"),
            Err(StageError::NotOnStage(_))
        ));
        assert!(matches!(
            stage.resolve_opposite("Paris"),
            Err(StageError::UnknownActor(_))
        ));

        stage.enter(["Romeo"]).unwrap();
        assert!(matches!(
            stage.resolve_opposite("Romeo"),
            Err(StageError::NoAddressee(name)) if name == "Romeo"
        ));

        stage.enter(["Juliet"]).unwrap();
        assert_eq!(stage.resolve_opposite("Romeo").unwrap().name(), "Juliet");
        assert_eq!(stage.resolve_opposite("juliet").unwrap().name(), "Romeo");
        assert!(matches!(
            stage.resolve_opposite("Tybalt"),
            Err(StageError::NotOnStage(_))
        ));

        stage.enter(["Tybalt"]).unwrap();
        assert!(matches!(
            stage.resolve_opposite("Romeo"),
            Err(StageError::AmbiguousPronoun { speaker }) if speaker == "Romeo"
        ));
    }

    #[test]
    fn test_global_boolean() {
        let mut stage = tracker(&["Romeo"]);
        stage.set_global_boolean(true);
        assert!(stage.global_boolean());
        stage.exeunt_all();
        assert!(stage.global_boolean());
        stage.set_global_boolean(false);
        assert!(!stage.global_boolean());
    }

    #[test]
    fn test_display() {
        let mut stage = tracker(&["Romeo", "Juliet", "Tybalt"]);
        stage.enter(["Tybalt", "Romeo"]).unwrap();
        stage.set_global_boolean(true);

        assert_eq!(
            stage.to_string(),
            "global boolean = true\non stage:\n  Romeo\n  Tybalt\noff stage:\n  Juliet"
        );

        stage.exeunt_all();
        stage.set_global_boolean(false);
        assert_eq!(
            stage.to_string(),
            "global boolean = false\non stage:\noff stage:\n  Romeo\n  Juliet\n  Tybalt"
        );
    }

    #[test]
    fn test_snapshot() {
        let mut stage = tracker(&["Romeo", "Juliet", "Tybalt"]);
        stage.enter(["Juliet"]).unwrap();

        assert_eq!(
            stage.snapshot(),
            StageSnapshot {
                global_boolean: false,
                on_stage: vec!["Juliet".to_string()],
                off_stage: vec!["Romeo".to_string(), "Tybalt".to_string()],
            }
        );
    }
}
