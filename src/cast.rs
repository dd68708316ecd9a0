use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, StageError};
use crate::format::{Persona, SourceLocation};

/// Anything that can be put on stage. The name must be unique within a play.
pub trait Actor {
    fn name(&self) -> &str;
}

/// Turns a persona declaration into an actor, called once per persona when the cast is built
pub trait ActorFactory {
    type Actor: Actor;

    fn create(&mut self, persona: &Persona) -> anyhow::Result<Self::Actor>;
}

impl<A, F> ActorFactory for F
where
    A: Actor,
    F: FnMut(&Persona) -> anyhow::Result<A>,
{
    type Actor = A;

    fn create(&mut self, persona: &Persona) -> anyhow::Result<A> {
        self(persona)
    }
}

/// Canonical form of a character name: words separated by single spaces, each one capitalized.
///
/// `"  the   GHOST of hamlet "` becomes `"The Ghost Of Hamlet"`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    for word in name.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            normalized.extend(first.to_uppercase());
            normalized.extend(chars.flat_map(char::to_lowercase));
        }
    }
    normalized
}

/// The default actor, carrying nothing but what its declaration said
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    name: String,
    description: Option<String>,
    location: Option<SourceLocation>,
}

impl Character {
    pub fn from_persona(persona: &Persona) -> Self {
        Self {
            name: normalize_name(&persona.name),
            description: persona.description.clone(),
            location: persona.location,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

impl Actor for Character {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CharacterFactory;

impl ActorFactory for CharacterFactory {
    type Actor = Character;

    fn create(&mut self, persona: &Persona) -> anyhow::Result<Character> {
        if persona.name.trim().is_empty() {
            anyhow::bail!("persona has an empty name");
        }
        Ok(Character::from_persona(persona))
    }
}

/// Every actor of a play, keyed by normalized name and kept in declaration order.
///
/// The registry is fixed once built: actors can be looked up and their
/// contents changed, but never added or removed.
#[derive(Debug, Clone)]
pub struct CastRegistry<A = Character> {
    actors: Vec<A>,
    index: HashMap<String, usize>,
}

impl CastRegistry<Character> {
    pub fn from_personae(personae: &[Persona]) -> Result<Self> {
        Self::new(personae, CharacterFactory)
    }
}

impl<A: Actor> CastRegistry<A> {
    pub fn new<F>(personae: &[Persona], mut factory: F) -> Result<Self>
    where
        F: ActorFactory<Actor = A>,
    {
        let mut actors = Vec::with_capacity(personae.len());
        let mut index = HashMap::with_capacity(personae.len());

        for persona in personae {
            let actor = factory
                .create(persona)
                .map_err(|source| StageError::ActorFactory {
                    name: persona.name.clone(),
                    location: persona.location,
                    source,
                })?;

            let name = normalize_name(actor.name());
            if index.contains_key(&name) {
                return Err(StageError::DuplicateActor {
                    name,
                    location: persona.location,
                });
            }

            index.insert(name, actors.len());
            actors.push(actor);
        }

        log::debug!("cast assembled with {} actor(s)", actors.len());

        Ok(Self { actors, index })
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn lookup(&self, name: &str) -> Result<&A> {
        let index = self.position_or_unknown(name)?;
        Ok(&self.actors[index])
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut A> {
        let index = self.position_or_unknown(name)?;
        Ok(&mut self.actors[index])
    }

    /// Actors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.actors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actors.iter().map(Actor::name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        match self.index.get(name) {
            Some(index) => Some(*index),
            None => self.index.get(&normalize_name(name)).copied(),
        }
    }

    pub(crate) fn position_or_unknown(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| StageError::UnknownActor(normalize_name(name)))
    }

    pub(crate) fn get(&self, index: usize) -> &A {
        &self.actors[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut A {
        &mut self.actors[index]
    }
}
