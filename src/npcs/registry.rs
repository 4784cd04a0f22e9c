//! Roster of live characters, one per speaker, capped in size.
//!
//! Characters are kept in admission order; that order is also the draw
//! and bubble-layout order. When a new speaker arrives and the roster is
//! full, the oldest character leaves first.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

#[derive(Resource, Debug)]
pub struct Roster {
    characters: Vec<Character>,
    capacity: usize,
    next_serial: u64,
}

impl Default for Roster {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CHARACTERS)
    }
}

impl Roster {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            characters: Vec::new(),
            capacity: capacity.max(1),
            next_serial: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.iter_mut()
    }

    pub fn as_slice(&self) -> &[Character] {
        &self.characters
    }

    pub fn as_mut_slice(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.characters.iter().position(|c| c.name == name)
    }

    /// The character for `speaker`, admitting it on first sight.
    pub fn resolve(
        &mut self,
        speaker: &str,
        now: f64,
        sprite_pool: &[String],
        rng: &mut impl Rng,
    ) -> &mut Character {
        let index = match self.position(speaker) {
            Some(index) => index,
            None => {
                if let Some(evicted) = self.evict_if_over_capacity() {
                    info!("[Roster] '{}' left to make room for '{}'", evicted.name, speaker);
                }
                let serial = self.next_serial;
                self.next_serial += 1;
                self.characters
                    .push(Character::spawn(speaker, serial, now, sprite_pool, rng));
                info!("[Roster] '{}' joined ({}/{})", speaker, self.len(), self.capacity);
                self.characters.len() - 1
            }
        };
        &mut self.characters[index]
    }

    /// Remove the oldest character if admitting one more would exceed the
    /// cap. Oldest means smallest creation time, then earliest admission.
    pub fn evict_if_over_capacity(&mut self) -> Option<Character> {
        if self.characters.len() < self.capacity {
            return None;
        }
        let oldest = self
            .characters
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.created_at
                    .total_cmp(&b.created_at)
                    .then(a.serial.cmp(&b.serial))
            })
            .map(|(index, _)| index)?;
        Some(self.characters.remove(oldest))
    }

    /// Current `x` of every character, for follow lookups.
    pub fn positions(&self) -> Vec<(String, f32)> {
        self.characters.iter().map(|c| (c.name.clone(), c.x)).collect()
    }
}
