//! Entity management

use std::fmt;

/// Opaque entity handle.
///
/// The `generation` distinguishes successive occupants of the same slot, so a
/// handle kept past `destroy` never resolves to a recycled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Entity allocator with a free list of recycled slots
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            count: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                self.alive.push(false);
                index
            }
        };
        self.alive[index as usize] = true;
        self.count += 1;
        Entity {
            index,
            generation: self.generations[index as usize],
        }
    }

    /// Frees the slot of `entity`. Returns `false` if the handle was stale.
    ///
    /// A slot whose generation reaches `u32::MAX` is retired instead of
    /// recycled, so generations never wrap back onto an old handle.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = entity.index as usize;
        self.alive[slot] = false;
        self.generations[slot] += 1;
        if self.generations[slot] < u32::MAX {
            self.free_list.push(entity.index);
        }
        self.count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        self.alive.get(slot).copied().unwrap_or(false)
            && self.generations[slot] == entity.generation
    }

    /// Current handle for a live slot.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        let slot = index as usize;
        if self.alive.get(slot).copied().unwrap_or(false) {
            Some(Entity {
                index,
                generation: self.generations[slot],
            })
        } else {
            None
        }
    }

    /// Live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.alive.len() as u32).filter_map(|index| self.entity_at(index))
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
