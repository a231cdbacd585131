// Content-addressed tile atlas.
// The compiler and the metatile stamper interact through `TileId` only.

use super::tile::{EMPTY_TILE, Tile, TileId};

/// Default atlas capacity: the 10-bit tile index of a text-mode screen entry.
pub const MAX_TILES: usize = 1024;

/*──────────────────────── lookup strategies ────────────────────────*/

/// Index over the stored tiles. Strategies must agree exactly on which tiles
/// are equal; they differ only in cost.
pub trait TileLookup {
    /// Id of a stored tile byte-identical to `tile`, if any.
    fn find(&self, tiles: &[Tile], tile: &Tile) -> Option<TileId>;

    /// `tiles[id] == *tile` has just been appended.
    fn record(&mut self, id: TileId, tile: &Tile);

    /// Forget everything.
    fn clear(&mut self);
}

/// Full comparison against every stored tile. O(n) per lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearScan;

impl TileLookup for LinearScan {
    fn find(&self, tiles: &[Tile], tile: &Tile) -> Option<TileId> {
        tiles.iter().position(|t| t == tile).map(|i| i as TileId)
    }

    fn record(&mut self, _id: TileId, _tile: &Tile) {}

    fn clear(&mut self) {}
}

const FREE_SLOT: TileId = TileId::MAX;

/// FNV-1a keyed open-addressing table with verification on every probe hit.
#[derive(Clone, Debug)]
pub struct HashIndex {
    slots: Vec<TileId>,
    mask: usize,
}

/// FNV-1a 64-bit over the 64 tile bytes.
#[inline]
pub fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(0xcbf2_9ce4_8422_2325u64, |h, &b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

impl HashIndex {
    /// Table sized for `capacity` tiles at ≤ 50 % load, so probing always
    /// terminates on a free slot.
    pub fn with_capacity(capacity: usize) -> Self {
        let len = (capacity.max(1) * 2).next_power_of_two();
        Self {
            slots: vec![FREE_SLOT; len],
            mask: len - 1,
        }
    }

    #[inline]
    fn home(&self, tile: &Tile) -> usize {
        fnv1a_64(tile.as_bytes()) as usize & self.mask
    }
}

impl TileLookup for HashIndex {
    fn find(&self, tiles: &[Tile], tile: &Tile) -> Option<TileId> {
        let mut i = self.home(tile);
        loop {
            let id = self.slots[i];
            if id == FREE_SLOT {
                return None;
            }
            // hash collisions resolved by full comparison
            if tiles[id as usize] == *tile {
                return Some(id);
            }
            i = (i + 1) & self.mask;
        }
    }

    fn record(&mut self, id: TileId, tile: &Tile) {
        let mut i = self.home(tile);
        while self.slots[i] != FREE_SLOT {
            i = (i + 1) & self.mask;
        }
        self.slots[i] = id;
    }

    fn clear(&mut self) {
        self.slots.fill(FREE_SLOT);
    }
}

/// Runtime-selectable strategy, picked from configuration.
#[derive(Clone, Debug)]
pub enum Lookup {
    Linear(LinearScan),
    Hashed(HashIndex),
}

impl TileLookup for Lookup {
    fn find(&self, tiles: &[Tile], tile: &Tile) -> Option<TileId> {
        match self {
            Lookup::Linear(l) => l.find(tiles, tile),
            Lookup::Hashed(h) => h.find(tiles, tile),
        }
    }

    fn record(&mut self, id: TileId, tile: &Tile) {
        match self {
            Lookup::Linear(l) => l.record(id, tile),
            Lookup::Hashed(h) => h.record(id, tile),
        }
    }

    fn clear(&mut self) {
        match self {
            Lookup::Linear(l) => l.clear(),
            Lookup::Hashed(h) => h.clear(),
        }
    }
}

/*──────────────────────────── the store ────────────────────────────*/

/// Insertion-ordered, capacity-bounded tile dictionary.
///
/// * Ids are dense: `0 .. len()`.
/// * Id **0** is always the all-transparent tile.
/// * Once full, new content resolves to [`EMPTY_TILE`] and is dropped;
///   existing entries are never touched.
pub struct TileStore<L: TileLookup = Lookup> {
    tiles: Vec<Tile>,
    capacity: usize,
    lookup: L,
    overflows: usize,
}

impl<L: TileLookup> TileStore<L> {
    pub fn new(capacity: usize, lookup: L) -> Self {
        assert!(
            (1..=TileId::MAX as usize).contains(&capacity),
            "tile capacity {capacity} not addressable"
        );
        let mut store = Self {
            tiles: Vec::with_capacity(capacity),
            capacity,
            lookup,
            overflows: 0,
        };
        store.reset();
        store
    }

    /// Back to the single reserved empty tile.
    pub fn reset(&mut self) {
        self.tiles.clear();
        self.lookup.clear();
        self.tiles.push(Tile::EMPTY);
        self.lookup.record(EMPTY_TILE, &Tile::EMPTY);
        self.overflows = 0;
    }

    /// Id of `tile`, inserting it when new and there is room.
    pub fn find_or_add(&mut self, tile: &Tile) -> TileId {
        if let Some(id) = self.lookup.find(&self.tiles, tile) {
            return id;
        }
        if self.tiles.len() >= self.capacity {
            if self.overflows == 0 {
                log::warn!(
                    "tile store full ({} tiles): new content falls back to the empty tile",
                    self.capacity
                );
            }
            self.overflows += 1;
            return EMPTY_TILE;
        }
        let id = self.tiles.len() as TileId;
        self.tiles.push(*tile);
        self.lookup.record(id, tile);
        id
    }

    /// Lookup without inserting.
    pub fn find(&self, tile: &Tile) -> Option<TileId> {
        self.lookup.find(&self.tiles, tile)
    }

    /// Borrow a tile by id; out-of-range ids read as the empty tile.
    #[inline]
    pub fn tile(&self, id: TileId) -> &Tile {
        self.tiles.get(id as usize).unwrap_or(&self.tiles[0])
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles stored (including the empty one).
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Only the reserved empty tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.len() == 1
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.tiles.len() >= self.capacity
    }

    /// Lookups of new content rejected since the last reset.
    #[inline]
    pub fn overflow_count(&self) -> usize {
        self.overflows
    }
}

impl TileStore<Lookup> {
    pub fn linear(capacity: usize) -> Self {
        Self::new(capacity, Lookup::Linear(LinearScan))
    }

    pub fn hashed(capacity: usize) -> Self {
        Self::new(capacity, Lookup::Hashed(HashIndex::with_capacity(capacity)))
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
