//! Ordered-peg stacking: the discrete model behind the tower levels.
//!
//! Each peg holds a stack of blocks, bottom first, top last. Only the top
//! block of a peg can be lifted, and a block may land on a peg only when the
//! peg is empty or its top block is strictly larger. Block size is the number
//! in the block's tag. Positions are derived from the stacks; nothing here
//! simulates physics.

#[cfg(test)]
#[path = "stack_test.rs"]
mod stack_test;

use std::collections::HashMap;

use crate::consts::PEG_SNAP_TOLERANCE;
use crate::geom::Point;
use crate::piece::{PieceId, PieceStore, Tag};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StackError {
    #[error("unknown peg: {0}")]
    UnknownPeg(String),
    #[error("unknown block: {0}")]
    UnknownBlock(PieceId),
    #[error("block tag {0} carries no size")]
    Unranked(Tag),
    #[error("block is not on top of its peg")]
    NotOnTop,
    #[error("another block is already lifted")]
    AlreadyLifted,
    #[error("block of size {block} cannot rest on size {top}")]
    LargerOnSmaller { block: u32, top: u32 },
}

/// A vertical peg.
#[derive(Debug, Clone, PartialEq)]
pub struct Peg {
    pub name: String,
    /// Bottom-center of the peg; the first block rests on it.
    pub base: Point,
    blocks: Vec<PieceId>,
}

impl Peg {
    #[must_use]
    pub fn new(name: impl Into<String>, base: Point) -> Self {
        Self { name: name.into(), base, blocks: Vec::new() }
    }

    /// Blocks bottom to top.
    #[must_use]
    pub fn blocks(&self) -> &[PieceId] {
        &self.blocks
    }

    #[must_use]
    pub fn top(&self) -> Option<PieceId> {
        self.blocks.last().copied()
    }
}

/// Where a released block ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StackDrop {
    /// Accepted on `peg` and settled at `position`.
    Placed { peg: usize, position: Point },
    /// Refused; sent back onto the peg it was lifted from.
    Returned { peg: usize, position: Point },
}

#[derive(Debug, Clone, Copy)]
struct Block {
    size: u32,
    height: f64,
}

/// All pegs of a level plus the goal peg.
#[derive(Debug, Clone)]
pub struct StackBoard {
    pegs: Vec<Peg>,
    blocks: HashMap<PieceId, Block>,
    goal: usize,
    snap_tolerance: f64,
    lifted: Option<(PieceId, usize)>,
}

impl Default for StackBoard {
    fn default() -> Self {
        Self::new(PEG_SNAP_TOLERANCE)
    }
}

impl StackBoard {
    #[must_use]
    pub fn new(snap_tolerance: f64) -> Self {
        Self { pegs: Vec::new(), blocks: HashMap::new(), goal: 0, snap_tolerance, lifted: None }
    }

    /// Add a peg and return its index. The last peg added is the goal until
    /// [`StackBoard::set_goal`] says otherwise.
    pub fn add_peg(&mut self, peg: Peg) -> usize {
        self.pegs.push(peg);
        self.goal = self.pegs.len() - 1;
        self.pegs.len() - 1
    }

    pub fn set_goal(&mut self, name: &str) -> Result<(), StackError> {
        self.goal = self.peg_index(name)?;
        Ok(())
    }

    #[must_use]
    pub fn pegs(&self) -> &[Peg] {
        &self.pegs
    }

    #[must_use]
    pub fn goal(&self) -> usize {
        self.goal
    }

    pub fn peg_index(&self, name: &str) -> Result<usize, StackError> {
        self.pegs.iter().position(|p| p.name == name).ok_or_else(|| StackError::UnknownPeg(name.to_owned()))
    }

    /// Whether the store piece `id` is managed by this board.
    #[must_use]
    pub fn contains(&self, id: PieceId) -> bool {
        self.blocks.contains_key(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pegs.is_empty()
    }

    /// Peg index currently holding `id`. `None` while lifted or unknown.
    #[must_use]
    pub fn peg_of(&self, id: PieceId) -> Option<usize> {
        self.pegs.iter().position(|p| p.blocks.contains(&id))
    }

    #[must_use]
    pub fn is_top(&self, id: PieceId) -> bool {
        self.pegs.iter().any(|p| p.top() == Some(id))
    }

    /// Block currently held by the player, with the peg it came from.
    #[must_use]
    pub fn lifted(&self) -> Option<(PieceId, usize)> {
        self.lifted
    }

    /// Level setup: stack the store piece `id` on `peg` and move it to its
    /// resting position.
    pub fn stack(&mut self, store: &mut PieceStore, peg: &str, id: PieceId) -> Result<Point, StackError> {
        let index = self.peg_index(peg)?;
        let block = Self::block_of(store, id)?;
        self.check_fits(index, block.size)?;
        self.blocks.insert(id, block);
        Ok(self.settle(store, index, id))
    }

    /// Whether a block of `size` may land on peg `index`.
    #[must_use]
    pub fn can_place(&self, index: usize, size: u32) -> bool {
        self.check_fits(index, size).is_ok()
    }

    /// Nearest peg to `position`, by horizontal distance, within the snap
    /// tolerance. Ties keep the first peg.
    #[must_use]
    pub fn nearest_peg(&self, position: Point) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, peg) in self.pegs.iter().enumerate() {
            let d = (peg.base.x - position.x).abs();
            if d <= self.snap_tolerance && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Take the top block `id` off its peg so it can be dragged.
    pub fn lift(&mut self, id: PieceId) -> Result<usize, StackError> {
        if self.lifted.is_some() {
            return Err(StackError::AlreadyLifted);
        }
        if !self.blocks.contains_key(&id) {
            return Err(StackError::UnknownBlock(id));
        }
        let Some(index) = self.pegs.iter().position(|p| p.top() == Some(id)) else {
            return Err(StackError::NotOnTop);
        };
        self.pegs[index].blocks.pop();
        self.lifted = Some((id, index));
        Ok(index)
    }

    /// Release the lifted block at `position`: settle it on the nearest
    /// accepting peg, or put it back where it came from.
    pub fn drop_block(
        &mut self,
        store: &mut PieceStore,
        id: PieceId,
        position: Point,
    ) -> Result<StackDrop, StackError> {
        let Some((lifted, home)) = self.lifted else {
            return Err(StackError::UnknownBlock(id));
        };
        if lifted != id {
            return Err(StackError::UnknownBlock(id));
        }
        let size = self.blocks.get(&id).map_or(0, |b| b.size);
        self.lifted = None;
        match self.nearest_peg(position) {
            Some(index) if index != home && self.can_place(index, size) => {
                let position = self.settle(store, index, id);
                Ok(StackDrop::Placed { peg: index, position })
            }
            _ => {
                let position = self.settle(store, home, id);
                Ok(StackDrop::Returned { peg: home, position })
            }
        }
    }

    /// Put a lifted block back without a drop (drag cancelled).
    pub fn restore(&mut self, store: &mut PieceStore) -> Option<Point> {
        let (id, home) = self.lifted.take()?;
        if store.piece(&id).is_none() {
            self.blocks.remove(&id);
            return None;
        }
        Some(self.settle(store, home, id))
    }

    /// Forget a block that left the level.
    pub fn forget(&mut self, id: PieceId) {
        self.blocks.remove(&id);
        for peg in &mut self.pegs {
            peg.blocks.retain(|b| *b != id);
        }
        if self.lifted.is_some_and(|(l, _)| l == id) {
            self.lifted = None;
        }
    }

    /// Every block sits on the goal peg.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let Some(goal) = self.pegs.get(self.goal) else {
            return false;
        };
        self.lifted.is_none() && !self.blocks.is_empty() && goal.blocks.len() == self.blocks.len()
    }

    /// Resting point of a block of `height` on a peg whose blocks beneath it
    /// add up to `heights_below`. With equal heights this is
    /// `base.y + height * index + height / 2`.
    #[must_use]
    pub fn settle_position(base: Point, heights_below: f64, height: f64) -> Point {
        Point { x: base.x, y: base.y + heights_below + height * 0.5 }
    }

    fn settle(&mut self, store: &mut PieceStore, index: usize, id: PieceId) -> Point {
        let peg = &mut self.pegs[index];
        let below: f64 = peg.blocks.iter().filter_map(|b| self.blocks.get(b)).map(|b| b.height).sum();
        let height = self.blocks.get(&id).map_or(0.0, |b| b.height);
        let position = Self::settle_position(peg.base, below, height);
        peg.blocks.push(id);
        if let Some(piece) = store.piece_mut(&id) {
            piece.transform.position = position;
        }
        store.raise_near_front(id);
        position
    }

    fn check_fits(&self, index: usize, size: u32) -> Result<(), StackError> {
        let peg = self.pegs.get(index).ok_or_else(|| StackError::UnknownPeg(index.to_string()))?;
        match peg.top().and_then(|t| self.blocks.get(&t)) {
            Some(top) if top.size <= size => Err(StackError::LargerOnSmaller { block: size, top: top.size }),
            _ => Ok(()),
        }
    }

    fn block_of(store: &PieceStore, id: PieceId) -> Result<Block, StackError> {
        let piece = store.piece(&id).ok_or(StackError::UnknownBlock(id))?;
        let size = piece.tag.size_rank().map_err(|_| StackError::Unranked(piece.tag.clone()))?;
        Ok(Block { size, height: piece.size.height * piece.transform.scale.y })
    }
}
