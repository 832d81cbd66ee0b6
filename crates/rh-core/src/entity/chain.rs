//! Owning entity chains
//!
//! A chain owns its records outright; moving a record between chains is a
//! single [`relink`], and removing one hands ownership back to the caller.
//! The head of the chain is the most recently linked record, matching the
//! order the save file walks.

use std::collections::VecDeque;

use hashbrown::HashSet;

use super::EntityId;
use crate::dungeon::Pos;
use crate::world::Impossible;

/// A record that can live on a chain
pub trait ChainEntity {
    fn id(&self) -> EntityId;

    /// Map position, if the record is on the floor
    fn pos(&self) -> Option<Pos> {
        None
    }
}

/// An ordered, owning chain of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain<T> {
    name: &'static str,
    items: VecDeque<T>,
}

impl<T: ChainEntity> Chain<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate from the head
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.iter().map(ChainEntity::id)
    }

    pub fn head(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// First record at a map position
    pub fn at(&self, pos: Pos) -> Option<&T> {
        self.items.iter().find(|item| item.pos() == Some(pos))
    }

    pub fn at_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.pos() == Some(pos))
    }

    /// Link a record at the head
    pub fn push_front(&mut self, item: T) -> Result<(), Impossible> {
        self.check_linkable(&item)?;
        self.items.push_front(item);
        Ok(())
    }

    /// Link a record at the tail. Used when rebuilding a chain in file order.
    pub fn push_back(&mut self, item: T) -> Result<(), Impossible> {
        self.check_linkable(&item)?;
        self.items.push_back(item);
        Ok(())
    }

    fn check_linkable(&self, item: &T) -> Result<(), Impossible> {
        let id = item.id();
        if id.is_none() || self.contains(id) {
            return Err(Impossible::AlreadyLinked {
                chain: self.name,
                id,
            }
            .report());
        }
        Ok(())
    }

    /// Splice a record out of the chain and return it.
    ///
    /// A missing target means some other chain or index disagrees with this
    /// one, which is fatal.
    pub fn unlink(&mut self, id: EntityId) -> Result<T, Impossible> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| Impossible::NotInChain { chain: self.name, id }.report())?;
        self.items
            .remove(index)
            .ok_or_else(|| Impossible::NotInChain { chain: self.name, id }.report())
    }

    /// Remove every record matching `pred`, keeping the rest in order
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let mut kept = VecDeque::with_capacity(self.items.len());
        let mut removed = Vec::new();
        for item in self.items.drain(..) {
            if pred(&item) {
                removed.push(item);
            } else {
                kept.push_back(item);
            }
        }
        self.items = kept;
        removed
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Verify no id is zero or repeated
    pub fn check_integrity(&self) -> Result<(), Impossible> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for id in self.ids() {
            if id.is_none() || !seen.insert(id) {
                return Err(Impossible::AlreadyLinked {
                    chain: self.name,
                    id,
                }
                .report());
            }
        }
        Ok(())
    }
}

/// Move a record from one chain to the head of another.
///
/// Both chains are checked before anything moves, so a failure leaves both
/// untouched.
pub fn relink<T: ChainEntity>(
    from: &mut Chain<T>,
    to: &mut Chain<T>,
    id: EntityId,
) -> Result<(), Impossible> {
    if to.contains(id) {
        return Err(Impossible::AlreadyLinked { chain: to.name, id }.report());
    }
    let item = from.unlink(id)?;
    to.items.push_front(item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec(EntityId);

    impl ChainEntity for Rec {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    fn chain_of(name: &'static str, ids: &[u32]) -> Chain<Rec> {
        let mut chain = Chain::new(name);
        for &id in ids {
            chain.push_back(Rec(EntityId(id))).unwrap();
        }
        chain
    }

    #[test]
    fn test_push_front_is_head() {
        let mut chain = chain_of("floor", &[1, 2]);
        chain.push_front(Rec(EntityId(3))).unwrap();
        assert_eq!(chain.head(), Some(&Rec(EntityId(3))));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_unlink_head_and_middle() {
        let mut chain = chain_of("floor", &[1, 2, 3]);
        assert_eq!(chain.unlink(EntityId(1)).unwrap(), Rec(EntityId(1)));
        assert_eq!(chain.unlink(EntityId(3)).unwrap(), Rec(EntityId(3)));
        assert_eq!(chain.ids().collect::<Vec<_>>(), vec![EntityId(2)]);
    }

    #[test]
    fn test_unlink_missing_is_impossible() {
        let mut chain = chain_of("invent", &[1]);
        let err = chain.unlink(EntityId(9)).unwrap_err();
        assert_eq!(
            err,
            Impossible::NotInChain {
                chain: "invent",
                id: EntityId(9)
            }
        );
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_duplicate_link_rejected() {
        let mut chain = chain_of("floor", &[1]);
        assert!(chain.push_front(Rec(EntityId(1))).is_err());
        assert!(chain.push_front(Rec(EntityId::NONE)).is_err());
    }

    #[test]
    fn test_relink_failure_leaves_both_chains() {
        let mut floor = chain_of("floor", &[1, 2]);
        let mut invent = chain_of("invent", &[2]);
        assert!(relink(&mut floor, &mut invent, EntityId(2)).is_err());
        assert_eq!(floor.len(), 2);
        assert_eq!(invent.len(), 1);
        assert!(relink(&mut floor, &mut invent, EntityId(7)).is_err());
        assert_eq!(floor.len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create,
        Relink(usize, usize, usize),
        Unlink(usize, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Create),
            (0..3usize, 0..3usize, 0..16usize).prop_map(|(a, b, i)| Op::Relink(a, b, i)),
            (0..3usize, 0..16usize).prop_map(|(a, i)| Op::Unlink(a, i)),
        ]
    }

    proptest! {
        #[test]
        fn test_chain_integrity_under_random_ops(ops in prop::collection::vec(op_strategy(), 1..200)) {
            let mut chains = [Chain::new("a"), Chain::new("b"), Chain::new("c")];
            let mut next = 1u32;
            let mut live = 0usize;
            let mut freed = Vec::new();

            for op in ops {
                match op {
                    Op::Create => {
                        chains[0].push_front(Rec(EntityId(next))).unwrap();
                        next += 1;
                        live += 1;
                    }
                    Op::Relink(a, b, i) => {
                        let Some(id) = chains[a].ids().nth(i) else { continue };
                        if a == b {
                            continue;
                        }
                        let (from, to) = if a < b {
                            let (lo, hi) = chains.split_at_mut(b);
                            (&mut lo[a], &mut hi[0])
                        } else {
                            let (lo, hi) = chains.split_at_mut(a);
                            (&mut hi[0], &mut lo[b])
                        };
                        relink(from, to, id).unwrap();
                    }
                    Op::Unlink(a, i) => {
                        let Some(id) = chains[a].ids().nth(i) else { continue };
                        chains[a].unlink(id).unwrap();
                        freed.push(id);
                        live -= 1;
                    }
                }

                let mut all: Vec<EntityId> = chains.iter().flat_map(|c| c.ids()).collect();
                prop_assert_eq!(all.len(), live);
                all.sort();
                all.dedup();
                prop_assert_eq!(all.len(), live);
                for id in &freed {
                    prop_assert!(chains.iter().all(|c| !c.contains(*id)));
                }
                for chain in &chains {
                    prop_assert!(chain.check_integrity().is_ok());
                }
            }
        }
    }
}
