use cosmwasm_std::{Addr, Order, StdResult, Storage};
use cw_storage_plus::{Bound, Map};

use crate::error::ContractError;

/// Live lock ids of every owner, kept as a gapless sequence per owner.
///
/// `append` pushes to the tail. `remove` moves the tail id into the vacated
/// slot and truncates, so both are a constant number of storage operations.
/// The position of an id is therefore only stable until the next removal for
/// the same owner.
///
/// `slot_of` is the inverse of `sequence`: for every owner and every
/// `i < len`, `slot_of[sequence[(owner, i)]] == i`. Only `append` and `remove`
/// write to the three maps.
pub struct OwnerIndex<'a> {
    sequence: Map<'a, (&'a Addr, u32), u64>,
    len: Map<'a, &'a Addr, u32>,
    slot_of: Map<'a, u64, u32>,
}

impl<'a> OwnerIndex<'a> {
    pub const fn new(sequence_ns: &'a str, len_ns: &'a str, slot_ns: &'a str) -> Self {
        OwnerIndex {
            sequence: Map::new(sequence_ns),
            len: Map::new(len_ns),
            slot_of: Map::new(slot_ns),
        }
    }

    pub fn count(&self, store: &dyn Storage, owner: &'a Addr) -> StdResult<u32> {
        Ok(self.len.may_load(store, owner)?.unwrap_or_default())
    }

    /// Id stored at `index` in the owner's sequence.
    pub fn get(
        &self,
        store: &dyn Storage,
        owner: &'a Addr,
        index: u32,
    ) -> Result<u64, ContractError> {
        let count = self.count(store, owner)?;
        if index >= count {
            return Err(ContractError::IndexOutOfRange { index, count });
        }
        Ok(self.sequence.load(store, (owner, index))?)
    }

    /// Current position of `id`, if it is indexed.
    pub fn slot(&self, store: &dyn Storage, id: u64) -> StdResult<Option<u32>> {
        self.slot_of.may_load(store, id)
    }

    pub fn append(&self, store: &mut dyn Storage, owner: &'a Addr, id: u64) -> StdResult<u32> {
        let slot = self.count(store, owner)?;
        self.sequence.save(store, (owner, slot), &id)?;
        self.slot_of.save(store, id, &slot)?;
        self.len.save(store, owner, &(slot + 1))?;
        Ok(slot)
    }

    pub fn remove(
        &self,
        store: &mut dyn Storage,
        owner: &'a Addr,
        id: u64,
    ) -> Result<(), ContractError> {
        let slot = self
            .slot(store, id)?
            .ok_or(ContractError::LockNotFound { id })?;
        let count = self.count(store, owner)?;
        // the slot must belong to this owner's sequence
        if slot >= count || self.sequence.may_load(store, (owner, slot))? != Some(id) {
            return Err(ContractError::LockNotFound { id });
        }

        let last = count - 1;
        if slot != last {
            let moved = self.sequence.load(store, (owner, last))?;
            self.sequence.save(store, (owner, slot), &moved)?;
            self.slot_of.save(store, moved, &slot)?;
        }
        self.sequence.remove(store, (owner, last));
        self.slot_of.remove(store, id);

        if last == 0 {
            self.len.remove(store, owner);
        } else {
            self.len.save(store, owner, &last)?;
        }
        Ok(())
    }

    /// Ascending page of `(position, id)` pairs.
    pub fn range(
        &self,
        store: &dyn Storage,
        owner: &'a Addr,
        start_after: Option<u32>,
        limit: usize,
    ) -> StdResult<Vec<(u32, u64)>> {
        let start = start_after.map(Bound::exclusive);
        self.sequence
            .prefix(owner)
            .range(store, start, None, Order::Ascending)
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    const INDEX: OwnerIndex = OwnerIndex::new("seq", "len", "slot");

    fn assert_sequence(store: &dyn Storage, owner: &Addr, expected: &[u64]) {
        assert_eq!(expected.len() as u32, INDEX.count(store, owner).unwrap());
        for (i, id) in expected.iter().enumerate() {
            assert_eq!(*id, INDEX.get(store, owner, i as u32).unwrap());
            assert_eq!(Some(i as u32), INDEX.slot(store, *id).unwrap());
        }
        // nothing past the end
        let pairs = INDEX.range(store, owner, None, usize::MAX).unwrap();
        assert_eq!(expected.len(), pairs.len());
    }

    fn filled(store: &mut dyn Storage, owner: &Addr, ids: &[u64]) {
        for id in ids {
            INDEX.append(store, owner, *id).unwrap();
        }
    }

    #[test]
    fn append_tracks_slots() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");

        assert_eq!(0, INDEX.count(&store, &alice).unwrap());
        assert_eq!(0, INDEX.append(&mut store, &alice, 1).unwrap());
        assert_eq!(1, INDEX.append(&mut store, &alice, 2).unwrap());
        assert_eq!(2, INDEX.append(&mut store, &alice, 5).unwrap());
        assert_sequence(&store, &alice, &[1, 2, 5]);
    }

    #[test]
    fn remove_head_moves_tail() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        filled(&mut store, &alice, &[1, 2, 3, 4]);

        INDEX.remove(&mut store, &alice, 1).unwrap();
        assert_sequence(&store, &alice, &[4, 2, 3]);
        assert_eq!(None, INDEX.slot(&store, 1).unwrap());
    }

    #[test]
    fn remove_middle_moves_tail() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        filled(&mut store, &alice, &[1, 2, 3, 4]);

        INDEX.remove(&mut store, &alice, 2).unwrap();
        assert_sequence(&store, &alice, &[1, 4, 3]);
    }

    #[test]
    fn remove_tail_only_truncates() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        filled(&mut store, &alice, &[1, 2, 3]);

        INDEX.remove(&mut store, &alice, 3).unwrap();
        assert_sequence(&store, &alice, &[1, 2]);
    }

    #[test]
    fn remove_only_element() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        filled(&mut store, &alice, &[7]);

        INDEX.remove(&mut store, &alice, 7).unwrap();
        assert_sequence(&store, &alice, &[]);

        // index is usable again from slot zero
        assert_eq!(0, INDEX.append(&mut store, &alice, 8).unwrap());
        assert_sequence(&store, &alice, &[8]);
    }

    #[test]
    fn remove_unknown_id() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        let bob = Addr::unchecked("bob");
        filled(&mut store, &alice, &[1, 2]);
        filled(&mut store, &bob, &[3]);

        let err = INDEX.remove(&mut store, &alice, 9).unwrap_err();
        match err {
            ContractError::LockNotFound { id: 9 } => {}
            e => panic!("unexpected error: {:?}", e),
        }

        // id 3 belongs to bob, alice's slot 0 holds id 1
        let err = INDEX.remove(&mut store, &alice, 3).unwrap_err();
        match err {
            ContractError::LockNotFound { id: 3 } => {}
            e => panic!("unexpected error: {:?}", e),
        }
        assert_sequence(&store, &alice, &[1, 2]);
        assert_sequence(&store, &bob, &[3]);
    }

    #[test]
    fn get_out_of_range() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        filled(&mut store, &alice, &[1, 2]);

        let err = INDEX.get(&store, &alice, 2).unwrap_err();
        match err {
            ContractError::IndexOutOfRange { index: 2, count: 2 } => {}
            e => panic!("unexpected error: {:?}", e),
        }

        let err = INDEX.get(&store, &Addr::unchecked("bob"), 0).unwrap_err();
        match err {
            ContractError::IndexOutOfRange { index: 0, count: 0 } => {}
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn range_pages() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        filled(&mut store, &alice, &[10, 11, 12, 13, 14]);

        let page = INDEX.range(&store, &alice, None, 2).unwrap();
        assert_eq!(vec![(0, 10), (1, 11)], page);
        let page = INDEX.range(&store, &alice, Some(1), 2).unwrap();
        assert_eq!(vec![(2, 12), (3, 13)], page);
        let page = INDEX.range(&store, &alice, Some(3), 2).unwrap();
        assert_eq!(vec![(4, 14)], page);
    }

    #[test]
    fn owners_are_independent() {
        let mut store = MockStorage::new();
        let alice = Addr::unchecked("alice");
        let bob = Addr::unchecked("bob");

        INDEX.append(&mut store, &alice, 1).unwrap();
        INDEX.append(&mut store, &bob, 2).unwrap();
        INDEX.append(&mut store, &alice, 3).unwrap();
        INDEX.append(&mut store, &bob, 4).unwrap();

        INDEX.remove(&mut store, &alice, 1).unwrap();
        assert_sequence(&store, &alice, &[3]);
        assert_sequence(&store, &bob, &[2, 4]);
    }

    #[test]
    fn mixed_operations_keep_slots_consistent() {
        let mut store = MockStorage::new();
        let owners = [
            Addr::unchecked("alice"),
            Addr::unchecked("bob"),
            Addr::unchecked("carol"),
        ];
        let mut model: Vec<Vec<u64>> = vec![vec![]; owners.len()];
        let mut next_id = 0u64;
        let mut seed = 42u64;

        for _ in 0..300 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let owner = (seed >> 33) as usize % owners.len();
            let ids = &mut model[owner];

            if ids.is_empty() || (seed >> 40) % 3 != 0 {
                next_id += 1;
                INDEX.append(&mut store, &owners[owner], next_id).unwrap();
                ids.push(next_id);
            } else {
                let pick = (seed >> 20) as usize % ids.len();
                let id = ids[pick];
                INDEX.remove(&mut store, &owners[owner], id).unwrap();
                ids.swap_remove(pick);
            }

            for (addr, ids) in owners.iter().zip(model.iter()) {
                assert_sequence(&store, addr, ids);
            }
        }
    }
}
