use crate::builder::{KernelItemSet, State, StateStore};
use crate::StateId;

/// `kernel_item_set` is sorted by the field `core`.
///
/// States with the same kernel core are merged by uniting their lookaheads.
/// Returns whether the state is new or its lookaheads have grown.
pub fn store_state(
  states: &mut StateStore,
  kernel_item_set: KernelItemSet,
) -> (StateId, bool) {
  let kernel_core = kernel_item_set.iter()
    .map(|item| item.core)
    .collect::<Vec<_>>();

  if let Some(i) = states.get_index_of(&kernel_core) {
    let mut changed = false;
    for (item, new_item) in states[i].items.iter_mut().zip(kernel_item_set) {
      if !new_item.lookaheads.is_subset(&item.lookaheads) {
        item.lookaheads.union_with(&new_item.lookaheads);
        changed = true;
      }
    }
    (StateId::new(i as u32), changed)
  } else {
    let state_ix = states.insert_full(
      kernel_core,
      State::new(kernel_item_set),
    ).0 as u32;

    (StateId::new(state_ix), true)
  }
}
