//! Non-repeating random problem selection.
//!
//! Each category gets a `ShuffledQueue`: a shuffled permutation of its pool
//! indices that is consumed front to back and reshuffled when empty. Nothing
//! repeats until every problem of the pool has been drawn once, and a fresh
//! cycle never starts with the problem that ended the previous one.

use std::collections::HashMap;
use std::sync::Arc;

use phonics_common::{ConfigurationError, ConfigurationResult};
use tracing::debug;

use crate::catalog::{CatalogEntry, ProblemCatalog};
use crate::problem::{Category, Problem};

/// Shuffled queue of pool indices with refill.
#[derive(Debug, Clone)]
pub struct ShuffledQueue {
    len: usize,
    order: Vec<usize>,
    cursor: usize,
    last: Option<usize>,
}

impl ShuffledQueue {
    /// Queue over `len` items. The first draw shuffles.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            len,
            order: Vec::new(),
            cursor: 0,
            last: None,
        }
    }

    /// Pool size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Items left before the next refill.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    /// Draw the next index, refilling when the cycle is used up.
    pub fn draw_index(&mut self, rng: &mut fastrand::Rng) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        if self.cursor >= self.order.len() {
            self.refill(rng);
        }
        let index = self.order[self.cursor];
        self.cursor += 1;
        self.last = Some(index);
        Some(index)
    }

    /// Abandon the current cycle and draw a complete new one.
    pub fn full_cycle(&mut self, rng: &mut fastrand::Rng) -> Vec<usize> {
        if self.len == 0 {
            return Vec::new();
        }
        self.refill(rng);
        self.cursor = self.order.len();
        self.last = self.order.last().copied();
        self.order.clone()
    }

    fn refill(&mut self, rng: &mut fastrand::Rng) {
        self.order = (0..self.len).collect();
        rng.shuffle(&mut self.order);
        if self.len > 1 && self.last == Some(self.order[0]) {
            let swap_with = rng.usize(1..self.len);
            self.order.swap(0, swap_with);
        }
        self.cursor = 0;
    }
}

/// Per-category non-repeating draws from a catalog.
#[derive(Debug)]
pub struct ProblemSelector {
    queues: HashMap<Category, ShuffledQueue>,
    rng: fastrand::Rng,
}

impl Default for ProblemSelector {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ProblemSelector {
    /// Create a selector, seeded for reproducible draws when `seed` is set.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            queues: HashMap::new(),
            rng,
        }
    }

    /// Draw one problem from a pool category.
    pub fn draw(
        &mut self,
        catalog: &ProblemCatalog,
        category: Category,
    ) -> ConfigurationResult<Arc<Problem>> {
        let pool = Self::pool(catalog, category)?;
        let queue = Self::queue_for(&mut self.queues, category, pool.len());
        let index = queue
            .draw_index(&mut self.rng)
            .ok_or_else(|| ConfigurationError::EmptyPool(category.to_string()))?;
        debug!("Drew {} from {}", pool[index].id(), category);
        Ok(Arc::clone(&pool[index]))
    }

    /// The whole pool of a category in a fresh non-repeating order.
    pub fn draw_cycle(
        &mut self,
        catalog: &ProblemCatalog,
        category: Category,
    ) -> ConfigurationResult<Vec<Arc<Problem>>> {
        let pool = Self::pool(catalog, category)?;
        let queue = Self::queue_for(&mut self.queues, category, pool.len());
        let order = queue.full_cycle(&mut self.rng);
        if order.is_empty() {
            return Err(ConfigurationError::EmptyPool(category.to_string()));
        }
        Ok(order.into_iter().map(|i| Arc::clone(&pool[i])).collect())
    }

    fn pool(catalog: &ProblemCatalog, category: Category) -> ConfigurationResult<&[Arc<Problem>]> {
        match catalog.entry(category)? {
            CatalogEntry::Pool(pool) => Ok(pool.as_slice()),
            CatalogEntry::TutorialPairing(pair) => Ok(pair.as_slice()),
        }
    }

    fn queue_for(
        queues: &mut HashMap<Category, ShuffledQueue>,
        category: Category,
        len: usize,
    ) -> &mut ShuffledQueue {
        let queue = queues
            .entry(category)
            .or_insert_with(|| ShuffledQueue::new(len));
        if queue.len() != len {
            *queue = ShuffledQueue::new(len);
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixtures::blending;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn catalog_with(n: usize) -> ProblemCatalog {
        let pool = (0..n)
            .map(|i| blending(&format!("p{i}"), &format!("w{i}a"), &format!("w{i}b")))
            .collect();
        ProblemCatalog::from_entries(vec![(Category::InitialBlending, pool)])
            .expect("valid catalog")
    }

    #[test]
    fn test_single_item_pool_repeats() {
        let mut queue = ShuffledQueue::new(1);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(queue.draw_index(&mut rng), Some(0));
        assert_eq!(queue.draw_index(&mut rng), Some(0));
    }

    #[test]
    fn test_empty_queue_draws_nothing() {
        let mut queue = ShuffledQueue::new(0);
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(queue.is_empty());
        assert_eq!(queue.draw_index(&mut rng), None);
        assert!(queue.full_cycle(&mut rng).is_empty());
    }

    #[test]
    fn test_full_cycle_is_permutation() {
        let mut queue = ShuffledQueue::new(6);
        let mut rng = fastrand::Rng::with_seed(9);
        let mut cycle = queue.full_cycle(&mut rng);
        cycle.sort_unstable();
        assert_eq!(cycle, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn test_selector_draw_missing_category() {
        let catalog = catalog_with(2);
        let mut selector = ProblemSelector::new(Some(3));
        let err = selector
            .draw(&catalog, Category::FinalBlending)
            .expect_err("category absent");
        assert_eq!(err, ConfigurationError::MissingCategory("FINAL_BLENDING".to_string()));
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let catalog = catalog_with(5);
        let mut a = ProblemSelector::new(Some(42));
        let mut b = ProblemSelector::new(Some(42));
        for _ in 0..12 {
            let pa = a.draw(&catalog, Category::InitialBlending).unwrap();
            let pb = b.draw(&catalog, Category::InitialBlending).unwrap();
            assert_eq!(pa.id(), pb.id());
        }
    }

    proptest! {
        #[test]
        fn prop_no_repeat_within_cycle(len in 1usize..10, cycles in 1usize..4, seed: u64) {
            let catalog = catalog_with(len);
            let mut selector = ProblemSelector::new(Some(seed));
            let mut previous = None;

            for _ in 0..cycles {
                let mut seen = HashSet::new();
                for _ in 0..len {
                    let problem = selector.draw(&catalog, Category::InitialBlending).unwrap();
                    prop_assert!(seen.insert(problem.id().clone()), "repeated before exhaustion");
                    if len > 1 {
                        prop_assert_ne!(Some(problem.id().clone()), previous.clone());
                    }
                    previous = Some(problem.id().clone());
                }
                prop_assert_eq!(seen.len(), len);
            }
        }
    }
}
