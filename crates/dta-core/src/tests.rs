//! Unit tests for dta-core primitives.

#[cfg(test)]
mod ids {
    use crate::{LinkId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = LinkId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(LinkId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(LinkId(0) < LinkId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(LinkId::INVALID.0, u32::MAX);
        assert_eq!(LinkId::default(), LinkId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::{DtaError, TimeGrid};

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(TimeGrid::new(0.0, 10), Err(DtaError::Config(_))));
        assert!(matches!(TimeGrid::new(-1.0, 10), Err(DtaError::Config(_))));
        assert!(matches!(TimeGrid::new(1.0, 0), Err(DtaError::Config(_))));
    }

    #[test]
    fn steps_iteration() {
        let grid = TimeGrid::new(1.0, 5).unwrap();
        assert_eq!(grid.steps().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn seconds_to_steps_rounds_to_nearest() {
        let grid = TimeGrid::new(2.0, 10).unwrap();
        assert_eq!(grid.steps_for_secs(4.0), 2);
        assert_eq!(grid.steps_for_secs(4.8), 2); // 2.4 steps → 2
        assert_eq!(grid.steps_for_secs(5.0), 3); // 2.5 steps → 3 (round half up)
    }

    #[test]
    fn clamp_into_horizon() {
        let grid = TimeGrid::new(1.0, 10).unwrap();
        assert_eq!(grid.clamp_step(3), 3);
        assert_eq!(grid.clamp_step(9), 9);
        assert_eq!(grid.clamp_step(10), 9);
        assert_eq!(grid.clamp_step(usize::MAX), 9);
    }
}

#[cfg(test)]
mod path {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use crate::{LinkId, Path};

    fn hash_of(p: &Path) -> u64 {
        let mut h = DefaultHasher::new();
        p.hash(&mut h);
        h.finish()
    }

    #[test]
    fn value_equality_and_hash() {
        let a = Path::new(vec![LinkId(0), LinkId(3), LinkId(7)]);
        let b: Path = [LinkId(0), LinkId(3), LinkId(7)].into_iter().collect();
        let c = Path::new(vec![LinkId(0), LinkId(7), LinkId(3)]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn endpoints() {
        let p = Path::new(vec![LinkId(4), LinkId(1), LinkId(9)]);
        assert_eq!(p.first(), LinkId(4));
        assert_eq!(p.last(), LinkId(9));
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn successor_lookup() {
        let p = Path::new(vec![LinkId(4), LinkId(1), LinkId(9)]);
        assert_eq!(p.next_after(LinkId(4)), Some(LinkId(1)));
        assert_eq!(p.next_after(LinkId(1)), Some(LinkId(9)));
        assert_eq!(p.next_after(LinkId(9)), None); // last link
        assert_eq!(p.next_after(LinkId(5)), None); // not on path
    }

    #[test]
    fn display_uses_raw_indices() {
        let p = Path::new(vec![LinkId(0), LinkId(3)]);
        assert_eq!(p.to_string(), "[0→3]");
    }

    #[test]
    fn clone_is_same_key() {
        let p = Path::new(vec![LinkId(2)]);
        let q = p.clone();
        assert_eq!(p, q);
        assert_eq!(hash_of(&p), hash_of(&q));
    }
}
