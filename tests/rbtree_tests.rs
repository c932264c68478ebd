use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rbtree_map::{Ascending, Error, RbMap, RbTree};
use simplelog::{Config, LevelFilter, TestLogger};

type Tree = RbTree<i32, Ascending<i32>>;

fn init_logging() {
    // several tests race to install the logger; only the first wins
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

fn keys(t: &Tree) -> Vec<i32> {
    t.iter().copied().collect()
}

#[test]
fn ascending_inserts_stay_balanced() {
    init_logging();
    let mut t = Tree::new();
    for k in 1..=7 {
        assert!(t.insert(k).1);
        assert_eq!(t.check(), Ok(k as usize));
    }
    assert_eq!(keys(&t), (1..=7).collect::<Vec<_>>());
    assert_eq!(t.get(t.begin()), Some(&1));
}

#[test]
fn erase_root_with_two_children() {
    init_logging();
    let mut t: Tree = (1..=7).collect();

    // the ascending build above settles with 2 at the root
    let pos = t.find(&2);
    assert_eq!(t.erase(pos), Ok(2));
    assert_eq!(t.check(), Ok(6));
    assert_eq!(keys(&t), vec![1, 3, 4, 5, 6, 7]);
    assert_eq!(t.find(&2), t.end());
}

#[test]
fn erase_end_fails_and_changes_nothing() {
    let mut t: Tree = [5, 1, 9].into_iter().collect();
    let end = t.end();
    assert_eq!(t.erase(end), Err(Error::InvalidIterator));
    assert_eq!(t.check(), Ok(3));
    assert_eq!(keys(&t), vec![1, 5, 9]);
}

#[test]
fn random_churn() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut ks: Vec<i32> = (0..200).map(|k| k * 7 - 300).collect();
    ks.shuffle(&mut rng);

    let mut t = Tree::new();
    for &k in &ks {
        assert!(t.insert(k).1);
    }
    assert_eq!(t.check(), Ok(200));

    ks.shuffle(&mut rng);
    for (n, &k) in ks.iter().enumerate() {
        let pos = t.find(&k);
        assert_eq!(t.erase(pos), Ok(k));
        assert_eq!(t.check(), Ok(199 - n));
    }
    assert!(t.is_empty());
    assert_eq!(t.begin(), t.end());
}

#[test]
fn duplicate_insert_is_refused() {
    let mut m = RbMap::new();
    let (first, inserted) = m.insert(3, "three");
    assert!(inserted);
    let (dup, inserted) = m.insert(3, "drei");
    assert!(!inserted);
    assert_eq!(first, dup);
    assert_eq!(m.get(&3), Some(&"three"));
    assert_eq!(m.len(), 1);
}

#[test]
fn clone_then_erase_from_copy() {
    init_logging();
    let t: Tree = (0..50).collect();
    let mut c = t.clone();
    for k in (0..50).step_by(5) {
        let pos = c.find(&k);
        assert_eq!(c.erase(pos), Ok(k));
    }
    assert_eq!(c.check(), Ok(40));
    assert_eq!(t.check(), Ok(50));
    assert_eq!(keys(&t), (0..50).collect::<Vec<_>>());
    assert!(keys(&c).iter().all(|k| k % 5 != 0));

    // cursors do not cross between a tree and its clone
    assert_eq!(c.erase(t.begin()), Err(Error::InvalidIterator));
    assert_eq!(c.len(), 40);
}

#[test]
fn step_back_from_end_reaches_every_key() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut ks: Vec<i32> = (0..64).collect();
    ks.shuffle(&mut rng);
    let t: Tree = ks.into_iter().collect();

    let mut pos = t.end();
    let mut seen = Vec::new();
    while let Ok(p) = t.prev(pos) {
        seen.push(*t.get(p).unwrap());
        assert_eq!(t.next(p), Ok(pos));
        pos = p;
    }
    assert_eq!(pos, t.begin());
    assert_eq!(seen, (0..64).rev().collect::<Vec<_>>());
}
