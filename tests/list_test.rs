/*!
 * Stable List Tests
 * Container semantics, tombstone traversal, and erase-during-iteration
 */

use sigcast::StableList;

#[test]
fn test_basic_container_ops() {
    let mut list = StableList::new();
    assert!(list.is_empty());

    list.push_back("b");
    list.push_back("c");
    list.push_front("a");
    assert_eq!(list.len(), 3);
    assert_eq!(list.to_vec(), vec!["a", "b", "c"]);
}

#[test]
fn test_insert_before_cursor() {
    let mut list = StableList::new();
    list.push_back(1);
    let at = list.push_back(4);
    list.insert_before(&at, 2);
    list.insert_before(&at, 3);
    assert_eq!(list.to_vec(), vec![1, 2, 3, 4]);
}

#[test]
fn test_forward_and_reverse_iteration() {
    let mut list = StableList::new();
    for v in 0..4 {
        list.push_back(v);
    }

    let mut forward = Vec::new();
    list.for_each(|v| forward.push(*v));
    assert_eq!(forward, vec![0, 1, 2, 3]);

    let mut backward = Vec::new();
    list.for_each_rev(|v| backward.push(*v));
    assert_eq!(backward, vec![3, 2, 1, 0]);
}

#[test]
fn test_cursor_walks_both_directions() {
    let mut list = StableList::new();
    list.push_back(1);
    list.push_back(2);
    list.push_back(3);

    let mut cursor = list.cursor_front();
    assert_eq!(*cursor.value().unwrap(), 1);
    assert!(cursor.move_next());
    assert!(cursor.move_next());
    assert_eq!(*cursor.value().unwrap(), 3);
    assert!(cursor.move_prev());
    assert_eq!(*cursor.value().unwrap(), 2);
}

#[test]
fn test_erased_node_keeps_forward_path() {
    let mut list = StableList::new();
    list.push_back(1);
    let middle = list.push_back(2);
    list.push_back(3);

    assert_eq!(list.erase(&middle), Some(2));
    assert_eq!(list.len(), 2);

    // The retained cursor dereferences to nothing but still reaches the
    // live remainder of the list.
    assert!(middle.value().is_none());
    let mut walker = middle.clone();
    assert!(walker.move_next());
    assert_eq!(*walker.value().unwrap(), 3);

    // Erasing again is a no-op.
    assert_eq!(list.erase(&middle), None);
}

#[test]
fn test_erase_while_iterating() {
    let mut list = StableList::new();
    let cursors: Vec<_> = (0..6).map(|v| list.push_back(v)).collect();

    let mut visited = Vec::new();
    let mut cursor = list.cursor_front();
    while !cursor.at_end() {
        let value = cursor.value().map(|v| *v);
        if let Some(v) = value {
            visited.push(v);
            if v == 0 {
                // Drop the two elements right after the current one.
                list.erase(&cursors[1]);
                list.erase(&cursors[2]);
            }
        }
        cursor.move_next();
    }

    assert_eq!(visited, vec![0, 3, 4, 5]);
    assert_eq!(list.len(), 4);
}

#[test]
fn test_erase_range_redirects_inner_cursors() {
    let mut list = StableList::new();
    let cursors: Vec<_> = (0..5).map(|v| list.push_back(v)).collect();

    let captured = cursors[2].clone();
    assert_eq!(list.erase_range(&cursors[1], &cursors[4]), 3);
    assert_eq!(list.to_vec(), vec![0, 4]);

    let mut walker = captured;
    assert!(walker.value().is_none());
    assert!(walker.move_next());
    assert_eq!(*walker.value().unwrap(), 4);
}

#[test]
fn test_clear_sends_cursors_to_end() {
    let mut list = StableList::new();
    list.push_back(1);
    let held = list.push_back(2);
    list.push_back(3);

    list.clear();
    assert!(list.is_empty());

    let mut walker = held;
    assert!(walker.value().is_none());
    walker.move_next();
    assert!(walker.at_end());
}

#[test]
fn test_remove_and_remove_if() {
    let mut list = StableList::new();
    for v in [5, 1, 5, 5, 2, 5] {
        list.push_back(v);
    }

    assert_eq!(list.remove(&5), 4);
    assert_eq!(list.to_vec(), vec![1, 2]);

    assert_eq!(list.remove_if(|v| *v % 2 == 0), 1);
    assert_eq!(list.to_vec(), vec![1]);
}

#[test]
fn test_reinsert_after_erase() {
    let mut list = StableList::new();
    list.push_back(1);
    let middle = list.push_back(2);
    let last = list.push_back(3);

    list.erase(&middle);
    list.insert_before(&last, 9);
    assert_eq!(list.to_vec(), vec![1, 9, 3]);
}
