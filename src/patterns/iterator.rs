/* ===============================
   Iterator: one traversal API over three collections
   =============================== */

use itertools::Itertools;

use crate::config::AppConfig;
use crate::transcript::Transcript;

// -------------------------------
// Singly linked list
// -------------------------------

#[derive(Debug)]
pub struct ListNode<T> {
    pub value: T,
    pub next: Option<Box<ListNode<T>>>,
}

#[derive(Debug, Default)]
pub struct LinkedList<T> {
    head: Option<Box<ListNode<T>>>,
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self { head: None }
    }

    pub fn push_front(&mut self, value: T) {
        let next = self.head.take();
        self.head = Some(Box::new(ListNode { value, next }));
    }

    pub fn iter(&self) -> ListIter<'_, T> {
        ListIter {
            current: self.head.as_deref(),
        }
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        let mut list = LinkedList::new();
        for item in items.into_iter().rev() {
            list.push_front(item);
        }
        list
    }
}

pub struct ListIter<'a, T> {
    current: Option<&'a ListNode<T>>,
}

impl<'a, T> Iterator for ListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.next.as_deref();
        Some(&node.value)
    }
}

// -------------------------------
// Binary tree, in-order
// -------------------------------

#[derive(Debug)]
pub struct TreeNode<T> {
    pub value: T,
    pub left: Option<Box<TreeNode<T>>>,
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    pub fn leaf(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_children(value: T, left: Option<TreeNode<T>>, right: Option<TreeNode<T>>) -> Self {
        Self {
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    pub fn in_order(&self) -> InOrder<'_, T> {
        let mut it = InOrder { stack: Vec::new() };
        it.push_left(Some(self));
        it
    }
}

/// Explicit stack instead of recursion.
pub struct InOrder<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> InOrder<'a, T> {
    fn push_left(&mut self, mut node: Option<&'a TreeNode<T>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for InOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.value)
    }
}

// -------------------------------
// Playlist
// -------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub artist: String,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Playlist {
    songs: Vec<Song>,
}

impl Playlist {
    pub fn add(&mut self, song: Song) {
        self.songs.push(song);
    }

    /// Walks forwards with `next` and backwards with `next_back`.
    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Song;
    type IntoIter = std::slice::Iter<'a, Song>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();

    t.heading("Iterator: linked list");
    let list: LinkedList<i32> = [1, 2, 3].into_iter().collect();
    t.line(list.iter().join(" "));

    t.heading("Iterator: binary tree in-order");
    let tree = TreeNode::with_children(2, Some(TreeNode::leaf(1)), Some(TreeNode::leaf(3)));
    t.line(tree.in_order().join(" "));

    t.heading("Iterator: playlist");
    let mut playlist = Playlist::default();
    playlist.add(Song::new("Admirin You", "Karan Aujla"));
    playlist.add(Song::new("Husn", "Anuv Jain"));
    for song in &playlist {
        t.line(format!("{} by {}", song.title, song.artist));
    }
    if let Some(last) = playlist.iter().next_back() {
        t.line(format!("last: {}", last.title));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_list_keeps_insertion_order() {
        let list: LinkedList<_> = vec!["a", "b", "c"].into_iter().collect();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_list_yields_nothing() {
        let list: LinkedList<u8> = LinkedList::new();
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_in_order_on_unbalanced_tree() {
        //        5
        //      3   8
        //     1     9
        //      2
        let tree = TreeNode::with_children(
            5,
            Some(TreeNode::with_children(
                3,
                Some(TreeNode::with_children(1, None, Some(TreeNode::leaf(2)))),
                None,
            )),
            Some(TreeNode::with_children(8, None, Some(TreeNode::leaf(9)))),
        );
        assert_eq!(
            tree.in_order().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 5, 8, 9]
        );
    }

    #[test]
    fn test_playlist_walks_both_directions() {
        let mut p = Playlist::default();
        p.add(Song::new("A", "x"));
        p.add(Song::new("B", "y"));
        let titles: Vec<_> = p.iter().rev().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }
}
