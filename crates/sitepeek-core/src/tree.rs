//! Hierarchical view of asset URL paths.
//!
//! The tree is a display aid: children keep insertion order and there is no
//! lookup structure beyond a linear scan per level.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::types::AssetReference;

/// A node under a [`PathTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    /// An intermediate path segment.
    Directory(PathTree),
    /// A final path segment.
    File,
}

impl PathNode {
    /// Whether this node is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

/// Ordered tree of path segments.
///
/// Serializes as nested JSON objects, files mapping to `null`:
/// `{"css": {"main.css": null}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTree {
    children: Vec<(String, PathNode)>,
}

impl PathTree {
    /// An empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Build a tree from asset references, using each URL's path.
    pub fn from_references<'a, I>(references: I) -> Self
    where
        I: IntoIterator<Item = &'a AssetReference>,
    {
        let mut tree = Self::new();
        for reference in references {
            tree.insert_path(reference.url.path());
        }
        tree
    }

    /// Insert a `/`-separated path. Empty segments are ignored, so `/a//b/`
    /// inserts `a` then `b`. A path with no segments inserts nothing.
    ///
    /// When a segment already exists as a file and the new path needs it as a
    /// directory (or the reverse), the directory wins.
    pub fn insert_path(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, dirs)) = segments.split_last() else {
            return;
        };

        let mut current = self;
        for segment in dirs {
            let Some(next) = current.directory_mut(segment) else {
                return;
            };
            current = next;
        }
        current.insert_file(leaf);
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|(child, _)| child == name)
    }

    /// The subtree for `name`, created if missing. A file with that name
    /// becomes an empty directory.
    fn directory_mut(&mut self, name: &str) -> Option<&mut Self> {
        let index = match self.position(name) {
            Some(index) => {
                if !self.children[index].1.is_directory() {
                    debug!("Path segment '{name}' was a file; treating it as a directory");
                    self.children[index].1 = PathNode::Directory(Self::new());
                }
                index
            },
            None => {
                self.children
                    .push((name.to_string(), PathNode::Directory(Self::new())));
                self.children.len() - 1
            },
        };

        match &mut self.children[index].1 {
            PathNode::Directory(tree) => Some(tree),
            PathNode::File => None,
        }
    }

    fn insert_file(&mut self, name: &str) {
        match self.position(name) {
            Some(index) => {
                if self.children[index].1.is_directory() {
                    debug!("Path segment '{name}' is already a directory; keeping it");
                }
            },
            None => self.children.push((name.to_string(), PathNode::File)),
        }
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &PathNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Look up a direct child.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PathNode> {
        self.position(name).map(|index| &self.children[index].1)
    }

    /// Whether the tree has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of files anywhere in the tree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|(_, node)| match node {
                PathNode::Directory(tree) => tree.file_count(),
                PathNode::File => 1,
            })
            .sum()
    }
}

impl Serialize for PathTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (name, node) in &self.children {
            match node {
                PathNode::Directory(tree) => map.serialize_entry(name, tree)?,
                PathNode::File => map.serialize_entry(name, &())?,
            }
        }
        map.end()
    }
}
