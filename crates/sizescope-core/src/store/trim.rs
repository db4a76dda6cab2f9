/// Size-bounded copy of a result tree for storage.
///
/// Shallow levels are kept whole. From `max_depth` down, a directory keeps
/// only its significant children, as leaf summaries, and at most
/// `max_children` of them.
use crate::config::TrimSettings;
use crate::model::FileEntry;

/// Return a trimmed copy of `root`. The input is left untouched.
pub fn trim_for_storage(root: &FileEntry, settings: &TrimSettings) -> FileEntry {
    trim_at(root, 0, settings)
}

fn trim_at(entry: &FileEntry, depth: usize, settings: &TrimSettings) -> FileEntry {
    let children = if depth < settings.max_depth {
        entry
            .children
            .iter()
            .map(|child| trim_at(child, depth + 1, settings))
            .collect()
    } else {
        summarize_children(entry, settings)
    };

    FileEntry {
        children,
        ..shallow_copy(entry)
    }
}

/// Significant children of a deep node, each reduced to a leaf.
fn summarize_children(entry: &FileEntry, settings: &TrimSettings) -> Vec<FileEntry> {
    let mut kept: Vec<(usize, &FileEntry)> = entry
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.size >= settings.min_size || (c.is_dir && !c.children.is_empty()))
        .collect();

    if kept.len() > settings.max_children {
        kept.sort_by(|a, b| b.1.size.cmp(&a.1.size).then(a.0.cmp(&b.0)));
        kept.truncate(settings.max_children);
        kept.sort_by_key(|(pos, _)| *pos);
    }

    kept.into_iter().map(|(_, c)| shallow_copy(c)).collect()
}

fn shallow_copy(entry: &FileEntry) -> FileEntry {
    FileEntry {
        name: entry.name.clone(),
        path: entry.path.clone(),
        size: entry.size,
        is_dir: entry.is_dir,
        extension: entry.extension.clone(),
        children: Vec::new(),
        file_types: entry.file_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> FileEntry {
        FileEntry {
            name: name.into(),
            path: format!("/{name}"),
            size,
            is_dir: false,
            extension: String::new(),
            children: Vec::new(),
            file_types: None,
        }
    }

    fn dir(name: &str, children: Vec<FileEntry>) -> FileEntry {
        FileEntry {
            name: name.into(),
            path: format!("/{name}"),
            size: children.iter().map(|c| c.size).sum(),
            is_dir: true,
            extension: String::new(),
            children,
            file_types: None,
        }
    }

    fn settings(max_depth: usize, min_size: u64, max_children: usize) -> TrimSettings {
        TrimSettings {
            max_depth,
            min_size,
            max_children,
        }
    }

    fn names(entry: &FileEntry) -> Vec<&str> {
        entry.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn shallow_levels_are_kept_whole() {
        let tree = dir("r", vec![file("tiny", 1), dir("d", vec![file("x", 2)])]);
        let trimmed = trim_for_storage(&tree, &settings(4, 1_000, 100));
        assert_eq!(trimmed, tree);
    }

    #[test]
    fn deep_levels_keep_significant_leaf_summaries() {
        let deep = dir(
            "deep",
            vec![
                file("small", 5),
                file("big", 500),
                dir("nested", vec![file("n1", 1), file("n2", 1)]),
                dir("hollow", vec![]),
            ],
        );
        let tree = dir("r", vec![deep]);

        let trimmed = trim_for_storage(&tree, &settings(1, 100, 100));
        let deep = &trimmed.children[0];
        assert_eq!(names(deep), vec!["big", "nested"]);
        let nested = &deep.children[1];
        assert_eq!(nested.size, 2, "size retained");
        assert!(nested.children.is_empty(), "summarized as a leaf");
    }

    #[test]
    fn max_children_keeps_largest_in_listing_order() {
        let tree = dir(
            "r",
            vec![
                file("a", 10),
                file("b", 40),
                file("c", 20),
                file("d", 30),
            ],
        );
        let trimmed = trim_for_storage(&tree, &settings(0, 0, 2));
        assert_eq!(names(&trimmed), vec!["b", "d"]);
        assert_eq!(trimmed.size, 100, "node's own size is untouched");
    }

    #[test]
    fn input_is_not_mutated() {
        let tree = dir("r", vec![dir("a", vec![file("x", 1)])]);
        let before = tree.clone();
        let _ = trim_for_storage(&tree, &settings(0, 10, 1));
        assert_eq!(tree, before);
    }
}
