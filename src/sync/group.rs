//! Insertion-ordered grouping

use std::collections::HashMap;

/// Items sharing one computed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<T> {
    pub key: String,
    pub items: Vec<T>,
}

/// Group `items` by `key`, groups in first-seen order, items in input order
pub fn group_by_key<T, I, F>(items: I, key: F) -> Vec<Group<T>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> String,
{
    let mut groups: Vec<Group<T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&pos) => groups[pos].items.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(Group {
                    key: k,
                    items: vec![item],
                });
            }
        }
    }
    groups
}

/// Extension of a base name including the dot, `""` if none
///
/// A single leading dot does not start an extension (`.bashrc` has none).
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        None | Some(0) => "",
        Some(pos) => &name[pos..],
    }
}
