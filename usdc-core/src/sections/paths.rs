//! PATHS section: the path tree, reconstructed from three parallel
//! compressed integer streams via depth-first tail iteration (not native
//! recursion, since real scenes reach nesting depth 64+).

use crate::error::{Error, Result};
use usdc_codec::ByteReader;
use usdc_value::{Index, Path, TokenTable};

/// One entry in the decoded path tree: parent, full path, and children in
/// on-disk order (preserved for `primChildren`).
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<Index>,
    pub path: Path,
    pub children: Vec<(String, Index)>,
}

#[derive(Debug, Clone, Default)]
pub struct PathTree {
    /// `paths[pathIndex.0 as usize]`, sparse (only entries the traversal
    /// visited are `Some`).
    pub paths: Vec<Option<Path>>,
    pub elem_names: Vec<Option<String>>,
    pub nodes: Vec<Option<Node>>,
}

impl PathTree {
    pub fn get(&self, index: Index) -> Option<&Path> {
        self.paths.get(index.0 as usize).and_then(|p| p.as_ref())
    }

    pub fn node(&self, index: Index) -> Option<&Node> {
        self.nodes.get(index.0 as usize).and_then(|n| n.as_ref())
    }
}

struct Pending {
    index: usize,
    parent_path: Path,
    parent_node: Option<Index>,
}

fn build(
    path_indexes: &[u32],
    element_token_indexes: &[i32],
    jumps: &[i32],
    tokens: &TokenTable,
    tree: &mut PathTree,
) -> Result<()> {
    let mut stack = vec![Pending {
        index: 0,
        parent_path: Path::root(),
        parent_node: None,
    }];

    while let Some(Pending {
        mut index,
        mut parent_path,
        mut parent_node,
    }) = stack.pop()
    {
        loop {
            let this_index = index;
            index += 1;

            let path_index = Index(path_indexes[this_index]);

            let (path, elem_name) = if parent_node.is_none() {
                (Path::root(), String::new())
            } else {
                let raw_token = element_token_indexes[this_index];
                let is_property = raw_token < 0;
                let token_index = Index(raw_token.unsigned_abs());
                let elem = tokens
                    .get(token_index)
                    .ok_or_else(|| Error::corrupt("paths", this_index as u64, "element token index out of range"))?;
                let path = if is_property {
                    parent_path.append_property(elem.as_str())
                } else {
                    parent_path.append_child(elem.as_str())
                };
                (path, elem.as_str().to_string())
            };

            let slot = path_index.0 as usize;
            if tree.paths.len() <= slot {
                tree.paths.resize(slot + 1, None);
                tree.elem_names.resize(slot + 1, None);
                tree.nodes.resize(slot + 1, None);
            }
            tree.paths[slot] = Some(path.clone());
            tree.elem_names[slot] = Some(elem_name.clone());
            tree.nodes[slot] = Some(Node {
                parent: parent_node,
                path,
                children: Vec::new(),
            });

            if let Some(parent) = parent_node {
                let parent_slot = parent.0 as usize;
                if let Some(node) = tree.nodes.get_mut(parent_slot).and_then(|n| n.as_mut()) {
                    node.children.push((elem_name, path_index));
                }
            }

            let jump = jumps[this_index];
            let has_child = jump > 0 || jump == -1;
            let has_sibling = jump >= 0;

            if has_child {
                if has_sibling {
                    let sibling_index = this_index + jump as usize;
                    stack.push(Pending {
                        index: sibling_index,
                        parent_path: parent_path.clone(),
                        parent_node,
                    });
                }
                parent_path = tree.paths[slot].clone().unwrap();
                parent_node = Some(path_index);
                continue;
            }

            if has_sibling {
                continue;
            }

            break;
        }
    }

    Ok(())
}

pub fn read_paths(
    reader: &mut ByteReader<'_>,
    start: i64,
    tokens: &TokenTable,
) -> Result<PathTree> {
    reader.seek_set(start as u64).map_err(Error::from)?;
    let num_paths = reader.read_u64().map_err(Error::from)? as usize;

    let path_indexes_len = reader.read_u64().map_err(Error::from)? as usize;
    let path_indexes_bytes = reader.read_bytes(path_indexes_len).map_err(Error::from)?;
    let path_indexes =
        usdc_codec::intcomp::decompress_u32(&path_indexes_bytes, num_paths).map_err(Error::from)?;

    let elem_tokens_len = reader.read_u64().map_err(Error::from)? as usize;
    let elem_tokens_bytes = reader.read_bytes(elem_tokens_len).map_err(Error::from)?;
    let element_token_indexes: Vec<i32> =
        usdc_codec::intcomp::decompress_u32(&elem_tokens_bytes, num_paths)
            .map_err(Error::from)?
            .into_iter()
            .map(|v| v as i32)
            .collect();

    let jumps_len = reader.read_u64().map_err(Error::from)? as usize;
    let jumps_bytes = reader.read_bytes(jumps_len).map_err(Error::from)?;
    let jumps: Vec<i32> = usdc_codec::intcomp::decompress_u32(&jumps_bytes, num_paths)
        .map_err(Error::from)?
        .into_iter()
        .map(|v| v as i32)
        .collect();

    let mut tree = PathTree::default();
    if num_paths > 0 {
        build(&path_indexes, &element_token_indexes, &jumps, tokens, &mut tree)?;
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_table(strs: &[&str]) -> TokenTable {
        let mut t = TokenTable::new();
        for s in strs {
            t.push(s);
        }
        t
    }

    #[test]
    fn single_root_only() {
        let tokens = token_table(&[]);
        let mut tree = PathTree::default();
        build(&[0], &[0], &[-2], &tokens, &mut tree).unwrap();
        assert_eq!(tree.get(Index(0)).unwrap().to_string(), "/");
    }

    #[test]
    fn linear_chain_of_children() {
        // / -> World -> Mesh, no siblings.
        let tokens = token_table(&["World", "Mesh"]);
        let mut tree = PathTree::default();
        build(
            &[0, 1, 2],
            &[0, 0, 1],
            &[-1, -1, -2],
            &tokens,
            &mut tree,
        )
        .unwrap();
        assert_eq!(tree.get(Index(0)).unwrap().to_string(), "/");
        assert_eq!(tree.get(Index(1)).unwrap().to_string(), "/World");
        assert_eq!(tree.get(Index(2)).unwrap().to_string(), "/World/Mesh");

        let root_node = tree.node(Index(0)).unwrap();
        assert_eq!(root_node.children, vec![("World".to_string(), Index(1))]);
    }

    #[test]
    fn siblings_under_root() {
        // / has two children: A, B (siblings, neither has children).
        // root: jump=-1 (has child, no sibling of its own) -> descends to A.
        // A:    jump=0  (no child, has sibling immediately next) -> B.
        // B:    jump=-2 (leaf, branch ends).
        let tokens = token_table(&["A", "B"]);
        let mut tree = PathTree::default();
        build(&[0, 1, 2], &[0, 0, 1], &[-1, 0, -2], &tokens, &mut tree).unwrap();
        assert_eq!(tree.get(Index(1)).unwrap().to_string(), "/A");
        assert_eq!(tree.get(Index(2)).unwrap().to_string(), "/B");
        let root_node = tree.node(Index(0)).unwrap();
        assert_eq!(
            root_node.children,
            vec![("A".to_string(), Index(1)), ("B".to_string(), Index(2))]
        );
    }

    #[test]
    fn property_path_element() {
        let tokens = token_table(&["Mesh", "points"]);
        let mut tree = PathTree::default();
        // root -> Mesh (child) -> .points (property, negative token index)
        build(&[0, 1, 2], &[0, 0, -1], &[-1, -1, -2], &tokens, &mut tree).unwrap();
        assert_eq!(tree.get(Index(2)).unwrap().to_string(), "/Mesh.points");
    }
}
